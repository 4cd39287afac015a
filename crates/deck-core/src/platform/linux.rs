use super::{shell_invocation, CommandSpec, Platform, PlatformCommands};
use crate::action::{AppTarget, MediaKey, PointerAction, ScreenshotMode, ScrollDirection, WindowOp};

/// X11 desktop tooling: xdotool, wmctrl, xclip, xrandr, gnome-screenshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxCommands;

const DEFAULT_SHELL: &str = "/bin/bash";

/// Selects the first connected output, since xrandr needs an explicit one.
const FIRST_OUTPUT: &str = "$(xrandr | grep ' connected' | head -1 | cut -d' ' -f1)";

impl PlatformCommands for LinuxCommands {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn open(&self, target: &str) -> Option<CommandSpec> {
        Some(CommandSpec::new("xdg-open").arg(target))
    }

    fn close_app(&self, target: &AppTarget) -> Option<CommandSpec> {
        Some(match target {
            AppTarget::Pid(pid) => CommandSpec::new("kill").arg(pid.to_string()),
            AppTarget::Name(name) => CommandSpec::new("pkill").args(["-f", name.as_str()]),
        })
    }

    fn write_clipboard(&self, text: &str) -> Option<CommandSpec> {
        Some(
            CommandSpec::new("xclip")
                .args(["-selection", "clipboard"])
                .stdin(text),
        )
    }

    fn run_script(&self, script: &str, shell: Option<&str>) -> Option<CommandSpec> {
        Some(shell_invocation(shell.unwrap_or(DEFAULT_SHELL), script))
    }

    fn media(&self, key: MediaKey) -> Option<CommandSpec> {
        let keysym = match key {
            MediaKey::PlayPause => "XF86AudioPlay",
            MediaKey::Next => "XF86AudioNext",
            MediaKey::Previous => "XF86AudioPrev",
            MediaKey::VolumeUp => "XF86AudioRaiseVolume",
            MediaKey::VolumeDown => "XF86AudioLowerVolume",
            MediaKey::Mute => "XF86AudioMute",
        };
        Some(CommandSpec::new("xdotool").args(["key", keysym]))
    }

    fn screenshot(&self, mode: ScreenshotMode) -> Option<CommandSpec> {
        let cmd = CommandSpec::new("gnome-screenshot");
        Some(match mode {
            ScreenshotMode::Full => cmd,
            ScreenshotMode::Window => cmd.arg("-w"),
            ScreenshotMode::Region => cmd.arg("-a"),
        })
    }

    fn pointer(&self, action: PointerAction) -> Option<CommandSpec> {
        let cmd = CommandSpec::new("xdotool");
        Some(match action {
            PointerAction::Click { x, y, button } => cmd.args([
                "mousemove".to_string(),
                x.to_string(),
                y.to_string(),
                "click".to_string(),
                button.to_string(),
            ]),
            PointerAction::Move { x, y } => {
                cmd.args(["mousemove".to_string(), x.to_string(), y.to_string()])
            }
            PointerAction::Scroll { x, y, direction } => {
                // X11 maps wheel up/down to buttons 4/5.
                let code = match direction {
                    ScrollDirection::Up => "4",
                    ScrollDirection::Down => "5",
                };
                cmd.args([
                    "mousemove".to_string(),
                    x.to_string(),
                    y.to_string(),
                    "click".to_string(),
                    code.to_string(),
                ])
            }
        })
    }

    fn window(&self, op: &WindowOp) -> Option<CommandSpec> {
        match op {
            WindowOp::Minimize => Some(
                CommandSpec::new("xdotool").args(["getactivewindow", "windowminimize"]),
            ),
            WindowOp::Maximize => Some(CommandSpec::new("wmctrl").args([
                "-r",
                ":ACTIVE:",
                "-b",
                "toggle,maximized_vert,maximized_horz",
            ])),
            WindowOp::Focus { name } => name
                .as_deref()
                .map(|name| CommandSpec::new("wmctrl").args(["-a", name])),
            WindowOp::Resize { width, height } => Some(CommandSpec::new("xdotool").args([
                "getactivewindow".to_string(),
                "windowsize".to_string(),
                width.to_string(),
                height.to_string(),
            ])),
        }
    }

    fn brightness(&self, level: u8) -> Option<CommandSpec> {
        let fraction = f64::from(level) / 100.0;
        let script = format!("xrandr --output \"{FIRST_OUTPUT}\" --brightness {fraction}");
        Some(CommandSpec::new("sh").args(["-c".to_string(), script]))
    }

    fn hotkey(&self, keys: &[String]) -> Option<CommandSpec> {
        Some(CommandSpec::new("xdotool").arg("key").args(keys.iter().cloned()))
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &[
            "xdg-open",
            "kill",
            "pkill",
            "xclip",
            "bash",
            "sh",
            "xdotool",
            "wmctrl",
            "xrandr",
            "grep",
            "head",
            "cut",
            "gnome-screenshot",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(spec: Option<CommandSpec>) -> Vec<String> {
        let spec = spec.expect("command expected");
        std::iter::once(spec.program).chain(spec.args).collect()
    }

    #[test]
    fn close_by_pid_and_name() {
        assert_eq!(
            argv(LinuxCommands.close_app(&AppTarget::Pid(77))),
            vec!["kill", "77"]
        );
        assert_eq!(
            argv(LinuxCommands.close_app(&AppTarget::Name("code".into()))),
            vec!["pkill", "-f", "code"]
        );
    }

    #[test]
    fn clipboard_text_goes_through_stdin() {
        let spec = LinuxCommands.write_clipboard("secret; rm -rf /").unwrap();
        assert_eq!(spec.program, "xclip");
        assert_eq!(spec.stdin.as_deref(), Some("secret; rm -rf /"));
        assert!(!spec.args.iter().any(|a| a.contains("secret")));
    }

    #[test]
    fn script_defaults_to_bash() {
        assert_eq!(
            argv(LinuxCommands.run_script("echo hi", None)),
            vec!["/bin/bash", "-c", "echo hi"]
        );
        assert_eq!(
            argv(LinuxCommands.run_script("echo hi", Some("/bin/zsh"))),
            vec!["/bin/zsh", "-c", "echo hi"]
        );
    }

    #[test]
    fn media_keys_map_to_xf86_keysyms() {
        assert_eq!(
            argv(LinuxCommands.media(MediaKey::Previous)),
            vec!["xdotool", "key", "XF86AudioPrev"]
        );
        assert_eq!(
            argv(LinuxCommands.media(MediaKey::VolumeDown)),
            vec!["xdotool", "key", "XF86AudioLowerVolume"]
        );
    }

    #[test]
    fn screenshot_modes() {
        assert_eq!(
            argv(LinuxCommands.screenshot(ScreenshotMode::Full)),
            vec!["gnome-screenshot"]
        );
        assert_eq!(
            argv(LinuxCommands.screenshot(ScreenshotMode::Region)),
            vec!["gnome-screenshot", "-a"]
        );
    }

    #[test]
    fn scroll_direction_maps_to_click_codes() {
        let up = argv(LinuxCommands.pointer(PointerAction::Scroll {
            x: 5,
            y: 6,
            direction: ScrollDirection::Up,
        }));
        let down = argv(LinuxCommands.pointer(PointerAction::Scroll {
            x: 5,
            y: 6,
            direction: ScrollDirection::Down,
        }));
        assert_eq!(up, vec!["xdotool", "mousemove", "5", "6", "click", "4"]);
        assert_eq!(down.last().map(String::as_str), Some("5"));
    }

    #[test]
    fn click_uses_button() {
        assert_eq!(
            argv(LinuxCommands.pointer(PointerAction::Click {
                x: 100,
                y: 200,
                button: 3
            })),
            vec!["xdotool", "mousemove", "100", "200", "click", "3"]
        );
    }

    #[test]
    fn focus_without_name_is_a_no_op() {
        assert!(LinuxCommands.window(&WindowOp::Focus { name: None }).is_none());
        assert_eq!(
            argv(LinuxCommands.window(&WindowOp::Focus {
                name: Some("Firefox".into())
            })),
            vec!["wmctrl", "-a", "Firefox"]
        );
    }

    #[test]
    fn resize_passes_dimensions() {
        assert_eq!(
            argv(LinuxCommands.window(&WindowOp::Resize {
                width: 1024,
                height: 768
            })),
            vec!["xdotool", "getactivewindow", "windowsize", "1024", "768"]
        );
    }

    #[test]
    fn brightness_scales_linearly() {
        let spec = LinuxCommands.brightness(75).unwrap();
        assert_eq!(spec.program, "sh");
        assert!(spec.args[1].ends_with("--brightness 0.75"), "{}", spec.args[1]);
        let full = LinuxCommands.brightness(100).unwrap();
        assert!(full.args[1].ends_with("--brightness 1"));
    }

    #[test]
    fn hotkey_passes_each_combo() {
        assert_eq!(
            argv(LinuxCommands.hotkey(&["ctrl+alt+t".into(), "Return".into()])),
            vec!["xdotool", "key", "ctrl+alt+t", "Return"]
        );
    }

    #[test]
    fn required_tools_cover_every_composed_program() {
        let specs = [
            LinuxCommands.open("https://example.com"),
            LinuxCommands.close_app(&AppTarget::Pid(1)),
            LinuxCommands.close_app(&AppTarget::Name("code".into())),
            LinuxCommands.write_clipboard("x"),
            LinuxCommands.run_script("true", None),
            LinuxCommands.media(MediaKey::Mute),
            LinuxCommands.screenshot(ScreenshotMode::Region),
            LinuxCommands.pointer(PointerAction::Move { x: 0, y: 0 }),
            LinuxCommands.window(&WindowOp::Maximize),
            LinuxCommands.brightness(40),
            LinuxCommands.hotkey(&["ctrl+c".into()]),
        ];
        let tools = LinuxCommands.required_tools();
        for spec in specs.into_iter().flatten() {
            let program = spec.program.rsplit('/').next().unwrap_or_default().to_string();
            assert!(tools.contains(&program.as_str()), "{program} missing");
        }
        for piped in ["xrandr", "grep", "head", "cut"] {
            assert!(FIRST_OUTPUT.contains(piped));
            assert!(tools.contains(&piped), "{piped} missing");
        }
    }
}
