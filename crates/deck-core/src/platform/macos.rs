use super::{shell_invocation, CommandSpec, Platform, PlatformCommands};
use crate::action::{AppTarget, MediaKey, PointerAction, ScreenshotMode};
use std::path::PathBuf;

/// `open`, `pbcopy`, `screencapture`, and AppleScript via `osascript`.
#[derive(Debug, Clone)]
pub struct MacCommands {
    screenshot_dir: PathBuf,
}

const DEFAULT_SHELL: &str = "/bin/bash";

impl MacCommands {
    /// Screenshots land on the user's Desktop.
    pub fn new() -> Self {
        let dir = home::home_dir()
            .map(|h| h.join("Desktop"))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_screenshot_dir(dir)
    }

    pub fn with_screenshot_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            screenshot_dir: dir.into(),
        }
    }

    fn screenshot_path(&self) -> String {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        self.screenshot_dir
            .join(format!("screenshot-{stamp}.png"))
            .to_string_lossy()
            .into_owned()
    }
}

impl Default for MacCommands {
    fn default() -> Self {
        Self::new()
    }
}

fn osascript(script: impl Into<String>) -> CommandSpec {
    CommandSpec::new("osascript").arg("-e").arg(script)
}

impl PlatformCommands for MacCommands {
    fn platform(&self) -> Platform {
        Platform::MacOs
    }

    fn open(&self, target: &str) -> Option<CommandSpec> {
        Some(CommandSpec::new("open").arg(target))
    }

    fn close_app(&self, target: &AppTarget) -> Option<CommandSpec> {
        Some(match target {
            AppTarget::Pid(pid) => CommandSpec::new("kill").arg(pid.to_string()),
            AppTarget::Name(name) => CommandSpec::new("pkill").args(["-f", name.as_str()]),
        })
    }

    fn write_clipboard(&self, text: &str) -> Option<CommandSpec> {
        Some(CommandSpec::new("pbcopy").stdin(text))
    }

    fn run_script(&self, script: &str, shell: Option<&str>) -> Option<CommandSpec> {
        Some(shell_invocation(shell.unwrap_or(DEFAULT_SHELL), script))
    }

    fn media(&self, key: MediaKey) -> Option<CommandSpec> {
        let script = match key {
            MediaKey::PlayPause => {
                r#"tell application "System Events" to key code 16 using {command down}"#
            }
            MediaKey::Next => {
                r#"tell application "System Events" to key code 17 using {command down}"#
            }
            MediaKey::Previous => {
                r#"tell application "System Events" to key code 18 using {command down}"#
            }
            MediaKey::VolumeUp => {
                "set volume output volume ((output volume of (get volume settings)) + 10)"
            }
            MediaKey::VolumeDown => {
                "set volume output volume ((output volume of (get volume settings)) - 10)"
            }
            MediaKey::Mute => "set volume with output muted",
        };
        Some(osascript(script))
    }

    fn screenshot(&self, mode: ScreenshotMode) -> Option<CommandSpec> {
        let cmd = CommandSpec::new("screencapture");
        let cmd = match mode {
            ScreenshotMode::Full => cmd,
            ScreenshotMode::Window => cmd.arg("-w"),
            ScreenshotMode::Region => cmd.arg("-s"),
        };
        Some(cmd.arg(self.screenshot_path()))
    }

    fn pointer(&self, action: PointerAction) -> Option<CommandSpec> {
        match action {
            PointerAction::Click { x, y, .. } => Some(osascript(format!(
                r#"tell application "System Events" to click at {{{x}, {y}}}"#
            ))),
            // System Events can click but cannot move or scroll the cursor.
            PointerAction::Move { .. } | PointerAction::Scroll { .. } => None,
        }
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &["open", "pkill", "pbcopy", "bash", "osascript", "screencapture"]
    }
}
