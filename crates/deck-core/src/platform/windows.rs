use super::{shell_invocation, CommandSpec, Platform, PlatformCommands};
use crate::action::{AppTarget, MediaKey, PointerAction, ScreenshotMode};

/// `cmd`, `taskkill`, `clip`, PowerShell, and the Snipping Tool.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsCommands;

const DEFAULT_SHELL: &str = "cmd.exe";

fn powershell(command: impl Into<String>) -> CommandSpec {
    CommandSpec::new("powershell")
        .args(["-NoProfile", "-Command"])
        .arg(command)
}

impl PlatformCommands for WindowsCommands {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn open(&self, target: &str) -> Option<CommandSpec> {
        // The empty string is the window title `start` expects first.
        Some(CommandSpec::new("cmd").args(["/C", "start", "", target]))
    }

    fn close_app(&self, target: &AppTarget) -> Option<CommandSpec> {
        let cmd = CommandSpec::new("taskkill");
        Some(match target {
            AppTarget::Pid(pid) => {
                cmd.args(["/PID".to_string(), pid.to_string(), "/F".to_string()])
            }
            AppTarget::Name(name) => cmd.args(["/IM", name.as_str(), "/F"]),
        })
    }

    fn write_clipboard(&self, text: &str) -> Option<CommandSpec> {
        Some(CommandSpec::new("clip").stdin(text))
    }

    fn run_script(&self, script: &str, shell: Option<&str>) -> Option<CommandSpec> {
        Some(shell_invocation(shell.unwrap_or(DEFAULT_SHELL), script))
    }

    fn media(&self, key: MediaKey) -> Option<CommandSpec> {
        let vk = match key {
            MediaKey::PlayPause => "0xB3",
            MediaKey::Next => "0xB0",
            MediaKey::Previous => "0xB1",
            MediaKey::VolumeUp => "0xAF",
            MediaKey::VolumeDown => "0xAE",
            MediaKey::Mute => "0xAD",
        };
        Some(powershell(format!(
            "$wshell = New-Object -ComObject wscript.shell; $wshell.SendKeys([char]{vk})"
        )))
    }

    fn screenshot(&self, _mode: ScreenshotMode) -> Option<CommandSpec> {
        Some(CommandSpec::new("snippingtool").arg("/clip"))
    }

    fn pointer(&self, action: PointerAction) -> Option<CommandSpec> {
        let (x, y) = match action {
            PointerAction::Click { x, y, .. }
            | PointerAction::Move { x, y }
            | PointerAction::Scroll { x, y, .. } => (x, y),
        };
        Some(powershell(format!(
            "Add-Type -AssemblyName System.Windows.Forms; \
             [System.Windows.Forms.Cursor]::Position = New-Object System.Drawing.Point({x},{y})"
        )))
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &["cmd", "taskkill", "clip", "powershell", "snippingtool"]
    }
}
