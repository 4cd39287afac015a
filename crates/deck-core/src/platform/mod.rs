//! Command Composer.
//!
//! Each supported OS gets one [`PlatformCommands`] implementation that turns a
//! typed [`Action`] into an external command. Composers are pure: they never
//! spawn anything. Returning `None` means the platform has no command for the
//! action, which the dispatch engine treats as a vacuous success.
//!
//! The implementation is picked once, at engine construction, via
//! [`native`] or [`for_platform`].

mod linux;
mod macos;
mod windows;

pub use linux::LinuxCommands;
pub use macos::MacCommands;
pub use windows::WindowsCommands;

use crate::action::{Action, AppTarget, MediaKey, PointerAction, ScreenshotMode, WindowOp};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    /// The platform this binary was built for. Unix flavours other than macOS
    /// use the Linux (X11 tooling) composer.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux" => Ok(Platform::Linux),
            "macos" | "darwin" => Ok(Platform::MacOs),
            "windows" | "win32" => Ok(Platform::Windows),
            other => Err(format!("unsupported platform: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// CommandSpec
// ---------------------------------------------------------------------------

/// A fully composed external command: program, argv, and optional stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PlatformCommands
// ---------------------------------------------------------------------------

/// Per-OS command composition, one method per composer family.
///
/// Window, display, and hotkey families default to "no command"; only
/// platforms with a suitable automation utility override them.
pub trait PlatformCommands: Send + Sync {
    fn platform(&self) -> Platform;

    /// Open a URL, file, or application with the OS default handler.
    fn open(&self, target: &str) -> Option<CommandSpec>;

    fn close_app(&self, target: &AppTarget) -> Option<CommandSpec>;

    /// Put `text` on the system clipboard. Does not simulate keystrokes.
    fn write_clipboard(&self, text: &str) -> Option<CommandSpec>;

    fn run_script(&self, script: &str, shell: Option<&str>) -> Option<CommandSpec>;

    fn media(&self, key: MediaKey) -> Option<CommandSpec>;

    fn screenshot(&self, mode: ScreenshotMode) -> Option<CommandSpec>;

    fn pointer(&self, action: PointerAction) -> Option<CommandSpec>;

    fn window(&self, _op: &WindowOp) -> Option<CommandSpec> {
        None
    }

    fn brightness(&self, _level: u8) -> Option<CommandSpec> {
        None
    }

    fn hotkey(&self, _keys: &[String]) -> Option<CommandSpec> {
        None
    }

    /// External utilities the composed commands rely on.
    fn required_tools(&self) -> &'static [&'static str];
}

/// Route a typed action to the composer family that handles it.
pub fn compose(commands: &dyn PlatformCommands, action: &Action) -> Option<CommandSpec> {
    match action {
        Action::OpenUrl { url } => commands.open(url),
        Action::OpenApp { target } => commands.open(target),
        Action::CloseApp(target) => commands.close_app(target),
        Action::WriteClipboard { text } => commands.write_clipboard(text),
        Action::RunScript { script, shell } => commands.run_script(script, shell.as_deref()),
        Action::Media(key) => commands.media(*key),
        Action::Screenshot(mode) => commands.screenshot(*mode),
        Action::Pointer(pointer) => commands.pointer(*pointer),
        Action::Window(op) => commands.window(op),
        Action::Brightness { level } => commands.brightness(*level),
        Action::Hotkey { keys } if keys.is_empty() => None,
        Action::Hotkey { keys } => commands.hotkey(keys),
    }
}

pub fn for_platform(platform: Platform) -> Arc<dyn PlatformCommands> {
    match platform {
        Platform::Linux => Arc::new(LinuxCommands),
        Platform::MacOs => Arc::new(MacCommands::new()),
        Platform::Windows => Arc::new(WindowsCommands),
    }
}

/// Composer for the platform this binary runs on.
pub fn native() -> Arc<dyn PlatformCommands> {
    for_platform(Platform::current())
}

/// Build `<shell> <flag> <script>` with the flag the shell expects.
fn shell_invocation(shell: &str, script: &str) -> CommandSpec {
    let stem = Path::new(shell)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(shell)
        .to_ascii_lowercase();
    let cmd = CommandSpec::new(shell);
    match stem.as_str() {
        "cmd" => cmd.args(["/C", script]),
        "powershell" | "pwsh" => cmd.args(["-NoProfile", "-Command", script]),
        _ => cmd.args(["-c", script]),
    }
}
