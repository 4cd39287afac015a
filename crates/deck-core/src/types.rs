use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// Number of physical keys on the macro-pad; every page carries one button per key.
pub const BUTTON_COUNT: u32 = 18;

/// Hard limit for the only category that runs user-supplied code.
pub const SCRIPT_TIMEOUT: Duration = Duration::from_millis(30_000);

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    OpenApp,
    CloseApp,
    OpenUrl,
    InsertText,
    PasteClipboard,
    RunScript,
    MediaPlayPause,
    MediaNext,
    MediaPrevious,
    MediaVolumeUp,
    MediaVolumeDown,
    MediaMute,
    ScreenshotFull,
    ScreenshotWindow,
    ScreenshotRegion,
    MouseClick,
    MouseMove,
    MouseScroll,
    WindowMinimize,
    WindowMaximize,
    WindowFocus,
    WindowResize,
    DisplayBrightness,
    Hotkey,
}

impl ActionKind {
    pub fn all() -> &'static [ActionKind] {
        &[
            ActionKind::OpenApp,
            ActionKind::CloseApp,
            ActionKind::OpenUrl,
            ActionKind::InsertText,
            ActionKind::PasteClipboard,
            ActionKind::RunScript,
            ActionKind::MediaPlayPause,
            ActionKind::MediaNext,
            ActionKind::MediaPrevious,
            ActionKind::MediaVolumeUp,
            ActionKind::MediaVolumeDown,
            ActionKind::MediaMute,
            ActionKind::ScreenshotFull,
            ActionKind::ScreenshotWindow,
            ActionKind::ScreenshotRegion,
            ActionKind::MouseClick,
            ActionKind::MouseMove,
            ActionKind::MouseScroll,
            ActionKind::WindowMinimize,
            ActionKind::WindowMaximize,
            ActionKind::WindowFocus,
            ActionKind::WindowResize,
            ActionKind::DisplayBrightness,
            ActionKind::Hotkey,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::OpenApp => "open-app",
            ActionKind::CloseApp => "close-app",
            ActionKind::OpenUrl => "open-url",
            ActionKind::InsertText => "insert-text",
            ActionKind::PasteClipboard => "paste-clipboard",
            ActionKind::RunScript => "run-script",
            ActionKind::MediaPlayPause => "media-play-pause",
            ActionKind::MediaNext => "media-next",
            ActionKind::MediaPrevious => "media-previous",
            ActionKind::MediaVolumeUp => "media-volume-up",
            ActionKind::MediaVolumeDown => "media-volume-down",
            ActionKind::MediaMute => "media-mute",
            ActionKind::ScreenshotFull => "screenshot-full",
            ActionKind::ScreenshotWindow => "screenshot-window",
            ActionKind::ScreenshotRegion => "screenshot-region",
            ActionKind::MouseClick => "mouse-click",
            ActionKind::MouseMove => "mouse-move",
            ActionKind::MouseScroll => "mouse-scroll",
            ActionKind::WindowMinimize => "window-minimize",
            ActionKind::WindowMaximize => "window-maximize",
            ActionKind::WindowFocus => "window-focus",
            ActionKind::WindowResize => "window-resize",
            ActionKind::DisplayBrightness => "display-brightness",
            ActionKind::Hotkey => "hotkey",
        }
    }

    pub fn category(self) -> ActionCategory {
        match self {
            ActionKind::OpenApp | ActionKind::CloseApp | ActionKind::OpenUrl => {
                ActionCategory::Process
            }
            ActionKind::InsertText | ActionKind::PasteClipboard => ActionCategory::Clipboard,
            ActionKind::RunScript => ActionCategory::Script,
            ActionKind::MediaPlayPause
            | ActionKind::MediaNext
            | ActionKind::MediaPrevious
            | ActionKind::MediaVolumeUp
            | ActionKind::MediaVolumeDown
            | ActionKind::MediaMute => ActionCategory::Media,
            ActionKind::ScreenshotFull
            | ActionKind::ScreenshotWindow
            | ActionKind::ScreenshotRegion => ActionCategory::Screenshot,
            ActionKind::MouseClick | ActionKind::MouseMove | ActionKind::MouseScroll => {
                ActionCategory::Pointer
            }
            ActionKind::WindowMinimize
            | ActionKind::WindowMaximize
            | ActionKind::WindowFocus
            | ActionKind::WindowResize => ActionCategory::Window,
            ActionKind::DisplayBrightness => ActionCategory::Display,
            ActionKind::Hotkey => ActionCategory::Hotkey,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = crate::error::DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| crate::error::DeckError::UnknownActionKind(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ActionCategory
// ---------------------------------------------------------------------------

/// Composer family an action kind is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCategory {
    Process,
    Clipboard,
    Script,
    Media,
    Screenshot,
    Pointer,
    Window,
    Display,
    Hotkey,
}

impl ActionCategory {
    pub fn timeout(self) -> Option<Duration> {
        match self {
            ActionCategory::Script => Some(SCRIPT_TIMEOUT),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ActionDescriptor / ActionOutcome
// ---------------------------------------------------------------------------

/// One configured action, as stored on a button or received from the bridge.
///
/// The kind stays in its wire form so that descriptors naming a kind outside
/// the catalog can still reach the engine and be rejected there as a failed
/// outcome rather than as a decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl ActionDescriptor {
    pub fn new(kind: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            kind: kind.into(),
            label: String::new(),
            params,
        }
    }

    /// Convenience constructor for a descriptor with no parameters.
    pub fn bare(kind: ActionKind) -> Self {
        Self::new(kind.as_str(), Map::new())
    }

    pub fn action_kind(&self) -> crate::Result<ActionKind> {
        self.kind.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ActionOutcome {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            error_message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            error_message: Some(message.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Buttons, pages, profiles
// ---------------------------------------------------------------------------

pub const DEFAULT_BUTTON_COLOR: &str = "#1e293b";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonConfig {
    pub id: u32,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub actions: Vec<ActionDescriptor>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_color() -> String {
    DEFAULT_BUTTON_COLOR.to_string()
}

fn default_enabled() -> bool {
    true
}

impl ButtonConfig {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            label: String::new(),
            icon: None,
            color: default_color(),
            actions: Vec::new(),
            enabled: true,
        }
    }

    /// True when a trigger on this button would run something.
    pub fn is_runnable(&self) -> bool {
        self.enabled && !self.actions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub name: String,
    pub buttons: Vec<ButtonConfig>,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            buttons: (1..=BUTTON_COUNT).map(ButtonConfig::new).collect(),
        }
    }

    pub fn button(&self, id: u32) -> Option<&ButtonConfig> {
        self.buttons.iter().find(|b| b.id == id)
    }

    pub fn button_mut(&mut self, id: u32) -> Option<&mut ButtonConfig> {
        self.buttons.iter_mut().find(|b| b.id == id)
    }

    /// Whether the page holds exactly one button per key, ids 1..=18.
    pub fn has_full_layout(&self) -> bool {
        self.buttons.len() == BUTTON_COUNT as usize
            && (1..=BUTTON_COUNT).all(|id| self.buttons.iter().filter(|b| b.id == id).count() == 1)
    }

    /// Restore the fixed 18-slot layout: drop out-of-range and duplicate ids,
    /// add defaults for missing slots, sort by id.
    pub fn normalize_layout(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.buttons
            .retain(|b| (1..=BUTTON_COUNT).contains(&b.id) && seen.insert(b.id));
        for id in 1..=BUTTON_COUNT {
            if !seen.contains(&id) {
                self.buttons.push(ButtonConfig::new(id));
            }
        }
        self.buttons.sort_by_key(|b| b.id);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub pages: Vec<Page>,
    pub active_page_id: String,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        let page = Page::new("Page 1");
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            active_page_id: page.id.clone(),
            pages: vec![page],
        }
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.page(&self.active_page_id)
    }

    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn page_mut(&mut self, id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

pub const DEFAULT_BRIDGE_PORT: u16 = 9271;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Dark,
    Light,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub auto_start: bool,
    #[serde(default = "default_true")]
    pub minimize_to_tray: bool,
    #[serde(default = "default_theme")]
    pub theme: Theme,
    #[serde(default)]
    pub bridge_enabled: bool,
    #[serde(default = "default_bridge_port")]
    pub bridge_port: u16,
    #[serde(default = "default_true")]
    pub keyboard_mode_enabled: bool,
    #[serde(default)]
    pub active_profile_id: String,
}

fn default_true() -> bool {
    true
}

fn default_theme() -> Theme {
    Theme::Dark
}

fn default_bridge_port() -> u16 {
    DEFAULT_BRIDGE_PORT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_start: false,
            minimize_to_tray: true,
            theme: default_theme(),
            bridge_enabled: false,
            bridge_port: DEFAULT_BRIDGE_PORT,
            keyboard_mode_enabled: true,
            active_profile_id: String::new(),
        }
    }
}
