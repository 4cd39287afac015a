//! Typed actions.
//!
//! An [`ActionDescriptor`](crate::types::ActionDescriptor) carries loosely
//! typed JSON params. Before anything is composed, the descriptor is turned
//! into an [`Action`]: one variant per composer input, with required params
//! checked and defaults filled in. Composers only ever see `Action`.

use crate::error::{DeckError, Result};
use crate::types::ActionKind;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    OpenUrl { url: String },
    OpenApp { target: String },
    CloseApp(AppTarget),
    WriteClipboard { text: String },
    RunScript { script: String, shell: Option<String> },
    Media(MediaKey),
    Screenshot(ScreenshotMode),
    Pointer(PointerAction),
    Window(WindowOp),
    Brightness { level: u8 },
    Hotkey { keys: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppTarget {
    Pid(u32),
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKey {
    PlayPause,
    Next,
    Previous,
    VolumeUp,
    VolumeDown,
    Mute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenshotMode {
    Full,
    Window,
    Region,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Click { x: i64, y: i64, button: u8 },
    Move { x: i64, y: i64 },
    Scroll { x: i64, y: i64, direction: ScrollDirection },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowOp {
    Minimize,
    Maximize,
    Focus { name: Option<String> },
    Resize { width: u32, height: u32 },
}

const DEFAULT_RESIZE_WIDTH: u32 = 800;
const DEFAULT_RESIZE_HEIGHT: u32 = 600;
const DEFAULT_BRIGHTNESS: u8 = 50;

impl Action {
    /// Validate `params` for `kind` and build the typed action.
    pub fn parse(kind: ActionKind, params: &Map<String, Value>) -> Result<Self> {
        let action = match kind {
            ActionKind::OpenUrl => Action::OpenUrl {
                url: required_str(params, "url")?,
            },
            ActionKind::OpenApp => {
                let target = match optional_str(params, "path")? {
                    Some(path) => path,
                    None => optional_str(params, "name")?.ok_or(DeckError::MissingParam("path"))?,
                };
                Action::OpenApp { target }
            }
            ActionKind::CloseApp => Action::CloseApp(app_target(params)?),
            ActionKind::InsertText | ActionKind::PasteClipboard => Action::WriteClipboard {
                text: required_str(params, "text")?,
            },
            ActionKind::RunScript => Action::RunScript {
                script: required_str(params, "script")?,
                shell: optional_str(params, "shell")?.filter(|s| !s.trim().is_empty()),
            },
            ActionKind::MediaPlayPause => Action::Media(MediaKey::PlayPause),
            ActionKind::MediaNext => Action::Media(MediaKey::Next),
            ActionKind::MediaPrevious => Action::Media(MediaKey::Previous),
            ActionKind::MediaVolumeUp => Action::Media(MediaKey::VolumeUp),
            ActionKind::MediaVolumeDown => Action::Media(MediaKey::VolumeDown),
            ActionKind::MediaMute => Action::Media(MediaKey::Mute),
            ActionKind::ScreenshotFull => Action::Screenshot(ScreenshotMode::Full),
            ActionKind::ScreenshotWindow => Action::Screenshot(ScreenshotMode::Window),
            ActionKind::ScreenshotRegion => Action::Screenshot(ScreenshotMode::Region),
            ActionKind::MouseClick => {
                let (x, y) = coordinates(params)?;
                Action::Pointer(PointerAction::Click {
                    x,
                    y,
                    button: mouse_button(params)?,
                })
            }
            ActionKind::MouseMove => {
                let (x, y) = coordinates(params)?;
                Action::Pointer(PointerAction::Move { x, y })
            }
            ActionKind::MouseScroll => {
                let (x, y) = coordinates(params)?;
                let direction = match optional_str(params, "direction")?.as_deref() {
                    Some("up") => ScrollDirection::Up,
                    _ => ScrollDirection::Down,
                };
                Action::Pointer(PointerAction::Scroll { x, y, direction })
            }
            ActionKind::WindowMinimize => Action::Window(WindowOp::Minimize),
            ActionKind::WindowMaximize => Action::Window(WindowOp::Maximize),
            ActionKind::WindowFocus => Action::Window(WindowOp::Focus {
                name: optional_str(params, "name")?.filter(|n| !n.is_empty()),
            }),
            ActionKind::WindowResize => Action::Window(WindowOp::Resize {
                width: dimension(params, "width", DEFAULT_RESIZE_WIDTH)?,
                height: dimension(params, "height", DEFAULT_RESIZE_HEIGHT)?,
            }),
            ActionKind::DisplayBrightness => {
                let level = optional_int(params, "level")?
                    .map(|l| l.clamp(0, 100) as u8)
                    .unwrap_or(DEFAULT_BRIGHTNESS);
                Action::Brightness { level }
            }
            ActionKind::Hotkey => Action::Hotkey {
                keys: hotkey_keys(params)?,
            },
        };
        Ok(action)
    }
}

// ---------------------------------------------------------------------------
// Param helpers
// ---------------------------------------------------------------------------

fn optional_str(params: &Map<String, Value>, name: &'static str) -> Result<Option<String>> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(DeckError::InvalidParam {
            name,
            reason: format!("expected a string, got {other}"),
        }),
    }
}

fn required_str(params: &Map<String, Value>, name: &'static str) -> Result<String> {
    optional_str(params, name)?.ok_or(DeckError::MissingParam(name))
}

/// Integers may arrive as JSON numbers (fractions are truncated) or numeric strings.
fn optional_int(params: &Map<String, Value>, name: &'static str) -> Result<Option<i64>> {
    let invalid = |reason: String| DeckError::InvalidParam { name, reason };
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| invalid(format!("{n} is out of range"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(format!("'{s}' is not an integer"))),
        Some(other) => Err(invalid(format!("expected an integer, got {other}"))),
    }
}

fn coordinates(params: &Map<String, Value>) -> Result<(i64, i64)> {
    Ok((
        optional_int(params, "x")?.unwrap_or(0),
        optional_int(params, "y")?.unwrap_or(0),
    ))
}

fn dimension(params: &Map<String, Value>, name: &'static str, default: u32) -> Result<u32> {
    match optional_int(params, name)? {
        None | Some(0) => Ok(default),
        Some(v) => u32::try_from(v).map_err(|_| DeckError::InvalidParam {
            name,
            reason: format!("{v} is not a valid size"),
        }),
    }
}

fn app_target(params: &Map<String, Value>) -> Result<AppTarget> {
    if let Some(pid) = optional_int(params, "pid")? {
        if pid > 0 {
            let pid = u32::try_from(pid).map_err(|_| DeckError::InvalidParam {
                name: "pid",
                reason: format!("{pid} is not a process id"),
            })?;
            return Ok(AppTarget::Pid(pid));
        }
    }
    match optional_str(params, "name")? {
        Some(name) if !name.is_empty() => Ok(AppTarget::Name(name)),
        _ => Err(DeckError::MissingParam("name")),
    }
}

fn mouse_button(params: &Map<String, Value>) -> Result<u8> {
    let invalid = |reason: String| DeckError::InvalidParam {
        name: "button",
        reason,
    };
    match params.get("button") {
        None | Some(Value::Null) => Ok(1),
        Some(Value::String(s)) if s == "left" => Ok(1),
        Some(Value::String(s)) if s == "middle" => Ok(2),
        Some(Value::String(s)) if s == "right" => Ok(3),
        Some(_) => match optional_int(params, "button")? {
            Some(0) | None => Ok(1),
            Some(b @ 1..=9) => Ok(b as u8),
            Some(b) => Err(invalid(format!("{b} is not a mouse button"))),
        },
    }
}

fn key_combo_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_+\-]+$").expect("valid regex"))
}

/// Split a key-combo string (`"ctrl+c ctrl+v"`) into validated combos.
fn hotkey_keys(params: &Map<String, Value>) -> Result<Vec<String>> {
    let Some(raw) = optional_str(params, "keys")? else {
        return Ok(Vec::new());
    };
    raw.split_whitespace()
        .map(|combo| {
            if key_combo_re().is_match(combo) {
                Ok(combo.to_string())
            } else {
                Err(DeckError::InvalidParam {
                    name: "keys",
                    reason: format!("'{combo}' is not a key combination"),
                })
            }
        })
        .collect()
}
