pub mod action;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod paths;
pub mod platform;
pub mod runner;
pub mod store;
pub mod trigger;
pub mod types;

pub use dispatch::ActionExecutor;
pub use error::{DeckError, Result};
pub use platform::{CommandSpec, Platform, PlatformCommands};
pub use runner::{ProcessRunner, TokioRunner};
pub use store::{ConfigStore, DeckData, FileStore};
pub use trigger::TriggerResolver;
pub use types::{ActionDescriptor, ActionKind, ActionOutcome};
