use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("unknown action kind")]
    UnknownActionKind(String),

    #[error("missing parameter '{0}'")]
    MissingParam(&'static str),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: &'static str, reason: String },

    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error("page not found: {0}")]
    PageNotFound(String),

    #[error("invalid button id {0}: must be between 1 and 18")]
    InvalidButtonId(u32),

    #[error("cannot delete the last page of profile '{0}'")]
    LastPage(String),

    #[error("cannot delete the last profile")]
    LastProfile,

    #[error("home directory not found: set HOME or DECKFORGE_HOME")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeckError>;
