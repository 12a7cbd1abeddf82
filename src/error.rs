use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribbleError {
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Invalid priority: {0}. Valid priorities: low, medium, high")]
    InvalidPriority(String),

    #[error("Invalid view: {0}. Valid views: all, drafts, favourites")]
    InvalidView(String),

    #[error("Use --force to delete in non-interactive mode")]
    ConfirmationRequired,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ScribbleError>;
