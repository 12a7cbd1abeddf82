pub mod api;
pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod logging;
pub mod storage;
pub mod view;

pub use api::NotesServer;
pub use config::Config;
pub use error::{Result, ScribbleError};
pub use storage::JsonStore;
