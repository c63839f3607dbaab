//! Veil Tab Management
//!
//! Each tab owns one rendering-engine instance. The manager routes engine
//! events into the history and favicon ledgers and tells the window shell
//! about changes to the active tab over a notification channel.

mod engine;
mod error;
mod manager;
mod tab;

pub use engine::{EngineEvent, EngineFactory, WebEngine};
pub use error::TabError;
pub use manager::{ShellNotice, TabManager, TabSettings};
pub use tab::{display_title, Tab, TabId};

pub type Result<T> = std::result::Result<T, TabError>;
