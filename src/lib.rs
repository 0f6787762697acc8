//! In-memory note-taking application library
//!
//! This library provides functionality for creating, editing, listing, and
//! printing session-scoped notes with Markdown content. Notes live for the
//! lifetime of a session and are gone when it closes.

mod cli;
mod config;
mod editor;
mod errors;
mod listing;
mod note;
mod print;
mod session;
mod store;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use editor::*;
pub use errors::*;
pub use listing::*;
pub use note::*;
pub use print::*;
pub use session::*;
pub use store::*;
