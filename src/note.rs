//! Core data structures for the notas application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title a note carries until the user renames it.
pub const DEFAULT_TITLE: &str = "Nueva nota";

/// Decoration applied to a note's content when it is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStyle {
    Bold,
    Italic,
    Strikethrough,
}

impl NoteStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteStyle::Bold => "bold",
            NoteStyle::Italic => "italic",
            NoteStyle::Strikethrough => "strikethrough",
        }
    }
}

/// Represents a single note in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for the note
    pub id: String,
    /// Note title
    pub title: String,
    /// Note content in Markdown format
    pub content: String,
    /// When the note was created
    pub created_at: DateTime<Utc>,
    /// Whether the note is pinned to the top of listings
    pub favorite: bool,
    /// Optional decoration for the whole note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<NoteStyle>,
}

impl Note {
    /// Creates a new note with the given id, stamped with the current time.
    pub fn new(id: String, title: String, content: String) -> Self {
        Note {
            id,
            title,
            content,
            created_at: Utc::now(),
            favorite: false,
            style: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn new_notes_start_plain() {
        let note = Note::new("1".to_string(), DEFAULT_TITLE.to_string(), String::new());
        assert_eq!(note.id, "1");
        assert_eq!(note.title, "Nueva nota");
        assert!(!note.favorite);
        assert_eq!(note.style, None);
    }

    #[test]
    fn styles_serialize_lowercase() {
        let json = serde_json::to_string(&NoteStyle::Strikethrough).unwrap();
        assert_eq!(json, "\"strikethrough\"");
    }
}
