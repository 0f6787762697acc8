//! Draft handling for the editor screen.
//!
//! A draft is the working copy of the staged note. Identity fields (id,
//! creation time, favorite flag) stay behind on the staged note and are
//! reattached when the draft is committed, so editing can never change
//! them.

use std::{
    fs::{read_to_string, OpenOptions},
    io::Write,
    path::Path,
    process::Command,
};

use log::info;
use shell_words::split;
use tempfile::Builder;

use crate::{Note, NoteStyle, NotasError, Result};

/// Working copy of the staged note while the editor screen is open.
#[derive(Debug, Clone)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub style: Option<NoteStyle>,
}

impl NoteDraft {
    /// Starts a draft from the staged note.
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            style: note.style,
        }
    }

    /// Flips a style on or off: applying the active style clears it,
    /// anything else replaces it.
    pub fn toggle_style(&mut self, style: NoteStyle) {
        if self.style == Some(style) {
            self.style = None;
        } else {
            self.style = Some(style);
        }
    }

    /// Builds the note to store, taking identity from the staged note and
    /// text from the draft.
    pub fn into_note(self, staged: &Note) -> Note {
        Note {
            id: staged.id.clone(),
            title: self.title,
            content: self.content,
            created_at: staged.created_at,
            favorite: staged.favorite,
            style: self.style,
        }
    }
}

/// Writes the draft to a temp file, hands it to the editor command, and
/// reads the result back into the draft.
pub fn edit_draft_externally(draft: &mut NoteDraft, editor_cmd: &str) -> Result<()> {
    // Create a temporary file with .md extension
    let temp_file = Builder::new().suffix(".md").tempfile()?;
    let temp_path = temp_file.path().to_path_buf();

    write_editor_template(&temp_path, draft)?;

    info!("Opening editor to edit the note. Save and exit when done...");
    launch_editor(editor_cmd, &temp_path)?;

    let buffer = read_to_string(&temp_path)?;
    apply_editor_content(draft, &buffer);
    Ok(())
}

fn write_editor_template(path: &Path, draft: &NoteDraft) -> Result<()> {
    let mut file = OpenOptions::new().write(true).open(path)?;

    // Write template with helpful comments
    writeln!(file, "# {}", draft.title)?;
    writeln!(file)?;
    writeln!(file, "<!-- ")?;
    writeln!(file, "Write the note content below. The first `# ` line is the title.")?;
    writeln!(file, "Comment blocks like this one will be ignored.")?;
    writeln!(file, "Save and exit the editor when you're done.")?;
    writeln!(file, "-->")?;
    writeln!(file)?;

    if !draft.content.is_empty() {
        writeln!(file, "{}", draft.content)?;
    }

    Ok(())
}

fn launch_editor(editor_cmd: &str, file_path: &Path) -> Result<()> {
    // Convert file path to string once
    let path_str = file_path.to_string_lossy();

    // Handle shell-like command parsing
    let args = split(editor_cmd).map_err(|e| NotasError::EditorError {
        message: format!("Failed to parse editor command: {}", e),
    })?;

    if args.is_empty() {
        return Err(NotasError::EditorError {
            message: "Empty editor command".to_string(),
        });
    }

    // First word is the program name, rest are arguments
    let mut command = Command::new(&args[0]);
    if args.len() > 1 {
        command.args(&args[1..]);
    }
    command.arg(path_str.as_ref());

    let status = command.status()?;
    if !status.success() {
        return Err(NotasError::EditorError {
            message: "Editor exited with non-zero status".to_string(),
        });
    }

    Ok(())
}

/// Splits an edited buffer back into the draft. The first `# ` heading
/// becomes the title; HTML comment blocks are dropped; the rest is the
/// content.
pub fn apply_editor_content(draft: &mut NoteDraft, buffer: &str) {
    let mut title = None;
    let mut body_lines: Vec<&str> = Vec::new();
    let mut in_comment = false;

    for line in buffer.lines() {
        let trimmed = line.trim();

        if in_comment {
            if trimmed.ends_with("-->") {
                in_comment = false;
            }
            continue;
        }

        if trimmed.starts_with("<!--") {
            if !trimmed.ends_with("-->") {
                in_comment = true;
            }
            continue;
        }

        if title.is_none() && trimmed.starts_with("# ") {
            title = Some(trimmed[2..].trim().to_string());
            continue;
        }

        body_lines.push(line);
    }

    if let Some(title) = title {
        if !title.is_empty() {
            draft.title = title;
        }
    }

    draft.content = body_lines.join("\n").trim_matches('\n').to_string();
}
