//! Interactive shell for a notas session.
//!
//! The shell reads lines from stdin and feeds them through the grammar of
//! the active screen. Browsing works on the whole collection; the editor
//! screen works on a draft of the staged note until it is saved or
//! discarded.

use std::{
    fs::read_to_string,
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
};

use clap::Parser;
use console::style;
use log::debug;

use crate::{
    edit_draft_externally, filter_notes, preview, search_ranked, style_from_arg, tokenize,
    BrowseCli, BrowseCommand, EditorCli, EditorCommand, Note, NoteDraft, NoteStyle, NotasError,
    Result, Session,
};

/// What a dispatched command asks the input loop to do next.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Shell state: the session plus the open draft while the editor screen
/// is active.
pub struct App {
    /// The running session
    session: Session,

    /// Draft of the staged note, present while the editor screen is open
    draft: Option<NoteDraft>,
}

impl App {
    /// Creates the shell around a session that has not been opened yet.
    pub fn new(session: Session) -> Self {
        Self {
            session,
            draft: None,
        }
    }

    /// Runs the interactive loop until `quit` or end of input, then closes
    /// the session. Closing drains queued prints and discards the notes.
    pub async fn run(&mut self) -> Result<()> {
        self.session.open()?;
        println!("notas session started. Notes live until you quit; type 'help' for commands.");

        let input = stdin();
        let mut line = String::new();

        loop {
            self.show_prompt()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                // End of input behaves like quit.
                println!();
                break;
            }

            match self.dispatch_line(line.trim()).await {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => eprintln!("{}", style(format!("error: {}", e)).red()),
            }
        }

        self.session.close().await
    }

    fn show_prompt(&self) -> Result<()> {
        if self.draft.is_some() {
            let id = self
                .session
                .store()
                .current()
                .map(|note| note.id.clone())
                .unwrap_or_default();
            print!("{} ", style(format!("edit:{}>", id)).cyan());
        } else {
            print!("{} ", style("notas>").bold());
        }
        stdout().flush()?;

        Ok(())
    }

    /// Parses one line against the grammar of the active screen and runs
    /// the command.
    async fn dispatch_line(&mut self, line: &str) -> Result<Flow> {
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        debug!("Dispatching input: {}", line);
        let tokens = tokenize(line)?;
        if tokens.is_empty() {
            return Ok(Flow::Continue);
        }

        if self.draft.is_some() {
            match EditorCli::try_parse_from(tokens.iter().map(String::as_str)) {
                Ok(cli) => self.run_editor_command(cli.command).await,
                Err(e) => {
                    // clap renders its own help and usage output.
                    print!("{}", e);
                    Ok(Flow::Continue)
                }
            }
        } else {
            match BrowseCli::try_parse_from(tokens.iter().map(String::as_str)) {
                Ok(cli) => self.run_browse_command(cli.command).await,
                Err(e) => {
                    print!("{}", e);
                    Ok(Flow::Continue)
                }
            }
        }
    }

    async fn run_browse_command(&mut self, command: BrowseCommand) -> Result<Flow> {
        match command {
            BrowseCommand::List { query, limit, json } => {
                self.handle_list(query.as_deref().unwrap_or(""), limit, json)?;
            }

            BrowseCommand::Search { query, limit, json } => {
                self.handle_search(&query, limit, json)?;
            }

            BrowseCommand::View { id, json } => self.handle_view(&id, json)?,

            BrowseCommand::New {
                title,
                content,
                file,
                style,
            } => self.handle_new(title, content, file, style.as_deref())?,

            BrowseCommand::Edit { id } => self.handle_edit(&id)?,

            BrowseCommand::Favorite { id } => self.handle_favorite(&id),

            BrowseCommand::Delete { id, force } => self.handle_delete(&id, force)?,

            BrowseCommand::Print { id } => {
                self.session.print_note(&id).await?;
                println!("Note {} queued for printing.", id);
            }

            BrowseCommand::Status => self.handle_status(),

            BrowseCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    /// List notes matching the filter, favorites first
    fn handle_list(&self, query: &str, limit: Option<usize>, json: bool) -> Result<()> {
        let mut notes = filter_notes(self.session.store().notes(), query);

        if notes.is_empty() {
            if query.is_empty() {
                println!("No notes yet. Use 'new' to create one.");
            } else {
                println!("No notes match \"{}\".", query);
            }
            return Ok(());
        }

        let total = notes.len();
        if let Some(limit) = limit {
            notes.truncate(limit);
        }

        if json {
            self.display_notes_json(&notes)?;
        } else {
            self.display_notes_text(&notes)?;
        }

        if notes.len() < total {
            println!("\nShowing {} of {} notes.", notes.len(), total);
        } else {
            println!(
                "\n{} note{}",
                total,
                if total == 1 { "" } else { "s" }
            );
        }

        Ok(())
    }

    /// Rank notes against the query and display the best matches
    fn handle_search(&self, query: &str, limit: usize, json: bool) -> Result<()> {
        let mut results = search_ranked(self.session.store().notes(), query);

        if limit > 0 && results.len() > limit {
            results.truncate(limit);
        }

        if results.is_empty() {
            println!("No notes found matching query: \"{}\"", query);
            return Ok(());
        }

        if json {
            self.display_notes_json(&results)?;
        } else {
            self.display_notes_text(&results)?;
        }

        println!(
            "\nFound {} matching note{}.",
            results.len(),
            if results.len() == 1 { "" } else { "s" }
        );

        Ok(())
    }

    /// Show one note in full
    fn handle_view(&self, id: &str, json: bool) -> Result<()> {
        let note = match self.session.store().get(id) {
            Some(note) => note,
            None => return Err(NotasError::NoteNotFound { id: id.to_string() }),
        };

        if json {
            println!("{}", serde_json::to_string_pretty(note)?);
            return Ok(());
        }

        println!(
            "ID: {} | Created: {}{}",
            note.id,
            note.created_at.format("%Y-%m-%d %H:%M:%S"),
            if note.favorite { " | favorite" } else { "" }
        );
        println!("Title: {}", style(&note.title).bold());
        if let Some(s) = note.style {
            println!("Style: {}", s.as_str());
        }
        if !note.content.is_empty() {
            println!("\n{}", apply_note_style(&note.content, note.style));
        }

        Ok(())
    }

    /// Create a fresh note and open the editor screen on it
    fn handle_new(
        &mut self,
        title: Option<String>,
        content: Option<String>,
        file: Option<PathBuf>,
        style_arg: Option<&str>,
    ) -> Result<()> {
        // Resolve the prefills before staging anything, so a bad file path
        // leaves the session untouched.
        let prefill = match (content, file) {
            (Some(content), _) => Some(content),
            (None, Some(path)) => Some(read_content_from_file(&path)?),
            (None, None) => None,
        };

        let note = self.session.stage_new_note();
        let mut draft = NoteDraft::from_note(&note);
        if let Some(title) = title {
            draft.title = title;
        }
        if let Some(content) = prefill {
            draft.content = content;
        }
        if let Some(arg) = style_arg {
            draft.style = style_from_arg(arg);
        }

        println!(
            "Editing new note {} (save to keep it, cancel to drop it).",
            note.id
        );
        self.draft = Some(draft);

        Ok(())
    }

    /// Open the editor screen on an existing note
    fn handle_edit(&mut self, id: &str) -> Result<()> {
        let note = self.session.stage_note(id)?;
        println!("Editing note {} ({}).", note.id, note.title);
        self.draft = Some(NoteDraft::from_note(&note));

        Ok(())
    }

    /// Toggle the favorite flag on a note
    fn handle_favorite(&mut self, id: &str) {
        match self.session.store_mut().toggle_favorite(id) {
            Some(marked) => println!(
                "Note {} {} favorites.",
                id,
                if marked { "added to" } else { "removed from" }
            ),
            None => println!("No note with id {}.", id),
        }
    }

    /// Delete a note, prompting for confirmation unless forced
    fn handle_delete(&mut self, id: &str, force: bool) -> Result<()> {
        // Removal is total: deleting an unknown id just reports.
        let note = match self.session.store().get(id) {
            Some(note) => note.clone(),
            None => {
                println!("No note with id {}.", id);
                return Ok(());
            }
        };

        if !force {
            println!("You are about to delete the following note:");
            println!("ID:      {}", note.id);
            println!("Title:   {}", note.title);
            println!("Created: {}", note.created_at.format("%Y-%m-%d %H:%M:%S"));

            if !note.content.is_empty() {
                println!(
                    "\n{}",
                    preview(&note.content, self.session.config().preview_width)
                );
            }

            println!("\nThis action cannot be undone!");
            print!("Are you sure you want to delete this note? [y/N]: ");
            stdout().flush()?;

            let mut input = String::new();
            stdin().read_line(&mut input)?;

            let input = input.trim().to_lowercase();
            if input != "y" && input != "yes" {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        self.session.store_mut().remove(id);
        println!("Note '{}' ({}) deleted.", note.title, note.id);

        Ok(())
    }

    /// Report the print spooler status
    fn handle_status(&self) {
        let status = self.session.print_status();

        println!("Print spooler running: {}", status.is_running);
        println!("Documents spooled:     {}", status.jobs_completed);
        println!("Failed jobs:           {}", status.jobs_failed);
        if let Some(time) = status.last_print_time {
            println!("Last print:            {}", time.format("%Y-%m-%d %H:%M:%S"));
        }
        if let Some(path) = &status.last_document {
            println!("Last document:         {}", path.display());
        }
    }

    async fn run_editor_command(&mut self, command: EditorCommand) -> Result<Flow> {
        match command {
            EditorCommand::Title { title } => {
                if let Some(draft) = self.draft.as_mut() {
                    draft.title = title.join(" ");
                    println!("Title set.");
                }
            }

            EditorCommand::Body { text } => {
                if let Some(draft) = self.draft.as_mut() {
                    draft.content = text.join(" ");
                    if draft.content.is_empty() {
                        println!("Content cleared.");
                    } else {
                        println!("Content replaced.");
                    }
                }
            }

            EditorCommand::Append { text } => {
                if let Some(draft) = self.draft.as_mut() {
                    if !draft.content.is_empty() {
                        draft.content.push('\n');
                    }
                    draft.content.push_str(&text.join(" "));
                    println!("Line appended.");
                }
            }

            EditorCommand::File { path } => {
                let content = read_content_from_file(&path)?;
                if let Some(draft) = self.draft.as_mut() {
                    draft.content = content;
                    println!("Content loaded from {}.", path.display());
                }
            }

            EditorCommand::Style { style: arg } => {
                if let Some(draft) = self.draft.as_mut() {
                    match style_from_arg(&arg) {
                        Some(chosen) => draft.toggle_style(chosen),
                        None => draft.style = None,
                    }
                    match draft.style {
                        Some(s) => println!("Style is now {}.", s.as_str()),
                        None => println!("Style cleared."),
                    }
                }
            }

            EditorCommand::Edit => {
                let editor_cmd = self.session.config().get_editor_command();
                if let Some(draft) = self.draft.as_mut() {
                    edit_draft_externally(draft, &editor_cmd)?;
                    println!("Draft updated from editor.");
                }
            }

            EditorCommand::Show => {
                if let Some(draft) = self.draft.as_ref() {
                    show_draft(draft);
                }
            }

            EditorCommand::Print => {
                // Prints the staged note as last saved; the open draft is
                // not part of the document.
                self.session.print_staged().await?;
                println!("Staged note queued for printing.");
            }

            EditorCommand::Save => {
                if let Some(draft) = self.draft.take() {
                    self.commit_draft(draft)?;
                }
            }

            EditorCommand::Cancel => {
                self.draft = None;
                self.session.store_mut().set_current(None);
                println!("Draft discarded.");
            }

            EditorCommand::Quit => {
                self.draft = None;
                self.session.store_mut().set_current(None);
                println!("Draft discarded.");
                return Ok(Flow::Quit);
            }
        }

        Ok(Flow::Continue)
    }

    /// Commit the draft: identity comes from the staged note, text from
    /// the draft, and the staging slot is cleared.
    fn commit_draft(&mut self, draft: NoteDraft) -> Result<()> {
        let staged = match self.session.store().current() {
            Some(note) => note.clone(),
            None => {
                return Err(NotasError::ApplicationError {
                    message: "No note staged to save".to_string(),
                })
            }
        };

        let note = draft.into_note(&staged);
        let id = note.id.clone();
        let store = self.session.store_mut();
        store.upsert(note);
        store.set_current(None);

        println!("Note {} saved.", id);
        Ok(())
    }

    /// Display notes as a brief listing
    fn display_notes_text(&self, notes: &[&Note]) -> Result<()> {
        // Use terminal width for formatting if available
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        let preview_width = self.session.config().preview_width.min(term_width);

        for (i, note) in notes.iter().enumerate() {
            // Add separator between notes (except before the first)
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }

            let marker = if note.favorite {
                style("*").yellow().to_string()
            } else {
                " ".to_string()
            };

            println!(
                "{} [{}] {}  {}",
                marker,
                note.id,
                style(&note.title).bold(),
                note.created_at.format("%Y-%m-%d %H:%M")
            );

            let line = preview(&note.content, preview_width);
            if !line.is_empty() {
                println!("  {}", apply_note_style(&line, note.style));
            }
        }

        Ok(())
    }

    /// Display the brief JSON projection of the notes. `view` prints the
    /// full record on its own.
    fn display_notes_json(&self, notes: &[&Note]) -> Result<()> {
        let brief: Vec<serde_json::Value> = notes
            .iter()
            .map(|note| {
                serde_json::json!({
                    "id": note.id,
                    "title": note.title,
                    "created_at": note.created_at,
                    "favorite": note.favorite,
                    "style": note.style,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&brief)?);

        Ok(())
    }
}

/// Show the draft as the editor screen sees it
fn show_draft(draft: &NoteDraft) {
    println!("Title: {}", style(&draft.title).bold());
    match draft.style {
        Some(s) => println!("Style: {}", s.as_str()),
        None => println!("Style: none"),
    }
    if draft.content.is_empty() {
        println!("\n(no content yet)");
    } else {
        println!("\n{}", apply_note_style(&draft.content, draft.style));
    }
}

/// Renders text with the note's stored decoration.
fn apply_note_style(text: &str, note_style: Option<NoteStyle>) -> String {
    match note_style {
        Some(NoteStyle::Bold) => style(text).bold().to_string(),
        Some(NoteStyle::Italic) => style(text).italic().to_string(),
        Some(NoteStyle::Strikethrough) => style(text).strikethrough().to_string(),
        None => text.to_string(),
    }
}

/// Reads draft content from a file path.
fn read_content_from_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(NotasError::ApplicationError {
            message: format!("File not found: {}", path.display()),
        });
    }

    if !path.is_file() {
        return Err(NotasError::ApplicationError {
            message: format!("Not a file: {}", path.display()),
        });
    }

    read_to_string(path).map_err(NotasError::Io)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::Config;

    fn open_app(dir: &TempDir) -> App {
        let config = Config {
            spool_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let mut session = Session::new(config);
        session.open().unwrap();
        App::new(session)
    }

    #[tokio::test]
    async fn new_edit_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = open_app(&dir);

        app.run_browse_command(BrowseCommand::New {
            title: None,
            content: None,
            file: None,
            style: None,
        })
        .await
        .unwrap();
        assert!(app.draft.is_some());

        app.run_editor_command(EditorCommand::Title {
            title: vec!["Lista".to_string(), "de".to_string(), "compras".to_string()],
        })
        .await
        .unwrap();
        app.run_editor_command(EditorCommand::Append {
            text: vec!["pan".to_string()],
        })
        .await
        .unwrap();
        app.run_editor_command(EditorCommand::Save).await.unwrap();

        assert!(app.draft.is_none());
        assert!(app.session.store().current().is_none());

        let note = app.session.store().get("1").unwrap();
        assert_eq!(note.title, "Lista de compras");
        assert_eq!(note.content, "pan");

        app.session.close().await.unwrap();
    }

    #[tokio::test]
    async fn cancel_drops_a_note_that_was_never_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = open_app(&dir);

        app.run_browse_command(BrowseCommand::New {
            title: None,
            content: None,
            file: None,
            style: None,
        })
        .await
        .unwrap();
        app.run_editor_command(EditorCommand::Cancel).await.unwrap();

        assert!(app.draft.is_none());
        assert!(app.session.store().is_empty());
        assert!(app.session.store().current().is_none());

        app.session.close().await.unwrap();
    }

    #[tokio::test]
    async fn force_delete_skips_the_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = open_app(&dir);

        app.run_browse_command(BrowseCommand::New {
            title: None,
            content: None,
            file: None,
            style: None,
        })
        .await
        .unwrap();
        app.run_editor_command(EditorCommand::Save).await.unwrap();
        assert_eq!(app.session.store().len(), 1);

        app.run_browse_command(BrowseCommand::Delete {
            id: "1".to_string(),
            force: true,
        })
        .await
        .unwrap();
        assert!(app.session.store().is_empty());

        // Deleting again reports instead of failing.
        app.run_browse_command(BrowseCommand::Delete {
            id: "1".to_string(),
            force: true,
        })
        .await
        .unwrap();

        app.session.close().await.unwrap();
    }

    #[tokio::test]
    async fn editing_preserves_creation_date_and_favorite() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = open_app(&dir);

        app.run_browse_command(BrowseCommand::New {
            title: Some("Ideas".to_string()),
            content: None,
            file: None,
            style: None,
        })
        .await
        .unwrap();
        app.run_editor_command(EditorCommand::Save).await.unwrap();

        app.run_browse_command(BrowseCommand::Favorite {
            id: "1".to_string(),
        })
        .await
        .unwrap();
        let created_at = app.session.store().get("1").unwrap().created_at;

        app.run_browse_command(BrowseCommand::Edit {
            id: "1".to_string(),
        })
        .await
        .unwrap();
        app.run_editor_command(EditorCommand::Title {
            title: vec!["Mejores".to_string(), "ideas".to_string()],
        })
        .await
        .unwrap();
        app.run_editor_command(EditorCommand::Save).await.unwrap();

        let note = app.session.store().get("1").unwrap();
        assert_eq!(note.title, "Mejores ideas");
        assert_eq!(note.created_at, created_at);
        assert!(note.favorite);

        app.session.close().await.unwrap();
    }

    #[tokio::test]
    async fn quit_command_ends_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = open_app(&dir);

        let flow = app.dispatch_line("quit").await.unwrap();
        assert_eq!(flow, Flow::Quit);

        app.session.close().await.unwrap();
    }
}
