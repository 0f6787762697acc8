//! Command grammars for the interactive shell.
//!
//! The shell has two screens, each with its own grammar: browsing the
//! collection and editing one note. Both grammars are multicall parsers,
//! so a line of input is matched directly against the command names.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{NoteStyle, NotasError, Result};

/// Startup arguments for the interactive session
#[derive(Parser)]
#[clap(
    name = "notas",
    version,
    about = "Interactive note-taking session with background printing"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Directory where rendered print documents are written
    #[clap(long, value_parser)]
    pub spool_dir: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,
}

/// Parser for one line of input while browsing the collection
#[derive(Parser)]
#[clap(multicall = true, name = "browse")]
pub struct BrowseCli {
    #[clap(subcommand)]
    pub command: BrowseCommand,
}

/// Commands available while browsing the collection
#[derive(Debug, Subcommand)]
pub enum BrowseCommand {
    /// List notes, favorites first, with an optional substring filter
    #[clap(alias = "ls")]
    List {
        /// Show only notes whose title or content contains this text
        query: Option<String>,

        /// Limit the number of notes shown
        #[clap(short = 'n', long)]
        limit: Option<usize>,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Rank notes against a query with fuzzy matching
    Search {
        /// Search query text
        query: String,

        /// Limit the number of search results
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show a note in full
    View {
        /// ID of the note to view
        id: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Create a note and open it in the editor screen
    New {
        /// Title for the note (defaults to "Nueva nota")
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// Content of the note, can be markdown formatted
        #[clap(short, long)]
        content: Option<String>,

        /// Path to a file containing the note's content
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// Display style for the note
        #[clap(short, long, value_parser = ["bold", "italic", "strikethrough", "none"])]
        style: Option<String>,
    },

    /// Open an existing note in the editor screen
    Edit {
        /// ID of the note to edit
        id: String,
    },

    /// Toggle a note's favorite flag
    #[clap(alias = "fav")]
    Favorite {
        /// ID of the note to toggle
        id: String,
    },

    /// Delete a note
    #[clap(alias = "rm")]
    Delete {
        /// ID of the note to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Render a note to HTML and queue it for printing
    Print {
        /// ID of the note to print
        id: String,
    },

    /// Show print spooler status
    Status,

    /// End the session (notes are discarded)
    #[clap(alias = "exit")]
    Quit,
}

/// Parser for one line of input while the editor screen is open
#[derive(Parser)]
#[clap(multicall = true, name = "editor")]
pub struct EditorCli {
    #[clap(subcommand)]
    pub command: EditorCommand,
}

/// Commands available in the editor screen
#[derive(Debug, Subcommand)]
pub enum EditorCommand {
    /// Replace the draft title
    Title {
        /// The new title
        #[clap(required = true)]
        title: Vec<String>,
    },

    /// Replace the draft content (no text clears it)
    Body {
        /// The new content
        text: Vec<String>,
    },

    /// Append a line to the draft content
    #[clap(alias = "add")]
    Append {
        /// The line to append
        #[clap(required = true)]
        text: Vec<String>,
    },

    /// Load the draft content from a file
    File {
        /// Path to the file to load
        path: PathBuf,
    },

    /// Toggle bold, italic, or strikethrough on the note
    Style {
        /// The style to toggle (repeating the active one clears it)
        #[clap(value_parser = ["bold", "italic", "strikethrough", "none"])]
        style: String,
    },

    /// Open the draft in the configured editor and read it back
    Edit,

    /// Show the draft as it stands
    Show,

    /// Queue the staged note for printing (unsaved changes stay out)
    Print,

    /// Save the draft and return to browsing
    Save,

    /// Discard the draft and return to browsing
    #[clap(alias = "discard")]
    Cancel,

    /// Discard the draft and end the session
    Quit,
}

/// Maps a `style` argument to the note style it selects, `None` for "none".
pub fn style_from_arg(arg: &str) -> Option<NoteStyle> {
    match arg {
        "bold" => Some(NoteStyle::Bold),
        "italic" => Some(NoteStyle::Italic),
        "strikethrough" => Some(NoteStyle::Strikethrough),
        _ => None,
    }
}

/// Splits one line of shell-style input into tokens.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    shell_words::split(line).map_err(|e| NotasError::CommandError {
        message: format!("Unbalanced quoting: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn browse_grammar_parses_view_flags() {
        let cli = BrowseCli::try_parse_from(["view", "1", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            BrowseCommand::View { ref id, json: true } if id == "1"
        ));
    }

    #[test]
    fn delete_accepts_the_rm_alias() {
        let cli = BrowseCli::try_parse_from(["rm", "2", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            BrowseCommand::Delete { ref id, force: true } if id == "2"
        ));
    }

    #[test]
    fn favorite_accepts_the_fav_alias() {
        let cli = BrowseCli::try_parse_from(["fav", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            BrowseCommand::Favorite { ref id } if id == "3"
        ));
    }

    #[test]
    fn new_accepts_prefill_flags() {
        let cli =
            BrowseCli::try_parse_from(["new", "-T", "Lista", "-c", "pan", "-s", "bold"]).unwrap();
        match cli.command {
            BrowseCommand::New {
                title,
                content,
                file,
                style,
            } => {
                assert_eq!(title.as_deref(), Some("Lista"));
                assert_eq!(content.as_deref(), Some("pan"));
                assert_eq!(file, None);
                assert_eq!(style.as_deref(), Some("bold"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn new_rejects_unknown_styles() {
        assert!(BrowseCli::try_parse_from(["new", "-s", "underline"]).is_err());
    }

    #[test]
    fn editor_grammar_collects_multi_word_titles() {
        let cli = EditorCli::try_parse_from(["title", "Lista", "de", "compras"]).unwrap();
        match cli.command {
            EditorCommand::Title { title } => assert_eq!(title.join(" "), "Lista de compras"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn editor_title_requires_text() {
        assert!(EditorCli::try_parse_from(["title"]).is_err());
    }

    #[test]
    fn style_arguments_map_to_note_styles() {
        assert_eq!(style_from_arg("bold"), Some(NoteStyle::Bold));
        assert_eq!(style_from_arg("strikethrough"), Some(NoteStyle::Strikethrough));
        assert_eq!(style_from_arg("none"), None);
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert!(BrowseCli::try_parse_from(["frobnicate"]).is_err());
    }

    #[test]
    fn tokenize_honors_quoting() {
        let tokens = tokenize("title \"Lista de compras\"").unwrap();
        assert_eq!(tokens, ["title", "Lista de compras"]);

        assert!(tokenize("title \"sin cerrar").is_err());
    }
}
