//! Print pipeline.
//!
//! Printing a note renders it into a standalone HTML document and hands
//! the job to a background spooler task. The session never waits for a
//! print: a job that fails is logged and counted, nothing else.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    process::Command,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use log::{debug, error, info, warn};
use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use tempfile::NamedTempFile;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{Note, NotasError, Result};

/// Styling for printed documents. Kept fixed so every note prints the
/// same way.
const DOCUMENT_CSS: &str =
    "body { font-family: Arial, sans-serif; } h1 { color: #333; } p { color: #666; }";

/// Renders a note into the print template. The title goes through the
/// HTML writer as a heading event so it is escaped; the content is
/// treated as Markdown.
pub fn render_document(title: &str, content: &str) -> String {
    let mut body = String::new();

    let heading = [
        Event::Start(Tag::Heading {
            level: HeadingLevel::H1,
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
        }),
        Event::Text(CowStr::Borrowed(title)),
        Event::End(TagEnd::Heading(HeadingLevel::H1)),
    ];
    html::push_html(&mut body, heading.into_iter());

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(content, options);
    html::push_html(&mut body, parser);

    format!(
        "<html><head><style>{}</style></head><body>{}</body></html>",
        DOCUMENT_CSS, body
    )
}

/// Snapshot of a note taken at submission time. The spooler renders from
/// this copy, so edits made after submission don't change an in-flight
/// job.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub note_id: String,
    pub title: String,
    pub content: String,
}

impl PrintJob {
    pub fn for_note(note: &Note) -> Self {
        Self {
            note_id: note.id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PrintSpoolerStatus {
    /// Whether the spooler task is running
    pub is_running: bool,
    /// Documents spooled this session
    pub jobs_completed: u64,
    /// Jobs that failed to render or dispatch
    pub jobs_failed: u64,
    /// The time the last document was written
    pub last_print_time: Option<chrono::DateTime<Utc>>,
    /// The path of the last document written
    pub last_document: Option<PathBuf>,
}

#[derive(Debug, Clone)]
enum SpoolerCommand {
    /// Render and spool one job
    Render(PrintJob),
    /// Stop the spooler task
    Stop,
}

pub struct PrintSpooler {
    /// Directory rendered documents land in
    spool_dir: PathBuf,

    /// Optional command a finished document is handed to
    print_command: Option<String>,

    /// Channel to send jobs to the spooler task
    command_tx: mpsc::Sender<SpoolerCommand>,

    /// Handle to the spooler task
    spooler_task: Option<JoinHandle<()>>,

    /// Status shared with the spooler task
    status: Arc<Mutex<PrintSpoolerStatus>>,
}

impl PrintSpooler {
    /// Creates a spooler that writes documents under `spool_dir`. The
    /// worker task is not started yet.
    pub fn new(spool_dir: PathBuf, print_command: Option<String>) -> Self {
        let (command_tx, _) = mpsc::channel(16);

        Self {
            spool_dir,
            print_command,
            command_tx,
            spooler_task: None,
            status: Arc::new(Mutex::new(PrintSpoolerStatus::default())),
        }
    }

    /// Starts the spooler task, creating the spool directory if needed.
    pub fn start(&mut self) -> Result<()> {
        if self.spooler_task.is_some() {
            debug!("Print spooler already running");
            return Ok(());
        }

        fs::create_dir_all(&self.spool_dir)?;

        let (command_tx, mut command_rx) = mpsc::channel(16);
        self.command_tx = command_tx;

        let spool_dir = self.spool_dir.clone();
        let print_command = self.print_command.clone();
        let status = Arc::clone(&self.status);

        let task = tokio::spawn(async move {
            info!("Print spooler started, spooling to {}", spool_dir.display());

            while let Some(command) = command_rx.recv().await {
                match command {
                    SpoolerCommand::Render(job) => {
                        let note_id = job.note_id.clone();
                        match spool_job(&spool_dir, print_command.as_deref(), job) {
                            Ok(path) => {
                                debug!("Printed note {} to {}", note_id, path.display());
                                if let Ok(mut status) = status.lock() {
                                    status.jobs_completed += 1;
                                    status.last_print_time = Some(Utc::now());
                                    status.last_document = Some(path);
                                }
                            }
                            Err(e) => {
                                // A failed print never disturbs the session.
                                warn!("Print of note {} failed: {}", note_id, e);
                                if let Ok(mut status) = status.lock() {
                                    status.jobs_failed += 1;
                                }
                            }
                        }
                    }
                    SpoolerCommand::Stop => {
                        info!("Print spooler stopping...");
                        break;
                    }
                }
            }
        });

        self.spooler_task = Some(task);
        if let Ok(mut status) = self.status.lock() {
            status.is_running = true;
        }

        Ok(())
    }

    /// Queues a job and returns without waiting for the render.
    pub async fn submit(&self, job: PrintJob) -> Result<()> {
        if self.spooler_task.is_none() {
            return Err(NotasError::PrintError {
                message: "Print spooler is not running".to_string(),
            });
        }

        self.command_tx
            .send(SpoolerCommand::Render(job))
            .await
            .map_err(|e| NotasError::PrintError {
                message: format!("Failed to queue print job: {}", e),
            })?;

        Ok(())
    }

    /// Stops the spooler after draining jobs already queued.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.spooler_task.take() {
            if let Err(e) = self.command_tx.send(SpoolerCommand::Stop).await {
                error!("Failed to send stop command to print spooler: {}", e);
            }

            if let Err(e) = task.await {
                let message = format!("Failed to stop print spooler: {}", e);
                error!("{}", message);
                return Err(NotasError::PrintError { message });
            }

            if let Ok(mut status) = self.status.lock() {
                status.is_running = false;
            }
            info!("Print spooler stopped");
        } else {
            debug!("Print spooler is not running");
        }

        Ok(())
    }

    /// Current status snapshot.
    pub fn status(&self) -> PrintSpoolerStatus {
        match self.status.lock() {
            Ok(status) => status.clone(),
            Err(e) => {
                error!("Failed to read spooler status: {}", e);
                PrintSpoolerStatus::default()
            }
        }
    }
}

/// Renders the job and writes it into the spool directory with an atomic
/// rename, then hands the path to the print command if one is set.
fn spool_job(spool_dir: &Path, print_command: Option<&str>, job: PrintJob) -> Result<PathBuf> {
    debug!("Rendering note {} for print", job.note_id);
    let document = render_document(&job.title, &job.content);

    let file_name = format!("{}_{}.html", job.note_id, Utc::now().timestamp());
    let document_path = spool_dir.join(file_name);

    // Write to a temporary file in the same directory, then move it into
    // place so a half-written document is never visible.
    let mut temp_file = NamedTempFile::new_in(spool_dir)?;
    temp_file.write_all(document.as_bytes())?;
    temp_file.flush()?;
    temp_file
        .persist(&document_path)
        .map_err(|e| NotasError::Io(e.error))?;

    debug!("Spooled document at {}", document_path.display());

    if let Some(command) = print_command {
        dispatch_document(command, &document_path)?;
    }

    Ok(document_path)
}

/// Hands a finished document to the configured print command.
fn dispatch_document(command: &str, document_path: &Path) -> Result<()> {
    let args = shell_words::split(command).map_err(|e| NotasError::PrintError {
        message: format!("Failed to parse print command: {}", e),
    })?;

    if args.is_empty() {
        return Err(NotasError::PrintError {
            message: "Empty print command".to_string(),
        });
    }

    let mut dispatch = Command::new(&args[0]);
    if args.len() > 1 {
        dispatch.args(&args[1..]);
    }
    dispatch.arg(document_path);

    // Blocks the spooler task, not the session. Queue-style commands like
    // `lp` return quickly.
    let status = dispatch.status()?;
    if !status.success() {
        return Err(NotasError::PrintError {
            message: format!("Print command '{}' exited with {}", args[0], status),
        });
    }

    info!("Document {} handed to '{}'", document_path.display(), command);
    Ok(())
}
