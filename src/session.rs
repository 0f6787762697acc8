//! Session lifecycle.
//!
//! A session owns the note store, the configuration, and the print
//! spooler. Notes live in memory for exactly as long as the session is
//! open; only printed documents and the config file ever touch disk.

use log::{debug, info};

use crate::{
    Config, Note, NoteStore, NotasError, PrintJob, PrintSpooler, PrintSpoolerStatus, Result,
    DEFAULT_TITLE,
};

/// A running notas session.
pub struct Session {
    /// Application configuration
    config: Config,

    /// The in-memory note collection
    store: NoteStore,

    /// Background print spooler
    spooler: PrintSpooler,

    /// Flag indicating the session has been opened
    initialized: bool,
}

impl Session {
    /// Creates a session shell. `open` must be called before the store
    /// can be touched.
    pub fn new(config: Config) -> Self {
        let spooler = PrintSpooler::new(config.spool_dir.clone(), config.print_command.clone());

        Self {
            config,
            store: NoteStore::new(),
            spooler,
            initialized: false,
        }
    }

    /// Opens the session: starts the print spooler and unlocks the store.
    pub fn open(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        info!(
            "Opening session, spooling prints to {}",
            self.config.spool_dir.display()
        );
        self.spooler.start()?;
        self.initialized = true;

        Ok(())
    }

    /// Closes the session. Queued prints are drained; the notes are gone.
    pub async fn close(&mut self) -> Result<()> {
        if !self.initialized {
            debug!("Session never opened, nothing to close");
            return Ok(());
        }

        info!("Closing session, discarding {} notes", self.store.len());
        self.initialized = false;
        self.spooler.stop().await
    }

    /// The note store.
    ///
    /// # Panics
    ///
    /// Panics if the session was never opened. Reaching the store outside
    /// the session lifecycle is a programming error, not a runtime
    /// condition to recover from.
    pub fn store(&self) -> &NoteStore {
        assert!(
            self.initialized,
            "session is not open: call Session::open first"
        );
        &self.store
    }

    /// Mutable access to the note store. Panics like [`Session::store`].
    pub fn store_mut(&mut self) -> &mut NoteStore {
        assert!(
            self.initialized,
            "session is not open: call Session::open first"
        );
        &mut self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stages a fresh note with the default title and a newly minted id.
    /// The note enters the collection only when a draft of it is saved.
    pub fn stage_new_note(&mut self) -> Note {
        let id = self.store_mut().mint_id();
        let note = Note::new(id, DEFAULT_TITLE.to_string(), String::new());
        self.store_mut().set_current(Some(note.clone()));
        note
    }

    /// Stages an existing note for editing. Unknown ids are an error.
    pub fn stage_note(&mut self, id: &str) -> Result<Note> {
        let note = match self.store().get(id) {
            Some(note) => note.clone(),
            None => return Err(NotasError::NoteNotFound { id: id.to_string() }),
        };

        self.store_mut().set_current(Some(note.clone()));
        Ok(note)
    }

    /// Queues the staged note for printing. The call returns as soon as
    /// the job is handed to the spooler.
    pub async fn print_staged(&self) -> Result<()> {
        let job = match self.store().current() {
            Some(note) => PrintJob::for_note(note),
            None => {
                return Err(NotasError::ApplicationError {
                    message: "No note is staged for printing".to_string(),
                })
            }
        };

        self.spooler.submit(job).await
    }

    /// Queues a stored note for printing by id.
    pub async fn print_note(&self, id: &str) -> Result<()> {
        let job = match self.store().get(id) {
            Some(note) => PrintJob::for_note(note),
            None => return Err(NotasError::NoteNotFound { id: id.to_string() }),
        };

        self.spooler.submit(job).await
    }

    /// Print spooler status snapshot.
    pub fn print_status(&self) -> PrintSpoolerStatus {
        self.spooler.status()
    }
}
