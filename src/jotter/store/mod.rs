//! # Storage Layer
//!
//! Notes are persisted behind the [`DataStore`] trait so the session and the
//! commands never touch the filesystem directly.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production storage. The whole collection lives under
//!   one key, a JSON array in `notes.json`:
//!
//!   ```text
//!   <data dir>/
//!   ├── notes.json     # [{ "id", "content", "createdAt", "updatedAt" }, ...]
//!   └── config.json
//!   ```
//!
//! - [`memory::InMemoryStore`]: no persistence, used by tests.
//!
//! A save replaces the note with the same id or appends it. Order in the
//! stored array is insertion order; display order is computed by
//! [`crate::index`].

use crate::error::Result;
use crate::model::Note;
use uuid::Uuid;

pub mod fs;
pub mod memory;

/// Abstract interface for note storage.
pub trait DataStore {
    /// Save a note (create or update)
    fn save_note(&mut self, note: &Note) -> Result<()>;

    /// Get a note by ID
    fn get_note(&self, id: &Uuid) -> Result<Note>;

    /// List all notes
    fn list_notes(&self) -> Result<Vec<Note>>;

    /// Delete a note permanently
    fn delete_note(&mut self, id: &Uuid) -> Result<()>;
}

/// Lets a borrowed store back a [`crate::session::Session`] for the span of
/// one command.
impl<S: DataStore + ?Sized> DataStore for &mut S {
    fn save_note(&mut self, note: &Note) -> Result<()> {
        (**self).save_note(note)
    }

    fn get_note(&self, id: &Uuid) -> Result<Note> {
        (**self).get_note(id)
    }

    fn list_notes(&self) -> Result<Vec<Note>> {
        (**self).list_notes()
    }

    fn delete_note(&mut self, id: &Uuid) -> Result<()> {
        (**self).delete_note(id)
    }
}
