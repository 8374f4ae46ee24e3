use super::DataStore;
use crate::error::{JotterError, Result};
use crate::model::Note;
use uuid::Uuid;

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryStore {
    notes: Vec<Note>,
    fail_writes: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail, to exercise autosave error paths.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl DataStore for InMemoryStore {
    fn save_note(&mut self, note: &Note) -> Result<()> {
        if self.fail_writes {
            return Err(JotterError::Store("storage unavailable".to_string()));
        }
        match self.notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => *existing = note.clone(),
            None => self.notes.push(note.clone()),
        }
        Ok(())
    }

    fn get_note(&self, id: &Uuid) -> Result<Note> {
        self.notes
            .iter()
            .find(|n| n.id == *id)
            .cloned()
            .ok_or(JotterError::NoteNotFound(*id))
    }

    fn list_notes(&self) -> Result<Vec<Note>> {
        Ok(self.notes.clone())
    }

    fn delete_note(&mut self, id: &Uuid) -> Result<()> {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != *id);
        if self.notes.len() == before {
            return Err(JotterError::NoteNotFound(*id));
        }
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use chrono::{Duration, Utc};

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        /// Add `count` notes, each one minute newer than the last.
        pub fn with_notes(mut self, count: usize) -> Self {
            let base = Utc::now() - Duration::hours(1);
            for i in 0..count {
                let mut note = Note::new(format!("<h1>Note {}</h1><p>Content {}</p>", i + 1, i + 1));
                note.created_at = base + Duration::minutes(i as i64);
                note.updated_at = note.created_at;
                self.store.save_note(&note).unwrap();
            }
            self
        }

        pub fn with_note(mut self, html: &str) -> Self {
            self.store.save_note(&Note::new(html.to_string())).unwrap();
            self
        }
    }
}
