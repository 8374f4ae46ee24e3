use super::DataStore;
use crate::error::{JotterError, Result};
use crate::model::Note;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const NOTES_FILENAME: &str = "notes.json";

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn notes_file(&self) -> PathBuf {
        self.root.join(NOTES_FILENAME)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(JotterError::Io)?;
        }
        Ok(())
    }

    fn load(&self) -> Result<Vec<Note>> {
        let path = self.notes_file();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path).map_err(JotterError::Io)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let notes: Vec<Note> = serde_json::from_str(&content).map_err(JotterError::Serialization)?;
        Ok(notes)
    }

    fn write(&self, notes: &[Note]) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(notes).map_err(JotterError::Serialization)?;
        // Write then rename: the collection is replaced atomically.
        let tmp = self.root.join(format!("{}.tmp", NOTES_FILENAME));
        fs::write(&tmp, content).map_err(JotterError::Io)?;
        fs::rename(&tmp, self.notes_file()).map_err(JotterError::Io)?;
        Ok(())
    }
}

impl DataStore for FileStore {
    fn save_note(&mut self, note: &Note) -> Result<()> {
        let mut notes = self.load()?;
        match notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => *existing = note.clone(),
            None => notes.push(note.clone()),
        }
        self.write(&notes)
    }

    fn get_note(&self, id: &Uuid) -> Result<Note> {
        self.load()?
            .into_iter()
            .find(|n| n.id == *id)
            .ok_or(JotterError::NoteNotFound(*id))
    }

    fn list_notes(&self) -> Result<Vec<Note>> {
        self.load()
    }

    fn delete_note(&mut self, id: &Uuid) -> Result<()> {
        let mut notes = self.load()?;
        let before = notes.len();
        notes.retain(|n| n.id != *id);
        if notes.len() == before {
            return Err(JotterError::NoteNotFound(*id));
        }
        self.write(&notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_get() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("data"));
        let note = Note::new("<p>Hello</p>".into());
        store.save_note(&note).unwrap();

        let loaded = store.get_note(&note.id).unwrap();
        assert_eq!(loaded, note);
        assert!(dir.path().join("data").join("notes.json").exists());
    }

    #[test]
    fn test_save_replaces_existing() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        let mut note = Note::new("<p>v1</p>".into());
        store.save_note(&note).unwrap();
        note.set_content("<p>v2</p>".into());
        store.save_note(&note).unwrap();

        let notes = store.list_notes().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "<p>v2</p>");
    }

    #[test]
    fn test_stored_as_camel_case_array() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        store.save_note(&Note::new("<p>a</p>".into())).unwrap();

        let raw = fs::read_to_string(dir.path().join("notes.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &value.as_array().unwrap()[0];
        assert!(first.get("createdAt").is_some());
        assert!(first.get("updatedAt").is_some());
    }

    #[test]
    fn test_list_empty_dir() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("missing"));
        assert!(store.list_notes().unwrap().is_empty());
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        let note = Note::new("<p>bye</p>".into());
        store.save_note(&note).unwrap();
        store.delete_note(&note.id).unwrap();
        assert!(store.list_notes().unwrap().is_empty());

        match store.delete_note(&note.id) {
            Err(JotterError::NoteNotFound(id)) => assert_eq!(id, note.id),
            other => panic!("Expected NoteNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.json"), "{not json").unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert!(matches!(
            store.list_notes(),
            Err(JotterError::Serialization(_))
        ));
    }
}
