use crate::commands::{CmdMessage, CmdResult};
use crate::config::JotterConfig;
use crate::error::{JotterError, Result};
use crate::markdown::import_text;
use crate::model::Note;
use crate::store::DataStore;
use std::fs;
use std::path::{Path, PathBuf};

/// Import files (or every importable file in a directory) as new notes.
///
/// Each file is handled on its own: one that cannot be read or stored
/// becomes a warning and the rest of the batch continues.
pub fn run<S: DataStore>(store: &mut S, config: &JotterConfig, paths: Vec<PathBuf>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut imported = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(&path)
                .map_err(JotterError::Io)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && config.is_importable(p))
                .collect();
            entries.sort();
            for sub_path in entries {
                import_one(store, &sub_path, &mut imported, &mut result);
            }
        } else if path.is_file() {
            if !config.is_importable(&path) {
                result.add_message(CmdMessage::warning(format!(
                    "Skipped (unsupported extension): {}",
                    path.display()
                )));
                continue;
            }
            import_one(store, &path, &mut imported, &mut result);
        } else {
            result.add_message(CmdMessage::warning(format!(
                "Path not found: {}",
                path.display()
            )));
        }
    }

    result.add_message(CmdMessage::success(format!(
        "Total imported: {}",
        imported.len()
    )));
    Ok(result.with_affected_notes(imported))
}

fn import_one<S: DataStore>(
    store: &mut S,
    path: &Path,
    imported: &mut Vec<Note>,
    result: &mut CmdResult,
) {
    match import_file(store, path) {
        Ok(note) => {
            result.add_message(CmdMessage::info(format!("Imported: {}", path.display())));
            imported.push(note);
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "import failed");
            result.add_message(CmdMessage::warning(format!(
                "Failed to import {}: {}",
                path.display(),
                e
            )));
        }
    }
}

fn import_file<S: DataStore>(store: &mut S, path: &Path) -> Result<Note> {
    let content = fs::read_to_string(path).map_err(JotterError::Io)?;
    let note = Note::new(import_text(&content));
    store.save_note(&note)?;
    Ok(note)
}
