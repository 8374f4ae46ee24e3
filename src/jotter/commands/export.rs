use crate::commands::{CmdMessage, CmdResult};
use crate::config::JotterConfig;
use crate::error::{JotterError, Result};
use crate::export::{export_filename, markdown, standalone_html, write_archive, RenderOptions};
use crate::index::{DisplayNote, NoteSelector};
use crate::store::DataStore;
use chrono::Utc;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use super::helpers::{indexed_notes, notes_by_selectors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Markdown,
    Html,
    Archive,
}

/// Export the selected notes (all notes when none are selected) into `out_dir`.
pub fn run<S: DataStore>(
    store: &S,
    config: &JotterConfig,
    selectors: &[NoteSelector],
    format: ExportFormat,
    out_dir: &Path,
) -> Result<CmdResult> {
    let notes = resolve_notes(store, selectors)?;

    if notes.is_empty() {
        let mut res = CmdResult::default();
        res.add_message(CmdMessage::info("No notes to export."));
        return Ok(res);
    }

    if !out_dir.exists() {
        fs::create_dir_all(out_dir).map_err(JotterError::Io)?;
    }

    let written = match format {
        ExportFormat::Archive => {
            let now = Utc::now();
            let path = out_dir.join(format!("jotter-{}.tar.gz", now.format("%Y-%m-%d_%H-%M-%S")));
            let file = File::create(&path).map_err(JotterError::Io)?;
            write_archive(file, &notes)?;
            vec![path]
        }
        ExportFormat::Markdown => write_each(&notes, out_dir, "md", |html| format!("{}\n", markdown(html)))?,
        ExportFormat::Html => {
            let options = RenderOptions::from_config(config);
            write_each(&notes, out_dir, "html", |html| standalone_html(html, &options))?
        }
    };

    let mut result = CmdResult::default();
    for path in &written {
        result.add_message(CmdMessage::success(format!("Exported to {}", path.display())));
    }
    Ok(result.with_written_files(written))
}

fn resolve_notes<S: DataStore>(store: &S, selectors: &[NoteSelector]) -> Result<Vec<DisplayNote>> {
    if selectors.is_empty() {
        indexed_notes(store)
    } else {
        notes_by_selectors(store, selectors)
    }
}

/// One file per note. Notes sharing a title get `-2`, `-3`... suffixes.
fn write_each(
    notes: &[DisplayNote],
    out_dir: &Path,
    ext: &str,
    render: impl Fn(&str) -> String,
) -> Result<Vec<PathBuf>> {
    let mut written: Vec<PathBuf> = Vec::with_capacity(notes.len());
    for dn in notes {
        let filename = export_filename(&dn.note.content, ext);
        let mut path = out_dir.join(&filename);
        let mut n = 2;
        while written.contains(&path) {
            let stem = filename.trim_end_matches(&format!(".{}", ext));
            path = out_dir.join(format!("{}-{}.{}", stem, n, ext));
            n += 1;
        }
        fs::write(&path, render(&dn.note.content)).map_err(JotterError::Io)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DisplayIndex;
    use crate::store::memory::fixtures::StoreFixture;
    use tempfile::tempdir;

    #[test]
    fn test_markdown_export_writes_titled_file() {
        let fixture = StoreFixture::new().with_note("<h1>Weekly Plan</h1><ul><li>rest</li></ul>");
        let dir = tempdir().unwrap();
        let result = run(
            &fixture.store,
            &JotterConfig::default(),
            &[NoteSelector::Index(DisplayIndex(1))],
            ExportFormat::Markdown,
            dir.path(),
        )
        .unwrap();

        let path = dir.path().join("Weekly_Plan.md");
        assert_eq!(result.written_files, vec![path.clone()]);
        assert_eq!(fs::read_to_string(path).unwrap(), "# Weekly Plan\n\n- rest\n");
    }

    #[test]
    fn test_html_export_uses_theme() {
        let fixture = StoreFixture::new().with_note("<p>hello</p>");
        let dir = tempdir().unwrap();
        let config = JotterConfig {
            theme: "dark".into(),
            ..JotterConfig::default()
        };
        run(&fixture.store, &config, &[], ExportFormat::Html, dir.path()).unwrap();

        let page = fs::read_to_string(dir.path().join("hello.html")).unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("#0d1117"));
    }

    #[test]
    fn test_duplicate_titles_get_suffixes() {
        let fixture = StoreFixture::new()
            .with_note("<h1>Same</h1>")
            .with_note("<h1>Same</h1>");
        let dir = tempdir().unwrap();
        let result = run(
            &fixture.store,
            &JotterConfig::default(),
            &[],
            ExportFormat::Markdown,
            dir.path(),
        )
        .unwrap();

        let names: Vec<String> = result
            .written_files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Same.md", "Same-2.md"]);
    }

    #[test]
    fn test_archive_export() {
        let fixture = StoreFixture::new().with_notes(2);
        let dir = tempdir().unwrap();
        let result = run(
            &fixture.store,
            &JotterConfig::default(),
            &[],
            ExportFormat::Archive,
            dir.path(),
        )
        .unwrap();
        assert_eq!(result.written_files.len(), 1);
        assert!(result.written_files[0]
            .to_string_lossy()
            .ends_with(".tar.gz"));
    }

    #[test]
    fn test_nothing_to_export() {
        let fixture = StoreFixture::new();
        let dir = tempdir().unwrap();
        let result = run(
            &fixture.store,
            &JotterConfig::default(),
            &[],
            ExportFormat::Markdown,
            dir.path(),
        )
        .unwrap();
        assert!(result.written_files.is_empty());
        assert_eq!(result.messages[0].content, "No notes to export.");
    }
}
