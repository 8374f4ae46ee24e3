//! Run the overlay editor from the command line.
//!
//! Editable elements are numbered in document order. `rewrite` without a
//! value lists them with their Markdown previews; with a value it opens the
//! overlay on that element, types the value and presses Enter.

use crate::commands::{CmdMessage, CmdResult};
use crate::config::JotterConfig;
use crate::document::{Document, NodePath};
use crate::error::{JotterError, Result};
use crate::index::NoteSelector;
use crate::overlay::{CommitOutcome, OpenOutcome, OverlayEditor};
use crate::session::Session;
use crate::store::DataStore;

use super::helpers::resolve_selectors;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteTarget {
    pub number: usize,
    pub path: NodePath,
    pub preview: String,
}

/// Every element the overlay can open, numbered from 1.
pub fn targets(doc: &Document, config: &JotterConfig) -> Vec<RewriteTarget> {
    let mut overlay = OverlayEditor::from_config(config);
    let mut out = Vec::new();
    for (path, _) in doc.elements() {
        if let OpenOutcome::Opened { preview } = overlay.open(doc, &path) {
            overlay.cancel();
            out.push(RewriteTarget {
                number: out.len() + 1,
                path,
                preview,
            });
        }
    }
    out
}

pub fn run<S: DataStore>(
    store: &mut S,
    config: &JotterConfig,
    selector: &NoteSelector,
    element: Option<usize>,
    value: Option<&str>,
) -> Result<CmdResult> {
    let (display_index, id) = resolve_selectors(store, std::slice::from_ref(selector))?
        .into_iter()
        .next()
        .ok_or_else(|| JotterError::Api(format!("No note matches {}", selector)))?;
    let note = store.get_note(&id)?;
    let found = targets(&Document::parse(&note.content), config);

    let (Some(number), Some(value)) = (element, value) else {
        let listing: Vec<String> = found
            .iter()
            .map(|t| format!("{:>3}. {}", t.number, t.preview))
            .collect();
        let mut result = CmdResult::default().with_output(listing.join("\n"));
        if found.is_empty() {
            result.add_message(CmdMessage::info("No editable elements in this note."));
        }
        return Ok(result);
    };

    let target = found.iter().find(|t| t.number == number).ok_or_else(|| {
        JotterError::Api(format!(
            "Element {} not found ({} editable elements)",
            number,
            found.len()
        ))
    })?;

    let mut session = Session::with_note(&mut *store, config.clone(), note);
    let outcome = session.rewrite(&target.path, value)?;
    let updated = session.note().clone();
    drop(session);

    let mut result = CmdResult::default();
    match outcome {
        CommitOutcome::Applied { text } => {
            result.add_message(CmdMessage::success(format!(
                "Note updated ({}): element {} is now \"{}\"",
                display_index, number, text
            )));
            result.affected_notes.push(updated);
        }
        CommitOutcome::Unchanged => {
            result.add_message(CmdMessage::info("Nothing changed."));
        }
        CommitOutcome::Detached => {
            result.add_message(CmdMessage::warning("Element changed before the edit was saved."));
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DisplayIndex;
    use crate::store::memory::fixtures::StoreFixture;

    const HTML: &str = "<h2>Section</h2><p>Some <strong>bold</strong> text</p><ul><li>item</li></ul>";

    fn first() -> NoteSelector {
        NoteSelector::Index(DisplayIndex(1))
    }

    #[test]
    fn test_targets_in_document_order() {
        let found = targets(&Document::parse(HTML), &JotterConfig::default());
        let previews: Vec<&str> = found.iter().map(|t| t.preview.as_str()).collect();
        assert_eq!(previews, vec!["## Section", "**bold**", "- item"]);
        assert_eq!(found[2].number, 3);
    }

    #[test]
    fn test_lists_targets_without_value() {
        let mut fixture = StoreFixture::new().with_note(HTML);
        let result = run(&mut fixture.store, &JotterConfig::default(), &first(), None, None).unwrap();
        assert_eq!(
            result.output.unwrap(),
            "  1. ## Section\n  2. **bold**\n  3. - item"
        );
    }

    #[test]
    fn test_rewrites_heading() {
        let mut fixture = StoreFixture::new().with_note(HTML);
        let result = run(
            &mut fixture.store,
            &JotterConfig::default(),
            &first(),
            Some(1),
            Some("## New Title"),
        )
        .unwrap();

        assert_eq!(result.affected_notes.len(), 1);
        let stored = fixture.store.list_notes().unwrap();
        assert!(stored[0].content.starts_with("<h2>New Title</h2>"));
    }

    #[test]
    fn test_failed_write_is_an_error() {
        let mut fixture = StoreFixture::new().with_note("<h2>Section</h2>");
        fixture.store.fail_writes(true);
        let result = run(
            &mut fixture.store,
            &JotterConfig::default(),
            &first(),
            Some(1),
            Some("## New"),
        );

        assert!(result.is_err());
        assert_eq!(fixture.store.list_notes().unwrap()[0].content, "<h2>Section</h2>");
    }

    #[test]
    fn test_same_value_is_unchanged() {
        let mut fixture = StoreFixture::new().with_note(HTML);
        let result = run(
            &mut fixture.store,
            &JotterConfig::default(),
            &first(),
            Some(2),
            Some("**bold**"),
        )
        .unwrap();
        assert!(result.affected_notes.is_empty());
        assert_eq!(fixture.store.list_notes().unwrap()[0].content, HTML);
    }

    #[test]
    fn test_unknown_element_number() {
        let mut fixture = StoreFixture::new().with_note(HTML);
        let err = run(
            &mut fixture.store,
            &JotterConfig::default(),
            &first(),
            Some(9),
            Some("x"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Element 9 not found"));
    }
}
