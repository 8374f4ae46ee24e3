//! # Inline Markdown Overlay
//!
//! Clicking a heading, emphasis span, inline code or list item opens a
//! one-line editor showing that element's Markdown source (`## Section`,
//! `**bold**`). Committing strips the delimiters again and writes the plain
//! text back through [`Document::apply`].
//!
//! ```text
//!            open (qualifying element)
//!   Idle ─────────────────────────────────▶ Editing
//!    ▲                                         │
//!    │   Enter / blur / outside click: commit  │
//!    └─────────────────────────────────────────┤
//!    │   Escape: cancel                        │
//!    └─────────────────────────────────────────┘
//! ```
//!
//! Only one element can be edited at a time; clicks while editing are
//! ignored. The overlay never holds a reference into the tree, only a
//! [`NodePath`] plus the document generation it was taken from, so a content
//! reset between open and commit is detected and the write is skipped.

use crate::config::JotterConfig;
use crate::document::{Document, Edit, EditOutcome, NodePath};
use crate::markdown::syntax;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingState {
    pub path: NodePath,
    pub tag: String,
    pub original_text: String,
    pub value: String,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Idle,
    Editing(EditingState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The overlay is now showing `preview`.
    Opened { preview: String },
    /// Another element is already being edited.
    Ignored,
    /// The path does not address an editable element.
    NotEditable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The element's text was replaced with `text`.
    Applied { text: String },
    /// The edit matched the original text; the document was not touched.
    Unchanged,
    /// The element is gone (content was reset); nothing was written.
    Detached,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    None,
    Committed(CommitOutcome),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct OverlayEditor {
    editable: Vec<String>,
    state: OverlayState,
}

impl OverlayEditor {
    pub fn new(editable: Vec<String>) -> Self {
        Self {
            editable,
            state: OverlayState::Idle,
        }
    }

    pub fn from_config(config: &JotterConfig) -> Self {
        Self::new(config.editable_tags())
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, OverlayState::Editing(_))
    }

    /// The element a renderer should hide while the overlay covers it.
    pub fn hidden_path(&self) -> Option<&NodePath> {
        match &self.state {
            OverlayState::Editing(editing) => Some(&editing.path),
            OverlayState::Idle => None,
        }
    }

    /// Current contents of the edit buffer.
    pub fn value(&self) -> Option<&str> {
        match &self.state {
            OverlayState::Editing(editing) => Some(&editing.value),
            OverlayState::Idle => None,
        }
    }

    pub fn is_editable(&self, tag: &str) -> bool {
        self.editable.iter().any(|t| t == tag)
    }

    /// The closest editable element at or above `path`, for clicks that land
    /// inside an editable element.
    pub fn target_at(&self, doc: &Document, path: &NodePath) -> Option<NodePath> {
        let indexes = path.indexes();
        (1..=indexes.len()).rev().find_map(|len| {
            let candidate = NodePath::new(indexes[..len].to_vec());
            doc.element(&candidate)
                .filter(|el| self.is_editable(&el.name))
                .map(|_| candidate)
        })
    }

    pub fn open(&mut self, doc: &Document, path: &NodePath) -> OpenOutcome {
        if self.is_editing() {
            tracing::debug!(%path, "overlay already open, ignoring click");
            return OpenOutcome::Ignored;
        }
        let Some(el) = doc.element(path) else {
            return OpenOutcome::NotEditable;
        };
        if !self.is_editable(&el.name) {
            return OpenOutcome::NotEditable;
        }

        let text = single_line(el.own_text().trim());
        let preview = syntax::wrap(&el.name, &text);
        self.state = OverlayState::Editing(EditingState {
            path: path.clone(),
            tag: el.name.clone(),
            original_text: text,
            value: preview.clone(),
            generation: doc.generation(),
        });
        OpenOutcome::Opened { preview }
    }

    /// Replace the edit buffer. The overlay is a single-line input.
    pub fn input(&mut self, value: &str) {
        if let OverlayState::Editing(editing) = &mut self.state {
            editing.value = single_line(value);
        }
    }

    pub fn key(&mut self, key: Key, doc: &mut Document) -> Transition {
        match key {
            Key::Enter => self.finish(doc),
            Key::Escape => {
                if self.cancel() {
                    Transition::Cancelled
                } else {
                    Transition::None
                }
            }
            Key::Other => Transition::None,
        }
    }

    pub fn blur(&mut self, doc: &mut Document) -> Transition {
        self.finish(doc)
    }

    pub fn outside_click(&mut self, doc: &mut Document) -> Transition {
        self.finish(doc)
    }

    fn finish(&mut self, doc: &mut Document) -> Transition {
        match self.commit(doc) {
            Some(outcome) => Transition::Committed(outcome),
            None => Transition::None,
        }
    }

    /// Write the edit back and return to idle. `None` when nothing was open.
    pub fn commit(&mut self, doc: &mut Document) -> Option<CommitOutcome> {
        let OverlayState::Editing(editing) = std::mem::take(&mut self.state) else {
            return None;
        };

        let attached = doc.generation() == editing.generation
            && doc
                .element(&editing.path)
                .map(|el| el.name == editing.tag)
                .unwrap_or(false);
        if !attached {
            tracing::debug!(path = %editing.path, "overlay target detached, dropping edit");
            return Some(CommitOutcome::Detached);
        }

        let text = syntax::strip(&editing.tag, &editing.value).trim().to_string();
        if text == editing.original_text {
            return Some(CommitOutcome::Unchanged);
        }

        let outcome = match doc.apply(Edit::SetText {
            path: editing.path.clone(),
            text: text.clone(),
        }) {
            Ok(EditOutcome::Changed) => CommitOutcome::Applied { text },
            Ok(EditOutcome::Unchanged) => CommitOutcome::Unchanged,
            Err(e) => {
                tracing::warn!(error = %e, "overlay edit rejected");
                CommitOutcome::Detached
            }
        };
        Some(outcome)
    }

    /// Drop the edit and return to idle. Returns whether anything was open.
    pub fn cancel(&mut self) -> bool {
        matches!(
            std::mem::take(&mut self.state),
            OverlayState::Editing(_)
        )
    }
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = "<h2>Section</h2>\n<p>Some <strong>bold</strong> and <code>x()</code>.</p>\n<ul>\n<li>one</li>\n</ul>\n";

    fn editor() -> OverlayEditor {
        OverlayEditor::from_config(&JotterConfig::default())
    }

    fn path(s: &str) -> NodePath {
        s.parse().unwrap()
    }

    #[test]
    fn test_heading_scenario() {
        let mut doc = Document::parse(HTML);
        let mut overlay = editor();

        let opened = overlay.open(&doc, &path("0"));
        assert_eq!(
            opened,
            OpenOutcome::Opened {
                preview: "## Section".into()
            }
        );
        assert_eq!(overlay.hidden_path(), Some(&path("0")));

        overlay.input("## New Title");
        let transition = overlay.key(Key::Enter, &mut doc);
        assert_eq!(
            transition,
            Transition::Committed(CommitOutcome::Applied {
                text: "New Title".into()
            })
        );
        assert!(doc.to_html().starts_with("<h2>New Title</h2>"));
        assert!(!overlay.is_editing());
    }

    #[test]
    fn test_commit_without_changes_is_byte_identical() {
        for p in ["0", "2.1", "2.3", "4.1"] {
            let mut doc = Document::parse(HTML);
            let mut overlay = editor();
            assert!(matches!(
                overlay.open(&doc, &path(p)),
                OpenOutcome::Opened { .. }
            ));
            let outcome = overlay.commit(&mut doc);
            assert_eq!(outcome, Some(CommitOutcome::Unchanged));
            assert_eq!(doc.to_html(), HTML);
        }
    }

    #[test]
    fn test_inline_previews() {
        let doc = Document::parse(HTML);
        let mut overlay = editor();
        assert_eq!(
            overlay.open(&doc, &path("2.1")),
            OpenOutcome::Opened {
                preview: "**bold**".into()
            }
        );
        overlay.cancel();
        assert_eq!(
            overlay.open(&doc, &path("2.3")),
            OpenOutcome::Opened {
                preview: "`x()`".into()
            }
        );
        overlay.cancel();
        assert_eq!(
            overlay.open(&doc, &path("4.1")),
            OpenOutcome::Opened {
                preview: "- one".into()
            }
        );
    }

    #[test]
    fn test_edit_bold_span() {
        let mut doc = Document::parse(HTML);
        let mut overlay = editor();
        overlay.open(&doc, &path("2.1"));
        overlay.input("**strong words**");
        overlay.blur(&mut doc);
        assert!(doc
            .to_html()
            .contains("<strong>strong words</strong>"));
    }

    #[test]
    fn test_escape_cancels_without_change() {
        let mut doc = Document::parse(HTML);
        let mut overlay = editor();
        overlay.open(&doc, &path("0"));
        overlay.input("## Changed");
        assert_eq!(overlay.key(Key::Escape, &mut doc), Transition::Cancelled);
        assert_eq!(doc.to_html(), HTML);
        assert!(overlay.hidden_path().is_none());
    }

    #[test]
    fn test_second_click_ignored_while_editing() {
        let mut doc = Document::parse(HTML);
        let mut overlay = editor();
        overlay.open(&doc, &path("0"));
        assert_eq!(overlay.open(&doc, &path("4.1")), OpenOutcome::Ignored);
        assert_eq!(overlay.hidden_path(), Some(&path("0")));
        overlay.outside_click(&mut doc);
        assert!(matches!(
            overlay.open(&doc, &path("4.1")),
            OpenOutcome::Opened { .. }
        ));
    }

    #[test]
    fn test_paragraph_not_editable_by_default() {
        let doc = Document::parse(HTML);
        let mut overlay = editor();
        assert_eq!(overlay.open(&doc, &path("2")), OpenOutcome::NotEditable);
        assert_eq!(overlay.open(&doc, &path("1")), OpenOutcome::NotEditable);
        assert_eq!(overlay.open(&doc, &path("9")), OpenOutcome::NotEditable);

        let mut with_p = OverlayEditor::from_config(&JotterConfig {
            paragraph_editable: true,
            ..JotterConfig::default()
        });
        assert!(matches!(
            with_p.open(&doc, &path("2")),
            OpenOutcome::Opened { .. }
        ));
    }

    #[test]
    fn test_detached_target_skips_write() {
        let mut doc = Document::parse(HTML);
        let mut overlay = editor();
        overlay.open(&doc, &path("0"));
        overlay.input("## Lost");
        doc.reset("<p>replaced elsewhere</p>");

        assert_eq!(
            overlay.key(Key::Enter, &mut doc),
            Transition::Committed(CommitOutcome::Detached)
        );
        assert_eq!(doc.to_html(), "<p>replaced elsewhere</p>");
        assert!(!overlay.is_editing());
    }

    #[test]
    fn test_keys_while_idle_do_nothing() {
        let mut doc = Document::parse(HTML);
        let mut overlay = editor();
        assert_eq!(overlay.key(Key::Enter, &mut doc), Transition::None);
        assert_eq!(overlay.key(Key::Escape, &mut doc), Transition::None);
        assert_eq!(overlay.blur(&mut doc), Transition::None);
    }

    #[test]
    fn test_input_is_single_line() {
        let doc = Document::parse(HTML);
        let mut overlay = editor();
        overlay.open(&doc, &path("0"));
        overlay.input("## two\nlines");
        assert_eq!(overlay.value(), Some("## two lines"));
    }

    #[test]
    fn test_target_at_walks_up_to_editable() {
        let doc = Document::parse("<ul><li><span>deep <em>x</em></span></li></ul>");
        let overlay = editor();
        assert_eq!(overlay.target_at(&doc, &path("0.0.0")), Some(path("0.0")));
        assert_eq!(overlay.target_at(&doc, &path("0.0.0.1")), Some(path("0.0.0.1")));
        assert_eq!(overlay.target_at(&doc, &path("0")), None);
    }
}
