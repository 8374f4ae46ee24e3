//! # Current Document Context
//!
//! A [`Session`] is one open note: the note record, its parsed [`Document`],
//! the overlay editor and the pending autosave. Everything that changes the
//! note goes through here, so the persisted copy, the tree and the overlay
//! never disagree about which content is current.
//!
//! ## Saving
//!
//! - Content edits (typing, paste, fragment load) are debounced: each one
//!   reschedules the save, and [`Session::tick`] writes it once the quiet
//!   period from [`JotterConfig::autosave_ms`] has passed.
//! - Overlay commits are written immediately.
//!
//! Save failures are logged and never abort an edit. The in-memory note stays
//! authoritative and the next save retries with the latest content.
//!
//! Time is passed in as [`Instant`]s so callers (and tests) control when the
//! debounced save fires.

use crate::codec;
use crate::config::JotterConfig;
use crate::debounce::Debouncer;
use crate::document::{is_empty_html, Document, NodePath};
use crate::error::{JotterError, Result};
use crate::index::index_notes;
use crate::markdown;
use crate::model::Note;
use crate::overlay::{CommitOutcome, Key, OpenOutcome, OverlayEditor, Transition};
use crate::store::DataStore;
use std::time::Instant;
use uuid::Uuid;

pub struct Session<S: DataStore> {
    store: S,
    config: JotterConfig,
    note: Note,
    document: Document,
    overlay: OverlayEditor,
    saves: Debouncer<Uuid, Note>,
    save_failed: bool,
}

impl<S: DataStore> Session<S> {
    /// Open the most recently edited note, creating an empty one when the
    /// store has none.
    pub fn open(mut store: S, config: JotterConfig) -> Result<Self> {
        let latest = index_notes(store.list_notes()?).into_iter().next();
        let note = match latest {
            Some(dn) => dn.note,
            None => {
                let note = Note::new(String::new());
                store.save_note(&note)?;
                tracing::debug!(id = %note.id, "created first note");
                note
            }
        };
        Ok(Self::with_note(store, config, note))
    }

    pub fn with_note(store: S, config: JotterConfig, note: Note) -> Self {
        Self {
            document: Document::parse(&note.content),
            overlay: OverlayEditor::from_config(&config),
            saves: Debouncer::new(config.autosave_delay()),
            store,
            config,
            note,
            save_failed: false,
        }
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn overlay(&self) -> &OverlayEditor {
        &self.overlay
    }

    pub fn config(&self) -> &JotterConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Flush pending saves and hand the store back.
    pub fn close(mut self) -> S {
        self.flush();
        self.store
    }

    /// Whether the stored copy is behind the in-memory note.
    pub fn is_dirty(&self) -> bool {
        self.saves.has_pending() || self.save_failed
    }

    /// When the next debounced save is due, for callers driving a timer.
    pub fn next_save_due(&self) -> Option<Instant> {
        self.saves.next_due()
    }

    // --- Content edits (debounced) ---

    /// The editor's content changed to `html`.
    pub fn edit(&mut self, html: &str, now: Instant) {
        self.document.reset(html);
        self.note.set_content(self.document.to_html());
        self.saves.schedule(self.note.id, self.note.clone(), now);
    }

    /// Replace the content wholesale. Alias of [`Session::edit`] for callers
    /// that load content rather than type it.
    pub fn reset_content(&mut self, html: &str, now: Instant) {
        self.edit(html, now);
    }

    /// Paste plain text at the end of the note. Markdown-looking text is
    /// converted, anything else becomes literal paragraphs.
    pub fn paste(&mut self, text: &str, now: Instant) {
        let pasted = markdown::paste_to_html(text);
        if pasted.is_empty() {
            return;
        }
        let mut html = self.document.to_html();
        if is_empty_html(&html) {
            html.clear();
        }
        html.push_str(&pasted);
        self.edit(&html, now);
    }

    /// Write every save whose quiet period has passed. Returns how many
    /// notes were written.
    pub fn tick(&mut self, now: Instant) -> usize {
        let due = self.saves.poll(now);
        due.into_iter().filter(|(_, note)| self.persist(note)).count()
    }

    /// Write whatever is pending right away.
    pub fn flush(&mut self) -> usize {
        let pending = self.saves.flush();
        let mut written = pending
            .into_iter()
            .filter(|(_, note)| self.persist(note))
            .count();
        if written == 0 && self.save_failed {
            let note = self.note.clone();
            if self.persist(&note) {
                written = 1;
            }
        }
        written
    }

    fn persist(&mut self, note: &Note) -> bool {
        match self.store.save_note(note) {
            Ok(()) => {
                self.save_failed = false;
                true
            }
            Err(e) => {
                tracing::warn!(id = %note.id, error = %e, "autosave failed, keeping changes in memory");
                self.save_failed = true;
                false
            }
        }
    }

    // --- Overlay ---

    /// A click at `path`. Opens the overlay on the closest editable element.
    pub fn click(&mut self, path: &NodePath) -> OpenOutcome {
        match self.overlay.target_at(&self.document, path) {
            Some(target) => self.overlay.open(&self.document, &target),
            None if self.overlay.is_editing() => OpenOutcome::Ignored,
            None => OpenOutcome::NotEditable,
        }
    }

    pub fn overlay_input(&mut self, value: &str) {
        self.overlay.input(value);
    }

    pub fn overlay_key(&mut self, key: Key) -> Transition {
        let transition = self.overlay.key(key, &mut self.document);
        self.after_transition(transition)
    }

    pub fn overlay_blur(&mut self) -> Transition {
        let transition = self.overlay.blur(&mut self.document);
        self.after_transition(transition)
    }

    pub fn outside_click(&mut self) -> Transition {
        let transition = self.overlay.outside_click(&mut self.document);
        self.after_transition(transition)
    }

    fn after_transition(&mut self, transition: Transition) -> Transition {
        if let Transition::Committed(CommitOutcome::Applied { .. }) = &transition {
            if let Err(e) = self.store_commit() {
                tracing::warn!(id = %self.note.id, error = %e, "saving overlay edit failed, keeping changes in memory");
            }
        }
        transition
    }

    /// Write a committed overlay edit straight to the store.
    fn store_commit(&mut self) -> Result<()> {
        self.note.set_content(self.document.to_html());
        // The immediate write supersedes any pending debounced one.
        self.saves.take(&self.note.id);
        let saved = self.store.save_note(&self.note);
        self.save_failed = saved.is_err();
        saved
    }

    /// Open, edit and commit in one step: the element at `path` gets the
    /// Markdown `value` (for example `## New Title`). Unlike interactive
    /// commits, a failed write is returned as an error.
    pub fn rewrite(&mut self, path: &NodePath, value: &str) -> Result<CommitOutcome> {
        match self.click(path) {
            OpenOutcome::Opened { .. } => {}
            OpenOutcome::Ignored => {
                return Err(JotterError::Api(
                    "Another element is being edited".to_string(),
                ))
            }
            OpenOutcome::NotEditable => {
                return Err(JotterError::Document(format!(
                    "No editable element at {}",
                    path
                )))
            }
        }
        self.overlay_input(value);
        match self.overlay.key(Key::Enter, &mut self.document) {
            Transition::Committed(outcome) => {
                if let CommitOutcome::Applied { .. } = &outcome {
                    self.store_commit()?;
                }
                Ok(outcome)
            }
            _ => Ok(CommitOutcome::Unchanged),
        }
    }

    // --- Sharing ---

    /// The `#fragment` token for the current note, or `None` when the note
    /// is empty and any shared state should be cleared.
    pub fn share_fragment(&self) -> Option<String> {
        codec::fragment_for_document(&self.note.content)
    }

    /// Load content from a URL fragment. Returns whether anything was
    /// loaded; empty or unreadable fragments leave the note as it is.
    pub fn load_from_fragment(&mut self, fragment: &str, now: Instant) -> bool {
        let html = codec::document_from_fragment(fragment);
        if html.is_empty() {
            return false;
        }
        self.reset_content(&html, now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;
    use std::time::Duration;

    const QUIET: Duration = Duration::from_millis(400);

    fn session_with(html: &str) -> Session<InMemoryStore> {
        let fixture = StoreFixture::new().with_note(html);
        Session::open(fixture.store, JotterConfig::default()).unwrap()
    }

    fn stored(session: &Session<InMemoryStore>) -> String {
        session.store().get_note(&session.note().id).unwrap().content
    }

    #[test]
    fn test_open_creates_first_note() {
        let session = Session::open(InMemoryStore::new(), JotterConfig::default()).unwrap();
        assert_eq!(session.store().list_notes().unwrap().len(), 1);
        assert_eq!(session.note().content, "");
    }

    #[test]
    fn test_open_picks_most_recent() {
        let fixture = StoreFixture::new().with_notes(3);
        let session = Session::open(fixture.store, JotterConfig::default()).unwrap();
        assert!(session.note().content.contains("Note 3"));
    }

    #[test]
    fn test_burst_of_edits_saves_last_value_once() {
        let mut session = session_with("<p>start</p>");
        let t0 = Instant::now();
        session.edit("<p>a</p>", t0);
        session.edit("<p>ab</p>", t0 + Duration::from_millis(100));
        session.edit("<p>abc</p>", t0 + Duration::from_millis(200));

        assert_eq!(
            session.next_save_due(),
            Some(t0 + Duration::from_millis(200) + QUIET)
        );
        assert_eq!(session.tick(t0 + Duration::from_millis(500)), 0);
        assert_eq!(stored(&session), "<p>start</p>");
        assert!(session.is_dirty());

        assert_eq!(session.tick(t0 + Duration::from_millis(200) + QUIET), 1);
        assert_eq!(stored(&session), "<p>abc</p>");
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_overlay_commit_persists_immediately() {
        let mut session = session_with("<h2>Section</h2><p>body</p>");
        let path: NodePath = "0".parse().unwrap();

        assert_eq!(
            session.click(&path),
            OpenOutcome::Opened {
                preview: "## Section".into()
            }
        );
        session.overlay_input("## New Title");
        let transition = session.overlay_key(Key::Enter);
        assert!(matches!(
            transition,
            Transition::Committed(CommitOutcome::Applied { .. })
        ));
        assert_eq!(stored(&session), "<h2>New Title</h2><p>body</p>");
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_click_inside_list_item_opens_item() {
        let mut session = session_with("<ul><li>one <span>two</span></li></ul>");
        let outcome = session.click(&"0.0.1".parse().unwrap());
        assert_eq!(
            outcome,
            OpenOutcome::Opened {
                preview: "- one two".into()
            }
        );
        assert_eq!(session.click(&"0".parse().unwrap()), OpenOutcome::Ignored);
    }

    #[test]
    fn test_edit_while_overlay_open_detaches() {
        let mut session = session_with("<h1>Title</h1>");
        let t0 = Instant::now();
        session.click(&"0".parse().unwrap());
        session.overlay_input("# Changed");
        session.edit("<p>typed elsewhere</p>", t0);

        assert_eq!(
            session.overlay_blur(),
            Transition::Committed(CommitOutcome::Detached)
        );
        assert_eq!(session.note().content, "<p>typed elsewhere</p>");
    }

    #[test]
    fn test_rewrite() {
        let mut session = session_with("<ul><li>old</li></ul>");
        let outcome = session.rewrite(&"0.0".parse().unwrap(), "- new").unwrap();
        assert_eq!(outcome, CommitOutcome::Applied { text: "new".into() });
        assert_eq!(stored(&session), "<ul><li>new</li></ul>");

        assert!(session.rewrite(&"5".parse().unwrap(), "x").is_err());
    }

    #[test]
    fn test_rewrite_reports_failed_write() {
        let mut fixture = StoreFixture::new().with_note("<h2>Section</h2>");
        fixture.store.fail_writes(true);
        let mut session = Session::open(fixture.store, JotterConfig::default()).unwrap();

        assert!(session.rewrite(&"0".parse().unwrap(), "## New").is_err());
        assert_eq!(session.note().content, "<h2>New</h2>");
        assert!(session.is_dirty());

        session.store.fail_writes(false);
        assert_eq!(session.flush(), 1);
        assert_eq!(stored(&session), "<h2>New</h2>");
    }

    #[test]
    fn test_nested_list_survives_item_edit() {
        let mut session = session_with("<ul><li>top<ul><li>inner</li></ul></li></ul>");
        assert_eq!(
            session.click(&"0.0".parse().unwrap()),
            OpenOutcome::Opened {
                preview: "- top".into()
            }
        );
        session.overlay_input("- top2");
        session.overlay_key(Key::Enter);
        assert_eq!(
            stored(&session),
            "<ul><li>top2<ul><li>inner</li></ul></li></ul>"
        );
    }

    #[test]
    fn test_failed_save_is_not_fatal() {
        let mut fixture = StoreFixture::new().with_note("<p>v1</p>");
        fixture.store.fail_writes(true);
        let mut session = Session::open(fixture.store, JotterConfig::default()).unwrap();
        let t0 = Instant::now();

        session.edit("<p>v2</p>", t0);
        assert_eq!(session.tick(t0 + QUIET), 0);
        assert!(session.is_dirty());
        assert_eq!(session.note().content, "<p>v2</p>");
    }

    #[test]
    fn test_share_and_load_fragment() {
        let mut source = session_with("<h1>Shared</h1><p>text</p>");
        let token = source.share_fragment().unwrap();

        let mut target = session_with("");
        let t0 = Instant::now();
        assert!(target.load_from_fragment(&format!("#{}", token), t0));
        assert_eq!(target.note().content, "<h1>Shared</h1><p>text</p>");
        target.flush();
        assert_eq!(stored(&target), "<h1>Shared</h1><p>text</p>");

        assert!(!target.load_from_fragment("#%%%garbage", t0));
        assert!(!target.load_from_fragment("", t0));
        assert_eq!(target.note().content, "<h1>Shared</h1><p>text</p>");

        source.edit("<p></p>", t0);
        assert!(source.share_fragment().is_none());
    }

    #[test]
    fn test_paste_markdown_and_plain_text() {
        let mut session = session_with("<p><br></p>");
        let t0 = Instant::now();
        session.paste("# Pasted\n\n- item", t0);
        assert_eq!(
            session.note().content,
            "<h1>Pasted</h1>\n<ul>\n<li>item</li>\n</ul>\n"
        );

        session.paste("plain <words>", t0);
        assert!(session
            .note()
            .content
            .ends_with("<p>plain &lt;words&gt;</p>\n"));
    }

    #[test]
    fn test_close_flushes() {
        let mut session = session_with("<p>a</p>");
        session.edit("<p>b</p>", Instant::now());
        let id = session.note().id;
        let store = session.close();
        assert_eq!(store.get_note(&id).unwrap().content, "<p>b</p>");
    }
}
