use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::export::document_title;
use crate::markdown::import_text;
use crate::model::Note;
use crate::store::DataStore;

/// Create a note from Markdown source. Empty source creates an empty note.
pub fn run<S: DataStore>(store: &mut S, markdown: &str) -> Result<CmdResult> {
    let note = Note::new(import_text(markdown));
    store.save_note(&note)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Note created: {}",
        document_title(&note.content)
    )));
    Ok(result.with_affected_notes(vec![note]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn test_creates_note_from_markdown() {
        let mut store = InMemoryStore::new();
        let result = run(&mut store, "# Plans\n\n- **ship** it").unwrap();

        let notes = store.list_notes().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(
            notes[0].content,
            "<h1>Plans</h1>\n<ul>\n<li><strong>ship</strong> it</li>\n</ul>\n"
        );
        assert_eq!(result.messages[0].content, "Note created: Plans");
    }

    #[test]
    fn test_creates_empty_note() {
        let mut store = InMemoryStore::new();
        let result = run(&mut store, "").unwrap();
        assert_eq!(result.affected_notes[0].content, "");
        assert_eq!(result.messages[0].content, "Note created: Untitled");
    }
}
