use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::export::document_title;
use crate::index::NoteSelector;
use crate::markdown::import_text;
use crate::store::DataStore;

use super::helpers::resolve_selectors;

/// Replace a note's content with rendered Markdown.
pub fn run<S: DataStore>(store: &mut S, selector: &NoteSelector, markdown: &str) -> Result<CmdResult> {
    let resolved = resolve_selectors(store, std::slice::from_ref(selector))?;
    let mut result = CmdResult::default();

    for (display_index, id) in resolved {
        let mut note = store.get_note(&id)?;
        note.set_content(import_text(markdown));
        store.save_note(&note)?;

        result.add_message(CmdMessage::success(format!(
            "Note updated ({}): {}",
            display_index,
            document_title(&note.content)
        )));
        result.affected_notes.push(note);
    }

    Ok(result)
}
