use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::export::document_title;
use crate::index::NoteSelector;
use crate::store::DataStore;

use super::helpers::resolve_selectors;

pub fn run<S: DataStore>(store: &mut S, selectors: &[NoteSelector]) -> Result<CmdResult> {
    let resolved = resolve_selectors(store, selectors)?;
    let mut result = CmdResult::default();

    for (display_index, id) in resolved {
        let note = store.get_note(&id)?;
        store.delete_note(&id)?;
        result.add_message(CmdMessage::success(format!(
            "Note deleted ({}): {}",
            display_index,
            document_title(&note.content)
        )));
        result.affected_notes.push(note);
    }

    Ok(result)
}
