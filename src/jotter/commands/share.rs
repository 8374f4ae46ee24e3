use crate::codec::fragment_for_document;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::index::NoteSelector;
use crate::store::DataStore;

use super::helpers::notes_by_selectors;

/// The `#fragment` that carries a note's whole content.
pub fn run<S: DataStore>(store: &S, selector: &NoteSelector) -> Result<CmdResult> {
    let notes = notes_by_selectors(store, std::slice::from_ref(selector))?;
    let mut result = CmdResult::default();

    for dn in &notes {
        match fragment_for_document(&dn.note.content) {
            Some(token) => result.output = Some(format!("#{}", token)),
            None => result.add_message(CmdMessage::info(format!(
                "Note {} is empty; there is nothing to share.",
                dn.index
            ))),
        }
    }

    Ok(result.with_listed_notes(notes))
}
