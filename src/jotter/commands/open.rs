use crate::codec;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{JotterError, Result};
use crate::export::document_title;
use crate::model::Note;
use crate::store::DataStore;

/// Create a note from a shared fragment. Accepts a bare token, `#token`, or
/// a full URL ending in `#token`.
pub fn run<S: DataStore>(store: &mut S, fragment: &str) -> Result<CmdResult> {
    let token = match fragment.rsplit_once('#') {
        Some((_, token)) => token,
        None => fragment,
    };
    let html = codec::decode(token).map_err(JotterError::Codec)?;

    let note = Note::new(html);
    store.save_note(&note)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Note opened: {}",
        document_title(&note.content)
    )));
    Ok(result.with_affected_notes(vec![note]))
}
