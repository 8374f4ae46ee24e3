use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::DataStore;

use super::helpers::indexed_notes;

pub fn run<S: DataStore>(store: &S) -> Result<CmdResult> {
    let notes = indexed_notes(store)?;
    Ok(CmdResult::default().with_listed_notes(notes))
}
