use crate::commands::CmdResult;
use crate::error::Result;
use crate::export::markdown;
use crate::index::NoteSelector;
use crate::store::DataStore;

use super::helpers::notes_by_selectors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewFormat {
    #[default]
    Html,
    Markdown,
}

pub fn run<S: DataStore>(
    store: &S,
    selectors: &[NoteSelector],
    format: ViewFormat,
) -> Result<CmdResult> {
    let notes = notes_by_selectors(store, selectors)?;
    let rendered: Vec<String> = notes
        .iter()
        .map(|dn| match format {
            ViewFormat::Html => dn.note.content.trim_end().to_string(),
            ViewFormat::Markdown => markdown(&dn.note.content),
        })
        .collect();

    Ok(CmdResult::default()
        .with_rendered(rendered)
        .with_listed_notes(notes))
}
