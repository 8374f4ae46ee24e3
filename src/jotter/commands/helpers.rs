use crate::error::{JotterError, Result};
use crate::index::{index_notes, select, DisplayIndex, DisplayNote, NoteSelector};
use crate::store::DataStore;
use uuid::Uuid;

pub fn indexed_notes<S: DataStore>(store: &S) -> Result<Vec<DisplayNote>> {
    let notes = store.list_notes()?;
    Ok(index_notes(notes))
}

/// Resolve each selector to exactly one note. Title searches that match
/// several notes are rejected so a command never acts on the wrong one.
pub fn resolve_selectors<S: DataStore>(
    store: &S,
    selectors: &[NoteSelector],
) -> Result<Vec<(DisplayIndex, Uuid)>> {
    let indexed = indexed_notes(store)?;

    selectors
        .iter()
        .map(|selector| match select(&indexed, selector).as_slice() {
            [dn] => Ok((dn.index, dn.note.id)),
            [] => Err(JotterError::Api(format!("No note matches {}", selector))),
            many => Err(JotterError::Api(format!(
                "{} matches {} notes; use an index",
                selector,
                many.len()
            ))),
        })
        .collect()
}

pub fn notes_by_selectors<S: DataStore>(
    store: &S,
    selectors: &[NoteSelector],
) -> Result<Vec<DisplayNote>> {
    let resolved = resolve_selectors(store, selectors)?;
    let mut notes = Vec::with_capacity(resolved.len());
    for (index, id) in resolved {
        let note = store.get_note(&id)?;
        notes.push(DisplayNote {
            title: crate::export::document_title(&note.content),
            note,
            index,
        });
    }
    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn test_resolve_by_index_and_title() {
        let fixture = StoreFixture::new().with_notes(3);
        let resolved = resolve_selectors(
            &fixture.store,
            &[
                NoteSelector::Index(DisplayIndex(1)),
                NoteSelector::Title("note 1".into()),
            ],
        )
        .unwrap();
        assert_eq!(resolved[0].0, DisplayIndex(1));
        assert_eq!(resolved[1].0, DisplayIndex(3));
    }

    #[test]
    fn test_ambiguous_title_is_rejected() {
        let fixture = StoreFixture::new().with_notes(2);
        let err = resolve_selectors(&fixture.store, &[NoteSelector::Title("note".into())])
            .unwrap_err();
        assert!(err.to_string().contains("matches 2 notes"));
    }

    #[test]
    fn test_missing_index_is_an_error() {
        let fixture = StoreFixture::new().with_notes(1);
        assert!(
            resolve_selectors(&fixture.store, &[NoteSelector::Index(DisplayIndex(4))]).is_err()
        );
    }
}
