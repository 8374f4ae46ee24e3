//! Display indexes for notes.
//!
//! Notes are shown newest-edit first and numbered from 1 in that order. The
//! number is what the CLI accepts to select a note; it changes whenever a
//! note is edited, which is the behavior of a recency list.

use crate::export::document_title;
use crate::model::Note;
use std::fmt;
use std::str::FromStr;

/// A user-facing 1-based position in the recency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayIndex(pub usize);

impl fmt::Display for DisplayIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DisplayIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(DisplayIndex(n)),
            _ => Err(format!("Invalid index format: {}", s)),
        }
    }
}

/// A user input to select a note, either by its index or a search term for its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteSelector {
    Index(DisplayIndex),
    Title(String),
}

impl fmt::Display for NoteSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteSelector::Index(idx) => write!(f, "{}", idx),
            NoteSelector::Title(t) => write!(f, "\"{}\"", t),
        }
    }
}

impl NoteSelector {
    /// Numbers select by index; anything else is a title search.
    pub fn parse(input: &str) -> Self {
        match input.parse::<DisplayIndex>() {
            Ok(idx) => NoteSelector::Index(idx),
            Err(_) => NoteSelector::Title(input.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplayNote {
    pub note: Note,
    pub index: DisplayIndex,
    pub title: String,
}

/// Order notes by `updated_at` descending and assign display indexes.
pub fn index_notes(mut notes: Vec<Note>) -> Vec<DisplayNote> {
    notes.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    notes
        .into_iter()
        .enumerate()
        .map(|(i, note)| DisplayNote {
            title: document_title(&note.content),
            index: DisplayIndex(i + 1),
            note,
        })
        .collect()
}

/// Find the notes a selector refers to. Title searches are case-insensitive
/// substring matches and may return several notes.
pub fn select<'a>(indexed: &'a [DisplayNote], selector: &NoteSelector) -> Vec<&'a DisplayNote> {
    match selector {
        NoteSelector::Index(idx) => indexed.iter().filter(|dn| dn.index == *idx).collect(),
        NoteSelector::Title(term) => {
            let term = term.to_lowercase();
            indexed
                .iter()
                .filter(|dn| dn.title.to_lowercase().contains(&term))
                .collect()
        }
    }
}
