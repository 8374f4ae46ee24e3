//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for
//! jotter operations, whatever the UI.
//!
//! The facade dispatches to the command functions and normalizes inputs
//! (user strings into [`NoteSelector`]s). It returns structured
//! [`CmdResult`]s and never prints, formats or exits.
//!
//! `JotterApi<S: DataStore>` is generic over the storage backend:
//! `JotterApi<FileStore>` in the binary, `JotterApi<InMemoryStore>` in tests.
//!
//! Interactive editing (typing, the overlay, debounced saves) does not go
//! through here; UIs that need it hold a [`crate::session::Session`] instead.

use crate::commands;
use crate::config::JotterConfig;
use crate::error::Result;
use crate::index::{DisplayIndex, NoteSelector};
use crate::store::DataStore;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The main API facade for jotter operations.
pub struct JotterApi<S: DataStore> {
    store: S,
    paths: commands::JotterPaths,
    config: JotterConfig,
}

impl<S: DataStore> JotterApi<S> {
    pub fn new(store: S, paths: commands::JotterPaths, config: JotterConfig) -> Self {
        Self {
            store,
            paths,
            config,
        }
    }

    pub fn create_note(&mut self, markdown: &str) -> Result<commands::CmdResult> {
        commands::create::run(&mut self.store, markdown)
    }

    pub fn list_notes(&self) -> Result<commands::CmdResult> {
        commands::list::run(&self.store)
    }

    pub fn view_notes<I: AsRef<str>>(
        &self,
        inputs: &[I],
        format: ViewFormat,
    ) -> Result<commands::CmdResult> {
        let selectors = parse_selectors(inputs)?;
        commands::view::run(&self.store, &selectors, format)
    }

    pub fn update_note(&mut self, input: &str, markdown: &str) -> Result<commands::CmdResult> {
        commands::update::run(&mut self.store, &NoteSelector::parse(input), markdown)
    }

    pub fn rewrite_element(
        &mut self,
        input: &str,
        element: Option<usize>,
        value: Option<&str>,
    ) -> Result<commands::CmdResult> {
        commands::rewrite::run(
            &mut self.store,
            &self.config,
            &NoteSelector::parse(input),
            element,
            value,
        )
    }

    pub fn delete_notes<I: AsRef<str>>(&mut self, inputs: &[I]) -> Result<commands::CmdResult> {
        let selectors = parse_selectors(inputs)?;
        commands::delete::run(&mut self.store, &selectors)
    }

    pub fn export_notes<I: AsRef<str>>(
        &self,
        inputs: &[I],
        format: ExportFormat,
        out_dir: &Path,
    ) -> Result<commands::CmdResult> {
        let selectors = parse_selectors(inputs)?;
        commands::export::run(&self.store, &self.config, &selectors, format, out_dir)
    }

    pub fn import_notes(&mut self, paths: Vec<PathBuf>) -> Result<commands::CmdResult> {
        commands::import::run(&mut self.store, &self.config, paths)
    }

    pub fn share_note(&self, input: &str) -> Result<commands::CmdResult> {
        commands::share::run(&self.store, &NoteSelector::parse(input))
    }

    pub fn open_fragment(&mut self, fragment: &str) -> Result<commands::CmdResult> {
        commands::open::run(&mut self.store, fragment)
    }

    pub fn config(&mut self, action: ConfigAction) -> Result<commands::CmdResult> {
        let result = commands::config::run(&self.paths, action)?;
        if let Some(config) = &result.config {
            self.config = config.clone();
        }
        Ok(result)
    }

    pub fn paths(&self) -> &commands::JotterPaths {
        &self.paths
    }

    pub fn settings(&self) -> &JotterConfig {
        &self.config
    }
}

fn parse_selectors<I: AsRef<str>>(inputs: &[I]) -> Result<Vec<NoteSelector>> {
    // All numeric: one selector per index
    let all_indexes: std::result::Result<Vec<DisplayIndex>, _> = inputs
        .iter()
        .map(|s| DisplayIndex::from_str(s.as_ref()))
        .collect();

    if let Ok(indexes) = all_indexes {
        return Ok(indexes.into_iter().map(NoteSelector::Index).collect());
    }

    // Otherwise the words form one title search
    let search_term = inputs
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<&str>>()
        .join(" ");

    Ok(vec![NoteSelector::Title(search_term)])
}

pub use crate::commands::config::ConfigAction;
pub use commands::export::ExportFormat;
pub use commands::view::ViewFormat;
pub use commands::{CmdMessage, CmdResult, JotterPaths, MessageLevel};
