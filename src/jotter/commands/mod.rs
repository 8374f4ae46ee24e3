use crate::config::JotterConfig;
use crate::error::Result;
use crate::index::DisplayNote;
use crate::model::Note;
use std::path::PathBuf;

pub mod config;
pub mod create;
pub mod delete;
pub mod export;
pub mod helpers;
pub mod import;
pub mod list;
pub mod open;
pub mod rewrite;
pub mod share;
pub mod update;
pub mod view;

/// Where jotter keeps its notes and configuration.
#[derive(Debug, Clone)]
pub struct JotterPaths {
    pub data_dir: PathBuf,
}

impl JotterPaths {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn load_config(&self) -> Result<JotterConfig> {
        JotterConfig::load(&self.data_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_notes: Vec<Note>,
    pub listed_notes: Vec<DisplayNote>,
    pub written_files: Vec<PathBuf>,
    pub config: Option<JotterConfig>,
    /// Rendered text for the caller to print verbatim (listings, share tokens).
    pub output: Option<String>,
    /// One rendering per listed note, in the same order.
    pub rendered: Vec<String>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_notes(mut self, notes: Vec<Note>) -> Self {
        self.affected_notes = notes;
        self
    }

    pub fn with_listed_notes(mut self, notes: Vec<DisplayNote>) -> Self {
        self.listed_notes = notes;
        self
    }

    pub fn with_written_files(mut self, files: Vec<PathBuf>) -> Self {
        self.written_files = files;
        self
    }

    pub fn with_config(mut self, config: JotterConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_rendered(mut self, rendered: Vec<String>) -> Self {
        self.rendered = rendered;
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|m| matches!(m.level, MessageLevel::Warning | MessageLevel::Error))
    }
}
