use crate::codec::DecodeError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum JotterError {
    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),

    #[error("Invalid shared state: {0}")]
    Codec(#[from] DecodeError),

    #[error("Document error: {0}")]
    Document(String),
}

pub type Result<T> = std::result::Result<T, JotterError>;
