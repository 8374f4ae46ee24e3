//! # Shareable State Codec
//!
//! Packs a note's HTML into a token that can live in a URL fragment:
//!
//! ```text
//! UTF-8 bytes ──raw deflate──▶ compressed bytes ──URL-safe base64──▶ token
//! ```
//!
//! Raw deflate has no zlib/gzip framing, which keeps short notes short. The
//! alphabet is `[A-Za-z0-9_-]` and no padding is emitted, so a token can be
//! pasted after `#` without escaping.
//!
//! Decoding is strict: the deflate stream must end exactly where the data
//! ends. A truncated or altered token yields a [`DecodeError`] rather than a
//! shorter string.

use crate::document::is_empty_html;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use flate2::write::DeflateEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use std::io::Write;
use thiserror::Error;

const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("token is empty")]
    Empty,

    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("compressed data is corrupt: {0}")]
    Corrupt(String),

    #[error("compressed data ends before the stream does")]
    Truncated,

    #[error("unexpected bytes after the compressed stream")]
    TrailingData,

    #[error("decoded content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode `text` as a URL-safe token. Empty text has no token.
pub fn encode(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    // Writing into a Vec cannot fail.
    encoder
        .write_all(text.as_bytes())
        .expect("deflate into memory failed");
    let compressed = encoder.finish().expect("deflate into memory failed");
    Some(TOKEN_ENGINE.encode(compressed))
}

/// Decode a token produced by [`encode`]. A leading `#` is accepted, as is
/// standard `=` padding.
pub fn decode(token: &str) -> Result<String, DecodeError> {
    let token = token.trim();
    let token = token.strip_prefix('#').unwrap_or(token);
    if token.is_empty() {
        return Err(DecodeError::Empty);
    }
    let compressed = TOKEN_ENGINE.decode(token)?;
    let bytes = inflate(&compressed)?;
    Ok(String::from_utf8(bytes)?)
}

fn inflate(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut inflater = Decompress::new(false);
    let mut out = Vec::with_capacity(input.len().saturating_mul(4).max(64));

    loop {
        if out.len() == out.capacity() {
            out.reserve(out.capacity());
        }
        let before_in = inflater.total_in();
        let before_out = inflater.total_out();
        let status = inflater
            .decompress_vec(&input[before_in as usize..], &mut out, FlushDecompress::Finish)
            .map_err(|e| DecodeError::Corrupt(e.to_string()))?;

        if status == Status::StreamEnd {
            break;
        }
        let stalled = inflater.total_in() == before_in && inflater.total_out() == before_out;
        if stalled {
            return Err(if inflater.total_in() as usize >= input.len() {
                DecodeError::Truncated
            } else {
                DecodeError::Corrupt("inflater made no progress".to_string())
            });
        }
    }

    if (inflater.total_in() as usize) < input.len() {
        return Err(DecodeError::TrailingData);
    }
    Ok(out)
}

/// The fragment token for a document, or `None` when the document is empty
/// and any stored state should be cleared instead.
pub fn fragment_for_document(html: &str) -> Option<String> {
    if is_empty_html(html) {
        return None;
    }
    encode(html)
}

/// The document held in a URL fragment. Missing, empty or unreadable
/// fragments all yield an empty document.
pub fn document_from_fragment(fragment: &str) -> String {
    let token = fragment.trim().trim_start_matches('#');
    if token.is_empty() {
        return String::new();
    }
    match decode(token) {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable shared state");
            String::new()
        }
    }
}
