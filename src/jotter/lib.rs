//! # Jotter Architecture
//!
//! Jotter is the logic core of a local-first note editor. Notes are rich-text
//! HTML; the crate converts them to and from Markdown, packs them into
//! shareable URL fragments, and edits single elements through a Markdown
//! overlay. It is a library with a small CLI client, not the other way round.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────┐   ┌──────────────────────────┐
//! │  API Layer (api.rs)          │   │  Session (session.rs)    │
//! │  - Thin facade over commands │   │  - One open note         │
//! │  - Returns CmdResult         │   │  - Overlay + autosave    │
//! └──────────────────────────────┘   └──────────────────────────┘
//!                              │               │
//!                              ▼               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core                                                       │
//! │  document/  parsed HTML tree, node paths, edit transactions │
//! │  markdown/  HTML ⇄ Markdown, paste detection, syntax table  │
//! │  codec      deflate + URL-safe base64 fragment tokens       │
//! │  overlay    inline Markdown editing state machine           │
//! │  debounce   cancellable deferred saves                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DataStore trait                                          │
//! │  - FileStore (notes.json), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! From `api.rs` and `session.rs` inward nothing writes to stdout or
//! stderr, reads the clock on its own, or touches global state. Configuration
//! is passed in explicitly.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade for one-shot operations
//! - [`session`]: The current document context for interactive editing
//! - [`commands`]: Business logic for each command
//! - [`document`]: HTML tree model and edit API
//! - [`markdown`]: Markdown ⇄ HTML conversion
//! - [`codec`]: Shareable URL state
//! - [`overlay`]: Inline Markdown overlay editor
//! - [`debounce`]: Deferred, cancellable saves
//! - [`export`]: Standalone HTML, Markdown and archive export
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: The `Note` record
//! - [`index`]: Recency-ordered display indexes
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod codec;
pub mod commands;
pub mod config;
pub mod debounce;
pub mod document;
pub mod error;
pub mod export;
pub mod index;
pub mod markdown;
pub mod model;
pub mod overlay;
pub mod session;
pub mod store;
