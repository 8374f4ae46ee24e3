//! # Markdown ⇄ HTML
//!
//! Two directions, used in different places:
//!
//! - **HTML → Markdown** ([`html_to_markdown`]) for `.md` export. The editor's
//!   markup is parsed into a [`Document`](crate::document::Document) and walked
//!   with a tag → emitter table, so nesting is handled structurally.
//! - **Markdown → HTML** ([`markdown_to_html`]) for import and paste, backed by
//!   `pulldown-cmark`.
//!
//! Neither direction fails: unrecognized markup degrades to plain text.
//!
//! [`syntax`] holds the per-tag delimiters the overlay editor uses to build
//! and strip its previews.

mod detect;
pub mod syntax;
mod to_html;
mod to_markdown;

pub use detect::looks_like_markdown;
pub use to_html::{markdown_to_html, plain_text_to_html};
pub use to_markdown::{document_to_markdown, html_to_markdown};

/// HTML for pasted plain text: converted when it looks like Markdown,
/// escaped paragraphs otherwise.
pub fn paste_to_html(text: &str) -> String {
    if looks_like_markdown(text) {
        tracing::debug!("paste detected as markdown");
        markdown_to_html(text)
    } else {
        plain_text_to_html(text)
    }
}

/// HTML for an imported Markdown file. Text that renders to nothing visible
/// is kept as literal paragraphs rather than dropped.
pub fn import_text(text: &str) -> String {
    let html = markdown_to_html(text);
    if crate::document::is_empty_html(&html) && !text.trim().is_empty() {
        tracing::debug!("markdown rendered empty, importing as plain text");
        return plain_text_to_html(text);
    }
    html
}
