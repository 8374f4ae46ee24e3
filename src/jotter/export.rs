//! # Export
//!
//! Notes leave jotter in three shapes:
//!
//! - a standalone HTML page ([`standalone_html`]) with an embedded stylesheet
//!   built from the configured theme and font,
//! - Markdown ([`markdown`]), via the tree walk in [`crate::markdown`],
//! - a `.tar.gz` holding every note as a Markdown file ([`write_archive`]).
//!
//! File names come from the note's title: the first heading, else the first
//! line of text.

use crate::config::JotterConfig;
use crate::document::{entities, Document, Node};
use crate::error::{JotterError, Result};
use crate::index::DisplayNote;
use crate::markdown::html_to_markdown;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

const TITLE_MAX_CHARS: usize = 50;
const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    fn from_name(name: &str) -> Self {
        match name {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    fn colors(self) -> (&'static str, &'static str, &'static str) {
        // (background, text, muted)
        match self {
            Theme::Light => ("#ffffff", "#1f2328", "#f6f8fa"),
            Theme::Dark => ("#0d1117", "#e6edf3", "#161b22"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub theme: Theme,
    pub font: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&JotterConfig::default())
    }
}

impl RenderOptions {
    pub fn from_config(config: &JotterConfig) -> Self {
        Self {
            theme: Theme::from_name(&config.theme),
            font: config.font.clone(),
        }
    }

    fn stylesheet(&self) -> String {
        let (bg, fg, muted) = self.theme.colors();
        format!(
            "body {{ max-width: 720px; margin: 2rem auto; padding: 0 1rem; \
             font-family: {font}; line-height: 1.6; background: {bg}; color: {fg}; }}\n\
             pre, code {{ background: {muted}; border-radius: 4px; }}\n\
             pre {{ padding: 0.75rem; overflow-x: auto; }}\n\
             code {{ padding: 0.1rem 0.3rem; }}\n\
             blockquote {{ margin-left: 0; padding-left: 1rem; border-left: 3px solid {muted}; }}\n\
             img {{ max-width: 100%; }}\n",
            font = self.font,
            bg = bg,
            fg = fg,
            muted = muted,
        )
    }
}

/// A complete HTML page with the note's markup as its body.
pub fn standalone_html(html: &str, options: &RenderOptions) -> String {
    let title = entities::escape_text(&document_title(html));
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        title,
        options.stylesheet(),
        html.trim_end()
    )
}

/// Markdown rendition of a note.
pub fn markdown(html: &str) -> String {
    html_to_markdown(html)
}

/// The first heading's text, else the first non-empty line of text,
/// cut to 50 characters. `"Untitled"` when the note has no text.
pub fn document_title(html: &str) -> String {
    let doc = Document::parse(html);

    let heading = doc
        .elements()
        .into_iter()
        .find(|(_, el)| matches!(el.name.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6"))
        .map(|(_, el)| el.text_content())
        .filter(|text| !text.trim().is_empty());

    let text = heading.or_else(|| {
        doc.nodes().iter().find_map(|node| {
            let text = match node {
                Node::Element(el) => el.text_content(),
                Node::Text(raw) => entities::decode(raw).into_owned(),
                Node::Raw(_) => return None,
            };
            text.lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string)
        })
    });

    match text {
        Some(text) => truncate(collapse_whitespace(&text).trim(), TITLE_MAX_CHARS),
        None => UNTITLED.to_string(),
    }
}

/// File name for an exported note: the title with every run of
/// non-alphanumeric characters replaced by `_`, plus `ext`.
pub fn export_filename(html: &str, ext: &str) -> String {
    let stem = sanitize_filename(&document_title(html));
    let stem = if stem.is_empty() { UNTITLED } else { &stem };
    let ext = ext.trim_start_matches('.');
    format!("{}.{}", stem, ext)
}

fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out.trim_matches('_').to_string()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect::<String>().trim_end().to_string()
}

/// Write every note as a Markdown file into a gzipped tarball.
pub fn write_archive<W: Write>(writer: W, notes: &[DisplayNote]) -> Result<()> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for dn in notes {
        let stem = sanitize_filename(&dn.title);
        let stem = if stem.is_empty() { UNTITLED } else { &stem };
        let entry_name = format!("jotter/{}-{}.md", stem, &dn.note.id.to_string()[..8]);
        let content = format!("{}\n", markdown(&dn.note.content));

        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(dn.note.updated_at.timestamp().max(0) as u64);
        header.set_cksum();

        tar.append_data(&mut header, entry_name, content.as_bytes())
            .map_err(JotterError::Io)?;
    }

    tar.into_inner()
        .map_err(JotterError::Io)?
        .finish()
        .map_err(JotterError::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::index_notes;
    use crate::model::Note;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_title_prefers_heading() {
        assert_eq!(
            document_title("<p>intro</p><h2>Real &amp; Title</h2>"),
            "Real & Title"
        );
    }

    #[test]
    fn test_title_falls_back_to_first_line() {
        assert_eq!(document_title("<p></p><p>  first words </p><p>next</p>"), "first words");
        assert_eq!(document_title(""), "Untitled");
        assert_eq!(document_title("<p><br></p>"), "Untitled");
    }

    #[test]
    fn test_title_truncated() {
        let long = format!("<h1>{}</h1>", "é".repeat(80));
        assert_eq!(document_title(&long).chars().count(), 50);
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename("<h1>My Notes: 2024/01!</h1>", "md"),
            "My_Notes_2024_01.md"
        );
        assert_eq!(export_filename("<p>???</p>", ".html"), "Untitled.html");
        assert_eq!(export_filename("", "md"), "Untitled.md");
    }

    #[test]
    fn test_standalone_html() {
        let options = RenderOptions {
            theme: Theme::Dark,
            font: "Georgia, serif".into(),
        };
        let page = standalone_html("<h1>A &lt;b&gt;</h1><p>body</p>", &options);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>A &lt;b&gt;</title>"));
        assert!(page.contains("font-family: Georgia, serif"));
        assert!(page.contains("#0d1117"));
        assert!(page.contains("<body>\n<h1>A &lt;b&gt;</h1><p>body</p>\n</body>"));
    }

    #[test]
    fn test_render_options_from_config() {
        let config = JotterConfig {
            theme: "dark".into(),
            ..JotterConfig::default()
        };
        assert_eq!(RenderOptions::from_config(&config).theme, Theme::Dark);
        assert_eq!(RenderOptions::default().theme, Theme::Light);
    }

    #[test]
    fn test_write_archive_contains_markdown() {
        let notes = index_notes(vec![Note::new("<h1>Shopping</h1><ul><li>milk</li></ul>".into())]);

        let mut buf = Vec::new();
        write_archive(&mut buf, &notes).unwrap();
        assert_eq!(buf[0], 0x1f);
        assert_eq!(buf[1], 0x8b);

        let mut archive = tar::Archive::new(GzDecoder::new(buf.as_slice()));
        let mut entries = archive.entries().unwrap();
        let mut entry = entries.next().unwrap().unwrap();
        let name = entry.path().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("jotter/Shopping-"));
        assert!(name.ends_with(".md"));

        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "# Shopping\n\n- milk\n");
    }
}
