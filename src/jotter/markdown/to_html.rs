use crate::document::entities::escape_text;
use once_cell::sync::Lazy;
use pulldown_cmark::{
    html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use regex::Regex;

static BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"'()\[\]]+"#).unwrap());

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Render Markdown as the HTML shapes the editor produces.
///
/// Supports headings, emphasis, strikethrough, inline and fenced code, links
/// (bare `http(s)://` URLs are linked too), images, ordered, unordered and
/// task lists, blockquotes, rules and paragraphs.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = TextMergeStream::new(Parser::new_ext(markdown, options));
    let events = autolink(parser);

    let mut output = String::new();
    html::push_html(&mut output, events.into_iter());
    output
}

/// Plain text as escaped paragraphs, one per non-empty line.
pub fn plain_text_to_html(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("<p>{}</p>\n", escape_text(line)))
        .collect()
}

/// Turn bare URLs in text events into links, leaving code and existing links alone.
fn autolink<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    let mut link_depth = 0usize;
    let mut code_depth = 0usize;

    for event in events {
        match &event {
            Event::Start(Tag::Link { .. }) | Event::Start(Tag::Image { .. }) => link_depth += 1,
            Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => {
                link_depth = link_depth.saturating_sub(1)
            }
            Event::Start(Tag::CodeBlock(_)) => code_depth += 1,
            Event::End(TagEnd::CodeBlock) => code_depth = code_depth.saturating_sub(1),
            Event::Text(text) if link_depth == 0 && code_depth == 0 && BARE_URL.is_match(text) => {
                split_urls(text, &mut out);
                continue;
            }
            _ => {}
        }
        out.push(event);
    }
    out
}

fn split_urls<'a>(text: &str, out: &mut Vec<Event<'a>>) {
    let mut last = 0;
    for found in BARE_URL.find_iter(text) {
        let url = found.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        if url.is_empty() {
            continue;
        }
        if found.start() > last {
            out.push(Event::Text(CowStr::from(text[last..found.start()].to_string())));
        }
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(url.to_string()),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        out.push(Event::Text(CowStr::from(url.to_string())));
        out.push(Event::End(TagEnd::Link));
        last = found.start() + url.len();
    }
    if last < text.len() {
        out.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_document() {
        let html =
            markdown_to_html("# Title\n\nSome **bold** and *italic* text.\n\n- item one\n- item two");
        assert_eq!(html.matches("<h1>").count(), 1);
        assert_eq!(html.matches("<strong>").count(), 1);
        assert_eq!(html.matches("<em>").count(), 1);
        assert_eq!(html.matches("<li>").count(), 2);
        assert!(html.contains("<ul>"));
    }

    #[test]
    fn test_strikethrough_and_code() {
        let html = markdown_to_html("~~gone~~ and `code`\n\n```rust\nfn main() {}\n```");
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("<code>code</code>"));
        assert!(html.contains("<pre><code class=\"language-rust\">fn main() {}"));
    }

    #[test]
    fn test_task_list() {
        let html = markdown_to_html("- [x] done\n- [ ] todo");
        assert!(html.contains("checked"));
        assert_eq!(html.matches("type=\"checkbox\"").count(), 2);
    }

    #[test]
    fn test_ordered_list_and_quote_and_rule() {
        let html = markdown_to_html("1. one\n2. two\n\n> quoted\n\n---\n");
        assert!(html.contains("<ol>"));
        assert!(html.contains("<li>two</li>"));
        assert!(html.contains("<blockquote>"));
        assert!(html.contains("<hr />"));
    }

    #[test]
    fn test_links_and_images() {
        let html = markdown_to_html("[docs](https://x.test) ![cat](cat.png)");
        assert!(html.contains(r#"<a href="https://x.test">docs</a>"#));
        assert!(html.contains(r#"<img src="cat.png" alt="cat" />"#));
    }

    #[test]
    fn test_bare_url_autolinked() {
        let html = markdown_to_html("visit https://example.com/a_b. thanks");
        assert!(html.contains(r#"<a href="https://example.com/a_b">https://example.com/a_b</a>."#));
        assert!(html.contains("visit "));
        assert!(html.contains(" thanks"));
    }

    #[test]
    fn test_url_in_code_not_linked() {
        let html = markdown_to_html("`https://example.com`\n\n```\nhttps://example.com\n```");
        assert!(!html.contains("<a "));
    }

    #[test]
    fn test_plain_text_to_html_escapes() {
        assert_eq!(
            plain_text_to_html("a < b\n\n  \nsecond"),
            "<p>a &lt; b</p>\n<p>second</p>\n"
        );
    }
}
