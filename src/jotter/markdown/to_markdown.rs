//! Document tree → Markdown.
//!
//! Each element name maps to an [`Emit`] rule. Block rules write whole
//! paragraphs separated by blank lines; inline rules return strings that are
//! stitched into the enclosing block. Unknown elements are transparent.

use super::syntax;
use crate::document::{entities, Document, Element, Node};
use once_cell::sync::Lazy;
use regex::Regex;

static EXTRA_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    Heading(usize),
    Block,
    Wrap(&'static str, &'static str),
    Code,
    Pre,
    Link,
    Image,
    List { ordered: bool },
    Item,
    Quote,
    Rule,
    Break,
    Skip,
    Transparent,
}

impl Emit {
    fn is_block(self) -> bool {
        matches!(
            self,
            Emit::Heading(_)
                | Emit::Block
                | Emit::Pre
                | Emit::List { .. }
                | Emit::Item
                | Emit::Quote
                | Emit::Rule
        )
    }
}

fn emitter(name: &str) -> Emit {
    match name {
        "h1" => Emit::Heading(1),
        "h2" => Emit::Heading(2),
        "h3" => Emit::Heading(3),
        "h4" => Emit::Heading(4),
        "h5" => Emit::Heading(5),
        "h6" => Emit::Heading(6),
        "strong" | "b" | "em" | "i" => {
            let d = syntax::delimiters(name);
            Emit::Wrap(d.prefix, d.suffix)
        }
        "s" | "strike" | "del" => Emit::Wrap("~~", "~~"),
        "code" => Emit::Code,
        "pre" => Emit::Pre,
        "a" => Emit::Link,
        "img" => Emit::Image,
        "ul" => Emit::List { ordered: false },
        "ol" => Emit::List { ordered: true },
        "li" => Emit::Item,
        "blockquote" => Emit::Quote,
        "hr" => Emit::Rule,
        "br" => Emit::Break,
        "p" | "div" | "section" | "article" | "header" | "footer" | "main" | "figure"
        | "table" | "tr" => Emit::Block,
        "script" | "style" | "head" | "title" | "input" | "template" => Emit::Skip,
        _ => Emit::Transparent,
    }
}

/// Convert serialized editor HTML to Markdown.
pub fn html_to_markdown(html: &str) -> String {
    document_to_markdown(&Document::parse(html))
}

pub fn document_to_markdown(doc: &Document) -> String {
    let mut out = String::new();
    write_blocks(doc.nodes(), &mut out);
    normalize(&out)
}

fn normalize(markdown: &str) -> String {
    EXTRA_NEWLINES
        .replace_all(markdown, "\n\n")
        .trim()
        .to_string()
}

fn is_block_node(node: &Node) -> bool {
    match node {
        Node::Element(el) => emitter(&el.name).is_block(),
        _ => false,
    }
}

/// Write a node list in block context: runs of inline nodes become paragraphs.
fn write_blocks(nodes: &[Node], out: &mut String) {
    let mut run_start = 0;
    for (i, node) in nodes.iter().enumerate() {
        if is_block_node(node) {
            flush_inline_run(&nodes[run_start..i], out);
            run_start = i + 1;
            if let Node::Element(el) = node {
                write_block(el, out);
            }
        }
    }
    flush_inline_run(&nodes[run_start..], out);
}

fn flush_inline_run(nodes: &[Node], out: &mut String) {
    let text = inline(nodes);
    let text = text.trim();
    if !text.is_empty() {
        out.push_str(text);
        out.push_str("\n\n");
    }
}

fn write_block(el: &Element, out: &mut String) {
    match emitter(&el.name) {
        Emit::Heading(level) => {
            out.push_str(&"#".repeat(level));
            out.push(' ');
            out.push_str(inline(&el.children).trim());
            out.push_str("\n\n");
        }
        Emit::Pre => write_code_block(el, out),
        Emit::List { ordered } => write_list(el, ordered, out),
        Emit::Item => write_item(el, "- ", out),
        Emit::Quote => {
            let mut inner = String::new();
            write_blocks(&el.children, &mut inner);
            for line in normalize(&inner).lines() {
                if line.is_empty() {
                    out.push_str(">\n");
                } else {
                    out.push_str("> ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
            out.push('\n');
        }
        Emit::Rule => out.push_str("\n---\n\n"),
        _ => write_blocks(&el.children, out),
    }
}

fn write_code_block(pre: &Element, out: &mut String) {
    let code_el = pre.children.iter().find_map(|n| match n {
        Node::Element(el) if el.is("code") => Some(el),
        _ => None,
    });
    let (code, language) = match code_el {
        Some(code) => (code.text_content(), code_language(code)),
        None => (pre.text_content(), None),
    };

    out.push_str("```");
    out.push_str(language.as_deref().unwrap_or(""));
    out.push('\n');
    out.push_str(code.trim_end_matches('\n'));
    out.push_str("\n```\n\n");
}

fn code_language(code: &Element) -> Option<String> {
    code.attr("class")?
        .split_whitespace()
        .find_map(|class| class.strip_prefix("language-").map(str::to_string))
}

fn write_list(list: &Element, ordered: bool, out: &mut String) {
    let mut number: i64 = list
        .attr("start")
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(1);

    for child in &list.children {
        let Node::Element(item) = child else {
            continue;
        };
        if item.is("li") {
            let marker = if ordered {
                let marker = format!("{}. ", number);
                number = number.saturating_add(1);
                marker
            } else {
                "- ".to_string()
            };
            write_item(item, &marker, out);
        } else if matches!(emitter(&item.name), Emit::List { .. }) {
            // A list nested directly in a list rather than inside an item.
            let mut nested = String::new();
            write_block(item, &mut nested);
            out.push_str(&indent(normalize(&nested).as_str(), "  "));
            out.push('\n');
        }
    }
    out.push('\n');
}

fn write_item(item: &Element, marker: &str, out: &mut String) {
    let mut body = String::new();
    write_blocks(&item.children, &mut body);
    let mut body = normalize(&body);

    let loose = item
        .children
        .iter()
        .any(|n| matches!(n, Node::Element(el) if el.is("p")));
    if !loose {
        body = body
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");
    }

    out.push_str(marker);
    if let Some(checked) = task_state(item) {
        out.push_str(if checked { "[x] " } else { "[ ] " });
    }

    let pad = " ".repeat(marker.chars().count());
    let mut lines = body.lines();
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        if !line.is_empty() {
            out.push_str(&pad);
            out.push_str(line);
        }
    }
    out.push('\n');
}

/// `Some(checked)` for task items: either a `data-checked` attribute or a
/// checkbox input among the item's leading content.
fn task_state(item: &Element) -> Option<bool> {
    if let Some(value) = item.attr("data-checked") {
        return Some(value == "true" || value.is_empty());
    }
    find_checkbox(&item.children).map(|input| input.has_attr("checked"))
}

fn find_checkbox(nodes: &[Node]) -> Option<&Element> {
    for node in nodes {
        if let Node::Element(el) = node {
            if el.is("input") {
                let is_checkbox = el
                    .attr("type")
                    .map(|t| t.eq_ignore_ascii_case("checkbox"))
                    .unwrap_or(false);
                return is_checkbox.then_some(el);
            }
            if el.is("p") || el.is("label") {
                return find_checkbox(&el.children);
            }
            if matches!(emitter(&el.name), Emit::List { .. }) {
                return None;
            }
        }
    }
    None
}

/// Inline code fenced with one backtick more than the longest run inside it.
fn code_span(code: &str) -> String {
    let longest = code
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest + 1);
    let padded = code.starts_with('`') || code.ends_with('`');
    if padded {
        format!("{} {} {}", fence, code, fence)
    } else {
        format!("{}{}{}", fence, code, fence)
    }
}

fn indent(text: &str, pad: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a node list in inline context.
fn inline(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(raw) => out.push_str(&entities::decode(raw)),
            Node::Raw(_) => {}
            Node::Element(el) => write_inline(el, &mut out),
        }
    }
    out
}

fn write_inline(el: &Element, out: &mut String) {
    match emitter(&el.name) {
        Emit::Wrap(prefix, suffix) => {
            let inner = inline(&el.children);
            if inner.trim().is_empty() {
                out.push_str(&inner);
            } else {
                out.push_str(prefix);
                out.push_str(&inner);
                out.push_str(suffix);
            }
        }
        Emit::Code => out.push_str(&code_span(&el.text_content())),
        Emit::Link => {
            let text = inline(&el.children);
            match el.attr("href") {
                Some(href) if !href.is_empty() => {
                    out.push('[');
                    out.push_str(&text);
                    out.push_str("](");
                    out.push_str(&href);
                    out.push(')');
                }
                _ => out.push_str(&text),
            }
        }
        Emit::Image => {
            if let Some(src) = el.attr("src") {
                out.push_str("![");
                out.push_str(&el.attr("alt").unwrap_or_default());
                out.push_str("](");
                out.push_str(&src);
                out.push(')');
            }
        }
        Emit::Break => out.push('\n'),
        Emit::Skip => {}
        _ => out.push_str(&inline(&el.children)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{looks_like_markdown, markdown_to_html};

    #[test]
    fn test_scenario_roundtrip() {
        let source = "# Title\n\nSome **bold** and *italic* text.\n\n- item one\n- item two";
        let md = html_to_markdown(&markdown_to_html(source));
        assert_eq!(md, source);
    }

    #[test]
    fn test_headings_levels() {
        let md = html_to_markdown("<h1>A</h1><h2>B</h2><h3>C</h3>");
        assert_eq!(md, "# A\n\n## B\n\n### C");
    }

    #[test]
    fn test_inline_emphasis_variants() {
        let md = html_to_markdown(
            "<p><b>b</b> <i>i</i> <s>s</s> <strike>k</strike> <del>d</del> <code>c</code></p>",
        );
        assert_eq!(md, "**b** *i* ~~s~~ ~~k~~ ~~d~~ `c`");
    }

    #[test]
    fn test_links_and_images() {
        let md = html_to_markdown(
            r#"<p><a href="https://x.test/?a=1&amp;b=2">docs</a> <img src="a.png" alt="cat"> <img src="b.png"></p>"#,
        );
        assert_eq!(md, "[docs](https://x.test/?a=1&b=2) ![cat](a.png) ![](b.png)");
    }

    #[test]
    fn test_ordered_list_keeps_item_text() {
        let md = html_to_markdown("<ol><li>first</li><li>second</li></ol>");
        assert_eq!(md, "1. first\n2. second");
    }

    #[test]
    fn test_ordered_list_start_extremes() {
        let md = html_to_markdown(r#"<ol start="-2"><li>a</li><li>b</li></ol>"#);
        assert_eq!(md, "-2. a\n-1. b");

        let md = html_to_markdown(
            r#"<ol start="9223372036854775807"><li>a</li><li>b</li></ol>"#,
        );
        assert_eq!(md, "9223372036854775807. a\n9223372036854775807. b");

        let md = html_to_markdown(r#"<ol start="18446744073709551615"><li>a</li><li>b</li></ol>"#);
        assert_eq!(md, "1. a\n2. b");
    }

    #[test]
    fn test_code_with_backticks_gets_longer_fence() {
        assert_eq!(html_to_markdown("<p><code>a`b</code></p>"), "``a`b``");
        assert_eq!(html_to_markdown("<p><code>`tick</code></p>"), "`` `tick ``");

        let html = markdown_to_html(&html_to_markdown("<p><code>a`b</code></p>"));
        assert_eq!(html, "<p><code>a`b</code></p>\n");
    }

    #[test]
    fn test_ordered_list_start_attribute() {
        let md = html_to_markdown(r#"<ol start="3"><li>c</li><li>d</li></ol>"#);
        assert_eq!(md, "3. c\n4. d");
    }

    #[test]
    fn test_task_items_from_checkbox() {
        let html = markdown_to_html("- [x] done\n- [ ] todo");
        assert_eq!(html_to_markdown(&html), "- [x] done\n- [ ] todo");
    }

    #[test]
    fn test_task_items_from_data_attribute() {
        let md = html_to_markdown(
            r#"<ul data-type="taskList"><li data-checked="true"><p>a</p></li><li data-checked="false"><p>b</p></li></ul>"#,
        );
        assert_eq!(md, "- [x] a\n- [ ] b");
    }

    #[test]
    fn test_nested_list_indented() {
        let md = html_to_markdown("<ul><li>top<ul><li>inner</li></ul></li><li>next</li></ul>");
        assert_eq!(md, "- top\n  - inner\n- next");
    }

    #[test]
    fn test_blockquote_prefixes_each_line() {
        let md = html_to_markdown("<blockquote><p>one</p><p>two</p></blockquote>");
        assert_eq!(md, "> one\n>\n> two");
    }

    #[test]
    fn test_horizontal_rule() {
        let md = html_to_markdown("<p>above</p><hr><p>below</p>");
        assert_eq!(md, "above\n\n---\n\nbelow");
    }

    #[test]
    fn test_code_block_not_double_processed() {
        let html = "<pre><code class=\"language-rust\">let x = &amp;y; // &lt;T&gt; `tick`\n</code></pre>";
        let md = html_to_markdown(html);
        assert_eq!(md, "```rust\nlet x = &y; // <T> `tick`\n```");
    }

    #[test]
    fn test_line_breaks_and_entities() {
        let md = html_to_markdown("<p>a&nbsp;b<br>c &quot;q&quot; &amp; &lt;tag&gt;</p>");
        assert_eq!(md, "a b\nc \"q\" & <tag>");
    }

    #[test]
    fn test_collapses_blank_lines_and_trims() {
        let md = html_to_markdown("\n\n<p>a</p>\n\n\n\n<div></div><p>b</p>\n\n");
        assert_eq!(md, "a\n\nb");
    }

    #[test]
    fn test_unknown_tags_are_transparent() {
        let md = html_to_markdown("<section><span class=\"x\">hello <mark>there</mark></span></section>");
        assert_eq!(md, "hello there");
    }

    #[test]
    fn test_malformed_html_does_not_fail() {
        let md = html_to_markdown("<p>1 < 2 <strong>open</p></em> tail");
        assert_eq!(md, "1 < 2 **open**\n\ntail");
    }

    #[test]
    fn test_converted_markdown_still_detected() {
        let sources = [
            "# Heading\n\ntext",
            "- a\n- b",
            "1. a\n2. b",
            "plain with **bold**",
            "> quote",
        ];
        for source in sources {
            let md = html_to_markdown(&markdown_to_html(source));
            assert!(looks_like_markdown(&md), "lost structure: {:?} -> {:?}", source, md);
        }
    }
}
