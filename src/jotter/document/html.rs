//! A forgiving HTML reader and writer for the editor's own markup.
//!
//! The reader never fails: a `<` that does not open a well-formed tag is kept
//! as literal text, end tags with no matching open element are dropped, and
//! elements still open at the end of input are closed implicitly.
//!
//! Text and attribute values are kept in source form, so reading and then
//! writing well-formed markup gives back the same bytes.

use super::{Attr, Closing, Element, Node};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

enum Markup {
    Start {
        name: String,
        attrs: Vec<Attr>,
        closing: Option<Closing>,
    },
    End(String),
    Raw(String),
}

/// Parse an HTML fragment into a list of top-level nodes.
pub fn parse(input: &str) -> Vec<Node> {
    let mut root: Vec<Node> = Vec::new();
    let mut open: Vec<Element> = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let Some(offset) = input[pos..].find('<') else {
            push_text(current_children(&mut root, &mut open), &input[pos..]);
            break;
        };
        let lt = pos + offset;
        if lt > pos {
            push_text(current_children(&mut root, &mut open), &input[pos..lt]);
        }

        match read_markup(input, lt) {
            Some((Markup::Raw(raw), end)) => {
                current_children(&mut root, &mut open).push(Node::Raw(raw));
                pos = end;
            }
            Some((Markup::Start { name, attrs, closing }, end)) => {
                pos = end;
                let mut element = Element {
                    name,
                    attrs,
                    children: Vec::new(),
                    closing: closing.unwrap_or(Closing::Paired),
                };
                if closing.is_some() {
                    current_children(&mut root, &mut open).push(Node::Element(element));
                } else if RAW_TEXT_ELEMENTS.contains(&element.name.as_str()) {
                    let (body, after) = read_raw_text(input, pos, &element.name);
                    if !body.is_empty() {
                        element.children.push(Node::Text(body.to_string()));
                    }
                    current_children(&mut root, &mut open).push(Node::Element(element));
                    pos = after;
                } else {
                    open.push(element);
                }
            }
            Some((Markup::End(name), end)) => {
                pos = end;
                if let Some(depth) = open.iter().rposition(|el| el.name == name) {
                    while open.len() > depth {
                        close_top(&mut root, &mut open);
                    }
                }
            }
            None => {
                push_text(current_children(&mut root, &mut open), "<");
                pos = lt + 1;
            }
        }
    }

    while !open.is_empty() {
        close_top(&mut root, &mut open);
    }
    root
}

/// Serialize nodes back to HTML.
pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_nodes(&mut out, nodes);
    out
}

pub(super) fn write_nodes(out: &mut String, nodes: &[Node]) {
    for node in nodes {
        match node {
            Node::Text(raw) | Node::Raw(raw) => out.push_str(raw),
            Node::Element(el) => write_element(out, el),
        }
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.name);
    for attr in &el.attrs {
        out.push(' ');
        out.push_str(&attr.name);
        if let Some(value) = &attr.value {
            out.push('=');
            match attr.quote {
                Some(q) => {
                    out.push(q);
                    out.push_str(value);
                    out.push(q);
                }
                None => out.push_str(value),
            }
        }
    }
    match el.closing {
        Closing::Paired => {
            out.push('>');
            write_nodes(out, &el.children);
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
        Closing::Void => out.push('>'),
        Closing::Slash => out.push_str("/>"),
        Closing::SpaceSlash => out.push_str(" />"),
    }
}

fn current_children<'a>(root: &'a mut Vec<Node>, open: &'a mut [Element]) -> &'a mut Vec<Node> {
    match open.last_mut() {
        Some(el) => &mut el.children,
        None => root,
    }
}

fn close_top(root: &mut Vec<Node>, open: &mut Vec<Element>) {
    if let Some(el) = open.pop() {
        current_children(root, open).push(Node::Element(el));
    }
}

fn push_text(children: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(last)) = children.last_mut() {
        last.push_str(text);
    } else {
        children.push(Node::Text(text.to_string()));
    }
}

/// Read whatever markup starts at `lt` (which points at `<`). Returns the
/// markup and the byte offset just past it, or `None` if it is not markup.
fn read_markup(input: &str, lt: usize) -> Option<(Markup, usize)> {
    let rest = &input[lt..];
    if rest.starts_with("<!--") {
        let end = rest[4..].find("-->")? + 4 + 3;
        return Some((Markup::Raw(rest[..end].to_string()), lt + end));
    }
    if rest.starts_with("<!") || rest.starts_with("<?") {
        let end = rest.find('>')? + 1;
        return Some((Markup::Raw(rest[..end].to_string()), lt + end));
    }
    if let Some(after) = rest.strip_prefix("</") {
        let name_len = tag_name_len(after)?;
        let name = after[..name_len].to_ascii_lowercase();
        let tail = after[name_len..].trim_start();
        if !tail.starts_with('>') {
            return None;
        }
        let consumed = rest.len() - tail.len() + 1;
        return Some((Markup::End(name), lt + consumed));
    }
    read_start_tag(input, lt)
}

fn tag_name_len(s: &str) -> Option<usize> {
    let first = s.chars().next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    Some(
        s.find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':'))
            .unwrap_or(s.len()),
    )
}

fn read_start_tag(input: &str, lt: usize) -> Option<(Markup, usize)> {
    let bytes = input.as_bytes();
    let name_start = lt + 1;
    let name_len = tag_name_len(&input[name_start..])?;
    let name = input[name_start..name_start + name_len].to_ascii_lowercase();
    let mut pos = name_start + name_len;
    let mut attrs = Vec::new();

    loop {
        let ws_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let had_space = pos > ws_start;
        match bytes.get(pos)? {
            b'>' => {
                let closing = is_void(&name).then_some(Closing::Void);
                return Some((Markup::Start { name, attrs, closing }, pos + 1));
            }
            b'/' if bytes.get(pos + 1) == Some(&b'>') => {
                let closing = if had_space {
                    Closing::SpaceSlash
                } else {
                    Closing::Slash
                };
                return Some((
                    Markup::Start {
                        name,
                        attrs,
                        closing: Some(closing),
                    },
                    pos + 2,
                ));
            }
            _ if !had_space => return None,
            _ => {}
        }

        let attr_start = pos;
        while pos < bytes.len() && !is_attr_name_end(bytes[pos]) {
            pos += 1;
        }
        if pos == attr_start {
            return None;
        }
        let attr_name = input[attr_start..pos].to_ascii_lowercase();

        let mut probe = pos;
        while probe < bytes.len() && bytes[probe].is_ascii_whitespace() {
            probe += 1;
        }
        if bytes.get(probe) != Some(&b'=') {
            attrs.push(Attr {
                name: attr_name,
                value: None,
                quote: None,
            });
            continue;
        }
        pos = probe + 1;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let (value, quote) = match bytes.get(pos)? {
            q @ (b'"' | b'\'') => {
                let quote = *q as char;
                let close = input[pos + 1..].find(quote)? + pos + 1;
                let value = input[pos + 1..close].to_string();
                pos = close + 1;
                (value, Some(quote))
            }
            _ => {
                let start = pos;
                while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'>'
                {
                    pos += 1;
                }
                (input[start..pos].to_string(), None)
            }
        };
        attrs.push(Attr {
            name: attr_name,
            value: Some(value),
            quote,
        });
    }
}

fn is_attr_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'/' | b'>' | b'=' | b'"' | b'\'' | b'<')
}

/// Scan raw text content up to the matching end tag. Returns the body and the
/// offset just past the end tag (or end of input).
fn read_raw_text<'a>(input: &'a str, start: usize, name: &str) -> (&'a str, usize) {
    let needle = format!("</{}", name);
    let haystack = input[start..].to_ascii_lowercase();
    match haystack.find(&needle) {
        Some(rel) => {
            let body_end = start + rel;
            let after = input[body_end..]
                .find('>')
                .map(|gt| body_end + gt + 1)
                .unwrap_or(input.len());
            (&input[start..body_end], after)
        }
        None => (&input[start..], input.len()),
    }
}
