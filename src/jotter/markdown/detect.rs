use once_cell::sync::Lazy;
use regex::RegexSet;

static MARKDOWN_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?m)^#{1,6} ",                // heading
        r"(?m)^[-*+] ",                 // bullet
        r"(?m)^\d+\. ",                 // numbered item
        r"\*\*[^*\n]+\*\*",             // bold
        r"(?:^|[^*])\*[^*\s][^*\n]*\*", // italic
        r"`[^`\n]+`",                   // inline code
        r"(?m)^```",                    // fence
        r"(?m)^>",                      // blockquote
        r"\[[^\]\n]+\]\([^)\s]+\)",     // link
    ])
    .unwrap()
});

/// Whether pasted plain text should be treated as Markdown.
///
/// Errs on the side of yes: converting ordinary prose just yields paragraphs.
pub fn looks_like_markdown(text: &str) -> bool {
    MARKDOWN_PATTERNS.is_match(text)
}
