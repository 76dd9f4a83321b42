use std::sync::LazyLock;

use regex::Regex;

pub trait MarkupStripper {
    fn strip(&self, html: &str) -> String;
}

static SCRIPT_OR_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>")
        .expect("script/style regex compiles")
});
static BLOCK_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|li|h[1-6]|tr|table|blockquote|pre)\s*>")
        .expect("block break regex compiles")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex compiles"));
static INLINE_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").expect("space regex compiles"));
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n+").expect("blank line regex compiles"));

#[derive(Debug, Default, Clone, Copy)]
pub struct TagStripper;

impl MarkupStripper for TagStripper {
    fn strip(&self, html: &str) -> String {
        let text = SCRIPT_OR_STYLE_RE.replace_all(html, "");
        let text = BLOCK_BREAK_RE.replace_all(&text, "\n");
        let text = TAG_RE.replace_all(&text, "");
        let text = decode_entities(&text);
        let text = INLINE_SPACE_RE.replace_all(&text, " ");
        let text = BLANK_LINES_RE.replace_all(&text, "\n");

        text.lines()
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

pub fn remove_tags(text: &str) -> String {
    TAG_RE.replace_all(text, " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        // Last, so `&amp;lt;` decodes to the literal `&lt;`.
        .replace("&amp;", "&")
}
