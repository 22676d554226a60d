use regex::Regex;
use std::sync::OnceLock;

use super::extract::ExtractedFields;
use super::fallback::{fallback_css, fallback_html, fallback_js};
use super::unescape::unescape;
use super::GenerationResult;

const BASELINE_CSS: &str = "body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    margin: 0;
    padding: 0;
}

";

/// Which fields ended up as canned fallback content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FallbackUsage {
    pub html: bool,
    pub css: bool,
    pub js: bool,
}

impl FallbackUsage {
    pub fn any(&self) -> bool {
        self.html || self.css || self.js
    }

    pub fn all(&self) -> bool {
        self.html && self.css && self.js
    }
}

pub fn clean_html(html: &str) -> String {
    let html = unescape(html);
    let trimmed = html.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let lower = trimmed.to_lowercase();
    if lower.starts_with("<!doctype") {
        trimmed.to_string()
    } else if lower.starts_with("<html") {
        format!("<!DOCTYPE html>\n{}", trimmed)
    } else {
        wrap_in_document(trimmed)
    }
}

fn wrap_in_document(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
    <meta charset=\"UTF-8\">
    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
    <title>Generated Website</title>
</head>
<body>
{}
</body>
</html>",
        fragment
    )
}

fn base_selector_regex() -> &'static Regex {
    static BASE: OnceLock<Regex> = OnceLock::new();
    BASE.get_or_init(|| {
        Regex::new(
            r"(?m)(?:^|[\s,}])body(?:\s|[,{:.\[>])|(?:^|[,}])\s*\*\s*(?:[{,]|::?[a-z])",
        )
        .expect("selector pattern")
    })
}

pub fn clean_css(css: &str) -> String {
    let css = unescape(css);
    let trimmed = css.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if base_selector_regex().is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}{}", BASELINE_CSS, trimmed)
    }
}

fn block_start_regex() -> &'static Regex {
    static BLOCK: OnceLock<Regex> = OnceLock::new();
    BLOCK.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*(?:if\s*\(|function\s+[A-Za-z_$][\w$]*\s*\()")
            .expect("block pattern")
    })
}

/// Characters after which a `/` opens a regex literal rather than dividing.
const REGEX_PRECEDERS: &[char] = &[
    '(', ',', '=', ':', '[', '!', '&', '|', '?', '{', '}', ';', '+', '-', '*', '%', '<', '>',
    '~', '^',
];

/// Net `{` count, ignoring braces inside strings, comments and regex literals.
fn brace_depth(text: &str) -> i64 {
    let chars: Vec<char> = text.chars().collect();
    let mut depth = 0;
    let mut prev: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let next = chars.get(i + 1).copied();
        match ch {
            '"' | '\'' | '`' => i = skip_quoted(&chars, i + 1, ch),
            '/' if next == Some('/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '/' if next == Some('*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
                continue;
            }
            '/' if prev.map_or(true, |p| REGEX_PRECEDERS.contains(&p)) => {
                i = skip_regex(&chars, i + 1);
            }
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
        if !ch.is_whitespace() {
            prev = Some(ch);
        }
        i += 1;
    }

    depth
}

/// Index of the closing `quote`, or the end of text when the literal never closes.
fn skip_quoted(chars: &[char], mut i: usize, quote: char) -> usize {
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            c if c == quote => return i,
            _ => {}
        }
        i += 1;
    }
    i
}

/// Index of the `/` ending a regex literal. A newline ends it early.
fn skip_regex(chars: &[char], mut i: usize) -> usize {
    let mut in_class = false;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => return i,
            '\n' => return i,
            _ => {}
        }
        i += 1;
    }
    i
}

/// Best-effort cleanup of model-written script. Not a parser: it only trims the
/// most common truncation damage.
pub fn clean_js(js: &str) -> String {
    let mut text = unescape(js);

    // Cut trailing `if (...) {` / `function f(...) {` blocks that never close.
    loop {
        let cut = block_start_regex()
            .find_iter(&text)
            .map(|m| m.start())
            .filter(|&start| {
                let tail = &text[start..];
                tail.contains('{') && brace_depth(tail) > 0
            })
            .last();
        match cut {
            Some(start) => text.truncate(start),
            None => break,
        }
    }

    let kept: Vec<&str> = text
        .lines()
        .filter(|line| !is_artifact_line(line))
        .collect();

    kept.join("\n").trim().to_string()
}

/// A lone quote or comma left behind by a cut-off string or list.
fn is_artifact_line(line: &str) -> bool {
    let trimmed = line.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => matches!(ch, '"' | '\'' | '`' | ','),
        _ => false,
    }
}

/// Clean every extracted field and substitute fallback content for whatever is
/// still empty. With `atomic`, a fallback HTML page drags CSS and JS along so the
/// placeholder markup keeps its matching styles and script.
pub fn finalize(
    fields: ExtractedFields,
    prompt: &str,
    atomic: bool,
) -> (GenerationResult, FallbackUsage) {
    let raw = fields.into_result();
    let mut html = clean_html(&raw.html);
    let mut css = clean_css(&raw.css);
    let mut js = clean_js(&raw.js);
    let mut usage = FallbackUsage::default();

    if html.trim().is_empty() {
        html = fallback_html(prompt);
        usage.html = true;
        if atomic {
            usage.css = true;
            usage.js = true;
        }
    }
    if usage.css || css.trim().is_empty() {
        css = fallback_css();
        usage.css = true;
    }
    if usage.js || js.trim().is_empty() {
        js = fallback_js();
        usage.js = true;
    }

    (GenerationResult { html, css, js }, usage)
}
