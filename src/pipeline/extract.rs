use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use super::unescape::unescape;
use super::GenerationResult;

pub const FIELD_NAMES: [&str; 3] = ["html", "css", "js"];

/// Per-field output of one extraction attempt.
///
/// `None` means the strategy could not locate the field at all; `Some("")`
/// means the field was found and is legitimately empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub html: Option<String>,
    pub css: Option<String>,
    pub js: Option<String>,
}

impl ExtractedFields {
    fn from_lookup(mut lookup: impl FnMut(&str) -> Option<String>) -> Self {
        Self {
            html: lookup("html"),
            css: lookup("css"),
            js: lookup("js"),
        }
    }

    fn slots(&self) -> [&Option<String>; 3] {
        [&self.html, &self.css, &self.js]
    }

    pub fn is_empty(&self) -> bool {
        self.slots().iter().all(|slot| slot.is_none())
    }

    /// Every field found and carrying non-whitespace content.
    pub fn is_complete(&self) -> bool {
        self.slots()
            .iter()
            .all(|slot| slot.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    /// Take values from `other` for every field this one is still missing.
    pub fn fill_missing(&mut self, other: ExtractedFields) {
        fn fill(slot: &mut Option<String>, candidate: Option<String>) {
            let missing = slot.as_deref().map_or(true, |v| v.trim().is_empty());
            if missing {
                if let Some(value) = candidate.filter(|v| !v.trim().is_empty()) {
                    *slot = Some(value);
                }
            }
        }
        fill(&mut self.html, other.html);
        fill(&mut self.css, other.css);
        fill(&mut self.js, other.js);
    }

    pub fn into_result(self) -> GenerationResult {
        GenerationResult {
            html: self.html.unwrap_or_default(),
            css: self.css.unwrap_or_default(),
            js: self.js.unwrap_or_default(),
        }
    }
}

/// The parse attempts of the cascade, ordered from strictest to most tolerant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    Structured,
    Regex,
    Manual,
}

impl ExtractionStrategy {
    pub const CASCADE: [ExtractionStrategy; 3] = [
        ExtractionStrategy::Structured,
        ExtractionStrategy::Regex,
        ExtractionStrategy::Manual,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExtractionStrategy::Structured => "structured",
            ExtractionStrategy::Regex => "regex",
            ExtractionStrategy::Manual => "manual",
        }
    }

    /// Structured decoding wants the sanitized object; the scanners read the raw
    /// response so that sanitizer truncation cannot cost them a field.
    pub fn input<'a>(&self, raw: &'a str, sanitized: &'a str) -> &'a str {
        match self {
            ExtractionStrategy::Structured => sanitized,
            ExtractionStrategy::Regex | ExtractionStrategy::Manual => raw,
        }
    }

    pub fn extract(&self, text: &str) -> Option<ExtractedFields> {
        match self {
            ExtractionStrategy::Structured => extract_structured(text),
            ExtractionStrategy::Regex => extract_with_patterns(text),
            ExtractionStrategy::Manual => extract_manually(text),
        }
    }
}

/// Strict JSON decoding. A missing key reads as an empty string; a document that
/// does not decode to an object yields `None`.
pub fn extract_structured(text: &str) -> Option<ExtractedFields> {
    let value: Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;

    Some(ExtractedFields::from_lookup(|key| {
        Some(match object.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
    }))
}

struct FieldPatterns {
    name: &'static str,
    patterns: Vec<Regex>,
}

fn field_patterns() -> &'static [FieldPatterns] {
    static PATTERNS: OnceLock<Vec<FieldPatterns>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        FIELD_NAMES
            .iter()
            .map(|&name| FieldPatterns {
                name,
                patterns: [
                    // "html": "..."
                    format!(r#"(?s)"{name}"\s*:\s*"((?:[^"\\]|\\.)*)""#),
                    // 'html': '...'
                    format!(r#"(?s)["']{name}["']\s*:\s*'((?:[^'\\]|\\.)*)'"#),
                    // "html": `...`
                    format!(r#"(?s)["']?{name}["']?\s*:\s*`([^`]*)`"#),
                    // html: "..."
                    format!(r#"(?s)(?:^|[{{,\s]){name}\s*:\s*"((?:[^"\\]|\\.)*)""#),
                ]
                .iter()
                .map(|p| Regex::new(p).expect("field pattern"))
                .collect(),
            })
            .collect()
    })
}

/// Pattern-based fallback that only needs each field's local `key: value`
/// shape to be intact.
pub fn extract_with_patterns(text: &str) -> Option<ExtractedFields> {
    let fields = ExtractedFields::from_lookup(|key| {
        let entry = field_patterns().iter().find(|f| f.name == key)?;
        entry.patterns.iter().find_map(|re| {
            re.captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| unescape(m.as_str()))
        })
    });

    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

/// Last-resort scan: `"field"`, the next `:`, the next `"`, then a quote-aware
/// walk to the matching unescaped `"`.
pub fn scan_field(text: &str, field: &str) -> Option<String> {
    let key = format!("\"{field}\"");
    let after_key = text.find(&key)? + key.len();
    let colon = after_key + text[after_key..].find(':')?;
    let open = colon + 1 + text[colon + 1..].find('"')?;
    let start = open + 1;

    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => return Some(unescape(&text[start..start + offset])),
            _ => {}
        }
    }

    None
}

pub fn extract_manually(text: &str) -> Option<ExtractedFields> {
    let fields = ExtractedFields::from_lookup(|key| scan_field(text, key));
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}
