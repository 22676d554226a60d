use regex::Regex;
use std::sync::OnceLock;

pub const MIN_PROJECT_NAME_LENGTH: usize = 3;
pub const MAX_PROJECT_NAME_LENGTH: usize = 63;

fn valid_name_regex() -> &'static Regex {
    static VALID: OnceLock<Regex> = OnceLock::new();
    VALID.get_or_init(|| Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").expect("name pattern"))
}

fn invalid_chars_regex() -> &'static Regex {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    INVALID.get_or_init(|| Regex::new(r"[^a-z0-9\s-]").expect("invalid chars pattern"))
}

fn whitespace_regex() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern"))
}

fn hyphens_regex() -> &'static Regex {
    static HYPHENS: OnceLock<Regex> = OnceLock::new();
    HYPHENS.get_or_init(|| Regex::new(r"-+").expect("hyphen pattern"))
}

/// `webcraft-site-<unix millis>`, used whenever a usable slug cannot be derived.
pub fn fallback_project_name() -> String {
    format!("webcraft-site-{}", chrono::Utc::now().timestamp_millis())
}

pub fn is_valid_project_name(name: &str) -> bool {
    (MIN_PROJECT_NAME_LENGTH..=MAX_PROJECT_NAME_LENGTH).contains(&name.len())
        && valid_name_regex().is_match(name)
}

/// Turn free text into a hosting-safe slug: lowercase alphanumerics and single
/// hyphens, 3 to 63 characters, no hyphen at either end.
pub fn sanitize_project_name(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let stripped = invalid_chars_regex().replace_all(&lower, "");
    let hyphenated = whitespace_regex().replace_all(stripped.trim(), "-");
    let collapsed = hyphens_regex().replace_all(&hyphenated, "-");
    let mut slug = collapsed.trim_matches('-').to_string();

    if slug.len() > MAX_PROJECT_NAME_LENGTH {
        // ASCII only at this point, so byte truncation is safe
        slug.truncate(MAX_PROJECT_NAME_LENGTH);
        slug = slug.trim_end_matches('-').to_string();
    }

    if is_valid_project_name(&slug) {
        slug
    } else {
        fallback_project_name()
    }
}
