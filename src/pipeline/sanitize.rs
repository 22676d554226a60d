use regex::Regex;
use std::sync::OnceLock;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```(?:json|javascript|js)?").expect("fence pattern"))
}

/// Strip markdown fences and surrounding commentary from a raw model response.
///
/// The result is trimmed to the outermost `{ ... }` span when one exists. A
/// response truncated mid-object is cut back to its last `}`; text without any
/// `}` comes back unchanged apart from fence removal and trimming.
pub fn sanitize(raw: &str) -> String {
    let stripped = fence_regex().replace_all(raw, "");
    let text = stripped.trim();

    let mut span = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    };

    if !span.ends_with('}') {
        if let Some(end) = span.rfind('}') {
            span = &span[..=end];
        }
    }

    span.trim().to_string()
}
