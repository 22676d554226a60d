//! Tolerant parsing of model output into deployable HTML/CSS/JS.
//!
//! raw text -> [`sanitize`] -> extraction cascade (structured, regex, manual)
//! -> cleanup -> fallback substitution. Nothing in here returns an error: the
//! worst case is a placeholder site built from the prompt.

pub mod extract;
pub mod fallback;
pub mod linker;
pub mod sanitize;
pub mod unescape;
pub mod validate;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use extract::{ExtractedFields, ExtractionStrategy};
pub use linker::link_assets;
pub use sanitize::sanitize;
pub use unescape::unescape;
pub use validate::FallbackUsage;

/// Canonical output of one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub html: String,
    pub css: String,
    pub js: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Replace CSS and JS too whenever the HTML falls back.
    pub atomic_fallback: bool,
}

#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub result: GenerationResult,
    /// Strategy that produced all three fields, `None` when the cascade failed.
    pub strategy: Option<ExtractionStrategy>,
    pub fallback: FallbackUsage,
}

impl ParseOutcome {
    pub fn source(&self) -> &'static str {
        match self.strategy {
            Some(strategy) => strategy.name(),
            None => "fallback",
        }
    }
}

/// Run the extraction cascade over a raw response. Returns the winning strategy
/// and its fields, or `None` plus whatever partial fields were recovered.
pub fn run_cascade(raw: &str) -> (Option<ExtractionStrategy>, ExtractedFields) {
    let sanitized = sanitize(raw);
    let mut partial = ExtractedFields::default();

    for strategy in ExtractionStrategy::CASCADE {
        match strategy.extract(strategy.input(raw, &sanitized)) {
            Some(fields) if fields.is_complete() => {
                debug!("Extraction succeeded with {} strategy", strategy.name());
                return (Some(strategy), fields);
            }
            Some(fields) => {
                debug!(
                    "{} strategy left fields empty, trying next strategy",
                    strategy.name()
                );
                partial.fill_missing(fields);
            }
            None => debug!("{} strategy did not apply", strategy.name()),
        }
    }

    (None, partial)
}

/// Full pipeline: cascade, cleanup and fallback. Always yields three non-empty
/// fields.
pub fn parse_response(raw: &str, prompt: &str, options: PipelineOptions) -> ParseOutcome {
    let (strategy, fields) = run_cascade(raw);
    if strategy.is_none() {
        warn!("⚠️  All extraction strategies failed, using fallback content where needed");
    }

    let (result, fallback) = validate::finalize(fields, prompt, options.atomic_fallback);
    if fallback.any() {
        info!(
            "Fallback content used (html: {}, css: {}, js: {})",
            fallback.html, fallback.css, fallback.js
        );
    }

    ParseOutcome {
        result,
        strategy,
        fallback,
    }
}
