use anyhow::Result;
use tracing::info;

use crate::ai_service::AIService;
use crate::logging::truncate_for_log;
use crate::pipeline::{parse_response, ParseOutcome, PipelineOptions};

const PROMPT_LOG_CHARS: usize = 100;

/// Prompt in, three deployable assets out.
#[derive(Clone)]
pub struct WebsiteGenerator {
    ai: AIService,
    options: PipelineOptions,
}

impl WebsiteGenerator {
    pub fn new(ai: AIService, options: PipelineOptions) -> Self {
        Self { ai, options }
    }

    pub fn ai(&self) -> &AIService {
        &self.ai
    }

    pub fn is_configured(&self) -> bool {
        self.ai.is_configured()
    }

    /// Only transport and provider failures are errors. Anything the model
    /// sends back is turned into a result, with fallback content if needed.
    pub async fn generate(&self, prompt: &str) -> Result<ParseOutcome> {
        info!(
            "🎨 Generating website for prompt: {}",
            truncate_for_log(prompt, PROMPT_LOG_CHARS)
        );

        let raw = self.ai.generate_website(prompt).await?;
        info!("Received AI response ({} chars)", raw.len());

        let outcome = parse_response(&raw, prompt, self.options);
        info!(
            "✅ Website generated (source: {}, html: {} chars, css: {} chars, js: {} chars)",
            outcome.source(),
            outcome.result.html.len(),
            outcome.result.css.len(),
            outcome.result.js.len()
        );
        Ok(outcome)
    }
}
