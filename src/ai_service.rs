use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

pub const WEBSITE_PROMPT_TEMPLATE: &str = r#"You are an expert web developer. Create a complete, functional website based on the following description:
"{description}"
Respond ONLY with a valid JSON object with these keys:
- html: complete HTML code
- css: complete CSS code
- js: complete JavaScript code
Requirements:
1. The website must be fully responsive
2. Use modern, clean design
3. Include all necessary functionality
4. No placeholders - use actual content
5. No explanations or markdown formatting. Only return a raw JSON object."#;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, Hash, PartialEq)]
pub enum AIProvider {
    Gemini,
    OpenRouter,
    Ollama,
}

impl AIProvider {
    pub fn default_model(&self) -> &'static str {
        match self {
            AIProvider::Gemini => "gemini-1.5-flash",
            AIProvider::OpenRouter => "google/gemini-2.0-flash-exp:free",
            AIProvider::Ollama => "qwen2.5-coder:7b",
        }
    }
}

/// Failures that the HTTP layer reports with their own error tag.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("{0} API key not configured")]
    NotConfigured(&'static str),
    #[error("{provider} API error: {status} - Body: {body}")]
    Http {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Invalid {0} response format")]
    MalformedResponse(&'static str),
    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),
}

#[derive(Debug, Clone)]
pub struct AIConfig {
    pub primary_provider: AIProvider,
    pub backup_providers: Vec<AIProvider>,
    pub provider_models: HashMap<AIProvider, String>,
    pub api_keys: HashMap<AIProvider, String>,
    pub base_urls: HashMap<AIProvider, String>,
    pub timeout: Duration,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            primary_provider: AIProvider::Gemini,
            backup_providers: Vec::new(),
            provider_models: HashMap::new(),
            api_keys: HashMap::new(),
            base_urls: HashMap::new(),
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Clone)]
pub struct AIService {
    config: AIConfig,
    client: Client,
}

impl AIService {
    pub fn new(config: AIConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &AIConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.get_provider_order()
            .iter()
            .any(|p| *p == AIProvider::Ollama || self.config.api_keys.contains_key(p))
    }

    pub fn build_prompt(description: &str) -> String {
        WEBSITE_PROMPT_TEMPLATE.replace("{description}", description)
    }

    /// Ask the model for a website and return its raw text, untouched.
    pub async fn generate_website(&self, description: &str) -> Result<String> {
        let prompt = Self::build_prompt(description);
        self.try_providers_for_prompt(&prompt).await
    }

    async fn try_providers_for_prompt(&self, prompt: &str) -> Result<String> {
        let mut last_error = anyhow!("No AI providers configured");

        for provider in self.get_provider_order() {
            let model = self.model_for(provider);
            debug!("Calling {:?} with model {}", provider, model);

            let result = match provider {
                AIProvider::Gemini => self.call_gemini(prompt, &model).await,
                AIProvider::OpenRouter => self.call_openrouter(prompt, &model).await,
                AIProvider::Ollama => self.call_ollama(prompt, &model).await,
            };

            match result {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!("⚠️  {:?} failed: {}", provider, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    fn get_provider_order(&self) -> Vec<AIProvider> {
        let mut providers = vec![self.config.primary_provider];
        for backup in &self.config.backup_providers {
            if !providers.contains(backup) {
                providers.push(*backup);
            }
        }
        providers
    }

    fn model_for(&self, provider: AIProvider) -> String {
        self.config
            .provider_models
            .get(&provider)
            .cloned()
            .unwrap_or_else(|| provider.default_model().to_string())
    }

    fn base_url(&self, provider: AIProvider, default: &str) -> String {
        self.config
            .base_urls
            .get(&provider)
            .map(|s| s.as_str())
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    async fn read_json(
        provider: &'static str,
        response: reqwest::Response,
    ) -> Result<serde_json::Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Http {
                provider,
                status,
                body,
            }
            .into());
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|_| ProviderError::MalformedResponse(provider).into())
    }

    fn non_empty(provider: &'static str, text: Option<&str>) -> Result<String> {
        let text = text.ok_or(ProviderError::MalformedResponse(provider))?;
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse(provider).into());
        }
        Ok(text.to_string())
    }

    async fn call_gemini(&self, prompt: &str, model: &str) -> Result<String> {
        let api_key = self
            .config
            .api_keys
            .get(&AIProvider::Gemini)
            .ok_or(ProviderError::NotConfigured("Gemini"))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url(AIProvider::Gemini, DEFAULT_GEMINI_BASE_URL),
            model,
            api_key
        );

        let body = serde_json::json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }]
        });

        let response = self
            .client
            .post(&url)
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await?;
        let json = Self::read_json("Gemini", response).await?;

        // candidates[0].content.parts[*].text
        let parts = json["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or(ProviderError::MalformedResponse("Gemini"))?;
        let text: Vec<&str> = parts.iter().filter_map(|p| p["text"].as_str()).collect();

        Self::non_empty("Gemini", Some(text.join("").as_str()))
    }

    async fn call_openrouter(&self, prompt: &str, model: &str) -> Result<String> {
        let api_key = self
            .config
            .api_keys
            .get(&AIProvider::OpenRouter)
            .ok_or(ProviderError::NotConfigured("OpenRouter"))?;

        let url = format!(
            "{}/api/v1/chat/completions",
            self.base_url(AIProvider::OpenRouter, DEFAULT_OPENROUTER_BASE_URL)
        );

        let body = serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}]
        });

        let response = self
            .client
            .post(&url)
            .timeout(self.config.timeout)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await?;
        let json = Self::read_json("OpenRouter", response).await?;

        Self::non_empty(
            "OpenRouter",
            json["choices"][0]["message"]["content"].as_str(),
        )
    }

    async fn call_ollama(&self, prompt: &str, model: &str) -> Result<String> {
        let url = format!(
            "{}/api/generate",
            self.base_url(AIProvider::Ollama, DEFAULT_OLLAMA_BASE_URL)
        );

        let body = serde_json::json!({
            "model": model,
            "prompt": prompt,
            "stream": false,
            "format": "json"
        });

        let response = self
            .client
            .post(&url)
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await?;
        let json = Self::read_json("Ollama", response).await?;

        Self::non_empty("Ollama", json["response"].as_str())
    }
}
