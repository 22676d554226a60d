use crate::ai_service::{AIConfig, AIProvider};
use crate::deploy::poll::PollPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 5000;
pub const DEFAULT_MAX_HTML_BYTES: usize = 25 * 1024 * 1024;
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];

/// Static hosting backends a bundle can be pushed to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HostingKind {
    Netlify,
    Vercel,
}

impl HostingKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "netlify" => Some(HostingKind::Netlify),
            "vercel" => Some(HostingKind::Vercel),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            HostingKind::Netlify => "Netlify",
            HostingKind::Vercel => "Vercel",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_cors_origins() -> Vec<String> {
    DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AiSettings {
    #[serde(default)]
    pub provider: Option<AIProvider>,
    #[serde(default)]
    pub backup_providers: Vec<AIProvider>,
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub model_overrides: HashMap<String, String>, // provider name -> model
    #[serde(default)]
    pub base_urls: HashMap<String, String>, // provider name -> base url
}

fn default_ai_timeout_secs() -> u64 {
    120
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: None,
            backup_providers: Vec::new(),
            model_overrides: HashMap::new(),
            base_urls: HashMap::new(),
            timeout_secs: default_ai_timeout_secs(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HostingConfig {
    #[serde(default)]
    pub provider: Option<HostingKind>,
    #[serde(default = "default_netlify_api_base")]
    pub netlify_api_base: String,
    #[serde(default = "default_vercel_api_base")]
    pub vercel_api_base: String,
    #[serde(default = "PollPolicy::accessibility")]
    pub accessibility_poll: PollPolicy,
    #[serde(default = "PollPolicy::deployment_state")]
    pub deployment_poll: PollPolicy,
}

fn default_netlify_api_base() -> String {
    "https://api.netlify.com".to_string()
}
fn default_vercel_api_base() -> String {
    "https://api.vercel.com".to_string()
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            provider: None,
            netlify_api_base: default_netlify_api_base(),
            vercel_api_base: default_vercel_api_base(),
            accessibility_poll: PollPolicy::accessibility(),
            deployment_poll: PollPolicy::deployment_state(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Limits {
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
    #[serde(default = "default_max_html_bytes")]
    pub max_html_bytes: usize,
}

fn default_max_prompt_chars() -> usize {
    DEFAULT_MAX_PROMPT_CHARS
}
fn default_max_html_bytes() -> usize {
    DEFAULT_MAX_HTML_BYTES
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_prompt_chars: default_max_prompt_chars(),
            max_html_bytes: default_max_html_bytes(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct WebCraftConfig {
    #[serde(default)]
    pub atomic_fallback: bool,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub hosting: HostingConfig,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub api_keys: HashMap<String, String>, // "Gemini", "OpenRouter", "Netlify", "Vercel"
}

fn parse_provider(name: &str) -> Option<AIProvider> {
    match name.trim().to_lowercase().as_str() {
        "gemini" => Some(AIProvider::Gemini),
        "openrouter" => Some(AIProvider::OpenRouter),
        "ollama" => Some(AIProvider::Ollama),
        _ => None,
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl WebCraftConfig {
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(".webcraft").join("config.toml"))
    }

    /// Load `~/.webcraft/config.toml` (if present) and apply environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Environment variables win over the config file. API keys only fall back
    /// to the environment when the file leaves them unset.
    pub fn apply_env(&mut self) {
        if let Some(port) = env_value("WEBCRAFT_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(host) = env_value("WEBCRAFT_HOST") {
            self.server.host = host;
        }
        if let Some(origins) = env_value("WEBCRAFT_CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(kind) = env_value("WEBCRAFT_HOSTING").and_then(|h| HostingKind::parse(&h)) {
            self.hosting.provider = Some(kind);
        }
        if let Some(flag) = env_value("WEBCRAFT_ATOMIC_FALLBACK") {
            self.atomic_fallback = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(model) = env_value("GEMINI_MODEL") {
            self.ai
                .model_overrides
                .insert("Gemini".to_string(), model);
        }
        if let Some(url) = env_value("GEMINI_BASE_URL") {
            self.ai.base_urls.insert("Gemini".to_string(), url);
        }
        if let Some(url) = env_value("OLLAMA_BASE_URL") {
            self.ai.base_urls.insert("Ollama".to_string(), url);
        }
        if let Some(url) = env_value("NETLIFY_API_BASE") {
            self.hosting.netlify_api_base = url;
        }
        if let Some(url) = env_value("VERCEL_API_BASE") {
            self.hosting.vercel_api_base = url;
        }

        for (name, var) in [
            ("Gemini", "GEMINI_API_KEY"),
            ("OpenRouter", "OPENROUTER_API_KEY"),
            ("Netlify", "NETLIFY_TOKEN"),
            ("Vercel", "VERCEL_TOKEN"),
        ] {
            let missing = self.api_key(name).is_none();
            if missing {
                if let Some(key) = env_value(var) {
                    self.api_keys.insert(name.to_string(), key);
                }
            }
        }
    }

    pub fn api_key(&self, name: &str) -> Option<&str> {
        self.api_keys
            .get(name)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
    }

    pub fn netlify_token(&self) -> Option<&str> {
        self.api_key("Netlify")
    }

    pub fn vercel_token(&self) -> Option<&str> {
        self.api_key("Vercel")
    }

    /// Explicit preference wins when its credential exists; a preference without a
    /// credential disables hosting. With no preference, Netlify then Vercel.
    pub fn hosting_kind(&self) -> Option<HostingKind> {
        let has_token = |kind: HostingKind| match kind {
            HostingKind::Netlify => self.netlify_token().is_some(),
            HostingKind::Vercel => self.vercel_token().is_some(),
        };

        match self.hosting.provider {
            Some(kind) if has_token(kind) => Some(kind),
            Some(_) => None,
            None => [HostingKind::Netlify, HostingKind::Vercel]
                .into_iter()
                .find(|k| has_token(*k)),
        }
    }

    pub fn ai_config(&self) -> AIConfig {
        let mut provider_models = HashMap::new();
        for (provider_name, model_name) in &self.ai.model_overrides {
            if let Some(p) = parse_provider(provider_name) {
                provider_models.insert(p, model_name.clone());
            }
        }

        let mut base_urls = HashMap::new();
        for (provider_name, url) in &self.ai.base_urls {
            if let Some(p) = parse_provider(provider_name) {
                base_urls.insert(p, url.clone());
            }
        }

        let mut api_keys = HashMap::new();
        if let Some(key) = self.api_key("Gemini") {
            api_keys.insert(AIProvider::Gemini, key.to_string());
        }
        if let Some(key) = self.api_key("OpenRouter") {
            api_keys.insert(AIProvider::OpenRouter, key.to_string());
        }

        // Priority: Config Preference > Gemini > OpenRouter > Ollama
        let primary_provider = if let Some(pref) = self.ai.provider {
            pref
        } else if api_keys.contains_key(&AIProvider::Gemini) {
            AIProvider::Gemini
        } else if api_keys.contains_key(&AIProvider::OpenRouter) {
            AIProvider::OpenRouter
        } else {
            AIProvider::Gemini
        };

        AIConfig {
            primary_provider,
            backup_providers: self.ai.backup_providers.clone(),
            provider_models,
            api_keys,
            base_urls,
            timeout: Duration::from_secs(self.ai.timeout_secs),
        }
    }
}
