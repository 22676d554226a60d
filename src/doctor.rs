use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::config::{HostingKind, WebCraftConfig};
use crate::deploy::poll::PollPolicy;
use crate::deploy::NetlifyClient;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DoctorCheck {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
}

impl DoctorCheck {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DoctorReport {
    pub checks: Vec<DoctorCheck>,
    pub overall_health: CheckStatus,
    /// Raw Netlify probe results: `tokenValid`, `accountInfo`, `existingSites`,
    /// `testDeploymentUrl`, `siteAccessible`.
    pub netlify: Map<String, Value>,
}

pub struct WebCraftDoctor<'a> {
    config: &'a WebCraftConfig,
    client: Client,
    test_deployment: bool,
}

impl<'a> WebCraftDoctor<'a> {
    pub fn new(config: &'a WebCraftConfig, client: Client) -> Self {
        Self {
            config,
            client,
            test_deployment: true,
        }
    }

    /// Skip publishing the throwaway test site.
    pub fn without_test_deployment(mut self) -> Self {
        self.test_deployment = false;
        self
    }

    pub async fn run(&self) -> DoctorReport {
        let mut checks = Vec::new();
        let mut netlify = Map::new();

        // 1. AI provider
        checks.push(self.check_ai_provider());

        // 2. Hosting selection
        checks.push(self.check_hosting());

        // 3. Netlify connectivity
        self.check_netlify(&mut checks, &mut netlify).await;

        let overall_health = if checks.iter().any(|c| matches!(c.status, CheckStatus::Fail)) {
            CheckStatus::Fail
        } else if checks
            .iter()
            .any(|c| matches!(c.status, CheckStatus::Warning))
        {
            CheckStatus::Warning
        } else {
            CheckStatus::Pass
        };

        DoctorReport {
            checks,
            overall_health,
            netlify,
        }
    }

    fn check_ai_provider(&self) -> DoctorCheck {
        let ai = self.config.ai_config();
        let configured = ai.api_keys.contains_key(&ai.primary_provider)
            || matches!(ai.primary_provider, crate::ai_service::AIProvider::Ollama);

        if configured {
            DoctorCheck::new(
                "AI Provider",
                CheckStatus::Pass,
                format!("{:?} is configured", ai.primary_provider),
            )
        } else if !ai.backup_providers.is_empty() {
            DoctorCheck::new(
                "AI Provider",
                CheckStatus::Warning,
                format!(
                    "{:?} has no API key, relying on backup providers",
                    ai.primary_provider
                ),
            )
        } else {
            DoctorCheck::new(
                "AI Provider",
                CheckStatus::Fail,
                format!(
                    "{:?} API key missing. Set GEMINI_API_KEY or configure a provider.",
                    ai.primary_provider
                ),
            )
        }
    }

    fn check_hosting(&self) -> DoctorCheck {
        match self.config.hosting_kind() {
            Some(kind) => DoctorCheck::new(
                "Hosting Provider",
                CheckStatus::Pass,
                format!("Deployments go to {}", kind.display_name()),
            ),
            None => DoctorCheck::new(
                "Hosting Provider",
                CheckStatus::Fail,
                "No hosting credential. Set NETLIFY_TOKEN or VERCEL_TOKEN.",
            ),
        }
    }

    async fn check_netlify(&self, checks: &mut Vec<DoctorCheck>, details: &mut Map<String, Value>) {
        let token = match self.config.netlify_token() {
            Some(token) => token,
            None => {
                details.insert("tokenValid".into(), json!(false));
                details.insert("error".into(), json!("Netlify token is not configured"));
                let status = if self.config.hosting_kind() == Some(HostingKind::Vercel) {
                    CheckStatus::Warning
                } else {
                    CheckStatus::Fail
                };
                checks.push(DoctorCheck::new(
                    "Netlify Token",
                    status,
                    "Netlify token is not configured",
                ));
                return;
            }
        };

        let netlify = NetlifyClient::new(
            self.client.clone(),
            token,
            &self.config.hosting.netlify_api_base,
            PollPolicy::accessibility(),
        );

        let token_valid = netlify.token_valid().await;
        details.insert("tokenValid".into(), json!(token_valid));
        if !token_valid {
            checks.push(DoctorCheck::new(
                "Netlify Token",
                CheckStatus::Fail,
                "Netlify rejected the token",
            ));
            return;
        }
        checks.push(DoctorCheck::new(
            "Netlify Token",
            CheckStatus::Pass,
            "Token accepted",
        ));

        let account = netlify.account_info().await;
        let who = account["email"]
            .as_str()
            .or_else(|| account["full_name"].as_str())
            .unwrap_or("unknown account")
            .to_string();
        details.insert("accountInfo".into(), account);
        checks.push(DoctorCheck::new(
            "Netlify Account",
            CheckStatus::Pass,
            format!("Signed in as {}", who),
        ));

        match netlify.list_sites().await {
            Some(sites) => {
                checks.push(DoctorCheck::new(
                    "Existing Sites",
                    CheckStatus::Pass,
                    format!("{} sites on this account", sites.len()),
                ));
                details.insert("existingSites".into(), Value::Array(sites));
            }
            None => {
                details.insert("existingSites".into(), Value::Null);
                checks.push(DoctorCheck::new(
                    "Existing Sites",
                    CheckStatus::Warning,
                    "Could not list sites",
                ));
            }
        }

        if !self.test_deployment {
            return;
        }

        info!("🧪 Running Netlify test deployment...");
        let test_url = netlify.test_minimal_deployment().await;
        details.insert("testDeploymentUrl".into(), json!(test_url));
        let Some(url) = test_url else {
            checks.push(DoctorCheck::new(
                "Test Deployment",
                CheckStatus::Fail,
                "Minimal deployment failed",
            ));
            return;
        };
        checks.push(DoctorCheck::new(
            "Test Deployment",
            CheckStatus::Pass,
            format!("Deployed to {}", url),
        ));

        let accessible = netlify.site_accessible(&url).await;
        details.insert("siteAccessible".into(), json!(accessible));
        checks.push(if accessible {
            DoctorCheck::new("Site Accessibility", CheckStatus::Pass, "Test site is live")
        } else {
            DoctorCheck::new(
                "Site Accessibility",
                CheckStatus::Warning,
                "Test site is not reachable yet (propagation can take a minute)",
            )
        });
    }
}
