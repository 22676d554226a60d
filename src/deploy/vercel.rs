use anyhow::{anyhow, Context, Result};
use reqwest::{header, Client};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::bundle::{DeploymentDescriptor, InlineFile};
use super::poll::{poll_until, PollPolicy, PollStep};
use super::DeploymentOutcome;
use crate::config::HostingKind;

const USER_AGENT: &str = "WebCraft-Static-Deployment/1.0";

#[derive(Debug, Serialize)]
struct DeploymentMeta {
    #[serde(rename = "githubDeployment")]
    github_deployment: &'static str,
}

#[derive(Debug, Serialize)]
struct DeploymentPayload<'a> {
    name: &'a str,
    target: &'static str,
    public: bool,
    files: Vec<InlineFile>,
    meta: DeploymentMeta,
}

#[derive(Clone)]
pub struct VercelClient {
    client: Client,
    token: String,
    api_base: String,
    poll: PollPolicy,
}

fn with_https(url: &str) -> String {
    if url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url.trim_start_matches("http://"))
    }
}

fn fallback_url(deployment_id: &str) -> String {
    format!("https://{}.vercel.app", deployment_id)
}

impl VercelClient {
    pub fn new(client: Client, token: &str, api_base: &str, poll: PollPolicy) -> Self {
        Self {
            client,
            token: token.trim().to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            poll,
        }
    }

    fn deployments_url(&self) -> String {
        format!("{}/v6/deployments", self.api_base)
    }

    pub async fn deploy(&self, descriptor: &DeploymentDescriptor) -> Result<DeploymentOutcome> {
        info!("🚀 Starting deployment to Vercel for project: {}", descriptor.project_name);

        let payload = DeploymentPayload {
            name: &descriptor.project_name,
            target: "production",
            public: true,
            files: descriptor.bundle.to_inline_files(),
            meta: DeploymentMeta {
                github_deployment: "0",
            },
        };
        debug!("Created static deployment payload with {} files", payload.files.len());

        let response = self
            .client
            .post(self.deployments_url())
            .bearer_auth(&self.token)
            .header(header::USER_AGENT, USER_AGENT)
            .json(&payload)
            .send()
            .await
            .context("Failed to reach Vercel API")?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Vercel API error: {} - Response: {}", status, body);
            return Err(anyhow!("Vercel API error: {} - {}", status, body));
        }

        let body: Value = response
            .json()
            .await
            .context("Empty response from Vercel API")?;
        let deployment_id = body["id"]
            .as_str()
            .ok_or_else(|| anyhow!("No deployment ID received from Vercel"))?
            .to_string();
        info!("Deployment created with ID: {}", deployment_id);

        let url = if let Some(url) = body["url"].as_str().filter(|u| !u.is_empty()) {
            with_https(url)
        } else if let Some(alias) = body["alias"][0].as_str() {
            with_https(alias)
        } else {
            self.wait_for_ready(&deployment_id).await?
        };

        Ok(DeploymentOutcome {
            provider: HostingKind::Vercel,
            url,
            site_id: Some(deployment_id),
        })
    }

    /// Poll the deployment until READY. ERROR/CANCELED fail; running out of
    /// attempts falls back to the `<id>.vercel.app` address.
    async fn wait_for_ready(&self, deployment_id: &str) -> Result<String> {
        info!("Waiting for deployment {} to complete...", deployment_id);
        let url = format!("{}/{}", self.deployments_url(), deployment_id);
        let max_attempts = self.poll.max_attempts;

        let outcome = poll_until(self.poll, |attempt| {
            let url = url.clone();
            async move {
                let response = match self.client.get(&url).bearer_auth(&self.token).send().await {
                    Ok(resp) if resp.status().is_success() => resp,
                    Ok(resp) => {
                        warn!(
                            "Error checking deployment status (attempt {}/{}): {}",
                            attempt,
                            max_attempts,
                            resp.status()
                        );
                        return PollStep::Pending;
                    }
                    Err(e) => {
                        warn!(
                            "Error checking deployment status (attempt {}/{}): {}",
                            attempt, max_attempts, e
                        );
                        return PollStep::Pending;
                    }
                };

                let body: Value = match response.json().await {
                    Ok(body) => body,
                    Err(_) => return PollStep::Pending,
                };

                let state = body["readyState"]
                    .as_str()
                    .or_else(|| body["state"].as_str())
                    .unwrap_or_default();
                debug!(
                    "Deployment {} state: {} (attempt {}/{})",
                    deployment_id, state, attempt, max_attempts
                );

                match state {
                    "READY" => PollStep::Done(Ok(body["url"]
                        .as_str()
                        .filter(|u| !u.is_empty())
                        .map(with_https)
                        .unwrap_or_else(|| fallback_url(deployment_id)))),
                    "ERROR" | "CANCELED" => {
                        error!("Deployment failed with state: {}", state);
                        PollStep::Done(Err(anyhow!("Deployment failed with state: {}", state)))
                    }
                    _ => PollStep::Pending,
                }
            }
        })
        .await;

        match outcome {
            Some(result) => result,
            None => {
                let url = fallback_url(deployment_id);
                warn!("Deployment status check timeout. Using fallback URL: {}", url);
                Ok(url)
            }
        }
    }
}
