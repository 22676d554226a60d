use anyhow::{anyhow, Context, Result};
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::bundle::{DeploymentDescriptor, SiteBundle};
use super::poll::{poll_until, PollPolicy, PollStep};
use super::DeploymentOutcome;
use crate::config::HostingKind;

const USER_AGENT: &str = "WebCraft/1.0";
const DIAGNOSTIC_USER_AGENT: &str = "WebCraft-Diagnostic/1.0";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const TEST_PAGE: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head>
    <meta charset=\"UTF-8\">
    <title>Test</title>
</head>
<body>
    <h1>Test Deployment</h1>
</body>
</html>";

#[derive(Clone)]
pub struct NetlifyClient {
    client: Client,
    token: String,
    api_base: String,
    poll: PollPolicy,
}

fn force_https(url: &str) -> String {
    url.replacen("http://", "https://", 1)
}

impl NetlifyClient {
    pub fn new(client: Client, token: &str, api_base: &str, poll: PollPolicy) -> Self {
        Self {
            client,
            token: token.trim().to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            poll,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.api_base, path)
    }

    /// Upload the bundle as a new site and wait (bounded) for it to answer.
    pub async fn deploy(&self, descriptor: &DeploymentDescriptor) -> Result<DeploymentOutcome> {
        info!("🚀 Starting Netlify deployment for project: {}", descriptor.project_name);

        let zip = descriptor
            .bundle
            .to_zip()
            .context("Failed to build deployment archive")?;
        let (site_id, url) = self
            .create_site(zip, Some(&descriptor.project_name), USER_AGENT)
            .await?;
        info!("Site created successfully with ID: {}, URL: {}", site_id, url);

        self.wait_for_deployment(&url).await;

        Ok(DeploymentOutcome {
            provider: HostingKind::Netlify,
            url,
            site_id: Some(site_id),
        })
    }

    async fn create_site(
        &self,
        zip: Vec<u8>,
        site_name: Option<&str>,
        user_agent: &str,
    ) -> Result<(String, String)> {
        let mut request = self
            .client
            .post(self.endpoint("/sites"))
            .bearer_auth(&self.token)
            .header(header::CONTENT_TYPE, "application/zip")
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::USER_AGENT, user_agent)
            .body(zip);

        if let Some(name) = site_name.filter(|n| !n.trim().is_empty()) {
            request = request.header("Netlify-Site-Name", name);
        }

        debug!("Sending deployment request to Netlify...");
        let response = request
            .send()
            .await
            .context("Failed to reach Netlify API")?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("HTTP error during deployment: {} - {}", status, body);
            return Err(anyhow!("Netlify API error: {} - {}", status, body));
        }

        let body: Value = response
            .json()
            .await
            .context("Netlify returned a malformed site response")?;
        let url = body["ssl_url"]
            .as_str()
            .or_else(|| body["url"].as_str())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| anyhow!("Deployment failed - no URL returned from Netlify"))?;
        let site_id = body["id"].as_str().unwrap_or_default().to_string();

        Ok((site_id, force_https(url)))
    }

    async fn wait_for_deployment(&self, url: &str) {
        let reached = poll_until(self.poll, |attempt| async move {
            if self.site_accessible(url).await {
                info!("Deployment is accessible after {} attempts", attempt);
                PollStep::Done(())
            } else {
                PollStep::Pending
            }
        })
        .await;

        if reached.is_none() {
            warn!(
                "⚠️  Deployment may not be fully accessible yet after {} attempts",
                self.poll.max_attempts
            );
        }
    }

    pub async fn site_accessible(&self, url: &str) -> bool {
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await;

        match response {
            Ok(resp) => {
                let ok = resp.status().is_success();
                debug!(
                    "Site accessibility test for {}: {} (Status: {})",
                    url,
                    if ok { "PASSED" } else { "FAILED" },
                    resp.status()
                );
                ok
            }
            Err(e) => {
                debug!("Site accessibility test - network error for {}: {}", url, e);
                false
            }
        }
    }

    async fn get_json(&self, path: &str) -> Result<(StatusCode, Value)> {
        let response = self
            .client
            .get(self.endpoint(path))
            .bearer_auth(&self.token)
            .header(header::USER_AGENT, DIAGNOSTIC_USER_AGENT)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Netlify API error: {} - {}", status, body));
        }
        Ok((status, response.json().await?))
    }

    pub async fn token_valid(&self) -> bool {
        match self.get_json("/user").await {
            Ok((status, _)) => status == StatusCode::OK,
            Err(e) => {
                error!("Token validity test failed: {}", e);
                false
            }
        }
    }

    pub async fn account_info(&self) -> Value {
        match self.get_json("/user").await {
            Ok((_, body)) => body,
            Err(e) => {
                error!("Failed to get account info: {}", e);
                Value::Object(Default::default())
            }
        }
    }

    pub async fn list_sites(&self) -> Option<Vec<Value>> {
        match self.get_json("/sites").await {
            Ok((_, Value::Array(sites))) => Some(sites),
            Ok(_) => None,
            Err(e) => {
                error!("Failed to list sites: {}", e);
                None
            }
        }
    }

    /// Publish a throwaway one-page site to check the whole upload path.
    pub async fn test_minimal_deployment(&self) -> Option<String> {
        let zip = match SiteBundle::single_page(TEST_PAGE).to_zip() {
            Ok(zip) => zip,
            Err(e) => {
                error!("Failed to build test archive: {}", e);
                return None;
            }
        };

        match self.create_site(zip, None, DIAGNOSTIC_USER_AGENT).await {
            Ok((_, url)) => {
                info!("Test deployment successful: {}", url);
                Some(url)
            }
            Err(e) => {
                error!("Test deployment failed: {}", e);
                None
            }
        }
    }
}
