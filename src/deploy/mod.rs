//! Publishing generated sites to static hosting.

pub mod bundle;
pub mod netlify;
pub mod poll;
pub mod project_name;
pub mod vercel;

use anyhow::Result;
use reqwest::Client;
use serde::Serialize;

use crate::config::{HostingKind, WebCraftConfig};
pub use bundle::{DeploymentDescriptor, SiteBundle};
pub use netlify::NetlifyClient;
pub use project_name::sanitize_project_name;
pub use vercel::VercelClient;

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentOutcome {
    pub provider: HostingKind,
    pub url: String,
    pub site_id: Option<String>,
}

/// The hosting backend picked from configuration.
#[derive(Clone)]
pub enum HostingProvider {
    Netlify(NetlifyClient),
    Vercel(VercelClient),
}

impl HostingProvider {
    /// `None` when no hosting credential is configured.
    pub fn from_config(config: &WebCraftConfig, client: Client) -> Option<Self> {
        let hosting = &config.hosting;
        match config.hosting_kind()? {
            HostingKind::Netlify => Some(HostingProvider::Netlify(NetlifyClient::new(
                client,
                config.netlify_token()?,
                &hosting.netlify_api_base,
                hosting.accessibility_poll,
            ))),
            HostingKind::Vercel => Some(HostingProvider::Vercel(VercelClient::new(
                client,
                config.vercel_token()?,
                &hosting.vercel_api_base,
                hosting.deployment_poll,
            ))),
        }
    }

    pub fn kind(&self) -> HostingKind {
        match self {
            HostingProvider::Netlify(_) => HostingKind::Netlify,
            HostingProvider::Vercel(_) => HostingKind::Vercel,
        }
    }

    pub async fn deploy(&self, descriptor: &DeploymentDescriptor) -> Result<DeploymentOutcome> {
        match self {
            HostingProvider::Netlify(client) => client.deploy(descriptor).await,
            HostingProvider::Vercel(client) => client.deploy(descriptor).await,
        }
    }
}
