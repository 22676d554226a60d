//! WebCraft HTTP API
//!
//! `POST /generate` turns a prompt into html/css/js, `POST /deploy` publishes
//! them to the configured static host. `GET /health`, `/diagnostics` and
//! `/deployment-status` report on the service.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use crate::ai_service::AIService;
use crate::config::{HostingKind, WebCraftConfig};
use crate::deploy::{sanitize_project_name, DeploymentDescriptor, HostingProvider};
use crate::doctor::{DoctorReport, WebCraftDoctor};
use crate::error::ApiError;
use crate::generator::WebsiteGenerator;
use crate::pipeline::{GenerationResult, PipelineOptions};

/// Shared state across all handlers
#[derive(Clone)]
pub struct AppState {
    config: Arc<WebCraftConfig>,
    generator: WebsiteGenerator,
    hosting: Option<HostingProvider>,
    client: Client,
}

impl AppState {
    pub fn new(config: WebCraftConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: WebCraftConfig, client: Client) -> Self {
        let ai = AIService::new(config.ai_config(), client.clone());
        let generator = WebsiteGenerator::new(
            ai,
            PipelineOptions {
                atomic_fallback: config.atomic_fallback,
            },
        );
        let hosting = HostingProvider::from_config(&config, client.clone());

        Self {
            config: Arc::new(config),
            generator,
            hosting,
            client,
        }
    }

    pub fn config(&self) -> &WebCraftConfig {
        &self.config
    }
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeployRequest {
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    css: Option<String>,
    #[serde(default)]
    js: Option<String>,
    #[serde(default)]
    project_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeployResponse {
    html: String,
    css: Option<String>,
    js: Option<String>,
    deployment_url: String,
    project_name: String,
    deployed: bool,
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    warn!("Rejected request body: {}", rejection.body_text());
    ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    let Json(request) = payload.map_err(rejection_to_error)?;

    let prompt = non_blank(&request.prompt)
        .ok_or_else(|| ApiError::Validation("Prompt cannot be empty".to_string()))?;
    let max = state.config.limits.max_prompt_chars;
    if prompt.chars().count() > max {
        return Err(ApiError::Validation(format!(
            "Prompt is too long (max {} characters)",
            max
        )));
    }

    let outcome = state.generator.generate(prompt).await.map_err(|e| {
        error!("❌ Generation failed: {:#}", e);
        ApiError::from_generation_error(&e)
    })?;

    if outcome.result.html.trim().is_empty() {
        return Err(ApiError::Generation(
            "Failed to generate valid HTML content".to_string(),
        ));
    }

    info!(
        "Website generated successfully with HTML length: {}",
        outcome.result.html.len()
    );
    Ok(Json(outcome.result))
}

async fn handle_deploy(
    State(state): State<AppState>,
    payload: Result<Json<DeployRequest>, JsonRejection>,
) -> Result<Json<DeployResponse>, ApiError> {
    info!("Deploy endpoint called");

    let hosting = state.hosting.as_ref().ok_or_else(|| {
        error!("No hosting credential configured");
        ApiError::Configuration(
            "Deployment service is not properly configured. Please check server configuration."
                .to_string(),
        )
    })?;

    let Json(request) = payload.map_err(rejection_to_error)?;

    let html = non_blank(&request.html)
        .ok_or_else(|| ApiError::Validation("HTML content cannot be empty".to_string()))?;
    if html.len() > state.config.limits.max_html_bytes {
        error!("HTML content too large: {} bytes", html.len());
        return Err(ApiError::Validation(
            "HTML content is too large (max 25MB)".to_string(),
        ));
    }
    let raw_name = non_blank(&request.project_name)
        .ok_or_else(|| ApiError::Validation("Project name cannot be empty".to_string()))?;

    let project_name = sanitize_project_name(raw_name);
    let css = request.css.as_deref().unwrap_or_default();
    let js = request.js.as_deref().unwrap_or_default();
    info!("Deploying website with project name: {}", project_name);
    info!(
        "Content sizes - HTML: {} bytes, CSS: {} bytes, JS: {} bytes",
        html.len(),
        css.len(),
        js.len()
    );

    let descriptor = DeploymentDescriptor::new(project_name.clone(), html, css, js);
    let outcome = hosting.deploy(&descriptor).await.map_err(|e| {
        error!("❌ Deployment error: {:#}", e);
        ApiError::from_deployment_error(&e)
    })?;

    info!("✅ Website deployed successfully to: {}", outcome.url);
    Ok(Json(DeployResponse {
        html: html.to_string(),
        css: request.css.clone(),
        js: request.js.clone(),
        deployment_url: outcome.url,
        project_name,
        deployed: true,
    }))
}

fn service_state(configured: bool) -> &'static str {
    if configured {
        "UP"
    } else {
        "NOT_CONFIGURED"
    }
}

async fn handle_health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "UP",
        "timestamp": chrono::Utc::now().timestamp_millis(),
        "services": {
            "websiteGenerator": "UP",
            "netlifyDeployment": service_state(state.config.netlify_token().is_some()),
            "vercelDeployment": service_state(state.config.vercel_token().is_some()),
        }
    }))
}

async fn handle_diagnostics(State(state): State<AppState>) -> Json<DoctorReport> {
    info!("Running hosting diagnostics...");
    let report = WebCraftDoctor::new(&state.config, state.client.clone())
        .run()
        .await;
    Json(report)
}

async fn handle_deployment_status(State(state): State<AppState>) -> Json<Value> {
    let configured = state.hosting.is_some();
    let service = state
        .hosting
        .as_ref()
        .map(|h| h.kind())
        .or(state.config.hosting.provider)
        .unwrap_or(HostingKind::Netlify);

    let message = if configured {
        "Deployment service is ready"
    } else {
        "Deployment service not configured"
    };

    Json(json!({
        "configured": configured,
        "service": service.display_name(),
        "message": message,
    }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("⚠️  Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .max_age(Duration::from_secs(3600))
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    // Room for the html plus css/js and JSON escaping.
    let body_limit = state.config.limits.max_html_bytes.saturating_mul(2);

    Router::new()
        .route("/generate", post(handle_generate))
        .route("/deploy", post(handle_deploy))
        .route("/health", get(handle_health))
        .route("/diagnostics", get(handle_diagnostics))
        .route("/deployment-status", get(handle_deployment_status))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

/// Start the WebCraft server
pub async fn start_server(config: WebCraftConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config)?;

    info!("⚡ WebCraft starting on http://{}", addr);
    info!(
        "   AI provider configured: {}",
        if state.generator.is_configured() {
            "✅ YES"
        } else {
            "❌ NO"
        }
    );
    match state.hosting.as_ref() {
        Some(h) => info!("   Hosting: ✅ {}", h.kind().display_name()),
        None => warn!("   Hosting: ❌ not configured, /deploy will answer 503"),
    }

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🎯 WebCraft is ready!");

    axum::serve(listener, app).await?;

    Ok(())
}
