//! End-to-end tests for the HTTP API against local stub providers.

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, HeaderMap, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde_json::{json, Value};
use std::io::{Cursor, Read};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower::ServiceExt;

use webcraft::config::{HostingKind, WebCraftConfig};
use webcraft::deploy::poll::PollPolicy;
use webcraft::pipeline::link_assets;
use webcraft::server::{router, AppState};

type Recorded = Arc<Mutex<Vec<(HeaderMap, Bytes)>>>;

async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

fn spawn(listener: TcpListener, app: Router) {
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

fn app_for(config: WebCraftConfig) -> Router {
    router(AppState::with_client(config, reqwest::Client::new()))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Gemini stand-in that answers every generateContent call with `text`.
async fn gemini_stub(text: String) -> SocketAddr {
    let (listener, addr) = bind().await;
    let app = Router::new().route(
        "/v1beta/models/:model",
        post(move |Path(_model): Path<String>| {
            let text = text.clone();
            async move {
                Json(json!({
                    "candidates": [{"content": {"parts": [{"text": text}]}}]
                }))
            }
        }),
    );
    spawn(listener, app);
    addr
}

fn gemini_config(addr: SocketAddr) -> WebCraftConfig {
    let mut config = WebCraftConfig::default();
    config
        .api_keys
        .insert("Gemini".to_string(), "test-key".to_string());
    config
        .ai
        .base_urls
        .insert("Gemini".to_string(), format!("http://{}", addr));
    config
}

fn netlify_config(addr: SocketAddr) -> WebCraftConfig {
    let mut config = WebCraftConfig::default();
    config
        .api_keys
        .insert("Netlify".to_string(), "netlify-token".to_string());
    config.hosting.netlify_api_base = format!("http://{}", addr);
    config.hosting.accessibility_poll = PollPolicy::new(0, 1);
    config
}

fn vercel_config(addr: SocketAddr) -> WebCraftConfig {
    let mut config = WebCraftConfig::default();
    config
        .api_keys
        .insert("Vercel".to_string(), "vercel-token".to_string());
    config.hosting.provider = Some(HostingKind::Vercel);
    config.hosting.vercel_api_base = format!("http://{}", addr);
    config.hosting.deployment_poll = PollPolicy::new(0, 3);
    config
}

#[tokio::test]
async fn generate_photographer_portfolio() {
    let site = json!({
        "html": "<!DOCTYPE html><html><head><title>Lens</title></head><body><h1>Ana Lens Photography</h1></body></html>",
        "css": "body { font-family: serif; }",
        "js": "console.log('gallery ready');"
    });
    let addr = gemini_stub(format!("```json\n{}\n```", site)).await;
    let app = app_for(gemini_config(addr));

    let (status, body) = send(
        app,
        post_json(
            "/generate",
            json!({"prompt": "a portfolio for a photographer"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    let html = body["html"].as_str().unwrap();
    assert!(html.to_lowercase().contains("<!doctype"));
    assert!(html.contains("Ana Lens Photography"));
    assert!(!body["css"].as_str().unwrap().is_empty());
    assert!(!body["js"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn generate_prose_response_falls_back() {
    let addr = gemini_stub("I'm sorry, I can only describe websites.".to_string()).await;
    let app = app_for(gemini_config(addr));

    let (status, body) = send(app, post_json("/generate", json!({"prompt": "a bakery"}))).await;

    assert_eq!(status, StatusCode::OK);
    let html = body["html"].as_str().unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("a bakery"));
    assert!(!body["css"].as_str().unwrap().is_empty());
    assert!(!body["js"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn generate_rejects_empty_and_long_prompts() {
    let app = app_for(WebCraftConfig::default());

    let (status, body) = send(app.clone(), post_json("/generate", json!({"prompt": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, _) = send(app.clone(), post_json("/generate", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long = "x".repeat(5001);
    let (status, body) = send(app.clone(), post_json("/generate", json!({"prompt": long}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].as_str().unwrap().contains("5000"));

    let request = Request::builder()
        .method("POST")
        .uri("/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
}

#[tokio::test]
async fn generate_maps_provider_failures() {
    let (listener, addr) = bind().await;
    let stub = Router::new().route(
        "/v1beta/models/:model",
        post(|Path(model): Path<String>| async move {
            if model.starts_with("malformed") {
                (StatusCode::OK, "definitely not json".to_string())
            } else if model.starts_with("empty") {
                (
                    StatusCode::OK,
                    json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]}).to_string(),
                )
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string())
            }
        }),
    );
    spawn(listener, stub);

    for (model, tag) in [
        ("malformed", "JSON Parsing Error"),
        ("empty", "AI Response Error"),
        ("broken", "Generation Error"),
    ] {
        let mut config = gemini_config(addr);
        config
            .ai
            .model_overrides
            .insert("Gemini".to_string(), model.to_string());
        let (status, body) = send(
            app_for(config),
            post_json("/generate", json!({"prompt": "anything"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "model {}", model);
        assert_eq!(body["error"], tag, "model {}", model);
    }
}

#[tokio::test]
async fn deploy_without_hosting_is_unavailable() {
    let app = app_for(WebCraftConfig::default());

    let (status, body) = send(app.clone(), post_json("/deploy", json!({}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Configuration Error");

    let (status, body) = send(app, get_request("/deployment-status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["configured"], false);
    assert_eq!(body["service"], "Netlify");
}

#[tokio::test]
async fn deploy_validates_request() {
    let (_listener, addr) = bind().await;
    let mut config = netlify_config(addr);
    config.limits.max_html_bytes = 32;
    let app = app_for(config);

    let (status, body) = send(
        app.clone(),
        post_json("/deploy", json!({"projectName": "site"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "HTML content cannot be empty");

    let (status, body) = send(
        app.clone(),
        post_json("/deploy", json!({"html": "<html></html>", "projectName": " "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Project name cannot be empty");

    let (status, body) = send(
        app,
        post_json(
            "/deploy",
            json!({"html": "x".repeat(33), "projectName": "site"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
}

#[tokio::test]
async fn deploy_to_netlify_uploads_zip() {
    let recorded: Recorded = Arc::default();
    let (listener, addr) = bind().await;
    let stub = Router::new()
        .route(
            "/api/v1/sites",
            post(
                |State((recorded, addr)): State<(Recorded, SocketAddr)>,
                 headers: HeaderMap,
                 body: Bytes| async move {
                    recorded.lock().unwrap().push((headers, body));
                    Json(json!({
                        "id": "site-123",
                        "url": format!("http://{}/", addr),
                    }))
                },
            ),
        )
        .with_state((recorded.clone(), addr));
    spawn(listener, stub);

    let app = app_for(netlify_config(addr));
    let (status, body) = send(
        app,
        post_json(
            "/deploy",
            json!({"html": "<html></html>", "projectName": "Test Site"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["deployed"], true);
    assert_eq!(body["projectName"], "test-site");
    assert_eq!(body["deploymentUrl"], format!("https://{}/", addr));
    assert_eq!(body["html"], "<html></html>");

    let calls = recorded.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (headers, zip_body) = &calls[0];
    assert_eq!(headers["netlify-site-name"], "test-site");
    assert_eq!(headers[header::CONTENT_TYPE], "application/zip");
    assert_eq!(headers[header::AUTHORIZATION], "Bearer netlify-token");

    let mut archive = zip::ZipArchive::new(Cursor::new(zip_body.to_vec())).unwrap();
    let mut index = String::new();
    archive
        .by_name("index.html")
        .unwrap()
        .read_to_string(&mut index)
        .unwrap();
    assert_eq!(index, link_assets("<html></html>", "", ""));
    assert!(archive.by_name("_redirects").is_ok());
    assert!(archive.by_name("styles.css").is_err());
}

#[tokio::test]
async fn deploy_reports_netlify_errors() {
    let (listener, addr) = bind().await;
    let stub = Router::new().route(
        "/api/v1/sites",
        post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "subdomain taken") }),
    );
    spawn(listener, stub);

    let (status, body) = send(
        app_for(netlify_config(addr)),
        post_json(
            "/deploy",
            json!({"html": "<html></html>", "projectName": "taken"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Deployment Error");
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("422"), "details: {}", details);
    assert!(details.contains("subdomain taken"));
}

fn vercel_stub(ready_state: &'static str, recorded: Recorded) -> Router {
    Router::new()
        .route(
            "/v6/deployments",
            post(
                |State(recorded): State<Recorded>, headers: HeaderMap, body: Bytes| async move {
                    recorded.lock().unwrap().push((headers, body));
                    (StatusCode::CREATED, Json(json!({"id": "dpl_42"})))
                },
            ),
        )
        .route(
            "/v6/deployments/:id",
            get(move |Path(id): Path<String>| async move {
                Json(json!({
                    "id": id,
                    "readyState": ready_state,
                    "url": "test-site-abc.vercel.app",
                }))
            }),
        )
        .with_state(recorded)
}

#[tokio::test]
async fn deploy_to_vercel_polls_until_ready() {
    let recorded: Recorded = Arc::default();
    let (listener, addr) = bind().await;
    spawn(listener, vercel_stub("READY", recorded.clone()));

    let (status, body) = send(
        app_for(vercel_config(addr)),
        post_json(
            "/deploy",
            json!({
                "html": "<html><head></head><body></body></html>",
                "css": "body { margin: 0; }",
                "projectName": "Test Site"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["deploymentUrl"], "https://test-site-abc.vercel.app");

    let calls = recorded.lock().unwrap();
    let payload: Value = serde_json::from_slice(&calls[0].1).unwrap();
    assert_eq!(payload["name"], "test-site");
    assert_eq!(payload["target"], "production");
    assert_eq!(payload["meta"]["githubDeployment"], "0");

    let files = payload["files"].as_array().unwrap();
    let names: Vec<&str> = files.iter().filter_map(|f| f["file"].as_str()).collect();
    assert_eq!(names, vec!["index.html", "styles.css"]);
    let index = base64::engine::general_purpose::STANDARD
        .decode(files[0]["data"].as_str().unwrap())
        .unwrap();
    assert!(String::from_utf8(index).unwrap().contains("styles.css"));
}

#[tokio::test]
async fn deploy_to_vercel_failed_state_is_error() {
    let (listener, addr) = bind().await;
    spawn(listener, vercel_stub("ERROR", Arc::default()));

    let (status, body) = send(
        app_for(vercel_config(addr)),
        post_json("/deploy", json!({"html": "<p>x</p>", "projectName": "demo"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["details"].as_str().unwrap().contains("ERROR"));
}

#[tokio::test]
async fn deploy_to_vercel_times_out_to_default_url() {
    let (listener, addr) = bind().await;
    spawn(listener, vercel_stub("BUILDING", Arc::default()));

    let (status, body) = send(
        app_for(vercel_config(addr)),
        post_json("/deploy", json!({"html": "<p>x</p>", "projectName": "demo"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deploymentUrl"], "https://dpl_42.vercel.app");
}

#[tokio::test]
async fn health_reports_services() {
    let mut config = WebCraftConfig::default();
    config
        .api_keys
        .insert("Vercel".to_string(), "token".to_string());

    let (status, body) = send(app_for(config), get_request("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert!(body["timestamp"].as_i64().unwrap() > 0);
    assert_eq!(body["services"]["websiteGenerator"], "UP");
    assert_eq!(body["services"]["netlifyDeployment"], "NOT_CONFIGURED");
    assert_eq!(body["services"]["vercelDeployment"], "UP");
}

#[tokio::test]
async fn diagnostics_without_token() {
    let (status, body) = send(
        app_for(WebCraftConfig::default()),
        get_request("/diagnostics"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["netlify"]["tokenValid"], false);
    assert_eq!(body["overall_health"], "Fail");
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/generate")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app_for(WebCraftConfig::default())
        .oneshot(request)
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
}
