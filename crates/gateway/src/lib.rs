//! HTTP API gateway for LedgerChat.
//!
//! Exposes the question endpoint (`POST /chat`) and a health check
//! (`GET /health`). Every question gets exactly one JSON answer with status
//! 200, including pipeline failures; only malformed request bodies are
//! rejected by the framework.
//!
//! Built on Axum.

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use ledgerchat_config::{AppConfig, GatewayConfig};
use ledgerchat_core::ProviderError;
use ledgerchat_pipeline::{QueryPipeline, QueryResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

/// Shared application state for the gateway.
///
/// Read-only after startup: requests share the pipeline and the ledger it
/// owns, and nothing else.
pub struct GatewayState {
    pub pipeline: QueryPipeline,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS from `gateway.cors_origins` (`"*"` allows any origin)
/// - Request body size limit
/// - HTTP trace logging
pub fn build_router(state: SharedState, gateway: &GatewayConfig) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(gateway.body_limit_bytes))
        .layer(cors_layer(&gateway.cors_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Start the gateway HTTP server.
///
/// Loads the ledger and builds the provider once; both are shared by every
/// request for the lifetime of the process.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let ledger = Arc::new(ledgerchat_ledger::load_dir(&config.ledger.data_dir)?);
    let pipeline = build_pipeline(&config, ledger)?;
    let state = Arc::new(GatewayState { pipeline });
    let app = build_router(state, &config.gateway);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Wire the configured default provider and model into a pipeline.
pub fn build_pipeline(
    config: &AppConfig,
    ledger: Arc<ledgerchat_core::Ledger>,
) -> Result<QueryPipeline, ProviderError> {
    let router = ledgerchat_providers::build_from_config(config);
    let provider = router
        .default()
        .ok_or_else(|| ProviderError::NotConfigured(config.default_provider.clone()))?;
    let model = ledgerchat_providers::default_model(config);
    info!(provider = %provider.name(), model = %model, rows = ledger.len(), "Pipeline ready");
    Ok(QueryPipeline::from_config(provider, model, ledger, config))
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    ledger_rows: usize,
    provider: String,
    model: String,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let translator = state.pipeline.translator();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        ledger_rows: state.pipeline.ledger().len(),
        provider: translator.provider_name().to_string(),
        model: translator.model().to_string(),
    })
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Json<QueryResponse> {
    Json(state.pipeline.answer(&payload.message).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use ledgerchat_core::{
        Ledger, LedgerRecord, Message, Provider, ProviderRequest, ProviderResponse,
    };
    use ledgerchat_pipeline::QueryTranslator;
    use tower::ServiceExt;

    /// Replies with the same text to every question.
    struct FixedProvider {
        reply: String,
    }

    #[async_trait::async_trait]
    impl Provider for FixedProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Ok(ProviderResponse {
                message: Message::assistant(&self.reply),
                usage: None,
                model: "mock-model".into(),
            })
        }
    }

    fn test_ledger() -> Ledger {
        (0..12)
            .map(|i| LedgerRecord {
                year: Some(2022),
                purchase_order: Some(format!("OC-{i}")),
                amount: Some(if i == 0 { f64::INFINITY } else { 100.0 * i as f64 }),
                department: Some(if i % 2 == 0 { "Salud" } else { "Cultura" }.into()),
                ..LedgerRecord::default()
            })
            .collect()
    }

    fn test_app(reply: &str) -> Router {
        let provider = Arc::new(FixedProvider {
            reply: reply.into(),
        });
        let pipeline = QueryPipeline::new(
            QueryTranslator::new(provider, "mock-model"),
            Arc::new(test_ledger()),
        );
        build_router(Arc::new(GatewayState { pipeline }), &GatewayConfig::default())
    }

    async fn post_chat(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_endpoint_reports_ledger() {
        let app = test_app("hola");
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["ledger_rows"], 12);
        assert_eq!(json["model"], "mock-model");
    }

    #[tokio::test]
    async fn chat_success_shape() {
        let app = test_app("Filtro: dependencia == \"Salud\"\nResumen: Gastos de Salud.");
        let (status, json) = post_chat(app, r#"{"message":"¿Salud?"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Gastos de Salud.");
        assert_eq!(json["filter"], "dependencia == \"Salud\"");
        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 6);
        assert_eq!(results[0]["importe"], "N/A");
        assert_eq!(results[1]["importe"], serde_json::json!(200.0));
    }

    #[tokio::test]
    async fn chat_plain_shape() {
        let app = test_app("Solo puedo responder sobre gastos municipales.");
        let (status, json) = post_chat(app, r#"{"message":"¿Clima?"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({
                "message": "Solo puedo responder sobre gastos municipales.",
                "results": [],
                "filter": null
            })
        );
    }

    #[tokio::test]
    async fn chat_error_shape_is_still_ok_status() {
        let raw = "Filtro: monto > 1\nResumen: x";
        let app = test_app(raw);
        let (status, json) = post_chat(app, r#"{"message":"?"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["error"].as_str().unwrap().contains("monto"));
        assert_eq!(json["raw_response"], raw);
    }

    #[tokio::test]
    async fn empty_message_is_an_error_payload() {
        let app = test_app("nunca");
        let (status, json) = post_chat(app, r#"{"message":"  "}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["error"].is_string());
        assert!(json.get("raw_response").is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let app = test_app("nunca");
        let (status, _) = post_chat(app, r#"{"text":"hola"}"#).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn cors_allows_any_origin_by_default() {
        let app = test_app("hola");
        let req = Request::builder()
            .uri("/health")
            .header("origin", "http://example.org")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            HeaderValue::from_static("*")
        );
    }

    #[test]
    fn build_pipeline_uses_configured_model() {
        let config = AppConfig::default();
        let pipeline = build_pipeline(&config, Arc::new(Ledger::default())).unwrap();
        assert_eq!(pipeline.translator().model(), "gpt-3.5-turbo");
        assert_eq!(pipeline.translator().provider_name(), "openai");
    }
}
