//! End-to-end integration tests for LedgerChat.
//!
//! These tests exercise the full path from CSV extracts on disk through the
//! ledger loader, the question pipeline and the HTTP gateway, with a scripted
//! model standing in for the real provider.

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use ledgerchat_config::GatewayConfig;
use ledgerchat_core::error::ProviderError;
use ledgerchat_core::message::Message;
use ledgerchat_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use ledgerchat_gateway::{GatewayState, build_router};
use ledgerchat_pipeline::{QueryPipeline, QueryResponse, QueryTranslator};
use tower::ServiceExt;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted replies in sequence.
struct ScriptedProvider {
    replies: Vec<String>,
    call_count: Mutex<usize>,
}

impl ScriptedProvider {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            call_count: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut count = self.call_count.lock().unwrap();
        let reply = self.replies.get(*count).unwrap_or_else(|| {
            panic!(
                "ScriptedProvider exhausted: call #{}, have {}",
                *count,
                self.replies.len()
            )
        });
        *count += 1;
        Ok(ProviderResponse {
            message: Message::assistant(reply),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock".into(),
        })
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────

const HEADER: &str = "año,orden de compra,fecha,importe,proveedor,dependencia,expediente\n";

/// Two yearly extracts: 2022 has twelve Salud purchases among others, 2021
/// has Salud purchases that must never match a 2022 filter.
fn write_extracts(dir: &Path) {
    let mut y2022 = String::from(HEADER);
    for i in 0..12 {
        y2022.push_str(&format!(
            "2022,OC-22-{i},2022-04-{:02},{},Farmacia Sur,Salud,EXP-{i}\n",
            i + 1,
            1000 + i
        ));
        y2022.push_str(&format!(
            "2022,OC-22-C{i},2022-05-01,50,Libreria Norte,Cultura,EXP-C{i}\n"
        ));
    }
    y2022.push_str("2022,OC-22-INF,2022-06-01,inf,Proveedor X,Salud,\n");

    let mut y2021 = String::from(HEADER);
    for i in 0..5 {
        y2021.push_str(&format!(
            "2021,OC-21-{i},2021-04-01,300,Farmacia Sur,Salud,EXP-21-{i}\n"
        ));
    }

    std::fs::write(dir.join("gastos_2021.csv"), y2021).unwrap();
    std::fs::write(dir.join("gastos_2022.csv"), y2022).unwrap();
}

fn pipeline_for(dir: &Path, provider: Arc<ScriptedProvider>) -> QueryPipeline {
    let ledger = ledgerchat_ledger::load_dir(dir).unwrap();
    QueryPipeline::new(
        QueryTranslator::new(provider, "mock-model"),
        Arc::new(ledger),
    )
}

fn app_for(pipeline: QueryPipeline) -> Router {
    build_router(
        Arc::new(GatewayState { pipeline }),
        &GatewayConfig::default(),
    )
}

async fn ask(app: &Router, message: &str) -> serde_json::Value {
    let body = serde_json::json!({ "message": message }).to_string();
    let req = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

const SCENARIO_A_REPLY: &str = "Filtro: año == 2022 and dependencia == \"Salud\"\n\
                                Resumen: Se encontraron los gastos de Salud en 2022.";

// ── E2E: Scenario A, filter reply ────────────────────────────────────────

#[tokio::test]
async fn e2e_filter_reply_returns_matching_rows() {
    let dir = tempfile::tempdir().unwrap();
    write_extracts(dir.path());
    let provider = Arc::new(ScriptedProvider::new(&[SCENARIO_A_REPLY]));
    let app = app_for(pipeline_for(dir.path(), provider.clone()));

    let json = ask(&app, "¿Cuánto gastó Salud en 2022?").await;

    assert_eq!(json["filter"], "año == 2022 and dependencia == \"Salud\"");
    assert_eq!(json["message"], "Se encontraron los gastos de Salud en 2022.");
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 10);
    for row in results {
        assert_eq!(row["dependencia"], "Salud");
        assert_eq!(row["año"], 2022);
    }
    // Table order: 2021 file first, so the first match is the first 2022 row.
    assert_eq!(results[0]["orden de compra"], "OC-22-0");
    assert_eq!(results[9]["orden de compra"], "OC-22-9");
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn e2e_non_finite_amounts_are_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    write_extracts(dir.path());
    let provider = Arc::new(ScriptedProvider::new(&[
        "Filtro: `orden de compra` == \"OC-22-INF\"\nResumen: Una compra sin importe válido.",
    ]));
    let app = app_for(pipeline_for(dir.path(), provider));

    let json = ask(&app, "¿OC-22-INF?").await;
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["importe"], "N/A");
    assert_eq!(results[0]["expediente"], "N/A");
}

// ── E2E: Scenario B, plain reply ─────────────────────────────────────────

#[tokio::test]
async fn e2e_plain_reply_has_no_results() {
    let dir = tempfile::tempdir().unwrap();
    write_extracts(dir.path());
    let text = "Puedo ayudarte con consultas sobre los gastos del municipio.";
    let provider = Arc::new(ScriptedProvider::new(&[text]));
    let app = app_for(pipeline_for(dir.path(), provider));

    let json = ask(&app, "Hola").await;
    assert_eq!(
        json,
        serde_json::json!({ "message": text, "results": [], "filter": null })
    );
}

// ── E2E: Scenario C, invalid filter ──────────────────────────────────────

#[tokio::test]
async fn e2e_unknown_column_is_reported_and_service_stays_up() {
    let dir = tempfile::tempdir().unwrap();
    write_extracts(dir.path());
    let bad = "Filtro: secretaria == \"Salud\"\nResumen: Gastos por secretaría.";
    let provider = Arc::new(ScriptedProvider::new(&[bad, SCENARIO_A_REPLY]));
    let app = app_for(pipeline_for(dir.path(), provider.clone()));

    let json = ask(&app, "¿Gastos de la secretaría de Salud?").await;
    assert!(json["error"].as_str().unwrap().contains("secretaria"));
    assert_eq!(json["raw_response"], bad);
    assert!(json.get("results").is_none());

    // The same service answers the next question normally.
    let json = ask(&app, "¿Cuánto gastó Salud en 2022?").await;
    assert_eq!(json["results"].as_array().unwrap().len(), 10);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn e2e_type_mismatch_is_invalid_filter() {
    let dir = tempfile::tempdir().unwrap();
    write_extracts(dir.path());
    let raw = "Filtro: importe > \"mucho\"\nResumen: Compras grandes.";
    let provider = Arc::new(ScriptedProvider::new(&[raw]));
    let pipeline = pipeline_for(dir.path(), provider);

    match pipeline.answer("compras grandes").await {
        QueryResponse::Error {
            error,
            raw_response,
        } => {
            assert!(error.contains("type mismatch"));
            assert_eq!(raw_response.as_deref(), Some(raw));
        }
        other => panic!("expected error payload, got {other:?}"),
    }
}

#[tokio::test]
async fn e2e_health_reports_loaded_rows() {
    let dir = tempfile::tempdir().unwrap();
    write_extracts(dir.path());
    let provider = Arc::new(ScriptedProvider::new(&[]));
    let app = app_for(pipeline_for(dir.path(), provider));

    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["ledger_rows"], 5 + 25);
}
