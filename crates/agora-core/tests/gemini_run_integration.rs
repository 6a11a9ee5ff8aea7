//! Full runs against a local Gemini-compatible endpoint.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use agora_core::config::{LlmConfig, LlmProvider};
use agora_core::llm::providers::create_llm_client;
use agora_core::{
    DebateOrchestrator, DebateSession, RecordingSink, RemoteError, RunKind, RunStatus,
    TrialOrchestrator, TrialSession,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Replies with the number of `contents` entries it received, and fails with
/// 429 once `fail_at` requests have been served.
#[derive(Clone)]
struct Endpoint {
    bodies: Arc<Mutex<Vec<Value>>>,
    fail_at: Option<usize>,
}

async fn generate(State(endpoint): State<Endpoint>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut bodies = endpoint.bodies.lock().unwrap();
    bodies.push(body.clone());
    if Some(bodies.len()) == endpoint.fail_at {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}})),
        );
    }
    let seen = body["contents"].as_array().map(|c| c.len()).unwrap_or(0);
    (
        StatusCode::OK,
        Json(json!({"candidates": [{"content": {"role": "model", "parts": [{"text": format!("saw {}", seen)}]}}]})),
    )
}

async fn serve(fail_at: Option<usize>) -> (String, Arc<Mutex<Vec<Value>>>) {
    let endpoint = Endpoint {
        bodies: Arc::new(Mutex::new(Vec::new())),
        fail_at,
    };
    let bodies = endpoint.bodies.clone();
    let app = Router::new()
        .route("/models/{call}", post(generate))
        .with_state(endpoint);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), bodies)
}

fn config_for(base_url: String) -> LlmConfig {
    LlmConfig {
        provider: LlmProvider::Custom { base_url },
        ..LlmConfig::default()
    }
}

#[tokio::test]
async fn test_debate_over_http() {
    let (base_url, bodies) = serve(None).await;
    let llm = create_llm_client(&config_for(base_url), "test-key", RunKind::Debate).unwrap();
    let session = DebateSession::new("Remote work", &["Skeptic", "Optimist"], 2).unwrap();
    let orchestrator = DebateOrchestrator::new(session).with_pacing(Duration::ZERO);

    let mut sink = RecordingSink::new();
    let report = orchestrator
        .run(llm.as_ref(), &mut sink, &CancellationToken::new())
        .await;

    assert_eq!(report.status, RunStatus::Completed);
    let texts: Vec<&str> = report.transcript.iter().map(|e| e.text.as_str()).collect();
    // Each request carries the prior turns plus the new instruction
    assert_eq!(texts, vec!["saw 1", "saw 3", "saw 5", "saw 7"]);

    let bodies = bodies.lock().unwrap();
    assert_eq!(bodies.len(), 4);
    assert_eq!(bodies[0]["generationConfig"]["temperature"].as_f64().map(|t| t as f32), Some(0.8));
    assert!(bodies[1]["contents"][2]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("\"saw 1\""));
}

#[tokio::test]
async fn test_trial_over_http_stops_on_rate_limit() {
    let (base_url, bodies) = serve(Some(4)).await;
    let llm = create_llm_client(&config_for(base_url), "test-key", RunKind::Trial).unwrap();
    let orchestrator = TrialOrchestrator::new(TrialSession::new("A bicycle went missing.").unwrap());

    let mut sink = RecordingSink::new();
    let report = orchestrator
        .run(llm.as_ref(), &mut sink, &CancellationToken::new())
        .await;

    assert_eq!(report.status, RunStatus::Failed(RemoteError::RateLimited));
    assert_eq!(report.history.len(), 3);
    assert!(report.verdict.is_none());
    assert_eq!(bodies.lock().unwrap().len(), 4);
    assert_eq!(
        sink.last_status(),
        Some("Trial stopped by an error: Rate limit exceeded by the inference provider")
    );
}
