//! End-to-end flow: reducer + background tasks + real HTTP client against a mock backend.

use std::sync::{Arc, mpsc};

use serde_json::json;
use truss_chat::ApiVariant;
use truss_chat::api::HttpTrussApi;
use truss_chat::core::action::{Action, Effect, update};
use truss_chat::core::identity::MemoryIdentity;
use truss_chat::core::state::App;
use truss_chat::core::store::StorePhase;
use truss_chat::tui::tasks::{spawn_health, spawn_history, spawn_send};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

fn app_for(server: &MockServer, variant: ApiVariant) -> App {
    let api = Arc::new(HttpTrussApi::new(server.uri(), variant));
    App::new(api, &MemoryIdentity::new("user_flow000001"), variant)
}

/// Feed everything the tasks reported through the reducer.
fn apply_all(app: &mut App, rx: &mpsc::Receiver<Action>) -> Vec<Effect> {
    rx.try_iter().map(|action| update(app, action)).collect()
}

async fn submit(app: &mut App, text: &str, tx: &mpsc::Sender<Action>) {
    match update(app, Action::Submit(text.to_string())) {
        Effect::SpawnSend(message) => {
            spawn_send(app.api.clone(), app.session_id.clone(), message, tx.clone())
                .await
                .unwrap();
        }
        other => panic!("expected a send, got {other:?}"),
    }
}

// ============================================================================
// Flows
// ============================================================================

#[tokio::test]
async fn test_history_then_send_keeps_newest_first() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history/user_flow000001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"message": "older question", "response": "older answer"}
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "A king post truss.",
            "truss_data": {
                "nodes": [[0, 0], [4, 0], [2, 1.5]],
                "elements": [[0, 1], [1, 2], [2, 0]],
                "span": 4,
                "height": 1.5
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut app = app_for(&mock_server, ApiVariant::Chat);
    let (tx, rx) = mpsc::channel();

    spawn_history(app.api.clone(), app.session_id.clone(), tx.clone())
        .await
        .unwrap();
    apply_all(&mut app, &rx);
    assert_eq!(app.store.phase(), StorePhase::Ready);

    submit(&mut app, "  king post, 4 m  ", &tx).await;
    let effects = apply_all(&mut app, &rx);

    assert!(effects.contains(&Effect::ClearInput));
    assert!(!app.is_loading);
    assert_eq!(app.error, None);
    assert_eq!(app.store.len(), 2);

    let latest = app.store.latest().unwrap();
    assert_eq!(latest.message, "king post, 4 m");
    assert_eq!(latest.truss_data.as_ref().unwrap().nodes.len(), 3);
    assert_eq!(app.store.get(1).unwrap().message, "older question");
}

#[tokio::test]
async fn test_failed_send_shows_error_and_releases_busy() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/parse"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "model crashed"})),
        )
        .mount(&mock_server)
        .await;

    let mut app = app_for(&mock_server, ApiVariant::Parse);
    let (tx, rx) = mpsc::channel();

    submit(&mut app, "pratt truss", &tx).await;
    let effects = apply_all(&mut app, &rx);

    assert!(!effects.contains(&Effect::ClearInput));
    assert!(!app.is_loading);
    assert_eq!(app.error.as_deref(), Some("model crashed"));
    assert!(app.store.is_empty());

    update(&mut app, Action::DismissError);
    assert_eq!(app.error, None);
}

#[tokio::test]
async fn test_busy_flag_blocks_second_submit() {
    let mock_server = MockServer::start().await;
    let mut app = app_for(&mock_server, ApiVariant::Parse);

    assert!(matches!(
        update(&mut app, Action::Submit("first".into())),
        Effect::SpawnSend(_)
    ));
    assert_eq!(update(&mut app, Action::Submit("second".into())), Effect::None);
    assert_eq!(update(&mut app, Action::Submit("   ".into())), Effect::None);
}

#[tokio::test]
async fn test_health_not_ready_sets_advisory_state() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "ok": false,
            "ollama": false,
            "error": "connection refused"
        })))
        .mount(&mock_server)
        .await;

    let mut app = app_for(&mock_server, ApiVariant::Parse);
    let (tx, rx) = mpsc::channel();
    spawn_health(app.api.clone(), tx).await.unwrap();
    apply_all(&mut app, &rx);

    assert!(app.inference_unavailable());
    assert!(!app.backend_unreachable());
}

#[tokio::test]
async fn test_history_failure_still_marks_ready() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut app = app_for(&mock_server, ApiVariant::Parse);
    let (tx, rx) = mpsc::channel();
    spawn_history(app.api.clone(), app.session_id.clone(), tx)
        .await
        .unwrap();
    apply_all(&mut app, &rx);

    assert_eq!(app.store.phase(), StorePhase::Ready);
    assert!(app.store.is_empty());
}
