use std::sync::Arc;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path};

use appointment_cell::{BookingService, InMemoryLedger};
use assistant_cell::router::assistant_routes;
use assistant_cell::services::{AssistantService, Dispatcher, OpenAiChatModel, SessionStore};
use doctor_cell::RosterService;
use shared_utils::test_utils::{TestConfig, TestRoster, MockOpenAiResponses};

fn create_test_app(mock_server: &MockServer) -> Router {
    let config = TestConfig::with_mock_uri(&mock_server.uri()).to_app_config();
    let roster = RosterService::parse(&TestRoster::json()).unwrap();
    let booking = BookingService::new(Arc::new(roster), Arc::new(InMemoryLedger::new()));

    let model = OpenAiChatModel::new(&config).unwrap();
    let service = AssistantService::new(
        Arc::new(model),
        Dispatcher::new(Arc::new(booking)),
        SessionStore::default(),
    );
    assistant_routes(Arc::new(service))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json_response)
}

fn chat(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn transcript(session_id: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("/sessions/{}", session_id))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_chat_dispatches_capability_and_keeps_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockOpenAiResponses::tool_call_response(
                "get_available_slots",
                json!({ "doctor_name": "Dr. B", "date": "17/03/2025" }),
            )
        ))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);

    let (status, body) = send(&app, chat(json!({ "message": "Is Dr. B free on 17/03/2025?" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Available slots for Dr. B on 17/03/2025 are: 14:00, 14:45, 15:30");

    let session_id = body["session_id"].as_str().unwrap().to_string();
    let (status, body) = send(&app, chat(json!({ "session_id": session_id, "message": "And again?" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], session_id.as_str());

    let (status, body) = send(&app, transcript(&session_id)).await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
}

#[tokio::test]
async fn test_model_failure_is_bad_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockOpenAiResponses::error_response("The server had an error")
        ))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let (status, body) = send(&app, chat(json!({ "message": "Hello" }))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("server had an error"));
}

#[tokio::test]
async fn test_empty_message_and_unknown_session() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server);

    let (status, _) = send(&app, chat(json!({ "message": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, transcript("6f1c2a8e-0000-4000-8000-000000000000")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_chat_refuses_session_it_did_not_start() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockOpenAiResponses::message_response("Hello!")
        ))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let session_id = "6f1c2a8e-0000-4000-8000-000000000000";

    let (status, body) = send(&app, chat(json!({ "session_id": session_id, "message": "Hello" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(session_id));

    let (status, _) = send(&app, transcript(session_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
