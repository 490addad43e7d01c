use std::sync::Arc;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use appointment_cell::router::appointment_routes;
use appointment_cell::services::{BookingService, InMemoryLedger};
use doctor_cell::RosterService;
use shared_utils::test_utils::TestRoster;

fn create_test_app() -> Router {
    let roster = RosterService::parse(&TestRoster::json()).unwrap();
    let service = BookingService::new(Arc::new(roster), Arc::new(InMemoryLedger::new()));
    appointment_routes(Arc::new(service))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json_response)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_booking(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_availability_endpoint() {
    let app = create_test_app();

    let (status, body) = send(&app, get("/availability?doctor_name=Dr.%20A&date=17/03/2025")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], "17/03/2025");
    assert_eq!(body["total_slots"], 6);
    assert_eq!(body["available_slots"][0], "09:00");
}

#[tokio::test]
async fn test_book_then_slot_disappears() {
    let app = create_test_app();

    let (status, body) = send(&app, post_booking(json!({
        "doctor_name": "Dr. A",
        "patient_name": "John",
        "appointment_date": "17/03/2025",
        "appointment_time": "10:00"
    }))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["patient_name"], "John");
    assert!(body["id"].is_string());

    let (_, availability) = send(&app, get("/availability?doctor_name=Dr.%20A&date=17/03/2025")).await;
    assert_eq!(availability["total_slots"], 5);
    assert!(!availability["available_slots"].as_array().unwrap().contains(&json!("10:00")));

    let (status, listed) = send(&app, get("/?doctor_name=Dr.%20A&date=17/03/2025")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["appointments"][0]["appointment_time"], "10:00");
}

#[tokio::test]
async fn test_double_booking_conflict() {
    let app = create_test_app();
    let booking = json!({
        "doctor_name": "Dr. A",
        "patient_name": "John",
        "appointment_date": "17/03/2025",
        "appointment_time": "09:00"
    });

    let (status, _) = send(&app, post_booking(booking.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, post_booking(booking)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("not available"));
}

#[tokio::test]
async fn test_unknown_doctor_and_bad_date() {
    let app = create_test_app();

    let (status, _) = send(&app, get("/availability?doctor_name=Dr.%20Nobody&date=17/03/2025")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, get("/availability?doctor_name=Dr.%20A&date=03-17-2025")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("dd/mm/yyyy"));

    let (status, _) = send(&app, post_booking(json!({
        "doctor_name": "Dr. Nobody",
        "patient_name": "John",
        "appointment_date": "17/03/2025",
        "appointment_time": "09:00"
    }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
