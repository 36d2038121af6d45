//! API integration tests

use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";
const ADMIN_EMAIL: &str = "admin@labreserva.local";
const ADMIN_PASSWORD: &str = "change-me-now";

async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

/// Create a user with `role` and return its token
async fn user_token(client: &Client, admin: &str, role: &str) -> String {
    create_user(client, admin, role).await.1
}

/// Create a user with `role` and return its id and token
async fn create_user(client: &Client, admin: &str, role: &str) -> (i64, String) {
    let email = format!("{}@lab.test", unique(role));
    let response = client
        .post(format!("{}/admin/users", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({
            "email": email,
            "password": "password123",
            "full_name": "Usuario de prueba",
            "role": role
        }))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: Value = response.json().await.expect("Failed to parse user");

    let token = login(client, &email, "password123").await;
    (user["id"].as_i64().expect("No user id"), token)
}

/// Create a lab with one piece of equipment and return the equipment id
async fn equipment_id(client: &Client, admin: &str) -> i64 {
    let lab: Value = client
        .post(format!("{}/labs", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({ "name": unique("Laboratorio") }))
        .send()
        .await
        .expect("Failed to create lab")
        .json()
        .await
        .expect("Failed to parse lab");

    let equipment: Value = client
        .post(format!("{}/labs/{}/equipment", BASE_URL, lab["id"]))
        .bearer_auth(admin)
        .json(&json!({ "name": "Osciloscopio" }))
        .send()
        .await
        .expect("Failed to create equipment")
        .json()
        .await
        .expect("Failed to parse equipment");

    equipment["id"].as_i64().expect("No equipment id")
}

async fn file_request(client: &Client, token: &str, equipment_id: i64, offset_days: i64) -> Value {
    file_request_at(client, token, equipment_id, Utc::now() + Duration::days(offset_days)).await
}

async fn file_request_at(client: &Client, token: &str, equipment_id: i64, start: DateTime<Utc>) -> Value {
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "equipment_id": equipment_id,
            "purpose": "Práctica de laboratorio",
            "start_at": start,
            "end_at": start + Duration::hours(2)
        }))
        .send()
        .await
        .expect("Failed to create request");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse request")
}

async fn approve(client: &Client, admin: &str, request: &Value) -> reqwest::Response {
    client
        .post(format!("{}/requests/{}/approve", BASE_URL, request["id"]))
        .bearer_auth(admin)
        .send()
        .await
        .expect("Failed to send approval")
}

async fn set_status(client: &Client, admin: &str, request: &Value, body: Value) -> reqwest::Response {
    client
        .patch(format!("{}/requests/{}/status", BASE_URL, request["id"]))
        .bearer_auth(admin)
        .json(&body)
        .send()
        .await
        .expect("Failed to send status change")
}

async fn current_status(client: &Client, token: &str, request: &Value) -> String {
    let body: Value = client
        .get(format!("{}/requests/{}", BASE_URL, request["id"]))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to fetch request")
        .json()
        .await
        .expect("Failed to parse request");
    body["status"].as_str().expect("No status").to_string()
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["ok"], true);
    assert_eq!(body["db"], "up");
    assert!(body["latency_ms"].as_f64().expect("latency_ms is a number") >= 0.0);
}

#[tokio::test]
#[ignore]
async fn test_list_mine_returns_only_own_requests() {
    let client = Client::new();
    let admin = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let equipment = equipment_id(&client, &admin).await;

    let alice = user_token(&client, &admin, "estudiante").await;
    let bob = user_token(&client, &admin, "docente").await;
    let alices = file_request(&client, &alice, equipment, 3).await;
    file_request(&client, &bob, equipment, 4).await;

    let mine: Vec<Value> = client
        .get(format!("{}/requests", BASE_URL))
        .bearer_auth(&alice)
        .send()
        .await
        .expect("Failed to list requests")
        .json()
        .await
        .expect("Failed to parse list");

    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["id"], alices["id"]);

    // Someone else's request is reported as missing
    let response = client
        .get(format!("{}/requests/{}", BASE_URL, alices["id"]))
        .bearer_auth(&bob)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_approve_missing_request_is_not_found() {
    let client = Client::new();
    let admin = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, i32::MAX))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "NoSuchData");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_approvals_reserve_once() {
    let client = Client::new();
    let admin = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let equipment = equipment_id(&client, &admin).await;
    let student = user_token(&client, &admin, "estudiante").await;
    let request = file_request(&client, &student, equipment, 5).await;

    let approve = || {
        client
            .post(format!("{}/requests/{}/approve", BASE_URL, request["id"]))
            .bearer_auth(&admin)
            .send()
    };
    let (first, second) = tokio::join!(approve(), approve());
    let mut statuses = vec![
        first.expect("Failed to send approval").status(),
        second.expect("Failed to send approval").status(),
    ];
    statuses.sort();

    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);

    let history: Vec<Value> = client
        .get(format!("{}/history/requests/{}", BASE_URL, request["id"]))
        .bearer_auth(&student)
        .send()
        .await
        .expect("Failed to fetch history")
        .json()
        .await
        .expect("Failed to parse history");
    let approvals = history.iter().filter(|e| e["to_status"] == "aprobada").count();
    assert_eq!(approvals, 1);
}

#[tokio::test]
#[ignore]
async fn test_set_status_cannot_approve() {
    let client = Client::new();
    let admin = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let equipment = equipment_id(&client, &admin).await;
    let request = file_request(&client, &admin, equipment, 6).await;

    let response = client
        .patch(format!("{}/requests/{}/status", BASE_URL, request["id"]))
        .bearer_auth(&admin)
        .json(&json!({ "status": "aprobada" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .patch(format!("{}/requests/{}/status", BASE_URL, request["id"]))
        .bearer_auth(&admin)
        .json(&json!({ "status": "rechazada", "comment": "Sin disponibilidad" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "rechazada");
}

#[tokio::test]
#[ignore]
async fn test_export_downloads_a_workbook() {
    let client = Client::new();
    let admin = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = client
        .get(format!("{}/admin/reports/requests.xlsx?filename=solicitudes", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(disposition, "attachment; filename=\"solicitudes.xlsx\"");

    let bytes = response.bytes().await.expect("Failed to read body");
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
#[ignore]
async fn test_unavailable_equipment_cannot_be_approved() {
    let client = Client::new();
    let admin = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let equipment = equipment_id(&client, &admin).await;
    let student = user_token(&client, &admin, "estudiante").await;
    let request = file_request(&client, &student, equipment, 7).await;

    let response = client
        .put(format!("{}/labs/equipment/{}", BASE_URL, equipment))
        .bearer_auth(&admin)
        .json(&json!({ "status": "mantenimiento" }))
        .send()
        .await
        .expect("Failed to update equipment");
    assert_eq!(response.status(), StatusCode::OK);

    let response = approve(&client, &admin, &request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 7);

    assert_eq!(current_status(&client, &student, &request).await, "pendiente");
}

#[tokio::test]
#[ignore]
async fn test_overlapping_window_cannot_be_approved() {
    let client = Client::new();
    let admin = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let equipment = equipment_id(&client, &admin).await;
    let alice = user_token(&client, &admin, "estudiante").await;
    let bob = user_token(&client, &admin, "docente").await;

    let start = Utc::now() + Duration::days(8);
    let first = file_request_at(&client, &alice, equipment, start).await;
    let second = file_request_at(&client, &bob, equipment, start + Duration::hours(1)).await;

    assert_eq!(approve(&client, &admin, &first).await.status(), StatusCode::OK);
    assert_eq!(approve(&client, &admin, &second).await.status(), StatusCode::CONFLICT);
    assert_eq!(current_status(&client, &bob, &second).await, "pendiente");
}

#[tokio::test]
#[ignore]
async fn test_cancelling_an_approval_releases_the_equipment() {
    let client = Client::new();
    let admin = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let equipment = equipment_id(&client, &admin).await;
    let alice = user_token(&client, &admin, "estudiante").await;
    let bob = user_token(&client, &admin, "docente").await;

    let start = Utc::now() + Duration::days(9);
    let first = file_request_at(&client, &alice, equipment, start).await;
    let second = file_request_at(&client, &bob, equipment, start).await;

    assert_eq!(approve(&client, &admin, &first).await.status(), StatusCode::OK);
    assert_eq!(approve(&client, &admin, &second).await.status(), StatusCode::CONFLICT);

    let response = set_status(&client, &admin, &first, json!({ "status": "cancelada" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = approve(&client, &admin, &second).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse approval");
    assert_eq!(body["reservation"]["request_id"], second["id"]);
}

#[tokio::test]
#[ignore]
async fn test_disabled_user_token_is_rejected() {
    let client = Client::new();
    let admin = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (id, student) = create_user(&client, &admin, "estudiante").await;

    let response = client
        .get(format!("{}/requests", BASE_URL))
        .bearer_auth(&student)
        .send()
        .await
        .expect("Failed to list requests");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .put(format!("{}/admin/users/{}/active", BASE_URL, id))
        .bearer_auth(&admin)
        .json(&json!({ "active": false }))
        .send()
        .await
        .expect("Failed to disable user");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/requests", BASE_URL))
        .bearer_auth(&student)
        .send()
        .await
        .expect("Failed to list requests");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_history_survives_request_deletion() {
    let client = Client::new();
    let admin = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let equipment = equipment_id(&client, &admin).await;
    let student = user_token(&client, &admin, "estudiante").await;
    let request = file_request(&client, &student, equipment, 10).await;

    let comment = unique("Equipo reservado para mantenimiento");
    let response = set_status(
        &client,
        &admin,
        &request,
        json!({ "status": "rechazada", "comment": comment }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .delete(format!("{}/requests/{}", BASE_URL, request["id"]))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to delete request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let history: Vec<Value> = client
        .get(format!("{}/history/admin/all", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to fetch history")
        .json()
        .await
        .expect("Failed to parse history");

    let entry = history
        .iter()
        .find(|e| e["comment"] == comment.as_str())
        .expect("History entry was removed with its request");
    assert_eq!(entry["to_status"], "rechazada");
    assert!(entry["request_id"].is_null());
}
