//! HTTP-level tests for the admin surface: authentication, raffle reads,
//! the reservation list filters, the block registry and settings.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;
use sorteo::config::Config;
use sorteo::db::NewRaffle;
use sorteo::entities::blocked_numbers;
use sorteo::models::RaffleStatus;
use sorteo::state::SharedState;
use std::sync::Arc;
use tower::ServiceExt;

const API_KEY: &str = "sorteo_default_api_key_please_regenerate";

async fn spawn_app() -> (Arc<SharedState>, Router) {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = Arc::new(
        SharedState::new(config)
            .await
            .expect("Failed to create app state"),
    );
    let app = sorteo::api::router(state.clone());
    (state, app)
}

async fn seed_raffle(state: &SharedState, title: &str, status: RaffleStatus) -> i32 {
    state
        .store
        .add_raffle(NewRaffle {
            title: title.to_string(),
            description: Some("premio grande".to_string()),
            image: None,
            tags: vec!["diciembre".to_string()],
            status,
        })
        .await
        .expect("Failed to seed raffle")
        .id
}

async fn reserve(app: &Router, raffle_id: i32, number: &str, name: &str, phone: &str) -> i32 {
    let body = json!({
        "raffle_id": raffle_id,
        "ticket_number": number,
        "name": name,
        "phone": phone,
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/reserve")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["reservation_id"].as_i64().unwrap() as i32
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-Api-Key", API_KEY)
        .body(Body::empty())
        .unwrap()
}

fn admin_json(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Api-Key", API_KEY)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn admin_routes_require_the_api_key() {
    let (_state, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/admin/reservations"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/reservations")
                .header("X-Api-Key", "wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(admin_get("/api/admin/reservations"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Bearer form is accepted too.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/reservations")
                .header("Authorization", format!("Bearer {API_KEY}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let (_state, app) = spawn_app().await;

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn public_raffle_list_hides_inactive_raffles() {
    let (state, app) = spawn_app().await;
    seed_raffle(&state, "Rifa Activa", RaffleStatus::Active).await;
    let inactive_id = seed_raffle(&state, "Rifa Pasada", RaffleStatus::Inactive).await;

    let response = app.clone().oneshot(get("/api/raffles")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Rifa Activa"]);

    let response = app
        .clone()
        .oneshot(get("/api/raffles?include_inactive=true"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // Single raffle fetch works for inactive raffles; missing ids are 404.
    let response = app
        .clone()
        .oneshot(get(&format!("/api/raffles/{inactive_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], json!("inactive"));

    let response = app.oneshot(get("/api/raffles/999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reservation_list_supports_status_payment_and_search_filters() {
    let (state, app) = spawn_app().await;
    let raffle_id = seed_raffle(&state, "Gran Rifa", RaffleStatus::Active).await;
    state
        .store
        .set_setting("admin_whatsapp", "5551112222")
        .await
        .unwrap();

    let first = reserve(&app, raffle_id, "0001", "Ana López", "5551111111").await;
    reserve(&app, raffle_id, "0002", "Benito Pérez", "5552222222").await;

    let ticket = state
        .store
        .find_ticket(raffle_id, "0001")
        .await
        .unwrap()
        .unwrap();
    let response = app
        .clone()
        .oneshot(admin_json(
            "POST",
            &format!("/api/admin/reservations/{first}/confirm"),
            &json!({ "ticket_id": ticket.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(
        app.clone()
            .oneshot(admin_get("/api/admin/reservations"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["raffle_title"], json!("Gran Rifa"));

    let body = body_json(
        app.clone()
            .oneshot(admin_get("/api/admin/reservations?status=confirmed"))
            .await
            .unwrap(),
    )
    .await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["ticket_number"], json!("0001"));
    assert_eq!(rows[0]["payment_status"], json!("paid"));

    let body = body_json(
        app.clone()
            .oneshot(admin_get("/api/admin/reservations?payment=pending"))
            .await
            .unwrap(),
    )
    .await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["customer_name"], json!("Benito Pérez"));

    let body = body_json(
        app.clone()
            .oneshot(admin_get("/api/admin/reservations?search=Benito"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = app
        .oneshot(admin_get("/api/admin/reservations?status=bogus"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn block_registry_crud() {
    let (_state, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(admin_json(
            "POST",
            "/api/admin/blocks",
            &json!({ "phone_number": "555-123-4567" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let block_id = body["data"]["id"].as_i64().unwrap() as i32;
    assert_eq!(body["data"]["phone_number"], json!("5551234567"));

    // Blocking the same (normalized) number again is a conflict.
    let response = app
        .clone()
        .oneshot(admin_json(
            "POST",
            "/api/admin/blocks",
            &json!({ "phone_number": "5551234567" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(
        app.clone()
            .oneshot(admin_get("/api/admin/blocks"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(admin_json(
            "POST",
            "/api/admin/blocks",
            &json!({ "phone_number": "garbage" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/blocks/{block_id}"))
                .header("X-Api-Key", API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/blocks/{block_id}"))
                .header("X-Api-Key", API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(
        app.oneshot(admin_get("/api/admin/blocks")).await.unwrap(),
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn purging_blocks_removes_only_expired_rows() {
    let (state, app) = spawn_app().await;

    state.store.block_phone("5551111111", 30).await.unwrap();
    blocked_numbers::ActiveModel {
        phone_number: Set("5552222222".to_string()),
        block_until: Set(Utc::now() - Duration::minutes(5)),
        created_at: Set(Utc::now() - Duration::minutes(35)),
        ..Default::default()
    }
    .insert(&state.store.conn)
    .await
    .unwrap();

    let response = app
        .clone()
        .oneshot(admin_json("POST", "/api/admin/blocks/purge", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["purged"], json!(1));

    // Purging again finds nothing.
    let response = app
        .oneshot(admin_json("POST", "/api/admin/blocks/purge", &json!({})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["purged"], json!(0));

    assert!(state.store.is_phone_blocked("5551111111").await.unwrap());
    assert!(!state.store.is_phone_blocked("5552222222").await.unwrap());
}

#[tokio::test]
async fn block_settings_round_trip() {
    let (_state, app) = spawn_app().await;

    let body = body_json(
        app.clone()
            .oneshot(admin_get("/api/admin/block-settings"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["data"], json!({ "enabled": false, "duration_minutes": 30 }));

    let response = app
        .clone()
        .oneshot(admin_json(
            "PUT",
            "/api/admin/block-settings",
            &json!({ "enabled": true, "duration_minutes": 45 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(
        app.clone()
            .oneshot(admin_get("/api/admin/block-settings"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["data"], json!({ "enabled": true, "duration_minutes": 45 }));

    let response = app
        .oneshot(admin_json(
            "PUT",
            "/api/admin/block-settings",
            &json!({ "enabled": true, "duration_minutes": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settings_round_trip() {
    let (_state, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(admin_json(
            "PUT",
            "/api/admin/settings",
            &json!({
                "site_name": "Rifas Doña Lupe",
                "admin_whatsapp": "5551112222",
                "country_code": "52",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(
        app.clone()
            .oneshot(admin_get("/api/admin/settings"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["data"]["site_name"], json!("Rifas Doña Lupe"));
    assert_eq!(body["data"]["admin_whatsapp"], json!("5551112222"));

    // A partial update leaves untouched keys alone.
    let response = app
        .clone()
        .oneshot(admin_json(
            "PUT",
            "/api/admin/settings",
            &json!({ "site_name": "Rifas 2026" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["site_name"], json!("Rifas 2026"));
    assert_eq!(body["data"]["country_code"], json!("52"));

    let response = app
        .oneshot(admin_json("PUT", "/api/admin/settings", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
