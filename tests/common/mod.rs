//! Shared helpers for the integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tower::util::ServiceExt;

use assohub::endpoints::create_router;
use assohub::migrations::Migrator;
use assohub::models::event::EventType;
use assohub::models::prelude::*;
use assohub::services::create_access_token;
use assohub::state::AppState;

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// Build the full router over a test database
pub fn build_app(db: DatabaseConnection) -> Router {
    create_router(AppState::new(db))
}

/// Create a test user. Low bcrypt cost to keep the suite fast.
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> user::Model {
    let now = Utc::now();
    let new_user = user::ActiveModel {
        email: Set(email.to_string()),
        hashed_password: Set(bcrypt::hash("password123", 4).unwrap()),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        phone: Set(None),
        home_available_beds: Set(2),
        home_rules: Set(Some("No smoking".to_string())),
        is_staff: Set(false),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    new_user.insert(db).await.unwrap()
}

/// Create a staff user
pub async fn create_test_staff_user(db: &DatabaseConnection, email: &str) -> user::Model {
    let created = create_test_user(db, email, "Staff", "User").await;
    let mut active: user::ActiveModel = created.into();
    active.is_staff = Set(true);
    active.update(db).await.unwrap()
}

/// Create a test event
pub async fn create_test_event(db: &DatabaseConnection, name: &str) -> event::Model {
    let now = Utc::now();
    let new_event = event::ActiveModel {
        name: Set(name.to_string()),
        description: Set(None),
        location: Set("Lille".to_string()),
        start_date: Set(Utc.with_ymd_and_hms(2026, 10, 10, 18, 0, 0).unwrap()),
        end_date: Set(Utc.with_ymd_and_hms(2026, 10, 12, 23, 0, 0).unwrap()),
        url_signup: Set(None),
        url_website: Set(None),
        prices: Set(None),
        event_type: Set(EventType::Congress),
        is_public: Set(true),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    new_event.insert(db).await.unwrap()
}

/// Create a private or inactive event variant
pub async fn create_hidden_event(
    db: &DatabaseConnection,
    name: &str,
    is_public: bool,
    is_active: bool,
) -> event::Model {
    let created = create_test_event(db, name).await;
    let mut active: event::ActiveModel = created.into();
    active.is_public = Set(is_public);
    active.is_active = Set(is_active);
    active.update(db).await.unwrap()
}

/// Create a test carpool trip
pub async fn create_test_trip(
    db: &DatabaseConnection,
    driver_id: i64,
    event_id: i64,
    seats_total: i32,
    price_per_seat: f64,
) -> carpool_trip::Model {
    let now = Utc::now();
    let new_trip = carpool_trip::ActiveModel {
        driver_id: Set(driver_id),
        event_id: Set(event_id),
        departure_city: Set("Compiegne".to_string()),
        departure_address: Set(None),
        arrival_city: Set("Lille".to_string()),
        arrival_address: Set(None),
        departure_datetime: Set(Utc.with_ymd_and_hms(2026, 10, 10, 8, 0, 0).unwrap()),
        return_datetime: Set(None),
        has_return: Set(false),
        seats_total: Set(seats_total),
        price_per_seat: Set(price_per_seat),
        additional_info: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    new_trip.insert(db).await.unwrap()
}

/// Create a test hosting offer
pub async fn create_test_hosting(
    db: &DatabaseConnection,
    event_id: i64,
    host_id: i64,
    available_beds: i32,
) -> event_hosting::Model {
    let now = Utc::now();
    let new_hosting = event_hosting::ActiveModel {
        event_id: Set(event_id),
        host_id: Set(host_id),
        available_beds: Set(available_beds),
        custom_rules: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    new_hosting.insert(db).await.unwrap()
}

/// Mint a bearer token for a user
pub fn token_for(user: &user::Model) -> String {
    create_access_token(user.id, &user.email).unwrap()
}

/// Send a JSON request, optionally authenticated, and return (status, body).
pub async fn send_request(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    json_body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().uri(uri).method(method);

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let body = match json_body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::String(
            String::from_utf8_lossy(&bytes).to_string(),
        ))
    };

    (status, value)
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    send_request(app, "GET", uri, token, None).await
}

pub async fn post(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_request(app, "POST", uri, token, Some(body)).await
}

pub async fn patch(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_request(app, "PATCH", uri, token, Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    send_request(app, "DELETE", uri, token, None).await
}
