//! Test helpers shared by the in-crate unit tests.
//!
//! Integration tests have their own copy under `tests/common/`.

use chrono::{TimeZone, Utc};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use crate::migrations::Migrator;
use crate::models::event::EventType;
use crate::models::prelude::*;

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
    let user = create_test_user(db, email, "Staff", "User").await;
    let mut active: user::ActiveModel = user.into();
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
