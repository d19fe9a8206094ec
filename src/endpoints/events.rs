use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::{current_user, ensure_staff, MaybeUser};
use crate::models::event::{self, EventType};
use crate::models::prelude::*;
use crate::services::subscriptions::{self, AnswerCounts, SubscribeBody};
use crate::state::AppState;

/// Create events routes.
///
/// Mounted behind the optional-auth layer: reads work for anonymous callers
/// (restricted to public active events), everything else demands a token.
pub fn events_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route(
            "/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/{id}/subscribe", post(subscribe_to_event))
        .route("/{id}/subscriptions", get(get_event_subscriptions))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub event_type: Option<EventType>,
    pub is_active: Option<bool>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub start_date: chrono::DateTime<Utc>,
    pub end_date: chrono::DateTime<Utc>,
    pub url_signup: Option<String>,
    pub url_website: Option<String>,
    pub prices: Option<String>,
    pub event_type: EventType,
    #[serde(default = "default_true")]
    pub is_public: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<chrono::DateTime<Utc>>,
    pub end_date: Option<chrono::DateTime<Utc>>,
    pub url_signup: Option<String>,
    pub url_website: Option<String>,
    pub prices: Option<String>,
    pub event_type: Option<EventType>,
    pub is_public: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionsResponse {
    pub answers: AnswerCounts,
    pub first_subscribers: Vec<String>,
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

/// List events. Anonymous callers only see public active events.
async fn list_events(
    State(state): State<AppState>,
    auth_user: MaybeUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<event::Model>>> {
    let mut query = Event::find();

    if auth_user.0.is_none() {
        query = query
            .filter(event::Column::IsPublic.eq(true))
            .filter(event::Column::IsActive.eq(true));
    } else if let Some(is_active) = params.is_active {
        query = query.filter(event::Column::IsActive.eq(is_active));
    }

    if let Some(event_type) = params.event_type {
        query = query.filter(event::Column::EventType.eq(event_type));
    }

    let events = query
        .order_by_asc(event::Column::StartDate)
        .offset(params.skip.unwrap_or(0))
        .limit(params.limit.unwrap_or(100))
        .all(&state.db)
        .await?;

    Ok(Json(events))
}

/// Get a single event. Private or inactive events are hidden from anonymous
/// callers.
async fn get_event(
    State(state): State<AppState>,
    auth_user: MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<event::Model>> {
    let found = Event::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    if auth_user.0.is_none() && !(found.is_public && found.is_active) {
        return Err(AppError::NotFound("Event not found".to_string()));
    }

    Ok(Json(found))
}

/// Create an event (staff only)
async fn create_event(
    State(state): State<AppState>,
    auth_user: MaybeUser,
    Json(data): Json<CreateEventRequest>,
) -> Result<Json<event::Model>> {
    let user = current_user(auth_user)?;
    ensure_staff(&user)?;
    data.validate()?;

    let now = Utc::now();
    let new_event = event::ActiveModel {
        name: Set(data.name),
        description: Set(data.description),
        location: Set(data.location),
        start_date: Set(data.start_date),
        end_date: Set(data.end_date),
        url_signup: Set(data.url_signup),
        url_website: Set(data.url_website),
        prices: Set(data.prices),
        event_type: Set(data.event_type),
        is_public: Set(data.is_public),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = new_event.insert(&state.db).await?;
    Ok(Json(created))
}

/// Update an event (staff only)
async fn update_event(
    State(state): State<AppState>,
    auth_user: MaybeUser,
    Path(id): Path<i64>,
    Json(data): Json<UpdateEventRequest>,
) -> Result<Json<event::Model>> {
    let user = current_user(auth_user)?;
    ensure_staff(&user)?;

    let found = Event::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let mut event_model: event::ActiveModel = found.into();

    if let Some(name) = data.name {
        event_model.name = Set(name);
    }
    if let Some(description) = data.description {
        event_model.description = Set(Some(description));
    }
    if let Some(location) = data.location {
        event_model.location = Set(location);
    }
    if let Some(start_date) = data.start_date {
        event_model.start_date = Set(start_date);
    }
    if let Some(end_date) = data.end_date {
        event_model.end_date = Set(end_date);
    }
    if let Some(url_signup) = data.url_signup {
        event_model.url_signup = Set(Some(url_signup));
    }
    if let Some(url_website) = data.url_website {
        event_model.url_website = Set(Some(url_website));
    }
    if let Some(prices) = data.prices {
        event_model.prices = Set(Some(prices));
    }
    if let Some(event_type) = data.event_type {
        event_model.event_type = Set(event_type);
    }
    if let Some(is_public) = data.is_public {
        event_model.is_public = Set(is_public);
    }
    if let Some(is_active) = data.is_active {
        event_model.is_active = Set(is_active);
    }
    event_model.updated_at = Set(Utc::now());

    let updated = event_model.update(&state.db).await?;
    Ok(Json(updated))
}

/// Deactivate an event (staff only). Rows are kept for history.
async fn delete_event(
    State(state): State<AppState>,
    auth_user: MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let user = current_user(auth_user)?;
    ensure_staff(&user)?;

    let found = Event::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let mut event_model: event::ActiveModel = found.into();
    event_model.is_active = Set(false);
    event_model.updated_at = Set(Utc::now());
    event_model.update(&state.db).await?;

    Ok(Json(serde_json::json!({"message": "Event deactivated"})))
}

/// Record the caller's answer for an event
async fn subscribe_to_event(
    State(state): State<AppState>,
    auth_user: MaybeUser,
    Path(id): Path<i64>,
    Json(data): Json<SubscribeBody>,
) -> Result<Json<crate::models::event_subscription::Model>> {
    let user = current_user(auth_user)?;
    let subscription = subscriptions::subscribe(&state.db, &user, id, data).await?;
    Ok(Json(subscription))
}

/// Answer counts plus the initials of the first confirmed subscribers
async fn get_event_subscriptions(
    State(state): State<AppState>,
    auth_user: MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<SubscriptionsResponse>> {
    current_user(auth_user)?;

    Event::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let answers = subscriptions::answer_counts(&state.db, id).await?;
    let first_subscribers = subscriptions::first_subscribers(&state.db, id).await?;

    Ok(Json(SubscriptionsResponse {
        answers,
        first_subscribers,
    }))
}
