use axum::{
    extract::{Extension, Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::models::event_hosting;
use crate::models::prelude::*;
use crate::services::hosting::{self, AvailablePlaces, NewHosting};
use crate::state::AppState;

/// Create hostings routes
pub fn hostings_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_hostings).post(create_hosting))
        .route("/me", get(my_hostings))
        .route("/for_event", get(hostings_for_event))
        .route(
            "/{id}",
            get(get_hosting).patch(update_hosting).delete(delete_hosting),
        )
        .route("/{id}/available_places", get(get_available_places))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub event_id: Option<i64>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ForEventParams {
    pub event_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHostingRequest {
    pub available_beds: Option<i32>,
    pub custom_rules: Option<String>,
    pub is_active: Option<bool>,
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

/// List active hosting offers
async fn list_hostings(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<event_hosting::Model>>> {
    let mut query = EventHosting::find().filter(event_hosting::Column::IsActive.eq(true));

    if let Some(event_id) = params.event_id {
        query = query.filter(event_hosting::Column::EventId.eq(event_id));
    }

    let hostings = query
        .order_by_desc(event_hosting::Column::CreatedAt)
        .offset(params.skip.unwrap_or(0))
        .limit(params.limit.unwrap_or(100))
        .all(&state.db)
        .await?;

    Ok(Json(hostings))
}

/// Offer a hosting for an event, hosted by the caller
async fn create_hosting(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(data): Json<NewHosting>,
) -> Result<Json<event_hosting::Model>> {
    if let Some(beds) = data.available_beds {
        if beds < 1 {
            return Err(AppError::field(
                "available_beds",
                "A hosting needs at least one bed",
            ));
        }
    }

    let created = hosting::create_hosting(&state.db, &auth_user.0, data).await?;
    Ok(Json(created))
}

/// The caller's own hosting offers
async fn my_hostings(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<event_hosting::Model>>> {
    let hostings = EventHosting::find()
        .filter(event_hosting::Column::HostId.eq(auth_user.0.id))
        .order_by_desc(event_hosting::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(hostings))
}

/// Active hosting offers for one event
async fn hostings_for_event(
    State(state): State<AppState>,
    Query(params): Query<ForEventParams>,
) -> Result<Json<Vec<event_hosting::Model>>> {
    let hostings = EventHosting::find()
        .filter(event_hosting::Column::EventId.eq(params.event_id))
        .filter(event_hosting::Column::IsActive.eq(true))
        .order_by_desc(event_hosting::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(hostings))
}

/// Get a hosting offer
async fn get_hosting(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<event_hosting::Model>> {
    let found = EventHosting::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hosting not found".to_string()))?;

    Ok(Json(found))
}

/// Update a hosting offer (host only)
async fn update_hosting(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(data): Json<UpdateHostingRequest>,
) -> Result<Json<event_hosting::Model>> {
    let found = EventHosting::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hosting not found".to_string()))?;

    if found.host_id != auth_user.0.id {
        return Err(AppError::Forbidden(
            "Only the host can update this hosting".to_string(),
        ));
    }

    if let Some(beds) = data.available_beds {
        let taken = found.available_beds - hosting::places_available(&state.db, &found).await?;
        if beds < taken {
            return Err(AppError::field(
                "available_beds",
                format!("{} bed(s) are already taken in this hosting", taken),
            ));
        }
    }

    let mut hosting_model: event_hosting::ActiveModel = found.into();

    if let Some(beds) = data.available_beds {
        hosting_model.available_beds = Set(beds);
    }
    if let Some(rules) = data.custom_rules {
        hosting_model.custom_rules = Set(Some(rules));
    }
    if let Some(is_active) = data.is_active {
        hosting_model.is_active = Set(is_active);
    }
    hosting_model.updated_at = Set(Utc::now());

    let updated = hosting_model.update(&state.db).await?;
    Ok(Json(updated))
}

/// Withdraw a hosting offer (host only)
async fn delete_hosting(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let found = EventHosting::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hosting not found".to_string()))?;

    if found.host_id != auth_user.0.id {
        return Err(AppError::Forbidden(
            "Only the host can delete this hosting".to_string(),
        ));
    }

    let mut hosting_model: event_hosting::ActiveModel = found.into();
    hosting_model.is_active = Set(false);
    hosting_model.updated_at = Set(Utc::now());
    hosting_model.update(&state.db).await?;

    Ok(Json(serde_json::json!({"message": "Hosting withdrawn"})))
}

/// Bed availability for a hosting
async fn get_available_places(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AvailablePlaces>> {
    let found = EventHosting::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hosting not found".to_string()))?;

    Ok(Json(hosting::available_places(&state.db, &found).await?))
}
