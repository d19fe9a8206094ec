use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::models::prelude::*;
use crate::models::{event_hosting, event_hosting_request};
use crate::services::hosting::{self, HostingActionBody, NewHostingRequest};
use crate::state::AppState;

/// Create hosting requests routes
pub fn hosting_requests_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_requests).post(create_request))
        .route("/my_requests", get(my_requests))
        .route("/for_my_hostings", get(for_my_hostings))
        .route("/{id}", get(get_request))
        .route("/{id}/accept", post(accept_request))
        .route("/{id}/reject", post(reject_request))
        .route("/{id}/cancel", post(cancel_request))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub hosting: Option<i64>,
    pub status: Option<RequestStatus>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

/// Load a request the caller may see: the requester, the host, or staff.
///
/// Others get a 404 so request ids do not leak.
async fn visible_request(
    state: &AppState,
    caller: &crate::models::user::Model,
    id: i64,
) -> Result<event_hosting_request::Model> {
    let found = EventHostingRequest::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

    if caller.is_staff || found.requester_id == caller.id {
        return Ok(found);
    }

    let hosting = EventHosting::find_by_id(found.hosting_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hosting not found".to_string()))?;

    if hosting.host_id != caller.id {
        return Err(AppError::NotFound("Request not found".to_string()));
    }

    Ok(found)
}

fn action_body(body: Option<Json<HostingActionBody>>) -> Option<String> {
    body.map(|Json(b)| b).unwrap_or_default().host_message
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

/// List requests the caller made or hosts for; staff see everything
async fn list_requests(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<event_hosting_request::Model>>> {
    let mut query = EventHostingRequest::find();

    if !auth_user.0.is_staff {
        query = query
            .join(
                JoinType::InnerJoin,
                event_hosting_request::Relation::Hosting.def(),
            )
            .filter(
                Condition::any()
                    .add(event_hosting_request::Column::RequesterId.eq(auth_user.0.id))
                    .add(event_hosting::Column::HostId.eq(auth_user.0.id)),
            );
    }

    if let Some(hosting_id) = params.hosting {
        query = query.filter(event_hosting_request::Column::HostingId.eq(hosting_id));
    }
    if let Some(status) = params.status {
        query = query.filter(event_hosting_request::Column::Status.eq(status));
    }

    let requests = query
        .order_by_desc(event_hosting_request::Column::CreatedAt)
        .offset(params.skip.unwrap_or(0))
        .limit(params.limit.unwrap_or(100))
        .all(&state.db)
        .await?;

    Ok(Json(requests))
}

/// Ask for a bed in a hosting
async fn create_request(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(data): Json<NewHostingRequest>,
) -> Result<Json<event_hosting_request::Model>> {
    let created = hosting::create_request(&state.db, &auth_user.0, data).await?;
    Ok(Json(created))
}

/// Requests the caller made
async fn my_requests(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<event_hosting_request::Model>>> {
    let requests = EventHostingRequest::find()
        .filter(event_hosting_request::Column::RequesterId.eq(auth_user.0.id))
        .order_by_desc(event_hosting_request::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(requests))
}

/// Requests received on the caller's hostings
async fn for_my_hostings(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<event_hosting_request::Model>>> {
    let requests = EventHostingRequest::find()
        .join(
            JoinType::InnerJoin,
            event_hosting_request::Relation::Hosting.def(),
        )
        .filter(event_hosting::Column::HostId.eq(auth_user.0.id))
        .order_by_desc(event_hosting_request::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(requests))
}

/// Get a request (requester, host, or staff)
async fn get_request(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<event_hosting_request::Model>> {
    let found = visible_request(&state, &auth_user.0, id).await?;
    Ok(Json(found))
}

/// Accept a request (host only)
async fn accept_request(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    body: Option<Json<HostingActionBody>>,
) -> Result<Json<event_hosting_request::Model>> {
    let found = visible_request(&state, &auth_user.0, id).await?;
    let updated = hosting::accept(&state.db, &auth_user.0, found, action_body(body)).await?;
    Ok(Json(updated))
}

/// Reject a request (host only)
async fn reject_request(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    body: Option<Json<HostingActionBody>>,
) -> Result<Json<event_hosting_request::Model>> {
    let found = visible_request(&state, &auth_user.0, id).await?;
    let updated = hosting::reject(&state.db, &auth_user.0, found, action_body(body)).await?;
    Ok(Json(updated))
}

/// Cancel a request (requester only). Terminal requests come back unchanged.
async fn cancel_request(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<event_hosting_request::Model>> {
    let found = visible_request(&state, &auth_user.0, id).await?;
    let updated = hosting::cancel(&state.db, &auth_user.0, found).await?;
    Ok(Json(updated))
}
