use axum::{
    extract::{Extension, Path, Query, State},
    routing::get,
    Json, Router,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::{ensure_staff, AuthenticatedUser};
use crate::models::membership;
use crate::models::prelude::*;
use crate::services::membership as membership_service;
use crate::state::AppState;

/// Create memberships routes
pub fn memberships_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_memberships).post(create_membership))
        .route("/{id}", get(get_membership).patch(update_membership))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub user_id: Option<i64>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

/// List memberships. Staff see everyone's; a plain user only their own.
async fn list_memberships(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<membership::Model>>> {
    let mut query = Membership::find();

    if auth_user.0.is_staff {
        if let Some(user_id) = params.user_id {
            query = query.filter(membership::Column::UserId.eq(user_id));
        }
    } else {
        query = query.filter(membership::Column::UserId.eq(auth_user.0.id));
    }

    let memberships = query
        .order_by_desc(membership::Column::StartDate)
        .offset(params.skip.unwrap_or(0))
        .limit(params.limit.unwrap_or(100))
        .all(&state.db)
        .await?;

    Ok(Json(memberships))
}

/// Create a membership (staff only)
async fn create_membership(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(data): Json<membership_service::NewMembership>,
) -> Result<Json<membership::Model>> {
    ensure_staff(&auth_user.0)?;
    let created = membership_service::create_membership(&state.db, data).await?;
    Ok(Json(created))
}

/// Get a membership. Staff or the member themself.
async fn get_membership(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<membership::Model>> {
    let found = Membership::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;

    if !auth_user.0.is_staff && found.user_id != auth_user.0.id {
        return Err(AppError::NotFound("Membership not found".to_string()));
    }

    Ok(Json(found))
}

/// Update a membership (staff only)
async fn update_membership(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(data): Json<membership_service::MembershipUpdate>,
) -> Result<Json<membership::Model>> {
    ensure_staff(&auth_user.0)?;

    let found = Membership::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;

    let updated = membership_service::update_membership(&state.db, found, data).await?;
    Ok(Json(updated))
}
