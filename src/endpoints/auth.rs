use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::user;
use crate::services::{create_access_token, hash_password, verify_password};
use crate::state::AppState;

/// Create auth routes
pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: user::Model,
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

/// Register a new account
async fn register(
    State(state): State<AppState>,
    Json(data): Json<RegisterRequest>,
) -> Result<Json<user::Model>> {
    data.validate()?;

    let existing = User::find()
        .filter(user::Column::Email.eq(&data.email))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::field(
            "email",
            "An account with this email already exists",
        ));
    }

    let hashed = hash_password(&data.password)?;
    let now = Utc::now();

    let new_user = user::ActiveModel {
        email: Set(data.email),
        hashed_password: Set(hashed),
        first_name: Set(data.first_name),
        last_name: Set(data.last_name),
        phone: Set(data.phone),
        home_available_beds: Set(0),
        home_rules: Set(None),
        is_staff: Set(false),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = new_user.insert(&state.db).await?;
    Ok(Json(created))
}

/// Login with email and password, returns a bearer token
async fn login(
    State(state): State<AppState>,
    Json(data): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let found_user = User::find()
        .filter(user::Column::Email.eq(&data.email))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !found_user.is_active {
        return Err(AppError::Unauthorized("Account is disabled".to_string()));
    }

    if !verify_password(&data.password, &found_user.hashed_password)? {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let access_token = create_access_token(found_user.id, &found_user.email)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: found_user,
    }))
}
