use axum::{
    extract::{Extension, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde::Deserialize;
use validator::Validate;

use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::user;
use crate::state::AppState;

/// Create users routes
pub fn users_routes(state: AppState) -> Router {
    Router::new()
        .route("/me", get(get_current_user).patch(update_current_user))
        .with_state(state)
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    pub phone: Option<String>,
    #[validate(range(min = 0, message = "Bed count cannot be negative"))]
    pub home_available_beds: Option<i32>,
    pub home_rules: Option<String>,
}

/// Get the caller's profile
async fn get_current_user(
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<user::Model>> {
    Ok(Json(auth_user.0))
}

/// Update the caller's profile and hosting defaults
async fn update_current_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(data): Json<UpdateProfileRequest>,
) -> Result<Json<user::Model>> {
    data.validate()?;

    let mut user_model: user::ActiveModel = auth_user.0.into();

    if let Some(first_name) = data.first_name {
        user_model.first_name = Set(first_name);
    }
    if let Some(last_name) = data.last_name {
        user_model.last_name = Set(last_name);
    }
    if let Some(phone) = data.phone {
        user_model.phone = Set(Some(phone));
    }
    if let Some(beds) = data.home_available_beds {
        user_model.home_available_beds = Set(beds);
    }
    if let Some(rules) = data.home_rules {
        user_model.home_rules = Set(Some(rules));
    }
    user_model.updated_at = Set(Utc::now());

    let updated = user_model.update(&state.db).await?;
    Ok(Json(updated))
}
