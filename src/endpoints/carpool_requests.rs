use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::models::prelude::*;
use crate::models::{carpool_request, carpool_trip};
use crate::services::carpool::{
    self, CarpoolAction, NewCarpoolRequest, NewPayment, PaymentSummary,
};
use crate::state::AppState;

/// Create carpool requests routes
pub fn carpool_requests_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_requests).post(create_request))
        .route("/{id}", get(get_request))
        .route("/{id}/request_action", post(request_action))
        .route("/{id}/payment", post(register_payment))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub trip: Option<i64>,
    pub status: Option<RequestStatus>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ActionBody {
    pub action: CarpoolAction,
    pub response_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RequestResponse {
    #[serde(flatten)]
    pub request: carpool_request::Model,
    pub payment: PaymentSummary,
}

/// Load a request the caller is allowed to see, with its trip.
///
/// Requests of other people are reported as missing rather than forbidden.
async fn visible_request(
    state: &AppState,
    caller: &crate::models::user::Model,
    id: i64,
) -> Result<(carpool_request::Model, carpool_trip::Model)> {
    let found = CarpoolRequest::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

    let trip = CarpoolTrip::find_by_id(found.trip_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    if found.passenger_id != caller.id && trip.driver_id != caller.id {
        return Err(AppError::NotFound("Request not found".to_string()));
    }

    Ok((found, trip))
}

async fn request_response(
    state: &AppState,
    request: carpool_request::Model,
    trip: &carpool_trip::Model,
) -> Result<RequestResponse> {
    let payment = carpool::payment_summary(&state.db, &request, trip).await?;
    Ok(RequestResponse { request, payment })
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

/// List requests the caller made or drives for
async fn list_requests(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<carpool_request::Model>>> {
    let mut query = CarpoolRequest::find()
        .join(JoinType::InnerJoin, carpool_request::Relation::Trip.def())
        .filter(
            Condition::any()
                .add(carpool_request::Column::PassengerId.eq(auth_user.0.id))
                .add(carpool_trip::Column::DriverId.eq(auth_user.0.id)),
        );

    if let Some(trip_id) = params.trip {
        query = query.filter(carpool_request::Column::TripId.eq(trip_id));
    }
    if let Some(status) = params.status {
        query = query.filter(carpool_request::Column::Status.eq(status));
    }

    let requests = query
        .order_by_desc(carpool_request::Column::CreatedAt)
        .offset(params.skip.unwrap_or(0))
        .limit(params.limit.unwrap_or(100))
        .all(&state.db)
        .await?;

    Ok(Json(requests))
}

/// Ask for seats on a trip
async fn create_request(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(data): Json<NewCarpoolRequest>,
) -> Result<Json<carpool_request::Model>> {
    let created = carpool::create_request(&state.db, &auth_user.0, data).await?;
    Ok(Json(created))
}

/// Get a request with its payment summary (driver or passenger)
async fn get_request(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<RequestResponse>> {
    let (request, trip) = visible_request(&state, &auth_user.0, id).await?;
    Ok(Json(request_response(&state, request, &trip).await?))
}

/// Accept or reject (driver) or cancel (passenger) a request
async fn request_action(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(body): Json<ActionBody>,
) -> Result<Json<carpool_request::Model>> {
    let (request, _) = visible_request(&state, &auth_user.0, id).await?;

    let updated = carpool::apply_action(
        &state.db,
        &auth_user.0,
        request,
        body.action,
        body.response_message,
    )
    .await?;

    Ok(Json(updated))
}

/// Record a payment against an accepted request (driver only)
async fn register_payment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(data): Json<NewPayment>,
) -> Result<Json<RequestResponse>> {
    let (request, trip) = visible_request(&state, &auth_user.0, id).await?;

    carpool::register_payment(&state.db, &auth_user.0, &request, data).await?;

    Ok(Json(request_response(&state, request, &trip).await?))
}
