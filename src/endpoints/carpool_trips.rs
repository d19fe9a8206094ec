use axum::{
    extract::{Extension, Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::models::carpool_trip;
use crate::models::prelude::*;
use crate::services::carpool;
use crate::state::AppState;

/// Create carpool trips routes
pub fn carpool_trips_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_trips).post(create_trip))
        .route(
            "/{id}",
            get(get_trip).patch(update_trip).delete(delete_trip),
        )
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub event: Option<i64>,
    pub driver: Option<i64>,
    pub departure_city: Option<String>,
    pub arrival_city: Option<String>,
    pub is_active: Option<bool>,
    pub has_seats: Option<bool>,
    pub departure_after: Option<DateTime<Utc>>,
    pub departure_before: Option<DateTime<Utc>>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    pub event_id: i64,
    #[validate(length(min = 1, message = "Departure city is required"))]
    pub departure_city: String,
    pub departure_address: Option<String>,
    #[validate(length(min = 1, message = "Arrival city is required"))]
    pub arrival_city: String,
    pub arrival_address: Option<String>,
    pub departure_datetime: DateTime<Utc>,
    pub return_datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub has_return: bool,
    #[validate(range(min = 1, message = "A trip needs at least one seat"))]
    pub seats_total: i32,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price_per_seat: f64,
    pub additional_info: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTripRequest {
    pub departure_city: Option<String>,
    pub departure_address: Option<String>,
    pub arrival_city: Option<String>,
    pub arrival_address: Option<String>,
    pub departure_datetime: Option<DateTime<Utc>>,
    pub return_datetime: Option<DateTime<Utc>>,
    pub has_return: Option<bool>,
    pub seats_total: Option<i32>,
    pub price_per_seat: Option<f64>,
    pub additional_info: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TripResponse {
    #[serde(flatten)]
    pub trip: carpool_trip::Model,
    pub seats_available: i32,
}

async fn trip_response(state: &AppState, trip: carpool_trip::Model) -> Result<TripResponse> {
    let seats_available = carpool::seats_available(&state.db, &trip).await?;
    Ok(TripResponse {
        trip,
        seats_available,
    })
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

/// List trips with optional filters
async fn list_trips(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<TripResponse>>> {
    let mut query = CarpoolTrip::find();

    if let Some(event_id) = params.event {
        query = query.filter(carpool_trip::Column::EventId.eq(event_id));
    }
    if let Some(driver_id) = params.driver {
        query = query.filter(carpool_trip::Column::DriverId.eq(driver_id));
    }
    if let Some(ref city) = params.departure_city {
        query = query.filter(carpool_trip::Column::DepartureCity.eq(city));
    }
    if let Some(ref city) = params.arrival_city {
        query = query.filter(carpool_trip::Column::ArrivalCity.eq(city));
    }
    if let Some(is_active) = params.is_active {
        query = query.filter(carpool_trip::Column::IsActive.eq(is_active));
    }
    if let Some(after) = params.departure_after {
        query = query.filter(carpool_trip::Column::DepartureDatetime.gte(after));
    }
    if let Some(before) = params.departure_before {
        query = query.filter(carpool_trip::Column::DepartureDatetime.lte(before));
    }

    query = query.order_by_asc(carpool_trip::Column::DepartureDatetime);

    let skip = params.skip.unwrap_or(0);
    let limit = params.limit.unwrap_or(100);

    // Seat availability is derived, so filtering on it means paging the
    // filtered set rather than the table: full trips must not eat page slots.
    let responses = if params.has_seats == Some(true) {
        let trips = query.all(&state.db).await?;
        let mut with_seats = Vec::new();
        for trip in trips {
            let response = trip_response(&state, trip).await?;
            if response.seats_available > 0 {
                with_seats.push(response);
            }
        }
        with_seats
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect()
    } else {
        let trips = query.offset(skip).limit(limit).all(&state.db).await?;
        let mut responses = Vec::new();
        for trip in trips {
            responses.push(trip_response(&state, trip).await?);
        }
        responses
    };

    Ok(Json(responses))
}

/// Offer a new trip, driven by the caller
async fn create_trip(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(data): Json<CreateTripRequest>,
) -> Result<Json<TripResponse>> {
    data.validate()?;

    Event::find_by_id(data.event_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let now = Utc::now();
    let new_trip = carpool_trip::ActiveModel {
        driver_id: Set(auth_user.0.id),
        event_id: Set(data.event_id),
        departure_city: Set(data.departure_city),
        departure_address: Set(data.departure_address),
        arrival_city: Set(data.arrival_city),
        arrival_address: Set(data.arrival_address),
        departure_datetime: Set(data.departure_datetime),
        return_datetime: Set(data.return_datetime),
        has_return: Set(data.has_return),
        seats_total: Set(data.seats_total),
        price_per_seat: Set(data.price_per_seat),
        additional_info: Set(data.additional_info),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = new_trip.insert(&state.db).await?;
    Ok(Json(trip_response(&state, created).await?))
}

/// Get a trip with its current seat availability
async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TripResponse>> {
    let found = CarpoolTrip::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    Ok(Json(trip_response(&state, found).await?))
}

/// Update a trip (driver only)
async fn update_trip(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(data): Json<UpdateTripRequest>,
) -> Result<Json<TripResponse>> {
    let found = CarpoolTrip::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    if found.driver_id != auth_user.0.id {
        return Err(AppError::Forbidden(
            "Only the driver can update this trip".to_string(),
        ));
    }

    if let Some(seats_total) = data.seats_total {
        let taken = carpool::accepted_seats(&state.db, found.id).await?;
        if seats_total < taken {
            return Err(AppError::field(
                "seats_total",
                format!("{} seat(s) are already booked on this trip", taken),
            ));
        }
    }

    let mut trip_model: carpool_trip::ActiveModel = found.into();

    if let Some(city) = data.departure_city {
        trip_model.departure_city = Set(city);
    }
    if let Some(address) = data.departure_address {
        trip_model.departure_address = Set(Some(address));
    }
    if let Some(city) = data.arrival_city {
        trip_model.arrival_city = Set(city);
    }
    if let Some(address) = data.arrival_address {
        trip_model.arrival_address = Set(Some(address));
    }
    if let Some(datetime) = data.departure_datetime {
        trip_model.departure_datetime = Set(datetime);
    }
    if let Some(datetime) = data.return_datetime {
        trip_model.return_datetime = Set(Some(datetime));
    }
    if let Some(has_return) = data.has_return {
        trip_model.has_return = Set(has_return);
    }
    if let Some(seats_total) = data.seats_total {
        trip_model.seats_total = Set(seats_total);
    }
    if let Some(price) = data.price_per_seat {
        trip_model.price_per_seat = Set(price);
    }
    if let Some(info) = data.additional_info {
        trip_model.additional_info = Set(Some(info));
    }
    if let Some(is_active) = data.is_active {
        trip_model.is_active = Set(is_active);
    }
    trip_model.updated_at = Set(Utc::now());

    let updated = trip_model.update(&state.db).await?;
    Ok(Json(trip_response(&state, updated).await?))
}

/// Deactivate a trip (driver only). Requests stay attached for history.
async fn delete_trip(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let found = CarpoolTrip::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    if found.driver_id != auth_user.0.id {
        return Err(AppError::Forbidden(
            "Only the driver can delete this trip".to_string(),
        ));
    }

    let mut trip_model: carpool_trip::ActiveModel = found.into();
    trip_model.is_active = Set(false);
    trip_model.updated_at = Set(Utc::now());
    trip_model.update(&state.db).await?;

    Ok(Json(serde_json::json!({"message": "Trip deactivated"})))
}
