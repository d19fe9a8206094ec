//! Carpool reservation logic: seat accounting, request lifecycle, payments.
//!
//! Availability checks are check-then-act over the shared connection; the
//! store's transaction guarantees are relied on, same as the rest of the
//! application (no row locking here).

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::carpool_payment::PaymentMethod;
use crate::models::prelude::*;
use crate::state::DbConn;

/// Sum of seats held by accepted requests on a trip.
pub async fn accepted_seats(db: &DbConn, trip_id: i64) -> Result<i32> {
    let accepted = CarpoolRequest::find()
        .filter(carpool_request::Column::TripId.eq(trip_id))
        .filter(carpool_request::Column::Status.eq(RequestStatus::Accepted))
        .all(db)
        .await?;

    Ok(accepted.iter().map(|r| r.seats_requested).sum())
}

/// seats_total minus accepted seats. Never negative under sequential use.
pub async fn seats_available(db: &DbConn, trip: &carpool_trip::Model) -> Result<i32> {
    Ok(trip.seats_total - accepted_seats(db, trip.id).await?)
}

#[derive(Debug, Deserialize)]
pub struct NewCarpoolRequest {
    pub trip_id: i64,
    #[serde(default = "default_seats")]
    pub seats_requested: i32,
    pub message: Option<String>,
}

fn default_seats() -> i32 {
    1
}

/// Create a PENDING request for the passenger.
///
/// Refused when the passenger is the driver, when an open request already
/// exists for (passenger, trip), or when the trip cannot seat the ask.
pub async fn create_request(
    db: &DbConn,
    passenger: &user::Model,
    data: NewCarpoolRequest,
) -> Result<carpool_request::Model> {
    let trip = CarpoolTrip::find_by_id(data.trip_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    if !trip.is_active {
        return Err(AppError::field("trip_id", "This trip is no longer active"));
    }

    if passenger.id == trip.driver_id {
        return Err(AppError::field(
            "passenger",
            "The driver cannot request a seat on their own trip",
        ));
    }

    if data.seats_requested < 1 {
        return Err(AppError::field(
            "seats_requested",
            "At least one seat must be requested",
        ));
    }

    let available = seats_available(db, &trip).await?;
    if data.seats_requested > available {
        return Err(AppError::field(
            "seats_requested",
            format!("Only {} seat(s) left on this trip", available),
        ));
    }

    let existing = CarpoolRequest::find()
        .filter(carpool_request::Column::TripId.eq(trip.id))
        .filter(carpool_request::Column::PassengerId.eq(passenger.id))
        .filter(
            carpool_request::Column::Status
                .is_in([RequestStatus::Pending, RequestStatus::Accepted]),
        )
        .filter(carpool_request::Column::IsActive.eq(true))
        .one(db)
        .await?;

    if let Some(existing) = existing {
        let message = match existing.status {
            RequestStatus::Accepted => "You already have an accepted booking for this trip",
            _ => "You already have a pending request for this trip",
        };
        return Err(AppError::field("trip_id", message));
    }

    let now = Utc::now();
    let new_request = carpool_request::ActiveModel {
        trip_id: Set(trip.id),
        passenger_id: Set(passenger.id),
        status: Set(RequestStatus::Pending),
        seats_requested: Set(data.seats_requested),
        message: Set(data.message),
        response_message: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(new_request.insert(db).await?)
}

/// Action a driver or passenger can take on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarpoolAction {
    Accept,
    Reject,
    Cancel,
}

/// Apply accept/reject (driver) or cancel (passenger) to a request.
pub async fn apply_action(
    db: &DbConn,
    actor: &user::Model,
    request: carpool_request::Model,
    action: CarpoolAction,
    response_message: Option<String>,
) -> Result<carpool_request::Model> {
    let trip = CarpoolTrip::find_by_id(request.trip_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    let new_status = match action {
        CarpoolAction::Accept | CarpoolAction::Reject => {
            if actor.id != trip.driver_id {
                return Err(AppError::Forbidden(
                    "Only the driver can accept or reject a request".to_string(),
                ));
            }

            if request.status != RequestStatus::Pending {
                return Err(AppError::field(
                    "action",
                    format!(
                        "This request has already been {}",
                        request.status.display()
                    ),
                ));
            }

            if action == CarpoolAction::Accept {
                let available = seats_available(db, &trip).await?;
                if available < request.seats_requested {
                    return Err(AppError::field(
                        "action",
                        format!("Only {} seat(s) left on this trip", available),
                    ));
                }
                RequestStatus::Accepted
            } else {
                RequestStatus::Rejected
            }
        }
        CarpoolAction::Cancel => {
            if actor.id != request.passenger_id {
                return Err(AppError::Forbidden(
                    "Only the passenger can cancel their request".to_string(),
                ));
            }

            if request.status.is_terminal() {
                return Err(AppError::field(
                    "action",
                    format!(
                        "This request has already been {}",
                        request.status.display()
                    ),
                ));
            }

            RequestStatus::Cancelled
        }
    };

    let mut active: carpool_request::ActiveModel = request.into();
    active.status = Set(new_status);
    if let Some(message) = response_message {
        active.response_message = Set(Some(message));
    }
    active.updated_at = Set(Utc::now());

    Ok(active.update(db).await?)
}

#[derive(Debug, Serialize)]
pub struct PaymentSummary {
    pub total_paid: f64,
    pub expected_amount: f64,
    pub is_paid: bool,
}

/// Aggregate payments for a request. Every payment row counts toward
/// total_paid regardless of its completion flag.
pub async fn payment_summary(
    db: &DbConn,
    request: &carpool_request::Model,
    trip: &carpool_trip::Model,
) -> Result<PaymentSummary> {
    let payments = CarpoolPayment::find()
        .filter(carpool_payment::Column::RequestId.eq(request.id))
        .all(db)
        .await?;

    let total_paid: f64 = payments.iter().map(|p| p.amount).sum();
    let expected_amount = request.seats_requested as f64 * trip.price_per_seat;

    // Amounts are euros; compare at cent precision so accumulated float
    // error cannot leave an exactly-paid request marked unpaid
    let is_paid = (total_paid * 100.0).round() >= (expected_amount * 100.0).round();

    Ok(PaymentSummary {
        total_paid,
        expected_amount,
        is_paid,
    })
}

#[derive(Debug, Deserialize)]
pub struct NewPayment {
    pub amount: f64,
    #[serde(default = "default_method")]
    pub method: PaymentMethod,
    #[serde(default)]
    pub is_completed: bool,
}

fn default_method() -> PaymentMethod {
    PaymentMethod::Cash
}

/// Register a payment against an accepted request (driver only).
///
/// The existing completed payment row, if any, is the update target;
/// otherwise a new row is inserted.
pub async fn register_payment(
    db: &DbConn,
    actor: &user::Model,
    request: &carpool_request::Model,
    data: NewPayment,
) -> Result<carpool_payment::Model> {
    let trip = CarpoolTrip::find_by_id(request.trip_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    if actor.id != trip.driver_id {
        return Err(AppError::Forbidden(
            "Only the driver can register payments".to_string(),
        ));
    }

    if request.status != RequestStatus::Accepted {
        return Err(AppError::BadRequest(
            "Only accepted requests can receive payments".to_string(),
        ));
    }

    if data.amount < 0.0 {
        return Err(AppError::field("amount", "Amount cannot be negative"));
    }

    let now = Utc::now();

    let existing_completed = CarpoolPayment::find()
        .filter(carpool_payment::Column::RequestId.eq(request.id))
        .filter(carpool_payment::Column::IsCompleted.eq(true))
        .one(db)
        .await?;

    if let Some(payment) = existing_completed {
        let mut active: carpool_payment::ActiveModel = payment.into();
        active.amount = Set(data.amount);
        active.method = Set(data.method);
        active.is_completed = Set(data.is_completed);
        active.updated_at = Set(now);
        Ok(active.update(db).await?)
    } else {
        let new_payment = carpool_payment::ActiveModel {
            request_id: Set(request.id),
            amount: Set(data.amount),
            is_completed: Set(data.is_completed),
            method: Set(data.method),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(new_payment.insert(db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    async fn setup() -> (DbConn, user::Model, user::Model, carpool_trip::Model) {
        let db = create_test_db().await;
        let driver = create_test_user(&db, "driver@asso.fr", "Dan", "Driver").await;
        let passenger = create_test_user(&db, "pass@asso.fr", "Paula", "Passenger").await;
        let event = create_test_event(&db, "Spring Congress").await;
        let trip = create_test_trip(&db, driver.id, event.id, 3, 10.0).await;
        (db, driver, passenger, trip)
    }

    fn ask(trip_id: i64, seats: i32) -> NewCarpoolRequest {
        NewCarpoolRequest {
            trip_id,
            seats_requested: seats,
            message: None,
        }
    }

    #[tokio::test]
    async fn test_create_request_starts_pending() {
        let (db, _driver, passenger, trip) = setup().await;

        let request = create_request(&db, &passenger, ask(trip.id, 2)).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.seats_requested, 2);
        assert_eq!(seats_available(&db, &trip).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_driver_cannot_request_own_trip() {
        let (db, driver, _passenger, trip) = setup().await;

        let err = create_request(&db, &driver, ask(trip.id, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::Field { ref field, .. } if field == "passenger"));
    }

    #[tokio::test]
    async fn test_duplicate_open_request_refused() {
        let (db, _driver, passenger, trip) = setup().await;

        create_request(&db, &passenger, ask(trip.id, 1)).await.unwrap();
        let err = create_request(&db, &passenger, ask(trip.id, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::Field { ref field, .. } if field == "trip_id"));
    }

    #[tokio::test]
    async fn test_new_request_allowed_after_cancel() {
        let (db, _driver, passenger, trip) = setup().await;

        let request = create_request(&db, &passenger, ask(trip.id, 1)).await.unwrap();
        apply_action(&db, &passenger, request, CarpoolAction::Cancel, None)
            .await
            .unwrap();

        assert!(create_request(&db, &passenger, ask(trip.id, 1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_request_more_seats_than_available_refused() {
        let (db, _driver, passenger, trip) = setup().await;

        let err = create_request(&db, &passenger, ask(trip.id, 4)).await.unwrap_err();
        assert!(matches!(err, AppError::Field { ref field, .. } if field == "seats_requested"));
    }

    #[tokio::test]
    async fn test_accept_reserves_seats() {
        let (db, driver, passenger, trip) = setup().await;

        let request = create_request(&db, &passenger, ask(trip.id, 2)).await.unwrap();
        let accepted = apply_action(&db, &driver, request, CarpoolAction::Accept, None)
            .await
            .unwrap();

        assert_eq!(accepted.status, RequestStatus::Accepted);
        assert_eq!(seats_available(&db, &trip).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_accept_refused_when_overbooking() {
        // seats_total=3: A takes 2, B asks 2 while 1 left.
        let (db, driver, passenger_a, trip) = setup().await;
        let passenger_b = create_test_user(&db, "other@asso.fr", "Bob", "Late").await;

        let req_a = create_request(&db, &passenger_a, ask(trip.id, 2)).await.unwrap();
        apply_action(&db, &driver, req_a, CarpoolAction::Accept, None)
            .await
            .unwrap();

        // B's request was placed while seats were still free
        let req_b = create_request(&db, &passenger_b, ask(trip.id, 1)).await.unwrap();
        let mut active: carpool_request::ActiveModel = req_b.into();
        active.seats_requested = Set(2);
        let req_b = active.update(&db).await.unwrap();

        let err = apply_action(&db, &driver, req_b, CarpoolAction::Accept, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Field { ref field, .. } if field == "action"));
        assert_eq!(seats_available(&db, &trip).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_only_driver_accepts() {
        let (db, _driver, passenger, trip) = setup().await;

        let request = create_request(&db, &passenger, ask(trip.id, 1)).await.unwrap();
        let err = apply_action(&db, &passenger, request, CarpoolAction::Accept, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_reject_requires_pending() {
        let (db, driver, passenger, trip) = setup().await;

        let request = create_request(&db, &passenger, ask(trip.id, 1)).await.unwrap();
        let accepted = apply_action(&db, &driver, request, CarpoolAction::Accept, None)
            .await
            .unwrap();

        let err = apply_action(&db, &driver, accepted, CarpoolAction::Reject, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Field { .. }));
    }

    #[tokio::test]
    async fn test_cancel_refused_after_reject() {
        let (db, driver, passenger, trip) = setup().await;

        let request = create_request(&db, &passenger, ask(trip.id, 1)).await.unwrap();
        let rejected = apply_action(&db, &driver, request, CarpoolAction::Reject, None)
            .await
            .unwrap();

        let err = apply_action(&db, &passenger, rejected, CarpoolAction::Cancel, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Field { .. }));
    }

    #[tokio::test]
    async fn test_cancel_releases_seats() {
        let (db, driver, passenger, trip) = setup().await;

        let request = create_request(&db, &passenger, ask(trip.id, 2)).await.unwrap();
        let accepted = apply_action(&db, &driver, request, CarpoolAction::Accept, None)
            .await
            .unwrap();
        assert_eq!(seats_available(&db, &trip).await.unwrap(), 1);

        apply_action(&db, &passenger, accepted, CarpoolAction::Cancel, None)
            .await
            .unwrap();
        assert_eq!(seats_available(&db, &trip).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_response_message_recorded() {
        let (db, driver, passenger, trip) = setup().await;

        let request = create_request(&db, &passenger, ask(trip.id, 1)).await.unwrap();
        let rejected = apply_action(
            &db,
            &driver,
            request,
            CarpoolAction::Reject,
            Some("Car is full of gear".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(rejected.response_message.as_deref(), Some("Car is full of gear"));
    }

    #[tokio::test]
    async fn test_payment_requires_accepted_request() {
        let (db, driver, passenger, trip) = setup().await;

        let request = create_request(&db, &passenger, ask(trip.id, 1)).await.unwrap();
        let err = register_payment(
            &db,
            &driver,
            &request,
            NewPayment {
                amount: 10.0,
                method: PaymentMethod::Cash,
                is_completed: true,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_payment_only_by_driver() {
        let (db, driver, passenger, trip) = setup().await;

        let request = create_request(&db, &passenger, ask(trip.id, 1)).await.unwrap();
        let accepted = apply_action(&db, &driver, request, CarpoolAction::Accept, None)
            .await
            .unwrap();

        let err = register_payment(
            &db,
            &passenger,
            &accepted,
            NewPayment {
                amount: 10.0,
                method: PaymentMethod::Cash,
                is_completed: true,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_completed_payment_is_update_target() {
        let (db, driver, passenger, trip) = setup().await;

        let request = create_request(&db, &passenger, ask(trip.id, 2)).await.unwrap();
        let accepted = apply_action(&db, &driver, request, CarpoolAction::Accept, None)
            .await
            .unwrap();

        let first = register_payment(
            &db,
            &driver,
            &accepted,
            NewPayment {
                amount: 5.0,
                method: PaymentMethod::Cash,
                is_completed: true,
            },
        )
        .await
        .unwrap();

        let second = register_payment(
            &db,
            &driver,
            &accepted,
            NewPayment {
                amount: 20.0,
                method: PaymentMethod::Transfer,
                is_completed: true,
            },
        )
        .await
        .unwrap();

        // Same row updated, not a second one inserted
        assert_eq!(first.id, second.id);
        assert_eq!(second.amount, 20.0);
        assert_eq!(second.method, PaymentMethod::Transfer);

        let summary = payment_summary(&db, &accepted, &trip).await.unwrap();
        assert_eq!(summary.total_paid, 20.0);
        assert_eq!(summary.expected_amount, 20.0);
        assert!(summary.is_paid);
    }

    #[tokio::test]
    async fn test_exact_payment_is_paid_despite_float_drift() {
        let db = create_test_db().await;
        let driver = create_test_user(&db, "driver@asso.fr", "Dan", "Driver").await;
        let passenger = create_test_user(&db, "pass@asso.fr", "Paula", "Passenger").await;
        let event = create_test_event(&db, "Spring Congress").await;
        // 3 x 0.10 accumulates to slightly more than 0.3 in binary floats
        let trip = create_test_trip(&db, driver.id, event.id, 3, 0.1).await;

        let request = create_request(&db, &passenger, ask(trip.id, 3)).await.unwrap();
        let accepted = apply_action(&db, &driver, request, CarpoolAction::Accept, None)
            .await
            .unwrap();

        register_payment(
            &db,
            &driver,
            &accepted,
            NewPayment {
                amount: 0.3,
                method: PaymentMethod::Cash,
                is_completed: true,
            },
        )
        .await
        .unwrap();

        let summary = payment_summary(&db, &accepted, &trip).await.unwrap();
        assert!(summary.is_paid);
    }

    #[tokio::test]
    async fn test_total_paid_counts_incomplete_payments() {
        let (db, driver, passenger, trip) = setup().await;

        let request = create_request(&db, &passenger, ask(trip.id, 2)).await.unwrap();
        let accepted = apply_action(&db, &driver, request, CarpoolAction::Accept, None)
            .await
            .unwrap();

        register_payment(
            &db,
            &driver,
            &accepted,
            NewPayment {
                amount: 8.0,
                method: PaymentMethod::Cash,
                is_completed: false,
            },
        )
        .await
        .unwrap();
        register_payment(
            &db,
            &driver,
            &accepted,
            NewPayment {
                amount: 8.0,
                method: PaymentMethod::Lydia,
                is_completed: false,
            },
        )
        .await
        .unwrap();

        let summary = payment_summary(&db, &accepted, &trip).await.unwrap();
        // 2 seats x 10.0 expected, 16.0 paid across incomplete rows
        assert_eq!(summary.total_paid, 16.0);
        assert_eq!(summary.expected_amount, 20.0);
        assert!(!summary.is_paid);
    }
}
