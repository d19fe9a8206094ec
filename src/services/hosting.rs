//! Event-hosting allocation logic: bed accounting and request lifecycle.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use sea_orm::{JoinType, QuerySelect, RelationTrait};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::state::DbConn;

/// Beds not yet taken by an accepted request.
pub async fn places_available(db: &DbConn, hosting: &event_hosting::Model) -> Result<i32> {
    let accepted = EventHostingRequest::find()
        .filter(event_hosting_request::Column::HostingId.eq(hosting.id))
        .filter(event_hosting_request::Column::Status.eq(RequestStatus::Accepted))
        .count(db)
        .await?;

    Ok(hosting.available_beds - accepted as i32)
}

#[derive(Debug, Deserialize)]
pub struct NewHosting {
    pub event_id: i64,
    /// Defaults to the host's profile value when omitted.
    pub available_beds: Option<i32>,
    /// Defaults to the host's profile rules when omitted.
    pub custom_rules: Option<String>,
}

/// Create a hosting offer, one per (event, host).
pub async fn create_hosting(
    db: &DbConn,
    host: &user::Model,
    data: NewHosting,
) -> Result<event_hosting::Model> {
    Event::find_by_id(data.event_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let existing = EventHosting::find()
        .filter(event_hosting::Column::EventId.eq(data.event_id))
        .filter(event_hosting::Column::HostId.eq(host.id))
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "You already offer a hosting for this event".to_string(),
        ));
    }

    let now = Utc::now();
    let new_hosting = event_hosting::ActiveModel {
        event_id: Set(data.event_id),
        host_id: Set(host.id),
        available_beds: Set(data.available_beds.unwrap_or(host.home_available_beds)),
        custom_rules: Set(data.custom_rules.or_else(|| host.home_rules.clone())),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(new_hosting.insert(db).await?)
}

#[derive(Debug, Deserialize)]
pub struct NewHostingRequest {
    pub hosting_id: i64,
    pub message: Option<String>,
}

/// Create a PENDING hosting request.
///
/// Refused when the requester is the host, already has an accepted request
/// for any hosting of the same event, or still has an open request for this
/// hosting.
pub async fn create_request(
    db: &DbConn,
    requester: &user::Model,
    data: NewHostingRequest,
) -> Result<event_hosting_request::Model> {
    let hosting = EventHosting::find_by_id(data.hosting_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hosting not found".to_string()))?;

    if hosting.host_id == requester.id {
        return Err(AppError::field(
            "hosting_id",
            "You cannot request your own hosting",
        ));
    }

    // One accepted bed per event, across all hostings of that event
    let accepted_for_event = EventHostingRequest::find()
        .join(
            JoinType::InnerJoin,
            event_hosting_request::Relation::Hosting.def(),
        )
        .filter(event_hosting::Column::EventId.eq(hosting.event_id))
        .filter(event_hosting_request::Column::RequesterId.eq(requester.id))
        .filter(event_hosting_request::Column::Status.eq(RequestStatus::Accepted))
        .count(db)
        .await?;

    if accepted_for_event > 0 {
        return Err(AppError::field(
            "hosting_id",
            "You already have an accepted request for this event",
        ));
    }

    let open_for_hosting = EventHostingRequest::find()
        .filter(event_hosting_request::Column::HostingId.eq(hosting.id))
        .filter(event_hosting_request::Column::RequesterId.eq(requester.id))
        .filter(
            event_hosting_request::Column::Status
                .is_not_in([RequestStatus::Cancelled, RequestStatus::Rejected]),
        )
        .count(db)
        .await?;

    if open_for_hosting > 0 {
        return Err(AppError::field(
            "hosting_id",
            "You already have an open request for this hosting",
        ));
    }

    let now = Utc::now();
    let new_request = event_hosting_request::ActiveModel {
        hosting_id: Set(hosting.id),
        requester_id: Set(requester.id),
        status: Set(RequestStatus::Pending),
        message: Set(data.message),
        host_message: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(new_request.insert(db).await?)
}

#[derive(Debug, Default, Deserialize)]
pub struct HostingActionBody {
    pub host_message: Option<String>,
}

/// Accept a request (host only): needs PENDING status and a free place.
pub async fn accept(
    db: &DbConn,
    actor: &user::Model,
    request: event_hosting_request::Model,
    host_message: Option<String>,
) -> Result<event_hosting_request::Model> {
    let hosting = hosting_of(db, &request).await?;

    if hosting.host_id != actor.id {
        return Err(AppError::Forbidden(
            "Only the host can accept this request".to_string(),
        ));
    }

    if request.status != RequestStatus::Pending {
        return Err(AppError::BadRequest(
            "This request can no longer be accepted".to_string(),
        ));
    }

    if places_available(db, &hosting).await? <= 0 {
        return Err(AppError::BadRequest(
            "No places left in this hosting".to_string(),
        ));
    }

    transition(db, request, RequestStatus::Accepted, host_message).await
}

/// Reject a request (host only): needs PENDING status.
pub async fn reject(
    db: &DbConn,
    actor: &user::Model,
    request: event_hosting_request::Model,
    host_message: Option<String>,
) -> Result<event_hosting_request::Model> {
    let hosting = hosting_of(db, &request).await?;

    if hosting.host_id != actor.id {
        return Err(AppError::Forbidden(
            "Only the host can reject this request".to_string(),
        ));
    }

    if request.status != RequestStatus::Pending {
        return Err(AppError::BadRequest(
            "This request can no longer be rejected".to_string(),
        ));
    }

    transition(db, request, RequestStatus::Rejected, host_message).await
}

/// Cancel a request (requester only).
///
/// PENDING and ACCEPTED requests become CANCELLED; requests already in a
/// terminal state are returned unchanged.
pub async fn cancel(
    db: &DbConn,
    actor: &user::Model,
    request: event_hosting_request::Model,
) -> Result<event_hosting_request::Model> {
    if request.requester_id != actor.id {
        return Err(AppError::Forbidden(
            "Only the requester can cancel this request".to_string(),
        ));
    }

    if request.status.is_terminal() {
        return Ok(request);
    }

    transition(db, request, RequestStatus::Cancelled, None).await
}

async fn hosting_of(
    db: &DbConn,
    request: &event_hosting_request::Model,
) -> Result<event_hosting::Model> {
    EventHosting::find_by_id(request.hosting_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hosting not found".to_string()))
}

async fn transition(
    db: &DbConn,
    request: event_hosting_request::Model,
    status: RequestStatus,
    host_message: Option<String>,
) -> Result<event_hosting_request::Model> {
    let mut active: event_hosting_request::ActiveModel = request.into();
    active.status = Set(status);
    if let Some(message) = host_message {
        active.host_message = Set(Some(message));
    }
    active.updated_at = Set(Utc::now());

    Ok(active.update(db).await?)
}

/// Availability summary returned by the hosting endpoint.
#[derive(Debug, Serialize)]
pub struct AvailablePlaces {
    pub total_beds: i32,
    pub accepted_guests: i32,
    pub available_places: i32,
}

pub async fn available_places(
    db: &DbConn,
    hosting: &event_hosting::Model,
) -> Result<AvailablePlaces> {
    let available = places_available(db, hosting).await?;

    Ok(AvailablePlaces {
        total_beds: hosting.available_beds,
        accepted_guests: hosting.available_beds - available,
        available_places: available,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    async fn setup() -> (DbConn, user::Model, user::Model, event_hosting::Model) {
        let db = create_test_db().await;
        let host = create_test_user(&db, "host@asso.fr", "Hugo", "Host").await;
        let guest = create_test_user(&db, "guest@asso.fr", "Gaby", "Guest").await;
        let event = create_test_event(&db, "Winter Congress").await;
        let hosting = create_test_hosting(&db, event.id, host.id, 2).await;
        (db, host, guest, hosting)
    }

    fn ask(hosting_id: i64) -> NewHostingRequest {
        NewHostingRequest {
            hosting_id,
            message: None,
        }
    }

    #[tokio::test]
    async fn test_hosting_defaults_from_profile() {
        let db = create_test_db().await;
        let host = create_test_user(&db, "host@asso.fr", "Hugo", "Host").await;
        let event = create_test_event(&db, "Congress").await;

        let hosting = create_hosting(
            &db,
            &host,
            NewHosting {
                event_id: event.id,
                available_beds: None,
                custom_rules: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(hosting.available_beds, host.home_available_beds);
        assert_eq!(hosting.custom_rules, host.home_rules);
    }

    #[tokio::test]
    async fn test_duplicate_hosting_is_conflict() {
        let (db, host, _guest, hosting) = setup().await;

        let err = create_hosting(
            &db,
            &host,
            NewHosting {
                event_id: hosting.event_id,
                available_beds: Some(1),
                custom_rules: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_host_cannot_request_own_hosting() {
        let (db, host, _guest, hosting) = setup().await;

        let err = create_request(&db, &host, ask(hosting.id)).await.unwrap_err();
        assert!(matches!(err, AppError::Field { ref field, .. } if field == "hosting_id"));
    }

    #[tokio::test]
    async fn test_open_request_blocks_second_request() {
        let (db, _host, guest, hosting) = setup().await;

        create_request(&db, &guest, ask(hosting.id)).await.unwrap();
        let err = create_request(&db, &guest, ask(hosting.id)).await.unwrap_err();
        assert!(matches!(err, AppError::Field { .. }));
    }

    #[tokio::test]
    async fn test_rejected_request_allows_retry() {
        let (db, host, guest, hosting) = setup().await;

        let request = create_request(&db, &guest, ask(hosting.id)).await.unwrap();
        reject(&db, &host, request, None).await.unwrap();

        assert!(create_request(&db, &guest, ask(hosting.id)).await.is_ok());
    }

    #[tokio::test]
    async fn test_accepted_elsewhere_blocks_request_for_same_event() {
        let (db, host, guest, hosting) = setup().await;
        let other_host = create_test_user(&db, "other@asso.fr", "Olga", "Host").await;
        let other_hosting = create_test_hosting(&db, hosting.event_id, other_host.id, 3).await;

        let request = create_request(&db, &guest, ask(hosting.id)).await.unwrap();
        accept(&db, &host, request, None).await.unwrap();

        let err = create_request(&db, &guest, ask(other_hosting.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Field { .. }));
    }

    #[tokio::test]
    async fn test_accept_fails_when_full() {
        // available_beds=2 with two accepted guests: third accept must fail.
        let (db, host, guest_a, hosting) = setup().await;
        let guest_b = create_test_user(&db, "b@asso.fr", "Ben", "Guest").await;
        let guest_c = create_test_user(&db, "c@asso.fr", "Cleo", "Guest").await;

        let req_a = create_request(&db, &guest_a, ask(hosting.id)).await.unwrap();
        accept(&db, &host, req_a, None).await.unwrap();
        let req_b = create_request(&db, &guest_b, ask(hosting.id)).await.unwrap();
        accept(&db, &host, req_b, None).await.unwrap();

        let req_c = create_request(&db, &guest_c, ask(hosting.id)).await.unwrap();
        let err = accept(&db, &host, req_c, None).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        assert_eq!(places_available(&db, &hosting).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_only_host_accepts() {
        let (db, _host, guest, hosting) = setup().await;

        let request = create_request(&db, &guest, ask(hosting.id)).await.unwrap();
        let err = accept(&db, &guest, request, None).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_cancel_frees_place() {
        let (db, host, guest, hosting) = setup().await;

        let request = create_request(&db, &guest, ask(hosting.id)).await.unwrap();
        let accepted = accept(&db, &host, request, None).await.unwrap();
        assert_eq!(places_available(&db, &hosting).await.unwrap(), 1);

        let cancelled = cancel(&db, &guest, accepted).await.unwrap();
        assert_eq!(cancelled.status, RequestStatus::Cancelled);
        assert_eq!(places_available(&db, &hosting).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_cancel_on_rejected_is_noop() {
        let (db, host, guest, hosting) = setup().await;

        let request = create_request(&db, &guest, ask(hosting.id)).await.unwrap();
        let rejected = reject(&db, &host, request, None).await.unwrap();

        let unchanged = cancel(&db, &guest, rejected).await.unwrap();
        assert_eq!(unchanged.status, RequestStatus::Rejected);
    }

    #[tokio::test]
    async fn test_host_message_recorded() {
        let (db, host, guest, hosting) = setup().await;

        let request = create_request(&db, &guest, ask(hosting.id)).await.unwrap();
        let accepted = accept(&db, &host, request, Some("Couch is yours".to_string()))
            .await
            .unwrap();
        assert_eq!(accepted.host_message.as_deref(), Some("Couch is yours"));
    }

    #[tokio::test]
    async fn test_available_places_summary() {
        let (db, host, guest, hosting) = setup().await;

        let request = create_request(&db, &guest, ask(hosting.id)).await.unwrap();
        accept(&db, &host, request, None).await.unwrap();

        let summary = available_places(&db, &hosting).await.unwrap();
        assert_eq!(summary.total_beds, 2);
        assert_eq!(summary.accepted_guests, 1);
        assert_eq!(summary.available_places, 1);
    }
}
