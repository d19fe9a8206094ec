//! Event subscription upserts and aggregation.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::event_subscription::SubscriptionAnswer;
use crate::models::prelude::*;
use crate::state::DbConn;

#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
    pub answer: SubscriptionAnswer,
    #[serde(default)]
    pub can_invite: bool,
}

/// Record or update the caller's answer for an event.
///
/// There is one row per (event, user); subscribing again overwrites the
/// answer and reactivates the row.
pub async fn subscribe(
    db: &DbConn,
    user: &user::Model,
    event_id: i64,
    data: SubscribeBody,
) -> Result<event_subscription::Model> {
    let event = Event::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let now = Utc::now();

    let existing = EventSubscription::find()
        .filter(event_subscription::Column::EventId.eq(event.id))
        .filter(event_subscription::Column::UserId.eq(user.id))
        .one(db)
        .await?;

    if let Some(subscription) = existing {
        let mut active: event_subscription::ActiveModel = subscription.into();
        active.answer = Set(data.answer);
        active.can_invite = Set(data.can_invite);
        active.is_active = Set(true);
        active.updated_at = Set(now);
        Ok(active.update(db).await?)
    } else {
        let new_subscription = event_subscription::ActiveModel {
            event_id: Set(event.id),
            user_id: Set(user.id),
            answer: Set(data.answer),
            can_invite: Set(data.can_invite),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(new_subscription.insert(db).await?)
    }
}

/// Per-answer counts over the active subscriptions of an event.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct AnswerCounts {
    #[serde(rename = "YES")]
    pub yes: u64,
    #[serde(rename = "NO")]
    pub no: u64,
    #[serde(rename = "MAYBE")]
    pub maybe: u64,
}

pub async fn answer_counts(db: &DbConn, event_id: i64) -> Result<AnswerCounts> {
    let subscriptions = EventSubscription::find()
        .filter(event_subscription::Column::EventId.eq(event_id))
        .filter(event_subscription::Column::IsActive.eq(true))
        .all(db)
        .await?;

    let mut counts = AnswerCounts::default();
    for subscription in subscriptions {
        match subscription.answer {
            SubscriptionAnswer::Yes => counts.yes += 1,
            SubscriptionAnswer::No => counts.no += 1,
            SubscriptionAnswer::Maybe => counts.maybe += 1,
        }
    }

    Ok(counts)
}

/// Initials of the earliest 3 active YES subscribers, by creation time.
pub async fn first_subscribers(db: &DbConn, event_id: i64) -> Result<Vec<String>> {
    let subscribers = EventSubscription::find()
        .filter(event_subscription::Column::EventId.eq(event_id))
        .filter(event_subscription::Column::IsActive.eq(true))
        .filter(event_subscription::Column::Answer.eq(SubscriptionAnswer::Yes))
        .order_by_asc(event_subscription::Column::CreatedAt)
        .limit(3)
        .find_also_related(User)
        .all(db)
        .await?;

    Ok(subscribers
        .into_iter()
        .filter_map(|(_, user)| user.map(|u| u.initials()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn yes() -> SubscribeBody {
        SubscribeBody {
            answer: SubscriptionAnswer::Yes,
            can_invite: false,
        }
    }

    #[tokio::test]
    async fn test_subscribe_then_change_answer_upserts() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "s@asso.fr", "Sam", "Sub").await;
        let event = create_test_event(&db, "Drink").await;

        let first = subscribe(&db, &user, event.id, yes()).await.unwrap();
        let second = subscribe(
            &db,
            &user,
            event.id,
            SubscribeBody {
                answer: SubscriptionAnswer::Maybe,
                can_invite: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.answer, SubscriptionAnswer::Maybe);
        assert!(second.can_invite);
    }

    #[tokio::test]
    async fn test_answer_counts() {
        let db = create_test_db().await;
        let event = create_test_event(&db, "Congress").await;

        for (i, answer) in [
            SubscriptionAnswer::Yes,
            SubscriptionAnswer::Yes,
            SubscriptionAnswer::No,
            SubscriptionAnswer::Maybe,
        ]
        .into_iter()
        .enumerate()
        {
            let user =
                create_test_user(&db, &format!("u{}@asso.fr", i), "User", &format!("{}", i)).await;
            subscribe(
                &db,
                &user,
                event.id,
                SubscribeBody {
                    answer,
                    can_invite: false,
                },
            )
            .await
            .unwrap();
        }

        let counts = answer_counts(&db, event.id).await.unwrap();
        assert_eq!(
            counts,
            AnswerCounts {
                yes: 2,
                no: 1,
                maybe: 1
            }
        );
    }

    #[tokio::test]
    async fn test_first_subscribers_initials() {
        let db = create_test_db().await;
        let event = create_test_event(&db, "Congress").await;

        let alice = create_test_user(&db, "alice@asso.fr", "Alice", "Martin").await;
        let bob = create_test_user(&db, "bob@asso.fr", "Bob", "Durand").await;
        subscribe(&db, &alice, event.id, yes()).await.unwrap();
        subscribe(&db, &bob, event.id, yes()).await.unwrap();

        let initials = first_subscribers(&db, event.id).await.unwrap();
        assert_eq!(initials.len(), 2);
        assert!(initials.contains(&"AM".to_string()));
        assert!(initials.contains(&"BD".to_string()));
    }

    #[tokio::test]
    async fn test_first_subscribers_caps_at_three_yes_answers() {
        let db = create_test_db().await;
        let event = create_test_event(&db, "Congress").await;

        for i in 0..5 {
            let user = create_test_user(
                &db,
                &format!("u{}@asso.fr", i),
                &format!("U{}", i),
                "Sub",
            )
            .await;
            subscribe(&db, &user, event.id, yes()).await.unwrap();
        }
        let nay = create_test_user(&db, "no@asso.fr", "Nina", "No").await;
        subscribe(
            &db,
            &nay,
            event.id,
            SubscribeBody {
                answer: SubscriptionAnswer::No,
                can_invite: false,
            },
        )
        .await
        .unwrap();

        let initials = first_subscribers(&db, event.id).await.unwrap();
        assert_eq!(initials.len(), 3);
        assert!(!initials.contains(&"NN".to_string()));
    }

    #[tokio::test]
    async fn test_email_fallback_for_missing_names() {
        let db = create_test_db().await;
        let event = create_test_event(&db, "Congress").await;

        let anon = create_test_user(&db, "zoe@asso.fr", "", "").await;
        subscribe(&db, &anon, event.id, yes()).await.unwrap();

        let initials = first_subscribers(&db, event.id).await.unwrap();
        assert_eq!(initials, vec!["ZOE".to_string()]);
    }
}
