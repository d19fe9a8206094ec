//! Membership creation and overlap validation.

use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::state::DbConn;

#[derive(Debug, Deserialize)]
pub struct NewMembership {
    pub user_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct MembershipUpdate {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Reject an active membership whose date range overlaps another active
/// membership of the same user. Overlap: existing.start <= new.end AND
/// existing.end >= new.start. Inactive rows are ignored.
pub async fn validate_no_overlap(
    db: &DbConn,
    user_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    exclude_id: Option<i64>,
) -> Result<()> {
    let mut query = Membership::find()
        .filter(membership::Column::UserId.eq(user_id))
        .filter(membership::Column::IsActive.eq(true))
        .filter(membership::Column::StartDate.lte(end_date))
        .filter(membership::Column::EndDate.gte(start_date));

    if let Some(id) = exclude_id {
        query = query.filter(membership::Column::Id.ne(id));
    }

    if query.count(db).await? > 0 {
        return Err(AppError::field(
            "start_date",
            "This user already has an active membership over this period",
        ));
    }

    Ok(())
}

pub async fn create_membership(db: &DbConn, data: NewMembership) -> Result<membership::Model> {
    User::find_by_id(data.user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if data.end_date < data.start_date {
        return Err(AppError::field(
            "end_date",
            "End date cannot be before start date",
        ));
    }

    if data.is_active {
        validate_no_overlap(db, data.user_id, data.start_date, data.end_date, None).await?;
    }

    let now = Utc::now();
    let new_membership = membership::ActiveModel {
        user_id: Set(data.user_id),
        start_date: Set(data.start_date),
        end_date: Set(data.end_date),
        is_active: Set(data.is_active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(new_membership.insert(db).await?)
}

pub async fn update_membership(
    db: &DbConn,
    membership: membership::Model,
    data: MembershipUpdate,
) -> Result<membership::Model> {
    let start_date = data.start_date.unwrap_or(membership.start_date);
    let end_date = data.end_date.unwrap_or(membership.end_date);
    let is_active = data.is_active.unwrap_or(membership.is_active);

    if end_date < start_date {
        return Err(AppError::field(
            "end_date",
            "End date cannot be before start date",
        ));
    }

    if is_active {
        validate_no_overlap(
            db,
            membership.user_id,
            start_date,
            end_date,
            Some(membership.id),
        )
        .await?;
    }

    let mut active: membership::ActiveModel = membership.into();
    active.start_date = Set(start_date);
    active.end_date = Set(end_date);
    active.is_active = Set(is_active);
    active.updated_at = Set(Utc::now());

    Ok(active.update(db).await?)
}
