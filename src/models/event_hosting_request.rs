use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::request_status::RequestStatus;

/// A guest's ask for a bed in a hosting offer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_hosting_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub hosting_id: i64,
    pub requester_id: i64,
    pub status: RequestStatus,
    pub message: Option<String>,
    /// Host's reply attached when accepting or rejecting.
    pub host_message: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event_hosting::Entity",
        from = "Column::HostingId",
        to = "super::event_hosting::Column::Id",
        on_delete = "Cascade"
    )]
    Hosting,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RequesterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Requester,
}

impl Related<super::event_hosting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hosting.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requester.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
