use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::request_status::RequestStatus;

/// A passenger's ask for seats on a trip.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "carpool_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub trip_id: i64,
    pub passenger_id: i64,
    pub status: RequestStatus,
    pub seats_requested: i32,
    pub message: Option<String>,
    /// Driver's reply attached when acting on the request.
    pub response_message: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::carpool_trip::Entity",
        from = "Column::TripId",
        to = "super::carpool_trip::Column::Id",
        on_delete = "Cascade"
    )]
    Trip,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::PassengerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Passenger,
    #[sea_orm(has_many = "super::carpool_payment::Entity")]
    Payments,
}

impl Related<super::carpool_trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Passenger.def()
    }
}

impl Related<super::carpool_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
