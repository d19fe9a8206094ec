use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// Default bed count offered when creating a hosting.
    pub home_available_beds: i32,
    /// Default house rules attached to new hostings.
    pub home_rules: Option<String>,
    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::membership::Entity")]
    Memberships,
    #[sea_orm(has_many = "super::event_subscription::Entity")]
    Subscriptions,
    #[sea_orm(has_many = "super::carpool_trip::Entity")]
    Trips,
    #[sea_orm(has_many = "super::carpool_request::Entity")]
    CarpoolRequests,
    #[sea_orm(has_many = "super::event_hosting::Entity")]
    Hostings,
    #[sea_orm(has_many = "super::event_hosting_request::Entity")]
    HostingRequests,
}

impl Related<super::membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl Related<super::carpool_trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl Related<super::event_hosting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hostings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Two-letter initials, falling back to the first 3 chars of the email.
    pub fn initials(&self) -> String {
        let first = self.first_name.trim().chars().next();
        let last = self.last_name.trim().chars().next();
        match (first, last) {
            (None, None) => self.email.chars().take(3).collect::<String>().to_uppercase(),
            (f, l) => f
                .into_iter()
                .chain(l)
                .collect::<String>()
                .to_uppercase(),
        }
    }
}
