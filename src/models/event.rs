use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    #[sea_orm(string_value = "CONGRESS")]
    Congress,
    #[sea_orm(string_value = "DRINK")]
    Drink,
    #[sea_orm(string_value = "OFFICE")]
    Office,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub url_signup: Option<String>,
    pub url_website: Option<String>,
    /// Free-form price lines shown on the event page.
    pub prices: Option<String>,
    pub event_type: EventType,
    pub is_public: bool,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_subscription::Entity")]
    Subscriptions,
    #[sea_orm(has_many = "super::carpool_trip::Entity")]
    Trips,
    #[sea_orm(has_many = "super::event_hosting::Entity")]
    Hostings,
}

impl Related<super::event_subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
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
