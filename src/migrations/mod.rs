pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_memberships;
mod m20250301_000003_create_events;
mod m20250301_000004_create_event_subscriptions;
mod m20250301_000005_create_carpool_trips;
mod m20250301_000006_create_carpool_requests;
mod m20250301_000007_create_carpool_payments;
mod m20250301_000008_create_event_hostings;
mod m20250301_000009_create_event_hosting_requests;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_memberships::Migration),
            Box::new(m20250301_000003_create_events::Migration),
            Box::new(m20250301_000004_create_event_subscriptions::Migration),
            Box::new(m20250301_000005_create_carpool_trips::Migration),
            Box::new(m20250301_000006_create_carpool_requests::Migration),
            Box::new(m20250301_000007_create_carpool_payments::Migration),
            Box::new(m20250301_000008_create_event_hostings::Migration),
            Box::new(m20250301_000009_create_event_hosting_requests::Migration),
        ]
    }
}
