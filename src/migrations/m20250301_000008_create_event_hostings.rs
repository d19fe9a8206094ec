//! Migration: Create event_hostings table

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users::Users;
use super::m20250301_000003_create_events::Events;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventHostings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventHostings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EventHostings::EventId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EventHostings::HostId).big_integer().not_null())
                    .col(
                        ColumnDef::new(EventHostings::AvailableBeds)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(EventHostings::CustomRules).text().null())
                    .col(
                        ColumnDef::new(EventHostings::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(EventHostings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventHostings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_hostings_event")
                            .from(EventHostings::Table, EventHostings::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_hostings_host")
                            .from(EventHostings::Table, EventHostings::HostId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One hosting offer per (event, host)
        manager
            .create_index(
                Index::create()
                    .name("idx_event_hostings_event_host")
                    .table(EventHostings::Table)
                    .col(EventHostings::EventId)
                    .col(EventHostings::HostId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(EventHostings::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum EventHostings {
    Table,
    Id,
    EventId,
    HostId,
    AvailableBeds,
    CustomRules,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
