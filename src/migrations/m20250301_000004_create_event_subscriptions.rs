//! Migration: Create event_subscriptions table

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
                    .table(EventSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventSubscriptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EventSubscriptions::EventId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventSubscriptions::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EventSubscriptions::Answer).string().not_null())
                    .col(
                        ColumnDef::new(EventSubscriptions::CanInvite)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(EventSubscriptions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(EventSubscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventSubscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_subscriptions_event")
                            .from(EventSubscriptions::Table, EventSubscriptions::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_subscriptions_user")
                            .from(EventSubscriptions::Table, EventSubscriptions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One subscription row per (event, user)
        manager
            .create_index(
                Index::create()
                    .name("idx_event_subscriptions_event_user")
                    .table(EventSubscriptions::Table)
                    .col(EventSubscriptions::EventId)
                    .col(EventSubscriptions::UserId)
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
                    .table(EventSubscriptions::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum EventSubscriptions {
    Table,
    Id,
    EventId,
    UserId,
    Answer,
    CanInvite,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
