//! Migration: Create event_hosting_requests table

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users::Users;
use super::m20250301_000008_create_event_hostings::EventHostings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventHostingRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventHostingRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EventHostingRequests::HostingId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventHostingRequests::RequesterId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventHostingRequests::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(EventHostingRequests::Message).text().null())
                    .col(ColumnDef::new(EventHostingRequests::HostMessage).text().null())
                    .col(
                        ColumnDef::new(EventHostingRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventHostingRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_hosting_requests_hosting")
                            .from(
                                EventHostingRequests::Table,
                                EventHostingRequests::HostingId,
                            )
                            .to(EventHostings::Table, EventHostings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_hosting_requests_requester")
                            .from(
                                EventHostingRequests::Table,
                                EventHostingRequests::RequesterId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_hosting_requests_hosting")
                    .table(EventHostingRequests::Table)
                    .col(EventHostingRequests::HostingId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_hosting_requests_requester")
                    .table(EventHostingRequests::Table)
                    .col(EventHostingRequests::RequesterId)
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
                    .table(EventHostingRequests::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum EventHostingRequests {
    Table,
    Id,
    HostingId,
    RequesterId,
    Status,
    Message,
    HostMessage,
    CreatedAt,
    UpdatedAt,
}
