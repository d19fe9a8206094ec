//! Migration: Create carpool_requests table

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users::Users;
use super::m20250301_000005_create_carpool_trips::CarpoolTrips;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CarpoolRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CarpoolRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CarpoolRequests::TripId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CarpoolRequests::PassengerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CarpoolRequests::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(CarpoolRequests::SeatsRequested)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(CarpoolRequests::Message).text().null())
                    .col(ColumnDef::new(CarpoolRequests::ResponseMessage).text().null())
                    .col(
                        ColumnDef::new(CarpoolRequests::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(CarpoolRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CarpoolRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_carpool_requests_trip")
                            .from(CarpoolRequests::Table, CarpoolRequests::TripId)
                            .to(CarpoolTrips::Table, CarpoolTrips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_carpool_requests_passenger")
                            .from(CarpoolRequests::Table, CarpoolRequests::PassengerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_carpool_requests_trip")
                    .table(CarpoolRequests::Table)
                    .col(CarpoolRequests::TripId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_carpool_requests_passenger")
                    .table(CarpoolRequests::Table)
                    .col(CarpoolRequests::PassengerId)
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
                    .table(CarpoolRequests::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum CarpoolRequests {
    Table,
    Id,
    TripId,
    PassengerId,
    Status,
    SeatsRequested,
    Message,
    ResponseMessage,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
