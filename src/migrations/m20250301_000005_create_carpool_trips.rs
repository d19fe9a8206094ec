//! Migration: Create carpool_trips table

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
                    .table(CarpoolTrips::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CarpoolTrips::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CarpoolTrips::DriverId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CarpoolTrips::EventId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CarpoolTrips::DepartureCity)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CarpoolTrips::DepartureAddress).string().null())
                    .col(ColumnDef::new(CarpoolTrips::ArrivalCity).string().not_null())
                    .col(ColumnDef::new(CarpoolTrips::ArrivalAddress).string().null())
                    .col(
                        ColumnDef::new(CarpoolTrips::DepartureDatetime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CarpoolTrips::ReturnDatetime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CarpoolTrips::HasReturn)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(CarpoolTrips::SeatsTotal).integer().not_null())
                    .col(
                        ColumnDef::new(CarpoolTrips::PricePerSeat)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(CarpoolTrips::AdditionalInfo).text().null())
                    .col(
                        ColumnDef::new(CarpoolTrips::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(CarpoolTrips::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CarpoolTrips::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_carpool_trips_driver")
                            .from(CarpoolTrips::Table, CarpoolTrips::DriverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_carpool_trips_event")
                            .from(CarpoolTrips::Table, CarpoolTrips::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_carpool_trips_event")
                    .table(CarpoolTrips::Table)
                    .col(CarpoolTrips::EventId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_carpool_trips_departure")
                    .table(CarpoolTrips::Table)
                    .col(CarpoolTrips::DepartureDatetime)
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
                    .table(CarpoolTrips::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum CarpoolTrips {
    Table,
    Id,
    DriverId,
    EventId,
    DepartureCity,
    DepartureAddress,
    ArrivalCity,
    ArrivalAddress,
    DepartureDatetime,
    ReturnDatetime,
    HasReturn,
    SeatsTotal,
    PricePerSeat,
    AdditionalInfo,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
