//! Migration: Create carpool_payments table

use sea_orm_migration::prelude::*;

use super::m20250301_000006_create_carpool_requests::CarpoolRequests;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CarpoolPayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CarpoolPayments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CarpoolPayments::RequestId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CarpoolPayments::Amount).double().not_null())
                    .col(
                        ColumnDef::new(CarpoolPayments::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CarpoolPayments::Method)
                            .string()
                            .not_null()
                            .default("CASH"),
                    )
                    .col(
                        ColumnDef::new(CarpoolPayments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CarpoolPayments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_carpool_payments_request")
                            .from(CarpoolPayments::Table, CarpoolPayments::RequestId)
                            .to(CarpoolRequests::Table, CarpoolRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_carpool_payments_request")
                    .table(CarpoolPayments::Table)
                    .col(CarpoolPayments::RequestId)
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
                    .table(CarpoolPayments::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum CarpoolPayments {
    Table,
    Id,
    RequestId,
    Amount,
    IsCompleted,
    Method,
    CreatedAt,
    UpdatedAt,
}
