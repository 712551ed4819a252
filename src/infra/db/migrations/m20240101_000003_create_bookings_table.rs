//! Migration: bookings with their price breakdown.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bookings::VillaId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::GuestId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::CheckIn).date().not_null())
                    .col(ColumnDef::new(Bookings::CheckOut).date().not_null())
                    .col(ColumnDef::new(Bookings::Guests).integer().not_null())
                    .col(ColumnDef::new(Bookings::Notes).text().null())
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Bookings::NightlyRateCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::Nights).big_integer().not_null())
                    .col(ColumnDef::new(Bookings::SubtotalCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(Bookings::CleaningFeeCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::ServiceFeeCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::TotalCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_villa")
                            .from(Bookings::Table, Bookings::VillaId)
                            .to(Villas::Table, Villas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_guest")
                            .from(Bookings::Table, Bookings::GuestId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Overlap lookups filter on villa + date range
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_villa_dates")
                    .table(Bookings::Table)
                    .col(Bookings::VillaId)
                    .col(Bookings::CheckIn)
                    .col(Bookings::CheckOut)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_guest")
                    .table(Bookings::Table)
                    .col(Bookings::GuestId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Villas {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    VillaId,
    GuestId,
    CheckIn,
    CheckOut,
    Guests,
    Notes,
    Status,
    NightlyRateCents,
    Nights,
    SubtotalCents,
    CleaningFeeCents,
    ServiceFeeCents,
    TotalCents,
    CreatedAt,
    UpdatedAt,
}
