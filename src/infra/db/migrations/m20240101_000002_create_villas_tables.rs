//! Migration: villas with amenity and house-rule child tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Villas::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Villas::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Villas::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Villas::Title).string().not_null())
                    .col(ColumnDef::new(Villas::Description).text().not_null())
                    .col(ColumnDef::new(Villas::Location).string().not_null())
                    .col(ColumnDef::new(Villas::Address).string().not_null())
                    .col(
                        ColumnDef::new(Villas::PricePerNightCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Villas::CleaningFeeCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Villas::MaxGuests).integer().not_null())
                    .col(ColumnDef::new(Villas::Bedrooms).integer().not_null())
                    .col(ColumnDef::new(Villas::Bathrooms).integer().not_null())
                    .col(
                        ColumnDef::new(Villas::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Villas::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Villas::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_villas_owner")
                            .from(Villas::Table, Villas::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_villas_owner")
                    .table(Villas::Table)
                    .col(Villas::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_villas_status_price")
                    .table(Villas::Table)
                    .col(Villas::Status)
                    .col(Villas::PricePerNightCents)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VillaAmenities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VillaAmenities::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VillaAmenities::VillaId).uuid().not_null())
                    .col(ColumnDef::new(VillaAmenities::Name).string().not_null())
                    .col(ColumnDef::new(VillaAmenities::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_villa_amenities_villa")
                            .from(VillaAmenities::Table, VillaAmenities::VillaId)
                            .to(Villas::Table, Villas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_villa_amenities_villa_name")
                    .table(VillaAmenities::Table)
                    .col(VillaAmenities::VillaId)
                    .col(VillaAmenities::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VillaRules::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VillaRules::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(VillaRules::VillaId).uuid().not_null())
                    .col(ColumnDef::new(VillaRules::Rule).text().not_null())
                    .col(ColumnDef::new(VillaRules::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_villa_rules_villa")
                            .from(VillaRules::Table, VillaRules::VillaId)
                            .to(Villas::Table, Villas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VillaRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VillaAmenities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Villas::Table).to_owned())
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
    OwnerId,
    Title,
    Description,
    Location,
    Address,
    PricePerNightCents,
    CleaningFeeCents,
    MaxGuests,
    Bedrooms,
    Bathrooms,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum VillaAmenities {
    Table,
    Id,
    VillaId,
    Name,
    Position,
}

#[derive(DeriveIden)]
enum VillaRules {
    Table,
    Id,
    VillaId,
    Rule,
    Position,
}
