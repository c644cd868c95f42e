//! Initial schema.
//!
//! - `users`: accounts; the integer id is the owner of every ledger row
//! - `categories`: per-owner labels for assets and liabilities
//! - `flows`: dated inflows and outflows
//! - `recurring_flows`: monthly templates matched against flow descriptions
//! - `positions`: assets and liabilities valid over `[date_in, date_out]`

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    IsActive,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Label,
    OwnerId,
}

#[derive(Iden)]
enum Flows {
    Table,
    Id,
    Kind,
    Date,
    Description,
    Amount,
    OwnerId,
}

#[derive(Iden)]
enum RecurringFlows {
    Table,
    Id,
    Kind,
    Description,
    Amount,
    OwnerId,
}

#[derive(Iden)]
enum Positions {
    Table,
    Id,
    Kind,
    DateIn,
    DateOut,
    Description,
    Amount,
    CategoryId,
    OwnerId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Label).string().not_null())
                    .col(ColumnDef::new(Categories::OwnerId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-owner_id")
                            .from(Categories::Table, Categories::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-owner_id-label")
                    .table(Categories::Table)
                    .col(Categories::OwnerId)
                    .col(Categories::Label)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Flows
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Flows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Flows::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Flows::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Flows::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Flows::Description).string().not_null())
                    .col(ColumnDef::new(Flows::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Flows::OwnerId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-flows-owner_id")
                            .from(Flows::Table, Flows::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-flows-owner_id-kind-date")
                    .table(Flows::Table)
                    .col(Flows::OwnerId)
                    .col(Flows::Kind)
                    .col(Flows::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Recurring flows
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(RecurringFlows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecurringFlows::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RecurringFlows::Kind).string().not_null())
                    .col(
                        ColumnDef::new(RecurringFlows::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurringFlows::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecurringFlows::OwnerId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recurring_flows-owner_id")
                            .from(RecurringFlows::Table, RecurringFlows::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Positions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Positions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Positions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Positions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Positions::DateIn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Positions::DateOut)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Positions::Description).string().not_null())
                    .col(ColumnDef::new(Positions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Positions::CategoryId).integer())
                    .col(ColumnDef::new(Positions::OwnerId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-positions-owner_id")
                            .from(Positions::Table, Positions::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-positions-category_id")
                            .from(Positions::Table, Positions::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-positions-owner_id-kind-date_in-date_out")
                    .table(Positions::Table)
                    .col(Positions::OwnerId)
                    .col(Positions::Kind)
                    .col(Positions::DateIn)
                    .col(Positions::DateOut)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Positions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecurringFlows::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Flows::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
