//! Initial schema: customers, managers, cards, services, ATMs, the pooled
//! transfer total and the operations log.
//!
//! Built with the schema builder so the same migration runs on Postgres and
//! SQLite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Login).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::PassportSeries)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PhoneNumber).string().not_null())
                    .col(
                        ColumnDef::new(Users::Visibility)
                            .string_len(16)
                            .not_null()
                            .default("visible"),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Phone numbers are not unique; resolution picks the lowest id.
        manager
            .create_index(
                Index::create()
                    .name("idx_users_phone_number")
                    .table(Users::Table)
                    .col(Users::PhoneNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Managers::Table)
                    .col(
                        ColumnDef::new(Managers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Managers::Name).string().not_null())
                    .col(ColumnDef::new(Managers::Login).string().not_null().unique_key())
                    .col(ColumnDef::new(Managers::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Managers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Cards::Table)
                    .col(
                        ColumnDef::new(Cards::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Cards::AccountNumber)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Cards::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(Cards::Balance)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Cards::Balance).gte(0)),
                    )
                    .col(ColumnDef::new(Cards::OwnerId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Cards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cards_owner")
                            .from(Cards::Table, Cards::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cards_owner")
                    .table(Cards::Table)
                    .col(Cards::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .col(
                        ColumnDef::new(Services::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Services::Name).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Services::Balance)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Services::Balance).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Services::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Atms::Table)
                    .col(
                        ColumnDef::new(Atms::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Atms::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Atms::Address).string().not_null())
                    .col(
                        ColumnDef::new(Atms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PooledTransferTotal::Table)
                    .col(
                        ColumnDef::new(PooledTransferTotal::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PooledTransferTotal::Total)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(PooledTransferTotal::Total).gte(0)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared("INSERT INTO pooled_transfer_total (id, total) VALUES (1, 0)")
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OperationsLog::Table)
                    .col(
                        ColumnDef::new(OperationsLog::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OperationsLog::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(OperationsLog::OwnerId).big_integer().not_null())
                    .col(ColumnDef::new(OperationsLog::Counterparty).string().not_null())
                    .col(ColumnDef::new(OperationsLog::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(OperationsLog::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_operations_log_owner")
                            .from(OperationsLog::Table, OperationsLog::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_operations_log_owner")
                    .table(OperationsLog::Table)
                    .col(OperationsLog::OwnerId)
                    .col(OperationsLog::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OperationsLog::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PooledTransferTotal::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Atms::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Services::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cards::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Managers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Login,
    PasswordHash,
    PassportSeries,
    PhoneNumber,
    Visibility,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Managers {
    Table,
    Id,
    Name,
    Login,
    PasswordHash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Cards {
    Table,
    Id,
    AccountNumber,
    DisplayName,
    Balance,
    OwnerId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Services {
    Table,
    Id,
    Name,
    Balance,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Atms {
    Table,
    Id,
    Name,
    Address,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PooledTransferTotal {
    Table,
    Id,
    Total,
}

#[derive(DeriveIden)]
enum OperationsLog {
    Table,
    Id,
    Kind,
    OwnerId,
    Counterparty,
    Amount,
    RecordedAt,
}
