use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Raffles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Raffles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Raffles::Title).string().not_null())
                    .col(ColumnDef::new(Raffles::Description).text())
                    .col(ColumnDef::new(Raffles::Image).string())
                    .col(ColumnDef::new(Raffles::Tags).text())
                    .col(
                        ColumnDef::new(Raffles::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Raffles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tickets::RaffleId).integer().not_null())
                    .col(ColumnDef::new(Tickets::TicketNumber).string().not_null())
                    .col(
                        ColumnDef::new(Tickets::PaymentStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_raffle")
                            .from(Tickets::Table, Tickets::RaffleId)
                            .to(Raffles::Table, Raffles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The concurrency-critical constraint: one claimant per
        // (raffle, ticket number). Concurrent inserts race on this index
        // and the loser is reported as "already reserved".
        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_raffle_number")
                    .table(Tickets::Table)
                    .col(Tickets::RaffleId)
                    .col(Tickets::TicketNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::TicketId).integer().not_null())
                    .col(
                        ColumnDef::new(Reservations::CustomerName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::CustomerPhone)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::CustomerEmail).string())
                    .col(
                        ColumnDef::new(Reservations::Status)
                            .string()
                            .not_null()
                            .default("reserved"),
                    )
                    .col(
                        ColumnDef::new(Reservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_ticket")
                            .from(Reservations::Table, Reservations::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A ticket carries at most one reservation.
        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_ticket")
                    .table(Reservations::Table)
                    .col(Reservations::TicketId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlockedNumbers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlockedNumbers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BlockedNumbers::PhoneNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BlockedNumbers::BlockUntil)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BlockedNumbers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blocked_phone_until")
                    .table(BlockedNumbers::Table)
                    .col(BlockedNumbers::PhoneNumber)
                    .col(BlockedNumbers::BlockUntil)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Settings::SettingKey)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Settings::SettingValue).text().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BlockedNumbers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Raffles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Raffles {
    Table,
    Id,
    Title,
    Description,
    Image,
    Tags,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    RaffleId,
    TicketNumber,
    PaymentStatus,
}

#[derive(DeriveIden)]
enum Reservations {
    Table,
    Id,
    TicketId,
    CustomerName,
    CustomerPhone,
    CustomerEmail,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BlockedNumbers {
    Table,
    Id,
    PhoneNumber,
    BlockUntil,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Settings {
    Table,
    Id,
    SettingKey,
    SettingValue,
}
