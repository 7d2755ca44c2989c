//! Create complaint table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Complaint::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Complaint::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Complaint::Title).string_len(128).not_null())
                    .col(ColumnDef::new(Complaint::Category).string_len(64).not_null())
                    .col(ColumnDef::new(Complaint::Description).text().not_null())
                    .col(ColumnDef::new(Complaint::Priority).string_len(16).not_null())
                    .col(ColumnDef::new(Complaint::Location).string_len(128).not_null())
                    .col(ColumnDef::new(Complaint::ImageFile).string_len(128))
                    .col(ColumnDef::new(Complaint::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Complaint::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Complaint::AssignedTo).string_len(32))
                    .col(
                        ColumnDef::new(Complaint::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Complaint::DatePosted)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Complaint::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_user")
                            .from(Complaint::Table, Complaint::UserId)
                            .to(User::Table, User::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_assignee")
                            .from(Complaint::Table, Complaint::AssignedTo)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: author (student dashboard)
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_user_id")
                    .table(Complaint::Table)
                    .col(Complaint::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: assignee (staff dashboard)
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_assigned_to")
                    .table(Complaint::Table)
                    .col(Complaint::AssignedTo)
                    .to_owned(),
            )
            .await?;

        // Index: (status, date_posted) for the escalation sweep
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_status_date_posted")
                    .table(Complaint::Table)
                    .col(Complaint::Status)
                    .col(Complaint::DatePosted)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Complaint::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Complaint {
    Table,
    Id,
    Title,
    Category,
    Description,
    Priority,
    Location,
    ImageFile,
    Status,
    UserId,
    AssignedTo,
    IsDeleted,
    DatePosted,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
