//! Create complaint history table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ComplaintHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplaintHistory::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComplaintHistory::ComplaintId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComplaintHistory::OldStatus).string_len(16))
                    .col(
                        ColumnDef::new(ComplaintHistory::NewStatus)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComplaintHistory::Note).text())
                    .col(ColumnDef::new(ComplaintHistory::ChangedBy).string_len(32))
                    .col(
                        ColumnDef::new(ComplaintHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_history_complaint")
                            .from(ComplaintHistory::Table, ComplaintHistory::ComplaintId)
                            .to(Complaint::Table, Complaint::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: complaint_id (audit trail lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_history_complaint_id")
                    .table(ComplaintHistory::Table)
                    .col(ComplaintHistory::ComplaintId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ComplaintHistory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ComplaintHistory {
    Table,
    Id,
    ComplaintId,
    OldStatus,
    NewStatus,
    Note,
    ChangedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Complaint {
    Table,
    Id,
}
