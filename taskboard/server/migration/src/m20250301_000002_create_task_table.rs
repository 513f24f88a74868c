use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

use crate::m20250301_000001_create_task_status_table::TaskStatus;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Task {
    Table,
    Id,
    Title,
    Description,
    StatusId,
    CreatedAt,
    UpdatedAt,
}

const FK_TASK_STATUS: &str = "fk-task-status_id";
const IDX_TASK_CREATED_AT: &str = "idx-task-created_at";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Task::Table)
                    .if_not_exists()
                    .col(pk_auto(Task::Id))
                    .col(string_len(Task::Title, 255))
                    .col(text_null(Task::Description))
                    .col(integer(Task::StatusId).default(1))
                    .col(
                        timestamp_with_time_zone(Task::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Task::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_TASK_STATUS)
                            .from(Task::Table, Task::StatusId)
                            .to(TaskStatus::Table, TaskStatus::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_TASK_CREATED_AT)
                    .table(Task::Table)
                    .col(Task::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Task::Table).to_owned())
            .await
    }
}
