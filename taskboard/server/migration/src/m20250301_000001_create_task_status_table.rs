use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const STATUSES: [(i32, &str); 3] = [(1, "to-do"), (2, "on-hold"), (3, "completed")];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TaskStatus::Table)
                    .if_not_exists()
                    .col(integer(TaskStatus::Id).primary_key())
                    .col(string_len_uniq(TaskStatus::StatusName, 50))
                    .to_owned(),
            )
            .await?;

        let mut insert = Query::insert();
        insert
            .into_table(TaskStatus::Table)
            .columns([TaskStatus::Id, TaskStatus::StatusName]);
        for (id, name) in STATUSES {
            insert.values_panic([id.into(), name.into()]);
        }
        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaskStatus::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TaskStatus {
    Table,
    Id,
    StatusName,
}
