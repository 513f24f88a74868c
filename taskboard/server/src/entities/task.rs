use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "task")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status_id: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::task_status::Entity",
        from = "Column::StatusId",
        to = "super::task_status::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    TaskStatus,
}

impl Related<super::task_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaskStatus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
