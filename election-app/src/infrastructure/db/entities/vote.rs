use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One ballot. `(user_id, poll_id)` is unique in the schema.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "votes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Uuid,
    #[sea_orm(indexed)]
    pub poll_id: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::poll::Entity",
        from = "Column::PollId",
        to = "super::poll::Column::Id",
        on_delete = "Cascade"
    )]
    Poll,
    #[sea_orm(has_many = "super::candidate_vote::Entity")]
    Selections,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl Related<super::candidate_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Selections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
