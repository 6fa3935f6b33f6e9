use crate::domain;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub poll_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Image reference
    pub banner: Option<String>,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
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
    #[sea_orm(has_many = "super::candidate::Entity")]
    Candidates,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl Related<super::candidate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Candidates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for domain::Party {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            poll_id: model.poll_id,
            name: model.name,
            description: model.description,
            banner: model.banner,
        }
    }
}
