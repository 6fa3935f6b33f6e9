use crate::domain;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "candidates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub position_id: i32,
    pub party_id: Option<i32>,
    pub name: String,
    pub photo: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::position::Entity",
        from = "Column::PositionId",
        to = "super::position::Column::Id",
        on_delete = "Cascade"
    )]
    Position,
    #[sea_orm(
        belongs_to = "super::party::Entity",
        from = "Column::PartyId",
        to = "super::party::Column::Id",
        on_delete = "SetNull"
    )]
    Party,
    #[sea_orm(has_many = "super::candidate_vote::Entity")]
    Selections,
}

impl Related<super::position::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Position.def()
    }
}

impl Related<super::party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Party.def()
    }
}

impl Related<super::candidate_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Selections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for domain::Candidate {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            position_id: model.position_id,
            party_id: model.party_id,
            name: model.name,
            photo: model.photo,
            description: model.description,
        }
    }
}
