use crate::domain::{self, VoteType};
use election_errors::AppError;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(indexed)]
    pub branch: String,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    /// `single` or `multiple`
    pub vote_type: String,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::position::Entity")]
    Positions,
    #[sea_orm(has_many = "super::party::Entity")]
    Parties,
    #[sea_orm(has_many = "super::vote::Entity")]
    Votes,
}

impl Related<super::position::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Positions.def()
    }
}

impl Related<super::party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parties.def()
    }
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for domain::Poll {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let vote_type: VoteType = model.vote_type.parse().map_err(|_| {
            AppError::Database(format!(
                "poll {} has unknown vote_type {:?}",
                model.id, model.vote_type
            ))
        })?;

        Ok(domain::Poll {
            id: model.id,
            title: model.title,
            description: model.description,
            branch: model.branch,
            start_date: model.start_date,
            end_date: model.end_date,
            vote_type,
            created_at: model.created_at,
        })
    }
}
