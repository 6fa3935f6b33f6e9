use super::entities::{candidate, party, position, Candidate, Party, Position};
use super::db_error;
use crate::domain;
use election_errors::AppResult;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

/// Read access to what a poll is made of: parties, positions and candidates.
pub struct RosterRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> RosterRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn parties_for_polls(&self, poll_ids: &[i32]) -> AppResult<Vec<domain::Party>> {
        if poll_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = Party::find()
            .filter(party::Column::PollId.is_in(poll_ids.iter().copied()))
            .order_by_asc(party::Column::Id)
            .all(self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(domain::Party::from).collect())
    }

    pub async fn count_parties(&self, poll_id: i32) -> AppResult<u64> {
        Party::find()
            .filter(party::Column::PollId.eq(poll_id))
            .count(self.db)
            .await
            .map_err(db_error)
    }

    pub async fn positions_for_polls(&self, poll_ids: &[i32]) -> AppResult<Vec<domain::Position>> {
        if poll_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = Position::find()
            .filter(position::Column::PollId.is_in(poll_ids.iter().copied()))
            .order_by_asc(position::Column::Id)
            .all(self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(domain::Position::from).collect())
    }

    /// Candidates of the given positions in party order (unaffiliated last).
    pub async fn candidates_for_positions(
        &self,
        position_ids: &[i32],
    ) -> AppResult<Vec<domain::Candidate>> {
        if position_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = Candidate::find()
            .filter(candidate::Column::PositionId.is_in(position_ids.iter().copied()))
            .order_by_asc(candidate::Column::PartyId)
            .order_by_asc(candidate::Column::Id)
            .all(self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(domain::Candidate::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn party_model(id: i32, poll_id: i32) -> party::Model {
        party::Model {
            id,
            poll_id,
            name: format!("Party {id}"),
            description: None,
            banner: Some(format!("/banners/{id}.png")),
            created_at: None,
            updated_at: None,
        }
    }

    fn candidate_model(id: i32, position_id: i32, party_id: Option<i32>) -> candidate::Model {
        candidate::Model {
            id,
            position_id,
            party_id,
            name: format!("Candidate {id}"),
            photo: None,
            description: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_empty_ids_skip_the_database() {
        // No results queued: any query would fail.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = RosterRepository::new(&db);

        assert!(repo.parties_for_polls(&[]).await.unwrap().is_empty());
        assert!(repo.positions_for_polls(&[]).await.unwrap().is_empty());
        assert!(repo.candidates_for_positions(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_parties_for_polls_maps_models() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[party_model(1, 10), party_model(2, 11)]])
            .into_connection();

        let repo = RosterRepository::new(&db);
        let parties = repo.parties_for_polls(&[10, 11]).await.unwrap();

        assert_eq!(parties.len(), 2);
        assert_eq!(parties[1].poll_id, 11);
        assert_eq!(parties[0].banner.as_deref(), Some("/banners/1.png"));
    }

    #[tokio::test]
    async fn test_count_parties() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(3))
            }]])
            .into_connection();

        let repo = RosterRepository::new(&db);
        assert_eq!(repo.count_parties(10).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_candidates_for_positions() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[candidate_model(1, 5, Some(1)), candidate_model(2, 5, None)]])
            .into_connection();

        let repo = RosterRepository::new(&db);
        let candidates = repo.candidates_for_positions(&[5]).await.unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].party_id, None);
    }
}
