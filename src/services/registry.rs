use std::collections::HashMap;

use crate::model::election::{Candidate, Election, ElectionId};
use crate::model::mongodb::{election_id_filter, Coll};

use super::VoteError;

/// Read-mostly catalog of election definitions. Administrative mutation is
/// out of scope and assumed to happen only before an election opens.
#[rocket::async_trait]
pub trait ElectionRegistry: Send + Sync {
    /// Look up an election definition by ID.
    async fn election(&self, election_id: ElectionId) -> Result<Option<Election>, VoteError>;

    /// The candidates standing in the given election, in ballot-paper order.
    async fn candidates(&self, election_id: ElectionId) -> Result<Vec<Candidate>, VoteError> {
        let election = self
            .election(election_id)
            .await?
            .ok_or(VoteError::ElectionNotFound(election_id))?;
        Ok(election.candidates)
    }
}

/// The production registry: a MongoDB elections collection.
pub struct MongoElectionRegistry {
    elections: Coll<Election>,
}

impl MongoElectionRegistry {
    pub fn new(elections: Coll<Election>) -> Self {
        Self { elections }
    }
}

#[rocket::async_trait]
impl ElectionRegistry for MongoElectionRegistry {
    async fn election(&self, election_id: ElectionId) -> Result<Option<Election>, VoteError> {
        let election = self
            .elections
            .find_one(election_id_filter(election_id), None)
            .await?;
        Ok(election)
    }
}

/// A fixed in-memory catalog, used by the unit tests.
#[derive(Debug, Default)]
pub struct MemoryElectionRegistry {
    elections: HashMap<ElectionId, Election>,
}

impl MemoryElectionRegistry {
    pub fn new(elections: impl IntoIterator<Item = Election>) -> Self {
        Self {
            elections: elections.into_iter().map(|e| (e.id, e)).collect(),
        }
    }
}

#[rocket::async_trait]
impl ElectionRegistry for MemoryElectionRegistry {
    async fn election(&self, election_id: ElectionId) -> Result<Option<Election>, VoteError> {
        Ok(self.elections.get(&election_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rocket::async_test]
    async fn candidates_in_ballot_paper_order() {
        let election = Election::open_example();
        let expected = election.candidates.clone();
        let registry = MemoryElectionRegistry::new([election]);

        let candidates = registry.candidates(1).await.unwrap();
        assert_eq!(candidates, expected);
    }

    #[rocket::async_test]
    async fn unknown_election_is_reported() {
        let registry = MemoryElectionRegistry::default();
        assert!(registry.election(99).await.unwrap().is_none());
        let err = registry.candidates(99).await.unwrap_err();
        assert!(matches!(err, VoteError::ElectionNotFound(99)));
    }
}
