use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use rocket::futures::TryStreamExt;

use crate::model::ballot::Ballot;
use crate::model::election::{CandidateId, ElectionId, VoterId};
use crate::model::mongodb::{is_duplicate_key_error, Coll};

use super::VoteError;

/// The durable, append-only record of cast ballots, keyed by
/// `(election, voter)`.
///
/// Implementations must make `cast_ballot` atomic with respect to concurrent
/// calls for the same pair: of two simultaneous casts, exactly one may
/// succeed. Casts for different pairs must not contend with each other.
#[rocket::async_trait]
pub trait BallotStore: Send + Sync {
    /// True iff a ballot exists for the given pair.
    async fn has_voted(
        &self,
        election_id: ElectionId,
        voter_id: &VoterId,
    ) -> Result<bool, VoteError>;

    /// Atomically check that no ballot exists for the pair and insert a new
    /// one. Fails with [`VoteError::DuplicateVote`] if one already exists;
    /// the store never silently overwrites.
    async fn cast_ballot(
        &self,
        election_id: ElectionId,
        voter_id: &VoterId,
        candidate_id: CandidateId,
        now: DateTime<Utc>,
    ) -> Result<Ballot, VoteError>;

    /// All ballots for an election, in no particular order.
    async fn list_ballots(&self, election_id: ElectionId) -> Result<Vec<Ballot>, VoteError>;
}

/// The production store: a MongoDB ballots collection.
///
/// Atomicity comes from the unique `(election_id, voter_id)` index, not from
/// application-level locking; a duplicate insert surfaces as write error
/// 11000 regardless of how the requests interleave.
pub struct MongoBallotStore {
    ballots: Coll<Ballot>,
}

impl MongoBallotStore {
    pub fn new(ballots: Coll<Ballot>) -> Self {
        Self { ballots }
    }
}

fn pair_filter(election_id: ElectionId, voter_id: &VoterId) -> Document {
    doc! {
        "election_id": election_id as i64,
        "voter_id": voter_id.as_str(),
    }
}

#[rocket::async_trait]
impl BallotStore for MongoBallotStore {
    async fn has_voted(
        &self,
        election_id: ElectionId,
        voter_id: &VoterId,
    ) -> Result<bool, VoteError> {
        let existing = self
            .ballots
            .find_one(pair_filter(election_id, voter_id), None)
            .await?;
        Ok(existing.is_some())
    }

    async fn cast_ballot(
        &self,
        election_id: ElectionId,
        voter_id: &VoterId,
        candidate_id: CandidateId,
        now: DateTime<Utc>,
    ) -> Result<Ballot, VoteError> {
        let ballot = Ballot::new(election_id, voter_id.clone(), candidate_id, now);
        match self.ballots.insert_one(&ballot, None).await {
            Ok(_) => Ok(ballot),
            Err(err) if is_duplicate_key_error(&err) => {
                Err(VoteError::DuplicateVote(election_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn list_ballots(&self, election_id: ElectionId) -> Result<Vec<Ballot>, VoteError> {
        let ballots = self
            .ballots
            .find(doc! { "election_id": election_id as i64 }, None)
            .await?
            .try_collect()
            .await?;
        Ok(ballots)
    }
}

/// Reference implementation of the store contract, backed by a mutex-guarded
/// map. The unit tests run against this; the lock is never held across an
/// await, and the map entry API gives the same atomic check-and-insert as
/// the unique index does in production.
#[derive(Debug, Default)]
pub struct MemoryBallotStore {
    ballots: Mutex<HashMap<(ElectionId, VoterId), Ballot>>,
}

#[rocket::async_trait]
impl BallotStore for MemoryBallotStore {
    async fn has_voted(
        &self,
        election_id: ElectionId,
        voter_id: &VoterId,
    ) -> Result<bool, VoteError> {
        let ballots = self.ballots.lock().expect("ballot store mutex poisoned");
        Ok(ballots.contains_key(&(election_id, voter_id.clone())))
    }

    async fn cast_ballot(
        &self,
        election_id: ElectionId,
        voter_id: &VoterId,
        candidate_id: CandidateId,
        now: DateTime<Utc>,
    ) -> Result<Ballot, VoteError> {
        let mut ballots = self.ballots.lock().expect("ballot store mutex poisoned");
        match ballots.entry((election_id, voter_id.clone())) {
            Entry::Occupied(_) => Err(VoteError::DuplicateVote(election_id)),
            Entry::Vacant(entry) => {
                let ballot = Ballot::new(election_id, voter_id.clone(), candidate_id, now);
                entry.insert(ballot.clone());
                Ok(ballot)
            }
        }
    }

    async fn list_ballots(&self, election_id: ElectionId) -> Result<Vec<Ballot>, VoteError> {
        let ballots = self.ballots.lock().expect("ballot store mutex poisoned");
        Ok(ballots
            .values()
            .filter(|ballot| ballot.election_id == election_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rocket::async_test]
    async fn cast_then_query() {
        let store = MemoryBallotStore::default();
        let voter = "alice".to_string();

        assert!(!store.has_voted(1, &voter).await.unwrap());
        let ballot = store.cast_ballot(1, &voter, 2, Utc::now()).await.unwrap();
        assert_eq!(ballot.candidate_id, 2);
        assert!(store.has_voted(1, &voter).await.unwrap());
    }

    #[rocket::async_test]
    async fn duplicate_cast_is_rejected() {
        let store = MemoryBallotStore::default();
        let voter = "alice".to_string();

        store.cast_ballot(1, &voter, 2, Utc::now()).await.unwrap();
        let err = store
            .cast_ballot(1, &voter, 3, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, VoteError::DuplicateVote(1)));

        // The original ballot is untouched.
        let ballots = store.list_ballots(1).await.unwrap();
        assert_eq!(ballots.len(), 1);
        assert_eq!(ballots[0].candidate_id, 2);
    }

    #[rocket::async_test]
    async fn pairs_are_independent() {
        let store = MemoryBallotStore::default();
        let alice = "alice".to_string();
        let bob = "bob".to_string();

        // Different voters in the same election, and the same voter in a
        // different election, all proceed independently.
        store.cast_ballot(1, &alice, 1, Utc::now()).await.unwrap();
        store.cast_ballot(1, &bob, 2, Utc::now()).await.unwrap();
        store.cast_ballot(2, &alice, 1, Utc::now()).await.unwrap();

        assert_eq!(store.list_ballots(1).await.unwrap().len(), 2);
        assert_eq!(store.list_ballots(2).await.unwrap().len(), 1);
    }
}
