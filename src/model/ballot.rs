use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use super::election::{CandidateId, ElectionId, VoterId};

/// One voter's choice in one election, as stored in the database.
///
/// Ballots are append-only: created exactly once by the voting service,
/// never mutated, never deleted. At most one exists per
/// `(election_id, voter_id)` pair; the unique index created in
/// [`crate::model::mongodb::ensure_indexes_exist`] enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    /// The election voted in.
    pub election_id: ElectionId,
    /// The voter who cast this ballot.
    pub voter_id: VoterId,
    /// The candidate voted for; always one of the election's own candidates.
    pub candidate_id: CandidateId,
    /// When the ballot was cast.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub cast_at: DateTime<Utc>,
}

impl Ballot {
    pub fn new(
        election_id: ElectionId,
        voter_id: VoterId,
        candidate_id: CandidateId,
        cast_at: DateTime<Utc>,
    ) -> Self {
        Self {
            election_id,
            voter_id,
            candidate_id,
            cast_at,
        }
    }
}

/// Proof of a successful cast, returned to the voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    /// The election voted in.
    pub election_id: ElectionId,
    /// When the ballot was cast.
    pub cast_at: DateTime<Utc>,
}

impl From<&Ballot> for VoteReceipt {
    fn from(ballot: &Ballot) -> Self {
        Self {
            election_id: ballot.election_id,
            cast_at: ballot.cast_at,
        }
    }
}
