use chrono::{DateTime, Utc};

use crate::model::auth::Principal;
use crate::model::ballot::VoteReceipt;
use crate::model::election::{CandidateId, ElectionId};

use super::registry::ElectionRegistry;
use super::store::BallotStore;
use super::VoteError;

/// Orchestrates ballot casting: validates eligibility and election state,
/// writes exactly one ballot, reports the outcome.
pub struct VotingService<R, S> {
    registry: R,
    store: S,
}

impl<R, S> VotingService<R, S>
where
    R: ElectionRegistry,
    S: BallotStore,
{
    pub fn new(registry: R, store: S) -> Self {
        Self { registry, store }
    }

    /// Cast the principal's vote in the given election.
    ///
    /// Preconditions are checked in order, each a distinct failure mode:
    /// role eligibility, election existence, voting window, candidate
    /// membership, and finally no prior ballot — the last enforced by the
    /// store's atomic check-and-insert, so no partial effect is ever
    /// observable: either exactly one ballot is created or none is.
    pub async fn cast_vote(
        &self,
        principal: &Principal,
        election_id: ElectionId,
        candidate_id: CandidateId,
        now: DateTime<Utc>,
    ) -> Result<VoteReceipt, VoteError> {
        if !principal.role.can_vote() {
            return Err(VoteError::Unauthorized(principal.role));
        }

        let election = self
            .registry
            .election(election_id)
            .await?
            .ok_or(VoteError::ElectionNotFound(election_id))?;

        if !election.is_open_at(now) {
            return Err(VoteError::ElectionNotOpen(election_id));
        }

        if election.candidate(candidate_id).is_none() {
            return Err(VoteError::InvalidCandidate {
                election: election_id,
                candidate: candidate_id,
            });
        }

        let ballot = self
            .store
            .cast_ballot(election_id, &principal.id, candidate_id, now)
            .await?;

        info!(
            "Recorded ballot in election {} at {}",
            election_id, ballot.cast_at
        );
        Ok(VoteReceipt::from(&ballot))
    }
}
