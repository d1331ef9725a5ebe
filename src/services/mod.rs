//! The election core: ballot store, election registry, voting service and
//! tally engine. The API layer constructs these from database collections;
//! the unit tests run them against the in-memory implementations.

mod registry;
mod store;
mod tally;
mod voting;

pub use registry::{ElectionRegistry, MemoryElectionRegistry, MongoElectionRegistry};
pub use store::{BallotStore, MemoryBallotStore, MongoBallotStore};
pub use tally::{tally_ballots, CandidateTally, Tally, TallyEngine};
pub use voting::VotingService;

use thiserror::Error;

use crate::model::auth::Role;
use crate::model::election::{CandidateId, ElectionId};

/// Everything that can go wrong when casting a vote or computing results.
///
/// All variants except `StoreUnavailable` are expected domain outcomes and
/// are surfaced verbatim to the caller; retrying them cannot succeed.
/// `StoreUnavailable` is infrastructure failure and is the only variant a
/// caller may reasonably retry.
#[derive(Debug, Error)]
pub enum VoteError {
    /// The caller is authenticated but their role is not eligible to vote.
    #[error("role '{0:?}' is not eligible to vote")]
    Unauthorized(Role),
    #[error("no election found with ID {0}")]
    ElectionNotFound(ElectionId),
    #[error("election {0} is not open for voting")]
    ElectionNotOpen(ElectionId),
    #[error("candidate {candidate} does not stand in election {election}")]
    InvalidCandidate {
        election: ElectionId,
        candidate: CandidateId,
    },
    #[error("a ballot has already been cast in election {0} by this voter")]
    DuplicateVote(ElectionId),
    #[error("ballot store unavailable: {0}")]
    StoreUnavailable(#[from] mongodb::error::Error),
}
