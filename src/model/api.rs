//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way: camelCase
//! field names and RFC 3339 datetimes, rather than the BSON-oriented formats
//! of the stored types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::election::{Candidate, CandidateId, Election, ElectionId, ElectionViewState};

/// A summary of an election as seen by one voter, without the candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionSummary {
    /// Election unique ID.
    pub id: ElectionId,
    /// Election title.
    pub title: String,
    /// Election description.
    pub description: String,
    /// Election start time.
    pub start_time: DateTime<Utc>,
    /// Election end time.
    pub end_time: DateTime<Utc>,
    /// The election's state as seen by the requesting voter.
    pub state: ElectionViewState,
}

impl ElectionSummary {
    pub fn new(election: Election, state: ElectionViewState) -> Self {
        Self {
            id: election.id,
            title: election.title,
            description: election.description,
            start_time: election.start_time,
            end_time: election.end_time,
            state,
        }
    }
}

/// A full election description, including the candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionDescription {
    /// Election unique ID.
    pub id: ElectionId,
    /// Election title.
    pub title: String,
    /// Election description.
    pub description: String,
    /// Election start time.
    pub start_time: DateTime<Utc>,
    /// Election end time.
    pub end_time: DateTime<Utc>,
    /// Candidates in ballot-paper order.
    pub candidates: Vec<CandidateDescription>,
    /// The election's state as seen by the requesting voter.
    pub state: ElectionViewState,
}

impl ElectionDescription {
    pub fn new(election: Election, state: ElectionViewState) -> Self {
        Self {
            id: election.id,
            title: election.title,
            description: election.description,
            start_time: election.start_time,
            end_time: election.end_time,
            candidates: election
                .candidates
                .into_iter()
                .map(CandidateDescription::from)
                .collect(),
            state,
        }
    }
}

/// API-friendly representation of a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDescription {
    /// Candidate ID, unique within the election.
    pub id: CandidateId,
    /// Candidate name.
    pub name: String,
    /// Manifesto text, if submitted.
    pub manifesto: Option<String>,
    /// Reference to an uploaded photo, if any.
    pub photo_ref: Option<String>,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name,
            manifesto: candidate.manifesto,
            photo_ref: candidate.photo_ref,
        }
    }
}

/// The body of a vote request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    /// The candidate to vote for.
    pub candidate_id: CandidateId,
}
