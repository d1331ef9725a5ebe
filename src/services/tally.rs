use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::ballot::Ballot;
use crate::model::election::{Candidate, CandidateId, ElectionId};

use super::registry::ElectionRegistry;
use super::store::BallotStore;
use super::VoteError;

/// Aggregate results for one election.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    /// Total number of ballots cast.
    pub total_votes: u64,
    /// Per-candidate results, sorted by vote count descending; candidates on
    /// equal counts keep their ballot-paper order.
    pub candidates: Vec<CandidateTally>,
    /// The candidates tied for the maximum vote count. Empty when no votes
    /// have been cast at all: a zero-vote tie is not a win.
    pub winners: Vec<CandidateId>,
}

/// One candidate's share of a tally. Candidates with no ballots are still
/// included, with a count of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTally {
    /// Candidate ID.
    pub id: CandidateId,
    /// Candidate name.
    pub name: String,
    /// Number of ballots cast for this candidate.
    pub vote_count: u64,
    /// Share of the total, in percent; 0 when no votes have been cast.
    pub percentage: f64,
}

/// Computes aggregate results on demand from the ballot store and the
/// registry's candidate list. Read-only and idempotent; never blocks a
/// concurrent cast, and simply may or may not see a vote cast while it runs.
pub struct TallyEngine<R, S> {
    registry: R,
    store: S,
}

impl<R, S> TallyEngine<R, S>
where
    R: ElectionRegistry,
    S: BallotStore,
{
    pub fn new(registry: R, store: S) -> Self {
        Self { registry, store }
    }

    /// Compute the results of the given election.
    pub async fn compute_results(&self, election_id: ElectionId) -> Result<Tally, VoteError> {
        let candidates = self.registry.candidates(election_id).await?;
        let ballots = self.store.list_ballots(election_id).await?;
        Ok(tally_ballots(&candidates, &ballots))
    }
}

/// Count ballots per candidate and derive percentages and winners.
///
/// Every candidate appears in the result, so its size always equals the
/// candidate count. Percentages are 0 for everyone when no votes have been
/// cast, by policy, to avoid dividing by zero.
pub fn tally_ballots(candidates: &[Candidate], ballots: &[Ballot]) -> Tally {
    let index: HashMap<CandidateId, usize> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();

    let mut counts = vec![0u64; candidates.len()];
    for ballot in ballots {
        if let Some(&i) = index.get(&ballot.candidate_id) {
            counts[i] += 1;
        }
    }
    let total_votes: u64 = counts.iter().sum();

    let mut results: Vec<CandidateTally> = candidates
        .iter()
        .zip(&counts)
        .map(|(candidate, &vote_count)| CandidateTally {
            id: candidate.id,
            name: candidate.name.clone(),
            vote_count,
            percentage: if total_votes == 0 {
                0.0
            } else {
                vote_count as f64 * 100.0 / total_votes as f64
            },
        })
        .collect();

    // A stable sort keeps ballot-paper order between equal counts, so the
    // output is deterministic across repeated calls.
    results.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));

    let max = results.first().map(|c| c.vote_count).unwrap_or(0);
    let winners = if max == 0 {
        Vec::new()
    } else {
        results
            .iter()
            .take_while(|c| c.vote_count == max)
            .map(|c| c.id)
            .collect()
    };

    Tally {
        total_votes,
        candidates: results,
        winners,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::model::election::Election;
    use crate::services::{MemoryBallotStore, MemoryElectionRegistry};

    use super::*;

    fn ballots_for(counts: &[(CandidateId, usize)]) -> Vec<Ballot> {
        let mut ballots = Vec::new();
        for &(candidate_id, count) in counts {
            for n in 0..count {
                ballots.push(Ballot::new(
                    1,
                    format!("voter-{candidate_id}-{n}"),
                    candidate_id,
                    Utc::now(),
                ));
            }
        }
        ballots
    }

    #[test]
    fn zero_votes_means_no_winners_and_zero_percentages() {
        let election = Election::open_example();
        let tally = tally_ballots(&election.candidates, &[]);

        assert_eq!(tally.total_votes, 0);
        assert!(tally.winners.is_empty());
        assert_eq!(tally.candidates.len(), election.candidates.len());
        for candidate in &tally.candidates {
            assert_eq!(candidate.vote_count, 0);
            assert_eq!(candidate.percentage, 0.0);
        }
    }

    #[test]
    fn counts_are_conserved() {
        let election = Election::open_example();
        let ballots = ballots_for(&[(1, 4), (2, 2), (3, 1)]);
        let tally = tally_ballots(&election.candidates, &ballots);

        let sum: u64 = tally.candidates.iter().map(|c| c.vote_count).sum();
        assert_eq!(sum, tally.total_votes);
        assert_eq!(tally.total_votes, ballots.len() as u64);
    }

    #[test]
    fn clear_winner() {
        let election = Election::open_example();
        let ballots = ballots_for(&[(1, 1), (2, 3)]);
        let tally = tally_ballots(&election.candidates, &ballots);

        assert_eq!(tally.winners, vec![2]);
        assert_eq!(tally.candidates[0].id, 2);
        assert_eq!(tally.candidates[0].vote_count, 3);
        assert_eq!(tally.candidates[0].percentage, 75.0);
        assert_eq!(tally.candidates[1].percentage, 25.0);
    }

    #[test]
    fn tied_winners_keep_ballot_paper_order() {
        let election = Election::open_example();
        let ballots = ballots_for(&[(1, 3), (2, 3), (3, 1)]);
        let tally = tally_ballots(&election.candidates, &ballots);

        assert_eq!(tally.winners, vec![1, 2]);
        // The tie resolves to ballot-paper order, candidate 3 last.
        let order: Vec<_> = tally.candidates.iter().map(|c| c.id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn unvoted_candidates_are_included() {
        let election = Election::open_example();
        let ballots = ballots_for(&[(2, 2)]);
        let tally = tally_ballots(&election.candidates, &ballots);

        assert_eq!(tally.candidates.len(), 3);
        let carol = tally.candidates.iter().find(|c| c.id == 3).unwrap();
        assert_eq!(carol.vote_count, 0);
        assert_eq!(carol.percentage, 0.0);
    }

    #[rocket::async_test]
    async fn engine_pulls_from_store_and_registry() {
        let election = Election::open_example();
        let registry = MemoryElectionRegistry::new([election]);
        let store = MemoryBallotStore::default();
        let now = Utc::now();
        store
            .cast_ballot(1, &"alice".to_string(), 2, now)
            .await
            .unwrap();
        store
            .cast_ballot(1, &"bob".to_string(), 2, now)
            .await
            .unwrap();

        let engine = TallyEngine::new(registry, store);
        let tally = engine.compute_results(1).await.unwrap();
        assert_eq!(tally.total_votes, 2);
        assert_eq!(tally.winners, vec![2]);

        // Idempotent: a second read gives the same answer.
        assert_eq!(engine.compute_results(1).await.unwrap(), tally);

        let err = engine.compute_results(9).await.unwrap_err();
        assert!(matches!(err, VoteError::ElectionNotFound(9)));
    }
}
