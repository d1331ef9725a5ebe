use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

/// Our election IDs are integers.
pub type ElectionId = u32;
/// Our candidate IDs are integers, unique within their election.
pub type CandidateId = u32;
/// Our voter IDs are the portal usernames.
pub type VoterId = String;

/// Core election data, as stored in the database. Candidates are embedded:
/// they have no identity outside their election.
///
/// Elections are created by an administrative actor before `start_time` and
/// are immutable once any ballot exists against them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    /// Unique ID.
    #[serde(rename = "_id")]
    pub id: ElectionId,
    /// Election title.
    pub title: String,
    /// Display text, opaque to the logic.
    pub description: String,
    /// Start of the voting window (inclusive).
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start_time: DateTime<Utc>,
    /// End of the voting window (exclusive).
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub end_time: DateTime<Utc>,
    /// Candidates standing in this election, in ballot-paper order.
    pub candidates: Vec<Candidate>,
}

impl Election {
    /// Look up a candidate standing in this election.
    pub fn candidate(&self, candidate_id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == candidate_id)
    }

    /// Is the voting window open at the given instant?
    /// The window is half-open: `start_time` counts, `end_time` does not.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now < self.end_time
    }

    /// Derive this election's state as seen by a particular voter.
    ///
    /// `voted` takes precedence over the window state: a voter who cast their
    /// ballot in the final instant before closure still sees `voted`, not
    /// `closed`. This is the single authoritative derivation; nothing caches
    /// or persists the result.
    pub fn view_state(&self, has_voted: bool, now: DateTime<Utc>) -> ElectionViewState {
        if has_voted {
            ElectionViewState::Voted
        } else if now < self.start_time {
            ElectionViewState::Scheduled
        } else if now < self.end_time {
            ElectionViewState::Open
        } else {
            ElectionViewState::Closed
        }
    }
}

/// A candidate standing in an election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Candidate ID, unique within the election.
    pub id: CandidateId,
    /// Candidate name.
    pub name: String,
    /// Manifesto text, if submitted.
    pub manifesto: Option<String>,
    /// Reference to an uploaded photo, if any.
    pub photo_ref: Option<String>,
}

/// An election's status as seen by a particular voter. Derived on demand,
/// never stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionViewState {
    /// The voting window has not opened yet.
    Scheduled,
    /// The voting window is open and this voter has not voted.
    Open,
    /// The voting window has closed and this voter did not vote.
    Closed,
    /// This voter has cast their ballot.
    Voted,
}

/// Example test data.
#[cfg(test)]
mod examples {
    use chrono::Duration;

    use super::*;

    impl Candidate {
        pub fn example(id: CandidateId, name: &str) -> Self {
            Self {
                id,
                name: name.to_string(),
                manifesto: Some(format!("Vote for {name}!")),
                photo_ref: None,
            }
        }
    }

    impl Election {
        fn example_with_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
            Self {
                id: 1,
                title: "Student Union President".to_string(),
                description: "Annual SU presidential election".to_string(),
                start_time: start,
                end_time: end,
                candidates: vec![
                    Candidate::example(1, "Alice"),
                    Candidate::example(2, "Bob"),
                    Candidate::example(3, "Carol"),
                ],
            }
        }

        /// An election whose window contains the present moment.
        pub fn open_example() -> Self {
            let now = Utc::now();
            Self::example_with_window(now - Duration::hours(1), now + Duration::hours(1))
        }

        /// An election whose window is entirely in the future.
        pub fn scheduled_example() -> Self {
            let now = Utc::now();
            Self::example_with_window(now + Duration::days(1), now + Duration::days(2))
        }

        /// An election whose window is entirely in the past.
        pub fn closed_example() -> Self {
            let now = Utc::now();
            Self::example_with_window(now - Duration::days(2), now - Duration::days(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn window_boundaries() {
        let election = Election::open_example();
        assert!(election.is_open_at(election.start_time));
        assert!(election.is_open_at(election.end_time - Duration::seconds(1)));
        // The end instant itself is excluded.
        assert!(!election.is_open_at(election.end_time));
        assert!(!election.is_open_at(election.start_time - Duration::seconds(1)));
    }

    #[test]
    fn view_state_follows_window() {
        let now = Utc::now();
        let scheduled = Election::scheduled_example();
        let open = Election::open_example();
        let closed = Election::closed_example();

        assert_eq!(
            scheduled.view_state(false, now),
            ElectionViewState::Scheduled
        );
        assert_eq!(open.view_state(false, now), ElectionViewState::Open);
        assert_eq!(closed.view_state(false, now), ElectionViewState::Closed);
    }

    #[test]
    fn voted_takes_precedence() {
        let now = Utc::now();
        // A voter who voted sees `voted` whatever the window says.
        for election in [
            Election::scheduled_example(),
            Election::open_example(),
            Election::closed_example(),
        ] {
            assert_eq!(election.view_state(true, now), ElectionViewState::Voted);
        }
    }

    #[test]
    fn voted_survives_closure() {
        let election = Election::open_example();
        // The voter cast a ballot inside the window; querying after the end
        // must report `voted`, not `closed`.
        let after_close = election.end_time + Duration::hours(1);
        assert_eq!(
            election.view_state(true, after_close),
            ElectionViewState::Voted
        );
    }
}
