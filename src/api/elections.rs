use chrono::Utc;
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::{ElectionDescription, ElectionSummary},
    auth::Principal,
    ballot::Ballot,
    election::{Election, ElectionId},
    mongodb::{election_id_filter, Coll},
};
use crate::services::{
    BallotStore, MongoBallotStore, MongoElectionRegistry, Tally, TallyEngine,
};

pub fn routes() -> Vec<Route> {
    routes![elections, election, election_results]
}

/// List all elections, each annotated with the calling voter's view of its
/// state (`scheduled`/`open`/`closed`/`voted`).
#[get("/elections")]
async fn elections(
    principal: Principal,
    elections: Coll<Election>,
    ballots: Coll<Ballot>,
) -> Result<Json<Vec<ElectionSummary>>> {
    let store = MongoBallotStore::new(ballots);
    let all = elections
        .find(None, None)
        .await?
        .try_collect::<Vec<Election>>()
        .await?;

    let now = Utc::now();
    let mut summaries = Vec::with_capacity(all.len());
    for election in all {
        let has_voted = store.has_voted(election.id, &principal.id).await?;
        let state = election.view_state(has_voted, now);
        summaries.push(ElectionSummary::new(election, state));
    }
    Ok(Json(summaries))
}

/// A single election with its candidates.
#[get("/elections/<election_id>")]
async fn election(
    principal: Principal,
    election_id: ElectionId,
    elections: Coll<Election>,
    ballots: Coll<Ballot>,
) -> Result<Json<ElectionDescription>> {
    let election = elections
        .find_one(election_id_filter(election_id), None)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No election found with ID {election_id}")))?;

    let has_voted = MongoBallotStore::new(ballots)
        .has_voted(election_id, &principal.id)
        .await?;
    let state = election.view_state(has_voted, Utc::now());
    Ok(Json(ElectionDescription::new(election, state)))
}

/// Current results for an election. Readable by anyone at any time; the
/// tally is recomputed from the ballots on every request.
#[get("/elections/<election_id>/results")]
async fn election_results(
    election_id: ElectionId,
    elections: Coll<Election>,
    ballots: Coll<Ballot>,
) -> Result<Json<Tally>> {
    let engine = TallyEngine::new(
        MongoElectionRegistry::new(elections),
        MongoBallotStore::new(ballots),
    );
    Ok(Json(engine.compute_results(election_id).await?))
}
