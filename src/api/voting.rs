use chrono::Utc;
use rocket::{serde::json::Json, Route};

use crate::error::Result;
use crate::model::{
    api::VoteRequest,
    auth::Principal,
    ballot::{Ballot, VoteReceipt},
    election::{Election, ElectionId},
    mongodb::Coll,
};
use crate::services::{MongoBallotStore, MongoElectionRegistry, VotingService};

pub fn routes() -> Vec<Route> {
    routes![cast_vote]
}

/// Cast the calling voter's ballot. The service result is the single source
/// of truth: success means exactly one ballot was written, and every failure
/// maps to its own status so the client can tell "already voted" from
/// "voting closed" from "not eligible".
#[post("/elections/<election_id>/vote", data = "<request>", format = "json")]
async fn cast_vote(
    principal: Principal,
    election_id: ElectionId,
    request: Json<VoteRequest>,
    elections: Coll<Election>,
    ballots: Coll<Ballot>,
) -> Result<Json<VoteReceipt>> {
    let service = VotingService::new(
        MongoElectionRegistry::new(elections),
        MongoBallotStore::new(ballots),
    );
    let receipt = service
        .cast_vote(&principal, election_id, request.candidate_id, Utc::now())
        .await?;
    Ok(Json(receipt))
}
