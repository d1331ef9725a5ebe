use jsonwebtoken::errors::Error as JwtError;
use mongodb::error::Error as DbError;
use rocket::{http::Status, response::Responder};
use thiserror::Error;

use crate::services::VoteError;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error, as produced by the API layer.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Vote(#[from] VoteError),
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Map every error to a stable, distinguishable status, so a client can show
/// "already voted" differently from "voting closed" or "not eligible".
impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        warn!("{self}");
        Err(match self {
            Self::Db(_) => Status::InternalServerError,
            Self::Jwt(_) | Self::Unauthenticated(_) => Status::Unauthorized,
            Self::NotFound(_) => Status::NotFound,
            Self::Vote(err) => match err {
                VoteError::Unauthorized(_) => Status::Forbidden,
                VoteError::ElectionNotFound(_) => Status::NotFound,
                VoteError::ElectionNotOpen(_) | VoteError::DuplicateVote(_) => Status::Conflict,
                VoteError::InvalidCandidate { .. } => Status::BadRequest,
                // The only retryable failure; never conflated with a duplicate vote.
                VoteError::StoreUnavailable(_) => Status::ServiceUnavailable,
            },
        })
    }
}
