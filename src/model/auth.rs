//! The authenticated principal, decoded from the auth token issued by the
//! portal's identity service. This crate only ever verifies tokens; it never
//! issues them.

use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, TokenData, Validation};
use rocket::{
    http::{Cookie, Status},
    request::{FromRequest, Outcome},
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;

use super::election::VoterId;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// A campus portal user role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Staff,
    Admin,
}

impl Role {
    /// Only students are eligible to vote in elections.
    pub fn can_vote(self) -> bool {
        matches!(self, Role::Student)
    }
}

/// An authenticated caller: identity plus role. Always passed explicitly
/// into the services; the core never reads ambient identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The caller's voter ID (their username).
    #[serde(rename = "sub")]
    pub id: VoterId,
    /// The caller's role.
    pub role: Role,
}

impl Principal {
    /// Deserialize and verify a principal from an auth token cookie.
    pub fn from_cookie(cookie: &Cookie<'static>, config: &Config) -> Result<Self, Error> {
        let token = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims>| claims.claims.principal)?;
        Ok(token)
    }
}

/// Token claims: the principal itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    principal: Principal,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Principal {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Unwrap is safe as `Config` is always managed.
        let config = req.guard::<&State<Config>>().await.unwrap();

        let cookie = match req.cookies().get(AUTH_TOKEN_COOKIE) {
            Some(cookie) => cookie,
            None => {
                return Outcome::Failure((
                    Status::Unauthorized,
                    Error::Unauthenticated("no auth token".to_string()),
                ));
            }
        };

        match Self::from_cookie(cookie, config) {
            Ok(principal) => Outcome::Success(principal),
            Err(err) => Outcome::Failure((Status::Unauthorized, err)),
        }
    }
}


#[cfg(test)]
mod tests {
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};

    use super::*;

    #[test]
    fn only_students_can_vote() {
        assert!(Role::Student.can_vote());
        assert!(!Role::Staff.can_vote());
        assert!(!Role::Admin.can_vote());
    }

    #[test]
    fn claims_round_trip() {
        let secret = b"test secret";
        let claims = Claims {
            principal: Principal::student("alice"),
            expire_at: Utc::now() + Duration::hours(1),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();

        let decoded: TokenData<Claims> = jsonwebtoken::decode(
            &token,
            &DecodingKey::from_secret(secret),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.principal, Principal::student("alice"));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let secret = b"test secret";
        let claims = Claims {
            principal: Principal::student("alice"),
            expire_at: Utc::now() - Duration::hours(1),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();

        let decoded: Result<TokenData<Claims>, _> = jsonwebtoken::decode(
            &token,
            &DecodingKey::from_secret(secret),
            &Validation::default(),
        );
        assert!(decoded.is_err());
    }
}
