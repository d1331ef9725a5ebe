//! Election voting and result tallying backend for the APTCS campus portal.
//!
//! The interesting logic lives in [`services`]: the ballot store (at most one
//! ballot per voter per election, enforced at the storage boundary), the
//! election registry, the voting service and the tally engine. The [`api`]
//! module is a thin Rocket layer over those services.

#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod services;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing};
use crate::logging::LoggerFairing;

/// Build the server, ready for launch.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(LoggerFairing)
}
