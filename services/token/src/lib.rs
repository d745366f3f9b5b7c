//! Nevira Token Service Library Crate
//!
//! This library contains all the logic for the token provider: configuration,
//! credential minting, the room occupancy check and the HTTP surface. The
//! `bin/token.rs` binary is a thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod minting;
pub mod models;
pub mod occupancy;
pub mod router;
pub mod state;
