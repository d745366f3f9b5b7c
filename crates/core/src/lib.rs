//! Nevira Client Core
//!
//! The client-side heart of the Nevira voice assistant: a session controller
//! that joins a real-time audio room, reconciles room events into UI state,
//! meters the local microphone and speaks a small JSON protocol with the
//! remote agent over the room's data channel. The room transport itself and
//! the presentation layer are external; both are consumed through the seams
//! defined here.

pub mod events;
pub mod logbuf;
pub mod meter;
pub mod participant;
pub mod prefs;
pub mod protocol;
pub mod room;
pub mod session;
pub mod token_client;
pub mod tools;

pub use session::{
    ConnectionState, ControllerClient, ControllerState, SessionConfig, SessionController,
};
