//! FitTrack Client Library
//!
//! The stateful client core of FitTrack.
//!
//! ## Architecture
//!
//! - `api`: backend collaborator traits and the HTTP implementation
//! - `session` / `cache`: the explicit per-user context every call receives
//! - `services`: auth, workouts, meals, profile and the weekly rollover
//! - `storage`: state persisted between runs (last seen week, session)
//!
//! The pure tracking rules live in `fittrack-shared`.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;

pub use cache::{Fetched, Provenance};
pub use error::{ClientError, ClientResult};
pub use session::Session;
pub use state::ClientState;
