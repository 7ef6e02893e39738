//! Authentication state
//!
//! Holds the logged-in user and tokens and reads token expiry.

mod session;
pub mod token;

pub use session::{AuthSession, PersistedSession};
