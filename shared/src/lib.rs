//! FitTrack Shared Library
//!
//! This crate contains the plan data model and the pure tracking logic
//! (progress arithmetic, streaks, completion locks, week arithmetic) used
//! by the client core and the WASM bindings.

pub mod archive;
pub mod completion;
pub mod errors;
pub mod health_metrics;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod streak;
pub mod types;
pub mod validation;
pub mod week;

// Re-export commonly used items
pub use errors::*;
pub use health_metrics::*;
pub use models::*;
pub use normalize::Normalize;
pub use progress::*;
pub use streak::*;
pub use types::*;
pub use week::*;

pub use archive::{summarize_week, ArchiveSummary};
pub use completion::{check_toggle, is_locked, ReversalPolicy, ToggleDecision, LOCK_WINDOW_HOURS};
