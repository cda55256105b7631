//! Signal generation — entry/stop/target levels from band breakouts.
//!
//! The signal state belongs to exactly one `SignalEngine`, which is owned by
//! exactly one stream. Nothing here is global, so independent streams can run
//! side by side.

pub mod engine;
pub mod state;

pub use engine::{SignalEngine, SignalInput, Transition, Transitions};
pub use state::{SignalDirection, SignalPhase, SignalState};
