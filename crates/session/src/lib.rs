//! The Helmsman session orchestrator: the bounded round loop that drives
//! one user query against the agent server, plus the tool dispatcher and
//! the observer seam for incremental UI updates.

pub mod dispatch;
pub mod driver;
pub mod observer;

pub use dispatch::{dispatch, CapabilityExecutor};
pub use driver::{SessionDriver, SessionOutcome, SessionRequest, MAX_ROUNDS, NO_RESPONSE_FALLBACK};
pub use observer::{truncate_str, NullObserver, SessionObserver};
