//! Session state and authentication lifecycle.

pub mod lifecycle;
pub mod state;

pub use lifecycle::SessionManager;
pub use state::{SessionPhase, SessionSnapshot, SessionStore};
