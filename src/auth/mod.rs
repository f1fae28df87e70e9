//! Authentication system
//!
//! Handles the USER/PASS login sub-state machine of a session.

pub mod results;
pub mod state;

pub use results::{PassResult, UserResult};
pub use state::{ANONYMOUS, AuthState};
