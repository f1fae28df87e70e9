//! Authentication result types
//!
//! Defines result structures returned by authentication operations.

/// Result of a USER command
#[derive(Debug, Clone, PartialEq)]
pub struct UserResult {
    pub username: String,
    pub logged_in: bool,
}

/// Result of a PASS command
#[derive(Debug, Clone, PartialEq)]
pub struct PassResult {
    pub username: String,
}
