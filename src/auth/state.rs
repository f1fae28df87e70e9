//! Authentication state machine
//!
//! `Unauthenticated -> UsernameProvided(name) -> Authenticated(name)`, driven
//! only by USER and PASS. The anonymous account skips the password step.

use crate::auth::results::{PassResult, UserResult};
use crate::error::AuthError;

/// Username that logs in without a password.
pub const ANONYMOUS: &str = "anonymous";

/// Login progress of one control connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    UsernameProvided(String),
    Authenticated(String),
}

impl AuthState {
    /// Returns whether the session passed authentication.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    /// Returns the claimed or authenticated username, if any.
    pub fn username(&self) -> Option<&str> {
        match self {
            AuthState::Unauthenticated => None,
            AuthState::UsernameProvided(name) | AuthState::Authenticated(name) => Some(name),
        }
    }

    /// Applies a USER command.
    ///
    /// A second identity cannot be claimed once a username is held, except
    /// for the anonymous account which always logs in immediately.
    pub fn process_user(&mut self, username: &str) -> Result<UserResult, AuthError> {
        if username.is_empty() {
            return Err(AuthError::MissingArgument);
        }

        if username == ANONYMOUS {
            *self = AuthState::Authenticated(username.to_string());
            return Ok(UserResult {
                username: username.to_string(),
                logged_in: true,
            });
        }

        match self {
            AuthState::Unauthenticated => {
                *self = AuthState::UsernameProvided(username.to_string());
                Ok(UserResult {
                    username: username.to_string(),
                    logged_in: false,
                })
            }
            AuthState::UsernameProvided(held) | AuthState::Authenticated(held) => {
                Err(AuthError::UsernameAlreadyProvided(held.clone()))
            }
        }
    }

    /// Applies a PASS command. Any non-empty password is accepted for a
    /// non-anonymous username; the password itself is not retained.
    pub fn process_pass(&mut self, password: &str) -> Result<PassResult, AuthError> {
        if password.is_empty() {
            return Err(AuthError::MissingArgument);
        }

        let username = match &*self {
            AuthState::Unauthenticated => return Err(AuthError::NeedAccount),
            AuthState::UsernameProvided(name) | AuthState::Authenticated(name) => {
                if name == ANONYMOUS {
                    return Err(AuthError::AnonymousPassword);
                }
                name.clone()
            }
        };

        *self = AuthState::Authenticated(username.clone());
        Ok(PassResult { username })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_logs_in_immediately() {
        let mut state = AuthState::default();
        let result = state.process_user("anonymous").unwrap();
        assert!(result.logged_in);
        assert_eq!(state, AuthState::Authenticated("anonymous".into()));
    }

    #[test]
    fn test_user_then_pass() {
        let mut state = AuthState::default();
        let result = state.process_user("alice").unwrap();
        assert!(!result.logged_in);
        assert_eq!(state, AuthState::UsernameProvided("alice".into()));
        assert!(!state.is_authenticated());

        let result = state.process_pass("whatever").unwrap();
        assert_eq!(result.username, "alice");
        assert!(state.is_authenticated());
        assert_eq!(state.username(), Some("alice"));
    }

    #[test]
    fn test_empty_arguments_leave_state_unchanged() {
        let mut state = AuthState::default();
        assert_eq!(state.process_user(""), Err(AuthError::MissingArgument));
        assert_eq!(state, AuthState::Unauthenticated);

        state.process_user("bob").unwrap();
        assert_eq!(state.process_pass(""), Err(AuthError::MissingArgument));
        assert_eq!(state, AuthState::UsernameProvided("bob".into()));
    }

    #[test]
    fn test_second_username_rejected() {
        let mut state = AuthState::default();
        state.process_user("alice").unwrap();
        assert_eq!(
            state.process_user("bob"),
            Err(AuthError::UsernameAlreadyProvided("alice".into()))
        );
        assert_eq!(state, AuthState::UsernameProvided("alice".into()));

        state.process_pass("pw").unwrap();
        assert!(state.process_user("bob").is_err());
        assert_eq!(state, AuthState::Authenticated("alice".into()));
    }

    #[test]
    fn test_pass_before_user_needs_account() {
        let mut state = AuthState::default();
        assert_eq!(state.process_pass("pw"), Err(AuthError::NeedAccount));
        assert_eq!(state, AuthState::Unauthenticated);
    }

    #[test]
    fn test_anonymous_takes_no_password() {
        let mut state = AuthState::default();
        state.process_user("anonymous").unwrap();
        assert_eq!(state.process_pass("me@example.com"), Err(AuthError::AnonymousPassword));
        assert!(state.is_authenticated());
    }

    #[test]
    fn test_anonymous_overrides_pending_username() {
        let mut state = AuthState::default();
        state.process_user("alice").unwrap();
        state.process_user("anonymous").unwrap();
        assert_eq!(state, AuthState::Authenticated("anonymous".into()));
    }

    #[test]
    fn test_authenticated_only_through_user_pass_sequences() {
        // Rejected second USER followed by PASS still logs in the first name.
        let mut state = AuthState::default();
        state.process_user("alice").unwrap();
        let _ = state.process_user("mallory");
        state.process_pass("pw").unwrap();
        assert_eq!(state, AuthState::Authenticated("alice".into()));

        // PASS alone never authenticates.
        let mut state = AuthState::default();
        let _ = state.process_pass("pw");
        let _ = state.process_pass("pw");
        assert!(!state.is_authenticated());
    }
}
