//! Session, identity and workspace permission core for the Chambers legal
//! practice manager.
//!
//! The hosted backend owns credentials, sessions and tenant data; this crate
//! owns the client-side lifecycle around them: the auth state store, the
//! sign-in/sign-up/sign-out/force-reset actions, residual-token cleanup, the
//! route guard state machine and the workspace capability derivation.

pub mod actions;
pub mod cleanup;
pub mod config;
pub mod events;
pub mod guard;
pub mod provider;
pub mod storage;
pub mod store;
pub mod workspace;

mod secret;

pub use cleanup::{cleanup_auth_state, CleanupPolicy};
pub use config::AuthConfig;
pub use events::register_event_listeners;
pub use guard::{GuardDecision, GuardState, Navigator, RouteGuard};
pub use provider::{AuthChange, IdentityProvider, SignOutScope, SignUpOptions};
pub use secret::SecretString;
pub use storage::{KeyStorage, MemoryStorage, StoragePair};
pub use store::{AuthSnapshot, AuthStateStore, Profile, Session, UserIdentity};
pub use workspace::{
    ActiveWorkspace, CapabilitySet, MemberRole, MemberStatus, Workspace, WorkspaceContext,
    WorkspaceMember,
};

#[cfg(feature = "mocks")]
pub use guard::MockNavigator;
#[cfg(feature = "mocks")]
pub use provider::MockIdentityProvider;

use std::fmt;

/// Errors surfaced by auth actions and workspace operations.
///
/// Remote provider errors are carried verbatim in `Provider`; nothing in
/// this crate retries them. Storage failures during cleanup never reach
/// callers (cleanup is best-effort) but repositories do report them.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    InvalidCredentials,
    UserAlreadyExists,
    SessionExpired,
    NotFound,
    Forbidden,
    Provider(String),
    Storage(String),
    Internal(String),
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::UserAlreadyExists => write!(f, "An account with this email already exists"),
            AuthError::SessionExpired => write!(f, "Session has expired"),
            AuthError::NotFound => write!(f, "Record not found"),
            AuthError::Forbidden => write!(f, "Operation not permitted"),
            AuthError::Provider(msg) => write!(f, "Identity provider error: {}", msg),
            AuthError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AuthError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        assert_eq!(
            AuthError::Provider("rate limited".to_owned()).to_string(),
            "Identity provider error: rate limited"
        );
        assert_eq!(
            AuthError::Storage("quota".to_owned()).to_string(),
            "Storage error: quota"
        );
    }
}
