//! Configuration for the auth lifecycle: the storage-key matching policy
//! for cleanup, the auth entry route, the site origin used for sign-up
//! redirects and the forced-reset redirect delay.

use std::time::Duration;

use crate::cleanup::CleanupPolicy;
use crate::provider::SignOutScope;

/// Crate-wide configuration.
///
/// `AuthConfig::default()` gives global sign-out, the `/auth` entry point
/// and a 100 ms redirect delay after a forced reset.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Key-matching policy applied by [`cleanup_auth_state`](crate::cleanup_auth_state).
    pub cleanup: CleanupPolicy,

    /// Route the guard and forced reset redirect to when no user is present.
    pub auth_entry_path: String,

    /// Origin used to build the sign-up email redirect target.
    pub site_origin: String,

    /// Scope passed to the provider on sign-out.
    ///
    /// Default is `Global`: invalidate the session on every device sharing it.
    pub sign_out_scope: SignOutScope,

    /// Delay before the forced-reset redirect fires.
    pub reset_redirect_delay: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cleanup: CleanupPolicy::default(),
            auth_entry_path: "/auth".to_owned(),
            site_origin: "http://localhost:8080".to_owned(),
            sign_out_scope: SignOutScope::Global,
            reset_redirect_delay: Duration::from_millis(100),
        }
    }
}

impl AuthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redirect target appended to sign-up requests so the provider's
    /// confirmation email lands back on this deployment.
    pub fn email_redirect_target(&self) -> String {
        format!("{}/", self.site_origin.trim_end_matches('/'))
    }
}
