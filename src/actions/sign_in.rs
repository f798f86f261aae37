use std::sync::Arc;

use chrono::Utc;

use crate::cleanup::cleanup_auth_state;
use crate::config::AuthConfig;
use crate::events::{dispatch, AuthEvent};
use crate::provider::{AuthChange, IdentityProvider};
use crate::storage::StoragePair;
use crate::store::{AuthStateStore, UserIdentity};
use crate::AuthError;

/// Email/password sign-in.
///
/// Residual identity artifacts are purged before the provider call so a
/// stale cached token is never sent alongside fresh credentials.
pub struct SignInAction<P: IdentityProvider> {
    provider: P,
    store: Arc<AuthStateStore>,
    storages: StoragePair,
    config: AuthConfig,
}

impl<P: IdentityProvider> SignInAction<P> {
    pub fn new(
        provider: P,
        store: Arc<AuthStateStore>,
        storages: StoragePair,
        config: AuthConfig,
    ) -> Self {
        Self {
            provider,
            store,
            storages,
            config,
        }
    }

    /// Authenticates against the provider.
    ///
    /// # Returns
    ///
    /// - `Ok(user)` - signed in; the store now holds the new session
    /// - `Err(_)` - the provider error, verbatim; the store is untouched
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sign_in", skip_all, err)
    )]
    pub async fn execute(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError> {
        cleanup_auth_state(&self.config.cleanup, &self.storages);

        match self.provider.sign_in_with_password(email, password).await {
            Ok((user, session)) => {
                self.store.apply(AuthChange::SignedIn {
                    user: user.clone(),
                    session,
                });

                dispatch(AuthEvent::SignInSuccess {
                    user_id: user.id,
                    email: user.email.clone(),
                    at: Utc::now(),
                })
                .await;

                log::info!(
                    target: "chambers_auth",
                    "msg=\"sign in success\", user_id={}",
                    user.id
                );

                Ok(user)
            }
            Err(err) => {
                dispatch(AuthEvent::SignInFailed {
                    email: email.to_owned(),
                    reason: err.to_string(),
                    at: Utc::now(),
                })
                .await;

                log::warn!(
                    target: "chambers_auth",
                    "msg=\"sign in failed\", reason=\"{}\"",
                    err
                );

                Err(err)
            }
        }
    }
}
