use std::sync::Arc;

use chrono::Utc;

use crate::cleanup::cleanup_auth_state;
use crate::config::AuthConfig;
use crate::events::{dispatch, AuthEvent};
use crate::guard::Navigator;
use crate::provider::{AuthChange, IdentityProvider};
use crate::storage::StoragePair;
use crate::store::AuthStateStore;
use crate::AuthError;

/// Nuclear option: sign out, purge everything, then reload onto the auth
/// entry point after a short fixed delay so no partially-initialized
/// in-memory state survives the transition.
pub struct ForceResetAction<P: IdentityProvider> {
    provider: P,
    store: Arc<AuthStateStore>,
    storages: StoragePair,
    navigator: Arc<dyn Navigator>,
    config: AuthConfig,
}

impl<P: IdentityProvider> ForceResetAction<P> {
    pub fn new(
        provider: P,
        store: Arc<AuthStateStore>,
        storages: StoragePair,
        navigator: Arc<dyn Navigator>,
        config: AuthConfig,
    ) -> Self {
        Self {
            provider,
            store,
            storages,
            navigator,
            config,
        }
    }

    /// Runs the reset. Like sign-out, remote errors never block the local
    /// teardown; the redirect is scheduled on a background task and fires
    /// after `reset_redirect_delay` regardless of what the caller does
    /// next.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "force_reset", skip_all)
    )]
    pub async fn execute(&self) -> Result<(), AuthError> {
        if let Err(err) = self.provider.sign_out(self.config.sign_out_scope).await {
            log::warn!(
                target: "chambers_auth",
                "msg=\"remote sign out failed during reset\", error=\"{}\"",
                err
            );
        }

        self.store.apply(AuthChange::SignedOut);
        cleanup_auth_state(&self.config.cleanup, &self.storages);

        dispatch(AuthEvent::ResetForced { at: Utc::now() }).await;

        log::info!(
            target: "chambers_auth",
            "msg=\"forced reset, scheduling redirect\", to=\"{}\", delay_ms={}",
            self.config.auth_entry_path,
            self.config.reset_redirect_delay.as_millis()
        );

        let navigator = Arc::clone(&self.navigator);
        let path = self.config.auth_entry_path.clone();
        let delay = self.config.reset_redirect_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(&path, true);
        });

        Ok(())
    }
}
