use std::sync::Arc;

use chrono::Utc;

use crate::cleanup::cleanup_auth_state;
use crate::config::AuthConfig;
use crate::events::{dispatch, AuthEvent};
use crate::provider::{AuthChange, IdentityProvider};
use crate::storage::StoragePair;
use crate::store::AuthStateStore;
use crate::AuthError;

/// Session invalidation.
///
/// The provider call uses the configured scope (global by default, so
/// every device sharing the session is signed out). A remote failure is
/// logged and swallowed; local state is cleared and storage cleaned
/// unconditionally - local consistency outranks remote confirmation.
pub struct SignOutAction<P: IdentityProvider> {
    provider: P,
    store: Arc<AuthStateStore>,
    storages: StoragePair,
    config: AuthConfig,
}

impl<P: IdentityProvider> SignOutAction<P> {
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

    /// Signs out. Never fails: the worst case is a still-valid remote
    /// session with a fully cleaned local context.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "sign_out", skip_all))]
    pub async fn execute(&self) -> Result<(), AuthError> {
        if let Err(err) = self.provider.sign_out(self.config.sign_out_scope).await {
            log::warn!(
                target: "chambers_auth",
                "msg=\"remote sign out failed, continuing with local cleanup\", error=\"{}\"",
                err
            );
        }

        self.store.apply(AuthChange::SignedOut);
        cleanup_auth_state(&self.config.cleanup, &self.storages);

        dispatch(AuthEvent::SignedOut {
            scope: self.config.sign_out_scope.as_str(),
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "chambers_auth",
            "msg=\"sign out complete\", scope=\"{}\"",
            self.config.sign_out_scope.as_str()
        );

        Ok(())
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::provider::MockIdentityProvider;
    use crate::storage::{KeyStorage, MemoryStorage};

    async fn signed_in_fixture() -> (MockIdentityProvider, Arc<AuthStateStore>, StoragePair, MemoryStorage)
    {
        let persistent = MemoryStorage::new();
        let provider = MockIdentityProvider::persisting_to(Arc::new(persistent.clone()));
        provider.register_user("ana@escritorio.adv.br", "pw", None);

        let (user, session) = provider
            .sign_in_with_password("ana@escritorio.adv.br", "pw")
            .await
            .unwrap();

        let store = Arc::new(AuthStateStore::new());
        store.apply(AuthChange::SignedIn { user, session });

        let storages = StoragePair::new(Arc::new(persistent.clone()), None);
        (provider, store, storages, persistent)
    }

    #[tokio::test]
    async fn test_sign_out_clears_store_and_storage() {
        let (provider, store, storages, persistent) = signed_in_fixture().await;
        assert!(store.snapshot().is_authenticated());
        assert!(!persistent.is_empty());

        let action = SignOutAction::new(provider, Arc::clone(&store), storages, AuthConfig::default());
        action.execute().await.unwrap();

        assert!(!store.snapshot().is_authenticated());
        assert_eq!(persistent.get("supabase.auth.token").unwrap(), None);
        assert_eq!(persistent.get("sb-chambers-auth-token").unwrap(), None);
    }

    #[tokio::test]
    async fn test_remote_failure_still_cleans_locally() {
        let (provider, store, storages, persistent) = signed_in_fixture().await;
        provider.set_sign_out_failing(true);

        let action = SignOutAction::new(provider, Arc::clone(&store), storages, AuthConfig::default());
        let result = action.execute().await;

        // remote error swallowed
        assert!(result.is_ok());
        assert!(!store.snapshot().is_authenticated());
        assert_eq!(persistent.get("supabase.auth.token").unwrap(), None);
    }
}
