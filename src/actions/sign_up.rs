use std::sync::Arc;

use chrono::Utc;

use crate::cleanup::cleanup_auth_state;
use crate::config::AuthConfig;
use crate::events::{dispatch, AuthEvent};
use crate::provider::{IdentityProvider, SignUpOptions};
use crate::storage::StoragePair;
use crate::store::UserIdentity;
use crate::AuthError;

/// Account registration.
///
/// Same pre-cleanup guarantee as sign-in. The email redirect target is
/// derived from the configured site origin so the provider's confirmation
/// link lands back on this deployment; the optional display name rides
/// along as profile metadata.
pub struct SignUpAction<P: IdentityProvider> {
    provider: P,
    storages: StoragePair,
    config: AuthConfig,
}

impl<P: IdentityProvider> SignUpAction<P> {
    pub fn new(provider: P, storages: StoragePair, config: AuthConfig) -> Self {
        Self {
            provider,
            storages,
            config,
        }
    }

    /// Registers a new account.
    ///
    /// The returned identity may not have an active session yet; the
    /// provider pushes a `SignedIn` change once email confirmation (when
    /// enabled) completes, at which point the store picks it up.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sign_up", skip_all, err)
    )]
    pub async fn execute(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<UserIdentity, AuthError> {
        cleanup_auth_state(&self.config.cleanup, &self.storages);

        let options = SignUpOptions {
            email_redirect_to: self.config.email_redirect_target(),
            display_name: display_name.map(str::to_owned),
        };

        let user = self.provider.sign_up(email, password, options).await?;

        dispatch(AuthEvent::SignUpSuccess {
            user_id: user.id,
            email: user.email.clone(),
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "chambers_auth",
            "msg=\"sign up success\", user_id={}",
            user.id
        );

        Ok(user)
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::provider::MockIdentityProvider;
    use crate::storage::{KeyStorage, MemoryStorage};

    fn setup() -> (MockIdentityProvider, StoragePair) {
        let provider = MockIdentityProvider::new();
        let storages = StoragePair::new(Arc::new(MemoryStorage::new()), None);
        (provider, storages)
    }

    #[tokio::test]
    async fn test_sign_up_attaches_redirect_and_display_name() {
        let (provider, storages) = setup();
        let config = AuthConfig {
            site_origin: "https://chambers.example.com".to_owned(),
            ..AuthConfig::default()
        };

        let action = SignUpAction::new(provider.clone(), storages, config);
        let user = action
            .execute("bruno@escritorio.adv.br", "pw123456", Some("Bruno Lima"))
            .await
            .unwrap();

        assert_eq!(user.display_name.as_deref(), Some("Bruno Lima"));

        let options = provider.last_sign_up_options().unwrap();
        assert_eq!(options.email_redirect_to, "https://chambers.example.com/");
        assert_eq!(options.display_name.as_deref(), Some("Bruno Lima"));
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email() {
        let (provider, storages) = setup();
        provider.register_user("bruno@escritorio.adv.br", "pw", None);

        let action = SignUpAction::new(provider, storages, AuthConfig::default());
        let result = action
            .execute("bruno@escritorio.adv.br", "pw123456", None)
            .await;

        assert_eq!(result.unwrap_err(), AuthError::UserAlreadyExists);
    }

    #[tokio::test]
    async fn test_sign_up_purges_stale_keys_first() {
        let (provider, _) = setup();
        let persistent = MemoryStorage::new();
        persistent.set("sb-old-session", "stale").unwrap();
        let storages = StoragePair::new(Arc::new(persistent.clone()), None);

        let action = SignUpAction::new(provider, storages, AuthConfig::default());
        action
            .execute("carla@escritorio.adv.br", "pw123456", None)
            .await
            .unwrap();

        assert_eq!(persistent.get("sb-old-session").unwrap(), None);
    }
}
