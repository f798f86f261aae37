//! The identity provider seam.
//!
//! The hosted backend's SDK is reduced to the four calls the core actually
//! depends on: password sign-in, sign-up with redirect metadata, scoped
//! sign-out and a current-session fetch, plus the profile lookup the store
//! performs after bootstrap. Change notifications arrive as [`AuthChange`]
//! values which the caller forwards to the
//! [`AuthStateStore`](crate::AuthStateStore).

use async_trait::async_trait;
use uuid::Uuid;

use crate::store::{Profile, Session, UserIdentity};
use crate::AuthError;

/// Scope of a sign-out request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutScope {
    /// Invalidate only this browser context's session.
    Local,
    /// Invalidate the session everywhere it is shared.
    Global,
}

impl SignOutScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Global => "global",
        }
    }
}

/// Options attached to a sign-up request.
#[derive(Debug, Clone)]
pub struct SignUpOptions {
    /// Where the confirmation email should land the user.
    pub email_redirect_to: String,
    /// Optional display name stored as profile metadata by the provider.
    pub display_name: Option<String>,
}

/// A session-change notification pushed by the provider.
#[derive(Debug, Clone)]
pub enum AuthChange {
    SignedIn {
        user: UserIdentity,
        session: Session,
    },
    TokenRefreshed {
        session: Session,
    },
    SignedOut,
}

/// The subset of the provider SDK consumed by this crate.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticate by email and password.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(UserIdentity, Session), AuthError>;

    /// Register a new account. The returned identity may have no session
    /// yet while email confirmation is pending.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        options: SignUpOptions,
    ) -> Result<UserIdentity, AuthError>;

    /// Invalidate the current session with the given scope.
    async fn sign_out(&self, scope: SignOutScope) -> Result<(), AuthError>;

    /// The session the provider currently holds, if any.
    async fn current_session(&self) -> Result<Option<(UserIdentity, Session)>, AuthError>;

    /// Application profile for a user. Absent immediately after sign-up
    /// until the backend trigger creates it.
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AuthError>;
}

#[cfg(feature = "mocks")]
pub use mock::MockIdentityProvider;

#[cfg(feature = "mocks")]
mod mock {
    use std::collections::HashMap;
    use std::sync::{Arc, RwLock};

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::{AuthChange, IdentityProvider, SignOutScope, SignUpOptions};
    use crate::storage::KeyStorage;
    use crate::store::{Profile, Session, UserIdentity};
    use crate::{AuthError, SecretString};

    fn generate_token(length: usize) -> String {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
            .collect()
    }

    struct MockAccount {
        identity: UserIdentity,
        password: String,
        profile: Option<Profile>,
    }

    /// In-memory identity provider for tests.
    ///
    /// Passwords are compared in plain text; this type never leaves test
    /// builds. When given a storage handle it persists its session under
    /// the provider-reserved key names, mirroring what the real SDK does,
    /// so cleanup behavior can be exercised end to end.
    #[derive(Clone, Default)]
    pub struct MockIdentityProvider {
        accounts: Arc<RwLock<HashMap<String, MockAccount>>>,
        current: Arc<RwLock<Option<(UserIdentity, Session)>>>,
        persist_to: Option<Arc<dyn KeyStorage>>,
        fail_next: Arc<RwLock<Option<AuthError>>>,
        fail_sign_out: Arc<RwLock<bool>>,
        last_sign_up_options: Arc<RwLock<Option<SignUpOptions>>>,
    }

    impl MockIdentityProvider {
        pub fn new() -> Self {
            Self::default()
        }

        /// Persist session tokens into `storage` on successful sign-in,
        /// the way the real SDK caches its session.
        pub fn persisting_to(storage: Arc<dyn KeyStorage>) -> Self {
            Self {
                persist_to: Some(storage),
                ..Self::default()
            }
        }

        /// Registers an account and returns its identity.
        pub fn register_user(
            &self,
            email: &str,
            password: &str,
            display_name: Option<&str>,
        ) -> UserIdentity {
            let identity = UserIdentity {
                id: Uuid::new_v4(),
                email: email.to_owned(),
                display_name: display_name.map(str::to_owned),
            };
            if let Ok(mut accounts) = self.accounts.write() {
                accounts.insert(
                    email.to_owned(),
                    MockAccount {
                        identity: identity.clone(),
                        password: password.to_owned(),
                        profile: None,
                    },
                );
            }
            identity
        }

        /// Installs a profile for a registered user, simulating the
        /// backend trigger that creates profiles after sign-up.
        pub fn set_profile(&self, profile: Profile) {
            if let Ok(mut accounts) = self.accounts.write() {
                if let Some(account) = accounts
                    .values_mut()
                    .find(|a| a.identity.id == profile.user_id)
                {
                    account.profile = Some(profile);
                }
            }
        }

        /// The next provider call fails with `error`.
        pub fn fail_next_with(&self, error: AuthError) {
            if let Ok(mut guard) = self.fail_next.write() {
                *guard = Some(error);
            }
        }

        /// Make sign-out fail remotely (the local cleanup path must still run).
        pub fn set_sign_out_failing(&self, failing: bool) {
            if let Ok(mut guard) = self.fail_sign_out.write() {
                *guard = failing;
            }
        }

        /// Options captured from the last sign-up call.
        pub fn last_sign_up_options(&self) -> Option<SignUpOptions> {
            self.last_sign_up_options
                .read()
                .ok()
                .and_then(|g| g.clone())
        }

        /// Seed a live session directly, as if the SDK restored one.
        pub fn install_session(&self, user: UserIdentity, session: Session) {
            if let Ok(mut current) = self.current.write() {
                *current = Some((user, session));
            }
        }

        /// The change notification a subscriber would have received for
        /// the current provider state.
        pub fn pending_change(&self) -> AuthChange {
            match self.current.read().ok().and_then(|c| c.clone()) {
                Some((user, session)) => AuthChange::SignedIn { user, session },
                None => AuthChange::SignedOut,
            }
        }

        fn take_failure(&self) -> Option<AuthError> {
            self.fail_next.write().ok().and_then(|mut g| g.take())
        }

        fn mint_session(&self) -> Session {
            Session {
                access_token: SecretString::new(generate_token(32)),
                refresh_token: SecretString::new(generate_token(32)),
                expires_at: Utc::now() + Duration::hours(1),
            }
        }

        fn persist_session(&self, session: &Session) {
            if let Some(storage) = &self.persist_to {
                let _ = storage.set("supabase.auth.token", session.access_token.expose_secret());
                let _ = storage.set(
                    "sb-chambers-auth-token",
                    session.refresh_token.expose_secret(),
                );
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for MockIdentityProvider {
        async fn sign_in_with_password(
            &self,
            email: &str,
            password: &str,
        ) -> Result<(UserIdentity, Session), AuthError> {
            if let Some(error) = self.take_failure() {
                return Err(error);
            }

            let identity = {
                let accounts = self
                    .accounts
                    .read()
                    .map_err(|_| AuthError::Internal("lock poisoned".to_owned()))?;
                match accounts.get(email) {
                    Some(account) if account.password == password => account.identity.clone(),
                    _ => return Err(AuthError::InvalidCredentials),
                }
            };

            let session = self.mint_session();
            self.persist_session(&session);
            if let Ok(mut current) = self.current.write() {
                *current = Some((identity.clone(), session.clone()));
            }

            Ok((identity, session))
        }

        async fn sign_up(
            &self,
            email: &str,
            password: &str,
            options: SignUpOptions,
        ) -> Result<UserIdentity, AuthError> {
            if let Some(error) = self.take_failure() {
                return Err(error);
            }

            if let Ok(mut guard) = self.last_sign_up_options.write() {
                *guard = Some(options.clone());
            }

            {
                let accounts = self
                    .accounts
                    .read()
                    .map_err(|_| AuthError::Internal("lock poisoned".to_owned()))?;
                if accounts.contains_key(email) {
                    return Err(AuthError::UserAlreadyExists);
                }
            }

            let identity = self.register_user(email, password, options.display_name.as_deref());
            Ok(identity)
        }

        async fn sign_out(&self, _scope: SignOutScope) -> Result<(), AuthError> {
            let failing = self.fail_sign_out.read().map(|f| *f).unwrap_or(false);

            // Remote failure still leaves the mock's session in place, like
            // a network error would for the real provider.
            if failing {
                return Err(AuthError::Provider("sign-out request failed".to_owned()));
            }

            if let Ok(mut current) = self.current.write() {
                *current = None;
            }
            Ok(())
        }

        async fn current_session(&self) -> Result<Option<(UserIdentity, Session)>, AuthError> {
            if let Some(error) = self.take_failure() {
                return Err(error);
            }
            Ok(self.current.read().ok().and_then(|c| c.clone()))
        }

        async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AuthError> {
            if let Some(error) = self.take_failure() {
                return Err(error);
            }
            let accounts = self
                .accounts
                .read()
                .map_err(|_| AuthError::Internal("lock poisoned".to_owned()))?;
            Ok(accounts
                .values()
                .find(|a| a.identity.id == user_id)
                .and_then(|a| a.profile.clone()))
        }
    }

}
