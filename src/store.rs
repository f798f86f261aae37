//! The auth state store: single source of truth for the cached identity.
//!
//! The store holds `{user, session, profile, loading}` for the lifetime of
//! the process. It is the sole writer of its own fields, fed by the initial
//! bootstrap and by provider change notifications; it never writes to
//! storage itself.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::provider::{AuthChange, IdentityProvider};
use crate::SecretString;

/// Cached copy of the provider-owned credential pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Stable identity held by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
}

/// Application-level profile row, keyed by user id.
///
/// Created by a backend trigger after sign-up, so it can lag behind the
/// identity: the store must tolerate a null profile next to a live user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    /// Brazilian bar registration number.
    pub oab_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One immutable view of the auth state.
#[derive(Debug, Clone)]
pub struct AuthSnapshot {
    pub user: Option<UserIdentity>,
    pub session: Option<Session>,
    pub profile: Option<Profile>,
    /// True only until the first snapshot is obtained; never reverts.
    pub loading: bool,
}

impl AuthSnapshot {
    /// Authenticated means a user identity plus an unexpired session.
    /// Profile absence is irrelevant.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.session.as_ref().is_some_and(|s| !s.is_expired())
    }
}

impl Default for AuthSnapshot {
    fn default() -> Self {
        Self {
            user: None,
            session: None,
            profile: None,
            loading: true,
        }
    }
}

type Subscriber = Box<dyn Fn(&AuthSnapshot) + Send + Sync>;

/// Process-scoped auth state store.
///
/// Construct once at startup, [`bootstrap`](Self::bootstrap) it, then feed
/// it provider notifications via [`apply`](Self::apply). Consumers read
/// [`snapshot`](Self::snapshot) or register a [`subscribe`](Self::subscribe)
/// callback; callbacks run synchronously on the updating task.
#[derive(Default)]
pub struct AuthStateStore {
    snapshot: RwLock<AuthSnapshot>,
    subscribers: RwLock<Vec<Subscriber>>,
}

impl AuthStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> AuthSnapshot {
        self.snapshot
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Registers an observer invoked with every new snapshot.
    pub fn subscribe(&self, callback: impl Fn(&AuthSnapshot) + Send + Sync + 'static) {
        if let Ok(mut subscribers) = self.subscribers.write() {
            subscribers.push(Box::new(callback));
        }
    }

    /// Obtains the first snapshot from the provider.
    ///
    /// Fetch errors leave the identity empty and are not retried; in every
    /// path `loading` ends up false and stays false.
    pub async fn bootstrap(&self, provider: &dyn IdentityProvider) {
        match provider.current_session().await {
            Ok(Some((user, session))) => {
                let profile = match provider.fetch_profile(user.id).await {
                    Ok(profile) => profile,
                    Err(err) => {
                        log::warn!(
                            target: "chambers_auth",
                            "msg=\"profile fetch failed during bootstrap\", error=\"{}\"",
                            err
                        );
                        None
                    }
                };
                self.update(|s| {
                    s.user = Some(user);
                    s.session = Some(session);
                    s.profile = profile;
                    s.loading = false;
                });
            }
            Ok(None) => {
                self.update(|s| {
                    s.user = None;
                    s.session = None;
                    s.profile = None;
                    s.loading = false;
                });
            }
            Err(err) => {
                log::warn!(
                    target: "chambers_auth",
                    "msg=\"session bootstrap failed\", error=\"{}\"",
                    err
                );
                self.update(|s| {
                    s.user = None;
                    s.session = None;
                    s.profile = None;
                    s.loading = false;
                });
            }
        }
    }

    /// Applies a provider change notification.
    pub fn apply(&self, change: AuthChange) {
        match change {
            AuthChange::SignedIn { user, session } => self.update(|s| {
                s.user = Some(user);
                s.session = Some(session);
                s.loading = false;
            }),
            AuthChange::TokenRefreshed { session } => self.update(|s| {
                s.session = Some(session);
                s.loading = false;
            }),
            AuthChange::SignedOut => self.update(|s| {
                s.user = None;
                s.session = None;
                s.profile = None;
                s.loading = false;
            }),
        }
    }

    /// Installs or replaces the profile without touching auth state.
    pub fn set_profile(&self, profile: Option<Profile>) {
        self.update(|s| s.profile = profile);
    }

    fn update(&self, f: impl FnOnce(&mut AuthSnapshot)) {
        let snapshot = {
            let mut guard = match self.snapshot.write() {
                Ok(guard) => guard,
                Err(_) => return,
            };
            f(&mut guard);
            guard.clone()
        };
        self.notify(&snapshot);
    }

    fn notify(&self, snapshot: &AuthSnapshot) {
        if let Ok(subscribers) = self.subscribers.read() {
            for subscriber in subscribers.iter() {
                subscriber(snapshot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;

    fn test_user() -> UserIdentity {
        UserIdentity {
            id: Uuid::new_v4(),
            email: "ana@escritorio.adv.br".to_owned(),
            display_name: Some("Ana".to_owned()),
        }
    }

    fn live_session() -> Session {
        Session {
            access_token: SecretString::new("access"),
            refresh_token: SecretString::new("refresh"),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn test_starts_loading_and_unauthenticated() {
        let store = AuthStateStore::new();
        let snapshot = store.snapshot();
        assert!(snapshot.loading);
        assert!(!snapshot.is_authenticated());
    }

    #[test]
    fn test_authenticated_requires_unexpired_session() {
        let snapshot = AuthSnapshot {
            user: Some(test_user()),
            session: Some(Session {
                expires_at: Utc::now() - Duration::minutes(5),
                ..live_session()
            }),
            profile: None,
            loading: false,
        };
        assert!(!snapshot.is_authenticated());

        let snapshot = AuthSnapshot {
            session: Some(live_session()),
            ..snapshot
        };
        assert!(snapshot.is_authenticated());
    }

    #[test]
    fn test_null_profile_does_not_affect_authentication() {
        let snapshot = AuthSnapshot {
            user: Some(test_user()),
            session: Some(live_session()),
            profile: None,
            loading: false,
        };
        assert!(snapshot.is_authenticated());
    }

    #[test]
    fn test_apply_signed_in_and_out() {
        let store = AuthStateStore::new();
        store.apply(AuthChange::SignedIn {
            user: test_user(),
            session: live_session(),
        });

        let snapshot = store.snapshot();
        assert!(!snapshot.loading);
        assert!(snapshot.is_authenticated());

        store.apply(AuthChange::SignedOut);
        let snapshot = store.snapshot();
        assert!(!snapshot.loading);
        assert!(snapshot.user.is_none());
        assert!(snapshot.session.is_none());
        assert!(snapshot.profile.is_none());
    }

    #[test]
    fn test_token_refresh_keeps_user() {
        let store = AuthStateStore::new();
        store.apply(AuthChange::SignedIn {
            user: test_user(),
            session: live_session(),
        });

        let refreshed = Session {
            access_token: SecretString::new("access2"),
            refresh_token: SecretString::new("refresh2"),
            expires_at: Utc::now() + Duration::hours(2),
        };
        store.apply(AuthChange::TokenRefreshed {
            session: refreshed.clone(),
        });

        let snapshot = store.snapshot();
        assert!(snapshot.user.is_some());
        assert_eq!(
            snapshot.session.unwrap().access_token,
            refreshed.access_token
        );
    }

    #[test]
    fn test_subscribers_see_every_update() {
        let store = AuthStateStore::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        store.subscribe(move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        });

        store.apply(AuthChange::SignedIn {
            user: test_user(),
            session: live_session(),
        });
        store.apply(AuthChange::SignedOut);

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[cfg(feature = "mocks")]
    mod bootstrap {
        use super::*;
        use crate::provider::MockIdentityProvider;
        use crate::AuthError;

        #[tokio::test]
        async fn test_bootstrap_with_no_session() {
            let provider = MockIdentityProvider::new();
            let store = AuthStateStore::new();

            store.bootstrap(&provider).await;

            let snapshot = store.snapshot();
            assert!(!snapshot.loading);
            assert!(snapshot.user.is_none());
        }

        #[tokio::test]
        async fn test_bootstrap_restores_session_and_profile() {
            let provider = MockIdentityProvider::new();
            let user = provider.register_user("ana@escritorio.adv.br", "pw", Some("Ana"));
            provider.set_profile(Profile {
                user_id: user.id,
                full_name: Some("Ana Souza".to_owned()),
                oab_number: Some("SP123456".to_owned()),
                created_at: Utc::now(),
            });
            provider.install_session(user.clone(), live_session());

            let store = AuthStateStore::new();
            store.bootstrap(&provider).await;

            let snapshot = store.snapshot();
            assert!(!snapshot.loading);
            assert!(snapshot.is_authenticated());
            assert_eq!(snapshot.profile.unwrap().oab_number.unwrap(), "SP123456");
        }

        #[tokio::test]
        async fn test_bootstrap_failure_clears_loading() {
            let provider = MockIdentityProvider::new();
            provider.fail_next_with(AuthError::Provider("network".to_owned()));

            let store = AuthStateStore::new();
            store.bootstrap(&provider).await;

            let snapshot = store.snapshot();
            assert!(!snapshot.loading);
            assert!(snapshot.user.is_none());
            assert!(snapshot.session.is_none());
        }

        #[tokio::test]
        async fn test_loading_never_reverts() {
            let provider = MockIdentityProvider::new();
            let store = AuthStateStore::new();
            store.bootstrap(&provider).await;
            assert!(!store.snapshot().loading);

            store.apply(AuthChange::SignedIn {
                user: test_user(),
                session: live_session(),
            });
            assert!(!store.snapshot().loading);

            store.apply(AuthChange::SignedOut);
            assert!(!store.snapshot().loading);
        }
    }
}
