//! Residual identity artifact cleanup.
//!
//! The provider SDK caches its session under reserved key names in both
//! browser stores, and the application adds a few keys of its own. Stale
//! copies of either cause token collisions on the next sign-in, so every
//! auth transition purges them first.

use crate::storage::{KeyStorage, StoragePair};

/// Key-matching policy for [`cleanup_auth_state`].
///
/// The provider's key naming convention is not under our control and has
/// changed before, so the whole match lives behind this one struct instead
/// of being scattered through the actions.
#[derive(Debug, Clone)]
pub struct CleanupPolicy {
    /// Provider-reserved key prefix.
    pub key_prefix: String,
    /// Provider-reserved token that may appear anywhere in a key.
    pub key_substring: String,
    /// Application-owned keys that must also go.
    pub exact_keys: Vec<String>,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            key_prefix: "supabase.auth.".to_owned(),
            key_substring: "sb-".to_owned(),
            exact_keys: vec![
                "workspace_id".to_owned(),
                "current_workspace".to_owned(),
                "user_profile".to_owned(),
                "auth_token".to_owned(),
                "refresh_token".to_owned(),
            ],
        }
    }
}

impl CleanupPolicy {
    /// Whether a key holds a cached identity artifact.
    pub fn matches(&self, key: &str) -> bool {
        key.starts_with(&self.key_prefix)
            || key.contains(&self.key_substring)
            || self.exact_keys.iter().any(|k| k == key)
    }
}

/// Removes every matching key from both stores. Best-effort and idempotent:
/// storage failures are logged and swallowed, an absent session store is
/// skipped, and a second run over clean stores removes nothing.
///
/// Returns the number of keys removed.
pub fn cleanup_auth_state(policy: &CleanupPolicy, storages: &StoragePair) -> usize {
    let mut removed = purge(policy, storages.persistent.as_ref());
    if let Some(session) = &storages.session {
        removed += purge(policy, session.as_ref());
    }

    log::debug!(
        target: "chambers_auth",
        "msg=\"auth state cleanup\", removed={}",
        removed
    );

    removed
}

fn purge(policy: &CleanupPolicy, storage: &dyn KeyStorage) -> usize {
    let keys = match storage.keys() {
        Ok(keys) => keys,
        Err(err) => {
            log::debug!(
                target: "chambers_auth",
                "msg=\"cleanup skipped storage\", error=\"{}\"",
                err
            );
            return 0;
        }
    };

    let mut removed = 0;
    for key in keys {
        if !policy.matches(&key) {
            continue;
        }
        match storage.remove(&key) {
            Ok(()) => removed += 1,
            Err(err) => {
                log::debug!(
                    target: "chambers_auth",
                    "msg=\"cleanup failed to remove key\", key=\"{}\", error=\"{}\"",
                    key,
                    err
                );
            }
        }
    }
    removed
}
