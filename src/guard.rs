//! Route guard state machine.
//!
//! Gates protected views on the auth store: a blocking placeholder while
//! the first snapshot is pending, the guarded content once a user is
//! present, and a single history-replacing redirect to the auth entry
//! point otherwise. Transitions are one-directional per guard instance;
//! re-evaluation after `Unauthenticated` requires a fresh guard (the
//! remount).

use std::sync::atomic::{AtomicBool, Ordering};

use crate::store::AuthSnapshot;

/// Navigation capability consumed by the guard and the forced reset.
pub trait Navigator: Send + Sync {
    /// Navigate to `path`; with `replace` the current history entry is
    /// replaced so no guarded screen is left reachable via back-navigation.
    fn navigate(&self, path: &str, replace: bool);
}

/// Resolved guard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Initializing,
    Authenticated,
    Unauthenticated,
}

/// What the caller should render for the current evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Loading: render the blocking placeholder.
    Placeholder,
    /// Authenticated: render the guarded content.
    Render,
    /// Redirect pending or issued: render nothing.
    Nothing,
}

/// One guard instance per mount of a protected route.
pub struct RouteGuard<N: Navigator> {
    navigator: N,
    auth_entry_path: String,
    settled: std::sync::RwLock<Option<GuardState>>,
    redirected: AtomicBool,
}

impl<N: Navigator> RouteGuard<N> {
    pub fn new(navigator: N, auth_entry_path: impl Into<String>) -> Self {
        Self {
            navigator,
            auth_entry_path: auth_entry_path.into(),
            settled: std::sync::RwLock::new(None),
            redirected: AtomicBool::new(false),
        }
    }

    /// The latched state, if the guard has settled.
    pub fn state(&self) -> GuardState {
        self.settled
            .read()
            .ok()
            .and_then(|s| *s)
            .unwrap_or(GuardState::Initializing)
    }

    /// Evaluates the snapshot. Until `loading` clears this never navigates;
    /// the first settled evaluation latches the outcome for the lifetime of
    /// the guard.
    pub fn evaluate(&self, snapshot: &AuthSnapshot) -> GuardDecision {
        if let Some(settled) = self.settled.read().ok().and_then(|s| *s) {
            return match settled {
                GuardState::Initializing => GuardDecision::Placeholder,
                GuardState::Authenticated => GuardDecision::Render,
                GuardState::Unauthenticated => GuardDecision::Nothing,
            };
        }

        if snapshot.loading {
            return GuardDecision::Placeholder;
        }

        if snapshot.user.is_some() {
            self.settle(GuardState::Authenticated);
            return GuardDecision::Render;
        }

        self.settle(GuardState::Unauthenticated);
        if !self.redirected.swap(true, Ordering::SeqCst) {
            log::info!(
                target: "chambers_auth",
                "msg=\"unauthenticated, redirecting\", to=\"{}\"",
                self.auth_entry_path
            );
            self.navigator.navigate(&self.auth_entry_path, true);
        }
        GuardDecision::Nothing
    }

    fn settle(&self, state: GuardState) {
        if let Ok(mut settled) = self.settled.write() {
            settled.get_or_insert(state);
        }
    }
}

#[cfg(feature = "mocks")]
pub use mock::MockNavigator;

#[cfg(feature = "mocks")]
mod mock {
    use std::sync::{Arc, RwLock};

    use super::Navigator;

    /// Records navigations for assertions.
    #[derive(Clone, Default)]
    pub struct MockNavigator {
        calls: Arc<RwLock<Vec<(String, bool)>>>,
    }

    impl MockNavigator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<(String, bool)> {
            self.calls.read().map(|c| c.clone()).unwrap_or_default()
        }
    }

    impl Navigator for MockNavigator {
        fn navigate(&self, path: &str, replace: bool) {
            if let Ok(mut calls) = self.calls.write() {
                calls.push((path.to_owned(), replace));
            }
        }
    }
}
