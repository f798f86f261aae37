use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Events emitted by the auth and workspace actions.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignInSuccess {
        user_id: Uuid,
        email: String,
        at: DateTime<Utc>,
    },
    SignInFailed {
        email: String,
        reason: String,
        at: DateTime<Utc>,
    },
    SignUpSuccess {
        user_id: Uuid,
        email: String,
        at: DateTime<Utc>,
    },
    SignedOut {
        scope: &'static str,
        at: DateTime<Utc>,
    },
    ResetForced {
        at: DateTime<Utc>,
    },
    SessionRefreshed {
        user_id: Uuid,
        at: DateTime<Utc>,
    },
    WorkspaceCreated {
        workspace_id: Uuid,
        owner_id: Uuid,
        at: DateTime<Utc>,
    },
}

impl AuthEvent {
    /// Dot-separated event name for logging and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SignInSuccess { .. } => "auth.sign_in.success",
            Self::SignInFailed { .. } => "auth.sign_in.failed",
            Self::SignUpSuccess { .. } => "auth.sign_up.success",
            Self::SignedOut { .. } => "auth.sign_out",
            Self::ResetForced { .. } => "auth.reset_forced",
            Self::SessionRefreshed { .. } => "auth.session.refreshed",
            Self::WorkspaceCreated { .. } => "workspace.created",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SignInSuccess { at, .. }
            | Self::SignInFailed { at, .. }
            | Self::SignUpSuccess { at, .. }
            | Self::SignedOut { at, .. }
            | Self::ResetForced { at }
            | Self::SessionRefreshed { at, .. }
            | Self::WorkspaceCreated { at, .. } => *at,
        }
    }
}
