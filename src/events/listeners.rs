//! Built-in listeners.

use async_trait::async_trait;

use super::{AuthEvent, Listener};

/// Logs every event through the `log` facade.
#[derive(Debug, Clone, Default)]
pub struct LoggingListener;

impl LoggingListener {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Listener for LoggingListener {
    async fn handle(&self, event: &AuthEvent) {
        match event {
            AuthEvent::SignInFailed { email, reason, .. } => {
                log::warn!(
                    target: "chambers_auth",
                    "msg=\"event\", name=\"{}\", email=\"{}\", reason=\"{}\"",
                    event.name(),
                    email,
                    reason
                );
            }
            _ => {
                log::info!(
                    target: "chambers_auth",
                    "msg=\"event\", name=\"{}\", at={}",
                    event.name(),
                    event.timestamp()
                );
            }
        }
    }
}
