use async_trait::async_trait;

use super::AuthEvent;

/// Receives dispatched auth events.
///
/// Listeners run sequentially in registration order on the dispatching
/// task; keep handlers short.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    async fn handle(&self, event: &AuthEvent);
}
