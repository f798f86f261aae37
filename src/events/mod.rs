//! Event dispatch for auth transitions.
//!
//! Every action fires events. With no listeners registered, dispatch is a
//! no-op. Register listeners once at startup:
//!
//! ```rust,ignore
//! use chambers_auth::register_event_listeners;
//! use chambers_auth::events::listeners::LoggingListener;
//!
//! register_event_listeners(|registry| {
//!     registry.listen(LoggingListener::new());
//! });
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::AuthEvent;
pub use listener::Listener;
pub use registry::{dispatch, register_event_listeners, EventRegistry};
