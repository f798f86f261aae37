//! Auth transition actions.
//!
//! One struct per operation, generic over the provider seam, holding the
//! shared state store and the storage pair. Every action brackets the
//! provider call with the cleanup/ordering guarantees the lifecycle needs:
//! cleanup BEFORE a new sign-in or sign-up, cleanup AFTER a sign-out or
//! reset no matter what the remote side said.

mod force_reset;
mod sign_in;
mod sign_out;
mod sign_up;

pub use force_reset::ForceResetAction;
pub use sign_in::SignInAction;
pub use sign_out::SignOutAction;
pub use sign_up::SignUpAction;
