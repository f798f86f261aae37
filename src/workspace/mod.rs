//! Workspaces: the tenant boundary scoping clients, processes, deadlines
//! and members, plus the capability derivation consumed by the UI.

mod capabilities;
mod create;
mod repository;
mod resolve;
mod types;

pub use capabilities::CapabilitySet;
pub use create::CreateWorkspaceAction;
pub use repository::{
    CreateMember, CreateWorkspace, MembershipRepository, WorkspaceContextRepository,
    WorkspaceRepository,
};
pub use resolve::{ActiveWorkspace, WorkspaceContext};
pub use types::{MemberRole, MemberStatus, Workspace, WorkspaceMember};

#[cfg(feature = "mocks")]
mod mocks;

#[cfg(feature = "mocks")]
pub use mocks::{
    MockMembershipRepository, MockWorkspaceContextRepository, MockWorkspaceRepository,
};
