//! Capability derivation.
//!
//! A pure function of the member's role, recomputed on demand and never
//! persisted. The model is two-tier: ownership gates the three workspace
//! management capabilities, every member gets the feature capabilities.
//! The richer admin/editor/viewer scale is stored on the membership row
//! but not consulted here yet.

use serde::{Deserialize, Serialize};

use super::types::{MemberRole, WorkspaceMember};

/// The fixed table of named boolean capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    // owner-only
    pub manage_workspace: bool,
    pub manage_members: bool,
    pub delete_workspace: bool,

    // granted to every member
    pub view_clients: bool,
    pub manage_clients: bool,
    pub view_processes: bool,
    pub manage_processes: bool,
    pub view_deadlines: bool,
    pub manage_deadlines: bool,
    pub view_financial: bool,
    pub manage_financial: bool,
    pub view_documents: bool,
    pub manage_documents: bool,
}

impl CapabilitySet {
    /// Derives capabilities from ownership.
    pub fn from_owner(is_owner: bool) -> Self {
        Self {
            manage_workspace: is_owner,
            manage_members: is_owner,
            delete_workspace: is_owner,
            view_clients: true,
            manage_clients: true,
            view_processes: true,
            manage_processes: true,
            view_deadlines: true,
            manage_deadlines: true,
            view_financial: true,
            manage_financial: true,
            view_documents: true,
            manage_documents: true,
        }
    }

    /// Derives capabilities from a role on the stored scale.
    pub fn for_role(role: MemberRole) -> Self {
        Self::from_owner(role == MemberRole::Owner)
    }

    /// Derives capabilities from a membership row, coercing an unknown
    /// role string to `Viewer` first.
    pub fn from_membership(member: &WorkspaceMember) -> Self {
        Self::for_role(member.role())
    }
}
