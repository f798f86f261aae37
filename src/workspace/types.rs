//! Core workspace types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A workspace groups one law office's clients, processes and members.
///
/// Every workspace has exactly one owner: the membership row with role
/// `owner` is written in the same operation that creates the workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    /// User id of the creator, the single owner.
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership role on the ordered capability scale.
///
/// Stored as a string; anything outside this set coerces to `Viewer`
/// rather than being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(Self::Owner),
            "admin" => Some(Self::Admin),
            "editor" => Some(Self::Editor),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }

    /// Parses a stored role string, coercing unknown values to the least
    /// privileged role.
    pub fn parse_or_viewer(s: &str) -> Self {
        Self::from_str(s).unwrap_or(Self::Viewer)
    }
}

/// Membership lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Pending,
    Suspended,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Suspended => "suspended",
        }
    }
}

/// Links a user to a workspace.
///
/// `role` stays a string at the storage boundary and is parsed on read;
/// `permissions` is the free-form overlay some rows carry, opaque to the
/// capability derivation today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceMember {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub permissions: Option<serde_json::Value>,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkspaceMember {
    /// The stored role, if it is one of the known values.
    pub fn parse_role(&self) -> Option<MemberRole> {
        MemberRole::from_str(&self.role)
    }

    /// The effective role: unknown strings resolve to `Viewer`.
    pub fn role(&self) -> MemberRole {
        MemberRole::parse_or_viewer(&self.role)
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}
