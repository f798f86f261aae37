use async_trait::async_trait;
use uuid::Uuid;

use super::types::{MemberStatus, Workspace, WorkspaceMember};
use crate::AuthError;

#[derive(Debug, Clone)]
pub struct CreateWorkspace {
    pub name: String,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct CreateMember {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub status: MemberStatus,
    pub permissions: Option<serde_json::Value>,
}

#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn create(&self, data: CreateWorkspace) -> Result<Workspace, AuthError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, AuthError>;
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Workspace>, AuthError>;
    async fn delete(&self, id: Uuid) -> Result<(), AuthError>;
}

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn create(&self, data: CreateMember) -> Result<WorkspaceMember, AuthError>;
    async fn find_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMember>, AuthError>;
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<WorkspaceMember>, AuthError>;
    async fn update_role(&self, id: Uuid, role: &str) -> Result<WorkspaceMember, AuthError>;
    async fn delete(&self, id: Uuid) -> Result<(), AuthError>;
}

/// Tracks each user's currently selected workspace.
#[async_trait]
pub trait WorkspaceContextRepository: Send + Sync {
    async fn get_current(&self, user_id: Uuid) -> Result<Option<Uuid>, AuthError>;
    async fn set_current(&self, user_id: Uuid, workspace_id: Uuid) -> Result<(), AuthError>;
    async fn clear(&self, user_id: Uuid) -> Result<(), AuthError>;
}
