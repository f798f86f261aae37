#![allow(clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::repository::{
    CreateMember, CreateWorkspace, MembershipRepository, WorkspaceContextRepository,
    WorkspaceRepository,
};
use super::types::{Workspace, WorkspaceMember};
use crate::AuthError;

#[derive(Clone)]
pub struct MockWorkspaceRepository {
    workspaces: Arc<RwLock<HashMap<Uuid, Workspace>>>,
}

impl MockWorkspaceRepository {
    pub fn new() -> Self {
        Self {
            workspaces: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MockWorkspaceRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkspaceRepository for MockWorkspaceRepository {
    async fn create(&self, data: CreateWorkspace) -> Result<Workspace, AuthError> {
        let now = Utc::now();
        let workspace = Workspace {
            id: Uuid::new_v4(),
            name: data.name,
            owner_id: data.owner_id,
            created_at: now,
            updated_at: now,
        };

        let mut workspaces = self
            .workspaces
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        workspaces.insert(workspace.id, workspace.clone());

        Ok(workspace)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, AuthError> {
        let workspaces = self
            .workspaces
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(workspaces.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Workspace>, AuthError> {
        let workspaces = self
            .workspaces
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(workspaces
            .values()
            .filter(|w| w.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AuthError> {
        let mut workspaces = self
            .workspaces
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        workspaces.remove(&id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockMembershipRepository {
    memberships: Arc<RwLock<HashMap<Uuid, WorkspaceMember>>>,
    fail_next_create: Arc<AtomicBool>,
}

impl MockMembershipRepository {
    pub fn new() -> Self {
        Self {
            memberships: Arc::new(RwLock::new(HashMap::new())),
            fail_next_create: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The next `create` call fails, for exercising the workspace
    /// creation rollback path.
    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }
}

impl Default for MockMembershipRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MembershipRepository for MockMembershipRepository {
    async fn create(&self, data: CreateMember) -> Result<WorkspaceMember, AuthError> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(AuthError::Provider("membership insert rejected".into()));
        }

        let now = Utc::now();
        let member = WorkspaceMember {
            id: Uuid::new_v4(),
            workspace_id: data.workspace_id,
            user_id: data.user_id,
            role: data.role,
            permissions: data.permissions,
            status: data.status,
            created_at: now,
            updated_at: now,
        };

        let mut memberships = self
            .memberships
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        memberships.insert(member.id, member.clone());

        Ok(member)
    }

    async fn find_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMember>, AuthError> {
        let memberships = self
            .memberships
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(memberships
            .values()
            .find(|m| m.workspace_id == workspace_id && m.user_id == user_id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<WorkspaceMember>, AuthError> {
        let memberships = self
            .memberships
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        let mut found: Vec<WorkspaceMember> = memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        // stable order for the first-membership fallback
        found.sort_by_key(|m| m.created_at);
        Ok(found)
    }

    async fn update_role(&self, id: Uuid, role: &str) -> Result<WorkspaceMember, AuthError> {
        let mut memberships = self
            .memberships
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        let member = memberships.get_mut(&id).ok_or(AuthError::NotFound)?;
        role.clone_into(&mut member.role);
        member.updated_at = Utc::now();
        Ok(member.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AuthError> {
        let mut memberships = self
            .memberships
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        memberships.remove(&id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockWorkspaceContextRepository {
    current: Arc<RwLock<HashMap<Uuid, Uuid>>>,
}

impl MockWorkspaceContextRepository {
    pub fn new() -> Self {
        Self {
            current: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MockWorkspaceContextRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkspaceContextRepository for MockWorkspaceContextRepository {
    async fn get_current(&self, user_id: Uuid) -> Result<Option<Uuid>, AuthError> {
        let current = self
            .current
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(current.get(&user_id).copied())
    }

    async fn set_current(&self, user_id: Uuid, workspace_id: Uuid) -> Result<(), AuthError> {
        let mut current = self
            .current
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        current.insert(user_id, workspace_id);
        Ok(())
    }

    async fn clear(&self, user_id: Uuid) -> Result<(), AuthError> {
        let mut current = self
            .current
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        current.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::types::MemberStatus;

    #[tokio::test]
    async fn test_find_by_user_is_ordered_by_creation() {
        let repo = MockMembershipRepository::new();
        let user_id = Uuid::new_v4();

        for _ in 0..3 {
            repo.create(CreateMember {
                workspace_id: Uuid::new_v4(),
                user_id,
                role: "editor".to_owned(),
                status: MemberStatus::Active,
                permissions: None,
            })
            .await
            .unwrap();
        }

        let found = repo.find_by_user(user_id).await.unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn test_context_set_and_clear() {
        let repo = MockWorkspaceContextRepository::new();
        let user_id = Uuid::new_v4();
        let workspace_id = Uuid::new_v4();

        assert_eq!(repo.get_current(user_id).await.unwrap(), None);

        repo.set_current(user_id, workspace_id).await.unwrap();
        assert_eq!(repo.get_current(user_id).await.unwrap(), Some(workspace_id));

        repo.clear(user_id).await.unwrap();
        assert_eq!(repo.get_current(user_id).await.unwrap(), None);
    }
}
