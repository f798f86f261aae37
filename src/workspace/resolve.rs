use uuid::Uuid;

use super::capabilities::CapabilitySet;
use super::repository::{
    MembershipRepository, WorkspaceContextRepository, WorkspaceRepository,
};
use super::types::{MemberRole, Workspace, WorkspaceMember};
use crate::AuthError;

/// The resolved workspace view handed to feature pages: the workspace,
/// the caller's membership, the coerced role and the derived capabilities.
#[derive(Debug, Clone)]
pub struct ActiveWorkspace {
    pub workspace: Workspace,
    pub membership: WorkspaceMember,
    pub role: MemberRole,
    pub capabilities: CapabilitySet,
}

impl ActiveWorkspace {
    pub fn is_owner(&self) -> bool {
        self.role == MemberRole::Owner
    }
}

/// Resolves the caller's active workspace once authentication settles.
///
/// The selected workspace comes from the context repository; a user who
/// never selected one falls back to their first membership. Capabilities
/// are recomputed on every resolve, never cached.
pub struct WorkspaceContext<W, M, C>
where
    W: WorkspaceRepository,
    M: MembershipRepository,
    C: WorkspaceContextRepository,
{
    workspace_repo: W,
    membership_repo: M,
    context_repo: C,
}

impl<W, M, C> WorkspaceContext<W, M, C>
where
    W: WorkspaceRepository,
    M: MembershipRepository,
    C: WorkspaceContextRepository,
{
    pub fn new(workspace_repo: W, membership_repo: M, context_repo: C) -> Self {
        Self {
            workspace_repo,
            membership_repo,
            context_repo,
        }
    }

    /// Resolves the active workspace for `user_id`.
    ///
    /// # Returns
    ///
    /// - `Ok(active)` - workspace, membership, role and capabilities
    /// - `Err(AuthError::NotFound)` - the user has no membership anywhere,
    ///   or the selected workspace no longer exists
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "resolve_workspace", skip_all, err)
    )]
    pub async fn resolve(&self, user_id: Uuid) -> Result<ActiveWorkspace, AuthError> {
        let membership = match self.selected_membership(user_id).await? {
            Some(membership) => membership,
            None => self
                .membership_repo
                .find_by_user(user_id)
                .await?
                .into_iter()
                .next()
                .ok_or(AuthError::NotFound)?,
        };

        let workspace = self
            .workspace_repo
            .find_by_id(membership.workspace_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        let role = membership.role();
        let capabilities = CapabilitySet::for_role(role);

        log::debug!(
            target: "chambers_auth",
            "msg=\"workspace resolved\", workspace_id={}, user_id={}, role=\"{}\"",
            workspace.id,
            user_id,
            role.as_str()
        );

        Ok(ActiveWorkspace {
            workspace,
            membership,
            role,
            capabilities,
        })
    }

    /// Selects `workspace_id` as the user's current workspace.
    ///
    /// Fails with `Forbidden` when the user is not a member there.
    pub async fn select(&self, user_id: Uuid, workspace_id: Uuid) -> Result<(), AuthError> {
        let membership = self
            .membership_repo
            .find_by_workspace_and_user(workspace_id, user_id)
            .await?;
        if membership.is_none() {
            return Err(AuthError::Forbidden);
        }
        self.context_repo.set_current(user_id, workspace_id).await
    }

    async fn selected_membership(
        &self,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMember>, AuthError> {
        let Some(workspace_id) = self.context_repo.get_current(user_id).await? else {
            return Ok(None);
        };
        self.membership_repo
            .find_by_workspace_and_user(workspace_id, user_id)
            .await
    }
}
