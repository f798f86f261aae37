use chrono::Utc;

use super::repository::{CreateMember, CreateWorkspace, MembershipRepository, WorkspaceRepository};
use super::types::{MemberRole, MemberStatus, Workspace, WorkspaceMember};
use crate::events::{dispatch, AuthEvent};
use crate::AuthError;

/// Creates a workspace together with its owner membership.
///
/// The tenant store has no client-side transactions, so this action
/// enforces the atomicity contract itself: if the membership insert fails
/// the freshly created workspace is deleted (best-effort) and the whole
/// operation reports failure. An ownerless workspace is never handed back
/// to the caller.
pub struct CreateWorkspaceAction<W, M>
where
    W: WorkspaceRepository,
    M: MembershipRepository,
{
    workspace_repo: W,
    membership_repo: M,
}

impl<W: WorkspaceRepository, M: MembershipRepository> CreateWorkspaceAction<W, M> {
    pub fn new(workspace_repo: W, membership_repo: M) -> Self {
        Self {
            workspace_repo,
            membership_repo,
        }
    }

    /// # Returns
    ///
    /// - `Ok((workspace, owner_membership))` - both rows written
    /// - `Err(_)` - either write failed; no usable workspace remains
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "create_workspace", skip_all, err)
    )]
    pub async fn execute(
        &self,
        data: CreateWorkspace,
    ) -> Result<(Workspace, WorkspaceMember), AuthError> {
        let owner_id = data.owner_id;
        let workspace = self.workspace_repo.create(data).await?;

        let membership = CreateMember {
            workspace_id: workspace.id,
            user_id: owner_id,
            role: MemberRole::Owner.as_str().to_owned(),
            status: MemberStatus::Active,
            permissions: None,
        };

        let member = match self.membership_repo.create(membership).await {
            Ok(member) => member,
            Err(err) => {
                log::error!(
                    target: "chambers_auth",
                    "msg=\"owner membership insert failed, rolling back workspace\", workspace_id={}, error=\"{}\"",
                    workspace.id,
                    err
                );
                if let Err(rollback_err) = self.workspace_repo.delete(workspace.id).await {
                    log::error!(
                        target: "chambers_auth",
                        "msg=\"workspace rollback failed\", workspace_id={}, error=\"{}\"",
                        workspace.id,
                        rollback_err
                    );
                }
                return Err(err);
            }
        };

        dispatch(AuthEvent::WorkspaceCreated {
            workspace_id: workspace.id,
            owner_id,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "chambers_auth",
            "msg=\"workspace created\", workspace_id={}, owner_id={}",
            workspace.id,
            owner_id
        );

        Ok((workspace, member))
    }
}
