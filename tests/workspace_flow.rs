//! End-to-end tests for workspace creation and capability resolution.

#![cfg(feature = "mocks")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use uuid::Uuid;

use chambers_auth::workspace::{
    CreateWorkspace, CreateWorkspaceAction, MembershipRepository, MockMembershipRepository,
    MockWorkspaceContextRepository, MockWorkspaceRepository, WorkspaceContext,
    WorkspaceRepository,
};
use chambers_auth::{AuthError, CapabilitySet, MemberRole, MemberStatus};

struct Fixture {
    workspace_repo: MockWorkspaceRepository,
    membership_repo: MockMembershipRepository,
    context_repo: MockWorkspaceContextRepository,
}

impl Fixture {
    fn new() -> Self {
        Self {
            workspace_repo: MockWorkspaceRepository::new(),
            membership_repo: MockMembershipRepository::new(),
            context_repo: MockWorkspaceContextRepository::new(),
        }
    }

    fn create_action(&self) -> CreateWorkspaceAction<MockWorkspaceRepository, MockMembershipRepository> {
        CreateWorkspaceAction::new(self.workspace_repo.clone(), self.membership_repo.clone())
    }

    fn context(
        &self,
    ) -> WorkspaceContext<
        MockWorkspaceRepository,
        MockMembershipRepository,
        MockWorkspaceContextRepository,
    > {
        WorkspaceContext::new(
            self.workspace_repo.clone(),
            self.membership_repo.clone(),
            self.context_repo.clone(),
        )
    }
}

#[tokio::test]
async fn workspace_creation_writes_owner_membership_atomically() {
    let fixture = Fixture::new();
    let owner_id = Uuid::new_v4();

    let (workspace, member) = fixture
        .create_action()
        .execute(CreateWorkspace {
            name: "Souza & Lima Advogados".to_owned(),
            owner_id,
        })
        .await
        .unwrap();

    assert_eq!(workspace.owner_id, owner_id);
    assert_eq!(member.user_id, owner_id);
    assert_eq!(member.role(), MemberRole::Owner);
    assert_eq!(member.status, MemberStatus::Active);
}

#[tokio::test]
async fn failed_membership_insert_fails_and_rolls_back() {
    let fixture = Fixture::new();
    fixture.membership_repo.fail_next_create();
    let owner_id = Uuid::new_v4();

    let result = fixture
        .create_action()
        .execute(CreateWorkspace {
            name: "Orphaned".to_owned(),
            owner_id,
        })
        .await;
    assert!(result.is_err(), "ownerless workspace must not be reported as created");

    // the orphan workspace row was rolled back
    let remaining = fixture.workspace_repo.find_by_owner(owner_id).await.unwrap();
    assert!(remaining.is_empty());

    // and the user resolves to no workspace at all
    let resolved = fixture.context().resolve(owner_id).await;
    assert_eq!(resolved.unwrap_err(), AuthError::NotFound);
}

#[tokio::test]
async fn created_workspace_resolves_with_owner_capabilities() {
    let fixture = Fixture::new();
    let owner_id = Uuid::new_v4();

    let (workspace, _) = fixture
        .create_action()
        .execute(CreateWorkspace {
            name: "Escritório Central".to_owned(),
            owner_id,
        })
        .await
        .unwrap();

    let active = fixture.context().resolve(owner_id).await.unwrap();
    assert_eq!(active.workspace.id, workspace.id);
    assert!(active.is_owner());
    assert!(active.capabilities.manage_workspace);
    assert!(active.capabilities.manage_members);
    assert!(active.capabilities.delete_workspace);
}

#[tokio::test]
async fn second_member_gets_the_member_tier() {
    let fixture = Fixture::new();
    let owner_id = Uuid::new_v4();
    let colleague_id = Uuid::new_v4();

    let (workspace, _) = fixture
        .create_action()
        .execute(CreateWorkspace {
            name: "Escritório Central".to_owned(),
            owner_id,
        })
        .await
        .unwrap();

    fixture
        .membership_repo
        .create(chambers_auth::workspace::CreateMember {
            workspace_id: workspace.id,
            user_id: colleague_id,
            role: "editor".to_owned(),
            status: MemberStatus::Active,
            permissions: None,
        })
        .await
        .unwrap();

    let active = fixture.context().resolve(colleague_id).await.unwrap();
    assert_eq!(active.role, MemberRole::Editor);
    assert!(!active.is_owner());
    assert!(!active.capabilities.manage_workspace);
    assert!(!active.capabilities.delete_workspace);
    assert!(active.capabilities.manage_clients);
    assert!(active.capabilities.manage_deadlines);
}

#[tokio::test]
async fn unknown_role_string_coerces_to_viewer() {
    let fixture = Fixture::new();
    let user_id = Uuid::new_v4();
    let owner_id = Uuid::new_v4();

    let (workspace, _) = fixture
        .create_action()
        .execute(CreateWorkspace {
            name: "Escritório Central".to_owned(),
            owner_id,
        })
        .await
        .unwrap();

    // a row written before the role scale was fixed
    fixture
        .membership_repo
        .create(chambers_auth::workspace::CreateMember {
            workspace_id: workspace.id,
            user_id,
            role: "superadmin".to_owned(),
            status: MemberStatus::Active,
            permissions: None,
        })
        .await
        .unwrap();

    let active = fixture.context().resolve(user_id).await.unwrap();
    assert_eq!(active.role, MemberRole::Viewer);
    assert_eq!(active.capabilities, CapabilitySet::for_role(MemberRole::Viewer));
    assert!(!active.capabilities.manage_members);
    assert!(active.capabilities.view_processes);
}

#[tokio::test]
async fn selecting_a_workspace_changes_resolution() {
    let fixture = Fixture::new();
    let user_id = Uuid::new_v4();

    let (first, _) = fixture
        .create_action()
        .execute(CreateWorkspace {
            name: "Primeiro".to_owned(),
            owner_id: user_id,
        })
        .await
        .unwrap();
    let (second, _) = fixture
        .create_action()
        .execute(CreateWorkspace {
            name: "Segundo".to_owned(),
            owner_id: user_id,
        })
        .await
        .unwrap();

    fixture.context().select(user_id, second.id).await.unwrap();
    let active = fixture.context().resolve(user_id).await.unwrap();
    assert_eq!(active.workspace.id, second.id);

    fixture.context().select(user_id, first.id).await.unwrap();
    let active = fixture.context().resolve(user_id).await.unwrap();
    assert_eq!(active.workspace.id, first.id);
}

#[tokio::test]
async fn selecting_a_foreign_workspace_is_forbidden() {
    let fixture = Fixture::new();
    let owner_id = Uuid::new_v4();
    let outsider_id = Uuid::new_v4();

    let (workspace, _) = fixture
        .create_action()
        .execute(CreateWorkspace {
            name: "Privado".to_owned(),
            owner_id,
        })
        .await
        .unwrap();

    let result = fixture.context().select(outsider_id, workspace.id).await;
    assert_eq!(result.unwrap_err(), AuthError::Forbidden);
}
