use async_trait::async_trait;
use dockyard_core::crd::{HarborMember, HarborProject};
use dockyard_core::{HarborSpec, ResourceStatus};
use dockyard_harbor::{
    ENTITY_GROUP, ENTITY_USER, HarborClient, Member, MemberReq, Result as HarborResult,
    RoleRequest, UserEntity, UserGroup,
};
use kube::ResourceExt;

use super::names_match;
use crate::diff::{FieldChange, FieldDiff};
use crate::engine::HarborResource;
use crate::error::{ReconcileError, Result};
use crate::secrets::SecretResolver;
use crate::store::Store;

/// Harbor entity type and name of the declared identity
fn identity(member: &HarborMember) -> Option<(&'static str, &str)> {
    match (&member.spec.user, &member.spec.group) {
        (Some(user), None) => Some((ENTITY_USER, user.username.as_str())),
        (None, Some(group)) => Some((ENTITY_GROUP, group.group_name.as_str())),
        _ => None,
    }
}

/// Members live under a project; the parent is the project's Harbor ID
#[async_trait]
impl HarborResource for HarborMember {
    type Payload = MemberReq;
    type Remote = Member;
    type Parent = i64;

    fn settings(&self) -> &(dyn HarborSpec + Sync) {
        &self.spec
    }

    fn status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn status_mut(&mut self) -> &mut ResourceStatus {
        self.status.get_or_insert_with(ResourceStatus::default)
    }

    fn validate(&self) -> Result<()> {
        let Some((_, name)) = identity(self) else {
            return Err(ReconcileError::InvalidSpec(
                "exactly one of user and group must be set".to_string(),
            ));
        };
        if name.trim().is_empty() {
            return Err(ReconcileError::InvalidSpec("member name is empty".to_string()));
        }
        if self.spec.project_ref.is_empty() {
            return Err(ReconcileError::InvalidSpec("projectRef is required".to_string()));
        }
        Ok(())
    }

    async fn resolve_parent<S: Store>(&self, store: &S) -> Result<i64> {
        let namespace = self.namespace().unwrap_or_default();
        let project_ref = &self.spec.project_ref;

        let project: HarborProject = store
            .get(&namespace, project_ref)
            .await?
            .ok_or_else(|| {
                ReconcileError::DependencyNotReady(format!(
                    "HarborProject '{}' not found",
                    project_ref
                ))
            })?;

        project
            .status
            .as_ref()
            .and_then(ResourceStatus::known_remote_id)
            .ok_or_else(|| {
                ReconcileError::DependencyNotReady(format!(
                    "HarborProject '{}' has no Harbor ID yet",
                    project_ref
                ))
            })
    }

    async fn find_existing(&self, harbor: &HarborClient, project_id: &i64) -> HarborResult<Option<i64>> {
        let Some((entity_type, name)) = identity(self) else {
            return Ok(None);
        };

        let members = harbor.list_members(*project_id).await?;
        Ok(members
            .into_iter()
            .filter(|m| m.entity_type == entity_type)
            .find(|m| names_match(&m.entity_name, name))
            .map(|m| m.id))
    }

    async fn build_payload(
        &self,
        _harbor: &HarborClient,
        _project_id: &i64,
        _secrets: &dyn SecretResolver,
    ) -> Result<MemberReq> {
        Ok(MemberReq {
            role_id: self.spec.role.role_id(),
            member_user: self.spec.user.as_ref().map(|u| UserEntity {
                username: u.username.clone(),
            }),
            member_group: self.spec.group.as_ref().map(|g| UserGroup {
                group_name: g.group_name.clone(),
                group_type: g.group_type.type_id(),
                ldap_group_dn: g.ldap_group_dn.clone(),
            }),
        })
    }

    async fn fetch(&self, harbor: &HarborClient, project_id: &i64, id: i64) -> HarborResult<Member> {
        harbor.get_member(*project_id, id).await
    }

    async fn create(&self, harbor: &HarborClient, project_id: &i64, payload: &MemberReq) -> HarborResult<i64> {
        harbor.create_member(*project_id, payload).await
    }

    // Only the role of an existing membership can change
    async fn update(
        &self,
        harbor: &HarborClient,
        project_id: &i64,
        id: i64,
        payload: &MemberReq,
    ) -> HarborResult<()> {
        let role = RoleRequest {
            role_id: payload.role_id,
        };
        harbor.update_member(*project_id, id, &role).await
    }

    async fn delete(&self, harbor: &HarborClient, project_id: &i64, id: i64) -> HarborResult<()> {
        harbor.delete_member(*project_id, id).await
    }

    fn diff(&self, desired: &MemberReq, remote: &Member) -> Vec<FieldChange> {
        FieldDiff::new()
            .field("role_id", &remote.role_id, &desired.role_id)
            .into_changes()
    }
}
