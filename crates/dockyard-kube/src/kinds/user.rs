use async_trait::async_trait;
use dockyard_core::crd::HarborUser;
use dockyard_core::{HarborSpec, ResourceStatus};
use dockyard_harbor::{HarborClient, Result as HarborResult, User, UserCreationReq, UserProfile};
use kube::ResourceExt;

use super::names_match;
use crate::diff::{FieldChange, FieldDiff};
use crate::engine::HarborResource;
use crate::error::{ReconcileError, Result};
use crate::secrets::SecretResolver;
use crate::store::Store;

#[async_trait]
impl HarborResource for HarborUser {
    type Payload = UserCreationReq;
    type Remote = User;
    type Parent = ();

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
        if !self.spec.email.contains('@') {
            return Err(ReconcileError::InvalidSpec(format!(
                "email '{}' is not an address",
                self.spec.email
            )));
        }
        if self.spec.realname.trim().is_empty() {
            return Err(ReconcileError::InvalidSpec("realname is required".to_string()));
        }
        Ok(())
    }

    fn apply_defaults(&mut self) {
        if self.spec.username.is_empty() {
            self.spec.username = self.name_any();
        }
    }

    async fn resolve_parent<S: Store>(&self, _store: &S) -> Result<()> {
        Ok(())
    }

    async fn find_existing(&self, harbor: &HarborClient, _parent: &()) -> HarborResult<Option<i64>> {
        let users = harbor.list_users().await?;
        Ok(users
            .into_iter()
            .find(|u| names_match(&u.username, &self.spec.username))
            .map(|u| u.user_id))
    }

    async fn build_payload(
        &self,
        _harbor: &HarborClient,
        _parent: &(),
        secrets: &dyn SecretResolver,
    ) -> Result<UserCreationReq> {
        let password = match &self.spec.password_secret_ref {
            Some(secret) => {
                let namespace = self.namespace().unwrap_or_default();
                Some(secrets.resolve(&namespace, &secret.name, &secret.key).await?)
            }
            None => None,
        };

        Ok(UserCreationReq {
            email: self.spec.email.clone(),
            realname: self.spec.realname.clone(),
            comment: self.spec.comment.clone(),
            password,
            username: self.spec.username.clone(),
        })
    }

    async fn fetch(&self, harbor: &HarborClient, _parent: &(), id: i64) -> HarborResult<User> {
        harbor.get_user(id).await
    }

    async fn create(&self, harbor: &HarborClient, _parent: &(), payload: &UserCreationReq) -> HarborResult<i64> {
        harbor.create_user(payload).await
    }

    // The password is only set at creation
    async fn update(
        &self,
        harbor: &HarborClient,
        _parent: &(),
        id: i64,
        payload: &UserCreationReq,
    ) -> HarborResult<()> {
        let profile = UserProfile {
            email: payload.email.clone(),
            realname: payload.realname.clone(),
            comment: payload.comment.clone(),
        };
        harbor.update_user(id, &profile).await
    }

    async fn delete(&self, harbor: &HarborClient, _parent: &(), id: i64) -> HarborResult<()> {
        harbor.delete_user(id).await
    }

    fn diff(&self, desired: &UserCreationReq, remote: &User) -> Vec<FieldChange> {
        FieldDiff::new()
            .field("email", remote.email.as_str(), desired.email.as_str())
            .field("realname", remote.realname.as_str(), desired.realname.as_str())
            .field("comment", remote.comment.as_str(), desired.comment.as_str())
            .into_changes()
    }
}
