use async_trait::async_trait;
use dockyard_core::crd::HarborRegistry;
use dockyard_core::{HarborSpec, ResourceStatus};
use dockyard_harbor::{HarborClient, Registry, RegistryReq, Result as HarborResult, parse_base_url};
use kube::ResourceExt;

use super::names_match;
use crate::diff::{FieldChange, FieldDiff};
use crate::engine::HarborResource;
use crate::error::{ReconcileError, Result};
use crate::secrets::SecretResolver;
use crate::store::Store;

#[async_trait]
impl HarborResource for HarborRegistry {
    type Payload = RegistryReq;
    type Remote = Registry;
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
        if self.spec.registry_type.trim().is_empty() {
            return Err(ReconcileError::InvalidSpec("registry type is required".to_string()));
        }
        parse_base_url(&self.spec.url).map_err(|e| ReconcileError::InvalidSpec(e.to_string()))?;
        Ok(())
    }

    fn apply_defaults(&mut self) {
        if self.spec.name.is_empty() {
            self.spec.name = self.name_any();
        }
    }

    async fn resolve_parent<S: Store>(&self, _store: &S) -> Result<()> {
        Ok(())
    }

    async fn find_existing(&self, harbor: &HarborClient, _parent: &()) -> HarborResult<Option<i64>> {
        let registries = harbor.list_registries().await?;
        Ok(registries
            .into_iter()
            .find(|r| names_match(&r.name, &self.spec.name))
            .map(|r| r.id))
    }

    async fn build_payload(
        &self,
        _harbor: &HarborClient,
        _parent: &(),
        _secrets: &dyn SecretResolver,
    ) -> Result<RegistryReq> {
        Ok(RegistryReq {
            url: self.spec.url.clone(),
            name: self.spec.name.clone(),
            description: self.spec.description.clone(),
            registry_type: self.spec.registry_type.clone(),
            insecure: self.spec.insecure,
        })
    }

    async fn fetch(&self, harbor: &HarborClient, _parent: &(), id: i64) -> HarborResult<Registry> {
        harbor.get_registry(id).await
    }

    async fn create(&self, harbor: &HarborClient, _parent: &(), payload: &RegistryReq) -> HarborResult<i64> {
        harbor.create_registry(payload).await
    }

    async fn update(
        &self,
        harbor: &HarborClient,
        _parent: &(),
        id: i64,
        payload: &RegistryReq,
    ) -> HarborResult<()> {
        harbor.update_registry(id, payload).await
    }

    async fn delete(&self, harbor: &HarborClient, _parent: &(), id: i64) -> HarborResult<()> {
        harbor.delete_registry(id).await
    }

    fn diff(&self, desired: &RegistryReq, remote: &Registry) -> Vec<FieldChange> {
        FieldDiff::new()
            .field("name", remote.name.as_str(), desired.name.as_str())
            .field(
                "url",
                remote.url.trim_end_matches('/'),
                desired.url.trim_end_matches('/'),
            )
            .field("description", remote.description.as_str(), desired.description.as_str())
            .ignore_case("type", &remote.registry_type, &desired.registry_type)
            .field("insecure", &remote.insecure, &desired.insecure)
            .into_changes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::fixtures::meta;
    use dockyard_core::crd::HarborRegistrySpec;

    fn registry() -> HarborRegistry {
        HarborRegistry {
            metadata: meta("dockerhub"),
            spec: HarborRegistrySpec {
                connection_ref: "harbor".to_string(),
                adopt_existing: false,
                drift_detection_interval: None,
                name: String::new(),
                url: "https://hub.docker.com".to_string(),
                registry_type: "docker-hub".to_string(),
                description: "Docker Hub".to_string(),
                insecure: false,
            },
            status: None,
        }
    }

    fn remote() -> Registry {
        Registry {
            id: 7,
            name: "dockerhub".to_string(),
            url: "https://hub.docker.com/".to_string(),
            description: "Docker Hub".to_string(),
            registry_type: "DOCKER-HUB".to_string(),
            insecure: false,
        }
    }

    #[test]
    fn test_defaults_name_from_metadata() {
        let mut obj = registry();
        obj.apply_defaults();
        assert_eq!(obj.spec.name, "dockerhub");

        obj.spec.name = "hub".to_string();
        obj.apply_defaults();
        assert_eq!(obj.spec.name, "hub");
    }

    #[test]
    fn test_validate_rejects_relative_url() {
        let mut obj = registry();
        obj.spec.url = "hub.docker.com".to_string();
        assert_eq!(obj.validate().unwrap_err().reason(), "InvalidSpec");
    }

    #[tokio::test]
    async fn test_diff_ignores_type_case_and_trailing_slash() {
        let mut obj = registry();
        obj.apply_defaults();
        let harbor = HarborClient::new("https://harbor.example.com", None).unwrap();
        let payload = obj
            .build_payload(&harbor, &(), &crate::secrets::MockSecrets::new())
            .await
            .unwrap();

        assert!(obj.diff(&payload, &remote()).is_empty());

        let mut drifted = remote();
        drifted.insecure = true;
        drifted.description = "edited in the UI".to_string();
        let fields: Vec<&str> = obj.diff(&payload, &drifted).iter().map(|c| c.field).collect();
        assert_eq!(fields, vec!["description", "insecure"]);
    }
}
