//! Kubernetes API server store

use async_trait::async_trait;
use kube::api::{Api, Patch, PatchParams};
use kube::{Client, ResourceExt};
use serde_json::json;

use super::{Store, StoredObject, has_finalizer, status_of};
use crate::error::Result;

/// Store backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K: StoredObject>(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Merge-patch the finalizer list, guarded by the current resource version
    async fn patch_finalizers<K: StoredObject>(&self, obj: &mut K, finalizers: Vec<String>) -> Result<()> {
        let namespace = obj.namespace().unwrap_or_default();
        let name = obj.name_any();

        let patch = json!({
            "metadata": {
                "finalizers": finalizers,
                "resourceVersion": obj.resource_version(),
            }
        });

        let patched = self
            .api::<K>(&namespace)
            .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;

        *obj.meta_mut() = patched.meta().clone();
        Ok(())
    }
}

#[async_trait]
impl Store for KubeStore {
    async fn get<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        Ok(self.api::<K>(namespace).get_opt(name).await?)
    }

    async fn update_status<K: StoredObject>(&self, obj: &K) -> Result<()> {
        let namespace = obj.namespace().unwrap_or_default();
        let patch = json!({ "status": status_of(obj)? });

        self.api::<K>(&namespace)
            .patch_status(&obj.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
            .await?;

        Ok(())
    }

    async fn add_finalizer<K: StoredObject>(&self, obj: &mut K, finalizer: &str) -> Result<()> {
        if has_finalizer(obj, finalizer) {
            return Ok(());
        }

        let mut finalizers = obj.finalizers().to_vec();
        finalizers.push(finalizer.to_string());
        self.patch_finalizers(obj, finalizers).await
    }

    async fn remove_finalizer<K: StoredObject>(
        &self,
        obj: &mut K,
        finalizer: &str,
    ) -> Result<()> {
        if !has_finalizer(obj, finalizer) {
            return Ok(());
        }

        let finalizers = obj
            .finalizers()
            .iter()
            .filter(|f| f.as_str() != finalizer)
            .cloned()
            .collect();

        match self.patch_finalizers(obj, finalizers).await {
            // Object already gone once the last finalizer is released
            Err(e) if e.is_not_found() => Ok(()),
            other => other,
        }
    }
}
