//! Desired-state store
//!
//! The reconciliation engine reads declared objects and writes back their
//! status and finalizers through the [`Store`] trait:
//! - [`KubeStore`]: the Kubernetes API server
//! - [`MockStore`]: an in-memory store for tests

mod kube;
mod mock;

pub use self::kube::KubeStore;
pub use mock::{MockStore, OperationCounts};

use ::kube::Resource;
use ::kube::core::NamespaceResourceScope;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use crate::error::Result;

/// An object kind the store can hold
pub trait StoredObject:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<K> StoredObject for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// Read declared objects and persist what the engine observed
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch an object; `None` when it does not exist
    async fn get<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<Option<K>>;

    /// Persist the status subresource of `obj`
    async fn update_status<K: StoredObject>(&self, obj: &K) -> Result<()>;

    /// Add `finalizer` to the object's metadata, updating `obj` in place
    async fn add_finalizer<K: StoredObject>(&self, obj: &mut K, finalizer: &str) -> Result<()>;

    /// Remove `finalizer` from the object's metadata, updating `obj` in place
    async fn remove_finalizer<K: StoredObject>(&self, obj: &mut K, finalizer: &str)
    -> Result<()>;
}

/// Whether `obj` carries `finalizer`
pub fn has_finalizer<K: Resource>(obj: &K, finalizer: &str) -> bool {
    obj.meta()
        .finalizers
        .as_ref()
        .is_some_and(|f| f.iter().any(|x| x == finalizer))
}

/// The `status` field of a serialized object, `null` when absent
pub(crate) fn status_of<K: Serialize>(obj: &K) -> Result<serde_json::Value> {
    let value = serde_json::to_value(obj)?;
    Ok(value
        .get("status")
        .cloned()
        .unwrap_or(serde_json::Value::Null))
}
