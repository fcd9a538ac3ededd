//! Mock store for testing
//!
//! Objects are held in memory as JSON, keyed by kind, namespace and name, so
//! tests can seed declared state and inspect what the engine persisted
//! without a Kubernetes cluster.

use async_trait::async_trait;
use chrono::Utc;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::ResourceExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Store, StoredObject, has_finalizer, status_of};
use crate::error::{ReconcileError, Result};

/// (kind, namespace, name)
type ObjectKey = (String, String, String);

/// In-memory store for testing
#[derive(Clone, Default)]
pub struct MockStore {
    objects: Arc<RwLock<HashMap<ObjectKey, Value>>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
    /// When set, every operation fails with this message
    failure: Arc<RwLock<Option<String>>>,
    /// When set, only finalizer writes fail with this message
    finalizer_failure: Arc<RwLock<Option<String>>>,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub gets: usize,
    pub status_updates: usize,
    pub finalizer_adds: usize,
    pub finalizer_removes: usize,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

fn key_of<K: StoredObject>(namespace: &str, name: &str) -> ObjectKey {
    (
        K::kind(&()).to_string(),
        namespace.to_string(),
        name.to_string(),
    )
}

impl MockStore {
    /// Create a new empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an object
    pub fn insert<K: StoredObject>(&self, obj: &K) -> Result<()> {
        let key = key_of::<K>(&obj.namespace().unwrap_or_default(), &obj.name_any());
        write(&self.objects).insert(key, serde_json::to_value(obj)?);
        Ok(())
    }

    /// Read an object back, as the engine last left it
    pub fn object<K: StoredObject>(&self, namespace: &str, name: &str) -> Option<K> {
        read(&self.objects)
            .get(&key_of::<K>(namespace, name))
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Whether an object exists
    pub fn contains<K: StoredObject>(&self, namespace: &str, name: &str) -> bool {
        read(&self.objects).contains_key(&key_of::<K>(namespace, name))
    }

    /// Request deletion: the object stays until its finalizers are released
    pub fn mark_deleted<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<()> {
        let Some(mut obj) = self.object::<K>(namespace, name) else {
            return Ok(());
        };

        if obj.finalizers().is_empty() {
            write(&self.objects).remove(&key_of::<K>(namespace, name));
            return Ok(());
        }

        obj.meta_mut().deletion_timestamp = Some(Time(Utc::now()));
        self.insert(&obj)
    }

    /// Make every subsequent operation fail
    pub fn fail_with(&self, message: impl Into<String>) {
        *write(&self.failure) = Some(message.into());
    }

    /// Make finalizer writes fail while reads and status writes succeed
    pub fn fail_finalizers_with(&self, message: impl Into<String>) {
        *write(&self.finalizer_failure) = Some(message.into());
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        read(&self.operations).clone()
    }

    /// Reset operation counts
    pub fn reset_counts(&self) {
        *write(&self.operations) = OperationCounts::default();
    }

    fn check_failure(&self) -> Result<()> {
        match read(&self.failure).as_ref() {
            Some(message) => Err(ReconcileError::Store(message.clone())),
            None => Ok(()),
        }
    }

    fn check_finalizer_failure(&self) -> Result<()> {
        self.check_failure()?;
        match read(&self.finalizer_failure).as_ref() {
            Some(message) => Err(ReconcileError::Store(message.clone())),
            None => Ok(()),
        }
    }

    /// Apply `edit` to the stored JSON of `obj`
    fn edit_stored<K: StoredObject>(&self, obj: &K, edit: impl FnOnce(&mut Value)) -> Result<()> {
        let namespace = obj.namespace().unwrap_or_default();
        let name = obj.name_any();
        let mut objects = write(&self.objects);
        let stored = objects
            .get_mut(&key_of::<K>(&namespace, &name))
            .ok_or_else(|| ReconcileError::Store(format!("{}/{} not found", namespace, name)))?;
        edit(stored);
        Ok(())
    }
}

#[async_trait]
impl Store for MockStore {
    async fn get<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        write(&self.operations).gets += 1;
        self.check_failure()?;

        let value = read(&self.objects).get(&key_of::<K>(namespace, name)).cloned();
        Ok(value.map(serde_json::from_value).transpose()?)
    }

    async fn update_status<K: StoredObject>(&self, obj: &K) -> Result<()> {
        write(&self.operations).status_updates += 1;
        self.check_failure()?;

        let status = status_of(obj)?;
        self.edit_stored(obj, |stored| {
            if let Some(map) = stored.as_object_mut() {
                map.insert("status".to_string(), status);
            }
        })
    }

    async fn add_finalizer<K: StoredObject>(&self, obj: &mut K, finalizer: &str) -> Result<()> {
        write(&self.operations).finalizer_adds += 1;
        self.check_finalizer_failure()?;

        if !has_finalizer(obj, finalizer) {
            obj.finalizers_mut().push(finalizer.to_string());
        }
        let finalizers = serde_json::to_value(obj.finalizers())?;
        self.edit_stored(obj, |stored| {
            stored["metadata"]["finalizers"] = finalizers;
        })
    }

    async fn remove_finalizer<K: StoredObject>(
        &self,
        obj: &mut K,
        finalizer: &str,
    ) -> Result<()> {
        write(&self.operations).finalizer_removes += 1;
        self.check_finalizer_failure()?;

        obj.finalizers_mut().retain(|f| f != finalizer);

        // Released objects pending deletion disappear, as on a real API server
        if obj.finalizers().is_empty() && obj.meta().deletion_timestamp.is_some() {
            let key = key_of::<K>(&obj.namespace().unwrap_or_default(), &obj.name_any());
            write(&self.objects).remove(&key);
            return Ok(());
        }

        let finalizers = serde_json::to_value(obj.finalizers())?;
        self.edit_stored(obj, |stored| {
            stored["metadata"]["finalizers"] = finalizers;
        })
    }
}
