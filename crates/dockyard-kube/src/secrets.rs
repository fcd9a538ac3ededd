//! Credential lookup
//!
//! Passwords never appear in declared specs; they are referenced by secret
//! name and key and resolved when a pass needs them.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::Client;
use kube::api::Api;
use std::collections::HashMap;

use crate::error::{ReconcileError, Result};

/// Resolve one key of a secret
#[async_trait]
pub trait SecretResolver: Send + Sync {
    async fn resolve(&self, namespace: &str, name: &str, key: &str) -> Result<String>;
}

fn secret_error(namespace: &str, name: &str, key: &str, message: impl Into<String>) -> ReconcileError {
    ReconcileError::Secret {
        namespace: namespace.to_string(),
        name: name.to_string(),
        key: key.to_string(),
        message: message.into(),
    }
}

/// Secrets read from the Kubernetes API server
#[derive(Clone)]
pub struct KubeSecrets {
    client: Client,
}

impl KubeSecrets {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretResolver for KubeSecrets {
    async fn resolve(&self, namespace: &str, name: &str, key: &str) -> Result<String> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = api
            .get_opt(name)
            .await
            .map_err(|e| secret_error(namespace, name, key, e.to_string()))?
            .ok_or_else(|| secret_error(namespace, name, key, "secret not found"))?;

        if let Some(bytes) = secret.data.as_ref().and_then(|d| d.get(key)) {
            return String::from_utf8(bytes.0.clone())
                .map_err(|_| secret_error(namespace, name, key, "value is not valid UTF-8"));
        }

        secret
            .string_data
            .as_ref()
            .and_then(|d| d.get(key))
            .cloned()
            .ok_or_else(|| secret_error(namespace, name, key, "key not found"))
    }
}

/// In-memory secrets for testing
#[derive(Debug, Clone, Default)]
pub struct MockSecrets {
    values: HashMap<(String, String, String), String>,
}

impl MockSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret value
    pub fn with_secret(mut self, namespace: &str, name: &str, key: &str, value: &str) -> Self {
        self.values.insert(
            (namespace.to_string(), name.to_string(), key.to_string()),
            value.to_string(),
        );
        self
    }
}

#[async_trait]
impl SecretResolver for MockSecrets {
    async fn resolve(&self, namespace: &str, name: &str, key: &str) -> Result<String> {
        self.values
            .get(&(namespace.to_string(), name.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| secret_error(namespace, name, key, "secret not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_secrets() {
        let secrets = MockSecrets::new().with_secret("default", "harbor-admin", "password", "s3cret");

        assert_eq!(
            secrets.resolve("default", "harbor-admin", "password").await.unwrap(),
            "s3cret"
        );

        let err = secrets.resolve("other", "harbor-admin", "password").await.unwrap_err();
        assert_eq!(err.reason(), "SecretError");
        assert!(err.to_string().contains("namespace 'other'"));
    }
}
