//! Error types for dockyard-kube

use dockyard_harbor::HarborError;
use thiserror::Error;

/// Result type for dockyard-kube operations
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Errors that abort a reconciliation pass
///
/// Each variant maps to the reason recorded on the `Stalled` condition.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReconcileError {
    /// The referenced connection is missing, malformed or unreachable
    #[error("connection '{name}' unavailable: {message}")]
    ConnectionFailed { name: String, message: String },

    /// A credential could not be read from the secret store
    #[error("secret '{name}' key '{key}' in namespace '{namespace}': {message}")]
    Secret {
        namespace: String,
        name: String,
        key: String,
        message: String,
    },

    /// The declared state is malformed
    #[error("invalid spec: {0}")]
    InvalidSpec(String),

    /// Something this object points at does not exist yet
    #[error("dependency not ready: {0}")]
    DependencyNotReady(String),

    /// Listing candidates for adoption failed
    #[error("adoption lookup failed: {0}")]
    Adoption(#[source] HarborError),

    #[error("create failed: {0}")]
    Create(#[source] HarborError),

    #[error("update failed: {0}")]
    Update(#[source] HarborError),

    #[error("delete failed: {0}")]
    Delete(#[source] HarborError),

    /// Fetching the remote entity failed for a reason other than not-found
    #[error("get failed: {0}")]
    Get(#[source] HarborError),

    /// Kubernetes API error while reading or writing the desired-state store
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// Desired-state store failure
    #[error("store error: {0}")]
    Store(String),
}

impl From<serde_json::Error> for ReconcileError {
    fn from(e: serde_json::Error) -> Self {
        ReconcileError::Store(e.to_string())
    }
}

impl From<dockyard_core::CoreError> for ReconcileError {
    fn from(e: dockyard_core::CoreError) -> Self {
        ReconcileError::InvalidSpec(e.to_string())
    }
}

impl ReconcileError {
    /// Condition reason for this error
    pub fn reason(&self) -> &'static str {
        match self {
            ReconcileError::ConnectionFailed { .. } => "ConnectionFailed",
            ReconcileError::Secret { .. } => "SecretError",
            ReconcileError::InvalidSpec(_) => "InvalidSpec",
            ReconcileError::DependencyNotReady(_) => "DependencyNotReady",
            ReconcileError::Adoption(_) => "AdoptionError",
            ReconcileError::Create(_) => "CreateError",
            ReconcileError::Update(_) => "UpdateError",
            ReconcileError::Delete(_) => "DeleteError",
            ReconcileError::Get(_) => "GetError",
            ReconcileError::Api(_) | ReconcileError::Store(_) => "StoreError",
        }
    }

    /// The underlying Harbor error, if any
    pub fn harbor_error(&self) -> Option<&HarborError> {
        match self {
            ReconcileError::Adoption(e)
            | ReconcileError::Create(e)
            | ReconcileError::Update(e)
            | ReconcileError::Delete(e)
            | ReconcileError::Get(e) => Some(e),
            _ => None,
        }
    }

    /// Check if this is a Kubernetes 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReconcileError::Api(kube::Error::Api(resp)) if resp.code == 404)
    }

    /// Check if this is a conflict error (409)
    pub fn is_conflict(&self) -> bool {
        matches!(self, ReconcileError::Api(kube::Error::Api(resp)) if resp.code == 409)
            || self.harbor_error().is_some_and(HarborError::is_conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons() {
        let api = || HarborError::Api {
            status: 500,
            body: String::new(),
        };

        assert_eq!(ReconcileError::InvalidSpec("x".into()).reason(), "InvalidSpec");
        assert_eq!(ReconcileError::Create(api()).reason(), "CreateError");
        assert_eq!(ReconcileError::Update(api()).reason(), "UpdateError");
        assert_eq!(ReconcileError::Delete(api()).reason(), "DeleteError");
        assert_eq!(ReconcileError::Get(api()).reason(), "GetError");
        assert_eq!(ReconcileError::Adoption(api()).reason(), "AdoptionError");
        assert_eq!(
            ReconcileError::Secret {
                namespace: "ns".into(),
                name: "s".into(),
                key: "k".into(),
                message: "missing".into(),
            }
            .reason(),
            "SecretError"
        );
        assert_eq!(
            ReconcileError::ConnectionFailed {
                name: "harbor".into(),
                message: "refused".into(),
            }
            .reason(),
            "ConnectionFailed"
        );
    }

    #[test]
    fn test_conflict_from_harbor() {
        let err = ReconcileError::Create(HarborError::Api {
            status: 409,
            body: "exists".into(),
        });
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_drift_error_is_invalid_spec() {
        let err: ReconcileError = dockyard_core::requeue_for(Some("-1s")).unwrap_err().into();
        assert_eq!(err.reason(), "InvalidSpec");
    }
}
