//! Shared state handed to every reconciliation pass

use dockyard_core::crd::HarborConnection;
use dockyard_harbor::{Credentials, HarborClient};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{ReconcileError, Result};
use crate::secrets::SecretResolver;
use crate::store::Store;

/// Engine tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Timeout applied to every Harbor API call
    pub request_timeout: Duration,
    /// Delay before retrying a failed pass
    pub error_requeue: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            error_requeue: Duration::from_secs(60),
        }
    }
}

/// Dependencies of the reconcilers
pub struct Context<S> {
    pub store: S,
    pub secrets: Arc<dyn SecretResolver>,
    pub config: EngineConfig,
    /// Cancels in-flight Harbor calls on shutdown
    pub shutdown: CancellationToken,
    http: reqwest::Client,
}

impl<S: Store> Context<S> {
    pub fn new(store: S, secrets: Arc<dyn SecretResolver>, config: EngineConfig) -> Result<Self> {
        let http = HarborClient::http_client(config.request_timeout).map_err(|e| {
            ReconcileError::ConnectionFailed {
                name: String::new(),
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            store,
            secrets,
            config,
            shutdown: CancellationToken::new(),
            http,
        })
    }

    /// Tie Harbor calls to an external shutdown token
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Build a Harbor client for the named connection
    ///
    /// Resolved fresh on every pass so that edits to the connection or its
    /// secret take effect without restarting.
    pub async fn connect(&self, namespace: &str, connection_ref: &str) -> Result<HarborClient> {
        let failed = |message: String| ReconcileError::ConnectionFailed {
            name: connection_ref.to_string(),
            message,
        };

        let connection: HarborConnection = self
            .store
            .get(namespace, connection_ref)
            .await?
            .ok_or_else(|| failed("HarborConnection not found".to_string()))?;

        self.client_for(namespace, &connection)
            .await
            .map_err(|e| match e {
                ReconcileError::InvalidSpec(message) => failed(message),
                other => other,
            })
    }

    /// Build a Harbor client from a connection object
    ///
    /// A malformed base URL is reported as `InvalidSpec`, a missing password
    /// as a secret error.
    pub async fn client_for(
        &self,
        namespace: &str,
        connection: &HarborConnection,
    ) -> Result<HarborClient> {
        let credentials = match &connection.spec.credentials {
            Some(creds) => {
                let password = self
                    .secrets
                    .resolve(
                        namespace,
                        &creds.password_secret_ref.name,
                        &creds.password_secret_ref.key,
                    )
                    .await?;
                Some(Credentials::basic(&creds.username, password))
            }
            None => None,
        };

        let client = HarborClient::with_http_client(
            self.http.clone(),
            &connection.spec.base_url,
            credentials,
        )
        .map_err(|e| ReconcileError::InvalidSpec(e.to_string()))?;

        Ok(client.with_cancellation(self.shutdown.child_token()))
    }
}
