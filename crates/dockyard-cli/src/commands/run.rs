//! Run command - start the controllers

use dockyard_kube::EngineConfig;
use dockyard_kube::controller;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::{CliError, Result};

/// Check and assemble the engine settings
pub fn engine_config(request_timeout: Duration, error_requeue: Duration) -> Result<EngineConfig> {
    if request_timeout.is_zero() {
        return Err(CliError::config_with_help(
            "request timeout must be positive",
            "set --request-timeout or DOCKYARD_REQUEST_TIMEOUT, e.g. 30s",
        ));
    }
    if error_requeue.is_zero() {
        return Err(CliError::config_with_help(
            "error requeue delay must be positive",
            "set --error-requeue or DOCKYARD_ERROR_REQUEUE, e.g. 1m",
        ));
    }

    Ok(EngineConfig {
        request_timeout,
        error_requeue,
    })
}

/// Run the run command
pub async fn run(namespace: Option<String>, config: EngineConfig) -> Result<()> {
    let client = kube::Client::try_default().await?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        "connected to Kubernetes API"
    );

    controller::run(client, namespace, config, CancellationToken::new()).await?;
    Ok(())
}
