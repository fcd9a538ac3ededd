//! Controller manager
//!
//! One kube-runtime `Controller` per kind, all running concurrently on a
//! shared [`Context`]. The runtime serializes passes per object; distinct
//! objects reconcile in parallel. SIGTERM or ctrl-c drains in-flight passes
//! and cancels their Harbor calls.

use dockyard_core::Requeue;
use dockyard_core::crd::{HarborConnection, HarborMember, HarborProject, HarborRegistry, HarborUser};
use futures::StreamExt;
use kube::runtime::controller::Action;
use kube::runtime::{Controller, watcher};
use kube::{Api, Client, ResourceExt};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connection::reconcile_connection;
use crate::context::{Context, EngineConfig};
use crate::engine::{self, HarborResource};
use crate::error::{ReconcileError, Result};
use crate::secrets::KubeSecrets;
use crate::store::{KubeStore, StoredObject};

type KubeContext = Context<KubeStore>;

/// Translate an engine decision into a controller action
pub fn action_for(requeue: Requeue) -> Action {
    match requeue {
        Requeue::Never => Action::await_change(),
        Requeue::Immediately => Action::requeue(Duration::ZERO),
        Requeue::After(delay) => Action::requeue(delay),
    }
}

fn api<K: StoredObject>(client: &Client, namespace: Option<&str>) -> Api<K> {
    match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    }
}

fn object_location<K: StoredObject>(obj: &K) -> Result<(String, String)> {
    let namespace = obj.namespace().ok_or_else(|| {
        ReconcileError::InvalidSpec(format!("{} has no namespace", obj.name_any()))
    })?;
    Ok((namespace, obj.name_any()))
}

async fn reconcile_resource<K: HarborResource>(obj: Arc<K>, ctx: Arc<KubeContext>) -> Result<Action> {
    let (namespace, name) = object_location(obj.as_ref())?;
    let requeue = engine::reconcile::<K, KubeStore>(&ctx, &namespace, &name).await?;
    Ok(action_for(requeue))
}

async fn reconcile_probe(obj: Arc<HarborConnection>, ctx: Arc<KubeContext>) -> Result<Action> {
    let (namespace, name) = object_location(obj.as_ref())?;
    let requeue = reconcile_connection(&ctx, &namespace, &name).await?;
    Ok(action_for(requeue))
}

fn error_policy<K: StoredObject>(obj: Arc<K>, error: &ReconcileError, ctx: Arc<KubeContext>) -> Action {
    warn!(
        kind = %K::kind(&()),
        name = %obj.name_any(),
        reason = error.reason(),
        error = %error,
        "reconciliation failed, retrying in {:?}",
        ctx.config.error_requeue
    );
    Action::requeue(ctx.config.error_requeue)
}

async fn run_resource_controller<K: HarborResource>(api: Api<K>, ctx: Arc<KubeContext>) {
    info!(kind = %K::kind(&()), "starting controller");

    Controller::new(api, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile_resource::<K>, error_policy::<K>, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _action)) => debug!(object = %obj.name, "reconciled"),
                Err(e) => debug!(error = %e, "controller event failed"),
            }
        })
        .await;
}

async fn run_connection_controller(api: Api<HarborConnection>, ctx: Arc<KubeContext>) {
    info!(kind = "HarborConnection", "starting controller");

    Controller::new(api, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile_probe, error_policy::<HarborConnection>, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _action)) => debug!(object = %obj.name, "probed"),
                Err(e) => debug!(error = %e, "controller event failed"),
            }
        })
        .await;
}

/// Cancel `token` on SIGTERM or ctrl-c
pub fn cancel_on_signal(token: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown requested, cancelling in-flight Harbor calls");
        token.cancel();
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Run every controller until shutdown
///
/// Watches a single namespace when `namespace` is set, all namespaces
/// otherwise.
pub async fn run(
    client: Client,
    namespace: Option<String>,
    config: EngineConfig,
    shutdown: CancellationToken,
) -> Result<()> {
    let ctx = Arc::new(
        Context::new(
            KubeStore::new(client.clone()),
            Arc::new(KubeSecrets::new(client.clone())),
            config,
        )?
        .with_shutdown(shutdown.clone()),
    );
    cancel_on_signal(shutdown);

    let ns = namespace.as_deref();
    info!(
        namespace = ns.unwrap_or("<all>"),
        request_timeout = ?config.request_timeout,
        error_requeue = ?config.error_requeue,
        "starting Dockyard controllers"
    );

    tokio::join!(
        run_connection_controller(api(&client, ns), ctx.clone()),
        run_resource_controller::<HarborRegistry>(api(&client, ns), ctx.clone()),
        run_resource_controller::<HarborProject>(api(&client, ns), ctx.clone()),
        run_resource_controller::<HarborMember>(api(&client, ns), ctx.clone()),
        run_resource_controller::<HarborUser>(api(&client, ns), ctx.clone()),
    );

    info!("all controllers stopped");
    Ok(())
}
