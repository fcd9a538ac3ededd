//! Connection probe
//!
//! A `HarborConnection` has no remote counterpart. Reconciling it only
//! checks that Harbor answers, authenticating when credentials are
//! configured, and records the outcome as conditions.

use dockyard_core::crd::{ConnectionStatus, HarborConnection};
use dockyard_core::{Requeue, StatusConditions, requeue_for};
use kube::{Resource, ResourceExt};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::context::Context;
use crate::error::{ReconcileError, Result};
use crate::store::Store;

/// Ready reason once Harbor answered the probe
pub const REASON_CONNECTED: &str = "Connected";

/// Probe the named connection and record the result
pub async fn reconcile_connection<S: Store>(
    ctx: &Context<S>,
    namespace: &str,
    name: &str,
) -> Result<Requeue> {
    let span = info_span!("probe", kind = "HarborConnection", namespace, name);
    probe_pass(ctx, namespace, name).instrument(span).await
}

async fn probe_pass<S: Store>(ctx: &Context<S>, namespace: &str, name: &str) -> Result<Requeue> {
    let Some(mut connection) = ctx.store.get::<HarborConnection>(namespace, name).await? else {
        debug!("connection no longer exists");
        return Ok(Requeue::Never);
    };

    let generation = connection.meta().generation.unwrap_or_default();
    let outcome = probe(ctx, namespace, &connection).await;
    let status = connection.status.get_or_insert_with(ConnectionStatus::default);

    match outcome {
        Ok((requeue, message)) => {
            status.mark_ready(generation, REASON_CONNECTED, &message);
            ctx.store.update_status(&connection).await?;
            Ok(requeue)
        }
        Err(err) => {
            warn!(reason = err.reason(), error = %err, "probe failed");
            status.mark_stalled(generation, err.reason(), &err.to_string());
            if let Err(e) = ctx.store.update_status(&connection).await {
                warn!(error = %e, "failed to record Stalled condition");
            }
            Err(err)
        }
    }
}

async fn probe<S: Store>(
    ctx: &Context<S>,
    namespace: &str,
    connection: &HarborConnection,
) -> Result<(Requeue, String)> {
    let requeue = requeue_for(connection.spec.drift_detection_interval.as_deref())?;
    let harbor = ctx.client_for(namespace, connection).await?;

    let unreachable = |e: dockyard_harbor::HarborError| ReconcileError::ConnectionFailed {
        name: connection.name_any(),
        message: e.to_string(),
    };

    let message = if harbor.is_authenticated() {
        let user = harbor.current_user().await.map_err(unreachable)?;
        format!("authenticated to {} as {}", harbor.base_url(), user.username)
    } else {
        harbor.ping().await.map_err(unreachable)?;
        format!("{} is reachable", harbor.base_url())
    };

    info!(%message, "Harbor connection verified");
    Ok((requeue, message))
}
