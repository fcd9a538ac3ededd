//! Generic reconciliation engine
//!
//! One pass drives a declared object towards its Harbor counterpart:
//!
//! 1. Fetch the object; a missing object needs nothing
//! 2. Deletion: delete the remote entity, then release the finalizer
//! 3. Install the finalizer before anything can be created
//! 4. Validate, resolve the connection and parent entity, apply defaults
//! 5. Adopt an existing remote entity when asked to
//! 6. Create, or fetch-diff-update, the remote entity
//! 7. Record conditions and schedule the next drift check
//!
//! Everything kind-specific lives behind [`HarborResource`].

use async_trait::async_trait;
use dockyard_core::{FINALIZER, HarborSpec, Requeue, ResourceStatus, StatusConditions, requeue_for};
use dockyard_harbor::{HarborClient, Result as HarborResult};
use kube::ResourceExt;
use std::fmt::Debug;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::context::Context;
use crate::diff::{FieldChange, summarize};
use crate::error::{ReconcileError, Result};
use crate::secrets::SecretResolver;
use crate::store::{Store, StoredObject, has_finalizer};

/// Ready reason once the remote entity matches
pub const REASON_SYNCED: &str = "Synced";

/// Reconciling reason while a vanished remote entity is recreated
pub const REASON_REMOTE_MISSING: &str = "RemoteMissing";

/// Kind-specific behavior plugged into the engine
///
/// `Parent` is whatever the remote calls need besides the entity ID (the
/// owning project for members, nothing for top-level kinds).
#[async_trait]
pub trait HarborResource: StoredObject {
    /// Request body for create and update
    type Payload: Debug + Send + Sync;
    /// Entity as returned by Harbor
    type Remote: Debug + Send + Sync;
    type Parent: Send + Sync;

    fn settings(&self) -> &(dyn HarborSpec + Sync);

    fn status(&self) -> Option<&ResourceStatus>;

    fn status_mut(&mut self) -> &mut ResourceStatus;

    /// Harbor ID recorded by a previous pass
    fn remote_id(&self) -> Option<i64> {
        self.status().and_then(ResourceStatus::known_remote_id)
    }

    /// Reject malformed specs before any remote call
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Fill in defaults, in memory only
    fn apply_defaults(&mut self) {}

    async fn resolve_parent<S: Store>(&self, store: &S) -> Result<Self::Parent>;

    /// ID of an existing remote entity this object should bind to
    async fn find_existing(
        &self,
        harbor: &HarborClient,
        parent: &Self::Parent,
    ) -> HarborResult<Option<i64>>;

    async fn build_payload(
        &self,
        harbor: &HarborClient,
        parent: &Self::Parent,
        secrets: &dyn SecretResolver,
    ) -> Result<Self::Payload>;

    async fn fetch(
        &self,
        harbor: &HarborClient,
        parent: &Self::Parent,
        id: i64,
    ) -> HarborResult<Self::Remote>;

    async fn create(
        &self,
        harbor: &HarborClient,
        parent: &Self::Parent,
        payload: &Self::Payload,
    ) -> HarborResult<i64>;

    async fn update(
        &self,
        harbor: &HarborClient,
        parent: &Self::Parent,
        id: i64,
        payload: &Self::Payload,
    ) -> HarborResult<()>;

    async fn delete(&self, harbor: &HarborClient, parent: &Self::Parent, id: i64)
    -> HarborResult<()>;

    /// Fields of `remote` that differ from `desired`
    fn diff(&self, desired: &Self::Payload, remote: &Self::Remote) -> Vec<FieldChange>;
}

/// Run one reconciliation pass for the named object
pub async fn reconcile<K, S>(ctx: &Context<S>, namespace: &str, name: &str) -> Result<Requeue>
where
    K: HarborResource,
    S: Store,
{
    let kind = K::kind(&());
    let span = info_span!("reconcile", %kind, namespace, name);
    run_pass::<K, S>(ctx, namespace, name).instrument(span).await
}

async fn run_pass<K, S>(ctx: &Context<S>, namespace: &str, name: &str) -> Result<Requeue>
where
    K: HarborResource,
    S: Store,
{
    let Some(mut obj) = ctx.store.get::<K>(namespace, name).await? else {
        debug!("object no longer exists");
        return Ok(Requeue::Never);
    };

    if obj.meta().deletion_timestamp.is_some() {
        return finalize(ctx, obj).await;
    }

    let generation = obj.meta().generation.unwrap_or_default();
    if !has_finalizer(&obj, FINALIZER) {
        if let Err(err) = ctx.store.add_finalizer(&mut obj, FINALIZER).await {
            warn!(error = %err, "failed to install finalizer");
            record_stalled(ctx, &mut obj, generation, &err).await;
            return Err(err);
        }
    }

    match converge(ctx, &mut obj).await {
        Ok(Requeue::Immediately) => {
            obj.status_mut().mark_reconciling(
                generation,
                REASON_REMOTE_MISSING,
                "remote entity was deleted outside the operator, recreating",
            );
            ctx.store.update_status(&obj).await?;
            Ok(Requeue::Immediately)
        }
        Ok(requeue) => {
            let message = match obj.remote_id() {
                Some(id) => format!("in sync with Harbor entity {}", id),
                None => "in sync".to_string(),
            };
            obj.status_mut().mark_ready(generation, REASON_SYNCED, &message);
            ctx.store.update_status(&obj).await?;
            Ok(requeue)
        }
        Err(err) => {
            warn!(reason = err.reason(), error = %err, "reconcile failed");
            record_stalled(ctx, &mut obj, generation, &err).await;
            Err(err)
        }
    }
}

/// Best-effort Stalled write; the pass error is what gets reported
async fn record_stalled<K, S>(ctx: &Context<S>, obj: &mut K, generation: i64, err: &ReconcileError)
where
    K: HarborResource,
    S: Store,
{
    obj.status_mut()
        .mark_stalled(generation, err.reason(), &err.to_string());
    if let Err(e) = ctx.store.update_status(&*obj).await {
        warn!(error = %e, "failed to record Stalled condition");
    }
}

/// Steps 4 to 6; the caller records conditions
async fn converge<K, S>(ctx: &Context<S>, obj: &mut K) -> Result<Requeue>
where
    K: HarborResource,
    S: Store,
{
    obj.validate()?;
    let requeue = requeue_for(obj.settings().drift_detection_interval())?;

    let namespace = obj.namespace().unwrap_or_default();
    let connection_ref = obj.settings().connection_ref().to_string();
    let harbor = ctx.connect(&namespace, &connection_ref).await?;
    let parent = obj.resolve_parent(&ctx.store).await?;
    obj.apply_defaults();

    if obj.remote_id().is_none() && obj.settings().adopt_existing() {
        match obj
            .find_existing(&harbor, &parent)
            .await
            .map_err(ReconcileError::Adoption)?
        {
            Some(id) => {
                info!(id, "adopted existing Harbor entity");
                obj.status_mut().remote_id = Some(id);
                ctx.store.update_status(&*obj).await?;
            }
            None => debug!("no existing Harbor entity to adopt"),
        }
    }

    let payload = obj.build_payload(&harbor, &parent, ctx.secrets.as_ref()).await?;

    let Some(id) = obj.remote_id() else {
        let id = obj
            .create(&harbor, &parent, &payload)
            .await
            .map_err(ReconcileError::Create)?;
        info!(id, "created Harbor entity");
        obj.status_mut().remote_id = Some(id);
        ctx.store.update_status(&*obj).await?;
        return Ok(requeue);
    };

    let remote = match obj.fetch(&harbor, &parent, id).await {
        Ok(remote) => remote,
        Err(e) if e.is_not_found() => {
            warn!(id, "Harbor entity deleted out of band");
            obj.status_mut().remote_id = None;
            return Ok(Requeue::Immediately);
        }
        Err(e) => return Err(ReconcileError::Get(e)),
    };

    let changes = obj.diff(&payload, &remote);
    if changes.is_empty() {
        debug!(id, "Harbor entity in sync");
    } else {
        info!(id, changes = %summarize(&changes), "updating drifted Harbor entity");
        obj.update(&harbor, &parent, id, &payload)
            .await
            .map_err(ReconcileError::Update)?;
    }

    Ok(requeue)
}

/// Deletion branch: remove the remote entity, then release the object
async fn finalize<K, S>(ctx: &Context<S>, mut obj: K) -> Result<Requeue>
where
    K: HarborResource,
    S: Store,
{
    if !has_finalizer(&obj, FINALIZER) {
        debug!("deleted object carries no finalizer");
        return Ok(Requeue::Never);
    }

    if let Err(err) = cleanup(ctx, &obj).await {
        warn!(reason = err.reason(), error = %err, "cleanup failed");
        let generation = obj.meta().generation.unwrap_or_default();
        record_stalled(ctx, &mut obj, generation, &err).await;
        return Err(err);
    }

    ctx.store.remove_finalizer(&mut obj, FINALIZER).await?;
    info!("finalizer released");
    Ok(Requeue::Never)
}

async fn cleanup<K, S>(ctx: &Context<S>, obj: &K) -> Result<()>
where
    K: HarborResource,
    S: Store,
{
    let Some(id) = obj.remote_id() else {
        debug!("no Harbor entity recorded, nothing to delete");
        return Ok(());
    };

    let namespace = obj.namespace().unwrap_or_default();
    let harbor = ctx
        .connect(&namespace, obj.settings().connection_ref())
        .await?;

    let parent = match obj.resolve_parent(&ctx.store).await {
        Ok(parent) => parent,
        Err(ReconcileError::DependencyNotReady(message)) => {
            info!(id, %message, "parent entity is gone, skipping remote delete");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    match obj.delete(&harbor, &parent, id).await {
        Ok(()) => info!(id, "deleted Harbor entity"),
        Err(e) if e.is_not_found() => debug!(id, "Harbor entity already gone"),
        Err(e) => return Err(ReconcileError::Delete(e)),
    }

    Ok(())
}
