//! Dockyard Kube - reconciliation engine and controllers
//!
//! This crate keeps Harbor entities in line with their declared objects:
//!
//! - [`engine`]: The generic reconcile pass and the per-kind [`HarborResource`] trait
//! - [`connection`]: The `HarborConnection` probe
//! - [`store`]: Reading objects and persisting status and finalizers
//! - [`secrets`]: Credential lookup
//! - [`controller`]: kube-runtime controllers for every kind
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dockyard_core::crd::HarborProject;
//! use dockyard_kube::{Context, EngineConfig, KubeSecrets, KubeStore, engine};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = kube::Client::try_default().await?;
//! let ctx = Context::new(
//!     KubeStore::new(client.clone()),
//!     Arc::new(KubeSecrets::new(client)),
//!     EngineConfig::default(),
//! )?;
//!
//! let requeue = engine::reconcile::<HarborProject, _>(&ctx, "default", "team-a").await?;
//! println!("next pass: {:?}", requeue);
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod context;
pub mod controller;
pub mod diff;
pub mod engine;
pub mod error;
pub mod secrets;
pub mod store;

mod kinds;

// Re-exports for convenience
pub use connection::reconcile_connection;
pub use context::{Context, EngineConfig};
pub use diff::{FieldChange, FieldDiff};
pub use engine::{HarborResource, reconcile};
pub use error::{ReconcileError, Result};
pub use secrets::{KubeSecrets, MockSecrets, SecretResolver};
pub use store::{KubeStore, MockStore, OperationCounts, Store, StoredObject};
