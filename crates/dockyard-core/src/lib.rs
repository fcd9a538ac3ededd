//! Dockyard Core - Core types for the Harbor operator
//!
//! This crate provides the foundational types used throughout Dockyard:
//! - `crd`: The custom resources (connections, registries, projects, members, users)
//! - `conditions`: The Reconciling/Stalled/Ready status state machine
//! - `drift`: Requeue scheduling for periodic drift re-checks

pub mod conditions;
pub mod crd;
pub mod drift;
pub mod error;

pub use conditions::{Condition, ConditionStatus, ConditionType, StatusConditions};
pub use crd::{FINALIZER, HarborSpec, ResourceStatus, SecretKeyRef};
pub use drift::{Requeue, drift_check, parse_interval, requeue_for};
pub use error::{CoreError, Result};
