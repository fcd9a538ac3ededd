//! Dockyard Harbor client
//!
//! A minimal client for the Harbor v2.0 API covering what the operator
//! manages:
//!
//! - **Registries**: replication and proxy-cache endpoints
//! - **Projects**: including metadata flags, CVE allowlists and quotas
//! - **Members**: user and group memberships of a project
//! - **Users**: local database users
//! - **Probes**: `ping` and the current identity
//!
//! ## Example
//!
//! ```rust,no_run
//! use dockyard_harbor::{Credentials, HarborClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HarborClient::new(
//!     "https://harbor.example.com",
//!     Some(Credentials::basic("admin", "Harbor12345")),
//! )?;
//!
//! for project in client.list_projects().await? {
//!     println!("{} ({})", project.name, project.project_id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Callers classify failures with [`HarborError::is_not_found`] and
//! [`HarborError::is_conflict`] rather than matching status codes. The
//! client never retries.

pub mod client;
pub mod credentials;
pub mod error;
pub mod models;

mod members;
mod projects;
mod registries;
mod system;
mod users;

// Re-exports for convenience
pub use client::{HarborClient, parse_base_url};
pub use credentials::Credentials;
pub use error::{HarborError, Result};
pub use models::{
    CveAllowlist, CveItem, ENTITY_GROUP, ENTITY_USER, Member, MemberReq, Project, ProjectMetadata, ProjectReq, Registry,
    RegistryReq, RoleRequest, User, UserCreationReq, UserEntity, UserGroup, UserProfile,
};
