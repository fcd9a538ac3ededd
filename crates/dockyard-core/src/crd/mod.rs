//! Custom resource definitions
//!
//! All kinds live in the `dockyard.dev/v1alpha1` API group and are
//! namespaced. Every kind except `HarborConnection` carries the same three
//! cross-cutting fields (see [`HarborSpec`]) and a [`ResourceStatus`].

mod common;
mod connection;
mod member;
mod project;
mod registry;
mod user;

pub use common::{ConnectionStatus, HarborSpec, ResourceStatus, SecretKeyRef};
pub use connection::{ConnectionCredentials, HarborConnection, HarborConnectionSpec};
pub use member::{GroupType, HarborMember, HarborMemberSpec, MemberGroup, MemberRole, MemberUser};
pub use project::{CveAllowlistSpec, HarborProject, HarborProjectSpec, ProjectMetadataSpec};
pub use registry::{HarborRegistry, HarborRegistrySpec};
pub use user::{HarborUser, HarborUserSpec};

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::CustomResourceExt;

/// Finalizer guarding remote cleanup
pub const FINALIZER: &str = "dockyard.dev/finalizer";

/// Definitions for every kind, in installation order
pub fn all_crds() -> Vec<CustomResourceDefinition> {
    vec![
        HarborConnection::crd(),
        HarborRegistry::crd(),
        HarborProject::crd(),
        HarborMember::crd(),
        HarborUser::crd(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_crds() {
        let names: Vec<String> = all_crds()
            .into_iter()
            .filter_map(|crd| crd.metadata.name)
            .collect();

        assert_eq!(
            names,
            vec![
                "harborconnections.dockyard.dev",
                "harborregistries.dockyard.dev",
                "harborprojects.dockyard.dev",
                "harbormembers.dockyard.dev",
                "harborusers.dockyard.dev",
            ]
        );
    }

    #[test]
    fn test_registry_spec_wire_names() {
        let spec = HarborRegistrySpec {
            connection_ref: "harbor".to_string(),
            adopt_existing: true,
            drift_detection_interval: Some("5m".to_string()),
            name: "hub".to_string(),
            url: "https://hub.docker.com".to_string(),
            registry_type: "docker-hub".to_string(),
            description: String::new(),
            insecure: false,
        };

        insta::assert_json_snapshot!(spec, @r#"
        {
          "connectionRef": "harbor",
          "adoptExisting": true,
          "driftDetectionInterval": "5m",
          "name": "hub",
          "url": "https://hub.docker.com",
          "type": "docker-hub",
          "description": "",
          "insecure": false
        }
        "#);
    }

    #[test]
    fn test_connection_base_url_field() {
        let spec: HarborConnectionSpec = serde_json::from_value(serde_json::json!({
            "baseURL": "https://harbor.example.com",
            "credentials": {
                "username": "admin",
                "passwordSecretRef": { "name": "harbor-admin", "key": "password" }
            }
        }))
        .unwrap();

        assert_eq!(spec.base_url, "https://harbor.example.com");
        assert_eq!(spec.credentials.unwrap().password_secret_ref.key, "password");
    }
}
