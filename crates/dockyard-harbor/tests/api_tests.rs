//! Harbor client tests against a fake Harbor server

use dockyard_harbor::{
    Credentials, HarborClient, HarborError, MemberReq, RegistryReq, RoleRequest, UserCreationReq,
    UserEntity,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADMIN_AUTH: &str = "Basic YWRtaW46SGFyYm9yMTIzNDU=";

fn admin_client(server: &MockServer) -> HarborClient {
    HarborClient::new(
        &server.uri(),
        Some(Credentials::basic("admin", "Harbor12345")),
    )
    .unwrap()
}

mod crud {
    use super::*;

    #[tokio::test]
    async fn test_create_returns_id_from_location() {
        let server = MockServer::start().await;
        let req = RegistryReq {
            url: "https://hub.docker.com".to_string(),
            name: "hub".to_string(),
            description: String::new(),
            registry_type: "docker-hub".to_string(),
            insecure: false,
        };

        Mock::given(method("POST"))
            .and(path("/api/v2.0/registries"))
            .and(header("Authorization", ADMIN_AUTH))
            .and(body_json(json!({
                "url": "https://hub.docker.com",
                "name": "hub",
                "description": "",
                "type": "docker-hub",
                "insecure": false
            })))
            .respond_with(
                ResponseTemplate::new(201).insert_header("Location", "/api/v2.0/registries/42"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let id = admin_client(&server).create_registry(&req).await.unwrap();
        assert_eq!(id, 42);
    }

    #[tokio::test]
    async fn test_create_falls_back_to_inline_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2.0/users"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 9 })))
            .mount(&server)
            .await;

        let req = UserCreationReq {
            email: "alice@example.com".to_string(),
            realname: "Alice".to_string(),
            comment: String::new(),
            password: Some("Passw0rd!".to_string()),
            username: "alice".to_string(),
        };
        let id = admin_client(&server).create_user(&req).await.unwrap();
        assert_eq!(id, 9);
    }

    #[tokio::test]
    async fn test_create_without_id_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2.0/projects/3/members"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let req = MemberReq {
            role_id: 2,
            member_user: Some(UserEntity {
                username: "alice".to_string(),
            }),
            member_group: None,
        };
        let err = admin_client(&server).create_member(3, &req).await.unwrap_err();
        assert!(matches!(err, HarborError::MissingId { .. }));
    }

    #[tokio::test]
    async fn test_get_not_found_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2.0/projects/42"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"{"errors":[{"code":"NOT_FOUND","message":"project 42 not found"}]}"#,
            ))
            .mount(&server)
            .await;

        let err = admin_client(&server).get_project(42).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("project 42 not found"));
    }

    #[tokio::test]
    async fn test_conflict_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2.0/registries"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let req = RegistryReq {
            url: "https://quay.io".to_string(),
            name: "quay".to_string(),
            description: String::new(),
            registry_type: "quay".to_string(),
            insecure: false,
        };
        let err = admin_client(&server).create_registry(&req).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_update_member_role() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v2.0/projects/3/members/11"))
            .and(body_json(json!({ "role_id": 4 })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        admin_client(&server)
            .update_member(3, 11, &RoleRequest { role_id: 4 })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_user() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v2.0/users/7"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        admin_client(&server).delete_user(7).await.unwrap();
    }
}

mod pagination {
    use super::*;

    #[tokio::test]
    async fn test_list_follows_next_links() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2.0/projects"))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(
                        "Link",
                        r#"</api/v2.0/projects?page=2&page_size=100>; rel="next""#,
                    )
                    .set_body_json(json!([
                        { "project_id": 1, "name": "library" },
                        { "project_id": 2, "name": "team-a" }
                    ])),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v2.0/projects"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(
                        "Link",
                        r#"</api/v2.0/projects?page=1&page_size=100>; rel="prev""#,
                    )
                    .set_body_json(json!([{ "project_id": 3, "name": "team-b" }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let projects = admin_client(&server).list_projects().await.unwrap();
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["library", "team-a", "team-b"]);
    }

    #[tokio::test]
    async fn test_list_under_subpath_follows_rooted_links() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/harbor/api/v2.0/projects"))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(
                        "Link",
                        r#"</api/v2.0/projects?page=2&page_size=100>; rel="next""#,
                    )
                    .set_body_json(json!([{ "project_id": 1, "name": "library" }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/harbor/api/v2.0/projects"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "project_id": 2, "name": "team-a" }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HarborClient::new(&format!("{}/harbor", server.uri()), None).unwrap();
        let projects = client.list_projects().await.unwrap();
        let ids: Vec<i64> = projects.iter().map(|p| p.project_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_list_requests_page_size() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2.0/projects/5/members"))
            .and(query_param("page_size", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "project_id": 5, "entity_name": "alice", "entity_type": "u", "role_id": 1 }
            ])))
            .mount(&server)
            .await;

        let members = admin_client(&server).list_members(5).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].entity_type, "u");
    }
}

mod probes {
    use super::*;

    #[tokio::test]
    async fn test_ping_accepts_ok_and_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2.0/ping"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        admin_client(&server).ping().await.unwrap();

        // Probes never carry credentials
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_ping_rejects_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2.0/ping"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HarborClient::new(&server.uri(), None).unwrap();
        let err = client.ping().await.unwrap_err();
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn test_current_user_is_authenticated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2.0/users/current"))
            .and(header("Authorization", ADMIN_AUTH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_id": 1,
                "username": "admin",
                "sysadmin_flag": true
            })))
            .mount(&server)
            .await;

        let user = admin_client(&server).current_user().await.unwrap();
        assert_eq!(user.username, "admin");
    }

    #[tokio::test]
    async fn test_cancelled_client_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2.0/registries/1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        token.cancel();
        let client = admin_client(&server).with_cancellation(token);

        let err = client.get_registry(1).await.unwrap_err();
        assert!(matches!(err, HarborError::Cancelled));
    }
}
