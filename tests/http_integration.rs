//! Integration tests for the Kibana handlers using wiremock
//!
//! These tests run the import/export translation and the resource handler
//! against a mocked Kibana, checking the wire shapes and the state written
//! back after each operation.

use elasticstack_provider::kibana::auth::Credentials;
use elasticstack_provider::kibana::client::{ConnectionConfig, KibanaClient};
use elasticstack_provider::kibana::saved_objects::{self, SavedObject};
use elasticstack_provider::resource::{ResourceData, SavedObjectResource};
use elasticstack_provider::{slo, ProviderError};
use serde_json::json;
use wiremock::matchers::{
    body_json, body_string_contains, header, header_regex, method, path, path_regex, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IMPORT: &str = "/s/default/api/saved_objects/_import";
const EXPORT: &str = "/s/default/api/saved_objects/_export";

fn client_for(server: &MockServer, credentials: Credentials) -> KibanaClient {
    KibanaClient::new(&ConnectionConfig::new(server.uri(), credentials)).unwrap()
}

fn export_request(id: &str) -> serde_json::Value {
    json!({
        "objects": [{"type": "dashboard", "id": id}],
        "includeReferencesDeep": false,
        "excludeExportDetails": true
    })
}

/// Test module for the saved-object translator
mod saved_object_tests {
    use super::*;

    /// Import uploads a single ndjson line as a multipart file
    #[tokio::test]
    async fn test_import_sends_ndjson_file() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(IMPORT))
            .and(query_param("overwrite", "true"))
            .and(header("kbn-xsrf", "elasticstack-provider"))
            .and(header("accept", "*/*"))
            .and(header_regex("content-type", "^multipart/form-data; boundary="))
            .and(body_string_contains("name=\"file\"; filename=\"import.ndjson\""))
            .and(body_string_contains("\"id\":\"my-dash\""))
            .and(body_string_contains("\"title\":\"t\""))
            .and(body_string_contains("Content-Type: application/ndjson"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "successCount": 1,
                "successResults": [{"id": "my-dash", "type": "dashboard"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Credentials::None);
        let object = SavedObject::from_json_str("my-dash", "default", r#"{"title":"t"}"#).unwrap();

        let created = saved_objects::create_saved_object(&client, &object).await.unwrap();
        assert_eq!(created.id, "my-dash");
        assert_eq!(created.attributes, object.attributes);
    }

    /// Zero successes is an import failure
    #[tokio::test]
    async fn test_import_zero_success_fails() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(IMPORT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "successCount": 0,
                "errors": [{
                    "id": "d-1",
                    "type": "dashboard",
                    "error": {"type": "unsupported_type"}
                }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Credentials::None);
        let object = SavedObject::from_json_str("d-1", "default", "{}").unwrap();

        let err = saved_objects::create_saved_object(&client, &object).await.unwrap_err();
        assert!(matches!(err, ProviderError::ImportFailed(ref reason) if reason.contains("unsupported_type")));
    }

    /// Non-2xx statuses surface as API errors
    #[tokio::test]
    async fn test_import_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(IMPORT))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "statusCode": 500,
                "error": "Internal Server Error"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Credentials::None);
        let object = SavedObject::from_json_str("", "default", "{}").unwrap();

        match saved_objects::create_saved_object(&client, &object).await {
            Err(ProviderError::Api { status, body }) => {
                assert_eq!(status.as_u16(), 500);
                assert!(body.contains("Internal Server Error"));
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    /// Export requests one object and decodes the flat ndjson line
    #[tokio::test]
    async fn test_export_decodes_flat_object() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/s/ops/api/saved_objects/_export"))
            .and(header("content-type", "application/json"))
            .and(body_json(export_request("abc")))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "{\"id\":\"abc\",\"type\":\"dashboard\",\"attributes\":{\"title\":\"t\",\"panelsJSON\":\"[]\"},\"references\":[]}\n",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Credentials::None);
        let object = saved_objects::get_saved_object(&client, "abc", "ops", "dashboard")
            .await
            .unwrap()
            .expect("object should exist");

        assert_eq!(object.id, "abc");
        assert_eq!(object.space_id, "ops");
        assert_eq!(object.attributes["title"], "t");
        assert_eq!(object.attributes["panelsJSON"], "[]");
    }

    /// A 404 from the export endpoint means the object is gone
    #[tokio::test]
    async fn test_export_404_is_absent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(EXPORT))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, Credentials::None);
        let found = saved_objects::get_saved_object(&client, "abc", "default", "dashboard")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    /// Garbage bodies are decode errors, not absence
    #[tokio::test]
    async fn test_export_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(EXPORT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Credentials::None);
        let err = saved_objects::get_saved_object(&client, "abc", "default", "dashboard")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }
}

/// Test module for credential handling on the wire
mod auth_tests {
    use super::*;

    async fn mount_export(server: &MockServer, auth: &str) {
        Mock::given(method("POST"))
            .and(path(EXPORT))
            .and(header("authorization", auth))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "abc", "type": "dashboard", "attributes": {}
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_api_key_header() {
        let server = MockServer::start().await;
        mount_export(&server, "ApiKey c2VjcmV0").await;

        let client = client_for(&server, Credentials::ApiKey("c2VjcmV0".to_string()));
        let found = saved_objects::get_saved_object(&client, "abc", "default", "dashboard").await;
        assert!(found.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_basic_auth_header() {
        let server = MockServer::start().await;
        mount_export(&server, "Basic ZWxhc3RpYzpjaGFuZ2VtZQ==").await;

        let client = client_for(
            &server,
            Credentials::Basic {
                username: "elastic".to_string(),
                password: "changeme".to_string(),
            },
        );
        let found = saved_objects::get_saved_object(&client, "abc", "default", "dashboard").await;
        assert!(found.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_missing_credentials_send_empty_basic_auth() {
        let server = MockServer::start().await;
        mount_export(&server, "Basic Og==").await;

        let client = client_for(&server, Credentials::None);
        let found = saved_objects::get_saved_object(&client, "abc", "default", "dashboard").await;
        assert!(found.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_401_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(EXPORT))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "statusCode": 401,
                "error": "Unauthorized"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Credentials::None);
        let err = saved_objects::get_saved_object(&client, "abc", "default", "dashboard")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Api { status, .. } if status.as_u16() == 401));
    }
}

/// Test module for the resource handler
mod handler_tests {
    use super::*;

    /// Create imports, records the composite id, then reads back
    #[tokio::test]
    async fn test_create_then_read_end_to_end() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(IMPORT))
            .and(query_param("overwrite", "true"))
            .and(body_string_contains("{\"title\":\"Dash1\"}\n"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successResults": [{"id": "d-1"}],
                "successCount": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(EXPORT))
            .and(body_json(export_request("d-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "d-1",
                "type": "dashboard",
                "attributes": {"title": "Dash1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dashboards = SavedObjectResource::dashboard(client_for(&server, Credentials::None)).unwrap();
        let mut data = ResourceData::desired("", "default", r#"{"title":"Dash1"}"#);

        dashboards.create(&mut data).await.unwrap();

        assert_eq!(data.id, "default/d-1");
        assert_eq!(data.object_id, "d-1");
        assert_eq!(data.space_id, "default");
        assert_eq!(data.attributes, r#"{"title":"Dash1"}"#);
    }

    /// Read replaces attributes with whatever Kibana stored
    #[tokio::test]
    async fn test_read_normalizes_attributes() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/s/team-a/api/saved_objects/_export"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "d-2",
                "type": "dashboard",
                "attributes": {
                    "title": "Ops",
                    "panelsJSON": "[{\"panelIndex\":\"1\"}]",
                    "timeRestore": false,
                    "kibanaSavedObjectMeta": {"searchSourceJSON": "{}"}
                }
            })))
            .mount(&server)
            .await;

        let dashboards = SavedObjectResource::dashboard(client_for(&server, Credentials::None)).unwrap();
        let mut data = ResourceData::from_token("team-a/d-2");

        dashboards.read(&mut data).await.unwrap();

        assert_eq!(data.id, "team-a/d-2");
        assert_eq!(data.space_id, "team-a");
        let attributes: serde_json::Value = serde_json::from_str(&data.attributes).unwrap();
        assert_eq!(attributes["timeRestore"], false);
        assert_eq!(attributes["kibanaSavedObjectMeta"]["searchSourceJSON"], "{}");
    }

    /// An export without an id drops the resource from state without error
    #[tokio::test]
    async fn test_read_missing_object_clears_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(EXPORT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let dashboards = SavedObjectResource::dashboard(client_for(&server, Credentials::None)).unwrap();
        let mut data = ResourceData::from_token("default/gone");

        dashboards.read(&mut data).await.unwrap();
        assert!(data.is_absent());
    }

    /// Identifiers that cannot be stored are rejected before Kibana sees them
    #[tokio::test]
    async fn test_create_rejects_unstorable_identifier_without_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex("/api/saved_objects/_import$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successResults": [{"id": "a/b"}],
                "successCount": 1
            })))
            .expect(0)
            .mount(&server)
            .await;

        let dashboards = SavedObjectResource::dashboard(client_for(&server, Credentials::None)).unwrap();

        for (object_id, space_id) in [("a/b", "default"), ("", "team/a"), ("d-1", "team/a")] {
            let mut data = ResourceData::desired(object_id, space_id, r#"{"title":"Dash1"}"#);
            let err = dashboards.create(&mut data).await.unwrap_err();
            assert!(
                matches!(err, ProviderError::InvalidIdentifier(_)),
                "({:?}, {:?}) gave {:?}",
                object_id,
                space_id,
                err
            );
            assert!(data.is_absent());
        }
    }

    /// Create succeeds with an absent state when the read-back finds nothing
    #[tokio::test]
    async fn test_create_then_missing_read_leaves_state_absent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(IMPORT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successResults": [{"id": "d-9"}],
                "successCount": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(EXPORT))
            .and(body_json(export_request("d-9")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let dashboards = SavedObjectResource::dashboard(client_for(&server, Credentials::None)).unwrap();
        let mut data = ResourceData::desired("", "default", r#"{"title":"Dash9"}"#);

        dashboards.create(&mut data).await.unwrap();
        assert!(data.is_absent());
    }

    /// Update re-imports in place
    #[tokio::test]
    async fn test_update_reimports() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(IMPORT))
            .and(body_string_contains("\"id\":\"d-1\""))
            .and(body_string_contains("\"title\":\"Dash2\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successResults": [{"id": "d-1"}],
                "successCount": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(EXPORT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "d-1",
                "type": "dashboard",
                "attributes": {"title": "Dash2"}
            })))
            .mount(&server)
            .await;

        let dashboards = SavedObjectResource::dashboard(client_for(&server, Credentials::None)).unwrap();
        let mut data = ResourceData {
            id: "default/d-1".to_string(),
            object_id: "d-1".to_string(),
            space_id: "default".to_string(),
            attributes: r#"{"title":"Dash2"}"#.to_string(),
        };

        dashboards.update(&mut data).await.unwrap();
        assert_eq!(data.id, "default/d-1");
        assert_eq!(data.attributes, r#"{"title":"Dash2"}"#);
    }

    /// Delete never reaches Kibana
    #[tokio::test]
    async fn test_delete_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dashboards = SavedObjectResource::dashboard(client_for(&server, Credentials::None)).unwrap();
        let mut data = ResourceData::from_token("default/d-1");

        let err = dashboards.delete(&mut data).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedOperation(_)));
    }
}

/// Test module for the SLO error budget
mod slo_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_error_budget() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/s/default/api/observability/slos/slo-1"))
            .and(header("kbn-xsrf", "elasticstack-provider"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "slo-1",
                "summary": {
                    "status": "DEGRADING",
                    "sliValue": 0.995,
                    "errorBudget": {
                        "initial": 0.01,
                        "consumed": 0.5,
                        "remaining": 0.5,
                        "isEstimated": false
                    }
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Credentials::None);
        let budget = slo::get_error_budget(&client, "default", "slo-1").await.unwrap();

        assert_eq!(budget, slo::ErrorBudget::new(0.01, 0.5, 0.5, false));
    }

    #[tokio::test]
    async fn test_get_error_budget_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/s/default/api/observability/slos/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, Credentials::None);
        let err = slo::get_error_budget(&client, "default", "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
