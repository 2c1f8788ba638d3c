pub mod client;
pub mod clustermgmt;
pub mod common;
pub mod error;
pub mod prism;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use client::{Client, ClientOptions, RetryConfig, Versioned};
pub use common::{odata_string, ApiErrorDetails, ApiQueryParams, ListParams, TaskReference};
pub use error::ApiError;

#[cfg(test)]
mod tests {
    use super::common::ApiResponse;
    use super::test_helpers::create_test_client;
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::Value;

    #[tokio::test]
    async fn client_unwraps_data_envelope() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/prism/v4.0/config/tasks/t-1")
            .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
            .with_body(r#"{"data":{"extId":"t-1","status":"RUNNING"}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let task = client.prism().tasks().get("t-1").await.unwrap();
        assert_eq!(task.ext_id.as_deref(), Some("t-1"));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_handles_authentication_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/prism/v4.0/config/tasks/t-1")
            .with_status(401)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        match client.get::<Value>("/prism/v4.0/config/tasks/t-1").await {
            Err(ApiError::Unauthorized) => {}
            other => panic!("Expected AuthError, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn client_retries_server_errors() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/clustermgmt/v4.0/config/clusters/c-1")
            .with_status(503)
            .with_body(r#"{"data":{"error":[{"message":"busy","code":"CLU-1"}]}}"#)
            .expect(3)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let result = client.get::<Value>("/clustermgmt/v4.0/config/clusters/c-1").await;

        match result {
            Err(ApiError::Status {
                status, message, ..
            }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "[CLU-1] busy");
            }
            other => panic!("Expected ApiError, got {:?}", other.map(|_| ())),
        }
        mock.assert_async().await;

        let stats = client.stats();
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.failed_requests, 3);
    }

    #[tokio::test]
    async fn client_does_not_retry_client_errors() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/clustermgmt/v4.0/config/clusters/missing")
            .with_status(404)
            .with_body(r#"{"data":{"error":{"message":"Entity not found"}}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client
            .get::<Value>("/clustermgmt/v4.0/config/clusters/missing")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("Entity not found"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_with_etag_requires_etag() {
        let mut server = Server::new_async().await;
        let _with = server
            .mock("GET", "/clustermgmt/v4.0/config/clusters/c-1")
            .with_header("etag", "W/\"abc\"")
            .with_body(r#"{"data":{"extId":"c-1"}}"#)
            .create_async()
            .await;
        let _without = server
            .mock("GET", "/clustermgmt/v4.0/config/clusters/c-2")
            .with_body(r#"{"data":{"extId":"c-2"}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());

        let versioned = client.clustermgmt().clusters().get("c-1", None).await.unwrap();
        assert_eq!(versioned.etag, "W/\"abc\"");
        assert_eq!(versioned.data.ext_id.as_deref(), Some("c-1"));

        let err = client
            .clustermgmt()
            .clusters()
            .get("c-2", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingEtag(_)));
    }

    #[tokio::test]
    async fn mutations_send_if_match_and_request_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/clustermgmt/v4.0/config/storage-containers/sc-1")
            .match_header("if-match", "etag-1")
            .match_header(
                "ntnx-request-id",
                Matcher::Regex("^[0-9a-f]{8}-[0-9a-f]{4}-4".to_string()),
            )
            .match_body(Matcher::PartialJsonString(r#"{"name":"renamed"}"#.to_string()))
            .with_status(202)
            .with_body(r#"{"data":{"extId":"ZXJnb24=:task-1"}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let container = clustermgmt::storage_containers::StorageContainer {
            name: Some("renamed".to_string()),
            ..Default::default()
        };
        let task = client
            .clustermgmt()
            .storage_containers()
            .update("sc-1", &container, "etag-1")
            .await
            .unwrap();

        assert_eq!(task.ext_id.as_deref(), Some("ZXJnb24=:task-1"));
        mock.assert_async().await;
    }

    #[test]
    fn odata_strings_double_embedded_quotes() {
        assert_eq!(odata_string("prod"), "'prod'");
        assert_eq!(odata_string("o'brien"), "'o''brien'");
    }

    #[tokio::test]
    async fn list_keeps_metadata() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/clustermgmt/v4.0/config/clusters")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("$limit".into(), "1".into()),
                Matcher::UrlEncoded("$filter".into(), "name eq 'a'".into()),
            ]))
            .with_body(r#"{"data":[{"extId":"c-1"}],"metadata":{"totalAvailableResults":7}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let params = ListParams {
            limit: Some(1),
            ..ListParams::new().with_filter("name eq 'a'")
        };
        let response: ApiResponse<Option<Vec<Value>>> = client
            .list("/clustermgmt/v4.0/config/clusters", &params.to_query_params())
            .await
            .unwrap();

        assert_eq!(response.data.map(|d| d.len()), Some(1));
        assert_eq!(
            response.metadata.and_then(|m| m.total_available_results),
            Some(7)
        );
    }

    #[tokio::test]
    async fn client_strips_trailing_slash_from_endpoint() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/prism/v4.0/config/tasks/t-1")
            .with_body(r#"{"data":{}}"#)
            .create_async()
            .await;

        let client = create_test_client(&format!("{}/", server.url()));
        let _ = client.prism().tasks().get("t-1").await;
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_handles_network_errors() {
        let client = create_test_client("http://127.0.0.1:1");
        let result = client.get::<Value>("/prism/v4.0/config/tasks/t-1").await;
        assert!(matches!(
            result,
            Err(ApiError::ServiceUnavailable) | Err(ApiError::Transport(_))
        ));
    }
}
