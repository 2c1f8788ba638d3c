//! Test helpers for the Prism Central API

use super::client::{Client, ClientOptions, RetryConfig};

/// Client against a mock server, with retries fast enough for tests
pub fn create_test_client(url: &str) -> Client {
    Client::with_options(
        url,
        "admin",
        "secret",
        ClientOptions {
            insecure: true,
            retry_config: RetryConfig {
                max_retries: 2,
                initial_backoff_ms: 1,
                max_backoff_ms: 5,
                timeout_seconds: 5,
            },
            ..Default::default()
        },
    )
    .unwrap()
}

mod tests {
    use super::super::*;
    use serde_json::json;

    #[test]
    fn test_retry_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_backoff_ms, 100);
        assert_eq!(config.max_backoff_ms, 10000);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_api_query_params() {
        let params = ApiQueryParams::new()
            .add("$dryrun", true)
            .add("$filter", "name eq 'a b'")
            .add_optional("$select", Some("name"))
            .add_optional("$limit", None::<i64>);

        let query = params.to_query_string();
        assert!(query.starts_with('?'));
        assert!(query.contains("$dryrun=true"));
        assert!(query.contains("$filter=name%20eq%20%27a%20b%27"));
        assert!(query.contains("$select=name"));
        assert!(!query.contains("$limit"));
        assert_eq!(ApiQueryParams::new().to_query_string(), "");
    }

    #[test]
    fn test_list_params() {
        let params = ListParams {
            page: Some(0),
            limit: Some(50),
            order_by: Some("name desc".to_string()),
            ..Default::default()
        };
        let query = params.to_query_params().to_query_string();
        assert!(query.contains("$page=0"));
        assert!(query.contains("$limit=50"));
        assert!(query.contains("$orderby=name%20desc"));
        assert!(!query.contains("$filter"));
    }

    #[test]
    fn test_redact_nested_secrets() {
        let body = json!({
            "name": "profile",
            "smtpServer": {"server": {"username": "u", "password": "p"}},
            "snmpConfig": {"users": [{"authKey": "k", "privKey": null}]}
        });
        let redacted = common::redact(&body);
        assert_eq!(redacted["name"], "profile");
        assert_eq!(redacted["smtpServer"]["server"]["username"], "u");
        assert_eq!(redacted["smtpServer"]["server"]["password"], common::REDACTED);
        assert_eq!(redacted["snmpConfig"]["users"][0]["authKey"], common::REDACTED);
        assert!(redacted["snmpConfig"]["users"][0]["privKey"].is_null());
    }

    #[test]
    fn test_task_uuid() {
        assert_eq!(common::task_uuid("ZXJnb24=:1234-abcd"), "1234-abcd");
        assert_eq!(common::task_uuid("1234-abcd"), "1234-abcd");
    }

    #[test]
    fn test_invalid_proxy_url() {
        let result = Client::with_options(
            "https://pc.example.com:9440/api",
            "admin",
            "secret",
            ClientOptions {
                proxy_url: Some("not a url".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(ApiError::InvalidConfig(_))));
    }

    #[test]
    fn test_api_error_formatting() {
        let response: common::ApiErrorResponse = serde_json::from_value(json!({
            "data": {"error": [
                {"message": "name already exists", "code": "CLU-10001"},
                {"message": "second"}
            ]}
        }))
        .unwrap();
        let details = ApiErrorDetails::from_response(response);
        assert_eq!(details.summary(), "[CLU-10001] name already exists; second");

        let error = ApiError::Status {
            status: 409,
            message: details.summary(),
            details: Some(Box::new(details)),
        };
        let error_str = error.to_string();
        assert!(error_str.contains("HTTP 409"));
        assert!(error_str.contains("name already exists"));
        assert_eq!(error.status(), Some(409));
        assert!(!error.is_not_found());
    }
}

/// Provider data whose task waiter polls every few milliseconds
pub fn create_test_provider_data(url: &str) -> crate::provider_data::NutanixProviderData {
    let client = create_test_client(url);
    let waiter = crate::tasks::TaskWaiter::new(client.clone())
        .with_poll_interval(std::time::Duration::from_millis(5));
    crate::provider_data::NutanixProviderData::new(client)
        .with_waiter(waiter)
        .with_wait_timeout(Some(std::time::Duration::from_secs(5)))
}

/// Envelope of a task as returned by `GET /prism/v4.0/config/tasks/{id}`;
/// `entities` are `(rel, ext_id)` pairs
pub fn task_body(ext_id: &str, status: &str, entities: &[(&str, &str)]) -> String {
    let affected: Vec<serde_json::Value> = entities
        .iter()
        .map(|(rel, id)| serde_json::json!({"rel": rel, "extId": id}))
        .collect();
    let mut task = serde_json::json!({
        "extId": ext_id,
        "status": status,
        "progressPercentage": if status == "SUCCEEDED" { 100 } else { 40 },
        "entitiesAffected": affected,
    });
    if status == "FAILED" {
        task["errorMessages"] = serde_json::json!([{"message": "operation failed on the cluster"}]);
    }
    serde_json::json!({ "data": task }).to_string()
}

/// Envelope of a mutating call's task reference
pub fn task_reference_body(ext_id: &str) -> String {
    serde_json::json!({"data": {"extId": ext_id}}).to_string()
}
