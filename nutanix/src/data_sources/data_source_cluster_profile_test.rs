#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::create_test_provider_data;
    use mockito::Server;
    use serde_json::json;
    use tfplug::types::{Dynamic, DynamicValue};

    const PROFILE_PATH: &str = "/clustermgmt/v4.0/config/cluster-profiles/profile-1";

    fn config() -> DynamicValue {
        DynamicValue::new(Dynamic::from(json!({"ext_id": "profile-1"})))
    }

    fn configured(server_url: &str) -> ClusterProfileDataSource {
        ClusterProfileDataSource {
            provider_data: Some(create_test_provider_data(server_url)),
        }
    }

    #[test]
    fn test_data_source_type_name() {
        assert_eq!(
            ClusterProfileDataSource::new().type_name(),
            "nutanix_cluster_profile_v2"
        );
    }

    #[tokio::test]
    async fn test_schema_name_is_computed() {
        let response = ClusterProfileDataSource::new()
            .schema(Context::new(), DataSourceSchemaRequest)
            .await;
        let name = response
            .schema
            .block
            .attributes
            .iter()
            .find(|a| a.name == "name")
            .unwrap();
        assert!(name.computed && !name.required);
    }

    #[tokio::test]
    async fn test_read_cluster_profile() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", PROFILE_PATH)
            .with_header("ETag", "etag-1")
            .with_body(
                json!({"data": {
                    "extId": "profile-1",
                    "name": "gold",
                    "clusterCount": 2,
                    "allowedOverrides": ["NTP_SERVER_CONFIG"],
                    "smtpServer": {
                        "emailAddress": "ops@example.com",
                        "server": {
                            "ipAddress": {"fqdn": {"value": "smtp.example.com"}},
                            "port": 587,
                            "password": "$REDACTED"
                        },
                        "type": "STARTTLS"
                    }
                }})
                .to_string(),
            )
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "nutanix_cluster_profile_v2".to_string(),
                    config: config(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "profile-1");
        assert_eq!(state.get_string(&AttributePath::new("name")).unwrap(), "gold");
        assert_eq!(
            state.get_number(&AttributePath::new("cluster_count")).unwrap(),
            2.0
        );
        let smtp = AttributePath::new("smtp_server").index(0);
        assert_eq!(
            state.get_string(&smtp.clone().attribute("type")).unwrap(),
            "STARTTLS"
        );
        assert_eq!(
            state
                .get_number(&smtp.attribute("server").index(0).attribute("port"))
                .unwrap(),
            587.0
        );
    }

    #[tokio::test]
    async fn test_read_null_profile_is_an_error() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", PROFILE_PATH)
            .with_header("ETag", "etag-1")
            .with_body(r#"{"data": null}"#)
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "nutanix_cluster_profile_v2".to_string(),
                    config: config(),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].detail,
            "cluster profile profile-1 not found"
        );
    }
}
