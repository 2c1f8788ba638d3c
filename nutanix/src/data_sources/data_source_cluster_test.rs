#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::create_test_provider_data;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::types::{Dynamic, DynamicValue};

    const CLUSTER_PATH: &str = "/clustermgmt/v4.0/config/clusters/cluster-1";

    fn config(v: serde_json::Value) -> DynamicValue {
        DynamicValue::new(Dynamic::from(v))
    }

    fn configured(server_url: &str) -> ClusterDataSource {
        ClusterDataSource {
            provider_data: Some(create_test_provider_data(server_url)),
        }
    }

    #[test]
    fn test_data_source_type_name() {
        assert_eq!(ClusterDataSource::new().type_name(), "nutanix_cluster_v2");
    }

    #[tokio::test]
    async fn test_schema_requires_ext_id() {
        let response = ClusterDataSource::new()
            .schema(Context::new(), DataSourceSchemaRequest)
            .await;
        let ext_id = response
            .schema
            .block
            .attributes
            .iter()
            .find(|a| a.name == "ext_id")
            .unwrap();
        assert!(ext_id.required);
        let network = response
            .schema
            .block
            .block_types
            .iter()
            .find(|b| b.type_name == "network")
            .unwrap();
        assert!(network
            .block
            .attributes
            .iter()
            .all(|a| a.computed && !a.optional));
    }

    #[tokio::test]
    async fn test_read_cluster() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", CLUSTER_PATH)
            .match_query(Matcher::UrlEncoded("$expand".into(), "clusterProfile".into()))
            .with_header("ETag", "etag-1")
            .with_body(
                json!({"data": {
                    "extId": "cluster-1",
                    "name": "prod",
                    "vmCount": 4,
                    "upgradeStatus": "SUCCEEDED",
                    "categories": ["cat-1"],
                    "nodes": {
                        "numberOfNodes": 1,
                        "nodeList": [{"nodeUuid": "node-1"}]
                    },
                    "config": {"clusterFunction": ["AOS"], "redundancyFactor": 2}
                }})
                .to_string(),
            )
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "nutanix_cluster_v2".to_string(),
                    config: config(json!({"ext_id": "cluster-1", "expand": "clusterProfile"})),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "cluster-1");
        assert_eq!(state.get_string(&AttributePath::new("name")).unwrap(), "prod");
        assert_eq!(
            state.get_string(&AttributePath::new("expand")).unwrap(),
            "clusterProfile"
        );
        assert_eq!(
            state.get_string(&AttributePath::new("upgrade_status")).unwrap(),
            "SUCCEEDED"
        );
        assert_eq!(
            state
                .get_string(
                    &AttributePath::new("nodes")
                        .index(0)
                        .attribute("node_list")
                        .index(0)
                        .attribute("node_uuid")
                )
                .unwrap(),
            "node-1"
        );
        assert_eq!(
            state
                .get_number(
                    &AttributePath::new("config")
                        .index(0)
                        .attribute("redundancy_factor")
                )
                .unwrap(),
            2.0
        );
    }

    #[tokio::test]
    async fn test_read_api_error() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", CLUSTER_PATH)
            .with_status(404)
            .with_body(r#"{"data": {"error": [{"message": "not found"}]}}"#)
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "nutanix_cluster_v2".to_string(),
                    config: config(json!({"ext_id": "cluster-1"})),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].summary,
            "error while fetching cluster entity"
        );
    }

    #[tokio::test]
    async fn test_read_without_provider_data() {
        let response = ClusterDataSource::new()
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "nutanix_cluster_v2".to_string(),
                    config: config(json!({"ext_id": "cluster-1"})),
                },
            )
            .await;
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }
}
