#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::{create_test_provider_data, task_body, task_reference_body};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::types::Dynamic;

    const CLUSTER_PATH: &str = "/clustermgmt/v4.0/config/clusters/cluster-1";
    const NETWORKING_PATH: &str =
        "/clustermgmt/v4.0/config/clusters/cluster-1/$actions/fetch-node-networking-details";
    const RESPONSE_PATH: &str =
        "/clustermgmt/v4.0/config/clusters/task-1/$actions/fetch-task-response";
    const TASK_PATH: &str = "/prism/v4.0/config/tasks/task-1";

    fn value(v: serde_json::Value) -> DynamicValue {
        DynamicValue::new(Dynamic::from(v))
    }

    fn configured(server_url: &str) -> ClusterNodeNetworksResource {
        ClusterNodeNetworksResource {
            provider_data: Some(create_test_provider_data(server_url)),
        }
    }

    fn plan() -> DynamicValue {
        value(json!({
            "id": "__unknown__",
            "ext_id": "cluster-1",
            "expand": null,
            "request_type": "__unknown__",
            "node_list": [{
                "node_uuid": "node-7",
                "block_id": "__unknown__",
                "hypervisor_type": "AHV",
                "is_compute_only": false,
                "cvm_ip": [{"ipv4": [{"value": "10.0.0.7", "prefix_length": 32}], "ipv6": []}],
                "hypervisor_ip": [],
                "ipmi_ip": [],
                "digital_certificate_map_list": []
            }],
            "nodes_networking_details": []
        }))
    }

    fn networking_body() -> String {
        json!({"data": {
            "taskResponseType": "NETWORKING_DETAILS",
            "response": {
                "networkInfo": {
                    "hci": [{"hypervisorType": "AHV", "name": "br0", "networks": ["Management"]}]
                },
                "uplinks": [{
                    "cvmIp": {"ipv4": {"value": "10.0.0.7", "prefixLength": 32}},
                    "uplinkList": [{"mac": "aa:bb", "name": "eth0"}]
                }],
                "warnings": ["link speed below 10G"]
            }
        }})
        .to_string()
    }

    #[test]
    fn test_resource_type_name() {
        assert_eq!(
            ClusterNodeNetworksResource::new().type_name(),
            "nutanix_clusters_unconfigured_node_networks_v2"
        );
    }

    #[tokio::test]
    async fn test_schema_requires_nodes() {
        let schema = ClusterNodeNetworksResource::new()
            .schema(Context::new(), ResourceSchemaRequest)
            .await
            .schema;

        assert!(schema.block.attribute("ext_id").unwrap().required);
        assert_eq!(schema.block.block_type("node_list").unwrap().min_items, 1);
        assert!(schema
            .block
            .block_type("nodes_networking_details")
            .unwrap()
            .keeps_prior());
    }

    #[test]
    fn test_expand_defaults_request_type() {
        let body = serde_json::to_value(expand_node_details(Attrs::of(&plan()))).unwrap();

        assert_eq!(body["requestType"], "expand_cluster");
        let node = &body["nodeList"][0];
        assert_eq!(node["nodeUuid"], "node-7");
        assert_eq!(node["hypervisorType"], "AHV");
        assert_eq!(node["isComputeOnly"], false);
        assert_eq!(node["cvmIp"], json!({"ipv4": {"value": "10.0.0.7", "prefixLength": 32}}));
        assert!(node.get("blockId").is_none());
        assert!(node.get("digitalCertificateMapList").is_none());
    }

    #[tokio::test]
    async fn test_create_records_networking_details() {
        let mut server = Server::new_async().await;
        let get = server
            .mock("GET", CLUSTER_PATH)
            .with_header("ETag", "etag-1")
            .with_body(json!({"data": {"extId": "cluster-1", "name": "prod"}}).to_string())
            .expect(1)
            .create_async()
            .await;
        let fetch = server
            .mock("POST", NETWORKING_PATH)
            .match_header("if-match", "etag-1")
            .match_body(Matcher::PartialJson(json!({
                "requestType": "expand_cluster",
                "nodeList": [{"nodeUuid": "node-7"}]
            })))
            .with_body(task_reference_body("task-1"))
            .expect(1)
            .create_async()
            .await;
        let _task = server
            .mock("GET", TASK_PATH)
            .with_body(task_body("task-1", "SUCCEEDED", &[]))
            .create_async()
            .await;
        let _response = server
            .mock("GET", RESPONSE_PATH)
            .match_query(Matcher::UrlEncoded(
                "$taskResponseType".into(),
                "NETWORKING_DETAILS".into(),
            ))
            .with_body(networking_body())
            .create_async()
            .await;

        let created = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_clusters_unconfigured_node_networks_v2".to_string(),
                    planned_state: plan(),
                    config: plan(),
                },
            )
            .await;

        assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
        let state = created.new_state;
        assert!(!state.get_string(&AttributePath::new("id")).unwrap().is_empty());
        assert_eq!(
            state.get_string(&AttributePath::new("request_type")).unwrap(),
            "expand_cluster"
        );
        assert!(state
            .get(&AttributePath::new("node_list").index(0).attribute("block_id"))
            .unwrap()
            .is_null());

        let details = AttributePath::new("nodes_networking_details").index(0);
        let hci = details
            .clone()
            .attribute("network_info")
            .index(0)
            .attribute("hci")
            .index(0);
        assert_eq!(state.get_string(&hci.clone().attribute("name")).unwrap(), "br0");
        assert_eq!(
            state.get_string(&hci.attribute("hypervisor_type")).unwrap(),
            "AHV"
        );
        assert_eq!(
            state
                .get_string(
                    &details
                        .clone()
                        .attribute("uplinks")
                        .index(0)
                        .attribute("uplink_list")
                        .index(0)
                        .attribute("mac")
                )
                .unwrap(),
            "aa:bb"
        );
        assert_eq!(
            state.get_list(&details.attribute("warnings")).unwrap().len(),
            1
        );
        get.assert_async().await;
        fetch.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_reports_cluster_read_error() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", CLUSTER_PATH)
            .with_status(404)
            .with_body(r#"{"data":{"error":[{"message":"cluster not found"}]}}"#)
            .create_async()
            .await;
        let fetch = server
            .mock("POST", NETWORKING_PATH)
            .expect(0)
            .create_async()
            .await;

        let created = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_clusters_unconfigured_node_networks_v2".to_string(),
                    planned_state: plan(),
                    config: plan(),
                },
            )
            .await;

        assert_eq!(created.diagnostics.len(), 1);
        assert_eq!(created.diagnostics[0].summary, "error while reading cluster");
        assert!(created.new_state.is_null());
        fetch.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_only_forgets() {
        let deleted = ClusterNodeNetworksResource::new()
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "nutanix_clusters_unconfigured_node_networks_v2".to_string(),
                    prior_state: value(json!({"id": "n-1", "ext_id": "cluster-1"})),
                },
            )
            .await;

        assert!(deleted.diagnostics.is_empty());
    }
}
