#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::{create_test_provider_data, task_body, task_reference_body};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::types::Dynamic;

    const DISCOVER_PATH: &str =
        "/clustermgmt/v4.0/config/clusters/cluster-1/$actions/discover-unconfigured-nodes";
    const RESPONSE_PATH: &str =
        "/clustermgmt/v4.0/config/clusters/task-1/$actions/fetch-task-response";
    const TASK_PATH: &str = "/prism/v4.0/config/tasks/task-1";

    fn value(v: serde_json::Value) -> DynamicValue {
        DynamicValue::new(Dynamic::from(v))
    }

    fn configured(server_url: &str) -> ClusterDiscoverNodesResource {
        ClusterDiscoverNodesResource {
            provider_data: Some(create_test_provider_data(server_url)),
        }
    }

    fn plan() -> DynamicValue {
        value(json!({
            "id": "__unknown__",
            "ext_id": "cluster-1",
            "address_type": "IPV4",
            "ip_filter_list": [{"ipv4": [{"value": "10.0.0.7", "prefix_length": 32}], "ipv6": []}],
            "uuid_filter_list": null,
            "timeout": 60,
            "interface_filter_list": ["eth0"],
            "is_manual_discovery": true,
            "unconfigured_nodes": []
        }))
    }

    fn discovered_nodes_body() -> String {
        json!({"data": {
            "taskResponseType": "UNCONFIGURED_NODES",
            "response": {"nodeList": [{
                "arch": "X86_64",
                "nodeUuid": "node-7",
                "cpuType": ["Intel"],
                "hostType": "HYPER_CONVERGED",
                "hypervisorType": "AHV",
                "cvmIp": {"ipv4": {"value": "10.0.0.7", "prefixLength": 32}},
                "rackableUnitMaxNodes": 4,
                "isSecureBooted": false,
                "attributes": {"lcmFamily": "smc_gen_11", "shouldWorkWith1GNic": true}
            }]}
        }})
        .to_string()
    }

    #[test]
    fn test_resource_type_name() {
        assert_eq!(
            ClusterDiscoverNodesResource::new().type_name(),
            "nutanix_clusters_discover_unconfigured_nodes_v2"
        );
    }

    #[tokio::test]
    async fn test_schema_reports_nodes_read_only() {
        let schema = ClusterDiscoverNodesResource::new()
            .schema(Context::new(), ResourceSchemaRequest)
            .await
            .schema;

        let ext_id = schema.block.attribute("ext_id").unwrap();
        assert!(ext_id.required);
        let nodes = schema.block.block_type("unconfigured_nodes").unwrap();
        assert!(nodes.keeps_prior());
        assert!(schema.block.block_type("ip_filter_list").is_some());
    }

    #[test]
    fn test_expand_discovery_params() {
        let body = serde_json::to_value(expand_discovery_params(Attrs::of(&plan()))).unwrap();

        assert_eq!(
            body,
            json!({
                "addressType": "IPV4",
                "ipFilterList": [{"ipv4": {"value": "10.0.0.7", "prefixLength": 32}}],
                "timeout": 60,
                "interfaceFilterList": ["eth0"],
                "isManualDiscovery": true
            })
        );
    }

    #[tokio::test]
    async fn test_create_records_discovered_nodes() {
        let mut server = Server::new_async().await;
        let discover = server
            .mock("POST", DISCOVER_PATH)
            .match_body(Matcher::PartialJson(json!({
                "addressType": "IPV4",
                "ipFilterList": [{"ipv4": {"value": "10.0.0.7"}}]
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
        let response = server
            .mock("GET", RESPONSE_PATH)
            .match_query(Matcher::UrlEncoded(
                "$taskResponseType".into(),
                "UNCONFIGURED_NODES".into(),
            ))
            .with_body(discovered_nodes_body())
            .expect(1)
            .create_async()
            .await;

        let created = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_clusters_discover_unconfigured_nodes_v2".to_string(),
                    planned_state: plan(),
                    config: plan(),
                },
            )
            .await;

        assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
        let state = created.new_state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "task-1");
        let node = AttributePath::new("unconfigured_nodes").index(0);
        assert_eq!(
            state.get_string(&node.clone().attribute("node_uuid")).unwrap(),
            "node-7"
        );
        assert_eq!(
            state.get_string(&node.clone().attribute("host_type")).unwrap(),
            "HYPER_CONVERGED"
        );
        assert_eq!(
            state
                .get_string(
                    &node
                        .clone()
                        .attribute("cvm_ip")
                        .index(0)
                        .attribute("ipv4")
                        .index(0)
                        .attribute("value")
                )
                .unwrap(),
            "10.0.0.7"
        );
        let attributes = node.attribute("attributes").index(0);
        assert!(state
            .get_bool(&attributes.attribute("should_work_with_1g_nic"))
            .unwrap());
        discover.assert_async().await;
        response.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_failed_task_records_nothing() {
        let mut server = Server::new_async().await;
        let _discover = server
            .mock("POST", DISCOVER_PATH)
            .with_body(task_reference_body("task-1"))
            .create_async()
            .await;
        let _task = server
            .mock("GET", TASK_PATH)
            .with_body(task_body("task-1", "FAILED", &[]))
            .create_async()
            .await;
        let response = server
            .mock("GET", RESPONSE_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let created = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_clusters_discover_unconfigured_nodes_v2".to_string(),
                    planned_state: plan(),
                    config: plan(),
                },
            )
            .await;

        assert_eq!(created.diagnostics.len(), 1);
        assert!(created.new_state.is_null());
        response.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_rediscovers() {
        let mut server = Server::new_async().await;
        let discover = server
            .mock("POST", DISCOVER_PATH)
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
            .match_query(Matcher::Any)
            .with_body(discovered_nodes_body())
            .create_async()
            .await;

        let mut planned = plan();
        planned
            .set_string(&AttributePath::new("id"), "task-0".to_string())
            .unwrap();
        let updated = configured(&server.url())
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "nutanix_clusters_discover_unconfigured_nodes_v2".to_string(),
                    prior_state: planned.clone(),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
        assert_eq!(
            updated.new_state.get_string(&AttributePath::new("id")).unwrap(),
            "task-0"
        );
        discover.assert_async().await;
    }

    #[tokio::test]
    async fn test_read_and_delete_touch_nothing() {
        let resource = ClusterDiscoverNodesResource::new();
        let state = value(json!({"id": "task-1", "ext_id": "cluster-1"}));

        let read = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "nutanix_clusters_discover_unconfigured_nodes_v2".to_string(),
                    current_state: state.clone(),
                },
            )
            .await;
        assert_eq!(read.new_state, Some(state.clone()));

        let deleted = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "nutanix_clusters_discover_unconfigured_nodes_v2".to_string(),
                    prior_state: state,
                },
            )
            .await;
        assert!(deleted.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_create_without_provider_data() {
        let created = ClusterDiscoverNodesResource::new()
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_clusters_discover_unconfigured_nodes_v2".to_string(),
                    planned_state: plan(),
                    config: plan(),
                },
            )
            .await;

        assert_eq!(created.diagnostics.len(), 1);
        assert_eq!(created.diagnostics[0].summary, "Provider not configured");
    }
}
