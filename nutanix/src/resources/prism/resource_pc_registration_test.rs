#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::{create_test_provider_data, task_body, task_reference_body};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::types::Dynamic;

    const PC_PATH: &str = "/prism/v4.0/config/domain-managers/pc-1";
    const REGISTER_PATH: &str = "/prism/v4.0/config/domain-managers/pc-1/$actions/register";
    const TASK_PATH: &str = "/prism/v4.0/config/tasks/task-1";

    fn value(v: serde_json::Value) -> DynamicValue {
        DynamicValue::new(Dynamic::from(v))
    }

    fn configured(server_url: &str) -> PcRegistrationResource {
        PcRegistrationResource {
            provider_data: Some(create_test_provider_data(server_url)),
        }
    }

    fn pc_body() -> String {
        json!({"data": {
            "extId": "pc-1",
            "tenantId": "tenant-1",
            "config": {
                "name": "pc-prod",
                "size": "SMALL",
                "buildInfo": {"version": "pc.2024.3"},
                "bootstrapConfig": {"environmentInfo": {"type": "ONPREM", "providerType": "NTNX"}},
                "resourceConfig": {"numVcpus": 6, "containerExtIds": ["ctr-1"]}
            },
            "network": {
                "externalAddress": {"ipv4": {"value": "10.0.0.10"}},
                "nameServers": [{"fqdn": {"value": "dns.example.com"}}],
                "externalNetworks": [{
                    "defaultGateway": {"ipv4": {"value": "10.0.0.1"}},
                    "ipRanges": [{"begin": {"ipv4": {"value": "10.0.0.20"}}, "end": {"ipv4": {"value": "10.0.0.30"}}}],
                    "networkExtId": "net-1"
                }]
            },
            "nodeExtIds": ["node-1"]
        }})
        .to_string()
    }

    fn remote_cluster(spec: serde_json::Value) -> serde_json::Value {
        json!([spec])
    }

    fn aos_plan() -> DynamicValue {
        value(json!({
            "id": "__unknown__",
            "pc_ext_id": "pc-1",
            "remote_cluster": remote_cluster(json!({
                "domain_manager_remote_cluster_spec": [],
                "aos_remote_cluster_spec": [{
                    "remote_cluster": [{
                        "address": [{"ipv4": [{"value": "10.0.1.5", "prefix_length": 32}], "ipv6": [], "fqdn": []}],
                        "credentials": [{"authentication": [{"username": "admin", "password": "secret"}]}]
                    }]
                }],
                "cluster_reference": []
            })),
            "tenant_id": "__unknown__"
        }))
    }

    #[test]
    fn test_expand_picks_configured_spec() {
        let spec = expand_remote_cluster(&aos_plan()).unwrap();
        assert_eq!(spec.object_type(), "prism.v4.management.AOSRemoteClusterSpec");
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({
                "$objectType": "prism.v4.management.AOSRemoteClusterSpec",
                "remoteCluster": {
                    "address": {"ipv4": {"value": "10.0.1.5", "prefixLength": 32}},
                    "credentials": {"authentication": {"username": "admin", "password": "secret"}}
                }
            })
        );
    }

    #[test]
    fn test_expand_without_spec_fails() {
        let plan = value(json!({
            "pc_ext_id": "pc-1",
            "remote_cluster": remote_cluster(json!({
                "domain_manager_remote_cluster_spec": [],
                "aos_remote_cluster_spec": [],
                "cluster_reference": []
            }))
        }));
        let err = expand_remote_cluster(&plan).unwrap_err();
        assert_eq!(
            err.summary,
            "none of [domain_manager_remote_cluster_spec aos_remote_cluster_spec cluster_reference] is provided"
        );
    }

    #[tokio::test]
    async fn test_validate_rejects_two_specs() {
        let config = value(json!({
            "pc_ext_id": "pc-1",
            "remote_cluster": remote_cluster(json!({
                "domain_manager_remote_cluster_spec": [],
                "aos_remote_cluster_spec": [{"remote_cluster": []}],
                "cluster_reference": [{"ext_id": "cluster-1"}]
            }))
        }));
        let response = PcRegistrationResource::new()
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "nutanix_pc_registration_v2".to_string(),
                    config,
                },
            )
            .await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].summary,
            "Conflicting remote cluster specifications"
        );
    }

    #[tokio::test]
    async fn test_create_registers_with_etag() {
        let mut server = Server::new_async().await;
        let get = server
            .mock("GET", PC_PATH)
            .with_header("ETag", "pc-etag")
            .with_body(pc_body())
            .expect(2)
            .create_async()
            .await;
        let register = server
            .mock("POST", REGISTER_PATH)
            .match_header("If-Match", "pc-etag")
            .match_body(Matcher::PartialJson(json!({
                "remoteCluster": {"$objectType": "prism.v4.management.AOSRemoteClusterSpec"}
            })))
            .with_status(202)
            .with_body(task_reference_body("task-1"))
            .expect(1)
            .create_async()
            .await;
        let _task = server
            .mock("GET", TASK_PATH)
            .with_body(task_body("task-1", "SUCCEEDED", &[]))
            .create_async()
            .await;

        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_pc_registration_v2".to_string(),
                    planned_state: aos_plan(),
                    config: aos_plan(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.new_state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "pc-1");
        assert_eq!(
            state.get_string(&AttributePath::new("tenant_id")).unwrap(),
            "tenant-1"
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("config").index(0).attribute("size"))
                .unwrap(),
            "SMALL"
        );
        assert_eq!(
            state
                .get_string(
                    &AttributePath::new("network")
                        .index(0)
                        .attribute("external_networks")
                        .index(0)
                        .attribute("ip_ranges")
                        .index(0)
                        .attribute("begin")
                        .index(0)
                        .attribute("ipv4")
                        .index(0)
                        .attribute("value")
                )
                .unwrap(),
            "10.0.0.20"
        );
        get.assert_async().await;
        register.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_reports_failed_registration() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", PC_PATH)
            .with_header("ETag", "pc-etag")
            .with_body(pc_body())
            .create_async()
            .await;
        let _register = server
            .mock("POST", REGISTER_PATH)
            .with_body(task_reference_body("task-1"))
            .create_async()
            .await;
        let _task = server
            .mock("GET", TASK_PATH)
            .with_body(task_body("task-1", "FAILED", &[]))
            .create_async()
            .await;

        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_pc_registration_v2".to_string(),
                    planned_state: aos_plan(),
                    config: aos_plan(),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].summary,
            "error waiting for PC registration to complete (task-1)"
        );
    }

    #[tokio::test]
    async fn test_create_with_unknown_pc_fails_before_register() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", PC_PATH)
            .with_status(404)
            .with_body(r#"{"data":{"error":[{"message":"not found"}]}}"#)
            .create_async()
            .await;
        let register = server
            .mock("POST", REGISTER_PATH)
            .expect(0)
            .create_async()
            .await;

        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_pc_registration_v2".to_string(),
                    planned_state: aos_plan(),
                    config: aos_plan(),
                },
            )
            .await;

        assert_eq!(
            response.diagnostics[0].summary,
            "error while fetching domain manager with id pc-1"
        );
        register.assert_async().await;
    }

    #[tokio::test]
    async fn test_read_refreshes_computed_fields() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", PC_PATH)
            .with_header("ETag", "pc-etag")
            .with_body(pc_body())
            .create_async()
            .await;

        let current = value(json!({"id": "pc-1", "pc_ext_id": "pc-1", "node_ext_ids": []}));
        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "nutanix_pc_registration_v2".to_string(),
                    current_state: current,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.new_state.unwrap();
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "pc-1");
        assert_eq!(
            state.get_list(&AttributePath::new("node_ext_ids")).unwrap(),
            vec![Dynamic::string("node-1")]
        );
        assert_eq!(
            state
                .get_string(
                    &AttributePath::new("network")
                        .index(0)
                        .attribute("name_servers")
                        .index(0)
                        .attribute("fqdn")
                        .index(0)
                        .attribute("value")
                )
                .unwrap(),
            "dns.example.com"
        );
    }

    #[tokio::test]
    async fn test_update_keeps_prior_computed_state() {
        let prior = value(json!({"id": "pc-1", "pc_ext_id": "pc-1", "tenant_id": "tenant-1", "remote_cluster": []}));
        let response = PcRegistrationResource::new()
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "nutanix_pc_registration_v2".to_string(),
                    prior_state: prior,
                    planned_state: aos_plan(),
                    config: aos_plan(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("tenant_id"))
                .unwrap(),
            "tenant-1"
        );
        assert_eq!(
            response
                .new_state
                .get_list(&AttributePath::new("remote_cluster"))
                .unwrap()
                .len(),
            1
        );
    }
}
