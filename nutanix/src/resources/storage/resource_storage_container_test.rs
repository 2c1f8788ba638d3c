#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::{create_test_provider_data, task_body, task_reference_body};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::sync::Arc;
    use tfplug::types::Dynamic;

    const CONTAINERS_PATH: &str = "/clustermgmt/v4.0/config/storage-containers";
    const CONTAINER_PATH: &str = "/clustermgmt/v4.0/config/storage-containers/sc-1";
    const TASK_PATH: &str = "/prism/v4.0/config/tasks/task-1";

    fn value(v: serde_json::Value) -> DynamicValue {
        DynamicValue::new(Dynamic::from(v))
    }

    fn container_body(name: &str) -> String {
        json!({"data": {
            "extId": "sc-1",
            "name": name,
            "clusterExtId": "cluster-1",
            "clusterName": "prod",
            "replicationFactor": 2,
            "erasureCode": "OFF",
            "onDiskDedup": "POST_PROCESS",
            "cacheDeduplication": "$REDACTED",
            "maxCapacityBytes": 1099511627776i64,
            "isEncrypted": false,
            "nfsWhitelistAddress": [{"ipv4": {"value": "10.0.0.1", "prefixLength": 32}}]
        }})
        .to_string()
    }

    fn configured(server_url: &str) -> StorageContainerResource {
        StorageContainerResource {
            provider_data: Some(create_test_provider_data(server_url)),
        }
    }

    fn prior_state() -> DynamicValue {
        value(json!({
            "id": "sc-1",
            "ext_id": "sc-1",
            "name": "sc-old",
            "cluster_ext_id": "cluster-1",
            "replication_factor": 2,
            "ignore_small_files": false
        }))
    }

    #[test]
    fn test_resource_type_name() {
        let resource = StorageContainerResource::new();
        assert_eq!(resource.type_name(), "nutanix_storage_containers_v2");
    }

    #[tokio::test]
    async fn test_resource_schema() {
        let resource = StorageContainerResource::new();
        let response = resource.schema(Context::new(), ResourceSchemaRequest).await;

        assert!(response.diagnostics.is_empty());
        let attrs = &response.schema.block.attributes;
        assert!(attrs.iter().any(|a| a.name == "name" && a.required));
        assert!(attrs.iter().any(|a| a.name == "cluster_ext_id" && a.required));
        assert!(attrs
            .iter()
            .any(|a| a.name == "ext_id" && a.optional && a.computed));
        assert!(attrs
            .iter()
            .any(|a| a.name == "max_capacity_bytes" && a.computed && !a.optional));
        assert!(attrs
            .iter()
            .any(|a| a.name == "ignore_small_files" && a.optional));
        assert!(response
            .schema
            .block
            .block_types
            .iter()
            .any(|b| b.type_name == "nfs_whitelist_addresses"));
    }

    #[tokio::test]
    async fn test_validate_rejects_zero_replication_factor() {
        let resource = StorageContainerResource::new();
        let response = resource
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "nutanix_storage_containers_v2".to_string(),
                    config: value(json!({"name": "sc", "cluster_ext_id": "c", "replication_factor": 0})),
                },
            )
            .await;
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].summary.contains("replication factor"));
    }

    #[test]
    fn test_expand_skips_unknown_and_absent_values() {
        let plan = value(json!({
            "name": "sc",
            "cluster_ext_id": "cluster-1",
            "ext_id": "__unknown__",
            "erasure_code": "ON",
            "on_disk_dedup": "SOMETIMES",
            "nfs_whitelist_addresses": []
        }));
        let body = expand_storage_container(Attrs::of(&plan));

        assert_eq!(body.name.as_deref(), Some("sc"));
        assert_eq!(body.ext_id, None);
        assert_eq!(body.erasure_code, Some(ErasureCodeStatus::On));
        assert_eq!(body.on_disk_dedup, None);
        assert_eq!(body.nfs_whitelist_address, None);
        assert_eq!(body.replication_factor, None);
    }

    #[tokio::test]
    async fn test_create_without_provider_data() {
        let resource = StorageContainerResource::new();
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_storage_containers_v2".to_string(),
                    planned_state: prior_state(),
                    config: prior_state(),
                },
            )
            .await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }

    #[tokio::test]
    async fn test_create_successful() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("POST", CONTAINERS_PATH)
            .match_query(Matcher::UrlEncoded(
                "$clusterExtId".into(),
                "cluster-1".into(),
            ))
            .match_body(Matcher::PartialJson(json!({
                "name": "sc-new",
                "erasureCode": "OFF"
            })))
            .with_body(task_reference_body("task-1"))
            .expect(1)
            .create_async()
            .await;
        let task = server
            .mock("GET", TASK_PATH)
            .with_body(task_body(
                "task-1",
                "SUCCEEDED",
                &[(STORAGE_CONTAINER_REL, "sc-1")],
            ))
            .create_async()
            .await;
        let read = server
            .mock("GET", CONTAINER_PATH)
            .with_header("ETag", "etag-1")
            .with_body(container_body("sc-new"))
            .expect(1)
            .create_async()
            .await;

        let plan = value(json!({
            "name": "sc-new",
            "cluster_ext_id": "cluster-1",
            "erasure_code": "OFF",
            "ext_id": "__unknown__",
            "ignore_small_files": true
        }));
        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_storage_containers_v2".to_string(),
                    planned_state: plan.clone(),
                    config: plan,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = &response.new_state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "sc-1");
        assert_eq!(
            state.get_string(&AttributePath::new("ext_id")).unwrap(),
            "sc-1"
        );
        assert_eq!(
            state.get_string(&AttributePath::new("cluster_name")).unwrap(),
            "prod"
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("cache_deduplication"))
                .unwrap(),
            "UNKNOWN"
        );
        assert_eq!(
            state.get_string(&AttributePath::new("on_disk_dedup")).unwrap(),
            "POST_PROCESS"
        );
        assert_eq!(
            state
                .get_string(
                    &AttributePath::new("nfs_whitelist_addresses")
                        .index(0)
                        .attribute("ipv4")
                        .index(0)
                        .attribute("value")
                )
                .unwrap(),
            "10.0.0.1"
        );
        assert!(state
            .get_bool(&AttributePath::new("ignore_small_files"))
            .unwrap());

        create.assert_async().await;
        task.assert_async().await;
        read.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_failed_task_skips_read() {
        let mut server = Server::new_async().await;
        let _create = server
            .mock("POST", CONTAINERS_PATH)
            .match_query(Matcher::Any)
            .with_body(task_reference_body("task-1"))
            .create_async()
            .await;
        let _task = server
            .mock("GET", TASK_PATH)
            .with_body(task_body("task-1", "FAILED", &[]))
            .create_async()
            .await;
        let read = server
            .mock("GET", CONTAINER_PATH)
            .expect(0)
            .create_async()
            .await;

        let plan = value(json!({"name": "sc-new", "cluster_ext_id": "cluster-1"}));
        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_storage_containers_v2".to_string(),
                    planned_state: plan.clone(),
                    config: plan,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].summary,
            "error waiting for storage container to be created (task-1)"
        );
        assert!(response.diagnostics[0]
            .detail
            .contains("operation failed on the cluster"));
        read.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_api_error() {
        let mut server = Server::new_async().await;
        let _create = server
            .mock("POST", CONTAINERS_PATH)
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"data":{"error":[{"message":"invalid name","code":"CLU-1"}]}}"#)
            .create_async()
            .await;

        let plan = value(json!({"name": "bad name", "cluster_ext_id": "cluster-1"}));
        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_storage_containers_v2".to_string(),
                    planned_state: plan.clone(),
                    config: plan,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].summary,
            "error while creating storage containers"
        );
        assert!(response.diagnostics[0].detail.contains("invalid name"));
    }

    #[tokio::test]
    async fn test_read_successful_keeps_input_only_attributes() {
        let mut server = Server::new_async().await;
        let _read = server
            .mock("GET", CONTAINER_PATH)
            .with_header("ETag", "etag-1")
            .with_body(container_body("sc-old"))
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "nutanix_storage_containers_v2".to_string(),
                    current_state: prior_state(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state = response.new_state.unwrap();
        assert_eq!(
            state.get_number(&AttributePath::new("max_capacity_bytes")).unwrap(),
            1099511627776.0
        );
        assert!(!state
            .get_bool(&AttributePath::new("ignore_small_files"))
            .unwrap());
    }

    #[tokio::test]
    async fn test_read_not_found_removes_state() {
        let mut server = Server::new_async().await;
        let _read = server
            .mock("GET", CONTAINER_PATH)
            .with_status(404)
            .with_body(r#"{"data":{"error":[{"message":"not found"}]}}"#)
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "nutanix_storage_containers_v2".to_string(),
                    current_state: prior_state(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert!(response.new_state.is_none());
    }

    #[tokio::test]
    async fn test_update_sends_changed_fields_over_current_entity() {
        let mut server = Server::new_async().await;
        let get = server
            .mock("GET", CONTAINER_PATH)
            .with_header("ETag", "etag-1")
            .with_body(container_body("sc-old"))
            .expect(1)
            .create_async()
            .await;
        let put = server
            .mock("PUT", CONTAINER_PATH)
            .match_header("if-match", "etag-1")
            .match_body(Matcher::PartialJson(json!({
                "name": "sc-new",
                "replicationFactor": 2,
                "clusterName": "prod"
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
        let reread = server
            .mock("GET", CONTAINER_PATH)
            .with_header("ETag", "etag-2")
            .with_body(container_body("sc-new"))
            .expect(1)
            .create_async()
            .await;

        let planned = value(json!({
            "id": "sc-1",
            "ext_id": "sc-1",
            "name": "sc-new",
            "cluster_ext_id": "cluster-1",
            "replication_factor": 2,
            "ignore_small_files": false
        }));
        let response = configured(&server.url())
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "nutanix_storage_containers_v2".to_string(),
                    prior_state: prior_state(),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("name"))
                .unwrap(),
            "sc-new"
        );
        get.assert_async().await;
        put.assert_async().await;
        reread.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_removed_whitelist_sends_empty_list() {
        let mut server = Server::new_async().await;
        let get = server
            .mock("GET", CONTAINER_PATH)
            .with_header("ETag", "etag-1")
            .with_body(container_body("sc-old"))
            .expect(1)
            .create_async()
            .await;
        let put = server
            .mock("PUT", CONTAINER_PATH)
            .match_body(Matcher::PartialJson(json!({"nfsWhitelistAddress": []})))
            .with_body(task_reference_body("task-1"))
            .expect(1)
            .create_async()
            .await;
        let _task = server
            .mock("GET", TASK_PATH)
            .with_body(task_body("task-1", "SUCCEEDED", &[]))
            .create_async()
            .await;
        let _reread = server
            .mock("GET", CONTAINER_PATH)
            .with_header("ETag", "etag-2")
            .with_body(container_body("sc-old"))
            .create_async()
            .await;

        let prior = value(json!({
            "id": "sc-1",
            "ext_id": "sc-1",
            "name": "sc-old",
            "cluster_ext_id": "cluster-1",
            "replication_factor": 2,
            "ignore_small_files": false,
            "nfs_whitelist_addresses": [{"ipv4": [{"value": "10.0.0.1", "prefix_length": 32}]}]
        }));
        let planned = value(json!({
            "id": "sc-1",
            "ext_id": "sc-1",
            "name": "sc-old",
            "cluster_ext_id": "cluster-1",
            "replication_factor": 2,
            "ignore_small_files": false,
            "nfs_whitelist_addresses": []
        }));
        let response = configured(&server.url())
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "nutanix_storage_containers_v2".to_string(),
                    prior_state: prior,
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        get.assert_async().await;
        put.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_without_etag_fails_before_write() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", CONTAINER_PATH)
            .with_body(container_body("sc-old"))
            .create_async()
            .await;
        let put = server
            .mock("PUT", CONTAINER_PATH)
            .expect(0)
            .create_async()
            .await;

        let planned = value(json!({"ext_id": "sc-1", "name": "sc-new", "cluster_ext_id": "cluster-1"}));
        let response = configured(&server.url())
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "nutanix_storage_containers_v2".to_string(),
                    prior_state: prior_state(),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].detail.contains("ETag"));
        assert_eq!(response.new_state, prior_state());
        put.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_passes_ignore_small_files() {
        let mut server = Server::new_async().await;
        let delete = server
            .mock("DELETE", CONTAINER_PATH)
            .match_query(Matcher::UrlEncoded(
                "$ignoreSmallFiles".into(),
                "false".into(),
            ))
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
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "nutanix_storage_containers_v2".to_string(),
                    prior_state: prior_state(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_import_state() {
        let resource = StorageContainerResource::new();
        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "nutanix_storage_containers_v2".to_string(),
                    id: "sc-1".to_string(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(
            response.imported_resources[0]
                .state
                .get_string(&AttributePath::new("ext_id"))
                .unwrap(),
            "sc-1"
        );
    }

    #[tokio::test]
    async fn test_configure_resource() {
        let mut resource = StorageContainerResource::new();
        let data = create_test_provider_data("http://localhost:9440");
        let response = resource
            .configure(
                Context::new(),
                ConfigureResourceRequest {
                    provider_data: Some(Arc::new(data)),
                },
            )
            .await;
        assert!(response.diagnostics.is_empty());
        assert!(resource.provider_data.is_some());

        let response = resource
            .configure(
                Context::new(),
                ConfigureResourceRequest {
                    provider_data: Some(Arc::new("not provider data")),
                },
            )
            .await;
        assert_eq!(response.diagnostics[0].summary, "Invalid provider data");
    }
}
