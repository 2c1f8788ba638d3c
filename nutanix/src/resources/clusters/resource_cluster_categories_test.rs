#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::{create_test_provider_data, task_body, task_reference_body};
    use mockito::{Matcher, Server};
    use serde_json::json;

    const CLUSTER_PATH: &str = "/clustermgmt/v4.0/config/clusters/cluster-1";
    const ASSOCIATE_PATH: &str =
        "/clustermgmt/v4.0/config/clusters/cluster-1/$actions/associate-categories";
    const DISASSOCIATE_PATH: &str =
        "/clustermgmt/v4.0/config/clusters/cluster-1/$actions/disassociate-categories";
    const TASK_PATH: &str = "/prism/v4.0/config/tasks/task-1";

    fn value(v: serde_json::Value) -> DynamicValue {
        DynamicValue::new(Dynamic::from(v))
    }

    fn configured(server_url: &str) -> ClusterCategoriesResource {
        ClusterCategoriesResource {
            provider_data: Some(create_test_provider_data(server_url)),
        }
    }

    fn cluster_body(categories: &[&str]) -> String {
        json!({"data": {"extId": "cluster-1", "name": "prod", "categories": categories}})
            .to_string()
    }

    fn categories_state(categories: &[&str]) -> DynamicValue {
        value(json!({
            "id": "assoc-1",
            "cluster_ext_id": "cluster-1",
            "categories": categories
        }))
    }

    #[tokio::test]
    async fn test_create_associates_categories() {
        let mut server = Server::new_async().await;
        let associate = server
            .mock("POST", ASSOCIATE_PATH)
            .match_body(Matcher::Json(json!({"categories": ["cat-a", "cat-b"]})))
            .with_body(task_reference_body("task-1"))
            .expect(1)
            .create_async()
            .await;
        let _task = server
            .mock("GET", TASK_PATH)
            .with_body(task_body("task-1", "SUCCEEDED", &[]))
            .create_async()
            .await;

        let plan = value(json!({
            "id": "__unknown__",
            "cluster_ext_id": "cluster-1",
            "categories": ["cat-a", "cat-b"]
        }));
        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_cluster_categories_v2".to_string(),
                    planned_state: plan.clone(),
                    config: plan,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert!(response
            .new_state
            .get_optional_string(&AttributePath::new("id"))
            .is_some());
        associate.assert_async().await;
    }

    #[tokio::test]
    async fn test_read_refreshes_categories() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", CLUSTER_PATH)
            .with_header("ETag", "etag-1")
            .with_body(cluster_body(&["cat-a", "", "cat-c"]))
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "nutanix_cluster_categories_v2".to_string(),
                    current_state: categories_state(&["cat-a", "cat-b"]),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.new_state.unwrap();
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "assoc-1");
        assert_eq!(
            state.get_list(&AttributePath::new("categories")).unwrap(),
            vec![Dynamic::string("cat-a"), Dynamic::string("cat-c")]
        );
    }

    #[tokio::test]
    async fn test_read_missing_cluster_drops_state() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", CLUSTER_PATH)
            .with_status(404)
            .with_body(r#"{"data":{"error":[{"message":"cluster not found"}]}}"#)
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "nutanix_cluster_categories_v2".to_string(),
                    current_state: categories_state(&["cat-a"]),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert!(response.new_state.is_none());
    }

    #[tokio::test]
    async fn test_update_disassociates_before_associating() {
        let mut server = Server::new_async().await;
        let disassociate = server
            .mock("POST", DISASSOCIATE_PATH)
            .match_body(Matcher::Json(json!({"categories": ["cat-a"]})))
            .with_body(task_reference_body("task-1"))
            .expect(1)
            .create_async()
            .await;
        let associate = server
            .mock("POST", ASSOCIATE_PATH)
            .match_body(Matcher::Json(json!({"categories": ["cat-c"]})))
            .with_body(task_reference_body("task-1"))
            .expect(1)
            .create_async()
            .await;
        let _task = server
            .mock("GET", TASK_PATH)
            .with_body(task_body("task-1", "SUCCEEDED", &[]))
            .create_async()
            .await;
        let _get = server
            .mock("GET", CLUSTER_PATH)
            .with_header("ETag", "etag-1")
            .with_body(cluster_body(&["cat-b", "cat-c"]))
            .create_async()
            .await;

        let planned = value(json!({
            "id": "__unknown__",
            "cluster_ext_id": "cluster-1",
            "categories": ["cat-b", "cat-c"]
        }));
        let response = configured(&server.url())
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "nutanix_cluster_categories_v2".to_string(),
                    prior_state: categories_state(&["cat-a", "cat-b"]),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("id"))
                .unwrap(),
            "assoc-1"
        );
        disassociate.assert_async().await;
        associate.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_stops_after_failed_disassociation() {
        let mut server = Server::new_async().await;
        let _disassociate = server
            .mock("POST", DISASSOCIATE_PATH)
            .with_body(task_reference_body("task-1"))
            .create_async()
            .await;
        let associate = server
            .mock("POST", ASSOCIATE_PATH)
            .expect(0)
            .create_async()
            .await;
        let _task = server
            .mock("GET", TASK_PATH)
            .with_body(task_body("task-1", "FAILED", &[]))
            .create_async()
            .await;

        let planned = categories_state(&["cat-b", "cat-c"]);
        let response = configured(&server.url())
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "nutanix_cluster_categories_v2".to_string(),
                    prior_state: categories_state(&["cat-a", "cat-b"]),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].summary,
            "error waiting for categories to be disassociated from cluster (task-1)"
        );
        assert_eq!(response.new_state, categories_state(&["cat-a", "cat-b"]));
        associate.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_disassociates_all() {
        let mut server = Server::new_async().await;
        let disassociate = server
            .mock("POST", DISASSOCIATE_PATH)
            .match_body(Matcher::Json(json!({"categories": ["cat-a"]})))
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
                    type_name: "nutanix_cluster_categories_v2".to_string(),
                    prior_state: categories_state(&["cat-a"]),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        disassociate.assert_async().await;
    }

    #[tokio::test]
    async fn test_import_sets_cluster_ext_id() {
        let resource = ClusterCategoriesResource::new();
        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "nutanix_cluster_categories_v2".to_string(),
                    id: "cluster-1".to_string(),
                },
            )
            .await;

        assert_eq!(
            response.imported_resources[0]
                .state
                .get_string(&AttributePath::new("cluster_ext_id"))
                .unwrap(),
            "cluster-1"
        );
    }
}
