#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::{create_test_provider_data, task_body, task_reference_body};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::types::Dynamic;

    const APPLY_PATH: &str = "/clustermgmt/v4.0/config/cluster-profiles/profile-1/$actions/apply";
    const DISASSOCIATE_PATH: &str =
        "/clustermgmt/v4.0/config/cluster-profiles/profile-1/$actions/disassociate-cluster";
    const TASK_PATH: &str = "/prism/v4.0/config/tasks/task-1";

    fn value(v: serde_json::Value) -> DynamicValue {
        DynamicValue::new(Dynamic::from(v))
    }

    fn configured(server_url: &str) -> ClusterProfileAssociationResource {
        ClusterProfileAssociationResource {
            provider_data: Some(create_test_provider_data(server_url)),
        }
    }

    fn state(clusters: &[&str], dryrun: bool) -> DynamicValue {
        value(json!({
            "id": "assoc-1",
            "ext_id": "profile-1",
            "dryrun": dryrun,
            "clusters": clusters
        }))
    }

    #[test]
    fn test_dryrun_off_applies_every_cluster() {
        let (added, removed) =
            association_changes(&state(&["c1", "c2"], true), &state(&["c1", "c2"], false));
        assert_eq!(added, vec!["c1".to_string(), "c2".to_string()]);
        assert!(removed.is_empty());

        let (added, removed) =
            association_changes(&state(&["c1", "c2"], false), &state(&["c2", "c3"], false));
        assert_eq!(added, vec!["c3".to_string()]);
        assert_eq!(removed, vec!["c1".to_string()]);

        let (added, removed) =
            association_changes(&state(&["c1"], false), &state(&["c1"], true));
        assert!(added.is_empty());
        assert!(removed.is_empty());
    }

    #[tokio::test]
    async fn test_schema_requires_replace_on_profile() {
        let resource = ClusterProfileAssociationResource::new();
        let response = resource.schema(Context::new(), ResourceSchemaRequest).await;
        let ext_id = response.schema.block.attribute("ext_id").unwrap();
        assert!(ext_id.required);
        assert_eq!(ext_id.plan_modifiers.len(), 1);
        assert!(response
            .schema
            .block
            .attribute("clusters")
            .is_some_and(|a| a.required));
    }

    #[tokio::test]
    async fn test_validate_rejects_empty_cluster_set() {
        let resource = ClusterProfileAssociationResource::new();
        let response = resource
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "nutanix_cluster_profile_association_v2".to_string(),
                    config: value(json!({"ext_id": "profile-1", "clusters": []})),
                },
            )
            .await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "No clusters");
    }

    #[tokio::test]
    async fn test_create_applies_profile_and_sets_random_id() {
        let mut server = Server::new_async().await;
        let apply = server
            .mock("POST", APPLY_PATH)
            .match_query(Matcher::UrlEncoded("$dryrun".into(), "false".into()))
            .match_body(Matcher::Json(json!({"clusters": [{"uuid": "c1"}]})))
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
            "ext_id": "profile-1",
            "dryrun": false,
            "clusters": ["c1"]
        }));
        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_cluster_profile_association_v2".to_string(),
                    planned_state: plan.clone(),
                    config: plan,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let id = response
            .new_state
            .get_string(&AttributePath::new("id"))
            .unwrap();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        apply.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_failed_task_reports_error() {
        let mut server = Server::new_async().await;
        let _apply = server
            .mock("POST", APPLY_PATH)
            .match_query(Matcher::Any)
            .with_body(task_reference_body("task-1"))
            .create_async()
            .await;
        let _task = server
            .mock("GET", TASK_PATH)
            .with_body(task_body("task-1", "FAILED", &[]))
            .create_async()
            .await;

        let plan = state(&["c1"], false);
        let response = configured(&server.url())
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "nutanix_cluster_profile_association_v2".to_string(),
                    planned_state: plan.clone(),
                    config: plan,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].summary,
            "error waiting for cluster profile to associate (task-1)"
        );
    }

    #[tokio::test]
    async fn test_update_applies_added_then_disassociates_removed() {
        let mut server = Server::new_async().await;
        let apply = server
            .mock("POST", APPLY_PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({"clusters": [{"uuid": "c3"}]})))
            .with_body(task_reference_body("task-1"))
            .expect(1)
            .create_async()
            .await;
        let disassociate = server
            .mock("POST", DISASSOCIATE_PATH)
            .match_body(Matcher::Json(json!({"clusters": [{"uuid": "c1"}]})))
            .with_body(task_reference_body("task-1"))
            .expect(1)
            .create_async()
            .await;
        let _task = server
            .mock("GET", TASK_PATH)
            .with_body(task_body("task-1", "SUCCEEDED", &[]))
            .create_async()
            .await;

        let planned = state(&["c2", "c3"], false);
        let response = configured(&server.url())
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "nutanix_cluster_profile_association_v2".to_string(),
                    prior_state: state(&["c1", "c2"], false),
                    planned_state: planned.clone(),
                    config: planned.clone(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(response.new_state, planned);
        apply.assert_async().await;
        disassociate.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_disassociates_all_clusters() {
        let mut server = Server::new_async().await;
        let disassociate = server
            .mock("POST", DISASSOCIATE_PATH)
            .match_body(Matcher::PartialJson(json!({"clusters": [{"uuid": "c1"}]})))
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
                    type_name: "nutanix_cluster_profile_association_v2".to_string(),
                    prior_state: state(&["c1"], false),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        disassociate.assert_async().await;
    }

    #[tokio::test]
    async fn test_read_keeps_state() {
        let resource = ClusterProfileAssociationResource::new();
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "nutanix_cluster_profile_association_v2".to_string(),
                    current_state: state(&["c1"], false),
                },
            )
            .await;
        assert_eq!(response.new_state, Some(state(&["c1"], false)));
    }
}
