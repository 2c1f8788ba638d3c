//! Drives the Nutanix provider through the in-process host against a mock
//! Prism Central

#![allow(clippy::disallowed_methods)]

use mockito::{Matcher, Server};
use nutanix::config::{ENV_ENDPOINT, ENV_PASSWORD, ENV_USERNAME};
use nutanix::NutanixProvider;
use serde_json::json;
use serial_test::serial;
use tfplug::types::has_errors;
use tfplug::{AttributePath, Context, Dynamic, DynamicValue, Host};

const CLUSTER_PATH: &str = "/api/clustermgmt/v4.0/config/clusters/cluster-1";
const TASK_PATH: &str = "/api/prism/v4.0/config/tasks/task-1";

fn value(v: serde_json::Value) -> DynamicValue {
    DynamicValue::new(Dynamic::from(v))
}

async fn configured_host(server: &Server) -> Host<NutanixProvider> {
    let host = Host::new(NutanixProvider::new());
    let diagnostics = host
        .configure(
            &Context::new(),
            value(json!({
                "endpoint": server.url(),
                "username": "admin",
                "password": "secret",
                "insecure": true
            })),
        )
        .await;
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    host
}

fn task_body(status: &str) -> String {
    json!({"data": {
        "extId": "task-1",
        "status": status,
        "progressPercentage": 100
    }})
    .to_string()
}

#[test]
fn host_lists_every_type() {
    let host = Host::new(NutanixProvider::new());
    assert_eq!(
        host.resource_types(),
        vec![
            "nutanix_cluster_add_node_v2",
            "nutanix_cluster_categories_v2",
            "nutanix_cluster_profile_association_v2",
            "nutanix_cluster_profile_v2",
            "nutanix_cluster_v2",
            "nutanix_clusters_discover_unconfigured_nodes_v2",
            "nutanix_clusters_unconfigured_node_networks_v2",
            "nutanix_pc_registration_v2",
            "nutanix_ssl_certificate_v2",
            "nutanix_storage_containers_v2",
        ]
    );
    assert_eq!(host.data_source_types().len(), 10);

    let schema = tokio_test::block_on(host.provider_schema(&Context::new()));
    let json = schema.to_json();
    assert_eq!(json["block"]["attributes"]["password"]["sensitive"], true);
}

#[tokio::test]
#[serial]
async fn configure_reports_every_missing_setting() {
    for name in [ENV_ENDPOINT, ENV_USERNAME, ENV_PASSWORD] {
        std::env::remove_var(name);
    }

    let host = Host::new(NutanixProvider::new());
    let diagnostics = host
        .configure(&Context::new(), DynamicValue::empty_object())
        .await;

    let summaries: Vec<&str> = diagnostics.iter().map(|d| d.summary.as_str()).collect();
    assert_eq!(
        summaries,
        vec!["Missing endpoint", "Missing username", "Missing password"]
    );
}

#[tokio::test]
async fn data_source_read_before_configure_fails() {
    let host = Host::new(NutanixProvider::new());
    let read = host
        .read_data_source(
            &Context::new(),
            "nutanix_cluster_v2",
            value(json!({"ext_id": "cluster-1"})),
        )
        .await;
    assert!(has_errors(&read.diagnostics));
    assert!(read.new_state.is_none());
}

#[tokio::test]
async fn clusters_data_source_reads_through_host() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/api/clustermgmt/v4.0/config/clusters")
        .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
        .match_query(Matcher::UrlEncoded("$limit".into(), "1".into()))
        .with_body(
            json!({
                "data": [{
                    "extId": "cluster-1",
                    "name": "prod",
                    "config": {"clusterFunction": ["AOS"]}
                }],
                "metadata": {"totalAvailableResults": 4}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let host = configured_host(&server).await;
    let read = host
        .read_data_source(
            &Context::new(),
            "nutanix_clusters_v2",
            value(json!({"limit": 1})),
        )
        .await;

    list.assert_async().await;
    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    let state = read.new_state.unwrap();
    let entities = AttributePath::new("cluster_entities");
    assert_eq!(
        state
            .get_string(&entities.clone().index(0).attribute("name"))
            .unwrap(),
        "prod"
    );
    assert_eq!(
        state
            .get_number(&AttributePath::new("total_available_results"))
            .unwrap(),
        4.0
    );
}

#[tokio::test]
async fn data_source_config_is_validated_before_any_request() {
    let mut server = Server::new_async().await;
    let untouched = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let host = configured_host(&server).await;
    let read = host
        .read_data_source(
            &Context::new(),
            "nutanix_cluster_v2",
            value(json!({"expand": "clusterProfile"})),
        )
        .await;

    assert!(has_errors(&read.diagnostics));
    untouched.assert_async().await;
}

#[tokio::test]
async fn cluster_categories_lifecycle() {
    let mut server = Server::new_async().await;
    let ctx = Context::new();
    let host = configured_host(&server).await;
    let type_name = "nutanix_cluster_categories_v2";

    let config = value(json!({
        "cluster_ext_id": "cluster-1",
        "categories": ["cat-a"]
    }));
    let plan = host
        .plan_resource_change(&ctx, type_name, &DynamicValue::null(), &config)
        .await;
    assert!(plan.diagnostics.is_empty(), "{:?}", plan.diagnostics);
    assert!(plan
        .planned_state
        .get_optional_string(&AttributePath::new("id"))
        .is_none());

    let associate = server
        .mock(
            "POST",
            "/api/clustermgmt/v4.0/config/clusters/cluster-1/$actions/associate-categories",
        )
        .match_body(Matcher::Json(json!({"categories": ["cat-a"]})))
        .with_status(202)
        .with_body(json!({"data": {"extId": "task-1"}}).to_string())
        .expect(1)
        .create_async()
        .await;
    let task = server
        .mock("GET", TASK_PATH)
        .with_body(task_body("SUCCEEDED"))
        .expect(2)
        .create_async()
        .await;

    let created = host
        .apply_resource_change(
            &ctx,
            type_name,
            DynamicValue::null(),
            plan.planned_state,
            config.clone(),
        )
        .await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    associate.assert_async().await;
    let state = created.new_state.unwrap();
    assert!(state
        .get_optional_string(&AttributePath::new("id"))
        .is_some());

    let _cluster = server
        .mock("GET", CLUSTER_PATH)
        .with_header("ETag", "etag-1")
        .with_body(
            json!({"data": {"extId": "cluster-1", "name": "prod", "categories": ["cat-a"]}})
                .to_string(),
        )
        .create_async()
        .await;
    let refreshed = host.read_resource(&ctx, type_name, state.clone()).await;
    assert!(refreshed.diagnostics.is_empty(), "{:?}", refreshed.diagnostics);
    assert_eq!(
        refreshed
            .new_state
            .unwrap()
            .get_list(&AttributePath::new("categories"))
            .unwrap(),
        vec![Dynamic::string("cat-a")]
    );

    let disassociate = server
        .mock(
            "POST",
            "/api/clustermgmt/v4.0/config/clusters/cluster-1/$actions/disassociate-categories",
        )
        .match_body(Matcher::Json(json!({"categories": ["cat-a"]})))
        .with_status(202)
        .with_body(json!({"data": {"extId": "task-1"}}).to_string())
        .expect(1)
        .create_async()
        .await;

    let destroyed = host
        .apply_resource_change(&ctx, type_name, state, DynamicValue::null(), DynamicValue::null())
        .await;
    assert!(destroyed.diagnostics.is_empty(), "{:?}", destroyed.diagnostics);
    assert!(destroyed.new_state.is_none());
    disassociate.assert_async().await;
    task.assert_async().await;
}

#[tokio::test]
async fn failed_task_leaves_no_state_on_create() {
    let mut server = Server::new_async().await;
    let _associate = server
        .mock(
            "POST",
            "/api/clustermgmt/v4.0/config/clusters/cluster-1/$actions/associate-categories",
        )
        .with_status(202)
        .with_body(json!({"data": {"extId": "task-1"}}).to_string())
        .create_async()
        .await;
    let _task = server
        .mock("GET", TASK_PATH)
        .with_body(
            json!({"data": {
                "extId": "task-1",
                "status": "FAILED",
                "progressPercentage": 10,
                "errorMessages": [{"message": "category not found"}]
            }})
            .to_string(),
        )
        .create_async()
        .await;

    let ctx = Context::new();
    let host = configured_host(&server).await;
    let config = value(json!({
        "cluster_ext_id": "cluster-1",
        "categories": ["missing"]
    }));
    let plan = host
        .plan_resource_change(&ctx, "nutanix_cluster_categories_v2", &DynamicValue::null(), &config)
        .await;
    let applied = host
        .apply_resource_change(
            &ctx,
            "nutanix_cluster_categories_v2",
            DynamicValue::null(),
            plan.planned_state,
            config,
        )
        .await;

    assert!(has_errors(&applied.diagnostics));
    assert!(applied.new_state.is_none());
    assert!(applied
        .diagnostics
        .iter()
        .any(|d| d.detail.contains("category not found")));
}

#[tokio::test]
async fn import_reads_categories_of_the_cluster() {
    let mut server = Server::new_async().await;
    let _cluster = server
        .mock("GET", CLUSTER_PATH)
        .with_header("ETag", "etag-1")
        .with_body(
            json!({"data": {"extId": "cluster-1", "categories": ["cat-a", "cat-b"]}})
                .to_string(),
        )
        .create_async()
        .await;

    let host = configured_host(&server).await;
    let result = host
        .import_resource_state(&Context::new(), "nutanix_cluster_categories_v2", "cluster-1")
        .await;

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.imported.len(), 1);
    let state = &result.imported[0].state;
    assert_eq!(
        state
            .get_string(&AttributePath::new("cluster_ext_id"))
            .unwrap(),
        "cluster-1"
    );
    assert_eq!(
        state.get_list(&AttributePath::new("categories")).unwrap().len(),
        2
    );
}

#[tokio::test]
async fn schema_validators_run_without_a_server() {
    let host = Host::new(NutanixProvider::new());
    let ctx = Context::new();

    let diagnostics = host
        .validate_resource_config(
            &ctx,
            "nutanix_cluster_categories_v2",
            &value(json!({"cluster_ext_id": "cluster-1", "categories": []})),
        )
        .await;
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].summary.starts_with("Invalid number of items"));

    let diagnostics = host
        .validate_data_source_config(
            &ctx,
            "nutanix_storage_container_stats_info_v2",
            &value(json!({
                "ext_id": "sc-1",
                "start_time": "2024-06-01T00:00:00Z",
                "end_time": "2024-06-02T00:00:00Z",
                "sampling_interval": 0
            })),
        )
        .await;
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].summary.starts_with("Value out of range"));

    let diagnostics = host
        .validate_data_source_config(
            &ctx,
            "nutanix_storage_container_stats_info_v2",
            &value(json!({
                "ext_id": "sc-1",
                "start_time": "2024-06-02T00:00:00Z",
                "end_time": "2024-06-01T00:00:00Z"
            })),
        )
        .await;
    assert_eq!(diagnostics[0].summary, "Invalid time range");
}
