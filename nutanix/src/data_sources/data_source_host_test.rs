#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::create_test_provider_data;
    use mockito::Server;
    use serde_json::json;
    use tfplug::types::{Dynamic, DynamicValue};

    const HOST_PATH: &str = "/clustermgmt/v4.0/config/clusters/cluster-1/hosts/host-1";

    fn config(v: serde_json::Value) -> DynamicValue {
        DynamicValue::new(Dynamic::from(v))
    }

    fn configured(server_url: &str) -> HostDataSource {
        HostDataSource {
            provider_data: Some(create_test_provider_data(server_url)),
        }
    }

    #[test]
    fn test_data_source_type_name() {
        assert_eq!(HostDataSource::new().type_name(), "nutanix_host_v2");
    }

    #[tokio::test]
    async fn test_read_host() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", HOST_PATH)
            .with_body(
                json!({"data": {
                    "extId": "host-1",
                    "hostName": "node-a",
                    "hostType": "HYPER_CONVERGED",
                    "hypervisor": {
                        "externalAddress": {"ipv4": {"value": "10.0.1.1"}},
                        "type": "AHV",
                        "state": "ACROPOLIS_NORMAL",
                        "numberOfVms": 7
                    },
                    "cluster": {"uuid": "cluster-1", "name": "prod"},
                    "disk": [
                        {"uuid": "d-1", "sizeInBytes": 1024, "storageTier": "SATA_SSD"},
                        {"uuid": "d-2", "storageTier": "NVME"}
                    ],
                    "gpuList": ["A100"],
                    "nodeStatus": "NORMAL",
                    "ipmi": {"ip": {"ipv4": {"value": "10.0.2.1"}}, "username": "ADMIN"}
                }})
                .to_string(),
            )
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "nutanix_host_v2".to_string(),
                    config: config(json!({"ext_id": "host-1", "cluster_ext_id": "cluster-1"})),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "host-1");
        assert_eq!(
            state.get_string(&AttributePath::new("host_name")).unwrap(),
            "node-a"
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("hypervisor").index(0).attribute("type"))
                .unwrap(),
            "AHV"
        );
        assert_eq!(
            state
                .get_number(
                    &AttributePath::new("hypervisor")
                        .index(0)
                        .attribute("number_of_vms")
                )
                .unwrap(),
            7.0
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("cluster").index(0).attribute("name"))
                .unwrap(),
            "prod"
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("disk").index(1).attribute("storage_tier"))
                .unwrap(),
            "UNKNOWN"
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("ipmi").index(0).attribute("username"))
                .unwrap(),
            "ADMIN"
        );
        assert!(state
            .get_list(&AttributePath::new("controller_vm"))
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_read_host_error() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", HOST_PATH)
            .with_status(404)
            .with_body(r#"{"data": {"error": [{"message": "host not found"}]}}"#)
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "nutanix_host_v2".to_string(),
                    config: config(json!({"ext_id": "host-1", "cluster_ext_id": "cluster-1"})),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "error while fetching host");
    }
}
