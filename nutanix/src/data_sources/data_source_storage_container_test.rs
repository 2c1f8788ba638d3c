#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::create_test_provider_data;
    use mockito::Server;
    use serde_json::json;
    use tfplug::types::{Dynamic, DynamicValue};

    const CONTAINER_PATH: &str = "/clustermgmt/v4.0/config/storage-containers/sc-1";

    fn config(v: serde_json::Value) -> DynamicValue {
        DynamicValue::new(Dynamic::from(v))
    }

    fn configured(server_url: &str) -> StorageContainerDataSource {
        StorageContainerDataSource {
            provider_data: Some(create_test_provider_data(server_url)),
        }
    }

    #[test]
    fn test_data_source_type_name() {
        assert_eq!(
            StorageContainerDataSource::new().type_name(),
            "nutanix_storage_container_v2"
        );
    }

    #[tokio::test]
    async fn test_schema_is_read_only() {
        let response = StorageContainerDataSource::new()
            .schema(Context::new(), DataSourceSchemaRequest)
            .await;
        for attr in &response.schema.block.attributes {
            if attr.name == "ext_id" {
                assert!(attr.required);
            } else {
                assert!(attr.computed && !attr.optional, "{}", attr.name);
            }
        }
    }

    #[tokio::test]
    async fn test_read_storage_container() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", CONTAINER_PATH)
            .with_header("ETag", "etag-1")
            .with_body(
                json!({"data": {
                    "extId": "sc-1",
                    "name": "default-container",
                    "clusterExtId": "cluster-1",
                    "maxCapacityBytes": 1099511627776i64,
                    "onDiskDedup": "POST_PROCESS",
                    "isEncrypted": true,
                    "nfsWhitelistAddress": [{"ipv4": {"value": "10.0.0.1", "prefixLength": 32}}]
                }})
                .to_string(),
            )
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "nutanix_storage_container_v2".to_string(),
                    config: config(json!({"ext_id": "sc-1"})),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "sc-1");
        assert_eq!(
            state.get_string(&AttributePath::new("name")).unwrap(),
            "default-container"
        );
        assert_eq!(
            state
                .get_number(&AttributePath::new("max_capacity_bytes"))
                .unwrap(),
            1099511627776.0
        );
        assert_eq!(
            state.get_string(&AttributePath::new("on_disk_dedup")).unwrap(),
            "POST_PROCESS"
        );
        assert!(state.get_bool(&AttributePath::new("is_encrypted")).unwrap());
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
    }

    #[tokio::test]
    async fn test_read_without_ext_id() {
        let response = configured("http://127.0.0.1:1")
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "nutanix_storage_container_v2".to_string(),
                    config: config(json!({"ext_id": ""})),
                },
            )
            .await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].summary,
            "Missing storage container id"
        );
    }
}
