#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::create_test_provider_data;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::types::{AttributePath, Dynamic, DynamicValue};

    fn configured(server_url: &str) -> ClusterProfilesDataSource {
        ClusterProfilesDataSource {
            provider_data: Some(create_test_provider_data(server_url)),
        }
    }

    #[test]
    fn test_data_source_type_name() {
        assert_eq!(
            ClusterProfilesDataSource::new().type_name(),
            "nutanix_cluster_profiles_v2"
        );
    }

    #[tokio::test]
    async fn test_read_cluster_profiles() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("GET", "/clustermgmt/v4.0/config/cluster-profiles")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("$orderby".into(), "name".into()),
                Matcher::UrlEncoded("$select".into(), "name,clusterCount".into()),
            ]))
            .with_body(
                json!({"data": [
                    {"extId": "profile-1", "name": "gold", "clusterCount": 3},
                    {"extId": "profile-2", "name": "silver", "clusterCount": 0}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "nutanix_cluster_profiles_v2".to_string(),
                    config: DynamicValue::new(Dynamic::from(json!({
                        "order_by": "name",
                        "select": "name,clusterCount"
                    }))),
                },
            )
            .await;

        list.assert_async().await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let profiles = AttributePath::new("cluster_profiles");
        let state = response.state;
        assert_eq!(state.get_list(&profiles).unwrap().len(), 2);
        assert_eq!(
            state
                .get_string(&profiles.clone().index(1).attribute("name"))
                .unwrap(),
            "silver"
        );
        assert_eq!(
            state
                .get_number(&profiles.index(0).attribute("cluster_count"))
                .unwrap(),
            3.0
        );
    }

    #[tokio::test]
    async fn test_read_without_provider_data() {
        let response = ClusterProfilesDataSource::new()
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "nutanix_cluster_profiles_v2".to_string(),
                    config: DynamicValue::new(Dynamic::from(json!({}))),
                },
            )
            .await;
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }
}
