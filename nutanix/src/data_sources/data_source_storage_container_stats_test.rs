#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::create_test_provider_data;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::types::Dynamic;

    const STATS_PATH: &str = "/clustermgmt/v4.0/stats/storage-containers/sc-1";

    fn config(v: serde_json::Value) -> DynamicValue {
        DynamicValue::new(Dynamic::from(v))
    }

    fn configured(server_url: &str) -> StorageContainerStatsDataSource {
        StorageContainerStatsDataSource {
            provider_data: Some(create_test_provider_data(server_url)),
        }
    }

    #[test]
    fn test_data_source_type_name() {
        assert_eq!(
            StorageContainerStatsDataSource::new().type_name(),
            "nutanix_storage_container_stats_info_v2"
        );
    }

    #[test]
    fn test_stats_query_defaults() {
        let value = Dynamic::from(json!({
            "start_time": "2024-06-01T00:00:00Z",
            "end_time": "2024-06-01T01:00:00Z"
        }));
        let query = stats_query(Attrs::new(&value)).unwrap();
        assert_eq!(query.sampling_interval, 1);
        assert_eq!(query.stat_type, DownSamplingOperator::Last);
        assert_eq!(query.start_time.to_rfc3339(), "2024-06-01T00:00:00+00:00");
    }

    #[test]
    fn test_stats_query_rejects_bad_input() {
        let value = Dynamic::from(json!({
            "start_time": "yesterday",
            "end_time": "2024-06-01T01:00:00Z",
            "sampling_interval": 0,
            "stat_type": "MEDIAN"
        }));
        let diagnostics = stats_query(Attrs::new(&value)).unwrap_err();
        let summaries: Vec<_> = diagnostics.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec!["Invalid start_time", "Invalid sampling interval", "Invalid stat type"]
        );
    }

    #[test]
    fn test_stats_query_rejects_reversed_range() {
        let value = Dynamic::from(json!({
            "start_time": "2024-06-02T00:00:00Z",
            "end_time": "2024-06-01T00:00:00Z"
        }));
        let diagnostics = stats_query(Attrs::new(&value)).unwrap_err();
        assert_eq!(diagnostics[0].summary, "Invalid time range");
    }

    #[tokio::test]
    async fn test_validate_reports_bad_timestamp() {
        let response = StorageContainerStatsDataSource::new()
            .validate(
                Context::new(),
                ValidateDataSourceConfigRequest {
                    type_name: "nutanix_storage_container_stats_info_v2".to_string(),
                    config: config(json!({
                        "ext_id": "sc-1",
                        "start_time": "2024-06-01",
                        "end_time": "__unknown__"
                    })),
                },
            )
            .await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Invalid start_time");
    }

    #[tokio::test]
    async fn test_read_stats() {
        let mut server = Server::new_async().await;
        let stats = server
            .mock("GET", STATS_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("$startTime".into(), "2024-06-01T00:00:00+00:00".into()),
                Matcher::UrlEncoded("$endTime".into(), "2024-06-01T01:00:00+00:00".into()),
                Matcher::UrlEncoded("$samplingInterval".into(), "30".into()),
                Matcher::UrlEncoded("$statType".into(), "AVG".into()),
            ]))
            .with_body(
                json!({"data": {
                    "extId": "sc-1",
                    "containerExtId": "sc-1",
                    "controllerNumIops": [
                        {"value": 120, "timestamp": "2024-06-01T00:00:00Z"},
                        {"value": 80, "timestamp": "2024-06-01T00:00:30Z"}
                    ],
                    "controllerAvgIoLatencyuSecs": [
                        {"value": 950, "timestamp": "2024-06-01T00:00:00Z"}
                    ],
                    "health": []
                }})
                .to_string(),
            )
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "nutanix_storage_container_stats_info_v2".to_string(),
                    config: config(json!({
                        "ext_id": "sc-1",
                        "start_time": "2024-06-01T00:00:00Z",
                        "end_time": "2024-06-01T01:00:00Z",
                        "sampling_interval": 30,
                        "stat_type": "AVG"
                    })),
                },
            )
            .await;

        stats.assert_async().await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "sc-1");
        assert_eq!(
            state
                .get_list(&AttributePath::new("controller_num_iops"))
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            state
                .get_number(
                    &AttributePath::new("controller_num_iops")
                        .index(1)
                        .attribute("value")
                )
                .unwrap(),
            80.0
        );
        assert_eq!(
            state
                .get_number(
                    &AttributePath::new("controller_avg_io_latencyu_secs")
                        .index(0)
                        .attribute("value")
                )
                .unwrap(),
            950.0
        );
        assert_eq!(
            state
                .get_string(
                    &AttributePath::new("controller_avg_io_latencyu_secs")
                        .index(0)
                        .attribute("timestamp")
                )
                .unwrap(),
            "2024-06-01T00:00:00+00:00"
        );
        assert!(state
            .get_list(&AttributePath::new("storage_free_bytes"))
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_read_without_time_range_makes_no_request() {
        let mut server = Server::new_async().await;
        let stats = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let response = configured(&server.url())
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "nutanix_storage_container_stats_info_v2".to_string(),
                    config: config(json!({"ext_id": "sc-1", "start_time": "2024-06-01T00:00:00Z"})),
                },
            )
            .await;

        stats.assert_async().await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Missing time range");
    }
}
