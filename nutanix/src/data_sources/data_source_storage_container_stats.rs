//! Storage container statistics data source implementation

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, BlockBuilder, NestedBlock, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::NumberRange;
use tracing::debug;

use super::data_source_state;
use crate::api::clustermgmt::storage_containers::{
    StatsQuery, StorageContainerStats, TimeIntValuePair,
};
use crate::common::schema::{computed, flatten_links, links_block, one_of};
use crate::common::{api_error, many, not_configured, Attrs, Obj};
use crate::enums::{ApiEnum, DownSamplingOperator};
use crate::provider_data::NutanixProviderData;

const DEFAULT_SAMPLING_INTERVAL: i64 = 1;

/// Every time series the stats endpoint reports
const SERIES: &[&str] = &[
    "controller_num_iops",
    "controller_io_bandwidth_kbps",
    "controller_avg_io_latencyu_secs",
    "controller_num_read_iops",
    "controller_num_write_iops",
    "controller_read_io_bandwidth_kbps",
    "controller_write_io_bandwidth_kbps",
    "controller_avg_read_io_latencyu_secs",
    "controller_avg_write_io_latencyu_secs",
    "storage_reserved_capacity_bytes",
    "storage_actual_physical_usage_bytes",
    "data_reduction_saving_ratio_ppm",
    "data_reduction_total_saving_ratio_ppm",
    "storage_free_bytes",
    "storage_capacity_bytes",
    "data_reduction_saved_bytes",
    "data_reduction_overall_pre_reduction_bytes",
    "data_reduction_overall_post_reduction_bytes",
    "data_reduction_compression_saving_ratio_ppm",
    "data_reduction_dedup_saving_ratio_ppm",
    "data_reduction_erasure_coding_saving_ratio_ppm",
    "data_reduction_thin_provision_saving_ratio_ppm",
    "data_reduction_clone_saving_ratio_ppm",
    "data_reduction_snapshot_saving_ratio_ppm",
    "data_reduction_zero_write_savings_bytes",
    "controller_read_io_ratio_ppm",
    "controller_write_io_ratio_ppm",
    "storage_replication_factor",
    "storage_usage_bytes",
    "storage_tier_das_sata_usage_bytes",
    "storage_tier_ssd_usage_bytes",
    "health",
];

fn series_block(name: &str) -> NestedBlock {
    NestedBlock::list(
        name,
        BlockBuilder::new()
            .attribute(computed("value", AttributeType::Number))
            .attribute(computed("timestamp", AttributeType::String))
            .build(),
    )
}

fn series_obj(pair: &TimeIntValuePair) -> Obj {
    Obj::new()
        .set("value", pair.value)
        .set("timestamp", pair.timestamp.map(|t| t.to_rfc3339()))
}

fn stats_obj(stats: &StorageContainerStats) -> Obj {
    let series = |values: &Option<Vec<TimeIntValuePair>>| many(values.as_ref(), series_obj);
    Obj::new()
        .set("tenant_id", stats.tenant_id.as_ref())
        .set("links", flatten_links(stats.links.as_ref()))
        .set("container_ext_id", stats.container_ext_id.as_ref())
        .set("controller_num_iops", series(&stats.controller_num_iops))
        .set(
            "controller_io_bandwidth_kbps",
            series(&stats.controller_io_bandwidth_kbps),
        )
        .set(
            "controller_avg_io_latencyu_secs",
            series(&stats.controller_avg_io_latency_usecs),
        )
        .set("controller_num_read_iops", series(&stats.controller_num_read_iops))
        .set("controller_num_write_iops", series(&stats.controller_num_write_iops))
        .set(
            "controller_read_io_bandwidth_kbps",
            series(&stats.controller_read_io_bandwidth_kbps),
        )
        .set(
            "controller_write_io_bandwidth_kbps",
            series(&stats.controller_write_io_bandwidth_kbps),
        )
        .set(
            "controller_avg_read_io_latencyu_secs",
            series(&stats.controller_avg_read_io_latency_usecs),
        )
        .set(
            "controller_avg_write_io_latencyu_secs",
            series(&stats.controller_avg_write_io_latency_usecs),
        )
        .set(
            "storage_reserved_capacity_bytes",
            series(&stats.storage_reserved_capacity_bytes),
        )
        .set(
            "storage_actual_physical_usage_bytes",
            series(&stats.storage_actual_physical_usage_bytes),
        )
        .set(
            "data_reduction_saving_ratio_ppm",
            series(&stats.data_reduction_saving_ratio_ppm),
        )
        .set(
            "data_reduction_total_saving_ratio_ppm",
            series(&stats.data_reduction_total_saving_ratio_ppm),
        )
        .set("storage_free_bytes", series(&stats.storage_free_bytes))
        .set("storage_capacity_bytes", series(&stats.storage_capacity_bytes))
        .set(
            "data_reduction_saved_bytes",
            series(&stats.data_reduction_saved_bytes),
        )
        .set(
            "data_reduction_overall_pre_reduction_bytes",
            series(&stats.data_reduction_overall_pre_reduction_bytes),
        )
        .set(
            "data_reduction_overall_post_reduction_bytes",
            series(&stats.data_reduction_overall_post_reduction_bytes),
        )
        .set(
            "data_reduction_compression_saving_ratio_ppm",
            series(&stats.data_reduction_compression_saving_ratio_ppm),
        )
        .set(
            "data_reduction_dedup_saving_ratio_ppm",
            series(&stats.data_reduction_dedup_saving_ratio_ppm),
        )
        .set(
            "data_reduction_erasure_coding_saving_ratio_ppm",
            series(&stats.data_reduction_erasure_coding_saving_ratio_ppm),
        )
        .set(
            "data_reduction_thin_provision_saving_ratio_ppm",
            series(&stats.data_reduction_thin_provision_saving_ratio_ppm),
        )
        .set(
            "data_reduction_clone_saving_ratio_ppm",
            series(&stats.data_reduction_clone_saving_ratio_ppm),
        )
        .set(
            "data_reduction_snapshot_saving_ratio_ppm",
            series(&stats.data_reduction_snapshot_saving_ratio_ppm),
        )
        .set(
            "data_reduction_zero_write_savings_bytes",
            series(&stats.data_reduction_zero_write_savings_bytes),
        )
        .set(
            "controller_read_io_ratio_ppm",
            series(&stats.controller_read_io_ratio_ppm),
        )
        .set(
            "controller_write_io_ratio_ppm",
            series(&stats.controller_write_io_ratio_ppm),
        )
        .set(
            "storage_replication_factor",
            series(&stats.storage_replication_factor),
        )
        .set("storage_usage_bytes", series(&stats.storage_usage_bytes))
        .set(
            "storage_tier_das_sata_usage_bytes",
            series(&stats.storage_tier_das_sata_usage_bytes),
        )
        .set(
            "storage_tier_ssd_usage_bytes",
            series(&stats.storage_tier_ssd_usage_bytes),
        )
        .set("health", series(&stats.health))
}

fn parse_time(attrs: Attrs<'_>, key: &str) -> Result<Option<DateTime<FixedOffset>>, Diagnostic> {
    let Some(raw) = attrs.str(key) else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(&raw).map(Some).map_err(|e| {
        Diagnostic::error(
            format!("Invalid {}", key),
            format!("{} must be an RFC3339 timestamp, got {:?}: {}", key, raw, e),
        )
        .with_attribute(AttributePath::new(key))
    })
}

/// Builds the query from configuration; every problem becomes a diagnostic
fn stats_query(attrs: Attrs<'_>) -> Result<StatsQuery, Vec<Diagnostic>> {
    let mut diagnostics = vec![];

    let start_time = parse_time(attrs, "start_time").unwrap_or_else(|d| {
        diagnostics.push(d);
        None
    });
    let end_time = parse_time(attrs, "end_time").unwrap_or_else(|d| {
        diagnostics.push(d);
        None
    });

    let sampling_interval = attrs
        .i64("sampling_interval")
        .unwrap_or(DEFAULT_SAMPLING_INTERVAL);
    if sampling_interval <= 0 {
        diagnostics.push(
            Diagnostic::error(
                "Invalid sampling interval",
                format!(
                    "sampling_interval must be greater than 0, got {}",
                    sampling_interval
                ),
            )
            .with_attribute(AttributePath::new("sampling_interval")),
        );
    }

    let stat_type = match attrs.str("stat_type") {
        Some(name) => DownSamplingOperator::from_name(&name).unwrap_or_else(|| {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid stat type",
                    format!(
                        "stat_type must be one of {:?}, got {:?}",
                        DownSamplingOperator::NAMES,
                        name
                    ),
                )
                .with_attribute(AttributePath::new("stat_type")),
            );
            DownSamplingOperator::Last
        }),
        None => DownSamplingOperator::Last,
    };

    if let (Some(start), Some(end)) = (start_time, end_time) {
        if end < start {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid time range",
                    "end_time must not be before start_time",
                )
                .with_attribute(AttributePath::new("end_time")),
            );
        }
    }

    match (start_time, end_time) {
        (Some(start_time), Some(end_time)) if diagnostics.is_empty() => Ok(StatsQuery {
            start_time,
            end_time,
            sampling_interval,
            stat_type,
        }),
        _ => {
            if diagnostics.is_empty() {
                diagnostics.push(Diagnostic::error(
                    "Missing time range",
                    "start_time and end_time must be set",
                ));
            }
            Err(diagnostics)
        }
    }
}

#[derive(Default)]
pub struct StorageContainerStatsDataSource {
    provider_data: Option<NutanixProviderData>,
}

impl StorageContainerStatsDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for StorageContainerStatsDataSource {
    fn type_name(&self) -> &str {
        "nutanix_storage_container_stats_info_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let builder = SchemaBuilder::new()
            .version(0)
            .description("Reads time series statistics of a storage container")
            .attribute(computed("id", AttributeType::String))
            .attribute(
                AttributeBuilder::new("ext_id", AttributeType::String)
                    .description("Identifier of the storage container")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("start_time", AttributeType::String)
                    .description("Start of the interval, RFC3339")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("end_time", AttributeType::String)
                    .description("End of the interval, RFC3339")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("sampling_interval", AttributeType::Number)
                    .description("Sampling interval in seconds, defaults to 1")
                    .optional()
                    .computed()
                    .validator(NumberRange::at_least(1.0))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("stat_type", AttributeType::String)
                    .description("Down-sampling operator, defaults to LAST")
                    .optional()
                    .computed()
                    .validator(one_of::<DownSamplingOperator>())
                    .build(),
            )
            .attribute(computed("tenant_id", AttributeType::String))
            .attribute(computed("container_ext_id", AttributeType::String))
            .block(links_block());

        let schema = SERIES
            .iter()
            .fold(builder, |b, name| b.block(series_block(name)))
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        let attrs = Attrs::of(&request.config);
        let mut diagnostics = vec![];

        let mut range = [None, None];
        for (slot, key) in range.iter_mut().zip(["start_time", "end_time"]) {
            match parse_time(attrs, key) {
                Ok(time) => *slot = time,
                Err(d) => diagnostics.push(d),
            }
        }
        if let [Some(start), Some(end)] = range {
            if end < start {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid time range",
                        "end_time must not be before start_time",
                    )
                    .with_attribute(AttributePath::new("end_time")),
                );
            }
        }
        if let Some(interval) = attrs.i64("sampling_interval") {
            if interval <= 0 {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid sampling interval",
                        format!("sampling_interval must be greater than 0, got {}", interval),
                    )
                    .with_attribute(AttributePath::new("sampling_interval")),
                );
            }
        }

        ValidateDataSourceConfigResponse { diagnostics }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let Some(data) = &self.provider_data else {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![not_configured()],
            };
        };

        let attrs = Attrs::of(&request.config);
        let Some(ext_id) = attrs.str("ext_id") else {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    "Missing storage container id",
                    "ext_id must be set",
                )
                .with_attribute(AttributePath::new("ext_id"))],
            };
        };
        let query = match stats_query(attrs) {
            Ok(query) => query,
            Err(diagnostics) => {
                return ReadDataSourceResponse::failed(diagnostics)
            }
        };
        debug!(
            ext_id = %ext_id,
            start = %query.start_time,
            end = %query.end_time,
            interval = query.sampling_interval,
            stat_type = %query.stat_type,
            "reading storage container stats"
        );

        match data
            .client
            .clustermgmt()
            .storage_containers()
            .stats(&ext_id, &query)
            .await
        {
            Ok(stats) => {
                let read = stats_obj(&stats)
                    .set("id", ext_id.as_str())
                    .set("sampling_interval", query.sampling_interval)
                    .set("stat_type", query.stat_type.as_str());
                ReadDataSourceResponse {
                    state: data_source_state(&request.config, read),
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![api_error(
                    "error while fetching storage container stats",
                    &e,
                )],
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for StorageContainerStatsDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];
        match NutanixProviderData::from_any(request.provider_data) {
            Ok(data) => self.provider_data = Some(data),
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureDataSourceResponse { diagnostics }
    }
}

#[path = "./data_source_storage_container_stats_test.rs"]
mod data_source_storage_container_stats_test;
