use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{CONFIG_BASE, STATS_BASE};
use crate::api::client::{Client, Versioned};
use crate::api::common::{ApiLink, ApiQueryParams, IPAddressOrFQDN, ListParams, TaskReference};
use crate::api::error::ApiError;
use crate::enums::{CacheDeduplication, DownSamplingOperator, ErasureCodeStatus, OnDiskDedup};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageContainer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<ApiLink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_pool_ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_marked_for_removal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_explicit_reserved_capacity_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_implicit_reserved_capacity_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_advertised_capacity_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replication_factor: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfs_whitelist_address: Option<Vec<IPAddressOrFQDN>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub erasure_code: Option<ErasureCodeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_inline_ec_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_higher_ec_fault_domain_preference: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub erasure_code_delay_secs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_deduplication: Option<CacheDeduplication>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_disk_dedup: Option<OnDiskDedup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_compression_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_delay_secs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_internal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_software_encryption_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_encrypted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affinity_host_ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
}

/// One sample of a time series metric
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeIntValuePair {
    pub value: Option<i64>,
    pub timestamp: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageContainerStats {
    pub ext_id: Option<String>,
    pub tenant_id: Option<String>,
    pub links: Option<Vec<ApiLink>>,
    pub container_ext_id: Option<String>,
    pub controller_num_iops: Option<Vec<TimeIntValuePair>>,
    #[serde(rename = "controllerIoBandwidthkBps")]
    pub controller_io_bandwidth_kbps: Option<Vec<TimeIntValuePair>>,
    #[serde(rename = "controllerAvgIoLatencyuSecs")]
    pub controller_avg_io_latency_usecs: Option<Vec<TimeIntValuePair>>,
    pub controller_num_read_iops: Option<Vec<TimeIntValuePair>>,
    pub controller_num_write_iops: Option<Vec<TimeIntValuePair>>,
    #[serde(rename = "controllerReadIoBandwidthkBps")]
    pub controller_read_io_bandwidth_kbps: Option<Vec<TimeIntValuePair>>,
    #[serde(rename = "controllerWriteIoBandwidthkBps")]
    pub controller_write_io_bandwidth_kbps: Option<Vec<TimeIntValuePair>>,
    #[serde(rename = "controllerAvgReadIoLatencyuSecs")]
    pub controller_avg_read_io_latency_usecs: Option<Vec<TimeIntValuePair>>,
    #[serde(rename = "controllerAvgWriteIoLatencyuSecs")]
    pub controller_avg_write_io_latency_usecs: Option<Vec<TimeIntValuePair>>,
    pub storage_reserved_capacity_bytes: Option<Vec<TimeIntValuePair>>,
    pub storage_actual_physical_usage_bytes: Option<Vec<TimeIntValuePair>>,
    pub data_reduction_saving_ratio_ppm: Option<Vec<TimeIntValuePair>>,
    pub data_reduction_total_saving_ratio_ppm: Option<Vec<TimeIntValuePair>>,
    pub storage_free_bytes: Option<Vec<TimeIntValuePair>>,
    pub storage_capacity_bytes: Option<Vec<TimeIntValuePair>>,
    pub data_reduction_saved_bytes: Option<Vec<TimeIntValuePair>>,
    pub data_reduction_overall_pre_reduction_bytes: Option<Vec<TimeIntValuePair>>,
    pub data_reduction_overall_post_reduction_bytes: Option<Vec<TimeIntValuePair>>,
    pub data_reduction_compression_saving_ratio_ppm: Option<Vec<TimeIntValuePair>>,
    pub data_reduction_dedup_saving_ratio_ppm: Option<Vec<TimeIntValuePair>>,
    pub data_reduction_erasure_coding_saving_ratio_ppm: Option<Vec<TimeIntValuePair>>,
    pub data_reduction_thin_provision_saving_ratio_ppm: Option<Vec<TimeIntValuePair>>,
    pub data_reduction_clone_saving_ratio_ppm: Option<Vec<TimeIntValuePair>>,
    pub data_reduction_snapshot_saving_ratio_ppm: Option<Vec<TimeIntValuePair>>,
    pub data_reduction_zero_write_savings_bytes: Option<Vec<TimeIntValuePair>>,
    pub controller_read_io_ratio_ppm: Option<Vec<TimeIntValuePair>>,
    pub controller_write_io_ratio_ppm: Option<Vec<TimeIntValuePair>>,
    pub storage_replication_factor: Option<Vec<TimeIntValuePair>>,
    pub storage_usage_bytes: Option<Vec<TimeIntValuePair>>,
    pub storage_tier_das_sata_usage_bytes: Option<Vec<TimeIntValuePair>>,
    pub storage_tier_ssd_usage_bytes: Option<Vec<TimeIntValuePair>>,
    pub health: Option<Vec<TimeIntValuePair>>,
}

#[derive(Debug, Clone)]
pub struct StatsQuery {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub sampling_interval: i64,
    pub stat_type: DownSamplingOperator,
}

pub struct StorageContainersApi<'a> {
    client: &'a Client,
}

impl<'a> StorageContainersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn container_path(ext_id: &str) -> String {
        format!("{}/storage-containers/{}", CONFIG_BASE, ext_id)
    }

    pub async fn list(&self, params: &ListParams) -> Result<Vec<StorageContainer>, ApiError> {
        let response = self
            .client
            .list::<Vec<StorageContainer>>(
                &format!("{}/storage-containers", CONFIG_BASE),
                &params.to_query_params(),
            )
            .await?;
        Ok(response.data.unwrap_or_default())
    }

    pub async fn get(&self, ext_id: &str) -> Result<Versioned<StorageContainer>, ApiError> {
        self.client
            .get_with_etag(&Self::container_path(ext_id))
            .await
    }

    pub async fn create(
        &self,
        cluster_ext_id: &str,
        container: &StorageContainer,
    ) -> Result<TaskReference, ApiError> {
        let params = ApiQueryParams::new().add("$clusterExtId", cluster_ext_id);
        self.client
            .post(
                &format!(
                    "{}/storage-containers{}",
                    CONFIG_BASE,
                    params.to_query_string()
                ),
                container,
                None,
            )
            .await
    }

    pub async fn update(
        &self,
        ext_id: &str,
        container: &StorageContainer,
        etag: &str,
    ) -> Result<TaskReference, ApiError> {
        self.client
            .put(&Self::container_path(ext_id), container, etag)
            .await
    }

    pub async fn delete(
        &self,
        ext_id: &str,
        ignore_small_files: bool,
    ) -> Result<TaskReference, ApiError> {
        let params = ApiQueryParams::new().add("$ignoreSmallFiles", ignore_small_files);
        self.client
            .delete(
                &format!(
                    "{}{}",
                    Self::container_path(ext_id),
                    params.to_query_string()
                ),
                None,
            )
            .await
    }

    pub async fn stats(
        &self,
        ext_id: &str,
        query: &StatsQuery,
    ) -> Result<StorageContainerStats, ApiError> {
        let params = ApiQueryParams::new()
            .add("$startTime", query.start_time.to_rfc3339())
            .add("$endTime", query.end_time.to_rfc3339())
            .add("$samplingInterval", query.sampling_interval)
            .add("$statType", query.stat_type);
        self.client
            .get_with_params(
                &format!("{}/storage-containers/{}", STATS_BASE, ext_id),
                &params,
            )
            .await
    }
}
