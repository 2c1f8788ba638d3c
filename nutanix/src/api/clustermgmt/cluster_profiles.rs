use serde::{Deserialize, Serialize};

use super::clusters::{PulseStatus, SmtpServerRef};
use super::CONFIG_BASE;
use crate::api::client::{Client, Versioned};
use crate::api::common::{
    ApiLink, ApiQueryParams, IPAddress, IPAddressOrFQDN, ListParams, TaskReference,
};
use crate::api::error::ApiError;
use crate::enums::{
    ConfigType, RsyslogModuleLogSeverityLevel, RsyslogModuleName, RsyslogNetworkProtocol,
    SnmpAuthType, SnmpPrivType, SnmpProtocol, SnmpTrapVersion,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<ApiLink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drifted_cluster_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clusters: Option<Vec<ManagedCluster>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_overrides: Option<Vec<ConfigType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_server_ip_list: Option<Vec<IPAddress>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntp_server_ip_list: Option<Vec<IPAddressOrFQDN>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_server: Option<SmtpServerRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfs_subnet_whitelist: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snmp_config: Option<SnmpConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsyslog_server_list: Option<Vec<RsyslogServer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_status: Option<PulseStatus>,
}

/// A cluster the profile is applied to, with its drift state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedCluster {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_compliant: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_drifts: Option<Vec<ConfigType>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnmpConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<ApiLink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<SnmpUser>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<SnmpTransport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traps: Option<Vec<SnmpTrap>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnmpUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<ApiLink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<SnmpAuthType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priv_type: Option<SnmpPrivType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priv_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnmpTransport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<SnmpProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnmpTrap {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<ApiLink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<IPAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<SnmpProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_inform: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<SnmpTrapVersion>,
    /// Spelled this way on the wire
    #[serde(rename = "recieverName", skip_serializing_if = "Option::is_none")]
    pub receiver_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_string: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsyslogServer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<ApiLink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<IPAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_protocol: Option<RsyslogNetworkProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<RsyslogModuleItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsyslogModuleItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<RsyslogModuleName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_severity_level: Option<RsyslogModuleLogSeverityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_log_monitor_files: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterReferenceListSpec {
    pub clusters: Vec<ClusterUuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterUuid {
    pub uuid: String,
}

impl ClusterReferenceListSpec {
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            clusters: ids
                .into_iter()
                .map(|id| ClusterUuid { uuid: id.into() })
                .collect(),
        }
    }
}

pub struct ClusterProfilesApi<'a> {
    client: &'a Client,
}

impl<'a> ClusterProfilesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn profile_path(ext_id: &str) -> String {
        format!("{}/cluster-profiles/{}", CONFIG_BASE, ext_id)
    }

    pub async fn list(&self, params: &ListParams) -> Result<Vec<ClusterProfile>, ApiError> {
        let response = self
            .client
            .list::<Vec<ClusterProfile>>(
                &format!("{}/cluster-profiles", CONFIG_BASE),
                &params.to_query_params(),
            )
            .await?;
        Ok(response.data.unwrap_or_default())
    }

    /// `data: null` comes back as `None`
    pub async fn get(&self, ext_id: &str) -> Result<Versioned<Option<ClusterProfile>>, ApiError> {
        self.client.get_with_etag(&Self::profile_path(ext_id)).await
    }

    pub async fn create(&self, profile: &ClusterProfile) -> Result<TaskReference, ApiError> {
        self.client
            .post(&format!("{}/cluster-profiles", CONFIG_BASE), profile, None)
            .await
    }

    pub async fn update(
        &self,
        ext_id: &str,
        profile: &ClusterProfile,
        dryrun: Option<bool>,
        etag: &str,
    ) -> Result<TaskReference, ApiError> {
        let params = ApiQueryParams::new().add_optional("$dryrun", dryrun);
        self.client
            .put(
                &format!("{}{}", Self::profile_path(ext_id), params.to_query_string()),
                profile,
                etag,
            )
            .await
    }

    pub async fn delete(&self, ext_id: &str) -> Result<TaskReference, ApiError> {
        self.client.delete(&Self::profile_path(ext_id), None).await
    }

    pub async fn apply(
        &self,
        ext_id: &str,
        clusters: &ClusterReferenceListSpec,
        dryrun: bool,
    ) -> Result<TaskReference, ApiError> {
        let params = ApiQueryParams::new().add("$dryrun", dryrun);
        self.client
            .post(
                &format!(
                    "{}/$actions/apply{}",
                    Self::profile_path(ext_id),
                    params.to_query_string()
                ),
                clusters,
                None,
            )
            .await
    }

    pub async fn disassociate(
        &self,
        ext_id: &str,
        clusters: &ClusterReferenceListSpec,
    ) -> Result<TaskReference, ApiError> {
        self.client
            .post(
                &format!("{}/$actions/disassociate-cluster", Self::profile_path(ext_id)),
                clusters,
                None,
            )
            .await
    }
}
