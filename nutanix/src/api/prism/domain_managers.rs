use serde::{Deserialize, Serialize};

use super::CONFIG_BASE;
use crate::api::client::{Client, Versioned};
use crate::api::common::{ApiLink, IPAddress, IPAddressOrFQDN, TaskReference};
use crate::api::error::ApiError;
use crate::enums::{DomainManagerCloudType, EnvironmentType, ProviderType, ProvisioningType, Size};

/// A Prism Central instance
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainManager {
    pub ext_id: Option<String>,
    pub tenant_id: Option<String>,
    pub links: Option<Vec<ApiLink>>,
    pub config: Option<DomainManagerClusterConfig>,
    pub is_registered_with_hosting_cluster: Option<bool>,
    pub network: Option<DomainManagerNetwork>,
    pub hosting_cluster_ext_id: Option<String>,
    pub should_enable_high_availability: Option<bool>,
    pub node_ext_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainManagerClusterConfig {
    pub should_enable_lockdown_mode: Option<bool>,
    pub build_info: Option<BuildInfo>,
    pub name: Option<String>,
    pub size: Option<Size>,
    pub bootstrap_config: Option<BootstrapConfig>,
    pub resource_config: Option<DomainManagerResourceConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildInfo {
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapConfig {
    pub environment_info: Option<EnvironmentInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentInfo {
    #[serde(rename = "type")]
    pub environment_type: Option<EnvironmentType>,
    pub provider_type: Option<ProviderType>,
    pub provisioning_type: Option<ProvisioningType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainManagerResourceConfig {
    pub num_vcpus: Option<i64>,
    pub memory_size_bytes: Option<i64>,
    pub data_disk_size_bytes: Option<i64>,
    pub container_ext_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainManagerNetwork {
    pub external_address: Option<IPAddress>,
    pub name_servers: Option<Vec<IPAddressOrFQDN>>,
    pub ntp_servers: Option<Vec<IPAddressOrFQDN>>,
    pub fqdn: Option<String>,
    pub external_networks: Option<Vec<ExternalNetwork>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNetwork {
    pub default_gateway: Option<IPAddressOrFQDN>,
    pub subnet_mask: Option<IPAddressOrFQDN>,
    pub ip_ranges: Option<Vec<IpRange>>,
    pub network_ext_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpRange {
    pub begin: Option<IPAddress>,
    pub end: Option<IPAddress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRegistrationSpec {
    pub remote_cluster: RemoteClusterSpec,
}

/// The `remoteCluster` one-of, discriminated by `$objectType`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "$objectType")]
pub enum RemoteClusterSpec {
    #[serde(rename = "prism.v4.management.DomainManagerRemoteClusterSpec")]
    DomainManager(DomainManagerRemoteClusterSpec),
    #[serde(rename = "prism.v4.management.AOSRemoteClusterSpec")]
    Aos(AosRemoteClusterSpec),
    #[serde(rename = "prism.v4.management.ClusterReference")]
    ClusterReference(ClusterReference),
}

impl RemoteClusterSpec {
    pub fn object_type(&self) -> &'static str {
        match self {
            RemoteClusterSpec::DomainManager(_) => {
                "prism.v4.management.DomainManagerRemoteClusterSpec"
            }
            RemoteClusterSpec::Aos(_) => "prism.v4.management.AOSRemoteClusterSpec",
            RemoteClusterSpec::ClusterReference(_) => "prism.v4.management.ClusterReference",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainManagerRemoteClusterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_cluster: Option<RemoteClusterAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_type: Option<DomainManagerCloudType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AosRemoteClusterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_cluster: Option<RemoteClusterAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RemoteClusterAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<IPAddressOrFQDN>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<BasicAuth>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BasicAuth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

pub struct DomainManagersApi<'a> {
    client: &'a Client,
}

impl<'a> DomainManagersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, ext_id: &str) -> Result<Versioned<DomainManager>, ApiError> {
        self.client
            .get_with_etag(&format!("{}/domain-managers/{}", CONFIG_BASE, ext_id))
            .await
    }

    pub async fn register(
        &self,
        ext_id: &str,
        spec: &ClusterRegistrationSpec,
        etag: &str,
    ) -> Result<TaskReference, ApiError> {
        self.client
            .post(
                &format!("{}/domain-managers/{}/$actions/register", CONFIG_BASE, ext_id),
                spec,
                Some(etag),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::IPv4Address;
    use serde_json::json;

    #[test]
    fn registration_spec_carries_object_type() {
        let spec = ClusterRegistrationSpec {
            remote_cluster: RemoteClusterSpec::DomainManager(DomainManagerRemoteClusterSpec {
                remote_cluster: Some(RemoteClusterAddress {
                    address: Some(IPAddressOrFQDN {
                        ipv4: Some(IPv4Address {
                            value: Some("10.0.0.5".to_string()),
                            prefix_length: None,
                        }),
                        ..Default::default()
                    }),
                    credentials: None,
                }),
                cloud_type: Some(DomainManagerCloudType::OnpremCloud),
            }),
        };

        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({
                "remoteCluster": {
                    "$objectType": "prism.v4.management.DomainManagerRemoteClusterSpec",
                    "remoteCluster": {"address": {"ipv4": {"value": "10.0.0.5"}}},
                    "cloudType": "ONPREM_CLOUD"
                }
            })
        );
    }

    #[test]
    fn cluster_reference_variant() {
        let spec = RemoteClusterSpec::ClusterReference(ClusterReference {
            ext_id: Some("abc".to_string()),
        });
        assert_eq!(spec.object_type(), "prism.v4.management.ClusterReference");
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({"$objectType": "prism.v4.management.ClusterReference", "extId": "abc"})
        );
    }
}
