//! Cluster entity API: clusters, their hosts, node expansion and categories

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CONFIG_BASE;
use crate::api::client::{Client, Versioned};
use crate::api::common::{
    ApiLink, ApiQueryParams, IPAddress, IPAddressOrFQDN, IPv4Address, ListParams, TaskReference,
};
use crate::api::error::ApiError;
use crate::enums::{
    AcropolisConnectionState, AddressType, ClusterArchReference, ClusterFaultToleranceRef,
    ClusterFunctionRef, DomainAwarenessLevel, EncryptionOptionInfo, EncryptionScopeInfo,
    EncryptionStatus, HostTypeEnum, HttpProxyType, HttpProxyWhiteListTargetType, HypervisorState,
    HypervisorType, KeyManagementServerType, ManagementServerType, NodeStatus, OperationMode,
    PiiScrubbingLevel, SmtpType, SoftwareTypeRef, StorageTierReference, UpgradeStatus,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<ApiLink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<NodeReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<ClusterNetworkReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ClusterConfigReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_status: Option<UpgradeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inefficient_vm_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_profile_ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_eligibility_score: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_nodes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_list: Option<Vec<NodeListItemReference>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeListItemReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_vm_ip: Option<IPAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<IPAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNetworkReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_address: Option<IPAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_data_service_ip: Option<IPAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_subnet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_subnet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfs_subnet_whitelist: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_server_ip_list: Option<Vec<IPAddressOrFQDN>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntp_server_ip_list: Option<Vec<IPAddressOrFQDN>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_server: Option<SmtpServerRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masquerading_ip: Option<IPAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masquerading_port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_server: Option<ManagementServerRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_management_server_type: Option<KeyManagementServerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backplane: Option<BackplaneNetworkParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_proxy_list: Option<Vec<HttpProxyConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_proxy_white_list: Option<Vec<HttpProxyWhiteListConfig>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpServerRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<SmtpNetwork>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub smtp_type: Option<SmtpType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpNetwork {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<IPAddressOrFQDN>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementServerRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<IPAddress>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub server_type: Option<ManagementServerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_drs_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_registered: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_in_use: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackplaneNetworkParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_segmentation_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_tag: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<IPv4Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netmask: Option<IPv4Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpProxyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<IPAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_types: Option<Vec<HttpProxyType>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpProxyWhiteListConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<HttpProxyWhiteListTargetType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfigReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incarnation_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_info: Option<BuildReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypervisor_types: Option<Vec<HypervisorType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_function: Option<Vec<ClusterFunctionRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorized_public_key_list: Option<Vec<PublicKey>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redundancy_factor: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_software_map: Option<Vec<SoftwareMapReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_arch: Option<ClusterArchReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_tolerance_state: Option<FaultToleranceState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_remote_support_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_mode: Option<OperationMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_lts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_password_remote_login_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_in_transit_status: Option<EncryptionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_option: Option<Vec<EncryptionOptionInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_scope: Option<Vec<EncryptionScopeInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_status: Option<PulseStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_commit_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareMapReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_type: Option<SoftwareTypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultToleranceState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_max_fault_tolerance: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_max_fault_tolerance: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_awareness_level: Option<DomainAwarenessLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_cluster_fault_tolerance: Option<ClusterFaultToleranceRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_cluster_fault_tolerance: Option<ClusterFaultToleranceRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redundancy_status: Option<RedundancyStatusDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedundancyStatusDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_cassandra_preparation_done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_zookeeper_preparation_done: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PulseStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pii_scrubbing_level: Option<PiiScrubbingLevel>,
}

// Hosts

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub ext_id: Option<String>,
    pub tenant_id: Option<String>,
    pub links: Option<Vec<ApiLink>>,
    pub host_name: Option<String>,
    pub host_type: Option<HostTypeEnum>,
    pub hypervisor: Option<HypervisorReference>,
    pub cluster: Option<ClusterReference>,
    pub controller_vm: Option<ControllerVmReference>,
    pub disk: Option<Vec<DiskReference>>,
    pub is_degraded: Option<bool>,
    pub is_secure_booted: Option<bool>,
    pub is_hardware_virtualized: Option<bool>,
    pub has_csr: Option<bool>,
    pub key_management_device_to_cert_status: Option<Vec<KeyManagementDeviceToCertStatusInfo>>,
    pub number_of_cpu_cores: Option<i64>,
    pub number_of_cpu_threads: Option<i64>,
    pub number_of_cpu_sockets: Option<i64>,
    pub cpu_capacity_hz: Option<i64>,
    pub cpu_frequency_hz: Option<i64>,
    pub cpu_model: Option<String>,
    pub gpu_driver_version: Option<String>,
    pub gpu_list: Option<Vec<String>>,
    pub default_vhd_location: Option<String>,
    pub default_vhd_container_uuid: Option<String>,
    pub default_vm_location: Option<String>,
    pub default_vm_container_uuid: Option<String>,
    pub is_reboot_pending: Option<bool>,
    pub failover_cluster_fqdn: Option<String>,
    pub failover_cluster_node_status: Option<String>,
    pub boot_time_usecs: Option<i64>,
    pub memory_size_bytes: Option<i64>,
    pub block_serial: Option<String>,
    pub block_model: Option<String>,
    pub maintenance_state: Option<String>,
    pub node_status: Option<NodeStatus>,
    pub ipmi: Option<IpmiReference>,
    pub rackable_unit_uuid: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HypervisorReference {
    pub external_address: Option<IPAddress>,
    pub user_name: Option<String>,
    pub full_name: Option<String>,
    #[serde(rename = "type")]
    pub hypervisor_type: Option<HypervisorType>,
    pub number_of_vms: Option<i64>,
    pub state: Option<HypervisorState>,
    pub acropolis_connection_state: Option<AcropolisConnectionState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerVmReference {
    pub external_address: Option<IPAddress>,
    pub backplane_address: Option<IPAddress>,
    pub rdma_backplane_address: Option<Vec<IPAddress>>,
    pub nat_ip: Option<IPAddress>,
    pub nat_port: Option<i64>,
    pub is_in_maintenance_mode: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskReference {
    pub uuid: Option<String>,
    pub mount_path: Option<String>,
    pub size_in_bytes: Option<i64>,
    pub serial_id: Option<String>,
    pub storage_tier: Option<StorageTierReference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyManagementDeviceToCertStatusInfo {
    pub key_management_server_name: Option<String>,
    pub is_certificate_present: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpmiReference {
    pub ip: Option<IPAddress>,
    pub username: Option<String>,
}

// Node expansion and removal

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDiscoveryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_type: Option<AddressType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_filter_list: Vec<IPAddress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uuid_filter_list: Vec<String>,
    /// Seconds the cluster spends listening for nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interface_filter_list: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_manual_discovery: Option<bool>,
}

/// Kind of result `fetch-task-response` should return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskResponseType {
    UnconfiguredNodes,
    NetworkingDetails,
}

impl TaskResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskResponseType::UnconfiguredNodes => "UNCONFIGURED_NODES",
            TaskResponseType::NetworkingDetails => "NETWORKING_DETAILS",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub task_response_type: Option<String>,
    pub response: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnconfigureNodeDetails {
    pub node_list: Option<Vec<UnconfiguredNodeListItem>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnconfiguredNodeListItem {
    pub arch: Option<String>,
    pub cluster_id: Option<String>,
    pub cpu_type: Option<Vec<String>>,
    pub current_cvm_vlan_tag: Option<String>,
    pub foundation_version: Option<String>,
    pub host_type: Option<HostTypeEnum>,
    pub interface_ipv6: Option<String>,
    pub is_secure_booted: Option<bool>,
    pub rackable_unit_max_nodes: Option<i64>,
    pub node_uuid: Option<String>,
    pub node_position: Option<String>,
    pub rackable_unit_model: Option<String>,
    pub rackable_unit_serial: Option<String>,
    pub hypervisor_type: Option<HypervisorType>,
    pub hypervisor_version: Option<String>,
    pub nos_version: Option<String>,
    pub current_network_interface: Option<String>,
    pub hypervisor_ip: Option<IPAddress>,
    pub cvm_ip: Option<IPAddress>,
    pub ipmi_ip: Option<IPAddress>,
    pub attributes: Option<UnconfiguredNodeAttributes>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnconfiguredNodeAttributes {
    pub default_workload: Option<String>,
    pub is_model_supported: Option<bool>,
    pub is_robo_mixed_hypervisor: Option<bool>,
    pub lcm_family: Option<String>,
    #[serde(rename = "shouldWorkWith1GNic")]
    pub should_work_with_1g_nic: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetails {
    pub node_list: Vec<NodeListNetworkingDetails>,
    pub request_type: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeListNetworkingDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_compute_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_light_compute: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_robo_mixed_hypervisor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_certificate_map_list: Option<Vec<DigitalCertificateMapReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_network_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypervisor_type: Option<HypervisorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypervisor_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipmi_ip: Option<IPAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nos_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvm_ip: Option<IPAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypervisor_ip: Option<IPAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeNetworkingDetails {
    pub uplinks: Option<Vec<UplinkInfo>>,
    pub network_info: Option<NetworkInfo>,
    pub warnings: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UplinkInfo {
    pub cvm_ip: Option<IPAddress>,
    pub uplink_list: Option<Vec<NameMacRef>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameMacRef {
    pub name: Option<String>,
    pub mac: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkInfo {
    pub hci: Option<Vec<NameNetworkRef>>,
    pub so: Option<Vec<NameNetworkRef>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameNetworkRef {
    pub name: Option<String>,
    pub networks: Option<Vec<String>>,
    pub hypervisor_type: Option<HypervisorType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandClusterParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_params: Option<ConfigParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_params: Option<NodeParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_skip_add_node: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_skip_pre_expand_checks: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeParam {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_list: Option<Vec<BlockItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_list: Option<Vec<NodeItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute_node_list: Option<Vec<ComputeNodeItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypervisor_isos: Option<Vec<HypervisorIsoMap>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperv_sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_info: Option<BundleInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_skip_host_networking: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypervisor_type: Option<HypervisorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_robo_mixed_hypervisor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypervisor_hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypervisor_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nos_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_light_compute: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipmi_ip: Option<IPAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_certificate_map_list: Option<Vec<DigitalCertificateMapReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvm_ip: Option<IPAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypervisor_ip: Option<IPAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_network_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub networks: Option<Vec<UplinkNetworkItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeNodeItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypervisor_ip: Option<IPAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipmi_ip: Option<IPAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_certificate_map_list: Option<Vec<DigitalCertificateMapReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypervisor_hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DigitalCertificateMapReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UplinkNetworkItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub networks: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uplinks: Option<Uplinks>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Uplinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<Vec<UplinksField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standby: Option<Vec<UplinksField>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UplinksField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HypervisorIsoMap {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub hypervisor_type: Option<HypervisorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5_sum: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BundleInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_skip_discovery: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_skip_imaging: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_validate_rack_awareness: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_nos_compatible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_compute_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_never_scheduleable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_hypervisor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperv: Option<HypervCredentials>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HypervCredentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_details: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failover_cluster_details: Option<UserInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRemovalParams {
    pub node_uuids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_skip_remove: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_skip_prechecks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_params: Option<NodeRemovalExtraParam>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRemovalExtraParam {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_skip_upgrade_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_skip_space_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_skip_add_check: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryEntityReferences {
    pub categories: Vec<String>,
}

/// A page of clusters and the server's total count
#[derive(Debug, Clone, Default)]
pub struct ClusterPage {
    pub clusters: Vec<Cluster>,
    pub total_available_results: Option<i64>,
}

pub struct ClustersApi<'a> {
    client: &'a Client,
}

impl<'a> ClustersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn cluster_path(ext_id: &str) -> String {
        format!("{}/clusters/{}", CONFIG_BASE, ext_id)
    }

    fn action_path(ext_id: &str, action: &str) -> String {
        format!("{}/clusters/{}/$actions/{}", CONFIG_BASE, ext_id, action)
    }

    pub async fn list(&self, params: &ListParams) -> Result<ClusterPage, ApiError> {
        let response = self
            .client
            .list::<Vec<Cluster>>(
                &format!("{}/clusters", CONFIG_BASE),
                &params.to_query_params(),
            )
            .await?;
        Ok(ClusterPage {
            clusters: response.data.unwrap_or_default(),
            total_available_results: response.metadata.and_then(|m| m.total_available_results),
        })
    }

    pub async fn create(&self, cluster: &Cluster, dryrun: bool) -> Result<TaskReference, ApiError> {
        let params = ApiQueryParams::new().add("$dryrun", dryrun);
        self.client
            .post(
                &format!("{}/clusters{}", CONFIG_BASE, params.to_query_string()),
                cluster,
                None,
            )
            .await
    }

    pub async fn get(
        &self,
        ext_id: &str,
        expand: Option<&str>,
    ) -> Result<Versioned<Cluster>, ApiError> {
        let params = ApiQueryParams::new().add_optional("$expand", expand);
        self.client
            .get_with_etag(&format!(
                "{}{}",
                Self::cluster_path(ext_id),
                params.to_query_string()
            ))
            .await
    }

    pub async fn update(
        &self,
        ext_id: &str,
        cluster: &Cluster,
        etag: &str,
    ) -> Result<TaskReference, ApiError> {
        self.client
            .put(&Self::cluster_path(ext_id), cluster, etag)
            .await
    }

    pub async fn delete(
        &self,
        ext_id: &str,
        etag: &str,
        dryrun: bool,
    ) -> Result<TaskReference, ApiError> {
        let params = ApiQueryParams::new().add("$dryrun", dryrun);
        self.client
            .delete(
                &format!("{}{}", Self::cluster_path(ext_id), params.to_query_string()),
                Some(etag),
            )
            .await
    }

    pub async fn get_host(&self, cluster_ext_id: &str, host_ext_id: &str) -> Result<Host, ApiError> {
        self.client
            .get(&format!(
                "{}/hosts/{}",
                Self::cluster_path(cluster_ext_id),
                host_ext_id
            ))
            .await
    }

    /// Hosts across all clusters, or of one cluster when `cluster_ext_id` is set
    pub async fn list_hosts(
        &self,
        cluster_ext_id: Option<&str>,
        params: &ListParams,
    ) -> Result<Vec<Host>, ApiError> {
        let path = match cluster_ext_id {
            Some(id) => format!("{}/hosts", Self::cluster_path(id)),
            None => format!("{}/hosts", CONFIG_BASE),
        };
        let response = self
            .client
            .list::<Vec<Host>>(&path, &params.to_query_params())
            .await?;
        Ok(response.data.unwrap_or_default())
    }

    pub async fn discover_unconfigured_nodes(
        &self,
        ext_id: &str,
        params: &NodeDiscoveryParams,
    ) -> Result<TaskReference, ApiError> {
        self.client
            .post(
                &Self::action_path(ext_id, "discover-unconfigured-nodes"),
                params,
                None,
            )
            .await
    }

    pub async fn fetch_node_networking_details(
        &self,
        ext_id: &str,
        details: &NodeDetails,
        etag: &str,
    ) -> Result<TaskReference, ApiError> {
        self.client
            .post(
                &Self::action_path(ext_id, "fetch-node-networking-details"),
                details,
                Some(etag),
            )
            .await
    }

    /// `task_uuid` is the bare uuid part of the finished task's ext_id
    pub async fn fetch_task_response(
        &self,
        task_uuid: &str,
        response_type: TaskResponseType,
    ) -> Result<TaskResponse, ApiError> {
        let params = ApiQueryParams::new().add("$taskResponseType", response_type.as_str());
        self.client
            .get(&format!(
                "{}{}",
                Self::action_path(task_uuid, "fetch-task-response"),
                params.to_query_string()
            ))
            .await
    }

    pub async fn expand_cluster(
        &self,
        ext_id: &str,
        params: &ExpandClusterParams,
    ) -> Result<TaskReference, ApiError> {
        self.client
            .post(&Self::action_path(ext_id, "expand-cluster"), params, None)
            .await
    }

    pub async fn remove_node(
        &self,
        ext_id: &str,
        params: &NodeRemovalParams,
    ) -> Result<TaskReference, ApiError> {
        self.client
            .post(&Self::action_path(ext_id, "remove-node"), params, None)
            .await
    }

    pub async fn associate_categories(
        &self,
        ext_id: &str,
        categories: Vec<String>,
    ) -> Result<TaskReference, ApiError> {
        self.client
            .post(
                &Self::action_path(ext_id, "associate-categories"),
                &CategoryEntityReferences { categories },
                None,
            )
            .await
    }

    pub async fn disassociate_categories(
        &self,
        ext_id: &str,
        categories: Vec<String>,
    ) -> Result<TaskReference, ApiError> {
        self.client
            .post(
                &Self::action_path(ext_id, "disassociate-categories"),
                &CategoryEntityReferences { categories },
                None,
            )
            .await
    }
}

impl TaskResponse {
    /// Decodes the response union, checking the reported response type first
    pub fn decode<T: serde::de::DeserializeOwned>(
        self,
        expected: TaskResponseType,
    ) -> Result<T, ApiError> {
        if self.task_response_type.as_deref() != Some(expected.as_str()) {
            return Err(ApiError::UnexpectedResponse(format!(
                "task response type mismatch: expected {}, got {}",
                expected.as_str(),
                self.task_response_type.as_deref().unwrap_or("none")
            )));
        }
        let response = self
            .response
            .ok_or_else(|| ApiError::UnexpectedResponse("empty task response".to_string()))?;
        serde_json::from_value(response).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
