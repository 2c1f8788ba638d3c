//! Wire enums of the Nutanix v4 API
//!
//! Every enum carries the vendor ordinals: `0` is `$UNKNOWN`, `1` is
//! `$REDACTED` and real values start at `2` in declaration order. Unknown wire
//! strings deserialize to `Unknown` instead of failing, and both reserved
//! values flatten to the literal `"UNKNOWN"`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::warn;

/// Value flattened into state for `$UNKNOWN`/`$REDACTED` and unrecognised values
pub const UNKNOWN: &str = "UNKNOWN";

pub trait ApiEnum: Sized + Copy + PartialEq + 'static {
    /// Accepted wire names, in ordinal order
    const NAMES: &'static [&'static str];

    fn as_str(&self) -> &'static str;
    fn ordinal(&self) -> i32;
    fn from_name(name: &str) -> Option<Self>;
    fn from_ordinal(ordinal: i32) -> Option<Self>;
    fn is_known(&self) -> bool;

    /// The string written into Terraform state
    fn flatten(&self) -> &'static str {
        if self.is_known() {
            self.as_str()
        } else {
            UNKNOWN
        }
    }
}

/// Looks a configured string up in the registry; unknown or empty strings
/// are dropped with a warning instead of failing the request.
pub fn expand_enum<E: ApiEnum>(value: Option<&str>, field: &str) -> Option<E> {
    let value = value.filter(|v| !v.is_empty())?;
    match E::from_name(value) {
        Some(e) => Some(e),
        None => {
            warn!(field, value, "unknown enum value, omitting from request");
            None
        }
    }
}

/// Expands a list of strings, skipping empty and unknown entries. An empty
/// result is `None`.
pub fn expand_enum_list<E: ApiEnum>(values: &[String], field: &str) -> Option<Vec<E>> {
    let list: Vec<E> = values
        .iter()
        .filter_map(|v| expand_enum(Some(v), field))
        .collect();
    (!list.is_empty()).then_some(list)
}

pub fn flatten_enum<E: ApiEnum>(value: Option<&E>) -> Option<String> {
    value.map(|e| e.flatten().to_string())
}

pub fn flatten_enum_list<E: ApiEnum>(values: Option<&Vec<E>>) -> Vec<String> {
    values
        .map(|list| list.iter().map(|e| e.flatten().to_string()).collect())
        .unwrap_or_default()
}

macro_rules! api_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            Unknown,
            Redacted,
            $($variant),+
        }

        impl $name {
            const VARIANTS: &'static [$name] = &[$($name::$variant),+];
        }

        impl ApiEnum for $name {
            const NAMES: &'static [&'static str] = &[$($wire),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $name::Unknown => "$UNKNOWN",
                    $name::Redacted => "$REDACTED",
                    $($name::$variant => $wire),+
                }
            }

            fn ordinal(&self) -> i32 {
                match self {
                    $name::Unknown => 0,
                    $name::Redacted => 1,
                    other => Self::VARIANTS
                        .iter()
                        .position(|v| v == other)
                        .map_or(0, |i| i as i32 + 2),
                }
            }

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn from_ordinal(ordinal: i32) -> Option<Self> {
                match ordinal {
                    0 => Some($name::Unknown),
                    1 => Some($name::Redacted),
                    n if n >= 2 => Self::VARIANTS.get((n - 2) as usize).copied(),
                    _ => None,
                }
            }

            fn is_known(&self) -> bool {
                !matches!(self, $name::Unknown | $name::Redacted)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(match s.as_str() {
                    "$REDACTED" => $name::Redacted,
                    other => $name::from_name(other).unwrap_or($name::Unknown),
                })
            }
        }
    };
}

// Clusters

api_enum!(HypervisorType {
    Ahv => "AHV",
    Esx => "ESX",
    Hyperv => "HYPERV",
    Xen => "XEN",
    NativeHost => "NATIVEHOST",
});

api_enum!(SmtpType {
    Plain => "PLAIN",
    StartTls => "STARTTLS",
    Ssl => "SSL",
});

api_enum!(ManagementServerType {
    Vcenter => "VCENTER",
});

api_enum!(HttpProxyType {
    Http => "HTTP",
    Https => "HTTPS",
    Socks => "SOCKS",
});

api_enum!(HttpProxyWhiteListTargetType {
    Ipv6Address => "IPV6_ADDRESS",
    HostName => "HOST_NAME",
    DomainNameSuffix => "DOMAIN_NAME_SUFFIX",
    Ipv4NetworkMask => "IPV4_NETWORK_MASK",
    Ipv4Address => "IPV4_ADDRESS",
});

api_enum!(ClusterFunctionRef {
    Aos => "AOS",
    OneNode => "ONE_NODE",
    TwoNode => "TWO_NODE",
});

api_enum!(ClusterArchReference {
    X86 => "X86_64",
    Ppc64le => "PPC64LE",
});

api_enum!(DomainAwarenessLevel {
    Rack => "RACK",
    Node => "NODE",
    Block => "BLOCK",
    Disk => "DISK",
});

api_enum!(ClusterFaultToleranceRef {
    Cft1nOr1d => "CFT_1N_OR_1D",
    Cft2nOr2d => "CFT_2N_OR_2D",
    Cft1nAnd1d => "CFT_1N_AND_1D",
    Cft0nAnd0d => "CFT_0N_AND_0D",
});

api_enum!(PiiScrubbingLevel {
    All => "ALL",
    Default => "DEFAULT",
});

api_enum!(KeyManagementServerType {
    Local => "LOCAL",
    PrismCentral => "PRISM_CENTRAL",
    External => "EXTERNAL",
});

api_enum!(OperationMode {
    Normal => "NORMAL",
    ReadOnly => "READ_ONLY",
    StandAlone => "STAND_ALONE",
    SwitchToTwoNode => "SWITCH_TO_TWO_NODE",
    Override => "OVERRIDE",
});

api_enum!(EncryptionStatus {
    Enabled => "ENABLED",
    Disabled => "DISABLED",
});

api_enum!(EncryptionOptionInfo {
    Software => "SOFTWARE",
    Hardware => "HARDWARE",
    SoftwareAndHardware => "SOFTWARE_AND_HARDWARE",
});

api_enum!(EncryptionScopeInfo {
    Cluster => "CLUSTER",
    Container => "CONTAINER",
});

api_enum!(UpgradeStatus {
    Pending => "PENDING",
    Downloading => "DOWNLOADING",
    Queued => "QUEUED",
    PreUpgrade => "PREUPGRADE",
    Upgrading => "UPGRADING",
    Succeeded => "SUCCEEDED",
    Failed => "FAILED",
    Cancelled => "CANCELLED",
    Scheduled => "SCHEDULED",
});

api_enum!(PrivateKeyAlgorithm {
    Jks => "JKS",
    Pkcs12 => "PKCS12",
    Rsa2048 => "RSA_2048",
    Rsa4096 => "RSA_4096",
    RsaPublic => "RSA_PUBLIC",
    KrbKeytab => "KRB_KEYTAB",
    Ecdsa256 => "ECDSA_256",
    Ecdsa384 => "ECDSA_384",
    Ecdsa521 => "ECDSA_521",
});

api_enum!(SoftwareTypeRef {
    Nos => "NOS",
    Ncc => "NCC",
    PrismCentral => "PRISM_CENTRAL",
});

api_enum!(AddressType {
    Ipv4 => "IPV4",
    Ipv6 => "IPV6",
});

// Cluster profiles

api_enum!(ConfigType {
    NfsSubnetWhitelistConfig => "NFS_SUBNET_WHITELIST_CONFIG",
    NtpServerConfig => "NTP_SERVER_CONFIG",
    SnmpServerConfig => "SNMP_SERVER_CONFIG",
    SmtpServerConfig => "SMTP_SERVER_CONFIG",
    PulseConfig => "PULSE_CONFIG",
    NameServerConfig => "NAME_SERVER_CONFIG",
    RsyslogServerConfig => "RSYSLOG_SERVER_CONFIG",
});

api_enum!(SnmpAuthType {
    Md5 => "MD5",
    Sha => "SHA",
});

api_enum!(SnmpPrivType {
    Des => "DES",
    Aes => "AES",
});

api_enum!(SnmpProtocol {
    Tcp => "TCP",
    Tcp6 => "TCP6",
    Udp => "UDP",
    Udp6 => "UDP6",
});

api_enum!(SnmpTrapVersion {
    V2 => "V2",
    V3 => "V3",
});

api_enum!(RsyslogNetworkProtocol {
    Udp => "UDP",
    Tcp => "TCP",
    Relp => "RELP",
});

api_enum!(RsyslogModuleName {
    Audit => "AUDIT",
    Calm => "CALM",
    MinervaCvm => "MINERVA_CVM",
    Stargate => "STARGATE",
    FlowServiceLogs => "FLOW_SERVICE_LOGS",
    SyslogModule => "SYSLOG_MODULE",
    Cerebro => "CEREBRO",
    ApiAudit => "API_AUDIT",
    Genesis => "GENESIS",
    Prism => "PRISM",
    Zookeeper => "ZOOKEEPER",
    Flow => "FLOW",
    Epsilon => "EPSILON",
    Acropolis => "ACROPOLIS",
    Uhara => "UHARA",
    Lcm => "LCM",
    Aplos => "APLOS",
    NcmAiops => "NCM_AIOPS",
    Curator => "CURATOR",
    Cassandra => "CASSANDRA",
    Lazan => "LAZAN",
});

api_enum!(RsyslogModuleLogSeverityLevel {
    Emergency => "EMERGENCY",
    Notice => "NOTICE",
    Error => "ERROR",
    Alert => "ALERT",
    Info => "INFO",
    Warning => "WARNING",
    Debug => "DEBUG",
    Critical => "CRITICAL",
});

// Storage containers

api_enum!(ErasureCodeStatus {
    None => "NONE",
    Off => "OFF",
    On => "ON",
});

api_enum!(CacheDeduplication {
    None => "NONE",
    Off => "OFF",
    On => "ON",
});

api_enum!(OnDiskDedup {
    None => "NONE",
    Off => "OFF",
    PostProcess => "POST_PROCESS",
});

api_enum!(DownSamplingOperator {
    Sum => "SUM",
    Min => "MIN",
    Max => "MAX",
    Avg => "AVG",
    Count => "COUNT",
    Last => "LAST",
});

// Hosts

api_enum!(NodeStatus {
    Normal => "NORMAL",
    ToBeRemoved => "TO_BE_REMOVED",
    OkToBeRemoved => "OK_TO_BE_REMOVED",
    NewNode => "NEW_NODE",
    ToBePreprotected => "TO_BE_PREPROTECTED",
    Preprotected => "PREPROTECTED",
});

api_enum!(HostTypeEnum {
    HyperConverged => "HYPER_CONVERGED",
    ComputeOnly => "COMPUTE_ONLY",
    StorageOnly => "STORAGE_ONLY",
});

api_enum!(HypervisorState {
    AcropolisNormal => "ACROPOLIS_NORMAL",
    EnteringMaintenanceMode => "ENTERING_MAINTENANCE_MODE",
    EnteredMaintenanceMode => "ENTERED_MAINTENANCE_MODE",
    ReservedForHaFailover => "RESERVED_FOR_HA_FAILOVER",
    EnteringMaintenanceModeFromHaFailover => "ENTERING_MAINTENANCE_MODE_FROM_HA_FAILOVER",
    ReservingForHaFailover => "RESERVING_FOR_HA_FAILOVER",
    HaFailoverSource => "HA_FAILOVER_SOURCE",
    HaFailoverTarget => "HA_FAILOVER_TARGET",
    HaHealingSource => "HA_HEALING_SOURCE",
    HaHealingTarget => "HA_HEALING_TARGET",
});

api_enum!(AcropolisConnectionState {
    Connected => "CONNECTED",
    Disconnected => "DISCONNECTED",
});

api_enum!(StorageTierReference {
    PcieSsd => "PCIE_SSD",
    SataSsd => "SATA_SSD",
    Hdd => "HDD",
});

// PC registration

api_enum!(DomainManagerCloudType {
    OnpremCloud => "ONPREM_CLOUD",
    NutanixHostedCloud => "NUTANIX_HOSTED_CLOUD",
});

api_enum!(Size {
    Small => "SMALL",
    Large => "LARGE",
    ExtraLarge => "EXTRALARGE",
    Starter => "STARTER",
});

api_enum!(EnvironmentType {
    Onprem => "ONPREM",
    NtnxCloud => "NTNX_CLOUD",
});

api_enum!(ProviderType {
    Ntnx => "NTNX",
    Azure => "AZURE",
    Aws => "AWS",
    Gcp => "GCP",
    Vsphere => "VSPHERE",
});

api_enum!(ProvisioningType {
    Ntnx => "NTNX",
    Native => "NATIVE",
});

// Tasks

api_enum!(TaskStatus {
    Queued => "QUEUED",
    Running => "RUNNING",
    Pending => "PENDING",
    Succeeded => "SUCCEEDED",
    Failed => "FAILED",
    Canceled => "CANCELED",
    Scheduled => "SCHEDULED",
});

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Canceled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trips<E: ApiEnum + std::fmt::Debug>() {
        for name in E::NAMES {
            let value: E = expand_enum(Some(name), "field").unwrap();
            assert_eq!(flatten_enum(Some(&value)).as_deref(), Some(*name));
            assert_eq!(E::from_ordinal(value.ordinal()), Some(value));
        }
        assert!(E::from_ordinal(E::NAMES.len() as i32 + 2).is_none());
        assert!(E::from_ordinal(-1).is_none());
        assert_eq!(E::from_ordinal(0).unwrap().flatten(), UNKNOWN);
        assert_eq!(E::from_ordinal(1).unwrap().flatten(), UNKNOWN);
        assert!(expand_enum::<E>(Some("NOT_A_VALUE"), "field").is_none());
    }

    #[test]
    fn every_enum_round_trips_through_expand_and_flatten() {
        assert_round_trips::<HypervisorType>();
        assert_round_trips::<SmtpType>();
        assert_round_trips::<ManagementServerType>();
        assert_round_trips::<HttpProxyType>();
        assert_round_trips::<HttpProxyWhiteListTargetType>();
        assert_round_trips::<ClusterFunctionRef>();
        assert_round_trips::<ClusterArchReference>();
        assert_round_trips::<DomainAwarenessLevel>();
        assert_round_trips::<ClusterFaultToleranceRef>();
        assert_round_trips::<PiiScrubbingLevel>();
        assert_round_trips::<KeyManagementServerType>();
        assert_round_trips::<OperationMode>();
        assert_round_trips::<EncryptionStatus>();
        assert_round_trips::<EncryptionOptionInfo>();
        assert_round_trips::<EncryptionScopeInfo>();
        assert_round_trips::<UpgradeStatus>();
        assert_round_trips::<PrivateKeyAlgorithm>();
        assert_round_trips::<SoftwareTypeRef>();
        assert_round_trips::<AddressType>();
        assert_round_trips::<ConfigType>();
        assert_round_trips::<SnmpAuthType>();
        assert_round_trips::<SnmpPrivType>();
        assert_round_trips::<SnmpProtocol>();
        assert_round_trips::<SnmpTrapVersion>();
        assert_round_trips::<RsyslogNetworkProtocol>();
        assert_round_trips::<RsyslogModuleName>();
        assert_round_trips::<RsyslogModuleLogSeverityLevel>();
        assert_round_trips::<ErasureCodeStatus>();
        assert_round_trips::<CacheDeduplication>();
        assert_round_trips::<OnDiskDedup>();
        assert_round_trips::<DownSamplingOperator>();
        assert_round_trips::<NodeStatus>();
        assert_round_trips::<HostTypeEnum>();
        assert_round_trips::<HypervisorState>();
        assert_round_trips::<AcropolisConnectionState>();
        assert_round_trips::<StorageTierReference>();
        assert_round_trips::<DomainManagerCloudType>();
        assert_round_trips::<Size>();
        assert_round_trips::<EnvironmentType>();
        assert_round_trips::<ProviderType>();
        assert_round_trips::<ProvisioningType>();
        assert_round_trips::<TaskStatus>();
    }

    #[test]
    fn ordinals_follow_vendor_convention() {
        assert_eq!(HypervisorType::Unknown.ordinal(), 0);
        assert_eq!(HypervisorType::Redacted.ordinal(), 1);
        assert_eq!(HypervisorType::Ahv.ordinal(), 2);
        assert_eq!(HypervisorType::NativeHost.ordinal(), 6);
        assert_eq!(HypervisorType::from_ordinal(4), Some(HypervisorType::Hyperv));
    }

    #[test]
    fn unknown_wire_strings_deserialize_to_unknown() {
        let value: HypervisorType = serde_json::from_str(r#""KVM""#).unwrap();
        assert_eq!(value, HypervisorType::Unknown);
        assert_eq!(value.flatten(), "UNKNOWN");

        let value: HypervisorType = serde_json::from_str(r#""$REDACTED""#).unwrap();
        assert_eq!(value, HypervisorType::Redacted);
        assert_eq!(value.flatten(), "UNKNOWN");
    }

    #[test]
    fn serializes_as_wire_string() {
        assert_eq!(
            serde_json::to_string(&OnDiskDedup::PostProcess).unwrap(),
            r#""POST_PROCESS""#
        );
    }

    #[test]
    fn expand_skips_empty_values_and_lists() {
        assert!(expand_enum::<SmtpType>(Some(""), "type").is_none());
        assert!(expand_enum::<SmtpType>(None, "type").is_none());
        assert!(expand_enum_list::<HttpProxyType>(&[], "proxy_types").is_none());
        assert_eq!(
            expand_enum_list::<HttpProxyType>(
                &["HTTP".to_string(), "BOGUS".to_string(), "SOCKS".to_string()],
                "proxy_types"
            ),
            Some(vec![HttpProxyType::Http, HttpProxyType::Socks])
        );
    }

    #[test]
    fn task_status_terminal_states() {
        assert!(TaskStatus::Succeeded.is_terminal());
        assert!(TaskStatus::Canceled.is_terminal());
        assert!(!TaskStatus::Scheduled.is_terminal());
        assert!(!TaskStatus::Unknown.is_terminal());
    }
}
