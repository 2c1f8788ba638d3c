//! Cluster attributes shared by the cluster resource and the cluster data sources
//!
//! `Mode::Input` renders the resource flavour: configurable fields are
//! optional and computed, server-owned fields stay computed. `Mode::Computed`
//! renders everything read-only.

use tfplug::schema::{
    Attribute, AttributeBuilder, AttributeType, BlockBuilder, NestedBlock, SchemaBuilder,
};
use tfplug::types::Dynamic;

use crate::api::clustermgmt::clusters::{
    BackplaneNetworkParams, Cluster, ClusterConfigReference, ClusterNetworkReference,
    FaultToleranceState, HttpProxyConfig, HttpProxyWhiteListConfig, ManagementServerRef,
    NodeReference, PublicKey,
};
use crate::common::network::{
    configured_smtp_password, expand_pulse_status, expand_smtp_server, flatten_pulse_status,
    flatten_smtp_server, pulse_status_block, smtp_server_block,
};
use crate::common::schema::{
    computed, expand_ip_address, expand_ip_or_fqdn_list, expand_ipv4, flatten_ip_address,
    flatten_ip_or_fqdn_list, flatten_ipv4, flatten_links, ip_address_block, ip_or_fqdn_list_block,
    ipv4_value_block, links_block, one_of, optional_computed, Mode,
};
use crate::common::{many, single, Attrs, Obj};
use crate::enums::{
    expand_enum, expand_enum_list, ApiEnum, ClusterArchReference, ClusterFaultToleranceRef,
    ClusterFunctionRef, DomainAwarenessLevel, EncryptionStatus, HttpProxyType,
    HttpProxyWhiteListTargetType, KeyManagementServerType, ManagementServerType, OperationMode,
};

fn field(name: &str, kind: AttributeType, mode: Mode) -> Attribute {
    match mode {
        Mode::Input => optional_computed(name, kind),
        Mode::Computed => computed(name, kind),
    }
}

fn enum_field<E: ApiEnum>(name: &str, kind: AttributeType, mode: Mode) -> Attribute {
    match mode {
        Mode::Input => AttributeBuilder::new(name, kind)
            .optional()
            .computed()
            .validator(one_of::<E>())
            .build(),
        Mode::Computed => computed(name, kind),
    }
}

fn required_field(name: &str, kind: AttributeType, mode: Mode) -> Attribute {
    match mode {
        Mode::Input => AttributeBuilder::new(name, kind).required().build(),
        Mode::Computed => computed(name, kind),
    }
}

fn management_server_block(mode: Mode) -> NestedBlock {
    NestedBlock::list(
        "management_server",
        BlockBuilder::new()
            .block(ip_address_block("ip", mode))
            .attribute(enum_field::<ManagementServerType>(
                "type",
                AttributeType::String,
                mode,
            ))
            .attribute(field("is_drs_enabled", AttributeType::Bool, mode))
            .attribute(field("is_registered", AttributeType::Bool, mode))
            .attribute(field("is_in_use", AttributeType::Bool, mode))
            .build(),
    )
    .max_items(1)
}

fn backplane_block(mode: Mode) -> NestedBlock {
    NestedBlock::list(
        "backplane",
        BlockBuilder::new()
            .attribute(field("is_segmentation_enabled", AttributeType::Bool, mode))
            .attribute(field("vlan_tag", AttributeType::Number, mode))
            .block(ipv4_value_block("subnet", mode))
            .block(ipv4_value_block("netmask", mode))
            .build(),
    )
    .max_items(1)
}

fn http_proxy_list_block(mode: Mode) -> NestedBlock {
    let password = match mode {
        Mode::Input => AttributeBuilder::new("password", AttributeType::String)
            .optional()
            .sensitive()
            .build(),
        Mode::Computed => AttributeBuilder::new("password", AttributeType::String)
            .computed()
            .sensitive()
            .build(),
    };
    NestedBlock::list(
        "http_proxy_list",
        BlockBuilder::new()
            .block(ip_address_block("ip_address", mode))
            .attribute(field("port", AttributeType::Number, mode))
            .attribute(field("username", AttributeType::String, mode))
            .attribute(password)
            .attribute(required_field("name", AttributeType::String, mode))
            .attribute(enum_field::<HttpProxyType>(
                "proxy_types",
                AttributeType::list_of(AttributeType::String),
                mode,
            ))
            .build(),
    )
}

fn http_proxy_white_list_block(mode: Mode) -> NestedBlock {
    let target_type = match mode {
        Mode::Input => AttributeBuilder::new("target_type", AttributeType::String)
            .required()
            .validator(one_of::<HttpProxyWhiteListTargetType>())
            .build(),
        Mode::Computed => computed("target_type", AttributeType::String),
    };
    NestedBlock::list(
        "http_proxy_white_list",
        BlockBuilder::new()
            .attribute(required_field("target", AttributeType::String, mode))
            .attribute(target_type)
            .build(),
    )
}

pub(crate) fn network_block(mode: Mode) -> NestedBlock {
    NestedBlock::list(
        "network",
        BlockBuilder::new()
            .block(ip_address_block("external_address", mode))
            .block(ip_address_block("external_data_services_ip", mode))
            .attribute(computed("external_subnet", AttributeType::String))
            .attribute(computed("internal_subnet", AttributeType::String))
            .attribute(field(
                "nfs_subnet_white_list",
                AttributeType::list_of(AttributeType::String),
                mode,
            ))
            .block(ip_or_fqdn_list_block("name_server_ip_list", mode))
            .block(ip_or_fqdn_list_block("ntp_server_ip_list", mode))
            .block(smtp_server_block(mode))
            .block(ip_address_block("masquerading_ip", mode))
            .attribute(field("masquerading_port", AttributeType::Number, mode))
            .block(management_server_block(mode))
            .attribute(field("fqdn", AttributeType::String, mode))
            .attribute(enum_field::<KeyManagementServerType>(
                "key_management_server_type",
                AttributeType::String,
                mode,
            ))
            .block(backplane_block(mode))
            .block(http_proxy_list_block(mode))
            .block(http_proxy_white_list_block(mode))
            .build(),
    )
    .max_items(1)
}

fn fault_tolerance_state_block(mode: Mode) -> NestedBlock {
    NestedBlock::list(
        "fault_tolerance_state",
        BlockBuilder::new()
            .attribute(computed("current_max_fault_tolerance", AttributeType::Number))
            .attribute(computed("desired_max_fault_tolerance", AttributeType::Number))
            .attribute(enum_field::<DomainAwarenessLevel>(
                "domain_awareness_level",
                AttributeType::String,
                mode,
            ))
            .attribute(computed("current_cluster_fault_tolerance", AttributeType::String))
            .attribute(enum_field::<ClusterFaultToleranceRef>(
                "desired_cluster_fault_tolerance",
                AttributeType::String,
                mode,
            ))
            .block(NestedBlock::list(
                "redundancy_status",
                BlockBuilder::new()
                    .attribute(computed("is_cassandra_preparation_done", AttributeType::Bool))
                    .attribute(computed("is_zookeeper_preparation_done", AttributeType::Bool))
                    .build(),
            ))
            .build(),
    )
    .max_items(1)
}

pub(crate) fn config_block(mode: Mode) -> NestedBlock {
    let strings = || AttributeType::list_of(AttributeType::String);
    NestedBlock::list(
        "config",
        BlockBuilder::new()
            .attribute(computed("incarnation_id", AttributeType::Number))
            .block(NestedBlock::list(
                "build_info",
                BlockBuilder::new()
                    .attribute(computed("build_type", AttributeType::String))
                    .attribute(computed("version", AttributeType::String))
                    .attribute(computed("full_version", AttributeType::String))
                    .attribute(computed("commit_id", AttributeType::String))
                    .attribute(computed("short_commit_id", AttributeType::String))
                    .build(),
            ))
            .attribute(computed("hypervisor_types", strings()))
            .attribute(enum_field::<ClusterFunctionRef>("cluster_function", strings(), mode))
            .attribute(computed("timezone", AttributeType::String))
            .block(NestedBlock::list(
                "authorized_public_key_list",
                BlockBuilder::new()
                    .attribute(field("name", AttributeType::String, mode))
                    .attribute(field("key", AttributeType::String, mode))
                    .build(),
            ))
            .attribute(field("redundancy_factor", AttributeType::Number, mode))
            .block(NestedBlock::list(
                "cluster_software_map",
                BlockBuilder::new()
                    .attribute(computed("software_type", AttributeType::String))
                    .attribute(computed("version", AttributeType::String))
                    .build(),
            ))
            .attribute(enum_field::<ClusterArchReference>(
                "cluster_arch",
                AttributeType::String,
                mode,
            ))
            .block(fault_tolerance_state_block(mode))
            .attribute(computed("is_remote_support_enabled", AttributeType::Bool))
            .attribute(enum_field::<OperationMode>(
                "operation_mode",
                AttributeType::String,
                mode,
            ))
            .attribute(computed("is_lts", AttributeType::Bool))
            .attribute(computed("is_password_remote_login_enabled", AttributeType::Bool))
            .attribute(enum_field::<EncryptionStatus>(
                "encryption_in_transit_status",
                AttributeType::String,
                mode,
            ))
            .attribute(computed("encryption_option", strings()))
            .attribute(computed("encryption_scope", strings()))
            .block(pulse_status_block(mode))
            .attribute(computed("is_available", AttributeType::Bool))
            .build(),
    )
    .max_items(1)
}

/// Attributes every cluster carries when read back; `nodes` is left to the caller
pub(crate) fn cluster_fields(builder: SchemaBuilder, mode: Mode) -> SchemaBuilder {
    builder
        .attribute(computed("tenant_id", AttributeType::String))
        .block(links_block())
        .block(network_block(mode).computed())
        .block(config_block(mode).computed())
        .attribute(computed("upgrade_status", AttributeType::String))
        .attribute(field("container_name", AttributeType::String, mode))
        .attribute(field(
            "categories",
            AttributeType::set_of(AttributeType::String),
            mode,
        ))
        .attribute(computed("vm_count", AttributeType::Number))
        .attribute(computed("inefficient_vm_count", AttributeType::Number))
        .attribute(field("cluster_profile_ext_id", AttributeType::String, mode))
        .attribute(computed("backup_eligibility_score", AttributeType::Number))
}

/// Read-only `nodes` block of the data sources
pub(crate) fn computed_nodes_block() -> NestedBlock {
    NestedBlock::list(
        "nodes",
        BlockBuilder::new()
            .attribute(computed("number_of_nodes", AttributeType::Number))
            .block(NestedBlock::list(
                "node_list",
                BlockBuilder::new()
                    .block(ip_address_block("controller_vm_ip", Mode::Computed))
                    .attribute(computed("node_uuid", AttributeType::String))
                    .block(ip_address_block("host_ip", Mode::Computed))
                    .build(),
            ))
            .build(),
    )
}

// Expand

fn expand_management_server(attrs: Option<Attrs<'_>>) -> Option<ManagementServerRef> {
    let attrs = attrs?;
    Some(ManagementServerRef {
        ip: expand_ip_address(attrs.block("ip")),
        server_type: expand_enum(attrs.str("type").as_deref(), "management_server.type"),
        is_drs_enabled: attrs.bool("is_drs_enabled"),
        is_registered: attrs.bool("is_registered"),
        is_in_use: attrs.bool("is_in_use"),
    })
}

fn expand_backplane(attrs: Option<Attrs<'_>>) -> Option<BackplaneNetworkParams> {
    let attrs = attrs?;
    Some(BackplaneNetworkParams {
        is_segmentation_enabled: attrs.bool("is_segmentation_enabled"),
        vlan_tag: attrs.i64("vlan_tag"),
        subnet: expand_ipv4(attrs.block("subnet")),
        netmask: expand_ipv4(attrs.block("netmask")),
    })
}

fn expand_http_proxies(blocks: Vec<Attrs<'_>>) -> Option<Vec<HttpProxyConfig>> {
    let list: Vec<_> = blocks
        .into_iter()
        .map(|p| HttpProxyConfig {
            ip_address: expand_ip_address(p.block("ip_address")),
            port: p.i64("port"),
            username: p.str("username"),
            password: p.str("password"),
            name: p.str("name"),
            proxy_types: expand_enum_list(&p.strings("proxy_types"), "proxy_types"),
        })
        .collect();
    (!list.is_empty()).then_some(list)
}

fn expand_http_proxy_white_list(blocks: Vec<Attrs<'_>>) -> Option<Vec<HttpProxyWhiteListConfig>> {
    let list: Vec<_> = blocks
        .into_iter()
        .map(|w| HttpProxyWhiteListConfig {
            target: w.str("target"),
            target_type: expand_enum(w.str("target_type").as_deref(), "target_type"),
        })
        .collect();
    (!list.is_empty()).then_some(list)
}

pub(crate) fn expand_network(attrs: Option<Attrs<'_>>) -> Option<ClusterNetworkReference> {
    let attrs = attrs?;
    Some(ClusterNetworkReference {
        external_address: expand_ip_address(attrs.block("external_address")),
        external_data_service_ip: expand_ip_address(attrs.block("external_data_services_ip")),
        nfs_subnet_whitelist: attrs.string_list("nfs_subnet_white_list"),
        name_server_ip_list: expand_ip_or_fqdn_list(attrs.blocks("name_server_ip_list")),
        ntp_server_ip_list: expand_ip_or_fqdn_list(attrs.blocks("ntp_server_ip_list")),
        smtp_server: expand_smtp_server(attrs.block("smtp_server")),
        masquerading_ip: expand_ip_address(attrs.block("masquerading_ip")),
        masquerading_port: attrs.i64("masquerading_port"),
        management_server: expand_management_server(attrs.block("management_server")),
        fqdn: attrs.str("fqdn"),
        key_management_server_type: expand_enum(
            attrs.str("key_management_server_type").as_deref(),
            "key_management_server_type",
        ),
        backplane: expand_backplane(attrs.block("backplane")),
        http_proxy_list: expand_http_proxies(attrs.blocks("http_proxy_list")),
        http_proxy_white_list: expand_http_proxy_white_list(attrs.blocks("http_proxy_white_list")),
        ..Default::default()
    })
}

fn expand_fault_tolerance(attrs: Option<Attrs<'_>>) -> Option<FaultToleranceState> {
    let attrs = attrs?;
    Some(FaultToleranceState {
        domain_awareness_level: expand_enum(
            attrs.str("domain_awareness_level").as_deref(),
            "domain_awareness_level",
        ),
        desired_cluster_fault_tolerance: expand_enum(
            attrs.str("desired_cluster_fault_tolerance").as_deref(),
            "desired_cluster_fault_tolerance",
        ),
        ..Default::default()
    })
}

fn expand_public_keys(blocks: Vec<Attrs<'_>>) -> Option<Vec<PublicKey>> {
    let list: Vec<_> = blocks
        .into_iter()
        .map(|k| PublicKey {
            name: k.str("name"),
            key: k.str("key"),
        })
        .collect();
    (!list.is_empty()).then_some(list)
}

/// The configurable part of `config`. With a `prior` block only the fields
/// that moved away from it are sent; `cluster_function` and `cluster_arch`
/// always are.
pub(crate) fn expand_config(
    attrs: Option<Attrs<'_>>,
    prior: Option<Attrs<'_>>,
) -> Option<ClusterConfigReference> {
    let attrs = attrs?;
    let changed = |key: &str| prior.map_or(true, |p| p.get(key) != attrs.get(key));

    let mut config = ClusterConfigReference {
        cluster_function: expand_enum_list(&attrs.strings("cluster_function"), "cluster_function"),
        cluster_arch: expand_enum(attrs.str("cluster_arch").as_deref(), "cluster_arch"),
        ..Default::default()
    };
    if changed("authorized_public_key_list") {
        config.authorized_public_key_list =
            expand_public_keys(attrs.blocks("authorized_public_key_list"));
    }
    if changed("redundancy_factor") {
        config.redundancy_factor = attrs.i64("redundancy_factor");
    }
    if changed("fault_tolerance_state") {
        config.fault_tolerance_state = expand_fault_tolerance(attrs.block("fault_tolerance_state"));
    }
    if changed("operation_mode") {
        config.operation_mode =
            expand_enum(attrs.str("operation_mode").as_deref(), "operation_mode");
    }
    if changed("encryption_in_transit_status") {
        config.encryption_in_transit_status = expand_enum(
            attrs.str("encryption_in_transit_status").as_deref(),
            "encryption_in_transit_status",
        );
    }
    if changed("pulse_status") {
        config.pulse_status = expand_pulse_status(attrs.block("pulse_status"));
    }
    Some(config)
}

// Flatten

/// HTTP proxy passwords as configured, in list order
fn configured_proxy_passwords(network: Option<Attrs<'_>>) -> Vec<Option<String>> {
    network
        .map(|n| {
            n.blocks("http_proxy_list")
                .into_iter()
                .map(|p| p.str("password"))
                .collect()
        })
        .unwrap_or_default()
}

fn network_obj(network: &ClusterNetworkReference, configured: Option<Attrs<'_>>) -> Obj {
    let smtp_password = configured.and_then(configured_smtp_password);
    let proxy_passwords = configured_proxy_passwords(configured);

    let proxies = network.http_proxy_list.as_ref().map(|list| {
        list.iter()
            .enumerate()
            .map(|(i, p)| {
                let password = proxy_passwords
                    .get(i)
                    .cloned()
                    .flatten()
                    .or_else(|| p.password.clone());
                Obj::new()
                    .set("ip_address", flatten_ip_address(p.ip_address.as_ref()))
                    .set("port", p.port)
                    .set("username", p.username.as_ref())
                    .set("password", password)
                    .set("name", p.name.as_ref())
                    .set_enum_list("proxy_types", p.proxy_types.as_ref())
                    .build()
            })
            .collect::<Vec<_>>()
    });

    Obj::new()
        .set("external_address", flatten_ip_address(network.external_address.as_ref()))
        .set(
            "external_data_services_ip",
            flatten_ip_address(network.external_data_service_ip.as_ref()),
        )
        .set("external_subnet", network.external_subnet.as_ref())
        .set("internal_subnet", network.internal_subnet.as_ref())
        .set_strings("nfs_subnet_white_list", network.nfs_subnet_whitelist.as_ref())
        .set(
            "name_server_ip_list",
            flatten_ip_or_fqdn_list(network.name_server_ip_list.as_ref()),
        )
        .set(
            "ntp_server_ip_list",
            flatten_ip_or_fqdn_list(network.ntp_server_ip_list.as_ref()),
        )
        .set(
            "smtp_server",
            flatten_smtp_server(network.smtp_server.as_ref(), smtp_password),
        )
        .set("masquerading_ip", flatten_ip_address(network.masquerading_ip.as_ref()))
        .set("masquerading_port", network.masquerading_port)
        .set(
            "management_server",
            single(network.management_server.as_ref(), |m| {
                Obj::new()
                    .set("ip", flatten_ip_address(m.ip.as_ref()))
                    .set_enum("type", m.server_type.as_ref())
                    .set("is_drs_enabled", m.is_drs_enabled)
                    .set("is_registered", m.is_registered)
                    .set("is_in_use", m.is_in_use)
            }),
        )
        .set("fqdn", network.fqdn.as_ref())
        .set_enum(
            "key_management_server_type",
            network.key_management_server_type.as_ref(),
        )
        .set(
            "backplane",
            single(network.backplane.as_ref(), |b| {
                Obj::new()
                    .set("is_segmentation_enabled", b.is_segmentation_enabled)
                    .set("vlan_tag", b.vlan_tag)
                    .set("subnet", flatten_ipv4(b.subnet.as_ref()))
                    .set("netmask", flatten_ipv4(b.netmask.as_ref()))
            }),
        )
        .set("http_proxy_list", proxies.unwrap_or_default())
        .set(
            "http_proxy_white_list",
            many(network.http_proxy_white_list.as_ref(), |w| {
                Obj::new()
                    .set("target", w.target.as_ref())
                    .set_enum("target_type", w.target_type.as_ref())
            }),
        )
}

fn config_obj(config: &ClusterConfigReference) -> Obj {
    Obj::new()
        .set("incarnation_id", config.incarnation_id)
        .set(
            "build_info",
            single(config.build_info.as_ref(), |b| {
                Obj::new()
                    .set("build_type", b.build_type.as_ref())
                    .set("version", b.version.as_ref())
                    .set("full_version", b.full_version.as_ref())
                    .set("commit_id", b.commit_id.as_ref())
                    .set("short_commit_id", b.short_commit_id.as_ref())
            }),
        )
        .set_enum_list("hypervisor_types", config.hypervisor_types.as_ref())
        .set_enum_list("cluster_function", config.cluster_function.as_ref())
        .set("timezone", config.timezone.as_ref())
        .set(
            "authorized_public_key_list",
            many(config.authorized_public_key_list.as_ref(), |k| {
                Obj::new()
                    .set("name", k.name.as_ref())
                    .set("key", k.key.as_ref())
            }),
        )
        .set("redundancy_factor", config.redundancy_factor)
        .set(
            "cluster_software_map",
            many(config.cluster_software_map.as_ref(), |s| {
                Obj::new()
                    .set_enum("software_type", s.software_type.as_ref())
                    .set("version", s.version.as_ref())
            }),
        )
        .set_enum("cluster_arch", config.cluster_arch.as_ref())
        .set(
            "fault_tolerance_state",
            single(config.fault_tolerance_state.as_ref(), |f| {
                Obj::new()
                    .set("current_max_fault_tolerance", f.current_max_fault_tolerance)
                    .set("desired_max_fault_tolerance", f.desired_max_fault_tolerance)
                    .set_enum("domain_awareness_level", f.domain_awareness_level.as_ref())
                    .set_enum(
                        "current_cluster_fault_tolerance",
                        f.current_cluster_fault_tolerance.as_ref(),
                    )
                    .set_enum(
                        "desired_cluster_fault_tolerance",
                        f.desired_cluster_fault_tolerance.as_ref(),
                    )
                    .set(
                        "redundancy_status",
                        single(f.redundancy_status.as_ref(), |r| {
                            Obj::new()
                                .set(
                                    "is_cassandra_preparation_done",
                                    r.is_cassandra_preparation_done,
                                )
                                .set(
                                    "is_zookeeper_preparation_done",
                                    r.is_zookeeper_preparation_done,
                                )
                        }),
                    )
            }),
        )
        .set("is_remote_support_enabled", config.is_remote_support_enabled)
        .set_enum("operation_mode", config.operation_mode.as_ref())
        .set("is_lts", config.is_lts)
        .set(
            "is_password_remote_login_enabled",
            config.is_password_remote_login_enabled,
        )
        .set_enum(
            "encryption_in_transit_status",
            config.encryption_in_transit_status.as_ref(),
        )
        .set_enum_list("encryption_option", config.encryption_option.as_ref())
        .set_enum_list("encryption_scope", config.encryption_scope.as_ref())
        .set("pulse_status", flatten_pulse_status(config.pulse_status.as_ref()))
        .set("is_available", config.is_available)
}

pub(crate) fn node_list_item_obj(
    node: &crate::api::clustermgmt::clusters::NodeListItemReference,
) -> Obj {
    Obj::new()
        .set("controller_vm_ip", flatten_ip_address(node.controller_vm_ip.as_ref()))
        .set("node_uuid", node.node_uuid.as_ref())
        .set("host_ip", flatten_ip_address(node.host_ip.as_ref()))
}

pub(crate) fn flatten_nodes(nodes: Option<&NodeReference>) -> Dynamic {
    single(nodes, |n| {
        Obj::new()
            .set("number_of_nodes", n.number_of_nodes)
            .set("node_list", many(n.node_list.as_ref(), node_list_item_obj))
    })
}

/// Every attribute the API reports for a cluster. Secrets hidden by the API
/// are taken from `configured` when given.
pub(crate) fn cluster_obj(cluster: &Cluster, configured: Option<Attrs<'_>>) -> Obj {
    let configured_network = configured.and_then(|c| c.block("network"));
    let categories: Vec<String> = cluster
        .categories
        .iter()
        .flatten()
        .filter(|c| !c.is_empty())
        .cloned()
        .collect();

    Obj::new()
        .set("ext_id", cluster.ext_id.as_ref())
        .set("tenant_id", cluster.tenant_id.as_ref())
        .set("links", flatten_links(cluster.links.as_ref()))
        .set("name", cluster.name.as_ref())
        .set("nodes", flatten_nodes(cluster.nodes.as_ref()))
        .set(
            "network",
            single(cluster.network.as_ref(), |n| network_obj(n, configured_network)),
        )
        .set("config", single(cluster.config.as_ref(), config_obj))
        .set_enum("upgrade_status", cluster.upgrade_status.as_ref())
        .set("vm_count", cluster.vm_count)
        .set("inefficient_vm_count", cluster.inefficient_vm_count)
        .set("container_name", cluster.container_name.as_ref())
        .set("categories", categories)
        .set("cluster_profile_ext_id", cluster.cluster_profile_ext_id.as_ref())
        .set("backup_eligibility_score", cluster.backup_eligibility_score)
}
