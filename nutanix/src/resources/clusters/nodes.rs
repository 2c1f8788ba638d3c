//! Adding nodes to and removing nodes from a running cluster
//!
//! Adding a node is three tasks in a row: discover the unconfigured node by
//! its CVM IP, fetch its networking details, then expand the cluster with a
//! node spec assembled from both answers.

use tfplug::context::Context;
use tfplug::schema::{AttributeBuilder, AttributeType, BlockBuilder, NestedBlock};
use tfplug::defaults::StaticDefault;
use tfplug::types::Diagnostic;
use tracing::{debug, info};

use crate::api::clustermgmt::clusters::{
    ConfigParams, ExpandClusterParams, HypervisorIsoMap, NodeDetails, NodeDiscoveryParams,
    NodeItem, NodeListItemReference, NodeListNetworkingDetails, NodeNetworkingDetails, NodeParam,
    NodeRemovalExtraParam, NodeRemovalParams, TaskResponseType, UnconfigureNodeDetails,
    UnconfiguredNodeListItem, UplinkNetworkItem, Uplinks, UplinksField,
};
use crate::api::common::{task_uuid, IPAddress, TaskReference};
use crate::api::prism::tasks::Task;
use crate::common::{api_error, task_error, Attrs};
use crate::enums::ApiEnum;
use crate::provider_data::NutanixProviderData;

pub(crate) const EXPAND_REQUEST_TYPE: &str = "expand_cluster";

/// Per-node switches for the expand-cluster call
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct NodeFlags {
    pub should_skip_host_networking: Option<bool>,
    pub should_skip_add_node: bool,
    pub should_skip_pre_expand_checks: bool,
    pub should_skip_discovery: bool,
    pub should_skip_imaging: bool,
    pub should_validate_rack_awareness: bool,
    pub is_nos_compatible: bool,
    pub is_compute_only: bool,
    pub is_never_scheduleable: bool,
    pub is_light_compute: bool,
    pub hypervisor_hostname: Option<String>,
}

impl NodeFlags {
    pub fn from_attrs(attrs: Attrs<'_>) -> Self {
        let flag = |key: &str| attrs.bool(key).unwrap_or(false);
        Self {
            should_skip_host_networking: attrs.bool("should_skip_host_networking"),
            should_skip_add_node: flag("should_skip_add_node"),
            should_skip_pre_expand_checks: flag("should_skip_pre_expand_checks"),
            should_skip_discovery: flag("should_skip_discovery"),
            should_skip_imaging: flag("should_skip_imaging"),
            should_validate_rack_awareness: flag("should_validate_rack_awareness"),
            is_nos_compatible: flag("is_nos_compatible"),
            is_compute_only: flag("is_compute_only"),
            is_never_scheduleable: flag("is_never_scheduleable"),
            is_light_compute: flag("is_light_compute"),
            hypervisor_hostname: attrs.str("hypervisor_hostname"),
        }
    }
}

/// Switches for remove-node, read from a `remove_node_params` block
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RemovalFlags {
    pub should_skip_remove: bool,
    pub should_skip_prechecks: bool,
    pub should_skip_upgrade_check: bool,
    pub skip_space_check: bool,
    pub should_skip_add_check: bool,
}

impl RemovalFlags {
    pub fn from_block(block: Option<Attrs<'_>>) -> Self {
        let Some(block) = block else {
            return Self::default();
        };
        let extra = block.block("extra_params");
        let extra_flag = |key: &str| extra.and_then(|e| e.bool(key)).unwrap_or(false);
        Self {
            should_skip_remove: block.bool("should_skip_remove").unwrap_or(false),
            should_skip_prechecks: block.bool("should_skip_prechecks").unwrap_or(false),
            should_skip_upgrade_check: extra_flag("should_skip_upgrade_check"),
            skip_space_check: extra_flag("skip_space_check"),
            should_skip_add_check: extra_flag("should_skip_add_check"),
        }
    }

    pub fn params(&self, node_uuids: Vec<String>) -> NodeRemovalParams {
        NodeRemovalParams {
            node_uuids,
            should_skip_remove: Some(self.should_skip_remove),
            should_skip_prechecks: Some(self.should_skip_prechecks),
            extra_params: Some(NodeRemovalExtraParam {
                should_skip_upgrade_check: Some(self.should_skip_upgrade_check),
                should_skip_space_check: Some(self.skip_space_check),
                should_skip_add_check: Some(self.should_skip_add_check),
            }),
        }
    }
}

/// The `remove_node_params` block, shared by clusters and add-node
pub(crate) fn remove_node_params_block() -> NestedBlock {
    let flag = |name: &str| {
        AttributeBuilder::new(name, AttributeType::Bool)
            .optional()
            .default(StaticDefault::bool(false))
            .build()
    };
    NestedBlock::list(
        "remove_node_params",
        BlockBuilder::new()
            .block(
                NestedBlock::list(
                    "extra_params",
                    BlockBuilder::new()
                        .attribute(flag("should_skip_upgrade_check"))
                        .attribute(flag("skip_space_check"))
                        .attribute(flag("should_skip_add_check"))
                        .build(),
                )
                .max_items(1),
            )
            .attribute(flag("should_skip_remove"))
            .attribute(flag("should_skip_prechecks"))
            .build(),
    )
    .max_items(1)
}

/// A node as planned, with the switches to add it
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PlannedNode {
    pub node: NodeListItemReference,
    pub flags: NodeFlags,
}

#[derive(Debug, Default)]
pub(crate) struct NodeDiff {
    pub added: Vec<PlannedNode>,
    pub removed: Vec<NodeListItemReference>,
    pub changed: Vec<(NodeListItemReference, NodeListItemReference)>,
}

/// Identities of a node: its uuid and both of its addresses
pub(crate) fn node_keys(node: &NodeListItemReference) -> Vec<String> {
    let mut keys = vec![];
    if let Some(uuid) = node.node_uuid.as_deref().filter(|u| !u.is_empty()) {
        keys.push(format!("uuid:{}", uuid));
    }
    if let Some(key) = node.controller_vm_ip.as_ref().and_then(IPAddress::key) {
        keys.push(format!("ctrl:{}", key));
    }
    if let Some(key) = node.host_ip.as_ref().and_then(IPAddress::key) {
        keys.push(format!("host:{}", key));
    }
    keys
}

pub(crate) fn same_node(a: &NodeListItemReference, b: &NodeListItemReference) -> bool {
    let theirs = node_keys(b);
    node_keys(a).iter().any(|k| theirs.contains(k))
}

fn same_ip(a: Option<&IPAddress>, b: Option<&IPAddress>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_address(b),
        _ => false,
    }
}

fn nodes_equal(a: &NodeListItemReference, b: &NodeListItemReference) -> bool {
    let uuids_differ = matches!(
        (a.node_uuid.as_deref(), b.node_uuid.as_deref()),
        (Some(x), Some(y)) if !x.is_empty() && !y.is_empty() && x != y
    );
    !uuids_differ
        && same_ip(a.controller_vm_ip.as_ref(), b.controller_vm_ip.as_ref())
        && same_ip(a.host_ip.as_ref(), b.host_ip.as_ref())
}

/// Splits planned nodes against the cluster's current ones. Nodes match when
/// any of their identities match.
pub(crate) fn diff_nodes(existing: &[NodeListItemReference], planned: Vec<PlannedNode>) -> NodeDiff {
    let mut diff = NodeDiff::default();
    let mut matched = vec![false; planned.len()];

    for current in existing {
        let found = planned
            .iter()
            .enumerate()
            .find(|(i, p)| !matched[*i] && same_node(current, &p.node))
            .map(|(i, _)| i);
        match found {
            Some(i) => {
                matched[i] = true;
                if !nodes_equal(current, &planned[i].node) {
                    diff.changed.push((current.clone(), planned[i].node.clone()));
                }
            }
            None => diff.removed.push(current.clone()),
        }
    }

    diff.added = planned
        .into_iter()
        .zip(matched)
        .filter(|(_, matched)| !matched)
        .map(|(node, _)| node)
        .collect();
    diff
}

async fn wait(
    ctx: &Context,
    data: &NutanixProviderData,
    task: &TaskReference,
    what: &str,
) -> Result<Task, Diagnostic> {
    data.waiter
        .wait(ctx, task, data.timeout())
        .await
        .map_err(|e| task_error(what, task.ext_id.as_deref(), &e))
}

fn finished_task_uuid(task: &Task, reference: &TaskReference) -> String {
    let ext_id = task
        .ext_id
        .as_deref()
        .or(reference.ext_id.as_deref())
        .unwrap_or_default();
    task_uuid(ext_id).to_string()
}

/// Runs a discovery on the cluster and returns every node it reported,
/// together with the ext_id of the finished discovery task
pub(crate) async fn discover_unconfigured_nodes(
    ctx: &Context,
    data: &NutanixProviderData,
    cluster_ext_id: &str,
    params: &NodeDiscoveryParams,
) -> Result<(String, Vec<UnconfiguredNodeListItem>), Diagnostic> {
    let api = data.client.clustermgmt().clusters();
    let reference = api
        .discover_unconfigured_nodes(cluster_ext_id, params)
        .await
        .map_err(|e| api_error("error while discovering unconfigured nodes", &e))?;
    let task = wait(ctx, data, &reference, "unconfigured nodes to be discovered").await?;

    let details: UnconfigureNodeDetails = api
        .fetch_task_response(
            &finished_task_uuid(&task, &reference),
            TaskResponseType::UnconfiguredNodes,
        )
        .await
        .and_then(|r| r.decode(TaskResponseType::UnconfiguredNodes))
        .map_err(|e| api_error("error while fetching task response for unconfigured nodes", &e))?;

    let task_ext_id = task
        .ext_id
        .or_else(|| reference.ext_id.clone())
        .unwrap_or_default();
    Ok((task_ext_id, details.node_list.unwrap_or_default()))
}

/// Discovers the unconfigured node answering on `cvm_ip`
pub(crate) async fn discover_unconfigured_node(
    ctx: &Context,
    data: &NutanixProviderData,
    cluster_ext_id: &str,
    cvm_ip: &IPAddress,
) -> Result<UnconfiguredNodeListItem, Diagnostic> {
    let params = NodeDiscoveryParams {
        address_type: cvm_ip.address_type(),
        ip_filter_list: vec![cvm_ip.clone()],
        ..Default::default()
    };
    debug!(cluster = %cluster_ext_id, ip = ?cvm_ip.key(), "discovering unconfigured node");

    let (_, nodes) = discover_unconfigured_nodes(ctx, data, cluster_ext_id, &params).await?;
    nodes
        .into_iter()
        .next()
        .ok_or_else(|| {
            Diagnostic::error(
                "no unconfigured node found",
                format!(
                    "discovery on cluster {} returned no node for {}",
                    cluster_ext_id,
                    cvm_ip.key().unwrap_or_default()
                ),
            )
        })
}

/// Asks the cluster how the nodes of `details` would be wired into it.
/// `expand` is passed to the cluster read that supplies the etag.
pub(crate) async fn fetch_nodes_networking_details(
    ctx: &Context,
    data: &NutanixProviderData,
    cluster_ext_id: &str,
    details: &NodeDetails,
    expand: Option<&str>,
) -> Result<NodeNetworkingDetails, Diagnostic> {
    let api = data.client.clustermgmt().clusters();
    let current = api
        .get(cluster_ext_id, expand)
        .await
        .map_err(|e| api_error("error while reading cluster", &e))?;

    let reference = api
        .fetch_node_networking_details(cluster_ext_id, details, &current.etag)
        .await
        .map_err(|e| api_error("error while fetching node networking details", &e))?;
    let task = wait(ctx, data, &reference, "node networking details to be fetched").await?;

    api.fetch_task_response(
        &finished_task_uuid(&task, &reference),
        TaskResponseType::NetworkingDetails,
    )
    .await
    .and_then(|r| r.decode(TaskResponseType::NetworkingDetails))
    .map_err(|e| api_error("error while fetching task response for networking details", &e))
}

/// Asks the cluster how `node` would be wired into it
pub(crate) async fn fetch_networking_details(
    ctx: &Context,
    data: &NutanixProviderData,
    cluster_ext_id: &str,
    node: &UnconfiguredNodeListItem,
) -> Result<NodeNetworkingDetails, Diagnostic> {
    let body = NodeDetails {
        node_list: vec![NodeListNetworkingDetails {
            current_network_interface: node.current_network_interface.clone(),
            hypervisor_type: node.hypervisor_type.clone(),
            hypervisor_version: node.hypervisor_version.clone(),
            ipmi_ip: node.ipmi_ip.clone(),
            node_position: node.node_position.clone(),
            node_uuid: node.node_uuid.clone(),
            nos_version: node.nos_version.clone(),
            cvm_ip: node.cvm_ip.clone(),
            hypervisor_ip: node.hypervisor_ip.clone(),
            ..Default::default()
        }],
        request_type: EXPAND_REQUEST_TYPE.to_string(),
    };
    fetch_nodes_networking_details(ctx, data, cluster_ext_id, &body, None).await
}

fn uplink_field(uplink: &crate::api::clustermgmt::clusters::NameMacRef) -> UplinksField {
    UplinksField {
        mac: uplink.mac.clone(),
        name: uplink.name.clone(),
        value: uplink.name.clone(),
    }
}

/// Expand-cluster body for a discovered node. The first reported uplink is
/// active, the second standby.
pub(crate) fn expand_params_for_node(
    node: &UnconfiguredNodeListItem,
    networking: &NodeNetworkingDetails,
    flags: &NodeFlags,
) -> Result<ExpandClusterParams, Diagnostic> {
    let uplinks = networking
        .uplinks
        .as_deref()
        .and_then(|u| u.first())
        .and_then(|u| u.uplink_list.as_deref())
        .filter(|list| !list.is_empty())
        .ok_or_else(|| {
            Diagnostic::error(
                "no uplinks reported for node",
                format!(
                    "networking details for node {} list no uplinks",
                    node.node_uuid.as_deref().unwrap_or("unknown")
                ),
            )
        })?;
    let hci = networking
        .network_info
        .as_ref()
        .and_then(|n| n.hci.as_deref())
        .and_then(|h| h.first());

    let network = UplinkNetworkItem {
        name: hci.and_then(|h| h.name.clone()),
        networks: hci.and_then(|h| h.networks.clone()),
        uplinks: Some(Uplinks {
            active: Some(vec![uplink_field(&uplinks[0])]),
            standby: uplinks.get(1).map(|u| vec![uplink_field(u)]),
        }),
    };

    let item = NodeItem {
        node_uuid: node.node_uuid.clone(),
        block_id: node.rackable_unit_serial.clone(),
        node_position: node.node_position.clone(),
        hypervisor_type: node.hypervisor_type.clone(),
        is_robo_mixed_hypervisor: node
            .attributes
            .as_ref()
            .and_then(|a| a.is_robo_mixed_hypervisor),
        hypervisor_hostname: flags.hypervisor_hostname.clone(),
        hypervisor_version: node.hypervisor_version.clone(),
        nos_version: node.nos_version.clone(),
        is_light_compute: Some(flags.is_light_compute),
        ipmi_ip: node.ipmi_ip.clone(),
        digital_certificate_map_list: None,
        cvm_ip: node.cvm_ip.clone(),
        hypervisor_ip: node.hypervisor_ip.clone(),
        model: node.rackable_unit_model.clone(),
        current_network_interface: uplinks[0].name.clone(),
        networks: Some(vec![network]),
    };

    Ok(ExpandClusterParams {
        config_params: Some(ConfigParams {
            should_skip_discovery: Some(flags.should_skip_discovery),
            should_skip_imaging: Some(flags.should_skip_imaging),
            should_validate_rack_awareness: Some(flags.should_validate_rack_awareness),
            is_nos_compatible: Some(flags.is_nos_compatible),
            is_compute_only: Some(flags.is_compute_only),
            is_never_scheduleable: Some(flags.is_never_scheduleable),
            target_hypervisor: node.hypervisor_type.as_ref().map(|h| h.as_str().to_string()),
            hyperv: None,
        }),
        node_params: Some(NodeParam {
            node_list: Some(vec![item]),
            hypervisor_isos: Some(vec![HypervisorIsoMap {
                hypervisor_type: node.hypervisor_type.clone(),
                md5_sum: None,
            }]),
            should_skip_host_networking: flags.should_skip_host_networking,
            ..Default::default()
        }),
        should_skip_add_node: Some(flags.should_skip_add_node),
        should_skip_pre_expand_checks: Some(flags.should_skip_pre_expand_checks),
    })
}

pub(crate) async fn expand_cluster(
    ctx: &Context,
    data: &NutanixProviderData,
    cluster_ext_id: &str,
    params: &ExpandClusterParams,
) -> Result<(), Diagnostic> {
    debug!(cluster = %cluster_ext_id, "expanding cluster");
    let reference = data
        .client
        .clustermgmt()
        .clusters()
        .expand_cluster(cluster_ext_id, params)
        .await
        .map_err(|e| api_error("error while adding node", &e))?;
    wait(ctx, data, &reference, "node to be added").await?;
    info!(cluster = %cluster_ext_id, "node added");
    Ok(())
}

pub(crate) async fn remove_node(
    ctx: &Context,
    data: &NutanixProviderData,
    cluster_ext_id: &str,
    params: &NodeRemovalParams,
) -> Result<(), Diagnostic> {
    if params.node_uuids.iter().all(String::is_empty) {
        return Err(Diagnostic::error(
            "error while removing node",
            "Node UUID is required for remove node",
        ));
    }
    debug!(cluster = %cluster_ext_id, nodes = ?params.node_uuids, "removing nodes");
    let reference = data
        .client
        .clustermgmt()
        .clusters()
        .remove_node(cluster_ext_id, params)
        .await
        .map_err(|e| api_error("error while removing node", &e))?;
    wait(ctx, data, &reference, "node to be removed").await?;
    info!(cluster = %cluster_ext_id, nodes = ?params.node_uuids, "nodes removed");
    Ok(())
}

/// Discover, fetch networking, expand: the whole add-node sequence for one
/// planned node
pub(crate) async fn add_node(
    ctx: &Context,
    data: &NutanixProviderData,
    cluster_ext_id: &str,
    planned: &PlannedNode,
) -> Result<(), Diagnostic> {
    let cvm_ip = planned.node.controller_vm_ip.as_ref().ok_or_else(|| {
        Diagnostic::error(
            "error while adding node",
            "controller_vm_ip is required to add a node",
        )
    })?;
    let node = discover_unconfigured_node(ctx, data, cluster_ext_id, cvm_ip).await?;
    let networking = fetch_networking_details(ctx, data, cluster_ext_id, &node).await?;
    let params = expand_params_for_node(&node, &networking, &planned.flags)?;
    expand_cluster(ctx, data, cluster_ext_id, &params).await
}
