//! Expands a cluster with explicitly described nodes
//!
//! The node spec is sent as configured; nothing is read back. Destroying the
//! resource removes the first node of `node_list` again.

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::plan_modifier::RequiresReplace;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{
    Attribute, AttributeBuilder, AttributeType, BlockBuilder, NestedBlock, SchemaBuilder,
};
use tfplug::types::AttributePath;
use tracing::debug;

use super::nodes::{expand_cluster, remove_node, remove_node_params_block, RemovalFlags};
use crate::api::clustermgmt::clusters::{
    BlockItem, BundleInfo, ComputeNodeItem, ConfigParams, DigitalCertificateMapReference,
    ExpandClusterParams, HypervCredentials, HypervisorIsoMap, NodeItem, NodeParam,
    UplinkNetworkItem, Uplinks, UplinksField, UserInfo,
};
use crate::common::schema::{expand_ip_address, id_attribute, ip_address_block, one_of, Mode};
use crate::common::{not_configured, state_error, Attrs};
use crate::enums::{expand_enum, HypervisorType};
use crate::provider_data::NutanixProviderData;

#[derive(Default)]
pub struct ClusterAddNodeResource {
    provider_data: Option<NutanixProviderData>,
}

impl ClusterAddNodeResource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn optional(name: &str, kind: AttributeType) -> Attribute {
    AttributeBuilder::new(name, kind).optional().build()
}

fn hypervisor_type(name: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .optional()
        .validator(one_of::<HypervisorType>())
        .build()
}

pub(crate) fn certificate_map_block() -> NestedBlock {
    NestedBlock::list(
        "digital_certificate_map_list",
        BlockBuilder::new()
            .attribute(optional("key", AttributeType::String))
            .attribute(optional("value", AttributeType::String))
            .build(),
    )
}

fn uplink_fields_block(name: &str) -> NestedBlock {
    NestedBlock::list(
        name,
        BlockBuilder::new()
            .attribute(optional("mac", AttributeType::String))
            .attribute(optional("name", AttributeType::String))
            .attribute(optional("value", AttributeType::String))
            .build(),
    )
}

fn node_list_block() -> NestedBlock {
    let networks = BlockBuilder::new()
        .attribute(optional("name", AttributeType::String))
        .attribute(optional(
            "networks",
            AttributeType::list_of(AttributeType::String),
        ))
        .block(
            NestedBlock::list(
                "uplinks",
                BlockBuilder::new()
                    .block(uplink_fields_block("active"))
                    .block(uplink_fields_block("standby"))
                    .build(),
            )
            .max_items(1),
        )
        .build();

    NestedBlock::list(
        "node_list",
        BlockBuilder::new()
            .attribute(optional("node_uuid", AttributeType::String))
            .attribute(optional("block_id", AttributeType::String))
            .attribute(optional("node_position", AttributeType::String))
            .attribute(hypervisor_type("hypervisor_type"))
            .attribute(optional("is_robo_mixed_hypervisor", AttributeType::Bool))
            .attribute(optional("hypervisor_hostname", AttributeType::String))
            .attribute(optional("hypervisor_version", AttributeType::String))
            .attribute(optional("nos_version", AttributeType::String))
            .attribute(optional("is_light_compute", AttributeType::Bool))
            .block(ip_address_block("ipmi_ip", Mode::Input))
            .block(certificate_map_block())
            .block(ip_address_block("cvm_ip", Mode::Input))
            .block(ip_address_block("hypervisor_ip", Mode::Input))
            .attribute(optional("model", AttributeType::String))
            .attribute(optional("current_network_interface", AttributeType::String))
            .block(NestedBlock::list("networks", networks))
            .build(),
    )
    .min_items(1)
}

fn compute_node_list_block() -> NestedBlock {
    NestedBlock::list(
        "compute_node_list",
        BlockBuilder::new()
            .attribute(optional("node_uuid", AttributeType::String))
            .attribute(optional("block_id", AttributeType::String))
            .attribute(optional("node_position", AttributeType::String))
            .block(ip_address_block("hypervisor_ip", Mode::Input))
            .block(ip_address_block("ipmi_ip", Mode::Input))
            .block(certificate_map_block())
            .attribute(optional("hypervisor_hostname", AttributeType::String))
            .attribute(optional("model", AttributeType::String))
            .build(),
    )
}

fn node_params_block() -> NestedBlock {
    NestedBlock::list(
        "node_params",
        BlockBuilder::new()
            .block(NestedBlock::list(
                "block_list",
                BlockBuilder::new()
                    .attribute(optional("block_id", AttributeType::String))
                    .attribute(optional("rack_name", AttributeType::String))
                    .build(),
            ))
            .block(node_list_block())
            .block(compute_node_list_block())
            .block(NestedBlock::list(
                "hypervisor_isos",
                BlockBuilder::new()
                    .attribute(hypervisor_type("type"))
                    .attribute(optional("md5_sum", AttributeType::String))
                    .build(),
            ))
            .attribute(optional("hyperv_sku", AttributeType::String))
            .block(
                NestedBlock::list(
                    "bundle_info",
                    BlockBuilder::new()
                        .attribute(optional("name", AttributeType::String))
                        .build(),
                )
                .max_items(1),
            )
            .attribute(optional("should_skip_host_networking", AttributeType::Bool))
            .build(),
    )
    .min_items(1)
    .max_items(1)
}

fn user_info_block(name: &str) -> NestedBlock {
    NestedBlock::list(
        name,
        BlockBuilder::new()
            .attribute(optional("username", AttributeType::String))
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(optional("cluster_name", AttributeType::String))
            .build(),
    )
    .max_items(1)
}

fn config_params_block() -> NestedBlock {
    NestedBlock::list(
        "config_params",
        BlockBuilder::new()
            .attribute(optional("should_skip_discovery", AttributeType::Bool))
            .attribute(optional("should_skip_imaging", AttributeType::Bool))
            .attribute(optional("should_validate_rack_awareness", AttributeType::Bool))
            .attribute(optional("is_nos_compatible", AttributeType::Bool))
            .attribute(optional("is_compute_only", AttributeType::Bool))
            .attribute(optional("is_never_schedulable", AttributeType::Bool))
            .attribute(optional("target_hypervisor", AttributeType::String))
            .block(
                NestedBlock::list(
                    "hyperv",
                    BlockBuilder::new()
                        .block(user_info_block("domain_details"))
                        .block(user_info_block("failover_cluster_details"))
                        .build(),
                )
                .max_items(1),
            )
            .build(),
    )
    .max_items(1)
}

pub(crate) fn expand_certificates(attrs: Attrs<'_>) -> Option<Vec<DigitalCertificateMapReference>> {
    let list: Vec<_> = attrs
        .blocks("digital_certificate_map_list")
        .into_iter()
        .map(|c| DigitalCertificateMapReference {
            key: c.str("key"),
            value: c.str("value"),
        })
        .collect();
    (!list.is_empty()).then_some(list)
}

fn expand_uplink_fields(attrs: Attrs<'_>, key: &str) -> Option<Vec<UplinksField>> {
    let list: Vec<_> = attrs
        .blocks(key)
        .into_iter()
        .map(|u| UplinksField {
            mac: u.str("mac"),
            name: u.str("name"),
            value: u.str("value"),
        })
        .collect();
    (!list.is_empty()).then_some(list)
}

fn expand_networks(attrs: Attrs<'_>) -> Option<Vec<UplinkNetworkItem>> {
    let list: Vec<_> = attrs
        .blocks("networks")
        .into_iter()
        .map(|n| UplinkNetworkItem {
            name: n.str("name"),
            networks: n.string_list("networks"),
            uplinks: n.block("uplinks").map(|u| Uplinks {
                active: expand_uplink_fields(u, "active"),
                standby: expand_uplink_fields(u, "standby"),
            }),
        })
        .collect();
    (!list.is_empty()).then_some(list)
}

fn expand_node_item(attrs: Attrs<'_>) -> NodeItem {
    NodeItem {
        node_uuid: attrs.str("node_uuid"),
        block_id: attrs.str("block_id"),
        node_position: attrs.str("node_position"),
        hypervisor_type: expand_enum(
            attrs.str("hypervisor_type").as_deref(),
            "node_list.hypervisor_type",
        ),
        is_robo_mixed_hypervisor: attrs.bool("is_robo_mixed_hypervisor"),
        hypervisor_hostname: attrs.str("hypervisor_hostname"),
        hypervisor_version: attrs.str("hypervisor_version"),
        nos_version: attrs.str("nos_version"),
        is_light_compute: attrs.bool("is_light_compute"),
        ipmi_ip: expand_ip_address(attrs.block("ipmi_ip")),
        digital_certificate_map_list: expand_certificates(attrs),
        cvm_ip: expand_ip_address(attrs.block("cvm_ip")),
        hypervisor_ip: expand_ip_address(attrs.block("hypervisor_ip")),
        model: attrs.str("model"),
        current_network_interface: attrs.str("current_network_interface"),
        networks: expand_networks(attrs),
    }
}

fn expand_compute_node(attrs: Attrs<'_>) -> ComputeNodeItem {
    ComputeNodeItem {
        node_uuid: attrs.str("node_uuid"),
        block_id: attrs.str("block_id"),
        node_position: attrs.str("node_position"),
        hypervisor_ip: expand_ip_address(attrs.block("hypervisor_ip")),
        ipmi_ip: expand_ip_address(attrs.block("ipmi_ip")),
        digital_certificate_map_list: expand_certificates(attrs),
        hypervisor_hostname: attrs.str("hypervisor_hostname"),
        model: attrs.str("model"),
    }
}

fn non_empty<T>(list: Vec<T>) -> Option<Vec<T>> {
    (!list.is_empty()).then_some(list)
}

pub(crate) fn expand_node_param(attrs: Attrs<'_>) -> NodeParam {
    NodeParam {
        block_list: non_empty(
            attrs
                .blocks("block_list")
                .into_iter()
                .map(|b| BlockItem {
                    block_id: b.str("block_id"),
                    rack_name: b.str("rack_name"),
                })
                .collect(),
        ),
        node_list: non_empty(
            attrs
                .blocks("node_list")
                .into_iter()
                .map(expand_node_item)
                .collect(),
        ),
        compute_node_list: non_empty(
            attrs
                .blocks("compute_node_list")
                .into_iter()
                .map(expand_compute_node)
                .collect(),
        ),
        hypervisor_isos: non_empty(
            attrs
                .blocks("hypervisor_isos")
                .into_iter()
                .map(|iso| HypervisorIsoMap {
                    hypervisor_type: expand_enum(
                        iso.str("type").as_deref(),
                        "hypervisor_isos.type",
                    ),
                    md5_sum: iso.str("md5_sum"),
                })
                .collect(),
        ),
        hyperv_sku: attrs.str("hyperv_sku"),
        bundle_info: attrs.block("bundle_info").map(|b| BundleInfo {
            name: b.str("name"),
        }),
        should_skip_host_networking: attrs.bool("should_skip_host_networking"),
    }
}

fn expand_user_info(attrs: Option<Attrs<'_>>) -> Option<UserInfo> {
    let attrs = attrs?;
    Some(UserInfo {
        user_name: attrs.str("username"),
        password: attrs.str("password"),
        cluster_name: attrs.str("cluster_name"),
    })
}

pub(crate) fn expand_config_params(attrs: Attrs<'_>) -> ConfigParams {
    ConfigParams {
        should_skip_discovery: attrs.bool("should_skip_discovery"),
        should_skip_imaging: attrs.bool("should_skip_imaging"),
        should_validate_rack_awareness: attrs.bool("should_validate_rack_awareness"),
        is_nos_compatible: attrs.bool("is_nos_compatible"),
        is_compute_only: attrs.bool("is_compute_only"),
        is_never_scheduleable: attrs.bool("is_never_schedulable"),
        target_hypervisor: attrs.str("target_hypervisor"),
        hyperv: attrs.block("hyperv").map(|h| HypervCredentials {
            domain_details: expand_user_info(h.block("domain_details")),
            failover_cluster_details: expand_user_info(h.block("failover_cluster_details")),
        }),
    }
}

pub(crate) fn expand_add_node(attrs: Attrs<'_>) -> ExpandClusterParams {
    ExpandClusterParams {
        config_params: attrs.block("config_params").map(expand_config_params),
        node_params: attrs.block("node_params").map(expand_node_param),
        should_skip_add_node: attrs.bool("should_skip_add_node"),
        should_skip_pre_expand_checks: attrs.bool("should_skip_pre_expand_checks"),
    }
}

#[async_trait]
impl Resource for ClusterAddNodeResource {
    fn type_name(&self) -> &str {
        "nutanix_cluster_add_node_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Adds nodes to an existing cluster")
            .attribute(id_attribute())
            .attribute(
                AttributeBuilder::new("cluster_ext_id", AttributeType::String)
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .block(node_params_block())
            .block(config_params_block())
            .attribute(optional("should_skip_add_node", AttributeType::Bool))
            .attribute(optional("should_skip_pre_expand_checks", AttributeType::Bool))
            .block(remove_node_params_block())
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        };

        let attrs = Attrs::of(&request.planned_state);
        let cluster_ext_id = attrs.str("cluster_ext_id").unwrap_or_default();
        let body = expand_add_node(attrs);

        if let Err(diag) = expand_cluster(&ctx, data, &cluster_ext_id, &body).await {
            diagnostics.push(diag);
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        }

        let mut new_state = request.planned_state;
        if let Err(e) = new_state.set_string(&AttributePath::new("id"), cluster_ext_id) {
            diagnostics.push(state_error(e));
        }
        CreateResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        ReadResourceResponse {
            new_state: Some(request.current_state),
            diagnostics: vec![],
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        debug!("node changes take effect only when the resource is replaced");
        let mut new_state = request.planned_state;
        let id = request
            .prior_state
            .get_optional_string(&AttributePath::new("id"))
            .unwrap_or_default();
        let diagnostics = match new_state.set_string(&AttributePath::new("id"), id) {
            Ok(()) => vec![],
            Err(e) => vec![state_error(e)],
        };
        UpdateResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let attrs = Attrs::of(&request.prior_state);
        let cluster_ext_id = attrs.str("cluster_ext_id").unwrap_or_default();
        let node_uuid = attrs
            .block("node_params")
            .and_then(|p| p.block("node_list"))
            .and_then(|n| n.str("node_uuid"))
            .unwrap_or_default();
        let params = RemovalFlags::from_block(attrs.block("remove_node_params"))
            .params(vec![node_uuid]);

        if let Err(diag) = remove_node(&ctx, data, &cluster_ext_id, &params).await {
            diagnostics.push(diag);
        }
        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for ClusterAddNodeResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];
        match NutanixProviderData::from_any(request.provider_data) {
            Ok(data) => self.provider_data = Some(data),
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureResourceResponse { diagnostics }
    }
}

#[path = "./resource_cluster_add_node_test.rs"]
mod resource_cluster_add_node_test;
