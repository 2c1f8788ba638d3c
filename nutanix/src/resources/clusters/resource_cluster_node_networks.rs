//! Fetches how unconfigured nodes would be networked into a cluster
//!
//! Like discovery this is an action recorded in state: create and update ask
//! the cluster, destroy forgets the answer.

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, BlockBuilder, NestedBlock, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tracing::{debug, info};

use super::nodes::{fetch_nodes_networking_details, EXPAND_REQUEST_TYPE};
use super::resource_cluster_add_node::{certificate_map_block, expand_certificates};
use crate::api::clustermgmt::clusters::{
    NameMacRef, NameNetworkRef, NetworkInfo, NodeDetails, NodeListNetworkingDetails,
    NodeNetworkingDetails, UplinkInfo,
};
use crate::common::schema::{
    computed, expand_ip_address, flatten_ip_address, id_attribute, ip_address_block,
    optional_computed, one_of, Mode,
};
use crate::common::{many, not_configured, random_id, single, unknowns_to_null, Attrs, Obj};
use crate::enums::{expand_enum, HypervisorType};
use crate::provider_data::NutanixProviderData;

#[derive(Default)]
pub struct ClusterNodeNetworksResource {
    provider_data: Option<NutanixProviderData>,
}

impl ClusterNodeNetworksResource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch(
        &self,
        ctx: &Context,
        data: &NutanixProviderData,
        planned: DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let attrs = Attrs::of(&planned);
        let cluster_ext_id = attrs.str("ext_id").unwrap_or_default();
        let expand = attrs.str("expand");
        let body = expand_node_details(attrs);
        debug!(cluster = %cluster_ext_id, nodes = body.node_list.len(), "fetching node networking details");

        let details = fetch_nodes_networking_details(
            ctx,
            data,
            &cluster_ext_id,
            &body,
            expand.as_deref(),
        )
        .await?;
        info!(cluster = %cluster_ext_id, "fetched node networking details");

        let mut state = planned;
        let id = state
            .get_optional_string(&AttributePath::new("id"))
            .unwrap_or_else(random_id);
        Obj::new()
            .set("id", id)
            .set("request_type", body.request_type)
            .set(
                "nodes_networking_details",
                single(Some(&details), networking_details_obj),
            )
            .merge_into(&mut state);
        unknowns_to_null(&mut state.value);
        Ok(state)
    }
}

fn node_list_block() -> NestedBlock {
    let strings = [
        "node_uuid",
        "block_id",
        "node_position",
        "model",
        "hypervisor_version",
        "nos_version",
        "current_network_interface",
    ];
    let bools = ["is_compute_only", "is_light_compute", "is_robo_mixed_hypervisor"];

    let node = BlockBuilder::new()
        .block(ip_address_block("cvm_ip", Mode::Input))
        .block(ip_address_block("hypervisor_ip", Mode::Input))
        .block(ip_address_block("ipmi_ip", Mode::Input))
        .block(certificate_map_block())
        .attribute(
            AttributeBuilder::new("hypervisor_type", AttributeType::String)
                .optional()
                .computed()
                .validator(one_of::<HypervisorType>())
                .build(),
        );
    let node = strings.iter().fold(node, |b, name| {
        b.attribute(optional_computed(name, AttributeType::String))
    });
    let node = bools.iter().fold(node, |b, name| {
        b.attribute(optional_computed(name, AttributeType::Bool))
    });
    NestedBlock::list("node_list", node.build()).min_items(1)
}

fn name_network_block(name: &str) -> NestedBlock {
    NestedBlock::list(
        name,
        BlockBuilder::new()
            .attribute(computed("hypervisor_type", AttributeType::String))
            .attribute(computed("name", AttributeType::String))
            .attribute(computed("networks", AttributeType::list_of(AttributeType::String)))
            .build(),
    )
}

fn networking_details_block() -> NestedBlock {
    let uplinks = BlockBuilder::new()
        .block(ip_address_block("cvm_ip", Mode::Computed))
        .block(NestedBlock::list(
            "uplink_list",
            BlockBuilder::new()
                .attribute(computed("mac", AttributeType::String))
                .attribute(computed("name", AttributeType::String))
                .build(),
        ))
        .build();

    NestedBlock::list(
        "nodes_networking_details",
        BlockBuilder::new()
            .block(NestedBlock::list(
                "network_info",
                BlockBuilder::new()
                    .block(name_network_block("hci"))
                    .block(name_network_block("so"))
                    .build(),
            ))
            .block(NestedBlock::list("uplinks", uplinks))
            .attribute(computed("warnings", AttributeType::list_of(AttributeType::String)))
            .build(),
    )
}

fn expand_node(attrs: Attrs<'_>) -> NodeListNetworkingDetails {
    NodeListNetworkingDetails {
        block_id: attrs.str("block_id"),
        model: attrs.str("model"),
        is_compute_only: attrs.bool("is_compute_only"),
        is_light_compute: attrs.bool("is_light_compute"),
        is_robo_mixed_hypervisor: attrs.bool("is_robo_mixed_hypervisor"),
        digital_certificate_map_list: expand_certificates(attrs),
        current_network_interface: attrs.str("current_network_interface"),
        hypervisor_type: expand_enum(attrs.str("hypervisor_type").as_deref(), "hypervisor_type"),
        hypervisor_version: attrs.str("hypervisor_version"),
        ipmi_ip: expand_ip_address(attrs.block("ipmi_ip")),
        node_position: attrs.str("node_position"),
        node_uuid: attrs.str("node_uuid"),
        nos_version: attrs.str("nos_version"),
        cvm_ip: expand_ip_address(attrs.block("cvm_ip")),
        hypervisor_ip: expand_ip_address(attrs.block("hypervisor_ip")),
    }
}

/// Request body; `request_type` falls back to the expand-cluster request
pub(crate) fn expand_node_details(attrs: Attrs<'_>) -> NodeDetails {
    NodeDetails {
        node_list: attrs.blocks("node_list").into_iter().map(expand_node).collect(),
        request_type: attrs
            .str("request_type")
            .unwrap_or_else(|| EXPAND_REQUEST_TYPE.to_string()),
    }
}

fn name_network_obj(network: &NameNetworkRef) -> Obj {
    Obj::new()
        .set_enum("hypervisor_type", network.hypervisor_type.as_ref())
        .set("name", network.name.as_ref())
        .set_strings("networks", network.networks.as_ref())
}

fn network_info_obj(info: &NetworkInfo) -> Obj {
    Obj::new()
        .set("hci", many(info.hci.as_ref(), name_network_obj))
        .set("so", many(info.so.as_ref(), name_network_obj))
}

fn uplink_obj(uplink: &UplinkInfo) -> Obj {
    Obj::new()
        .set("cvm_ip", flatten_ip_address(uplink.cvm_ip.as_ref()))
        .set(
            "uplink_list",
            many(uplink.uplink_list.as_ref(), |u: &NameMacRef| {
                Obj::new().set("mac", u.mac.as_ref()).set("name", u.name.as_ref())
            }),
        )
}

pub(crate) fn networking_details_obj(details: &NodeNetworkingDetails) -> Obj {
    Obj::new()
        .set("network_info", single(details.network_info.as_ref(), network_info_obj))
        .set("uplinks", many(details.uplinks.as_ref(), uplink_obj))
        .set_strings("warnings", details.warnings.as_ref())
}

#[async_trait]
impl Resource for ClusterNodeNetworksResource {
    fn type_name(&self) -> &str {
        "nutanix_clusters_unconfigured_node_networks_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        SchemaBuilder::new()
            .version(0)
            .description("Fetches the networking details of unconfigured nodes")
            .attribute(id_attribute())
            .attribute(
                AttributeBuilder::new("ext_id", AttributeType::String)
                    .description("Cluster the nodes would join")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("expand", AttributeType::String)
                    .description("$expand passed to the cluster read")
                    .optional()
                    .build(),
            )
            .attribute(optional_computed("request_type", AttributeType::String))
            .block(node_list_block())
            .block(networking_details_block())
            .build()
            .into()
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let Some(data) = &self.provider_data else {
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![not_configured()],
            };
        };

        match self.fetch(&ctx, data, request.planned_state).await {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => CreateResourceResponse {
                new_state: DynamicValue::null(),
                diagnostics: vec![diag],
            },
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        ReadResourceResponse {
            new_state: Some(request.current_state),
            diagnostics: vec![],
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let Some(data) = &self.provider_data else {
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![not_configured()],
            };
        };

        match self.fetch(&ctx, data, request.planned_state).await {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![diag],
            },
        }
    }

    async fn delete(&self, _ctx: Context, _request: DeleteResourceRequest) -> DeleteResourceResponse {
        DeleteResourceResponse::default()
    }
}

#[async_trait]
impl ResourceWithConfigure for ClusterNodeNetworksResource {
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

#[path = "./resource_cluster_node_networks_test.rs"]
mod resource_cluster_node_networks_test;
