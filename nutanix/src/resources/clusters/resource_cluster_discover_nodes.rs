//! Discovers nodes that are not part of any cluster yet
//!
//! Discovery is a one-shot action: create runs it and records what the
//! cluster found, an update runs it again with the new filters, and destroy
//! only forgets the result.

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{
    Attribute, AttributeBuilder, AttributeType, BlockBuilder, NestedBlock, SchemaBuilder,
};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tracing::{debug, info};

use super::nodes::discover_unconfigured_nodes;
use crate::api::clustermgmt::clusters::{
    NodeDiscoveryParams, UnconfiguredNodeAttributes, UnconfiguredNodeListItem,
};
use crate::common::schema::{
    computed, expand_ip_address, flatten_ip_address, id_attribute, ip_address_block,
    ip_address_fields, one_of, Mode,
};
use crate::common::{many, not_configured, single, Attrs, Obj};
use crate::enums::{expand_enum, AddressType};
use crate::provider_data::NutanixProviderData;

#[derive(Default)]
pub struct ClusterDiscoverNodesResource {
    provider_data: Option<NutanixProviderData>,
}

impl ClusterDiscoverNodesResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs discovery for `planned` and returns the state to record. `id`
    /// is only filled in when `planned` has none yet.
    async fn discover(
        &self,
        ctx: &Context,
        data: &NutanixProviderData,
        planned: DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let attrs = Attrs::of(&planned);
        let cluster_ext_id = attrs.str("ext_id").unwrap_or_default();
        let params = expand_discovery_params(attrs);
        debug!(cluster = %cluster_ext_id, ?params, "discovering unconfigured nodes");

        let (task_ext_id, nodes) =
            discover_unconfigured_nodes(ctx, data, &cluster_ext_id, &params).await?;
        info!(cluster = %cluster_ext_id, count = nodes.len(), "discovered unconfigured nodes");

        let mut state = planned;
        let id = state
            .get_optional_string(&AttributePath::new("id"))
            .unwrap_or(task_ext_id);
        Obj::new()
            .set("id", id)
            .set("unconfigured_nodes", many(Some(&nodes), unconfigured_node_obj))
            .merge_into(&mut state);
        Ok(state)
    }
}

fn optional(name: &str, kind: AttributeType) -> Attribute {
    AttributeBuilder::new(name, kind).optional().build()
}

fn node_attributes_block() -> NestedBlock {
    NestedBlock::list(
        "attributes",
        BlockBuilder::new()
            .attribute(computed("default_workload", AttributeType::String))
            .attribute(computed("is_model_supported", AttributeType::Bool))
            .attribute(computed("is_robo_mixed_hypervisor", AttributeType::Bool))
            .attribute(computed("lcm_family", AttributeType::String))
            .attribute(computed("should_work_with_1g_nic", AttributeType::Bool))
            .build(),
    )
}

fn unconfigured_nodes_block() -> NestedBlock {
    let strings = [
        "arch",
        "cluster_id",
        "current_cvm_vlan_tag",
        "current_network_interface",
        "foundation_version",
        "host_type",
        "hypervisor_type",
        "hypervisor_version",
        "interface_ipv6",
        "node_position",
        "node_uuid",
        "nos_version",
        "rackable_unit_model",
        "rackable_unit_serial",
    ];
    let node = BlockBuilder::new()
        .block(node_attributes_block())
        .attribute(computed("cpu_type", AttributeType::list_of(AttributeType::String)))
        .block(ip_address_block("cvm_ip", Mode::Computed))
        .block(ip_address_block("hypervisor_ip", Mode::Computed))
        .block(ip_address_block("ipmi_ip", Mode::Computed))
        .attribute(computed("is_secure_booted", AttributeType::Bool))
        .attribute(computed("rackable_unit_max_nodes", AttributeType::Number));
    let node = strings.iter().fold(node, |b, name| {
        b.attribute(computed(name, AttributeType::String))
    });
    NestedBlock::list("unconfigured_nodes", node.build())
}

pub(crate) fn expand_discovery_params(attrs: Attrs<'_>) -> NodeDiscoveryParams {
    NodeDiscoveryParams {
        address_type: expand_enum(attrs.str("address_type").as_deref(), "address_type"),
        ip_filter_list: attrs
            .blocks("ip_filter_list")
            .into_iter()
            .filter_map(|ip| expand_ip_address(Some(ip)))
            .collect(),
        uuid_filter_list: attrs.strings("uuid_filter_list"),
        timeout: attrs.i64("timeout"),
        interface_filter_list: attrs.strings("interface_filter_list"),
        is_manual_discovery: attrs.bool("is_manual_discovery"),
    }
}

fn node_attributes_obj(attributes: &UnconfiguredNodeAttributes) -> Obj {
    Obj::new()
        .set("default_workload", attributes.default_workload.as_ref())
        .set("is_model_supported", attributes.is_model_supported)
        .set("is_robo_mixed_hypervisor", attributes.is_robo_mixed_hypervisor)
        .set("lcm_family", attributes.lcm_family.as_ref())
        .set("should_work_with_1g_nic", attributes.should_work_with_1g_nic)
}

pub(crate) fn unconfigured_node_obj(node: &UnconfiguredNodeListItem) -> Obj {
    Obj::new()
        .set("arch", node.arch.as_ref())
        .set("attributes", single(node.attributes.as_ref(), node_attributes_obj))
        .set("cluster_id", node.cluster_id.as_ref())
        .set_strings("cpu_type", node.cpu_type.as_ref())
        .set("current_cvm_vlan_tag", node.current_cvm_vlan_tag.as_ref())
        .set("current_network_interface", node.current_network_interface.as_ref())
        .set("cvm_ip", flatten_ip_address(node.cvm_ip.as_ref()))
        .set("foundation_version", node.foundation_version.as_ref())
        .set_enum("host_type", node.host_type.as_ref())
        .set("hypervisor_ip", flatten_ip_address(node.hypervisor_ip.as_ref()))
        .set_enum("hypervisor_type", node.hypervisor_type.as_ref())
        .set("hypervisor_version", node.hypervisor_version.as_ref())
        .set("interface_ipv6", node.interface_ipv6.as_ref())
        .set("ipmi_ip", flatten_ip_address(node.ipmi_ip.as_ref()))
        .set("is_secure_booted", node.is_secure_booted)
        .set("node_position", node.node_position.as_ref())
        .set("node_uuid", node.node_uuid.as_ref())
        .set("nos_version", node.nos_version.as_ref())
        .set("rackable_unit_max_nodes", node.rackable_unit_max_nodes)
        .set("rackable_unit_model", node.rackable_unit_model.as_ref())
        .set("rackable_unit_serial", node.rackable_unit_serial.as_ref())
}

#[async_trait]
impl Resource for ClusterDiscoverNodesResource {
    fn type_name(&self) -> &str {
        "nutanix_clusters_discover_unconfigured_nodes_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        SchemaBuilder::new()
            .version(0)
            .description("Discovers unconfigured nodes reachable from a cluster")
            .attribute(id_attribute())
            .attribute(
                AttributeBuilder::new("ext_id", AttributeType::String)
                    .description("Cluster that runs the discovery")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("address_type", AttributeType::String)
                    .optional()
                    .validator(one_of::<AddressType>())
                    .build(),
            )
            .block(NestedBlock::list("ip_filter_list", ip_address_fields(Mode::Input)))
            .attribute(optional(
                "uuid_filter_list",
                AttributeType::list_of(AttributeType::String),
            ))
            .attribute(optional("timeout", AttributeType::Number))
            .attribute(optional(
                "interface_filter_list",
                AttributeType::list_of(AttributeType::String),
            ))
            .attribute(optional("is_manual_discovery", AttributeType::Bool))
            .block(unconfigured_nodes_block())
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

        match self.discover(&ctx, data, request.planned_state.clone()).await {
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

        match self.discover(&ctx, data, request.planned_state).await {
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
impl ResourceWithConfigure for ClusterDiscoverNodesResource {
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

#[path = "./resource_cluster_discover_nodes_test.rs"]
mod resource_cluster_discover_nodes_test;
