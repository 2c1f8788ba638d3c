//! Registers a remote cluster or Prism Central with a Prism Central
//!
//! Registration cannot be undone through the API: update and delete only
//! touch state.

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::plan_modifier::RequiresReplace;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{
    AttributeBuilder, AttributeType, Block, BlockBuilder, NestedBlock, SchemaBuilder,
};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tracing::{debug, info};

use crate::api::prism::domain_managers::{
    AosRemoteClusterSpec, BasicAuth, ClusterReference, ClusterRegistrationSpec, Credentials,
    DomainManager, DomainManagerClusterConfig, DomainManagerNetwork,
    DomainManagerRemoteClusterSpec, ExternalNetwork, RemoteClusterAddress, RemoteClusterSpec,
};
use crate::common::schema::{
    computed, expand_ip_or_fqdn, flatten_ip_address, flatten_ip_or_fqdn, flatten_ip_or_fqdn_list,
    flatten_links, id_attribute, ip_address_block, ip_or_fqdn_block, ip_or_fqdn_list_block,
    links_block, one_of, Mode,
};
use crate::common::{api_error, carry, many, not_configured, single, state_error, task_error, Attrs, Obj};
use crate::enums::{expand_enum, DomainManagerCloudType};
use crate::provider_data::NutanixProviderData;

const SPEC_BLOCKS: [&str; 3] = [
    "domain_manager_remote_cluster_spec",
    "aos_remote_cluster_spec",
    "cluster_reference",
];

#[derive(Default)]
pub struct PcRegistrationResource {
    provider_data: Option<NutanixProviderData>,
}

impl PcRegistrationResource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch(
        &self,
        data: &NutanixProviderData,
        pc_ext_id: &str,
    ) -> Result<DomainManager, Diagnostic> {
        data.client
            .prism()
            .domain_managers()
            .get(pc_ext_id)
            .await
            .map(|versioned| versioned.data)
            .map_err(|e| {
                api_error(
                    format!("error while fetching domain manager with id {}", pc_ext_id),
                    &e,
                )
            })
    }
}

fn missing_spec() -> Diagnostic {
    Diagnostic::error(
        format!("none of [{}] is provided", SPEC_BLOCKS.join(" ")),
        "exactly one remote cluster specification is required",
    )
    .with_attribute(AttributePath::new("remote_cluster"))
}

fn expand_remote_cluster_address(attrs: Option<Attrs<'_>>) -> Option<RemoteClusterAddress> {
    let attrs = attrs?;
    let authentication = attrs
        .block("credentials")
        .and_then(|c| c.block("authentication"))
        .map(|auth| BasicAuth {
            username: auth.str("username"),
            password: auth.str("password"),
        });
    Some(RemoteClusterAddress {
        address: expand_ip_or_fqdn(attrs.block("address")),
        credentials: authentication.map(|a| Credentials {
            authentication: Some(a),
        }),
    })
}

/// The one configured remote cluster spec, in the order the blocks are listed
pub(crate) fn expand_remote_cluster(config: &DynamicValue) -> Result<RemoteClusterSpec, Diagnostic> {
    let remote = Attrs::of(config).block("remote_cluster").ok_or_else(missing_spec)?;

    if let Some(spec) = remote.block("domain_manager_remote_cluster_spec") {
        return Ok(RemoteClusterSpec::DomainManager(DomainManagerRemoteClusterSpec {
            remote_cluster: expand_remote_cluster_address(spec.block("remote_cluster")),
            cloud_type: expand_enum::<DomainManagerCloudType>(
                spec.str("cloud_type").as_deref(),
                "cloud_type",
            ),
        }));
    }
    if let Some(spec) = remote.block("aos_remote_cluster_spec") {
        return Ok(RemoteClusterSpec::Aos(AosRemoteClusterSpec {
            remote_cluster: expand_remote_cluster_address(spec.block("remote_cluster")),
        }));
    }
    if let Some(spec) = remote.block("cluster_reference") {
        return Ok(RemoteClusterSpec::ClusterReference(ClusterReference {
            ext_id: spec.str("ext_id"),
        }));
    }
    Err(missing_spec())
}

fn config_obj(config: &DomainManagerClusterConfig) -> Obj {
    Obj::new()
        .set("should_enable_lockdown_mode", config.should_enable_lockdown_mode)
        .set(
            "build_info",
            single(config.build_info.as_ref(), |b| {
                Obj::new().set("version", b.version.clone())
            }),
        )
        .set("name", config.name.clone())
        .set_enum("size", config.size.as_ref())
        .set(
            "bootstrap_config",
            single(config.bootstrap_config.as_ref(), |b| {
                Obj::new().set(
                    "environment_info",
                    single(b.environment_info.as_ref(), |env| {
                        Obj::new()
                            .set_enum("type", env.environment_type.as_ref())
                            .set_enum("provider_type", env.provider_type.as_ref())
                            .set_enum("provisioning_type", env.provisioning_type.as_ref())
                    }),
                )
            }),
        )
        .set(
            "resource_config",
            single(config.resource_config.as_ref(), |r| {
                Obj::new()
                    .set("num_vcpus", r.num_vcpus)
                    .set("memory_size_bytes", r.memory_size_bytes)
                    .set("data_disk_size_bytes", r.data_disk_size_bytes)
                    .set_strings("container_ext_ids", r.container_ext_ids.as_ref())
            }),
        )
}

fn external_network_obj(network: &ExternalNetwork) -> Obj {
    Obj::new()
        .set("default_gateway", flatten_ip_or_fqdn(network.default_gateway.as_ref()))
        .set("subnet_mask", flatten_ip_or_fqdn(network.subnet_mask.as_ref()))
        .set(
            "ip_ranges",
            many(network.ip_ranges.as_ref(), |range| {
                Obj::new()
                    .set("begin", flatten_ip_address(range.begin.as_ref()))
                    .set("end", flatten_ip_address(range.end.as_ref()))
            }),
        )
        .set("network_ext_id", network.network_ext_id.clone())
}

fn network_obj(network: &DomainManagerNetwork) -> Obj {
    Obj::new()
        .set("external_address", flatten_ip_address(network.external_address.as_ref()))
        .set("name_servers", flatten_ip_or_fqdn_list(network.name_servers.as_ref()))
        .set("ntp_servers", flatten_ip_or_fqdn_list(network.ntp_servers.as_ref()))
        .set("fqdn", network.fqdn.clone())
        .set(
            "external_networks",
            many(network.external_networks.as_ref(), external_network_obj),
        )
}

/// Computed attributes of a Prism Central
pub(crate) fn domain_manager_obj(pc: &DomainManager) -> Obj {
    Obj::new()
        .set("ext_id", pc.ext_id.clone())
        .set("tenant_id", pc.tenant_id.clone())
        .set("links", flatten_links(pc.links.as_ref()))
        .set("config", single(pc.config.as_ref(), config_obj))
        .set(
            "is_registered_with_hosting_cluster",
            pc.is_registered_with_hosting_cluster,
        )
        .set("network", single(pc.network.as_ref(), network_obj))
        .set("hosting_cluster_ext_id", pc.hosting_cluster_ext_id.clone())
        .set(
            "should_enable_high_availability",
            pc.should_enable_high_availability,
        )
        .set_strings("node_ext_ids", pc.node_ext_ids.as_ref())
}

fn remote_cluster_address_block() -> NestedBlock {
    let authentication = BlockBuilder::new()
        .attribute(
            AttributeBuilder::new("username", AttributeType::String)
                .required()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("password", AttributeType::String)
                .required()
                .sensitive()
                .build(),
        )
        .build();
    let credentials = BlockBuilder::new()
        .block(
            NestedBlock::list("authentication", authentication)
                .min_items(1)
                .max_items(1),
        )
        .build();

    NestedBlock::list(
        "remote_cluster",
        BlockBuilder::new()
            .block(ip_or_fqdn_block("address", Mode::Input).min_items(1))
            .block(
                NestedBlock::list("credentials", credentials)
                    .min_items(1)
                    .max_items(1),
            )
            .build(),
    )
    .min_items(1)
    .max_items(1)
}

fn remote_cluster_block() -> NestedBlock {
    let domain_manager = BlockBuilder::new()
        .block(remote_cluster_address_block())
        .attribute(
            AttributeBuilder::new("cloud_type", AttributeType::String)
                .required()
                .validator(one_of::<DomainManagerCloudType>())
                .build(),
        )
        .build();
    let aos = BlockBuilder::new()
        .block(remote_cluster_address_block())
        .build();
    let reference = BlockBuilder::new()
        .attribute(
            AttributeBuilder::new("ext_id", AttributeType::String)
                .required()
                .build(),
        )
        .build();

    NestedBlock::list(
        "remote_cluster",
        BlockBuilder::new()
            .block(NestedBlock::list(SPEC_BLOCKS[0], domain_manager).max_items(1))
            .block(NestedBlock::list(SPEC_BLOCKS[1], aos).max_items(1))
            .block(NestedBlock::list(SPEC_BLOCKS[2], reference).max_items(1))
            .build(),
    )
    .min_items(1)
    .max_items(1)
}

fn config_block() -> Block {
    BlockBuilder::new()
        .attribute(computed("should_enable_lockdown_mode", AttributeType::Bool))
        .block(NestedBlock::list(
            "build_info",
            BlockBuilder::new()
                .attribute(computed("version", AttributeType::String))
                .build(),
        ))
        .attribute(computed("name", AttributeType::String))
        .attribute(computed("size", AttributeType::String))
        .block(NestedBlock::list(
            "bootstrap_config",
            BlockBuilder::new()
                .block(NestedBlock::list(
                    "environment_info",
                    BlockBuilder::new()
                        .attribute(computed("type", AttributeType::String))
                        .attribute(computed("provider_type", AttributeType::String))
                        .attribute(computed("provisioning_type", AttributeType::String))
                        .build(),
                ))
                .build(),
        ))
        .block(NestedBlock::list(
            "resource_config",
            BlockBuilder::new()
                .attribute(computed("num_vcpus", AttributeType::Number))
                .attribute(computed("memory_size_bytes", AttributeType::Number))
                .attribute(computed("data_disk_size_bytes", AttributeType::Number))
                .attribute(computed(
                    "container_ext_ids",
                    AttributeType::list_of(AttributeType::String),
                ))
                .build(),
        ))
        .build()
}

fn network_block() -> Block {
    let ip_range = BlockBuilder::new()
        .block(ip_address_block("begin", Mode::Computed))
        .block(ip_address_block("end", Mode::Computed))
        .build();
    BlockBuilder::new()
        .block(ip_address_block("external_address", Mode::Computed))
        .block(ip_or_fqdn_list_block("name_servers", Mode::Computed))
        .block(ip_or_fqdn_list_block("ntp_servers", Mode::Computed))
        .attribute(computed("fqdn", AttributeType::String))
        .block(NestedBlock::list(
            "external_networks",
            BlockBuilder::new()
                .block(ip_or_fqdn_block("default_gateway", Mode::Computed))
                .block(ip_or_fqdn_block("subnet_mask", Mode::Computed))
                .block(NestedBlock::list("ip_ranges", ip_range))
                .attribute(computed("network_ext_id", AttributeType::String))
                .build(),
        ))
        .build()
}

#[async_trait]
impl Resource for PcRegistrationResource {
    fn type_name(&self) -> &str {
        "nutanix_pc_registration_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Registers a remote cluster with a Prism Central")
            .attribute(id_attribute())
            .attribute(
                AttributeBuilder::new("pc_ext_id", AttributeType::String)
                    .description("Prism Central the remote cluster is registered with")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .block(remote_cluster_block())
            .attribute(computed("ext_id", AttributeType::String))
            .attribute(computed("tenant_id", AttributeType::String))
            .block(links_block())
            .block(NestedBlock::list("config", config_block()))
            .attribute(computed(
                "is_registered_with_hosting_cluster",
                AttributeType::Bool,
            ))
            .block(NestedBlock::list("network", network_block()))
            .attribute(computed("hosting_cluster_ext_id", AttributeType::String))
            .attribute(computed(
                "should_enable_high_availability",
                AttributeType::Bool,
            ))
            .attribute(computed(
                "node_ext_ids",
                AttributeType::list_of(AttributeType::String),
            ))
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        if let Some(remote) = Attrs::of(&request.config).block("remote_cluster") {
            let given: Vec<&str> = SPEC_BLOCKS
                .iter()
                .copied()
                .filter(|name| remote.block(name).is_some())
                .collect();
            match given.len() {
                0 => diagnostics.push(missing_spec()),
                1 => {}
                _ => diagnostics.push(
                    Diagnostic::error(
                        "Conflicting remote cluster specifications",
                        format!("only one of {} may be provided", given.join(", ")),
                    )
                    .with_attribute(AttributePath::new("remote_cluster")),
                ),
            }
        }

        ValidateResourceConfigResponse { diagnostics }
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

        let pc_ext_id = Attrs::of(&request.planned_state)
            .str("pc_ext_id")
            .unwrap_or_default();
        let api = data.client.prism().domain_managers();

        let current = match api.get(&pc_ext_id).await {
            Ok(versioned) => versioned,
            Err(e) => {
                diagnostics.push(api_error(
                    format!("error while fetching domain manager with id {}", pc_ext_id),
                    &e,
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let remote_cluster = match expand_remote_cluster(&request.planned_state) {
            Ok(spec) => spec,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };
        debug!(pc = %pc_ext_id, kind = remote_cluster.object_type(), "registering remote cluster");

        let task = match api
            .register(
                &pc_ext_id,
                &ClusterRegistrationSpec { remote_cluster },
                &current.etag,
            )
            .await
        {
            Ok(task) => task,
            Err(e) => {
                diagnostics.push(api_error(
                    format!("error while registering remote cluster with id {}", pc_ext_id),
                    &e,
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        if let Err(e) = data.waiter.wait(&ctx, &task, data.timeout()).await {
            diagnostics.push(task_error(
                "PC registration to complete",
                task.ext_id.as_deref(),
                &e,
            ));
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        }
        info!(pc = %pc_ext_id, "remote cluster registered");

        let mut new_state = request.planned_state.clone();
        if let Err(e) = new_state.set_string(&AttributePath::new("id"), pc_ext_id.clone()) {
            diagnostics.push(state_error(e));
            return CreateResourceResponse {
                new_state,
                diagnostics,
            };
        }
        match self.fetch(data, &pc_ext_id).await {
            Ok(pc) => domain_manager_obj(&pc).merge_into(&mut new_state),
            Err(diag) => diagnostics.push(diag),
        }

        CreateResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
            };
        };

        let pc_ext_id = Attrs::of(&request.current_state)
            .str("pc_ext_id")
            .unwrap_or_default();
        match self.fetch(data, &pc_ext_id).await {
            Ok(pc) => {
                let mut new_state = request.current_state;
                domain_manager_obj(&pc).merge_into(&mut new_state);
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics,
                }
            }
            Err(diag) => {
                diagnostics.push(diag);
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut new_state = request.prior_state;
        carry(&request.planned_state, &mut new_state, &["remote_cluster"]);
        UpdateResourceResponse {
            new_state,
            diagnostics: vec![],
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        debug!(
            pc = ?request.prior_state.get_optional_string(&AttributePath::new("pc_ext_id")),
            "registrations cannot be removed through the API, forgetting it"
        );
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for PcRegistrationResource {
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

#[path = "./resource_pc_registration_test.rs"]
mod resource_pc_registration_test;
