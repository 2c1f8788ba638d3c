//! Cluster resource implementation
//!
//! Creating a cluster does not register it with Prism Central, so the
//! resource starts out with a random id. `ext_id` is looked up by name once
//! the cluster shows up in the cluster list, and from then on both `id` and
//! `ext_id` hold it.

use std::time::Duration;

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::import_state_passthrough_id;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, BlockBuilder, NestedBlock, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tracing::{debug, info, warn};

use super::cluster_schema::{
    cluster_fields, cluster_obj, expand_config, expand_network, node_list_item_obj,
};
use super::nodes::{
    add_node, diff_nodes, remove_node, remove_node_params_block, same_node, NodeFlags,
    PlannedNode, RemovalFlags,
};
use super::resource_cluster_categories::sync_categories;
use crate::api::clustermgmt::clusters::{Cluster, NodeListItemReference, NodeReference};
use crate::api::common::{odata_string, ListParams};
use crate::common::schema::{
    computed, expand_ip_address, id_attribute, ip_address_block, optional_computed, Mode,
};
use crate::common::{
    api_error, carry, has_change, not_configured, random_id, single, task_error, unknowns_to_null,
};
use crate::common::{Attrs, Obj};
use crate::provider_data::NutanixProviderData;
use crate::resources::profiles::resource_cluster_profile_association::{
    apply_profile, disassociate_profile,
};

/// Pause after node changes or a field update before reading back
const SETTLE_DELAY: Duration = Duration::from_secs(60);

const NOT_FOUND_SUMMARY: &str = "Cluster not found. Please register the cluster to Prism Central if not. If deleted, then reset the state.";

const INPUT_ONLY: &[&str] = &["dryrun", "expand"];

const NODE_BOOL_FLAGS: &[&str] = &[
    "should_skip_host_networking",
    "should_skip_add_node",
    "should_skip_pre_expand_checks",
    "should_skip_discovery",
    "should_skip_imaging",
    "should_validate_rack_awareness",
    "is_nos_compatible",
    "is_compute_only",
    "is_never_scheduleable",
    "is_light_compute",
];

pub struct ClusterResource {
    provider_data: Option<NutanixProviderData>,
    settle_delay: Duration,
}

impl Default for ClusterResource {
    fn default() -> Self {
        Self {
            provider_data: None,
            settle_delay: SETTLE_DELAY,
        }
    }
}

impl ClusterResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// GET the cluster and flatten it on top of `input`. `Ok(None)` when the
    /// cluster no longer exists.
    async fn fetch(
        &self,
        data: &NutanixProviderData,
        ext_id: &str,
        input: &DynamicValue,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let expand = input.get_optional_string(&AttributePath::new("expand"));
        let cluster = match data
            .client
            .clustermgmt()
            .clusters()
            .get(ext_id, expand.as_deref())
            .await
        {
            Ok(versioned) => versioned.data,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(api_error("error while fetching cluster", &e)),
        };
        Ok(Some(cluster_state(&cluster, ext_id, input)))
    }

    /// Adds planned nodes missing from the cluster and removes the ones no
    /// longer planned
    async fn update_nodes(
        &self,
        ctx: &Context,
        data: &NutanixProviderData,
        ext_id: &str,
        planned: &DynamicValue,
    ) -> Result<(), Diagnostic> {
        let expand = planned.get_optional_string(&AttributePath::new("expand"));
        let current = data
            .client
            .clustermgmt()
            .clusters()
            .get(ext_id, expand.as_deref())
            .await
            .map_err(|e| api_error("error fetching cluster for node diff", &e))?;
        let existing = current
            .data
            .nodes
            .and_then(|n| n.node_list)
            .unwrap_or_default();

        let attrs = Attrs::of(planned);
        let diff = diff_nodes(&existing, planned_nodes(attrs));
        debug!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            changed = diff.changed.len(),
            "node changes"
        );

        for node in &diff.added {
            add_node(ctx, data, ext_id, node).await?;
        }

        let removal = RemovalFlags::from_block(
            attrs
                .block("nodes")
                .and_then(|n| n.block("remove_node_params")),
        );
        for node in diff.removed {
            let uuid = node.node_uuid.unwrap_or_default();
            remove_node(ctx, data, ext_id, &removal.params(vec![uuid])).await?;
        }

        for (old, new) in &diff.changed {
            info!(old = ?old, new = ?new, "node changed in place, nothing to apply");
        }
        Ok(())
    }

    /// Moves the cluster to the configured profile. An explicitly empty
    /// `cluster_profile_ext_id` clears the association; leaving it out of the
    /// configuration keeps whatever the cluster has.
    async fn update_profile(
        &self,
        ctx: &Context,
        data: &NutanixProviderData,
        ext_id: &str,
        prior: &DynamicValue,
        config: &DynamicValue,
    ) -> Result<(), Diagnostic> {
        let Some(new) = Attrs::of(config).raw_str("cluster_profile_ext_id") else {
            return Ok(());
        };
        let old = Attrs::of(prior)
            .str("cluster_profile_ext_id")
            .unwrap_or_default();
        if old == new {
            return Ok(());
        }

        let clusters = [ext_id.to_string()];
        if !old.is_empty() {
            disassociate_profile(ctx, data, &old, &clusters).await?;
        }
        if !new.is_empty() {
            apply_profile(ctx, data, &new, &clusters, false).await?;
        }
        Ok(())
    }

    /// PUTs the changed plain fields. `Ok(false)` when nothing changed.
    async fn update_fields(
        &self,
        ctx: &Context,
        data: &NutanixProviderData,
        ext_id: &str,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<bool, Diagnostic> {
        let Some(body) = field_update(prior, planned) else {
            debug!(ext_id = %ext_id, "no cluster field changes");
            return Ok(false);
        };

        let api = data.client.clustermgmt().clusters();
        let expand = planned.get_optional_string(&AttributePath::new("expand"));
        let current = api
            .get(ext_id, expand.as_deref())
            .await
            .map_err(|e| api_error("error fetching cluster", &e))?;
        let task = api
            .update(ext_id, &body, &current.etag)
            .await
            .map_err(|e| api_error("error updating cluster", &e))?;
        data.waiter
            .wait(ctx, &task, data.timeout())
            .await
            .map_err(|e| task_error("cluster update task", task.ext_id.as_deref(), &e))?;
        info!(ext_id = %ext_id, "updated cluster");
        Ok(true)
    }
}

fn state_ext_id(state: &DynamicValue) -> Option<String> {
    state
        .get_optional_string(&AttributePath::new("ext_id"))
        .filter(|id| !id.is_empty())
}

fn cluster_not_found(name: &str) -> Diagnostic {
    Diagnostic::warning(NOT_FOUND_SUMMARY, format!("Cluster {} not found", name))
}

/// The ext_id of the cluster named `name`, if Prism Central knows it
async fn lookup_ext_id(
    data: &NutanixProviderData,
    name: &str,
) -> Result<Option<String>, Diagnostic> {
    let params = ListParams::new().with_filter(format!("name eq {}", odata_string(name)));
    let page = data
        .client
        .clustermgmt()
        .clusters()
        .list(&params)
        .await
        .map_err(|e| api_error("error while fetching clusters", &e))?;
    Ok(page.clusters.into_iter().find_map(|c| c.ext_id))
}

fn expand_node_item(attrs: Attrs<'_>) -> NodeListItemReference {
    NodeListItemReference {
        controller_vm_ip: expand_ip_address(attrs.block("controller_vm_ip")),
        node_uuid: attrs.str("node_uuid"),
        host_ip: expand_ip_address(attrs.block("host_ip")),
    }
}

fn planned_nodes(attrs: Attrs<'_>) -> Vec<PlannedNode> {
    attrs
        .block("nodes")
        .map(|n| n.blocks("node_list"))
        .unwrap_or_default()
        .into_iter()
        .map(|n| PlannedNode {
            node: expand_node_item(n),
            flags: NodeFlags::from_attrs(n),
        })
        .collect()
}

/// Cluster body from a plan. With `prior`, `config` carries only what moved.
pub(crate) fn expand_cluster_body(attrs: Attrs<'_>, prior: Option<Attrs<'_>>) -> Cluster {
    let node_list: Vec<_> = planned_nodes(attrs).into_iter().map(|p| p.node).collect();
    Cluster {
        name: attrs.str("name"),
        nodes: (!node_list.is_empty()).then(|| NodeReference {
            number_of_nodes: None,
            node_list: Some(node_list),
        }),
        network: expand_network(attrs.block("network")),
        config: expand_config(
            attrs.block("config"),
            prior.and_then(|p| p.block("config")),
        ),
        container_name: attrs.str("container_name"),
        categories: attrs.string_list("categories"),
        ..Default::default()
    }
}

/// Body of the field PUT, `None` when no plain field changed
fn field_update(prior: &DynamicValue, planned: &DynamicValue) -> Option<Cluster> {
    let desired = expand_cluster_body(Attrs::of(planned), Some(Attrs::of(prior)));
    let mut body = Cluster::default();
    let mut changed = false;

    macro_rules! overlay {
        ($($field:ident),+ $(,)?) => {
            $(if has_change(prior, planned, stringify!($field)) {
                body.$field = desired.$field;
                changed = true;
            })+
        };
    }

    overlay!(name, network, config, container_name);
    changed.then_some(body)
}

/// `nodes` as reported, with the add/remove switches of the matching
/// configured node carried over
fn nodes_state(nodes: Option<&NodeReference>, input: Attrs<'_>) -> Dynamic {
    let input_nodes = input.block("nodes");
    let configured: Vec<(NodeListItemReference, Attrs<'_>)> = input_nodes
        .map(|n| n.blocks("node_list"))
        .unwrap_or_default()
        .into_iter()
        .map(|a| (expand_node_item(a), a))
        .collect();
    let remove_params = input_nodes
        .and_then(|n| n.get("remove_node_params"))
        .cloned()
        .unwrap_or(Dynamic::List(vec![]));

    single(nodes, |n| {
        let list: Vec<Dynamic> = n
            .node_list
            .iter()
            .flatten()
            .map(|node| {
                let matched = configured
                    .iter()
                    .find(|(c, _)| same_node(node, c))
                    .map(|(_, a)| *a);
                let mut obj = node_list_item_obj(node);
                for flag in NODE_BOOL_FLAGS.iter().chain(&["hypervisor_hostname"]) {
                    obj = obj.set(flag, matched.and_then(|a| a.get(flag)).cloned());
                }
                obj.build()
            })
            .collect();
        Obj::new()
            .set("number_of_nodes", n.number_of_nodes)
            .set("node_list", list)
            .set("remove_node_params", remove_params)
    })
}

fn cluster_state(cluster: &Cluster, ext_id: &str, input: &DynamicValue) -> DynamicValue {
    let attrs = Attrs::of(input);
    let ext_id = cluster.ext_id.as_deref().unwrap_or(ext_id);
    let mut state = cluster_obj(cluster, Some(attrs))
        .set("id", ext_id)
        .set("ext_id", ext_id)
        .set("nodes", nodes_state(cluster.nodes.as_ref(), attrs))
        .into_state();
    carry(input, &mut state, INPUT_ONLY);
    state
}

fn nodes_block() -> NestedBlock {
    let mut node = BlockBuilder::new()
        .block(ip_address_block("controller_vm_ip", Mode::Input).min_items(1))
        .attribute(optional_computed("node_uuid", AttributeType::String))
        .block(ip_address_block("host_ip", Mode::Input));
    for flag in NODE_BOOL_FLAGS {
        node = node.attribute(
            AttributeBuilder::new(flag, AttributeType::Bool)
                .optional()
                .build(),
        );
    }
    let node = node.attribute(
        AttributeBuilder::new("hypervisor_hostname", AttributeType::String)
            .optional()
            .build(),
    );

    NestedBlock::list(
        "nodes",
        BlockBuilder::new()
            .attribute(computed("number_of_nodes", AttributeType::Number))
            .block(NestedBlock::list("node_list", node.build()))
            .block(remove_node_params_block())
            .build(),
    )
    .max_items(1)
}

#[async_trait]
impl Resource for ClusterResource {
    fn type_name(&self) -> &str {
        "nutanix_cluster_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let builder = SchemaBuilder::new()
            .version(0)
            .description("Creates a Nutanix cluster and manages its nodes, network and configuration")
            .attribute(id_attribute())
            .attribute(
                AttributeBuilder::new("ext_id", AttributeType::String)
                    .description("Identifier of the cluster once registered with Prism Central")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("dryrun", AttributeType::Bool)
                    .description("Only validate the request on create and delete")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("expand", AttributeType::String)
                    .description("Related entities to expand when reading the cluster")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Name of the cluster")
                    .required()
                    .build(),
            )
            .block(nodes_block());

        ResourceSchemaResponse {
            schema: cluster_fields(builder, Mode::Input).build(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        if let Some(rf) = request
            .config
            .get_optional_number(&AttributePath::new("config").index(0).attribute("redundancy_factor"))
        {
            if rf < 1.0 {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid redundancy factor",
                        format!("redundancy_factor must be at least 1, got {}", rf),
                    )
                    .with_attribute(
                        AttributePath::new("config")
                            .index(0)
                            .attribute("redundancy_factor"),
                    ),
                );
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

        let attrs = Attrs::of(&request.planned_state);
        let dryrun = attrs.bool("dryrun").unwrap_or(false);
        let body = expand_cluster_body(attrs, None);
        debug!(name = ?body.name, dryrun, "creating cluster");

        let task = match data.client.clustermgmt().clusters().create(&body, dryrun).await {
            Ok(task) => task,
            Err(e) => {
                diagnostics.push(api_error("error while creating clusters", &e));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        if let Err(e) = data.waiter.wait(&ctx, &task, data.timeout()).await {
            diagnostics.push(task_error("cluster to create", task.ext_id.as_deref(), &e));
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        }
        info!(name = ?body.name, "created cluster");

        let mut state = request.planned_state.clone();
        state.value = match state.value {
            Dynamic::Map(mut map) => {
                map.insert("id".to_string(), Dynamic::String(random_id()));
                Dynamic::Map(map)
            }
            other => other,
        };

        // A freshly created cluster is usually not registered yet
        let name = attrs.str("name").unwrap_or_default();
        match lookup_ext_id(data, &name).await {
            Ok(Some(ext_id)) => match self.fetch(data, &ext_id, &request.planned_state).await {
                Ok(Some(found)) => state = found,
                Ok(None) => debug!(ext_id = %ext_id, "cluster vanished right after lookup"),
                Err(diag) => warn!(error = %diag.detail, "could not read the new cluster"),
            },
            Ok(None) => debug!(name = %name, "cluster not registered with Prism Central yet"),
            Err(diag) => warn!(error = %diag.detail, "could not look up the new cluster"),
        }
        unknowns_to_null(&mut state.value);

        CreateResourceResponse {
            new_state: state,
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

        let ext_id = match state_ext_id(&request.current_state) {
            Some(ext_id) => ext_id,
            None => {
                let name = Attrs::of(&request.current_state)
                    .str("name")
                    .unwrap_or_default();
                match lookup_ext_id(data, &name).await {
                    Ok(Some(ext_id)) => ext_id,
                    Ok(None) => {
                        debug!(name = %name, "cluster not found by name");
                        diagnostics.push(cluster_not_found(&name));
                        return ReadResourceResponse {
                            new_state: Some(request.current_state),
                            diagnostics,
                        };
                    }
                    Err(diag) => {
                        diagnostics.push(diag);
                        return ReadResourceResponse {
                            new_state: Some(request.current_state),
                            diagnostics,
                        };
                    }
                }
            }
        };

        match self.fetch(data, &ext_id, &request.current_state).await {
            Ok(Some(state)) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics,
            },
            Ok(None) => {
                debug!(ext_id = %ext_id, "cluster is gone, dropping it from state");
                ReadResourceResponse::removed(diagnostics)
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

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = vec![];
        let prior = &request.prior_state;
        let planned = &request.planned_state;

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        };

        let ext_id = match state_ext_id(prior) {
            Some(ext_id) => ext_id,
            None => {
                // the cluster is registered under the name it had before
                let name = Attrs::of(prior).str("name").unwrap_or_default();
                match lookup_ext_id(data, &name).await {
                    Ok(Some(ext_id)) => ext_id,
                    Ok(None) => {
                        diagnostics.push(Diagnostic::error(
                            "error while fetching cluster",
                            format!(
                                "Cluster {} not found: Please register the cluster to Prism Central if not.",
                                name
                            ),
                        ));
                        return UpdateResourceResponse {
                            new_state: request.prior_state,
                            diagnostics,
                        };
                    }
                    Err(diag) => {
                        diagnostics.push(diag);
                        return UpdateResourceResponse {
                            new_state: request.prior_state,
                            diagnostics,
                        };
                    }
                }
            }
        };
        debug!(ext_id = %ext_id, "updating cluster");

        let mut settle = false;
        if has_change(prior, planned, "nodes") {
            if let Err(diag) = self.update_nodes(&ctx, data, &ext_id, planned).await {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
            settle = true;
        }

        if has_change(prior, planned, "categories") {
            let old = Attrs::of(prior).strings("categories");
            let new = Attrs::of(planned).strings("categories");
            if let Err(diag) = sync_categories(&ctx, data, &ext_id, &old, &new).await {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        }

        if let Err(diag) = self
            .update_profile(&ctx, data, &ext_id, prior, &request.config)
            .await
        {
            diagnostics.push(diag);
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        }

        match self.update_fields(&ctx, data, &ext_id, prior, planned).await {
            Ok(updated) => settle |= updated,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        }

        if settle && !self.settle_delay.is_zero() {
            debug!(delay = ?self.settle_delay, "waiting for the cluster to settle");
            tokio::time::sleep(self.settle_delay).await;
        }

        match self.fetch(data, &ext_id, planned).await {
            Ok(Some(state)) => UpdateResourceResponse {
                new_state: state,
                diagnostics,
            },
            Ok(None) => {
                diagnostics.push(Diagnostic::error(
                    "Cluster not found",
                    format!("cluster {} vanished during update", ext_id),
                ));
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                }
            }
            Err(diag) => {
                diagnostics.push(diag);
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                }
            }
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let attrs = Attrs::of(&request.prior_state);
        let ext_id = match state_ext_id(&request.prior_state) {
            Some(ext_id) => ext_id,
            None => {
                let name = attrs.str("name").unwrap_or_default();
                match lookup_ext_id(data, &name).await {
                    Ok(Some(ext_id)) => ext_id,
                    Ok(None) => {
                        diagnostics.push(cluster_not_found(&name));
                        return DeleteResourceResponse { diagnostics };
                    }
                    Err(diag) => {
                        diagnostics.push(diag);
                        return DeleteResourceResponse { diagnostics };
                    }
                }
            }
        };

        let api = data.client.clustermgmt().clusters();
        let expand = attrs.str("expand");
        let current = match api.get(&ext_id, expand.as_deref()).await {
            Ok(current) => current,
            Err(e) => {
                diagnostics.push(api_error("error while reading cluster", &e));
                return DeleteResourceResponse { diagnostics };
            }
        };

        let dryrun = attrs.bool("dryrun").unwrap_or(false);
        let task = match api.delete(&ext_id, &current.etag, dryrun).await {
            Ok(task) => task,
            Err(e) => {
                diagnostics.push(api_error("error while deleting cluster", &e));
                return DeleteResourceResponse { diagnostics };
            }
        };

        if let Err(e) = data.waiter.wait(&ctx, &task, data.timeout()).await {
            diagnostics.push(task_error("cluster to delete", task.ext_id.as_deref(), &e));
        } else {
            info!(ext_id = %ext_id, dryrun, "deleted cluster");
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for ClusterResource {
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

    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        import_state_passthrough_id("ext_id", &request)
    }
}

#[path = "./resource_cluster_test.rs"]
mod resource_cluster_test;
