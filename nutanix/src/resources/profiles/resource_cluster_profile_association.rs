//! Applies a cluster profile to a set of clusters

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::defaults::StaticDefault;
use tfplug::plan_modifier::RequiresReplace;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tracing::{debug, info};

use crate::api::clustermgmt::cluster_profiles::ClusterReferenceListSpec;
use crate::common::schema::id_attribute;
use crate::common::{
    api_error, diff_string_sets, not_configured, random_id, state_error, task_error, Attrs,
};
use crate::provider_data::NutanixProviderData;

#[derive(Default)]
pub struct ClusterProfileAssociationResource {
    provider_data: Option<NutanixProviderData>,
}

impl ClusterProfileAssociationResource {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Applies `profile` to `clusters` and waits for the task
pub(crate) async fn apply_profile(
    ctx: &Context,
    data: &NutanixProviderData,
    profile: &str,
    clusters: &[String],
    dryrun: bool,
) -> Result<(), Diagnostic> {
    debug!(profile = %profile, clusters = ?clusters, dryrun, "applying cluster profile");
    let task = data
        .client
        .clustermgmt()
        .cluster_profiles()
        .apply(profile, &ClusterReferenceListSpec::from_ids(clusters), dryrun)
        .await
        .map_err(|e| api_error("error associating clusters to cluster profile", &e))?;
    data.waiter
        .wait(ctx, &task, data.timeout())
        .await
        .map_err(|e| task_error("cluster profile to associate", task.ext_id.as_deref(), &e))?;
    Ok(())
}

pub(crate) async fn disassociate_profile(
    ctx: &Context,
    data: &NutanixProviderData,
    profile: &str,
    clusters: &[String],
) -> Result<(), Diagnostic> {
    debug!(profile = %profile, clusters = ?clusters, "disassociating cluster profile");
    let task = data
        .client
        .clustermgmt()
        .cluster_profiles()
        .disassociate(profile, &ClusterReferenceListSpec::from_ids(clusters))
        .await
        .map_err(|e| api_error("error deassociating clusters from cluster profile", &e))?;
    data.waiter
        .wait(ctx, &task, data.timeout())
        .await
        .map_err(|e| {
            task_error("cluster profile to disassociate", task.ext_id.as_deref(), &e)
        })?;
    Ok(())
}

fn dryrun_of(state: &DynamicValue) -> bool {
    state
        .get_optional_bool(&AttributePath::new("dryrun"))
        .unwrap_or(false)
}

/// Clusters to apply the profile to and to release from it. Turning
/// `dryrun` off without touching the clusters applies all of them, since the
/// earlier dry run changed nothing.
fn association_changes(
    prior: &DynamicValue,
    planned: &DynamicValue,
) -> (Vec<String>, Vec<String>) {
    let old = Attrs::of(prior).strings("clusters");
    let new = Attrs::of(planned).strings("clusters");
    let (mut added, removed) = diff_string_sets(&old, &new);

    if dryrun_of(prior) && !dryrun_of(planned) && added.is_empty() && removed.is_empty() {
        debug!("dryrun turned off, applying the profile to every cluster");
        added = new;
    }
    (added, removed)
}

#[async_trait]
impl Resource for ClusterProfileAssociationResource {
    fn type_name(&self) -> &str {
        "nutanix_cluster_profile_association_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Associates a cluster profile with clusters")
            .attribute(id_attribute())
            .attribute(
                AttributeBuilder::new("ext_id", AttributeType::String)
                    .description("The cluster profile")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("dryrun", AttributeType::Bool)
                    .optional()
                    .default(StaticDefault::bool(false))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("clusters", AttributeType::set_of(AttributeType::String))
                    .description("Clusters the profile applies to")
                    .required()
                    .build(),
            )
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
        let clusters = request.config.get(&AttributePath::new("clusters"));
        if clusters.is_some_and(|c| !c.is_unknown())
            && Attrs::of(&request.config).strings("clusters").is_empty()
        {
            diagnostics.push(
                Diagnostic::error("No clusters", "clusters must name at least one cluster")
                    .with_attribute(AttributePath::new("clusters")),
            );
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
        let profile = attrs.str("ext_id").unwrap_or_default();
        let clusters = attrs.strings("clusters");
        let dryrun = dryrun_of(&request.planned_state);

        if let Err(diag) = apply_profile(&ctx, data, &profile, &clusters, dryrun).await {
            diagnostics.push(diag);
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        }
        info!(profile = %profile, count = clusters.len(), "cluster profile associated");

        let mut state = request.planned_state.clone();
        let id = random_id();
        if let Err(e) = state.set_string(&AttributePath::new("id"), id) {
            diagnostics.push(state_error(e));
        }
        if let Err(e) = state.set_bool(&AttributePath::new("dryrun"), dryrun) {
            diagnostics.push(state_error(e));
        }

        CreateResourceResponse {
            new_state: state,
            diagnostics,
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        ReadResourceResponse {
            new_state: Some(request.current_state),
            diagnostics: vec![],
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        };

        let profile = Attrs::of(&request.planned_state)
            .str("ext_id")
            .unwrap_or_default();
        let dryrun = dryrun_of(&request.planned_state);
        let (added, removed) = association_changes(&request.prior_state, &request.planned_state);

        if !added.is_empty() {
            if let Err(diag) = apply_profile(&ctx, data, &profile, &added, dryrun).await {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        }
        if !removed.is_empty() {
            if let Err(diag) = disassociate_profile(&ctx, data, &profile, &removed).await {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        }

        let mut state = request.planned_state;
        if let Some(id) = request
            .prior_state
            .get_optional_string(&AttributePath::new("id"))
        {
            if let Err(e) = state.set_string(&AttributePath::new("id"), id) {
                diagnostics.push(state_error(e));
            }
        }
        UpdateResourceResponse {
            new_state: state,
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
        let Some(profile) = attrs.str("ext_id") else {
            return DeleteResourceResponse { diagnostics };
        };
        let clusters = attrs.strings("clusters");

        if let Err(diag) = disassociate_profile(&ctx, data, &profile, &clusters).await {
            diagnostics.push(diag);
        }
        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for ClusterProfileAssociationResource {
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

#[path = "./resource_cluster_profile_association_test.rs"]
mod resource_cluster_profile_association_test;
