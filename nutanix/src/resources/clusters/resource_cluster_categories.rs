//! Category associations of a cluster

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::import_state_passthrough_id;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::ListLength;
use tracing::{debug, info};

use crate::common::schema::id_attribute;
use crate::common::{
    api_error, diff_string_sets, not_configured, random_id, state_error, task_error, Attrs,
};
use crate::provider_data::NutanixProviderData;

/// Associates `categories` with the cluster and waits for the task
pub(crate) async fn associate_categories(
    ctx: &Context,
    data: &NutanixProviderData,
    cluster_ext_id: &str,
    categories: Vec<String>,
) -> Result<(), Diagnostic> {
    debug!(cluster = %cluster_ext_id, categories = ?categories, "associating categories");
    let task = data
        .client
        .clustermgmt()
        .clusters()
        .associate_categories(cluster_ext_id, categories)
        .await
        .map_err(|e| api_error("error while associating categories to cluster", &e))?;
    data.waiter
        .wait(ctx, &task, data.timeout())
        .await
        .map_err(|e| {
            task_error(
                "categories to be associated to the cluster",
                task.ext_id.as_deref(),
                &e,
            )
        })?;
    Ok(())
}

pub(crate) async fn disassociate_categories(
    ctx: &Context,
    data: &NutanixProviderData,
    cluster_ext_id: &str,
    categories: Vec<String>,
) -> Result<(), Diagnostic> {
    debug!(cluster = %cluster_ext_id, categories = ?categories, "disassociating categories");
    let task = data
        .client
        .clustermgmt()
        .clusters()
        .disassociate_categories(cluster_ext_id, categories)
        .await
        .map_err(|e| api_error("error while disassociating categories from cluster", &e))?;
    data.waiter
        .wait(ctx, &task, data.timeout())
        .await
        .map_err(|e| {
            task_error(
                "categories to be disassociated from cluster",
                task.ext_id.as_deref(),
                &e,
            )
        })?;
    Ok(())
}

/// Moves the cluster from the `old` categories to `new`: removed ones are
/// disassociated first, then added ones associated
pub(crate) async fn sync_categories(
    ctx: &Context,
    data: &NutanixProviderData,
    cluster_ext_id: &str,
    old: &[String],
    new: &[String],
) -> Result<(), Diagnostic> {
    let (added, removed) = diff_string_sets(old, new);
    debug!(added = ?added, removed = ?removed, "category changes");
    if !removed.is_empty() {
        disassociate_categories(ctx, data, cluster_ext_id, removed).await?;
    }
    if !added.is_empty() {
        associate_categories(ctx, data, cluster_ext_id, added).await?;
    }
    Ok(())
}

#[derive(Default)]
pub struct ClusterCategoriesResource {
    provider_data: Option<NutanixProviderData>,
}

impl ClusterCategoriesResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current categories of the cluster, `Ok(None)` when the cluster is gone
    async fn fetch(
        &self,
        data: &NutanixProviderData,
        input: &DynamicValue,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let Some(cluster_ext_id) = Attrs::of(input).str("cluster_ext_id") else {
            return Err(Diagnostic::error(
                "Missing cluster",
                "cluster_ext_id is required and cannot be empty",
            ));
        };

        let cluster = match data
            .client
            .clustermgmt()
            .clusters()
            .get(&cluster_ext_id, None)
            .await
        {
            Ok(versioned) => versioned.data,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => {
                return Err(api_error(
                    format!("error while fetching cluster by ID {}", cluster_ext_id),
                    &e,
                ))
            }
        };

        let categories: Vec<Dynamic> = cluster
            .categories
            .unwrap_or_default()
            .into_iter()
            .filter(|c| !c.is_empty())
            .map(Dynamic::String)
            .collect();
        debug!(cluster = %cluster_ext_id, count = categories.len(), "read cluster categories");

        let id = input
            .get_optional_string(&AttributePath::new("id"))
            .unwrap_or_else(random_id);
        let mut state = DynamicValue::empty_object();
        state
            .set_string(&AttributePath::new("id"), id)
            .map_err(state_error)?;
        state
            .set_string(&AttributePath::new("cluster_ext_id"), cluster_ext_id)
            .map_err(state_error)?;
        state
            .set_list(&AttributePath::new("categories"), categories)
            .map_err(state_error)?;
        Ok(Some(state))
    }
}

#[async_trait]
impl Resource for ClusterCategoriesResource {
    fn type_name(&self) -> &str {
        "nutanix_cluster_categories_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Associates categories with a cluster")
            .attribute(id_attribute())
            .attribute(
                AttributeBuilder::new("cluster_ext_id", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("categories", AttributeType::set_of(AttributeType::String))
                    .description("Category ext_ids to associate")
                    .required()
                    .validator(ListLength::create(Some(1), None))
                    .build(),
            )
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
        let categories = attrs.strings("categories");

        if let Err(diag) = associate_categories(&ctx, data, &cluster_ext_id, categories).await {
            diagnostics.push(diag);
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        }
        info!(cluster = %cluster_ext_id, "categories associated");

        let mut state = request.planned_state.clone();
        if let Err(e) = state.set_string(&AttributePath::new("id"), random_id()) {
            diagnostics.push(state_error(e));
        }
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

        match self.fetch(data, &request.current_state).await {
            Ok(new_state) => ReadResourceResponse {
                new_state,
                diagnostics,
            },
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

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        };

        let planned = Attrs::of(&request.planned_state);
        let cluster_ext_id = planned.str("cluster_ext_id").unwrap_or_default();
        let old = Attrs::of(&request.prior_state).strings("categories");
        let new = planned.strings("categories");

        if let Err(diag) = sync_categories(&ctx, data, &cluster_ext_id, &old, &new).await {
            diagnostics.push(diag);
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        }

        let mut input = request.planned_state.clone();
        if let Some(id) = request
            .prior_state
            .get_optional_string(&AttributePath::new("id"))
        {
            if let Err(e) = input.set_string(&AttributePath::new("id"), id) {
                diagnostics.push(state_error(e));
            }
        }
        match self.fetch(data, &input).await {
            Ok(Some(state)) => UpdateResourceResponse {
                new_state: state,
                diagnostics,
            },
            Ok(None) => {
                diagnostics.push(Diagnostic::error(
                    "Cluster not found",
                    format!("cluster {} vanished during update", cluster_ext_id),
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
        let Some(cluster_ext_id) = attrs.str("cluster_ext_id") else {
            return DeleteResourceResponse { diagnostics };
        };
        let categories = attrs.strings("categories");
        if categories.is_empty() {
            return DeleteResourceResponse { diagnostics };
        }

        if let Err(diag) = disassociate_categories(&ctx, data, &cluster_ext_id, categories).await {
            diagnostics.push(diag);
        }
        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for ClusterCategoriesResource {
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

    /// The import id is the cluster ext_id; the following read fills in the categories
    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        import_state_passthrough_id("cluster_ext_id", &request)
    }
}

#[path = "./resource_cluster_categories_test.rs"]
mod resource_cluster_categories_test;
