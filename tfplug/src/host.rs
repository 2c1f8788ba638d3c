//! In-process host that drives a [`Provider`]
//!
//! The host plays Terraform's part: it validates configuration against the
//! declared schemas, computes plans (defaults, plan modifiers, replacement),
//! and dispatches create/read/update/delete/import calls to freshly configured
//! resource instances.

use crate::context::Context;
use crate::data_source::{
    ConfigureDataSourceRequest, DataSourceSchemaRequest, DataSourceWithConfigure,
    ReadDataSourceRequest, ValidateDataSourceConfigRequest,
};
use crate::error::{Result, TfplugError, TypeKind};
use crate::provider::{
    ConfigureProviderRequest, DataSourceFactory, Provider, ProviderSchemaRequest,
    ResourceFactory, ValidateProviderConfigRequest,
};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ReadResourceRequest, ResourceSchemaRequest,
    ResourceWithConfigure, UpdateResourceRequest, ValidateResourceConfigRequest,
};
use crate::schema::{
    AttributeType, Block, DefaultRequest, PlanModifierRequest, Schema, ValidatorRequest,
};
use crate::types::{has_errors, AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Result of planning a resource change
#[derive(Debug, Clone)]
pub struct PlannedChange {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of applying a resource change; `new_state` is `None` when the
/// resource no longer exists (or was never created)
#[derive(Debug, Clone)]
pub struct AppliedChange {
    pub new_state: Option<DynamicValue>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct ImportedState {
    pub type_name: String,
    pub state: DynamicValue,
}

#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: Vec<ImportedState>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ChangeKind {
    Create,
    Update,
    Delete,
}

pub struct Host<P: Provider> {
    provider: RwLock<P>,
    provider_data: RwLock<Option<Arc<dyn Any + Send + Sync>>>,
    resources: HashMap<String, ResourceFactory>,
    data_sources: HashMap<String, DataSourceFactory>,
}

impl<P: Provider> Host<P> {
    pub fn new(provider: P) -> Self {
        let resources = provider.resources();
        let data_sources = provider.data_sources();
        Self {
            provider: RwLock::new(provider),
            provider_data: RwLock::new(None),
            resources,
            data_sources,
        }
    }

    pub fn resource_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.resources.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn data_source_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.data_sources.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn provider_schema(&self, ctx: &Context) -> Schema {
        let provider = self.provider.read().await;
        provider
            .schema(ctx.clone(), ProviderSchemaRequest)
            .await
            .schema
    }

    /// Validates the provider block, then configures the provider and keeps
    /// the data it hands out for later resource and data source calls.
    pub async fn configure(&self, ctx: &Context, config: DynamicValue) -> Vec<Diagnostic> {
        let schema = self.provider_schema(ctx).await;
        let mut diagnostics = Vec::new();
        validate_block(
            &schema.block,
            &config.value,
            &AttributePath::root(),
            &mut diagnostics,
        );
        {
            let provider = self.provider.read().await;
            diagnostics.extend(
                provider
                    .validate(
                        ctx.clone(),
                        ValidateProviderConfigRequest {
                            config: config.clone(),
                        },
                    )
                    .await
                    .diagnostics,
            );
        }
        if has_errors(&diagnostics) {
            return diagnostics;
        }

        let response = {
            let mut provider = self.provider.write().await;
            provider
                .configure(ctx.clone(), ConfigureProviderRequest { config })
                .await
        };
        diagnostics.extend(response.diagnostics);
        if !has_errors(&diagnostics) {
            *self.provider_data.write().await = response.provider_data;
            info!("provider configured");
        }
        diagnostics
    }

    fn new_resource(&self, type_name: &str) -> Result<Box<dyn ResourceWithConfigure>> {
        self.resources
            .get(type_name)
            .map(|factory| factory())
            .ok_or_else(|| TfplugError::unknown(TypeKind::Resource, type_name))
    }

    fn new_data_source(&self, type_name: &str) -> Result<Box<dyn DataSourceWithConfigure>> {
        self.data_sources
            .get(type_name)
            .map(|factory| factory())
            .ok_or_else(|| TfplugError::unknown(TypeKind::DataSource, type_name))
    }

    async fn configured_resource(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> std::result::Result<Box<dyn ResourceWithConfigure>, Vec<Diagnostic>> {
        let mut resource = self
            .new_resource(type_name)
            .map_err(|e| vec![Diagnostic::error("Unknown resource type", e.to_string())])?;
        let provider_data = self.provider_data.read().await.clone();
        let response = resource
            .configure(ctx.clone(), ConfigureResourceRequest { provider_data })
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }
        Ok(resource)
    }

    async fn configured_data_source(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> std::result::Result<Box<dyn DataSourceWithConfigure>, Vec<Diagnostic>> {
        let mut data_source = self
            .new_data_source(type_name)
            .map_err(|e| vec![Diagnostic::error("Unknown data source type", e.to_string())])?;
        let provider_data = self.provider_data.read().await.clone();
        let response = data_source
            .configure(ctx.clone(), ConfigureDataSourceRequest { provider_data })
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }
        Ok(data_source)
    }

    pub async fn resource_schema(&self, ctx: &Context, type_name: &str) -> Result<Schema> {
        let resource = self.new_resource(type_name)?;
        Ok(resource
            .schema(ctx.clone(), ResourceSchemaRequest)
            .await
            .schema)
    }

    pub async fn data_source_schema(&self, ctx: &Context, type_name: &str) -> Result<Schema> {
        let data_source = self.new_data_source(type_name)?;
        Ok(data_source
            .schema(ctx.clone(), DataSourceSchemaRequest)
            .await
            .schema)
    }

    /// Schema checks (required, unknown and mistyped attributes, block
    /// cardinality, attribute validators) followed by the resource's own
    /// validation. Needs no provider configuration.
    pub async fn validate_resource_config(
        &self,
        ctx: &Context,
        type_name: &str,
        config: &DynamicValue,
    ) -> Vec<Diagnostic> {
        let resource = match self.new_resource(type_name) {
            Ok(r) => r,
            Err(e) => return vec![Diagnostic::error("Unknown resource type", e.to_string())],
        };
        let schema = resource.schema(ctx.clone(), ResourceSchemaRequest).await.schema;

        let mut diagnostics = Vec::new();
        validate_block(
            &schema.block,
            &config.value,
            &AttributePath::root(),
            &mut diagnostics,
        );
        if has_errors(&diagnostics) {
            return diagnostics;
        }

        let response = resource
            .validate(
                ctx.clone(),
                ValidateResourceConfigRequest {
                    type_name: type_name.to_string(),
                    config: config.clone(),
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);
        diagnostics
    }

    pub async fn validate_data_source_config(
        &self,
        ctx: &Context,
        type_name: &str,
        config: &DynamicValue,
    ) -> Vec<Diagnostic> {
        let data_source = match self.new_data_source(type_name) {
            Ok(d) => d,
            Err(e) => return vec![Diagnostic::error("Unknown data source type", e.to_string())],
        };
        let schema = data_source
            .schema(ctx.clone(), DataSourceSchemaRequest)
            .await
            .schema;

        let mut diagnostics = Vec::new();
        validate_block(
            &schema.block,
            &config.value,
            &AttributePath::root(),
            &mut diagnostics,
        );
        if has_errors(&diagnostics) {
            return diagnostics;
        }

        let response = data_source
            .validate(
                ctx.clone(),
                ValidateDataSourceConfigRequest {
                    type_name: type_name.to_string(),
                    config: config.clone(),
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);
        diagnostics
    }

    /// Builds the planned state from configuration: configured values win,
    /// then static defaults, then prior state for computed attributes; plan
    /// modifiers run last and may request replacement.
    pub async fn plan_resource_change(
        &self,
        ctx: &Context,
        type_name: &str,
        prior_state: &DynamicValue,
        config: &DynamicValue,
    ) -> PlannedChange {
        let mut diagnostics = self.validate_resource_config(ctx, type_name, config).await;
        if has_errors(&diagnostics) || config.is_null() {
            return PlannedChange {
                planned_state: DynamicValue::null(),
                requires_replace: vec![],
                diagnostics,
            };
        }

        let schema = match self.resource_schema(ctx, type_name).await {
            Ok(s) => s,
            Err(e) => {
                diagnostics.push(Diagnostic::error("Unknown resource type", e.to_string()));
                return PlannedChange {
                    planned_state: DynamicValue::null(),
                    requires_replace: vec![],
                    diagnostics,
                };
            }
        };

        let mut requires_replace = Vec::new();
        let planned = plan_block(
            &schema.block,
            &config.value,
            &prior_state.value,
            &AttributePath::root(),
            &mut requires_replace,
            &mut diagnostics,
        );
        if !requires_replace.is_empty() {
            debug!(type_name, ?requires_replace, "planned change requires replacement");
        }

        PlannedChange {
            planned_state: DynamicValue::new(planned),
            requires_replace,
            diagnostics,
        }
    }

    /// Null prior state creates, null planned state deletes, anything else
    /// updates. Failed creates leave no state behind; failed updates and
    /// deletes keep the prior state.
    pub async fn apply_resource_change(
        &self,
        ctx: &Context,
        type_name: &str,
        prior_state: DynamicValue,
        planned_state: DynamicValue,
        config: DynamicValue,
    ) -> AppliedChange {
        let kind = match (prior_state.is_null(), planned_state.is_null()) {
            (true, true) => {
                return AppliedChange {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            (true, false) => ChangeKind::Create,
            (false, true) => ChangeKind::Delete,
            (false, false) => ChangeKind::Update,
        };

        let resource = match self.configured_resource(ctx, type_name).await {
            Ok(r) => r,
            Err(diagnostics) => {
                return AppliedChange {
                    new_state: (kind != ChangeKind::Create).then_some(prior_state),
                    diagnostics,
                }
            }
        };

        debug!(type_name, ?kind, "applying resource change");
        let type_name = type_name.to_string();
        let (new_state, diagnostics) = match kind {
            ChangeKind::Create => {
                let response = resource
                    .create(
                        ctx.clone(),
                        CreateResourceRequest {
                            type_name,
                            planned_state,
                            config,
                        },
                    )
                    .await;
                (Some(response.new_state), response.diagnostics)
            }
            ChangeKind::Update => {
                let response = resource
                    .update(
                        ctx.clone(),
                        UpdateResourceRequest {
                            type_name,
                            prior_state: prior_state.clone(),
                            planned_state,
                            config,
                        },
                    )
                    .await;
                (Some(response.new_state), response.diagnostics)
            }
            ChangeKind::Delete => {
                let response = resource
                    .delete(
                        ctx.clone(),
                        DeleteResourceRequest {
                            type_name,
                            prior_state: prior_state.clone(),
                        },
                    )
                    .await;
                (None, response.diagnostics)
            }
        };

        if has_errors(&diagnostics) {
            warn!(?kind, "resource change failed");
            let new_state = match kind {
                ChangeKind::Create => None,
                ChangeKind::Update | ChangeKind::Delete => Some(prior_state),
            };
            return AppliedChange {
                new_state,
                diagnostics,
            };
        }

        AppliedChange {
            new_state: new_state.filter(|s| !s.is_null()),
            diagnostics,
        }
    }

    pub async fn read_resource(
        &self,
        ctx: &Context,
        type_name: &str,
        current_state: DynamicValue,
    ) -> AppliedChange {
        let resource = match self.configured_resource(ctx, type_name).await {
            Ok(r) => r,
            Err(diagnostics) => {
                return AppliedChange {
                    new_state: Some(current_state),
                    diagnostics,
                }
            }
        };
        let response = resource
            .read(
                ctx.clone(),
                ReadResourceRequest {
                    type_name: type_name.to_string(),
                    current_state,
                },
            )
            .await;
        AppliedChange {
            new_state: response.new_state.filter(|s| !s.is_null()),
            diagnostics: response.diagnostics,
        }
    }

    /// Imports by ID and refreshes every imported object with a read
    pub async fn import_resource_state(
        &self,
        ctx: &Context,
        type_name: &str,
        id: &str,
    ) -> ImportResult {
        let resource = match self.configured_resource(ctx, type_name).await {
            Ok(r) => r,
            Err(diagnostics) => {
                return ImportResult {
                    imported: vec![],
                    diagnostics,
                }
            }
        };
        let response = resource
            .import_state(
                ctx.clone(),
                ImportResourceStateRequest {
                    type_name: type_name.to_string(),
                    id: id.to_string(),
                },
            )
            .await;
        let mut diagnostics = response.diagnostics;
        if has_errors(&diagnostics) {
            return ImportResult {
                imported: vec![],
                diagnostics,
            };
        }

        let mut imported = Vec::new();
        for item in response.imported_resources {
            let read = resource
                .read(
                    ctx.clone(),
                    ReadResourceRequest {
                        type_name: item.type_name.clone(),
                        current_state: item.state,
                    },
                )
                .await;
            diagnostics.extend(read.diagnostics);
            match read.new_state.filter(|s| !s.is_null()) {
                Some(state) => imported.push(ImportedState {
                    type_name: item.type_name,
                    state,
                }),
                None => diagnostics.push(Diagnostic::error(
                    "Cannot import non-existent remote object",
                    format!("{} with id {} was not found", item.type_name, id),
                )),
            }
        }

        ImportResult {
            imported,
            diagnostics,
        }
    }

    pub async fn read_data_source(
        &self,
        ctx: &Context,
        type_name: &str,
        config: DynamicValue,
    ) -> AppliedChange {
        let mut diagnostics = self
            .validate_data_source_config(ctx, type_name, &config)
            .await;
        if has_errors(&diagnostics) {
            return AppliedChange {
                new_state: None,
                diagnostics,
            };
        }

        let data_source = match self.configured_data_source(ctx, type_name).await {
            Ok(d) => d,
            Err(diags) => {
                diagnostics.extend(diags);
                return AppliedChange {
                    new_state: None,
                    diagnostics,
                };
            }
        };
        let response = data_source
            .read(
                ctx.clone(),
                ReadDataSourceRequest {
                    type_name: type_name.to_string(),
                    config,
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);
        let new_state = (!has_errors(&diagnostics)).then_some(response.state);
        AppliedChange {
            new_state,
            diagnostics,
        }
    }
}

/// Returns true when `value` conforms to `expected`. Null and unknown conform
/// to every type.
pub fn validate_dynamic_type(value: &Dynamic, expected: &AttributeType) -> bool {
    match (value, expected) {
        (Dynamic::Null | Dynamic::Unknown, _) => true,
        (Dynamic::String(_), AttributeType::String) => true,
        (Dynamic::Number(_), AttributeType::Number) => true,
        (Dynamic::Bool(_), AttributeType::Bool) => true,
        (Dynamic::List(items), AttributeType::List(elem) | AttributeType::Set(elem)) => {
            items.iter().all(|item| validate_dynamic_type(item, elem))
        }
        (Dynamic::Map(map), AttributeType::Map(elem)) => {
            map.values().all(|item| validate_dynamic_type(item, elem))
        }
        (Dynamic::Map(map), AttributeType::Object(fields)) => {
            map.keys().all(|k| fields.contains_key(k))
                && fields.iter().all(|(name, field_type)| {
                    map.get(name)
                        .map_or(true, |v| validate_dynamic_type(v, field_type))
                })
        }
        _ => false,
    }
}

fn validate_block(
    block: &Block,
    value: &Dynamic,
    path: &AttributePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let empty = HashMap::new();
    let map = match value {
        Dynamic::Null | Dynamic::Unknown => &empty,
        Dynamic::Map(map) => map,
        other => {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid block",
                    format!("expected an object, got {}", other.type_name()),
                )
                .with_attribute(path.clone()),
            );
            return;
        }
    };

    for attr in &block.attributes {
        let attr_path = path.clone().attribute(&attr.name);
        let attr_value = map.get(&attr.name).unwrap_or(&Dynamic::Null);

        if attr.required && attr_value.is_null() {
            diagnostics.push(
                Diagnostic::error(
                    format!("Missing required argument: {}", attr_path),
                    format!("The argument \"{}\" is required, but no definition was found.", attr.name),
                )
                .with_attribute(attr_path),
            );
            continue;
        }
        if attr_value.is_absent() {
            continue;
        }
        if !attr.required && !attr.optional {
            diagnostics.push(
                Diagnostic::error(
                    format!("Invalid configuration for computed attribute: {}", attr_path),
                    format!("\"{}\" is read-only and cannot be set in configuration.", attr.name),
                )
                .with_attribute(attr_path),
            );
            continue;
        }
        if !validate_dynamic_type(attr_value, &attr.r#type) {
            diagnostics.push(
                Diagnostic::error(
                    format!("Incorrect attribute value type: {}", attr_path),
                    format!(
                        "\"{}\" expects {}, got {}",
                        attr.name,
                        attr.r#type.to_json(),
                        attr_value.type_name()
                    ),
                )
                .with_attribute(attr_path),
            );
            continue;
        }
        for validator in &attr.validators {
            let response = validator.validate(ValidatorRequest {
                config_value: DynamicValue::new(attr_value.clone()),
                path: attr_path.clone(),
            });
            diagnostics.extend(response.diagnostics);
        }
    }

    for nested in &block.block_types {
        let block_path = path.clone().attribute(&nested.type_name);
        let items: &[Dynamic] = match map.get(&nested.type_name) {
            None | Some(Dynamic::Null) | Some(Dynamic::Unknown) => &[],
            Some(Dynamic::List(items)) => items,
            Some(other) => {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Invalid block: {}", block_path),
                        format!("expected a list of blocks, got {}", other.type_name()),
                    )
                    .with_attribute(block_path),
                );
                continue;
            }
        };
        let count = items.len() as i64;
        if nested.min_items > 0 && count < nested.min_items {
            diagnostics.push(
                Diagnostic::error(
                    format!("Insufficient {} blocks", nested.type_name),
                    format!("At least {} \"{}\" blocks are required.", nested.min_items, nested.type_name),
                )
                .with_attribute(block_path.clone()),
            );
        }
        if nested.max_items > 0 && count > nested.max_items {
            diagnostics.push(
                Diagnostic::error(
                    format!("Too many {} blocks", nested.type_name),
                    format!("No more than {} \"{}\" blocks are allowed.", nested.max_items, nested.type_name),
                )
                .with_attribute(block_path.clone()),
            );
        }
        for (i, item) in items.iter().enumerate() {
            validate_block(&nested.block, item, &block_path.clone().index(i as i64), diagnostics);
        }
    }

    for key in map.keys() {
        if block.attribute(key).is_none() && block.block_type(key).is_none() {
            let key_path = path.clone().attribute(key);
            diagnostics.push(
                Diagnostic::error(
                    format!("Unsupported argument: {}", key_path),
                    format!("An argument named \"{}\" is not expected here.", key),
                )
                .with_attribute(key_path),
            );
        }
    }
}

fn plan_block(
    block: &Block,
    config: &Dynamic,
    prior: &Dynamic,
    path: &AttributePath,
    requires_replace: &mut Vec<AttributePath>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Dynamic {
    plan_block_items(block, config, prior, path, false, requires_replace, diagnostics)
}

/// `in_computed` is set inside a computed block, where every nested block
/// left out of configuration keeps its prior items
fn plan_block_items(
    block: &Block,
    config: &Dynamic,
    prior: &Dynamic,
    path: &AttributePath,
    in_computed: bool,
    requires_replace: &mut Vec<AttributePath>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Dynamic {
    let empty = HashMap::new();
    let config_map = config.as_map().unwrap_or(&empty);
    let prior_map = prior.as_map().unwrap_or(&empty);
    let mut planned = HashMap::new();

    for attr in &block.attributes {
        let attr_path = path.clone().attribute(&attr.name);
        let config_value = config_map.get(&attr.name).cloned().unwrap_or_default();
        let prior_value = prior_map.get(&attr.name).cloned().unwrap_or_default();

        let mut plan_value = if !config_value.is_absent() {
            config_value.clone()
        } else if let Some(default) = &attr.default {
            default
                .default_value(DefaultRequest {
                    path: attr_path.clone(),
                })
                .value
                .value
        } else if attr.computed {
            if prior_value.is_null() {
                Dynamic::Unknown
            } else {
                prior_value.clone()
            }
        } else {
            Dynamic::Null
        };

        for modifier in &attr.plan_modifiers {
            let response = modifier.modify(PlanModifierRequest {
                config_value: DynamicValue::new(config_value.clone()),
                state_value: DynamicValue::new(prior_value.clone()),
                plan_value: DynamicValue::new(plan_value),
                path: attr_path.clone(),
            });
            plan_value = response.plan_value.value;
            diagnostics.extend(response.diagnostics);
            if response.requires_replace && !requires_replace.contains(&attr_path) {
                requires_replace.push(attr_path.clone());
            }
        }

        planned.insert(attr.name.clone(), plan_value);
    }

    for nested in &block.block_types {
        let block_path = path.clone().attribute(&nested.type_name);
        let keep_prior = in_computed || nested.keeps_prior();
        let prior_items = prior_map
            .get(&nested.type_name)
            .and_then(Dynamic::as_list)
            .cloned()
            .unwrap_or_default();
        let value = match config_map.get(&nested.type_name).and_then(Dynamic::as_list) {
            Some(items) => Dynamic::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        plan_block_items(
                            &nested.block,
                            item,
                            prior_items.get(i).unwrap_or(&Dynamic::Null),
                            &block_path.clone().index(i as i64),
                            keep_prior,
                            requires_replace,
                            diagnostics,
                        )
                    })
                    .collect(),
            ),
            None if keep_prior => Dynamic::List(prior_items),
            None => Dynamic::List(vec![]),
        };
        planned.insert(nested.type_name.clone(), value);
    }

    Dynamic::Map(planned)
}
