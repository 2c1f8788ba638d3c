//! Managed resources
//!
//! A resource owns one remote object through create, read, update and delete.
//! Like data sources, every call gets a freshly built and configured instance,
//! so implementations keep no state between calls beyond the provider data.

use crate::context::Context;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

#[async_trait]
pub trait Resource: Send + Sync {
    /// Full type name, e.g. "nutanix_cluster_v2". Must equal the factory key.
    fn type_name(&self) -> &str;

    async fn schema(&self, ctx: Context, request: ResourceSchemaRequest) -> ResourceSchemaResponse;

    /// Cross-attribute checks run after the schema validators pass.
    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse::default()
    }

    /// `new_state` must have every computed attribute known. A create that
    /// fails should return a null state so nothing is recorded.
    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse;

    /// `None` means the remote object no longer exists and the state is dropped.
    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse;

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse;

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse;
}

#[async_trait]
pub trait ResourceWithConfigure: Resource {
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse;

    /// Turns an import id into a partial state; the host reads it afterwards.
    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        ImportResourceStateResponse::failed(Diagnostic::error(
            "Import not supported",
            format!("{} cannot be imported", request.type_name),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceSchemaRequest;

#[derive(Debug, Clone)]
pub struct ResourceSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

impl From<Schema> for ResourceSchemaResponse {
    fn from(schema: Schema) -> Self {
        Self {
            schema,
            diagnostics: vec![],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidateResourceConfigRequest {
    pub type_name: String,
    pub config: DynamicValue,
}

#[derive(Debug, Clone, Default)]
pub struct ValidateResourceConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct CreateResourceRequest {
    pub type_name: String,
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
}

#[derive(Debug, Clone, Default)]
pub struct CreateResourceResponse {
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct ReadResourceRequest {
    pub type_name: String,
    pub current_state: DynamicValue,
}

#[derive(Debug, Clone, Default)]
pub struct ReadResourceResponse {
    pub new_state: Option<DynamicValue>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ReadResourceResponse {
    /// The object is gone; the host removes it from state.
    pub fn removed(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            new_state: None,
            diagnostics,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateResourceRequest {
    pub type_name: String,
    pub prior_state: DynamicValue,
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateResourceResponse {
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct DeleteResourceRequest {
    pub type_name: String,
    pub prior_state: DynamicValue,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteResourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigureResourceRequest {
    /// Value from the provider's configure response, downcast by the resource
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigureResourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct ImportResourceStateRequest {
    pub type_name: String,
    pub id: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImportResourceStateResponse {
    pub imported_resources: Vec<ImportedResource>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ImportResourceStateResponse {
    pub fn single(type_name: impl Into<String>, state: DynamicValue) -> Self {
        Self {
            imported_resources: vec![ImportedResource {
                type_name: type_name.into(),
                state,
            }],
            diagnostics: vec![],
        }
    }

    pub fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            imported_resources: vec![],
            diagnostics: vec![diagnostic],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportedResource {
    pub type_name: String,
    pub state: DynamicValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_read_has_no_state() {
        let response = ReadResourceResponse::removed(vec![]);
        assert!(response.new_state.is_none());
        assert!(response.diagnostics.is_empty());
    }

    #[test]
    fn single_import_keeps_type_name() {
        let response =
            ImportResourceStateResponse::single("nutanix_cluster_v2", DynamicValue::empty_object());
        assert_eq!(response.imported_resources.len(), 1);
        assert_eq!(response.imported_resources[0].type_name, "nutanix_cluster_v2");
    }
}
