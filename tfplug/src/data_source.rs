//! Data sources: read-only lookups of remote objects
//!
//! The host builds a fresh instance per call through the provider's factory,
//! hands it the provider data via [`DataSourceWithConfigure::configure`], and
//! only then asks it to validate or read.

use crate::context::Context;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Full type name including the provider prefix, e.g. "nutanix_hosts_v2".
    /// Must equal the key the provider registers the factory under.
    fn type_name(&self) -> &str;

    async fn schema(&self, ctx: Context, request: DataSourceSchemaRequest)
        -> DataSourceSchemaResponse;

    /// Cross-attribute checks. Per-attribute rules belong in the schema as
    /// validators, which the host runs before this.
    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse::default()
    }

    /// The returned state echoes the config with computed attributes filled.
    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse;
}

#[async_trait]
pub trait DataSourceWithConfigure: DataSource {
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DataSourceSchemaRequest;

#[derive(Debug, Clone)]
pub struct DataSourceSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

impl From<Schema> for DataSourceSchemaResponse {
    fn from(schema: Schema) -> Self {
        Self {
            schema,
            diagnostics: vec![],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidateDataSourceConfigRequest {
    pub type_name: String,
    pub config: DynamicValue,
}

#[derive(Debug, Clone, Default)]
pub struct ValidateDataSourceConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct ReadDataSourceRequest {
    pub type_name: String,
    pub config: DynamicValue,
}

#[derive(Debug, Clone, Default)]
pub struct ReadDataSourceResponse {
    pub state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

impl ReadDataSourceResponse {
    pub fn new(state: DynamicValue, diagnostics: Vec<Diagnostic>) -> Self {
        Self { state, diagnostics }
    }

    /// A read that produced no state; `diagnostics` should hold the reason.
    pub fn failed(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            state: DynamicValue::null(),
            diagnostics,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigureDataSourceRequest {
    /// Whatever the provider returned from its own configure, or `None` when
    /// the provider is not configured yet
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigureDataSourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}
