//! The provider: top-level configuration plus the registries of resource and
//! data source factories

use crate::context::Context;
use crate::data_source::DataSourceWithConfigure;
use crate::resource::ResourceWithConfigure;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds an unconfigured resource; called once per request
pub type ResourceFactory = Box<dyn Fn() -> Box<dyn ResourceWithConfigure> + Send + Sync>;

/// Builds an unconfigured data source; called once per request
pub type DataSourceFactory = Box<dyn Fn() -> Box<dyn DataSourceWithConfigure> + Send + Sync>;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Prefix shared by every resource and data source, e.g. "nutanix"
    fn type_name(&self) -> &str;

    async fn schema(&self, ctx: Context, request: ProviderSchemaRequest) -> ProviderSchemaResponse;

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        ValidateProviderConfigResponse::default()
    }

    /// Resolves the provider block. `provider_data` of the response is passed
    /// to every resource and data source before they serve a request.
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse;

    fn resources(&self) -> HashMap<String, ResourceFactory>;

    fn data_sources(&self) -> HashMap<String, DataSourceFactory>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderSchemaRequest;

#[derive(Debug, Clone)]
pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

impl From<Schema> for ProviderSchemaResponse {
    fn from(schema: Schema) -> Self {
        Self {
            schema,
            diagnostics: vec![],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigureProviderRequest {
    pub config: DynamicValue,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigureProviderResponse {
    pub diagnostics: Vec<Diagnostic>,
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}

impl ConfigureProviderResponse {
    pub fn configured<T: Any + Send + Sync>(data: T) -> Self {
        let data: Arc<dyn Any + Send + Sync> = Arc::new(data);
        Self {
            diagnostics: vec![],
            provider_data: Some(data),
        }
    }

    pub fn failed(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            diagnostics,
            provider_data: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidateProviderConfigRequest {
    pub config: DynamicValue,
}

#[derive(Debug, Clone, Default)]
pub struct ValidateProviderConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}
