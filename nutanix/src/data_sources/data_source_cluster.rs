//! Cluster data source implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic};
use tracing::debug;

use super::data_source_state;
use crate::common::schema::{computed, Mode};
use crate::common::{api_error, not_configured, Attrs};
use crate::provider_data::NutanixProviderData;
use crate::resources::clusters::cluster_schema::{
    cluster_fields, cluster_obj, computed_nodes_block,
};

#[derive(Default)]
pub struct ClusterDataSource {
    provider_data: Option<NutanixProviderData>,
}

impl ClusterDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for ClusterDataSource {
    fn type_name(&self) -> &str {
        "nutanix_cluster_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let builder = SchemaBuilder::new()
            .version(0)
            .description("Reads a cluster registered with Prism Central")
            .attribute(computed("id", AttributeType::String))
            .attribute(
                AttributeBuilder::new("ext_id", AttributeType::String)
                    .description("Identifier of the cluster")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("expand", AttributeType::String)
                    .description("Related entities to expand")
                    .optional()
                    .build(),
            )
            .attribute(computed("name", AttributeType::String))
            .block(computed_nodes_block());

        DataSourceSchemaResponse {
            schema: cluster_fields(builder, Mode::Computed).build(),
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadDataSourceResponse::failed(diagnostics);
        };

        let attrs = Attrs::of(&request.config);
        let Some(ext_id) = attrs.str("ext_id") else {
            diagnostics.push(
                Diagnostic::error("Missing cluster id", "ext_id must be set")
                    .with_attribute(AttributePath::new("ext_id")),
            );
            return ReadDataSourceResponse::failed(diagnostics);
        };
        debug!(ext_id = %ext_id, "reading cluster");

        let expand = attrs.str("expand");
        match data
            .client
            .clustermgmt()
            .clusters()
            .get(&ext_id, expand.as_deref())
            .await
        {
            Ok(versioned) => ReadDataSourceResponse {
                state: data_source_state(
                    &request.config,
                    cluster_obj(&versioned.data, None).set("id", ext_id.as_str()),
                ),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(api_error("error while fetching cluster entity", &e));
                ReadDataSourceResponse::failed(diagnostics)
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for ClusterDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];
        match NutanixProviderData::from_any(request.provider_data) {
            Ok(data) => self.provider_data = Some(data),
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureDataSourceResponse { diagnostics }
    }
}

#[path = "./data_source_cluster_test.rs"]
mod data_source_cluster_test;
