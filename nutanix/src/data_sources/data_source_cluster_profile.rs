//! Cluster profile data source implementation

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
use crate::resources::profiles::resource_cluster_profile::{
    cluster_profile_fields, cluster_profile_obj,
};

#[derive(Default)]
pub struct ClusterProfileDataSource {
    provider_data: Option<NutanixProviderData>,
}

impl ClusterProfileDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for ClusterProfileDataSource {
    fn type_name(&self) -> &str {
        "nutanix_cluster_profile_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let builder = SchemaBuilder::new()
            .version(0)
            .description("Reads a cluster profile")
            .attribute(computed("id", AttributeType::String))
            .attribute(
                AttributeBuilder::new("ext_id", AttributeType::String)
                    .description("Identifier of the cluster profile")
                    .required()
                    .build(),
            );

        DataSourceSchemaResponse {
            schema: cluster_profile_fields(builder, Mode::Computed).build(),
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadDataSourceResponse::failed(diagnostics);
        };

        let Some(ext_id) = Attrs::of(&request.config).str("ext_id") else {
            diagnostics.push(
                Diagnostic::error("Missing cluster profile id", "ext_id must be set")
                    .with_attribute(AttributePath::new("ext_id")),
            );
            return ReadDataSourceResponse::failed(diagnostics);
        };
        debug!(ext_id = %ext_id, "reading cluster profile");

        match data
            .client
            .clustermgmt()
            .cluster_profiles()
            .get(&ext_id)
            .await
        {
            Ok(versioned) => match versioned.data {
                Some(profile) => ReadDataSourceResponse {
                    state: data_source_state(
                        &request.config,
                        cluster_profile_obj(&profile, None)
                            .set("id", ext_id.as_str())
                            .set("ext_id", ext_id.as_str()),
                    ),
                    diagnostics,
                },
                None => {
                    diagnostics.push(Diagnostic::error(
                        "error while fetching cluster profile",
                        format!("cluster profile {} not found", ext_id),
                    ));
                    ReadDataSourceResponse::failed(diagnostics)
                }
            },
            Err(e) => {
                diagnostics.push(api_error("error while fetching cluster profile", &e));
                ReadDataSourceResponse::failed(diagnostics)
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for ClusterProfileDataSource {
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

#[path = "./data_source_cluster_profile_test.rs"]
mod data_source_cluster_profile_test;
