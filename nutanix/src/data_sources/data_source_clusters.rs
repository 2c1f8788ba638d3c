//! Clusters list data source implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tracing::debug;

use super::{data_source_state, entity_list_block, list_params, list_params_fields};
use crate::common::schema::{computed, Mode};
use crate::common::{api_error, not_configured, random_id, Attrs, IntoDynamic, Obj};
use crate::provider_data::NutanixProviderData;
use crate::resources::clusters::cluster_schema::{
    cluster_fields, cluster_obj, computed_nodes_block,
};

#[derive(Default)]
pub struct ClustersDataSource {
    provider_data: Option<NutanixProviderData>,
}

impl ClustersDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for ClustersDataSource {
    fn type_name(&self) -> &str {
        "nutanix_clusters_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let entity = SchemaBuilder::new()
            .attribute(computed("ext_id", AttributeType::String))
            .attribute(computed("name", AttributeType::String))
            .block(computed_nodes_block());

        let builder = SchemaBuilder::new()
            .version(0)
            .description("Lists the clusters registered with Prism Central")
            .attribute(computed("id", AttributeType::String))
            .attribute(
                AttributeBuilder::new("expand", AttributeType::String)
                    .description("Related entities to expand")
                    .optional()
                    .build(),
            )
            .attribute(computed("total_available_results", AttributeType::Number))
            .block(entity_list_block(
                "cluster_entities",
                cluster_fields(entity, Mode::Computed),
            ));

        DataSourceSchemaResponse {
            schema: list_params_fields(builder).build(),
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadDataSourceResponse::failed(diagnostics);
        };

        let params = list_params(Attrs::of(&request.config));
        debug!(?params, "listing clusters");

        match data.client.clustermgmt().clusters().list(&params).await {
            Ok(page) => {
                let entities: Vec<Obj> = page
                    .clusters
                    .iter()
                    .map(|cluster| cluster_obj(cluster, None))
                    .collect();
                let read = Obj::new()
                    .set("id", random_id())
                    .set("total_available_results", page.total_available_results)
                    .set("cluster_entities", entities.into_dynamic());
                ReadDataSourceResponse {
                    state: data_source_state(&request.config, read),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("error while fetching clusters", &e));
                ReadDataSourceResponse::failed(diagnostics)
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for ClustersDataSource {
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

#[path = "./data_source_clusters_test.rs"]
mod data_source_clusters_test;
