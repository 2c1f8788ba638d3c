//! Cluster profiles list data source implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{AttributeType, SchemaBuilder};
use tracing::debug;

use super::{data_source_state, entity_list_block, list_params, list_params_fields};
use crate::common::schema::{computed, Mode};
use crate::common::{api_error, not_configured, random_id, Attrs, IntoDynamic, Obj};
use crate::provider_data::NutanixProviderData;
use crate::resources::profiles::resource_cluster_profile::{
    cluster_profile_fields, cluster_profile_obj,
};

#[derive(Default)]
pub struct ClusterProfilesDataSource {
    provider_data: Option<NutanixProviderData>,
}

impl ClusterProfilesDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for ClusterProfilesDataSource {
    fn type_name(&self) -> &str {
        "nutanix_cluster_profiles_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let entity = cluster_profile_fields(
            SchemaBuilder::new().attribute(computed("ext_id", AttributeType::String)),
            Mode::Computed,
        );

        let builder = SchemaBuilder::new()
            .version(0)
            .description("Lists cluster profiles")
            .attribute(computed("id", AttributeType::String))
            .block(entity_list_block("cluster_profiles", entity));

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
        debug!(?params, "listing cluster profiles");

        match data
            .client
            .clustermgmt()
            .cluster_profiles()
            .list(&params)
            .await
        {
            Ok(profiles) => {
                let entities: Vec<Obj> = profiles
                    .iter()
                    .map(|profile| cluster_profile_obj(profile, None))
                    .collect();
                let read = Obj::new()
                    .set("id", random_id())
                    .set("cluster_profiles", entities.into_dynamic());
                ReadDataSourceResponse {
                    state: data_source_state(&request.config, read),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("error while fetching cluster profiles", &e));
                ReadDataSourceResponse::failed(diagnostics)
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for ClusterProfilesDataSource {
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

#[path = "./data_source_cluster_profiles_test.rs"]
mod data_source_cluster_profiles_test;
