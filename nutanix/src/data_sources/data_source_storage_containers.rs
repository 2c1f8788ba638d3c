//! Storage containers list data source implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{AttributeType, SchemaBuilder};
use tracing::debug;

use super::data_source_storage_container::storage_container_fields;
use super::{data_source_state, entity_list_block, list_params, list_params_fields};
use crate::common::schema::computed;
use crate::common::{api_error, not_configured, random_id, Attrs, IntoDynamic, Obj};
use crate::provider_data::NutanixProviderData;
use crate::resources::storage::resource_storage_container::storage_container_obj;

#[derive(Default)]
pub struct StorageContainersDataSource {
    provider_data: Option<NutanixProviderData>,
}

impl StorageContainersDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for StorageContainersDataSource {
    fn type_name(&self) -> &str {
        "nutanix_storage_containers_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let entity = storage_container_fields(
            SchemaBuilder::new().attribute(computed("ext_id", AttributeType::String)),
        );

        let builder = SchemaBuilder::new()
            .version(0)
            .description("Lists storage containers")
            .attribute(computed("id", AttributeType::String))
            .block(entity_list_block("storage_containers", entity));

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
        debug!(?params, "listing storage containers");

        match data
            .client
            .clustermgmt()
            .storage_containers()
            .list(&params)
            .await
        {
            Ok(containers) => {
                let entities: Vec<Obj> = containers.iter().map(storage_container_obj).collect();
                let read = Obj::new()
                    .set("id", random_id())
                    .set("storage_containers", entities.into_dynamic());
                ReadDataSourceResponse {
                    state: data_source_state(&request.config, read),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("error while fetching storage containers", &e));
                ReadDataSourceResponse::failed(diagnostics)
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for StorageContainersDataSource {
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

#[path = "./data_source_storage_containers_test.rs"]
mod data_source_storage_containers_test;
