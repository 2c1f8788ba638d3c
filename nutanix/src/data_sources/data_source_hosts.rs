//! Hosts list data source implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tracing::debug;

use super::data_source_host::{host_fields, host_obj};
use super::{data_source_state, entity_list_block, list_params, list_params_fields};
use crate::common::schema::computed;
use crate::common::{api_error, not_configured, random_id, Attrs, IntoDynamic, Obj};
use crate::provider_data::NutanixProviderData;

#[derive(Default)]
pub struct HostsDataSource {
    provider_data: Option<NutanixProviderData>,
}

impl HostsDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for HostsDataSource {
    fn type_name(&self) -> &str {
        "nutanix_hosts_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let entity = host_fields(
            SchemaBuilder::new().attribute(computed("ext_id", AttributeType::String)),
        );

        let builder = SchemaBuilder::new()
            .version(0)
            .description("Lists hosts across all clusters, or of a single cluster")
            .attribute(computed("id", AttributeType::String))
            .attribute(
                AttributeBuilder::new("cluster_ext_id", AttributeType::String)
                    .description("Only list the hosts of this cluster")
                    .optional()
                    .build(),
            )
            .block(entity_list_block("host_entities", entity));

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

        let attrs = Attrs::of(&request.config);
        let cluster_ext_id = attrs.str("cluster_ext_id");
        let params = list_params(attrs);
        debug!(cluster = ?cluster_ext_id, ?params, "listing hosts");

        match data
            .client
            .clustermgmt()
            .clusters()
            .list_hosts(cluster_ext_id.as_deref(), &params)
            .await
        {
            Ok(hosts) => {
                let entities: Vec<Obj> = hosts.iter().map(host_obj).collect();
                let read = Obj::new()
                    .set("id", random_id())
                    .set("host_entities", entities.into_dynamic());
                ReadDataSourceResponse {
                    state: data_source_state(&request.config, read),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("error while fetching hosts", &e));
                ReadDataSourceResponse::failed(diagnostics)
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for HostsDataSource {
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

#[path = "./data_source_hosts_test.rs"]
mod data_source_hosts_test;
