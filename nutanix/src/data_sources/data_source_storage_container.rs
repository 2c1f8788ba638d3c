//! Storage container data source implementation

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
use crate::common::schema::{computed, ip_or_fqdn_list_block, links_block, Mode};
use crate::common::{api_error, not_configured, Attrs};
use crate::provider_data::NutanixProviderData;
use crate::resources::storage::resource_storage_container::storage_container_obj;

/// Read-only attributes of a storage container, shared with the list data source
pub(crate) fn storage_container_fields(builder: SchemaBuilder) -> SchemaBuilder {
    let numbers = [
        "max_capacity_bytes",
        "logical_explicit_reserved_capacity_bytes",
        "logical_implicit_reserved_capacity_bytes",
        "logical_advertised_capacity_bytes",
        "replication_factor",
        "erasure_code_delay_secs",
        "compression_delay_secs",
    ];
    let strings = [
        "tenant_id",
        "container_ext_id",
        "owner_ext_id",
        "name",
        "cluster_ext_id",
        "storage_pool_ext_id",
        "erasure_code",
        "cache_deduplication",
        "on_disk_dedup",
        "affinity_host_ext_id",
        "cluster_name",
    ];
    let bools = [
        "is_marked_for_removal",
        "is_inline_ec_enabled",
        "has_higher_ec_fault_domain_preference",
        "is_compression_enabled",
        "is_internal",
        "is_software_encryption_enabled",
        "is_encrypted",
    ];

    let builder = builder
        .block(links_block())
        .block(ip_or_fqdn_list_block("nfs_whitelist_addresses", Mode::Computed));
    let builder = numbers.iter().fold(builder, |b, name| {
        b.attribute(computed(name, AttributeType::Number))
    });
    let builder = strings.iter().fold(builder, |b, name| {
        b.attribute(computed(name, AttributeType::String))
    });
    bools.iter().fold(builder, |b, name| {
        b.attribute(computed(name, AttributeType::Bool))
    })
}

#[derive(Default)]
pub struct StorageContainerDataSource {
    provider_data: Option<NutanixProviderData>,
}

impl StorageContainerDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for StorageContainerDataSource {
    fn type_name(&self) -> &str {
        "nutanix_storage_container_v2"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let builder = SchemaBuilder::new()
            .version(0)
            .description("Reads a storage container")
            .attribute(computed("id", AttributeType::String))
            .attribute(
                AttributeBuilder::new("ext_id", AttributeType::String)
                    .description("Identifier of the storage container")
                    .required()
                    .build(),
            );

        DataSourceSchemaResponse {
            schema: storage_container_fields(builder).build(),
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
                Diagnostic::error("Missing storage container id", "ext_id must be set")
                    .with_attribute(AttributePath::new("ext_id")),
            );
            return ReadDataSourceResponse::failed(diagnostics);
        };
        debug!(ext_id = %ext_id, "reading storage container");

        match data
            .client
            .clustermgmt()
            .storage_containers()
            .get(&ext_id)
            .await
        {
            Ok(versioned) => ReadDataSourceResponse {
                state: data_source_state(
                    &request.config,
                    storage_container_obj(&versioned.data)
                        .set("id", ext_id.as_str())
                        .set("ext_id", ext_id.as_str()),
                ),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(api_error("error while fetching storage container", &e));
                ReadDataSourceResponse::failed(diagnostics)
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for StorageContainerDataSource {
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

#[path = "./data_source_storage_container_test.rs"]
mod data_source_storage_container_test;
