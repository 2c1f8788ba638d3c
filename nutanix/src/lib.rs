pub mod api;
pub mod common;
pub mod config;
pub mod data_sources;
pub mod enums;
pub mod provider_data;
pub mod resources;
pub mod tasks;

use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::context::Context;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderSchemaRequest, ProviderSchemaResponse, ResourceFactory,
    ValidateProviderConfigRequest, ValidateProviderConfigResponse,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic};
use tfplug::validator::NumberRange;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::provider_data::NutanixProviderData;

pub struct NutanixProvider {
    provider_data: Option<NutanixProviderData>,
}

impl Default for NutanixProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl NutanixProvider {
    pub fn new() -> Self {
        Self {
            provider_data: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider_data.is_some()
    }
}

macro_rules! factories {
    ($trait:ident: $($name:literal => $ty:path),+ $(,)?) => {{
        let mut factories: HashMap<String, Box<dyn Fn() -> Box<dyn $trait> + Send + Sync>> =
            HashMap::new();
        $(
            factories.insert(
                $name.to_string(),
                Box::new(|| Box::new(<$ty>::new()) as Box<dyn $trait>),
            );
        )+
        factories
    }};
}

#[async_trait]
impl Provider for NutanixProvider {
    fn type_name(&self) -> &str {
        "nutanix"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Nutanix Prism Central v4 cluster management")
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .description("Prism Central address, or NUTANIX_ENDPOINT")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("port", AttributeType::Number)
                    .description("Prism Central port, or NUTANIX_PORT. Defaults to 9440")
                    .optional()
                    .validator(NumberRange::create(Some(1.0), Some(65535.0)))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .description("User name, or NUTANIX_USERNAME")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .description("Password, or NUTANIX_PASSWORD")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("insecure", AttributeType::Bool)
                    .description("Skip TLS certificate verification, or NUTANIX_INSECURE")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("wait_timeout", AttributeType::Number)
                    .description("Minutes to wait for a task, or NUTANIX_WAIT_TIMEOUT")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("proxy_url", AttributeType::String)
                    .description("HTTP proxy for API calls, or NUTANIX_PROXY_URL")
                    .optional()
                    .build(),
            )
            .build();

        schema.into()
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let config = match ProviderConfig::resolve(&request.config) {
            Ok(config) => config,
            Err(diagnostics) => return ConfigureProviderResponse::failed(diagnostics),
        };
        debug!(?config, "resolved provider configuration");

        match NutanixProviderData::from_config(&config) {
            Ok(data) => {
                info!(endpoint = %config.endpoint, port = config.port, "provider configured");
                self.provider_data = Some(data.clone());
                ConfigureProviderResponse::configured(data)
            }
            Err(e) => ConfigureProviderResponse::failed(vec![Diagnostic::error(
                "Failed to create API client",
                e,
            )]),
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        let mut diagnostics = vec![];

        if let Some(minutes) = request
            .config
            .get_optional_number(&AttributePath::new("wait_timeout"))
        {
            if minutes <= 0.0 {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid wait_timeout",
                        "wait_timeout must be a positive number of minutes",
                    )
                    .with_attribute(AttributePath::new("wait_timeout")),
                );
            }
        }

        ValidateProviderConfigResponse { diagnostics }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        factories!(ResourceWithConfigure:
            "nutanix_cluster_v2" => resources::clusters::ClusterResource,
            "nutanix_cluster_add_node_v2" => resources::clusters::ClusterAddNodeResource,
            "nutanix_cluster_categories_v2" => resources::clusters::ClusterCategoriesResource,
            "nutanix_ssl_certificate_v2" => resources::clusters::SslCertificateResource,
            "nutanix_clusters_discover_unconfigured_nodes_v2" =>
                resources::clusters::ClusterDiscoverNodesResource,
            "nutanix_clusters_unconfigured_node_networks_v2" =>
                resources::clusters::ClusterNodeNetworksResource,
            "nutanix_storage_containers_v2" => resources::storage::StorageContainerResource,
            "nutanix_cluster_profile_v2" => resources::profiles::ClusterProfileResource,
            "nutanix_cluster_profile_association_v2" =>
                resources::profiles::ClusterProfileAssociationResource,
            "nutanix_pc_registration_v2" => resources::prism::PcRegistrationResource,
        )
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        factories!(DataSourceWithConfigure:
            "nutanix_cluster_v2" => data_sources::ClusterDataSource,
            "nutanix_clusters_v2" => data_sources::ClustersDataSource,
            "nutanix_host_v2" => data_sources::HostDataSource,
            "nutanix_hosts_v2" => data_sources::HostsDataSource,
            "nutanix_ssl_certificate_v2" => data_sources::SslCertificateDataSource,
            "nutanix_storage_container_v2" => data_sources::StorageContainerDataSource,
            "nutanix_storage_containers_v2" => data_sources::StorageContainersDataSource,
            "nutanix_storage_container_stats_info_v2" =>
                data_sources::StorageContainerStatsDataSource,
            "nutanix_cluster_profile_v2" => data_sources::ClusterProfileDataSource,
            "nutanix_cluster_profiles_v2" => data_sources::ClusterProfilesDataSource,
        )
    }
}
