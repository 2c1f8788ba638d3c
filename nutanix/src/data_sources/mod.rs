//! Data source implementations

pub mod data_source_cluster;
pub mod data_source_cluster_profile;
pub mod data_source_cluster_profiles;
pub mod data_source_clusters;
pub mod data_source_host;
pub mod data_source_hosts;
pub mod data_source_ssl_certificate;
pub mod data_source_storage_container;
pub mod data_source_storage_container_stats;
pub mod data_source_storage_containers;

pub use data_source_cluster::ClusterDataSource;
pub use data_source_cluster_profile::ClusterProfileDataSource;
pub use data_source_cluster_profiles::ClusterProfilesDataSource;
pub use data_source_clusters::ClustersDataSource;
pub use data_source_host::HostDataSource;
pub use data_source_hosts::HostsDataSource;
pub use data_source_ssl_certificate::SslCertificateDataSource;
pub use data_source_storage_container::StorageContainerDataSource;
pub use data_source_storage_container_stats::StorageContainerStatsDataSource;
pub use data_source_storage_containers::StorageContainersDataSource;

use tfplug::schema::{AttributeBuilder, AttributeType, NestedBlock, SchemaBuilder};
use tfplug::types::DynamicValue;

use crate::api::common::ListParams;
use crate::common::{Attrs, Obj};

/// OData list options; the API applies them, nothing is filtered locally
pub(crate) fn list_params_fields(builder: SchemaBuilder) -> SchemaBuilder {
    let optional = |name: &str, kind: AttributeType, description: &str| {
        AttributeBuilder::new(name, kind)
            .description(description)
            .optional()
            .build()
    };
    builder
        .attribute(optional("page", AttributeType::Number, "Page of the result set, starting at 0"))
        .attribute(optional("limit", AttributeType::Number, "Number of records per page"))
        .attribute(optional("filter", AttributeType::String, "OData filter expression"))
        .attribute(optional("order_by", AttributeType::String, "OData orderby expression"))
        .attribute(optional("apply", AttributeType::String, "OData apply expression"))
        .attribute(optional("select", AttributeType::String, "OData select expression"))
}

pub(crate) fn list_params(attrs: Attrs<'_>) -> ListParams {
    ListParams {
        page: attrs.i64("page"),
        limit: attrs.i64("limit"),
        filter: attrs.str("filter"),
        order_by: attrs.str("order_by"),
        apply: attrs.str("apply"),
        select: attrs.str("select"),
        expand: attrs.str("expand"),
    }
}

/// Read-only list whose elements carry the attributes of `entity`
pub(crate) fn entity_list_block(name: &str, entity: SchemaBuilder) -> NestedBlock {
    NestedBlock::list(name, entity.build().block)
}

/// The configuration with everything read from the API on top
pub(crate) fn data_source_state(config: &DynamicValue, read: Obj) -> DynamicValue {
    let mut state = config.clone();
    read.merge_into(&mut state);
    state
}
