//! Cluster resources: the cluster itself, added nodes, categories, the SSL
//! certificate, and the node discovery and networking actions

pub(crate) mod cluster_schema;
pub(crate) mod nodes;
pub mod resource_cluster;
pub mod resource_cluster_add_node;
pub mod resource_cluster_categories;
pub mod resource_cluster_discover_nodes;
pub mod resource_cluster_node_networks;
pub mod resource_ssl_certificate;

pub use resource_cluster::ClusterResource;
pub use resource_cluster_add_node::ClusterAddNodeResource;
pub use resource_cluster_categories::ClusterCategoriesResource;
pub use resource_cluster_discover_nodes::ClusterDiscoverNodesResource;
pub use resource_cluster_node_networks::ClusterNodeNetworksResource;
pub use resource_ssl_certificate::SslCertificateResource;
