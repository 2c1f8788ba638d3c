pub mod resource_cluster_profile;
pub mod resource_cluster_profile_association;

pub use resource_cluster_profile::ClusterProfileResource;
pub use resource_cluster_profile_association::ClusterProfileAssociationResource;
