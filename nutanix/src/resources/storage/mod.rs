//! Storage container resources

pub mod resource_storage_container;

pub use resource_storage_container::StorageContainerResource;
