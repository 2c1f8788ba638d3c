pub mod resource_pc_registration;

pub use resource_pc_registration::PcRegistrationResource;
