pub mod clusters;
pub mod prism;
pub mod profiles;
pub mod storage;
