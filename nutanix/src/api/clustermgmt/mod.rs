//! `clustermgmt` namespace of the v4 API

pub mod cluster_profiles;
pub mod clusters;
pub mod ssl_certificates;
pub mod storage_containers;

use crate::api::client::Client;

pub(crate) const CONFIG_BASE: &str = "/clustermgmt/v4.0/config";
pub(crate) const STATS_BASE: &str = "/clustermgmt/v4.0/stats";

pub struct ClusterMgmtApi<'a> {
    client: &'a Client,
}

impl<'a> ClusterMgmtApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn clusters(&self) -> clusters::ClustersApi<'a> {
        clusters::ClustersApi::new(self.client)
    }

    pub fn storage_containers(&self) -> storage_containers::StorageContainersApi<'a> {
        storage_containers::StorageContainersApi::new(self.client)
    }

    pub fn cluster_profiles(&self) -> cluster_profiles::ClusterProfilesApi<'a> {
        cluster_profiles::ClusterProfilesApi::new(self.client)
    }

    pub fn ssl_certificates(&self) -> ssl_certificates::SslCertificatesApi<'a> {
        ssl_certificates::SslCertificatesApi::new(self.client)
    }
}
