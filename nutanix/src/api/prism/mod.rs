//! `prism` namespace of the v4 API

pub mod domain_managers;
pub mod tasks;

use crate::api::client::Client;

pub(crate) const CONFIG_BASE: &str = "/prism/v4.0/config";

pub struct PrismApi<'a> {
    client: &'a Client,
}

impl<'a> PrismApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn tasks(&self) -> tasks::TasksApi<'a> {
        tasks::TasksApi::new(self.client)
    }

    pub fn domain_managers(&self) -> domain_managers::DomainManagersApi<'a> {
        domain_managers::DomainManagersApi::new(self.client)
    }
}
