//! Provider data structure passed to resources and data sources

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tfplug::types::Diagnostic;

use crate::api::{Client, ClientOptions};
use crate::config::ProviderConfig;
use crate::tasks::{TaskWaiter, DEFAULT_TIMEOUT};

#[derive(Clone)]
pub struct NutanixProviderData {
    pub client: Client,
    pub waiter: TaskWaiter,
    wait_timeout: Option<Duration>,
}

impl NutanixProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            waiter: TaskWaiter::new(client.clone()),
            client,
            wait_timeout: None,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, String> {
        let base_url = config.base_url()?;
        let client = Client::with_options(
            &base_url,
            &config.username,
            &config.password,
            ClientOptions {
                insecure: config.insecure,
                proxy_url: config.proxy_url.clone(),
                http_log: config.http_log,
                ..Default::default()
            },
        )
        .map_err(|e| e.to_string())?;
        Ok(Self::new(client).with_wait_timeout(config.wait_timeout))
    }

    pub fn with_wait_timeout(mut self, wait_timeout: Option<Duration>) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    pub fn with_waiter(mut self, waiter: TaskWaiter) -> Self {
        self.waiter = waiter;
        self
    }

    /// Recovers the data handed out by `NutanixProvider::configure`
    pub fn from_any(data: Option<Arc<dyn Any + Send + Sync>>) -> Result<Self, Diagnostic> {
        let data = data.ok_or_else(|| {
            Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            )
        })?;
        data.downcast_ref::<NutanixProviderData>()
            .cloned()
            .ok_or_else(|| {
                Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract NutanixProviderData from provider data",
                )
            })
    }

    /// How long to wait on a task; `wait_timeout` overrides the default
    pub fn timeout(&self) -> Duration {
        self.wait_timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}
