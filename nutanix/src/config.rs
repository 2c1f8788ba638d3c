//! Provider configuration: provider block first, then `NUTANIX_*` variables

use std::time::Duration;

use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use url::Url;

pub const DEFAULT_PORT: u16 = 9440;

pub const ENV_ENDPOINT: &str = "NUTANIX_ENDPOINT";
pub const ENV_PORT: &str = "NUTANIX_PORT";
pub const ENV_USERNAME: &str = "NUTANIX_USERNAME";
pub const ENV_PASSWORD: &str = "NUTANIX_PASSWORD";
pub const ENV_INSECURE: &str = "NUTANIX_INSECURE";
pub const ENV_WAIT_TIMEOUT: &str = "NUTANIX_WAIT_TIMEOUT";
pub const ENV_PROXY_URL: &str = "NUTANIX_PROXY_URL";
pub const ENV_HTTP_LOG: &str = "HTTP_LOG";

#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub insecure: bool,
    pub wait_timeout: Option<Duration>,
    pub proxy_url: Option<String>,
    pub http_log: bool,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &crate::api::common::REDACTED)
            .field("insecure", &self.insecure)
            .field("wait_timeout", &self.wait_timeout)
            .field("proxy_url", &self.proxy_url)
            .field("http_log", &self.http_log)
            .finish()
    }
}

impl ProviderConfig {
    /// Resolves every setting, collecting one diagnostic per missing or
    /// malformed value
    pub fn resolve(config: &DynamicValue) -> Result<Self, Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();

        let endpoint = required_string(config, "endpoint", ENV_ENDPOINT, &mut diagnostics);
        let username = required_string(config, "username", ENV_USERNAME, &mut diagnostics);
        let password = required_string(config, "password", ENV_PASSWORD, &mut diagnostics);

        let port = match config.get_optional_number(&AttributePath::new("port")) {
            Some(n) if n >= 1.0 && n <= u16::MAX as f64 && n.fract() == 0.0 => n as u16,
            Some(n) => {
                diagnostics.push(
                    Diagnostic::error("Invalid port", format!("{} is not a valid TCP port", n))
                        .with_attribute(AttributePath::new("port")),
                );
                DEFAULT_PORT
            }
            None => match env_value(ENV_PORT) {
                Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                    diagnostics.push(Diagnostic::error(
                        "Invalid port",
                        format!("{}={} is not a valid TCP port", ENV_PORT, raw),
                    ));
                    DEFAULT_PORT
                }),
                None => DEFAULT_PORT,
            },
        };

        let insecure = config
            .get_optional_bool(&AttributePath::new("insecure"))
            .or_else(|| env_bool(ENV_INSECURE))
            .unwrap_or(false);

        let wait_timeout = match config.get_optional_number(&AttributePath::new("wait_timeout")) {
            Some(minutes) if minutes > 0.0 => Some(Duration::from_secs_f64(minutes * 60.0)),
            Some(_) => {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid wait_timeout",
                        "wait_timeout must be a positive number of minutes",
                    )
                    .with_attribute(AttributePath::new("wait_timeout")),
                );
                None
            }
            None => env_value(ENV_WAIT_TIMEOUT).and_then(|raw| match raw.parse::<u64>() {
                Ok(minutes) if minutes > 0 => Some(Duration::from_secs(minutes * 60)),
                _ => {
                    diagnostics.push(Diagnostic::error(
                        "Invalid wait_timeout",
                        format!("{}={} is not a positive number of minutes", ENV_WAIT_TIMEOUT, raw),
                    ));
                    None
                }
            }),
        };

        let proxy_url = config
            .get_optional_string(&AttributePath::new("proxy_url"))
            .or_else(|| env_value(ENV_PROXY_URL));
        if let Some(proxy) = &proxy_url {
            if let Err(e) = Url::parse(proxy) {
                diagnostics.push(
                    Diagnostic::error("Invalid proxy_url", format!("{}: {}", proxy, e))
                        .with_attribute(AttributePath::new("proxy_url")),
                );
            }
        }

        let http_log = env_bool(ENV_HTTP_LOG).unwrap_or(false);

        match (endpoint, username, password) {
            (Some(endpoint), Some(username), Some(password)) if diagnostics.is_empty() => {
                Ok(Self {
                    endpoint,
                    port,
                    username,
                    password,
                    insecure,
                    wait_timeout,
                    proxy_url,
                    http_log,
                })
            }
            _ => Err(diagnostics),
        }
    }

    /// `https://{endpoint}:{port}/api`. An endpoint that already carries a
    /// scheme keeps it, and its own port when it has one.
    pub fn base_url(&self) -> Result<String, String> {
        let raw = if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else {
            format!("https://{}", self.endpoint)
        };
        let mut url = Url::parse(&raw).map_err(|e| format!("invalid endpoint {}: {}", raw, e))?;
        if url.port().is_none() {
            url.set_port(Some(self.port))
                .map_err(|_| format!("cannot set port on endpoint {}", raw))?;
        }
        url.set_path("/api");
        Ok(url.as_str().trim_end_matches('/').to_string())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
    env_value(name).and_then(|v| match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    })
}

fn required_string(
    config: &DynamicValue,
    attribute: &str,
    env: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    let value = config
        .get_optional_string(&AttributePath::new(attribute))
        .or_else(|| env_value(env));
    if value.is_none() {
        diagnostics.push(
            Diagnostic::error(
                format!("Missing {}", attribute),
                format!(
                    "{} is required (set in provider config or {} env var)",
                    attribute, env
                ),
            )
            .with_attribute(AttributePath::new(attribute)),
        );
    }
    value
}
