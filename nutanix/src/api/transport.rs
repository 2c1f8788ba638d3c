//! reqwest client construction and per-client request counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::error::ApiError;

/// Knobs for the underlying reqwest client. Prism Central is a single host,
/// so the idle pool is per host.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub insecure: bool,
    pub proxy_url: Option<String>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_idle_per_host: usize,
    pub tcp_keepalive: Option<Duration>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            insecure: false,
            proxy_url: None,
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(90),
            max_idle_per_host: 10,
            tcp_keepalive: Some(Duration::from_secs(30)),
        }
    }
}

impl HttpSettings {
    pub fn build(&self) -> Result<reqwest::Client, ApiError> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(self.insecure)
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(self.idle_timeout)
            .pool_max_idle_per_host(self.max_idle_per_host)
            .tcp_keepalive(self.tcp_keepalive);

        if let Some(url) = self.proxy_url.as_deref().filter(|u| !u.is_empty()) {
            let proxy = reqwest::Proxy::all(url)
                .map_err(|e| ApiError::InvalidConfig(format!("proxy_url {}: {}", url, e)))?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| ApiError::InvalidConfig(format!("cannot build HTTP client: {}", e)))
    }
}

/// Snapshot of [`RequestCounters`]
#[derive(Debug, Default, Clone)]
pub struct RequestStats {
    pub total_requests: u64,
    pub failed_requests: u64,
    pub last_request: Option<Instant>,
}

#[derive(Debug, Default)]
pub struct RequestCounters {
    total: AtomicU64,
    failed: AtomicU64,
    last: Mutex<Option<Instant>>,
}

impl RequestCounters {
    /// Counts one HTTP exchange. Retries count separately.
    pub fn record(&self, success: bool) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        if let Ok(mut last) = self.last.lock() {
            *last = Some(Instant::now());
        }
    }

    pub fn snapshot(&self) -> RequestStats {
        RequestStats {
            total_requests: self.total.load(Ordering::Relaxed),
            failed_requests: self.failed.load(Ordering::Relaxed),
            last_request: self.last.lock().ok().and_then(|last| *last),
        }
    }
}
