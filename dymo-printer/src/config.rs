//! Print service configuration

use std::net::IpAddr;
use std::time::Duration;

use crate::client::DymoClient;
use crate::error::{PrintError, PrintResult};

/// DYMO Connect web service on its fixed loopback port
pub const DEFAULT_SERVICE_URL: &str = "https://127.0.0.1:41951/DYMO/DLS/Printing";

/// Upper bound for the `StatusConnected` probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound for a single `PrintLabel` submission
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay between consecutive labels of one batch
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// Configuration for talking to the local label print service
///
/// The service presents a self-signed certificate, so by default its identity
/// is not verified. That trust is only ever granted to loopback hosts:
/// [`PrintServiceConfig::validate`] rejects `trust_local_service` for anything
/// else.
#[derive(Debug, Clone)]
pub struct PrintServiceConfig {
    /// Service base URL (e.g., "https://127.0.0.1:41951/DYMO/DLS/Printing")
    pub base_url: String,

    /// Accept the service certificate without verification
    pub trust_local_service: bool,

    /// Status probe timeout
    pub probe_timeout: Duration,

    /// Label submission timeout
    pub submit_timeout: Duration,

    /// Pause between consecutive labels in a batch
    pub pacing: Duration,
}

impl PrintServiceConfig {
    /// Create a configuration for the given base URL with default timeouts
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            trust_local_service: true,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            pacing: DEFAULT_PACING,
        }
    }

    /// Enable or disable unconditional trust of the service certificate
    pub fn with_trust_local_service(mut self, trust: bool) -> Self {
        self.trust_local_service = trust;
        self
    }

    /// Set the status probe timeout
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the submission timeout
    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    /// Set the inter-label pacing delay
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Check the base URL and the trust setting
    pub fn validate(&self) -> PrintResult<()> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            PrintError::InvalidConfig(format!("Invalid service URL {}: {}", self.base_url, e))
        })?;

        match url.scheme() {
            "https" | "http" => {}
            other => {
                return Err(PrintError::InvalidConfig(format!(
                    "Unsupported URL scheme: {}",
                    other
                )));
            }
        }

        if self.trust_local_service && !is_loopback_host(url.host_str()) {
            return Err(PrintError::InvalidConfig(format!(
                "Certificate trust can only be disabled for loopback hosts, got {}",
                url.host_str().unwrap_or("<none>")
            )));
        }

        Ok(())
    }

    /// Create a transport client from this configuration
    pub fn build_client(&self) -> PrintResult<DymoClient> {
        DymoClient::new(self)
    }
}

impl Default for PrintServiceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_URL)
    }
}

fn is_loopback_host(host: Option<&str>) -> bool {
    let Some(host) = host else {
        return false;
    };

    // IPv6 hosts come back bracketed
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host.eq_ignore_ascii_case("localhost")
        || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}
