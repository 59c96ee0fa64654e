use std::path::PathBuf;
use std::time::Duration;

use dymo_printer::{DEFAULT_SERVICE_URL, PrintServiceConfig, PreferencesStore};

/// Desk configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | DYMO_SERVICE_URL | https://127.0.0.1:41951/DYMO/DLS/Printing | DYMO Connect base URL |
/// | DYMO_TRUST_LOCAL_SERVICE | true | Skip certificate verification (loopback only) |
/// | DYMO_PROBE_TIMEOUT_MS | 5000 | Status probe timeout |
/// | DYMO_SUBMIT_TIMEOUT_MS | 10000 | Print request timeout |
/// | DYMO_PACING_MS | 500 | Delay between labels of a batch |
/// | DYMO_PREFERENCES_PATH | ~/.dymo_label_printer.json | Preferences file |
/// | LOG_LEVEL | info | Log level |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_DIR | - | Daily rotating log files go here when set |
#[derive(Debug, Clone)]
pub struct Config {
    pub service_url: String,
    pub trust_local_service: bool,
    pub probe_timeout_ms: u64,
    pub submit_timeout_ms: u64,
    pub pacing_ms: u64,
    pub preferences_path: PathBuf,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, using defaults for unset ones
    pub fn from_env() -> Self {
        Self {
            service_url: std::env::var("DYMO_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_SERVICE_URL.into()),
            trust_local_service: env_parse("DYMO_TRUST_LOCAL_SERVICE", true),
            probe_timeout_ms: env_parse("DYMO_PROBE_TIMEOUT_MS", 5000),
            submit_timeout_ms: env_parse("DYMO_SUBMIT_TIMEOUT_MS", 10000),
            pacing_ms: env_parse("DYMO_PACING_MS", 500),
            preferences_path: std::env::var_os("DYMO_PREFERENCES_PATH")
                .map(PathBuf::from)
                .or_else(PreferencesStore::default_path)
                .unwrap_or_else(|| PathBuf::from(".dymo_label_printer.json")),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    pub fn service_config(&self) -> PrintServiceConfig {
        PrintServiceConfig::new(&self.service_url)
            .with_trust_local_service(self.trust_local_service)
            .with_probe_timeout(Duration::from_millis(self.probe_timeout_ms))
            .with_submit_timeout(Duration::from_millis(self.submit_timeout_ms))
            .with_pacing(Duration::from_millis(self.pacing_ms))
    }

    pub fn preferences_store(&self) -> PreferencesStore {
        PreferencesStore::new(&self.preferences_path)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
