use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "https://api.lsshmx.shop";
pub const DEFAULT_LOG_FILTER: &str = "worker_console=info";

const LOG_FILE_NAME: &str = "worker-console.log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown WORKER_TRANSPORT: {0} (expected 'rest' or 'graphql')")]
    UnknownTransport(String),
}

/// Which worker binding to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    #[default]
    Rest,
    GraphQL,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Rest => "rest",
            TransportKind::GraphQL => "graphql",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "rest" => Some(TransportKind::Rest),
            "graphql" => Some(TransportKind::GraphQL),
            _ => None,
        }
    }
}

/// Startup configuration. Read once; there is no runtime reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub transport: TransportKind,
    pub log_path: PathBuf,
}

impl Config {
    /// Resolve configuration from the process environment.
    ///
    /// - `WORKER_API_BASE_URL`, else `WORKER_GRAPHQL_ENDPOINT`, else [`DEFAULT_API_BASE_URL`]
    /// - `WORKER_TRANSPORT`: `rest` (default) or `graphql`
    /// - `WORKER_CONSOLE_LOG`: log file path
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base = std::env::var("WORKER_API_BASE_URL").ok();
        let graphql_endpoint = std::env::var("WORKER_GRAPHQL_ENDPOINT").ok();
        let transport = std::env::var("WORKER_TRANSPORT").ok();
        let log_path = std::env::var("WORKER_CONSOLE_LOG").ok();

        Ok(Self {
            base_url: resolve_base_url(api_base.as_deref(), graphql_endpoint.as_deref()),
            transport: parse_transport(transport.as_deref())?,
            log_path: resolve_log_path(log_path.as_deref()),
        })
    }
}

/// First non-blank override wins; trailing slashes are stripped.
pub fn resolve_base_url(api_base: Option<&str>, graphql_endpoint: Option<&str>) -> String {
    [api_base, graphql_endpoint]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(|value| value.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

pub fn parse_transport(raw: Option<&str>) -> Result<TransportKind, ConfigError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(TransportKind::default()),
        Some(value) => TransportKind::from_str(value).ok_or_else(|| ConfigError::UnknownTransport(value.to_string())),
    }
}

pub fn resolve_log_path(raw: Option<&str>) -> PathBuf {
    if let Some(path) = raw.map(str::trim).filter(|s| !s.is_empty()) {
        return PathBuf::from(path);
    }

    dirs::data_local_dir()
        .map(|dir| dir.join("worker-console"))
        .unwrap_or_else(std::env::temp_dir)
        .join(LOG_FILE_NAME)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
