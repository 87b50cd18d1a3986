use std::fs;

use serde_derive::Deserialize;

use ilma_data::clusters::diagnostic_logs::MAX_LOG_CONTENT_SIZE;
use ilma_data::EndpointId;

fn default_endpoints() -> Vec<EndpointId> {
    vec![1]
}

fn default_content_size() -> usize {
    MAX_LOG_CONTENT_SIZE
}

/// Node served by the `invoke` command
#[derive(Debug, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<EndpointId>,
    /// Largest log content returned in a response
    #[serde(default = "default_content_size")]
    pub log_content_size: usize,
    #[serde(default)]
    pub log_providers: Vec<LogProviderConfig>,
}

/// Log file served for one endpoint
#[derive(Debug, Deserialize, PartialEq)]
pub struct LogProviderConfig {
    pub endpoint: EndpointId,
    pub path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            log_content_size: default_content_size(),
            log_providers: Vec::new(),
        }
    }
}

pub fn read_config(file_path: &str) -> Option<Config> {
    match fs::read(file_path) {
        Ok(bytes) => match toml::from_str::<Config>(&String::from_utf8_lossy(bytes.as_slice())) {
            Ok(config) => Some(config),
            Err(error) => {
                log::warn!("Invalid configuration {}, {}", file_path, error);
                None
            }
        },
        Err(error) => {
            log::warn!("Failed to read {}, {}", file_path, error);
            None
        }
    }
}
