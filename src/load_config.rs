/// `load_config` module: reads the optional YAML config file and the API credential.
///
/// The YAML file holds no secrets. The credential comes from the environment only,
/// after `.env` has been loaded by `main`, and is handed to the transformer's constructor.
///
/// # Credential lookup
/// 1. `API_KEY`
/// 2. `OPENAI_API_KEY` or `GEMINI_API_KEY`, matching the selected backend
///
/// # Errors
/// All errors use `anyhow::Error` and surface at the CLI boundary.
use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::config::Config;
use crate::contract::Backend;

pub const API_KEY_VAR: &str = "API_KEY";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file deserialises to `null`, which serde_yaml rejects for a struct.
    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(Config::default());
    }

    match serde_yaml::from_str::<Config>(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

fn backend_key_var(backend: Backend) -> &'static str {
    match backend {
        Backend::OpenAi => "OPENAI_API_KEY",
        Backend::Gemini => "GEMINI_API_KEY",
    }
}

/// Reads the API credential for `backend` from the environment.
pub fn load_api_key(backend: Backend) -> Result<String> {
    let fallback = backend_key_var(backend);
    for var in [API_KEY_VAR, fallback] {
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => {
                info!(var, "API key found in env");
                return Ok(key.trim().to_string());
            }
            _ => continue,
        }
    }
    error!(backend = %backend, "No API key in environment");
    anyhow::bail!("{API_KEY_VAR} (or {fallback}) environment variable not set")
}
