use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::convert::ConvertConfig;
use crate::logging::LoggingConfig;
use crate::transform::TransformConfig;
use crate::traverse::TraversalConfig;

/// Everything a run needs except the API key. Every field has a default, so an empty
/// YAML file is a valid config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub traversal: TraversalSection,
    pub transform: TransformConfig,
    pub convert: ConvertConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalSection {
    pub input_root: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub delay_secs: u64,
}

impl Default for TraversalSection {
    fn default() -> Self {
        Self {
            input_root: None,
            output_root: None,
            delay_secs: 30,
        }
    }
}

impl TraversalSection {
    /// `None` until both roots are known.
    pub fn to_traversal_config(&self) -> Option<TraversalConfig> {
        Some(TraversalConfig {
            input_root: self.input_root.clone()?,
            output_root: self.output_root.clone()?,
            directory_delay: Duration::from_secs(self.delay_secs),
        })
    }
}

impl Config {
    pub fn trace_loaded(&self) {
        info!(
            input_root = ?self.traversal.input_root,
            output_root = ?self.traversal.output_root,
            delay_secs = self.traversal.delay_secs,
            backend = %self.transform.backend,
            model = self.transform.model(),
            "Loaded Config"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}
