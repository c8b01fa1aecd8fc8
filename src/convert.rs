//! Markdown to OpenDocument conversion by shelling out to pandoc.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, error};

use crate::contract::{ConvertError, DocumentConverter};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// pandoc executable, looked up on PATH unless absolute.
    pub pandoc: PathBuf,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            pandoc: PathBuf::from("pandoc"),
        }
    }
}

pub struct PandocConverter {
    program: PathBuf,
}

impl PandocConverter {
    pub fn new(config: &ConvertConfig) -> Self {
        Self {
            program: config.pandoc.clone(),
        }
    }

    fn command(&self, markdown: &Path, document: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(markdown)
            .arg("--from")
            .arg("markdown")
            .arg("--to")
            .arg("odt")
            .arg("--output")
            .arg(document);
        cmd
    }
}

impl DocumentConverter for PandocConverter {
    fn convert(&self, markdown: &Path, document: &Path) -> Result<(), ConvertError> {
        debug!(
            program = %self.program.display(),
            markdown = %markdown.display(),
            document = %document.display(),
            "Running pandoc"
        );
        let output = self.command(markdown, document).output().map_err(|e| {
            error!(error = ?e, program = %self.program.display(), "Failed to launch pandoc");
            ConvertError::Launch {
                program: self.program.display().to_string(),
                source: e,
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(
                status = %output.status,
                stderr = %stderr,
                markdown = %markdown.display(),
                "pandoc exited with non-zero code"
            );
            return Err(ConvertError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }
        Ok(())
    }
}
