use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::codegen::emit::{DEFAULT_MODEL_HEADER, EmitOptions};
use crate::codegen::oracle::{OracleKind, OracleSpec};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PncConfig {
    #[serde(default)]
    pub oracle: OracleKind,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_model_header")]
    pub model_header: String,
    #[serde(default = "default_diagnostics")]
    pub diagnostics: bool,
}

impl Default for PncConfig {
    fn default() -> Self {
        Self {
            oracle: OracleKind::default(),
            seed: default_seed(),
            model_header: default_model_header(),
            diagnostics: default_diagnostics(),
        }
    }
}

impl PncConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: PncConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    pub fn oracle_spec(&self) -> OracleSpec {
        OracleSpec::new(self.oracle, self.seed)
    }

    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            model_header: self.model_header.clone(),
        }
    }
}

// Fixed so that two runs over the same net produce the same files.
fn default_seed() -> u64 {
    0x7065_7270_6574_7575
}

fn default_model_header() -> String {
    DEFAULT_MODEL_HEADER.to_string()
}

fn default_diagnostics() -> bool {
    true
}
