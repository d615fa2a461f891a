// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed
//! programmatically.
//!
//! # TOML Format
//! ```toml
//! model_path = "./models/classifier.json"
//! enable_cache = true
//! batch_size = 1
//! workspace_limit = "256M"
//! enable_fp16 = true
//! warmup_passes = 10
//! ```

use crate::builder::BuilderOptions;
use crate::RuntimeError;
use accel_device::WorkspaceBudget;
use std::path::{Path, PathBuf};

/// Configuration for one inference engine instance.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Path to the portable network description (JSON).
    pub model_path: PathBuf,
    /// Whether to load/persist the compiled plan next to the description.
    #[serde(default = "default_true")]
    pub enable_cache: bool,
    /// Batch size used to bind a symbolic leading dimension. Ignored when
    /// the description declares a concrete batch.
    #[serde(default = "default_batch")]
    pub batch_size: usize,
    /// Workspace memory ceiling for plan compilation (human-readable,
    /// e.g., `"256M"`).
    #[serde(default = "default_workspace")]
    pub workspace_limit: String,
    /// Whether to request reduced-precision execution. Only takes effect
    /// when the device reports fast-fp16 support.
    #[serde(default = "default_true")]
    pub enable_fp16: bool,
    /// Number of synthetic warmup cycles run during init.
    #[serde(default = "default_warmup")]
    pub warmup_passes: usize,
}

fn default_true() -> bool {
    true
}

fn default_batch() -> usize {
    1
}

fn default_workspace() -> String {
    "256M".to_string()
}

fn default_warmup() -> usize {
    10
}

impl RuntimeConfig {
    /// Creates a config for the given description path with defaults
    /// everywhere else.
    pub fn for_model(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Default::default()
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, RuntimeError> {
        toml::from_str(toml_str)
            .map_err(|e| RuntimeError::Config(format!("TOML parse error: {e}")))
    }

    /// Serializes configuration to TOML.
    pub fn to_toml(&self) -> Result<String, RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| RuntimeError::Config(format!("TOML serialize error: {e}")))
    }

    /// Resolves the builder options implied by this config.
    pub fn builder_options(&self) -> Result<BuilderOptions, RuntimeError> {
        if self.batch_size == 0 {
            return Err(RuntimeError::Config("batch_size must be non-zero".into()));
        }
        let workspace = WorkspaceBudget::parse(&self.workspace_limit)
            .map_err(|e| RuntimeError::Config(format!("invalid workspace_limit: {e}")))?;
        Ok(BuilderOptions {
            workspace,
            enable_fp16: self.enable_fp16,
        })
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/classifier.json"),
            enable_cache: true,
            batch_size: 1,
            workspace_limit: "256M".to_string(),
            enable_fp16: true,
            warmup_passes: 10,
        }
    }
}
