// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON network description parsing and validation.
//!
//! The description names one NCHW input tensor and an ordered chain of
//! stages. A stage with a `name` exposes its result as an output binding;
//! the final stage must be named. A leading input dimension of `0` marks
//! a symbolic batch that the runtime binds before first use.
//!
//! # Format
//! ```json
//! {
//!   "name": "classifier",
//!   "input": { "name": "images", "dims": [1, 3, 224, 224] },
//!   "stages": [
//!     { "op": "scale", "factor": 0.00392156 },
//!     { "op": "relu" },
//!     { "name": "scores", "op": "pool", "outputs": 1000 }
//!   ]
//! }
//! ```

use crate::NetworkError;
use std::path::Path;

/// The input tensor specification.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputDef {
    /// Binding name for the input tensor (e.g., `"images"`).
    pub name: String,
    /// NCHW dimensions. `dims[0] == 0` marks a symbolic batch dimension
    /// that must be bound by the runtime before first use.
    pub dims: Vec<usize>,
}

impl InputDef {
    /// Returns `true` if the leading dimension is symbolic.
    pub fn has_dynamic_batch(&self) -> bool {
        self.dims.first() == Some(&0)
    }

    /// Returns the per-sample dimensions (everything after the batch).
    pub fn sample_dims(&self) -> &[usize] {
        &self.dims[1..]
    }

    /// Returns the number of elements in a single sample.
    pub fn sample_volume(&self) -> usize {
        self.sample_dims().iter().product()
    }
}

/// A single operation in the stage chain.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StageOp {
    /// Elementwise multiply by a constant factor.
    Scale { factor: f32 },
    /// Elementwise add a constant offset.
    Shift { offset: f32 },
    /// Elementwise `max(x, 0)`.
    Relu,
    /// Mean-pool each sample down to `outputs` values.
    Pool { outputs: usize },
    /// Softmax over each sample.
    Softmax,
}

impl StageOp {
    /// Short operation name for logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            StageOp::Scale { .. } => "scale",
            StageOp::Shift { .. } => "shift",
            StageOp::Relu => "relu",
            StageOp::Pool { .. } => "pool",
            StageOp::Softmax => "softmax",
        }
    }
}

/// One stage in the chain. A named stage exposes its result as an output
/// binding, discovered by the runtime after compilation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StageDef {
    /// Exposed output binding name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The operation.
    #[serde(flatten)]
    pub op: StageOp,
}

/// Top-level portable network description, deserialized from JSON.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NetworkDescription {
    /// Human-readable network name.
    pub name: String,
    /// The single input tensor.
    pub input: InputDef,
    /// Ordered stage chain.
    pub stages: Vec<StageDef>,
}

impl NetworkDescription {
    /// Loads a description from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, NetworkError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a description from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, NetworkError> {
        let desc: Self = serde_json::from_str(json)?;
        Ok(desc)
    }

    /// Serializes the description to pretty JSON.
    pub fn to_json(&self) -> Result<String, NetworkError> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }

    /// Validates that the description is internally consistent.
    ///
    /// Checks:
    /// - The input is rank-4 NCHW with non-zero non-batch dimensions.
    /// - At least one stage is defined, and the final stage is named.
    /// - Stage names are unique and distinct from the input name.
    /// - Pool stages request at least one output value.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.input.dims.len() != 4 {
            return Err(NetworkError::InvalidInput {
                input: self.input.name.clone(),
                detail: format!(
                    "expected rank-4 NCHW dims, got rank {}",
                    self.input.dims.len()
                ),
            });
        }
        if self.input.sample_dims().iter().any(|&d| d == 0) {
            return Err(NetworkError::InvalidInput {
                input: self.input.name.clone(),
                detail: "non-batch dimensions must be non-zero".into(),
            });
        }

        if self.stages.is_empty() {
            return Err(NetworkError::InvalidNetwork(
                "description contains no stages".into(),
            ));
        }
        let last = self.stages.last().expect("stages is non-empty");
        if last.name.is_none() {
            return Err(NetworkError::InvalidNetwork(
                "final stage must be named (it is the primary output)".into(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        seen.insert(self.input.name.as_str());
        for stage in &self.stages {
            if let Some(name) = &stage.name {
                if !seen.insert(name.as_str()) {
                    return Err(NetworkError::InvalidStage {
                        stage: name.clone(),
                        detail: "duplicate binding name".into(),
                    });
                }
            }
            if let StageOp::Pool { outputs } = stage.op {
                if outputs == 0 {
                    return Err(NetworkError::InvalidStage {
                        stage: stage.name.clone().unwrap_or_else(|| stage.op.kind().into()),
                        detail: "pool must produce at least one output".into(),
                    });
                }
            }
        }

        if self.input.has_dynamic_batch() {
            tracing::debug!(
                "network '{}' declares a symbolic batch dimension",
                self.name,
            );
        }

        Ok(())
    }

    /// Returns the number of exposed output bindings.
    pub fn num_outputs(&self) -> usize {
        self.stages.iter().filter(|s| s.name.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "name": "classifier",
            "input": { "name": "images", "dims": [1, 3, 224, 224] },
            "stages": [
                { "op": "scale", "factor": 0.00392156 },
                { "op": "shift", "offset": -0.5 },
                { "op": "relu" },
                { "name": "scores", "op": "pool", "outputs": 1000 }
            ]
        }"#
    }

    #[test]
    fn test_parse_description() {
        let d = NetworkDescription::from_json(sample_json()).unwrap();
        assert_eq!(d.name, "classifier");
        assert_eq!(d.input.dims, vec![1, 3, 224, 224]);
        assert_eq!(d.stages.len(), 4);
        assert_eq!(d.stages[0].op, StageOp::Scale { factor: 0.00392156 });
        assert_eq!(d.stages[3].name.as_deref(), Some("scores"));
        assert_eq!(d.num_outputs(), 1);
    }

    #[test]
    fn test_validate_ok() {
        let d = NetworkDescription::from_json(sample_json()).unwrap();
        d.validate().unwrap();
    }

    #[test]
    fn test_sample_volume() {
        let d = NetworkDescription::from_json(sample_json()).unwrap();
        assert_eq!(d.input.sample_volume(), 3 * 224 * 224);
        assert!(!d.input.has_dynamic_batch());
    }

    #[test]
    fn test_dynamic_batch() {
        let json = r#"{
            "name": "dyn",
            "input": { "name": "x", "dims": [0, 3, 8, 8] },
            "stages": [{ "name": "y", "op": "relu" }]
        }"#;
        let d = NetworkDescription::from_json(json).unwrap();
        d.validate().unwrap();
        assert!(d.input.has_dynamic_batch());
        assert_eq!(d.input.sample_volume(), 192);
    }

    #[test]
    fn test_validate_bad_rank() {
        let json = r#"{
            "name": "bad",
            "input": { "name": "x", "dims": [1, 16] },
            "stages": [{ "name": "y", "op": "relu" }]
        }"#;
        let d = NetworkDescription::from_json(json).unwrap();
        assert!(matches!(
            d.validate(),
            Err(NetworkError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_validate_zero_spatial_dim() {
        let json = r#"{
            "name": "bad",
            "input": { "name": "x", "dims": [1, 3, 0, 8] },
            "stages": [{ "name": "y", "op": "relu" }]
        }"#;
        let d = NetworkDescription::from_json(json).unwrap();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_validate_no_stages() {
        let json = r#"{
            "name": "empty",
            "input": { "name": "x", "dims": [1, 3, 8, 8] },
            "stages": []
        }"#;
        let d = NetworkDescription::from_json(json).unwrap();
        assert!(matches!(
            d.validate(),
            Err(NetworkError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn test_validate_unnamed_final_stage() {
        let json = r#"{
            "name": "bad",
            "input": { "name": "x", "dims": [1, 3, 8, 8] },
            "stages": [{ "op": "relu" }]
        }"#;
        let d = NetworkDescription::from_json(json).unwrap();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_validate_duplicate_names() {
        let json = r#"{
            "name": "dup",
            "input": { "name": "x", "dims": [1, 3, 8, 8] },
            "stages": [
                { "name": "y", "op": "relu" },
                { "name": "y", "op": "softmax" }
            ]
        }"#;
        let d = NetworkDescription::from_json(json).unwrap();
        assert!(matches!(
            d.validate(),
            Err(NetworkError::InvalidStage { .. })
        ));
    }

    #[test]
    fn test_validate_name_clashes_with_input() {
        let json = r#"{
            "name": "clash",
            "input": { "name": "x", "dims": [1, 3, 8, 8] },
            "stages": [{ "name": "x", "op": "relu" }]
        }"#;
        let d = NetworkDescription::from_json(json).unwrap();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_validate_zero_pool() {
        let json = r#"{
            "name": "bad",
            "input": { "name": "x", "dims": [1, 3, 8, 8] },
            "stages": [{ "name": "y", "op": "pool", "outputs": 0 }]
        }"#;
        let d = NetworkDescription::from_json(json).unwrap();
        assert!(matches!(
            d.validate(),
            Err(NetworkError::InvalidStage { .. })
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let d = NetworkDescription::from_json(sample_json()).unwrap();
        let json = d.to_json().unwrap();
        let back = NetworkDescription::from_json(&json).unwrap();
        assert_eq!(back, d);
    }
}
