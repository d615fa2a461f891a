// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The device-optimized executable form of a network.
//!
//! A [`CompiledPlan`] is what the builder produces and what the cache
//! persists: a fixed, shape-propagated op sequence with a chosen
//! precision. Per-sample dimensions are stored without the batch; the
//! leading dimension is either baked in (`builtin_batch`) or symbolic
//! and bound on the execution context before first use.
//!
//! The plan carries its own op enum rather than the portable
//! [`network_ir::StageOp`]: the portable form is tied to the JSON
//! manifest layout, while [`PlanOp`] is laid out for the binary cache
//! artifact.

use network_ir::StageOp;

/// Execution precision chosen at configure time.
///
/// `Fp16` is selected only when it was requested *and* the device
/// reported a fast reduced-precision path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Precision {
    Fp32,
    Fp16,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Fp32 => "fp32",
            Precision::Fp16 => "fp16",
        }
    }
}

/// A compiled operation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PlanOp {
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

impl PlanOp {
    /// Short operation name for logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            PlanOp::Scale { .. } => "scale",
            PlanOp::Shift { .. } => "shift",
            PlanOp::Relu => "relu",
            PlanOp::Pool { .. } => "pool",
            PlanOp::Softmax => "softmax",
        }
    }
}

impl From<&StageOp> for PlanOp {
    fn from(op: &StageOp) -> Self {
        match *op {
            StageOp::Scale { factor } => PlanOp::Scale { factor },
            StageOp::Shift { offset } => PlanOp::Shift { offset },
            StageOp::Relu => PlanOp::Relu,
            StageOp::Pool { outputs } => PlanOp::Pool { outputs },
            StageOp::Softmax => PlanOp::Softmax,
        }
    }
}

/// One compiled stage: the op plus its propagated per-sample output shape.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompiledStage {
    /// Exposed output binding name, if any.
    pub name: Option<String>,
    /// The operation.
    pub op: PlanOp,
    /// Per-sample output dimensions (batch excluded).
    pub sample_dims: Vec<usize>,
}

impl CompiledStage {
    /// Number of output elements per sample.
    pub fn sample_volume(&self) -> usize {
        self.sample_dims.iter().product()
    }
}

/// The compiled, device-optimized plan.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompiledPlan {
    /// Name carried over from the portable description.
    pub network_name: String,
    /// Chosen execution precision.
    pub precision: Precision,
    /// Input binding name.
    pub input_name: String,
    /// Per-sample input dimensions (batch excluded).
    pub input_sample_dims: Vec<usize>,
    /// Concrete batch baked in at build time, or `None` when the
    /// description declared a symbolic leading dimension.
    pub builtin_batch: Option<usize>,
    /// Per-sample scratch estimate recorded at configure time.
    pub workspace_bytes: usize,
    /// The op sequence in execution order.
    pub stages: Vec<CompiledStage>,
}

impl CompiledPlan {
    /// Number of input elements per sample.
    pub fn input_sample_volume(&self) -> usize {
        self.input_sample_dims.iter().product()
    }

    /// Number of exposed output bindings.
    pub fn num_outputs(&self) -> usize {
        self.stages.iter().filter(|s| s.name.is_some()).count()
    }

    /// Iterates the exposed output stages in execution order.
    pub fn output_stages(&self) -> impl Iterator<Item = &CompiledStage> {
        self.stages.iter().filter(|s| s.name.is_some())
    }

    /// Returns a human-readable one-line summary.
    pub fn summary(&self) -> String {
        let batch = match self.builtin_batch {
            Some(b) => b.to_string(),
            None => "dynamic".to_string(),
        };
        format!(
            "plan '{}': {} stages, {} outputs, batch {}, {}, workspace {} bytes",
            self.network_name,
            self.stages.len(),
            self.num_outputs(),
            batch,
            self.precision.as_str(),
            self.workspace_bytes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> CompiledPlan {
        CompiledPlan {
            network_name: "t".into(),
            precision: Precision::Fp32,
            input_name: "x".into(),
            input_sample_dims: vec![3, 4, 4],
            builtin_batch: Some(1),
            workspace_bytes: 384,
            stages: vec![
                CompiledStage {
                    name: None,
                    op: PlanOp::Relu,
                    sample_dims: vec![3, 4, 4],
                },
                CompiledStage {
                    name: Some("scores".into()),
                    op: PlanOp::Pool { outputs: 8 },
                    sample_dims: vec![8],
                },
            ],
        }
    }

    #[test]
    fn test_volumes_and_outputs() {
        let p = sample_plan();
        assert_eq!(p.input_sample_volume(), 48);
        assert_eq!(p.num_outputs(), 1);
        assert_eq!(p.stages[1].sample_volume(), 8);
    }

    #[test]
    fn test_op_conversion() {
        assert_eq!(
            PlanOp::from(&StageOp::Scale { factor: 2.0 }),
            PlanOp::Scale { factor: 2.0 }
        );
        assert_eq!(PlanOp::from(&StageOp::Relu), PlanOp::Relu);
    }

    #[test]
    fn test_summary() {
        let p = sample_plan();
        let s = p.summary();
        assert!(s.contains("plan 't'"));
        assert!(s.contains("2 stages"));
        assert!(s.contains("fp32"));
    }

    #[test]
    fn test_bincode_roundtrip() {
        let p = sample_plan();
        let bytes = bincode::serialize(&p).unwrap();
        let back: CompiledPlan = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, p);
    }
}
