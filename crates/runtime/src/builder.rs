// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Plan compilation: portable description in, device-optimized plan out.
//!
//! Compilation runs three stages, each with its own failure tag:
//! `validate` checks the description's structural invariants, `configure`
//! picks the precision and checks the scratch estimate against the
//! workspace ceiling, and `compile` propagates shapes through the op
//! sequence. Compilation is deliberately the slow path — the plan cache
//! exists so it runs once per description per device.

use crate::plan::{CompiledPlan, CompiledStage, PlanOp, Precision};
use crate::RuntimeError;
use accel_device::{Device, WorkspaceBudget};
use network_ir::{NetworkDescription, StageOp};

/// Knobs for one compilation, resolved from [`RuntimeConfig`].
///
/// [`RuntimeConfig`]: crate::RuntimeConfig
#[derive(Debug, Clone, Copy)]
pub struct BuilderOptions {
    /// Hard ceiling on the per-sample scratch estimate.
    pub workspace: WorkspaceBudget,
    /// Request reduced-precision execution. Honored only when the device
    /// reports a fast fp16 path; otherwise the plan falls back to fp32.
    pub enable_fp16: bool,
}

/// Compiles a validated description into an executable plan for `device`.
pub fn compile(
    desc: &NetworkDescription,
    options: &BuilderOptions,
    device: &Device,
) -> Result<CompiledPlan, RuntimeError> {
    desc.validate()?;

    let precision = if options.enable_fp16 && device.capabilities().fast_fp16 {
        tracing::info!("device has a fast fp16 path, compiling at reduced precision");
        Precision::Fp16
    } else {
        if options.enable_fp16 {
            tracing::debug!("fp16 requested but not fast on this device, staying at fp32");
        }
        Precision::Fp32
    };

    // Shape propagation. Per-sample only: the leading batch dimension is
    // either baked into the plan or bound later on the context.
    let mut dims: Vec<usize> = desc.input.sample_dims().to_vec();
    let mut stages = Vec::with_capacity(desc.stages.len());
    let mut scratch_bytes = 0usize;

    for (idx, stage) in desc.stages.iter().enumerate() {
        let in_volume: usize = dims.iter().product();
        let out_dims = match stage.op {
            StageOp::Scale { .. } | StageOp::Shift { .. } | StageOp::Relu | StageOp::Softmax => {
                dims.clone()
            }
            StageOp::Pool { outputs } => {
                if outputs > in_volume {
                    return Err(RuntimeError::Compilation {
                        stage: "compile",
                        detail: format!(
                            "stage {idx} pools {in_volume} elements into {outputs} outputs"
                        ),
                    });
                }
                vec![outputs]
            }
        };
        let out_volume: usize = out_dims.iter().product();

        // Scratch model: one input plus one output tile live at once,
        // f32 elements regardless of the execution precision.
        scratch_bytes = scratch_bytes.max((in_volume + out_volume) * std::mem::size_of::<f32>());

        stages.push(CompiledStage {
            name: stage.name.clone(),
            op: PlanOp::from(&stage.op),
            sample_dims: out_dims.clone(),
        });
        dims = out_dims;
    }

    if scratch_bytes > options.workspace.as_bytes() {
        return Err(RuntimeError::Compilation {
            stage: "configure",
            detail: format!(
                "scratch estimate {} bytes exceeds workspace ceiling {} bytes",
                scratch_bytes,
                options.workspace.as_bytes()
            ),
        });
    }

    let builtin_batch = if desc.input.has_dynamic_batch() {
        None
    } else {
        Some(desc.input.dims[0])
    };

    let plan = CompiledPlan {
        network_name: desc.name.clone(),
        precision,
        input_name: desc.input.name.clone(),
        input_sample_dims: desc.input.sample_dims().to_vec(),
        builtin_batch,
        workspace_bytes: scratch_bytes,
        stages,
    };
    tracing::info!("compiled {}", plan.summary());
    Ok(plan)
}
