// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Execution context: a bound instance of a compiled plan.
//!
//! The context resolves the plan's leading dimension (built-in or bound
//! once before first use) and runs the execute calling convention: a
//! slot-ordered sequence of device buffer ids, input at slot 0, exposed
//! outputs following in execution order. Execution is synchronous; the
//! call returns when every output buffer holds its result.
//!
//! Reduced precision is observable, not cosmetic: with an fp16 plan every
//! intermediate value is rounded through `half::f16` between stages, so
//! fp32 and fp16 plans produce genuinely different numerics.

use crate::plan::{CompiledPlan, PlanOp, Precision};
use crate::RuntimeError;
use accel_device::{BufferId, Device};
use half::f16;
use std::sync::Arc;

/// A compiled plan bound to a concrete batch, ready to execute.
pub struct ExecutionContext {
    plan: Arc<CompiledPlan>,
    batch: Option<usize>,
}

impl ExecutionContext {
    /// Creates a context over `plan`. The batch starts out resolved only
    /// if the plan baked one in.
    pub fn new(plan: Arc<CompiledPlan>) -> Self {
        let batch = plan.builtin_batch;
        Self { plan, batch }
    }

    /// Fixes the symbolic leading dimension.
    ///
    /// A plan with a built-in batch accepts only that value; a symbolic
    /// plan accepts any non-zero batch, once, before first execute.
    pub fn bind_batch(&mut self, batch: usize) -> Result<(), RuntimeError> {
        if batch == 0 {
            return Err(RuntimeError::Config("cannot bind batch 0".into()));
        }
        if let Some(builtin) = self.plan.builtin_batch {
            if batch != builtin {
                return Err(RuntimeError::Config(format!(
                    "plan has built-in batch {builtin}, cannot bind {batch}"
                )));
            }
            return Ok(());
        }
        tracing::debug!("bound symbolic batch to {batch}");
        self.batch = Some(batch);
        Ok(())
    }

    /// Returns the resolved batch, if bound.
    pub fn batch(&self) -> Option<usize> {
        self.batch
    }

    /// Returns the underlying plan.
    pub fn plan(&self) -> &CompiledPlan {
        &self.plan
    }

    /// Runs the plan over slot-ordered device `bindings`.
    ///
    /// Slot 0 is the input; each exposed output follows in execution
    /// order. All tensors are f32 on the wire regardless of the plan
    /// precision.
    pub fn execute(&self, device: &Device, bindings: &[BufferId]) -> Result<(), RuntimeError> {
        let batch = self.batch.ok_or_else(|| RuntimeError::Execution {
            stage: "execute",
            detail: "batch dimension is not bound".into(),
        })?;

        let expected_slots = 1 + self.plan.num_outputs();
        if bindings.len() != expected_slots {
            return Err(RuntimeError::Execution {
                stage: "execute",
                detail: format!(
                    "expected {expected_slots} binding slots, got {}",
                    bindings.len()
                ),
            });
        }

        let input_volume = batch * self.plan.input_sample_volume();
        let mut raw = vec![0u8; input_volume * std::mem::size_of::<f32>()];
        device.read(bindings[0], &mut raw)?;
        let mut values: Vec<f32> = bytemuck::pod_collect_to_vec(&raw);
        self.round(&mut values);

        let mut sample_volume = self.plan.input_sample_volume();
        let mut next_output_slot = 1;
        for stage in &self.plan.stages {
            values = apply_op(&stage.op, &values, batch, sample_volume);
            self.round(&mut values);
            sample_volume = stage.sample_volume();

            if stage.name.is_some() {
                device.write(bindings[next_output_slot], bytemuck::cast_slice(&values))?;
                next_output_slot += 1;
            }
        }
        Ok(())
    }

    fn round(&self, values: &mut [f32]) {
        if self.plan.precision == Precision::Fp16 {
            for v in values.iter_mut() {
                *v = f16::from_f32(*v).to_f32();
            }
        }
    }
}

/// Applies one op over `batch` samples of `sample_volume` elements each.
fn apply_op(op: &PlanOp, input: &[f32], batch: usize, sample_volume: usize) -> Vec<f32> {
    match *op {
        PlanOp::Scale { factor } => input.iter().map(|x| x * factor).collect(),
        PlanOp::Shift { offset } => input.iter().map(|x| x + offset).collect(),
        PlanOp::Relu => input.iter().map(|x| x.max(0.0)).collect(),
        PlanOp::Pool { outputs } => {
            let mut result = Vec::with_capacity(batch * outputs);
            for sample in input.chunks(sample_volume) {
                pool_sample(sample, outputs, &mut result);
            }
            result
        }
        PlanOp::Softmax => {
            let mut result = Vec::with_capacity(input.len());
            for sample in input.chunks(sample_volume) {
                softmax_sample(sample, &mut result);
            }
            result
        }
    }
}

/// Mean-pools one sample into `outputs` values over contiguous chunks.
///
/// When the volume does not divide evenly, the first `volume % outputs`
/// chunks take one extra element, so every input element contributes to
/// exactly one output.
fn pool_sample(sample: &[f32], outputs: usize, result: &mut Vec<f32>) {
    let base = sample.len() / outputs;
    let remainder = sample.len() % outputs;
    let mut offset = 0;
    for i in 0..outputs {
        let len = if i < remainder { base + 1 } else { base };
        let chunk = &sample[offset..offset + len];
        let sum: f32 = chunk.iter().sum();
        result.push(sum / len as f32);
        offset += len;
    }
}

/// Numerically stable softmax over one sample.
fn softmax_sample(sample: &[f32], result: &mut Vec<f32>) {
    let max = sample.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = sample.iter().map(|x| (x - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    result.extend(exps.iter().map(|e| e / total));
}
