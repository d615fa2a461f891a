// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The inference engine: one model, one context, one set of staging
//! buffers, owned for the engine's whole life.
//!
//! `init` runs the entire setup pipeline — build-or-load, binding
//! discovery, batch resolution, staging allocation, warmup — and either
//! returns a ready engine or an error; there is no partially initialized
//! engine value. After init the engine cycles `set_input` / `infer` /
//! `output` indefinitely. A failed `infer` leaves the engine ready: the
//! failure is reported for that batch and the caller may retry with the
//! next one. Failed steps record no timer sample, so averages only ever
//! aggregate completed work.

use crate::binding::BindingSet;
use crate::context::ExecutionContext;
use crate::model::{CacheOutcome, CompiledModel};
use crate::staging::StagingBufferSet;
use crate::timing::StageTimers;
use crate::{RuntimeConfig, RuntimeError};
use accel_device::{BufferId, Device};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Externally observable engine state.
///
/// Init either returns a `Ready` engine or no engine at all, so `Ready`
/// is the steady state; the other phases are visible only in logs and to
/// code inspecting an engine mid-init (which does not exist today).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Building,
    Warmup,
    Ready,
}

/// A fully initialized inference pipeline over one compiled model.
pub struct InferenceEngine {
    config: RuntimeConfig,
    device: Device,
    model: CompiledModel,
    context: ExecutionContext,
    staging: StagingBufferSet,
    binding_ids: Vec<BufferId>,
    timers: StageTimers,
    state: EngineState,
}

impl InferenceEngine {
    /// Builds or loads the model, discovers bindings, allocates staging,
    /// and warms the pipeline up.
    pub fn init(config: RuntimeConfig, device: Device) -> Result<Self, RuntimeError> {
        tracing::info!(
            "initializing engine for '{}'",
            config.model_path.display()
        );
        let model = CompiledModel::build_or_load(&config, &device)?;
        let plan = model.plan();

        let mut context = ExecutionContext::new(model.plan());
        if plan.builtin_batch.is_none() {
            context.bind_batch(config.batch_size)?;
        }
        let batch = context
            .batch()
            .ok_or_else(|| RuntimeError::Config("batch dimension unresolved".into()))?;

        let bindings = BindingSet::discover(&plan, batch);
        let staging = StagingBufferSet::allocate(&device, &bindings)?;
        let binding_ids = staging.binding_ids();

        let mut engine = Self {
            config,
            device,
            model,
            context,
            staging,
            binding_ids,
            timers: StageTimers::new(),
            state: EngineState::Building,
        };
        engine.warmup()?;
        engine.state = EngineState::Ready;
        tracing::info!(
            "engine ready: {} (cache {:?}, batch {batch})",
            engine.context.plan().summary(),
            engine.model.cache_outcome(),
        );
        Ok(engine)
    }

    /// Runs untimed synthetic cycles so steady-state measurements do not
    /// include first-touch costs.
    fn warmup(&mut self) -> Result<(), RuntimeError> {
        let passes = self.config.warmup_passes;
        if passes == 0 {
            return Ok(());
        }
        self.state = EngineState::Warmup;
        tracing::debug!("running {passes} warmup passes");

        let volume = self.staging.bindings().input().volume();
        // Seeded so warmup is reproducible run to run.
        let mut rng = StdRng::seed_from_u64(0x7a11);
        for _ in 0..passes {
            let synthetic: Vec<f32> =
                (0..volume).map(|_| rng.gen_range(0.0f32..255.0)).collect();
            self.staging.set_input(&synthetic)?;
            self.staging.copy_input_to_device()?;
            self.context.execute(&self.device, &self.binding_ids)?;
            self.staging.copy_outputs_to_host()?;
        }
        Ok(())
    }

    /// Stages one batch of input data on the host side.
    pub fn set_input(&mut self, data: &[f32]) -> Result<(), RuntimeError> {
        self.timers.set_input.start();
        self.staging.set_input(data)?;
        self.timers.set_input.pause();
        Ok(())
    }

    /// Runs one timed inference cycle: copy-in, execute, copy-out.
    ///
    /// Each step is timed individually; a failing step ends the cycle
    /// without recording its sample and without poisoning the engine.
    pub fn infer(&mut self) -> Result<(), RuntimeError> {
        self.timers.copy_to_device.start();
        self.staging.copy_input_to_device()?;
        self.timers.copy_to_device.pause();

        self.timers.execute.start();
        self.context.execute(&self.device, &self.binding_ids)?;
        self.timers.execute.pause();

        self.timers.copy_to_host.start();
        self.staging.copy_outputs_to_host()?;
        self.timers.copy_to_host.pause();
        Ok(())
    }

    /// Host-side view of one output by binding name, from the most recent
    /// completed cycle.
    pub fn output(&self, name: &str) -> Option<&[f32]> {
        self.staging.output(name)
    }

    /// Resolved batch size.
    pub fn batch_size(&self) -> usize {
        self.input_dim(0)
    }

    /// Input channel count (NCHW dim 1).
    pub fn input_channels(&self) -> usize {
        self.input_dim(1)
    }

    /// Input height (NCHW dim 2).
    pub fn input_height(&self) -> usize {
        self.input_dim(2)
    }

    /// Input width (NCHW dim 3).
    pub fn input_width(&self) -> usize {
        self.input_dim(3)
    }

    /// Number of elements `set_input` expects.
    pub fn input_len(&self) -> usize {
        self.staging.bindings().input().volume()
    }

    fn input_dim(&self, index: usize) -> usize {
        // Validation pins the input to rank-4 NCHW.
        self.staging
            .bindings()
            .input()
            .shape
            .dim(index)
            .unwrap_or(0)
    }

    /// All outputs in slot order, as `(name, values)` pairs.
    pub fn outputs(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.staging.outputs()
    }

    /// The binding table discovered at init.
    pub fn bindings(&self) -> &BindingSet {
        self.staging.bindings()
    }

    /// Accumulated per-stage timings.
    pub fn timers(&self) -> &StageTimers {
        &self.timers
    }

    /// How the plan was obtained at init.
    pub fn cache_outcome(&self) -> CacheOutcome {
        self.model.cache_outcome()
    }

    /// The device this engine runs on.
    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn state(&self) -> EngineState {
        self.state
    }
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("model", &self.model)
            .field("state", &self.state)
            .field("batch", &self.context.batch())
            .finish()
    }
}
