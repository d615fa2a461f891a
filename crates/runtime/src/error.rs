// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the inference runtime.
//!
//! Propagation policy: every error during `init` is fatal to that engine
//! instance — there is no partial or degraded init. An [`Execution`]
//! error during a steady-state `infer()` is reported to the caller and
//! the engine stays usable for the next batch.
//!
//! [`Execution`]: RuntimeError::Execution

/// Errors that can occur across the compiled-model pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Configuration error (missing model file, bad budget string, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// The portable network description is malformed.
    #[error("network error: {0}")]
    Network(#[from] network_ir::NetworkError),

    /// A plan-compilation stage failed. `stage` identifies which one
    /// (`parse`, `validate`, `configure`, `compile`).
    #[error("compilation failed at {stage}: {detail}")]
    Compilation { stage: &'static str, detail: String },

    /// The cached plan artifact could not be used. Non-recoverable for
    /// this init: the caller clears the cache or aborts, the runtime
    /// never silently proceeds with a partially loaded plan.
    #[error("plan cache error: {0}")]
    Cache(String),

    /// An execute call failed at runtime. `stage` identifies the failed
    /// step (`copy_to_device`, `execute`, `copy_to_host`).
    #[error("execution failed during {stage}: {detail}")]
    Execution { stage: &'static str, detail: String },

    /// The caller supplied wrongly sized input data.
    #[error("input contract violated: expected {expected} elements, got {actual}")]
    ContractViolation { expected: usize, actual: usize },

    /// The device layer reported an error.
    #[error("device error: {0}")]
    Device(#[from] accel_device::DeviceError),
}
