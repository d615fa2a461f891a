// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! The compiled-model lifecycle and execution pipeline.
//!
//! The runtime takes a portable `NetworkDescription` from `network-ir`
//! and a `Device` from `accel-device`, and drives the whole lifecycle:
//!
//! ```text
//! InferenceEngine::init(config, device)
//!     │
//!     ├─ CompiledModel::build_or_load      (plan cache hit, or compile + persist)
//!     ├─ BindingSet::discover              (one input, N outputs, slot order)
//!     ├─ ExecutionContext + bind_batch     (fixes a symbolic leading dim)
//!     ├─ StagingBufferSet::allocate        (host + device buffer per binding)
//!     └─ warmup                            (synthetic copy/execute/copy cycles)
//!
//! per batch:
//!     set_input ─► infer (copy-in ─► execute ─► copy-out, each timed)
//! ```
//!
//! Everything is single-threaded and synchronous: each call blocks the
//! caller until the device operation completes. One engine instance owns
//! its model, context, and staging buffers exclusively.

mod binding;
mod builder;
mod cache;
mod config;
mod context;
mod engine;
mod error;
mod model;
mod plan;
mod staging;
mod timing;

pub use binding::{BindingRole, BindingSet, TensorBinding};
pub use builder::{compile, BuilderOptions};
pub use cache::{cache_path, MAX_PLAN_SIZE};
pub use config::RuntimeConfig;
pub use context::ExecutionContext;
pub use engine::{EngineState, InferenceEngine};
pub use error::RuntimeError;
pub use model::{CacheOutcome, CompiledModel};
pub use plan::{CompiledPlan, CompiledStage, PlanOp, Precision};
pub use staging::StagingBufferSet;
pub use timing::{StageTimers, TimedSection};
