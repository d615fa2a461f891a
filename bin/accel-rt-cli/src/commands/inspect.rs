// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `inspect`: compile (or load) a model and print its plan and bindings.

use accel_device::Device;
use anyhow::Context;
use runtime::{BindingSet, CompiledModel, RuntimeConfig};
use std::path::Path;

pub fn execute(model: &Path) -> anyhow::Result<()> {
    let config = RuntimeConfig::for_model(model);
    let device = Device::open();
    let compiled = CompiledModel::build_or_load(&config, &device)
        .with_context(|| format!("compiling '{}'", model.display()))?;

    let plan = compiled.plan();
    println!("{} (cache {:?})", plan.summary(), compiled.cache_outcome());

    let batch = plan.builtin_batch.unwrap_or(config.batch_size);
    let bindings = BindingSet::discover(&plan, batch);
    println!("\nbindings:");
    for b in bindings.iter() {
        println!(
            "  [{}] {:<6} {:<16} {:>14}  {} bytes",
            b.slot,
            b.role.as_str(),
            b.name,
            b.shape.to_string(),
            b.size_bytes(),
        );
    }

    println!("\nstages:");
    for (i, stage) in plan.stages.iter().enumerate() {
        let name = stage.name.as_deref().unwrap_or("-");
        let dims = stage
            .sample_dims
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("x");
        println!("  {i:>3} {:<8} -> {dims:<12} ({name})", stage.op.kind());
    }
    Ok(())
}
