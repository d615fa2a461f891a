// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `run`: initialize an engine and drive timed batches through it.

use accel_device::Device;
use anyhow::Context;
use runtime::{InferenceEngine, RuntimeConfig};
use std::path::Path;

pub fn execute(model: &Path, batches: usize, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = match config_path {
        Some(p) => {
            let mut c = RuntimeConfig::from_file(p)
                .with_context(|| format!("loading config '{}'", p.display()))?;
            c.model_path = model.to_path_buf();
            c
        }
        None => RuntimeConfig::for_model(model),
    };

    let device = Device::open();
    println!(
        "device: {} (fast_fp16: {})",
        device.capabilities().name,
        device.capabilities().fast_fp16
    );

    let init_start = std::time::Instant::now();
    let mut engine = InferenceEngine::init(config, device)
        .with_context(|| format!("initializing engine for '{}'", model.display()))?;
    println!(
        "engine ready in {:.1} ms (cache {:?})",
        init_start.elapsed().as_secs_f64() * 1000.0,
        engine.cache_outcome()
    );

    let volume = engine.bindings().input().volume();
    for batch in 0..batches {
        // Deterministic synthetic data, varied per batch.
        let input: Vec<f32> = (0..volume)
            .map(|i| ((i + batch * 31) % 256) as f32 / 255.0)
            .collect();
        engine.set_input(&input)?;
        engine.infer()?;

        for (name, values) in engine.outputs() {
            let peak = values
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, v)| format!("argmax {i} = {v:.5}"))
                .unwrap_or_else(|| "empty".to_string());
            println!("batch {batch}: output '{name}' ({} values, {peak})", values.len());
        }
    }

    println!("\n{}", engine.timers().summary());
    println!("\n{}", engine.device().stats().summary());
    Ok(())
}
