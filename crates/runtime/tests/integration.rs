// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! End-to-end tests over the full pipeline: description on disk, plan
//! cache, engine init, timed inference.

use accel_device::{Device, DeviceCapabilities};
use network_ir::{InputDef, NetworkDescription, StageDef, StageOp};
use runtime::{
    cache_path, CacheOutcome, InferenceEngine, Precision, RuntimeConfig, RuntimeError,
};
use std::path::{Path, PathBuf};

/// A classifier-shaped network: 1x3x224x224 in, 1000 class scores out.
fn classifier() -> NetworkDescription {
    NetworkDescription {
        name: "classifier".into(),
        input: InputDef {
            name: "data".into(),
            dims: vec![1, 3, 224, 224],
        },
        stages: vec![
            StageDef {
                name: None,
                op: StageOp::Scale {
                    factor: 1.0 / 255.0,
                },
            },
            StageDef {
                name: None,
                op: StageOp::Shift { offset: 0.5 },
            },
            StageDef {
                name: None,
                op: StageOp::Relu,
            },
            StageDef {
                name: None,
                op: StageOp::Pool { outputs: 1000 },
            },
            StageDef {
                name: Some("prob".into()),
                op: StageOp::Softmax,
            },
        ],
    }
}

fn write_description(dir: &Path, desc: &NetworkDescription) -> PathBuf {
    let path = dir.join(format!("{}.json", desc.name));
    std::fs::write(&path, desc.to_json().unwrap()).unwrap();
    path
}

fn quick_config(model_path: &Path) -> RuntimeConfig {
    RuntimeConfig {
        warmup_passes: 2,
        ..RuntimeConfig::for_model(model_path)
    }
}

#[test]
fn classifier_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = write_description(dir.path(), &classifier());
    let mut engine = InferenceEngine::init(quick_config(&model_path), Device::open()).unwrap();

    let bindings = engine.bindings();
    assert_eq!(bindings.input().shape.dims(), &[1, 3, 224, 224]);
    let outputs: Vec<_> = bindings.outputs().collect();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].name, "prob");
    assert_eq!(outputs[0].shape.dims(), &[1, 1000]);

    // All-zero input: every class score is identical, so softmax yields
    // the uniform distribution.
    engine.set_input(&vec![0.0; 3 * 224 * 224]).unwrap();
    engine.infer().unwrap();
    let prob = engine.output("prob").unwrap();
    assert_eq!(prob.len(), 1000);
    // Each probability is 1/1000 rounded through f16 (the default device
    // takes the fast fp16 path), so the sum drifts by up to ~1000 ulps.
    let total: f32 = prob.iter().sum();
    assert!((total - 1.0).abs() < 1e-2, "sum was {total}");
    for p in prob {
        assert!((p - 0.001).abs() < 1e-5);
    }

    let timers = engine.timers();
    assert_eq!(timers.execute.count(), 1);
    assert_eq!(timers.copy_to_device.count(), 1);
    assert_eq!(timers.copy_to_host.count(), 1);
}

#[test]
fn plan_cache_is_reused_across_inits() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = write_description(dir.path(), &classifier());
    let config = quick_config(&model_path);

    let first = InferenceEngine::init(config.clone(), Device::open()).unwrap();
    assert_eq!(first.cache_outcome(), CacheOutcome::Miss);
    assert!(cache_path(&model_path).exists());

    let second = InferenceEngine::init(config.clone(), Device::open()).unwrap();
    assert_eq!(second.cache_outcome(), CacheOutcome::Hit);

    // Same binding table either way.
    let a: Vec<_> = first.bindings().iter().cloned().collect();
    let b: Vec<_> = second.bindings().iter().cloned().collect();
    assert_eq!(a, b);

    // Clearing the artifact forces a rebuild, which re-persists it.
    std::fs::remove_file(cache_path(&model_path)).unwrap();
    let third = InferenceEngine::init(config.clone(), Device::open()).unwrap();
    assert_eq!(third.cache_outcome(), CacheOutcome::Miss);
    let fourth = InferenceEngine::init(config, Device::open()).unwrap();
    assert_eq!(fourth.cache_outcome(), CacheOutcome::Hit);
}

#[test]
fn cached_and_rebuilt_plans_agree_numerically() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = write_description(dir.path(), &classifier());
    let config = quick_config(&model_path);
    let input: Vec<f32> = (0..3 * 224 * 224).map(|i| (i % 256) as f32).collect();

    let mut built = InferenceEngine::init(config.clone(), Device::open()).unwrap();
    built.set_input(&input).unwrap();
    built.infer().unwrap();
    let expected = built.output("prob").unwrap().to_vec();

    let mut loaded = InferenceEngine::init(config, Device::open()).unwrap();
    assert_eq!(loaded.cache_outcome(), CacheOutcome::Hit);
    loaded.set_input(&input).unwrap();
    loaded.infer().unwrap();
    assert_eq!(loaded.output("prob").unwrap(), expected.as_slice());
}

#[test]
fn fp16_only_on_capable_devices() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = write_description(dir.path(), &classifier());
    let config = RuntimeConfig {
        enable_cache: false,
        ..quick_config(&model_path)
    };

    let fast = InferenceEngine::init(config.clone(), Device::open()).unwrap();
    assert_eq!(fast.bindings().input().shape.dim(0), Some(1));
    // Default simulated device has a fast fp16 path.
    let mut fast = fast;
    fast.set_input(&vec![0.1; 3 * 224 * 224]).unwrap();
    fast.infer().unwrap();

    let slow_device = Device::with_capabilities(DeviceCapabilities {
        fast_fp16: false,
        ..Default::default()
    });
    let mut slow = InferenceEngine::init(config, slow_device).unwrap();
    slow.set_input(&vec![0.1; 3 * 224 * 224]).unwrap();
    slow.infer().unwrap();

    // 0.1 rounds differently through f16, so the pipelines disagree.
    assert_ne!(fast.output("prob").unwrap(), slow.output("prob").unwrap());
}

#[test]
fn cache_rejects_plan_from_other_device() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = write_description(dir.path(), &classifier());
    let config = quick_config(&model_path);

    let other = Device::with_capabilities(DeviceCapabilities {
        name: "legacy".into(),
        ..Default::default()
    });
    InferenceEngine::init(config.clone(), other).unwrap();

    let err = InferenceEngine::init(config, Device::open()).unwrap_err();
    assert!(matches!(err, RuntimeError::Cache(_)));
}

#[test]
fn workspace_ceiling_fails_compilation() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = write_description(dir.path(), &classifier());
    let config = RuntimeConfig {
        workspace_limit: "200".into(),
        ..quick_config(&model_path)
    };
    let err = InferenceEngine::init(config, Device::open()).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Compilation {
            stage: "configure",
            ..
        }
    ));
}

#[test]
fn wrong_input_size_is_a_contract_violation() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = write_description(dir.path(), &classifier());
    let mut engine = InferenceEngine::init(quick_config(&model_path), Device::open()).unwrap();

    let err = engine.set_input(&[0.0; 10]).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::ContractViolation {
            expected: 150_528,
            actual: 10,
        }
    ));
}

#[test]
fn dynamic_batch_network_binds_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let desc = NetworkDescription {
        name: "dynamic".into(),
        input: InputDef {
            name: "data".into(),
            dims: vec![0, 3, 8, 8],
        },
        stages: vec![StageDef {
            name: Some("out".into()),
            op: StageOp::Pool { outputs: 10 },
        }],
    };
    let model_path = write_description(dir.path(), &desc);
    let config = RuntimeConfig {
        batch_size: 4,
        ..quick_config(&model_path)
    };

    let mut engine = InferenceEngine::init(config, Device::open()).unwrap();
    assert_eq!(engine.bindings().input().shape.dims(), &[4, 3, 8, 8]);
    assert_eq!(engine.bindings().get("out").unwrap().shape.dims(), &[4, 10]);

    engine.set_input(&vec![2.0; 4 * 3 * 8 * 8]).unwrap();
    engine.infer().unwrap();
    assert_eq!(engine.output("out").unwrap(), &[2.0; 40]);
}

#[test]
fn fp32_plan_when_fp16_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = write_description(dir.path(), &classifier());
    let config = RuntimeConfig {
        enable_fp16: false,
        enable_cache: false,
        ..quick_config(&model_path)
    };
    let device = Device::open();
    let desc = NetworkDescription::from_file(&model_path).unwrap();
    let plan = runtime::compile(&desc, &config.builder_options().unwrap(), &device).unwrap();
    assert_eq!(plan.precision, Precision::Fp32);
}
