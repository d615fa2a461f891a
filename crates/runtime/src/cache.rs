// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! On-disk plan cache.
//!
//! A compiled plan is persisted next to its description with the
//! extension swapped to `.plan`. The artifact is a bincode envelope:
//! magic, format version, device fingerprint, then the plan itself. Any
//! mismatch on load is a hard [`RuntimeError::Cache`] — the runtime
//! never silently recompiles over a bad artifact, the caller decides
//! whether to clear it.

use crate::plan::CompiledPlan;
use crate::RuntimeError;
use std::path::{Path, PathBuf};

/// Artifact magic, first bytes of every cached plan.
const PLAN_MAGIC: [u8; 4] = *b"ARPL";

/// Envelope format version, bumped on incompatible layout changes.
const PLAN_FORMAT_VERSION: u32 = 1;

/// Upper bound on a plausible plan artifact (256 MiB). Files larger than
/// this are rejected before any read.
pub const MAX_PLAN_SIZE: u64 = 1 << 28;

#[derive(serde::Serialize, serde::Deserialize)]
struct PlanEnvelope {
    magic: [u8; 4],
    version: u32,
    fingerprint: String,
    plan: CompiledPlan,
}

/// Returns the cache artifact path for a description path
/// (`model.json` → `model.plan`).
pub fn cache_path(model_path: &Path) -> PathBuf {
    model_path.with_extension("plan")
}

/// Persists `plan` at `path`, stamped with the device `fingerprint`.
pub fn store(path: &Path, plan: &CompiledPlan, fingerprint: &str) -> Result<(), RuntimeError> {
    let envelope = PlanEnvelope {
        magic: PLAN_MAGIC,
        version: PLAN_FORMAT_VERSION,
        fingerprint: fingerprint.to_string(),
        plan: plan.clone(),
    };
    let bytes = bincode::serialize(&envelope)
        .map_err(|e| RuntimeError::Cache(format!("cannot encode plan: {e}")))?;
    std::fs::write(path, &bytes).map_err(|e| {
        RuntimeError::Cache(format!("cannot write '{}': {e}", path.display()))
    })?;
    tracing::info!("cached plan at '{}' ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Loads a cached plan from `path`, verifying it matches this runtime and
/// the device identified by `fingerprint`.
pub fn load(path: &Path, fingerprint: &str) -> Result<CompiledPlan, RuntimeError> {
    let meta = std::fs::metadata(path).map_err(|e| {
        RuntimeError::Cache(format!("cannot stat '{}': {e}", path.display()))
    })?;
    if meta.len() > MAX_PLAN_SIZE {
        return Err(RuntimeError::Cache(format!(
            "'{}' is {} bytes, above the {} byte artifact limit",
            path.display(),
            meta.len(),
            MAX_PLAN_SIZE
        )));
    }

    let bytes = std::fs::read(path).map_err(|e| {
        RuntimeError::Cache(format!("cannot read '{}': {e}", path.display()))
    })?;
    let envelope: PlanEnvelope = bincode::deserialize(&bytes)
        .map_err(|e| RuntimeError::Cache(format!("corrupt plan artifact: {e}")))?;

    if envelope.magic != PLAN_MAGIC {
        return Err(RuntimeError::Cache("not a plan artifact".into()));
    }
    if envelope.version != PLAN_FORMAT_VERSION {
        return Err(RuntimeError::Cache(format!(
            "plan format v{} is not supported (current v{})",
            envelope.version, PLAN_FORMAT_VERSION
        )));
    }
    if envelope.fingerprint != fingerprint {
        return Err(RuntimeError::Cache(format!(
            "plan was built for device '{}', current device is '{}'",
            envelope.fingerprint, fingerprint
        )));
    }

    tracing::info!("loaded cached plan from '{}'", path.display());
    Ok(envelope.plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{CompiledStage, PlanOp, Precision};

    fn sample_plan() -> CompiledPlan {
        CompiledPlan {
            network_name: "cached".into(),
            precision: Precision::Fp16,
            input_name: "data".into(),
            input_sample_dims: vec![3, 8, 8],
            builtin_batch: Some(1),
            workspace_bytes: 1536,
            stages: vec![CompiledStage {
                name: Some("out".into()),
                op: PlanOp::Pool { outputs: 16 },
                sample_dims: vec![16],
            }],
        }
    }

    #[test]
    fn test_cache_path_swaps_extension() {
        assert_eq!(
            cache_path(Path::new("/models/net.json")),
            PathBuf::from("/models/net.plan")
        );
    }

    #[test]
    fn test_store_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.plan");
        let plan = sample_plan();

        store(&path, &plan, "sim0#api1").unwrap();
        let back = load(&path, "sim0#api1").unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn test_fingerprint_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.plan");
        store(&path, &sample_plan(), "sim0#api1").unwrap();

        let err = load(&path, "other#api1").unwrap_err();
        assert!(matches!(err, RuntimeError::Cache(_)));
    }

    #[test]
    fn test_garbage_artifact_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.plan");
        std::fs::write(&path, b"not a plan").unwrap();

        let err = load(&path, "sim0#api1").unwrap_err();
        assert!(matches!(err, RuntimeError::Cache(_)));
    }

    #[test]
    fn test_missing_artifact_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.plan"), "sim0#api1").unwrap_err();
        assert!(matches!(err, RuntimeError::Cache(_)));
    }
}
