// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Build-or-load of the compiled model.
//!
//! With caching enabled, an existing `.plan` artifact next to the
//! description is authoritative: the description file is not even read
//! on a cache hit. A bad artifact (corrupt, wrong version, wrong device)
//! fails init rather than triggering a silent rebuild — the caller
//! clears the cache explicitly. On a miss the description is parsed,
//! compiled, and the resulting plan persisted for the next init.

use crate::builder;
use crate::cache;
use crate::plan::CompiledPlan;
use crate::{RuntimeConfig, RuntimeError};
use accel_device::Device;
use network_ir::NetworkDescription;
use std::sync::Arc;

/// How the plan was obtained during init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Loaded from an existing artifact.
    Hit,
    /// Compiled and persisted.
    Miss,
    /// Compiled; caching was disabled by config.
    Disabled,
}

/// A compiled plan plus how it was obtained.
pub struct CompiledModel {
    plan: Arc<CompiledPlan>,
    cache_outcome: CacheOutcome,
}

impl CompiledModel {
    /// Obtains a plan for `config.model_path`: from the cache when
    /// possible, by compilation otherwise.
    pub fn build_or_load(config: &RuntimeConfig, device: &Device) -> Result<Self, RuntimeError> {
        let artifact = cache::cache_path(&config.model_path);

        if config.enable_cache && artifact.exists() {
            let plan = cache::load(&artifact, &device.fingerprint())?;
            return Ok(Self {
                plan: Arc::new(plan),
                cache_outcome: CacheOutcome::Hit,
            });
        }

        let desc = NetworkDescription::from_file(&config.model_path)?;
        let options = config.builder_options()?;
        let plan = builder::compile(&desc, &options, device)?;

        let cache_outcome = if config.enable_cache {
            // A failed persist costs the next init a recompile, nothing
            // more; the plan in hand is still good.
            match cache::store(&artifact, &plan, &device.fingerprint()) {
                Ok(()) => CacheOutcome::Miss,
                Err(e) => {
                    tracing::warn!("could not persist plan: {e}");
                    CacheOutcome::Disabled
                }
            }
        } else {
            CacheOutcome::Disabled
        };

        Ok(Self {
            plan: Arc::new(plan),
            cache_outcome,
        })
    }

    /// The compiled plan.
    pub fn plan(&self) -> Arc<CompiledPlan> {
        Arc::clone(&self.plan)
    }

    /// How the plan was obtained.
    pub fn cache_outcome(&self) -> CacheOutcome {
        self.cache_outcome
    }
}

impl std::fmt::Debug for CompiledModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledModel")
            .field("network", &self.plan.network_name)
            .field("precision", &self.plan.precision.as_str())
            .field("cache_outcome", &self.cache_outcome)
            .finish()
    }
}
