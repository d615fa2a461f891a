// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `cache`: show or clear the on-disk plan artifact for a model.

use anyhow::Context;
use runtime::cache_path;
use std::path::Path;

pub fn execute(model: &Path, clear: bool) -> anyhow::Result<()> {
    let artifact = cache_path(model);

    if !artifact.exists() {
        println!("no cached plan at '{}'", artifact.display());
        return Ok(());
    }

    let meta = std::fs::metadata(&artifact)
        .with_context(|| format!("reading '{}'", artifact.display()))?;
    println!("cached plan: '{}' ({} bytes)", artifact.display(), meta.len());

    if clear {
        std::fs::remove_file(&artifact)
            .with_context(|| format!("removing '{}'", artifact.display()))?;
        println!("cleared");
    }
    Ok(())
}
