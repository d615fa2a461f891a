// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Device capability reporting.
//!
//! The plan builder consults capabilities when configuring compilation:
//! reduced-precision execution is enabled only when the adapter reports
//! [`fast_fp16`](DeviceCapabilities::fast_fp16).

/// What one accelerator adapter reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Adapter name (e.g., `"sim0"`).
    pub name: String,
    /// Whether the adapter has a fast reduced-precision (fp16) path.
    pub fast_fp16: bool,
    /// Device memory capacity in bytes.
    pub memory_bytes: usize,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            name: "sim0".to_string(),
            fast_fp16: true,
            memory_bytes: 1 << 30,
        }
    }
}
