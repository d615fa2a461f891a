// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cumulative device allocation and transfer statistics.

/// Counters for device memory and transfer activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Number of successful allocations.
    pub total_allocations: u64,
    /// Number of buffers freed.
    pub total_deallocations: u64,
    /// Peak live device memory in bytes.
    pub peak_allocated_bytes: usize,
    /// Number of host→device copies.
    pub h2d_transfers: u64,
    /// Total bytes copied host→device.
    pub h2d_bytes: u64,
    /// Number of device→host copies.
    pub d2h_transfers: u64,
    /// Total bytes copied device→host.
    pub d2h_bytes: u64,
}

impl TransferStats {
    pub(crate) fn record_allocation(&mut self, live_bytes: usize) {
        self.total_allocations += 1;
        if live_bytes > self.peak_allocated_bytes {
            self.peak_allocated_bytes = live_bytes;
        }
    }

    pub(crate) fn record_deallocation(&mut self) {
        self.total_deallocations += 1;
    }

    pub(crate) fn record_h2d(&mut self, bytes: usize) {
        self.h2d_transfers += 1;
        self.h2d_bytes += bytes as u64;
    }

    pub(crate) fn record_d2h(&mut self, bytes: usize) {
        self.d2h_transfers += 1;
        self.d2h_bytes += bytes as u64;
    }

    /// Returns a human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} allocs / {} frees, peak {:.2} MB, h2d {} ({:.2} MB), d2h {} ({:.2} MB)",
            self.total_allocations,
            self.total_deallocations,
            self.peak_allocated_bytes as f64 / (1024.0 * 1024.0),
            self.h2d_transfers,
            self.h2d_bytes as f64 / (1024.0 * 1024.0),
            self.d2h_transfers,
            self.d2h_bytes as f64 / (1024.0 * 1024.0),
        )
    }
}
