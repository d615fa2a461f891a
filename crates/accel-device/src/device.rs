// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The device handle and the simulated adapter behind it.
//!
//! [`Device`] is a cheap-to-clone handle over shared adapter state.
//! Allocations hand out RAII [`DeviceBuffer`] guards; transfers are
//! explicit, whole-buffer, and synchronous on the calling thread.
//!
//! Device memory here is ordinary host memory held behind the handle —
//! the point of the simulated adapter is that data is *only* reachable
//! through `write`/`read`, so the pipeline's staging discipline is real
//! even though no hardware is.

use crate::{BufferId, DeviceBuffer, DeviceCapabilities, DeviceError, TransferStats};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Adapter API revision, part of the device fingerprint embedded in
/// cached plan artifacts.
const DEVICE_API_VERSION: u32 = 1;

/// Shared adapter state, referenced by the handle and by buffer guards.
pub(crate) struct DeviceInner {
    caps: DeviceCapabilities,
    allocated_bytes: AtomicUsize,
    next_id: AtomicU64,
    memory: Mutex<HashMap<u64, Vec<u8>>>,
    stats: Mutex<TransferStats>,
}

impl DeviceInner {
    pub(crate) fn write(&self, id: BufferId, src: &[u8]) -> Result<(), DeviceError> {
        let mut memory = self.memory.lock().expect("device memory lock poisoned");
        let region = memory
            .get_mut(&id.0)
            .ok_or(DeviceError::InvalidBuffer(id.0))?;
        if region.len() != src.len() {
            return Err(DeviceError::TransferSizeMismatch {
                buffer: id.0,
                expected: region.len(),
                actual: src.len(),
            });
        }
        region.copy_from_slice(src);
        drop(memory);

        if let Ok(mut stats) = self.stats.lock() {
            stats.record_h2d(src.len());
        }
        Ok(())
    }

    pub(crate) fn read(&self, id: BufferId, dst: &mut [u8]) -> Result<(), DeviceError> {
        let memory = self.memory.lock().expect("device memory lock poisoned");
        let region = memory.get(&id.0).ok_or(DeviceError::InvalidBuffer(id.0))?;
        if region.len() != dst.len() {
            return Err(DeviceError::TransferSizeMismatch {
                buffer: id.0,
                expected: region.len(),
                actual: dst.len(),
            });
        }
        dst.copy_from_slice(region);
        drop(memory);

        if let Ok(mut stats) = self.stats.lock() {
            stats.record_d2h(dst.len());
        }
        Ok(())
    }

    /// Called by `DeviceBuffer::drop` to return an allocation.
    pub(crate) fn free(&self, id: BufferId, len: usize) {
        if let Ok(mut memory) = self.memory.lock() {
            memory.remove(&id.0);
        }
        self.allocated_bytes.fetch_sub(len, Ordering::Release);
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_deallocation();
        }
    }
}

/// A handle to one accelerator adapter.
///
/// Cloning the handle shares the same adapter; multiple pipelines may
/// coexist on one device if its capacity allows, but the device does not
/// arbitrate between them.
#[derive(Clone)]
pub struct Device {
    inner: Arc<DeviceInner>,
}

impl Device {
    /// Opens the default simulated adapter.
    pub fn open() -> Self {
        Self::with_capabilities(DeviceCapabilities::default())
    }

    /// Opens a simulated adapter with explicit capabilities (used by
    /// tests to model devices without fast-fp16 or with small memory).
    pub fn with_capabilities(caps: DeviceCapabilities) -> Self {
        tracing::debug!(
            "device '{}' opened: fast_fp16={}, memory={} bytes",
            caps.name,
            caps.fast_fp16,
            caps.memory_bytes,
        );
        Self {
            inner: Arc::new(DeviceInner {
                caps,
                allocated_bytes: AtomicUsize::new(0),
                next_id: AtomicU64::new(1),
                memory: Mutex::new(HashMap::new()),
                stats: Mutex::new(TransferStats::default()),
            }),
        }
    }

    /// Returns the adapter's reported capabilities.
    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.inner.caps
    }

    /// Returns the fingerprint embedded in cached plan artifacts.
    ///
    /// A cached plan whose fingerprint differs from the current device
    /// must not be loaded.
    pub fn fingerprint(&self) -> String {
        format!("{}#api{}", self.inner.caps.name, DEVICE_API_VERSION)
    }

    /// Allocates a zero-filled device buffer of `bytes`.
    ///
    /// Returns `Err(OutOfMemory)` if the allocation would exceed the
    /// adapter's memory capacity. The returned [`DeviceBuffer`] frees the
    /// memory when dropped.
    pub fn allocate(&self, bytes: usize) -> Result<DeviceBuffer, DeviceError> {
        if bytes == 0 {
            return Err(DeviceError::ZeroSizedAllocation);
        }

        let current = self.inner.allocated_bytes.load(Ordering::Acquire);
        let capacity = self.inner.caps.memory_bytes;
        if current + bytes > capacity {
            return Err(DeviceError::OutOfMemory {
                requested_bytes: bytes,
                available_bytes: capacity.saturating_sub(current),
                capacity_bytes: capacity,
            });
        }

        let id = BufferId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        {
            let mut memory = self.inner.memory.lock().expect("device memory lock poisoned");
            memory.insert(id.0, vec![0u8; bytes]);
        }
        self.inner.allocated_bytes.fetch_add(bytes, Ordering::Release);

        if let Ok(mut stats) = self.inner.stats.lock() {
            let live = self.inner.allocated_bytes.load(Ordering::Acquire);
            stats.record_allocation(live);
        }

        Ok(DeviceBuffer::new(id, bytes, Arc::clone(&self.inner)))
    }

    /// Copies `src` into the buffer identified by `id` (host→device).
    pub fn write(&self, id: BufferId, src: &[u8]) -> Result<(), DeviceError> {
        self.inner.write(id, src)
    }

    /// Copies the buffer identified by `id` into `dst` (device→host).
    pub fn read(&self, id: BufferId, dst: &mut [u8]) -> Result<(), DeviceError> {
        self.inner.read(id, dst)
    }

    /// Returns the currently live device memory in bytes.
    pub fn allocated_bytes(&self) -> usize {
        self.inner.allocated_bytes.load(Ordering::Acquire)
    }

    /// Returns a snapshot of the cumulative transfer statistics.
    pub fn stats(&self) -> TransferStats {
        self.inner
            .stats
            .lock()
            .map(|s| *s)
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.inner.caps.name)
            .field("fast_fp16", &self.inner.caps.fast_fp16)
            .field("allocated_bytes", &self.allocated_bytes())
            .finish()
    }
}
