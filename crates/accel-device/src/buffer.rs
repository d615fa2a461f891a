// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RAII guard for device-resident memory.
//!
//! [`DeviceBuffer`] owns one device allocation. When the guard is dropped,
//! the memory is returned to the adapter and the capacity counter is
//! decremented — release happens exactly once regardless of exit path.

use crate::device::DeviceInner;
use crate::DeviceError;
use std::sync::Arc;

/// Opaque handle identifying one device allocation.
///
/// Ids are what the execute calling convention passes around: a slot-ordered
/// sequence of `BufferId`s names the device-resident tensors for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) u64);

impl BufferId {
    /// Returns the raw id value (for logs).
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// An RAII guard wrapping one device allocation.
///
/// # Example
/// ```
/// use accel_device::Device;
///
/// let device = Device::open();
/// let buf = device.allocate(64).unwrap();
/// buf.write(&[7u8; 64]).unwrap();
/// let mut back = [0u8; 64];
/// buf.read(&mut back).unwrap();
/// assert_eq!(back, [7u8; 64]);
/// ```
pub struct DeviceBuffer {
    id: BufferId,
    len: usize,
    device: Arc<DeviceInner>,
}

impl DeviceBuffer {
    pub(crate) fn new(id: BufferId, len: usize, device: Arc<DeviceInner>) -> Self {
        Self { id, len, device }
    }

    /// Returns the buffer id for the execute calling convention.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Returns the buffer size in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer has zero size (never the case for
    /// buffers handed out by [`Device::allocate`](crate::Device::allocate)).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copies `src` into the device buffer (host→device).
    ///
    /// The copy is whole-buffer: `src.len()` must equal the buffer size.
    pub fn write(&self, src: &[u8]) -> Result<(), DeviceError> {
        self.device.write(self.id, src)
    }

    /// Copies the device buffer into `dst` (device→host).
    ///
    /// The copy is whole-buffer: `dst.len()` must equal the buffer size.
    pub fn read(&self, dst: &mut [u8]) -> Result<(), DeviceError> {
        self.device.read(self.id, dst)
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        self.device.free(self.id, self.len);
    }
}

impl std::fmt::Debug for DeviceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("id", &self.id.0)
            .field("len", &self.len)
            .finish()
    }
}
