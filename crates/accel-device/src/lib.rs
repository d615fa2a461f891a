// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # accel-device
//!
//! The accelerator abstraction underneath the accel-rt pipeline: device
//! capabilities, device-resident memory, and explicit host↔device
//! transfers.
//!
//! # Key Components
//!
//! - [`DeviceCapabilities`] — what the adapter reports: name, fast-fp16
//!   support, memory capacity.
//! - [`Device`] — a cheap-to-clone handle to one accelerator adapter.
//!   This crate ships an in-process simulated adapter; the handle is the
//!   seam where a native accelerator binding would plug in.
//! - [`DeviceBuffer`] — an RAII guard around a device allocation. When
//!   the guard is dropped, the memory is returned to the adapter. The
//!   borrow checker prevents use-after-free.
//! - [`WorkspaceBudget`] — a hard scratch-memory ceiling with
//!   human-readable parsing (`"256M"`, `"1G"`, ...), used to configure
//!   plan compilation.
//! - [`TransferStats`] — cumulative allocation and transfer counters.
//!
//! # Ownership Model
//!
//! ```text
//! Device::allocate(bytes)
//!       │
//!       ▼
//!   DeviceBuffer  ◄─── holds a buffer id + Arc<DeviceInner>
//!       │
//!       │  drop()
//!       ▼
//!   DeviceInner::free()  ──► capacity returned
//! ```
//!
//! All transfers are synchronous on the calling thread: `write` and
//! `read` return only once the copy is complete.
//!
//! # Example
//! ```
//! use accel_device::Device;
//!
//! let device = Device::open();
//! let buf = device.allocate(1024).unwrap();
//! buf.write(&[0u8; 1024]).unwrap();
//! assert_eq!(device.allocated_bytes(), 1024);
//! drop(buf);
//! assert_eq!(device.allocated_bytes(), 0);
//! ```

mod budget;
mod buffer;
mod capabilities;
mod device;
mod error;
mod stats;

pub use budget::WorkspaceBudget;
pub use buffer::{BufferId, DeviceBuffer};
pub use capabilities::DeviceCapabilities;
pub use device::Device;
pub use error::DeviceError;
pub use stats::TransferStats;
