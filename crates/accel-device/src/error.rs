// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the device abstraction.

/// Errors that can occur in the device layer.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// An allocation would exceed the device memory capacity.
    #[error(
        "device out of memory: requested {requested_bytes} bytes, \
         {available_bytes} available of {capacity_bytes} capacity"
    )]
    OutOfMemory {
        requested_bytes: usize,
        available_bytes: usize,
        capacity_bytes: usize,
    },

    /// A zero-byte allocation was requested.
    #[error("zero-sized device allocation")]
    ZeroSizedAllocation,

    /// A transfer referenced a buffer that no longer exists.
    #[error("invalid device buffer id {0}")]
    InvalidBuffer(u64),

    /// A transfer did not cover the whole buffer.
    #[error(
        "transfer size mismatch on buffer {buffer}: buffer is {expected} bytes, \
         host side is {actual} bytes"
    )]
    TransferSizeMismatch {
        buffer: u64,
        expected: usize,
        actual: usize,
    },

    /// A budget string could not be parsed.
    #[error("invalid budget: {0}")]
    InvalidBudget(String),
}
