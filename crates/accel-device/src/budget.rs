// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Workspace budget configuration and parsing.
//!
//! A [`WorkspaceBudget`] is the hard scratch-memory ceiling handed to the
//! plan builder. It supports human-readable string parsing for config and
//! CLI ergonomics.

use crate::DeviceError;
use std::fmt;

/// A hard scratch-memory ceiling for plan compilation.
///
/// # Parsing
/// Supports human-readable strings with SI-style suffixes:
/// - `"256M"` or `"256MB"` → 256 × 1024² bytes
/// - `"1G"` or `"1GB"` → 1 × 1024³ bytes
/// - `"2048K"` or `"2048KB"` → 2048 × 1024 bytes
/// - `"1048576"` → raw byte count
///
/// # Examples
/// ```
/// use accel_device::WorkspaceBudget;
///
/// let b = WorkspaceBudget::from_mb(256);
/// assert_eq!(b.as_mb(), 256);
///
/// let b = WorkspaceBudget::parse("1G").unwrap();
/// assert_eq!(b.as_mb(), 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceBudget {
    bytes: usize,
}

impl WorkspaceBudget {
    /// Creates a budget from a byte count.
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    /// Creates a budget from megabytes.
    pub fn from_mb(mb: usize) -> Self {
        Self {
            bytes: mb * 1024 * 1024,
        }
    }

    /// Returns the budget in bytes.
    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Returns the budget in megabytes (truncated).
    pub fn as_mb(&self) -> usize {
        self.bytes / (1024 * 1024)
    }

    /// Parses a human-readable budget string.
    ///
    /// A number with an optional `K`/`M`/`G` binary-unit suffix; a
    /// trailing `B` is tolerated (`"256MB"` == `"256M"`, `"100B"` is raw
    /// bytes). Case-insensitive. Zero budgets are rejected.
    pub fn parse(s: &str) -> Result<Self, DeviceError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DeviceError::InvalidBudget("empty budget string".into()));
        }

        let mut upper = trimmed.to_ascii_uppercase();
        if upper.len() > 1 && upper.ends_with('B') {
            upper.pop();
        }
        let (digits, multiplier) = UNITS
            .iter()
            .find_map(|&(unit, mult)| upper.strip_suffix(unit).map(|d| (d, mult)))
            .unwrap_or((upper.as_str(), 1));

        let value: usize = digits.trim().parse().map_err(|_| {
            DeviceError::InvalidBudget(format!(
                "'{s}' — expected a number followed by an optional suffix (K, M, G)"
            ))
        })?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| DeviceError::InvalidBudget(format!("overflow: '{s}'")))?;

        if bytes == 0 {
            return Err(DeviceError::InvalidBudget(format!("zero budget: '{s}'")));
        }

        Ok(Self { bytes })
    }
}

/// Binary units, largest first so parsing and display both pick the
/// biggest match.
const UNITS: &[(&str, usize)] = &[("G", 1 << 30), ("M", 1 << 20), ("K", 1 << 10)];

impl fmt::Display for WorkspaceBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &(unit, mult) in UNITS {
            if self.bytes >= mult && self.bytes % mult == 0 {
                return write!(f, "{} {unit}B", self.bytes / mult);
            }
        }
        write!(f, "{} B", self.bytes)
    }
}
