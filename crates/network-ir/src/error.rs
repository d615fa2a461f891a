// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for network description loading and validation.

/// Errors that can occur when working with portable network descriptions.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// The description file could not be read.
    #[error("failed to read network description: {0}")]
    ReadError(#[from] std::io::Error),

    /// The description JSON is malformed.
    #[error("failed to parse network description: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The input tensor specification is invalid (e.g., wrong rank).
    #[error("invalid input '{input}': {detail}")]
    InvalidInput { input: String, detail: String },

    /// A stage definition is invalid (e.g., duplicate name, zero-width pool).
    #[error("invalid stage '{stage}': {detail}")]
    InvalidStage { stage: String, detail: String },

    /// The description as a whole is malformed (e.g., no stages).
    #[error("invalid network: {0}")]
    InvalidNetwork(String),
}
