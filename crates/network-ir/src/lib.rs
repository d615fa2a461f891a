// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # network-ir
//!
//! The portable, hardware-independent network description consumed by the
//! accel-rt runtime.
//!
//! A description is a JSON manifest naming one input tensor and an ordered
//! chain of stages. It says nothing about the device it will run on: the
//! runtime's builder turns it into a device-optimized [`CompiledPlan`]
//! (`runtime::CompiledPlan`), choosing precision and checking resource
//! ceilings at that point.
//!
//! # Key Components
//!
//! - [`NetworkDescription`] — the manifest: name, input spec, stage chain.
//! - [`StageOp`] — the operation vocabulary (`scale`, `shift`, `relu`,
//!   `pool`, `softmax`).
//! - [`Shape`] — dimension bookkeeping (rank, element count, byte size).
//! - [`NetworkError`] — read/parse/validation failures.

mod description;
mod error;
mod shape;

pub use description::{InputDef, NetworkDescription, StageDef, StageOp};
pub use error::NetworkError;
pub use shape::Shape;
