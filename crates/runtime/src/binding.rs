// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Binding discovery.
//!
//! A binding is one named tensor slot on the execute calling convention.
//! Slot order is fixed by the plan: the input occupies slot 0, each
//! exposed output follows in execution order. Staging buffers and the
//! execute call all index by slot, so discovery runs once at init and the
//! result is immutable afterwards.

use crate::plan::CompiledPlan;
use network_ir::Shape;

/// Direction of one tensor slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingRole {
    Input,
    Output,
}

impl BindingRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingRole::Input => "input",
            BindingRole::Output => "output",
        }
    }
}

/// One named tensor slot with its batch-resolved dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorBinding {
    /// Binding name from the description.
    pub name: String,
    /// Input or output.
    pub role: BindingRole,
    /// Position on the execute calling convention.
    pub slot: usize,
    /// Full shape, batch included.
    pub shape: Shape,
}

impl TensorBinding {
    /// Total number of elements across the batch.
    pub fn volume(&self) -> usize {
        self.shape.num_elements()
    }

    /// Host/device buffer size in bytes (f32 elements).
    pub fn size_bytes(&self) -> usize {
        self.shape.size_bytes()
    }
}

/// The complete, slot-ordered binding table for one plan.
#[derive(Debug, Clone)]
pub struct BindingSet {
    bindings: Vec<TensorBinding>,
}

impl BindingSet {
    /// Walks the plan and enumerates its slots for the given batch.
    ///
    /// The plan has exactly one input; `batch` must already be resolved
    /// (built-in or bound on the context).
    pub fn discover(plan: &CompiledPlan, batch: usize) -> Self {
        let mut bindings = Vec::with_capacity(1 + plan.num_outputs());

        let mut input_dims = Vec::with_capacity(1 + plan.input_sample_dims.len());
        input_dims.push(batch);
        input_dims.extend_from_slice(&plan.input_sample_dims);
        bindings.push(TensorBinding {
            name: plan.input_name.clone(),
            role: BindingRole::Input,
            slot: 0,
            shape: Shape::new(input_dims),
        });

        for stage in plan.output_stages() {
            let name = match &stage.name {
                Some(n) => n.clone(),
                None => continue,
            };
            let mut dims = Vec::with_capacity(1 + stage.sample_dims.len());
            dims.push(batch);
            dims.extend_from_slice(&stage.sample_dims);
            let slot = bindings.len();
            bindings.push(TensorBinding {
                name,
                role: BindingRole::Output,
                slot,
                shape: Shape::new(dims),
            });
        }

        for b in &bindings {
            tracing::debug!(
                "binding {}: {} '{}' {}",
                b.slot,
                b.role.as_str(),
                b.name,
                b.shape,
            );
        }
        Self { bindings }
    }

    /// The input binding (always slot 0).
    pub fn input(&self) -> &TensorBinding {
        &self.bindings[0]
    }

    /// The output bindings in slot order.
    pub fn outputs(&self) -> impl Iterator<Item = &TensorBinding> {
        self.bindings[1..].iter()
    }

    /// Looks a binding up by name.
    pub fn get(&self, name: &str) -> Option<&TensorBinding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// All bindings in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &TensorBinding> {
        self.bindings.iter()
    }

    /// Total number of slots.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
