// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Staging buffers: one host/device pair per binding.
//!
//! All buffers are allocated once at init and reused for every batch —
//! the steady-state loop never allocates. The host side is where the
//! caller's data lands (`set_input`) and where results are read back
//! from; the device side is what the execute calling convention sees.
//! Transfers are bulk and explicit: all inputs down before execute, all
//! outputs up after.

use crate::binding::{BindingRole, BindingSet};
use crate::RuntimeError;
use accel_device::{BufferId, Device, DeviceBuffer};

/// Pre-allocated host and device storage for every binding slot.
pub struct StagingBufferSet {
    bindings: BindingSet,
    host: Vec<Vec<f32>>,
    device_bufs: Vec<DeviceBuffer>,
}

impl StagingBufferSet {
    /// Allocates a zeroed host vector and a device buffer for each slot.
    pub fn allocate(device: &Device, bindings: &BindingSet) -> Result<Self, RuntimeError> {
        let mut host = Vec::with_capacity(bindings.len());
        let mut device_bufs = Vec::with_capacity(bindings.len());
        for binding in bindings.iter() {
            host.push(vec![0f32; binding.volume()]);
            device_bufs.push(device.allocate(binding.size_bytes())?);
        }
        tracing::debug!(
            "allocated staging for {} bindings, {} device bytes",
            bindings.len(),
            device_bufs.iter().map(|b| b.len()).sum::<usize>(),
        );
        Ok(Self {
            bindings: bindings.clone(),
            host,
            device_bufs,
        })
    }

    /// Copies caller data into the host input buffer.
    ///
    /// `data.len()` must match the input binding volume exactly.
    pub fn set_input(&mut self, data: &[f32]) -> Result<(), RuntimeError> {
        let expected = self.bindings.input().volume();
        if data.len() != expected {
            return Err(RuntimeError::ContractViolation {
                expected,
                actual: data.len(),
            });
        }
        self.host[0].copy_from_slice(data);
        Ok(())
    }

    /// Bulk host→device copy of the input slot.
    pub fn copy_input_to_device(&self) -> Result<(), RuntimeError> {
        self.device_bufs[0]
            .write(bytemuck::cast_slice(&self.host[0]))
            .map_err(|e| RuntimeError::Execution {
                stage: "copy_to_device",
                detail: e.to_string(),
            })
    }

    /// Bulk device→host copy of every output slot.
    pub fn copy_outputs_to_host(&mut self) -> Result<(), RuntimeError> {
        for (slot, buf) in self.device_bufs.iter().enumerate().skip(1) {
            buf.read(bytemuck::cast_slice_mut(&mut self.host[slot]))
                .map_err(|e| RuntimeError::Execution {
                    stage: "copy_to_host",
                    detail: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Slot-ordered device buffer ids for the execute calling convention.
    pub fn binding_ids(&self) -> Vec<BufferId> {
        self.device_bufs.iter().map(|b| b.id()).collect()
    }

    /// Host-side view of any binding by name, input included.
    pub fn host(&self, name: &str) -> Option<&[f32]> {
        let binding = self.bindings.get(name)?;
        Some(&self.host[binding.slot])
    }

    /// Mutable host-side view of any binding by name.
    ///
    /// Writing an output slot only affects the host copy; the next
    /// `copy_outputs_to_host` overwrites it.
    pub fn host_mut(&mut self, name: &str) -> Option<&mut [f32]> {
        let slot = self.bindings.get(name)?.slot;
        Some(&mut self.host[slot])
    }

    /// Host-side view of one output by binding name.
    pub fn output(&self, name: &str) -> Option<&[f32]> {
        if self.bindings.get(name)?.role != BindingRole::Output {
            return None;
        }
        self.host(name)
    }

    /// All outputs in slot order, as `(name, values)` pairs.
    pub fn outputs(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.bindings
            .outputs()
            .map(|b| (b.name.as_str(), self.host[b.slot].as_slice()))
    }

    /// The binding table these buffers were sized from.
    pub fn bindings(&self) -> &BindingSet {
        &self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{CompiledPlan, CompiledStage, PlanOp, Precision};

    fn bindings() -> BindingSet {
        let plan = CompiledPlan {
            network_name: "s".into(),
            precision: Precision::Fp32,
            input_name: "data".into(),
            input_sample_dims: vec![4],
            builtin_batch: Some(2),
            workspace_bytes: 0,
            stages: vec![CompiledStage {
                name: Some("out".into()),
                op: PlanOp::Pool { outputs: 2 },
                sample_dims: vec![2],
            }],
        };
        BindingSet::discover(&plan, 2)
    }

    #[test]
    fn test_allocate_sizes_from_bindings() {
        let device = Device::open();
        let staging = StagingBufferSet::allocate(&device, &bindings()).unwrap();
        let ids = staging.binding_ids();
        assert_eq!(ids.len(), 2);
        // input 2x4 f32 + output 2x2 f32
        assert_eq!(device.allocated_bytes(), 8 * 4 + 4 * 4);
    }

    #[test]
    fn test_set_input_validates_length() {
        let device = Device::open();
        let mut staging = StagingBufferSet::allocate(&device, &bindings()).unwrap();

        assert!(staging.set_input(&[0.0; 8]).is_ok());
        let err = staging.set_input(&[0.0; 5]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::ContractViolation { expected: 8, actual: 5 }
        ));
    }

    #[test]
    fn test_roundtrip_through_device() {
        let device = Device::open();
        let mut staging = StagingBufferSet::allocate(&device, &bindings()).unwrap();
        staging.set_input(&[1.0; 8]).unwrap();
        staging.copy_input_to_device().unwrap();

        // Simulate an execute that fills the output slot.
        let ids = staging.binding_ids();
        device
            .write(ids[1], bytemuck::cast_slice(&[9.0f32; 4]))
            .unwrap();
        staging.copy_outputs_to_host().unwrap();

        assert_eq!(staging.output("out").unwrap(), &[9.0; 4]);
        assert!(staging.output("data").is_none());
        assert!(staging.output("missing").is_none());
    }

    #[test]
    fn test_host_views_by_name() {
        let device = Device::open();
        let mut staging = StagingBufferSet::allocate(&device, &bindings()).unwrap();

        let input = staging.host_mut("data").unwrap();
        assert_eq!(input.len(), 8);
        input.fill(3.0);
        assert_eq!(staging.host("data").unwrap(), &[3.0; 8]);
        assert!(staging.host("nope").is_none());
    }

    #[test]
    fn test_outputs_iterator() {
        let device = Device::open();
        let staging = StagingBufferSet::allocate(&device, &bindings()).unwrap();
        let outs: Vec<_> = staging.outputs().collect();
        assert_eq!(outs.len(), 1);
        assert_eq!(outs[0].0, "out");
        assert_eq!(outs[0].1.len(), 4);
    }
}
