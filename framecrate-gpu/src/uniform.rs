//! Per-draw transform uniform

use bytemuck::{Pod, Zeroable};
use nalgebra::Matrix4;

use crate::device::GpuContext;

/// Uniform block layout: one column-major 4x4 matrix
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct TransformData {
    pub model_view_projection: [[f32; 4]; 4],
}

impl TransformData {
    pub fn new(model_view_projection: &Matrix4<f32>) -> Self {
        Self {
            model_view_projection: (*model_view_projection).into(),
        }
    }
}

/// Uniform buffer and bind group holding one model-view-projection matrix
pub struct TransformUniform {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl TransformUniform {
    /// Layout shared by every transform uniform and the frame pipelines
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("transform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<TransformData>() as u64
                    ),
                },
                count: None,
            }],
        })
    }

    pub fn new(context: &GpuContext, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let buffer = context.create_buffer_init(
            &format!("{} transform buffer", label),
            &[TransformData::new(&Matrix4::identity())],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} transform bind group", label)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self { buffer, bind_group }
    }

    /// Stage a new matrix; it takes effect with the next queue submission
    pub fn write(&self, queue: &wgpu::Queue, model_view_projection: &Matrix4<f32>) {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::bytes_of(&TransformData::new(model_view_projection)),
        );
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

impl Drop for TransformUniform {
    fn drop(&mut self) {
        self.buffer.destroy();
    }
}
