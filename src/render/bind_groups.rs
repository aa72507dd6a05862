// ============================================
// Bind Groups - Лэйауты и ресурсы кадра
// ============================================

use wgpu::util::DeviceExt;

use super::uniforms::{FrameUniforms, ShadowPassUniforms, TerrainUniforms};
use crate::lighting::CASCADE_COUNT;

pub struct BindGroupLayouts {
    pub frame: wgpu::BindGroupLayout,
    pub shadow_atlas: wgpu::BindGroupLayout,
    pub shadow_pass: wgpu::BindGroupLayout,
    pub water: wgpu::BindGroupLayout,
}

impl BindGroupLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_entry = |binding: u32, visibility: wgpu::ShaderStages| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        // binding 0 — константы кадра, binding 1 — статические константы террейна
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let shadow_atlas = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Atlas Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let shadow_pass = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Pass Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });

        let water = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Water Layout"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });

        Self { frame, shadow_atlas, shadow_pass, water }
    }
}

/// Буферы констант кадра и каскадов с их bind group'ами
pub struct FrameResources {
    pub frame_uniforms: FrameUniforms,
    pub frame_buffer: wgpu::Buffer,
    pub terrain_buffer: wgpu::Buffer,
    pub frame_bind_group: wgpu::BindGroup,
    pub shadow_uniforms: [ShadowPassUniforms; CASCADE_COUNT],
    pub shadow_buffers: Vec<wgpu::Buffer>,
    pub shadow_bind_groups: Vec<wgpu::BindGroup>,
}

impl FrameResources {
    pub fn new(
        device: &wgpu::Device,
        layouts: &BindGroupLayouts,
        terrain_uniforms: TerrainUniforms,
    ) -> Self {
        let frame_uniforms = FrameUniforms::new();
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniforms"),
            contents: bytemuck::cast_slice(&[frame_uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        // Статический буфер констант террейна, заливается один раз
        let terrain_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Uniforms"),
            contents: bytemuck::cast_slice(&[terrain_uniforms]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame BG"),
            layout: &layouts.frame,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: terrain_buffer.as_entire_binding(),
                },
            ],
        });

        let shadow_uniforms = [ShadowPassUniforms::new(); CASCADE_COUNT];
        let shadow_buffers: Vec<_> = (0..CASCADE_COUNT)
            .map(|i| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Shadow Pass Uniforms {}", i)),
                    contents: bytemuck::cast_slice(&[shadow_uniforms[i]]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                })
            })
            .collect();
        let shadow_bind_groups: Vec<_> = shadow_buffers
            .iter()
            .enumerate()
            .map(|(i, buf)| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("Shadow Pass BG {}", i)),
                    layout: &layouts.shadow_pass,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buf.as_entire_binding(),
                    }],
                })
            })
            .collect();

        Self {
            frame_uniforms,
            frame_buffer,
            terrain_buffer,
            frame_bind_group,
            shadow_uniforms,
            shadow_buffers,
            shadow_bind_groups,
        }
    }

    /// Заливка всех буферов кадра на GPU
    pub fn upload(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[self.frame_uniforms]));
        for (buf, u) in self.shadow_buffers.iter().zip(&self.shadow_uniforms) {
            queue.write_buffer(buf, 0, bytemuck::cast_slice(&[*u]));
        }
    }
}
