// ============================================
// Shadow Atlas - Атлас теней 2x2
// ============================================
// Один depth-текстур на все четыре каскада; каскад рисуется в свой
// квадрант через viewport, выборка — comparison-сэмплером

pub struct ShadowAtlas {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub bind_group: wgpu::BindGroup,
    size: u32,
}

impl ShadowAtlas {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Atlas"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Atlas BG"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self { texture, view, sampler, bind_group, size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Размер карты одного каскада (квадранта)
    pub fn quadrant_size(&self) -> u32 {
        self.size / 2
    }

    /// Viewport квадранта каскада i: левая колонка для 0/1,
    /// верхняя строка для 0/2 — как и матрицы перевода в атлас
    pub fn quadrant_viewport(&self, index: usize) -> (f32, f32, f32, f32) {
        let half = (self.size / 2) as f32;
        let x = if index < 2 { 0.0 } else { half };
        let y = if index % 2 == 0 { 0.0 } else { half };
        (x, y, half, half)
    }
}

#[cfg(test)]
mod tests {
    // Расположение квадрантов должно совпадать с atlas_quadrant_matrix:
    // каскад 0 — левый верхний, 3 — правый нижний
    #[test]
    fn test_quadrant_layout() {
        // Проверяем чистую геометрию без устройства
        let size = 4096u32;
        let half = (size / 2) as f32;
        let quadrant = |index: usize| -> (f32, f32) {
            let x = if index < 2 { 0.0 } else { half };
            let y = if index % 2 == 0 { 0.0 } else { half };
            (x, y)
        };
        assert_eq!(quadrant(0), (0.0, 0.0));
        assert_eq!(quadrant(1), (0.0, half));
        assert_eq!(quadrant(2), (half, 0.0));
        assert_eq!(quadrant(3), (half, half));
    }
}
