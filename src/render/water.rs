// ============================================
// Water - Анимированная плоскость воды
// ============================================
// Один квад на весь террейн, вершины генерирует вершинный шейдер
// (DrawInstanced(4) без буферов). Видимость решает вызывающая
// сторона AABB-тестом против фрустума камеры.

use ultraviolet::Vec3;
use wgpu::util::DeviceExt;

use super::uniforms::WaterUniforms;
use crate::camera::Camera;
use crate::geometry::BoundingSphere;
use crate::lighting::DirectionalLight;

/// Параметры волн и уровня воды
#[derive(Clone, Copy, Debug)]
pub struct WaterParams {
    pub level: f32,
    pub wave_amp: f32,
    pub wave_len: f32,
    pub wave_speed: f32,
}

impl Default for WaterParams {
    fn default() -> Self {
        Self {
            level: 10.0,
            wave_amp: 0.8,
            wave_len: 50.0,
            wave_speed: 0.8,
        }
    }
}

pub struct WaterRenderer {
    uniforms: WaterUniforms,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl WaterRenderer {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let uniforms = WaterUniforms::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Uniforms"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Water BG"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self { uniforms, buffer, bind_group }
    }

    pub fn update(
        &mut self,
        queue: &wgpu::Queue,
        camera: &Camera,
        light: &DirectionalLight,
        terrain_bounds: &BoundingSphere,
        params: &WaterParams,
        time: f32,
    ) {
        let eye = camera.position();
        let c = terrain_bounds.center;

        self.uniforms.view_proj = camera.view_projection().into();
        self.uniforms.eye = [eye.x, eye.y, eye.z, 1.0];
        self.uniforms.light_direction =
            [light.direction.x, light.direction.y, light.direction.z, 0.0];
        self.uniforms.light_color = [light.diffuse.x, light.diffuse.y, light.diffuse.z, 1.0];
        self.uniforms.params0 = [time, params.level, terrain_bounds.radius, params.wave_amp];
        self.uniforms.params1 = [params.wave_len, params.wave_speed, c.x, c.y];

        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniforms]));
    }

    /// AABB воды для теста видимости: XY-экстент сцены, по Z +-20 от уровня
    pub fn visibility_aabb(terrain_bounds: &BoundingSphere, level: f32) -> (Vec3, Vec3) {
        let c = terrain_bounds.center;
        (
            Vec3::new(c.x, c.y, level),
            Vec3::new(terrain_bounds.radius, terrain_bounds.radius, 20.0),
        )
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..4, 0..1);
    }
}
