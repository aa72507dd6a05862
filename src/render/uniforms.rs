// ============================================
// Uniforms - Константы кадра для шейдеров
// ============================================

use bytemuck::{Pod, Zeroable};
use ultraviolet::Mat4;

use crate::camera::Camera;
use crate::geometry::Plane;
use crate::lighting::{DirectionalLight, ShadowCascades, CASCADE_COUNT};

/// Константы кадра: матрицы, тени, фрустум, свет, флаги
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub shadow_tex_matrices: [[[f32; 4]; 4]; CASCADE_COUNT],
    pub eye: [f32; 4],
    pub frustum: [[f32; 4]; 6],
    pub light_ambient: [f32; 4],
    pub light_diffuse: [f32; 4],
    pub light_specular: [f32; 4],
    pub light_direction: [f32; 4],
    /// x = флаг текстурирования, остальное — резерв
    pub params: [f32; 4],
}

impl FrameUniforms {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::identity().into(),
            shadow_tex_matrices: [Mat4::identity().into(); CASCADE_COUNT],
            eye: [0.0; 4],
            frustum: [[0.0; 4]; 6],
            light_ambient: [0.0; 4],
            light_diffuse: [0.0; 4],
            light_specular: [0.0; 4],
            light_direction: [0.0, 0.0, -1.0, 0.0],
            params: [0.0; 4],
        }
    }

    pub fn update(
        &mut self,
        camera: &Camera,
        cascades: &ShadowCascades,
        light: &DirectionalLight,
        use_textures: bool,
    ) {
        self.view_proj = camera.view_projection().into();
        for (dst, cascade) in self.shadow_tex_matrices.iter_mut().zip(&cascades.cascades) {
            *dst = cascade.view_proj_tex.into();
        }
        let eye = camera.position();
        self.eye = [eye.x, eye.y, eye.z, 1.0];
        self.frustum = camera.view_frustum();
        self.light_ambient = [light.ambient.x, light.ambient.y, light.ambient.z, 1.0];
        self.light_diffuse = [light.diffuse.x, light.diffuse.y, light.diffuse.z, 1.0];
        self.light_specular = [light.specular.x, light.specular.y, light.specular.z, 1.0];
        self.light_direction = [light.direction.x, light.direction.y, light.direction.z, 0.0];
        self.params = [if use_textures { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0];
    }
}

/// Константы террейна: заливаются один раз при создании
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct TerrainUniforms {
    pub scale: f32,
    pub width: f32,
    pub depth: f32,
    pub base: f32,
}

/// Константы прохода теней одного каскада
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ShadowPassUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
    pub frustum: [[f32; 4]; 4],
}

impl ShadowPassUniforms {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::identity().into(),
            eye: [0.0; 4],
            frustum: [[0.0; 4]; 4],
        }
    }

    pub fn update(&mut self, view_proj: &Mat4, eye: [f32; 4], frustum: &[Plane; 4]) {
        self.view_proj = (*view_proj).into();
        self.eye = eye;
        self.frustum = *frustum;
    }
}

/// Константы воды: одна плоскость-квад с аналитическими волнами
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WaterUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
    pub light_direction: [f32; 4],
    pub light_color: [f32; 4],
    /// x = время, y = уровень воды, z = полуразмер, w = амплитуда волн
    pub params0: [f32; 4],
    /// x = длина волны, y = скорость, z/w = центр XY
    pub params1: [f32; 4],
}

impl WaterUniforms {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::identity().into(),
            eye: [0.0; 4],
            light_direction: [0.0, 0.0, -1.0, 0.0],
            light_color: [1.0; 4],
            params0: [0.0; 4],
            params1: [50.0, 0.8, 0.0, 0.0],
        }
    }
}
