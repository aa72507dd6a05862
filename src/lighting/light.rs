// ============================================
// Light - Направленный источник света
// ============================================

use ultraviolet::Vec3;

/// Направленный свет (солнце): три компоненты цвета + направление
#[derive(Clone, Copy, Debug)]
pub struct DirectionalLight {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Нормализованное направление ОТ источника
    pub direction: Vec3,
}

impl DirectionalLight {
    pub fn new(ambient: Vec3, diffuse: Vec3, specular: Vec3, direction: Vec3) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            direction: direction.normalized(),
        }
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction.normalized();
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            ambient: Vec3::new(0.3, 0.3, 0.3),
            diffuse: Vec3::new(1.0, 1.0, 1.0),
            specular: Vec3::new(0.6, 0.6, 0.6),
            direction: Vec3::new(0.0, 0.0, -1.0),
        }
    }
}
