// ============================================
// Update System - Логика кадра
// ============================================

use ultraviolet::Vec3;

use crate::core::SceneResources;

/// Высота камеры над поверхностью при привязке к земле
const GROUND_LOCK_OFFSET: f32 = 2.0;

pub struct UpdateSystem;

impl UpdateSystem {
    /// Порядок кадра: время воды -> привязка к земле -> свет -> каскады
    pub fn update(resources: &mut SceneResources, dt: f32) {
        // Ограничиваем скачки времени (пауза в отладчике и т.п.)
        if dt < 0.25 {
            resources.water_time += dt;
        }

        if resources.lock_to_terrain {
            let eye = resources.camera.position();
            let h = resources.terrain.surface_height_at(eye.x, eye.y) + GROUND_LOCK_OFFSET;
            resources.camera.lock_position(Vec3::new(eye.x, eye.y, h));
        }

        resources.day_night.update(dt);

        let bounds = resources.terrain.bounds();
        resources
            .cascades
            .update(&bounds, &resources.camera, resources.day_night.light().direction);
    }
}
