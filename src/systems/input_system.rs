// ============================================
// Input System - Обработка ввода
// ============================================

use ultraviolet::Vec3;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

use crate::core::SceneResources;

/// Шаг перемещения камеры за нажатие
const MOVE_STEP: f32 = 5.0;

/// Градусов поворота на единицу смещения мыши
const ROT_ANGLE: f32 = 0.75;

/// Ограничение смещения мыши за событие: большие скачки не должны
/// насыщать скорость поворота
const MOUSE_CLAMP: f32 = 20.0;

/// Действия, которые обрабатываются снаружи
#[derive(Debug, Clone, Copy)]
pub enum InputAction {
    Quit,
}

pub struct InputSystem;

impl InputSystem {
    /// Обработка клавиатуры: движение, режимы, вода, пауза теней
    pub fn process_keyboard(
        resources: &mut SceneResources,
        keycode: KeyCode,
        state: ElementState,
    ) -> Option<InputAction> {
        if state != ElementState::Pressed {
            return None;
        }

        match keycode {
            KeyCode::Escape => return Some(InputAction::Quit),

            // Движение: вперёд/назад, влево/вправо, вверх/вниз
            KeyCode::KeyW => resources.camera.translate(Vec3::new(MOVE_STEP, 0.0, 0.0)),
            KeyCode::KeyS => resources.camera.translate(Vec3::new(-MOVE_STEP, 0.0, 0.0)),
            KeyCode::KeyA => resources.camera.translate(Vec3::new(0.0, MOVE_STEP, 0.0)),
            KeyCode::KeyD => resources.camera.translate(Vec3::new(0.0, -MOVE_STEP, 0.0)),
            KeyCode::KeyQ => resources.camera.translate(Vec3::new(0.0, 0.0, MOVE_STEP)),
            KeyCode::KeyZ => resources.camera.translate(Vec3::new(0.0, 0.0, -MOVE_STEP)),

            // Переключатели
            KeyCode::KeyT => resources.use_textures = !resources.use_textures,
            KeyCode::KeyL => resources.lock_to_terrain = !resources.lock_to_terrain,
            KeyCode::Space => resources.day_night.toggle_pause(),

            // Уровень воды
            KeyCode::Equal | KeyCode::NumpadAdd => resources.water_params.level += 1.0,
            KeyCode::Minus | KeyCode::NumpadSubtract => resources.water_params.level -= 1.0,

            // Режимы отрисовки: 1 — вайрфрейм, 2 — обычный
            KeyCode::Digit1 => resources.wireframe = true,
            KeyCode::Digit2 => resources.wireframe = false,

            _ => {}
        }
        None
    }

    /// Поворот камеры мышью; каждая ось зажата в +-MOUSE_CLAMP
    pub fn process_mouse_motion(resources: &mut SceneResources, delta: (f64, f64)) {
        let mx = (-delta.0 as f32).clamp(-MOUSE_CLAMP, MOUSE_CLAMP);
        let my = (-delta.1 as f32).clamp(-MOUSE_CLAMP, MOUSE_CLAMP);

        resources.camera.pitch(ROT_ANGLE * my);
        resources.camera.yaw(-ROT_ANGLE * mx);
    }
}
