// ============================================
// Resources - Общее состояние сцены
// ============================================

use std::sync::Arc;
use std::time::Instant;
use winit::window::Window;

use crate::camera::Camera;
use crate::lighting::{DayNightCycle, ShadowCascades};
use crate::render::{Renderer, WaterParams};
use crate::terrain::{SelectedBox, Terrain};

/// Все ресурсы сцены в одном месте
pub struct SceneResources {
    // Window & Rendering
    pub window: Option<Arc<Window>>,
    pub renderer: Option<Renderer>,

    // Scene entities
    pub terrain: Terrain,
    pub camera: Camera,
    pub day_night: DayNightCycle,
    pub cascades: ShadowCascades,

    // Water
    pub water_params: WaterParams,
    pub water_time: f32,

    // Toggles
    pub use_textures: bool,
    pub lock_to_terrain: bool,
    pub wireframe: bool,

    // Переиспользуемый буфер выбора LOD
    pub selected_boxes: Vec<SelectedBox>,
    pub frame_index: u64,

    // Timing
    pub start_time: Instant,
    pub last_frame: Instant,

    // FPS в заголовке окна
    pub fps_frames: u32,
    pub fps_last_update: Instant,
}
