// ============================================
// Init System - Инициализация сцены
// ============================================

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use winit::window::Window;

use crate::camera::Camera;
use crate::core::SceneResources;
use crate::lighting::{DayNightCycle, ShadowCascades};
use crate::render::{Renderer, WaterParams};
use crate::terrain::{Raster, Terrain, PATCH_STRIDE};

/// Имена карт рядом с бинарём; при отсутствии генерируется шум
const HEIGHTMAP_FILE: &str = "hm6.png";
const DISPLACEMENT_FILE: &str = "disp_4k.png";

/// Размер процедурной карты высот, когда файла нет
const FALLBACK_HEIGHTMAP_SIZE: u32 = 512;
const FALLBACK_DISPLACEMENT_SIZE: u32 = 256;

/// Длительность суток в секундах
const DAY_PERIOD: f32 = 600.0;

pub struct InitSystem;

impl InitSystem {
    /// Создать ресурсы сцены: карты, террейн, камера, свет
    pub fn create_resources() -> SceneResources {
        let height_map = match Raster::from_png(Path::new(HEIGHTMAP_FILE)) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("{}: {} — генерируем шумовую карту", HEIGHTMAP_FILE, e);
                Raster::generated_heightmap(FALLBACK_HEIGHTMAP_SIZE)
            }
        };
        let displacement_map = match Raster::from_png(Path::new(DISPLACEMENT_FILE)) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("{}: {} — генерируем шумовую карту", DISPLACEMENT_FILE, e);
                Raster::generated_displacement(FALLBACK_DISPLACEMENT_SIZE)
            }
        };

        let terrain = Terrain::new(height_map, displacement_map, PATCH_STRIDE);

        // Вода по умолчанию на трети высоты рельефа
        let water_params = WaterParams {
            level: terrain.height_field.height_scale() * 0.3,
            ..WaterParams::default()
        };

        let now = Instant::now();
        SceneResources {
            window: None,
            renderer: None,
            terrain,
            camera: Camera::new(1280, 720),
            day_night: DayNightCycle::new(DAY_PERIOD),
            cascades: ShadowCascades::new(2048),
            water_params,
            water_time: 0.0,
            use_textures: true,
            lock_to_terrain: false,
            wireframe: false,
            selected_boxes: Vec::new(),
            frame_index: 0,
            start_time: now,
            last_frame: now,
            fps_frames: 0,
            fps_last_update: now,
        }
    }

    /// Инициализация рендеринга (вызывается при resumed)
    pub fn init_rendering(resources: &mut SceneResources, window: Arc<Window>) {
        let renderer = pollster::block_on(Renderer::new(window.clone(), &resources.terrain));

        // Каскады считаются под фактический размер квадранта атласа
        resources.cascades = ShadowCascades::new(renderer.shadow_map_size());

        let size = renderer.size();
        resources.camera.resize(size.width, size.height);
        resources.window = Some(window);
        resources.renderer = Some(renderer);
    }
}
