// ============================================
// Render System - Кадр рендеринга
// ============================================
// Выбор LOD-боксов -> заливка констант -> проходы. Статистика
// выбора логируется отсюда: само квадродерево ввода-вывода не делает.

use winit::event_loop::ActiveEventLoop;

use crate::core::SceneResources;
use crate::render::{FrameContext, Renderer};
use crate::terrain::SelectedBox;

/// Раз в сколько кадров писать статистику LOD в лог
const LOD_LOG_EVERY_N_FRAMES: u64 = 60;

pub struct RenderSystem;

impl RenderSystem {
    pub fn render(resources: &mut SceneResources, event_loop: &ActiveEventLoop) {
        if resources.renderer.is_none() {
            return;
        }

        // Решение LOD на этот кадр
        let eye = resources.camera.position();
        let mut boxes = std::mem::take(&mut resources.selected_boxes);
        resources.terrain.quadtree.select_into(eye, &mut boxes);

        resources.frame_index += 1;
        if resources.frame_index % LOD_LOG_EVERY_N_FRAMES == 0 && log::log_enabled!(log::Level::Debug) {
            Self::log_lod_stats(resources, &boxes);
        }

        let renderer = resources.renderer.as_mut().unwrap();
        renderer.update(
            &resources.camera,
            &resources.cascades,
            &resources.day_night.light(),
            &resources.terrain,
            resources.use_textures,
            &resources.water_params,
            resources.water_time,
        );

        let camera_frustum = resources.camera.view_frustum();
        // В вайрфрейм-режиме вода не рисуется
        let water_visible = !resources.wireframe
            && Renderer::water_visible(
                &camera_frustum,
                &resources.terrain.bounds(),
                resources.water_params.level,
            );

        let ctx = FrameContext {
            boxes: &boxes,
            camera_frustum: &camera_frustum,
            cascades: &resources.cascades,
            wireframe: resources.wireframe,
            water_visible,
        };

        match renderer.render(&ctx) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => {
                let size = renderer.size();
                renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory");
                event_loop.exit();
            }
            Err(e) => log::error!("Render error: {:?}", e),
        }

        resources.selected_boxes = boxes;
    }

    /// Сводка выбора: число боксов, покрытие в патчах, мин/макс размеры
    fn log_lod_stats(resources: &SceneResources, boxes: &[SelectedBox]) {
        let (pw, ph) = resources.terrain.quadtree.patch_count();
        let cells_x = (pw - 1).max(0);
        let cells_y = (ph - 1).max(0);
        let total_patches = cells_x * cells_y;

        let mut est_patches: i64 = 0;
        let mut min_w = i32::MAX;
        let mut min_h = i32::MAX;
        let mut max_w = 0;
        let mut max_h = 0;

        for b in boxes {
            let x0 = b.cell_x0.clamp(0, cells_x);
            let x1 = b.cell_x1.clamp(0, cells_x);
            let y0 = b.cell_y0.clamp(0, cells_y);
            let y1 = b.cell_y1.clamp(0, cells_y);
            let w = (x1 - x0).max(0);
            let h = (y1 - y0).max(0);

            est_patches += (w * h) as i64;
            min_w = min_w.min(w);
            min_h = min_h.min(h);
            max_w = max_w.max(w);
            max_h = max_h.max(h);
        }

        let eye = resources.camera.position();
        let coverage = if total_patches > 0 {
            100.0 * est_patches as f64 / total_patches as f64
        } else {
            0.0
        };

        log::debug!(
            "[LOD] frame={} | eye=({:.1}, {:.1}, {:.1}) | grid={}x{} patches={} | boxes={} | \
             est_patches={} ({:.1}%) | box_size[min={}x{} max={}x{}]",
            resources.frame_index,
            eye.x,
            eye.y,
            eye.z,
            cells_x,
            cells_y,
            total_patches,
            boxes.len(),
            est_patches,
            coverage,
            if min_w == i32::MAX { 0 } else { min_w },
            if min_h == i32::MAX { 0 } else { min_h },
            max_w,
            max_h,
        );
    }
}
