// ============================================
// Renderer - GPU-состояние и проходы кадра
// ============================================
// Владеет surface/device/queue, статическими буферами террейна,
// атласом теней и пайплайнами. Каждый кадр: проход теней по четырём
// квадрантам атласа -> основной проход -> вода.
//
// Список боксов LOD потребляется отрисовкой: тело террейна рисуется
// построчными поддиапазонами индексов выбранных боксов, и каждый
// проход отсекает боксы своим фрустумом.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use super::bind_groups::{BindGroupLayouts, FrameResources};
use super::depth::create_depth_texture;
use super::pipelines::Pipelines;
use super::shadow_atlas::ShadowAtlas;
use super::uniforms::TerrainUniforms;
use super::water::{WaterParams, WaterRenderer};
use crate::camera::Camera;
use crate::geometry::{aabb_outside_frustum, Plane};
use crate::lighting::{DirectionalLight, ShadowCascades, CASCADE_COUNT};
use crate::terrain::{SelectedBox, Terrain};

/// Размер атласа теней (2x2 квадранта)
const SHADOW_ATLAS_SIZE: u32 = 4096;

/// Запас AABB-теста воды, как у оригинальной сцены
const WATER_CULL_PAD: f32 = 1000.0;

/// Цвет очистки неба
const SKY_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.6,
    b: 1.0,
    a: 1.0,
};

/// Статические буферы террейна: заливаются один раз при создании
struct TerrainBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    body_index_count: u32,
    cells_x: i32,
    cells_y: i32,
}

/// Вход одного кадра для рендера
pub struct FrameContext<'a> {
    pub boxes: &'a [SelectedBox],
    pub camera_frustum: &'a [Plane; 6],
    pub cascades: &'a ShadowCascades,
    pub wireframe: bool,
    pub water_visible: bool,
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,

    depth_view: wgpu::TextureView,
    pipelines: Pipelines,
    shadow_atlas: ShadowAtlas,
    frame_resources: FrameResources,
    water: WaterRenderer,
    terrain_buffers: TerrainBuffers,
}

impl Renderer {
    pub async fn new(window: Arc<winit::window::Window>, terrain: &Terrain) -> Self {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window).unwrap();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        // Вайрфрейм-режим берём, только если адаптер его умеет
        let wireframe_supported = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if wireframe_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("GPU Device"),
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .unwrap();

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_texture(&device, &config);
        let layouts = BindGroupLayouts::new(&device);
        let shadow_atlas = ShadowAtlas::new(&device, &layouts.shadow_atlas, SHADOW_ATLAS_SIZE);
        let terrain_uniforms = TerrainUniforms {
            scale: terrain.height_field.height_scale(),
            width: terrain.height_field.width() as f32,
            depth: terrain.height_field.height() as f32,
            base: terrain.mesh.h_base,
        };
        let frame_resources = FrameResources::new(&device, &layouts, terrain_uniforms);
        let water = WaterRenderer::new(&device, &layouts.water);
        let pipelines = Pipelines::new(&device, config.format, &layouts, wireframe_supported);

        // Статические буферы террейна: один раз, на всё время жизни
        let mesh = &terrain.mesh;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let terrain_buffers = TerrainBuffers {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
            body_index_count: mesh.body_index_count,
            cells_x: mesh.cells_x as i32,
            cells_y: mesh.cells_y as i32,
        };

        log::info!(
            "Renderer: {}x{}, {:?}, shadow atlas {}x{}",
            config.width,
            config.height,
            surface_format,
            SHADOW_ATLAS_SIZE,
            SHADOW_ATLAS_SIZE
        );

        Self {
            surface,
            device,
            queue,
            config,
            size,
            depth_view,
            pipelines,
            shadow_atlas,
            frame_resources,
            water,
            terrain_buffers,
        }
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_texture(&self.device, &self.config);
        }
    }

    /// Квадрант атласа = карта теней одного каскада
    pub fn shadow_map_size(&self) -> u32 {
        self.shadow_atlas.quadrant_size()
    }

    /// Заливка констант кадра: основной проход, каскады, вода
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        camera: &Camera,
        cascades: &ShadowCascades,
        light: &DirectionalLight,
        terrain: &Terrain,
        use_textures: bool,
        water_params: &WaterParams,
        water_time: f32,
    ) {
        self.frame_resources.frame_uniforms.update(camera, cascades, light, use_textures);

        let eye = camera.position();
        let eye4 = [eye.x, eye.y, eye.z, 1.0];
        for (i, cascade) in cascades.cascades.iter().enumerate() {
            self.frame_resources.shadow_uniforms[i].update(
                &cascade.view_proj,
                eye4,
                &cascade.frustum,
            );
        }
        self.frame_resources.upload(&self.queue);

        self.water.update(
            &self.queue,
            camera,
            light,
            &terrain.bounds(),
            water_params,
            water_time,
        );
    }

    pub fn render(&mut self, ctx: &FrameContext<'_>) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.encode_shadow_pass(&mut encoder, ctx);
        self.encode_main_pass(&mut encoder, &view, ctx);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Четыре каскада в один атлас: очистка один раз, каскад выбирается
    /// viewport'ом своего квадранта
    fn encode_shadow_pass(&self, encoder: &mut wgpu::CommandEncoder, ctx: &FrameContext<'_>) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.shadow_atlas.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipelines.shadow);
        pass.set_vertex_buffer(0, self.terrain_buffers.vertex_buffer.slice(..));
        pass.set_index_buffer(
            self.terrain_buffers.index_buffer.slice(..),
            wgpu::IndexFormat::Uint32,
        );

        for i in 0..CASCADE_COUNT {
            let (x, y, w, h) = self.shadow_atlas.quadrant_viewport(i);
            pass.set_viewport(x, y, w, h, 0.0, 1.0);
            pass.set_bind_group(0, &self.frame_resources.shadow_bind_groups[i], &[]);

            // Боксы, не попавшие в фрустум каскада, пропускаем
            self.draw_selected_boxes(&mut pass, ctx.boxes, &ctx.cascades.cascades[i].frustum, 0.0);
            self.draw_skirt(&mut pass);
        }
    }

    fn encode_main_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        ctx: &FrameContext<'_>,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Main Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(SKY_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let pipeline = if ctx.wireframe {
            self.pipelines
                .terrain_wireframe
                .as_ref()
                .unwrap_or(&self.pipelines.terrain)
        } else {
            &self.pipelines.terrain
        };

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.frame_resources.frame_bind_group, &[]);
        pass.set_bind_group(1, &self.shadow_atlas.bind_group, &[]);
        pass.set_vertex_buffer(0, self.terrain_buffers.vertex_buffer.slice(..));
        pass.set_index_buffer(
            self.terrain_buffers.index_buffer.slice(..),
            wgpu::IndexFormat::Uint32,
        );

        self.draw_selected_boxes(&mut pass, ctx.boxes, ctx.camera_frustum, 0.0);
        self.draw_skirt(&mut pass);

        if ctx.water_visible {
            pass.set_pipeline(&self.pipelines.water);
            self.water.draw(&mut pass);
        }
    }

    /// Тело террейна по выбранным боксам: каждый бокс — построчные
    /// поддиапазоны индексного буфера
    fn draw_selected_boxes(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        boxes: &[SelectedBox],
        planes: &[Plane],
        pad: f32,
    ) {
        let tb = &self.terrain_buffers;
        for b in boxes {
            if aabb_outside_frustum(planes, b.center(), b.extents(), pad) {
                continue;
            }

            let x0 = b.cell_x0.clamp(0, tb.cells_x);
            let x1 = b.cell_x1.clamp(0, tb.cells_x);
            let y0 = b.cell_y0.clamp(0, tb.cells_y);
            let y1 = b.cell_y1.clamp(0, tb.cells_y);
            if x1 <= x0 {
                continue;
            }

            for y in y0..y1 {
                let start = ((y * tb.cells_x + x0) * 6) as u32;
                let count = ((x1 - x0) * 6) as u32;
                pass.draw_indexed(start..start + count, 0, 0..1);
            }
        }
    }

    fn draw_skirt(&self, pass: &mut wgpu::RenderPass<'_>) {
        let tb = &self.terrain_buffers;
        pass.draw_indexed(tb.body_index_count..tb.index_count, 0, 0..1);
    }

    /// Вода видима, если её AABB не целиком вне фрустума камеры
    pub fn water_visible(
        camera_frustum: &[Plane; 6],
        terrain_bounds: &crate::geometry::BoundingSphere,
        water_level: f32,
    ) -> bool {
        let (center, extents) = WaterRenderer::visibility_aabb(terrain_bounds, water_level);
        !aabb_outside_frustum(camera_frustum, center, extents, WATER_CULL_PAD)
    }
}
