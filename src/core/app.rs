// ============================================
// App - Главный обработчик приложения
// ============================================

use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::core::SceneResources;
use crate::systems::{InitSystem, InputAction, InputSystem, RenderSystem, UpdateSystem};

const APP_NAME: &str = "adskii terrain";

/// Главное приложение
pub struct App {
    resources: SceneResources,
}

impl App {
    pub fn new() -> Self {
        Self {
            resources: InitSystem::create_resources(),
        }
    }

    /// Обновление FPS в заголовке раз в ~секунду
    fn update_title(&mut self) {
        self.resources.fps_frames += 1;
        let elapsed = self.resources.fps_last_update.elapsed().as_secs_f64();
        if elapsed >= 1.0 {
            let fps = self.resources.fps_frames as f64 / elapsed;
            let ms = 1000.0 / fps.max(1e-3);
            if let Some(window) = &self.resources.window {
                window.set_title(&format!("{} | FPS: {:.1} | {:.2} ms", APP_NAME, fps, ms));
            }
            self.resources.fps_frames = 0;
            self.resources.fps_last_update = Instant::now();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.resources.window.is_none() {
            let window_attrs = Window::default_attributes()
                .with_title(APP_NAME)
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

            let window = Arc::new(event_loop.create_window(window_attrs).unwrap());
            InitSystem::init_rendering(&mut self.resources, window);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.resources.renderer {
                    renderer.resize(physical_size);
                    self.resources
                        .camera
                        .resize(physical_size.width, physical_size.height);
                }
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(keycode),
                        state,
                        ..
                    },
                ..
            } => {
                if let Some(action) = InputSystem::process_keyboard(&mut self.resources, keycode, state)
                {
                    match action {
                        InputAction::Quit => event_loop.exit(),
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.resources.last_frame).as_secs_f32();
                self.resources.last_frame = now;

                UpdateSystem::update(&mut self.resources, dt);
                RenderSystem::render(&mut self.resources, event_loop);
                self.update_title();

                if let Some(window) = &self.resources.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            InputSystem::process_mouse_motion(&mut self.resources, delta);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.resources.window {
            window.request_redraw();
        }
    }
}

/// Запуск приложения
pub fn run() {
    env_logger::init();

    println!("=== Controls ===");
    println!("W/S - Forward / back");
    println!("A/D - Left / right");
    println!("Q/Z - Up / down");
    println!("Mouse - Look around");
    println!("T - Toggle terrain material");
    println!("L - Lock camera to terrain height");
    println!("Space - Pause sun animation");
    println!("+/- - Raise / lower water level");
    println!("1/2 - Wireframe / solid");
    println!("Escape - Quit");
    println!("================");

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app).unwrap();
}
