//! Tilewalk -- main loop and application entry point.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. Assets
//! are loaded once in `resumed` (concurrently, joined before the first frame).
//! Everything else happens inside `RedrawRequested`, one tick per redraw:
//!
//!   1. `scheduler.begin_tick()` -- the pending redraw is now being serviced
//!   2. `session.tick()` -- held keys -> facing + movement -> camera follow
//!   3. `build_frame()` -- visible tiles and the player as a quad mesh
//!   4. Upload camera uniform and mesh, issue draw calls, composite egui overlay
//!
//! `about_to_wait` re-arms the `FrameScheduler`, so at most one redraw is ever
//! outstanding and ticks never overlap. With no map loaded nothing re-arms and
//! the window only shows the cleared surface.

mod assets;
mod collision;
mod config;
mod draw_list;
mod error;
mod player;
#[cfg(test)]
mod replay;
mod session;
mod tilemap;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use assets::{load_assets, AssetBundle};
use config::{load_config_from_path, GameConfig};
use draw_list::{build_frame, FrameMesh, TextureKey};
use session::GameSession;
use tw_core::input::{InputState, Key};
use tw_core::time::{FrameClock, FrameScheduler};
use tw_devtools::{DebugOverlay, OverlayStats};
use tw_render::{Camera2D, GpuContext, GpuInitError, SpritePipeline, SpriteVertex, Texture};

const DEFAULT_CONFIG_PATH: &str = "assets/config/game.json";

struct GpuSpriteTexture {
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// All mutable engine state lives here. Constructed lazily in `ApplicationHandler::resumed`
/// once the window and GPU surface are available.
///
/// Ownership is split into three conceptual groups:
///  - **Core systems** (clock, scheduler, input) -- updated every frame
///  - **Content** (session, textures) -- loaded once at startup
///  - **GPU resources** (vertex/index/camera buffers, mesh) -- rebuilt every tick
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    clock: FrameClock,
    scheduler: FrameScheduler,
    input: InputState,
    sprite_pipeline: SpritePipeline,
    debug_overlay: DebugOverlay,

    // --- Content -----------------------------------------------------------------
    /// `None` when the map failed to load; the loop then never ticks.
    session: Option<GameSession>,
    textures: HashMap<TextureKey, GpuSpriteTexture>,

    // --- Per-frame GPU mesh state -----------------------------------------------
    // The mesh is rebuilt on the CPU each tick, then streamed into these GPU
    // buffers. Buffers grow (power-of-two) but never shrink.
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
    mesh: FrameMesh,
}

impl EngineState {
    fn new(
        window: Arc<Window>,
        config: &GameConfig,
        assets: Option<AssetBundle>,
    ) -> Result<Self, GpuInitError> {
        let gpu = GpuContext::new(window.clone())?;
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);

        let (session, textures) = match assets {
            Some(bundle) => {
                let textures = upload_textures(&gpu, &sprite_pipeline, &bundle);
                let session = GameSession::new(bundle.map, config, gpu.size);
                (Some(session), textures)
            }
            None => (None, HashMap::new()),
        };

        let camera_uniform = match &session {
            Some(session) => session.camera.build_uniform(),
            None => Camera2D::new(gpu.size.0, gpu.size.1).build_uniform(),
        };
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let vertex_buffer = create_vertex_buffer(&gpu.device, 1);
        let index_buffer = create_index_buffer(&gpu.device, 1);

        Ok(Self {
            window,
            gpu,
            clock: FrameClock::new(),
            scheduler: FrameScheduler::new(),
            input: InputState::new(),
            sprite_pipeline,
            debug_overlay,
            session,
            textures,
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            mesh_vertex_capacity: 0,
            mesh_index_capacity: 0,
            mesh: FrameMesh::default(),
        })
    }

    /// Advance the session one frame and rebuild the mesh from the result.
    fn tick(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.tick(&self.input);

        let textures = &self.textures;
        self.mesh = build_frame(session, |key| textures.contains_key(&key));
        let camera_uniform = session.camera.build_uniform();

        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera_uniform]),
        );
        self.upload_mesh();
    }

    fn upload_mesh(&mut self) {
        self.ensure_mesh_capacity(self.mesh.vertices.len(), self.mesh.indices.len());
        if !self.mesh.vertices.is_empty() {
            self.gpu.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&self.mesh.vertices),
            );
        }
        if !self.mesh.indices.is_empty() {
            self.gpu.queue.write_buffer(
                &self.index_buffer,
                0,
                bytemuck::cast_slice(&self.mesh.indices),
            );
        }
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }

    fn overlay_stats(&self) -> Option<OverlayStats> {
        let session = self.session.as_ref()?;
        Some(OverlayStats {
            scheduler_ticks: self.scheduler.ticks(),
            draw_calls: self.mesh.draw_calls.len() as u32,
            texture_binds: self.mesh.texture_binds() as u32,
            quad_count: self.mesh.quad_count() as u32,
            map_size_tiles: (session.map.width(), session.map.height()),
            player_position: (session.player.x, session.player.y),
            camera_offset: (session.camera.offset.x, session.camera.offset.y),
            facing_label: session.player.facing.label().to_string(),
            blocked_moves: session.blocked_moves,
        })
    }

    fn render(&mut self) {
        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let stats = self.overlay_stats();
        let (egui_primitives, egui_textures_delta) =
            self.debug_overlay
                .prepare(&self.window, &self.clock, stats.as_ref());
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut last_bound_texture: Option<TextureKey> = None;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Tile Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            if !self.mesh.draw_calls.is_empty() {
                render_pass.set_pipeline(&self.sprite_pipeline.render_pipeline);
                render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                for draw in &self.mesh.draw_calls {
                    let Some(texture) = self.textures.get(&draw.texture) else {
                        continue;
                    };
                    if last_bound_texture != Some(draw.texture) {
                        render_pass.set_bind_group(1, &texture.bind_group, &[]);
                        last_bound_texture = Some(draw.texture);
                    }
                    render_pass.draw_indexed(
                        draw.index_start..(draw.index_start + draw.index_count),
                        0,
                        0..1,
                    );
                }
            }
        }

        self.debug_overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.debug_overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.debug_overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

struct App {
    config_path: PathBuf,
    state: Option<EngineState>,
}

impl App {
    fn new(config_path: PathBuf) -> Self {
        Self {
            config_path,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let config = load_config_from_path(&self.config_path).unwrap_or_else(|err| {
            log::error!("{}. Using built-in defaults.", err);
            GameConfig::default()
        });
        let assets = match load_assets(&config) {
            Ok(bundle) => Some(bundle),
            Err(err) => {
                log::error!("Asset loading failed, game will not start: {}", err);
                None
            }
        };

        let window = match tw_platform::window::create_window(event_loop, &config.platform()) {
            Ok(window) => window,
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };
        match EngineState::new(window, &config, assets) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("GPU initialisation failed: {}", err);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        // Unconsumed key edges still need a frame so Escape and F3 work
        // even when no map is loaded.
        let wants_frame = state.session.is_some() || state.input.has_pending_edges();
        if wants_frame && state.scheduler.arm() {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    if let Some(session) = state.session.as_mut() {
                        session.set_viewport(w, h);
                    }
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::Focused(false) => {
                state.input.release_all();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(game_key) = map_key(key_code) {
                        apply_key_event(&mut state.input, game_key, event.state, egui_consumed);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                state.scheduler.begin_tick();
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                state.clock.begin_frame();
                if state.input.is_just_pressed(Key::Escape) {
                    log::info!("Escape pressed, exiting.");
                    event_loop.exit();
                    return;
                }
                if state.input.is_just_pressed(Key::F3) {
                    state.debug_overlay.toggle();
                }

                state.tick();
                state.render();

                state.input.end_frame();
            }

            _ => {}
        }
    }
}

fn upload_textures(
    gpu: &GpuContext,
    pipeline: &SpritePipeline,
    bundle: &AssetBundle,
) -> HashMap<TextureKey, GpuSpriteTexture> {
    let textures: HashMap<TextureKey, GpuSpriteTexture> = bundle
        .images
        .iter()
        .map(|(&key, image)| {
            let label = format!("{:?}", key);
            let texture = Texture::from_image(&gpu.device, &gpu.queue, image, &label);
            let bind_group = pipeline.create_texture_bind_group(&gpu.device, &texture);
            (
                key,
                GpuSpriteTexture {
                    texture,
                    bind_group,
                },
            )
        })
        .collect();

    let texel_bytes: u64 = textures
        .values()
        .map(|t| u64::from(t.texture.size.0) * u64::from(t.texture.size.1) * 4)
        .sum();
    log::info!(
        "Uploaded {} textures ({:.1} KiB)",
        textures.len(),
        texel_bytes as f64 / 1024.0
    );
    textures
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Tile Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Tile Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Presses egui claimed stay with egui. Releases always reach the game, or a
/// key let go while the overlay has focus would stay held.
fn apply_key_event(input: &mut InputState, key: Key, state: ElementState, egui_consumed: bool) {
    match state {
        ElementState::Pressed if !egui_consumed => input.key_down(key),
        ElementState::Pressed => {}
        ElementState::Released => input.key_up(key),
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F3 => Some(Key::F3),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Tilewalk starting...");

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {}", err);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config_path);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", err);
        std::process::exit(1);
    }
}
