//! Debug overlay rendered via egui on top of the tile scene.
//!
//! egui needs a split render: `prepare()` runs the UI and tessellates,
//! `upload()` pushes textures and buffers through the encoder, `paint()`
//! draws into a separate render pass (`forget_lifetime()`), and `cleanup()`
//! frees textures egui dropped. UI logic only runs while the overlay is
//! visible (F3); event handling is always on so clicks over the window are
//! not passed to the game.

use tw_core::time::FrameClock;
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    /// Redraws serviced by the frame scheduler
    pub scheduler_ticks: u64,
    pub draw_calls: u32,
    pub texture_binds: u32,
    pub quad_count: u32,
    pub map_size_tiles: (u32, u32),
    pub player_position: (f32, f32),
    pub camera_offset: (f32, f32),
    /// Facing label, e.g. "left"
    pub facing_label: String,
    /// Moves refused by the collision resolver since startup
    pub blocked_moves: u64,
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_winit_state.on_window_event(window, event).consumed
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay: {}", if self.visible { "ON" } else { "OFF" });
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        clock: &FrameClock,
        stats: Option<&OverlayStats>,
    ) -> (Vec<egui::ClippedPrimitive>, egui::TexturesDelta) {
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if !self.visible {
                return;
            }
            egui::Window::new("Debug")
                .default_pos([10.0, 10.0])
                .show(ctx, |ui| {
                    ui.label(format!("FPS: {:.1}", clock.smoothed_fps));
                    ui.label(format!("Frame time: {:.2} ms", clock.smoothed_frame_time_ms));
                    ui.label(format!("Frame: {}", clock.frame_count));

                    let Some(stats) = stats else {
                        ui.separator();
                        ui.label("Map not loaded");
                        return;
                    };
                    ui.separator();
                    ui.label(format!("Ticks: {}", stats.scheduler_ticks));
                    ui.label(format!("Draw calls: {}", stats.draw_calls));
                    ui.label(format!("Texture binds: {}", stats.texture_binds));
                    ui.label(format!("Quads: {}", stats.quad_count));
                    ui.label(format!(
                        "Map: {}x{} tiles",
                        stats.map_size_tiles.0, stats.map_size_tiles.1
                    ));

                    ui.separator();
                    ui.label(format!(
                        "Player: ({:.0}, {:.0})",
                        stats.player_position.0, stats.player_position.1
                    ));
                    ui.label(format!(
                        "Camera: ({:.0}, {:.0})",
                        stats.camera_offset.0, stats.camera_offset.1
                    ));
                    ui.label(format!("Facing: {}", stats.facing_label));
                    ui.label(format!("Blocked moves: {}", stats.blocked_moves));
                });
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
