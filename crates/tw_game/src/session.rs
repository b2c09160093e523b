//! Per-frame game state: map, player and camera, ticked once per redraw.

use glam::Vec2;
use tw_core::input::InputState;
use tw_render::Camera2D;

use crate::collision::{find_block, Footprint};
use crate::config::GameConfig;
use crate::player::{MoveIntent, Player, StepOutcome};
use crate::tilemap::TileMap;

pub struct GameSession {
    pub map: TileMap,
    pub player: Player,
    pub camera: Camera2D,
    pub tile_size: f32,
    pub footprint: Footprint,
    pub blocked_moves: u64,
}

impl GameSession {
    pub fn new(map: TileMap, config: &GameConfig, viewport: (u32, u32)) -> Self {
        let player = Player::new(
            config.player.start_x,
            config.player.start_y,
            config.player.speed,
        );
        let footprint = config.footprint();
        if let Some(reason) = find_block(&map, config.tile_size, player.x, player.y, footprint) {
            log::warn!(
                "Player spawn ({}, {}) is not free ({:?}); movement may be stuck",
                player.x,
                player.y,
                reason
            );
        }

        let mut session = Self {
            map,
            player,
            camera: Camera2D::new(viewport.0, viewport.1),
            tile_size: config.tile_size,
            footprint,
            blocked_moves: 0,
        };
        session.update_camera();
        session
    }

    pub fn map_pixel_size(&self) -> Vec2 {
        self.map.pixel_size(self.tile_size).into()
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.viewport = (width, height);
        self.update_camera();
    }

    /// One frame: read held keys, try the move, refresh the camera.
    pub fn tick(&mut self, input: &InputState) -> StepOutcome {
        let intent = MoveIntent::from_input(input);
        let outcome = self
            .player
            .step(intent, &self.map, self.tile_size, self.footprint);
        if outcome == StepOutcome::Blocked {
            self.blocked_moves += 1;
        }
        self.update_camera();
        outcome
    }

    fn update_camera(&mut self) {
        let target = Vec2::new(self.player.x, self.player.y);
        let map_size = self.map_pixel_size();
        self.camera.follow(target, map_size);
    }
}
