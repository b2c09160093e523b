use tw_core::facing::Facing;
use tw_core::input::{InputState, Key};

use crate::collision::{is_blocked, Footprint};
use crate::tilemap::TileMap;

/// Key pairs per direction, in the order they are evaluated. Order matters:
/// the last held direction picks the sprite.
const DIRECTION_BINDINGS: [(Facing, [Key; 2]); 4] = [
    (Facing::Up, [Key::Up, Key::W]),
    (Facing::Down, [Key::Down, Key::S]),
    (Facing::Left, [Key::Left, Key::A]),
    (Facing::Right, [Key::Right, Key::D]),
];

/// One frame of movement intent: unit steps per axis plus the facing that
/// should be shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveIntent {
    pub dir_x: f32,
    pub dir_y: f32,
    pub facing: Facing,
}

impl MoveIntent {
    pub const IDLE: MoveIntent = MoveIntent {
        dir_x: 0.0,
        dir_y: 0.0,
        facing: Facing::Idle,
    };

    /// Every held direction contributes; opposite keys cancel out but the
    /// later one still wins the facing.
    pub fn from_held(mut is_held: impl FnMut(Facing) -> bool) -> Self {
        let mut intent = Self::IDLE;
        for (facing, _) in DIRECTION_BINDINGS {
            if !is_held(facing) {
                continue;
            }
            match facing {
                Facing::Up => intent.dir_y -= 1.0,
                Facing::Down => intent.dir_y += 1.0,
                Facing::Left => intent.dir_x -= 1.0,
                Facing::Right => intent.dir_x += 1.0,
                Facing::Idle => {}
            }
            intent.facing = facing;
        }
        intent
    }

    pub fn from_input(input: &InputState) -> Self {
        Self::from_held(|facing| {
            DIRECTION_BINDINGS
                .iter()
                .find(|(bound, _)| *bound == facing)
                .is_some_and(|(_, keys)| input.is_any_held(keys))
        })
    }

    pub fn has_displacement(&self) -> bool {
        self.dir_x != 0.0 || self.dir_y != 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No displacement was requested this frame.
    Stationary,
    Moved,
    /// The candidate position collided; the player stayed put.
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    /// Pixels per frame.
    pub speed: f32,
    pub facing: Facing,
}

impl Player {
    pub fn new(x: f32, y: f32, speed: f32) -> Self {
        Self {
            x,
            y,
            speed,
            facing: Facing::Idle,
        }
    }

    /// Apply one frame of intent. Both axes move as a single displacement and
    /// are committed together or not at all, so a diagonal into a wall stops
    /// dead instead of sliding.
    pub fn step(
        &mut self,
        intent: MoveIntent,
        map: &TileMap,
        tile_size: f32,
        footprint: Footprint,
    ) -> StepOutcome {
        self.facing = intent.facing;
        if !intent.has_displacement() {
            return StepOutcome::Stationary;
        }

        let candidate_x = self.x + intent.dir_x * self.speed;
        let candidate_y = self.y + intent.dir_y * self.speed;
        if is_blocked(map, tile_size, candidate_x, candidate_y, footprint) {
            log::debug!("Player move refused at ({}, {})", self.x, self.y);
            return StepOutcome::Blocked;
        }

        self.x = candidate_x;
        self.y = candidate_y;
        StepOutcome::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::TileCode;

    const TILE: f32 = 50.0;
    const SPRITE: Footprint = Footprint {
        width: 40.0,
        height: 40.0,
    };

    fn strip() -> TileMap {
        TileMap::from_rows(2, 1, vec![vec![TileCode::WALKABLE, TileCode::BLOCKING]])
            .expect("valid map")
    }

    fn open_map() -> TileMap {
        TileMap::from_rows(4, 4, vec![vec![TileCode::WALKABLE; 4]; 4]).expect("valid map")
    }

    fn held(keys: &[Key]) -> InputState {
        let mut input = InputState::new();
        for &key in keys {
            input.key_down(key);
        }
        input
    }

    #[test]
    fn arrow_and_wasd_map_to_same_intent() {
        assert_eq!(
            MoveIntent::from_input(&held(&[Key::Up])),
            MoveIntent::from_input(&held(&[Key::W]))
        );
        assert_eq!(
            MoveIntent::from_input(&held(&[Key::Right])),
            MoveIntent::from_input(&held(&[Key::D]))
        );
    }

    #[test]
    fn no_keys_is_idle() {
        assert_eq!(MoveIntent::from_input(&InputState::new()), MoveIntent::IDLE);
    }

    #[test]
    fn last_direction_in_fixed_order_picks_facing() {
        let intent = MoveIntent::from_input(&held(&[Key::Right, Key::Up]));
        assert_eq!(intent.facing, Facing::Right);
        assert_eq!((intent.dir_x, intent.dir_y), (1.0, -1.0));

        let intent = MoveIntent::from_input(&held(&[Key::Left, Key::S]));
        assert_eq!(intent.facing, Facing::Left);
    }

    #[test]
    fn opposite_keys_cancel_but_keep_facing() {
        let intent = MoveIntent::from_input(&held(&[Key::Up, Key::Down]));
        assert_eq!(intent.facing, Facing::Down);
        assert!(!intent.has_displacement());
    }

    #[test]
    fn step_moves_by_speed() {
        let map = open_map();
        let mut player = Player::new(50.0, 50.0, 2.0);
        let intent = MoveIntent::from_input(&held(&[Key::Down, Key::Right]));
        assert_eq!(player.step(intent, &map, TILE, SPRITE), StepOutcome::Moved);
        assert_eq!((player.x, player.y), (52.0, 52.0));
        assert_eq!(player.facing, Facing::Right);
    }

    #[test]
    fn step_into_blocking_tile_keeps_position() {
        let map = strip();
        let mut player = Player::new(0.0, 0.0, 15.0);
        let intent = MoveIntent::from_input(&held(&[Key::Right]));
        assert_eq!(player.step(intent, &map, TILE, SPRITE), StepOutcome::Blocked);
        assert_eq!((player.x, player.y), (0.0, 0.0));
        // Facing still follows the keys even when the move is refused.
        assert_eq!(player.facing, Facing::Right);
    }

    #[test]
    fn step_out_of_bounds_keeps_position() {
        let map = strip();
        let mut player = Player::new(0.0, 0.0, 2.0);
        let intent = MoveIntent::from_input(&held(&[Key::Left]));
        assert_eq!(player.step(intent, &map, TILE, SPRITE), StepOutcome::Blocked);
        assert_eq!(player.x, 0.0);
    }

    #[test]
    fn diagonal_into_wall_does_not_slide() {
        // Moving right alone is fine, moving down alone leaves the map, so the
        // combined diagonal must be refused as a unit.
        let map = strip();
        let mut player = Player::new(0.0, 10.0, 2.0);
        let intent = MoveIntent::from_input(&held(&[Key::Down, Key::Right]));
        assert_eq!(player.step(intent, &map, TILE, SPRITE), StepOutcome::Blocked);
        assert_eq!((player.x, player.y), (0.0, 10.0));
    }

    #[test]
    fn idle_step_is_stationary() {
        let map = strip();
        let mut player = Player::new(0.0, 0.0, 2.0);
        player.facing = Facing::Left;
        assert_eq!(
            player.step(MoveIntent::IDLE, &map, TILE, SPRITE),
            StepOutcome::Stationary
        );
        assert_eq!(player.facing, Facing::Idle);
    }
}
