//! Scripted key sequences for driving a `GameSession` without a window.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tw_core::input::{InputState, Key};

use crate::player::StepOutcome;
use crate::session::GameSession;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    /// Key names held for the whole frame, e.g. `["right", "s"]`.
    #[serde(default)]
    pub held: Vec<String>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// One `InputState` per simulated frame.
    pub fn expanded_inputs(&self) -> Result<Vec<InputState>, String> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let mut input = InputState::new();
            for name in &frame.held {
                let key = key_from_name(name)
                    .ok_or_else(|| format!("Unknown key '{name}' in replay"))?;
                input.key_down(key);
            }
            input.end_frame();
            for _ in 0..frame.repeat.max(1) {
                out.push(input.clone());
            }
        }
        Ok(out)
    }

    /// Tick `session` once per frame, returning every step outcome.
    pub fn run(&self, session: &mut GameSession) -> Result<Vec<StepOutcome>, String> {
        Ok(self
            .expanded_inputs()?
            .iter()
            .map(|input| session.tick(input))
            .collect())
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(replay)
}

fn key_from_name(name: &str) -> Option<Key> {
    match name {
        "up" => Some(Key::Up),
        "down" => Some(Key::Down),
        "left" => Some(Key::Left),
        "right" => Some(Key::Right),
        "w" => Some(Key::W),
        "a" => Some(Key::A),
        "s" => Some(Key::S),
        "d" => Some(Key::D),
        _ => None,
    }
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::tilemap::{TileCode, TileMap};
    use tw_core::facing::Facing;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "tw_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    /// 12x10 field with a hedge border and a hedge post at column 5, row 2.
    fn yard() -> TileMap {
        let rows = (0..10)
            .map(|row| {
                (0..12)
                    .map(|col| {
                        let border = row == 0 || row == 9 || col == 0 || col == 11;
                        if border || (col == 5 && row == 2) {
                            TileCode::BLOCKING
                        } else {
                            TileCode::WALKABLE
                        }
                    })
                    .collect()
            })
            .collect();
        TileMap::from_rows(12, 10, rows).expect("valid map")
    }

    fn write_replay(name_hint: &str, body: &str) -> std::path::PathBuf {
        let path = temp_file_path(name_hint);
        fs::write(&path, body).expect("write replay file");
        path
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = write_replay(
            "parse",
            r#"{
              "frames": [
                { "held": ["right"], "repeat": 3 },
                { "held": [] }
              ]
            }"#,
        );

        let replay = load_replay_from_path(&path).expect("replay should load");
        let inputs = replay.expanded_inputs().expect("known keys");
        assert_eq!(inputs.len(), 4);
        assert!(inputs[0].is_held(Key::Right));
        assert!(!inputs[3].is_held(Key::Right));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let replay = ReplaySequence {
            frames: vec![ReplayFrame {
                held: vec!["space".to_string()],
                repeat: 1,
            }],
        };
        assert!(replay.expanded_inputs().is_err());
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = write_replay("empty", r#"{ "frames": [] }"#);
        assert!(load_replay_from_path(&path).is_err());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = write_replay(
            "deterministic",
            r#"{
              "frames": [
                { "held": ["d"], "repeat": 90 },
                { "held": ["s", "d"], "repeat": 60 },
                { "held": ["up"], "repeat": 200 },
                { "held": ["left", "w"], "repeat": 45 },
                { "held": [], "repeat": 2 }
              ]
            }"#,
        );
        let replay = load_replay_from_path(&path).expect("replay should load");

        let mut run_a = GameSession::new(yard(), &GameConfig::default(), (300, 200));
        let mut run_b = GameSession::new(yard(), &GameConfig::default(), (300, 200));
        let outcomes_a = replay.run(&mut run_a).expect("run a");
        let outcomes_b = replay.run(&mut run_b).expect("run b");

        assert_eq!(outcomes_a, outcomes_b);
        assert_eq!(run_a.player, run_b.player);
        assert_eq!(run_a.camera.offset, run_b.camera.offset);
        assert_eq!(run_a.blocked_moves, run_b.blocked_moves);
        assert_eq!(run_a.player.facing, Facing::Idle);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn walking_right_stops_at_hedge_post() {
        // Spawn (50, 100) covers rows 2..=2; the post sits at x = 250..300.
        let replay = ReplaySequence {
            frames: vec![ReplayFrame {
                held: vec!["right".to_string()],
                repeat: 200,
            }],
        };
        let mut session = GameSession::new(yard(), &GameConfig::default(), (300, 200));
        let outcomes = replay.run(&mut session).expect("run");

        // Right edge is x + 39; it may reach 249 but not 250.
        assert_eq!(session.player.x, 210.0);
        assert_eq!(session.player.y, 100.0);
        assert_eq!(
            outcomes.iter().filter(|o| **o == StepOutcome::Moved).count(),
            80
        );
        assert_eq!(session.blocked_moves, 120);
        assert_eq!(session.player.facing, Facing::Right);
    }

    #[test]
    fn camera_stays_clamped_through_replay() {
        let replay = ReplaySequence {
            frames: vec![
                ReplayFrame {
                    held: vec!["d".to_string(), "s".to_string()],
                    repeat: 300,
                },
                ReplayFrame {
                    held: vec!["a".to_string(), "w".to_string()],
                    repeat: 300,
                },
            ],
        };
        let mut session = GameSession::new(yard(), &GameConfig::default(), (300, 200));
        let map = session.map_pixel_size();
        for input in replay.expanded_inputs().expect("known keys") {
            session.tick(&input);
            let offset = session.camera.offset;
            assert!(offset.x >= 0.0 && offset.x <= map.x - 300.0);
            assert!(offset.y >= 0.0 && offset.y <= map.y - 200.0);
        }
    }
}
