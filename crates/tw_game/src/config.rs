//! Game configuration file. Every field has a default so partial files work;
//! the defaults reproduce the original demo (50px tiles, 40px sprite starting
//! at (50, 100), 2px per frame).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tw_core::facing::Facing;
use tw_platform::window::PlatformConfig;

use crate::collision::Footprint;
use crate::error::LoadError;
use crate::tilemap::TileCode;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowSection,
    pub tile_size: f32,
    pub sprite_width: f32,
    pub sprite_height: f32,
    pub player: PlayerSection,
    pub map_path: String,
    pub sprite_images: SpriteImagePaths,
    pub tile_images: BTreeMap<TileCode, String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowSection {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PlayerSection {
    pub start_x: f32,
    pub start_y: f32,
    /// Pixels per frame.
    pub speed: f32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpriteImagePaths {
    pub idle: String,
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
}

impl SpriteImagePaths {
    pub fn path_for(&self, facing: Facing) -> &str {
        match facing {
            Facing::Idle => &self.idle,
            Facing::Up => &self.up,
            Facing::Down => &self.down,
            Facing::Left => &self.left,
            Facing::Right => &self.right,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        let mut tile_images = BTreeMap::new();
        tile_images.insert(TileCode::WALKABLE, "assets/tiles/grass.png".to_string());
        tile_images.insert(TileCode::BLOCKING, "assets/tiles/hedge.png".to_string());
        Self {
            window: WindowSection::default(),
            tile_size: 50.0,
            sprite_width: 40.0,
            sprite_height: 40.0,
            player: PlayerSection::default(),
            map_path: "assets/maps/demo_map.json".to_string(),
            sprite_images: SpriteImagePaths::default(),
            tile_images,
        }
    }
}

impl Default for WindowSection {
    fn default() -> Self {
        let platform = PlatformConfig::default();
        Self {
            title: platform.title,
            width: platform.width,
            height: platform.height,
        }
    }
}

impl Default for PlayerSection {
    fn default() -> Self {
        Self {
            start_x: 50.0,
            start_y: 100.0,
            speed: 2.0,
        }
    }
}

impl Default for SpriteImagePaths {
    fn default() -> Self {
        Self {
            idle: "assets/sprites/idle.png".to_string(),
            up: "assets/sprites/up.png".to_string(),
            down: "assets/sprites/down.png".to_string(),
            left: "assets/sprites/left.png".to_string(),
            right: "assets/sprites/right.png".to_string(),
        }
    }
}

impl GameConfig {
    pub fn footprint(&self) -> Footprint {
        Footprint {
            width: self.sprite_width,
            height: self.sprite_height,
        }
    }

    pub fn platform(&self) -> PlatformConfig {
        PlatformConfig {
            title: self.window.title.clone(),
            width: self.window.width,
            height: self.window.height,
        }
    }
}

/// Load the config at `path`. A file that does not exist yields the defaults;
/// a file that exists but is malformed or invalid is an error.
pub fn load_config_from_path(path: &Path) -> Result<GameConfig, LoadError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            log::warn!(
                "Config '{}' not found, using built-in defaults",
                path.display()
            );
            return Ok(GameConfig::default());
        }
        Err(source) => {
            return Err(LoadError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let config: GameConfig = serde_json::from_str(&raw).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_config(&config).map_err(|reason| LoadError::InvalidConfig {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(config)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    let positive = [
        ("tile_size", config.tile_size),
        ("sprite_width", config.sprite_width),
        ("sprite_height", config.sprite_height),
        ("player.speed", config.player.speed),
    ];
    for (name, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(format!("{name} must be > 0 (got {value})"));
        }
    }
    if config.window.width == 0 || config.window.height == 0 {
        return Err("window width and height must be > 0".to_string());
    }
    Ok(())
}
