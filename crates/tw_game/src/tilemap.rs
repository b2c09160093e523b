//! Map model: a fixed grid of tile codes loaded once from a JSON description.
//!
//! ```json
//! { "width": 3, "height": 2, "tiles": [[0, 0, 1], [1, 0, 0]] }
//! ```
//!
//! `tiles` holds one row per `height` index and one column per `width`
//! index. The grid is flattened row-major on load and never mutated.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::LoadError;

/// Integer tile type identifier as it appears in the map description. Any
/// integer is accepted; only `1` blocks.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TileCode(pub i64);

impl TileCode {
    pub const WALKABLE: TileCode = TileCode(0);
    pub const BLOCKING: TileCode = TileCode(1);

    pub fn is_blocking(self) -> bool {
        self == Self::BLOCKING
    }
}

impl std::fmt::Display for TileCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw description. Every field is optional here so a missing one can be
/// reported by name instead of as a generic parse error.
#[derive(Debug, Deserialize)]
struct MapFile {
    width: Option<u32>,
    height: Option<u32>,
    tiles: Option<Vec<Vec<TileCode>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    width: u32,
    height: u32,
    tiles: Vec<TileCode>,
}

impl TileMap {
    /// Build a map from rows. Rows must match `width`/`height` exactly.
    pub fn from_rows(width: u32, height: u32, rows: Vec<Vec<TileCode>>) -> Result<Self, String> {
        if width == 0 || height == 0 {
            return Err("width and height must be > 0".to_string());
        }
        if rows.len() != height as usize {
            return Err(format!(
                "tiles has {} rows but height is {}",
                rows.len(),
                height
            ));
        }
        // Validate every row before reserving anything: `width` comes from the
        // file and may be far larger than the rows actually present.
        if let Some((row_index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != width as usize)
        {
            return Err(format!(
                "row {} has {} tiles but width is {}",
                row_index,
                row.len(),
                width
            ));
        }
        let tiles: Vec<TileCode> = rows.into_iter().flatten().collect();
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Map extent in pixels for the given tile size.
    pub fn pixel_size(&self, tile_size: f32) -> (f32, f32) {
        (
            self.width as f32 * tile_size,
            self.height as f32 * tile_size,
        )
    }

    /// Signed coordinates so callers can probe outside the grid.
    pub fn tile_at(&self, col: i32, row: i32) -> Option<TileCode> {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return None;
        }
        self.tiles
            .get(row as usize * self.width as usize + col as usize)
            .copied()
    }

    pub fn blocking_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_blocking()).count()
    }
}

pub fn load_map_from_path(path: &Path) -> Result<TileMap, LoadError> {
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_map(&raw, path)
}

/// `origin` is only used to label errors.
pub fn parse_map(raw: &str, origin: &Path) -> Result<TileMap, LoadError> {
    let file: MapFile = serde_json::from_str(raw).map_err(|source| LoadError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    let missing = |field| LoadError::MissingField {
        path: origin.to_path_buf(),
        field,
    };
    let width = file.width.ok_or_else(|| missing("width"))?;
    let height = file.height.ok_or_else(|| missing("height"))?;
    let tiles = file.tiles.ok_or_else(|| missing("tiles"))?;

    TileMap::from_rows(width, height, tiles).map_err(|reason| LoadError::InvalidMap {
        path: origin.to_path_buf(),
        reason,
    })
}
