//! Tile collision: does a sprite footprint at a proposed position overlap a
//! blocking tile or leave the map?
//!
//! The overlapped tile range uses `floor(c / tile)` for the min corner and
//! `floor((c + size - 1) / tile)` for the max corner. The `- 1` means an edge
//! lying exactly on a tile boundary does not reach into the next tile: a
//! 40px footprint at x = 10 covers pixels 10..=49 and stays in column 0.

use crate::tilemap::{TileCode, TileMap};

/// Axis-aligned size of the player sprite used for collision, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub width: f32,
    pub height: f32,
}

/// Inclusive range of tile indices a footprint overlaps. Indices may be
/// negative or past the map edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpan {
    pub col_min: i32,
    pub col_max: i32,
    pub row_min: i32,
    pub row_max: i32,
}

impl TileSpan {
    pub fn covering(x: f32, y: f32, footprint: Footprint, tile_size: f32) -> Self {
        Self {
            col_min: (x / tile_size).floor() as i32,
            col_max: ((x + footprint.width - 1.0) / tile_size).floor() as i32,
            row_min: (y / tile_size).floor() as i32,
            row_max: ((y + footprint.height - 1.0) / tile_size).floor() as i32,
        }
    }

    fn is_within(&self, map: &TileMap) -> bool {
        self.col_min >= 0
            && self.row_min >= 0
            && self.col_max < map.width() as i32
            && self.row_max < map.height() as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    OutOfBounds,
    Tile { col: i32, row: i32, code: TileCode },
}

/// First reason the footprint at `(x, y)` is not allowed, scanning rows then
/// columns. `None` means the position is free.
pub fn find_block(
    map: &TileMap,
    tile_size: f32,
    x: f32,
    y: f32,
    footprint: Footprint,
) -> Option<BlockReason> {
    let span = TileSpan::covering(x, y, footprint, tile_size);
    if !span.is_within(map) {
        return Some(BlockReason::OutOfBounds);
    }

    for row in span.row_min..=span.row_max {
        for col in span.col_min..=span.col_max {
            if let Some(code) = map.tile_at(col, row) {
                if code.is_blocking() {
                    return Some(BlockReason::Tile { col, row, code });
                }
            }
        }
    }
    None
}

pub fn is_blocked(map: &TileMap, tile_size: f32, x: f32, y: f32, footprint: Footprint) -> bool {
    match find_block(map, tile_size, x, y, footprint) {
        Some(BlockReason::OutOfBounds) => {
            log::debug!("Collision: out of map bounds at ({x}, {y})");
            true
        }
        Some(BlockReason::Tile { col, row, code }) => {
            log::debug!("Collision: tile {code} at (col {col}, row {row}) for ({x}, {y})");
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: f32 = 50.0;
    const SPRITE: Footprint = Footprint {
        width: 40.0,
        height: 40.0,
    };

    fn map(width: u32, height: u32, rows: &[&[i64]]) -> TileMap {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|&code| TileCode(code)).collect())
            .collect();
        TileMap::from_rows(width, height, rows).expect("valid test map")
    }

    fn open_field() -> TileMap {
        map(4, 3, &[&[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]])
    }

    #[test]
    fn free_positions_inside_open_map_are_not_blocked() {
        let field = open_field();
        let (map_w, map_h) = field.pixel_size(TILE);
        let mut y = 0.0;
        while y + SPRITE.height <= map_h {
            let mut x = 0.0;
            while x + SPRITE.width <= map_w {
                assert!(
                    !is_blocked(&field, TILE, x, y, SPRITE),
                    "({x}, {y}) should be free"
                );
                x += 7.0;
            }
            y += 7.0;
        }
    }

    #[test]
    fn edge_flush_with_tile_boundary_stays_in_tile() {
        // Right edge at exactly 50: pixels 10..=49.
        let span = TileSpan::covering(10.0, 10.0, SPRITE, TILE);
        assert_eq!(span.col_max, 0);
        assert_eq!(span.row_max, 0);

        // One pixel further reaches column 1.
        let span = TileSpan::covering(11.0, 0.0, SPRITE, TILE);
        assert_eq!(span.col_max, 1);
    }

    #[test]
    fn flush_against_blocking_tile_is_free() {
        let strip = map(2, 1, &[&[0, 1]]);
        assert!(!is_blocked(&strip, TILE, 10.0, 0.0, SPRITE));
        assert!(is_blocked(&strip, TILE, 11.0, 0.0, SPRITE));
    }

    #[test]
    fn footprint_reaching_blocking_tile_is_blocked() {
        let strip = map(2, 1, &[&[0, 1]]);
        // x = 15 covers pixels 15..=54, which reaches column 1.
        assert_eq!(
            find_block(&strip, TILE, 15.0, 0.0, SPRITE),
            Some(BlockReason::Tile {
                col: 1,
                row: 0,
                code: TileCode::BLOCKING
            })
        );
        assert!(is_blocked(&strip, TILE, 15.0, 0.0, SPRITE));
    }

    #[test]
    fn leaving_map_to_the_left_is_blocked() {
        let strip = map(2, 1, &[&[0, 1]]);
        assert_eq!(
            find_block(&strip, TILE, -2.0, 0.0, SPRITE),
            Some(BlockReason::OutOfBounds)
        );
    }

    #[test]
    fn leaving_map_on_every_side_is_blocked() {
        let field = open_field();
        assert!(is_blocked(&field, TILE, 0.0, -1.0, SPRITE));
        assert!(is_blocked(&field, TILE, 161.0, 0.0, SPRITE));
        assert!(is_blocked(&field, TILE, 0.0, 111.0, SPRITE));
        // Flush with the far corner is still inside.
        assert!(!is_blocked(&field, TILE, 160.0, 110.0, SPRITE));
    }

    #[test]
    fn non_blocking_codes_other_than_walkable_are_free() {
        let strip = map(2, 1, &[&[0, 5]]);
        assert!(!is_blocked(&strip, TILE, 30.0, 0.0, SPRITE));
    }

    #[test]
    fn negative_code_parsed_from_file_is_walkable() {
        let strip = crate::tilemap::parse_map(
            r#"{ "width": 2, "height": 1, "tiles": [[0, -1]] }"#,
            std::path::Path::new("negative.json"),
        )
        .expect("negative code should parse");
        // Footprint spans both columns.
        assert!(!is_blocked(&strip, TILE, 30.0, 0.0, SPRITE));
        assert_eq!(find_block(&strip, TILE, 30.0, 0.0, SPRITE), None);
    }

    #[test]
    fn footprint_larger_than_tile_checks_interior_tiles() {
        let field = map(3, 3, &[&[0, 0, 0], &[0, 1, 0], &[0, 0, 0]]);
        let big = Footprint {
            width: 150.0,
            height: 150.0,
        };
        assert!(is_blocked(&field, TILE, 0.0, 0.0, big));
    }
}
