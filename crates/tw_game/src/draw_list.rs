//! CPU-side frame mesh: visible tiles and the player as screen-space quads.
//!
//! Quads are emitted tiles first (row-major) then the player, so the player
//! always draws on top. Consecutive quads sharing a texture merge into one
//! draw call; on a grass field that turns hundreds of tiles into a handful
//! of `draw_indexed` calls.

use glam::Vec2;
use tw_core::facing::Facing;
use tw_render::SpriteVertex;

use crate::session::GameSession;
use crate::tilemap::TileCode;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKey {
    Tile(TileCode),
    Sprite(Facing),
}

/// A contiguous run of indices that share the same texture binding.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture: TextureKey,
    pub index_start: u32,
    pub index_count: u32,
}

#[derive(Debug, Default)]
pub struct FrameMesh {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
}

impl FrameMesh {
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Number of bind-group switches the draw calls will need.
    pub fn texture_binds(&self) -> usize {
        let mut binds = 0usize;
        let mut current = None;
        for draw in &self.draw_calls {
            if current != Some(draw.texture) {
                current = Some(draw.texture);
                binds += 1;
            }
        }
        binds
    }

    /// Axis-aligned quad with its top-left corner at `top_left` (screen px).
    fn push_quad(&mut self, texture: TextureKey, top_left: Vec2, size: Vec2) {
        let base_index = self.vertices.len() as u32;
        let (left, top) = (top_left.x, top_left.y);
        let (right, bottom) = (top_left.x + size.x, top_left.y + size.y);

        self.vertices.extend_from_slice(&[
            SpriteVertex {
                position: [left, top],
                tex_coords: [0.0, 0.0],
                color: WHITE,
            },
            SpriteVertex {
                position: [right, top],
                tex_coords: [1.0, 0.0],
                color: WHITE,
            },
            SpriteVertex {
                position: [right, bottom],
                tex_coords: [1.0, 1.0],
                color: WHITE,
            },
            SpriteVertex {
                position: [left, bottom],
                tex_coords: [0.0, 1.0],
                color: WHITE,
            },
        ]);

        let draw_start = self.indices.len() as u32;
        self.indices.extend_from_slice(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);
        self.push_draw_call(texture, draw_start, 6);
    }

    /// Append a draw call, merging with the previous one when the texture
    /// matches and the indices are contiguous.
    fn push_draw_call(&mut self, texture: TextureKey, index_start: u32, index_count: u32) {
        if let Some(last) = self.draw_calls.last_mut() {
            let contiguous = last.index_start + last.index_count == index_start;
            if last.texture == texture && contiguous {
                last.index_count += index_count;
                return;
            }
        }
        self.draw_calls.push(DrawCall {
            texture,
            index_start,
            index_count,
        });
    }
}

/// Build this frame's mesh. `has_texture` reports whether an image finished
/// loading for a key; quads without one are skipped, which is how a missing
/// player sprite or tile image is tolerated.
pub fn build_frame(session: &GameSession, has_texture: impl Fn(TextureKey) -> bool) -> FrameMesh {
    let tile = session.tile_size;
    let camera = &session.camera;
    let viewport = camera.viewport_size();
    let mut mesh = FrameMesh::default();

    // Only tiles whose rectangle overlaps the viewport are emitted.
    let (col_start, col_end) = visible_range(camera.offset.x, viewport.x, tile, session.map.width());
    let (row_start, row_end) =
        visible_range(camera.offset.y, viewport.y, tile, session.map.height());
    for row in row_start..row_end {
        for col in col_start..col_end {
            let Some(code) = session.map.tile_at(col, row) else {
                continue;
            };
            let key = TextureKey::Tile(code);
            if !has_texture(key) {
                continue;
            }
            let world = Vec2::new(col as f32 * tile, row as f32 * tile);
            mesh.push_quad(key, camera.world_to_screen(world), Vec2::splat(tile));
        }
    }

    let player = &session.player;
    let sprite_key = TextureKey::Sprite(player.facing);
    if has_texture(sprite_key) {
        let world = Vec2::new(player.x, player.y);
        let size = Vec2::new(session.footprint.width, session.footprint.height);
        mesh.push_quad(sprite_key, camera.world_to_screen(world), size);
    } else {
        log::trace!("Player sprite '{}' not loaded, skipping", player.facing);
    }

    mesh
}

/// Half-open tile index range overlapping `[offset, offset + extent)`.
fn visible_range(offset: f32, extent: f32, tile: f32, count: u32) -> (i32, i32) {
    let first = (offset / tile).floor().max(0.0) as i32;
    let last = ((offset + extent) / tile).ceil().min(count as f32) as i32;
    (first, last.max(first))
}
