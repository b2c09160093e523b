use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Follow camera over a pixel-space tile map.
///
/// `offset` is the world position of the viewport's top-left corner. Quads
/// are emitted in screen space (world minus offset), so the projection only
/// maps `[0, viewport]` pixels to clip space with y pointing down.
pub struct Camera2D {
    pub offset: Vec2,
    pub viewport: (u32, u32),
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            offset: Vec2::ZERO,
            viewport: (viewport_width, viewport_height),
        }
    }

    pub fn viewport_size(&self) -> Vec2 {
        Vec2::new(self.viewport.0 as f32, self.viewport.1 as f32)
    }

    /// Re-centre on `target` and clamp to a map of `map_size` pixels.
    pub fn follow(&mut self, target: Vec2, map_size: Vec2) {
        self.offset = compute_follow_offset(target, self.viewport_size(), map_size);
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.offset
    }

    pub fn build_uniform(&self) -> CameraUniform {
        let (w, h) = self.viewport_size().into();
        let proj = Mat4::orthographic_rh(0.0, w, h, 0.0, -1.0, 1.0);

        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}

/// Centre the viewport on `target`, then clamp each axis to
/// `[0, map - viewport]`. The upper bound is applied first, so an axis where
/// the map is smaller than the viewport collapses to 0.
pub fn compute_follow_offset(target: Vec2, viewport: Vec2, map_size: Vec2) -> Vec2 {
    let centred = target - viewport / 2.0;
    centred.min(map_size - viewport).max(Vec2::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn centres_on_target_inside_large_map() {
        let map = Vec2::new(2000.0, 2000.0);
        let offset = compute_follow_offset(Vec2::new(1000.0, 900.0), VIEWPORT, map);
        assert_eq!(offset, Vec2::new(600.0, 600.0));
    }

    #[test]
    fn clamps_at_map_origin() {
        let map = Vec2::new(2000.0, 2000.0);
        let offset = compute_follow_offset(Vec2::new(50.0, 100.0), VIEWPORT, map);
        assert_eq!(offset, Vec2::ZERO);
    }

    #[test]
    fn clamps_at_far_edge() {
        let map = Vec2::new(1200.0, 1000.0);
        let offset = compute_follow_offset(Vec2::new(1190.0, 990.0), VIEWPORT, map);
        assert_eq!(offset, Vec2::new(400.0, 400.0));
    }

    #[test]
    fn map_smaller_than_viewport_stays_at_zero() {
        let map = Vec2::new(100.0, 50.0);
        for target in [Vec2::ZERO, Vec2::new(60.0, 10.0), Vec2::new(5000.0, 5000.0)] {
            assert_eq!(compute_follow_offset(target, VIEWPORT, map), Vec2::ZERO);
        }
    }

    #[test]
    fn offset_stays_within_bounds_across_sweep() {
        let map = Vec2::new(1500.0, 650.0);
        let mut x = -200.0;
        while x < 1800.0 {
            let offset = compute_follow_offset(Vec2::new(x, x * 0.5), VIEWPORT, map);
            assert!(offset.x >= 0.0 && offset.x <= map.x - VIEWPORT.x);
            assert!(offset.y >= 0.0 && offset.y <= map.y - VIEWPORT.y);
            x += 37.0;
        }
    }

    #[test]
    fn follow_updates_offset_and_screen_mapping() {
        let mut camera = Camera2D::new(800, 600);
        camera.follow(Vec2::new(1000.0, 900.0), Vec2::new(2000.0, 2000.0));
        assert_eq!(camera.offset, Vec2::new(600.0, 600.0));
        assert_eq!(
            camera.world_to_screen(Vec2::new(650.0, 700.0)),
            Vec2::new(50.0, 100.0)
        );
    }
}
