// Camera: maps pixel space centred on the origin to clip space

use crate::core::Transform2D;
use glam::Vec2;

/// 2D camera for sprite rendering. The visible area is
/// `±(width/2, height/2)` pixels around the origin.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Viewport width
    viewport_width: f32,
    /// Viewport height
    viewport_height: f32,
    /// View transform
    view: Transform2D,
}

impl Camera {
    /// Create a new camera
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        let mut camera = Self {
            viewport_width,
            viewport_height,
            view: Transform2D::IDENTITY,
        };
        camera.update_view();
        camera
    }

    /// Update the view transform
    fn update_view(&mut self) {
        // A zero-sized viewport (minimised window) keeps the last usable view
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return;
        }

        self.view = Transform2D::scale_translate(
            Vec2::new(2.0 / self.viewport_width, 2.0 / self.viewport_height),
            Vec2::ZERO,
        );
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.update_view();
    }

    /// Get the view transform
    pub fn view(&self) -> Transform2D {
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_view_matrix() {
        let camera = Camera::new(800.0, 600.0);
        assert_eq!(
            camera.view().rows(),
            [
                [2.0 / 800.0, 0.0, 0.0],
                [0.0, 2.0 / 600.0, 0.0],
                [0.0, 0.0, 1.0]
            ]
        );
    }

    #[test]
    fn test_viewport_edges_map_to_clip_edges() {
        let camera = Camera::new(800.0, 600.0);
        let corner = camera.view().transform_point(Vec2::new(400.0, -300.0));
        assert_abs_diff_eq!(corner.x, 1.0);
        assert_abs_diff_eq!(corner.y, -1.0);
    }

    #[test]
    fn test_resize_recomputes_view() {
        let mut camera = Camera::new(800.0, 600.0);
        camera.resize(1024.0, 512.0);
        let p = camera.view().transform_point(Vec2::new(512.0, 256.0));
        assert_abs_diff_eq!(p.x, 1.0);
        assert_abs_diff_eq!(p.y, 1.0);
    }

    #[test]
    fn test_zero_size_keeps_previous_view() {
        let mut camera = Camera::new(800.0, 600.0);
        let before = camera.view();
        camera.resize(0.0, 0.0);
        assert_eq!(camera.view(), before);
    }
}
