//! View transform between device pixels and scene units.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_ZOOM: f64 = 0.1;
pub const DEFAULT_MAX_ZOOM: f64 = 10.0;

/// Pan offset plus uniform zoom.
///
/// `device = scene * zoom + offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Translation in device pixels.
    pub offset: Vec2,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity view with custom zoom limits. Swapped limits are reordered.
    pub fn with_limits(min_zoom: f64, max_zoom: f64) -> Self {
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (max_zoom, min_zoom)
        };
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
        }
    }

    /// Scene to device transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Device to scene transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn to_scene(&self, device_point: Point) -> Point {
        self.inverse_transform() * device_point
    }

    pub fn to_device(&self, scene_point: Point) -> Point {
        self.transform() * scene_point
    }

    /// Pan by a delta in device pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Set the zoom level directly, clamped to the limits.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
    }

    /// Zoom by `factor`, keeping the scene point under `device_point` fixed.
    pub fn zoom_at(&mut self, device_point: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let anchor = self.to_scene(device_point);
        self.zoom = new_zoom;
        let moved = self.to_device(anchor);
        self.offset += device_point - moved;
    }

    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_by_default() {
        let camera = Camera::new();
        let p = Point::new(12.5, -3.0);
        assert_eq!(camera.to_scene(p), p);
    }

    #[test]
    fn test_round_trip_with_pan_and_zoom() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(100.0, 50.0));
        camera.set_zoom(2.0);

        let device = Point::new(300.0, 250.0);
        let scene = camera.to_scene(device);
        assert!((scene.x - 100.0).abs() < 1e-9);
        assert!((scene.y - 100.0).abs() < 1e-9);

        let back = camera.to_device(scene);
        assert!((back.x - device.x).abs() < 1e-9);
        assert!((back.y - device.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = Camera::new();
        camera.set_zoom(100.0);
        assert!((camera.zoom - DEFAULT_MAX_ZOOM).abs() < f64::EPSILON);
        camera.set_zoom(0.0001);
        assert!((camera.zoom - DEFAULT_MIN_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut camera = Camera::new();
        let anchor = Point::new(200.0, 150.0);
        let before = camera.to_scene(anchor);
        camera.zoom_at(anchor, 2.0);
        let after = camera.to_scene(anchor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
        assert!((camera.zoom - 2.0).abs() < f64::EPSILON);
    }
}
