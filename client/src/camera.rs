//! Viewport placement: pure world-space camera math

/// Computes the camera origin that centers the viewport on `local`,
/// clamped so the viewport never scrolls past the world edge.
///
/// When the world is smaller than the viewport on an axis the clamp range
/// is empty; the camera pins to 0 and the world under-fills the viewport.
pub fn compute_camera(local: (f32, f32), viewport: (f32, f32), world: (f32, f32)) -> (f32, f32) {
    (
        clamp_axis(local.0 - viewport.0 / 2.0, world.0 - viewport.0),
        clamp_axis(local.1 - viewport.1 / 2.0, world.1 - viewport.1),
    )
}

fn clamp_axis(desired: f32, max: f32) -> f32 {
    desired.clamp(0.0, max.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_centers_on_local_entity() {
        let cam = compute_camera((1000.0, 1000.0), (800.0, 600.0), (2000.0, 2000.0));
        assert_eq!(cam, (600.0, 700.0));
    }

    #[test]
    fn test_camera_clamps_at_world_edge() {
        // local at (1990, 1990): desired (1590, 1690) exceeds the scroll range
        let cam = compute_camera((1990.0, 1990.0), (800.0, 600.0), (2000.0, 2000.0));
        assert_eq!(cam, (1200.0, 1400.0));
    }

    #[test]
    fn test_camera_clamps_at_origin() {
        let cam = compute_camera((10.0, 10.0), (800.0, 600.0), (2000.0, 2000.0));
        assert_eq!(cam, (0.0, 0.0));
    }

    #[test]
    fn test_world_smaller_than_viewport_pins_to_zero() {
        let cam = compute_camera((100.0, 100.0), (800.0, 600.0), (400.0, 300.0));
        assert_eq!(cam, (0.0, 0.0));
    }

    #[test]
    fn test_camera_stays_in_bounds_for_all_sizes() {
        let worlds = [200.0, 600.0, 800.0, 2000.0, 5000.0];
        let viewports = [320.0, 600.0, 800.0, 1920.0];
        let positions = [-50.0, 0.0, 123.4, 999.0, 10_000.0];

        for &w in &worlds {
            for &vw in &viewports {
                for &px in &positions {
                    for &py in &positions {
                        let (x, y) = compute_camera((px, py), (vw, vw), (w, w));
                        assert!(x >= 0.0 && x <= (w - vw).max(0.0));
                        assert!(y >= 0.0 && y <= (w - vw).max(0.0));
                    }
                }
            }
        }
    }
}
