// src/engine_lib/transparency.rs

use glam::Vec3;

/// Orders transparent objects farthest first so blending composites them
/// correctly. Objects at equal distance keep their input order.
pub fn sort_back_to_front(camera_position: Vec3, positions: &[Vec3]) -> Vec<Vec3> {
    let mut sorted = positions.to_vec();
    sorted.sort_by(|a, b| {
        let da = camera_position.distance_squared(*a);
        let db = camera_position.distance_squared(*b);
        db.total_cmp(&da)
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farthest_comes_first() {
        let camera = Vec3::new(0.0, 1.0, 6.0);
        let grass = [
            Vec3::new(-1.5, 0.5, -0.48),
            Vec3::new(1.5, 0.5, 0.51),
            Vec3::new(0.0, 0.5, 0.7),
            Vec3::new(-0.3, 0.5, -2.3),
            Vec3::new(0.5, 0.5, -0.6),
        ];
        let sorted = sort_back_to_front(camera, &grass);
        assert_eq!(sorted[0], grass[3]);
        assert_eq!(sorted[4], grass[2]);
        for pair in sorted.windows(2) {
            assert!(camera.distance(pair[0]) >= camera.distance(pair[1]));
        }
    }

    #[test]
    fn equal_distances_are_all_kept_in_order() {
        let sorted = sort_back_to_front(Vec3::ZERO, &[Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::Z * 3.0]);
        assert_eq!(sorted, vec![Vec3::Z * 3.0, Vec3::X, Vec3::NEG_X, Vec3::Y]);
    }

    #[test]
    fn empty_input() {
        assert!(sort_back_to_front(Vec3::ONE, &[]).is_empty());
    }
}
