//! Vector and angle helpers shared by the kernel and the predictor.

pub use glam::Vec3;

/// Index of pitch in an angle triple.
pub const PITCH: usize = 0;
/// Index of yaw in an angle triple.
pub const YAW: usize = 1;
/// Index of roll in an angle triple.
pub const ROLL: usize = 2;

/// Orthonormal view axes derived from Euler angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axes {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

/// Derive forward/right/up from `(pitch, yaw, roll)` in degrees.
///
/// Pitch is positive looking down, yaw rotates counter-clockwise around +Z.
pub fn angle_vectors(angles: Vec3) -> Axes {
    let (sy, cy) = angles.y.to_radians().sin_cos();
    let (sp, cp) = angles.x.to_radians().sin_cos();
    let (sr, cr) = angles.z.to_radians().sin_cos();

    Axes {
        forward: Vec3::new(cp * cy, cp * sy, -sp),
        right: Vec3::new(-sr * sp * cy + cr * sy, -sr * sp * sy - cr * cy, -sr * cp),
        up: Vec3::new(cr * sp * cy + sr * sy, cr * sp * sy - sr * cy, cr * cp),
    }
}

/// Wrap an angle into `[0, 360)`.
#[inline]
pub fn angle_mod(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Normalize `v`, returning the unit vector and the original length.
///
/// A zero vector yields `(Vec3::ZERO, 0.0)`.
#[inline]
pub fn normalize_with_length(v: Vec3) -> (Vec3, f32) {
    let length = v.length();
    if length > 0.0 {
        (v / length, length)
    } else {
        (Vec3::ZERO, 0.0)
    }
}

/// Squared horizontal distance between two points.
#[inline]
pub fn horizontal_distance_squared(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_angle_vectors_identity() {
        let axes = angle_vectors(Vec3::ZERO);
        assert!(approx(axes.forward, Vec3::X));
        assert!(approx(axes.right, Vec3::new(0.0, -1.0, 0.0)));
        assert!(approx(axes.up, Vec3::Z));
    }

    #[test]
    fn test_angle_vectors_yaw_90() {
        let axes = angle_vectors(Vec3::new(0.0, 90.0, 0.0));
        assert!(approx(axes.forward, Vec3::Y));
        assert!(approx(axes.right, Vec3::X));
    }

    #[test]
    fn test_angle_vectors_pitch_down() {
        let axes = angle_vectors(Vec3::new(90.0, 0.0, 0.0));
        assert!(approx(axes.forward, Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_angle_mod() {
        assert_eq!(angle_mod(370.0), 10.0);
        assert_eq!(angle_mod(-90.0), 270.0);
        assert_eq!(angle_mod(0.0), 0.0);
        assert!(angle_mod(-1e-9) < 360.0);
    }

    #[test]
    fn test_normalize_zero() {
        let (dir, len) = normalize_with_length(Vec3::ZERO);
        assert_eq!(dir, Vec3::ZERO);
        assert_eq!(len, 0.0);
    }

    #[test]
    fn test_horizontal_distance_ignores_z() {
        let a = Vec3::new(3.0, 4.0, 100.0);
        assert_eq!(horizontal_distance_squared(a, Vec3::ZERO), 25.0);
    }
}
