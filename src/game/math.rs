//! Geometry helpers shared by the path builder and the navigation controller.
//!
//! World axes: x east, y north ("forward"), z up. Yaw is measured from +y
//! toward +x, pitch is positive when looking down.

use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

/// Squared planar distance from `point` to `(x, y)`, ignoring z.
///
/// Cheaper than [`distance_2d`] for comparisons. Careful when summing the
/// results: `(a + b)^2 != a^2 + b^2`.
#[inline]
pub fn distance_2d_squared(point: Vec3, x: f32, y: f32) -> f32 {
    let dx = x - point.x;
    let dy = y - point.y;
    dx * dx + dy * dy
}

/// Planar distance from `point` to `(x, y)`, ignoring z.
#[inline]
pub fn distance_2d(point: Vec3, x: f32, y: f32) -> f32 {
    distance_2d_squared(point, x, y).sqrt()
}

#[inline]
pub fn distance_3d(a: Vec3, b: Vec3) -> f32 {
    (a - b).length()
}

/// Horizontal angle (radians) of `dir`, `atan2(x, y)`.
#[inline]
pub fn yaw_toward(dir: Vec3) -> f32 {
    dir.x.atan2(dir.y)
}

/// Vertical angle (radians) of `dir`, `-asin(z / |dir|)`.
///
/// `dir` must not be zero-length; callers only pass directions between
/// distinct points.
#[inline]
pub fn pitch_toward(dir: Vec3) -> f32 {
    -(dir.z / dir.length()).asin()
}

pub fn yaw_between(origin: Vec3, dest: Vec3) -> f32 {
    yaw_toward(dest - origin)
}

pub fn pitch_between(origin: Vec3, dest: Vec3) -> f32 {
    pitch_toward(dest - origin)
}

/// Normalize an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// Unit vector on the ground plane for a yaw angle.
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), yaw.cos(), 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-3;

    fn random_point(rng: &mut fastrand::Rng) -> Vec3 {
        Vec3::new(
            rng.f32() * 2000.0 - 1000.0,
            rng.f32() * 2000.0 - 1000.0,
            rng.f32() * 400.0 - 200.0,
        )
    }

    #[test]
    fn test_distance_3d_is_symmetric() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..200 {
            let a = random_point(&mut rng);
            let b = random_point(&mut rng);
            assert_eq!(distance_3d(a, b), distance_3d(b, a));
            assert_eq!(distance_3d(a, a), 0.0);
        }
    }

    #[test]
    fn test_distance_3d_is_additive_on_a_line() {
        let mut rng = fastrand::Rng::with_seed(11);
        for _ in 0..200 {
            let p1 = random_point(&mut rng);
            let p2 = random_point(&mut rng);
            let t = rng.f32();
            let mid = p1.lerp(p2, t);
            let whole = distance_3d(p1, p2);
            let parts = distance_3d(p1, mid) + distance_3d(mid, p2);
            assert!((whole - parts).abs() < EPS * whole.max(1.0),
                "{} vs {} for {:?} {:?} {:?}", whole, parts, p1, mid, p2);
        }
    }

    #[test]
    fn test_planar_distance_ignores_height() {
        let p = Vec3::new(3.0, 4.0, 1000.0);
        assert_eq!(distance_2d_squared(p, 0.0, 0.0), 25.0);
        assert_eq!(distance_2d(p, 0.0, 0.0), 5.0);
    }

    #[test]
    fn test_yaw_uses_y_as_forward() {
        assert!(yaw_toward(Vec3::Y).abs() < EPS);
        assert!((yaw_toward(Vec3::X) - FRAC_PI_2).abs() < EPS);
        assert!((yaw_toward(-Vec3::X) + FRAC_PI_2).abs() < EPS);
        assert!((yaw_between(Vec3::new(10.0, 10.0, 0.0), Vec3::new(10.0, 0.0, 0.0)).abs() - PI).abs() < EPS);
    }

    #[test]
    fn test_pitch_is_positive_when_looking_down() {
        assert!((pitch_toward(Vec3::new(0.0, 1.0, -1.0)) - PI / 4.0).abs() < EPS);
        assert!((pitch_toward(Vec3::Z) + FRAC_PI_2).abs() < EPS);
        assert!(pitch_between(Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0)).abs() < EPS);
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < EPS);
        assert!((wrap_angle(-TAU - 0.5) + 0.5).abs() < EPS);
        assert!((wrap_angle(3.0 * PI / 2.0) + FRAC_PI_2).abs() < EPS);
        assert!((wrap_angle(-3.0 * PI / 2.0) - FRAC_PI_2).abs() < EPS);
        assert!((wrap_angle(0.5) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_forward_from_yaw_matches_yaw_toward() {
        for yaw in [-2.0f32, -0.3, 0.0, 1.0, 2.5] {
            assert!((yaw_toward(forward_from_yaw(yaw)) - yaw).abs() < EPS);
        }
    }
}
