//! Rotation conversions between quaternions, matrices and Euler angles.
//!
//! Quaternions are scalar-first (`[w, x, y, z]`), matrices row-major.
//! Euler angles follow the static `xyz` convention.

use crate::types::{Mat3, Quat, Vec3, QUAT_IDENTITY};

const EPS4: f32 = f32::EPSILON * 4.0;

fn to_glam(q: Quat) -> glam::Quat {
    glam::Quat::from_xyzw(q[1], q[2], q[3], q[0])
}

/// Normalizes `q`, falling back to the identity for a zero quaternion.
#[must_use]
pub fn normalize_quat(q: Quat) -> Quat {
    let norm = q.iter().map(|c| c * c).sum::<f32>().sqrt();
    if norm <= EPS4 {
        return QUAT_IDENTITY;
    }
    [q[0] / norm, q[1] / norm, q[2] / norm, q[3] / norm]
}

/// Rotation matrix of a (possibly unnormalized) quaternion.
#[must_use]
pub fn quat2mat(q: Quat) -> Mat3 {
    let m = glam::Mat3::from_quat(to_glam(normalize_quat(q)));
    let mut out = [[0.0; 3]; 3];
    for (c, col) in [m.x_axis, m.y_axis, m.z_axis].into_iter().enumerate() {
        out[0][c] = col.x;
        out[1][c] = col.y;
        out[2][c] = col.z;
    }
    out
}

/// Euler angles of a rotation matrix.
///
/// Near gimbal lock (`cy` under 4 eps) the first angle is pinned to zero.
#[must_use]
pub fn mat2euler(m: &Mat3) -> Vec3 {
    let cy = (m[2][2] * m[2][2] + m[1][2] * m[1][2]).sqrt();
    if cy > EPS4 {
        Vec3::new(
            -m[1][2].atan2(m[2][2]),
            -(-m[0][2]).atan2(cy),
            -m[0][1].atan2(m[0][0]),
        )
    } else {
        Vec3::new(0.0, -(-m[0][2]).atan2(cy), -(-m[1][0]).atan2(m[1][1]))
    }
}

/// Rotates `v` by the matrix `m`.
#[must_use]
pub fn mat_vec(m: &Mat3, v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
        m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
        m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn from_glam(q: glam::Quat) -> Quat {
        [q.w, q.x, q.y, q.z]
    }

    #[test]
    fn identity_quat_gives_identity_matrix() {
        let m = quat2mat(QUAT_IDENTITY);
        assert_eq!(m, [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
    }

    #[test]
    fn flipped_quat_is_same_rotation() {
        let a = quat2mat([1.0, 0.0, 0.0, 0.0]);
        let b = quat2mat([-1.0, 0.0, 0.0, 0.0]);
        for r in 0..3 {
            for c in 0..3 {
                assert_relative_eq!(a[r][c], b[r][c], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn yaw_round_trips_through_euler() {
        let q = from_glam(glam::Quat::from_rotation_z(0.3));
        let e = mat2euler(&quat2mat(q));
        assert_relative_eq!(e.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(e.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(e.z, 0.3, epsilon = 1e-5);
    }

    #[test]
    fn roll_shows_up_in_first_angle() {
        let q = from_glam(glam::Quat::from_rotation_x(-0.7));
        let e = mat2euler(&quat2mat(q));
        assert_relative_eq!(e.x, -0.7, epsilon = 1e-5);
        assert_relative_eq!(e.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn zero_quat_normalizes_to_identity() {
        assert_eq!(normalize_quat([0.0; 4]), QUAT_IDENTITY);
    }
}
