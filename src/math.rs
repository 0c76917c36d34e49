//! Small numerical helpers for working with point data read from PLY files.
//!
//! None of the reading or writing code depends on this module.

use cgmath::{Point3, Vector3, prelude::*};
use failure::Fail;


/// Pivots with an absolute value not larger than this are treated as zero.
const EPSILON: f64 = 1e-8;

/// Returned when a linear system doesn't have a unique solution (or when
/// there are too few points to fit a plane).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Fail)]
#[fail(display = "matrix is singular, the system has no unique solution")]
pub struct SingularMatrix;

/// Solves the 3x3 linear system given as augmented matrix (the last column is
/// the right hand side) with Gauss-Jordan elimination and partial pivoting.
pub fn gauss_elimination(mut m: [[f64; 4]; 3]) -> Result<[f64; 3], SingularMatrix> {
    for col in 0..3 {
        // Choose the row with the largest absolute value in this column.
        let pivot_row = (col..3)
            .max_by(|&a, &b| {
                m[a][col].abs().partial_cmp(&m[b][col].abs()).unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);

        // Written this way to also catch NaN.
        if !(m[pivot_row][col].abs() > EPSILON) {
            return Err(SingularMatrix);
        }
        m.swap(col, pivot_row);

        let pivot = m[col][col];
        for x in &mut m[col] {
            *x /= pivot;
        }

        for row in 0..3 {
            if row == col {
                continue;
            }

            let factor = m[row][col];
            for i in col..4 {
                m[row][i] -= factor * m[col][i];
            }
        }
    }

    Ok([m[0][3], m[1][3], m[2][3]])
}

/// Fits the plane `z = a*x + b*y + c` through the given points with the least
/// squares method.
///
/// The result is returned as coefficients `[a, b, -1, c]` of the plane
/// equation `a*X + b*Y + c*Z + d = 0`, which can be passed to [`distance`].
/// Returns `SingularMatrix` if there are fewer than three points, or if the
/// points don't determine such a plane (e.g. they are collinear or the plane
/// is parallel to the z axis).
pub fn fit_plane(points: &[Point3<f64>]) -> Result<[f64; 4], SingularMatrix> {
    if points.len() < 3 {
        return Err(SingularMatrix);
    }

    let mut m = [[0.0; 4]; 3];
    for p in points {
        m[0][0] += p.x * p.x;
        m[0][1] += p.x * p.y;
        m[0][2] += p.x;
        m[0][3] += p.x * p.z;

        m[1][1] += p.y * p.y;
        m[1][2] += p.y;
        m[1][3] += p.y * p.z;

        m[2][3] += p.z;
    }

    // The matrix is symmetric.
    m[1][0] = m[0][1];
    m[2][0] = m[0][2];
    m[2][1] = m[1][2];
    m[2][2] = points.len() as f64;

    // Normalizing by the number of points keeps the pivots comparable to
    // `EPSILON` regardless of the number of points.
    let n = points.len() as f64;
    for x in m.iter_mut().flat_map(|row| row.iter_mut()) {
        *x /= n;
    }

    let [a, b, c] = gauss_elimination(m)?;
    Ok([a, b, -1.0, c])
}

/// Returns the distance of `point` to the plane `a*X + b*Y + c*Z + d = 0`
/// given as `[a, b, c, d]`.
///
/// If `a`, `b` and `c` are all zero, the result is not finite.
pub fn distance(point: Point3<f64>, plane: &[f64; 4]) -> f64 {
    let normal = Vector3::new(plane[0], plane[1], plane[2]);
    (normal.dot(point.to_vec()) + plane[3]).abs() / normal.magnitude()
}
