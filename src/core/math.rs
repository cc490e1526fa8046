// Math utilities: 2D affine transforms

use glam::{Affine2, Mat2, Mat3, Vec2};

/// A 2D affine transform stored as a 3x3 matrix whose third row is always
/// `[0, 0, 1]`.
///
/// Rows are written the way the pose tables read:
///
/// ```text
/// [ sx  kx  tx ]
/// [ ky  sy  ty ]
/// [ 0   0   1  ]
/// ```
///
/// Points are transformed as `row * model * view`, which for column vectors
/// is `view * model * point`. The projective row is not representable, so
/// the affine invariant holds by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D(Affine2);

impl Transform2D {
    pub const IDENTITY: Self = Self(Affine2::IDENTITY);

    /// Build a transform from its first two rows
    pub fn from_rows(row0: [f32; 3], row1: [f32; 3]) -> Self {
        Self(Affine2::from_cols(
            Vec2::new(row0[0], row1[0]),
            Vec2::new(row0[1], row1[1]),
            Vec2::new(row0[2], row1[2]),
        ))
    }

    /// Axis-aligned scale followed by a translation
    pub fn scale_translate(scale: Vec2, translation: Vec2) -> Self {
        Self(Affine2::from_mat2_translation(
            Mat2::from_diagonal(scale),
            translation,
        ))
    }

    /// Column-major 3x3 layout, as expected by `mat3x3<f32>` uniforms
    pub fn to_cols_array(&self) -> [f32; 9] {
        Mat3::from(self.0).to_cols_array()
    }
}

// Inspection helpers for tests
#[cfg(test)]
impl Transform2D {
    /// All three rows, the last one being `[0, 0, 1]`
    pub fn rows(&self) -> [[f32; 3]; 3] {
        let m = self.0.matrix2;
        let t = self.0.translation;
        [
            [m.x_axis.x, m.y_axis.x, t.x],
            [m.x_axis.y, m.y_axis.y, t.y],
            [0.0, 0.0, 1.0],
        ]
    }

    /// Transform a point (translation applies)
    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        self.0.transform_point2(point)
    }

    pub fn translation(&self) -> Vec2 {
        self.0.translation
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_from_rows_roundtrips_rows() {
        let t = Transform2D::from_rows([1.0, 2.0, 3.0], [4.0, 5.0, 6.0]);
        assert_eq!(
            t.rows(),
            [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [0.0, 0.0, 1.0]]
        );
    }

    #[test]
    fn test_scale_then_translate() {
        let t = Transform2D::scale_translate(Vec2::new(2.0, 3.0), Vec2::new(10.0, 0.0));

        let p = t.transform_point(Vec2::new(1.0, 1.0));
        assert_abs_diff_eq!(p.x, 12.0);
        assert_abs_diff_eq!(p.y, 3.0);
        assert_eq!(t.rows()[2], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_skew_terms_are_kept() {
        // A pure rotation by 90 degrees expressed through off-diagonal terms
        let rot = Transform2D::from_rows([0.0, -1.0, 0.0], [1.0, 0.0, 0.0]);
        let p = rot.transform_point(Vec2::new(1.0, 0.0));
        assert_abs_diff_eq!(p.x, 0.0);
        assert_abs_diff_eq!(p.y, 1.0);
    }

    #[test]
    fn test_cols_array_is_column_major() {
        let t = Transform2D::from_rows([1.0, 2.0, 3.0], [4.0, 5.0, 6.0]);
        assert_eq!(
            t.to_cols_array(),
            [1.0, 4.0, 0.0, 2.0, 5.0, 0.0, 3.0, 6.0, 1.0]
        );
    }
}
