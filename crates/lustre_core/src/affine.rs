//! 2D affine transforms

use crate::geometry::{Point, Rect};

/// Magnitude below which a matrix coefficient counts as zero
const COEFF_EPSILON: f64 = 1e-4;

/// 2D affine transformation
///
/// The builder methods (`translate`, `scale`, `rotate`) append: the new
/// operation is applied *after* everything already in the matrix, so
/// `Affine2D::IDENTITY.translate(-c, -c).rotate(a).translate(c, c)` rotates
/// about `(c, c)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine2D {
    /// Matrix elements [a, b, c, d, tx, ty]
    /// | a  c  tx |
    /// | b  d  ty |
    /// | 0  0   1 |
    pub elements: [f64; 6],
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2D {
    pub const IDENTITY: Affine2D = Affine2D {
        elements: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    pub fn translation(x: f64, y: f64) -> Self {
        Self {
            elements: [1.0, 0.0, 0.0, 1.0, x, y],
        }
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self {
            elements: [sx, 0.0, 0.0, sy, 0.0, 0.0],
        }
    }

    pub fn rotation(angle: f64) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            elements: [c, s, -s, c, 0.0, 0.0],
        }
    }

    /// Rotation by `angle` radians about `pivot`
    pub fn rotation_about(angle: f64, pivot: Point) -> Self {
        Self::IDENTITY
            .translate(-pivot.x, -pivot.y)
            .rotate(angle)
            .translate(pivot.x, pivot.y)
    }

    pub fn transform_point(&self, point: Point) -> Point {
        let [a, b, c, d, tx, ty] = self.elements;
        Point::new(a * point.x + c * point.y + tx, b * point.x + d * point.y + ty)
    }

    /// Concatenate this transform with another (self * other)
    /// The resulting transform first applies `other`, then `self`.
    pub fn then(&self, other: &Affine2D) -> Affine2D {
        let [a1, b1, c1, d1, tx1, ty1] = self.elements;
        let [a2, b2, c2, d2, tx2, ty2] = other.elements;

        Affine2D {
            elements: [
                a1 * a2 + c1 * b2,
                b1 * a2 + d1 * b2,
                a1 * c2 + c1 * d2,
                b1 * c2 + d1 * d2,
                a1 * tx2 + c1 * ty2 + tx1,
                b1 * tx2 + d1 * ty2 + ty1,
            ],
        }
    }

    /// Append a translation
    pub fn translate(&self, x: f64, y: f64) -> Affine2D {
        Affine2D::translation(x, y).then(self)
    }

    /// Append a scale about the origin
    pub fn scale(&self, sx: f64, sy: f64) -> Affine2D {
        Affine2D::scaling(sx, sy).then(self)
    }

    /// Append a rotation about the origin
    pub fn rotate(&self, angle: f64) -> Affine2D {
        Affine2D::rotation(angle).then(self)
    }

    pub fn determinant(&self) -> f64 {
        let [a, b, c, d, _, _] = self.elements;
        a * d - b * c
    }

    /// Inverse transform, `None` when the matrix is singular
    pub fn invert(&self) -> Option<Affine2D> {
        let [a, b, c, d, tx, ty] = self.elements;
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }

        Some(Affine2D {
            elements: [
                d / det,
                -b / det,
                -c / det,
                a / det,
                (c * ty - d * tx) / det,
                -(a * ty - b * tx) / det,
            ],
        })
    }

    /// No rotation or skew: axis-aligned rects stay axis-aligned
    pub fn is_axis_aligned(&self) -> bool {
        let [_, b, c, _, _, _] = self.elements;
        b.abs() <= COEFF_EPSILON && c.abs() <= COEFF_EPSILON
    }

    /// Rotation (if any) is a multiple of 90°
    ///
    /// For quarter turns either (b, c) or (a, d) vanishes, so an axis-aligned
    /// rect maps exactly onto another axis-aligned rect.
    pub fn preserves_axis_alignment(&self) -> bool {
        let [a, b, c, d, _, _] = self.elements;
        let diagonal_zero = a.abs() <= COEFF_EPSILON && d.abs() <= COEFF_EPSILON;
        self.is_axis_aligned() || diagonal_zero
    }

    /// Axis-aligned bounding box of `rect` after transforming all four corners
    pub fn transform_aabb(&self, rect: &Rect) -> Rect {
        let corners = rect.corners().map(|p| self.transform_point(p));

        let mut x0 = f64::INFINITY;
        let mut y0 = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut y1 = f64::NEG_INFINITY;
        for p in corners {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }

        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Bounding box for transforms without rotation or skew
    ///
    /// Two opposite corners suffice when the transform keeps edges
    /// axis-aligned; callers must check [`Affine2D::is_axis_aligned`] first.
    pub fn transform_aligned_rect(&self, rect: &Rect) -> Rect {
        let tl = self.transform_point(Point::new(rect.left(), rect.top()));
        let br = self.transform_point(Point::new(rect.right(), rect.bottom()));
        Rect::from_corners(tl, br)
    }
}
