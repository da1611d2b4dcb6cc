use std::ops::Mul;

use crate::geometry::{Point, Rect};

/// A 2-D scale-plus-translate transform.
///
/// This covers the subset of affine transforms the shell actually needs
/// for workspace effects (uniform or per-axis scale followed by a
/// translation) without pulling in a linear-algebra crate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub sx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        sx: 1.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn from_scale(sx: f64, sy: f64) -> Self {
        Self {
            sx,
            sy,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn from_translation(tx: f64, ty: f64) -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            tx,
            ty,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.sx + self.tx, p.y * self.sy + self.ty)
    }

    /// Maps a rectangle through the transform, rounding outward is not
    /// needed here: scaled sizes are truncated like the rest of the
    /// integer geometry.
    pub fn apply_rect(&self, r: Rect) -> Rect {
        let origin = self.apply(Point::new(r.x as f64, r.y as f64));
        Rect::new(
            origin.x.round() as i32,
            origin.y.round() as i32,
            (r.width as f64 * self.sx).round() as i32,
            (r.height as f64 * self.sy).round() as i32,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `a * b` applies `b` first, then `a`.
impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform {
            sx: self.sx * rhs.sx,
            sy: self.sy * rhs.sy,
            tx: self.sx * rhs.tx + self.tx,
            ty: self.sy * rhs.ty + self.ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_neutral() {
        let p = Point::new(3.0, -7.5);
        assert_eq!(Transform::IDENTITY.apply(p), p);
        assert!(Transform::default().is_identity());
    }

    #[test]
    fn translate_after_scale() {
        let t = Transform::from_translation(10.0, 20.0) * Transform::from_scale(0.5, 0.5);
        let p = t.apply(Point::new(100.0, 100.0));
        assert_eq!(p, Point::new(60.0, 70.0));
    }

    #[test]
    fn rect_mapping_scales_size() {
        let t = Transform::from_translation(5.0, 5.0) * Transform::from_scale(0.25, 0.25);
        let r = t.apply_rect(Rect::new(0, 0, 400, 200));
        assert_eq!(r, Rect::new(5, 5, 100, 50));
    }
}
