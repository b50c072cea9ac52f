#[cfg(not(any(test, feature = "std")))]
use micromath::F32Ext;

/// 2D affine transform using row vectors:
///
/// ```text
///                 | m11 m12 0 |
/// [x' y' 1] = [x y 1] | m21 m22 0 |
///                 | m31 m32 1 |
/// ```
///
/// `a.followed_by(b)` is the product `a × b`, a point is mapped through `a`
/// first and through `b` afterwards. Composing the CTM this way makes a sequence of
/// `translate`/`rotate`/`scale` calls act on a point in call order, i.e. the
/// last call ends up left-most in column-vector notation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub m31: f32,
    pub m32: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform =
        Transform { m11: 1.0, m12: 0.0, m21: 0.0, m22: 1.0, m31: 0.0, m32: 0.0 };

    pub const fn new(m11: f32, m12: f32, m21: f32, m22: f32, m31: f32, m32: f32) -> Self {
        Self { m11, m12, m21, m22, m31, m32 }
    }

    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// `x' = x·cos + y·sin`, `y' = y·cos - x·sin`, counter-clockwise on a y-down
    /// surface for positive angles
    pub fn rotation(radians: f32) -> Self {
        let (sin, cos) = (radians.sin(), radians.cos());
        Self::new(cos, -sin, sin, cos, 0.0, 0.0)
    }

    pub fn followed_by(&self, next: &Transform) -> Transform {
        let (a, b) = (self, next);
        Transform {
            m11: a.m11 * b.m11 + a.m12 * b.m21,
            m12: a.m11 * b.m12 + a.m12 * b.m22,
            m21: a.m21 * b.m11 + a.m22 * b.m21,
            m22: a.m21 * b.m12 + a.m22 * b.m22,
            m31: a.m31 * b.m11 + a.m32 * b.m21 + b.m31,
            m32: a.m31 * b.m12 + a.m32 * b.m22 + b.m32,
        }
    }

    pub fn translate(&mut self, tx: f32, ty: f32) {
        *self = self.followed_by(&Self::translation(tx, ty));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        *self = self.followed_by(&Self::scaling(sx, sy));
    }

    pub fn rotate(&mut self, radians: f32) {
        *self = self.followed_by(&Self::rotation(radians));
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.m11 + y * self.m21 + self.m31, x * self.m12 + y * self.m22 + self.m32)
    }

    /// Maps a point and rounds it to the nearest device pixel
    pub fn project(&self, x: i32, y: i32) -> (i32, i32) {
        let (x, y) = self.apply(x as f32, y as f32);
        (x.round() as i32, y.round() as i32)
    }
}

mod test {
    #[test]
    fn test_translate_only() {
        use super::Transform;

        let mut ctm = Transform::IDENTITY;
        ctm.rotate(0.0);
        ctm.translate(10.0, 5.0);
        assert_eq!(ctm.project(0, 0), (10, 5));
    }

    #[test]
    fn test_composition_is_not_commutative() {
        use core::f32::consts::FRAC_PI_2;

        use super::Transform;

        let mut translate_first = Transform::IDENTITY;
        translate_first.translate(10.0, 0.0);
        translate_first.rotate(FRAC_PI_2);

        let mut rotate_first = Transform::IDENTITY;
        rotate_first.rotate(FRAC_PI_2);
        rotate_first.translate(10.0, 0.0);

        assert_eq!(translate_first.project(1, 0), (0, -11));
        assert_eq!(rotate_first.project(1, 0), (10, -1));
        assert_ne!(translate_first.project(1, 0), rotate_first.project(1, 0));
    }

    #[test]
    fn test_rotate_around_origin_then_move() {
        use core::f32::consts::PI;

        use super::Transform;

        let mut ctm = Transform::IDENTITY;
        ctm.rotate(PI);
        ctm.translate(180.0, 144.0);
        assert_eq!(ctm.project(0, 0), (180, 144));
        assert_eq!(ctm.project(20, 0), (160, 144));
    }

    #[test]
    fn test_rotation_sense() {
        use core::f32::consts::FRAC_PI_6;

        use super::Transform;

        let ctm = Transform::rotation(FRAC_PI_6);
        let (x, y) = ctm.apply(0.0, 100.0);
        assert!((x - 50.0).abs() < 1e-3);
        assert!((y - 86.6025).abs() < 1e-3);
        let (x, y) = ctm.apply(100.0, 0.0);
        assert!((x - 86.6025).abs() < 1e-3);
        assert!((y + 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_scale_then_translate() {
        use super::Transform;

        let mut ctm = Transform::IDENTITY;
        ctm.scale(0.5, 0.5);
        ctm.translate(100.0, 50.0);
        assert_eq!(ctm.project(20, -10), (110, 45));
    }
}
