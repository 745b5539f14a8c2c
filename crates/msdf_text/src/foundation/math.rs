//! Math utilities and types
//!
//! Provides the vector, matrix and rectangle types used by text layout.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (also used for RGBA colors)
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Axis-aligned rectangle stored as origin plus extent
///
/// `width` and `height` are never negative for rectangles built through
/// [`Rect::from_ltrb`] or [`Rect::union`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Minimum X coordinate
    pub x: f32,
    /// Minimum Y coordinate
    pub y: f32,
    /// Extent along X
    pub width: f32,
    /// Extent along Y
    pub height: f32,
}

impl Rect {
    /// The empty rectangle at the origin
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };

    /// Create a rectangle from origin and extent
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from edge coordinates in any order
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        let x = left.min(right);
        let y = top.min(bottom);
        Self {
            x,
            y,
            width: left.max(right) - x,
            height: top.max(bottom) - y,
        }
    }

    /// Right edge (maximum X)
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (maximum Y)
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True when the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Move the rectangle by the given offset
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self { x: self.x + dx, y: self.y + dy, ..*self }
    }

    /// Smallest rectangle containing both `self` and `other`
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Math constants
pub mod constants {
    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;
}

/// Model matrix helpers for placing text
pub mod transform {
    use super::{Mat4, Quat, Vec2, Vec3};

    /// Compose translation, rotation and scale into `T * R * S`
    pub fn compose(position: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
        Mat4::new_translation(&position)
            * rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&scale)
    }

    /// Rotate, then scale, then translate: `T * S * R`
    ///
    /// Unlike [`compose`], non-uniform scale applies along the parent axes
    /// after rotation.
    pub fn place(position: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
        Mat4::new_translation(&position)
            * Mat4::new_nonuniform_scaling(&scale)
            * rotation.to_homogeneous()
    }

    /// Place flat text on a 2D layer, rotated about the view axis
    ///
    /// Text sits at `z = depth - 1` so that depth 1 lands on the near plane
    /// of a unit orthographic layer.
    pub fn screen(position: Vec2, depth: f32, angle: f32, scale: Vec2) -> Mat4 {
        let rotation = Quat::from_axis_angle(&-Vec3::z_axis(), angle);
        place(
            Vec3::new(position.x, position.y, depth - 1.0),
            rotation,
            Vec3::new(scale.x, scale.y, 1.0),
        )
    }

    /// Translation column of an affine matrix
    pub fn translation(matrix: &Mat4) -> Vec3 {
        Vec3::new(matrix.m14, matrix.m24, matrix.m34)
    }

    /// Per-axis scale of an affine matrix (lengths of the basis columns)
    pub fn scale(matrix: &Mat4) -> Vec3 {
        Vec3::new(
            Vec3::new(matrix.m11, matrix.m21, matrix.m31).magnitude(),
            Vec3::new(matrix.m12, matrix.m22, matrix.m32).magnitude(),
            Vec3::new(matrix.m13, matrix.m23, matrix.m33).magnitude(),
        )
    }
}
