//! Math type re-exports and geometry helpers used by primitive reconstruction.
//!
//! Vectors, quaternions and matrices come from `glam`. This module adds the
//! sector bounding box, the RGB color value type and the few plane/angle
//! helpers the expansion formulas need.

pub use glam::{Mat3, Mat4, Quat, Vec3, Vec4};

use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};
use std::fmt;

/// 3D axis-aligned bounding box with single precision.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BBox3f {
    pub min: Vec3,
    pub max: Vec3,
}

impl BBox3f {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include another box.
    #[inline]
    pub fn expand_by_box(&mut self, other: &Self) {
        if !other.is_empty() {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }

    /// Check whether `other` lies fully inside this box.
    #[inline]
    pub fn contains_box(&self, other: &Self) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size (extents) of the box.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

impl Default for BBox3f {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for BBox3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3f({:?} - {:?})", self.min, self.max)
    }
}

/// RGB color. Channels are either normalized or raw 0-255 depending on
/// [`ColorMode`](crate::config::ColorMode).
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, serde::Serialize, serde::Deserialize)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Shortest-arc rotation taking +Z onto `dir`.
///
/// `dir` is normalized first; a zero vector yields identity.
#[inline]
pub fn rotation_from_z(dir: Vec3) -> Quat {
    match dir.try_normalize() {
        Some(d) => Quat::from_rotation_arc(Vec3::Z, d),
        None => Quat::IDENTITY,
    }
}

/// Wrap an angle into `[-PI, PI]`.
pub fn normalize_radians(mut angle: f32) -> f32 {
    if !angle.is_finite() {
        return angle;
    }
    while angle < -PI {
        angle += TAU;
    }
    while angle > PI {
        angle -= TAU;
    }
    angle
}

/// Signed angle from `v1` to `v2` around `up`, wrapped into `[-PI, PI]`.
pub fn angle_between(v1: Vec3, v2: Vec3, up: Vec3) -> f32 {
    let angle = v1.angle_between(v2);
    let right = v1.cross(up);
    let more_than_pi = right.dot(v2) < 0.0;
    normalize_radians(if more_than_pi { TAU - angle } else { angle })
}

/// Plane through a point, stored as unit normal and signed constant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self { normal, constant: -point.dot(normal) }
    }

    /// Intersect the line through `start` and `end` with the plane.
    ///
    /// A line lying in the plane returns `start`; a parallel line returns `None`.
    pub fn intersect_line(&self, start: Vec3, end: Vec3) -> Option<Vec3> {
        let direction = end - start;
        let denominator = self.normal.dot(direction);
        if denominator == 0.0 {
            return (self.distance_to_point(start) == 0.0).then_some(start);
        }
        let t = -(start.dot(self.normal) + self.constant) / denominator;
        Some(start + direction * t)
    }

    #[inline]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }
}
