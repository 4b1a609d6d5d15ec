//! Fixed-capacity structure-of-arrays primitive storage.
//!
//! Every group is sized once from a counting pass and never grows. Each
//! attribute lives in its own vector so renderers can upload columns
//! directly (see [`as_bytes`]).

use crate::util::{Color, Vec3};

use super::types::RenderedKind;

/// Identity shared by every stored instance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PrimitiveBase {
    pub node_id: u64,
    pub tree_index: u64,
    pub color: Color,
}

impl PrimitiveBase {
    pub const fn new(node_id: u64, tree_index: u64, color: Color) -> Self {
        Self { node_id, tree_index, color }
    }
}

/// Generates a row struct and its SoA table from one field list.
///
/// Both carry `node_id`, `tree_index` and `color` ahead of the listed fields.
macro_rules! soa_group {
    (
        $(#[$meta:meta])*
        $row:ident, $group:ident {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq)]
        pub struct $row {
            pub base: PrimitiveBase,
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        #[doc = concat!("Column storage for [`", stringify!($row), "`] instances.")]
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $group {
            pub node_id: Vec<u64>,
            pub tree_index: Vec<u64>,
            pub color: Vec<Color>,
            $( pub $field: Vec<$ty>, )*
            capacity: usize,
        }

        impl $group {
            pub fn with_capacity(capacity: usize) -> Self {
                Self {
                    node_id: Vec::with_capacity(capacity),
                    tree_index: Vec::with_capacity(capacity),
                    color: Vec::with_capacity(capacity),
                    $( $field: Vec::with_capacity(capacity), )*
                    capacity,
                }
            }

            /// Number of stored instances.
            #[inline]
            pub fn count(&self) -> usize {
                self.node_id.len()
            }

            #[inline]
            pub fn capacity(&self) -> usize {
                self.capacity
            }

            #[inline]
            pub fn is_empty(&self) -> bool {
                self.node_id.is_empty()
            }

            #[inline]
            pub fn is_full(&self) -> bool {
                self.count() == self.capacity
            }

            /// Append one instance.
            ///
            /// # Panics
            /// If the group already holds `capacity` instances.
            pub fn add(&mut self, row: $row) {
                assert!(
                    self.count() < self.capacity,
                    concat!(stringify!($group), " is full (capacity {})"),
                    self.capacity
                );
                self.node_id.push(row.base.node_id);
                self.tree_index.push(row.base.tree_index);
                self.color.push(row.base.color);
                $( self.$field.push(row.$field); )*
            }

            /// Instance at `index`, if written.
            pub fn get(&self, index: usize) -> Option<$row> {
                if index >= self.count() {
                    return None;
                }
                Some($row {
                    base: PrimitiveBase {
                        node_id: self.node_id[index],
                        tree_index: self.tree_index[index],
                        color: self.color[index],
                    },
                    $( $field: self.$field[index], )*
                })
            }

            /// Overwrite the instance at `index`.
            ///
            /// # Panics
            /// If `index` has not been written yet.
            pub fn set(&mut self, index: usize, row: $row) {
                assert!(index < self.count(), "index {} out of range ({} written)", index, self.count());
                self.node_id[index] = row.base.node_id;
                self.tree_index[index] = row.base.tree_index;
                self.color[index] = row.base.color;
                $( self.$field[index] = row.$field; )*
            }

            pub fn iter(&self) -> impl Iterator<Item = $row> + '_ {
                (0..self.count()).filter_map(move |i| self.get(i))
            }
        }
    };
}

pub(crate) use soa_group;

/// Common view over the twelve rendered primitive groups.
pub trait PrimitiveGroup {
    fn kind(&self) -> RenderedKind;
    fn count(&self) -> usize;
    fn capacity(&self) -> usize;
    fn node_ids(&self) -> &[u64];
    fn tree_indices(&self) -> &[u64];
    fn colors(&self) -> &[Color];
}

macro_rules! impl_primitive_group {
    ($($group:ident => $kind:ident),* $(,)?) => {
        $(
            impl PrimitiveGroup for $group {
                #[inline]
                fn kind(&self) -> RenderedKind {
                    RenderedKind::$kind
                }
                #[inline]
                fn count(&self) -> usize {
                    $group::count(self)
                }
                #[inline]
                fn capacity(&self) -> usize {
                    $group::capacity(self)
                }
                fn node_ids(&self) -> &[u64] {
                    &self.node_id
                }
                fn tree_indices(&self) -> &[u64] {
                    &self.tree_index
                }
                fn colors(&self) -> &[Color] {
                    &self.color
                }
            }
        )*
    };
}

soa_group! {
    /// Oriented box.
    BoxPrimitive, BoxGroup {
        center: Vec3,
        normal: Vec3,
        /// Rotation about `normal`, radians.
        angle: f32,
        /// Edge lengths.
        delta: Vec3,
    }
}

soa_group! {
    CirclePrimitive, CircleGroup {
        center: Vec3,
        normal: Vec3,
        radius: f32,
    }
}

soa_group! {
    /// Cone or cylinder surface between two end centers, optionally a slice.
    ConePrimitive, ConeGroup {
        center_a: Vec3,
        center_b: Vec3,
        radius_a: f32,
        radius_b: f32,
        angle: f32,
        arc_angle: f32,
    }
}

soa_group! {
    EccentricConePrimitive, EccentricConeGroup {
        center_a: Vec3,
        center_b: Vec3,
        radius_a: f32,
        radius_b: f32,
        /// Cap normal, oriented from B towards A.
        normal: Vec3,
    }
}

soa_group! {
    EllipsoidSegmentPrimitive, EllipsoidSegmentGroup {
        center: Vec3,
        normal: Vec3,
        h_radius: f32,
        v_radius: f32,
        height: f32,
    }
}

soa_group! {
    /// Cylinder cut by two slanted planes.
    GeneralCylinderPrimitive, GeneralCylinderGroup {
        center_a: Vec3,
        center_b: Vec3,
        radius: f32,
        height_a: f32,
        height_b: f32,
        slope_a: f32,
        slope_b: f32,
        z_angle_a: f32,
        z_angle_b: f32,
        angle: f32,
        arc_angle: f32,
    }
}

soa_group! {
    /// Elliptic ring (annulus) sector in a plane.
    GeneralRingPrimitive, GeneralRingGroup {
        center: Vec3,
        normal: Vec3,
        local_x_axis: Vec3,
        x_radius: f32,
        y_radius: f32,
        thickness: f32,
        angle: f32,
        arc_angle: f32,
    }
}

soa_group! {
    NutPrimitive, NutGroup {
        center_a: Vec3,
        center_b: Vec3,
        radius: f32,
        rotation_angle: f32,
    }
}

soa_group! {
    QuadPrimitive, QuadGroup {
        vertex1: Vec3,
        vertex2: Vec3,
        vertex3: Vec3,
    }
}

soa_group! {
    SphericalSegmentPrimitive, SphericalSegmentGroup {
        center: Vec3,
        normal: Vec3,
        radius: f32,
        height: f32,
    }
}

soa_group! {
    TorusSegmentPrimitive, TorusSegmentGroup {
        center: Vec3,
        normal: Vec3,
        radius: f32,
        tube_radius: f32,
        angle: f32,
        arc_angle: f32,
    }
}

soa_group! {
    TrapeziumPrimitive, TrapeziumGroup {
        vertex1: Vec3,
        vertex2: Vec3,
        vertex3: Vec3,
        vertex4: Vec3,
    }
}

impl_primitive_group! {
    BoxGroup => Box,
    CircleGroup => Circle,
    ConeGroup => Cone,
    EccentricConeGroup => EccentricCone,
    EllipsoidSegmentGroup => EllipsoidSegment,
    GeneralCylinderGroup => GeneralCylinder,
    GeneralRingGroup => GeneralRing,
    NutGroup => Nut,
    QuadGroup => Quad,
    SphericalSegmentGroup => SphericalSegment,
    TorusSegmentGroup => TorusSegment,
    TrapeziumGroup => Trapezium,
}

/// Per-kind instance counts, indexed by [`RenderedKind::index`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderedCounts([usize; 12]);

impl RenderedCounts {
    #[inline]
    pub fn get(&self, kind: RenderedKind) -> usize {
        self.0[kind.index()]
    }

    #[inline]
    pub fn add(&mut self, kind: RenderedKind, count: usize) {
        self.0[kind.index()] += count;
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RenderedKind, usize)> + '_ {
        RenderedKind::ALL.iter().map(move |&k| (k, self.get(k)))
    }

    pub fn merge(&mut self, other: &RenderedCounts) {
        for (a, b) in self.0.iter_mut().zip(other.0) {
            *a += b;
        }
    }
}

/// All rendered primitive groups of one sector.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrimitiveGroups {
    pub boxes: BoxGroup,
    pub circles: CircleGroup,
    pub cones: ConeGroup,
    pub eccentric_cones: EccentricConeGroup,
    pub ellipsoid_segments: EllipsoidSegmentGroup,
    pub general_cylinders: GeneralCylinderGroup,
    pub general_rings: GeneralRingGroup,
    pub nuts: NutGroup,
    pub quads: QuadGroup,
    pub spherical_segments: SphericalSegmentGroup,
    pub torus_segments: TorusSegmentGroup,
    pub trapeziums: TrapeziumGroup,
}

impl PrimitiveGroups {
    /// Groups sized exactly to `counts`.
    pub fn with_counts(counts: &RenderedCounts) -> Self {
        use RenderedKind as K;
        Self {
            boxes: BoxGroup::with_capacity(counts.get(K::Box)),
            circles: CircleGroup::with_capacity(counts.get(K::Circle)),
            cones: ConeGroup::with_capacity(counts.get(K::Cone)),
            eccentric_cones: EccentricConeGroup::with_capacity(counts.get(K::EccentricCone)),
            ellipsoid_segments: EllipsoidSegmentGroup::with_capacity(counts.get(K::EllipsoidSegment)),
            general_cylinders: GeneralCylinderGroup::with_capacity(counts.get(K::GeneralCylinder)),
            general_rings: GeneralRingGroup::with_capacity(counts.get(K::GeneralRing)),
            nuts: NutGroup::with_capacity(counts.get(K::Nut)),
            quads: QuadGroup::with_capacity(counts.get(K::Quad)),
            spherical_segments: SphericalSegmentGroup::with_capacity(counts.get(K::SphericalSegment)),
            torus_segments: TorusSegmentGroup::with_capacity(counts.get(K::TorusSegment)),
            trapeziums: TrapeziumGroup::with_capacity(counts.get(K::Trapezium)),
        }
    }

    /// Groups in [`RenderedKind::ALL`] order.
    pub fn groups(&self) -> [&dyn PrimitiveGroup; 12] {
        [
            &self.boxes,
            &self.circles,
            &self.cones,
            &self.eccentric_cones,
            &self.ellipsoid_segments,
            &self.general_cylinders,
            &self.general_rings,
            &self.nuts,
            &self.quads,
            &self.spherical_segments,
            &self.torus_segments,
            &self.trapeziums,
        ]
    }

    pub fn group(&self, kind: RenderedKind) -> &dyn PrimitiveGroup {
        self.groups()[kind.index()]
    }

    /// Written instance counts per kind.
    pub fn counts(&self) -> RenderedCounts {
        let mut counts = RenderedCounts::default();
        for group in self.groups() {
            counts.add(group.kind(), group.count());
        }
        counts
    }

    pub fn total_count(&self) -> usize {
        self.groups().iter().map(|g| g.count()).sum()
    }

    /// True when every group was filled to its planned capacity.
    pub fn is_complete(&self) -> bool {
        self.groups().iter().all(|g| g.count() == g.capacity())
    }
}

/// View a column as raw bytes, for upload or hashing.
pub fn as_bytes<T: bytemuck::Pod>(values: &[T]) -> &[u8] {
    bytemuck::cast_slice(values)
}
