//! Expansion of decoded instances into rendered primitives.
//!
//! Every branch here must add exactly the primitives listed by
//! [`FileGeometryType::emissions`]; groups are sized from that table before
//! any instance is expanded.

use std::f32::consts::TAU;

use crate::geometry::*;
use crate::util::{angle_between, rotation_from_z, Plane, Quat, Vec3};

use super::resolver::ResolvedProperties;

/// Add the rendered primitives of one instance of `ty`.
///
/// Mesh types add nothing here; they are unpacked per block.
pub fn expand_primitive(ty: FileGeometryType, p: &ResolvedProperties, groups: &mut PrimitiveGroups) {
    use FileGeometryType as T;
    let base = PrimitiveBase::new(p.node_id, p.tree_index, p.color);
    match ty {
        T::Box => groups.boxes.add(BoxPrimitive {
            base,
            center: p.center,
            normal: p.normal,
            angle: p.rotation_angle,
            delta: p.delta,
        }),
        T::Circle => groups.circles.add(CirclePrimitive {
            base,
            center: p.center,
            normal: p.normal,
            radius: p.radius_a,
        }),
        T::OpenCone => add_cone(groups, base, p, p.radius_a, p.radius_b, false),
        T::ClosedCone => add_cone(groups, base, p, p.radius_a, p.radius_b, true),
        T::OpenCylinder => add_cone(groups, base, p, p.radius_a, p.radius_a, false),
        T::ClosedCylinder => add_cone(groups, base, p, p.radius_a, p.radius_a, true),
        T::OpenEccentricCone => add_eccentric_cone(groups, base, p, false),
        T::ClosedEccentricCone => add_eccentric_cone(groups, base, p, true),
        T::Ellipsoid => add_ellipsoid_segment(groups, base, p, 2.0 * p.radius_b, false),
        T::OpenEllipsoidSegment => add_ellipsoid_segment(groups, base, p, p.height, false),
        T::ClosedEllipsoidSegment => add_ellipsoid_segment(groups, base, p, p.height, true),
        T::Sphere => groups.spherical_segments.add(SphericalSegmentPrimitive {
            base,
            center: p.center,
            normal: Vec3::Z,
            radius: p.radius_a,
            height: 2.0 * p.radius_a,
        }),
        T::OpenSphericalSegment => add_spherical_segment(groups, base, p, false),
        T::ClosedSphericalSegment => add_spherical_segment(groups, base, p, true),
        T::Torus => add_torus_segment(groups, base, p, 0.0, TAU),
        T::OpenTorusSegment | T::ClosedTorusSegment => {
            add_torus_segment(groups, base, p, p.rotation_angle, p.arc_angle)
        }
        T::Nut => {
            let (a, b) = end_centers(p);
            groups.nuts.add(NutPrimitive {
                base,
                center_a: a,
                center_b: b,
                radius: p.radius_a,
                rotation_angle: p.rotation_angle,
            });
        }
        T::Ring => groups.general_rings.add(GeneralRingPrimitive {
            base,
            center: p.center,
            normal: p.normal,
            local_x_axis: rotation_from_z(p.normal) * Vec3::X,
            x_radius: p.radius_b,
            y_radius: p.radius_b,
            thickness: p.radius_b - p.radius_a,
            angle: 0.0,
            arc_angle: TAU,
        }),
        T::ExtrudedRing => add_extruded_ring(groups, base, p, 0.0, TAU, false),
        T::OpenExtrudedRingSegment => add_extruded_ring(groups, base, p, p.rotation_angle, p.arc_angle, false),
        T::ClosedExtrudedRingSegment => add_extruded_ring(groups, base, p, p.rotation_angle, p.arc_angle, true),
        T::OpenGeneralCylinder => {
            GeneralCylinderFrame::new(p).add_surface(groups, base, p, p.radius_a);
        }
        T::ClosedGeneralCylinder => {
            let frame = GeneralCylinderFrame::new(p);
            frame.add_surface(groups, base, p, p.radius_a);
            frame.add_caps(groups, base, p, p.radius_a);
        }
        T::SolidOpenGeneralCylinder => {
            let frame = GeneralCylinderFrame::new(p);
            frame.add_solid(groups, base, p);
        }
        T::SolidClosedGeneralCylinder => {
            let frame = GeneralCylinderFrame::new(p);
            let planes = frame.add_solid(groups, base, p);
            frame.add_trapeziums(groups, base, p, planes);
        }
        T::OpenGeneralCone => add_general_cone(groups, base, p, GeneralConeKind::Open),
        T::ClosedGeneralCone => add_general_cone(groups, base, p, GeneralConeKind::Closed),
        T::SolidOpenGeneralCone => add_general_cone(groups, base, p, GeneralConeKind::SolidOpen),
        T::SolidClosedGeneralCone => add_general_cone(groups, base, p, GeneralConeKind::SolidClosed),
        T::MergedMesh | T::InstancedMesh => {}
    }
}

/// End centers `center ± normal * height / 2`.
#[inline]
fn end_centers(p: &ResolvedProperties) -> (Vec3, Vec3) {
    let half = p.normal * (p.height / 2.0);
    (p.center + half, p.center - half)
}

/// Unit direction at angle `theta` in the plane perpendicular to the rotated Z axis.
#[inline]
fn radial(rotation: Quat, theta: f32) -> Vec3 {
    (rotation * Vec3::new(theta.cos(), theta.sin(), 0.0)).normalize_or_zero()
}

fn add_cone(groups: &mut PrimitiveGroups, base: PrimitiveBase, p: &ResolvedProperties, ra: f32, rb: f32, closed: bool) {
    let (a, b) = end_centers(p);
    groups.cones.add(ConePrimitive {
        base,
        center_a: a,
        center_b: b,
        radius_a: ra,
        radius_b: rb,
        angle: 0.0,
        arc_angle: TAU,
    });
    if closed {
        groups.circles.add(CirclePrimitive { base, center: a, normal: p.normal, radius: ra });
        groups.circles.add(CirclePrimitive { base, center: b, normal: p.normal, radius: rb });
    }
}

fn add_eccentric_cone(groups: &mut PrimitiveGroups, base: PrimitiveBase, p: &ResolvedProperties, closed: bool) {
    let (a, b) = end_centers(p);
    let cap_normal = if p.cap_normal.dot(a - b) < 0.0 { -p.cap_normal } else { p.cap_normal };
    groups.eccentric_cones.add(EccentricConePrimitive {
        base,
        center_a: a,
        center_b: b,
        radius_a: p.radius_a,
        radius_b: p.radius_b,
        normal: cap_normal,
    });
    if closed {
        groups.circles.add(CirclePrimitive { base, center: a, normal: cap_normal, radius: p.radius_a });
        groups.circles.add(CirclePrimitive { base, center: b, normal: cap_normal, radius: p.radius_b });
    }
}

fn add_ellipsoid_segment(
    groups: &mut PrimitiveGroups,
    base: PrimitiveBase,
    p: &ResolvedProperties,
    height: f32,
    closed: bool,
) {
    groups.ellipsoid_segments.add(EllipsoidSegmentPrimitive {
        base,
        center: p.center,
        normal: p.normal,
        h_radius: p.radius_a,
        v_radius: p.radius_b,
        height,
    });
    if closed {
        let length = p.radius_b - height;
        let radius = (p.radius_b * p.radius_b - length * length).sqrt() * p.radius_a / p.radius_b;
        groups.circles.add(CirclePrimitive {
            base,
            center: p.center + p.normal.normalize_or_zero() * length,
            normal: p.normal,
            radius,
        });
    }
}

fn add_spherical_segment(groups: &mut PrimitiveGroups, base: PrimitiveBase, p: &ResolvedProperties, closed: bool) {
    groups.spherical_segments.add(SphericalSegmentPrimitive {
        base,
        center: p.center,
        normal: p.normal,
        radius: p.radius_a,
        height: p.height,
    });
    if closed {
        let length = p.radius_a - p.height;
        groups.circles.add(CirclePrimitive {
            base,
            center: p.center + p.normal.normalize_or_zero() * length,
            normal: p.normal,
            radius: (p.radius_a * p.radius_a - length * length).sqrt(),
        });
    }
}

fn add_torus_segment(groups: &mut PrimitiveGroups, base: PrimitiveBase, p: &ResolvedProperties, angle: f32, arc: f32) {
    groups.torus_segments.add(TorusSegmentPrimitive {
        base,
        center: p.center,
        normal: p.normal,
        radius: p.radius_a,
        tube_radius: p.radius_b,
        angle,
        arc_angle: arc,
    });
}

fn add_extruded_ring(
    groups: &mut PrimitiveGroups,
    base: PrimitiveBase,
    p: &ResolvedProperties,
    angle: f32,
    arc: f32,
    closed: bool,
) {
    let (a, b) = end_centers(p);
    let local_x_axis = rotation_from_z(p.normal) * Vec3::X;
    for center in [a, b] {
        groups.general_rings.add(GeneralRingPrimitive {
            base,
            center,
            normal: p.normal,
            local_x_axis,
            x_radius: p.radius_b,
            y_radius: p.radius_b,
            thickness: p.radius_b - p.radius_a,
            angle,
            arc_angle: arc,
        });
    }
    for radius in [p.radius_a, p.radius_b] {
        groups.cones.add(ConePrimitive {
            base,
            center_a: a,
            center_b: b,
            radius_a: radius,
            radius_b: radius,
            angle,
            arc_angle: arc,
        });
    }
    if !closed {
        return;
    }

    let rotation = rotation_from_z(a - b);
    for (second, theta) in [(false, angle), (true, angle + arc)] {
        let v = radial(rotation, theta);
        let v1 = v * p.radius_b + a;
        let v2 = v * p.radius_a + b;
        let v3 = v * p.radius_b + b;
        // Winding flips between the two end faces.
        let (vertex1, vertex2) = if second { (v1, v2) } else { (v2, v1) };
        groups.quads.add(QuadPrimitive { base, vertex1, vertex2, vertex3: v3 });
    }
}

/// Shared geometry of the general cylinder variants.
struct GeneralCylinderFrame {
    a: Vec3,
    b: Vec3,
    ext_a: Vec3,
    ext_b: Vec3,
    height_a: f32,
    height_b: f32,
    rotation: Quat,
}

impl GeneralCylinderFrame {
    fn new(p: &ResolvedProperties) -> Self {
        let (a, b) = end_centers(p);
        let dist_a = p.radius_a * p.slope_a.tan();
        let dist_b = p.radius_a * p.slope_b.tan();
        Self {
            a,
            b,
            ext_a: a + p.normal * dist_a,
            ext_b: b - p.normal * dist_b,
            height_a: dist_b + p.height,
            height_b: dist_b,
            rotation: rotation_from_z(p.normal),
        }
    }

    fn add_surface(&self, groups: &mut PrimitiveGroups, base: PrimitiveBase, p: &ResolvedProperties, radius: f32) {
        groups.general_cylinders.add(GeneralCylinderPrimitive {
            base,
            center_a: self.ext_a,
            center_b: self.ext_b,
            radius,
            height_a: self.height_a,
            height_b: self.height_b,
            slope_a: p.slope_a,
            slope_b: p.slope_b,
            z_angle_a: p.z_angle_a,
            z_angle_b: p.z_angle_b,
            angle: p.rotation_angle,
            arc_angle: p.arc_angle,
        });
    }

    /// Point where the surface line at `direction * radius` crosses `plane`.
    fn slice(&self, plane: &Plane, direction: Vec3, radius: f32, normal: Vec3, fallback: Vec3) -> Vec3 {
        let start = direction * radius + self.ext_b - normal;
        let end = direction * radius + self.ext_a + normal;
        plane.intersect_line(start, end).unwrap_or(fallback)
    }

    /// Add the slanted cap at one end and return its slicing plane.
    fn add_cap(
        &self,
        groups: &mut PrimitiveGroups,
        base: PrimitiveBase,
        p: &ResolvedProperties,
        at_a: bool,
        thickness: f32,
    ) -> Plane {
        let (center, slope, z_angle) = if at_a {
            (self.a, p.slope_a, p.z_angle_a)
        } else {
            (self.b, p.slope_b, p.z_angle_b)
        };
        let tilt = self.rotation * Quat::from_rotation_z(z_angle) * Quat::from_rotation_y(slope);
        let plane_normal = tilt * Vec3::Z;
        let cap_x_axis = (tilt * Vec3::X).normalize_or_zero();
        let plane = Plane::from_normal_and_point(plane_normal, center);

        let hit = self.slice(&plane, radial(self.rotation, p.rotation_angle), p.radius_a, p.normal, center);
        let cap_angle = angle_between((hit - center).normalize_or_zero(), cap_x_axis, plane_normal);

        groups.general_rings.add(GeneralRingPrimitive {
            base,
            center,
            normal: plane_normal,
            local_x_axis: cap_x_axis,
            x_radius: p.radius_a / slope.cos().abs(),
            y_radius: p.radius_a,
            thickness,
            angle: cap_angle,
            arc_angle: p.arc_angle,
        });
        plane
    }

    /// Caps at A then B. Returns the planes as `(a, b)`.
    fn add_caps(
        &self,
        groups: &mut PrimitiveGroups,
        base: PrimitiveBase,
        p: &ResolvedProperties,
        thickness: f32,
    ) -> (Plane, Plane) {
        let plane_a = self.add_cap(groups, base, p, true, thickness);
        let plane_b = self.add_cap(groups, base, p, false, thickness);
        (plane_a, plane_b)
    }

    /// Outer surface, caps and inner surface of a hollow cylinder.
    fn add_solid(&self, groups: &mut PrimitiveGroups, base: PrimitiveBase, p: &ResolvedProperties) -> (Plane, Plane) {
        self.add_surface(groups, base, p, p.radius_a);
        let planes = self.add_caps(groups, base, p, p.thickness);
        self.add_surface(groups, base, p, p.radius_a - p.thickness);
        planes
    }

    /// End faces of a hollow cylinder slice.
    fn add_trapeziums(
        &self,
        groups: &mut PrimitiveGroups,
        base: PrimitiveBase,
        p: &ResolvedProperties,
        (plane_a, plane_b): (Plane, Plane),
    ) {
        let inner = p.radius_a - p.thickness;
        for second in [false, true] {
            let theta = if second { p.rotation_angle + p.arc_angle } else { p.rotation_angle };
            let radii = if second { [inner, p.radius_a] } else { [p.radius_a, inner] };
            let direction = radial(self.rotation, theta);
            let mut vertices = [Vec3::ZERO; 4];
            for (i, radius) in radii.into_iter().enumerate() {
                vertices[2 * i] = self.slice(&plane_b, direction, radius, p.normal, self.b);
                vertices[2 * i + 1] = self.slice(&plane_a, direction, radius, p.normal, self.a);
            }
            groups.trapeziums.add(TrapeziumPrimitive {
                base,
                vertex1: vertices[0],
                vertex2: vertices[1],
                vertex3: vertices[2],
                vertex4: vertices[3],
            });
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum GeneralConeKind {
    Open,
    Closed,
    SolidOpen,
    SolidClosed,
}

fn add_general_cone(groups: &mut PrimitiveGroups, base: PrimitiveBase, p: &ResolvedProperties, kind: GeneralConeKind) {
    let (a, b) = end_centers(p);
    groups.cones.add(ConePrimitive {
        base,
        center_a: a,
        center_b: b,
        radius_a: p.radius_a,
        radius_b: p.radius_b,
        angle: p.rotation_angle,
        arc_angle: p.arc_angle,
    });
    if kind == GeneralConeKind::Open {
        return;
    }

    let solid = matches!(kind, GeneralConeKind::SolidOpen | GeneralConeKind::SolidClosed);
    let local_x_axis = rotation_from_z(p.normal) * Vec3::X;
    for (center, radius) in [(a, p.radius_a), (b, p.radius_b)] {
        groups.general_rings.add(GeneralRingPrimitive {
            base,
            center,
            normal: p.normal,
            local_x_axis,
            x_radius: radius,
            y_radius: radius,
            thickness: if solid { p.thickness } else { radius },
            angle: p.rotation_angle,
            arc_angle: p.arc_angle,
        });
    }
    if !solid {
        return;
    }

    groups.cones.add(ConePrimitive {
        base,
        center_a: a,
        center_b: b,
        radius_a: p.radius_a - p.thickness,
        radius_b: p.radius_b - p.thickness,
        angle: p.rotation_angle,
        arc_angle: p.arc_angle,
    });
    if kind != GeneralConeKind::SolidClosed {
        return;
    }

    let rotation = rotation_from_z(a - b);
    for second in [false, true] {
        let theta = if second { p.rotation_angle + p.arc_angle } else { p.rotation_angle };
        let v = radial(rotation, theta);
        let ends = if second { [(p.radius_b, b), (p.radius_a, a)] } else { [(p.radius_a, a), (p.radius_b, b)] };
        let mut vertices = [Vec3::ZERO; 4];
        let mut i = 0;
        for (radius, center) in ends {
            for offset in [0.0, -p.thickness] {
                vertices[i] = v * (radius + offset) + center;
                i += 1;
            }
        }
        groups.trapeziums.add(TrapeziumPrimitive {
            base,
            vertex1: vertices[0],
            vertex2: vertices[1],
            vertex3: vertices[2],
            vertex4: vertices[3],
        });
    }
}
