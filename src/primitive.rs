//! Geometry primitives (spec §4.1): sphere, axis-aligned box, an
//! inward-facing bounding-box variant, an oriented three-corner rectangle,
//! and a triangle soup with interpolated vertex normals.
//!
//! Every primitive implements [`Primitive`], returning a [`Hit`] with
//! parametric distances strictly greater than [`EPSILON`] to be accepted
//! (spec §3, §8).

use crate::error::RenderError;
use crate::math::{Point3, Ray, Vec3};
use rand::RngCore;

pub const EPSILON: f64 = 1e-6;

/// Intersection result, up to two ordered parametric distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    Miss,
    Single(f64),
    /// `near <= far`; either may be non-positive, the caller discards
    /// candidates that don't clear [`EPSILON`].
    Double(f64, f64),
}

impl Hit {
    /// The smallest candidate strictly greater than `eps`, if any.
    pub fn closest_beyond(self, eps: f64) -> Option<f64> {
        match self {
            Hit::Miss => None,
            Hit::Single(t) => (t > eps).then_some(t),
            Hit::Double(near, far) => {
                if near > eps {
                    Some(near)
                } else if far > eps {
                    Some(far)
                } else {
                    None
                }
            }
        }
    }
}

pub trait Primitive: Send + Sync {
    fn intersect(&self, ray: &Ray) -> Hit;

    /// The outward-facing geometric normal at `point`, which must lie on
    /// the primitive's surface.
    fn normal_at(&self, point: Point3) -> Vec3;

    /// A uniformly distributed point on the primitive's surface.
    fn sample_surface(&self, rng: &mut dyn RngCore) -> Point3;

    fn area(&self) -> f64;
}

// ─── Sphere ─────────────────────────────────────────────────────────────────

pub struct Sphere {
    pub center: Point3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Point3, radius: f64) -> Result<Self, RenderError> {
        if radius.abs() < EPSILON {
            return Err(RenderError::Geometry("sphere has zero radius".into()));
        }
        Ok(Self {
            center,
            radius: radius.abs(),
        })
    }
}

impl Primitive for Sphere {
    /// `b = -d.(o-c)`, `disc = b^2 - |d|^2 (|o-c|^2 - r^2)` (spec §4.1).
    fn intersect(&self, ray: &Ray) -> Hit {
        let oc = ray.origin - self.center;
        let d = ray.direction;
        let a = d.length_squared();
        let b = -d.dot(oc);
        let disc = b * b - a * (oc.length_squared() - self.radius * self.radius);

        if disc < 0.0 {
            return Hit::Miss;
        }
        if disc == 0.0 {
            return Hit::Single(b / a);
        }
        let sqrt_disc = disc.sqrt();
        let t_near = (b - sqrt_disc) / a;
        let t_far = (b + sqrt_disc) / a;
        Hit::Double(t_near, t_far)
    }

    fn normal_at(&self, point: Point3) -> Vec3 {
        (point - self.center) / self.radius
    }

    fn sample_surface(&self, rng: &mut dyn RngCore) -> Point3 {
        self.center + Vec3::random_unit_vector(rng) * self.radius
    }

    fn area(&self) -> f64 {
        4.0 * std::f64::consts::PI * self.radius * self.radius
    }
}

// ─── Axis-aligned box ───────────────────────────────────────────────────────

/// An axis-aligned box. `inward` selects whether [`normal_at`] reports the
/// outward face normal (ordinary box, the default) or its negation (used by
/// [`BoundingBox`] to model a room enclosure seen from inside).
///
/// [`normal_at`]: Primitive::normal_at
pub struct AxisAlignedBox {
    pub min: Point3,
    pub max: Point3,
    inward: bool,
}

impl AxisAlignedBox {
    pub fn new(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Result<Self, RenderError> {
        Self::with_orientation(x, y, z, false)
    }

    fn with_orientation(
        x: (f64, f64),
        y: (f64, f64),
        z: (f64, f64),
        inward: bool,
    ) -> Result<Self, RenderError> {
        let min = Point3::new(x.0.min(x.1), y.0.min(y.1), z.0.min(z.1));
        let max = Point3::new(x.0.max(x.1), y.0.max(y.1), z.0.max(z.1));
        if (max.x - min.x).abs() < EPSILON
            || (max.y - min.y).abs() < EPSILON
            || (max.z - min.z).abs() < EPSILON
        {
            return Err(RenderError::Geometry(
                "box has a zero-length edge along some axis".into(),
            ));
        }
        Ok(Self { min, max, inward })
    }

    fn slab_hit(&self, ray: &Ray) -> Hit {
        let mut t_enter = f64::NEG_INFINITY;
        let mut t_exit = f64::INFINITY;
        for axis in 0..3 {
            let inv_d = 1.0 / ray.direction[axis];
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv_d;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv_d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
        }
        if t_enter > t_exit || t_exit < EPSILON {
            Hit::Miss
        } else {
            Hit::Double(t_enter, t_exit)
        }
    }

    fn outward_normal_at(&self, point: Point3) -> Vec3 {
        let candidates = [
            (Vec3::new(-1.0, 0.0, 0.0), (point.x - self.min.x).abs()),
            (Vec3::new(1.0, 0.0, 0.0), (point.x - self.max.x).abs()),
            (Vec3::new(0.0, -1.0, 0.0), (point.y - self.min.y).abs()),
            (Vec3::new(0.0, 1.0, 0.0), (point.y - self.max.y).abs()),
            (Vec3::new(0.0, 0.0, -1.0), (point.z - self.min.z).abs()),
            (Vec3::new(0.0, 0.0, 1.0), (point.z - self.max.z).abs()),
        ];
        candidates
            .into_iter()
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .map(|(n, _)| n)
            .unwrap()
    }
}

impl Primitive for AxisAlignedBox {
    fn intersect(&self, ray: &Ray) -> Hit {
        self.slab_hit(ray)
    }

    fn normal_at(&self, point: Point3) -> Vec3 {
        let n = self.outward_normal_at(point);
        if self.inward {
            -n
        } else {
            n
        }
    }

    fn sample_surface(&self, rng: &mut dyn RngCore) -> Point3 {
        use rand::Rng;
        // Pick one of the six faces weighted by area, then a uniform point on it.
        let size = self.max - self.min;
        let areas = [size.y * size.z, size.x * size.z, size.x * size.y];
        let total: f64 = areas.iter().sum::<f64>() * 2.0;
        let mut r = rng.gen_range(0.0..total);
        let u: f64 = rng.gen_range(0.0..1.0);
        let v: f64 = rng.gen_range(0.0..1.0);
        for (axis, &a) in areas.iter().enumerate() {
            for &lo in &[true, false] {
                if r < a {
                    return self.point_on_face(axis, lo, u, v);
                }
                r -= a;
            }
        }
        self.point_on_face(2, false, u, v)
    }

    fn area(&self) -> f64 {
        let size = self.max - self.min;
        2.0 * (size.x * size.y + size.y * size.z + size.x * size.z)
    }
}

impl AxisAlignedBox {
    fn point_on_face(&self, fixed_axis: usize, at_min: bool, u: f64, v: f64) -> Point3 {
        let mut p = [0.0; 3];
        let (a0, a1) = match fixed_axis {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        p[fixed_axis] = if at_min {
            self.min[fixed_axis]
        } else {
            self.max[fixed_axis]
        };
        p[a0] = self.min[a0] + u * (self.max[a0] - self.min[a0]);
        p[a1] = self.min[a1] + v * (self.max[a1] - self.min[a1]);
        Point3::new(p[0], p[1], p[2])
    }
}

/// A room enclosure: identical geometry to [`AxisAlignedBox`] but with
/// inward-facing normals (spec §4.1), built by composition rather than
/// inheritance — the teacher's OOP original (`BoundingBoxMesh : BoxMesh`,
/// overriding only `getNormal`) becomes a thin wrapper that flips the sign.
pub struct BoundingBox(AxisAlignedBox);

impl BoundingBox {
    pub fn new(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Result<Self, RenderError> {
        Ok(Self(AxisAlignedBox::with_orientation(x, y, z, true)?))
    }
}

impl Primitive for BoundingBox {
    fn intersect(&self, ray: &Ray) -> Hit {
        self.0.intersect(ray)
    }
    fn normal_at(&self, point: Point3) -> Vec3 {
        self.0.normal_at(point)
    }
    fn sample_surface(&self, rng: &mut dyn RngCore) -> Point3 {
        self.0.sample_surface(rng)
    }
    fn area(&self) -> f64 {
        self.0.area()
    }
}

// ─── Oriented rectangle (three-corner quad) ────────────────────────────────

/// A planar rectangle defined by three corners: `upper_left`, `lower_left`,
/// `lower_right`. `e1 = lower_right - lower_left` and `e2 = upper_left -
/// lower_left` are the two orthogonal edges; `normal = normalize(e1 x e2)`.
pub struct OrientedRectangle {
    p0: Point3,
    e1: Vec3,
    e2: Vec3,
    normal: Vec3,
    area: f64,
}

impl OrientedRectangle {
    pub fn new(
        upper_left: Point3,
        lower_left: Point3,
        lower_right: Point3,
    ) -> Result<Self, RenderError> {
        let e1 = lower_right - lower_left;
        let e2 = upper_left - lower_left;
        if e1.length() < EPSILON || e2.length() < EPSILON {
            return Err(RenderError::Geometry(
                "rectangle has a zero-length edge".into(),
            ));
        }
        if e1.dot(e2).abs() > 1e-4 * e1.length() * e2.length() {
            return Err(RenderError::Geometry(
                "rectangle corners are not orthogonal (colinear or skewed)".into(),
            ));
        }
        let cross = e1.cross(e2);
        if cross.length() < EPSILON {
            return Err(RenderError::Geometry(
                "rectangle corners are colinear (zero area)".into(),
            ));
        }
        Ok(Self {
            p0: lower_left,
            e1,
            e2,
            normal: cross.normalized(),
            area: e1.length() * e2.length(),
        })
    }
}

impl Primitive for OrientedRectangle {
    fn intersect(&self, ray: &Ray) -> Hit {
        let denom = ray.direction.dot(self.normal);
        if denom.abs() < EPSILON {
            return Hit::Miss;
        }
        let t = (self.p0 - ray.origin).dot(self.normal) / denom;
        if t <= EPSILON {
            return Hit::Miss;
        }
        let hit = ray.at(t);
        let rel = hit - self.p0;
        let u = rel.dot(self.e1);
        let v = rel.dot(self.e2);
        if u < 0.0 || u > self.e1.length_squared() || v < 0.0 || v > self.e2.length_squared() {
            return Hit::Miss;
        }
        Hit::Single(t)
    }

    fn normal_at(&self, _point: Point3) -> Vec3 {
        self.normal
    }

    fn sample_surface(&self, rng: &mut dyn RngCore) -> Point3 {
        use rand::Rng;
        let u: f64 = rng.gen_range(0.0..1.0);
        let v: f64 = rng.gen_range(0.0..1.0);
        self.p0 + self.e1 * u + self.e2 * v
    }

    fn area(&self) -> f64 {
        self.area
    }
}

// ─── Triangle soup ──────────────────────────────────────────────────────────

struct Triangle {
    v0: Point3,
    v1: Point3,
    v2: Point3,
    n0: Vec3,
    n1: Vec3,
    n2: Vec3,
}

impl Triangle {
    fn hit_distance(&self, ray: &Ray) -> Option<(f64, f64, f64)> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < EPSILON {
            return None;
        }
        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = f * edge2.dot(q);
        if t <= EPSILON {
            return None;
        }
        Some((t, u, v))
    }

    fn interpolated_normal(&self, u: f64, v: f64) -> Vec3 {
        let w = 1.0 - u - v;
        (self.n0 * w + self.n1 * u + self.n2 * v).normalized()
    }
}

/// A triangle soup consuming the external mesh-parser contract (spec §6):
/// flat vertex/normal buffers plus a triangle index list. Closest-hit is a
/// linear scan over all triangles, retaining the minimum positive `t` — an
/// acceleration structure is permitted by spec but not required, and is
/// intentionally not built here (see DESIGN.md).
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    area: f64,
}

impl TriangleMesh {
    /// `vertices`/`normals` are flat `xyz...` buffers; `indices` references
    /// them triangle-by-triangle (0-based, CCW from outside).
    pub fn from_buffers(
        vertices: &[f64],
        normals: &[f64],
        indices: &[u32],
    ) -> Result<Self, RenderError> {
        if vertices.len() % 3 != 0 || normals.len() != vertices.len() {
            return Err(RenderError::Geometry(
                "mesh vertex/normal buffers must be flat xyz triples of equal length".into(),
            ));
        }
        if indices.len() % 3 != 0 {
            return Err(RenderError::Geometry(
                "mesh index buffer length must be a multiple of 3".into(),
            ));
        }
        let get_v = |i: u32| -> Point3 {
            let base = 3 * i as usize;
            Point3::new(vertices[base], vertices[base + 1], vertices[base + 2])
        };
        let get_n = |i: u32| -> Vec3 {
            let base = 3 * i as usize;
            Vec3::new(normals[base], normals[base + 1], normals[base + 2])
        };

        let mut triangles = Vec::with_capacity(indices.len() / 3);
        let mut area = 0.0;
        for tri in indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0], tri[1], tri[2]);
            let (v0, v1, v2) = (get_v(i0), get_v(i1), get_v(i2));
            let edge_area = (v1 - v0).cross(v2 - v0).length();
            if edge_area < EPSILON {
                return Err(RenderError::Geometry(
                    "mesh contains a degenerate (zero-area) triangle".into(),
                ));
            }
            area += 0.5 * edge_area;
            triangles.push(Triangle {
                v0,
                v1,
                v2,
                n0: get_n(i0),
                n1: get_n(i1),
                n2: get_n(i2),
            });
        }
        if triangles.is_empty() {
            return Err(RenderError::Geometry("mesh has no triangles".into()));
        }
        Ok(Self { triangles, area })
    }
}

impl Primitive for TriangleMesh {
    fn intersect(&self, ray: &Ray) -> Hit {
        let mut best: Option<f64> = None;
        for tri in &self.triangles {
            if let Some((t, _, _)) = tri.hit_distance(ray) {
                if best.map_or(true, |b| t < b) {
                    best = Some(t);
                }
            }
        }
        match best {
            Some(t) => Hit::Single(t),
            None => Hit::Miss,
        }
    }

    fn normal_at(&self, point: Point3) -> Vec3 {
        // Re-derive the owning triangle and barycentric weights from the
        // point; a mesh has no single ray context at this call site, so we
        // fall back to a nearest-triangle search. Correctness here matters
        // only for points actually produced by `intersect`.
        let mut best: Option<(f64, &Triangle, f64, f64)> = None;
        for tri in &self.triangles {
            let edge1 = tri.v1 - tri.v0;
            let edge2 = tri.v2 - tri.v0;
            let n = edge1.cross(edge2);
            let denom = n.length_squared();
            if denom < EPSILON {
                continue;
            }
            let rel = point - tri.v0;
            let dist = rel.dot(n.normalized()).abs();
            let u = edge2.cross(rel).dot(n) / denom;
            let v = rel.cross(edge1).dot(n) / denom;
            let w = 1.0 - u - v;
            let inside = u >= -1e-3 && v >= -1e-3 && w >= -1e-3;
            if inside && best.map_or(true, |(bd, ..)| dist < bd) {
                best = Some((dist, tri, u, v));
            }
        }
        match best {
            Some((_, tri, u, v)) => tri.interpolated_normal(u, v),
            None => Vec3::unit_z(),
        }
    }

    fn sample_surface(&self, rng: &mut dyn RngCore) -> Point3 {
        use rand::Rng;
        let target = rng.gen_range(0.0..self.area);
        let mut acc = 0.0;
        for tri in &self.triangles {
            let a = 0.5 * (tri.v1 - tri.v0).cross(tri.v2 - tri.v0).length();
            acc += a;
            if acc >= target {
                let mut u: f64 = rng.gen();
                let mut v: f64 = rng.gen();
                if u + v > 1.0 {
                    u = 1.0 - u;
                    v = 1.0 - v;
                }
                return tri.v0 + (tri.v1 - tri.v0) * u + (tri.v2 - tri.v0) * v;
            }
        }
        let last = self.triangles.last().unwrap();
        last.v0
    }

    fn area(&self) -> f64 {
        self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_hit_distances_exceed_epsilon_and_are_ordered() {
        let s = Sphere::new(Point3::zero(), 1.0).unwrap();
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::unit_z());
        match s.intersect(&ray) {
            Hit::Double(near, far) => {
                assert!(near > EPSILON);
                assert!(near <= far);
            }
            other => panic!("expected DoubleHit, got {other:?}"),
        }
    }

    #[test]
    fn sphere_near_root_lands_on_surface() {
        let c = Point3::new(2.0, 0.0, 0.0);
        let r = 1.5;
        let s = Sphere::new(c, r).unwrap();
        let ray = Ray::new(Point3::zero(), (c - Point3::zero()).normalized());
        let t = s.intersect(&ray).closest_beyond(EPSILON).unwrap();
        let p = ray.at(t);
        assert!(((p - c).length() - r).abs() < 1e-4);
    }

    #[test]
    fn sphere_ray_starting_inside_hits_far_root() {
        let s = Sphere::new(Point3::zero(), 2.0).unwrap();
        let ray = Ray::new(Point3::zero(), Vec3::unit_x());
        let t = s.intersect(&ray).closest_beyond(EPSILON).unwrap();
        assert!((t - 2.0).abs() < 1e-9);
    }

    #[test]
    fn box_slab_hit_and_normal() {
        let b = AxisAlignedBox::new((-1.0, 1.0), (-1.0, 1.0), (-1.0, 1.0)).unwrap();
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::unit_z());
        let t = b.intersect(&ray).closest_beyond(EPSILON).unwrap();
        let p = ray.at(t);
        let n = b.normal_at(p);
        assert!((n - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn bounding_box_normal_is_flipped() {
        let outward = AxisAlignedBox::new((-1.0, 1.0), (-1.0, 1.0), (-1.0, 1.0)).unwrap();
        let inward = BoundingBox::new((-1.0, 1.0), (-1.0, 1.0), (-1.0, 1.0)).unwrap();
        let p = Point3::new(1.0, 0.0, 0.0);
        assert_eq!(outward.normal_at(p), -inward.normal_at(p));
    }

    #[test]
    fn rectangle_area_and_sample_bounds() {
        let rect = OrientedRectangle::new(
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        )
        .unwrap();
        assert!((rect.area() - 1.0).abs() < 1e-9);
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let p = rect.sample_surface(&mut rng);
            assert!(p.x >= -1e-9 && p.x <= 1.0 + 1e-9);
            assert!(p.y >= -1e-9 && p.y <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn degenerate_rectangle_is_rejected() {
        let result = OrientedRectangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn triangle_mesh_single_triangle_hit() {
        let verts = vec![
            -1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0,
        ];
        let normals = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let indices = vec![0, 1, 2];
        let mesh = TriangleMesh::from_buffers(&verts, &normals, &indices).unwrap();
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::unit_z());
        let t = mesh.intersect(&ray).closest_beyond(EPSILON).unwrap();
        assert!((t - 5.0).abs() < 1e-6);
    }
}
