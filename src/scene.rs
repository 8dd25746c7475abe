//! The scene graph (spec §3, §4.3): a flat object list plus finalization
//! into a cached, query-bearing [`Scene`].
//!
//! Finalization is a type-level transition rather than a runtime flag:
//! [`SceneBuilder`] accumulates objects, and [`SceneBuilder::finalize`]
//! consumes it to produce a [`Scene`]. No code path can query an
//! unfinalized scene, which is why [`RenderError::SceneFinalization`] is
//! unreachable in this crate (see DESIGN.md).
//!
//! [`RenderError::SceneFinalization`]: crate::error::RenderError::SceneFinalization

use crate::error::RenderError;
use crate::math::{Color, Point3, Ray, Vec3};
use crate::object::{SceneObject, Surface};
use rand::RngCore;

/// An accumulating, mutable scene under construction.
#[derive(Default)]
pub struct SceneBuilder {
    objects: Vec<SceneObject>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, object: SceneObject) -> Self {
        self.objects.push(object);
        self
    }

    /// Consumes the builder, caching the light list for `cast_shadow_rays`.
    pub fn finalize(self) -> Result<Scene, RenderError> {
        if self.objects.is_empty() {
            return Err(RenderError::Geometry("scene has no objects".into()));
        }
        let lights: Vec<usize> = self
            .objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_emissive())
            .map(|(i, _)| i)
            .collect();
        Ok(Scene {
            objects: self.objects,
            lights,
        })
    }
}

/// A closest-hit result: the object index, hit distance, world-space hit
/// point, and shading normal. `normal` is the primitive's raw `normal_at`
/// flipped to front-face (always opposing the incoming ray); `front_face`
/// records whether that flip happened, letting `kernel.rs` distinguish a
/// transparent object's entry face from its exit face without re-deriving
/// the dot product from a now-already-oriented normal.
pub struct Intersection {
    pub object_index: usize,
    pub t: f64,
    pub point: Point3,
    pub normal: Vec3,
    pub front_face: bool,
}

/// A finalized, immutable scene. Ties in `intersect` are broken by
/// insertion order: the scan keeps the first-inserted object among equal
/// closest distances, since later candidates only replace the current best
/// on a strictly smaller `t`.
pub struct Scene {
    objects: Vec<SceneObject>,
    lights: Vec<usize>,
}

impl Scene {
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, index: usize) -> &SceneObject {
        &self.objects[index]
    }

    /// Closest-hit query across every object, linear scan, ties broken by
    /// insertion order (spec §4.3). The returned normal is flipped to
    /// front-face (opposing the ray) uniformly for every primitive — the
    /// resolution of the sphere's "entering from inside, flip the normal"
    /// clause, generalized rather than special-cased (see DESIGN.md).
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let mut best: Option<Intersection> = None;
        for (index, object) in self.objects.iter().enumerate() {
            let Some(t) = object
                .primitive
                .intersect(ray)
                .closest_beyond(crate::primitive::EPSILON)
            else {
                continue;
            };
            if best.as_ref().map_or(true, |b| t < b.t) {
                let point = ray.at(t);
                let raw_normal = object.primitive.normal_at(point);
                let front_face = ray.direction.dot(raw_normal) < 0.0;
                let normal = if front_face { raw_normal } else { -raw_normal };
                best = Some(Intersection {
                    object_index: index,
                    t,
                    point,
                    normal,
                    front_face,
                });
            }
        }
        best
    }

    /// Direct-illumination estimate at `point`/`normal` via `n` shadow rays
    /// uniformly distributed over the union of emissive surfaces, each
    /// tested for occlusion and weighted by the light's BRDF response in
    /// the "subtract the normal's spherical angles" local frame the kernel
    /// also uses (spec §4.3, grounded in `original_source/src/main.cpp`'s
    /// `castShadowRays`). `incoming_angles` is the primary ray's own local
    /// incoming direction, computed once by the caller and passed through
    /// unchanged — this is *not* the same angle pair as `outgoing_local`
    /// (the per-sample direction to the light), which a shadow ray's BRDF
    /// evaluation must not substitute it with.
    pub fn cast_shadow_rays(
        &self,
        point: Point3,
        incoming_angles: (f64, f64),
        normal: Vec3,
        surface_brdf: Option<(&dyn crate::brdf::Brdf, Color)>,
        n: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        if self.lights.is_empty() || n == 0 {
            return Color::zero();
        }
        let Some((brdf, albedo)) = surface_brdf else {
            return Color::zero();
        };

        let total_area: f64 = self
            .lights
            .iter()
            .map(|&i| self.objects[i].primitive.area())
            .sum();
        if total_area <= 0.0 {
            return Color::zero();
        }

        let normal_angles = normal.to_spherical();
        let mut accum = Color::zero();
        for _ in 0..n {
            let light_index = self.pick_light(rng, total_area);
            let light = &self.objects[light_index];
            let sample = light.primitive.sample_surface(rng);
            let to_light = sample - point;
            let distance = to_light.length();
            if distance < crate::primitive::EPSILON {
                continue;
            }
            let direction = to_light / distance;
            if direction.dot(normal) <= 0.0 {
                continue;
            }
            let shadow_ray = Ray::new(point + normal * 1e-4, direction);
            if let Some(hit) = self.intersect(&shadow_ray) {
                if hit.t < distance - 1e-3 {
                    continue;
                }
            }

            let light_normal = light.primitive.normal_at(sample);
            let cos_at_light = (-direction).dot(light_normal).max(0.0);
            if cos_at_light <= 0.0 {
                continue;
            }

            let light_angles = direction.to_spherical();
            let outgoing_local = (
                light_angles.0 - normal_angles.0,
                light_angles.1 - normal_angles.1,
            );
            let f = brdf.eval(incoming_angles, outgoing_local, brdf.rho());

            let solid_angle_factor = cos_at_light * total_area / (distance * distance);
            let emission = self.objects[light_index].emission.unwrap_or(Color::zero());
            let cos_surface = direction.dot(normal).max(0.0);
            accum += emission.hadamard(albedo) * (f * cos_surface * solid_angle_factor);
        }
        accum / n as f64
    }

    fn pick_light(&self, rng: &mut dyn RngCore, total_area: f64) -> usize {
        use rand::Rng;
        let mut r = rng.gen_range(0.0..total_area);
        for &i in &self.lights {
            let a = self.objects[i].primitive.area();
            if r < a {
                return i;
            }
            r -= a;
        }
        *self.lights.last().unwrap()
    }

    pub fn surface_at(&self, index: usize) -> &Surface {
        &self.objects[index].surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brdf::Lambertian;
    use crate::primitive::Sphere;

    fn sphere_at(x: f64, r: f64) -> Box<dyn crate::primitive::Primitive> {
        Box::new(Sphere::new(Point3::new(x, 0.0, 0.0), r).unwrap())
    }

    #[test]
    fn closest_hit_breaks_ties_by_insertion_order() {
        let s1 =
            SceneObject::opaque(sphere_at(5.0, 1.0), Box::new(Lambertian::new(1.0)), Color::ones())
                .unwrap();
        let s2 =
            SceneObject::opaque(sphere_at(5.0, 1.0), Box::new(Lambertian::new(1.0)), Color::ones())
                .unwrap();
        let scene = SceneBuilder::new().add(s1).add(s2).finalize().unwrap();
        let ray = Ray::new(Point3::zero(), Vec3::unit_x());
        let hit = scene.intersect(&ray).unwrap();
        assert_eq!(hit.object_index, 0);
    }

    #[test]
    fn intersect_flips_normal_to_front_face_on_exit() {
        let s1 = SceneObject::opaque(sphere_at(0.0, 2.0), Box::new(Lambertian::new(1.0)), Color::ones())
            .unwrap();
        let scene = SceneBuilder::new().add(s1).finalize().unwrap();
        // A ray starting inside the sphere hits the far wall from the inside;
        // the raw outward normal there faces away from the ray, so the
        // front-face flip must negate it back toward the ray origin.
        let ray = Ray::new(Point3::zero(), Vec3::unit_x());
        let hit = scene.intersect(&ray).unwrap();
        assert!(!hit.front_face);
        assert!(ray.direction.dot(hit.normal) < 0.0);
    }

    #[test]
    fn finalize_rejects_empty_scene() {
        let result = SceneBuilder::new().finalize();
        assert!(result.is_err());
    }

    #[test]
    fn shadow_rays_return_zero_with_no_lights() {
        let s1 =
            SceneObject::opaque(sphere_at(5.0, 1.0), Box::new(Lambertian::new(1.0)), Color::ones())
                .unwrap();
        let scene = SceneBuilder::new().add(s1).finalize().unwrap();
        let mut rng = rand::thread_rng();
        let lambertian = Lambertian::new(1.0);
        let color = scene.cast_shadow_rays(
            Point3::zero(),
            (0.0, 0.0),
            Vec3::unit_z(),
            Some((&lambertian, Color::ones())),
            8,
            &mut rng,
        );
        assert_eq!(color, Color::zero());
    }
}
