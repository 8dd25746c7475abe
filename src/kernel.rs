//! The path-tracing kernel (spec §4.5, §9): an explicit recursive `trace`
//! function — not a self-capturing closure, per the Design Notes — that
//! builds an owned [`PathNode`] tree and folds it into a final radiance
//! value as it unwinds.
//!
//! Constants `0.5` and `10.0` in [`Kernel::build_opaque`] and the
//! importance cutoff `1e-3` are reproduced exactly from
//! `original_source/src/main.cpp`; spec §9 calls these out as fixed rather
//! than tunable. Russian roulette draws an **independent** uniform value
//! against `p_surv`, fixing the original's reuse of the BRDF angle sample
//! for the same test (documented Open Question resolution, see
//! DESIGN.md), but the root node of every primary ray is always exempt
//! from termination (`original_source/src/main.cpp`'s `node == root`
//! clause) regardless of that draw.

use crate::math::{Color, Point3, Ray, Vec3};
use crate::object::Surface;
use crate::path_tree::{ObjectIndex, PathNode};
use crate::scene::Scene;
use rand::{Rng, RngCore};
use std::f64::consts::PI;

/// Below this importance, a branch is not traced further and contributes
/// zero radiance (spec §4.5, §8).
pub const IMPORTANCE_CUTOFF: f64 = 1e-3;

const REFLECTED_WEIGHT: f64 = 0.5;
const SHADOW_WEIGHT: f64 = 10.0;

/// Refractive index of the ambient medium outside any transparent object.
const VACUUM_IOR: f64 = 1.0;

pub struct Kernel<'a> {
    pub scene: &'a Scene,
    pub p_surv: f64,
    pub shadow_rays: u32,
}

impl<'a> Kernel<'a> {
    pub fn new(scene: &'a Scene, p_surv: f64, shadow_rays: u32) -> Self {
        Self {
            scene,
            p_surv,
            shadow_rays,
        }
    }

    /// Traces one primary ray to completion, returning its estimated
    /// radiance. Builds the full path tree as a side effect of recursion;
    /// the tree itself is dropped at the end of this call (owned by the
    /// local root) since only the resulting [`Color`] escapes.
    pub fn trace_primary(&self, ray: Ray, rng: &mut dyn RngCore) -> Color {
        match self.build(ray, 1.0, VACUUM_IOR, None, true, rng) {
            Some(node) => node.radiance,
            None => Color::zero(),
        }
    }

    /// Builds one node of the path tree for `ray` at the given `importance`
    /// and current medium `current_ior`. `entry_object` identifies the
    /// transparent object the ray is currently travelling inside of, if
    /// any (used to detect the exiting-into-vacuum case). `is_root` marks
    /// the primary ray's first hit, which Russian roulette in
    /// `build_opaque` must never terminate (spec §4.5).
    #[allow(clippy::too_many_arguments)]
    fn build(
        &self,
        ray: Ray,
        importance: f64,
        current_ior: f64,
        entry_object: Option<ObjectIndex>,
        is_root: bool,
        rng: &mut dyn RngCore,
    ) -> Option<Box<PathNode>> {
        let hit = self.scene.intersect(&ray)?;
        let object = self.scene.object(hit.object_index);

        if let Some(emission) = object.emission {
            return Some(Box::new(PathNode::leaf(
                hit.point,
                hit.normal,
                ObjectIndex(hit.object_index),
                importance,
                emission,
            )));
        }

        match self.scene.surface_at(hit.object_index) {
            Surface::Transparent { transmittance, ior } => Some(Box::new(self.build_transparent(
                ray,
                hit.point,
                hit.normal,
                hit.front_face,
                ObjectIndex(hit.object_index),
                importance,
                current_ior,
                entry_object,
                *transmittance,
                *ior,
                rng,
            ))),
            Surface::Opaque { brdf, color } => Some(Box::new(self.build_opaque(
                ray.direction,
                hit.point,
                hit.normal,
                ObjectIndex(hit.object_index),
                importance,
                is_root,
                brdf.as_ref(),
                *color,
                rng,
            ))),
        }
    }

    /// `normal` is already oriented front-face by [`Scene::intersect`]
    /// (always opposing `ray.direction`), so unlike the original C++ this
    /// needs no extra negation on the exit branches — only which medium
    /// indices apply changes with `entering`.
    #[allow(clippy::too_many_arguments)]
    fn build_transparent(
        &self,
        ray: Ray,
        point: Point3,
        normal: Vec3,
        entering: bool,
        object: ObjectIndex,
        importance: f64,
        current_ior: f64,
        entry_object: Option<ObjectIndex>,
        transmittance: f64,
        object_ior: f64,
        rng: &mut dyn RngCore,
    ) -> PathNode {
        // Mirrors `original_source/src/main.cpp`'s exit-medium handling: a ray
        // exiting back into the same object it entered through transitions
        // into vacuum rather than whatever `current_ior` happened to be.
        let (n1, n2) = if entering {
            (current_ior, object_ior)
        } else if current_ior == object_ior && entry_object == Some(object) {
            (object_ior, VACUUM_IOR)
        } else {
            (current_ior, VACUUM_IOR)
        };

        let reflect_dir = ray.direction.reflect(normal);
        let refract_dir = ray.direction.refract(normal, n1 / n2);

        let reflected_importance = importance * (1.0 - transmittance);
        let refracted_importance = importance * transmittance;

        let reflected = if reflected_importance > IMPORTANCE_CUTOFF {
            let origin = point + normal * 1e-4;
            self.build(
                Ray::new(origin, reflect_dir),
                reflected_importance,
                current_ior,
                entry_object,
                false,
                rng,
            )
        } else {
            None
        };

        let refracted = match refract_dir {
            Some(dir) if refracted_importance > IMPORTANCE_CUTOFF => {
                let origin = point - normal * 1e-4;
                let next_entry = if entering { Some(object) } else { None };
                self.build(
                    Ray::new(origin, dir),
                    refracted_importance,
                    n2,
                    next_entry,
                    false,
                    rng,
                )
            }
            _ => None,
        };

        let reflected_color = reflected.as_ref().map_or(Color::zero(), |n| n.radiance);
        let refracted_color = refracted.as_ref().map_or(Color::zero(), |n| n.radiance);
        let radiance =
            reflected_color * (1.0 - transmittance) + refracted_color * transmittance;

        PathNode {
            point,
            normal,
            object,
            importance,
            radiance,
            reflected,
            refracted,
        }
    }

    /// `incoming_direction` is the ray direction that produced this hit;
    /// `is_root` exempts the primary ray's first bounce from Russian
    /// roulette termination (spec §4.5, `original_source`'s `node == root`).
    #[allow(clippy::too_many_arguments)]
    fn build_opaque(
        &self,
        incoming_direction: Vec3,
        point: Point3,
        normal: Vec3,
        object: ObjectIndex,
        importance: f64,
        is_root: bool,
        brdf: &dyn crate::brdf::Brdf,
        color: Color,
        rng: &mut dyn RngCore,
    ) -> PathNode {
        let roulette_draw: f64 = rng.gen();
        let continues = is_root || roulette_draw < self.p_surv;

        let normal_angles = normal.to_spherical();
        // "Subtract the normal's spherical angles" local frame (spec §4.5):
        // the flipped incoming direction's angles, relative to the normal.
        let flipped_angles = (-incoming_direction).to_spherical();
        let incoming_angles = (
            flipped_angles.0 - normal_angles.0,
            flipped_angles.1 - normal_angles.1,
        );

        let mut reflected = None;
        let mut child_importance = 0.0;
        if continues {
            let (sample_theta, sample_phi) = crate::math::sample_cosine_hemisphere_angles(rng);
            let outgoing_local = (sample_theta, sample_phi);
            let f = brdf.eval(incoming_angles, outgoing_local, brdf.rho());
            child_importance = importance * f * PI;
            if child_importance > IMPORTANCE_CUTOFF {
                let reflection_angles = (
                    normal_angles.0 + sample_theta,
                    normal_angles.1 + sample_phi,
                );
                let direction = Vec3::from_spherical(reflection_angles.0, reflection_angles.1);
                let origin = point + normal * 1e-4;
                reflected = self.build(
                    Ray::new(origin, direction),
                    child_importance,
                    VACUUM_IOR,
                    None,
                    false,
                    rng,
                );
            }
        }

        let reflected_color = reflected.as_ref().map_or(Color::zero(), |n| n.radiance);
        let shadow_color = self.scene.cast_shadow_rays(
            point,
            incoming_angles,
            normal,
            Some((brdf, color)),
            self.shadow_rays,
            rng,
        );

        let reflected_term = if continues && child_importance > IMPORTANCE_CUTOFF {
            REFLECTED_WEIGHT * (child_importance / (self.p_surv * importance)) * reflected_color
        } else {
            Color::zero()
        };

        let radiance = color.hadamard(reflected_term + shadow_color * SHADOW_WEIGHT);

        PathNode {
            point,
            normal,
            object,
            importance,
            radiance,
            reflected,
            refracted: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brdf::Lambertian;
    use crate::object::SceneObject;
    use crate::primitive::Sphere;
    use crate::scene::SceneBuilder;
    use rand::SeedableRng;

    fn emissive_sphere_scene() -> Scene {
        let light = SceneObject::emissive(
            Box::new(Sphere::new(Point3::new(0.0, 5.0, 0.0), 1.0).unwrap()),
            Box::new(Lambertian::new(1.0)),
            Color::ones(),
            Color::new(4.0, 4.0, 4.0),
        )
        .unwrap();
        let floor = SceneObject::opaque(
            Box::new(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0).unwrap()),
            Box::new(Lambertian::new(1.0)),
            Color::new(0.6, 0.6, 0.6),
        )
        .unwrap();
        SceneBuilder::new().add(light).add(floor).finalize().unwrap()
    }

    #[test]
    fn primary_ray_hitting_emitter_returns_its_emission_directly() {
        let scene = emissive_sphere_scene();
        let kernel = Kernel::new(&scene, 0.5, 4);
        let mut rng = rand::rngs::SmallRng::seed_from_u64(1);
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::unit_y());
        let color = kernel.trace_primary(ray, &mut rng);
        assert!(color.x > 0.0 && color.y > 0.0 && color.z > 0.0);
    }

    #[test]
    fn miss_returns_zero_radiance() {
        let scene = emissive_sphere_scene();
        let kernel = Kernel::new(&scene, 0.5, 4);
        let mut rng = rand::rngs::SmallRng::seed_from_u64(2);
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        let color = kernel.trace_primary(ray, &mut rng);
        assert_eq!(color, Color::zero());
    }

    #[test]
    fn radiance_is_never_negative() {
        let scene = emissive_sphere_scene();
        let kernel = Kernel::new(&scene, 0.7, 2);
        for seed in 0..20u64 {
            let mut rng = rand::rngs::SmallRng::seed_from_u64(seed);
            let ray = Ray::new(Point3::new(0.0, 0.1, 0.0), Vec3::new(0.3, 0.9, 0.1).normalized());
            let c = kernel.trace_primary(ray, &mut rng);
            assert!(c.x >= 0.0 && c.y >= 0.0 && c.z >= 0.0);
        }
    }
}
