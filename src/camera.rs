//! A pinhole camera (spec §4.4): no lens/aperture/depth-of-field, just a
//! look-at orientation and a field of view. Primary rays are generated
//! on demand rather than materialized into a `width*height*samples`
//! buffer — same row-major, sample-stride-innermost addressing order the
//! eager buffer would have, but computed per call.

use crate::math::{Mat3, Point3, Ray, Vec3};
use rand::RngCore;

pub struct Camera {
    origin: Point3,
    basis: Mat3,
    half_width: f64,
    half_height: f64,
    image_width: u32,
    image_height: u32,
}

impl Camera {
    pub fn new(
        look_from: Point3,
        look_at: Point3,
        vup: Vec3,
        vertical_fov_degrees: f64,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let basis = Mat3::look_at(look_from, look_at, vup);
        let theta = vertical_fov_degrees.to_radians();
        let half_height = (theta / 2.0).tan();
        let aspect = image_width as f64 / image_height as f64;
        let half_width = aspect * half_height;
        Self {
            origin: look_from,
            basis,
            half_width,
            half_height,
            image_width,
            image_height,
        }
    }

    /// The primary ray for pixel `(x, y)`, sub-sample `s` of `spp` total
    /// stratified samples. When `spp` is a perfect square, jitter is drawn
    /// from a `sqrt(spp) x sqrt(spp)` stratified grid cell indexed by `s`;
    /// otherwise a single uniform jitter covers the whole pixel (spec
    /// §4.4).
    pub fn primary_ray(&self, x: u32, y: u32, s: u32, spp: u32, rng: &mut dyn RngCore) -> Ray {
        use rand::Rng;
        let (jx, jy) = if let Some(grid) = perfect_sqrt(spp) {
            let cell_x = (s % grid) as f64;
            let cell_y = (s / grid) as f64;
            let cell_size = 1.0 / grid as f64;
            let u: f64 = rng.gen_range(0.0..cell_size);
            let v: f64 = rng.gen_range(0.0..cell_size);
            (cell_x * cell_size + u, cell_y * cell_size + v)
        } else {
            (rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0))
        };

        let px = ((x as f64 + jx) / self.image_width as f64) * 2.0 - 1.0;
        let py = 1.0 - ((y as f64 + jy) / self.image_height as f64) * 2.0;

        let direction = self
            .basis
            .apply(Vec3::new(px * self.half_width, py * self.half_height, -1.0));
        Ray::new(self.origin, direction)
    }
}

/// Returns `Some(sqrt(n))` if `n` is a perfect square, else `None`.
fn perfect_sqrt(n: u32) -> Option<u32> {
    if n == 0 {
        return None;
    }
    let r = (n as f64).sqrt().round() as u32;
    (r * r == n).then_some(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn perfect_sqrt_detects_squares() {
        assert_eq!(perfect_sqrt(16), Some(4));
        assert_eq!(perfect_sqrt(10), None);
        assert_eq!(perfect_sqrt(1), Some(1));
    }

    #[test]
    fn primary_ray_direction_is_normalized() {
        let cam = Camera::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::zero(),
            Vec3::unit_y(),
            60.0,
            400,
            300,
        );
        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
        let ray = cam.primary_ray(200, 150, 0, 16, &mut rng);
        assert!((ray.direction.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn center_pixel_points_roughly_at_look_at() {
        let cam = Camera::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::zero(),
            Vec3::unit_y(),
            60.0,
            400,
            300,
        );
        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
        let ray = cam.primary_ray(200, 150, 0, 1, &mut rng);
        assert!(ray.direction.dot(Vec3::new(0.0, 0.0, -1.0)) > 0.9);
    }
}
