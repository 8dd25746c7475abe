use rand::Rng;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub};

/// A 3-component vector used for positions, directions, and colors in the
/// path tracer. Implements the usual arithmetic via operator overloading
/// plus the geometric utilities (dot, cross, reflect, refract) the light
/// transport math needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub type Point3 = Vec3;
pub type Color = Vec3;

impl Vec3 {
    #[inline(always)]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn ones() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    #[inline(always)]
    pub const fn unit_x() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn unit_y() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    #[inline(always)]
    pub const fn unit_z() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    #[inline(always)]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline(always)]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Returns the unit vector. Debug-asserts on near-zero-length input
    /// rather than silently producing NaN.
    #[inline(always)]
    pub fn normalized(self) -> Self {
        let len = self.length();
        debug_assert!(len > 1e-12, "attempted to normalize a zero-length vector");
        self / len
    }

    #[inline(always)]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline(always)]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Specular reflection of `self` about the surface normal `n`:
    /// `I - 2*dot(I, N)*N`.
    #[inline(always)]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * 2.0 * self.dot(normal)
    }

    /// Snell's-law refraction. `None` on total internal reflection.
    #[inline]
    pub fn refract(self, normal: Self, eta_ratio: f64) -> Option<Self> {
        let cos_theta = (-self).dot(normal).min(1.0);
        let r_perp = (self + normal * cos_theta) * eta_ratio;
        let discriminant = 1.0 - r_perp.length_squared();
        if discriminant < 0.0 {
            return None;
        }
        let r_parallel = normal * -(discriminant.sqrt());
        Some(r_perp + r_parallel)
    }

    #[inline(always)]
    pub fn hadamard(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    #[inline(always)]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }

    #[inline(always)]
    pub fn saturate(self) -> Self {
        Self::new(
            self.x.clamp(0.0, 1.0),
            self.y.clamp(0.0, 1.0),
            self.z.clamp(0.0, 1.0),
        )
    }

    #[inline(always)]
    pub fn near_zero(self) -> bool {
        const EPS: f64 = 1e-8;
        self.x.abs() < EPS && self.y.abs() < EPS && self.z.abs() < EPS
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Spherical angles `(theta, phi)` of this direction: `theta` is the
    /// polar angle from +Z, `phi` the azimuth in the XY plane. Used by the
    /// kernel's "subtract the normal's spherical angles" local-frame
    /// approximation — see `kernel.rs`.
    #[inline]
    pub fn to_spherical(self) -> (f64, f64) {
        (self.z.clamp(-1.0, 1.0).acos(), self.y.atan2(self.x))
    }

    /// Inverse of [`Self::to_spherical`]: a unit vector at polar angle
    /// `theta` and azimuth `phi`.
    #[inline]
    pub fn from_spherical(theta: f64, phi: f64) -> Self {
        let (sin_t, cos_t) = theta.sin_cos();
        Self::new(sin_t * phi.cos(), sin_t * phi.sin(), cos_t)
    }

    /// Generates a uniformly distributed random point inside the unit
    /// sphere via rejection sampling.
    pub fn random_in_unit_sphere(rng: &mut dyn rand::RngCore) -> Self {
        loop {
            let v = Self::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if v.length_squared() < 1.0 {
                return v;
            }
        }
    }

    pub fn random_unit_vector(rng: &mut dyn rand::RngCore) -> Self {
        Self::random_in_unit_sphere(rng).normalized()
    }

    /// Random point on the unit disk, used for depth-of-field and disk
    /// surface sampling.
    pub fn random_in_unit_disk(rng: &mut dyn rand::RngCore) -> Self {
        loop {
            let v = Self::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.0);
            if v.length_squared() < 1.0 {
                return v;
            }
        }
    }

    /// Converts a `[0,1]` color to an 8-bit RGB triple.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let c = self.saturate();
        (
            (c.x * 255.999) as u8,
            (c.y * 255.999) as u8,
            (c.z * 255.999) as u8,
        )
    }
}

/// Samples a cosine-weighted direction on the hemisphere around `+Z` via
/// Malley's method: `cosθ = sqrt(u1)`, `φ = 2π·u2`. This is the standard
/// two-uniform mapping that produces the density `cosθ/π` — over many
/// samples, `E[cosθ] = 2/3`.
pub fn sample_cosine_hemisphere_angles(rng: &mut dyn rand::RngCore) -> (f64, f64) {
    let u1: f64 = rng.gen();
    let u2: f64 = rng.gen();
    let cos_theta = u1.sqrt().min(1.0);
    let theta = cos_theta.acos();
    let phi = 2.0 * std::f64::consts::PI * u2;
    (theta, phi)
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, t: f64) -> Self {
        Self::new(self.x * t, self.y * t, self.z * t)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    #[inline(always)]
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

impl MulAssign<f64> for Vec3 {
    #[inline(always)]
    fn mul_assign(&mut self, t: f64) {
        self.x *= t;
        self.y *= t;
        self.z *= t;
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn div(self, t: f64) -> Self {
        let inv = 1.0 / t;
        Self::new(self.x * inv, self.y * inv, self.z * inv)
    }
}

impl DivAssign<f64> for Vec3 {
    #[inline(always)]
    fn div_assign(&mut self, t: f64) {
        let inv = 1.0 / t;
        self.x *= inv;
        self.y *= inv;
        self.z *= inv;
    }
}

impl Index<usize> for Vec3 {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index out of bounds: {i}"),
        }
    }
}

// ─── Ray ────────────────────────────────────────────────────────────────────

/// A parametric ray `R(t) = origin + t * direction`. `direction` is
/// normalized at construction (spec §3 invariant), so every downstream `t`
/// is a true Euclidean distance along the ray.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalized(),
        }
    }

    #[inline(always)]
    pub fn at(self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}

// ─── Orthonormal 3x3 basis ──────────────────────────────────────────────────

/// A camera/object orientation expressed as three orthonormal basis columns
/// `(right, up, forward)`, mirroring the `(u, v, w)` basis the teacher's
/// `Camera` builds from a look-at configuration.
#[derive(Debug, Clone, Copy)]
pub struct Mat3 {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl Mat3 {
    pub const fn new(right: Vec3, up: Vec3, forward: Vec3) -> Self {
        Self { right, up, forward }
    }

    pub const fn identity() -> Self {
        Self::new(Vec3::unit_x(), Vec3::unit_y(), Vec3::unit_z())
    }

    /// Builds a right-handed look-at basis: `forward` points from `look_at`
    /// toward `look_from` (i.e. backward, away from the scene), `right` and
    /// `up` complete an orthonormal frame around it.
    pub fn look_at(look_from: Point3, look_at: Point3, vup: Vec3) -> Self {
        let forward = (look_from - look_at).normalized();
        let right = vup.cross(forward).normalized();
        let up = forward.cross(right);
        Self::new(right, up, forward)
    }

    /// Transforms a local-frame vector `(x, y, z)` into world space:
    /// `x*right + y*up + z*forward`.
    #[inline]
    pub fn apply(&self, v: Vec3) -> Vec3 {
        self.right * v.x + self.up * v.y + self.forward * v.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn ray_direction_is_normalized() {
        let r = Ray::new(Point3::zero(), Vec3::new(3.0, 0.0, 0.0));
        assert!((r.direction.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reflect_preserves_length() {
        let v = Vec3::new(1.0, -1.0, 0.5).normalized();
        let n = Vec3::unit_y();
        let r = v.reflect(n);
        assert!((r.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_hemisphere_mean_matches_two_thirds() {
        let mut rng = rand::rngs::SmallRng::seed_from_u64(42);
        let n = 200_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let (theta, _phi) = sample_cosine_hemisphere_angles(&mut rng);
            sum += theta.cos();
        }
        let mean = sum / n as f64;
        assert!((mean - 2.0 / 3.0).abs() < 0.01, "mean cosθ = {mean}");
    }

    #[test]
    fn spherical_round_trip() {
        let v = Vec3::new(0.2, -0.6, 0.75).normalized();
        let (theta, phi) = v.to_spherical();
        let back = Vec3::from_spherical(theta, phi);
        assert!((v - back).length() < 1e-9);
    }
}
