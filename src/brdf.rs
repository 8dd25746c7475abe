//! Reflectance models (spec §4.2): Lambertian and Oren–Nayar, both evaluated
//! in the "subtract the surface normal's spherical angles" local frame the
//! kernel and shadow-ray estimator share (see `math::to_spherical`).

use std::f64::consts::PI;

/// A diffuse reflectance model, evaluated as `f(incoming, outgoing, rho)`
/// where both angle pairs are `(theta, phi)` relative to the local frame
/// (already offset by the surface normal's own spherical angles).
pub trait Brdf: Send + Sync {
    /// The material's own reflectance `rho` (spec §3's `Lambertian(rho)` /
    /// `OrenNayar(rho, sigma)` field), independent of the `color` tint the
    /// scene object carries separately.
    fn rho(&self) -> f64;
    fn eval(&self, incoming: (f64, f64), outgoing: (f64, f64), albedo: f64) -> f64;
}

/// `f = rho / pi`, independent of either angle.
pub struct Lambertian {
    pub rho: f64,
}

impl Lambertian {
    pub fn new(rho: f64) -> Self {
        Self { rho }
    }
}

impl Brdf for Lambertian {
    fn rho(&self) -> f64 {
        self.rho
    }

    fn eval(&self, _incoming: (f64, f64), _outgoing: (f64, f64), albedo: f64) -> f64 {
        albedo / PI
    }
}

/// Oren–Nayar rough-diffuse model with reflectance `rho` and roughness
/// `sigma` (radians of microfacet slope standard deviation).
pub struct OrenNayar {
    pub rho: f64,
    pub sigma: f64,
}

impl OrenNayar {
    pub fn new(rho: f64, sigma: f64) -> Self {
        Self { rho, sigma }
    }
}

impl Brdf for OrenNayar {
    fn rho(&self) -> f64 {
        self.rho
    }

    /// `f = rho/pi * (A + B * max(0, cos(phi_i - phi_o)) * sin(alpha) * tan(beta))`
    /// with `A = 1 - 0.5*s2/(s2+0.33)`, `B = 0.45*s2/(s2+0.09)`,
    /// `alpha = max(theta_i, theta_o)`, `beta = min(theta_i, theta_o)`.
    /// At `sigma = 0`, `A = 1, B = 0`, reducing to Lambertian — the §8
    /// testable property this crate's tests check directly.
    fn eval(&self, incoming: (f64, f64), outgoing: (f64, f64), albedo: f64) -> f64 {
        let (theta_i, phi_i) = incoming;
        let (theta_o, phi_o) = outgoing;
        let s2 = self.sigma * self.sigma;
        let a = 1.0 - 0.5 * s2 / (s2 + 0.33);
        let b = 0.45 * s2 / (s2 + 0.09);
        let alpha = theta_i.max(theta_o);
        let beta = theta_i.min(theta_o);
        let azimuth_term = (phi_i - phi_o).cos().max(0.0);
        albedo / PI * (a + b * azimuth_term * alpha.sin() * beta.tan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oren_nayar_matches_lambertian_at_zero_roughness() {
        let lambert = Lambertian::new(0.8);
        let oren_nayar = OrenNayar::new(0.8, 0.0);
        let incoming = (0.3, 0.1);
        let outgoing = (0.5, 1.2);
        let albedo = 0.8;
        let l = lambert.eval(incoming, outgoing, albedo);
        let o = oren_nayar.eval(incoming, outgoing, albedo);
        assert!((l - o).abs() < 1e-9, "lambert={l} oren_nayar={o}");
    }

    #[test]
    fn oren_nayar_nonnegative_for_forward_angles() {
        let brdf = OrenNayar::new(0.8, 0.5);
        let f = brdf.eval((0.2, 0.0), (0.4, 0.0), 0.5);
        assert!(f >= 0.0);
    }
}
