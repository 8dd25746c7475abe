//! Scene objects (spec §3, §4.3): a geometric [`Primitive`] paired with a
//! tagged [`Surface`] and an optional emission. Dispatch on surface kind
//! uses the `Surface` enum rather than trait-object downcasting — the
//! re-architecture Design Notes call for (spec §9).

use crate::brdf::Brdf;
use crate::error::RenderError;
use crate::math::Color;
use crate::primitive::Primitive;

/// The interface behavior of an object's surface.
pub enum Surface {
    /// Reflects light diffusely per `brdf`, with reflectance `color`.
    Opaque { brdf: Box<dyn Brdf>, color: Color },
    /// Splits light between reflection and refraction. `transmittance` is
    /// the fraction of energy that refracts (`tau` in spec notation);
    /// `ior` is the refractive index of the medium behind the surface.
    Transparent { transmittance: f64, ior: f64 },
}

/// A scene object: one [`Primitive`] plus a [`Surface`] plus optional
/// emitted radiance. Construction validates the invariants spec §3/§4.3
/// state (transparent objects cannot emit; `transmittance` in `[0,1]`;
/// `ior >= 1`) so that any `SceneObject` reaching the scene is well-formed.
pub struct SceneObject {
    pub primitive: Box<dyn Primitive>,
    pub surface: Surface,
    pub emission: Option<Color>,
}

impl SceneObject {
    pub fn opaque(
        primitive: Box<dyn Primitive>,
        brdf: Box<dyn Brdf>,
        color: Color,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            primitive,
            surface: Surface::Opaque { brdf, color },
            emission: None,
        })
    }

    pub fn emissive(
        primitive: Box<dyn Primitive>,
        brdf: Box<dyn Brdf>,
        color: Color,
        emission: Color,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            primitive,
            surface: Surface::Opaque { brdf, color },
            emission: Some(emission),
        })
    }

    pub fn transparent(
        primitive: Box<dyn Primitive>,
        transmittance: f64,
        ior: f64,
    ) -> Result<Self, RenderError> {
        if !(0.0..=1.0).contains(&transmittance) {
            return Err(RenderError::Geometry(format!(
                "transmittance {transmittance} out of range [0,1]"
            )));
        }
        if ior < 1.0 {
            return Err(RenderError::Geometry(format!(
                "refractive index {ior} must be >= 1"
            )));
        }
        Ok(Self {
            primitive,
            surface: Surface::Transparent { transmittance, ior },
            emission: None,
        })
    }

    pub fn is_emissive(&self) -> bool {
        self.emission.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brdf::Lambertian;
    use crate::math::Point3;
    use crate::primitive::Sphere;

    fn sphere() -> Box<dyn Primitive> {
        Box::new(Sphere::new(Point3::zero(), 1.0).unwrap())
    }

    #[test]
    fn transparent_rejects_out_of_range_transmittance() {
        let result = SceneObject::transparent(sphere(), 1.5, 1.5);
        assert!(result.is_err());
    }

    #[test]
    fn transparent_rejects_subunity_ior() {
        let result = SceneObject::transparent(sphere(), 0.5, 0.9);
        assert!(result.is_err());
    }

    #[test]
    fn opaque_construction_succeeds() {
        let obj = SceneObject::opaque(sphere(), Box::new(Lambertian::new(1.0)), Color::new(0.8, 0.2, 0.2));
        assert!(obj.is_ok());
        assert!(!obj.unwrap().is_emissive());
    }
}
