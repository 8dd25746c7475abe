//! Resolved render configuration (spec §3, §6): loaded from TOML via
//! `serde`, unknown keys rejected outright, then validated into a
//! guaranteed-sane [`Config`] — never a panic on bad input.

use crate::error::RenderError;
use serde::Deserialize;
use std::path::Path;

/// The raw, on-disk shape of a scene config file. Field names match the
/// spec's `camelCase` config keys exactly.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    width: u32,
    height: u32,
    #[serde(rename = "numberOfSamples")]
    number_of_samples: u32,
    #[serde(rename = "numberOfShadowRays")]
    number_of_shadow_rays: u32,
    #[serde(rename = "probabilityNotToTerminateRay")]
    probability_not_to_terminate_ray: f64,
    name: String,
}

/// A validated render configuration: every field is already known to be in
/// range, so downstream code never re-checks it.
#[derive(Debug, Clone)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub number_of_samples: u32,
    pub number_of_shadow_rays: u32,
    pub probability_not_to_terminate_ray: f64,
    pub name: String,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            RenderError::Config(format!("cannot read {}: {e}", path.as_ref().display()))
        })?;
        let raw: RawConfig = toml::from_str(&text)
            .map_err(|e| RenderError::Config(format!("malformed config: {e}")))?;
        Self::try_from(raw)
    }

    /// Applies CLI overrides on top of an already-validated config,
    /// re-validating the result.
    pub fn with_overrides(
        mut self,
        width: Option<u32>,
        height: Option<u32>,
        samples: Option<u32>,
        shadow_rays: Option<u32>,
    ) -> Result<Self, RenderError> {
        if let Some(w) = width {
            self.width = w;
        }
        if let Some(h) = height {
            self.height = h;
        }
        if let Some(s) = samples {
            self.number_of_samples = s;
        }
        if let Some(sr) = shadow_rays {
            self.number_of_shadow_rays = sr;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::Config(
                "width and height must both be nonzero".into(),
            ));
        }
        if self.number_of_samples == 0 {
            return Err(RenderError::Config(
                "numberOfSamples must be at least 1".into(),
            ));
        }
        if !(self.probability_not_to_terminate_ray > 0.0
            && self.probability_not_to_terminate_ray < 1.0)
        {
            return Err(RenderError::Config(format!(
                "probabilityNotToTerminateRay must be in (0,1), got {}",
                self.probability_not_to_terminate_ray
            )));
        }
        Ok(())
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = RenderError;

    fn try_from(raw: RawConfig) -> Result<Self, RenderError> {
        let config = Config {
            width: raw.width,
            height: raw.height,
            number_of_samples: raw.number_of_samples,
            number_of_shadow_rays: raw.number_of_shadow_rays,
            probability_not_to_terminate_ray: raw.probability_not_to_terminate_ray,
            name: raw.name,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_keys() {
        let toml_text = r#"
            width = 400
            height = 300
            numberOfSamples = 16
            numberOfShadowRays = 4
            probabilityNotToTerminateRay = 0.8
            name = "test"
            bogusKey = 1
        "#;
        let result: Result<RawConfig, _> = toml::from_str(toml_text);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_out_of_range_survival_probability() {
        let raw = RawConfig {
            width: 400,
            height: 300,
            number_of_samples: 16,
            number_of_shadow_rays: 4,
            probability_not_to_terminate_ray: 1.5,
            name: "test".into(),
        };
        assert!(Config::try_from(raw).is_err());
    }

    #[test]
    fn accepts_valid_config() {
        let raw = RawConfig {
            width: 400,
            height: 300,
            number_of_samples: 16,
            number_of_shadow_rays: 4,
            probability_not_to_terminate_ray: 0.8,
            name: "test".into(),
        };
        assert!(Config::try_from(raw).is_ok());
    }

    #[test]
    fn overrides_apply_and_revalidate() {
        let base = Config {
            width: 400,
            height: 300,
            number_of_samples: 16,
            number_of_shadow_rays: 4,
            probability_not_to_terminate_ray: 0.8,
            name: "test".into(),
        };
        let result = base.with_overrides(Some(0), None, None, None);
        assert!(result.is_err());
    }
}
