//! The renderer's error taxonomy (spec §7).
//!
//! Every fallible boundary in the crate returns a [`RenderError`]. `main`
//! matches on the variant to print a single `"{phase}: {cause}"` line to
//! stderr and exit non-zero — construction and finalization errors bubble up
//! and abort *before* any work is submitted to the thread pool.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Missing or malformed configuration value.
    #[error("config: {0}")]
    Config(String),

    /// A query was issued against a scene before finalization.
    ///
    /// Unreachable in this crate: [`crate::scene::Scene`] only exists after
    /// [`crate::scene::SceneBuilder::finalize`] consumes the builder, so there
    /// is no query path that can observe an unfinalized scene. Kept for
    /// taxonomy completeness (see DESIGN.md).
    #[error("scene: {0}")]
    SceneFinalization(String),

    /// A degenerate primitive or scene object was detected at construction
    /// time (zero area, colinear rectangle corners, zero-length edge, an
    /// emissive transparent object, an out-of-range transmittance or
    /// refractive index, ...).
    #[error("scene: {0}")]
    Geometry(String),

    /// Surfaced from the external image-encoding collaborator.
    #[error("encode: {0}")]
    Encoder(String),

    /// A runtime invariant (non-negative importance, finite/normalized
    /// directions, ...) was violated. Fatal by design — see spec §7.
    #[error("render: {0}")]
    InternalInvariant(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
