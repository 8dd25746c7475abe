//! Built-in scene gallery (spec §6 `[SUPPLEMENT]`): a small set of
//! hardcoded scenes selectable via `--scene`, replacing the original's
//! single hardcoded `createScene()`. Structured the way the teacher's
//! `ScenePreset`/`SceneDescription` pairing bundles geometry with a camera
//! configuration, adapted to this crate's `SceneObject`/`Camera` types.

use crate::brdf::{Lambertian, OrenNayar};
use crate::camera::Camera;
use crate::error::RenderError;
use crate::math::{Color, Point3, Vec3};
use crate::object::SceneObject;
use crate::primitive::{BoundingBox, OrientedRectangle, Sphere};
use crate::scene::{Scene, SceneBuilder};

/// A complete scene description bundling geometry and the camera used to
/// view it.
pub struct SceneDescription {
    pub scene: Scene,
    pub camera: Camera,
}

/// Available built-in scene presets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ScenePreset {
    /// A single diffuse sphere and an area light inside an enclosing room —
    /// useful as a minimal smoke test.
    Minimal,
    /// A Cornell-box-style room: five bounding walls, an emissive ceiling
    /// rectangle, and two spheres of differing roughness.
    Cornell,
    /// A small gallery exercising every primitive and surface kind: a
    /// sphere, a transparent sphere, and two walls of the bounding room.
    Gallery,
}

impl ScenePreset {
    pub fn build(self, width: u32, height: u32) -> Result<SceneDescription, RenderError> {
        match self {
            ScenePreset::Minimal => build_minimal(width, height),
            ScenePreset::Cornell => build_cornell(width, height),
            ScenePreset::Gallery => build_gallery(width, height),
        }
    }
}

fn room_camera(width: u32, height: u32) -> Camera {
    Camera::new(
        Point3::new(0.0, 1.0, 4.5),
        Point3::new(0.0, 1.0, 0.0),
        Vec3::unit_y(),
        40.0,
        width,
        height,
    )
}

fn build_minimal(width: u32, height: u32) -> Result<SceneDescription, RenderError> {
    let room = BoundingBox::new((-3.0, 3.0), (0.0, 4.0), (-3.0, 3.0))?;
    let light = OrientedRectangle::new(
        Point3::new(-1.0, 3.99, -1.0),
        Point3::new(-1.0, 3.99, 1.0),
        Point3::new(1.0, 3.99, 1.0),
    )?;
    let sphere = Sphere::new(Point3::new(0.0, 1.0, 0.0), 1.0)?;

    let scene = SceneBuilder::new()
        .add(SceneObject::opaque(
            Box::new(room),
            Box::new(Lambertian::new(1.0)),
            Color::new(0.75, 0.75, 0.75),
        )?)
        .add(SceneObject::emissive(
            Box::new(light),
            Box::new(Lambertian::new(1.0)),
            Color::ones(),
            Color::new(15.0, 15.0, 15.0),
        )?)
        .add(SceneObject::opaque(
            Box::new(sphere),
            Box::new(Lambertian::new(1.0)),
            Color::new(0.8, 0.2, 0.2),
        )?)
        .finalize()?;

    Ok(SceneDescription {
        scene,
        camera: room_camera(width, height),
    })
}

fn build_cornell(width: u32, height: u32) -> Result<SceneDescription, RenderError> {
    let room = BoundingBox::new((-3.0, 3.0), (0.0, 4.0), (-4.0, 3.0))?;
    let light = OrientedRectangle::new(
        Point3::new(-1.2, 3.99, -1.2),
        Point3::new(-1.2, 3.99, 1.2),
        Point3::new(1.2, 3.99, 1.2),
    )?;
    let left_sphere = Sphere::new(Point3::new(-1.3, 1.0, -0.5), 1.0)?;
    let right_sphere = Sphere::new(Point3::new(1.2, 0.8, 0.6), 0.8)?;

    let scene = SceneBuilder::new()
        .add(SceneObject::opaque(
            Box::new(room),
            Box::new(Lambertian::new(1.0)),
            Color::new(0.73, 0.73, 0.73),
        )?)
        .add(SceneObject::emissive(
            Box::new(light),
            Box::new(Lambertian::new(1.0)),
            Color::ones(),
            Color::new(17.0, 17.0, 17.0),
        )?)
        .add(SceneObject::opaque(
            Box::new(left_sphere),
            Box::new(Lambertian::new(1.0)),
            Color::new(0.2, 0.7, 0.2),
        )?)
        .add(SceneObject::opaque(
            Box::new(right_sphere),
            Box::new(OrenNayar::new(0.8, 0.6)),
            Color::new(0.9, 0.9, 0.2),
        )?)
        .finalize()?;

    Ok(SceneDescription {
        scene,
        camera: room_camera(width, height),
    })
}

fn build_gallery(width: u32, height: u32) -> Result<SceneDescription, RenderError> {
    let room = BoundingBox::new((-3.5, 3.5), (0.0, 4.0), (-3.5, 3.5))?;
    let light = OrientedRectangle::new(
        Point3::new(-1.0, 3.99, -1.0),
        Point3::new(-1.0, 3.99, 1.0),
        Point3::new(1.0, 3.99, 1.0),
    )?;
    let diffuse = Sphere::new(Point3::new(-1.5, 1.0, 0.0), 1.0)?;
    let glass = Sphere::new(Point3::new(1.5, 1.0, 0.0), 1.0)?;

    let scene = SceneBuilder::new()
        .add(SceneObject::opaque(
            Box::new(room),
            Box::new(Lambertian::new(1.0)),
            Color::new(0.7, 0.7, 0.7),
        )?)
        .add(SceneObject::emissive(
            Box::new(light),
            Box::new(Lambertian::new(1.0)),
            Color::ones(),
            Color::new(12.0, 12.0, 12.0),
        )?)
        .add(SceneObject::opaque(
            Box::new(diffuse),
            Box::new(OrenNayar::new(0.8, 0.9)),
            Color::new(0.3, 0.5, 0.9),
        )?)
        .add(SceneObject::transparent(Box::new(glass), 0.9, 1.5)?)
        .finalize()?;

    Ok(SceneDescription {
        scene,
        camera: room_camera(width, height),
    })
}
