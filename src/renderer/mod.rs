mod machinery;
mod worker;

use std::time::Instant;

use bon::Builder;
use thiserror::Error;
use tracing::info;

use crate::{
    camera::Camera,
    framebuffer::Framebuffer,
    geometry::{FloatType, Ray},
    scene::{Primitive, Scene, SceneError, StackCache},
    util::Rgb,
};

pub use machinery::RenderProgress;
use worker::Worker;

#[derive(Copy, Clone, Debug, Builder)]
pub struct RenderSettings {
    /// Rays deeper than this return the background without being traced
    #[builder(default = 3)]
    pub max_depth: u32,

    /// Color of rays that don't hit anything
    #[builder(default = Rgb::new(0.0, 0.0, 0.0))]
    pub background: Rgb,

    /// Flat contribution of every surface hit along the path
    #[builder(default = Rgb::new(0.1, 0.1, 0.1))]
    pub hit_color: Rgb,

    /// How far from the surface reflected rays start
    #[builder(default = 1e-4)]
    pub reflection_offset: FloatType,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings::builder().build()
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("Failed to spawn render worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

/// Traces every pixel of the camera's image into its own framebuffer.
pub struct Renderer {
    camera: Camera,
    settings: RenderSettings,
    framebuffer: Framebuffer,
}

impl Renderer {
    pub fn new(camera: Camera, settings: RenderSettings) -> Renderer {
        Renderer {
            framebuffer: Framebuffer::new(camera.get_resolution(), settings.background),
            camera,
            settings,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn into_framebuffer(self) -> Framebuffer {
        self.framebuffer
    }

    /// Renders the whole image on the calling thread, row by row.
    pub fn render<P: Primitive>(&mut self, scene: &Scene<P>) -> Result<(), RenderError> {
        scene.bvh()?;

        let start = Instant::now();
        let mut worker = Worker::new();
        for (y, row) in self.framebuffer.rows_mut() {
            worker.render_row(scene, &self.camera, &self.settings, y, row)?;
        }

        info!(
            width = self.framebuffer.width(),
            height = self.framebuffer.height(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Render finished"
        );

        Ok(())
    }

    /// Color seen along a single ray, `depth` being the number of reflections so far.
    pub fn trace_ray<P: Primitive>(
        &self,
        ray: &Ray,
        scene: &Scene<P>,
        depth: u32,
    ) -> Result<Rgb, SceneError> {
        trace_ray(&self.settings, scene, ray, depth, &mut StackCache::default())
    }
}

/// Every surface is a perfect mirror that adds `hit_color` to the path.
/// Recursion ends when a ray misses or the depth limit is exceeded.
fn trace_ray<P: Primitive>(
    settings: &RenderSettings,
    scene: &Scene<P>,
    ray: &Ray,
    depth: u32,
    stack: &mut StackCache,
) -> Result<Rgb, SceneError> {
    if depth > settings.max_depth {
        return Ok(settings.background);
    }

    let Some(hit) = scene.intersect_with_stack(ray, stack)? else {
        return Ok(settings.background);
    };

    let normal = hit.normal.into_inner();
    let direction = ray.direction() - normal * (2.0 * ray.direction().dot(&normal));

    // Move the origin to the side of the surface the reflection leaves on,
    // otherwise the ray could hit the same triangle again.
    let side = if direction.dot(&normal) >= 0.0 { 1.0 } else { -1.0 };
    let origin = hit.position + normal * (side * settings.reflection_offset);

    let reflected = trace_ray(settings, scene, &Ray::new(origin, direction), depth + 1, stack)?;

    Ok(settings.hit_color + reflected)
}
