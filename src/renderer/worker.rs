use crate::{
    camera::Camera,
    geometry::ScreenPoint,
    renderer::RenderSettings,
    scene::{Primitive, Scene, SceneError, StackCache},
    util::Rgb,
};

/// Per-thread rendering state.
#[derive(Default)]
pub struct Worker {
    bvh_stack_cache: StackCache,
}

impl Worker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Traces one framebuffer row.
    pub fn render_row<P: Primitive>(
        &mut self,
        scene: &Scene<P>,
        camera: &Camera,
        settings: &RenderSettings,
        y: u32,
        row: &mut [Rgb],
    ) -> Result<(), SceneError> {
        for (x, pixel) in row.iter_mut().enumerate() {
            let ray = camera.ray_for_pixel(&ScreenPoint::new(x as u32, y));
            *pixel = super::trace_ray(settings, scene, &ray, 0, &mut self.bvh_stack_cache)?;
        }
        Ok(())
    }
}
