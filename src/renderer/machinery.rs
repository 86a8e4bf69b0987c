use std::{
    panic,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::Instant,
};

use tracing::{debug, info};

use crate::{
    renderer::{RenderError, Renderer, worker::Worker},
    scene::{Primitive, Scene},
    util::Rgb,
};

/// Number of finished and total rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderProgress {
    pub finished: usize,
    pub total: usize,
}

impl RenderProgress {
    pub fn percent(&self) -> f32 {
        100.0 * (self.finished as f32) / (self.total as f32)
    }
}

impl Renderer {
    /// Renders the image on all available cores.
    ///
    /// Rows are dealt out to the workers round robin. The result is the same as from
    /// `render`, pixel for pixel. `progress` is called from the worker threads after
    /// every finished row.
    pub fn render_parallel<P, F>(&mut self, scene: &Scene<P>, progress: F) -> Result<(), RenderError>
    where
        P: Primitive + Sync,
        F: Fn(RenderProgress) + Sync,
    {
        scene.bvh()?;

        let start = Instant::now();
        let total = self.framebuffer.height() as usize;

        let cores = core_affinity::get_core_ids().unwrap_or_default();
        let worker_count = if cores.is_empty() {
            num_cpus::get()
        } else {
            cores.len()
        }
        .clamp(1, total.max(1));
        debug!(worker_count, "Starting render workers");

        let mut assignments: Vec<Vec<(u32, &mut [Rgb])>> =
            (0..worker_count).map(|_| Vec::new()).collect();
        for (y, row) in self.framebuffer.rows_mut() {
            assignments[y as usize % worker_count].push((y, row));
        }

        let camera = &self.camera;
        let settings = &self.settings;
        let finished = AtomicUsize::new(0);
        let finished = &finished;
        let progress = &progress;

        thread::scope(|s| -> Result<(), RenderError> {
            let handles = assignments
                .into_iter()
                .enumerate()
                .map(|(worker_id, rows)| {
                    let core = cores.get(worker_id).copied();
                    thread::Builder::new()
                        .name(format!("worker{worker_id}"))
                        .spawn_scoped(s, move || -> Result<(), RenderError> {
                            if let Some(core) = core {
                                core_affinity::set_for_current(core);
                            }

                            let mut worker = Worker::new();
                            for (y, row) in rows {
                                worker.render_row(scene, camera, settings, y, row)?;
                                let finished = finished.fetch_add(1, Ordering::AcqRel) + 1;
                                progress(RenderProgress { finished, total });
                            }
                            Ok(())
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            for handle in handles {
                handle
                    .join()
                    .unwrap_or_else(|payload| panic::resume_unwind(payload))?;
            }
            Ok(())
        })?;

        info!(
            width = self.framebuffer.width(),
            height = self.framebuffer.height(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Parallel render finished"
        );

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use assert2::{assert, let_assert};

    use crate::{
        camera::Camera,
        geometry::{ScreenSize, Triangle, WorldPoint, WorldTriangle},
        renderer::{RenderError, RenderSettings, Renderer},
        scene::{Scene, SceneError},
    };

    use super::RenderProgress;

    /// Tilted triangles around the view axis, so that some rays bounce between them.
    fn test_scene() -> Scene<WorldTriangle> {
        let mut triangles = Vec::new();
        for i in 0..40 {
            let angle = i as f32 * 0.3;
            let (sin, cos) = angle.sin_cos();
            let z = -2.0 - 0.1 * i as f32;
            triangles.push(Triangle::new(
                WorldPoint::new(cos, sin, z),
                WorldPoint::new(-sin, cos, z - 0.5),
                WorldPoint::new(0.3 * cos, -0.3 * sin, z + 0.7),
            ));
        }
        let mut scene = Scene::new(triangles);
        scene.build_bvh().unwrap();
        scene
    }

    #[test]
    fn matches_sequential() {
        let scene = test_scene();
        let camera = Camera::builder()
            .eye(WorldPoint::new(0.0, 0.0, 1.0))
            .resolution(ScreenSize::new(37, 23))
            .build();
        let settings = RenderSettings::builder().max_depth(4).build();

        let mut sequential = Renderer::new(camera, settings);
        sequential.render(&scene).unwrap();

        let mut parallel = Renderer::new(camera, settings);
        parallel.render_parallel(&scene, |_| {}).unwrap();

        assert!(sequential.framebuffer() == parallel.framebuffer());
        assert!(
            sequential
                .framebuffer()
                .pixels()
                .iter()
                .any(|p| *p != settings.background)
        );
    }

    #[test]
    fn reports_every_row() {
        let scene = test_scene();
        let camera = Camera::builder().resolution(ScreenSize::new(5, 17)).build();
        let mut renderer = Renderer::new(camera, RenderSettings::default());

        let reports = Mutex::new(Vec::new());
        renderer
            .render_parallel(&scene, |p| reports.lock().unwrap().push(p))
            .unwrap();

        let mut reports = reports.into_inner().unwrap();
        reports.sort_by_key(|p| p.finished);
        assert!(reports.len() == 17);
        assert!(reports.iter().all(|p| p.total == 17));
        assert!(reports.last() == Some(&RenderProgress { finished: 17, total: 17 }));
        assert!(reports.last().unwrap().percent() == 100.0);
    }

    #[test]
    fn unbuilt_scene_fails() {
        let scene = Scene::new(Vec::<WorldTriangle>::new());
        let camera = Camera::builder().resolution(ScreenSize::new(5, 5)).build();
        let mut renderer = Renderer::new(camera, RenderSettings::default());

        let_assert!(
            Err(RenderError::Scene(SceneError::BvhNotBuilt)) =
                renderer.render_parallel(&scene, |_| {})
        );
    }
}
