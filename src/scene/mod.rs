pub mod bvh;
pub mod obj;
pub mod primitives;

use thiserror::Error;
use tracing::info;

use crate::geometry::{Intersection, Ray, WorldBox};

pub use bvh::{Bvh, BvhSettings, StackCache};

/// Anything the BVH can be built over.
pub trait Primitive {
    fn bounding_box(&self) -> WorldBox;
    fn intersect(&self, ray: &Ray) -> Option<Intersection>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("Scene was queried before its BVH was built")]
    BvhNotBuilt,

    #[error("Scene BVH is already built")]
    AlreadyBuilt,
}

/// Primitives together with the BVH over them.
///
/// Building the BVH reorders the primitives, so they are only exposed immutably.
#[derive(Clone, Debug)]
pub struct Scene<P: Primitive> {
    primitives: Vec<P>,
    bvh: Option<Bvh>,
    settings: BvhSettings,
}

impl<P: Primitive> Scene<P> {
    pub fn new(primitives: Vec<P>) -> Self {
        Self::with_settings(primitives, BvhSettings::default())
    }

    pub fn with_settings(primitives: Vec<P>, settings: BvhSettings) -> Self {
        Scene {
            primitives,
            bvh: None,
            settings,
        }
    }

    /// Builds the BVH over the scene's primitives. Can only be done once.
    pub fn build_bvh(&mut self) -> Result<(), SceneError> {
        if self.bvh.is_some() {
            return Err(SceneError::AlreadyBuilt);
        }

        let bvh = Bvh::build(&mut self.primitives, &self.settings);
        info!(
            primitives = self.primitives.len(),
            nodes = bvh.nodes().len(),
            "BVH built"
        );
        self.bvh = Some(bvh);

        Ok(())
    }

    pub fn is_built(&self) -> bool {
        self.bvh.is_some()
    }

    pub fn primitives(&self) -> &[P] {
        &self.primitives
    }

    pub fn bvh(&self) -> Result<&Bvh, SceneError> {
        self.bvh.as_ref().ok_or(SceneError::BvhNotBuilt)
    }

    /// Finds the closest intersection of the ray with the scene.
    pub fn intersect(&self, ray: &Ray) -> Result<Option<Intersection>, SceneError> {
        self.intersect_with_stack(ray, &mut StackCache::default())
    }

    /// Same as `intersect`, but reuses the traversal stack between calls.
    pub fn intersect_with_stack(
        &self,
        ray: &Ray,
        stack: &mut StackCache,
    ) -> Result<Option<Intersection>, SceneError> {
        Ok(self.bvh()?.intersect(&self.primitives, ray, stack))
    }
}
