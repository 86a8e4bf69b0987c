use crate::geometry::{FloatType, Ray, WorldBox};

/// Slack allowed between the entry and exit distances, so that flat boxes
/// (e.g. around an axis aligned triangle) still get hit.
const SLAB_TOLERANCE: FloatType = 1e-4;

pub trait RayIntersectionExt {
    /// Returns true if the ray passes through the box in front of its origin
    fn intersects(&self, ray: &Ray) -> bool;
}

impl RayIntersectionExt for WorldBox {
    /// Slab test. Only used to prune the BVH, so there is no hit distance.
    fn intersects(&self, ray: &Ray) -> bool {
        let mut entry_t = FloatType::NEG_INFINITY;
        let mut exit_t = FloatType::INFINITY;

        for axis in 0..3 {
            let inv_direction = ray.inv_direction()[axis];
            let to_min = (self.min[axis] - ray.origin[axis]) * inv_direction;
            let to_max = (self.max[axis] - ray.origin[axis]) * inv_direction;

            let (near, far) = if inv_direction < 0.0 {
                (to_max, to_min)
            } else {
                (to_min, to_max)
            };

            // The multiplication is NAN if the ray starts on the slab bounding plane
            // and is parallel to it. f32::max and f32::min skip NANs, so such
            // an axis doesn't constrain the range.
            entry_t = entry_t.max(near);
            exit_t = exit_t.min(far);
        }

        entry_t <= exit_t + SLAB_TOLERANCE && exit_t > 0.0
    }
}
