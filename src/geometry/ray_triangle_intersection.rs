use nalgebra::Unit;

use crate::geometry::{EPSILON, Intersection, Ray, WorldTriangle};

impl WorldTriangle {
    /// Calculates ray intersection with the (two sided) triangle.
    /// Rays parallel to the triangle's plane and degenerate triangles never hit.
    /// Adapted from https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm#Rust_implementation
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let [e1, e2] = self.edges();

        let ray_cross_e2 = ray.direction().cross(&e2);
        let det = e1.dot(&ray_cross_e2);
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - self[0];
        let u = inv_det * s.dot(&ray_cross_e2);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let s_cross_e1 = s.cross(&e1);
        let v = inv_det * ray.direction().dot(&s_cross_e1);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * e2.dot(&s_cross_e1);
        if t < 0.0 || t > ray.t_max {
            return None;
        }

        Some(Intersection {
            position: ray.point_at(t),
            normal: Unit::new_normalize(e1.cross(&e2)),
            travel_t: t,
        })
    }
}
