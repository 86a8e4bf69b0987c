use crate::geometry::{Intersection, Ray, WorldBox, WorldTriangle};

use super::Primitive;

impl Primitive for WorldTriangle {
    fn bounding_box(&self) -> WorldBox {
        WorldTriangle::bounding_box(self)
    }

    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        WorldTriangle::intersect(self, ray)
    }
}

#[cfg(test)]
mod test {
    use assert2::{assert, let_assert};

    use crate::{
        geometry::{Triangle, WorldPoint, WorldVector},
        scene::Scene,
    };

    use super::*;

    fn primitive_hit<P: Primitive>(primitive: &P, ray: &Ray) -> Option<Intersection> {
        primitive.intersect(ray)
    }

    #[test]
    fn triangle_through_trait() {
        let triangle = Triangle::new(
            WorldPoint::new(-1.0, -1.0, -2.0),
            WorldPoint::new(1.0, -1.0, -2.0),
            WorldPoint::new(0.0, 1.0, -2.0),
        );
        let ray = Ray::new(WorldPoint::origin(), WorldVector::new(0.0, 0.0, -1.0));

        assert!(Primitive::bounding_box(&triangle) == triangle.bounding_box());
        let_assert!(Some(hit) = primitive_hit(&triangle, &ray));
        assert!((hit.travel_t - 2.0).abs() < 1e-6);
        assert!(primitive_hit(&triangle, &ray.with_t_max(1.5)).is_none());
    }

    #[test]
    fn nearest_of_stacked_triangles() {
        let triangles = (0..10)
            .map(|i| {
                let z = -3.0 * i as f32 - 1.0;
                Triangle::new(
                    WorldPoint::new(-1.0, -1.0, z),
                    WorldPoint::new(1.0, -1.0, z),
                    WorldPoint::new(0.0, 1.0, z),
                )
            })
            .collect();
        let mut scene = Scene::new(triangles);
        scene.build_bvh().unwrap();

        let ray = Ray::new(WorldPoint::new(0.0, 0.0, 5.0), WorldVector::new(0.0, 0.0, -1.0));
        let_assert!(Ok(Some(hit)) = scene.intersect(&ray));
        assert!((hit.travel_t - 6.0).abs() < 1e-6);
    }
}
