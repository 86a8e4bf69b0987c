mod aabb;
mod ray_box_intersection;
mod ray_triangle_intersection;
mod triangle;

pub use aabb::AABB;
pub use ray_box_intersection::RayIntersectionExt;
pub use triangle::Triangle;

use nalgebra::Unit;

pub type FloatType = f32;

/// Tolerance used for degenerate geometry (near-parallel rays, flat slabs).
pub const EPSILON: FloatType = 1e-6;

pub type ScreenPoint = nalgebra::Point2<u32>;
pub type ScreenSize = nalgebra::Vector2<u32>;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;
pub type WorldBox = AABB<WorldPoint>;
pub type WorldTriangle = Triangle<WorldPoint>;

#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Direction of the ray, normalized by whoever constructs the ray
    direction: WorldVector,

    /// Componentwise inverse of the ray direction
    /// Zeros in direction get turned into positive infinity regardless of the sign of the zero
    inv_direction: WorldVector,

    /// Hits further along the ray than this are ignored
    pub t_max: FloatType,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        let inv_direction = direction.map(|x| if x == 0.0 { FloatType::INFINITY } else { 1.0 / x });

        Ray {
            origin,
            direction,
            inv_direction,
            t_max: FloatType::INFINITY,
        }
    }

    pub fn with_t_max(self, t_max: FloatType) -> Ray {
        Ray { t_max, ..self }
    }

    pub fn direction(&self) -> &WorldVector {
        &self.direction
    }

    pub fn inv_direction(&self) -> &WorldVector {
        &self.inv_direction
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction * distance
    }
}

/// Closest hit of a ray with a primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct Intersection {
    pub position: WorldPoint,
    pub normal: Unit<WorldVector>,
    /// Distance along the ray, never negative
    pub travel_t: FloatType,
}

#[cfg(test)]
pub mod test {
    use super::*;
    use proptest::prelude::*;

    /// Helper macro that creates a wrapper arnound a type that implemetns Deref and Arbitary
    macro_rules! arbitrary_wrapper {
        ( $wrapper_name:ident ( $type:ty ) -> $block:block ) => {
            #[derive(Clone, Debug)]
            pub struct $wrapper_name(pub $type);

            impl std::ops::Deref for $wrapper_name {
                type Target = $type;
                fn deref(&self) -> &$type {
                    &self.0
                }
            }

            impl Arbitrary for $wrapper_name {
                type Parameters = ();
                type Strategy = proptest::strategy::BoxedStrategy<Self>;
                fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
                    $block.prop_map(|x| $wrapper_name(x)).boxed()
                }
            }
        };
    }

    fn scene_coordinate() -> BoxedStrategy<FloatType> {
        (-10.0f32..10.0f32).boxed()
    }

    pub fn world_point() -> BoxedStrategy<WorldPoint> {
        (scene_coordinate(), scene_coordinate(), scene_coordinate())
            .prop_map(|coords| WorldPoint::new(coords.0, coords.1, coords.2))
            .boxed()
    }

    pub fn world_triangle() -> BoxedStrategy<WorldTriangle> {
        (world_point(), world_point(), world_point())
            .prop_map(|(a, b, c)| Triangle::new(a, b, c))
            .boxed()
    }

    arbitrary_wrapper! {
        UnitWorldVectorWrapper(WorldVector) -> {
            (-1.0f32..1.0f32, -1.0f32..1.0f32, -1.0f32..1.0f32)
                .prop_filter_map(
                    "vector is zero",
                    |coords| {
                        let vector = WorldVector::new(coords.0, coords.1, coords.2);
                        if vector.norm() < 1e-3 {
                            None
                        } else {
                            Some(vector.normalize())
                        }
                    })
        }
    }

    arbitrary_wrapper! {
        RayWrapper(Ray) -> {
            (
                (-20.0f32..20.0f32, -20.0f32..20.0f32, -20.0f32..20.0f32),
                any::<UnitWorldVectorWrapper>(),
            )
                .prop_map(|(origin, direction)| {
                    Ray::new(WorldPoint::new(origin.0, origin.1, origin.2), direction.0)
                })
        }
    }

    arbitrary_wrapper! {
        TrianglesWrapper(Vec<WorldTriangle>) -> {
            proptest::collection::vec(world_triangle(), 0..64)
        }
    }

    #[test]
    fn zero_direction_components_invert_to_infinity() {
        let ray = Ray::new(WorldPoint::origin(), WorldVector::new(0.0, -0.0, 2.0));
        assert2::assert!(ray.inv_direction().x == FloatType::INFINITY);
        assert2::assert!(ray.inv_direction().y == FloatType::INFINITY);
        assert2::assert!(ray.inv_direction().z == 0.5);
        assert2::assert!(ray.t_max == FloatType::INFINITY);
    }

    #[test]
    fn inverse_direction_follows_direction() {
        let ray = Ray::new(WorldPoint::new(1.0, 2.0, 3.0), WorldVector::new(0.5, -4.0, 0.25))
            .with_t_max(10.0);
        assert2::assert!(*ray.direction() == WorldVector::new(0.5, -4.0, 0.25));
        assert2::assert!(*ray.inv_direction() == WorldVector::new(2.0, -0.25, 4.0));
        assert2::assert!(ray.point_at(2.0) == WorldPoint::new(2.0, -6.0, 3.5));
        assert2::assert!(ray.t_max == 10.0);
    }
}
