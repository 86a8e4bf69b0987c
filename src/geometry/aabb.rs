use std::ops::Sub;

use crate::geometry::{FloatType, WorldBox, WorldPoint, WorldVector};

#[derive(Clone, Debug, PartialEq)]
pub struct AABB<Point> {
    pub min: Point,
    pub max: Point,
}

impl<Point> AABB<Point> {
    pub fn new(min: Point, max: Point) -> AABB<Point> {
        AABB { min, max }
    }
}

impl<Point: Sub + Copy> AABB<Point> {
    pub fn size(&self) -> Point::Output {
        self.max - self.min
    }
}

/// The empty box, neutral element of `union`.
impl Default for WorldBox {
    fn default() -> Self {
        AABB {
            min: WorldPoint::from(WorldVector::repeat(FloatType::INFINITY)),
            max: WorldPoint::from(WorldVector::repeat(FloatType::NEG_INFINITY)),
        }
    }
}

impl WorldBox {
    /// Smallest box containing both boxes
    pub fn union(&self, other: &WorldBox) -> WorldBox {
        AABB {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Smallest box containing all the points, or None if the iterator is empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a WorldPoint>) -> Option<WorldBox> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(AABB::new(*first, *first), |acc, p| AABB {
            min: acc.min.inf(p),
            max: acc.max.sup(p),
        }))
    }

    pub fn is_empty(&self) -> bool {
        self.min.iter().zip(self.max.iter()).any(|(min, max)| min > max)
    }

    pub fn center(&self) -> WorldPoint {
        nalgebra::center(&self.min, &self.max)
    }

    /// Index of the axis along which the box is the longest
    pub fn largest_axis(&self) -> usize {
        self.size().imax()
    }

    /// Returns true if the other box lies completely inside this one (touching allowed)
    pub fn contains_box(&self, other: &WorldBox) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.min[axis] && other.max[axis] <= self.max[axis])
    }
}
