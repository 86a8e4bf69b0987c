use assert2::assert;
use bon::bon;

use crate::geometry::{FloatType, Ray, ScreenPoint, ScreenSize, WorldPoint, WorldVector};

/// Pinhole camera at a fixed position, looking down the -Z axis with +Y up.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    eye: WorldPoint,

    resolution: ScreenSize,

    /// Half height of the image plane at distance 1
    half_height: FloatType,
    /// Half width of the image plane at distance 1
    half_width: FloatType,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        #[builder(default = WorldPoint::origin())] eye: WorldPoint,
        // Degrees
        #[builder(default = 60.0)]
        vertical_fov: FloatType,
        resolution: ScreenSize,
    ) -> Self {
        assert!(resolution.x > 0);
        assert!(resolution.y > 0);
        assert!(vertical_fov > 0.0 && vertical_fov < 180.0);

        let half_height = (vertical_fov.to_radians() / 2.0).tan();
        let aspect = resolution.x as FloatType / resolution.y as FloatType;

        Camera {
            eye,
            resolution,
            half_height,
            half_width: half_height * aspect,
        }
    }
}

impl Camera {
    pub fn get_resolution(&self) -> ScreenSize {
        self.resolution
    }

    pub fn eye(&self) -> WorldPoint {
        self.eye
    }

    /// Ray from the eye through the center of the given pixel.
    pub fn ray_for_pixel(&self, point: &ScreenPoint) -> Ray {
        let ndc_x = 2.0 * (point.x as FloatType + 0.5) / self.resolution.x as FloatType - 1.0;
        let ndc_y = 1.0 - 2.0 * (point.y as FloatType + 0.5) / self.resolution.y as FloatType;

        let direction = WorldVector::new(ndc_x * self.half_width, ndc_y * self.half_height, -1.0);

        Ray::new(self.eye, direction.normalize())
    }
}
