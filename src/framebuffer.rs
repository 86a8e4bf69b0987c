use crate::{
    geometry::{ScreenPoint, ScreenSize},
    util::Rgb,
};

/// Row-major buffer of linear RGB pixels.
///
/// Values are unclamped, conversion to any output format is up to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct Framebuffer {
    size: ScreenSize,
    pixels: Vec<Rgb>,
}

impl Framebuffer {
    pub fn new(size: ScreenSize, fill: Rgb) -> Framebuffer {
        Framebuffer {
            size,
            pixels: vec![fill; (size.x as usize) * (size.y as usize)],
        }
    }

    pub fn size(&self) -> ScreenSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.x
    }

    pub fn height(&self) -> u32 {
        self.size.y
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn pixel(&self, point: ScreenPoint) -> Rgb {
        self.pixels[self.offset(point)]
    }

    pub fn pixel_mut(&mut self, point: ScreenPoint) -> &mut Rgb {
        let offset = self.offset(point);
        &mut self.pixels[offset]
    }

    /// Iterates over (y, row pixels), top row first
    pub fn rows_mut(&mut self) -> impl Iterator<Item = (u32, &mut [Rgb])> {
        self.pixels
            .chunks_exact_mut(self.size.x.max(1) as usize)
            .enumerate()
            .map(|(y, row)| (y as u32, row))
    }

    fn offset(&self, point: ScreenPoint) -> usize {
        assert!(point.x < self.size.x && point.y < self.size.y);
        (point.y as usize) * (self.size.x as usize) + (point.x as usize)
    }
}
