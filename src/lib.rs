mod camera;
mod framebuffer;
pub mod geometry;
mod renderer;
pub mod scene;
mod util;

pub use crate::renderer::{RenderError, RenderProgress, RenderSettings, Renderer};
pub use camera::Camera;
pub use framebuffer::Framebuffer;
pub use scene::{Primitive, Scene, SceneError};
pub use util::{Rgb, Stats};
