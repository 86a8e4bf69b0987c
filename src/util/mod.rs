mod stats;

pub use stats::Stats;

pub type Rgb = rgb::RGB<f32>;
