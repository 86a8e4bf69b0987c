use std::{io, num::NonZeroUsize, path::PathBuf};

use anyhow::Context as _;
use clap::Parser;
use indicatif::ProgressBar;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mirrortrace::{
    Camera, Framebuffer, RenderSettings, Renderer, Rgb, Scene,
    geometry::{ScreenSize, WorldPoint},
    scene::{BvhSettings, obj::load_obj},
};

#[derive(Debug, Parser)]
#[command(about = "Render an OBJ mesh as a hall of mirrors")]
struct Args {
    /// Mesh to render, in Wavefront OBJ format
    #[arg(long)]
    obj: PathBuf,

    /// Output image, format is given by the extension
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 60.0)]
    fov: f32,

    /// Camera position, the camera always looks towards -Z
    #[arg(long, num_args = 3, default_values_t = [0.0, 0.0, 5.0])]
    eye: Vec<f32>,

    #[arg(long, default_value_t = 3)]
    max_depth: u32,

    #[arg(long, default_value_t = 4)]
    leaf_size: usize,

    /// Render on the calling thread only
    #[arg(long)]
    sequential: bool,

    /// Dump the BVH structure to stdout after building it
    #[arg(long)]
    print_tree: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let triangles =
        load_obj(&args.obj).with_context(|| format!("Loading {}", args.obj.display()))?;
    info!(triangles = triangles.len(), "Mesh loaded");

    let bvh_settings = BvhSettings {
        leaf_size: NonZeroUsize::new(args.leaf_size).context("Leaf size must be positive")?,
    };
    let mut scene = Scene::with_settings(triangles, bvh_settings);
    scene.build_bvh()?;

    let bvh = scene.bvh()?;
    info!("BVH statistics:\n{}", bvh.statistics());
    if args.print_tree {
        bvh.print_tree(&mut io::stdout().lock())?;
    }

    anyhow::ensure!(args.width > 0 && args.height > 0, "Resolution must be non-zero");
    anyhow::ensure!(args.fov > 0.0 && args.fov < 180.0, "Field of view must be in (0, 180)");
    let camera = Camera::builder()
        .eye(WorldPoint::new(args.eye[0], args.eye[1], args.eye[2]))
        .vertical_fov(args.fov)
        .resolution(ScreenSize::new(args.width, args.height))
        .build();
    let settings = RenderSettings::builder().max_depth(args.max_depth).build();

    let mut renderer = Renderer::new(camera, settings);
    if args.sequential {
        renderer.render(&scene)?;
    } else {
        let bar = ProgressBar::new(args.height as u64);
        renderer.render_parallel(&scene, |progress| {
            bar.set_length(progress.total as u64);
            bar.set_position(progress.finished as u64);
        })?;
        bar.finish();
    }

    to_image(renderer.framebuffer())
        .save(&args.output)
        .with_context(|| format!("Saving {}", args.output.display()))?;
    info!(path = %args.output.display(), "Image saved");

    Ok(())
}

fn to_image(framebuffer: &Framebuffer) -> image::RgbImage {
    image::RgbImage::from_fn(framebuffer.width(), framebuffer.height(), |x, y| {
        color_to_image(framebuffer.pixel([x, y].into()))
    })
}

/// Maps a linear f32 rgb pixel to sRGB-ish 8 bit pixel compatible with module image.
fn color_to_image(color: Rgb) -> image::Rgb<u8> {
    let encode = |x: f32| (x.clamp(0.0, 1.0).powf(1.0 / 2.2) * 255.0).round() as u8;
    image::Rgb([encode(color.r), encode(color.g), encode(color.b)])
}
