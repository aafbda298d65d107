use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};
use ridgeflow::{
    Fingerprint, GaborParams, Image, RenderConfig, Rgb8, RidgeWidth, ScaleConfig, ScaleEstimate,
    build_fingerprint, convolve, read_ppm, save_svg, select_scale, sobel_gradients,
    sobel_size_for, to_grayscale, write_ppm,
};
use serde::Serialize;

/// Frequency used for enhancement when no ridge period could be measured.
const DEFAULT_GABOR_FREQUENCY: f32 = 0.1;

#[derive(Parser, Debug)]
#[command(name = "ridgeflow")]
#[command(about = "Extract the ridge orientation field of a fingerprint-like image")]
struct Cli {
    /// Input image (.ppm, or any format the image crate decodes).
    input: PathBuf,
    /// Prefix of every output file.
    #[arg(default_value = "fingerprint")]
    output_prefix: String,
    /// Block size in pixels; chosen from the ridge spacing when omitted.
    #[arg(long)]
    block_size: Option<usize>,
    /// Blocks below this coherence are not drawn.
    #[arg(long, default_value_t = 0.2)]
    min_coherence: f32,
    /// Cell size of one block in the SVG.
    #[arg(long, default_value_t = 20)]
    spacing: usize,
    /// Also write `<prefix>.json` with the field and scale estimate.
    #[arg(long)]
    json: bool,
    /// Also write `<prefix>_gabor.ppm`, a Gabor-filtered copy of the input.
    #[arg(long)]
    enhance: bool,
    /// Also write the Sobel gradient images `<prefix>_gx.ppm` and `<prefix>_gy.ppm`.
    #[arg(long)]
    gradients: bool,
}

#[derive(Debug, Clone, Serialize)]
struct RidgeDto {
    bx: usize,
    by: usize,
    angle: f32,
    coherence: f32,
}

#[derive(Debug, Clone, Serialize)]
struct ScaleDto {
    class: &'static str,
    block_size: usize,
    mean_width: Option<f32>,
    valid_samples: usize,
}

#[derive(Debug, Clone, Serialize)]
struct FieldDto {
    source: String,
    image_width: usize,
    image_height: usize,
    width: usize,
    height: usize,
    block_size: usize,
    sobel_size: usize,
    mean_coherence: f32,
    dominant_orientation: Option<f32>,
    scale: Option<ScaleDto>,
    ridges: Vec<RidgeDto>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if cli.spacing == 0 {
        bail!("--spacing must be at least 1");
    }

    let img = load_input(&cli.input)?;
    let gray = to_grayscale(&img.as_view());
    info!(
        "loaded {} ({}x{})",
        cli.input.display(),
        gray.width(),
        gray.height()
    );

    let scale = (cli.block_size.is_none() || cli.enhance)
        .then(|| select_scale(&gray.as_view(), &ScaleConfig::default()))
        .transpose()
        .context("estimating ridge scale")?;
    let block_size = match (cli.block_size, &scale) {
        (Some(b), _) => b,
        (None, Some(est)) => {
            info!(
                "ridge scale {:?} from {} samples, block size {}",
                est.class, est.valid_samples, est.block_size
            );
            est.block_size
        }
        (None, None) => bail!("no block size given and no scale estimate available"),
    };

    let fp = build_fingerprint(&gray.as_view(), block_size)
        .with_context(|| format!("building orientation field with block size {block_size}"))?;

    let svg_path = output_path(&cli.output_prefix, ".svg");
    let render = RenderConfig {
        spacing: cli.spacing,
        min_coherence: cli.min_coherence,
        ..RenderConfig::default()
    };
    save_svg(&svg_path, &fp, &render)
        .with_context(|| format!("writing {}", svg_path.display()))?;
    info!("saved orientation field to {}", svg_path.display());

    if cli.json {
        let path = output_path(&cli.output_prefix, ".json");
        write_json(&path, &field_dto(&cli.input, &gray, &fp, scale.as_ref()))?;
        info!("saved field dump to {}", path.display());
    }

    if cli.gradients {
        write_gradients(&cli.output_prefix, &gray, fp.block_size)?;
    }

    if cli.enhance {
        let est = scale.as_ref().context("scale estimate required for enhancement")?;
        enhance(&cli.output_prefix, &gray, &fp, est)?;
    }

    info!("processing complete");
    Ok(())
}

fn load_input(path: &Path) -> Result<Image<Rgb8>> {
    let is_ppm = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ppm"));
    if is_ppm {
        return read_ppm(path).with_context(|| format!("reading {}", path.display()));
    }

    let rgb = image::open(path)
        .with_context(|| format!("opening input image {}", path.display()))?
        .to_rgb8();
    let (w, h) = rgb.dimensions();
    let data = rgb
        .pixels()
        .map(|p| Rgb8::from_channels(p.0))
        .collect::<Vec<_>>();

    Image::from_vec(w as usize, h as usize, data)
        .with_context(|| format!("constructing image from {}", path.display()))
}

fn write_gradients(prefix: &str, gray: &Image<Rgb8>, block_size: usize) -> Result<()> {
    let size = sobel_size_for(block_size);
    let grads = sobel_gradients(&gray.as_view(), size)
        .with_context(|| format!("computing Sobel {size} gradients"))?;

    for (suffix, img) in [("_gx.ppm", &grads.gx), ("_gy.ppm", &grads.gy)] {
        let path = output_path(prefix, suffix);
        write_ppm(&path, &img.as_view()).with_context(|| format!("writing {}", path.display()))?;
        info!("saved gradient image to {}", path.display());
    }
    Ok(())
}

fn enhance(prefix: &str, gray: &Image<Rgb8>, fp: &Fingerprint, est: &ScaleEstimate) -> Result<()> {
    let Some(ridge_angle) = fp.dominant_orientation() else {
        warn!("no coherent ridges, skipping enhancement");
        return Ok(());
    };
    let frequency = est.frequency().unwrap_or_else(|| {
        warn!("no ridge period measured, using frequency {DEFAULT_GABOR_FREQUENCY}");
        DEFAULT_GABOR_FREQUENCY
    });

    let params = GaborParams {
        angle: ridge_angle + core::f32::consts::FRAC_PI_2,
        frequency,
        ..GaborParams::default()
    };
    let kernel = params.kernel().context("building Gabor kernel")?;
    let filtered = convolve(&gray.as_view(), &kernel).context("applying Gabor kernel")?;

    let path = output_path(prefix, "_gabor.ppm");
    write_ppm(&path, &filtered.as_view()).with_context(|| format!("writing {}", path.display()))?;
    info!(
        "saved Gabor enhancement (angle {:.3}, frequency {:.4}) to {}",
        params.angle,
        frequency,
        path.display()
    );
    Ok(())
}

fn field_dto(
    source: &Path,
    gray: &Image<Rgb8>,
    fp: &Fingerprint,
    scale: Option<&ScaleEstimate>,
) -> FieldDto {
    FieldDto {
        source: source.display().to_string(),
        image_width: gray.width(),
        image_height: gray.height(),
        width: fp.width,
        height: fp.height,
        block_size: fp.block_size,
        sobel_size: sobel_size_for(fp.block_size),
        mean_coherence: fp.mean_coherence(),
        dominant_orientation: fp.dominant_orientation(),
        scale: scale.map(|s| ScaleDto {
            class: match s.class {
                RidgeWidth::Narrow => "narrow",
                RidgeWidth::Medium => "medium",
                RidgeWidth::Wide => "wide",
            },
            block_size: s.block_size,
            mean_width: s.mean_width,
            valid_samples: s.valid_samples,
        }),
        ridges: fp
            .iter()
            .map(|(bx, by, r)| RidgeDto {
                bx,
                by,
                angle: r.angle,
                coherence: r.coherence,
            })
            .collect(),
    }
}

fn output_path(prefix: &str, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{prefix}{suffix}"))
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(path, bytes).with_context(|| format!("writing json {}", path.display()))
}
