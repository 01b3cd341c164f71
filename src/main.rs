use anyhow::Context;
use clap::Parser;
use digit_segment::error::ErrorResponse;
use digit_segment::{Preset, SegmentOptions, Segmenter};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "digit-segment")]
#[command(about = "Cut handwritten digits out of an image as canonical glyph bitmaps")]
#[command(version)]
pub struct Args {
    /// Image to segment (any format the image crate decodes)
    pub input: PathBuf,

    /// Directory for glyph_NN.png files and annotated.png
    #[arg(long, env = "DIGIT_SEGMENT_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Option profile: default, plain, padded, clustered, separated
    #[arg(long, env = "DIGIT_SEGMENT_PRESET", default_value = "default")]
    pub preset: String,

    /// JSON file with SegmentOptions; replaces the preset
    #[arg(long, env = "DIGIT_SEGMENT_OPTIONS")]
    pub options: Option<PathBuf>,

    /// fixed, automatic or adaptive
    #[arg(long)]
    pub threshold_mode: Option<String>,

    /// Cutoff for fixed threshold mode
    #[arg(long)]
    pub threshold_value: Option<u8>,

    /// dark or light
    #[arg(long)]
    pub ink: Option<String>,

    /// Odd blur kernel side
    #[arg(long)]
    pub blur_kernel_size: Option<u32>,

    #[arg(long, allow_negative_numbers = true)]
    pub padding: Option<i32>,

    #[arg(long)]
    pub distance_threshold: Option<f32>,

    /// none, dilate, erode or both
    #[arg(long)]
    pub morphology: Option<String>,

    /// ink_high or ink_low
    #[arg(long)]
    pub output_polarity: Option<String>,

    #[arg(long)]
    pub canonical_size: Option<u32>,

    /// Also write the source with crop boxes drawn
    #[arg(long)]
    pub annotate: bool,

    /// Worker threads for per-region normalization (rayon default if unset)
    #[arg(long, env = "DIGIT_SEGMENT_THREADS")]
    pub threads: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Parse a CLI word with the same snake_case names the JSON options use
fn parse_enum<T: DeserializeOwned>(field: &str, value: &str) -> anyhow::Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .with_context(|| format!("invalid value {:?} for --{}", value, field.replace('_', "-")))
}

impl Args {
    fn segment_options(&self) -> anyhow::Result<SegmentOptions> {
        let mut options = match &self.options {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read options file {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse options file {}", path.display()))?
            }
            None => Preset::from_str(&self.preset)
                .with_context(|| format!("unknown preset {:?}", self.preset))?
                .options(),
        };

        if let Some(mode) = &self.threshold_mode {
            options.threshold_mode = parse_enum("threshold_mode", mode)?;
        }
        if let Some(value) = self.threshold_value {
            options.threshold_value = Some(value);
        }
        if let Some(ink) = &self.ink {
            options.ink = parse_enum("ink", ink)?;
        }
        if let Some(k) = self.blur_kernel_size {
            options.blur_kernel_size = Some(k);
        }
        if let Some(padding) = self.padding {
            options.padding = padding;
        }
        if let Some(distance) = self.distance_threshold {
            options.distance_threshold = distance;
        }
        if let Some(morphology) = &self.morphology {
            options.morphology = parse_enum("morphology", morphology)?;
        }
        if let Some(polarity) = &self.output_polarity {
            options.output_polarity = parse_enum("output_polarity", polarity)?;
        }
        if let Some(size) = self.canonical_size {
            options.canonical_size = size;
        }
        if self.annotate {
            options.annotate = true;
        }
        Ok(options)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let options = args.segment_options()?;
    let segmenter = match Segmenter::new(options) {
        Ok(segmenter) => segmenter,
        Err(err) => {
            eprintln!("{}", serde_json::to_string(&ErrorResponse::from(&err))?);
            std::process::exit(2);
        }
    };

    tracing::info!(
        "digit-segment v{} processing {}",
        env!("CARGO_PKG_VERSION"),
        args.input.display()
    );
    let image = image::open(&args.input)
        .with_context(|| format!("Failed to load image {}", args.input.display()))?;

    let result = segmenter.segment(&image);

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for (index, glyph) in result.glyphs.iter().enumerate() {
            let path = dir.join(format!("glyph_{:02}.png", index));
            glyph
                .pixels
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        if let Some(annotated) = &result.annotated {
            let path = dir.join("annotated.png");
            annotated
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        tracing::info!("Wrote {} glyphs to {}", result.len(), dir.display());
    }

    println!("{}", serde_json::to_string_pretty(&result.summary())?);
    Ok(())
}
