//! # Quantum Pixel CLI
//!
//! Thin wrapper around [`PixelService`] for working with image files.
//!
//! ## Usage
//!
//! ```bash
//! qpixel preview --input photo.png --intensity 0.5 --output preview.png
//! qpixel separate --input photo.png --layers 3 --out-dir layers/ --report layers/report.json
//! qpixel reconstruct --output restored.png layers/layer_0.png layers/layer_1.png layers/layer_2.png
//! qpixel encode --carrier cat.png --payload photo.png --output hidden.png
//! qpixel decode --input hidden.png --output recovered.png
//! ```
//!
//! Settings come from an optional TOML file passed with `--config`.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::{info, LevelFilter};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use quantum_pixel::common::config::load_config;
use quantum_pixel::{ImageSource, PixelMatrix, PixelService, QuantumConfig};

/// Command-line arguments for the qpixel binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a single preview layer
    Preview {
        #[arg(short, long)]
        input: PathBuf,
        /// Share of the image's total value to place in the layer (0-1, exclusive)
        #[arg(long)]
        intensity: f64,
        #[arg(short, long)]
        output: PathBuf,
        /// Extra layers generated with the same budget, written next to the output
        #[arg(long, default_value_t = 0)]
        clones: usize,
    },
    /// Split an image into layers that sum back to it
    Separate {
        #[arg(short, long)]
        input: PathBuf,
        /// Number of layers (more than 1)
        #[arg(short, long)]
        layers: usize,
        /// Allow layer counts at or above the recommended limit
        #[arg(long)]
        ignore_recommend: bool,
        #[arg(long)]
        out_dir: PathBuf,
        /// Decoy layers generated with the same budget
        #[arg(long, default_value_t = 0)]
        clones: usize,
        /// Write a JSON summary of the generation session
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Sum layers back into one image
    Reconstruct {
        #[arg(short, long)]
        output: PathBuf,
        /// Layer images, all with the same dimensions
        #[arg(required = true)]
        layers: Vec<PathBuf>,
    },
    /// Hide a payload image inside a carrier image
    Encode {
        #[arg(long)]
        carrier: PathBuf,
        #[arg(long)]
        payload: PathBuf,
        /// Output carrier, always written as PNG
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Recover a payload image hidden by `encode`
    Decode {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Initialize the logging system with timestamp, level, and message formatting.
///
/// Format: `[HH:MM:SS] [LEVEL] message`
fn init_logger(verbose: bool) {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();
}

/// Save a batch of layers as `<dir>/<prefix>_<index>.png`.
fn save_all(layers: &[PixelMatrix], dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(layers.len());
    for (index, layer) in layers.iter().enumerate() {
        let path = dir.join(format!("{}_{}.png", prefix, index));
        layer.save(&path)?;
        paths.push(path);
    }
    Ok(paths)
}

/// `<dir>/<stem>_clone_<index>.png` siblings of `output`.
fn clone_target(output: &Path) -> (PathBuf, String) {
    let dir = output
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "layer".to_string());
    (dir, format!("{}_clone", stem))
}

/// Turn a codec's boolean outcome into an error so the process exits non-zero.
fn require(succeeded: bool, message: &str) -> Result<()> {
    if !succeeded {
        bail!("{}", message);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    let config: QuantumConfig = match &args.config {
        Some(path) => load_config(path)?,
        None => QuantumConfig::default(),
    };
    let service = PixelService::new(&config);

    match args.command {
        Command::Preview {
            input,
            intensity,
            output,
            clones,
        } => {
            let generated = service
                .preview(ImageSource::Path(input), intensity, clones)
                .await?;
            if let Some(layer) = generated.layers.first() {
                layer.save(&output)?;
            }
            info!("🖼️  Preview saved to {}", output.display());

            if !generated.clones.is_empty() {
                let (dir, prefix) = clone_target(&output);
                let paths = save_all(&generated.clones, &dir, &prefix)?;
                info!("🧬 Saved {} clones to {}", paths.len(), dir.display());
            }
        }
        Command::Separate {
            input,
            layers,
            ignore_recommend,
            out_dir,
            clones,
            report,
        } => {
            fs::create_dir_all(&out_dir)?;
            let generated = service
                .separate(ImageSource::Path(input), layers, ignore_recommend, clones)
                .await?;

            let paths = save_all(&generated.layers, &out_dir, "layer")?;
            info!("✂️  Saved {} layers to {}", paths.len(), out_dir.display());
            let clone_paths = save_all(&generated.clones, &out_dir, "clone")?;
            if !clone_paths.is_empty() {
                info!("🧬 Saved {} clones to {}", clone_paths.len(), out_dir.display());
            }

            if let Some(report_path) = report {
                fs::write(&report_path, serde_json::to_string_pretty(&generated.report)?)?;
                info!("📊 Report written to {}", report_path.display());
            }
        }
        Command::Reconstruct { output, layers } => {
            let count = layers.len();
            let sources = layers.into_iter().map(ImageSource::Path).collect();
            let composite = service.reconstruct(sources).await?;
            composite.save(&output)?;
            info!("🧩 Reconstructed {} layers into {}", count, output.display());
        }
        Command::Encode {
            carrier,
            payload,
            output,
        } => {
            let encoded = service
                .encode(ImageSource::Path(carrier), ImageSource::Path(payload), output.clone())
                .await?;
            require(
                encoded,
                "Cannot encode the image within. Try a smaller payload or a larger carrier.",
            )?;
            info!("🔒 Payload hidden in {}", output.display());
        }
        Command::Decode { input, output } => {
            let decoded = service.decode(ImageSource::Path(input), output.clone()).await?;
            require(decoded, "This image cannot be decoded.")?;
            info!("🔓 Payload recovered to {}", output.display());
        }
    }

    Ok(())
}
