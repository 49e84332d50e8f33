//! # Pixel Service - Async Facade
//!
//! The core is synchronous and CPU-bound. [`PixelService`] runs every call on
//! tokio's blocking thread pool so async callers (a web front end, a batch
//! runner) are never stalled, and optionally bounds each call with a
//! timeout. The core has no cancellation of its own: a timed-out job is
//! detached and its result discarded.

use anyhow::{anyhow, Result};
use log::info;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::common::config::QuantumConfig;
use crate::common::pixels::{ImageSource, PixelMatrix};
use crate::generator::{GenerationReport, LayerGenerator};
use crate::processing::Steganography;
use crate::reconstructor::LayerReconstructor;

/// Output of a generation job.
#[derive(Debug, Clone)]
pub struct Generated {
    pub layers: Vec<PixelMatrix>,
    pub clones: Vec<PixelMatrix>,
    /// Session state after the last generation
    pub report: GenerationReport,
}

impl Generated {
    fn collect(
        mut generator: LayerGenerator,
        layers: Vec<PixelMatrix>,
        clones: usize,
    ) -> Result<Self> {
        let clones = if clones > 0 {
            generator.clone_layers(clones)?
        } else {
            Vec::new()
        };
        Ok(Self {
            layers,
            clones,
            report: generator.report(),
        })
    }
}

/// Runs core operations off the async runtime.
#[derive(Debug, Clone)]
pub struct PixelService {
    timeout: Option<Duration>,
    recommended_limit: usize,
    codec: Steganography,
}

impl PixelService {
    /// Create a service from the loaded configuration.
    ///
    /// # Example
    /// ```ignore
    /// let service = PixelService::new(&QuantumConfig::default());
    /// let generated = service.separate("photo.png".into(), 3, false, 0).await?;
    /// ```
    pub fn new(config: &QuantumConfig) -> Self {
        Self {
            timeout: config.service.timeout(),
            recommended_limit: config.generator.recommended_max_layers,
            codec: Steganography::with_quality(config.steganography.payload_quality),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `job` on the blocking pool, honoring the configured timeout.
    async fn run<T, F>(&self, label: &'static str, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let started = Instant::now();
        let handle = tokio::task::spawn_blocking(job);

        let joined = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, handle)
                .await
                .map_err(|_| anyhow!("{} timed out after {:?}", label, limit))?,
            None => handle.await,
        };
        let result = joined.map_err(|e| anyhow!("{} task panicked: {}", label, e))?;

        info!("⏱️  {} finished in {:?}", label, started.elapsed());
        result
    }

    /// Generate a preview layer of `source` at `intensity`, followed by
    /// `clones` more layers with the same budget.
    pub async fn preview(
        &self,
        source: ImageSource,
        intensity: f64,
        clones: usize,
    ) -> Result<Generated> {
        let limit = self.recommended_limit;
        self.run("preview", move || {
            let mut generator = LayerGenerator::new(source)?.with_recommended_limit(limit);
            let layers = vec![generator.preview(intensity)?];
            Generated::collect(generator, layers, clones)
        })
        .await
    }

    /// Separate `source` into `count` layers that sum back to it, followed by
    /// `clones` decoy layers with the same budget.
    pub async fn separate(
        &self,
        source: ImageSource,
        count: usize,
        ignore_recommend: bool,
        clones: usize,
    ) -> Result<Generated> {
        let limit = self.recommended_limit;
        self.run("separate", move || {
            let mut generator = LayerGenerator::new(source)?.with_recommended_limit(limit);
            let layers = generator.separate(count, ignore_recommend)?;
            Generated::collect(generator, layers, clones)
        })
        .await
    }

    /// Sum `layers` back into one image.
    pub async fn reconstruct(&self, layers: Vec<ImageSource>) -> Result<PixelMatrix> {
        self.run("reconstruct", move || {
            let mut reconstructor = LayerReconstructor::new();
            for layer in layers {
                reconstructor.add_layer(layer)?;
            }
            Ok(reconstructor.reconstruct()?)
        })
        .await
    }

    /// Hide `payload` in `carrier`, writing the carrier to `output`.
    pub async fn encode(
        &self,
        carrier: ImageSource,
        payload: ImageSource,
        output: PathBuf,
    ) -> Result<bool> {
        let codec = self.codec.clone();
        self.run("encode", move || Ok(codec.encode(carrier, payload, output)))
            .await
    }

    /// Extract the payload hidden in `carrier`, writing it to `output`.
    pub async fn decode(&self, carrier: ImageSource, output: PathBuf) -> Result<bool> {
        let codec = self.codec.clone();
        self.run("decode", move || Ok(codec.decode(carrier, output)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn service() -> PixelService {
        PixelService::new(&QuantumConfig::default())
    }

    fn sample(width: u32, height: u32) -> PixelMatrix {
        PixelMatrix::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[tokio::test]
    async fn test_separate_then_reconstruct() {
        let source = sample(24, 18);
        let service = service();

        let generated = service
            .separate(ImageSource::Matrix(source.clone()), 4, false, 2)
            .await
            .unwrap();
        assert_eq!(generated.layers.len(), 4);
        assert_eq!(generated.clones.len(), 2);
        assert_eq!(generated.report.width, 24);

        let sources = generated.layers.into_iter().map(ImageSource::Matrix).collect();
        let composite = service.reconstruct(sources).await.unwrap();
        assert_eq!(composite, source);
    }

    #[tokio::test]
    async fn test_contract_errors_surface() {
        let service = service();
        assert!(service.preview(ImageSource::Matrix(sample(4, 4)), 1.0, 0).await.is_err());
        assert!(service.reconstruct(Vec::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_preview_with_clones() {
        let generated = service()
            .preview(ImageSource::Matrix(sample(10, 10)), 0.25, 3)
            .await
            .unwrap();
        assert_eq!(generated.layers.len(), 1);
        assert_eq!(generated.clones.len(), 3);
        let budget = generated.report.budget.unwrap();
        for layer in generated.layers.iter().chain(&generated.clones) {
            assert!(crate::common::pixels::channel_sum(layer) <= budget);
        }
    }

    #[tokio::test]
    async fn test_config_limit_applies() {
        let mut config = QuantumConfig::default();
        config.generator.recommended_max_layers = 3;
        let service = PixelService::new(&config);

        let err = service
            .separate(ImageSource::Matrix(sample(8, 8)), 3, false, 0)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("recommended"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let service = service().with_timeout(Some(Duration::from_millis(10)));
        let result = service
            .run("sleep", || {
                std::thread::sleep(Duration::from_millis(300));
                Ok(())
            })
            .await;
        assert!(result.unwrap_err().to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_encode_decode_files() {
        let dir = tempfile::tempdir().unwrap();
        let stego_path = dir.path().join("stego.png");
        let payload_path = dir.path().join("payload.png");
        let service = service();

        let encoded = service
            .encode(
                ImageSource::Matrix(sample(200, 200)),
                ImageSource::Matrix(sample(12, 12)),
                stego_path.clone(),
            )
            .await
            .unwrap();
        assert!(encoded);

        let decoded = service
            .decode(stego_path.into(), payload_path.clone())
            .await
            .unwrap();
        assert!(decoded);
        assert_eq!(image::open(payload_path).unwrap().to_rgb8().dimensions(), (12, 12));
    }
}
