//! # Layer Generator Session
//!
//! A [`LayerGenerator`] owns one source image plus the mutable state of the
//! current generation request: the Budget (total value-units a single layer
//! may receive) and the Remaining-Budget left by the last generation.
//!
//! ## Operations
//!
//! - [`preview`](LayerGenerator::preview): one layer holding `intensity` of the
//!   image's total value, source untouched
//! - [`separate`](LayerGenerator::separate): `n` layers that sum back to the
//!   source exactly
//! - [`clone_layers`](LayerGenerator::clone_layers): more non-mutating layers
//!   reusing the last Budget
//!
//! ## Pre/postconditions
//!
//! - `budget()` is `None` until `preview` or `separate` succeeds
//! - every generation starts with Remaining-Budget equal to the Budget
//! - after a generation, `remaining()` is the unspent part of the Budget
//!
//! Calls on one instance must be serialized by the caller. Independent
//! instances share nothing and can run in parallel.

use log::{debug, error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::allocation::{allocate_layer, Pool};
use crate::common::error::{LayerError, Result};
use crate::common::pixels::{channel_sum, pixel_count, ImageSource, PixelMatrix};

/// Layer counts at or above this need `ignore_recommend`.
pub const RECOMMENDED_MAX_LAYERS: usize = 100;

/// Snapshot of a session, exported as JSON by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub width: u32,
    pub height: u32,
    pub channel_sum: u64,
    pub budget: Option<u64>,
    pub remaining: u64,
    pub progress: Option<u8>,
}

/// Generation session over one source image.
pub struct LayerGenerator<R = StdRng> {
    source: PixelMatrix,
    rng: R,
    budget: Option<u64>,
    remaining: u64,
    recommended_limit: usize,
}

impl LayerGenerator<StdRng> {
    /// Open a session on any supported image input, seeded from OS entropy.
    ///
    /// # Errors
    /// - [`LayerError::Image`] if the image cannot be opened or decoded
    ///
    /// # Example
    /// ```ignore
    /// let mut generator = LayerGenerator::new("photo.png")?;
    /// generator.preview(0.5)?.save("preview.png")?;
    /// ```
    pub fn new(source: impl Into<ImageSource>) -> Result<Self> {
        let source = source.into().into_matrix().map_err(|e| {
            error!("Error opening image: {}", e);
            LayerError::Image(e)
        })?;
        Ok(Self::from_matrix(source))
    }

    pub fn from_matrix(source: PixelMatrix) -> Self {
        Self::with_rng(source, StdRng::from_entropy())
    }
}

impl<R: Rng> LayerGenerator<R> {
    /// Open a session with an injected random source.
    ///
    /// Two sessions built from the same matrix and identically seeded RNGs
    /// produce identical layers for identical call sequences.
    pub fn with_rng(source: PixelMatrix, rng: R) -> Self {
        Self {
            source,
            rng,
            budget: None,
            remaining: 0,
            recommended_limit: RECOMMENDED_MAX_LAYERS,
        }
    }

    /// Override the recommended layer limit enforced by `separate`.
    pub fn with_recommended_limit(mut self, limit: usize) -> Self {
        self.recommended_limit = limit;
        self
    }

    pub fn source(&self) -> &PixelMatrix {
        &self.source
    }

    pub fn budget(&self) -> Option<u64> {
        self.budget
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Percentage of the Budget spent by the last generation.
    ///
    /// `None` until a Budget has been established. A zero Budget reports 100.
    pub fn progress(&self) -> Option<u8> {
        let budget = self.budget?;
        if budget == 0 {
            return Some(100);
        }
        let spent = 1.0 - self.remaining as f64 / budget as f64;
        Some((100.0 * spent) as u8)
    }

    pub fn report(&self) -> GenerationReport {
        GenerationReport {
            width: self.source.width(),
            height: self.source.height(),
            channel_sum: channel_sum(&self.source),
            budget: self.budget,
            remaining: self.remaining,
            progress: self.progress(),
        }
    }

    /// Generate a single layer holding `floor(total × intensity)` value-units.
    ///
    /// The smaller the intensity, the faster and the less recognizable the
    /// layer. The source is not modified.
    ///
    /// # Errors
    /// - [`LayerError::InvalidIntensity`] unless `0 < intensity < 1`
    pub fn preview(&mut self, intensity: f64) -> Result<PixelMatrix> {
        if !(intensity > 0.0 && intensity < 1.0) {
            return Err(LayerError::InvalidIntensity(intensity));
        }

        let budget = (channel_sum(&self.source) as f64 * intensity).floor() as u64;
        self.establish(budget);
        debug!("Preview at intensity {} with budget {}", intensity, budget);

        Ok(self.generate_shared(budget))
    }

    /// Split the source into `count` layers that sum back to it exactly.
    ///
    /// The first `count - 1` layers are generated against a private working
    /// copy that is debited after each draw, each with budget
    /// `floor(total / count)`. The last layer is whatever the working copy
    /// still holds, so the channel-wise sum of all layers equals the source
    /// without clipping.
    ///
    /// # Errors
    /// - [`LayerError::TooFewLayers`] if `count <= 1`
    /// - [`LayerError::TooManyLayers`] if `count` is not below the pixel count
    /// - [`LayerError::AboveRecommended`] if `count` reaches the recommended
    ///   limit and `ignore_recommend` is false
    pub fn separate(&mut self, count: usize, ignore_recommend: bool) -> Result<Vec<PixelMatrix>> {
        let pixels = pixel_count(&self.source);
        if count <= 1 {
            return Err(LayerError::TooFewLayers(count));
        }
        if count >= pixels {
            return Err(LayerError::TooManyLayers { count, pixels });
        }
        if !ignore_recommend && count >= self.recommended_limit {
            return Err(LayerError::AboveRecommended {
                count,
                limit: self.recommended_limit,
            });
        }

        let budget = channel_sum(&self.source) / count as u64;
        self.establish(budget);
        info!("Separating into {} layers with budget {} each", count, budget);

        let mut working = self.source.clone();
        let mut layers = Vec::with_capacity(count);
        for index in 0..count - 1 {
            let allocation = allocate_layer(&mut self.rng, Pool::Debited(&mut working), budget);
            self.remaining = allocation.remaining;
            debug!("Layer {} left {} units unspent", index, allocation.remaining);
            layers.push(allocation.layer);
        }
        layers.push(working);

        Ok(layers)
    }

    /// Generate `count` independent layers against the original source with
    /// the Budget of the last `preview`/`separate`.
    ///
    /// Each clone starts from the full Budget, so repeated calls are not
    /// cumulative.
    ///
    /// # Errors
    /// - [`LayerError::BudgetNotSet`] if no Budget has been established
    pub fn clone_layers(&mut self, count: usize) -> Result<Vec<PixelMatrix>> {
        let budget = self.budget.ok_or(LayerError::BudgetNotSet)?;
        debug!("Cloning {} layers with budget {}", count, budget);

        Ok((0..count).map(|_| self.generate_shared(budget)).collect())
    }

    fn establish(&mut self, budget: u64) {
        self.budget = Some(budget);
        self.remaining = budget;
    }

    fn generate_shared(&mut self, budget: u64) -> PixelMatrix {
        let allocation = allocate_layer(&mut self.rng, Pool::Shared(&self.source), budget);
        self.remaining = allocation.remaining;
        allocation.layer
    }
}
