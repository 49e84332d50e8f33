//! # Layer Reconstruction
//!
//! Collects same-shaped layers and sums them channel by channel back into a
//! composite image. Layers from [`LayerGenerator::separate`] never overflow;
//! the final clip to `0..=255` only matters for layers from other sources.
//!
//! [`LayerGenerator::separate`]: crate::generator::LayerGenerator::separate

use log::debug;

use crate::common::error::{LayerError, Result};
use crate::common::pixels::{shape, ImageSource, PixelMatrix};

/// Ordered collection of layers awaiting reconstruction.
#[derive(Debug, Default)]
pub struct LayerReconstructor {
    layers: Vec<PixelMatrix>,
}

impl LayerReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer given as a path, a decoded image or a raw matrix.
    ///
    /// # Errors
    /// - [`LayerError::Image`] if a path cannot be decoded
    /// - [`LayerError::ShapeMismatch`] if the layer's dimensions differ from
    ///   the first layer added
    pub fn add_layer(&mut self, layer: impl Into<ImageSource>) -> Result<()> {
        let layer = layer.into().into_matrix()?;

        if let Some(first) = self.layers.first() {
            let (expected, actual) = (shape(first), shape(&layer));
            if expected != actual {
                return Err(LayerError::ShapeMismatch { expected, actual });
            }
        }

        self.layers.push(layer);
        Ok(())
    }

    pub fn layers(&self) -> &[PixelMatrix] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Sum every added layer channel-wise, clipped to `0..=255`.
    ///
    /// # Errors
    /// - [`LayerError::NoLayers`] if nothing has been added
    pub fn reconstruct(&self) -> Result<PixelMatrix> {
        let first = self.layers.first().ok_or(LayerError::NoLayers)?;
        let (width, height) = first.dimensions();

        let mut summed = vec![0u32; first.as_raw().len()];
        for layer in &self.layers {
            for (acc, value) in summed.iter_mut().zip(layer.as_raw()) {
                *acc += u32::from(*value);
            }
        }

        let clipped = summed.iter().filter(|&&v| v > 255).count();
        if clipped > 0 {
            debug!("Clipped {} channel values above 255", clipped);
        }

        let mut composite = PixelMatrix::new(width, height);
        for (slot, value) in composite.iter_mut().zip(summed) {
            *slot = value.min(255) as u8;
        }
        Ok(composite)
    }
}
