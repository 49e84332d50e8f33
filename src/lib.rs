//! # Quantum Pixel
//!
//! Splits an image into random "layers" whose channel values add back up to
//! the original, and hides one image inside another with LSB steganography.
//!
//! ## Modules
//!
//! - [`common`]: shared pixel representation, errors and configuration
//! - [`generator`]: budgeted random layer generation (preview / separate / clone)
//! - [`reconstructor`]: channel-wise summation of layers back into an image
//! - [`processing`]: radix-85 text encoding and the LSB steganographic codec
//! - [`service`]: async facade that runs the blocking core on worker threads

pub mod common;
pub mod generator;
pub mod processing;
pub mod reconstructor;
pub mod service;

pub use common::config::QuantumConfig;
pub use common::error::{LayerError, StegoError};
pub use common::pixels::{ImageSource, PixelMatrix};
pub use generator::{GenerationReport, LayerGenerator};
pub use processing::steganography::Steganography;
pub use reconstructor::LayerReconstructor;
pub use service::{Generated, PixelService};
