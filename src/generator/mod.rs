//! # Layer Generation
//!
//! Randomly distributes a budget of value-units across pixel locations,
//! producing layers that each reveal only part of the source image.
//!
//! - [`allocation`]: the budgeted sampling-without-replacement walk
//! - [`generator`]: the [`LayerGenerator`] session (preview / separate / clone)

pub mod allocation;
pub mod generator;

pub use generator::{GenerationReport, LayerGenerator, RECOMMENDED_MAX_LAYERS};
