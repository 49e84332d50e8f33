//! # Common Components
//!
//! Shared utilities and data structures used by the generator, the
//! reconstructor and the steganographic codec.
//!
//! ## Modules
//!
//! - [`pixels`]: the `PixelMatrix` representation and input normalization
//! - [`error`]: typed errors for layer operations and the codec
//! - [`config`]: TOML configuration loading

pub mod config;
pub mod error;
pub mod pixels;
