//! # Image Processing and Steganography
//!
//! Hides one image inside another: lossy compression, radix-85 text
//! encoding, then LSB (Least Significant Bit) embedding.

pub mod lsb;
pub mod radix85;
pub mod steganography;

// Re-export main functions for convenience
pub use steganography::{
    capacity_bits, decode_image, encode_image, required_bits, Steganography,
};
