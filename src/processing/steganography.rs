//! # Image-in-Image Steganography
//!
//! Hides a whole payload image inside a carrier image.
//!
//! ## Encoding Process
//! 1. Compress the payload to JPEG (lossy, configurable quality)
//! 2. Turn the JPEG bytes into printable text with [`radix85`](super::radix85)
//! 3. Embed the text into the carrier's channel LSBs with [`lsb`](super::lsb)
//! 4. Save the carrier as PNG so the LSBs survive
//!
//! ### Decoding Process
//! 1. Read the framed text back out of the LSBs
//! 2. Radix-85 decode it into JPEG bytes
//! 3. Decode the JPEG and save it to the requested path
//!
//! The decoded payload equals the original after one JPEG round trip, not
//! the pristine pixels.
//!
//! ## Failure reporting
//! The in-memory functions and [`Steganography::encode_to`] /
//! [`Steganography::decode_to`] return a [`StegoError`] that tells malformed
//! input apart from insufficient capacity. [`Steganography::encode`] and
//! [`Steganography::decode`] collapse both into `false`.

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageFormat};
use log::{debug, warn};
use std::fs;
use std::io::Cursor;
use std::path::Path;

use super::{lsb, radix85};
use crate::common::error::StegoError;
use crate::common::pixels::{ImageSource, PixelMatrix};

pub use super::lsb::capacity_bits;

/// JPEG quality used for the hidden payload unless configured otherwise.
pub const DEFAULT_PAYLOAD_QUALITY: u8 = 80;

/// Compress a payload image into JPEG bytes.
///
/// # Errors
/// - [`StegoError::Malformed`] for empty images or encoder failures
pub fn compress_payload(payload: &PixelMatrix, quality: u8) -> Result<Vec<u8>, StegoError> {
    let (width, height) = payload.dimensions();
    if width == 0 || height == 0 {
        return Err(StegoError::Malformed("payload image is empty".to_string()));
    }

    let mut bytes = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
        encoder.encode(payload.as_raw(), width, height, ColorType::Rgb8)?;
    }
    Ok(bytes)
}

/// Decode payload bytes produced by [`compress_payload`].
pub fn decompress_payload(bytes: &[u8]) -> Result<DynamicImage, StegoError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Bits the carrier must provide to hide `payload` at `quality`.
///
/// Lets callers pre-check capacity before calling an encode.
pub fn required_bits(payload: &PixelMatrix, quality: u8) -> Result<usize, StegoError> {
    let text = radix85::encode(&compress_payload(payload, quality)?);
    Ok(lsb::required_bits(&text))
}

/// Embed `payload` into a copy of `carrier`.
///
/// # Errors
/// - [`StegoError::Malformed`] if the payload cannot be compressed
/// - [`StegoError::CapacityExceeded`] if the carrier is too small
pub fn encode_image(
    carrier: &PixelMatrix,
    payload: &PixelMatrix,
    quality: u8,
) -> Result<PixelMatrix, StegoError> {
    let compressed = compress_payload(payload, quality)?;
    let text = radix85::encode(&compressed);
    debug!(
        "Payload compressed to {} bytes, {} characters of text",
        compressed.len(),
        text.len()
    );
    lsb::hide(carrier, &text)
}

/// Recover the payload image hidden in `carrier`.
///
/// # Errors
/// - [`StegoError::Malformed`] if no payload can be extracted or decoded
pub fn decode_image(carrier: &PixelMatrix) -> Result<DynamicImage, StegoError> {
    let text = lsb::reveal(carrier)?;
    let compressed = radix85::decode(&text)?;
    debug!("Extracted {} bytes of payload", compressed.len());
    decompress_payload(&compressed)
}

/// Encode `image` as PNG in memory, then write the finished bytes to `path`.
///
/// A failed write removes whatever part of the file reached the disk.
fn write_png(image: &PixelMatrix, path: &Path) -> Result<(), StegoError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

    if let Err(e) = fs::write(path, &bytes) {
        let _ = fs::remove_file(path);
        return Err(e.into());
    }
    debug!("Wrote {} byte carrier to {}", bytes.len(), path.display());
    Ok(())
}

/// Path-level codec with a boolean convenience boundary.
#[derive(Debug, Clone)]
pub struct Steganography {
    quality: u8,
}

impl Default for Steganography {
    fn default() -> Self {
        Self {
            quality: DEFAULT_PAYLOAD_QUALITY,
        }
    }
}

impl Steganography {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different JPEG quality for the payload (clamped to 1-100).
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Hide `payload` in `carrier` and write the result to `output` as PNG.
    ///
    /// Nothing is written unless embedding succeeds.
    pub fn encode_to(
        &self,
        carrier: impl Into<ImageSource>,
        payload: impl Into<ImageSource>,
        output: impl AsRef<Path>,
    ) -> Result<(), StegoError> {
        let carrier = carrier.into().into_matrix()?;
        let payload = payload.into().into_matrix()?;

        let stego = encode_image(&carrier, &payload, self.quality)?;
        write_png(&stego, output.as_ref())
    }

    /// Extract the payload hidden in `carrier` and write it to `output`.
    ///
    /// The output format follows the path's extension.
    pub fn decode_to(
        &self,
        carrier: impl Into<ImageSource>,
        output: impl AsRef<Path>,
    ) -> Result<(), StegoError> {
        let carrier = carrier.into().into_matrix()?;
        let payload = decode_image(&carrier)?;
        payload.save(output.as_ref())?;
        Ok(())
    }

    /// Boolean form of [`encode_to`](Self::encode_to).
    pub fn encode(
        &self,
        carrier: impl Into<ImageSource>,
        payload: impl Into<ImageSource>,
        output: impl AsRef<Path>,
    ) -> bool {
        match self.encode_to(carrier, payload, output) {
            Ok(()) => true,
            Err(e) => {
                warn!("Cannot encode the image within: {}", e);
                false
            }
        }
    }

    /// Boolean form of [`decode_to`](Self::decode_to).
    pub fn decode(&self, carrier: impl Into<ImageSource>, output: impl AsRef<Path>) -> bool {
        match self.decode_to(carrier, output) {
            Ok(()) => true,
            Err(e) => {
                warn!("This image cannot be decoded: {}", e);
                false
            }
        }
    }
}
