//! # LSB Text Embedding
//!
//! Hides ASCII text in the least significant bit of each R, G, B channel of a
//! carrier image.
//!
//! ## Layout
//!
//! The embedded message is `"<decimal length>:<text>"`. Each byte is written
//! MSB first, one bit per channel, walking channels R → G → B and pixels in
//! raster order (row by row). Reading stops at the first `:` to learn the
//! length, then takes exactly that many bytes.
//!
//! ## Capacity
//!
//! A `width × height` carrier holds `width × height × 3` bits, so an 800x600
//! image carries roughly 180 KB of text including the length header.

use crate::common::error::StegoError;
use crate::common::pixels::PixelMatrix;

const SEPARATOR: u8 = b':';

/// Longest length header we accept while reading (`usize::MAX` has 20 digits).
const MAX_HEADER_DIGITS: usize = 20;

/// Number of bits a carrier can hold.
pub fn capacity_bits(carrier: &PixelMatrix) -> usize {
    carrier.width() as usize * carrier.height() as usize * 3
}

/// Framed message that will actually be written for `text`.
fn frame(text: &str) -> Vec<u8> {
    let mut framed = text.len().to_string().into_bytes();
    framed.push(SEPARATOR);
    framed.extend_from_slice(text.as_bytes());
    framed
}

/// Bits needed to embed `text`, header included.
pub fn required_bits(text: &str) -> usize {
    (text.len().to_string().len() + 1 + text.len()) * 8
}

/// Return a copy of `carrier` with `text` embedded in its LSBs.
///
/// The carrier is left untouched and nothing is written when it is too small.
///
/// # Errors
/// - [`StegoError::CapacityExceeded`] if the framed text does not fit
pub fn hide(carrier: &PixelMatrix, text: &str) -> Result<PixelMatrix, StegoError> {
    let data = frame(text);
    let required_bits = data.len() * 8;
    let available_bits = capacity_bits(carrier);

    if required_bits > available_bits {
        return Err(StegoError::CapacityExceeded {
            required_bits,
            available_bits,
        });
    }

    let bits = data
        .iter()
        .flat_map(|&byte| (0..8u32).rev().map(move |shift| (byte >> shift) & 1));

    // The raw buffer is already R, G, B per pixel in raster order.
    let mut stego = carrier.clone();
    for (channel, bit) in stego.iter_mut().zip(bits) {
        *channel = (*channel & 0xFE) | bit;
    }

    Ok(stego)
}

/// Bytes assembled from consecutive channel LSBs.
fn lsb_bytes(carrier: &PixelMatrix) -> impl Iterator<Item = u8> + '_ {
    carrier
        .as_raw()
        .chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, channel| (acc << 1) | (channel & 1)))
}

/// Read text previously embedded with [`hide`].
///
/// # Errors
/// - [`StegoError::Malformed`] if no valid length header is found, the
///   announced length runs past the carrier, or the text is not UTF-8
pub fn reveal(carrier: &PixelMatrix) -> Result<String, StegoError> {
    let mut bytes = lsb_bytes(carrier);

    let mut header = String::new();
    loop {
        let byte = bytes
            .next()
            .ok_or_else(|| StegoError::Malformed("no length header found".to_string()))?;
        if byte == SEPARATOR {
            break;
        }
        if !byte.is_ascii_digit() || header.len() >= MAX_HEADER_DIGITS {
            return Err(StegoError::Malformed("no length header found".to_string()));
        }
        header.push(char::from(byte));
    }

    let length: usize = header
        .parse()
        .map_err(|_| StegoError::Malformed(format!("invalid length header {:?}", header)))?;

    let text: Vec<u8> = bytes.take(length).collect();
    if text.len() < length {
        return Err(StegoError::Malformed(format!(
            "announced {} bytes but carrier holds only {}",
            length,
            text.len()
        )));
    }

    String::from_utf8(text).map_err(|e| StegoError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_hide_and_reveal() {
        let carrier = PixelMatrix::from_pixel(10, 10, Rgb([123, 45, 200]));
        let stego = hide(&carrier, "Secret message").unwrap();
        assert_eq!(reveal(&stego).unwrap(), "Secret message");
    }

    #[test]
    fn test_only_lsbs_change() {
        let carrier = PixelMatrix::from_fn(8, 8, |x, y| Rgb([(x * 30) as u8, (y * 30) as u8, 77]));
        let stego = hide(&carrier, "abc").unwrap();
        for (before, after) in carrier.as_raw().iter().zip(stego.as_raw()) {
            assert_eq!(before & 0xFE, after & 0xFE);
        }
    }

    #[test]
    fn test_bit_layout() {
        // "1:A" = 0x31 0x3A 0x41, MSB first into R, G, B, R, ...
        let stego = hide(&PixelMatrix::new(8, 1), "A").unwrap();
        let bits: Vec<u8> = stego.as_raw()[..8].to_vec();
        assert_eq!(bits, vec![0, 0, 1, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_capacity_boundary() {
        // "3:abc" is 5 bytes = 40 bits; 14 pixels give 42 bits, 13 give 39.
        assert_eq!(required_bits("abc"), 40);
        assert!(hide(&PixelMatrix::new(14, 1), "abc").is_ok());
        assert!(matches!(
            hide(&PixelMatrix::new(13, 1), "abc"),
            Err(StegoError::CapacityExceeded { required_bits: 40, available_bits: 39 })
        ));
    }

    #[test]
    fn test_empty_text() {
        let stego = hide(&PixelMatrix::new(3, 2), "").unwrap();
        assert_eq!(reveal(&stego).unwrap(), "");
    }

    #[test]
    fn test_reveal_without_header() {
        let carrier = PixelMatrix::from_pixel(10, 10, Rgb([255, 255, 255]));
        assert!(matches!(reveal(&carrier), Err(StegoError::Malformed(_))));
    }

    #[test]
    fn test_reveal_truncated_text() {
        let stego = hide(&PixelMatrix::new(20, 20), "123456789").unwrap();
        // Keep the header, cut the carrier short.
        let cropped = image::imageops::crop_imm(&stego, 0, 0, 20, 1).to_image();
        assert!(matches!(reveal(&cropped), Err(StegoError::Malformed(_))));
    }
}
