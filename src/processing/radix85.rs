//! # Radix-85 Text Encoding
//!
//! Maps arbitrary bytes onto the 85-character RFC 1924 alphabet so the
//! compressed payload can travel as plain ASCII text.
//!
//! Each big-endian 32-bit word becomes 5 characters, most significant first.
//! A trailing partial word is zero-padded before encoding and the surplus
//! characters are dropped afterwards, so the output length is
//! `ceil(len × 5 / 4)`. The alphabet contains no `:`.

use crate::common::error::Radix85Error;

const ALPHABET: &[u8; 85] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!#$%&()*+-;<=>?@^_`{|}~";

const PAD_CHAR: u8 = b'~';

fn digit(byte: u8) -> Option<u32> {
    ALPHABET.iter().position(|&c| c == byte).map(|p| p as u32)
}

/// Encode bytes as radix-85 text.
pub fn encode(data: &[u8]) -> String {
    let padding = (4 - data.len() % 4) % 4;
    let mut out = Vec::with_capacity((data.len() + padding) / 4 * 5);

    for chunk in data.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        let mut value = u32::from_be_bytes(word);

        let mut digits = [0u8; 5];
        for slot in digits.iter_mut().rev() {
            *slot = ALPHABET[(value % 85) as usize];
            value /= 85;
        }
        out.extend_from_slice(&digits);
    }

    out.truncate(out.len() - padding);
    // Every byte comes from ALPHABET, which is ASCII.
    out.into_iter().map(char::from).collect()
}

/// Decode radix-85 text back into bytes.
///
/// # Errors
/// - [`Radix85Error::InvalidCharacter`] for characters outside the alphabet
/// - [`Radix85Error::Overflow`] when a 5-character chunk exceeds `u32::MAX`
pub fn decode(text: &str) -> Result<Vec<u8>, Radix85Error> {
    let bytes = text.as_bytes();
    let padding = (5 - bytes.len() % 5) % 5;
    let mut out = Vec::with_capacity((bytes.len() + padding) / 5 * 4);

    for (index, chunk) in bytes.chunks(5).enumerate() {
        let start = index * 5;
        let mut value: u64 = 0;
        for offset in 0..5 {
            let byte = chunk.get(offset).copied().unwrap_or(PAD_CHAR);
            let d = digit(byte).ok_or_else(|| Radix85Error::InvalidCharacter {
                character: text[start + offset..].chars().next().unwrap_or(char::from(byte)),
                position: start + offset,
            })?;
            value = value * 85 + u64::from(d);
        }
        let word = u32::try_from(value).map_err(|_| Radix85Error::Overflow { position: start })?;
        out.extend_from_slice(&word.to_be_bytes());
    }

    out.truncate(out.len() - padding);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(encode(b""), "");
        assert_eq!(encode(b"\x00\x00\x00\x00"), "00000");
        assert_eq!(encode(b"\xff\xff\xff\xff"), "|NsC0");
        assert_eq!(encode(b"hello"), "Xk~0{Zv");
    }

    #[test]
    fn test_decode_known_vectors() {
        assert_eq!(decode("Xk~0{Zv").unwrap(), b"hello");
        assert_eq!(decode("|NsC0").unwrap(), b"\xff\xff\xff\xff");
        assert_eq!(decode("").unwrap(), b"");
    }

    #[test]
    fn test_every_tail_length() {
        let data: Vec<u8> = (0..=255u8).rev().collect();
        for len in 0..12 {
            let text = encode(&data[..len]);
            assert_eq!(text.len(), (len * 5 + 3) / 4);
            assert_eq!(decode(&text).unwrap(), &data[..len]);
        }
    }

    #[test]
    fn test_alphabet_has_no_separator() {
        assert!(!ALPHABET.contains(&b':'));
        assert!(ALPHABET.iter().all(u8::is_ascii_graphic));
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(
            decode("Xk~0\"Zv"),
            Err(Radix85Error::InvalidCharacter { character: '"', position: 4 })
        );
        assert!(matches!(
            decode("00é00"),
            Err(Radix85Error::InvalidCharacter { position: 2, .. })
        ));
    }

    #[test]
    fn test_overflow() {
        assert_eq!(decode("~~~~~"), Err(Radix85Error::Overflow { position: 0 }));
        assert_eq!(decode("00000|NsC1"), Err(Radix85Error::Overflow { position: 5 }));
    }
}
