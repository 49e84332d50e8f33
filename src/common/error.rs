use thiserror::Error;

/// Failures of the layer generator and reconstructor.
///
/// Everything except [`LayerError::Image`] is a contract violation by the
/// caller and aborts only the current call.
#[derive(Error, Debug)]
pub enum LayerError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid intensity: {0}. Must be strictly between 0 and 1")]
    InvalidIntensity(f64),

    #[error("Invalid layer count: {0}. Must be greater than 1")]
    TooFewLayers(usize),

    #[error("Too many layers for this image: {count} (must be smaller than {pixels})")]
    TooManyLayers { count: usize, pixels: usize },

    #[error("Too many layers: {count} (recommended below {limit}). Set ignore_recommend to bypass this check")]
    AboveRecommended { count: usize, limit: usize },

    #[error("Budget not set: call preview or separate before clone")]
    BudgetNotSet,

    #[error("All layers must have the same shape: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("No layers to reconstruct")]
    NoLayers,
}

pub type Result<T> = std::result::Result<T, LayerError>;

/// Tagged outcome of the steganographic codec.
///
/// The boolean boundary in [`Steganography`](crate::processing::Steganography)
/// collapses both variants into `false`.
#[derive(Error, Debug)]
pub enum StegoError {
    #[error("Malformed input: {0}")]
    Malformed(String),

    #[error("Capacity exceeded: need {required_bits} bits but only {available_bits} available")]
    CapacityExceeded {
        required_bits: usize,
        available_bits: usize,
    },
}

impl From<image::ImageError> for StegoError {
    fn from(e: image::ImageError) -> Self {
        Self::Malformed(e.to_string())
    }
}

impl From<std::io::Error> for StegoError {
    fn from(e: std::io::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

impl From<Radix85Error> for StegoError {
    fn from(e: Radix85Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

/// Errors from decoding radix-85 text.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Radix85Error {
    #[error("Bad radix-85 character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("Radix-85 overflow in chunk starting at position {position}")]
    Overflow { position: usize },
}
