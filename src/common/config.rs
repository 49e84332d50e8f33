//! # Configuration Utilities
//!
//! TOML configuration for the CLI and the async service. Every section is
//! optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [generator]
//! recommended_max_layers = 100
//!
//! [steganography]
//! payload_quality = 80
//!
//! [service]
//! timeout_secs = 0
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use crate::generator::RECOMMENDED_MAX_LAYERS;
use crate::processing::steganography::DEFAULT_PAYLOAD_QUALITY;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: QuantumConfig = load_config("config/qpixel.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantumConfig {
    pub generator: GeneratorConfig,
    pub steganography: SteganographyConfig,
    pub service: ServiceConfig,
}

/// Layer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Layer counts at or above this need `ignore_recommend`
    pub recommended_max_layers: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            recommended_max_layers: RECOMMENDED_MAX_LAYERS,
        }
    }
}

/// Codec settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SteganographyConfig {
    /// JPEG quality (1-100) used to compress the hidden payload
    pub payload_quality: u8,
}

impl Default for SteganographyConfig {
    fn default() -> Self {
        Self {
            payload_quality: DEFAULT_PAYLOAD_QUALITY,
        }
    }
}

/// Worker settings for [`PixelService`](crate::service::PixelService).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Upper bound on a single blocking job, 0 disables the timeout
    pub timeout_secs: u64,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl QuantumConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        load_config(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_sections() {
        let config: QuantumConfig = toml::from_str("").unwrap();
        assert_eq!(config.generator.recommended_max_layers, 100);
        assert_eq!(config.steganography.payload_quality, 80);
        assert_eq!(config.service.timeout(), None);
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[generator]\nrecommended_max_layers = 250\n\n[service]\ntimeout_secs = 5").unwrap();

        let config = QuantumConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.generator.recommended_max_layers, 250);
        assert_eq!(config.steganography.payload_quality, 80);
        assert_eq!(config.service.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_missing_file() {
        assert!(QuantumConfig::from_file("/nonexistent/qpixel.toml").is_err());
    }
}
