//! Configuration validation.

use crate::config::types::{ClientConfig, OverlayConfig};
use crate::error::{Error, Result};

/// Validator for client configurations.
#[derive(Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Creates a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Validates a client configuration.
    pub fn validate(&self, config: &ClientConfig) -> Result<()> {
        self.validate_base_url(&config.server.base_url)?;
        self.validate_audio_prefix(&config.server.audio_prefix)?;

        if config.storage.guest_lists_key.trim().is_empty() {
            return Err(Error::ConfigValidation(
                "storage.guest_lists_key".to_string(),
                "Storage key cannot be empty".to_string(),
            ));
        }

        self.validate_overlay(&config.overlay)?;

        if config.playback.poll_interval_ms == 0 {
            return Err(Error::ConfigValidation(
                "playback.poll_interval_ms".to_string(),
                "Poll interval must be positive".to_string(),
            ));
        }

        if config.playback.clip_cache_size == 0 {
            return Err(Error::ConfigValidation(
                "playback.clip_cache_size".to_string(),
                "Clip cache must hold at least one clip".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_base_url(&self, url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::ConfigValidation(
                "server.base_url".to_string(),
                format!("Expected an http(s) URL, got '{}'", url),
            ));
        }
        Ok(())
    }

    fn validate_audio_prefix(&self, prefix: &str) -> Result<()> {
        if !prefix.starts_with('/') || !prefix.ends_with('/') {
            return Err(Error::ConfigValidation(
                "server.audio_prefix".to_string(),
                format!("Audio prefix must start and end with '/', got '{}'", prefix),
            ));
        }
        Ok(())
    }

    fn validate_overlay(&self, overlay: &OverlayConfig) -> Result<()> {
        let fields = [
            ("overlay.width", overlay.width),
            ("overlay.edge_margin", overlay.edge_margin),
            ("overlay.gap", overlay.gap),
            ("overlay.min_space_below", overlay.min_space_below),
            ("overlay.viewport_width", overlay.viewport_width),
            ("overlay.viewport_height", overlay.viewport_height),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::ConfigValidation(
                    name.to_string(),
                    format!("Must be a non-negative number, got {}", value),
                ));
            }
        }
        if overlay.width <= 0.0 {
            return Err(Error::ConfigValidation(
                "overlay.width".to_string(),
                "Width must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
