//! Pipeline configuration.
//!
//! Every field has a default, so a JSON file may carry any subset of them.

use std::path::Path;
use std::time::Duration;

use hand_landmarks::Mirror;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be {expected} (got {value})")]
    OutOfRange { field: &'static str, expected: &'static str, value: String },

    #[error("invalid colour {0:?}; expected #rrggbb")]
    Colour(String),

    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },

    #[error("failed to parse {path}: {source}")]
    Parse { path: String, source: serde_json::Error },
}

/// Tunables for the gesture-to-drawing pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Thumb–index distance (normalized units) below which the hand is pinched.
    pub pinch_threshold:  f32,
    /// Refractory period between toggles while drawing.
    pub draw_cooldown_ms: u64,
    /// Refractory period between toggles while dragging the image.
    pub drag_cooldown_ms: u64,
    /// Weight of the windowed trend against the raw sample, 0.0–1.0.
    pub smoothing_factor: f32,
    /// Number of raw points kept in the smoothing window.
    pub point_memory:     usize,
    /// Hands requested from the detector.  Only slot 0 drives the pipeline.
    pub max_hands:        usize,
    pub canvas_width:     usize,
    pub canvas_height:    usize,
    pub mirror:           Mirror,
    /// Brush diameter in pixels.
    pub stroke_width:     f32,
    /// `#rrggbb`
    pub stroke_color:     String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            pinch_threshold:  0.03,
            draw_cooldown_ms: 300,
            drag_cooldown_ms: 600,
            smoothing_factor: 0.4,
            point_memory:     2,
            max_hands:        1,
            canvas_width:     960,
            canvas_height:    540,
            mirror:           Mirror::Horizontal,
            stroke_width:     5.0,
            stroke_color:     "#ff3b6b".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn draw_cooldown(&self) -> Duration { Duration::from_millis(self.draw_cooldown_ms) }

    pub fn drag_cooldown(&self) -> Duration { Duration::from_millis(self.drag_cooldown_ms) }

    /// Stroke colour as packed `0xFFRRGGBB`.
    pub fn stroke_argb(&self) -> Result<u32, ConfigError> { parse_hex_color(&self.stroke_color) }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pinch_threshold.is_finite() && self.pinch_threshold > 0.0) {
            return Err(out_of_range("pinch_threshold", "a positive number", self.pinch_threshold));
        }
        if !(0.0..=1.0).contains(&self.smoothing_factor) {
            return Err(out_of_range("smoothing_factor", "within 0.0–1.0", self.smoothing_factor));
        }
        if self.max_hands == 0 {
            return Err(out_of_range("max_hands", "at least 1", self.max_hands));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(out_of_range(
                "canvas size",
                "non-zero",
                format!("{}x{}", self.canvas_width, self.canvas_height),
            ));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return Err(out_of_range("stroke_width", "a positive number", self.stroke_width));
        }
        self.stroke_argb()?;
        Ok(())
    }

    /// Load from a JSON file and validate.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let cfg: PipelineConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn out_of_range(field: &'static str, expected: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::OutOfRange { field, expected, value: value.to_string() }
}

/// Parse `#rrggbb` (leading `#` optional) into `0xFFRRGGBB`.
pub fn parse_hex_color(s: &str) -> Result<u32, ConfigError> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ConfigError::Colour(s.to_string()));
    }
    let rgb = u32::from_str_radix(hex, 16).map_err(|_| ConfigError::Colour(s.to_string()))?;
    Ok(0xFF00_0000 | rgb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{"pinch_threshold":0.05,"mirror":"none"}"#).unwrap();
        assert_eq!(cfg.pinch_threshold, 0.05);
        assert_eq!(cfg.mirror, Mirror::None);
        assert_eq!(cfg.point_memory, 2);
        assert_eq!(cfg.draw_cooldown(), Duration::from_millis(300));
    }

    #[test]
    fn rejects_bad_smoothing_factor() {
        let cfg = PipelineConfig { smoothing_factor: 1.5, ..PipelineConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange { field: "smoothing_factor", .. })));
    }

    #[test]
    fn rejects_zero_canvas() {
        let cfg = PipelineConfig { canvas_width: 0, ..PipelineConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn hex_colours() {
        assert_eq!(parse_hex_color("#ff3b6b").unwrap(), 0xFFFF3B6B);
        assert_eq!(parse_hex_color("00ff00").unwrap(),  0xFF00FF00);
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gggggg").is_err());
        assert!(parse_hex_color("#+fffff").is_err());
        assert!(parse_hex_color("-fffff").is_err());
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = PipelineConfig::from_json_file("/nonexistent/pinch_ink.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
