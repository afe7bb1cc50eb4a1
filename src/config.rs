// Optional `gesture_canvas.toml` next to the binary's working directory.
// Only plumbing is configurable; gesture thresholds, brush sizes and the camera
// device are fixed constants.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "gesture_canvas.toml";

/// Camera device index (0 = default webcam). Not overridable.
pub const CAMERA_INDEX: u32 = 0;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the networked viewer server listens.
    pub bind_addr: String,
    /// JPEG quality (1..=100) for frames sent to viewers.
    pub jpeg_quality: u8,
    /// Pause between networked capture iterations (20 ms ≈ 50 cycles/s).
    pub frame_interval_ms: u64,
    /// Resolution requested from the camera (it may pick the closest one).
    pub capture_width: u32,
    pub capture_height: u32,
    /// Program + args that speak the landmark helper protocol on stdin/stdout.
    pub estimator_command: Vec<String>,
    pub window_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            jpeg_quality: 80,
            frame_interval_ms: 20,
            capture_width: 640,
            capture_height: 480,
            estimator_command: vec!["python3".to_string(), "tools/hand_landmarks.py".to_string()],
            window_title: "Hand Drawing".to_string(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// `gesture_canvas.toml` if present, otherwise the built-in defaults.
    pub fn load_or_default() -> Result<Self> {
        if Path::new(CONFIG_FILE).exists() {
            log::info!("Loading {CONFIG_FILE}");
            Self::load(CONFIG_FILE)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::Config(format!("jpeg_quality must be 1..=100, got {}", self.jpeg_quality)));
        }
        if self.estimator_command.is_empty() {
            return Err(Error::Config("estimator_command must name a program".into()));
        }
        Ok(())
    }
}
