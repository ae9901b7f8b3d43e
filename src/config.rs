//! Runtime settings: defaults, optional JSON file, CLI overrides.
//!
//! Config file priority: `--config` CLI argument → `PAGECAST_CONFIG`
//! environment variable → none (built-in defaults).
//! Explicit CLI flags always win over file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Args;
use crate::core::{FrameFormat, MIN_INTERVAL};
use crate::render::LoopConfig;

/// Environment variable naming a settings file
pub const CONFIG_ENV: &str = "PAGECAST_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Interface to bind (all interfaces by default)
    pub host: String,
    pub port: u16,
    /// Page loaded when the render loop starts
    pub home_url: String,
    pub capture_interval_ms: u64,
    pub command_interval_ms: u64,
    /// Poll interval of each MJPEG client
    pub stream_interval_ms: u64,
    pub format: FrameFormat,
    pub jpeg_quality: u8,
    /// Viewport size of the built-in surface
    pub width: u32,
    pub height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            home_url: "https://www.google.com".to_string(),
            capture_interval_ms: 100,
            command_interval_ms: 50,
            stream_interval_ms: 100,
            format: FrameFormat::Jpeg,
            jpeg_quality: 30,
            width: 1024,
            height: 768,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    /// Legacy high-fidelity preset: one lossless frame per second.
    pub fn legacy(self) -> Self {
        Self {
            capture_interval_ms: 1000,
            format: FrameFormat::Png,
            ..self
        }
    }

    /// Build settings from file (if any), legacy preset, then CLI flags.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut settings = match config_path(args.config.clone()) {
            Some(path) => {
                log::info!("Loading settings from {}", path.display());
                Self::load(&path)?
            }
            None => Self::default(),
        };

        if args.legacy {
            settings = settings.legacy();
        }
        if let Some(url) = &args.home_url {
            settings.home_url = url.clone();
        }
        if let Some(host) = &args.host {
            settings.host = host.clone();
        }
        if let Some(port) = args.port {
            settings.port = port;
        }
        if let Some(ms) = args.capture_interval_ms {
            settings.capture_interval_ms = ms;
        }
        if let Some(quality) = args.jpeg_quality {
            settings.jpeg_quality = quality;
        }
        if let Some([width, height]) = args.size.as_deref() {
            settings.width = *width;
            settings.height = *height;
        }
        Ok(settings)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms).max(MIN_INTERVAL)
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            capture_interval: Duration::from_millis(self.capture_interval_ms),
            command_interval: Duration::from_millis(self.command_interval_ms),
            format: self.format,
            jpeg_quality: self.jpeg_quality,
            home_url: self.home_url.clone(),
        }
    }
}

/// Settings file location: CLI argument, then `PAGECAST_CONFIG`.
pub fn config_path(cli: Option<PathBuf>) -> Option<PathBuf> {
    cli.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
}
