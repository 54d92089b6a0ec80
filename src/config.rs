//! Configuration persistence for plan rendering settings

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Serializable color representation for config storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl PlanColor {
    pub const WHITE: PlanColor = PlanColor {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            255,
        ]
    }
}

impl Default for PlanColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Appearance of anchor markers drawn over a rendered plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    /// Dot diameter in pixels
    pub size: f32,
    /// Whether to draw a dark ring around the dot
    pub shadow: bool,
    /// Fill color of the dot
    pub color: PlanColor,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            size: 12.0,
            shadow: true,
            // Red, matching the observation list badges
            color: PlanColor {
                r: 0.9,
                g: 0.1,
                b: 0.1,
            },
        }
    }
}

/// Resampling filter used when scaling raster plans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Rendering configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Viewport used for inline previews (width, height)
    pub preview_viewport: (u32, u32),
    /// Filter for scaling raster plans
    pub resample: ResampleFilter,
    /// Directory holding the pdfium shared library (None = system search path)
    pub pdfium_library_dir: Option<PathBuf>,
    /// Letterbox fill behind the plan
    pub background: PlanColor,
    /// Anchor marker appearance
    pub marker: MarkerStyle,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            preview_viewport: (320, 280),
            resample: ResampleFilter::default(),
            pdfium_library_dir: None,
            background: PlanColor::WHITE,
            marker: MarkerStyle::default(),
        }
    }
}

impl PlanConfig {
    /// Application directory name under the user config dir
    pub const APP_DIR: &'static str = "plananchor";
    /// Config file name
    pub const FILE_NAME: &'static str = "config.toml";

    /// Default location of the config file, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::APP_DIR).join(Self::FILE_NAME))
    }

    /// Load configuration from the default location, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No config directory on this platform, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(err) => {
                log::warn!("Could not read config {}: {:?}", path.display(), err);
                return Self::default();
            }
        };

        match toml::from_str(&text) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) {
        match Self::default_path() {
            Some(path) => self.save_to(&path),
            None => log::error!("Could not determine config directory for saving"),
        }
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) {
        let text = match toml::to_string_pretty(self) {
            Ok(text) => text,
            Err(err) => {
                log::error!("Failed to serialize config: {}", err);
                return;
            }
        };

        if let Some(parent) = path.parent()
            && let Err(err) = std::fs::create_dir_all(parent)
        {
            log::error!("Could not create config dir {}: {:?}", parent.display(), err);
            return;
        }

        if let Err(err) = std::fs::write(path, text) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    /// Preview viewport dimensions, if they are usable
    pub fn preview_viewport(&self) -> Option<crate::domain::Viewport> {
        let (width, height) = self.preview_viewport;
        crate::domain::Viewport::try_new(width, height)
    }
}
