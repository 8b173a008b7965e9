use crate::types::{Category, Condition};
use crate::view::{ChartKind, TileLayer};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub view: ViewConfig,
    pub tiles: TilesConfig,
    pub palette: PaletteConfig,
    pub fullscreen: FullscreenConfig,
    pub query: QueryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: Option<PathBuf>, // Page assets for the browser client
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            static_dir: None,
        }
    }
}

/// Initial view modes.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ViewConfig {
    pub chart: ChartKind,
    pub tile_layer: TileLayer,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TileSourceConfig {
    pub url: String,
    pub attribution: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TilesConfig {
    pub street: TileSourceConfig,
    pub satellite: TileSourceConfig,
}

impl Default for TilesConfig {
    fn default() -> Self {
        Self {
            street: TileSourceConfig {
                url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
                attribution: "&copy; OpenStreetMap contributors".to_string(),
            },
            satellite: TileSourceConfig {
                url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
                    .to_string(),
                attribution: "Tiles &copy; Esri".to_string(),
            },
        }
    }
}

impl TilesConfig {
    pub fn source(&self, layer: TileLayer) -> &TileSourceConfig {
        match layer {
            TileLayer::Street => &self.street,
            TileLayer::Satellite => &self.satellite,
        }
    }
}

/// Chart colours as hex codes.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PaletteConfig {
    pub hospital: String,
    pub school: String,
    pub good: String,
    pub fair: String,
    pub poor: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            hospital: "#e74c3c".to_string(),
            school: "#3498db".to_string(),
            good: "#1abc9c".to_string(),
            fair: "#f1c40f".to_string(),
            poor: "#e74c3c".to_string(),
        }
    }
}

impl PaletteConfig {
    pub fn category(&self, category: Category) -> &str {
        match category {
            Category::Hospital => &self.hospital,
            Category::School => &self.school,
        }
    }

    pub fn condition(&self, condition: Condition) -> &str {
        match condition {
            Condition::Good => &self.good,
            Condition::Fair => &self.fair,
            Condition::Poor => &self.poor,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FullscreenConfig {
    pub supported: bool,
}

impl Default for FullscreenConfig {
    fn default() -> Self {
        Self { supported: true }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct QueryConfig {
    /// Search radius, in degrees, for resolving a map click to a marker.
    pub max_distance_deg: f64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { max_distance_deg: 0.05 }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
