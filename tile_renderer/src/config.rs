// config.rs - Display, geometry and text options
//
// Every field has a default so partial JSON files are accepted.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::Color;
use crate::error_handling::Result;
use crate::text_cache::TileTextAlignment;

/// Colors used by the tile policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileColors {
    pub base: Color,
    pub wall: Color,
    pub corner: Color,
    pub fog: Color,
    pub undeclared_wall: Color,
    pub undeclared_no_wall: Color,
    pub incorrectly_declared_wall: Color,
    pub incorrectly_declared_no_wall: Color,
}

impl Default for TileColors {
    fn default() -> Self {
        Self {
            base: Color::Black,
            wall: Color::Red,
            corner: Color::Gray,
            fog: Color::Gray,
            undeclared_wall: Color::DarkRed,
            undeclared_no_wall: Color::DarkGray,
            incorrectly_declared_wall: Color::Orange,
            incorrectly_declared_no_wall: Color::DarkCyan,
        }
    }
}

/// Read-only snapshot handed to every tile operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub tile_colors_visible: bool,
    pub tile_fog_visible: bool,
    pub tile_text_visible: bool,
    pub wall_truth_visible: bool,
    pub tile_distance_visible: bool,
    pub colors: TileColors,
    pub tile_fog_alpha: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tile_colors_visible: true,
            tile_fog_visible: true,
            tile_text_visible: true,
            wall_truth_visible: false,
            tile_distance_visible: true,
            colors: TileColors::default(),
            tile_fog_alpha: 0.15,
        }
    }
}

/// Physical maze dimensions in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub wall_length: f32,
    pub wall_width: f32,
}

impl GeometryConfig {
    /// Distance between the origins of adjacent tiles
    #[inline]
    pub fn tile_pitch(&self) -> f32 {
        self.wall_length + self.wall_width
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            wall_length: 0.168,
            wall_width: 0.012,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub max_rows: usize,
    pub max_cols: usize,
    pub border_fraction: f32,
    pub alignment: TileTextAlignment,
    /// Characters of the font image, left to right
    pub font_image_characters: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            max_rows: 2,
            max_cols: 4,
            border_fraction: 0.05,
            alignment: TileTextAlignment::CenterCenter,
            font_image_characters: (' '..='~').collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub display: DisplayConfig,
    pub geometry: GeometryConfig,
    pub text: TextConfig,
}

impl RendererConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded renderer config from {}", path.display());
        Ok(config)
    }
}
