// color.rs - Logical color names and their RGB values

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error_handling::{RendererError, Result};

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Normalized components as stored in the vertex buffers
    #[inline]
    pub fn to_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// Named colors shared by the display configuration and the algorithm interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    Black,
    Blue,
    Cyan,
    DarkBlue,
    DarkCyan,
    DarkGray,
    DarkGreen,
    DarkRed,
    DarkYellow,
    Gray,
    Green,
    Orange,
    Red,
    White,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 15] = [
        Color::Black,
        Color::Blue,
        Color::Cyan,
        Color::DarkBlue,
        Color::DarkCyan,
        Color::DarkGray,
        Color::DarkGreen,
        Color::DarkRed,
        Color::DarkYellow,
        Color::Gray,
        Color::Green,
        Color::Orange,
        Color::Red,
        Color::White,
        Color::Yellow,
    ];

    pub const fn rgb(self) -> Rgb {
        match self {
            Color::Black => Rgb::new(0, 0, 0),
            Color::Blue => Rgb::new(0, 0, 255),
            Color::Cyan => Rgb::new(0, 255, 255),
            Color::DarkBlue => Rgb::new(0, 0, 139),
            Color::DarkCyan => Rgb::new(0, 139, 139),
            Color::DarkGray => Rgb::new(64, 64, 64),
            Color::DarkGreen => Rgb::new(0, 100, 0),
            Color::DarkRed => Rgb::new(139, 0, 0),
            Color::DarkYellow => Rgb::new(139, 139, 0),
            Color::Gray => Rgb::new(128, 128, 128),
            Color::Green => Rgb::new(0, 255, 0),
            Color::Orange => Rgb::new(255, 165, 0),
            Color::Red => Rgb::new(255, 0, 0),
            Color::White => Rgb::new(255, 255, 255),
            Color::Yellow => Rgb::new(255, 255, 0),
        }
    }

    /// Single-character color codes used by solving algorithms
    pub fn from_char(c: char) -> Result<Self> {
        let color = match c {
            'k' => Color::Black,
            'b' => Color::Blue,
            'a' => Color::Gray,
            'c' => Color::Cyan,
            'g' => Color::Green,
            'o' => Color::Orange,
            'r' => Color::Red,
            'w' => Color::White,
            'y' => Color::Yellow,
            'B' => Color::DarkBlue,
            'C' => Color::DarkCyan,
            'A' => Color::DarkGray,
            'G' => Color::DarkGreen,
            'R' => Color::DarkRed,
            'Y' => Color::DarkYellow,
            other => return Err(RendererError::UnknownColorChar(other)),
        };
        Ok(color)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Color::Black => "BLACK",
            Color::Blue => "BLUE",
            Color::Cyan => "CYAN",
            Color::DarkBlue => "DARK_BLUE",
            Color::DarkCyan => "DARK_CYAN",
            Color::DarkGray => "DARK_GRAY",
            Color::DarkGreen => "DARK_GREEN",
            Color::DarkRed => "DARK_RED",
            Color::DarkYellow => "DARK_YELLOW",
            Color::Gray => "GRAY",
            Color::Green => "GREEN",
            Color::Orange => "ORANGE",
            Color::Red => "RED",
            Color::White => "WHITE",
            Color::Yellow => "YELLOW",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = RendererError;

    fn from_str(s: &str) -> Result<Self> {
        Color::ALL
            .iter()
            .copied()
            .find(|color| color.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RendererError::UnknownColorName(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_normalization() {
        assert_eq!(Color::Red.rgb().to_f32(), [1.0, 0.0, 0.0]);
        assert_eq!(Color::Black.rgb().to_f32(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_name_round_trip() {
        for color in Color::ALL {
            assert_eq!(color.name().parse::<Color>().unwrap(), color);
        }
        assert_eq!("dark_red".parse::<Color>().unwrap(), Color::DarkRed);
        assert!("PURPLE".parse::<Color>().is_err());
    }

    #[test]
    fn test_char_codes() {
        assert_eq!(Color::from_char('r').unwrap(), Color::Red);
        assert_eq!(Color::from_char('R').unwrap(), Color::DarkRed);
        assert!(matches!(
            Color::from_char('z'),
            Err(RendererError::UnknownColorChar('z'))
        ));
    }

    #[test]
    fn test_serde_uses_screaming_case() {
        let json = serde_json::to_string(&Color::DarkCyan).unwrap();
        assert_eq!(json, "\"DARK_CYAN\"");
        let color: Color = serde_json::from_str("\"ORANGE\"").unwrap();
        assert_eq!(color, Color::Orange);
    }
}
