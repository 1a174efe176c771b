// text_cache.rs - Glyph atlas lookup and precomputed tile text cell placement
//
// All cell rectangles are computed once, relative to a tile origin, for every
// combination of (rows in use, cols in use, row, col). Lookups only add the
// tile's offset.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error_handling::{RendererError, Result};
use crate::geometry::Cartesian;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileTextAlignment {
    UpperLeft,
    UpperCenter,
    UpperRight,
    CenterLeft,
    CenterCenter,
    CenterRight,
    LowerLeft,
    LowerCenter,
    LowerRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Horizontal {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vertical {
    Upper,
    Center,
    Lower,
}

impl TileTextAlignment {
    fn split(self) -> (Vertical, Horizontal) {
        use TileTextAlignment::*;
        match self {
            UpperLeft => (Vertical::Upper, Horizontal::Left),
            UpperCenter => (Vertical::Upper, Horizontal::Center),
            UpperRight => (Vertical::Upper, Horizontal::Right),
            CenterLeft => (Vertical::Center, Horizontal::Left),
            CenterCenter => (Vertical::Center, Horizontal::Center),
            CenterRight => (Vertical::Center, Horizontal::Right),
            LowerLeft => (Vertical::Lower, Horizontal::Left),
            LowerCenter => (Vertical::Lower, Horizontal::Center),
            LowerRight => (Vertical::Lower, Horizontal::Right),
        }
    }
}

impl FromStr for TileTextAlignment {
    type Err = RendererError;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_ascii_uppercase()))
            .map_err(|_| RendererError::UnknownAlignment(s.to_string()))
    }
}

/// Largest text grid side; the cell table grows with the fourth power of it
pub const MAX_TEXT_GRID_SIDE: usize = 16;

/// Horizontal span `(u_start, u_end)` of each glyph in the font image
#[derive(Debug, Clone, Default)]
pub struct GlyphAtlas {
    spans: HashMap<char, (f32, f32)>,
}

impl GlyphAtlas {
    pub fn from_spans(spans: HashMap<char, (f32, f32)>) -> Self {
        Self { spans }
    }

    /// Font image laid out as one row of equally wide glyphs
    pub fn from_characters(characters: &str) -> Self {
        let count = characters.chars().count().max(1) as f32;
        let spans = characters
            .chars()
            .enumerate()
            .map(|(i, c)| (c, (i as f32 / count, (i + 1) as f32 / count)))
            .collect();
        Self { spans }
    }

    /// Unknown characters render as a space, or as nothing if the font
    /// image has no space either
    pub fn span(&self, c: char) -> (f32, f32) {
        self.spans
            .get(&c)
            .or_else(|| self.spans.get(&' '))
            .copied()
            .unwrap_or((0.0, 0.0))
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Immutable text layout constants, built once before any text is drawn
#[derive(Debug, Clone)]
pub struct TileTextLayout {
    max_rows: usize,
    max_cols: usize,
    tile_pitch: f32,
    atlas: GlyphAtlas,
    cells: Vec<(Cartesian, Cartesian)>,
}

impl TileTextLayout {
    pub fn new(
        wall_length: f32,
        wall_width: f32,
        max_size: (usize, usize),
        atlas: GlyphAtlas,
        border_fraction: f32,
        alignment: TileTextAlignment,
    ) -> Result<Self> {
        let (max_rows, max_cols) = max_size;
        if max_rows == 0 || max_cols == 0 {
            return Err(RendererError::InvalidTextLayout {
                reason: format!("text cell grid must be non-empty, got {}x{}", max_rows, max_cols),
            });
        }
        if max_rows > MAX_TEXT_GRID_SIDE || max_cols > MAX_TEXT_GRID_SIDE {
            return Err(RendererError::InvalidTextLayout {
                reason: format!(
                    "text cell grid {}x{} exceeds {}x{}",
                    max_rows, max_cols, MAX_TEXT_GRID_SIDE, MAX_TEXT_GRID_SIDE
                ),
            });
        }
        if !(0.0..0.5).contains(&border_fraction) {
            return Err(RendererError::InvalidTextLayout {
                reason: format!("border fraction {} must lie in [0, 0.5)", border_fraction),
            });
        }
        if wall_length <= 0.0 || wall_width < 0.0 {
            return Err(RendererError::InvalidTextLayout {
                reason: format!("invalid wall dimensions {} x {}", wall_length, wall_width),
            });
        }

        let (vertical, horizontal) = alignment.split();
        let border = border_fraction * wall_length;
        let usable = wall_length - 2.0 * border;
        let origin = wall_width / 2.0 + border;
        let cell_w = usable / max_cols as f32;
        let cell_h = usable / max_rows as f32;

        let mut cells = Vec::with_capacity((max_rows + 1) * (max_cols + 1) * max_rows * max_cols);
        for rows_in_use in 0..=max_rows {
            for cols_in_use in 0..=max_cols {
                let block_w = cols_in_use as f32 * cell_w;
                let block_h = rows_in_use as f32 * cell_h;
                let left = match horizontal {
                    Horizontal::Left => origin,
                    Horizontal::Center => origin + (usable - block_w) / 2.0,
                    Horizontal::Right => origin + usable - block_w,
                };
                let top = match vertical {
                    Vertical::Upper => origin + usable,
                    Vertical::Center => origin + usable - (usable - block_h) / 2.0,
                    Vertical::Lower => origin + block_h,
                };
                for row in 0..max_rows {
                    for col in 0..max_cols {
                        let ll = Cartesian::new(
                            left + col as f32 * cell_w,
                            top - (row + 1) as f32 * cell_h,
                        );
                        let ur = Cartesian::new(ll.x + cell_w, ll.y + cell_h);
                        cells.push((ll, ur));
                    }
                }
            }
        }

        log::debug!(
            "Tile text layout: {}x{} cells of {:.4}m x {:.4}m, {} glyphs",
            max_rows,
            max_cols,
            cell_w,
            cell_h,
            atlas.len()
        );

        Ok(Self {
            max_rows,
            max_cols,
            tile_pitch: wall_length + wall_width,
            atlas,
            cells,
        })
    }

    /// `(max_rows, max_cols)`
    #[inline]
    pub fn max_size(&self) -> (usize, usize) {
        (self.max_rows, self.max_cols)
    }

    #[inline]
    pub fn glyph_span(&self, c: char) -> (f32, f32) {
        self.atlas.span(c)
    }

    /// Lower-left and upper-right corners of one text cell of tile (x, y)
    pub fn text_position(
        &self,
        x: usize,
        y: usize,
        rows_in_use: usize,
        cols_in_use: usize,
        row: usize,
        col: usize,
    ) -> (Cartesian, Cartesian) {
        let rows_in_use = rows_in_use.min(self.max_rows);
        let cols_in_use = cols_in_use.min(self.max_cols);
        let index = ((rows_in_use * (self.max_cols + 1) + cols_in_use) * self.max_rows + row)
            * self.max_cols
            + col;
        let (ll, ur) = self.cells[index];
        let offset = Cartesian::new(x as f32 * self.tile_pitch, y as f32 * self.tile_pitch);
        (ll + offset, ur + offset)
    }
}
