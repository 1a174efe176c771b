// tile_graphic.rs - Displayed knowledge of one tile and its color policy
//
// A TileGraphic never owns the buffers or the ground-truth tile. Both are
// handed in per call together with the display snapshot, so every color
// decision is a function of (tile truth, declared walls, snapshot).

use std::collections::HashMap;

use crate::buffer_interface::{BufferInterface, TileSlot, CORNERS_PER_TILE};
use crate::color::Color;
use crate::config::DisplayConfig;
use crate::maze::{Direction, Tile, DIRECTIONS};

/// Wall color decision table.
///
/// `declared` is `None` for an undeclared wall, otherwise the algorithm's
/// claim. A result equal to the base color is always drawn transparent.
pub fn deduce_wall_color_and_alpha(
    is_wall: bool,
    declared: Option<bool>,
    config: &DisplayConfig,
) -> (Color, f32) {
    let colors = &config.colors;

    let (color, alpha) = if config.wall_truth_visible {
        (colors.wall, if is_wall { 1.0 } else { 0.0 })
    } else {
        match (declared, is_wall) {
            (None, true) => (colors.undeclared_wall, 1.0),
            (None, false) => (colors.undeclared_no_wall, 1.0),
            (Some(true), true) => (colors.wall, 1.0),
            (Some(true), false) => (colors.incorrectly_declared_wall, 1.0),
            (Some(false), true) => (colors.incorrectly_declared_no_wall, 1.0),
            (Some(false), false) => (colors.wall, 0.0),
        }
    };

    if color == colors.base {
        (color, 0.0)
    } else {
        (color, alpha)
    }
}

/// Text shown for a tile distance; unreachable tiles show "inf"
pub fn distance_text(distance: Option<u32>) -> String {
    match distance {
        Some(d) => d.to_string(),
        None => "inf".to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct TileGraphic {
    x: usize,
    y: usize,
    /// `None` follows the snapshot's base color
    color: Option<Color>,
    foggy: bool,
    declared_walls: HashMap<Direction, bool>,
    rows_of_text: Vec<String>,
}

impl TileGraphic {
    /// Starts foggy and uncolored
    pub fn new(tile: &Tile) -> Self {
        Self {
            x: tile.x(),
            y: tile.y(),
            color: None,
            foggy: true,
            declared_walls: HashMap::new(),
            rows_of_text: Vec::new(),
        }
    }

    pub fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn is_foggy(&self) -> bool {
        self.foggy
    }

    pub fn rows_of_text(&self) -> &[String] {
        &self.rows_of_text
    }

    pub fn wall_declared(&self, direction: Direction) -> bool {
        self.declared_walls.contains_key(&direction)
    }

    pub fn declared_wall(&self, direction: Direction) -> Option<bool> {
        self.declared_walls.get(&direction).copied()
    }

    // ------------------------------------------------------------------------
    // State changes; each pushes exactly the affected slots
    // ------------------------------------------------------------------------

    pub fn set_color(&mut self, color: Color, config: &DisplayConfig, buffers: &mut BufferInterface) {
        self.color = Some(color);
        self.update_color(config, buffers);
    }

    /// Back to the snapshot's base color
    pub fn clear_color(&mut self, config: &DisplayConfig, buffers: &mut BufferInterface) {
        self.color = None;
        self.update_color(config, buffers);
    }

    pub fn set_fogginess(&mut self, foggy: bool, config: &DisplayConfig, buffers: &mut BufferInterface) {
        self.foggy = foggy;
        self.update_fog(config, buffers);
    }

    pub fn set_text(
        &mut self,
        rows: Vec<String>,
        tile: &Tile,
        config: &DisplayConfig,
        buffers: &mut BufferInterface,
    ) {
        self.rows_of_text = rows;
        self.update_text(tile, config, buffers);
    }

    pub fn declare_wall(
        &mut self,
        direction: Direction,
        is_wall: bool,
        tile: &Tile,
        config: &DisplayConfig,
        buffers: &mut BufferInterface,
    ) {
        self.declared_walls.insert(direction, is_wall);
        self.update_wall(direction, tile, config, buffers);
    }

    pub fn undeclare_wall(
        &mut self,
        direction: Direction,
        tile: &Tile,
        config: &DisplayConfig,
        buffers: &mut BufferInterface,
    ) {
        self.declared_walls.remove(&direction);
        self.update_wall(direction, tile, config, buffers);
    }

    // ------------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------------

    /// Inserts this tile's block into both buffers. Polygons go in the order
    /// of `TileSlot::LAYOUT`, so the slot offsets stay valid.
    pub fn draw(&self, tile: &Tile, config: &DisplayConfig, buffers: &mut BufferInterface) {
        for slot in TileSlot::LAYOUT {
            match slot {
                TileSlot::Base => {
                    buffers.insert_polygon(tile.full_polygon(), self.base_color(config), 1.0)
                }
                TileSlot::Wall(direction) => {
                    let (color, alpha) = self.wall_color_and_alpha(direction, tile, config);
                    buffers.insert_polygon(tile.wall_polygon(direction), color, alpha);
                }
                TileSlot::Corner(corner) => buffers.insert_polygon(
                    &tile.corner_polygons()[corner],
                    config.colors.corner,
                    1.0,
                ),
                TileSlot::Fog => {
                    buffers.insert_polygon(tile.full_polygon(), config.colors.fog, self.fog_alpha(config))
                }
            }
        }

        let (max_rows, max_cols) = buffers.tile_graphic_text_max_size();
        for _ in 0..max_rows * max_cols {
            buffers.insert_blank_text_cell();
        }
        self.update_text(tile, config, buffers);
    }

    // ------------------------------------------------------------------------
    // Re-derivation from current state
    // ------------------------------------------------------------------------

    fn base_color(&self, config: &DisplayConfig) -> Color {
        match self.color {
            Some(color) if config.tile_colors_visible => color,
            _ => config.colors.base,
        }
    }

    fn fog_alpha(&self, config: &DisplayConfig) -> f32 {
        if self.foggy && config.tile_fog_visible {
            config.tile_fog_alpha
        } else {
            0.0
        }
    }

    pub fn wall_color_and_alpha(&self, direction: Direction, tile: &Tile, config: &DisplayConfig) -> (Color, f32) {
        deduce_wall_color_and_alpha(tile.is_wall(direction), self.declared_wall(direction), config)
    }

    pub fn update_color(&self, config: &DisplayConfig, buffers: &mut BufferInterface) {
        buffers.update_base_color(self.x, self.y, self.base_color(config));
    }

    pub fn update_fog(&self, config: &DisplayConfig, buffers: &mut BufferInterface) {
        buffers.update_fog_alpha(self.x, self.y, self.fog_alpha(config));
    }

    /// Corner and fog colors only depend on the snapshot
    pub fn update_fixed_colors(&self, config: &DisplayConfig, buffers: &mut BufferInterface) {
        for corner in 0..CORNERS_PER_TILE {
            buffers.update_corner_color(self.x, self.y, corner, config.colors.corner);
        }
        buffers.update_fog_color(self.x, self.y, config.colors.fog);
    }

    pub fn update_wall(&self, direction: Direction, tile: &Tile, config: &DisplayConfig, buffers: &mut BufferInterface) {
        let (color, alpha) = self.wall_color_and_alpha(direction, tile, config);
        buffers.update_wall_color(self.x, self.y, direction, color, alpha);
    }

    pub fn update_walls(&self, tile: &Tile, config: &DisplayConfig, buffers: &mut BufferInterface) {
        for direction in DIRECTIONS {
            self.update_wall(direction, tile, config, buffers);
        }
    }

    /// Rows as displayed, with the distance row prepended when enabled
    pub fn displayed_rows(&self, tile: &Tile, config: &DisplayConfig) -> Vec<String> {
        let mut rows = Vec::with_capacity(self.rows_of_text.len() + 1);
        if config.tile_distance_visible {
            rows.push(distance_text(tile.distance()));
        }
        rows.extend(self.rows_of_text.iter().cloned());
        rows
    }

    /// Rewrites every text cell of the tile. Cells beyond the text, or all
    /// cells when text is hidden, are written as spaces.
    pub fn update_text(&self, tile: &Tile, config: &DisplayConfig, buffers: &mut BufferInterface) {
        let rows: Vec<Vec<char>> = self
            .displayed_rows(tile, config)
            .iter()
            .map(|row| row.chars().collect())
            .collect();

        let (max_rows, max_cols) = buffers.tile_graphic_text_max_size();
        let rows_in_use = rows.len().min(max_rows);
        for row in 0..max_rows {
            let line = rows.get(row).map(Vec::as_slice).unwrap_or(&[]);
            let cols_in_use = line.len().min(max_cols);
            for col in 0..max_cols {
                let character = match line.get(col) {
                    Some(&c) if config.tile_text_visible => c,
                    _ => ' ',
                };
                buffers.update_text_cell(self.x, self.y, rows_in_use, cols_in_use, row, col, character);
            }
        }
    }

    /// Re-derives every slot, used after the display snapshot changes
    pub fn update_all(&self, tile: &Tile, config: &DisplayConfig, buffers: &mut BufferInterface) {
        self.update_color(config, buffers);
        self.update_walls(tile, config, buffers);
        self.update_fixed_colors(config, buffers);
        self.update_fog(config, buffers);
        self.update_text(tile, config, buffers);
    }
}
