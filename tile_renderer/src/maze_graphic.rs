// maze_graphic.rs - Assembly that owns the buffers and one TileGraphic per tile
//
// This is the boundary where algorithm-supplied coordinates are validated.
// Everything below it assumes in-range tiles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::buffer_interface::{BufferInterface, TRIANGLES_PER_TILE};
use crate::color::Color;
use crate::config::{DisplayConfig, RendererConfig};
use crate::error_handling::{RendererError, Result};
use crate::geometry::{TriangleGraphic, TriangleTexture};
use crate::maze::{Direction, Maze, Tile};
use crate::text_cache::GlyphAtlas;
use crate::tile_graphic::TileGraphic;

/// Algorithm-facing requests, as read from a command script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TileCommand {
    SetColor { x: usize, y: usize, color: Color },
    /// Single-character color code, e.g. `'r'` or `'G'`
    SetColorCode { x: usize, y: usize, code: char },
    ClearColor { x: usize, y: usize },
    ClearAllColor,
    DeclareWall { x: usize, y: usize, direction: Direction, wall: bool },
    /// Direction given as `'n'`, `'e'`, `'s'` or `'w'`
    DeclareWallCode { x: usize, y: usize, side: char, wall: bool },
    UndeclareWall { x: usize, y: usize, direction: Direction },
    SetFog { x: usize, y: usize, foggy: bool },
    SetText { x: usize, y: usize, rows: Vec<String> },
    ClearText { x: usize, y: usize },
    ClearAllText,
    SetDisplay { display: DisplayConfig },
}

pub struct MazeGraphic {
    maze: Maze,
    config: DisplayConfig,
    buffers: BufferInterface,
    tile_graphics: Vec<TileGraphic>,
    tiles_with_color: BTreeSet<(usize, usize)>,
}

impl MazeGraphic {
    /// Initializes the text layout, then draws every tile in buffer order
    pub fn new(maze: Maze, config: &RendererConfig) -> Result<Self> {
        let mut buffers = BufferInterface::new((maze.width(), maze.height()));
        buffers.init_tile_graphic_text_layout(
            config.geometry.wall_length,
            config.geometry.wall_width,
            (config.text.max_rows, config.text.max_cols),
            GlyphAtlas::from_characters(&config.text.font_image_characters),
            config.text.border_fraction,
            config.text.alignment,
        )?;

        let display = config.display;
        let tile_graphics: Vec<TileGraphic> = maze
            .tiles()
            .iter()
            .map(TileGraphic::new)
            .collect();

        for (block, (graphic, tile)) in tile_graphics.iter().zip(maze.tiles()).enumerate() {
            debug_assert_eq!(buffers.tile_block_index(tile.x(), tile.y()), block);
            graphic.draw(tile, &display, &mut buffers);
            assert_eq!(
                buffers.graphic_buffer().len(),
                (block + 1) * TRIANGLES_PER_TILE,
                "tile ({}, {}) did not fill exactly one slot block",
                tile.x(),
                tile.y()
            );
        }
        buffers.seal();

        log::info!(
            "Drew {}x{} maze ({} tiles)",
            maze.width(),
            maze.height(),
            tile_graphics.len()
        );

        Ok(Self {
            maze,
            config: display,
            buffers,
            tile_graphics,
            tiles_with_color: BTreeSet::new(),
        })
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn display_config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn tile_graphic(&self, x: usize, y: usize) -> Option<&TileGraphic> {
        self.block(x, y).ok().map(|block| &self.tile_graphics[block])
    }

    pub fn buffers(&self) -> &BufferInterface {
        &self.buffers
    }

    pub fn graphic_buffer(&self) -> &[TriangleGraphic] {
        self.buffers.graphic_buffer()
    }

    pub fn texture_buffer(&self) -> &[TriangleTexture] {
        self.buffers.texture_buffer()
    }

    /// Graphic buffer as uploaded to the GPU
    pub fn graphic_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.buffers.graphic_buffer())
    }

    pub fn texture_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.buffers.texture_buffer())
    }

    fn block(&self, x: usize, y: usize) -> Result<usize> {
        if x < self.maze.width() && y < self.maze.height() {
            Ok(x * self.maze.height() + y)
        } else {
            Err(RendererError::TileOutOfBounds {
                x,
                y,
                width: self.maze.width(),
                height: self.maze.height(),
            })
        }
    }

    /// Disjoint borrows of one tile's graphic, its truth and the buffers
    fn parts(&mut self, block: usize) -> (&mut TileGraphic, &Tile, &DisplayConfig, &mut BufferInterface) {
        (
            &mut self.tile_graphics[block],
            &self.maze.tiles()[block],
            &self.config,
            &mut self.buffers,
        )
    }

    // ------------------------------------------------------------------------
    // Color
    // ------------------------------------------------------------------------

    pub fn set_tile_color(&mut self, x: usize, y: usize, color: Color) -> Result<()> {
        let block = self.block(x, y)?;
        let (graphic, _, config, buffers) = self.parts(block);
        graphic.set_color(color, config, buffers);
        self.tiles_with_color.insert((x, y));
        Ok(())
    }

    pub fn clear_tile_color(&mut self, x: usize, y: usize) -> Result<()> {
        let block = self.block(x, y)?;
        let (graphic, _, config, buffers) = self.parts(block);
        graphic.clear_color(config, buffers);
        self.tiles_with_color.remove(&(x, y));
        Ok(())
    }

    pub fn clear_all_tile_color(&mut self) {
        let colored = std::mem::take(&mut self.tiles_with_color);
        for (x, y) in colored {
            let block = x * self.maze.height() + y;
            let (graphic, _, config, buffers) = self.parts(block);
            graphic.clear_color(config, buffers);
        }
    }

    // ------------------------------------------------------------------------
    // Walls
    // ------------------------------------------------------------------------

    /// The neighbouring tile sharing this wall, if any
    fn opposing_wall(&self, x: usize, y: usize, direction: Direction) -> Option<(usize, usize, Direction)> {
        let (dx, dy) = direction.offset();
        let (nx, ny) = (x as i64 + dx, y as i64 + dy);
        if self.maze.contains(nx, ny) {
            Some((nx as usize, ny as usize, direction.opposite()))
        } else {
            None
        }
    }

    /// Declares the wall on both tiles that share it
    pub fn declare_wall(&mut self, x: usize, y: usize, direction: Direction, is_wall: bool) -> Result<()> {
        let block = self.block(x, y)?;
        let opposing = self.opposing_wall(x, y, direction);

        let (graphic, tile, config, buffers) = self.parts(block);
        graphic.declare_wall(direction, is_wall, tile, config, buffers);

        if let Some((ox, oy, od)) = opposing {
            let block = self.block(ox, oy)?;
            let (graphic, tile, config, buffers) = self.parts(block);
            graphic.declare_wall(od, is_wall, tile, config, buffers);
        }
        Ok(())
    }

    pub fn undeclare_wall(&mut self, x: usize, y: usize, direction: Direction) -> Result<()> {
        let block = self.block(x, y)?;
        let opposing = self.opposing_wall(x, y, direction);

        let (graphic, tile, config, buffers) = self.parts(block);
        graphic.undeclare_wall(direction, tile, config, buffers);

        if let Some((ox, oy, od)) = opposing {
            let block = self.block(ox, oy)?;
            let (graphic, tile, config, buffers) = self.parts(block);
            graphic.undeclare_wall(od, tile, config, buffers);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Fog and text
    // ------------------------------------------------------------------------

    pub fn set_tile_fogginess(&mut self, x: usize, y: usize, foggy: bool) -> Result<()> {
        let block = self.block(x, y)?;
        let (graphic, _, config, buffers) = self.parts(block);
        graphic.set_fogginess(foggy, config, buffers);
        Ok(())
    }

    pub fn set_tile_text(&mut self, x: usize, y: usize, rows: Vec<String>) -> Result<()> {
        let block = self.block(x, y)?;
        let (graphic, tile, config, buffers) = self.parts(block);
        graphic.set_text(rows, tile, config, buffers);
        Ok(())
    }

    pub fn clear_tile_text(&mut self, x: usize, y: usize) -> Result<()> {
        self.set_tile_text(x, y, Vec::new())
    }

    pub fn clear_all_tile_text(&mut self) {
        for block in 0..self.tile_graphics.len() {
            let (graphic, tile, config, buffers) = self.parts(block);
            if !graphic.rows_of_text().is_empty() {
                graphic.set_text(Vec::new(), tile, config, buffers);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Display snapshot
    // ------------------------------------------------------------------------

    /// Replaces the snapshot and re-derives every slot of every tile
    pub fn set_display_config(&mut self, config: DisplayConfig) {
        self.config = config;
        for block in 0..self.tile_graphics.len() {
            let (graphic, tile, config, buffers) = self.parts(block);
            graphic.update_all(tile, config, buffers);
        }
        log::debug!("Refreshed {} tiles for new display config", self.tile_graphics.len());
    }

    pub fn apply(&mut self, command: &TileCommand) -> Result<()> {
        log::trace!("Applying {:?}", command);
        match command {
            TileCommand::SetColor { x, y, color } => self.set_tile_color(*x, *y, *color),
            TileCommand::SetColorCode { x, y, code } => {
                let color = Color::from_char(*code)?;
                self.set_tile_color(*x, *y, color)
            }
            TileCommand::ClearColor { x, y } => self.clear_tile_color(*x, *y),
            TileCommand::ClearAllColor => {
                self.clear_all_tile_color();
                Ok(())
            }
            TileCommand::DeclareWall { x, y, direction, wall } => {
                self.declare_wall(*x, *y, *direction, *wall)
            }
            TileCommand::DeclareWallCode { x, y, side, wall } => {
                let direction = Direction::from_char(*side)?;
                self.declare_wall(*x, *y, direction, *wall)
            }
            TileCommand::UndeclareWall { x, y, direction } => self.undeclare_wall(*x, *y, *direction),
            TileCommand::SetFog { x, y, foggy } => self.set_tile_fogginess(*x, *y, *foggy),
            TileCommand::SetText { x, y, rows } => self.set_tile_text(*x, *y, rows.clone()),
            TileCommand::ClearText { x, y } => self.clear_tile_text(*x, *y),
            TileCommand::ClearAllText => {
                self.clear_all_tile_text();
                Ok(())
            }
            TileCommand::SetDisplay { display } => {
                self.set_display_config(*display);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeometryConfig;
    use crate::types::MazeData;

    fn config() -> RendererConfig {
        RendererConfig {
            geometry: GeometryConfig { wall_length: 1.0, wall_width: 0.5 },
            ..RendererConfig::default()
        }
    }

    fn graphic(width: usize, height: usize) -> MazeGraphic {
        let config = config();
        let maze = Maze::open(width, height, &config.geometry).unwrap();
        MazeGraphic::new(maze, &config).unwrap()
    }

    fn base_rgb(mg: &MazeGraphic, x: usize, y: usize) -> [f32; 3] {
        mg.graphic_buffer()[mg.buffers().base_starting_index(x, y)].p1.rgb
    }

    fn wall_vertex(mg: &MazeGraphic, x: usize, y: usize, d: Direction) -> ([f32; 3], f32) {
        let v = mg.graphic_buffer()[mg.buffers().wall_starting_index(x, y, d)].p1;
        (v.rgb, v.alpha)
    }

    #[test]
    fn test_buffers_are_sized_once() {
        let mg = graphic(4, 3);
        assert!(mg.buffers().is_sealed());
        assert_eq!(mg.graphic_buffer().len(), 12 * 20);
        // Default text grid is 2x4
        assert_eq!(mg.texture_buffer().len(), 12 * 16);
        assert_eq!(mg.graphic_bytes().len(), 12 * 20 * 72);
        assert_eq!(mg.texture_bytes().len(), 12 * 16 * 48);
    }

    #[test]
    fn test_updates_never_move_or_resize_buffers() {
        let mut mg = graphic(3, 3);
        let graphic_ptr = mg.graphic_buffer().as_ptr();
        let texture_ptr = mg.texture_buffer().as_ptr();
        let lens = (mg.graphic_buffer().len(), mg.texture_buffer().len());

        for x in 0..3 {
            for y in 0..3 {
                mg.set_tile_color(x, y, Color::Yellow).unwrap();
                mg.declare_wall(x, y, Direction::North, true).unwrap();
                mg.set_tile_fogginess(x, y, false).unwrap();
                mg.set_tile_text(x, y, vec!["abcdefgh".to_string(); 4]).unwrap();
            }
        }
        let display = DisplayConfig { wall_truth_visible: true, ..*mg.display_config() };
        mg.set_display_config(display);

        assert_eq!(mg.graphic_buffer().as_ptr(), graphic_ptr);
        assert_eq!(mg.texture_buffer().as_ptr(), texture_ptr);
        assert_eq!((mg.graphic_buffer().len(), mg.texture_buffer().len()), lens);
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let mut mg = graphic(2, 2);
        let before = mg.graphic_buffer().to_vec();
        assert!(matches!(
            mg.set_tile_color(2, 0, Color::Red),
            Err(RendererError::TileOutOfBounds { x: 2, y: 0, .. })
        ));
        assert!(mg.declare_wall(0, 5, Direction::North, true).is_err());
        assert!(mg.set_tile_fogginess(9, 9, false).is_err());
        assert_eq!(mg.graphic_buffer(), before.as_slice());
        assert!(mg.tile_graphic(2, 0).is_none());
    }

    #[test]
    fn test_single_tile_red_base() {
        let mut mg = graphic(1, 1);
        mg.set_tile_color(0, 0, Color::Red).unwrap();
        for triangle in &mg.graphic_buffer()[0..2] {
            for vertex in triangle.vertices() {
                assert_eq!(vertex.rgb, [1.0, 0.0, 0.0]);
                assert_eq!(vertex.alpha, 1.0);
            }
        }

        let display = DisplayConfig { tile_colors_visible: false, ..*mg.display_config() };
        mg.set_display_config(display);
        assert_eq!(base_rgb(&mg, 0, 0), Color::Black.rgb().to_f32());
        assert_eq!(mg.tile_graphic(0, 0).unwrap().color(), Some(Color::Red));
    }

    #[test]
    fn test_display_colors_reach_every_slot() {
        let mut mg = graphic(1, 2);
        mg.set_tile_color(0, 1, Color::Blue).unwrap();

        let mut display = *mg.display_config();
        display.colors.base = Color::White;
        display.colors.corner = Color::Blue;
        display.colors.fog = Color::Green;
        mg.set_display_config(display);

        let white = Color::White.rgb().to_f32();
        assert_eq!(base_rgb(&mg, 0, 0), white);
        assert_eq!(base_rgb(&mg, 0, 1), Color::Blue.rgb().to_f32());
        for y in 0..2 {
            for corner in 0..4 {
                let index = mg.buffers().corner_starting_index(0, y, corner);
                for triangle in &mg.graphic_buffer()[index..index + 2] {
                    for vertex in triangle.vertices() {
                        assert_eq!(vertex.rgb, Color::Blue.rgb().to_f32());
                    }
                }
            }
            let index = mg.buffers().fog_starting_index(0, y);
            for triangle in &mg.graphic_buffer()[index..index + 2] {
                for vertex in triangle.vertices() {
                    assert_eq!(vertex.rgb, Color::Green.rgb().to_f32());
                    assert_eq!(vertex.alpha, display.tile_fog_alpha);
                }
            }
        }

        // A cleared tile follows the new base
        mg.clear_tile_color(0, 1).unwrap();
        assert_eq!(base_rgb(&mg, 0, 1), white);
    }

    #[test]
    fn test_clear_colors() {
        let mut mg = graphic(2, 2);
        mg.set_tile_color(0, 1, Color::Green).unwrap();
        mg.set_tile_color(1, 1, Color::Blue).unwrap();
        mg.clear_tile_color(0, 1).unwrap();
        assert_eq!(base_rgb(&mg, 0, 1), [0.0, 0.0, 0.0]);
        assert_eq!(base_rgb(&mg, 1, 1), [0.0, 0.0, 1.0]);

        mg.clear_all_tile_color();
        assert_eq!(base_rgb(&mg, 1, 1), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_declare_wall_mirrors_onto_neighbour() {
        let mut mg = graphic(2, 1);
        mg.declare_wall(0, 0, Direction::East, true).unwrap();

        assert!(mg.tile_graphic(0, 0).unwrap().wall_declared(Direction::East));
        assert!(mg.tile_graphic(1, 0).unwrap().wall_declared(Direction::West));
        // No true wall between them: both sides show the incorrect declaration
        let orange = (Color::Orange.rgb().to_f32(), 1.0);
        assert_eq!(wall_vertex(&mg, 0, 0, Direction::East), orange);
        assert_eq!(wall_vertex(&mg, 1, 0, Direction::West), orange);

        mg.undeclare_wall(1, 0, Direction::West).unwrap();
        assert!(!mg.tile_graphic(0, 0).unwrap().wall_declared(Direction::East));
        let undeclared = (Color::DarkGray.rgb().to_f32(), 1.0);
        assert_eq!(wall_vertex(&mg, 0, 0, Direction::East), undeclared);
    }

    #[test]
    fn test_boundary_wall_has_no_opposite() {
        let mut mg = graphic(1, 1);
        mg.declare_wall(0, 0, Direction::South, true).unwrap();
        assert_eq!(
            wall_vertex(&mg, 0, 0, Direction::South),
            (Color::Red.rgb().to_f32(), 1.0)
        );
    }

    #[test]
    fn test_wall_truth_toggle_refreshes_walls() {
        let mut mg = graphic(2, 1);
        let display = DisplayConfig { wall_truth_visible: true, ..*mg.display_config() };
        mg.set_display_config(display);
        assert_eq!(wall_vertex(&mg, 0, 0, Direction::West), (Color::Red.rgb().to_f32(), 1.0));
        assert_eq!(wall_vertex(&mg, 0, 0, Direction::East).1, 0.0);
    }

    #[test]
    fn test_text_commands() {
        let mut mg = graphic(2, 2);
        mg.set_tile_text(1, 0, vec!["hi".to_string()]).unwrap();
        assert_eq!(mg.tile_graphic(1, 0).unwrap().rows_of_text(), ["hi".to_string()]);

        mg.clear_all_tile_text();
        assert!(mg.tile_graphic(1, 0).unwrap().rows_of_text().is_empty());
        assert!(mg.clear_tile_text(3, 3).is_err());
    }

    #[test]
    fn test_apply_command_script() {
        let script = r#"[
            { "command": "set_color_code", "x": 0, "y": 0, "code": "G" },
            { "command": "declare_wall_code", "x": 0, "y": 0, "side": "n", "wall": false },
            { "command": "set_fog", "x": 0, "y": 1, "foggy": false },
            { "command": "set_text", "x": 0, "y": 1, "rows": ["12"] }
        ]"#;
        let commands: Vec<TileCommand> = serde_json::from_str(script).unwrap();
        let mut mg = graphic(1, 2);
        for command in &commands {
            mg.apply(command).unwrap();
        }

        assert_eq!(base_rgb(&mg, 0, 0), Color::DarkGreen.rgb().to_f32());
        assert_eq!(mg.tile_graphic(0, 1).unwrap().declared_wall(Direction::South), Some(false));
        assert!(!mg.tile_graphic(0, 1).unwrap().is_foggy());

        let bad = TileCommand::SetColorCode { x: 0, y: 0, code: '?' };
        assert!(matches!(mg.apply(&bad), Err(RendererError::UnknownColorChar('?'))));
        let bad = TileCommand::DeclareWallCode { x: 0, y: 0, side: 'q', wall: true };
        assert!(matches!(mg.apply(&bad), Err(RendererError::UnknownDirectionChar('q'))));
    }

    #[test]
    fn test_maze_from_data() {
        let config = config();
        let data: MazeData = serde_json::from_str(
            r#"{ "width": 2, "height": 2, "walls": [{ "x": 0, "y": 0, "direction": "north" }] }"#,
        )
        .unwrap();
        let maze = Maze::from_data(&data, &config.geometry).unwrap();
        let mg = MazeGraphic::new(maze, &config).unwrap();
        assert!(mg.maze().tile(0, 1).unwrap().is_wall(Direction::South));
    }
}
