// lib.rs - Library exports for maze-tile-renderer
// CPU-side tile vertex buffers for a grid maze, updated slot by slot

pub mod buffer_interface;
pub mod color;
pub mod config;
pub mod error_handling;
pub mod geometry;
pub mod maze;
pub mod maze_graphic;
pub mod text_cache;
pub mod tile_graphic;
pub mod types;

// Re-export commonly used types
pub use buffer_interface::{BufferInterface, TileSlot, TRIANGLES_PER_TILE};
pub use color::{Color, Rgb};
pub use config::{DisplayConfig, GeometryConfig, RendererConfig, TextConfig, TileColors};
pub use error_handling::{RendererError, Result};
pub use geometry::{Cartesian, Polygon, TriangleGraphic, TriangleTexture, VertexGraphic, VertexTexture};
pub use maze::{Direction, Maze, Tile, DIRECTIONS};
pub use maze_graphic::{MazeGraphic, TileCommand};
pub use text_cache::{GlyphAtlas, TileTextAlignment, TileTextLayout};
pub use tile_graphic::TileGraphic;
pub use types::{MazeData, WallRecord};
