// types.rs - Serialized maze description consumed by the maze model

use serde::{Deserialize, Serialize};

use crate::maze::Direction;

/// One interior wall; the matching wall of the neighbouring tile is implied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallRecord {
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MazeData {
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub walls: Vec<WallRecord>,
}

impl MazeData {
    /// Maze with only its boundary walls
    pub fn open(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            walls: Vec::new(),
        }
    }
}
