// maze.rs - Ground-truth maze: wall flags, distances and tile geometry

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::config::GeometryConfig;
use crate::error_handling::{RendererError, Result};
use crate::geometry::{Cartesian, Polygon};
use crate::types::MazeData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

/// Fixed direction ordering; wall slots are laid out in this order
pub const DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

impl Direction {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Grid step taken when leaving a tile through this side
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'n' => Ok(Direction::North),
            'e' => Ok(Direction::East),
            's' => Ok(Direction::South),
            'w' => Ok(Direction::West),
            other => Err(RendererError::UnknownDirectionChar(other)),
        }
    }
}

/// One grid cell of the maze
#[derive(Debug, Clone)]
pub struct Tile {
    x: usize,
    y: usize,
    walls: [bool; 4],
    distance: Option<u32>,
    full_polygon: Polygon,
    wall_polygons: [Polygon; 4],
    corner_polygons: [Polygon; 4],
}

impl Tile {
    fn new(x: usize, y: usize, walls: [bool; 4], geometry: &GeometryConfig) -> Self {
        let pitch = geometry.tile_pitch();
        let half = geometry.wall_width / 2.0;
        let ll = Cartesian::new(x as f32 * pitch, y as f32 * pitch);
        let ur = Cartesian::new(ll.x + pitch, ll.y + pitch);

        let rect = |x0: f32, y0: f32, x1: f32, y1: f32| {
            Polygon::rectangle(Cartesian::new(x0, y0), Cartesian::new(x1, y1))
        };

        // Indexed by Direction::index()
        let wall_polygons = [
            rect(ll.x + half, ur.y - half, ur.x - half, ur.y),
            rect(ur.x - half, ll.y + half, ur.x, ur.y - half),
            rect(ll.x + half, ll.y, ur.x - half, ll.y + half),
            rect(ll.x, ll.y + half, ll.x + half, ur.y - half),
        ];

        // Lower-left, upper-left, upper-right, lower-right
        let corner_polygons = [
            rect(ll.x, ll.y, ll.x + half, ll.y + half),
            rect(ll.x, ur.y - half, ll.x + half, ur.y),
            rect(ur.x - half, ur.y - half, ur.x, ur.y),
            rect(ur.x - half, ll.y, ur.x, ll.y + half),
        ];

        Self {
            x,
            y,
            walls,
            distance: None,
            full_polygon: Polygon::rectangle(ll, ur),
            wall_polygons,
            corner_polygons,
        }
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    pub fn is_wall(&self, direction: Direction) -> bool {
        self.walls[direction.index()]
    }

    /// Steps to the goal, `None` when unreachable
    pub fn distance(&self) -> Option<u32> {
        self.distance
    }

    pub fn full_polygon(&self) -> &Polygon {
        &self.full_polygon
    }

    pub fn wall_polygon(&self, direction: Direction) -> &Polygon {
        &self.wall_polygons[direction.index()]
    }

    pub fn corner_polygons(&self) -> &[Polygon] {
        &self.corner_polygons
    }
}

/// Immutable truth source; tiles stored column-major (x * height + y)
#[derive(Debug, Clone)]
pub struct Maze {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Maze {
    pub fn from_data(data: &MazeData, geometry: &GeometryConfig) -> Result<Self> {
        let (width, height) = (data.width, data.height);
        if width == 0 || height == 0 {
            return Err(RendererError::InvalidMazeData {
                reason: format!("maze must be at least 1x1, got {}x{}", width, height),
            });
        }

        // Boundary walls are always present
        let mut walls = vec![[false; 4]; width * height];
        for x in 0..width {
            for y in 0..height {
                let w = &mut walls[x * height + y];
                w[Direction::North.index()] = y == height - 1;
                w[Direction::East.index()] = x == width - 1;
                w[Direction::South.index()] = y == 0;
                w[Direction::West.index()] = x == 0;
            }
        }

        for record in &data.walls {
            if record.x >= width || record.y >= height {
                return Err(RendererError::InvalidMazeData {
                    reason: format!(
                        "wall at ({}, {}) lies outside the {}x{} maze",
                        record.x, record.y, width, height
                    ),
                });
            }
            walls[record.x * height + record.y][record.direction.index()] = true;
            let (dx, dy) = record.direction.offset();
            let (nx, ny) = (record.x as i64 + dx, record.y as i64 + dy);
            if (0..width as i64).contains(&nx) && (0..height as i64).contains(&ny) {
                walls[nx as usize * height + ny as usize][record.direction.opposite().index()] = true;
            }
        }

        let mut tiles = Vec::with_capacity(width * height);
        for x in 0..width {
            for y in 0..height {
                tiles.push(Tile::new(x, y, walls[x * height + y], geometry));
            }
        }

        let mut maze = Self { width, height, tiles };
        maze.compute_distances();
        log::debug!("Built {}x{} maze with {} interior walls", width, height, data.walls.len());
        Ok(maze)
    }

    /// Maze with only its boundary walls
    pub fn open(width: usize, height: usize, geometry: &GeometryConfig) -> Result<Self> {
        Self::from_data(&MazeData::open(width, height), geometry)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        (0..self.width as i64).contains(&x) && (0..self.height as i64).contains(&y)
    }

    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile> {
        if x < self.width && y < self.height {
            Some(&self.tiles[x * self.height + y])
        } else {
            None
        }
    }

    /// Tiles in buffer order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Centre tiles; four of them when a dimension is even
    pub fn goal_tiles(&self) -> Vec<(usize, usize)> {
        let xs = [(self.width - 1) / 2, self.width / 2];
        let ys = [(self.height - 1) / 2, self.height / 2];
        let mut goals = Vec::with_capacity(4);
        for &x in &xs {
            for &y in &ys {
                if !goals.contains(&(x, y)) {
                    goals.push((x, y));
                }
            }
        }
        goals
    }

    /// Breadth-first flood from the goal tiles through open sides
    fn compute_distances(&mut self) {
        let height = self.height;
        let mut queue = VecDeque::new();
        for (x, y) in self.goal_tiles() {
            self.tiles[x * height + y].distance = Some(0);
            queue.push_back((x, y));
        }

        while let Some((x, y)) = queue.pop_front() {
            let here = &self.tiles[x * height + y];
            let next_distance = here.distance.map_or(0, |d| d + 1);
            let open: Vec<Direction> = DIRECTIONS
                .iter()
                .copied()
                .filter(|&d| !here.is_wall(d))
                .collect();

            for direction in open {
                let (dx, dy) = direction.offset();
                let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                if !self.contains(nx, ny) {
                    continue;
                }
                let neighbour = &mut self.tiles[nx as usize * height + ny as usize];
                if neighbour.distance.is_none() {
                    neighbour.distance = Some(next_distance);
                    queue.push_back((nx as usize, ny as usize));
                }
            }
        }
    }
}
