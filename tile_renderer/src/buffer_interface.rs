// buffer_interface.rs - Fixed-slot addressing into the shared triangle buffers
//
// Every tile owns a contiguous block of TRIANGLES_PER_TILE triangle graphics
// and a contiguous block of 2 * max_rows * max_cols triangle textures. Blocks
// are ordered by (height * x + y). The slot offsets below must match the order
// in which TileGraphic::draw inserts polygons.

use static_assertions::const_assert_eq;

use crate::color::Color;
use crate::error_handling::Result;
use crate::geometry::{polygon_to_triangle_graphics, Polygon, TriangleGraphic, TriangleTexture, VertexTexture};
use crate::maze::{Direction, DIRECTIONS};
use crate::text_cache::{GlyphAtlas, TileTextAlignment, TileTextLayout};

pub const TRIANGLES_PER_POLYGON: usize = 2;
pub const CORNERS_PER_TILE: usize = 4;

const BASE_SLOT_OFFSET: usize = 0;
const WALL_SLOT_OFFSET: usize = BASE_SLOT_OFFSET + TRIANGLES_PER_POLYGON;
const CORNER_SLOT_OFFSET: usize = WALL_SLOT_OFFSET + DIRECTIONS.len() * TRIANGLES_PER_POLYGON;
const FOG_SLOT_OFFSET: usize = CORNER_SLOT_OFFSET + CORNERS_PER_TILE * TRIANGLES_PER_POLYGON;

/// Base 2 + walls 8 + corners 8 + fog 2
pub const TRIANGLES_PER_TILE: usize = 20;

const_assert_eq!(WALL_SLOT_OFFSET, 2);
const_assert_eq!(CORNER_SLOT_OFFSET, 10);
const_assert_eq!(FOG_SLOT_OFFSET, 18);
const_assert_eq!(FOG_SLOT_OFFSET + TRIANGLES_PER_POLYGON, TRIANGLES_PER_TILE);

/// One polygon's span within a tile's graphic block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileSlot {
    Base,
    Wall(Direction),
    Corner(usize),
    Fog,
}

impl TileSlot {
    /// Slots in insertion order
    pub const LAYOUT: [TileSlot; 10] = [
        TileSlot::Base,
        TileSlot::Wall(Direction::North),
        TileSlot::Wall(Direction::East),
        TileSlot::Wall(Direction::South),
        TileSlot::Wall(Direction::West),
        TileSlot::Corner(0),
        TileSlot::Corner(1),
        TileSlot::Corner(2),
        TileSlot::Corner(3),
        TileSlot::Fog,
    ];

    /// First triangle of the slot, relative to the tile block
    pub const fn offset(self) -> usize {
        match self {
            TileSlot::Base => BASE_SLOT_OFFSET,
            TileSlot::Wall(direction) => WALL_SLOT_OFFSET + TRIANGLES_PER_POLYGON * direction.index(),
            TileSlot::Corner(corner) => CORNER_SLOT_OFFSET + TRIANGLES_PER_POLYGON * corner,
            TileSlot::Fog => FOG_SLOT_OFFSET,
        }
    }
}

const_assert_eq!(TileSlot::LAYOUT.len() * TRIANGLES_PER_POLYGON, TRIANGLES_PER_TILE);

/// Owner of the CPU-side graphic and texture buffers.
///
/// Setup is insert-only: every tile inserts its polygons and blank text cells
/// in slot order, then `seal` fixes the buffer lengths. Afterwards only the
/// `update_*` methods touch the buffers, and only whole 2-triangle slots.
/// Coordinates are not validated here; callers must pass in-range tiles.
pub struct BufferInterface {
    maze_size: (usize, usize),
    graphic_buffer: Vec<TriangleGraphic>,
    texture_buffer: Vec<TriangleTexture>,
    text_layout: Option<TileTextLayout>,
    sealed: bool,
}

impl BufferInterface {
    /// `maze_size` is `(width, height)`
    pub fn new(maze_size: (usize, usize)) -> Self {
        let tiles = maze_size.0 * maze_size.1;
        Self {
            maze_size,
            graphic_buffer: Vec::with_capacity(tiles * TRIANGLES_PER_TILE),
            texture_buffer: Vec::new(),
            text_layout: None,
            sealed: false,
        }
    }

    /// Must run exactly once, before any text cell is inserted or updated
    pub fn init_tile_graphic_text_layout(
        &mut self,
        wall_length: f32,
        wall_width: f32,
        max_size: (usize, usize),
        atlas: GlyphAtlas,
        border_fraction: f32,
        alignment: TileTextAlignment,
    ) -> Result<()> {
        assert!(
            self.text_layout.is_none(),
            "tile text layout initialized twice"
        );
        let layout = TileTextLayout::new(
            wall_length,
            wall_width,
            max_size,
            atlas,
            border_fraction,
            alignment,
        )?;
        let tiles = self.maze_size.0 * self.maze_size.1;
        self.texture_buffer
            .reserve_exact(tiles * Self::text_block_size(layout.max_size()));
        self.text_layout = Some(layout);
        Ok(())
    }

    fn text_layout(&self) -> &TileTextLayout {
        match &self.text_layout {
            Some(layout) => layout,
            None => panic!("tile text layout queried before initialization"),
        }
    }

    /// `(max_rows, max_cols)` of every tile's text grid
    pub fn tile_graphic_text_max_size(&self) -> (usize, usize) {
        self.text_layout().max_size()
    }

    #[inline]
    pub const fn triangles_per_tile() -> usize {
        TRIANGLES_PER_TILE
    }

    pub fn maze_size(&self) -> (usize, usize) {
        self.maze_size
    }

    pub fn graphic_buffer(&self) -> &[TriangleGraphic] {
        &self.graphic_buffer
    }

    pub fn texture_buffer(&self) -> &[TriangleTexture] {
        &self.texture_buffer
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    // ------------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------------

    pub fn insert_polygon(&mut self, polygon: &Polygon, color: Color, alpha: f32) {
        assert!(!self.sealed, "polygon inserted after buffer setup was sealed");
        let triangles = polygon_to_triangle_graphics(polygon, color, alpha);
        debug_assert_eq!(
            triangles.len(),
            TRIANGLES_PER_POLYGON,
            "polygon with {} vertices does not fill one slot",
            polygon.vertices().len()
        );
        self.graphic_buffer.extend(triangles);
    }

    /// Appends two placeholder triangles. Their `v` coordinates never change;
    /// everything else is written by `update_text_cell`.
    pub fn insert_blank_text_cell(&mut self) {
        assert!(!self.sealed, "text cell inserted after buffer setup was sealed");
        let vertex = |v: f32| VertexTexture {
            position: [0.0, 0.0],
            uv: [0.0, v],
        };
        self.texture_buffer.push(TriangleTexture {
            p1: vertex(0.0),
            p2: vertex(1.0),
            p3: vertex(1.0),
        });
        self.texture_buffer.push(TriangleTexture {
            p1: vertex(0.0),
            p2: vertex(1.0),
            p3: vertex(0.0),
        });
    }

    /// Ends setup; the buffers keep their length from here on
    pub fn seal(&mut self) {
        let tiles = self.maze_size.0 * self.maze_size.1;
        assert_eq!(
            self.graphic_buffer.len(),
            tiles * TRIANGLES_PER_TILE,
            "graphic buffer does not hold exactly one block per tile"
        );
        assert_eq!(
            self.texture_buffer.len(),
            tiles * Self::text_block_size(self.tile_graphic_text_max_size()),
            "texture buffer does not hold exactly one block per tile"
        );
        self.sealed = true;
        log::info!(
            "Sealed tile buffers: {} triangle graphics, {} triangle textures",
            self.graphic_buffer.len(),
            self.texture_buffer.len()
        );
    }

    // ------------------------------------------------------------------------
    // Updates
    // ------------------------------------------------------------------------

    fn graphic_slot_mut(&mut self, index: usize) -> &mut [TriangleGraphic] {
        assert!(
            index + TRIANGLES_PER_POLYGON <= self.graphic_buffer.len(),
            "graphic slot {} updated before it was inserted",
            index
        );
        &mut self.graphic_buffer[index..index + TRIANGLES_PER_POLYGON]
    }

    pub fn update_base_color(&mut self, x: usize, y: usize, color: Color) {
        let rgb = color.rgb().to_f32();
        let index = self.base_starting_index(x, y);
        for triangle in self.graphic_slot_mut(index) {
            for vertex in triangle.vertices_mut() {
                vertex.rgb = rgb;
            }
        }
    }

    pub fn update_wall_color(&mut self, x: usize, y: usize, direction: Direction, color: Color, alpha: f32) {
        let rgb = color.rgb().to_f32();
        let index = self.wall_starting_index(x, y, direction);
        for triangle in self.graphic_slot_mut(index) {
            for vertex in triangle.vertices_mut() {
                vertex.rgb = rgb;
                vertex.alpha = alpha;
            }
        }
    }

    pub fn update_corner_color(&mut self, x: usize, y: usize, corner: usize, color: Color) {
        let rgb = color.rgb().to_f32();
        let index = self.corner_starting_index(x, y, corner);
        for triangle in self.graphic_slot_mut(index) {
            for vertex in triangle.vertices_mut() {
                vertex.rgb = rgb;
            }
        }
    }

    pub fn update_fog_color(&mut self, x: usize, y: usize, color: Color) {
        let rgb = color.rgb().to_f32();
        let index = self.fog_starting_index(x, y);
        for triangle in self.graphic_slot_mut(index) {
            for vertex in triangle.vertices_mut() {
                vertex.rgb = rgb;
            }
        }
    }

    pub fn update_fog_alpha(&mut self, x: usize, y: usize, alpha: f32) {
        let index = self.fog_starting_index(x, y);
        for triangle in self.graphic_slot_mut(index) {
            for vertex in triangle.vertices_mut() {
                vertex.alpha = alpha;
            }
        }
    }

    //    +---------[UR]  [p2]-------[p3]    [p2]
    //    |         / |    |         /       / |
    //    |  t1   /   |    |  t1   /       /   |
    //    |     /     |    |     /       /     |
    //    |   /   t2  |    |   /       /   t2  |
    //    | /         |    | /       /         |
    //   [LL]---------+   [p1]     [p1]------[p3]
    #[allow(clippy::too_many_arguments)]
    pub fn update_text_cell(
        &mut self,
        x: usize,
        y: usize,
        rows_in_use: usize,
        cols_in_use: usize,
        row: usize,
        col: usize,
        character: char,
    ) {
        let layout = self.text_layout();
        let (u_start, u_end) = layout.glyph_span(character);
        let (ll, ur) = layout.text_position(x, y, rows_in_use, cols_in_use, row, col);
        let index = self.text_starting_index(x, y, row, col);

        assert!(
            index + TRIANGLES_PER_POLYGON <= self.texture_buffer.len(),
            "text cell {} updated before it was inserted",
            index
        );
        let cell = &mut self.texture_buffer[index..index + TRIANGLES_PER_POLYGON];

        let t1 = &mut cell[0];
        t1.p1.position = [ll.x, ll.y];
        t1.p1.uv[0] = u_start;
        t1.p2.position = [ll.x, ur.y];
        t1.p2.uv[0] = u_start;
        t1.p3.position = [ur.x, ur.y];
        t1.p3.uv[0] = u_end;

        let t2 = &mut cell[1];
        t2.p1.position = [ll.x, ll.y];
        t2.p1.uv[0] = u_start;
        t2.p2.position = [ur.x, ur.y];
        t2.p2.uv[0] = u_end;
        t2.p3.position = [ur.x, ll.y];
        t2.p3.uv[0] = u_end;
    }

    // ------------------------------------------------------------------------
    // Index arithmetic
    // ------------------------------------------------------------------------

    /// Column-major: tiles of one column are adjacent
    #[inline]
    pub fn tile_block_index(&self, x: usize, y: usize) -> usize {
        self.maze_size.1 * x + y
    }

    #[inline]
    pub fn slot_starting_index(&self, x: usize, y: usize, slot: TileSlot) -> usize {
        TRIANGLES_PER_TILE * self.tile_block_index(x, y) + slot.offset()
    }

    pub fn base_starting_index(&self, x: usize, y: usize) -> usize {
        self.slot_starting_index(x, y, TileSlot::Base)
    }

    pub fn wall_starting_index(&self, x: usize, y: usize, direction: Direction) -> usize {
        self.slot_starting_index(x, y, TileSlot::Wall(direction))
    }

    pub fn corner_starting_index(&self, x: usize, y: usize, corner: usize) -> usize {
        self.slot_starting_index(x, y, TileSlot::Corner(corner))
    }

    pub fn fog_starting_index(&self, x: usize, y: usize) -> usize {
        self.slot_starting_index(x, y, TileSlot::Fog)
    }

    fn text_block_size((max_rows, max_cols): (usize, usize)) -> usize {
        TRIANGLES_PER_POLYGON * max_rows * max_cols
    }

    pub fn text_starting_index(&self, x: usize, y: usize, row: usize, col: usize) -> usize {
        let (max_rows, max_cols) = self.tile_graphic_text_max_size();
        Self::text_block_size((max_rows, max_cols)) * self.tile_block_index(x, y)
            + TRIANGLES_PER_POLYGON * (row * max_cols + col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Cartesian;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn square() -> Polygon {
        Polygon::rectangle(Cartesian::new(0.0, 0.0), Cartesian::new(1.0, 1.0))
    }

    /// Buffers filled the way a maze graphic fills them, without tile semantics
    fn filled(width: usize, height: usize, text: (usize, usize)) -> BufferInterface {
        let mut buffers = BufferInterface::new((width, height));
        buffers
            .init_tile_graphic_text_layout(
                1.0,
                0.5,
                text,
                GlyphAtlas::from_characters(" 0123456789"),
                0.0,
                TileTextAlignment::UpperLeft,
            )
            .unwrap();
        for _ in 0..width * height {
            for _ in TileSlot::LAYOUT {
                buffers.insert_polygon(&square(), Color::Black, 1.0);
            }
            for _ in 0..text.0 * text.1 {
                buffers.insert_blank_text_cell();
            }
        }
        buffers.seal();
        buffers
    }

    #[test]
    fn test_slot_offsets() {
        assert_eq!(BufferInterface::triangles_per_tile(), 20);
        let offsets: Vec<_> = TileSlot::LAYOUT.iter().map(|s| s.offset()).collect();
        assert_eq!(offsets, vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18]);
    }

    #[test]
    fn test_layout_is_column_major() {
        let buffers = filled(3, 5, (1, 1));
        assert_eq!(buffers.base_starting_index(0, 1), 20);
        assert_eq!(buffers.base_starting_index(1, 0), 100);
        assert_eq!(buffers.wall_starting_index(1, 2, Direction::South), 20 * 7 + 6);
        assert_eq!(buffers.corner_starting_index(0, 0, 3), 16);
        assert_eq!(buffers.fog_starting_index(2, 4), 20 * 14 + 18);
    }

    #[test]
    fn test_text_offsets() {
        let buffers = filled(2, 3, (2, 4));
        assert_eq!(buffers.text_starting_index(0, 0, 0, 0), 0);
        assert_eq!(buffers.text_starting_index(0, 0, 1, 2), 12);
        assert_eq!(buffers.text_starting_index(1, 1, 0, 1), 16 * 4 + 2);
        assert_eq!(buffers.texture_buffer().len(), 6 * 16);
    }

    #[test]
    fn test_wall_update_touches_only_its_slot() {
        let mut buffers = filled(2, 2, (1, 1));
        let before = buffers.graphic_buffer().to_vec();
        buffers.update_wall_color(1, 0, Direction::East, Color::Red, 0.5);

        let start = buffers.wall_starting_index(1, 0, Direction::East);
        for (i, (old, new)) in before.iter().zip(buffers.graphic_buffer()).enumerate() {
            if (start..start + 2).contains(&i) {
                for (o, n) in old.vertices().iter().zip(new.vertices()) {
                    assert_eq!(n.rgb, [1.0, 0.0, 0.0]);
                    assert_eq!(n.alpha, 0.5);
                    assert_eq!(o.position, n.position);
                }
            } else {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn test_base_and_fog_updates() {
        let mut buffers = filled(1, 1, (1, 1));
        buffers.update_base_color(0, 0, Color::Blue);
        buffers.update_fog_alpha(0, 0, 0.25);
        for triangle in &buffers.graphic_buffer()[0..2] {
            for vertex in triangle.vertices() {
                assert_eq!(vertex.rgb, [0.0, 0.0, 1.0]);
                assert_eq!(vertex.alpha, 1.0);
            }
        }
        for triangle in &buffers.graphic_buffer()[18..20] {
            for vertex in triangle.vertices() {
                assert_eq!(vertex.rgb, [0.0, 0.0, 0.0]);
                assert_eq!(vertex.alpha, 0.25);
            }
        }
    }

    #[test]
    fn test_corner_and_fog_color_updates() {
        let mut buffers = filled(1, 2, (1, 1));
        buffers.update_fog_alpha(0, 1, 0.25);
        buffers.update_corner_color(0, 1, 2, Color::Blue);
        buffers.update_fog_color(0, 1, Color::Green);

        let corner = buffers.corner_starting_index(0, 1, 2);
        let fog = buffers.fog_starting_index(0, 1);
        for (i, triangle) in buffers.graphic_buffer().iter().enumerate() {
            for vertex in triangle.vertices() {
                if (corner..corner + 2).contains(&i) {
                    assert_eq!(vertex.rgb, Color::Blue.rgb().to_f32());
                    assert_eq!(vertex.alpha, 1.0);
                } else if (fog..fog + 2).contains(&i) {
                    assert_eq!(vertex.rgb, Color::Green.rgb().to_f32());
                    assert_eq!(vertex.alpha, 0.25);
                } else {
                    assert_eq!(vertex.rgb, [0.0, 0.0, 0.0]);
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "does not fill one slot")]
    #[cfg(debug_assertions)]
    fn test_insert_rejects_polygon_outside_slot_size() {
        let mut buffers = BufferInterface::new((1, 1));
        let triangle = Polygon::new(vec![
            Cartesian::new(0.0, 0.0),
            Cartesian::new(1.0, 0.0),
            Cartesian::new(0.0, 1.0),
        ]);
        buffers.insert_polygon(&triangle, Color::Red, 1.0);
    }

    #[test]
    fn test_text_cell_update() {
        let mut buffers = filled(1, 1, (1, 1));
        buffers.update_text_cell(0, 0, 1, 1, 0, 0, '0');

        let (ll, ur) = ((0.25, 0.25), (1.25, 1.25));
        let cell = &buffers.texture_buffer()[0..2];
        // Glyph '0' is the second of eleven
        let (u0, u1) = (1.0 / 11.0, 2.0 / 11.0);
        assert_eq!(cell[0].p1, VertexTexture { position: [ll.0, ll.1], uv: [u0, 0.0] });
        assert_eq!(cell[0].p2, VertexTexture { position: [ll.0, ur.1], uv: [u0, 1.0] });
        assert_eq!(cell[0].p3, VertexTexture { position: [ur.0, ur.1], uv: [u1, 1.0] });
        assert_eq!(cell[1].p1, VertexTexture { position: [ll.0, ll.1], uv: [u0, 0.0] });
        assert_eq!(cell[1].p2, VertexTexture { position: [ur.0, ur.1], uv: [u1, 1.0] });
        assert_eq!(cell[1].p3, VertexTexture { position: [ur.0, ll.1], uv: [u1, 0.0] });
    }

    #[test]
    #[should_panic(expected = "queried before initialization")]
    fn test_text_size_before_init_panics() {
        let buffers = BufferInterface::new((1, 1));
        buffers.tile_graphic_text_max_size();
    }

    #[test]
    #[should_panic(expected = "updated before it was inserted")]
    fn test_update_before_insert_panics() {
        let mut buffers = BufferInterface::new((1, 1));
        buffers.update_fog_alpha(0, 0, 1.0);
    }

    #[test]
    #[should_panic(expected = "after buffer setup was sealed")]
    fn test_insert_after_seal_panics() {
        let mut buffers = filled(1, 1, (1, 1));
        buffers.insert_polygon(&square(), Color::Red, 1.0);
    }

    proptest! {
        #[test]
        fn prop_graphic_slots_partition_the_buffer(width in 1usize..12, height in 1usize..12) {
            let buffers = BufferInterface::new((width, height));
            let mut seen = HashSet::new();
            for x in 0..width {
                for y in 0..height {
                    for slot in TileSlot::LAYOUT {
                        let index = buffers.slot_starting_index(x, y, slot);
                        prop_assert_eq!(index % TRIANGLES_PER_POLYGON, 0);
                        prop_assert!(index < width * height * TRIANGLES_PER_TILE);
                        prop_assert!(seen.insert(index), "slot {:?} of ({}, {}) aliases", slot, x, y);
                    }
                }
            }
            prop_assert_eq!(seen.len(), width * height * TileSlot::LAYOUT.len());
        }

        #[test]
        fn prop_text_slots_are_distinct(width in 1usize..6, height in 1usize..6, rows in 1usize..4, cols in 1usize..5) {
            let buffers = filled(width, height, (rows, cols));
            let mut seen = HashSet::new();
            for x in 0..width {
                for y in 0..height {
                    for row in 0..rows {
                        for col in 0..cols {
                            let index = buffers.text_starting_index(x, y, row, col);
                            prop_assert!(index + 1 < buffers.texture_buffer().len());
                            prop_assert!(seen.insert(index));
                        }
                    }
                }
            }
        }
    }
}
