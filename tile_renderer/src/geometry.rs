// geometry.rs - Polygons, vertex records and the polygon-to-triangle adapter
//
// Positions are meters in maze space; the shader maps them to clip space.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;
use std::ops::Add;

use crate::color::Color;

/// 2D point in meters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cartesian {
    pub x: f32,
    pub y: f32,
}

impl Cartesian {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Cartesian {
    type Output = Cartesian;

    #[inline]
    fn add(self, other: Cartesian) -> Cartesian {
        Cartesian::new(self.x + other.x, self.y + other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub p1: Cartesian,
    pub p2: Cartesian,
    pub p3: Cartesian,
}

/// Convex polygon, vertices in winding order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    vertices: Vec<Cartesian>,
}

impl Polygon {
    pub fn new(vertices: Vec<Cartesian>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned rectangle, wound lower-left, upper-left, upper-right, lower-right
    pub fn rectangle(lower_left: Cartesian, upper_right: Cartesian) -> Self {
        Self::new(vec![
            lower_left,
            Cartesian::new(lower_left.x, upper_right.y),
            upper_right,
            Cartesian::new(upper_right.x, lower_left.y),
        ])
    }

    pub fn vertices(&self) -> &[Cartesian] {
        &self.vertices
    }

    /// Fan triangulation around the first vertex. A polygon of n vertices
    /// yields n - 2 triangles; degenerate polygons yield none.
    pub fn triangles(&self) -> Vec<Triangle> {
        if self.vertices.len() < 3 {
            return Vec::new();
        }
        let anchor = self.vertices[0];
        self.vertices[1..]
            .windows(2)
            .map(|pair| Triangle {
                p1: anchor,
                p2: pair[0],
                p3: pair[1],
            })
            .collect()
    }
}

// ============================================================================
// VERTEX RECORDS
// ============================================================================

/// Colored vertex consumed by the polygon pipeline
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct VertexGraphic {
    pub position: [f32; 2],
    pub rgb: [f32; 3],
    pub alpha: f32,
}

impl VertexGraphic {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: &[wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
            0 => Float32x2,  // position
            1 => Float32x3,  // rgb
            2 => Float32,    // alpha
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VertexGraphic>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: ATTRIBUTES,
        }
    }
}

/// Textured vertex consumed by the glyph pipeline
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct VertexTexture {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl VertexTexture {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: &[wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
            0 => Float32x2,  // position
            1 => Float32x2,  // uv
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VertexTexture>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TriangleGraphic {
    pub p1: VertexGraphic,
    pub p2: VertexGraphic,
    pub p3: VertexGraphic,
}

impl TriangleGraphic {
    #[inline]
    pub fn vertices_mut(&mut self) -> [&mut VertexGraphic; 3] {
        [&mut self.p1, &mut self.p2, &mut self.p3]
    }

    #[inline]
    pub fn vertices(&self) -> [&VertexGraphic; 3] {
        [&self.p1, &self.p2, &self.p3]
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TriangleTexture {
    pub p1: VertexTexture,
    pub p2: VertexTexture,
    pub p3: VertexTexture,
}

// The buffers are uploaded verbatim, so no implicit padding is allowed.
const_assert_eq!(std::mem::size_of::<VertexGraphic>(), 24);
const_assert_eq!(std::mem::size_of::<TriangleGraphic>(), 72);
const_assert_eq!(std::mem::size_of::<VertexTexture>(), 16);
const_assert_eq!(std::mem::size_of::<TriangleTexture>(), 48);

/// Converts a polygon into colored triangles, one per fan triangle
pub fn polygon_to_triangle_graphics(
    polygon: &Polygon,
    color: Color,
    alpha: f32,
) -> Vec<TriangleGraphic> {
    let rgb = color.rgb().to_f32();
    let vertex = |p: Cartesian| VertexGraphic {
        position: [p.x, p.y],
        rgb,
        alpha,
    };
    polygon
        .triangles()
        .into_iter()
        .map(|triangle| TriangleGraphic {
            p1: vertex(triangle.p1),
            p2: vertex(triangle.p2),
            p3: vertex(triangle.p3),
        })
        .collect()
}
