//! Shape allocation: unit-space meshes tessellated via lyon, and text labels
//! shaped by livesplit-core's default text engine.

use livesplit_core::rendering::default_text_engine::TextEngine;
use livesplit_core::rendering::{self, FontKind, Label as _};
use lyon::math::point;
use lyon::path::Path as LyonPath;
use lyon::tessellation::*;
use std::sync::Arc;

use crate::types::{Color, Mesh, Shape, Sprite, TextFont, TextLabel, Vertex};

/// Lyon-backed path builder that produces [`Mesh`] on `finish()`.
///
/// The text engine drives it to extract glyph outlines.
pub struct MeshBuilder {
    builder: lyon::path::path::Builder,
}

impl rendering::PathBuilder for MeshBuilder {
    type Path = Option<Mesh>;

    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.begin(point(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(point(x, y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quadratic_bezier_to(point(x1, y1), point(x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder
            .cubic_bezier_to(point(x1, y1), point(x2, y2), point(x, y));
    }

    fn close(&mut self) {
        self.builder.close();
    }

    fn finish(self) -> Self::Path {
        let path = self.builder.build();
        tessellate_path(&path)
    }
}

/// Tessellate a lyon path into an indexed triangle mesh.
fn tessellate_path(path: &LyonPath) -> Option<Mesh> {
    let mut geometry: VertexBuffers<Vertex, u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();

    let result = tessellator.tessellate_path(
        path,
        &FillOptions::tolerance(0.01).with_fill_rule(FillRule::NonZero),
        &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex| Vertex {
            position: vertex.position().to_array(),
        }),
    );

    match result {
        Ok(_) if !geometry.vertices.is_empty() => Some(Mesh {
            vertices: Arc::new(geometry.vertices),
            indices: Arc::new(geometry.indices),
        }),
        _ => None,
    }
}

/// Tessellate a closed polygon given in unit space.
fn tessellate_polygon(corners: &[(f32, f32)]) -> Option<Mesh> {
    let (&(x0, y0), rest) = corners.split_first()?;
    let mut builder = LyonPath::builder();
    builder.begin(point(x0, y0));
    for &(x, y) in rest {
        builder.line_to(point(x, y));
    }
    builder.close();
    tessellate_path(&builder.build())
}

/// Unit-space shapes every scene draws with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnitShape {
    /// Axis-aligned square.
    Rect,
    /// Triangle pointing right, apex at the middle of the right edge.
    TriangleRight,
    /// Triangle pointing left, apex at the middle of the left edge.
    TriangleLeft,
    /// Triangle pointing down, apex at the middle of the bottom edge.
    TriangleDown,
}

impl UnitShape {
    fn corners(self) -> &'static [(f32, f32)] {
        match self {
            UnitShape::Rect => &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
            UnitShape::TriangleRight => &[(0.0, 0.0), (1.0, 0.5), (0.0, 1.0)],
            UnitShape::TriangleLeft => &[(1.0, 0.0), (1.0, 1.0), (0.0, 0.5)],
            UnitShape::TriangleDown => &[(0.0, 0.0), (1.0, 0.0), (0.5, 1.0)],
        }
    }
}

/// Creates the geometry behind sprites.
///
/// Unit meshes are tessellated once and shared between sprites; labels are
/// shaped on creation and reshaped only when their text changes.
pub struct ShapeAllocator {
    text_engine: TextEngine<Option<Mesh>>,
    font: TextFont,
    meshes: [Option<Mesh>; 4],
    /// Label reused for text measurement.
    scratch: Option<(TextLabel, String)>,
}

impl ShapeAllocator {
    /// Create an allocator using the text engine's bundled sans-serif font.
    pub fn new() -> Self {
        let mut text_engine = TextEngine::new();
        let font = text_engine.create_font(None, FontKind::Text);
        let meshes = [
            UnitShape::Rect,
            UnitShape::TriangleRight,
            UnitShape::TriangleLeft,
            UnitShape::TriangleDown,
        ]
        .map(|shape| tessellate_polygon(shape.corners()));
        Self {
            text_engine,
            font,
            meshes,
            scratch: None,
        }
    }

    /// Shared unit mesh for `shape`.
    ///
    /// # Panics
    ///
    /// Panics if lyon fails to tessellate one of the fixed unit polygons,
    /// which indicates a bug in the corner tables.
    pub fn unit_mesh(&self, shape: UnitShape) -> Mesh {
        let index = shape as usize;
        self.meshes[index]
            .clone()
            .expect("unit polygon failed to tessellate")
    }

    /// A hidden sprite drawing `shape` in `tint`.
    pub fn shape_sprite(&self, shape: UnitShape, tint: Color) -> Sprite {
        Sprite::mesh(self.unit_mesh(shape), tint)
    }

    /// A hidden sprite drawing `text` in `tint`.
    pub fn text_sprite(&mut self, text: &str, tint: Color) -> Sprite {
        let label = self.create_label(text);
        Sprite::text(label, text, tint)
    }

    /// Shape a new label.
    pub fn create_label(&mut self, text: &str) -> TextLabel {
        self.text_engine
            .create_label(mesh_builder, text, &mut self.font, None)
    }

    /// Reshape an existing label in place.
    pub fn update_label(&mut self, label: &mut TextLabel, text: &str) {
        self.text_engine
            .update_label(mesh_builder, label, text, &mut self.font, None);
    }

    /// Replace the text of a text sprite, reshaping only if it changed.
    /// Mesh sprites are left untouched.
    pub fn set_text(&mut self, sprite: &mut Sprite, text: &str) {
        if sprite.text == text {
            return;
        }
        if let Shape::Text(label) = &mut sprite.shape {
            self.update_label(label, text);
            sprite.text.clear();
            sprite.text.push_str(text);
        }
    }

    /// Width in pixels of `text` rendered at `font_size`.
    pub fn measure(&mut self, text: &str, font_size: f32) -> f32 {
        if self.scratch.is_none() {
            let label = self.create_label(text);
            self.scratch = Some((label, text.to_owned()));
        }
        let Some((label, current)) = &mut self.scratch else {
            return 0.0;
        };
        if current != text {
            self.text_engine
                .update_label(mesh_builder, label, text, &mut self.font, None);
            current.clear();
            current.push_str(text);
        }
        label.width(font_size)
    }
}

impl Default for ShapeAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Factory function matching the signature `TextEngine` expects for creating
/// path builders on demand during glyph outline extraction.
fn mesh_builder() -> MeshBuilder {
    MeshBuilder {
        builder: LyonPath::builder(),
    }
}
