//! Geometry and renderable object types shared by the stage, pools and
//! surfaces.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use livesplit_core::rendering::SharedOwnership;

/// Straight-alpha RGBA color with components in `[0, 1]`.
pub type Color = [f32; 4];

/// A vertex in a tessellated mesh, ready for the GPU.
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// Position in the mesh's local unit space.
    pub position: [f32; 2],
}

/// A tessellated shape stored as indexed triangle data in unit space
/// (`[0, 1] × [0, 1]`). Sprites stretch it to their dimensions.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Triangle vertices.
    pub vertices: Arc<Vec<Vertex>>,
    /// Triangle indices into [`vertices`](Self::vertices).
    pub indices: Arc<Vec<u32>>,
}

impl SharedOwnership for Mesh {
    fn share(&self) -> Self {
        self.clone()
    }
}

/// Text label handle produced by livesplit-core's default text engine. Its
/// glyphs are [`Mesh`] outlines in em units.
pub type TextLabel = livesplit_core::rendering::default_text_engine::Label<Option<Mesh>>;

/// Font handle of the default text engine.
pub type TextFont = livesplit_core::rendering::default_text_engine::Font;

/// A point in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal position, growing right.
    pub x: f32,
    /// Vertical position, growing down.
    pub y: f32,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Dim {
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Dim {
    /// Create a dimension.
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Convert a canvas size in whole pixels.
    // Canvas sizes are small relative to the f32 mantissa.
    #[expect(clippy::cast_precision_loss)]
    pub fn from_pixels([width, height]: [u32; 2]) -> Self {
        Self::new(width as f32, height as f32)
    }
}

/// What a sprite draws.
pub enum Shape {
    /// A unit-space mesh stretched to the sprite's dimensions.
    Mesh(Mesh),
    /// A text label centered in the sprite's box.
    Text(TextLabel),
}

/// A renderable display object.
///
/// Sprites are created once by a pool's draw function and then reused;
/// only their attributes change between frames.
pub struct Sprite {
    /// Geometry.
    pub shape: Shape,
    /// Text currently shaped into [`Shape::Text`]. Empty for meshes.
    pub text: String,
    /// Font size in pixels for text sprites.
    pub font_size: f32,
    /// Top-left corner in world (buffer) pixels.
    pub pos: Point,
    /// Size in pixels. Text is centered inside this box.
    pub dim: Dim,
    /// Fill color.
    pub tint: Color,
    /// Whether the sprite is drawn.
    pub visible: bool,
    /// Whether pointer hover is hit-tested against the sprite.
    pub interactive: bool,
    /// Draw order stamp; higher values are drawn later (on top).
    pub order: u64,
}

impl Sprite {
    /// A hidden mesh sprite.
    pub fn mesh(mesh: Mesh, tint: Color) -> Self {
        Self::hidden(Shape::Mesh(mesh), String::new(), tint)
    }

    /// A hidden text sprite whose label already holds `text`.
    pub fn text(label: TextLabel, text: impl Into<String>, tint: Color) -> Self {
        Self::hidden(Shape::Text(label), text.into(), tint)
    }

    fn hidden(shape: Shape, text: String, tint: Color) -> Self {
        Self {
            shape,
            text,
            font_size: 12.0,
            pos: Point::default(),
            dim: Dim::default(),
            tint,
            visible: false,
            interactive: false,
            order: 0,
        }
    }

    /// Whether `point` (world pixels) lies inside the sprite's box.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.pos.x
            && point.y >= self.pos.y
            && point.x < self.pos.x + self.dim.width
            && point.y < self.pos.y + self.dim.height
    }
}

/// Maps world (buffer) pixels to screen pixels: `screen = (world − offset) × scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    /// Top-left of the visible window in world pixels.
    pub offset: Point,
    /// Uniform content scale.
    pub scale: f32,
}

impl ViewTransform {
    /// No translation, unit scale. Used for screen-space overlays.
    pub const IDENTITY: Self = Self {
        offset: Point::new(0.0, 0.0),
        scale: 1.0,
    };

    /// Convert a world point to screen pixels.
    pub fn to_screen(&self, world: Point) -> Point {
        Point::new(
            (world.x - self.offset.x) * self.scale,
            (world.y - self.offset.y) * self.scale,
        )
    }

    /// Convert a screen point to world pixels.
    pub fn to_world(&self, screen: Point) -> Point {
        Point::new(
            screen.x / self.scale + self.offset.x,
            screen.y / self.scale + self.offset.y,
        )
    }
}

/// Convert a `0xRRGGBB` value to an opaque [`Color`].
pub fn rgb(hex: u32) -> Color {
    let channel = |shift: u32| f32::from(u8::try_from((hex >> shift) & 0xff).unwrap_or(0)) / 255.0;
    [channel(16), channel(8), channel(0), 1.0]
}
