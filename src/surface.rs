//! The boundary between the stage and a GPU.

use crate::error::RenderError;
use crate::stage::Stage;
use crate::types::{Color, ViewTransform};

/// Everything a surface needs to present one frame.
pub struct Frame<'a> {
    /// World-space sprites, drawn in the stage's prepared draw order.
    pub stage: &'a Stage,
    /// Maps the stage's world pixels to the canvas.
    pub view: ViewTransform,
    /// Screen-space sprites drawn on top with no transform, such as a
    /// tooltip.
    pub overlay: Option<&'a Stage>,
    /// Canvas clear color.
    pub background: Color,
}

/// A drawing target owned by a [`RenderApp`](crate::app::RenderApp).
pub trait Surface {
    /// Reallocate render targets for a canvas of `size` pixels.
    ///
    /// # Errors
    ///
    /// Fails if the GPU rejects the new targets.
    fn resize(&mut self, size: [u32; 2]) -> Result<(), RenderError>;

    /// Draw and present a frame.
    ///
    /// # Errors
    ///
    /// Fails if the frame could not be drawn.
    fn present(&mut self, frame: &Frame<'_>) -> Result<(), RenderError>;

    /// Release every GPU resource. The surface is unusable afterwards.
    fn destroy(&mut self);
}

/// A surface with no GPU behind it. Records what it was asked to do.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    /// Number of [`resize`](Surface::resize) calls.
    pub resizes: usize,
    /// Size passed to the last resize.
    pub size: [u32; 2],
    /// Number of frames presented.
    pub frames: usize,
    /// World-space sprites drawn in the last frame.
    pub last_frame_sprites: usize,
    /// Overlay sprites drawn in the last frame.
    pub last_overlay_sprites: usize,
    /// Whether [`destroy`](Surface::destroy) ran.
    pub destroyed: bool,
}

impl HeadlessSurface {
    /// Create a surface that has not been sized yet.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for HeadlessSurface {
    fn resize(&mut self, size: [u32; 2]) -> Result<(), RenderError> {
        self.resizes += 1;
        self.size = size;
        Ok(())
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        if self.destroyed {
            return Err(RenderError::Surface("surface was destroyed".to_owned()));
        }
        self.frames += 1;
        self.last_frame_sprites = frame.stage.draw_list().count();
        self.last_overlay_sprites = frame.overlay.map_or(0, |overlay| overlay.draw_list().count());
        Ok(())
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}
