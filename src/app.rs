//! The render application: one canvas, one stage, one GPU surface.

use crate::error::RenderError;
use crate::stage::Stage;
use crate::surface::{Frame, Surface};
use crate::types::{Color, ViewTransform};

/// Owns the stage and the surface it is presented on.
pub struct RenderApp<S: Surface> {
    stage: Stage,
    surface: S,
    size: [u32; 2],
    background: Color,
    frames: u64,
    destroyed: bool,
}

impl<S: Surface> RenderApp<S> {
    /// Create an application and size its surface.
    ///
    /// # Errors
    ///
    /// Fails if the surface cannot be sized.
    pub fn new(mut surface: S, size: [u32; 2], background: Color) -> Result<Self, RenderError> {
        surface.resize(size)?;
        Ok(Self {
            stage: Stage::new(),
            surface,
            size,
            background,
            frames: 0,
            destroyed: false,
        })
    }

    /// Resize the canvas. Returns `false` without touching the surface when
    /// the size is unchanged.
    ///
    /// # Errors
    ///
    /// Fails if the surface cannot be resized.
    pub fn resize(&mut self, size: [u32; 2]) -> Result<bool, RenderError> {
        if size == self.size {
            return Ok(false);
        }
        log::debug!("resizing canvas from {:?} to {size:?}", self.size);
        self.surface.resize(size)?;
        self.size = size;
        Ok(true)
    }

    /// Present one frame of the stage through `view`, with an optional
    /// screen-space overlay on top.
    ///
    /// # Errors
    ///
    /// Fails if the surface cannot present.
    pub fn tick(&mut self, view: ViewTransform, overlay: Option<&mut Stage>) -> Result<(), RenderError> {
        if self.destroyed {
            return Ok(());
        }
        self.stage.prepare_draw_list();
        let overlay = overlay.map(|overlay| {
            overlay.prepare_draw_list();
            &*overlay
        });
        self.surface.present(&Frame {
            stage: &self.stage,
            view,
            overlay,
            background: self.background,
        })?;
        self.frames += 1;
        Ok(())
    }

    /// Release the surface. Later calls do nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        log::debug!("destroying render app after {} frames", self.frames);
        self.surface.destroy();
        self.destroyed = true;
    }

    /// The stage.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// The stage, mutably.
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    /// The surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Current canvas size in pixels.
    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Whether [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;
    use crate::types::rgb;

    fn app() -> RenderApp<HeadlessSurface> {
        RenderApp::new(HeadlessSurface::new(), [800, 600], rgb(0xf2f2f2)).unwrap()
    }

    #[test]
    fn identical_resize_touches_gpu_once() {
        let mut app = app();
        assert_eq!(app.surface().resizes, 1);
        assert!(app.resize([1024, 600]).unwrap());
        assert!(!app.resize([1024, 600]).unwrap());
        assert_eq!(app.surface().resizes, 2);
        assert_eq!(app.surface().size, [1024, 600]);
        assert_eq!(app.size(), [1024, 600]);
    }

    #[test]
    fn tick_presents_frames() {
        let mut app = app();
        app.tick(ViewTransform::IDENTITY, None).unwrap();
        app.tick(ViewTransform::IDENTITY, None).unwrap();
        assert_eq!(app.frames(), 2);
        assert_eq!(app.surface().frames, 2);
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut app = app();
        app.destroy();
        app.destroy();
        assert!(app.surface().destroyed);
        app.tick(ViewTransform::IDENTITY, None).unwrap();
        assert_eq!(app.frames(), 0);
    }
}
