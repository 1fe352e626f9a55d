//! A visible window clamped inside a larger pre-rendered buffer.

use crate::types::{Dim, Point, ViewTransform};

/// Virtualized viewport.
///
/// The scene draws its whole buffer (`world`) in world pixels; only the
/// `screen`-sized window at `offset` is visible. `scale` stays at 1 except
/// for the rescale case in [`resize`](Self::resize).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Visible size in pixels.
    pub screen: Dim,
    /// Buffer size in world pixels.
    pub world: Dim,
    /// Top-left of the visible window in world pixels.
    pub offset: Point,
    /// Uniform content scale.
    pub scale: f32,
}

impl Viewport {
    /// A viewport whose buffer equals the visible window.
    pub fn new(screen: Dim) -> Self {
        Self {
            screen,
            world: screen,
            offset: Point::default(),
            scale: 1.0,
        }
    }

    /// Largest horizontal offset keeping the window inside the buffer.
    pub fn max_offset_x(&self) -> f32 {
        (self.world.width - self.screen.width / self.scale).max(0.0)
    }

    /// Largest vertical offset keeping the window inside the buffer.
    pub fn max_offset_y(&self) -> f32 {
        (self.world.height - self.screen.height / self.scale).max(0.0)
    }

    /// Replace the buffer size and move the window to `offset`, clamped.
    pub fn virtualize(&mut self, world: Dim, offset: Point) {
        self.world = world;
        self.scale = 1.0;
        self.move_to(offset);
    }

    /// Move the window to `offset`, clamped into the buffer.
    pub fn move_to(&mut self, offset: Point) {
        self.offset = Point::new(
            offset.x.clamp(0.0, self.max_offset_x()),
            offset.y.clamp(0.0, self.max_offset_y()),
        );
    }

    /// Scroll vertically by `dy` pixels. Returns whether the offset moved.
    pub fn scroll(&mut self, dy: f32) -> bool {
        let y = (self.offset.y + dy).clamp(0.0, self.max_offset_y());
        if (y - self.offset.y).abs() < f32::EPSILON {
            return false;
        }
        self.offset.y = y;
        true
    }

    /// Resize the visible window.
    ///
    /// When the buffer is exactly as wide as the old window and the window
    /// grows, content is uniformly rescaled by `new / old` width instead of
    /// being re-virtualized. Returns whether that rescale happened.
    pub fn resize(&mut self, screen: Dim) -> bool {
        let old = self.screen;
        self.screen = screen;
        // Only an exact match triggers the rescale.
        #[allow(clippy::float_cmp)]
        let rescale = self.world.width == old.width
            && screen.width > old.width
            && old.width > 0.0;
        if rescale {
            self.scale *= screen.width / old.width;
            log::debug!("rescaling viewport content by {}", self.scale);
        }
        self.move_to(self.offset);
        rescale
    }

    /// World-to-screen transform for the current window.
    pub fn transform(&self) -> ViewTransform {
        ViewTransform {
            offset: self.offset,
            scale: self.scale,
        }
    }

    /// Convert a screen point to world pixels.
    pub fn to_world(&self, screen: Point) -> Point {
        self.transform().to_world(screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        let mut viewport = Viewport::new(Dim::new(100.0, 50.0));
        viewport.virtualize(Dim::new(300.0, 200.0), Point::new(100.0, 0.0));
        viewport
    }

    #[test]
    fn scroll_stays_within_buffer() {
        let mut viewport = viewport();
        for dy in [30.0, 500.0, -20.0, -1000.0, 149.0, 2.0] {
            viewport.scroll(dy);
            assert!((0.0..=150.0).contains(&viewport.offset.y), "{viewport:?}");
        }
        assert!((viewport.offset.y - 150.0).abs() < f32::EPSILON);
        assert!(!viewport.scroll(10.0));
    }

    #[test]
    fn short_buffer_never_scrolls() {
        let mut viewport = Viewport::new(Dim::new(100.0, 50.0));
        viewport.virtualize(Dim::new(300.0, 20.0), Point::default());
        assert!(!viewport.scroll(10.0));
        assert!(viewport.offset.y.abs() < f32::EPSILON);
    }

    #[test]
    fn virtualize_clamps_offset() {
        let mut viewport = viewport();
        viewport.virtualize(Dim::new(300.0, 200.0), Point::new(250.0, -5.0));
        assert_eq!(viewport.offset, Point::new(200.0, 0.0));
    }

    #[test]
    fn growing_past_equal_buffer_rescales() {
        let mut viewport = Viewport::new(Dim::new(100.0, 50.0));
        viewport.virtualize(Dim::new(100.0, 50.0), Point::default());
        assert!(viewport.resize(Dim::new(150.0, 50.0)));
        assert!((viewport.scale - 1.5).abs() < f32::EPSILON);
        assert_eq!(viewport.transform().to_screen(Point::new(100.0, 0.0)).x, 150.0);
    }

    #[test]
    fn resize_with_wider_buffer_does_not_rescale() {
        let mut viewport = viewport();
        assert!(!viewport.resize(Dim::new(150.0, 50.0)));
        assert!((viewport.scale - 1.0).abs() < f32::EPSILON);
    }
}
