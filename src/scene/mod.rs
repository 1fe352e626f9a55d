//! Scenes: a render application, its draw pools and a viewport, driven by
//! immutable state pushed in by the host.

use crate::allocator::UnitShape;
use crate::app::RenderApp;
use crate::error::RenderError;
use crate::pool::{DrawArgs, PoolItemId};
use crate::pool_group::{DrawClassConfig, DrawPoolGroup};
use crate::stage::Stage;
use crate::style::{Nucleotide, StyleConfig};
use crate::surface::Surface;
use crate::types::{Dim, Point};
use crate::viewport::Viewport;

pub mod alignments;
pub mod refseq;
pub mod tooltip;

pub use alignments::{AlignedReadsScene, ReadGeometry, ReadsInput};
pub use refseq::{RefSeqScene, ReferenceSequence};
pub use tooltip::Tooltip;

/// What every scene can be asked to do.
pub trait Scene {
    /// Clear and redraw everything. A no-op until the scene is ready.
    ///
    /// # Errors
    ///
    /// Fails if a draw call names an unregistered class.
    fn draw(&mut self) -> Result<(), RenderError>;

    /// Resize the canvas to `size` pixels. Identical sizes are ignored.
    ///
    /// # Errors
    ///
    /// Fails if the surface cannot be resized or the redraw fails.
    fn resize(&mut self, size: [u32; 2]) -> Result<(), RenderError>;

    /// Recycle every drawn object.
    fn clear(&mut self);

    /// Release GPU resources.
    fn destroy(&mut self);
}

/// Whether a scene has received usable state yet.
#[derive(Debug, Default)]
pub enum SceneState<T> {
    /// No usable state; drawing is skipped.
    #[default]
    NotReady,
    /// Derived state for the latest inputs.
    Ready(T),
}

impl<T> SceneState<T> {
    /// Whether the scene is ready to draw.
    pub fn is_ready(&self) -> bool {
        matches!(self, SceneState::Ready(_))
    }

    /// Borrow the ready state.
    pub fn ready(&self) -> Option<&T> {
        match self {
            SceneState::Ready(state) => Some(state),
            SceneState::NotReady => None,
        }
    }
}

/// Callback invoked when the canvas is clicked.
pub type ClickHandler = Box<dyn FnMut()>;

/// The parts every scene owns.
pub struct SceneBase<S: Surface> {
    app: RenderApp<S>,
    pools: DrawPoolGroup,
    viewport: Viewport,
    on_click: Option<ClickHandler>,
}

impl<S: Surface> SceneBase<S> {
    /// Create the render application and register `classes`.
    ///
    /// # Errors
    ///
    /// Fails if the surface cannot be sized or a class is misconfigured.
    pub fn new(
        surface: S,
        size: [u32; 2],
        style: &StyleConfig,
        classes: Vec<(&'static str, DrawClassConfig)>,
    ) -> Result<Self, RenderError> {
        let mut app = RenderApp::new(surface, size, style.colors.background.color())?;
        let pools = DrawPoolGroup::new(app.stage_mut(), classes)?;
        Ok(Self {
            app,
            pools,
            viewport: Viewport::new(Dim::from_pixels(size)),
            on_click: None,
        })
    }

    /// Draw one object of `class`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownDrawClass`] for unregistered classes.
    pub fn draw(&mut self, class: &str, args: DrawArgs<'_>) -> Result<PoolItemId, RenderError> {
        self.pools.draw(self.app.stage_mut(), class, args)
    }

    /// Recycle every drawn object.
    pub fn clear(&mut self) {
        self.pools.recycle_all(self.app.stage_mut());
    }

    /// Resize the canvas. Returns `None` if the size is unchanged, otherwise
    /// whether the viewport rescaled its content (see [`Viewport::resize`]).
    ///
    /// # Errors
    ///
    /// Fails if the surface cannot be resized.
    pub fn resize(&mut self, size: [u32; 2]) -> Result<Option<bool>, RenderError> {
        if !self.app.resize(size)? {
            return Ok(None);
        }
        Ok(Some(self.viewport.resize(Dim::from_pixels(size))))
    }

    /// Release GPU resources.
    pub fn destroy(&mut self) {
        self.clear();
        self.app.destroy();
    }

    /// Width in pixels of `text` at `font_size`.
    pub fn measure_text(&mut self, text: &str, font_size: f32) -> f32 {
        self.app.stage_mut().measure_text(text, font_size)
    }

    /// Present the current frame with an optional screen-space overlay.
    ///
    /// # Errors
    ///
    /// Fails if the surface cannot present.
    pub fn tick(&mut self, overlay: Option<&mut Stage>) -> Result<(), RenderError> {
        self.app.tick(self.viewport.transform(), overlay)
    }

    /// Move the pointer to `screen` (canvas pixels). Returns whether the
    /// hovered object changed.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        let world = self.viewport.to_world(screen);
        self.app.stage_mut().dispatch_pointer(Some(world))
    }

    /// The pointer left the canvas.
    pub fn pointer_leave(&mut self) -> bool {
        self.app.stage_mut().dispatch_pointer(None)
    }

    /// Register the click callback.
    pub fn set_on_click(&mut self, on_click: impl FnMut() + 'static) {
        self.on_click = Some(Box::new(on_click));
    }

    /// The canvas was clicked.
    pub fn click(&mut self) {
        if let Some(on_click) = &mut self.on_click {
            on_click();
        }
    }

    /// The render application.
    pub fn app(&self) -> &RenderApp<S> {
        &self.app
    }

    /// The draw pools.
    pub fn pools(&self) -> &DrawPoolGroup {
        &self.pools
    }

    /// The stage all pooled objects live on.
    pub fn stage(&self) -> &Stage {
        self.app.stage()
    }

    /// The viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The viewport, mutably.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }
}

/// Draw classes for every nucleotide: a block (`<NUC>Rect`) and a letter
/// (`<NUC>Text`) per code, plus the shared `GAP` block.
pub fn nucleotide_classes(
    style: &StyleConfig,
    pool_size: usize,
    step_size: usize,
) -> Vec<(&'static str, DrawClassConfig)> {
    let mut classes = Vec::with_capacity(Nucleotide::ALL.len() * 2);
    for nucleotide in Nucleotide::ALL {
        let tint = style.nucleotide_color(nucleotide);
        classes.push((
            nucleotide.rect_class(),
            DrawClassConfig::new(
                Box::new(move |allocator| allocator.shape_sprite(UnitShape::Rect, tint)),
                pool_size,
                step_size,
            ),
        ));
        if let Some(letter) = nucleotide.letter() {
            classes.push((
                nucleotide.text_class(),
                DrawClassConfig::new(
                    Box::new(move |allocator| allocator.text_sprite(letter, tint)),
                    pool_size,
                    step_size,
                ),
            ));
        }
    }
    classes
}

/// Number of bases as pixels-per-base arithmetic input.
// Genomic lengths stay far below 2^52.
#[expect(clippy::cast_precision_loss)]
pub(crate) fn bases(count: u64) -> f64 {
    count as f64
}

/// Signed distance in bases from `origin` to `position`.
pub(crate) fn base_offset(position: u64, origin: u64) -> f64 {
    bases(position) - bases(origin)
}

/// Narrow a pixel coordinate for the stage.
#[expect(clippy::cast_possible_truncation)]
pub(crate) fn px(value: f64) -> f32 {
    value as f32
}
