//! The reference-sequence scene: one colored block or letter per base.

use std::rc::Rc;

use crate::error::RenderError;
use crate::genomics::GenomicRegion;
use crate::pool::DrawArgs;
use crate::style::{Nucleotide, StyleConfig};
use crate::surface::Surface;
use crate::types::{Dim, Point};

use super::{base_offset, bases, nucleotide_classes, px, Scene, SceneBase, SceneState};

const POOL_SIZE: usize = 256;
const POOL_STEP: usize = 128;

/// Inputs of the reference-sequence scene.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceSequence {
    /// Bases of the buffered region.
    pub buffered_sequence: String,
    /// Bases of the focused region. Re-sliced from the buffered sequence
    /// when its length does not match the focused region.
    pub focused_sequence: String,
    /// Region filling the visible canvas width.
    pub focused_region: GenomicRegion,
    /// Region covered by `buffered_sequence`.
    pub buffered_region: GenomicRegion,
}

struct RefSeqState {
    input: ReferenceSequence,
    nuc_width: f64,
}

/// Draws a reference sequence into a horizontally scrolling buffer.
pub struct RefSeqScene<S: Surface> {
    base: SceneBase<S>,
    style: Rc<StyleConfig>,
    state: SceneState<RefSeqState>,
}

impl<S: Surface> RefSeqScene<S> {
    /// Create a scene drawing onto `surface`.
    ///
    /// # Errors
    ///
    /// Fails if the surface cannot be sized.
    pub fn new(surface: S, size: [u32; 2], style: Rc<StyleConfig>) -> Result<Self, RenderError> {
        let classes = nucleotide_classes(&style, POOL_SIZE, POOL_STEP);
        let base = SceneBase::new(surface, size, &style, classes)?;
        Ok(Self {
            base,
            style,
            state: SceneState::NotReady,
        })
    }

    /// Replace the inputs. Returns whether the scene is ready to draw.
    pub fn set_state(&mut self, input: Option<ReferenceSequence>) -> bool {
        let Some(mut input) = input.filter(|input| !input.focused_region.is_empty()) else {
            self.state = SceneState::NotReady;
            self.base.clear();
            return false;
        };
        input.buffered_sequence.make_ascii_uppercase();
        reslice_focused(&mut input);

        let viewport = self.base.viewport_mut();
        let screen = viewport.screen;
        let nuc_width = f64::from(screen.width) / bases(input.focused_region.len());
        let world = Dim::new(
            px(bases(input.buffered_region.len()) * nuc_width),
            screen.height,
        );
        let focus_x = base_offset(input.focused_region.start(), input.buffered_region.start()) * nuc_width;
        viewport.virtualize(world, Point::new(px(focus_x), 0.0));

        self.state = SceneState::Ready(RefSeqState { input, nuc_width });
        true
    }

    /// Bases of the focused region.
    pub fn focused_sequence(&self) -> Option<&str> {
        self.state
            .ready()
            .map(|state| state.input.focused_sequence.as_str())
    }

    /// Pixels per base.
    pub fn nuc_width(&self) -> Option<f64> {
        self.state.ready().map(|state| state.nuc_width)
    }

    /// Present the current frame.
    ///
    /// # Errors
    ///
    /// Fails if the surface cannot present.
    pub fn tick(&mut self) -> Result<(), RenderError> {
        self.base.tick(None)
    }

    /// The canvas was clicked.
    pub fn click(&mut self) {
        self.base.click();
    }

    /// Register the click callback.
    pub fn set_on_click(&mut self, on_click: impl FnMut() + 'static) {
        self.base.set_on_click(on_click);
    }

    /// The scene's base.
    pub fn base(&self) -> &SceneBase<S> {
        &self.base
    }
}

/// Make `focused_sequence` exactly as long as the focused region by slicing
/// it out of the buffered sequence.
fn reslice_focused(input: &mut ReferenceSequence) {
    let len = input.focused_region.len();
    if u64::try_from(input.focused_sequence.len()) == Ok(len) {
        input.focused_sequence.make_ascii_uppercase();
        return;
    }
    let start = input
        .focused_region
        .start()
        .saturating_sub(input.buffered_region.start());
    let sequence = &input.buffered_sequence;
    let from = usize::try_from(start).unwrap_or(usize::MAX).min(sequence.len());
    let to = usize::try_from(start + len).unwrap_or(usize::MAX).min(sequence.len());
    input.focused_sequence = sequence.get(from..to).unwrap_or_default().to_owned();
    log::debug!(
        "resliced focused sequence to {} of {len} bases",
        input.focused_sequence.len()
    );
}

impl<S: Surface> Scene for RefSeqScene<S> {
    fn draw(&mut self) -> Result<(), RenderError> {
        let SceneState::Ready(state) = &self.state else {
            return Ok(());
        };
        self.base.clear();
        let nuc_width = px(state.nuc_width);
        let height = self.base.viewport().screen.height;
        let font_size = self.style.fonts.base_font_size.min(height);
        for (index, base) in state.input.buffered_sequence.chars().enumerate() {
            #[expect(clippy::cast_precision_loss)]
            let x = px(state.nuc_width * index as f64);
            let nucleotide = Nucleotide::from_char_lossy(base);
            let class = nucleotide.draw_class(nuc_width);
            let mut args = DrawArgs::at(Point::new(x, 0.0), Dim::new(nuc_width, height));
            if class == nucleotide.text_class() {
                if let Some(letter) = nucleotide.letter() {
                    args = args.text(letter).font_size(font_size);
                }
            }
            self.base.draw(class, args)?;
        }
        Ok(())
    }

    fn resize(&mut self, size: [u32; 2]) -> Result<(), RenderError> {
        if self.base.resize(size)?.is_none() || !self.state.is_ready() {
            return Ok(());
        }
        let SceneState::Ready(state) = std::mem::replace(&mut self.state, SceneState::NotReady) else {
            return Ok(());
        };
        self.set_state(Some(state.input));
        self.draw()
    }

    fn clear(&mut self) {
        self.base.clear();
    }

    fn destroy(&mut self) {
        self.base.destroy();
    }
}
