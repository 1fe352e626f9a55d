//! The aligned-reads scene: rows of read pairs with their differences from
//! the reference drawn on top.

use std::cell::RefCell;
use std::rc::Rc;

use crate::alignment::{AlignedPair, AlignedRead, AlignmentStack, Mate, SequenceDiff};
use crate::allocator::UnitShape;
use crate::error::RenderError;
use crate::genomics::{GenomicInterval, GenomicRegion};
use crate::pool::DrawArgs;
use crate::pool_group::DrawClassConfig;
use crate::stage::HoverHandler;
use crate::style::{Nucleotide, StyleConfig};
use crate::surface::Surface;
use crate::types::{Color, Dim, Point};

use super::{base_offset, bases, nucleotide_classes, px, Scene, SceneBase, SceneState, Tooltip};

const ALIGNMENT: &str = "alignment";
const CAP_FORWARD: &str = "readCapForward";
const CAP_REVERSE: &str = "readCapReverse";
const PAIR_LINE: &str = "pairLine";
const DELETION_BACKGROUND: &str = "deletionBackground";
const DELETION_LINE: &str = "deletionLine";
const DELETION_LABEL: &str = "deletionLabel";
const LABEL_MASK: &str = "labelMask";
const INSERTION: &str = "insertion";
const INSERTION_LABEL: &str = "insertionLabel";

/// Read height in pixels per pixel of base width.
const READ_HEIGHT_PER_BASE: f64 = 40.0;
/// Read height cap in pixels.
const MAX_READ_HEIGHT: f64 = 24.0;
/// Vertical gap between rows.
const ROW_GAP: f64 = 2.0;
/// Deletions at least this long get a length label.
const DELETION_LABEL_MIN_LEN: u64 = 5;
/// Horizontal padding around a label inside its mask.
const LABEL_PADDING: f32 = 2.0;
/// Thickness of pair lines and deletion rules.
const LINE_WIDTH: f32 = 1.0;
/// Insertion marker width bounds.
const INSERTION_MIN_WIDTH: f32 = 4.0;
const INSERTION_MAX_WIDTH: f32 = 10.0;

const POOL_SIZE: usize = 64;
const POOL_STEP: usize = 32;

/// Inputs of the aligned-reads scene.
#[derive(Clone, Debug)]
pub struct ReadsInput {
    /// Rows of pairs to draw.
    pub alignments: Rc<AlignmentStack>,
    /// Region filling the visible canvas width.
    pub focused_region: GenomicRegion,
    /// Region loaded around it; its pixel width is the scroll buffer's.
    pub buffered_region: GenomicRegion,
}

/// Pixel geometry derived from the inputs and the canvas width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReadGeometry {
    /// Pixels per base.
    pub nuc_width: f64,
    /// Read body height.
    pub read_height: f64,
    /// Read height plus the gap to the next row.
    pub row_height: f64,
    /// World x of the focused region's start.
    pub focus_x: f64,
}

impl ReadGeometry {
    /// Geometry for a canvas `width` pixels wide, or `None` if the focused
    /// region is empty.
    pub fn new(width: f32, focused: &GenomicRegion, buffered: &GenomicRegion) -> Option<Self> {
        if focused.is_empty() {
            return None;
        }
        let nuc_width = f64::from(width) / bases(focused.len());
        let read_height = (READ_HEIGHT_PER_BASE * nuc_width).min(MAX_READ_HEIGHT);
        Some(Self {
            nuc_width,
            read_height,
            row_height: read_height + ROW_GAP,
            focus_x: base_offset(focused.start(), buffered.start()) * nuc_width,
        })
    }

    /// World x of genomic `position`.
    pub fn x(&self, position: u64, focused: &GenomicRegion) -> f64 {
        self.focus_x + base_offset(position, focused.start()) * self.nuc_width
    }

    /// Pixel width of `len` bases.
    pub fn width(&self, len: u64) -> f64 {
        bases(len) * self.nuc_width
    }
}

struct ReadsState {
    input: ReadsInput,
    geometry: ReadGeometry,
}

/// Draws an [`AlignmentStack`] into a vertically scrolling buffer.
///
/// Hovering a read shows its [`Tooltip`]. Both the scroll offset and the
/// pooled objects survive [`set_state`](Self::set_state); everything else
/// is recomputed from the latest inputs.
pub struct AlignedReadsScene<S: Surface> {
    base: SceneBase<S>,
    style: Rc<StyleConfig>,
    state: SceneState<ReadsState>,
    tooltip: Rc<RefCell<Tooltip>>,
    diff_order: Vec<usize>,
}

impl<S: Surface> AlignedReadsScene<S> {
    /// Create a scene drawing onto `surface`.
    ///
    /// # Errors
    ///
    /// Fails if the surface cannot be sized.
    pub fn new(surface: S, size: [u32; 2], style: Rc<StyleConfig>) -> Result<Self, RenderError> {
        let base = SceneBase::new(surface, size, &style, draw_classes(&style))?;
        let tooltip = Tooltip::new(&style, Dim::from_pixels(size));
        Ok(Self {
            base,
            style,
            state: SceneState::NotReady,
            tooltip: Rc::new(RefCell::new(tooltip)),
            diff_order: Vec::new(),
        })
    }

    /// Replace the inputs. Missing inputs or an empty focused region leave
    /// the scene not ready. Returns whether the scene is ready to draw.
    pub fn set_state(&mut self, input: Option<ReadsInput>) -> bool {
        self.reset_hover();
        let Some(input) = input else {
            return self.not_ready();
        };
        let screen = self.base.viewport().screen;
        let Some(geometry) =
            ReadGeometry::new(screen.width, &input.focused_region, &input.buffered_region)
        else {
            log::debug!("focused region {} is empty", input.focused_region);
            return self.not_ready();
        };

        let rows = input.alignments.rows.len();
        #[expect(clippy::cast_precision_loss)]
        let world = Dim::new(
            px(geometry.width(input.buffered_region.len())),
            px(geometry.row_height * rows as f64),
        );
        let viewport = self.base.viewport_mut();
        let offset = Point::new(px(geometry.focus_x), viewport.offset.y);
        viewport.virtualize(world, offset);

        log::debug!(
            "aligned reads ready: {} rows at {:.3} px per base",
            rows,
            geometry.nuc_width
        );
        self.state = SceneState::Ready(ReadsState { input, geometry });
        true
    }

    fn not_ready(&mut self) -> bool {
        self.state = SceneState::NotReady;
        self.base.clear();
        false
    }

    /// Scroll vertically by `dy` pixels, staying inside the buffer.
    pub fn scroll(&mut self, dy: f32) -> bool {
        if !self.state.is_ready() {
            return false;
        }
        self.reset_hover();
        self.base.viewport_mut().scroll(dy)
    }

    /// Hide the tooltip and forget the hovered read, so the next pointer
    /// move over any read shows the tooltip again.
    fn reset_hover(&mut self) {
        self.base.pointer_leave();
        self.tooltip.borrow_mut().hide();
    }

    /// Move the pointer to `screen` (canvas pixels).
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        self.tooltip
            .borrow_mut()
            .set_view(self.base.viewport().transform());
        self.base.pointer_move(screen)
    }

    /// The pointer left the canvas.
    pub fn pointer_leave(&mut self) -> bool {
        self.base.pointer_leave()
    }

    /// The canvas was clicked.
    pub fn click(&mut self) {
        self.base.click();
    }

    /// Register the click callback.
    pub fn set_on_click(&mut self, on_click: impl FnMut() + 'static) {
        self.base.set_on_click(on_click);
    }

    /// Present the current frame with the tooltip on top.
    ///
    /// # Errors
    ///
    /// Fails if the surface cannot present.
    pub fn tick(&mut self) -> Result<(), RenderError> {
        let mut tooltip = self.tooltip.borrow_mut();
        self.base.tick(Some(tooltip.stage_mut()))
    }

    /// Geometry of the current state.
    pub fn geometry(&self) -> Option<ReadGeometry> {
        self.state.ready().map(|state| state.geometry)
    }

    /// Whether the scene has usable state.
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Shared handle to the tooltip.
    pub fn tooltip(&self) -> &Rc<RefCell<Tooltip>> {
        &self.tooltip
    }

    /// The scene's base.
    pub fn base(&self) -> &SceneBase<S> {
        &self.base
    }

    /// The style the scene was built with.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

impl<S: Surface> Scene for AlignedReadsScene<S> {
    fn draw(&mut self) -> Result<(), RenderError> {
        let SceneState::Ready(state) = &self.state else {
            return Ok(());
        };
        self.base.clear();
        let mut painter = Painter {
            base: &mut self.base,
            style: &self.style,
            geometry: state.geometry,
            focused: &state.input.focused_region,
            diff_order: &mut self.diff_order,
        };
        let alignments = &state.input.alignments;
        for (row, pairs) in alignments.rows.iter().enumerate() {
            #[expect(clippy::cast_precision_loss)]
            let y = state.geometry.row_height * row as f64;
            for (col, pair) in pairs.iter().enumerate() {
                let hover = HoverTarget {
                    tooltip: &self.tooltip,
                    alignments,
                    row,
                    col,
                };
                painter.pair(pair, px(y), &hover)?;
            }
        }
        log::trace!(
            "drew {} pairs, {} objects active",
            alignments.count_pairs(),
            self.base.pools().active_count()
        );
        Ok(())
    }

    fn resize(&mut self, size: [u32; 2]) -> Result<(), RenderError> {
        let Some(rescaled) = self.base.resize(size)? else {
            return Ok(());
        };
        self.tooltip
            .borrow_mut()
            .set_canvas(Dim::from_pixels(size));
        self.base.pointer_leave();
        if rescaled || !self.state.is_ready() {
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
        self.tooltip.borrow_mut().hide();
        self.base.destroy();
    }
}

/// Identifies the pair being drawn, for building hover handlers.
struct HoverTarget<'a> {
    tooltip: &'a Rc<RefCell<Tooltip>>,
    alignments: &'a Rc<AlignmentStack>,
    row: usize,
    col: usize,
}

impl HoverTarget<'_> {
    fn handlers(&self, mate: Mate) -> (HoverHandler, HoverHandler) {
        let tooltip = Rc::clone(self.tooltip);
        let alignments = Rc::clone(self.alignments);
        let (row, col) = (self.row, self.col);
        let on_in: HoverHandler = Box::new(move |at| {
            if let Some(read) = alignments.read(row, col, mate) {
                tooltip.borrow_mut().show_read(read, at);
            }
        });
        let tooltip = Rc::clone(self.tooltip);
        let on_out: HoverHandler = Box::new(move |_| tooltip.borrow_mut().hide());
        (on_in, on_out)
    }
}

/// Issues the draw calls for one frame.
struct Painter<'a, S: Surface> {
    base: &'a mut SceneBase<S>,
    style: &'a StyleConfig,
    geometry: ReadGeometry,
    focused: &'a GenomicRegion,
    diff_order: &'a mut Vec<usize>,
}

impl<S: Surface> Painter<'_, S> {
    fn pair(&mut self, pair: &AlignedPair, y: f32, hover: &HoverTarget<'_>) -> Result<(), RenderError> {
        let read_height = px(self.geometry.read_height);
        if pair.has_both_mates() {
            let interval = pair.interval();
            if let Some((x, width)) = self.span(interval.start, interval.len()) {
                self.base.draw(
                    PAIR_LINE,
                    DrawArgs::at(
                        Point::new(x, y + (read_height - LINE_WIDTH) / 2.0),
                        Dim::new(width, LINE_WIDTH),
                    ),
                )?;
            }
        }
        for (mate, read) in pair.reads() {
            self.read(read, y, hover, mate)?;
        }
        Ok(())
    }

    /// Clamped world x and width of `len` bases starting at `start`, or
    /// `None` if nothing remains inside the buffer.
    fn span(&self, start: u64, len: u64) -> Option<(f32, f32)> {
        let mut x = self.geometry.x(start, self.focused);
        let mut width = self.geometry.width(len);
        if x < 0.0 {
            width += x;
            x = 0.0;
        }
        (width > 0.0).then(|| (px(x), px(width)))
    }

    fn read(&mut self, read: &AlignedRead, y: f32, hover: &HoverTarget<'_>, mate: Mate) -> Result<(), RenderError> {
        let read_height = px(self.geometry.read_height);
        if let Some((x, width)) = self.span(read.region.start(), read.region.len()) {
            let cap_width = (read_height / 2.0).min(width);
            let (cap_class, cap_x, body_x) = if read.is_reverse {
                (CAP_REVERSE, x, x + cap_width)
            } else {
                (CAP_FORWARD, x + width - cap_width, x)
            };
            let (on_in, on_out) = hover.handlers(mate);
            self.base.draw(
                cap_class,
                DrawArgs::at(Point::new(cap_x, y), Dim::new(cap_width, read_height)).hover(on_in, on_out),
            )?;
            if width > cap_width {
                let (on_in, on_out) = hover.handlers(mate);
                self.base.draw(
                    ALIGNMENT,
                    DrawArgs::at(Point::new(body_x, y), Dim::new(width - cap_width, read_height))
                        .hover(on_in, on_out),
                )?;
            }
        }

        if read.diffs_sorted() {
            for diff in &read.diffs {
                self.diff(diff, y)?;
            }
            return Ok(());
        }
        let mut order = std::mem::take(&mut *self.diff_order);
        order.clear();
        order.extend(0..read.diffs.len());
        order.sort_by_key(|&index| read.diffs[index].interval().start);
        let result = order.iter().try_for_each(|&index| self.diff(&read.diffs[index], y));
        *self.diff_order = order;
        result
    }

    fn diff(&mut self, diff: &SequenceDiff, y: f32) -> Result<(), RenderError> {
        let interval = diff.interval();
        if !interval.is_well_formed() {
            log::warn!("skipping diff with reversed interval {interval}");
            return Ok(());
        }
        match diff {
            SequenceDiff::Mismatch { sequence, .. } | SequenceDiff::SoftClip { sequence, .. } => {
                self.bases(interval, sequence, y)
            }
            SequenceDiff::Deletion { .. } => self.gap(interval, y, true),
            SequenceDiff::RefSkip { .. } => self.gap(interval, y, false),
            SequenceDiff::Insertion { sequence, .. } => self.insertion(interval, sequence, y),
        }
    }

    /// One mismatch-style object per base.
    fn bases(&mut self, interval: &GenomicInterval, sequence: &str, y: f32) -> Result<(), RenderError> {
        let nuc_width = px(self.geometry.nuc_width);
        let read_height = px(self.geometry.read_height);
        let font_size = self.style.fonts.base_font_size.min(read_height);
        for (position, base) in (interval.start..).zip(sequence.chars()) {
            let x = px(self.geometry.x(position, self.focused));
            let nucleotide = Nucleotide::from_char_lossy(base);
            let class = nucleotide.draw_class(nuc_width);
            let mut args = DrawArgs::at(Point::new(x, y), Dim::new(nuc_width, read_height));
            if class == nucleotide.text_class() {
                if let Some(letter) = nucleotide.letter() {
                    args = args.text(letter).font_size(font_size);
                }
            }
            self.base.draw(class, args)?;
        }
        Ok(())
    }

    /// A deletion or reference skip: a background panel crossed by a thin
    /// rule, with a length label on long deletions.
    fn gap(&mut self, interval: &GenomicInterval, y: f32, labelled: bool) -> Result<(), RenderError> {
        let read_height = px(self.geometry.read_height);
        let x = px(self.geometry.x(interval.start, self.focused));
        let width = px(self.geometry.width(interval.len()));
        self.base.draw(
            DELETION_BACKGROUND,
            DrawArgs::at(Point::new(x, y), Dim::new(width, read_height)),
        )?;
        self.base.draw(
            DELETION_LINE,
            DrawArgs::at(
                Point::new(x, y + (read_height - LINE_WIDTH) / 2.0),
                Dim::new(width, LINE_WIDTH),
            ),
        )?;
        if labelled && interval.len() >= DELETION_LABEL_MIN_LEN {
            let label = interval.len().to_string();
            let font_size = self.style.fonts.label_font_size.min(read_height);
            let mask_width = self.base.measure_text(&label, font_size) + 2.0 * LABEL_PADDING;
            let pos = Point::new(x + (width - mask_width) / 2.0, y);
            let dim = Dim::new(mask_width, read_height);
            self.base.draw(LABEL_MASK, DrawArgs::at(pos, dim))?;
            self.base.draw(
                DELETION_LABEL,
                DrawArgs::at(pos, dim).text(&label).font_size(font_size),
            )?;
        }
        Ok(())
    }

    /// A triangle marker centered on the insertion point, labelled with the
    /// base or the inserted length.
    fn insertion(&mut self, interval: &GenomicInterval, sequence: &str, y: f32) -> Result<(), RenderError> {
        let read_height = px(self.geometry.read_height);
        let center = px(self.geometry.x(interval.start, self.focused));
        let marker_width = px(self.geometry.nuc_width).clamp(INSERTION_MIN_WIDTH, INSERTION_MAX_WIDTH);
        let marker_height = read_height / 2.0;
        self.base.draw(
            INSERTION,
            DrawArgs::at(
                Point::new(center - marker_width / 2.0, y),
                Dim::new(marker_width, marker_height),
            ),
        )?;

        let label = if sequence.chars().count() == 1 {
            sequence.to_owned()
        } else {
            sequence.chars().count().to_string()
        };
        let font_size = self.style.fonts.label_font_size.min(read_height);
        let label_width = self.base.measure_text(&label, font_size) + 2.0 * LABEL_PADDING;
        self.base.draw(
            INSERTION_LABEL,
            DrawArgs::at(
                Point::new(center - label_width / 2.0, y + marker_height),
                Dim::new(label_width, read_height - marker_height),
            )
            .text(&label)
            .font_size(font_size),
        )?;
        Ok(())
    }
}

fn shape(shape: UnitShape, tint: Color) -> DrawClassConfig {
    DrawClassConfig::new(
        Box::new(move |allocator| allocator.shape_sprite(shape, tint)),
        POOL_SIZE,
        POOL_STEP,
    )
}

fn label(tint: Color) -> DrawClassConfig {
    DrawClassConfig::new(
        Box::new(move |allocator| allocator.text_sprite("0", tint)),
        POOL_SIZE,
        POOL_STEP,
    )
}

fn draw_classes(style: &StyleConfig) -> Vec<(&'static str, DrawClassConfig)> {
    let colors = &style.colors;
    let alignment = colors.alignment.color();
    let mut classes = nucleotide_classes(style, POOL_SIZE, POOL_STEP);
    classes.extend([
        (ALIGNMENT, shape(UnitShape::Rect, alignment)),
        (CAP_FORWARD, shape(UnitShape::TriangleRight, alignment)),
        (CAP_REVERSE, shape(UnitShape::TriangleLeft, alignment)),
        (PAIR_LINE, shape(UnitShape::Rect, alignment)),
        (DELETION_BACKGROUND, shape(UnitShape::Rect, colors.background.color())),
        (DELETION_LINE, shape(UnitShape::Rect, colors.deletion.color())),
        (LABEL_MASK, shape(UnitShape::Rect, colors.background.color())),
        (DELETION_LABEL, label(colors.foreground.color())),
        (INSERTION, shape(UnitShape::TriangleDown, colors.insertion.color())),
        (INSERTION_LABEL, label(colors.insertion.color())),
    ]);
    classes
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::alignment::{PairedReads, UnpairedRead};
    use crate::surface::HeadlessSurface;

    type TestScene = AlignedReadsScene<HeadlessSurface>;

    fn region(start: u64, end: u64) -> GenomicRegion {
        GenomicRegion::new("chr1", start, end).unwrap()
    }

    fn interval(start: u64, end: u64) -> GenomicInterval {
        GenomicInterval { start, end }
    }

    fn read(id: &str, start: u64, end: u64, diffs: Vec<SequenceDiff>) -> AlignedRead {
        AlignedRead {
            id: id.to_owned(),
            region: region(start, end),
            mate_pos: None,
            cigar_string: format!("{}M", end - start),
            diffs,
            is_reverse: false,
        }
    }

    fn unpaired(read: AlignedRead) -> AlignedPair {
        AlignedPair::UnpairedRead(UnpairedRead {
            interval: read.region.interval,
            read,
        })
    }

    fn stack(rows: Vec<Vec<AlignedPair>>) -> Rc<AlignmentStack> {
        Rc::new(AlignmentStack {
            id: "stack".to_owned(),
            rows,
            buffered_region: region(0, 1000),
        })
    }

    fn scene(width: u32) -> TestScene {
        AlignedReadsScene::new(HeadlessSurface::new(), [width, 200], Rc::new(StyleConfig::default()))
            .unwrap()
    }

    /// A scene 100px wide showing bases 0..10 at 10px per base.
    fn ready(rows: Vec<Vec<AlignedPair>>) -> TestScene {
        let mut scene = scene(100);
        assert!(scene.set_state(Some(ReadsInput {
            alignments: stack(rows),
            focused_region: region(0, 10),
            buffered_region: region(0, 10),
        })));
        scene.draw().unwrap();
        scene
    }

    fn active(scene: &TestScene, class: &str) -> usize {
        scene.base().pools().pool(class).unwrap().active_count()
    }

    fn texts(scene: &TestScene, class: &str) -> Vec<String> {
        let stage = scene.base().stage();
        scene
            .base()
            .pools()
            .pool(class)
            .unwrap()
            .active_slots()
            .map(|slot| stage.sprite(slot).text.clone())
            .collect()
    }

    fn with_diff(diff: SequenceDiff) -> TestScene {
        ready(vec![vec![unpaired(read("r1", 0, 10, vec![diff]))]])
    }

    #[test]
    fn nuc_width_fills_viewport() {
        let mut scene = scene(800);
        scene.set_state(Some(ReadsInput {
            alignments: stack(Vec::new()),
            focused_region: region(1000, 1137),
            buffered_region: region(900, 1300),
        }));
        let geometry = scene.geometry().unwrap();
        assert!((geometry.nuc_width * 137.0 - 800.0).abs() < 1e-9);
        assert!((geometry.read_height - 24.0).abs() < f64::EPSILON);
        assert!((geometry.row_height - 26.0).abs() < f64::EPSILON);
        assert!((geometry.focus_x - 100.0 * geometry.nuc_width).abs() < 1e-9);
        assert!((f64::from(scene.base().viewport().offset.x) - geometry.focus_x).abs() < 1e-3);
    }

    #[test]
    fn read_height_shrinks_when_zoomed_out() {
        let mut scene = scene(100);
        scene.set_state(Some(ReadsInput {
            alignments: stack(Vec::new()),
            focused_region: region(0, 1000),
            buffered_region: region(0, 1000),
        }));
        let geometry = scene.geometry().unwrap();
        assert!((geometry.read_height - 4.0).abs() < 1e-9);
    }

    #[test]
    fn not_ready_until_usable_state() {
        let mut scene = scene(100);
        scene.draw().unwrap();
        scene.resize([120, 200]).unwrap();
        assert!(!scene.scroll(10.0));
        assert!(scene.base().stage().visible().next().is_none());

        assert!(!scene.set_state(None));
        assert!(!scene.set_state(Some(ReadsInput {
            alignments: stack(Vec::new()),
            focused_region: region(50, 50),
            buffered_region: region(0, 100),
        })));
        assert!(!scene.is_ready());
        scene.draw().unwrap();
        assert!(scene.base().stage().visible().next().is_none());
    }

    #[test]
    fn identical_resize_reallocates_once() {
        let mut scene = ready(Vec::new());
        assert_eq!(scene.base().app().surface().resizes, 1);
        scene.resize([120, 200]).unwrap();
        scene.resize([120, 200]).unwrap();
        assert_eq!(scene.base().app().surface().resizes, 2);
    }

    #[test]
    fn rescale_when_buffer_matches_viewport_width() {
        let mut scene = ready(vec![vec![unpaired(read("r1", 0, 5, Vec::new()))]]);
        let before = scene.geometry().unwrap();
        assert!((scene.base().viewport().world.width - 100.0).abs() < f32::EPSILON);

        scene.resize([150, 200]).unwrap();
        let viewport = scene.base().viewport();
        assert!((viewport.scale - 1.5).abs() < f32::EPSILON);
        assert_eq!(scene.geometry().unwrap(), before);
    }

    #[test]
    fn resize_with_wider_buffer_relayouts() {
        let mut scene = scene(100);
        scene.set_state(Some(ReadsInput {
            alignments: stack(Vec::new()),
            focused_region: region(10, 20),
            buffered_region: region(0, 30),
        }));
        scene.resize([150, 200]).unwrap();
        assert!((scene.geometry().unwrap().nuc_width - 15.0).abs() < 1e-9);
        assert!((scene.base().viewport().scale - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn scroll_keeps_offset_in_bounds_and_survives_pans() {
        let rows = (0..20)
            .map(|row| vec![unpaired(read(&format!("r{row}"), 0, 5, Vec::new()))])
            .collect();
        let alignments = stack(rows);
        let mut scene = scene(100);
        let input = |start| ReadsInput {
            alignments: Rc::clone(&alignments),
            focused_region: region(start, start + 10),
            buffered_region: region(0, 30),
        };
        scene.set_state(Some(input(10)));
        let max = 20.0 * 26.0 - 200.0;
        for dy in [1000.0, -5000.0, 60.0, 250.0, 30.0] {
            scene.scroll(dy);
            let y = scene.base().viewport().offset.y;
            assert!((0.0..=max).contains(&y), "{y}");
        }
        assert!((scene.base().viewport().offset.y - max).abs() < f32::EPSILON);

        scene.scroll(-100.0);
        scene.set_state(Some(input(15)));
        let viewport = scene.base().viewport();
        assert!((viewport.offset.y - (max - 100.0)).abs() < f32::EPSILON);
        assert!((viewport.offset.x - 150.0).abs() < 1e-3);
    }

    #[test]
    fn deletion_label_from_five_bases() {
        let scene = with_diff(SequenceDiff::Deletion {
            interval: interval(2, 7),
        });
        assert_eq!(texts(&scene, DELETION_LABEL), vec!["5"]);
        assert_eq!(active(&scene, LABEL_MASK), 1);
        assert_eq!(active(&scene, DELETION_LINE), 1);

        let scene = with_diff(SequenceDiff::Deletion {
            interval: interval(2, 6),
        });
        assert_eq!(active(&scene, DELETION_LABEL), 0);
        assert_eq!(active(&scene, LABEL_MASK), 0);
        assert_eq!(active(&scene, DELETION_BACKGROUND), 1);
    }

    #[test]
    fn deletion_mask_fits_label() {
        let mut scene = with_diff(SequenceDiff::Deletion {
            interval: interval(1, 9),
        });
        let slot = scene
            .base()
            .pools()
            .pool(LABEL_MASK)
            .unwrap()
            .active_slots()
            .next()
            .unwrap();
        let mask = scene.base().stage().sprite(slot).dim;
        let text_width = scene.base.measure_text("8", 10.0);
        assert!((mask.width - (text_width + 2.0 * LABEL_PADDING)).abs() < 0.01);
    }

    #[test]
    fn ref_skip_has_no_label() {
        let scene = with_diff(SequenceDiff::RefSkip {
            interval: interval(1, 9),
        });
        assert_eq!(active(&scene, DELETION_LINE), 1);
        assert_eq!(active(&scene, DELETION_LABEL), 0);
    }

    #[test]
    fn insertion_labels() {
        let scene = with_diff(SequenceDiff::Insertion {
            interval: interval(3, 3),
            sequence: "A".to_owned(),
        });
        assert_eq!(texts(&scene, INSERTION_LABEL), vec!["A"]);

        let scene = with_diff(SequenceDiff::Insertion {
            interval: interval(3, 3),
            sequence: "a".to_owned(),
        });
        assert_eq!(texts(&scene, INSERTION_LABEL), vec!["a"]);
        assert_eq!(active(&scene, INSERTION), 1);

        let scene = with_diff(SequenceDiff::Insertion {
            interval: interval(3, 3),
            sequence: "ACG".to_owned(),
        });
        assert_eq!(texts(&scene, INSERTION_LABEL), vec!["3"]);
    }

    #[test]
    fn insertion_marker_is_centered() {
        let scene = with_diff(SequenceDiff::Insertion {
            interval: interval(3, 3),
            sequence: "T".to_owned(),
        });
        let slot = scene.base().pools().pool(INSERTION).unwrap().active_slots().next().unwrap();
        let marker = scene.base().stage().sprite(slot);
        assert!((marker.pos.x + marker.dim.width / 2.0 - 30.0).abs() < 1e-4);
    }

    #[test]
    fn mismatch_uses_blocks_or_letters() {
        let blocks = with_diff(SequenceDiff::Mismatch {
            interval: interval(4, 5),
            sequence: "g".to_owned(),
        });
        assert_eq!(active(&blocks, "GRect"), 1);
        assert_eq!(active(&blocks, "GText"), 0);

        let mut scene = scene(200);
        scene.set_state(Some(ReadsInput {
            alignments: stack(vec![vec![unpaired(read(
                "r1",
                0,
                10,
                vec![SequenceDiff::Mismatch {
                    interval: interval(4, 6),
                    sequence: "g-".to_owned(),
                }],
            ))]]),
            focused_region: region(0, 10),
            buffered_region: region(0, 10),
        }));
        scene.draw().unwrap();
        assert_eq!(texts(&scene, "GText"), vec!["G"]);
        assert_eq!(active(&scene, "GAP"), 1);
    }

    #[test]
    fn soft_clip_draws_each_base() {
        let scene = with_diff(SequenceDiff::SoftClip {
            interval: interval(0, 3),
            sequence: "ACG".to_owned(),
        });
        for class in ["ARect", "CRect", "GRect"] {
            assert_eq!(active(&scene, class), 1, "{class}");
        }
    }

    #[test]
    fn unsorted_diffs_draw_in_genomic_order() {
        let scene = ready(vec![vec![unpaired(read(
            "r1",
            0,
            10,
            vec![
                SequenceDiff::Mismatch {
                    interval: interval(6, 7),
                    sequence: "A".to_owned(),
                },
                SequenceDiff::Mismatch {
                    interval: interval(2, 3),
                    sequence: "C".to_owned(),
                },
            ],
        ))]]);
        let order = |class: &str| {
            let slot = scene.base().pools().pool(class).unwrap().active_slots().next().unwrap();
            scene.base().stage().sprite(slot).order
        };
        assert!(order("CRect") < order("ARect"));
    }

    #[test]
    fn reversed_diff_interval_is_skipped() {
        let scene = with_diff(SequenceDiff::Deletion {
            interval: interval(7, 2),
        });
        assert_eq!(active(&scene, DELETION_BACKGROUND), 0);
        assert_eq!(active(&scene, ALIGNMENT), 1);
    }

    #[test]
    fn unpaired_mate_draws_one_body_and_no_pair_line() {
        let scene = ready(vec![vec![AlignedPair::PairedReads(PairedReads {
            read1: read("q/1", 0, 5, Vec::new()),
            read2: None,
            interval: interval(0, 9),
        })]]);
        assert_eq!(active(&scene, ALIGNMENT), 1);
        assert_eq!(active(&scene, PAIR_LINE), 0);

        let mut second = read("q/2", 6, 9, Vec::new());
        second.is_reverse = true;
        let scene = ready(vec![vec![AlignedPair::PairedReads(PairedReads {
            read1: read("q/1", 0, 5, Vec::new()),
            read2: Some(second),
            interval: interval(0, 9),
        })]]);
        assert_eq!(active(&scene, ALIGNMENT), 2);
        assert_eq!(active(&scene, PAIR_LINE), 1);
        assert_eq!(active(&scene, CAP_FORWARD), 1);
        assert_eq!(active(&scene, CAP_REVERSE), 1);
    }

    #[test]
    fn pair_line_is_drawn_under_reads() {
        let scene = ready(vec![vec![AlignedPair::PairedReads(PairedReads {
            read1: read("q/1", 0, 3, Vec::new()),
            read2: Some(read("q/2", 6, 9, Vec::new())),
            interval: interval(0, 9),
        })]]);
        let pools = scene.base().pools();
        let stage = scene.base().stage();
        let line = stage.sprite(pools.pool(PAIR_LINE).unwrap().active_slots().next().unwrap());
        assert!((line.dim.width - 90.0).abs() < 1e-4);
        assert!(pools
            .pool(ALIGNMENT)
            .unwrap()
            .active_slots()
            .all(|slot| stage.sprite(slot).order > line.order));
    }

    #[test]
    fn read_left_of_buffer_is_clamped() {
        let mut scene = scene(100);
        scene.set_state(Some(ReadsInput {
            alignments: stack(vec![vec![unpaired(read("r1", 0, 8, Vec::new()))]]),
            focused_region: region(5, 15),
            buffered_region: region(5, 15),
        }));
        scene.draw().unwrap();
        let stage = scene.base().stage();
        let cap = stage.sprite(scene.base().pools().pool(CAP_FORWARD).unwrap().active_slots().next().unwrap());
        let body = stage.sprite(scene.base().pools().pool(ALIGNMENT).unwrap().active_slots().next().unwrap());
        assert!(body.pos.x.abs() < f32::EPSILON);
        assert!((body.dim.width + cap.dim.width - 30.0).abs() < 1e-4);
    }

    #[test]
    fn hover_shows_and_hides_tooltip() {
        let mut scene = ready(vec![vec![unpaired(read("r1", 0, 5, Vec::new()))]]);
        assert!(scene.pointer_move(Point::new(10.0, 10.0)));
        {
            let tooltip = scene.tooltip().borrow();
            assert!(tooltip.is_visible());
            assert_eq!(tooltip.fields(), vec!["r1", "chr1:1-5", "5M"]);
        }
        scene.tick().unwrap();
        assert!(scene.base().app().surface().last_overlay_sprites > 0);

        assert!(scene.pointer_move(Point::new(90.0, 10.0)));
        assert!(!scene.tooltip().borrow().is_visible());
        scene.pointer_move(Point::new(10.0, 10.0));
        scene.pointer_leave();
        assert!(!scene.tooltip().borrow().is_visible());
    }

    #[test]
    fn state_change_and_resize_hide_tooltip() {
        let mut scene = ready(vec![vec![unpaired(read("r1", 0, 5, Vec::new()))]]);
        scene.pointer_move(Point::new(10.0, 10.0));
        scene.resize([110, 200]).unwrap();
        assert!(!scene.tooltip().borrow().is_visible());

        scene.pointer_leave();
        scene.pointer_move(Point::new(10.0, 10.0));
        assert!(scene.tooltip().borrow().is_visible());
        scene.set_state(None);
        assert!(!scene.tooltip().borrow().is_visible());
    }

    #[test]
    fn redraw_under_pointer_hides_tooltip_on_leave() {
        let mut scene = ready(vec![vec![unpaired(read("r1", 0, 5, Vec::new()))]]);
        scene.pointer_move(Point::new(10.0, 10.0));
        assert!(scene.tooltip().borrow().is_visible());

        scene.draw().unwrap();
        scene.pointer_move(Point::new(90.0, 150.0));
        assert!(!scene.tooltip().borrow().is_visible());

        scene.pointer_move(Point::new(10.0, 10.0));
        assert!(scene.tooltip().borrow().is_visible());
    }

    #[test]
    fn scroll_rearms_hover_on_same_read() {
        let rows = (0..20)
            .map(|row| vec![unpaired(read(&format!("r{row}"), 0, 5, Vec::new()))])
            .collect();
        let mut scene = ready(rows);
        scene.pointer_move(Point::new(10.0, 10.0));
        assert!(scene.scroll(1.0));
        assert!(!scene.tooltip().borrow().is_visible());
        assert_eq!(scene.base().stage().hovered(), None);

        scene.pointer_move(Point::new(10.0, 10.0));
        assert!(scene.tooltip().borrow().is_visible());
    }

    #[test]
    fn recycled_read_shows_new_read_in_tooltip() {
        let mut scene = ready(vec![vec![unpaired(read("old", 0, 5, Vec::new()))]]);
        scene.set_state(Some(ReadsInput {
            alignments: stack(vec![vec![unpaired(read("new", 0, 5, Vec::new()))]]),
            focused_region: region(0, 10),
            buffered_region: region(0, 10),
        }));
        scene.draw().unwrap();
        scene.pointer_move(Point::new(10.0, 10.0));
        assert_eq!(scene.tooltip().borrow().fields()[0], "new");
    }

    #[test]
    fn click_invokes_callback() {
        let mut scene = scene(100);
        let clicks = Rc::new(Cell::new(0));
        let count = Rc::clone(&clicks);
        scene.set_on_click(move || count.set(count.get() + 1));
        scene.click();
        scene.click();
        assert_eq!(clicks.get(), 2);
    }

    #[test]
    fn redraw_recycles_previous_frame() {
        let mut scene = ready(vec![vec![unpaired(read("r1", 0, 5, Vec::new()))]]);
        let first = scene.base().pools().active_count();
        scene.draw().unwrap();
        assert_eq!(scene.base().pools().active_count(), first);
        scene.clear();
        assert_eq!(scene.base().pools().active_count(), 0);
    }
}
