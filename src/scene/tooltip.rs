//! The read tooltip: one screen-space overlay reused for every hover.

use crate::alignment::AlignedRead;
use crate::allocator::UnitShape;
use crate::stage::{SlotId, Stage};
use crate::style::StyleConfig;
use crate::types::{Dim, Point, ViewTransform};

/// Gap between the pointer and the tooltip.
const POINTER_GAP: f32 = 12.0;
/// Inner padding around the text.
const PADDING: f32 = 8.0;
/// Line height as a multiple of the font size.
const LINE_SPACING: f32 = 1.3;
/// Name, coordinates, CIGAR and mate position.
const MAX_FIELDS: usize = 4;

/// Hover details for one read.
///
/// The tooltip owns a private stage presented on top of the scene without
/// any view transform. It is not pooled; the same background and text
/// objects are updated on every hover.
pub struct Tooltip {
    stage: Stage,
    background: SlotId,
    fields: [SlotId; MAX_FIELDS],
    font_size: f32,
    canvas: Dim,
    view: ViewTransform,
    pos: Point,
    dim: Dim,
    visible: bool,
}

impl Tooltip {
    /// Create a hidden tooltip for a canvas of `canvas` pixels.
    pub fn new(style: &StyleConfig, canvas: Dim) -> Self {
        let mut stage = Stage::new();
        let background = stage
            .allocator_mut()
            .shape_sprite(UnitShape::Rect, style.colors.tooltip_background.color());
        let background = stage.add(background);
        let text = style.colors.secondary_text.color();
        let fields = [(); MAX_FIELDS].map(|()| {
            let mut sprite = stage.allocator_mut().text_sprite("", text);
            sprite.font_size = style.fonts.tooltip_font_size;
            stage.add(sprite)
        });
        Self {
            stage,
            background,
            fields,
            font_size: style.fonts.tooltip_font_size,
            canvas,
            view: ViewTransform::IDENTITY,
            pos: Point::default(),
            dim: Dim::default(),
            visible: false,
        }
    }

    /// Show `read`'s details next to the pointer at `world`.
    pub fn show_read(&mut self, read: &AlignedRead, world: Point) {
        let coordinates = read.region.to_one_indexed();
        let mate = read
            .mate_pos
            .as_ref()
            .map(|mate| format!("Mate: {}:{}", mate.seq_name, mate.start().saturating_add(1)));
        let mut lines = vec![read.id.as_str(), coordinates.as_str(), read.cigar_string.as_str()];
        if let Some(mate) = &mate {
            lines.push(mate);
        }
        self.show(&lines, self.view.to_screen(world));
    }

    /// Show `lines` next to the pointer at `screen`, flipping to the other
    /// side of the pointer where the canvas's right or bottom edge would
    /// clip it.
    pub fn show(&mut self, lines: &[&str], screen: Point) {
        let line_height = self.font_size * LINE_SPACING;
        let shown = lines.len().min(MAX_FIELDS);

        let mut widest: f32 = 0.0;
        for (index, &slot) in self.fields.iter().enumerate() {
            let Some(&line) = lines.get(index) else {
                self.stage.sprite_mut(slot).visible = false;
                continue;
            };
            let width = self.stage.measure_text(line, self.font_size);
            widest = widest.max(width);
            let (sprite, allocator) = self.stage.sprite_with_allocator(slot);
            allocator.set_text(sprite, line);
            sprite.dim = Dim::new(width, line_height);
            sprite.visible = true;
        }

        #[expect(clippy::cast_precision_loss)]
        let text_height = shown as f32 * line_height;
        self.dim = Dim::new(widest + 2.0 * PADDING, text_height + 2.0 * PADDING);

        let mut x = screen.x + POINTER_GAP;
        if x + self.dim.width > self.canvas.width {
            x = screen.x - POINTER_GAP - self.dim.width;
        }
        let mut y = screen.y + POINTER_GAP;
        if y + self.dim.height > self.canvas.height {
            y = screen.y - POINTER_GAP - self.dim.height;
        }
        self.pos = Point::new(x.max(0.0), y.max(0.0));

        let background = self.stage.sprite_mut(self.background);
        background.pos = self.pos;
        background.dim = self.dim;
        background.visible = true;
        let mut line_y = self.pos.y + PADDING;
        for &slot in &self.fields[..shown] {
            self.stage.sprite_mut(slot).pos = Point::new(self.pos.x + PADDING, line_y);
            line_y += line_height;
        }
        self.visible = true;
    }

    /// Hide the tooltip.
    pub fn hide(&mut self) {
        if !self.visible {
            return;
        }
        self.stage.sprite_mut(self.background).visible = false;
        for &slot in &self.fields {
            self.stage.sprite_mut(slot).visible = false;
        }
        self.visible = false;
    }

    /// Track a new canvas size. Hides the tooltip.
    pub fn set_canvas(&mut self, canvas: Dim) {
        self.canvas = canvas;
        self.hide();
    }

    /// Track the scene's current world-to-screen transform.
    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    /// Whether the tooltip is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Top-left corner on the canvas.
    pub fn position(&self) -> Point {
        self.pos
    }

    /// Size of the background.
    pub fn size(&self) -> Dim {
        self.dim
    }

    /// Text of the fields currently shown.
    pub fn fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(|&slot| self.stage.sprite(slot))
            .filter(|sprite| sprite.visible)
            .map(|sprite| sprite.text.as_str())
            .collect()
    }

    /// The overlay stage to present.
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::genomics::GenomicRegion;

    fn read(mate: bool) -> AlignedRead {
        AlignedRead {
            id: "read-7/1".to_owned(),
            region: GenomicRegion::new("chr2", 99, 149).unwrap(),
            mate_pos: mate.then(|| GenomicRegion::new("chr2", 299, 300).unwrap()),
            cigar_string: "50M".to_owned(),
            diffs: Vec::new(),
            is_reverse: false,
        }
    }

    fn tooltip() -> Tooltip {
        Tooltip::new(&StyleConfig::default(), Dim::new(800.0, 600.0))
    }

    #[test]
    fn hidden_by_default() {
        let tooltip = tooltip();
        assert!(!tooltip.is_visible());
        assert!(tooltip.fields().is_empty());
    }

    #[test]
    fn shows_read_fields() {
        let mut tooltip = tooltip();
        tooltip.show_read(&read(true), Point::new(10.0, 10.0));
        assert!(tooltip.is_visible());
        assert_eq!(
            tooltip.fields(),
            vec!["read-7/1", "chr2:100-149", "50M", "Mate: chr2:300"]
        );
        assert_eq!(tooltip.position(), Point::new(22.0, 22.0));

        tooltip.show_read(&read(false), Point::new(10.0, 10.0));
        assert_eq!(tooltip.fields().len(), 3);
    }

    #[test]
    fn mate_at_coordinate_limit() {
        let mut read = read(false);
        read.mate_pos = Some(GenomicRegion::new("chr2", u64::MAX, u64::MAX).unwrap());
        let mut tooltip = tooltip();
        tooltip.show_read(&read, Point::new(10.0, 10.0));
        assert_eq!(tooltip.fields()[3], "Mate: chr2:18446744073709551615");
    }

    #[test]
    fn background_fits_widest_field() {
        let mut tooltip = tooltip();
        tooltip.show(&["a", "a much longer line"], Point::new(0.0, 0.0));
        let widest = tooltip.stage.measure_text("a much longer line", 18.0);
        assert!((tooltip.size().width - (widest + 2.0 * PADDING)).abs() < 0.01);
    }

    #[test]
    fn flips_at_right_and_bottom_edges() {
        let mut tooltip = tooltip();
        tooltip.show(&["name"], Point::new(795.0, 595.0));
        let pos = tooltip.position();
        let size = tooltip.size();
        assert!(pos.x + size.width <= 795.0);
        assert!(pos.y + size.height <= 595.0);
    }

    #[test]
    fn canvas_change_hides() {
        let mut tooltip = tooltip();
        tooltip.show(&["name"], Point::new(5.0, 5.0));
        tooltip.set_canvas(Dim::new(400.0, 300.0));
        assert!(!tooltip.is_visible());
        assert_eq!(tooltip.stage.visible().count(), 0);
    }
}
