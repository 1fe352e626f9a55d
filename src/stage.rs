//! The stage: every display object a render application owns, their draw
//! order, and the hover handlers currently attached to them.

use std::collections::HashMap;

use crate::allocator::ShapeAllocator;
use crate::types::{Point, Sprite};

/// Index of a sprite on its stage. Stable for the stage's lifetime.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SlotId(usize);

impl SlotId {
    /// Position in the stage's sprite arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Callback fired with the pointer position in world pixels.
pub type HoverHandler = Box<dyn Fn(Point)>;

#[derive(Default)]
struct HoverHandlers {
    on_in: Option<HoverHandler>,
    on_out: Option<HoverHandler>,
}

/// Owns all sprites and dispatches pointer hover to them.
///
/// Hover handlers are kept in a side table keyed by [`SlotId`] rather than on
/// the sprites, so pools can drop every handler of a reused sprite in one
/// step before attaching new ones.
pub struct Stage {
    sprites: Vec<Sprite>,
    hover: HashMap<SlotId, HoverHandlers>,
    hovered: Option<SlotId>,
    draw_list: Vec<SlotId>,
    next_order: u64,
    allocator: ShapeAllocator,
}

impl Stage {
    /// Create an empty stage.
    pub fn new() -> Self {
        Self::with_allocator(ShapeAllocator::new())
    }

    /// Create an empty stage around an existing allocator.
    pub fn with_allocator(allocator: ShapeAllocator) -> Self {
        Self {
            sprites: Vec::new(),
            hover: HashMap::new(),
            hovered: None,
            draw_list: Vec::new(),
            next_order: 1,
            allocator,
        }
    }

    /// Attach a sprite and return its slot.
    pub fn add(&mut self, sprite: Sprite) -> SlotId {
        self.sprites.push(sprite);
        SlotId(self.sprites.len() - 1)
    }

    /// Number of sprites attached.
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// Whether no sprites are attached.
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Borrow a sprite.
    pub fn sprite(&self, slot: SlotId) -> &Sprite {
        &self.sprites[slot.0]
    }

    /// Mutably borrow a sprite.
    pub fn sprite_mut(&mut self, slot: SlotId) -> &mut Sprite {
        &mut self.sprites[slot.0]
    }

    /// Mutably borrow a sprite together with the allocator, for reshaping
    /// its text.
    pub fn sprite_with_allocator(&mut self, slot: SlotId) -> (&mut Sprite, &mut ShapeAllocator) {
        (&mut self.sprites[slot.0], &mut self.allocator)
    }

    /// The shape allocator used by draw functions.
    pub fn allocator_mut(&mut self) -> &mut ShapeAllocator {
        &mut self.allocator
    }

    /// Width in pixels of `text` at `font_size`.
    pub fn measure_text(&mut self, text: &str, font_size: f32) -> f32 {
        self.allocator.measure(text, font_size)
    }

    /// Move a sprite above everything drawn so far.
    pub fn bring_to_front(&mut self, slot: SlotId) {
        self.sprites[slot.0].order = self.next_order;
        self.next_order += 1;
    }

    /// Replace the hover handlers of a slot.
    pub fn set_hover_handlers(
        &mut self,
        slot: SlotId,
        on_in: Option<HoverHandler>,
        on_out: Option<HoverHandler>,
    ) {
        if on_in.is_none() && on_out.is_none() {
            self.clear_hover_handlers(slot);
            return;
        }
        self.hover.insert(slot, HoverHandlers { on_in, on_out });
    }

    /// Drop every hover handler of a slot. If the pointer is currently over
    /// it, the old hover-out fires first and the hover is forgotten, so the
    /// next pointer move over the slot fires hover-in again.
    pub fn clear_hover_handlers(&mut self, slot: SlotId) {
        let handlers = self.hover.remove(&slot);
        if self.hovered != Some(slot) {
            return;
        }
        self.hovered = None;
        if let Some(on_out) = handlers.and_then(|h| h.on_out) {
            on_out(Point::default());
        }
    }

    /// Whether any hover handler is attached to a slot.
    pub fn has_hover_handlers(&self, slot: SlotId) -> bool {
        self.hover.contains_key(&slot)
    }

    /// Topmost visible, interactive sprite under `point`.
    pub fn hit_test(&self, point: Point) -> Option<SlotId> {
        self.sprites
            .iter()
            .enumerate()
            .filter(|(_, sprite)| sprite.visible && sprite.interactive && sprite.contains(point))
            .max_by_key(|(_, sprite)| sprite.order)
            .map(|(index, _)| SlotId(index))
    }

    /// Move the pointer to `point` (world pixels), or off the stage with
    /// `None`. Fires hover-out on the previously hovered sprite and hover-in
    /// on the new one when they differ. Returns whether the hover changed.
    pub fn dispatch_pointer(&mut self, point: Option<Point>) -> bool {
        let target = point.and_then(|p| self.hit_test(p));
        if target == self.hovered {
            return false;
        }
        let at = point.unwrap_or_default();
        if let Some(previous) = self.hovered.take() {
            if let Some(on_out) = self.hover.get(&previous).and_then(|h| h.on_out.as_ref()) {
                on_out(at);
            }
        }
        if let Some(next) = target {
            if let Some(on_in) = self.hover.get(&next).and_then(|h| h.on_in.as_ref()) {
                on_in(at);
            }
        }
        self.hovered = target;
        true
    }

    /// Slot currently under the pointer.
    pub fn hovered(&self) -> Option<SlotId> {
        self.hovered
    }

    /// Rebuild the list of visible sprites in draw order.
    pub fn prepare_draw_list(&mut self) {
        self.draw_list.clear();
        self.draw_list.extend(
            self.sprites
                .iter()
                .enumerate()
                .filter(|(_, sprite)| sprite.visible)
                .map(|(index, _)| SlotId(index)),
        );
        let sprites = &self.sprites;
        self.draw_list
            .sort_unstable_by_key(|slot| sprites[slot.0].order);
    }

    /// Visible sprites in the order of the last
    /// [`prepare_draw_list`](Self::prepare_draw_list).
    pub fn draw_list(&self) -> impl Iterator<Item = &Sprite> {
        self.draw_list.iter().map(|slot| &self.sprites[slot.0])
    }

    /// All currently visible sprites, in arena order.
    pub fn visible(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.iter().filter(|sprite| sprite.visible)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}
