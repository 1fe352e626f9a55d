//! A recycler for sprites of a single shape class.
//!
//! Sprites are constructed up front (and in steps when the pool runs dry),
//! then handed out and reclaimed without further allocation. Every sprite a
//! pool ever creates stays attached to the stage; idle ones are invisible.

use crate::allocator::ShapeAllocator;
use crate::error::RenderError;
use crate::stage::{HoverHandler, SlotId, Stage};
use crate::types::{Color, Dim, Point, Sprite};

/// Constructs one new sprite of a pool's shape class.
pub type DrawFn = Box<dyn Fn(&mut ShapeAllocator) -> Sprite>;

/// Identifies one hand-out of a pooled sprite. Ids are never reused, so a
/// stale id cannot recycle a sprite that was handed out again since.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PoolItemId(u64);

/// Attributes applied to a pooled sprite by [`DrawPool::draw`]. Unset fields
/// keep whatever value the sprite had from its previous use.
#[derive(Default)]
pub struct DrawArgs<'a> {
    /// Top-left corner in world pixels.
    pub pos: Option<Point>,
    /// Size in pixels.
    pub dim: Option<Dim>,
    /// Text for text sprites.
    pub text: Option<&'a str>,
    /// Font size in pixels for text sprites.
    pub font_size: Option<f32>,
    /// Fill color.
    pub tint: Option<Color>,
    /// Whether the sprite receives hover.
    pub interactive: Option<bool>,
    /// Fired when the pointer enters the sprite.
    pub on_hover_in: Option<HoverHandler>,
    /// Fired when the pointer leaves the sprite.
    pub on_hover_out: Option<HoverHandler>,
}

impl<'a> DrawArgs<'a> {
    /// Place a sprite at `pos` with size `dim`.
    pub fn at(pos: Point, dim: Dim) -> Self {
        Self {
            pos: Some(pos),
            dim: Some(dim),
            ..Self::default()
        }
    }

    /// Set the text.
    #[must_use]
    pub fn text(mut self, text: &'a str) -> Self {
        self.text = Some(text);
        self
    }

    /// Set the font size.
    #[must_use]
    pub fn font_size(mut self, font_size: f32) -> Self {
        self.font_size = Some(font_size);
        self
    }

    /// Set the tint.
    #[must_use]
    pub fn tint(mut self, tint: Color) -> Self {
        self.tint = Some(tint);
        self
    }

    /// Make the sprite interactive with the given hover handlers.
    #[must_use]
    pub fn hover(mut self, on_in: HoverHandler, on_out: HoverHandler) -> Self {
        self.interactive = Some(true);
        self.on_hover_in = Some(on_in);
        self.on_hover_out = Some(on_out);
        self
    }
}

/// Pool of sprites of one shape class.
///
/// Holds the invariant `active_count() + free_count() == pool_size()` after
/// every operation; the pool only ever grows.
pub struct DrawPool {
    name: String,
    draw_fn: DrawFn,
    free: Vec<SlotId>,
    active: Vec<(PoolItemId, SlotId)>,
    next_id: u64,
    pool_size: usize,
    step_size: usize,
}

impl DrawPool {
    /// Create a pool and construct `pool_size` invisible sprites on `stage`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidPoolSize`] if `pool_size` is zero and
    /// [`RenderError::InvalidStepSize`] if `step_size` is zero.
    pub fn new(
        name: impl Into<String>,
        stage: &mut Stage,
        draw_fn: DrawFn,
        pool_size: usize,
        step_size: usize,
    ) -> Result<Self, RenderError> {
        let name = name.into();
        if pool_size == 0 {
            return Err(RenderError::InvalidPoolSize(name));
        }
        if step_size == 0 {
            return Err(RenderError::InvalidStepSize(name));
        }
        let mut pool = Self {
            name,
            draw_fn,
            free: Vec::with_capacity(pool_size),
            active: Vec::with_capacity(pool_size),
            next_id: 0,
            pool_size: 0,
            step_size,
        };
        pool.grow(stage, pool_size);
        Ok(pool)
    }

    fn grow(&mut self, stage: &mut Stage, count: usize) {
        for _ in 0..count {
            let mut sprite = (self.draw_fn)(stage.allocator_mut());
            sprite.visible = false;
            let slot = stage.add(sprite);
            self.free.push(slot);
        }
        self.pool_size += count;
    }

    /// Hand out a sprite with `args` applied and return its id.
    ///
    /// Expands the pool by its step size first if no sprite is free. Hover
    /// handlers left over from the sprite's previous use are always dropped.
    pub fn draw(&mut self, stage: &mut Stage, args: DrawArgs<'_>) -> PoolItemId {
        if self.free.is_empty() {
            log::debug!(
                "expanding draw pool '{}' from {} by {}",
                self.name,
                self.pool_size,
                self.step_size
            );
            self.grow(stage, self.step_size);
        }
        let Some(slot) = self.free.pop() else {
            unreachable!("draw pool grew by a non-zero step");
        };

        stage.clear_hover_handlers(slot);
        let DrawArgs {
            pos,
            dim,
            text,
            font_size,
            tint,
            interactive,
            on_hover_in,
            on_hover_out,
        } = args;

        let (sprite, allocator) = stage.sprite_with_allocator(slot);
        if let Some(pos) = pos.filter(|&pos| pos != sprite.pos) {
            sprite.pos = pos;
        }
        if let Some(dim) = dim.filter(|&dim| dim != sprite.dim) {
            sprite.dim = dim;
        }
        if let Some(text) = text {
            allocator.set_text(sprite, text);
        }
        if let Some(font_size) = font_size.filter(|&size| size != sprite.font_size) {
            sprite.font_size = font_size;
        }
        if let Some(tint) = tint.filter(|&tint| tint != sprite.tint) {
            sprite.tint = tint;
        }
        let interactive = interactive.unwrap_or(false);
        if sprite.interactive != interactive {
            sprite.interactive = interactive;
        }
        sprite.visible = true;

        stage.set_hover_handlers(slot, on_hover_in, on_hover_out);
        stage.bring_to_front(slot);

        let id = PoolItemId(self.next_id);
        self.next_id += 1;
        self.active.push((id, slot));
        id
    }

    /// Hide a handed-out sprite and return it to the free list. Unknown ids
    /// are logged and ignored.
    pub fn recycle(&mut self, stage: &mut Stage, id: PoolItemId) {
        let Some(index) = self.active.iter().position(|&(active, _)| active == id) else {
            log::warn!("draw pool '{}' cannot recycle unknown item {id:?}", self.name);
            return;
        };
        let (_, slot) = self.active.swap_remove(index);
        Self::release(stage, slot);
        self.free.push(slot);
    }

    /// Recycle every handed-out sprite.
    pub fn recycle_all(&mut self, stage: &mut Stage) {
        for (_, slot) in self.active.drain(..) {
            Self::release(stage, slot);
            self.free.push(slot);
        }
    }

    fn release(stage: &mut Stage, slot: SlotId) {
        stage.sprite_mut(slot).visible = false;
        stage.clear_hover_handlers(slot);
    }

    /// Name of the shape class.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sprites currently handed out.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Sprites ready to be handed out.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Sprites ever constructed by this pool.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Stage slots of every handed-out sprite.
    pub fn active_slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.active.iter().map(|&(_, slot)| slot)
    }

    /// Stage slot of a handed-out sprite.
    pub fn slot(&self, id: PoolItemId) -> Option<SlotId> {
        self.active
            .iter()
            .find(|&&(active, _)| active == id)
            .map(|&(_, slot)| slot)
    }
}
