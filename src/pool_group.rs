//! Named draw pools, one per shape class a scene draws.

use std::collections::HashMap;

use crate::error::RenderError;
use crate::pool::{DrawArgs, DrawFn, DrawPool, PoolItemId};
use crate::stage::Stage;

/// How one draw class is pooled.
pub struct DrawClassConfig {
    /// Constructs one sprite of the class.
    pub draw_fn: DrawFn,
    /// Sprites created up front.
    pub pool_size: usize,
    /// Sprites added whenever the pool runs dry.
    pub step_size: usize,
}

impl DrawClassConfig {
    /// Bundle a draw function with its pool sizing.
    pub fn new(draw_fn: DrawFn, pool_size: usize, step_size: usize) -> Self {
        Self {
            draw_fn,
            pool_size,
            step_size,
        }
    }
}

/// A set of [`DrawPool`]s addressed by class name.
pub struct DrawPoolGroup {
    pools: HashMap<String, DrawPool>,
}

impl DrawPoolGroup {
    /// Build one pool per entry of `classes` on `stage`.
    ///
    /// # Errors
    ///
    /// Fails if any class has a zero pool or step size.
    pub fn new<N>(
        stage: &mut Stage,
        classes: impl IntoIterator<Item = (N, DrawClassConfig)>,
    ) -> Result<Self, RenderError>
    where
        N: Into<String>,
    {
        let mut pools = HashMap::new();
        for (name, config) in classes {
            let name = name.into();
            let pool = DrawPool::new(
                name.clone(),
                stage,
                config.draw_fn,
                config.pool_size,
                config.step_size,
            )?;
            pools.insert(name, pool);
        }
        log::debug!("created {} draw pools", pools.len());
        Ok(Self { pools })
    }

    /// Draw one sprite of `class`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownDrawClass`] if no pool was registered
    /// under `class`.
    pub fn draw(
        &mut self,
        stage: &mut Stage,
        class: &str,
        args: DrawArgs<'_>,
    ) -> Result<PoolItemId, RenderError> {
        let pool = self
            .pools
            .get_mut(class)
            .ok_or_else(|| RenderError::UnknownDrawClass(class.to_owned()))?;
        Ok(pool.draw(stage, args))
    }

    /// Recycle every sprite of every pool.
    pub fn recycle_all(&mut self, stage: &mut Stage) {
        for pool in self.pools.values_mut() {
            pool.recycle_all(stage);
        }
    }

    /// Look up a pool by class name.
    pub fn pool(&self, class: &str) -> Option<&DrawPool> {
        self.pools.get(class)
    }

    /// Sprites currently handed out across all pools.
    pub fn active_count(&self) -> usize {
        self.pools.values().map(DrawPool::active_count).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::allocator::UnitShape;

    fn rect(pool_size: usize) -> DrawClassConfig {
        DrawClassConfig::new(
            Box::new(|allocator| allocator.shape_sprite(UnitShape::Rect, [0.0, 0.0, 0.0, 1.0])),
            pool_size,
            4,
        )
    }

    #[test]
    fn unknown_class_is_an_error() {
        let mut stage = Stage::new();
        let mut group = DrawPoolGroup::new(&mut stage, [("alignment", rect(2))]).unwrap();
        let err = group
            .draw(&mut stage, "nonexistent", DrawArgs::default())
            .unwrap_err();
        assert_eq!(err, RenderError::UnknownDrawClass("nonexistent".to_owned()));
        assert_eq!(group.active_count(), 0);
    }

    #[test]
    fn invalid_class_fails_construction() {
        let mut stage = Stage::new();
        let result = DrawPoolGroup::new(&mut stage, [("alignment", rect(2)), ("broken", rect(0))]);
        assert!(matches!(result, Err(RenderError::InvalidPoolSize(name)) if name == "broken"));
    }

    #[test]
    fn recycle_all_empties_every_pool() {
        let mut stage = Stage::new();
        let mut group =
            DrawPoolGroup::new(&mut stage, [("alignment", rect(1)), ("pairLine", rect(1))]).unwrap();
        group.draw(&mut stage, "alignment", DrawArgs::default()).unwrap();
        group.draw(&mut stage, "alignment", DrawArgs::default()).unwrap();
        group.draw(&mut stage, "pairLine", DrawArgs::default()).unwrap();
        assert_eq!(group.active_count(), 3);
        assert_eq!(group.pool("alignment").unwrap().pool_size(), 5);

        group.recycle_all(&mut stage);
        assert_eq!(group.active_count(), 0);
        assert_eq!(stage.visible().count(), 0);
    }
}
