//! The box being filled and its catalog of required items.

use crate::schema::{Extent3, Item, PackingConfig, StackingDirection};

use super::ItemClass;

/// A board game box and the items that have to go in it.
#[derive(Debug, Clone)]
pub struct GameBox {
    length: i64,
    width: i64,
    height: i64,
    stacking: StackingDirection,
    catalog: Vec<(Item, u32)>,
}

impl GameBox {
    /// Create an empty box.
    pub fn new(length: i64, width: i64, height: i64) -> Self {
        Self {
            length,
            width,
            height,
            stacking: StackingDirection::default(),
            catalog: Vec::new(),
        }
    }

    /// Build a box and its catalog from a packing configuration.
    pub fn from_config(config: &PackingConfig) -> Self {
        let spec = &config.game_box;
        let mut game_box =
            Self::new(spec.length, spec.width, spec.height).with_stacking(spec.stacking);
        for entry in &config.items {
            game_box.add_items(entry.item, entry.count);
        }
        game_box
    }

    /// Set how item classes are stacked.
    pub fn with_stacking(mut self, stacking: StackingDirection) -> Self {
        self.stacking = stacking;
        self
    }

    /// Raw box dimensions as (length, width, height).
    pub fn dimensions(&self) -> Extent3 {
        (self.length, self.width, self.height)
    }

    /// Add `count` copies of `item`. Repeated items accumulate.
    pub fn add_items(&mut self, item: Item, count: u32) {
        match self.catalog.iter_mut().find(|(known, _)| *known == item) {
            Some((_, existing)) => *existing += count,
            None => self.catalog.push((item, count)),
        }
    }

    /// Catalog entries in insertion order.
    pub fn catalog(&self) -> &[(Item, u32)] {
        &self.catalog
    }

    /// Extent of one layer when the height is split into `layers` layers.
    pub fn layer_size(&self, layers: usize) -> Extent3 {
        let layers = layers.max(1) as i64;
        (self.width, self.length, self.height / layers)
    }

    /// Box volume, `None` if it does not fit in an `i64`.
    pub fn volume(&self) -> Option<i64> {
        self.length
            .checked_mul(self.width)
            .and_then(|area| area.checked_mul(self.height))
    }

    /// Volume available to each of `layers` layers.
    ///
    /// Like [`layer_size`](Self::layer_size), zero layers counts as one.
    /// The volume saturates at `i64::MAX`.
    pub fn total_space(&self, layers: usize) -> Vec<i64> {
        let layers = layers.max(1);
        let share = self.volume().unwrap_or(i64::MAX) / layers as i64;
        vec![share; layers]
    }

    /// One item class per distinct catalog item.
    pub fn item_classes(&self) -> Vec<ItemClass> {
        self.catalog
            .iter()
            .map(|&(item, count)| ItemClass::with_stacking(item, count, self.stacking))
            .collect()
    }
}
