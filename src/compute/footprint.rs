//! Required footprint of an item class.
//!
//! An item class is one item geometry together with how many copies of it have
//! to fit. Its footprint is the box the whole stack occupies: the item's bounding
//! box with the stacking axis multiplied by the count.

use std::sync::OnceLock;

use crate::schema::{Extent3, Item, StackingDirection};

/// One item geometry and the number of copies required.
#[derive(Debug, Clone)]
pub struct ItemClass {
    item: Item,
    count: u32,
    stacking: StackingDirection,
    footprint: OnceLock<Extent3>,
}

impl ItemClass {
    /// Create a class stacked along its thinnest axis.
    pub fn new(item: Item, count: u32) -> Self {
        Self::with_stacking(item, count, StackingDirection::Minimal)
    }

    pub fn with_stacking(item: Item, count: u32, stacking: StackingDirection) -> Self {
        Self {
            item,
            count,
            stacking,
            footprint: OnceLock::new(),
        }
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn stacking(&self) -> StackingDirection {
        self.stacking
    }

    /// Extent the stacked class must occupy.
    ///
    /// Computed on first access and cached for the lifetime of the class.
    pub fn bounding_box(&self) -> Extent3 {
        *self
            .footprint
            .get_or_init(|| stack(self.item.bounding_box(), self.count, self.stacking))
    }
}

fn stack(base: Extent3, count: u32, stacking: StackingDirection) -> Extent3 {
    let (x, y, z) = base;
    let n = i64::from(count);
    let axis = match stacking {
        StackingDirection::Minimal => {
            let min = x.min(y).min(z);
            // Ties go to the last matching axis.
            let mut axis = StackingDirection::X;
            if y == min {
                axis = StackingDirection::Y;
            }
            if z == min {
                axis = StackingDirection::Z;
            }
            axis
        }
        direction => direction,
    };
    match axis {
        StackingDirection::X => (x * n, y, z),
        StackingDirection::Y => (x, y * n, z),
        _ => (x, y, z * n),
    }
}
