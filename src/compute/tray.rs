//! Placed trays: position, contained item and layer.

use std::fmt;

use rand::Rng;

use crate::schema::{Extent3, Item};

/// Largest step (exclusive) of a single tray perturbation.
pub const MUTATION_STEP: i64 = 15;

/// A tray placed in the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tray {
    /// Corner the item's bounding box extends from.
    pub position: Extent3,
    /// Item whose bounding box the tray occupies.
    pub item: Item,
    /// Layer index within the box.
    pub layer: usize,
}

impl Tray {
    pub fn new(position: Extent3, item: Item, layer: usize) -> Self {
        Self {
            position,
            item,
            layer,
        }
    }

    /// Random tray inside a layer of the given size, on layer 0.
    ///
    /// The position is uniform within the layer and each item dimension is
    /// uniform in `[1, min(layer_size))`. Every layer extent must be at least 2.
    pub fn random<R>(layer_size: Extent3, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let (lx, ly, lz) = layer_size;
        let min_size = lx.min(ly).min(lz);
        Self {
            position: (
                rng.gen_range(0..lx),
                rng.gen_range(0..ly),
                rng.gen_range(0..lz),
            ),
            item: Item::new(
                rng.gen_range(1..min_size),
                rng.gen_range(1..min_size),
                rng.gen_range(1..min_size),
            ),
            layer: 0,
        }
    }

    pub fn bounding_box(&self) -> Extent3 {
        self.item.bounding_box()
    }

    /// Per-axis overlap lengths with another tray.
    ///
    /// Layers are not compared; callers only pair trays sharing a layer.
    /// Multiply the components for the overlapping volume.
    pub fn overlap(&self, other: &Tray) -> Extent3 {
        let (ax, ay, az) = self.position;
        let (adx, ady, adz) = self.bounding_box();
        let (bx, by, bz) = other.position;
        let (bdx, bdy, bdz) = other.bounding_box();
        (
            overlap_1d(ax, adx, bx, bdx),
            overlap_1d(ay, ady, by, bdy),
            overlap_1d(az, adz, bz, bdz),
        )
    }

    /// Perturb one position coordinate or one item dimension.
    ///
    /// The field and a step in `[-15, 15)` are drawn uniformly; the result is
    /// clamped at zero.
    pub fn mutate<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let choice = rng.gen_range(0..6);
        let d = rng.gen_range(-MUTATION_STEP..MUTATION_STEP);
        let item = self.item;
        match choice {
            0 => self.position.0 = (self.position.0 + d).max(0),
            1 => self.position.1 = (self.position.1 + d).max(0),
            2 => self.position.2 = (self.position.2 + d).max(0),
            3 => self.item = item.with_dims((item.length + d).max(0), item.width, item.height),
            4 => self.item = item.with_dims(item.length, (item.width + d).max(0), item.height),
            _ => self.item = item.with_dims(item.length, item.width, (item.height + d).max(0)),
        }
    }
}

/// Length of the intersection of two signed intervals `[p, p + extent]`.
fn overlap_1d(p1: i64, extent1: i64, p2: i64, extent2: i64) -> i64 {
    let (start1, end1) = (p1.min(p1 + extent1), p1.max(p1 + extent1));
    let (start2, end2) = (p2.min(p2 + extent2), p2.max(p2 + extent2));
    (end1.min(end2) - start1.max(start2)).max(0)
}

impl fmt::Display for Tray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y, z) = self.position;
        let (dx, dy, dz) = self.bounding_box();
        write!(f, "({x},{dx})|({y},{dy})|({z},{dz})|{}", self.layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ItemOrientation, Plane};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn cube(position: Extent3, size: i64) -> Tray {
        Tray::new(position, Item::new(size, size, size), 0)
    }

    #[test]
    fn test_overlap() {
        let a = cube((0, 0, 0), 10);
        let b = cube((5, 8, 0), 10);
        assert_eq!(a.overlap(&b), (5, 2, 10));

        let apart = cube((20, 0, 0), 10);
        assert_eq!(a.overlap(&apart), (0, 10, 10));

        let touching = cube((10, 0, 0), 10);
        assert_eq!(a.overlap(&touching).0, 0);
    }

    #[test]
    fn test_overlap_with_negative_extent() {
        let down = Tray::new(
            (0, 0, 10),
            Item::new(10, 10, 4)
                .with_orientation(ItemOrientation::DOWN)
                .with_plane(Plane::XY),
            0,
        );
        assert_eq!(down.bounding_box(), (10, 10, -4));

        let below = cube((0, 0, 0), 8);
        assert_eq!(down.overlap(&below), (8, 8, 2));
        assert_eq!(below.overlap(&down), (8, 8, 2));
    }

    #[test]
    fn test_random_tray_within_layer() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let tray = Tray::random((300, 88, 120), &mut rng);
            let (x, y, z) = tray.position;
            assert!((0..300).contains(&x));
            assert!((0..88).contains(&y));
            assert!((0..120).contains(&z));
            for dim in [tray.item.length, tray.item.width, tray.item.height] {
                assert!((1..88).contains(&dim));
            }
            assert_eq!(tray.layer, 0);
        }
    }

    #[test]
    fn test_mutation_changes_at_most_one_field() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut tray = cube((20, 20, 20), 20);
        for _ in 0..500 {
            let before = tray;
            tray.mutate(&mut rng);

            let fields = |t: &Tray| {
                [
                    t.position.0,
                    t.position.1,
                    t.position.2,
                    t.item.length,
                    t.item.width,
                    t.item.height,
                ]
            };
            let changed = fields(&before)
                .iter()
                .zip(fields(&tray).iter())
                .filter(|(a, b)| a != b)
                .count();
            assert!(changed <= 1);
            assert!(fields(&tray).iter().all(|&v| v >= 0));
            assert_eq!(tray.item.orientation, before.item.orientation);
            assert_eq!(tray.layer, before.layer);
        }
    }

    #[test]
    fn test_mutation_step_is_bounded() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut tray = cube((1_000_000, 1_000_000, 1_000_000), 1_000_000);
        let fields = |t: &Tray| {
            [
                t.position.0,
                t.position.1,
                t.position.2,
                t.item.length,
                t.item.width,
                t.item.height,
            ]
        };
        for _ in 0..2000 {
            let before = fields(&tray);
            tray.mutate(&mut rng);
            for (a, b) in before.iter().zip(fields(&tray).iter()) {
                assert!((-MUTATION_STEP..MUTATION_STEP).contains(&(b - a)));
            }
        }
    }

    #[test]
    fn test_display() {
        let tray = Tray::new((1, 2, 3), Item::new(30, 20, 10).with_plane(Plane::XY), 0);
        assert_eq!(tray.to_string(), "(1,20)|(2,30)|(3,10)|0");
    }

    fn tray_strategy() -> impl Strategy<Value = Tray> {
        (
            (0i64..200, 0i64..200, 0i64..200),
            (0i64..100, 0i64..100, 0i64..100),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(position, (l, w, h), horizontal, down)| {
                let orientation = ItemOrientation { horizontal, down };
                Tray::new(
                    position,
                    Item::new(l, w, h).with_orientation(orientation),
                    0,
                )
            })
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(a in tray_strategy(), b in tray_strategy()) {
            prop_assert_eq!(a.overlap(&b), b.overlap(&a));
        }

        #[test]
        fn prop_overlap_is_non_negative(a in tray_strategy(), b in tray_strategy()) {
            let (x, y, z) = a.overlap(&b);
            prop_assert!(x >= 0 && y >= 0 && z >= 0);
        }
    }
}
