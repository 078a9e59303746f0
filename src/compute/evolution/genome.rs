//! Layout operators for the genetic solver.
//!
//! Provides random seeding, selection, crossover, and mutation of individuals.

use rand::prelude::*;

use crate::compute::{Gene, Individual, Tray};
use crate::schema::Extent3;

/// Random number generator wrapper for layout operations.
pub struct TrayRng {
    rng: StdRng,
}

impl TrayRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// An individual with one random tray per gene.
    pub fn random_individual(
        &mut self,
        gene_count: usize,
        max_trays_per_gene: usize,
        layer_size: Extent3,
    ) -> Individual {
        let genes = (0..gene_count)
            .map(|_| {
                let mut gene = Gene::new(max_trays_per_gene);
                gene.add(Tray::random(layer_size, &mut self.rng));
                gene
            })
            .collect();
        Individual::from_genes(genes, max_trays_per_gene)
    }

    /// Tournament selection: the fittest of `size` distinct random entrants.
    ///
    /// Entrants without a computed fitness lose every comparison. The
    /// population must not be empty.
    pub fn select<'a>(&mut self, population: &'a [Individual], size: usize) -> &'a Individual {
        let entrants = size.clamp(1, population.len());
        let winner = rand::seq::index::sample(&mut self.rng, population.len(), entrants)
            .into_iter()
            .max_by(|&a, &b| population[a].score().total_cmp(&population[b].score()))
            .unwrap_or(0);
        &population[winner]
    }

    /// Blend two parents tray by tray.
    ///
    /// Each child tray mixes the same (gene, slot) trays of both parents with
    /// a fresh `alpha` drawn from `alpha_range`; layer, orientation and plane
    /// come from `parent1`. A slot present in only one parent is copied as is.
    pub fn crossover(
        &mut self,
        parent1: &Individual,
        parent2: &Individual,
        alpha_range: (f64, f64),
    ) -> Individual {
        let genes = parent1
            .genes()
            .iter()
            .zip(parent2.genes())
            .map(|(g1, g2)| {
                let mut child = Gene::new(g1.max_trays());
                for slot in 0..g1.len().max(g2.len()) {
                    let tray = match (g1.trays().get(slot), g2.trays().get(slot)) {
                        (Some(t1), Some(t2)) => blend_tray(t1, t2, self.uniform(alpha_range)),
                        (Some(&only), None) | (None, Some(&only)) => only,
                        (None, None) => continue,
                    };
                    child.add(tray);
                }
                child
            })
            .collect();
        Individual::from_genes(genes, parent1.max_trays_per_gene())
    }

    /// Perturb one tray of one gene with probability `rate`.
    pub fn mutate(&mut self, individual: &mut Individual, rate: f64) -> Option<usize> {
        individual.mutate(rate, &mut self.rng)
    }

    /// Grow or shrink one gene chosen uniformly.
    ///
    /// With probability `up` a random tray is added if the gene has room;
    /// otherwise, with probability `down`, a random tray is removed if more
    /// than one remains. Returns whether the tray count changed.
    pub fn mutate_tray_count(
        &mut self,
        individual: &mut Individual,
        up: f64,
        down: f64,
        layer_size: Extent3,
    ) -> bool {
        let gene_count = individual.genes().len();
        if gene_count == 0 {
            return false;
        }
        let index = self.rng.gen_range(0..gene_count);
        let gene = &individual.genes()[index];

        if gene.can_add_more() && self.rng.r#gen::<f64>() < up {
            let tray = Tray::random(layer_size, &mut self.rng);
            return individual
                .gene_mut(index)
                .is_some_and(|gene| gene.add(tray));
        }
        if gene.len() > 1 && self.rng.r#gen::<f64>() < down {
            let slot = self.rng.gen_range(0..gene.len());
            return individual
                .gene_mut(index)
                .and_then(|gene| gene.remove(slot))
                .is_some();
        }
        false
    }

    fn uniform(&mut self, (lo, hi): (f64, f64)) -> f64 {
        if lo < hi {
            self.rng.gen_range(lo..hi)
        } else {
            lo
        }
    }

    /// Generate next u64 for seeding child RNGs.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }
}

fn blend_tray(t1: &Tray, t2: &Tray, alpha: f64) -> Tray {
    let (x1, y1, z1) = t1.position;
    let (x2, y2, z2) = t2.position;
    let (i1, i2) = (t1.item, t2.item);
    Tray::new(
        (blend(x1, x2, alpha), blend(y1, y2, alpha), blend(z1, z2, alpha)),
        i1.with_dims(
            blend(i1.length, i2.length, alpha),
            blend(i1.width, i2.width, alpha),
            blend(i1.height, i2.height, alpha),
        ),
        t1.layer,
    )
}

/// Weighted mix of two coordinates, rounded and clamped at zero.
fn blend(a: i64, b: i64, alpha: f64) -> i64 {
    (alpha * a as f64 + (1.0 - alpha) * b as f64).round().max(0.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Item, ItemOrientation, Plane};
    use proptest::prelude::*;

    fn single_tray(tray: Tray) -> Individual {
        let mut gene = Gene::new(1);
        gene.add(tray);
        Individual::from_genes(vec![gene], 1)
    }

    #[test]
    fn test_random_individual() {
        let mut rng = TrayRng::new(42);
        let individual = rng.random_individual(5, 3, (300, 300, 120));

        assert_eq!(individual.genes().len(), 5);
        assert!(individual.genes().iter().all(|g| g.len() == 1));
        assert!(individual.genes().iter().all(|g| g.max_trays() == 3));
        assert_eq!(individual.fitness(), None);
    }

    #[test]
    fn test_blend() {
        assert_eq!(blend(10, 20, 1.0), 10);
        assert_eq!(blend(10, 20, 0.0), 20);
        assert_eq!(blend(10, 20, 0.5), 15);
        assert_eq!(blend(0, 1, 1.05), 0);
        assert_eq!(blend(0, 100, 1.05), 0);
    }

    #[test]
    fn test_crossover_of_identical_parents() {
        let mut rng = TrayRng::new(1);
        let tray = Tray::new((5, 6, 7), Item::new(10, 20, 30), 0);
        let parent = single_tray(tray);

        for _ in 0..50 {
            let child = rng.crossover(&parent, &parent, (-0.05, 1.05));
            assert_eq!(child.genes()[0].trays(), &[tray]);
            assert_eq!(child.fitness(), None);
        }
    }

    #[test]
    fn test_crossover_keeps_first_parent_attributes() {
        let mut rng = TrayRng::new(2);
        let item1 = Item::new(10, 10, 10)
            .with_orientation(ItemOrientation::HORIZONTAL)
            .with_plane(Plane::YZ);
        let parent1 = single_tray(Tray::new((0, 0, 0), item1, 2));
        let parent2 = single_tray(Tray::new((40, 40, 40), Item::new(50, 50, 50), 0));

        let child = rng.crossover(&parent1, &parent2, (0.25, 0.75));
        let tray = child.genes()[0].trays()[0];
        assert_eq!(tray.layer, 2);
        assert_eq!(tray.item.orientation, ItemOrientation::HORIZONTAL);
        assert_eq!(tray.item.plane, Plane::YZ);
        assert!((10..=30).contains(&tray.position.0));
        assert!((20..=40).contains(&tray.item.length));
    }

    #[test]
    fn test_crossover_copies_unpaired_slots() {
        let mut rng = TrayRng::new(3);
        let tray = Tray::new((0, 0, 0), Item::new(10, 10, 10), 0);
        let extra = Tray::new((50, 60, 70), Item::new(5, 6, 7), 1);

        let mut long = Gene::new(3);
        long.add(tray);
        long.add(extra);
        let mut short = Gene::new(3);
        short.add(tray);
        let long = Individual::from_genes(vec![long], 3);
        let short = Individual::from_genes(vec![short], 3);

        for (parent1, parent2) in [(&long, &short), (&short, &long)] {
            let child = rng.crossover(parent1, parent2, (0.0, 1.0));
            assert_eq!(child.genes()[0].trays(), &[tray, extra]);
            assert_eq!(child.max_trays_per_gene(), 3);
        }
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let mut rng = TrayRng::new(4);
        let mut population: Vec<Individual> = (0..4)
            .map(|i| single_tray(Tray::new((i, 0, 0), Item::new(1, 1, 1), 0)))
            .collect();
        for (i, individual) in population.iter_mut().enumerate() {
            individual.set_fitness(-(i as f64));
        }

        // Every member enters, so the best always wins.
        for _ in 0..20 {
            let winner = rng.select(&population, 4);
            assert_eq!(winner.fitness(), Some(0.0));
        }
        // Oversized tournaments are capped at the population size.
        assert_eq!(rng.select(&population, 50).fitness(), Some(0.0));
    }

    #[test]
    fn test_tournament_ranks_unevaluated_last() {
        let mut rng = TrayRng::new(5);
        let mut evaluated = single_tray(Tray::new((0, 0, 0), Item::new(1, 1, 1), 0));
        evaluated.set_fitness(-1e9);
        let population = vec![
            single_tray(Tray::new((1, 0, 0), Item::new(1, 1, 1), 0)),
            evaluated,
        ];
        assert_eq!(rng.select(&population, 2).fitness(), Some(-1e9));
    }

    #[test]
    fn test_tray_count_mutation() {
        let mut rng = TrayRng::new(6);
        let mut individual = rng.random_individual(1, 3, (50, 50, 50));
        individual.set_fitness(-5.0);

        assert!(rng.mutate_tray_count(&mut individual, 1.0, 0.0, (50, 50, 50)));
        assert!(rng.mutate_tray_count(&mut individual, 1.0, 0.0, (50, 50, 50)));
        assert_eq!(individual.tray_count(), 3);
        assert_eq!(individual.fitness(), None);

        // Full gene: growth is impossible, shrinking takes over.
        assert!(rng.mutate_tray_count(&mut individual, 1.0, 1.0, (50, 50, 50)));
        assert_eq!(individual.tray_count(), 2);

        assert!(rng.mutate_tray_count(&mut individual, 0.0, 1.0, (50, 50, 50)));
        // The last tray of a gene is never removed.
        assert!(!rng.mutate_tray_count(&mut individual, 0.0, 1.0, (50, 50, 50)));
        assert_eq!(individual.tray_count(), 1);
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut a = TrayRng::new(99);
        let mut b = TrayRng::new(99);
        assert_eq!(
            a.random_individual(3, 1, (100, 100, 100)),
            b.random_individual(3, 1, (100, 100, 100))
        );
        assert_eq!(a.next_seed(), b.next_seed());
    }

    proptest! {
        #[test]
        fn prop_crossover_stays_non_negative(
            p1 in (0i64..500, 0i64..500, 0i64..500),
            p2 in (0i64..500, 0i64..500, 0i64..500),
            seed in any::<u64>(),
        ) {
            let mut rng = TrayRng::new(seed);
            let a = single_tray(Tray::new(p1, Item::new(p1.0, p1.1, p1.2), 0));
            let b = single_tray(Tray::new(p2, Item::new(p2.0, p2.1, p2.2), 0));

            let child = rng.crossover(&a, &b, (-0.05, 1.05));
            let tray = child.genes()[0].trays()[0];
            let (x, y, z) = tray.position;
            prop_assert!(x >= 0 && y >= 0 && z >= 0);
            prop_assert!(tray.item.length >= 0 && tray.item.width >= 0 && tray.item.height >= 0);
        }
    }
}
