//! Fitness evaluation for candidate layouts.
//!
//! Fitness is a penalty score that is negated so the solver can maximize it:
//! 0 is a perfect packing and every defect pushes the score further below zero.
//!
//! Four penalties are combined, each expressed in volume units of the box:
//!
//! - **Unused space**: box volume not covered by any tray (overlap counted back in)
//! - **Unfit**: how far each tray falls short of its class footprint, per axis
//! - **Overlap**: volume shared by trays on the same layer
//! - **Overfit**: how far each tray sticks out of the box, per axis

use crate::compute::{GameBox, Individual, ItemClass};
use crate::schema::{Extent3, SolverConfig};

/// Weights applied to each penalty.
#[derive(Debug, Clone, Copy)]
pub struct FitnessWeights {
    pub unused_space: f64,
    pub unfit: f64,
    pub overlap: f64,
    pub overfit: f64,
    pub number_of_elements: f64,
}

impl From<&SolverConfig> for FitnessWeights {
    fn from(config: &SolverConfig) -> Self {
        Self {
            unused_space: config.unused_space_factor,
            unfit: config.unfit_factor,
            overlap: config.overlap_factor,
            overfit: config.overfit_factor,
            number_of_elements: config.number_of_elements_factor,
        }
    }
}

/// Unweighted penalty totals of one individual.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FitnessBreakdown {
    pub unused_space: f64,
    pub unfit: f64,
    pub overlap: f64,
    pub overfit: f64,
    pub tray_count: usize,
    pub gene_count: usize,
}

/// Scores individuals against a box and its item classes.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    layer_size: Extent3,
    layer_space: Vec<i64>,
    required: Vec<Extent3>,
    weights: FitnessWeights,
}

impl FitnessEvaluator {
    /// Create an evaluator for a single-layer box.
    pub fn new(game_box: &GameBox, item_classes: &[ItemClass], weights: FitnessWeights) -> Self {
        Self {
            layer_size: game_box.layer_size(1),
            layer_space: game_box.total_space(1),
            required: item_classes.iter().map(ItemClass::bounding_box).collect(),
            weights,
        }
    }

    /// Return the cached fitness, computing and storing it first if needed.
    pub fn evaluate(&self, individual: &mut Individual) -> f64 {
        if let Some(fitness) = individual.fitness() {
            return fitness;
        }
        let fitness = self.score(&self.breakdown(individual));
        individual.set_fitness(fitness);
        fitness
    }

    /// Penalty totals of an individual. Does not touch the fitness cache.
    pub fn breakdown(&self, individual: &Individual) -> FitnessBreakdown {
        debug_assert_eq!(individual.genes().len(), self.required.len());

        let (max_x, max_y, max_z) = self.layer_size;
        let trays: Vec<_> = individual.trays().collect();
        let mut unused = self.layer_space.clone();
        let mut breakdown = FitnessBreakdown {
            tray_count: trays.len(),
            gene_count: individual.genes().len(),
            ..Default::default()
        };

        for &((gene, slot), tray) in &trays {
            let (dx, dy, dz) = tray.bounding_box();
            let (x, y, z) = tray.position;
            let (rx, ry, rz) = self.required[gene];

            if let Some(space) = unused.get_mut(tray.layer) {
                *space -= tray.item.volume();
            }

            breakdown.unfit += volume((rx - dx).max(0), max_y, max_z)
                + volume(max_x, (ry - dy).max(0), max_z)
                + volume(max_x, max_y, (rz - dz).max(0));

            breakdown.overfit += volume((x + dx - max_x).max(0), max_y, max_z)
                + volume(max_x, (y + dy - max_y).max(0), max_z)
                + volume(max_x, max_y, (z + dz - max_z).max(0));

            for &(other_coords, other) in &trays {
                if other_coords == (gene, slot) || other.layer != tray.layer {
                    continue;
                }
                let (ox, oy, oz) = tray.overlap(other);
                let shared = ox * oy * oz;
                if let Some(space) = unused.get_mut(tray.layer) {
                    *space += shared;
                }
                breakdown.overlap += shared as f64;
            }
        }

        // Floored so a tray larger than the box cannot push the fitness above zero.
        breakdown.unused_space = unused.iter().map(|&space| space.max(0) as f64).sum();
        breakdown
    }

    /// Combine a breakdown into the final fitness.
    pub fn score(&self, breakdown: &FitnessBreakdown) -> f64 {
        let w = &self.weights;
        let (max_x, max_y, max_z) = self.layer_size;
        let box_volume = volume(max_x, max_y, max_z);

        let raw = w.unused_space * breakdown.unused_space
            + w.unfit * breakdown.unfit
            + w.overlap * breakdown.overlap
            + w.overfit * breakdown.overfit;

        let mut penalty = raw / box_volume * 100.0;
        if breakdown.gene_count > 0 {
            let surplus = breakdown.tray_count as f64 - breakdown.gene_count as f64;
            penalty += w.number_of_elements * surplus / breakdown.gene_count as f64 / 100.0;
        }
        -penalty
    }
}

fn volume(x: i64, y: i64, z: i64) -> f64 {
    x as f64 * y as f64 * z as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{Gene, Tray};
    use crate::schema::Item;

    fn cube(position: Extent3, size: i64) -> Tray {
        Tray::new(position, Item::new(size, size, size), 0)
    }

    fn single_class_box(size: i64) -> (GameBox, Vec<ItemClass>) {
        let mut game_box = GameBox::new(size, size, size);
        game_box.add_items(Item::new(size, size, size), 1);
        let classes = game_box.item_classes();
        (game_box, classes)
    }

    fn layout(trays: &[Tray], max_trays: usize) -> Individual {
        let genes = trays
            .iter()
            .map(|&tray| {
                let mut gene = Gene::new(max_trays);
                gene.add(tray);
                gene
            })
            .collect();
        Individual::from_genes(genes, max_trays)
    }

    fn evaluator(game_box: &GameBox, classes: &[ItemClass]) -> FitnessEvaluator {
        FitnessEvaluator::new(
            game_box,
            classes,
            FitnessWeights::from(&SolverConfig::default()),
        )
    }

    #[test]
    fn test_perfect_packing_scores_zero() {
        let (game_box, classes) = single_class_box(10);
        let evaluator = evaluator(&game_box, &classes);

        let mut perfect = layout(&[cube((0, 0, 0), 10)], 1);
        assert_eq!(evaluator.evaluate(&mut perfect), 0.0);
        assert_eq!(perfect.fitness(), Some(0.0));
    }

    #[test]
    fn test_any_deviation_is_negative() {
        let (game_box, classes) = single_class_box(10);
        let evaluator = evaluator(&game_box, &classes);

        let deviations = [
            cube((1, 0, 0), 10),
            cube((0, 0, 3), 10),
            cube((0, 0, 0), 9),
            cube((0, 0, 0), 11),
            cube((0, 0, 0), 30),
            Tray::new((0, 0, 0), Item::new(10, 10, 9), 0),
        ];
        for tray in deviations {
            let mut individual = layout(&[tray], 1);
            assert!(evaluator.evaluate(&mut individual) < 0.0, "{tray}");
        }
    }

    #[test]
    fn test_breakdown_values() {
        let (game_box, classes) = single_class_box(10);
        let evaluator = evaluator(&game_box, &classes);

        let individual = layout(&[cube((0, 0, 0), 5)], 1);
        let breakdown = evaluator.breakdown(&individual);
        assert_eq!(breakdown.unused_space, 875.0);
        assert_eq!(breakdown.unfit, 3.0 * 5.0 * 100.0);
        assert_eq!(breakdown.overfit, 0.0);
        assert_eq!(breakdown.overlap, 0.0);

        // (875 + 10 * 1500) / 1000 * 100
        assert_eq!(evaluator.score(&breakdown), -1587.5);

        let sticking_out = layout(&[cube((8, 0, 0), 10)], 1);
        let breakdown = evaluator.breakdown(&sticking_out);
        assert_eq!(breakdown.overfit, 8.0 * 100.0);
        assert_eq!(breakdown.unused_space, 0.0);
    }

    #[test]
    fn test_oversized_tray_never_scores_above_zero() {
        let (game_box, classes) = single_class_box(10);
        let evaluator = evaluator(&game_box, &classes);

        let individual = layout(&[cube((0, 0, 0), 30)], 1);
        let breakdown = evaluator.breakdown(&individual);
        // 27000 filled in a 1000 box would be -26000 unused without the floor.
        assert_eq!(breakdown.unused_space, 0.0);
        assert_eq!(breakdown.overfit, 3.0 * 20.0 * 100.0);
        assert!(evaluator.score(&breakdown) < 0.0);

        // Unused space alone cannot turn positive either.
        let unused_only = FitnessEvaluator::new(
            &game_box,
            &classes,
            FitnessWeights {
                unused_space: 1.0,
                unfit: 0.0,
                overlap: 0.0,
                overfit: 0.0,
                number_of_elements: 0.0,
            },
        );
        assert!(unused_only.score(&breakdown) <= 0.0);
    }

    #[test]
    fn test_overlap_is_penalized_across_genes() {
        let mut game_box = GameBox::new(10, 20, 10);
        game_box.add_items(Item::new(10, 10, 10), 1);
        game_box.add_items(Item::new(10, 10, 9), 1);
        let classes = game_box.item_classes();
        let evaluator = evaluator(&game_box, &classes);

        let stacked = layout(&[cube((0, 0, 0), 10), cube((0, 0, 0), 10)], 1);
        let breakdown = evaluator.breakdown(&stacked);
        // Each tray sees the other once.
        assert_eq!(breakdown.overlap, 2000.0);
        assert_eq!(breakdown.unused_space, 2000.0);

        let side_by_side = layout(&[cube((0, 0, 0), 10), cube((10, 0, 0), 10)], 1);
        let breakdown = evaluator.breakdown(&side_by_side);
        assert_eq!(breakdown.overlap, 0.0);
        assert_eq!(breakdown.unused_space, 0.0);
        assert!(evaluator.score(&breakdown) > evaluator.score(&evaluator.breakdown(&stacked)));
    }

    #[test]
    fn test_trays_on_other_layers_do_not_overlap() {
        let mut game_box = GameBox::new(10, 20, 10);
        game_box.add_items(Item::new(10, 10, 10), 1);
        game_box.add_items(Item::new(10, 10, 9), 1);
        let classes = game_box.item_classes();
        let evaluator = evaluator(&game_box, &classes);

        let mut upper = cube((0, 0, 0), 10);
        upper.layer = 1;
        let individual = layout(&[cube((0, 0, 0), 10), upper], 1);
        assert_eq!(evaluator.breakdown(&individual).overlap, 0.0);
    }

    #[test]
    fn test_fitness_is_memoized() {
        let (game_box, classes) = single_class_box(10);
        let evaluator = evaluator(&game_box, &classes);

        let mut individual = layout(&[cube((0, 0, 0), 5)], 1);
        let first = evaluator.evaluate(&mut individual);
        assert_eq!(evaluator.evaluate(&mut individual), first);

        individual.set_fitness(-1.0);
        assert_eq!(evaluator.evaluate(&mut individual), -1.0);
    }

    #[test]
    fn test_surplus_trays_cost_with_element_factor() {
        let (game_box, classes) = single_class_box(10);
        let weights = FitnessWeights {
            number_of_elements: 100.0,
            ..FitnessWeights::from(&SolverConfig::default())
        };
        let evaluator = FitnessEvaluator::new(&game_box, &classes, weights);

        let mut gene = Gene::new(2);
        gene.add(Tray::new((0, 0, 0), Item::new(10, 10, 5), 0));
        gene.add(Tray::new((0, 5, 0), Item::new(10, 10, 5), 0));
        let individual = Individual::from_genes(vec![gene], 2);

        let breakdown = evaluator.breakdown(&individual);
        assert_eq!(breakdown.tray_count, 2);
        assert_eq!(breakdown.unused_space, 0.0);
        assert_eq!(breakdown.overlap, 0.0);
        // Neither half reaches the full footprint on its own.
        assert!(breakdown.unfit > 0.0);

        let with_factor = evaluator.score(&breakdown);
        let without = FitnessEvaluator::new(
            &game_box,
            &classes,
            FitnessWeights::from(&SolverConfig::default()),
        )
        .score(&breakdown);
        assert_eq!(with_factor, without - 1.0);
    }
}
