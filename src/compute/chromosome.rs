//! Chromosome representation: genes of placed trays and the individuals built from them.

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;

use super::Tray;

/// Trays placed for one item class.
#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    trays: Vec<Tray>,
    max_trays: usize,
}

impl Gene {
    /// Create an empty gene holding at most `max_trays` trays.
    pub fn new(max_trays: usize) -> Self {
        Self {
            trays: Vec::with_capacity(max_trays),
            max_trays,
        }
    }

    pub fn trays(&self) -> &[Tray] {
        &self.trays
    }

    pub fn len(&self) -> usize {
        self.trays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trays.is_empty()
    }

    pub fn max_trays(&self) -> usize {
        self.max_trays
    }

    pub fn can_add_more(&self) -> bool {
        self.trays.len() < self.max_trays
    }

    /// Append a tray. Returns `false` and drops it when the gene is full.
    pub fn add(&mut self, tray: Tray) -> bool {
        if !self.can_add_more() {
            return false;
        }
        self.trays.push(tray);
        true
    }

    /// Remove the tray at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Tray> {
        (index < self.trays.len()).then(|| self.trays.remove(index))
    }

    /// Perturb one tray chosen uniformly. Returns `false` for an empty gene.
    pub fn mutate_tray<R>(&mut self, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        match self.trays.choose_mut(rng) {
            Some(tray) => {
                tray.mutate(rng);
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tray) in self.trays.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tray}")?;
        }
        Ok(())
    }
}

/// A candidate layout: one gene per item class and its cached fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    genes: Vec<Gene>,
    fitness: Option<f64>,
    max_trays_per_gene: usize,
}

impl Individual {
    /// Create an individual with `gene_count` empty genes.
    pub fn new(gene_count: usize, max_trays_per_gene: usize) -> Self {
        Self::from_genes(
            (0..gene_count)
                .map(|_| Gene::new(max_trays_per_gene))
                .collect(),
            max_trays_per_gene,
        )
    }

    pub fn from_genes(genes: Vec<Gene>, max_trays_per_gene: usize) -> Self {
        Self {
            genes,
            fitness: None,
            max_trays_per_gene,
        }
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Mutable access to one gene. Clears the cached fitness.
    pub fn gene_mut(&mut self, index: usize) -> Option<&mut Gene> {
        self.fitness = None;
        self.genes.get_mut(index)
    }

    pub fn max_trays_per_gene(&self) -> usize {
        self.max_trays_per_gene
    }

    /// Cached fitness, `None` until computed.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Fitness for ranking; uncomputed individuals rank last.
    pub fn score(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Total number of trays across all genes.
    pub fn tray_count(&self) -> usize {
        self.genes.iter().map(Gene::len).sum()
    }

    /// All trays with their (gene, slot) coordinates.
    pub fn trays(&self) -> impl Iterator<Item = ((usize, usize), &Tray)> + '_ {
        self.genes.iter().enumerate().flat_map(|(g, gene)| {
            gene.trays()
                .iter()
                .enumerate()
                .map(move |(t, tray)| ((g, t), tray))
        })
    }

    /// Pick a gene uniformly and, with probability `rate`, perturb one of its trays.
    ///
    /// Returns the index of the mutated gene. A mutation clears the cached fitness.
    pub fn mutate<R>(&mut self, rate: f64, rng: &mut R) -> Option<usize>
    where
        R: Rng + ?Sized,
    {
        if self.genes.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.genes.len());
        if rng.r#gen::<f64>() < rate && self.genes[index].mutate_tray(rng) {
            self.fitness = None;
            Some(index)
        } else {
            None
        }
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, gene) in self.genes.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{gene}")?;
        }
        Ok(())
    }
}
