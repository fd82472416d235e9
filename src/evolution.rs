//! A plain generational genetic algorithm over [`NetGenome`]s.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::brain::NetGenome;
use crate::config::TrainConfig;
use crate::episode::GenomeId;

/// Fitness statistics for one generation.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationStats {
    pub generation: u32,
    pub best: f64,
    pub mean: f64,
    pub stdev: f64,
}

impl GenerationStats {
    pub fn of(generation: u32, genomes: &[(GenomeId, NetGenome)]) -> Self {
        let n = genomes.len().max(1) as f64;
        let fitness = || genomes.iter().map(|(_, g)| g.fitness);
        let mean = fitness().sum::<f64>() / n;
        let var = fitness().map(|f| (f - mean).powi(2)).sum::<f64>() / n;
        Self {
            generation,
            best: fitness().fold(f64::NEG_INFINITY, f64::max),
            mean,
            stdev: var.sqrt(),
        }
    }
}

pub struct Population {
    cfg: TrainConfig,
    genomes: Vec<(GenomeId, NetGenome)>,
    generation: u32,
    next_id: GenomeId,
    /// Fittest genome seen so far and the generation it flew in.
    best: Option<(u32, NetGenome)>,
}

impl Population {
    pub fn new(cfg: TrainConfig, rng: &mut impl Rng) -> Self {
        let genomes: Vec<_> = (0..cfg.population as GenomeId)
            .map(|id| (id, NetGenome::random(cfg.hidden, rng)))
            .collect();
        Self {
            next_id: genomes.len() as GenomeId,
            cfg,
            genomes,
            generation: 0,
            best: None,
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn genomes(&self) -> &[(GenomeId, NetGenome)] {
        &self.genomes
    }

    /// Fittest genome evaluated so far and the generation it flew in.
    pub fn best(&self) -> Option<(u32, &NetGenome)> {
        self.best.as_ref().map(|(generation, g)| (*generation, g))
    }

    /// Evaluates and breeds up to `generations` times. `eval` receives the
    /// population and the 1-based generation number and must set every
    /// genome's fitness. Stops early when the fitness threshold is reached.
    pub fn run<F, E>(
        &mut self,
        mut eval: F,
        generations: u32,
        rng: &mut impl Rng,
    ) -> Result<Option<(u32, NetGenome)>, E>
    where
        F: FnMut(&mut [(GenomeId, NetGenome)], u32) -> Result<bool, E>,
    {
        for _ in 0..generations {
            self.generation += 1;
            let keep_going = eval(&mut self.genomes, self.generation)?;

            let stats = GenerationStats::of(self.generation, &self.genomes);
            info!(
                generation = stats.generation,
                best = stats.best,
                mean = stats.mean,
                stdev = stats.stdev,
                population = self.genomes.len(),
                "generation evaluated"
            );
            self.track_best();

            if !keep_going {
                break;
            }
            if stats.best >= self.cfg.fitness_threshold {
                info!(
                    generation = self.generation,
                    threshold = self.cfg.fitness_threshold,
                    "fitness threshold reached"
                );
                break;
            }
            self.breed(rng);
        }
        Ok(self.best.clone())
    }

    fn track_best(&mut self) {
        let champion = self
            .genomes
            .iter()
            .map(|(_, g)| g)
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness));
        if let Some(champion) = champion {
            if self.best.as_ref().is_none_or(|(_, b)| champion.fitness > b.fitness) {
                self.best = Some((self.generation, champion.clone()));
            }
        }
    }

    /// Replaces the population with the next generation. The elite survive
    /// unchanged, everyone else is bred from tournament winners.
    pub fn breed(&mut self, rng: &mut impl Rng) {
        let mut ranked: Vec<&NetGenome> = self.genomes.iter().map(|(_, g)| g).collect();
        ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let size = self.cfg.population;
        let mut next: Vec<NetGenome> = ranked
            .iter()
            .take(self.cfg.elitism.min(size))
            .map(|g| (*g).clone())
            .collect();
        while next.len() < size {
            let a = tournament(&ranked, self.cfg.tournament_size, rng);
            let mut net = if rng.gen_bool(self.cfg.crossover_rate) {
                let b = tournament(&ranked, self.cfg.tournament_size, rng);
                a.net.crossover(&b.net, rng)
            } else {
                a.net.clone()
            };
            net.mutate(
                self.cfg.mutation_rate,
                self.cfg.mutation_power,
                self.cfg.replace_rate,
                rng,
            );
            next.push(NetGenome { net, fitness: 0.0 });
        }

        self.genomes = next
            .into_iter()
            .map(|g| {
                let id = self.next_id;
                self.next_id += 1;
                (id, g)
            })
            .collect();
    }
}

fn tournament<'a>(ranked: &[&'a NetGenome], k: usize, rng: &mut impl Rng) -> &'a NetGenome {
    ranked
        .choose_multiple(rng, k.max(1))
        .copied()
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        .unwrap_or(ranked[0])
}
