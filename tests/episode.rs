use flappy_evolve::episode::AgentId;
use flappy_evolve::pipe::Pipe;
use flappy_evolve::{
    Ended, Episode, Genome, GenomeId, Headless, NetGenome, Population, SimConfig, TrainConfig,
    eval_genomes,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::convert::Infallible;

#[derive(Clone, Debug, Default)]
struct Counter {
    fitness: f64,
}

impl Genome for Counter {
    type Policy = fn([f64; 3]) -> f64;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    fn policy(&self) -> Self::Policy {
        |_| 0.0
    }
}

/// Keeps the bird bobbing in the upper half of the gap it senses. The gap
/// is 200 tall, so the two distances tell which side of it the bird is on.
fn follow_gap(sensors: [f64; 3]) -> f64 {
    let [y, to_top, to_bottom] = sensors;
    let gap_top = if to_bottom - to_top >= 199.5 { y + to_top } else { y - to_top };
    if y > gap_top + 110.0 { 1.0 } else { 0.0 }
}

#[derive(Clone, Debug, Default)]
struct Follower {
    fitness: f64,
}

impl Genome for Follower {
    type Policy = fn([f64; 3]) -> f64;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    fn policy(&self) -> Self::Policy {
        follow_gap
    }
}

#[test]
fn lone_bird_trajectory_ends_on_the_floor() {
    let mut genomes = vec![(0 as GenomeId, Counter::default())];
    let mut ep = Episode::with_pipes(
        SimConfig::default(),
        [(AgentId(0), genomes[0].1.policy())],
        Vec::new(),
    );
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    // y_t = 350 + sum of displacements, 16 per tick once clamped.
    let mut expected = 350.0;
    let mut died_at = None;
    for t in 1..=42u32 {
        let d = (1.5 * (t * t) as f64).min(16.0);
        expected += d;
        let report = ep.step(&mut genomes, &mut rng);
        match ep.agents().first() {
            Some(agent) => assert_eq!(agent.bird.y, expected, "tick {t}"),
            None => {
                assert!(expected + 48.0 >= 730.0);
                assert_eq!(report.out_of_bounds, vec![AgentId(0)]);
                died_at = Some(t);
                break;
            }
        }
    }
    assert_eq!(died_at, Some(23));
}

#[test]
fn never_jumping_population_dies_together() {
    for n in [1usize, 7, 40] {
        let mut genomes: Vec<_> = (0..n as GenomeId).map(|i| (i, Counter::default())).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(n as u64);
        let summary =
            eval_genomes(&mut genomes, 1, &SimConfig::default(), &mut rng, &mut Headless).unwrap();
        assert_eq!(summary.ended, Ended::Extinct);
        assert_eq!(summary.ticks, 23);
        assert_eq!(summary.score, 0);
        assert!(genomes.iter().all(|(_, g)| (g.fitness - 2.3).abs() < 1e-9));
    }
}

#[test]
fn every_point_pays_every_survivor() {
    let mut genomes: Vec<_> = (0..5 as GenomeId).map(|i| (i, Follower::default())).collect();
    let policies: Vec<_> = genomes
        .iter()
        .enumerate()
        .map(|(i, (_, g))| (AgentId(i), g.policy()))
        .collect();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut ep = Episode::new(SimConfig::default(), policies, &mut rng);

    let mut passes = 0;
    for _ in 0..2000 {
        if ep.is_empty() {
            break;
        }
        let before: Vec<(AgentId, f64)> = ep
            .agents()
            .iter()
            .map(|a| (a.id, genomes[a.id.0].1.fitness))
            .collect();
        let pipes_before: Vec<Pipe> = ep.pipes().to_vec();
        let report = ep.step(&mut genomes, &mut rng);

        for (id, was) in before {
            let crashed = report.crashed.contains(&id);
            let out = report.out_of_bounds.contains(&id);
            assert!(!(crashed && out));
            let mut expected = was + 0.1;
            if crashed {
                expected -= 1.0;
            } else if report.scored {
                expected += 5.0;
            }
            let now = genomes[id.0].1.fitness;
            assert!((now - expected).abs() < 1e-9, "{now} vs {expected}");
        }
        if report.scored {
            passes += 1;
            assert_eq!(ep.score(), passes);
        }

        // Passed flags never revert; pipes stay in spawn order.
        for pipe in ep.pipes() {
            let earlier = pipes_before
                .iter()
                .find(|p| p.x - 5 == pipe.x && p.height == pipe.height);
            if let Some(earlier) = earlier {
                assert!(!earlier.passed || pipe.passed);
            }
        }
        assert!(ep.pipes().windows(2).all(|w| w[0].x < w[1].x));
    }
    assert!(passes > 0, "a gap-following bird should pass at least one pipe");
}

#[test]
fn bottom_pipe_edge_is_pixel_exact() {
    // The bird's lowest opaque row is its last; one row of clearance is safe.
    let sprites = flappy_evolve::sprite::Sprites::new();
    let mut bird = flappy_evolve::bird::Bird::new(230, 0.0);
    let pipe = Pipe::with_height(230, 100, 200);
    let lowest = (0..48)
        .rev()
        .find(|&y| (0..68).any(|x| sprites.bird[0].get(x, y)))
        .unwrap();
    bird.y = (pipe.bottom - lowest - 1) as f64;
    assert!(!pipe.collides(&bird, &sprites));
    bird.y += 1.0;
    assert!(pipe.collides(&bird, &sprites));
}

#[test]
fn short_training_run_produces_a_winner() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut world = ChaCha8Rng::seed_from_u64(100);
    let cfg = TrainConfig {
        population: 10,
        ..TrainConfig::default()
    };
    let sim = SimConfig {
        max_ticks: Some(300),
        ..SimConfig::default()
    };
    let mut population = Population::new(cfg, &mut rng);
    let best = population
        .run(
            |genomes: &mut [(GenomeId, NetGenome)], generation| {
                eval_genomes(genomes, generation, &sim, &mut world, &mut Headless).unwrap();
                Ok::<_, Infallible>(true)
            },
            3,
            &mut rng,
        )
        .unwrap();
    let (generation, genome) = best.unwrap();
    assert!((1..=3).contains(&generation));
    // Everyone survives at least one tick.
    assert!(genome.fitness >= 0.1 - 1.0);
    assert!(population.generation() <= 3);
}
