use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use flappy_evolve::logging::{init_logger, log_file_name};
use flappy_evolve::terminal::{KeyboardPolicy, TerminalPresenter};
use flappy_evolve::{
    Ended, Genome, Headless, PassRule, Population, Presenter, SimConfig, TrainConfig, Winner,
    eval_genomes,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, info, warn};

#[derive(Parser)]
#[command(name = "flappy-evolve")]
#[command(version)]
#[command(about = "Evolve neural networks that play Flappy Bird, in your terminal")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a population and save the best genome
    Train {
        #[arg(short, long, default_value = "50")]
        generations: u32,

        #[arg(short, long, default_value = "50")]
        population: usize,

        /// Neurons in the hidden layer (0 for none)
        #[arg(long, default_value = "4")]
        hidden: usize,

        /// Stop once a genome reaches this fitness
        #[arg(long, default_value = "100")]
        threshold: f64,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Cut every episode off after this many ticks
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Decide passes by any living bird instead of the last one examined
        #[arg(long)]
        any_live: bool,

        /// Train without drawing, as fast as possible
        #[arg(long)]
        headless: bool,

        /// Where to write the winner
        #[arg(short, long, default_value = "winner.bin")]
        out: PathBuf,
    },

    /// Watch a saved genome fly
    Replay {
        winner: PathBuf,

        #[arg(long)]
        seed: Option<u64>,

        /// Fly one episode without drawing and print the score
        #[arg(long)]
        headless: bool,

        #[arg(long, default_value = "100000")]
        max_ticks: u64,
    },

    /// Fly yourself: space, up or enter to flap, q to quit
    Play {
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    match cli.command {
        Commands::Train {
            generations,
            population,
            hidden,
            threshold,
            seed,
            max_ticks,
            any_live,
            headless,
            out,
        } => {
            let train = TrainConfig {
                population,
                generations,
                fitness_threshold: threshold,
                hidden,
                seed: seed.unwrap_or_else(rand::random),
                ..TrainConfig::default()
            };
            let sim = SimConfig {
                max_ticks,
                pass_rule: if any_live {
                    PassRule::AnyLive
                } else {
                    PassRule::LastExamined
                },
                ..SimConfig::default()
            };
            if headless {
                init_logger(level, None)?;
                run_training(train, sim, &mut Headless, out)
            } else {
                init_logger(level, Some(&log_file_name()))?;
                run_training(train, sim, &mut TerminalPresenter::new()?, out)
            }
        }
        Commands::Replay {
            winner,
            seed,
            headless,
            max_ticks,
        } => {
            let winner = Winner::load(&winner)
                .with_context(|| format!("loading {}", winner.display()))?;
            let sim = SimConfig {
                max_ticks: Some(max_ticks),
                ..SimConfig::default()
            };
            let seed = seed.unwrap_or_else(rand::random);
            if headless {
                init_logger(level, None)?;
                replay(winner, sim, seed, &mut Headless, true)
            } else {
                init_logger(level, Some(&log_file_name()))?;
                replay(winner, sim, seed, &mut TerminalPresenter::new()?, false)
            }
        }
        Commands::Play { seed } => {
            init_logger(level, Some(&log_file_name()))?;
            play(seed.unwrap_or_else(rand::random))
        }
    }
}

fn run_training(
    train: TrainConfig,
    sim: SimConfig,
    presenter: &mut impl Presenter,
    out: PathBuf,
) -> anyhow::Result<()> {
    info!(seed = train.seed, population = train.population, "training started");
    let mut rng = StdRng::seed_from_u64(train.seed);
    let mut world = StdRng::seed_from_u64(train.seed.wrapping_add(1));
    let generations = train.generations;
    let mut population = Population::new(train, &mut rng);

    let best = population.run(
        |genomes, generation| {
            let summary = eval_genomes(genomes, generation, &sim, &mut world, presenter)?;
            info!(generation, score = summary.score, ticks = summary.ticks, "episode over");
            Ok::<_, std::io::Error>(summary.ended != Ended::Quit)
        },
        generations,
        &mut rng,
    )?;

    let Some((generation, genome)) = best else {
        warn!("no genome was evaluated, nothing to save");
        return Ok(());
    };
    info!(generation, fitness = genome.fitness, path = %out.display(), "saving winner");
    Winner::new(generation, genome)
        .save(&out)
        .with_context(|| format!("saving {}", out.display()))?;
    Ok(())
}

fn replay(
    winner: Winner,
    sim: SimConfig,
    seed: u64,
    presenter: &mut impl Presenter,
    once: bool,
) -> anyhow::Result<()> {
    info!(
        generation = winner.generation,
        fitness = winner.genome.fitness,
        "replaying winner"
    );
    let mut rng = StdRng::seed_from_u64(seed);
    let mut genomes = vec![(0, winner.genome)];
    loop {
        let summary = eval_genomes(&mut genomes, winner.generation, &sim, &mut rng, presenter)?;
        info!(score = summary.score, ticks = summary.ticks, "replay over");
        if once {
            println!("score {} after {} ticks", summary.score, summary.ticks);
        }
        if once || summary.ended == Ended::Quit {
            return Ok(());
        }
    }
}

struct Player {
    fitness: f64,
    controls: KeyboardPolicy,
}

impl Genome for Player {
    type Policy = KeyboardPolicy;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    fn policy(&self) -> KeyboardPolicy {
        self.controls.clone()
    }
}

fn play(seed: u64) -> anyhow::Result<()> {
    let mut presenter = TerminalPresenter::new()?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut players = vec![(
        0,
        Player {
            fitness: 0.0,
            controls: presenter.keyboard(),
        },
    )];
    let mut best = 0;
    loop {
        let summary = eval_genomes(&mut players, 0, &SimConfig::default(), &mut rng, &mut presenter)?;
        best = best.max(summary.score);
        info!(score = summary.score, best, "game over");
        if summary.ended == Ended::Quit {
            return Ok(());
        }
    }
}
