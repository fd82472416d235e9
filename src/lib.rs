//! Flappy Bird as a training ground: birds steered by small neural networks
//! fly through scrolling pipes, and the fittest ones breed the next
//! generation.

pub mod bird;
pub mod brain;
pub mod config;
pub mod episode;
pub mod evolution;
pub mod ground;
pub mod logging;
pub mod mask;
pub mod pipe;
pub mod render;
pub mod sprite;
pub mod terminal;
pub mod winner;

pub use brain::{NetGenome, Network};
pub use config::{PassRule, SimConfig, TrainConfig};
pub use episode::{
    Control, Ended, Episode, EpisodeSummary, Genome, GenomeId, Headless, Policy, Presenter,
    Scene, eval_genomes,
};
pub use evolution::Population;
pub use winner::{Winner, WinnerError};
