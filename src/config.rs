//! World constants and tunables for the simulation and the evolution driver.

use serde::{Deserialize, Serialize};

// ── World geometry ──────────────────────────────────────────────────────────

pub const WIN_WIDTH: i32 = 600;
pub const WIN_HEIGHT: i32 = 800;
/// Top of the ground strip; a bird whose feet reach it is dead.
pub const FLOOR: i32 = 730;

pub const BIRD_WIDTH: usize = 68;
pub const BIRD_HEIGHT: usize = 48;
pub const PIPE_WIDTH: usize = 104;
pub const PIPE_HEIGHT: usize = 640;
pub const BASE_WIDTH: i32 = 672;

// ── Motion ──────────────────────────────────────────────────────────────────

pub const GRAVITY: f64 = 3.0;
pub const JUMP_VEL: f64 = -10.5;
pub const TERMINAL_DISPLACEMENT: f64 = 16.0;
pub const RISE_BOOST: f64 = 2.0;
pub const MAX_ROTATION: f64 = 25.0;
pub const ROT_VEL: f64 = 20.0;
pub const MIN_ROTATION: f64 = -90.0;
pub const ANIMATION_TIME: u32 = 5;
pub const SCROLL_VEL: i32 = 5;

/// Which agent decides that a pipe has been passed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassRule {
    /// The last agent examined in the collision pass, even one that pass just
    /// removed. All birds share the same `x`, so this only differs from
    /// [`PassRule::AnyLive`] when the last live bird dies on the pipe it is
    /// passing.
    #[default]
    LastExamined,
    /// Any agent still alive after the collision pass.
    AnyLive,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub bird_start: (i32, f64),
    pub first_pipe_x: i32,
    pub spawn_x: i32,
    pub pipe_gap: i32,
    /// Half-open range the gap height is drawn from.
    pub gap_range: (i32, i32),
    pub survive_reward: f64,
    pub pass_reward: f64,
    pub crash_penalty: f64,
    pub jump_threshold: f64,
    pub pass_rule: PassRule,
    /// Stop an episode after this many ticks even if birds remain.
    pub max_ticks: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            bird_start: (230, 350.0),
            first_pipe_x: 700,
            spawn_x: WIN_WIDTH,
            pipe_gap: 200,
            gap_range: (50, 450),
            survive_reward: 0.1,
            pass_reward: 5.0,
            crash_penalty: 1.0,
            jump_threshold: 0.5,
            pass_rule: PassRule::default(),
            max_ticks: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub population: usize,
    pub generations: u32,
    /// Training stops once the best genome of a generation reaches this.
    pub fitness_threshold: f64,
    /// Genomes copied unchanged into the next generation.
    pub elitism: usize,
    pub tournament_size: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub mutation_power: f64,
    pub replace_rate: f64,
    pub hidden: usize,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            population: 50,
            generations: 50,
            fitness_threshold: 100.0,
            elitism: 2,
            tournament_size: 3,
            crossover_rate: 0.5,
            mutation_rate: 0.8,
            mutation_power: 0.5,
            replace_rate: 0.1,
            hidden: 4,
            seed: 0,
        }
    }
}
