//! One episode: a population of birds flying until the last one dies.

use std::io;

use rand::Rng;
use tracing::{debug, trace};

use crate::bird::Bird;
use crate::config::{FLOOR, PassRule, SimConfig};
use crate::ground::Ground;
use crate::pipe::{Pipe, sensor_index};
use crate::sprite::Sprites;

pub type GenomeId = u64;

/// Maps the sensor vector `(y, |y - gap top|, |y - gap bottom|)` to an
/// action; the bird jumps when the output exceeds the jump threshold.
pub trait Policy {
    fn activate(&self, sensors: [f64; 3]) -> f64;
}

impl<F: Fn([f64; 3]) -> f64> Policy for F {
    fn activate(&self, sensors: [f64; 3]) -> f64 {
        self(sensors)
    }
}

/// A trainable individual as far as an episode is concerned: a fitness
/// score and a way to build the policy it encodes.
pub trait Genome {
    type Policy: Policy;

    fn fitness(&self) -> f64;
    fn set_fitness(&mut self, fitness: f64);
    fn policy(&self) -> Self::Policy;

    fn add_fitness(&mut self, delta: f64) {
        self.set_fitness(self.fitness() + delta);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// What a presenter gets to see after every tick. Borrows the episode's
/// state, so building one costs nothing.
#[derive(Debug)]
pub struct Scene<'a, P> {
    pub agents: &'a [Agent<P>],
    pub pipes: &'a [Pipe],
    pub ground: &'a Ground,
    pub score: u32,
    pub generation: u32,
}

impl<'a, P> Scene<'a, P> {
    pub fn birds(&self) -> impl Iterator<Item = &'a Bird> {
        self.agents.iter().map(|a| &a.bird)
    }

    pub fn alive(&self) -> usize {
        self.agents.len()
    }
}

pub trait Presenter {
    fn present<P>(&mut self, scene: &Scene<'_, P>) -> io::Result<Control>;
}

/// Runs as fast as the CPU allows and never quits.
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;

impl Presenter for Headless {
    fn present<P>(&mut self, _scene: &Scene<'_, P>) -> io::Result<Control> {
        Ok(Control::Continue)
    }
}

/// Position of the agent's genome in the slice handed to [`Episode::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AgentId(pub usize);

#[derive(Debug)]
pub struct Agent<P> {
    pub id: AgentId,
    pub bird: Bird,
    pub policy: P,
}

/// Everything that happened during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    pub crashed: Vec<AgentId>,
    pub out_of_bounds: Vec<AgentId>,
    pub scored: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ended {
    /// Every bird died.
    Extinct,
    TickLimit,
    Quit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeSummary {
    pub generation: u32,
    pub score: u32,
    pub ticks: u64,
    pub ended: Ended,
}

pub struct Episode<P> {
    cfg: SimConfig,
    sprites: Sprites,
    agents: Vec<Agent<P>>,
    pipes: Vec<Pipe>,
    ground: Ground,
    score: u32,
    ticks: u64,
    /// `x` of the bird most recently looked at this tick.
    last_examined: Option<i32>,
}

impl<P: Policy> Episode<P> {
    /// Spawns one bird per policy and the first pipe.
    pub fn new(
        cfg: SimConfig,
        policies: impl IntoIterator<Item = (AgentId, P)>,
        rng: &mut impl Rng,
    ) -> Self {
        let first = Pipe::new(cfg.first_pipe_x, &cfg, rng);
        Self::with_pipes(cfg, policies, vec![first])
    }

    pub fn with_pipes(
        cfg: SimConfig,
        policies: impl IntoIterator<Item = (AgentId, P)>,
        pipes: Vec<Pipe>,
    ) -> Self {
        let (x, y) = cfg.bird_start;
        let agents = policies
            .into_iter()
            .map(|(id, policy)| Agent {
                id,
                bird: Bird::new(x, y),
                policy,
            })
            .collect();
        Self {
            cfg,
            sprites: Sprites::new(),
            agents,
            pipes,
            ground: Ground::new(),
            score: 0,
            ticks: 0,
            last_examined: None,
        }
    }

    pub fn agents(&self) -> &[Agent<P>] {
        &self.agents
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn ground(&self) -> &Ground {
        &self.ground
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn scene(&self, generation: u32) -> Scene<'_, P> {
        Scene {
            agents: &self.agents,
            pipes: &self.pipes,
            ground: &self.ground,
            score: self.score,
            generation,
        }
    }

    /// Advances the world by one tick. Fitness changes are written straight
    /// into `genomes`, indexed by each agent's [`AgentId`].
    pub fn step<G: Genome>(
        &mut self,
        genomes: &mut [(GenomeId, G)],
        rng: &mut impl Rng,
    ) -> StepReport {
        let mut report = StepReport::default();
        self.ticks += 1;
        self.last_examined = None;

        // Think and move
        let target = self
            .agents
            .first()
            .map(|lead| sensor_index(&self.pipes, lead.bird.x))
            .and_then(|i| self.pipes.get(i))
            .map_or((0.0, FLOOR as f64), |p| (p.height as f64, p.bottom as f64));
        for agent in &mut self.agents {
            genomes[agent.id.0].1.add_fitness(self.cfg.survive_reward);
            agent.bird.step();
            let y = agent.bird.y;
            let out = agent
                .policy
                .activate([y, (y - target.0).abs(), (y - target.1).abs()]);
            if out > self.cfg.jump_threshold {
                agent.bird.jump();
            }
            self.last_examined = Some(agent.bird.x);
        }

        // Scroll, collide, count
        let mut passed = false;
        for pipe in &mut self.pipes {
            pipe.advance();
            self.agents.retain(|agent| {
                self.last_examined = Some(agent.bird.x);
                if !pipe.collides(&agent.bird, &self.sprites) {
                    return true;
                }
                trace!(agent = agent.id.0, x = pipe.x, "crashed into a pipe");
                genomes[agent.id.0].1.add_fitness(-self.cfg.crash_penalty);
                report.crashed.push(agent.id);
                false
            });

            let judge = match self.cfg.pass_rule {
                PassRule::LastExamined => self.last_examined,
                PassRule::AnyLive => self.agents.iter().map(|a| a.bird.x).max(),
            };
            if let Some(x) = judge {
                passed |= pipe.mark_passed(x);
            }
        }

        if passed {
            self.score += 1;
            for agent in &self.agents {
                genomes[agent.id.0].1.add_fitness(self.cfg.pass_reward);
            }
            self.pipes.push(Pipe::new(self.cfg.spawn_x, &self.cfg, rng));
            report.scored = true;
        }
        self.pipes.retain(|p| !p.off_screen());

        // Ground and ceiling
        self.agents.retain(|agent| {
            if !agent.bird.out_of_bounds() {
                return true;
            }
            trace!(agent = agent.id.0, y = agent.bird.y, "left the playfield");
            report.out_of_bounds.push(agent.id);
            false
        });

        // Survivors flap after the collision pass, so a tick always collides
        // with the frame shown at the end of the previous one.
        for agent in &mut self.agents {
            agent.bird.animate();
        }
        self.ground.advance();
        report
    }
}

/// Flies one episode with a bird for every genome. Fitness is reset to zero
/// first and then accumulated in place.
pub fn eval_genomes<G: Genome>(
    genomes: &mut [(GenomeId, G)],
    generation: u32,
    cfg: &SimConfig,
    rng: &mut impl Rng,
    presenter: &mut impl Presenter,
) -> io::Result<EpisodeSummary> {
    for (_, genome) in genomes.iter_mut() {
        genome.set_fitness(0.0);
    }
    let policies: Vec<_> = genomes
        .iter()
        .enumerate()
        .map(|(i, (_, genome))| (AgentId(i), genome.policy()))
        .collect();
    let mut episode = Episode::new(cfg.clone(), policies, rng);

    let ended = loop {
        episode.step(genomes, rng);
        if presenter.present(&episode.scene(generation))? == Control::Quit {
            break Ended::Quit;
        }
        if episode.is_empty() {
            break Ended::Extinct;
        }
        if cfg.max_ticks.is_some_and(|max| episode.ticks() >= max) {
            break Ended::TickLimit;
        }
    };

    let summary = EpisodeSummary {
        generation,
        score: episode.score(),
        ticks: episode.ticks(),
        ended,
    };
    debug!(
        generation,
        score = summary.score,
        ticks = summary.ticks,
        ended = ?summary.ended,
        "episode finished"
    );
    Ok(summary)
}
