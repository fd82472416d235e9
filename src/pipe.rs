//! Scrolling pipe obstacles.

use rand::Rng;

use crate::bird::Bird;
use crate::config::{PIPE_HEIGHT, PIPE_WIDTH, SCROLL_VEL, SimConfig};
use crate::sprite::Sprites;

#[derive(Clone, Debug, PartialEq)]
pub struct Pipe {
    pub x: i32,
    /// Row of the gap's upper edge.
    pub height: i32,
    /// Row of the top segment's upper edge; usually negative.
    pub top: i32,
    /// Row of the bottom segment's upper edge.
    pub bottom: i32,
    pub passed: bool,
}

impl Pipe {
    pub fn new(x: i32, cfg: &SimConfig, rng: &mut impl Rng) -> Self {
        let (lo, hi) = cfg.gap_range;
        Self::with_height(x, rng.gen_range(lo..hi), cfg.pipe_gap)
    }

    pub fn with_height(x: i32, height: i32, gap: i32) -> Self {
        Self {
            x,
            height,
            top: height - PIPE_HEIGHT as i32,
            bottom: height + gap,
            passed: false,
        }
    }

    pub fn advance(&mut self) {
        self.x -= SCROLL_VEL;
    }

    pub fn right(&self) -> i32 {
        self.x + PIPE_WIDTH as i32
    }

    pub fn off_screen(&self) -> bool {
        self.right() < 0
    }

    /// Pixel-accurate hit test against either segment.
    pub fn collides(&self, bird: &Bird, sprites: &Sprites) -> bool {
        let mask = &sprites.bird[bird.frame()];
        let dx = self.x - bird.x;
        let row = bird.row();
        mask.collides(&sprites.pipe_bottom, (dx, self.bottom - row))
            || mask.collides(&sprites.pipe_top, (dx, self.top - row))
    }

    /// Flips `passed` the first time a bird at `bird_x` is beyond the pipe's
    /// left edge. Returns whether this call flipped it.
    pub fn mark_passed(&mut self, bird_x: i32) -> bool {
        if !self.passed && self.x < bird_x {
            self.passed = true;
            return true;
        }
        false
    }
}

/// The pipe a bird led by `lead_x` should steer by: the first one, unless
/// the lead bird is already clear of it and another is queued.
pub fn sensor_index(pipes: &[Pipe], lead_x: i32) -> usize {
    if pipes.len() > 1 && lead_x > pipes[0].right() {
        1
    } else {
        0
    }
}
