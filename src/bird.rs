//! Vertical motion of a single bird.

use crate::config::{
    ANIMATION_TIME, BIRD_HEIGHT, FLOOR, GRAVITY, JUMP_VEL, MAX_ROTATION, MIN_ROTATION,
    RISE_BOOST, ROT_VEL, TERMINAL_DISPLACEMENT,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Bird {
    pub x: i32,
    pub y: f64,
    pub vel: f64,
    /// Ticks since the last jump.
    pub tick_count: u32,
    /// `y` at the moment of the last jump.
    pub height: f64,
    /// Degrees, positive is nose up. Cosmetic.
    pub tilt: f64,
    anim: u32,
    frame: usize,
}

impl Bird {
    pub fn new(x: i32, y: f64) -> Self {
        Self {
            x,
            y,
            vel: 0.0,
            tick_count: 0,
            height: y,
            tilt: 0.0,
            anim: 0,
            frame: 0,
        }
    }

    pub fn jump(&mut self) {
        self.vel = JUMP_VEL;
        self.tick_count = 0;
        self.height = self.y;
    }

    /// Advances one tick and returns the displacement applied to `y`.
    pub fn step(&mut self) -> f64 {
        self.tick_count += 1;
        let d = displacement(self.vel, self.tick_count);
        self.y += d;

        if d < 0.0 || self.y < self.height + 50.0 {
            if self.tilt < MAX_ROTATION {
                self.tilt = MAX_ROTATION;
            }
        } else if self.tilt > MIN_ROTATION {
            self.tilt = (self.tilt - ROT_VEL).max(MIN_ROTATION);
        }
        d
    }

    /// Flaps the wing: frames 0, 1, 2, 1 for `ANIMATION_TIME` ticks each. A
    /// nose-diving bird holds its wing level.
    pub fn animate(&mut self) {
        self.anim += 1;
        let t = ANIMATION_TIME;
        self.frame = match self.anim {
            n if n <= t => 0,
            n if n <= t * 2 => 1,
            n if n <= t * 3 => 2,
            n if n <= t * 4 => 1,
            _ => {
                self.anim = 0;
                0
            }
        };
        if self.tilt <= -80.0 {
            self.frame = 1;
            self.anim = t * 2;
        }
    }

    /// Index into the bird's animation frames.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Ground or ceiling.
    pub fn out_of_bounds(&self) -> bool {
        self.y + BIRD_HEIGHT as f64 >= FLOOR as f64 || self.y < 0.0
    }

    /// Row of the sprite's top edge, rounding half to even.
    pub fn row(&self) -> i32 {
        self.y.round_ties_even() as i32
    }
}

/// Fall distance `t` ticks after a jump with initial velocity `vel`.
pub fn displacement(vel: f64, t: u32) -> f64 {
    let t = t as f64;
    let mut d = vel * t + 0.5 * GRAVITY * t * t;
    if d >= TERMINAL_DISPLACEMENT {
        d = TERMINAL_DISPLACEMENT;
    }
    if d < 0.0 {
        d -= RISE_BOOST;
    }
    d
}
