//! Built-in silhouettes for the bird's animation frames and the pipe
//! segments, drawn at the sizes of the classic 2x-scaled sprites.

use crate::config::{BIRD_HEIGHT, BIRD_WIDTH, PIPE_HEIGHT, PIPE_WIDTH};
use crate::mask::Mask;

pub const BIRD_FRAMES: usize = 3;

const CAP_H: i32 = 48;
const CAP_INSET: i32 = 6;

#[derive(Clone, Debug)]
pub struct Sprites {
    pub bird: [Mask; BIRD_FRAMES],
    /// Hangs from the ceiling, cap at the bottom edge.
    pub pipe_top: Mask,
    /// Rises from the ground, cap at the top edge.
    pub pipe_bottom: Mask,
}

impl Sprites {
    pub fn new() -> Self {
        let pipe_bottom = pipe_mask();
        Self {
            bird: [bird_mask(0), bird_mask(1), bird_mask(2)],
            pipe_top: pipe_bottom.flipped_vertically(),
            pipe_bottom,
        }
    }
}

impl Default for Sprites {
    fn default() -> Self {
        Self::new()
    }
}

/// Wing up, level and down.
fn bird_mask(frame: usize) -> Mask {
    let w = BIRD_WIDTH as i32;
    let h = BIRD_HEIGHT as i32;
    let mut m = Mask::new(BIRD_WIDTH, BIRD_HEIGHT);

    // Body: an ellipse centred a little left of the sprite's middle.
    let (cx, cy) = (28.0, h as f64 / 2.0);
    let (rx, ry) = (24.0, 18.0);
    for y in 0..h {
        for x in 0..w {
            let nx = (x as f64 + 0.5 - cx) / rx;
            let ny = (y as f64 + 0.5 - cy) / ry;
            if nx * nx + ny * ny <= 1.0 {
                m.set(x, y);
            }
        }
    }

    // Beak
    m.fill_rect(48, 22, 18, 6);
    m.fill_rect(48, 28, 14, 6);

    // Tail
    m.fill_rect(0, 18, 8, 10);

    // Wing
    match frame {
        0 => m.fill_rect(6, 4, 22, 12),
        1 => m.fill_rect(2, 20, 24, 10),
        _ => m.fill_rect(6, 32, 22, 14),
    }
    m
}

fn pipe_mask() -> Mask {
    let mut m = Mask::new(PIPE_WIDTH, PIPE_HEIGHT);
    m.fill_rect(0, 0, PIPE_WIDTH as i32, CAP_H);
    m.fill_rect(
        CAP_INSET,
        CAP_H,
        PIPE_WIDTH as i32 - CAP_INSET * 2,
        PIPE_HEIGHT as i32 - CAP_H,
    );
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_differ_only_by_wing() {
        let s = Sprites::new();
        assert_ne!(s.bird[0], s.bird[1]);
        assert_ne!(s.bird[1], s.bird[2]);
        for f in &s.bird {
            assert_eq!((f.width(), f.height()), (BIRD_WIDTH, BIRD_HEIGHT));
            // Body centre is always solid.
            assert!(f.get(28, 24));
        }
    }

    #[test]
    fn bird_corners_are_transparent() {
        let s = Sprites::new();
        for f in &s.bird {
            assert!(!f.get(BIRD_WIDTH as i32 - 1, 0));
            assert!(!f.get(BIRD_WIDTH as i32 - 1, BIRD_HEIGHT as i32 - 1));
        }
    }

    #[test]
    fn pipe_caps_face_the_gap() {
        let s = Sprites::new();
        let last = PIPE_HEIGHT as i32 - 1;
        // Cap spans the full width, the body is inset.
        assert!(s.pipe_bottom.get(0, 0));
        assert!(!s.pipe_bottom.get(0, last));
        assert!(s.pipe_top.get(0, last));
        assert!(!s.pipe_top.get(0, 0));
        assert!(s.pipe_top.get(CAP_INSET, 0));
    }
}
