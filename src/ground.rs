//! Two ground tiles leapfrogging each other.

use crate::config::{BASE_WIDTH, SCROLL_VEL};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ground {
    pub x1: i32,
    pub x2: i32,
}

impl Ground {
    pub fn new() -> Self {
        Self {
            x1: 0,
            x2: BASE_WIDTH,
        }
    }

    pub fn advance(&mut self) {
        self.x1 -= SCROLL_VEL;
        self.x2 -= SCROLL_VEL;
        if self.x1 + BASE_WIDTH < 0 {
            self.x1 = self.x2 + BASE_WIDTH;
        }
        if self.x2 + BASE_WIDTH < 0 {
            self.x2 = self.x1 + BASE_WIDTH;
        }
    }
}

impl Default for Ground {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_stay_adjacent_while_wrapping() {
        let mut g = Ground::new();
        for _ in 0..1000 {
            g.advance();
            assert_eq!((g.x1 - g.x2).abs(), BASE_WIDTH);
            assert!(g.x1.min(g.x2) + BASE_WIDTH >= 0);
        }
    }
}
