//! Opaque-pixel silhouettes stored as one bitset per row.

/// Widest silhouette a [`Mask`] can hold; one `u128` per row.
pub const MAX_WIDTH: usize = 128;

/// Bit `x` of `rows[y]` is set when pixel `(x, y)` is opaque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    w: usize,
    h: usize,
    rows: Vec<u128>,
}

impl Mask {
    pub fn new(w: usize, h: usize) -> Self {
        assert!(w <= MAX_WIDTH, "mask width {w} exceeds {MAX_WIDTH}");
        Self {
            w,
            h,
            rows: vec![0; h],
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn set(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.rows[y as usize] |= 1u128 << x;
        }
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        x >= 0
            && y >= 0
            && (x as usize) < self.w
            && (y as usize) < self.h
            && (self.rows[y as usize] >> x) & 1 == 1
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy);
            }
        }
    }

    /// Number of opaque pixels.
    pub fn count(&self) -> u32 {
        self.rows.iter().map(|r| r.count_ones()).sum()
    }

    pub fn flipped_vertically(&self) -> Self {
        let mut rows = self.rows.clone();
        rows.reverse();
        Self {
            w: self.w,
            h: self.h,
            rows,
        }
    }

    /// First opaque pixel shared with `other` placed at `offset` relative to
    /// this mask's origin, in this mask's coordinates. Rows are scanned top
    /// to bottom, columns left to right.
    pub fn overlap(&self, other: &Mask, offset: (i32, i32)) -> Option<(i32, i32)> {
        let (dx, dy) = offset;
        if dx >= self.w as i32 || dx <= -(other.w as i32) {
            return None;
        }
        let y0 = dy.max(0);
        let y1 = (dy + other.h as i32).min(self.h as i32);
        for y in y0..y1 {
            let theirs = other.rows[(y - dy) as usize];
            let shifted = if dx >= 0 {
                theirs << dx
            } else {
                theirs >> -dx
            };
            let hit = self.rows[y as usize] & shifted;
            if hit != 0 {
                return Some((hit.trailing_zeros() as i32, y));
            }
        }
        None
    }

    pub fn collides(&self, other: &Mask, offset: (i32, i32)) -> bool {
        self.overlap(other, offset).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(w: usize, h: usize) -> Mask {
        let mut m = Mask::new(w, h);
        m.fill_rect(0, 0, w as i32, h as i32);
        m
    }

    #[test]
    fn solid_blocks_overlap_at_the_offset_corner() {
        let a = block(10, 10);
        let b = block(4, 4);
        assert_eq!(a.overlap(&b, (3, 5)), Some((3, 5)));
        assert_eq!(a.overlap(&b, (-2, -2)), Some((0, 0)));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = block(10, 10);
        let b = block(4, 4);
        assert!(!a.collides(&b, (10, 0)));
        assert!(!a.collides(&b, (0, 10)));
        assert!(!a.collides(&b, (-4, 0)));
        assert!(!a.collides(&b, (0, -4)));
        assert!(a.collides(&b, (9, 9)));
        assert!(a.collides(&b, (-3, -3)));
    }

    #[test]
    fn transparent_pixels_never_collide() {
        // A ring: bounding boxes intersect, silhouettes do not.
        let mut ring = Mask::new(9, 9);
        ring.fill_rect(0, 0, 9, 1);
        ring.fill_rect(0, 8, 9, 1);
        ring.fill_rect(0, 0, 1, 9);
        ring.fill_rect(8, 0, 1, 9);
        let dot = block(3, 3);
        assert!(!ring.collides(&dot, (3, 3)));
        assert!(ring.collides(&dot, (6, 3)));
    }

    #[test]
    fn wide_masks_shift_across_the_full_row() {
        let a = block(MAX_WIDTH, 2);
        let b = block(1, 1);
        assert_eq!(a.overlap(&b, (127, 1)), Some((127, 1)));
        assert!(!a.collides(&b, (128, 1)));
    }

    #[test]
    fn vertical_flip_mirrors_rows() {
        let mut m = Mask::new(3, 4);
        m.set(1, 0);
        let f = m.flipped_vertically();
        assert!(f.get(1, 3));
        assert!(!f.get(1, 0));
        assert_eq!(f.count(), 1);
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let mut m = Mask::new(2, 2);
        m.set(-1, 0);
        m.set(2, 0);
        m.set(0, 5);
        assert_eq!(m.count(), 0);
    }
}
