//! Half-block pixel rendering of a [`Scene`] to the terminal.

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use std::io::{self, Write};

use crate::bird::Bird;
use crate::config::{BASE_WIDTH, FLOOR, PIPE_HEIGHT, PIPE_WIDTH, WIN_HEIGHT, WIN_WIDTH};
use crate::episode::Scene;
use crate::mask::Mask;
use crate::pipe::Pipe;
use crate::sprite::Sprites;

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }
}

const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const GRASS: Rgb = Rgb(84, 168, 55);
const GRASS_LIGHT: Rgb = Rgb(110, 200, 70);
const DIRT: Rgb = Rgb(210, 185, 110);
const DIRT_DARK: Rgb = Rgb(185, 160, 90);
const PIPE_L: Rgb = Rgb(74, 122, 26);
const PIPE_M: Rgb = Rgb(100, 170, 40);
const PIPE_R: Rgb = Rgb(115, 191, 46);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const CAP_DARK: Rgb = Rgb(60, 100, 20);
const BIRD_Y: Rgb = Rgb(245, 200, 66);
const BIRD_WING: Rgb = Rgb(215, 165, 35);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_BEAK: Rgb = Rgb(225, 75, 35);
const HILL_FAR: Rgb = Rgb(120, 195, 75);
const HILL_NEAR: Rgb = Rgb(95, 175, 55);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);
const LABEL: Rgb = Rgb(255, 225, 100);

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill(&mut self, c: Rgb) {
        self.px.iter_mut().for_each(|p| *p = c);
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(out, style::SetBackgroundColor(ccolor(top)))?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(out, style::SetForegroundColor(ccolor(top)))?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(out, style::SetBackgroundColor(ccolor(bot)))?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn ccolor(c: Rgb) -> CColor {
    CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── 3x5 bitmap digits ──────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

fn draw_digit(buf: &mut PixelBuf, x: i32, y: i32, d: u8, fg: Rgb) {
    let glyph = &DIGITS[d as usize];
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32;
                let py = y + row as i32;
                buf.set(px + 1, py + 1, SHADOW);
                buf.set(px, py, fg);
            }
        }
    }
}

/// Left-aligned at `x`, 3px per digit plus 1px spacing.
fn draw_number(buf: &mut PixelBuf, x: i32, y: i32, n: u32, fg: Rgb) {
    for (i, ch) in n.to_string().bytes().enumerate() {
        draw_digit(buf, x + i as i32 * 4, y, ch - b'0', fg);
    }
}

fn number_width(n: u32) -> i32 {
    n.to_string().len() as i32 * 4 - 1
}

// ── World to screen ─────────────────────────────────────────────────────────

/// Uniform scale from the 600x800 world into the buffer, centred
/// horizontally.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Viewport {
    scale: f64,
    ox: f64,
}

impl Viewport {
    fn fit(pw: usize, ph: usize) -> Self {
        let scale = (pw as f64 / WIN_WIDTH as f64).min(ph as f64 / WIN_HEIGHT as f64);
        Self {
            scale,
            ox: (pw as f64 - WIN_WIDTH as f64 * scale) / 2.0,
        }
    }

    fn sx(&self, wx: f64) -> i32 {
        (wx * self.scale + self.ox).floor() as i32
    }

    fn sy(&self, wy: f64) -> i32 {
        (wy * self.scale).floor() as i32
    }

    /// World coordinates of the centre of buffer pixel `(x, y)`.
    fn world(&self, x: i32, y: i32) -> (f64, f64) {
        (
            (x as f64 + 0.5 - self.ox) / self.scale,
            (y as f64 + 0.5) / self.scale,
        )
    }
}

// ── Scene ───────────────────────────────────────────────────────────────────

pub struct Renderer {
    sprites: Sprites,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            sprites: Sprites::new(),
        }
    }

    pub fn draw<P>(&self, buf: &mut PixelBuf, scene: &Scene<'_, P>) {
        let view = Viewport::fit(buf.width(), buf.height());
        buf.fill(SHADOW);
        let scroll = -scene.ground.x1 as f64;
        draw_sky(buf, view, scroll);
        for pipe in scene.pipes {
            self.draw_pipe(buf, view, pipe);
        }
        draw_ground(buf, view, scroll);
        for bird in scene.birds() {
            self.draw_bird(buf, view, bird);
        }
        draw_hud(buf, view, scene);
    }

    fn draw_pipe(&self, buf: &mut PixelBuf, view: Viewport, pipe: &Pipe) {
        let x = pipe.x as f64;
        blit(buf, view, &self.sprites.pipe_top, x, pipe.top as f64, |mx, my| {
            pipe_color(mx, PIPE_HEIGHT as i32 - 1 - my)
        });
        blit(buf, view, &self.sprites.pipe_bottom, x, pipe.bottom as f64, pipe_color);
    }

    fn draw_bird(&self, buf: &mut PixelBuf, view: Viewport, bird: &Bird) {
        let frame = bird.frame();
        let mask = &self.sprites.bird[frame];
        blit_rotated(buf, view, mask, bird.x as f64, bird.y, bird.tilt, |mx, my| {
            bird_color(mx, my, frame)
        });
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Paints every buffer pixel whose centre lands on an opaque pixel of `mask`
/// placed at world `(wx, wy)`. Nothing is drawn over the ground strip.
fn blit(
    buf: &mut PixelBuf,
    view: Viewport,
    mask: &Mask,
    wx: f64,
    wy: f64,
    color: impl Fn(i32, i32) -> Rgb,
) {
    let x0 = view.sx(wx).max(0);
    let x1 = (view.sx(wx + mask.width() as f64) + 1).min(buf.width() as i32);
    let y0 = view.sy(wy).max(0);
    let y1 = (view.sy(wy + mask.height() as f64) + 1)
        .min(view.sy(FLOOR as f64))
        .min(buf.height() as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            let (px, py) = view.world(x, y);
            let mx = (px - wx).floor() as i32;
            let my = (py - wy).floor() as i32;
            if mask.get(mx, my) {
                buf.set(x, y, color(mx, my));
            }
        }
    }
}

/// [`blit`] with the mask turned `degrees` counter-clockwise about its
/// centre, so a positive tilt points the beak up.
fn blit_rotated(
    buf: &mut PixelBuf,
    view: Viewport,
    mask: &Mask,
    wx: f64,
    wy: f64,
    degrees: f64,
    color: impl Fn(i32, i32) -> Rgb,
) {
    let (hw, hh) = (mask.width() as f64 / 2.0, mask.height() as f64 / 2.0);
    let (cx, cy) = (wx + hw, wy + hh);
    let r = hw.hypot(hh);
    let (sin, cos) = degrees.to_radians().sin_cos();

    let x0 = view.sx(cx - r).max(0);
    let x1 = (view.sx(cx + r) + 1).min(buf.width() as i32);
    let y0 = view.sy(cy - r).max(0);
    let y1 = (view.sy(cy + r) + 1)
        .min(view.sy(FLOOR as f64))
        .min(buf.height() as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            let (px, py) = view.world(x, y);
            let (dx, dy) = (px - cx, py - cy);
            let mx = (dx * cos - dy * sin + hw).floor() as i32;
            let my = (dx * sin + dy * cos + hh).floor() as i32;
            if mask.get(mx, my) {
                buf.set(x, y, color(mx, my));
            }
        }
    }
}

/// `my` counts from the cap end of the segment.
fn pipe_color(mx: i32, my: i32) -> Rgb {
    if my < 4 || (44..48).contains(&my) {
        CAP_DARK
    } else {
        pipe_shade(mx, PIPE_WIDTH as i32)
    }
}

fn bird_color(mx: i32, my: i32, frame: usize) -> Rgb {
    let wing = match frame {
        0 => (6..28).contains(&mx) && (4..16).contains(&my),
        1 => (2..26).contains(&mx) && (20..30).contains(&my),
        _ => (6..28).contains(&mx) && (32..46).contains(&my),
    };
    if mx >= 48 && (22..34).contains(&my) {
        BIRD_BEAK
    } else if (36..44).contains(&mx) && (10..18).contains(&my) {
        if mx >= 40 && my >= 13 { SHADOW } else { BIRD_EYE }
    } else if wing || mx < 8 {
        BIRD_WING
    } else {
        BIRD_Y
    }
}

fn draw_sky(buf: &mut PixelBuf, view: Viewport, scroll: f64) {
    let x0 = view.sx(0.0).max(0);
    let x1 = view.sx(WIN_WIDTH as f64).min(buf.width() as i32);
    let base = view.sy(FLOOR as f64);
    for y in 0..base {
        let t = (y as u32 * 256 / base.max(1) as u32) as u16;
        let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
        for x in x0..x1 {
            buf.set(x, y, c);
        }
    }
    // Far hills, then near hills, scrolling slower than the ground.
    let s = view.scale * 8.0;
    for (speed, freq, amp, lift, color) in [
        (0.2, 0.04, (6.0, 3.0, 1.7), 4.0, HILL_FAR),
        (0.4, 0.06, (4.0, 2.0, 2.3), 2.0, HILL_NEAR),
    ] {
        for x in x0..x1 {
            let fx = ((x - x0) as f64 + scroll * view.scale * speed) * freq;
            let h = (fx.sin() * amp.0 + (fx * amp.2).sin() * amp.1) * s;
            let top = base - h as i32 - (lift * s) as i32;
            for y in top..base {
                buf.set(x, y, color);
            }
        }
    }
}

fn draw_ground(buf: &mut PixelBuf, view: Viewport, scroll: f64) {
    let x0 = view.sx(0.0).max(0);
    let x1 = view.sx(WIN_WIDTH as f64).min(buf.width() as i32);
    let gy = view.sy(FLOOR as f64);
    let bottom = view.sy(WIN_HEIGHT as f64).min(buf.height() as i32);
    let offset = (scroll.rem_euclid(BASE_WIDTH as f64) * view.scale) as i32;
    for x in x0..x1 {
        let alt = ((x + offset) / 3) % 2 == 0;
        buf.set(x, gy, if alt { GRASS } else { GRASS_LIGHT });
        buf.set(x, gy + 1, GRASS);
    }
    for y in (gy + 2)..bottom {
        for x in x0..x1 {
            let stripe = (x + offset + (y - gy) * 2) % 12 < 6;
            buf.set(x, y, if stripe { DIRT } else { DIRT_DARK });
        }
    }
}

/// Generation and alive count on the left, score centred.
fn draw_hud<P>(buf: &mut PixelBuf, view: Viewport, scene: &Scene<'_, P>) {
    let left = view.sx(0.0).max(0) + 2;
    let cx = view.sx(WIN_WIDTH as f64 / 2.0);
    draw_number(buf, cx - number_width(scene.score) / 2, 2, scene.score, WHITE);
    if scene.generation > 0 {
        draw_number(buf, left, 2, scene.generation, LABEL);
    }
    draw_number(buf, left, 9, scene.alive() as u32, BIRD_Y);
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::{Agent, AgentId};
    use crate::ground::Ground;

    fn agents(birds: impl IntoIterator<Item = Bird>) -> Vec<Agent<()>> {
        birds
            .into_iter()
            .enumerate()
            .map(|(i, bird)| Agent {
                id: AgentId(i),
                bird,
                policy: (),
            })
            .collect()
    }

    fn scene<'a>(
        agents: &'a [Agent<()>],
        pipes: &'a [Pipe],
        ground: &'a Ground,
    ) -> Scene<'a, ()> {
        Scene {
            agents,
            pipes,
            ground,
            score: 12,
            generation: 3,
        }
    }

    #[test]
    fn viewport_keeps_the_world_inside_the_buffer() {
        let v = Viewport::fit(120, 80);
        assert_eq!(v.scale, 0.1);
        assert_eq!(v.sx(0.0), 30);
        assert_eq!(v.sx(WIN_WIDTH as f64), 90);
        assert_eq!(v.sy(WIN_HEIGHT as f64), 80);
    }

    #[test]
    fn birds_and_pipes_show_up_where_they_are() {
        let ground = Ground::new();
        let birds = agents([Bird::new(230, 350.0)]);
        let pipes = [Pipe::with_height(400, 200, 200)];
        let mut buf = PixelBuf::new(120, 80);
        Renderer::new().draw(&mut buf, &scene(&birds, &pipes, &ground));

        let v = Viewport::fit(120, 80);
        // Body centre of the bird.
        let bx = v.sx(230.0 + 28.0) as usize;
        let by = v.sy(350.0 + 24.0) as usize;
        assert_eq!(buf.get(bx, by), BIRD_Y);
        // Middle of the bottom pipe's body.
        let px = v.sx(400.0 + 52.0) as usize;
        let py = v.sy(550.0) as usize;
        assert_ne!(buf.get(px, py), buf.get(px, v.sy(300.0) as usize));
        // Dirt below the floor.
        assert!(matches!(buf.get(60, 78), DIRT | DIRT_DARK));
    }

    #[test]
    fn diving_birds_point_their_beak_at_the_ground() {
        let ground = Ground::new();
        let mut level = Bird::new(230, 350.0);
        level.tilt = 0.0;
        let mut diving = level.clone();
        diving.tilt = -90.0;
        // One buffer pixel per world pixel; the sprite centre is (264, 374).
        let mut buf = PixelBuf::new(600, 800);
        let renderer = Renderer::new();

        renderer.draw(&mut buf, &scene(&agents([level]), &[], &ground));
        assert_eq!(buf.get(290, 374), BIRD_BEAK);
        assert_ne!(buf.get(264, 400), BIRD_BEAK);

        renderer.draw(&mut buf, &scene(&agents([diving]), &[], &ground));
        assert_eq!(buf.get(264, 400), BIRD_BEAK);
        assert_ne!(buf.get(290, 374), BIRD_BEAK);
    }

    #[test]
    fn render_emits_one_line_per_row_pair() {
        let mut buf = PixelBuf::new(4, 4);
        buf.set(0, 0, WHITE);
        let mut out = Vec::new();
        buf.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\r\n").count(), 1);
        assert!(text.contains('\u{2580}'));
    }
}
