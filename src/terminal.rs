//! Live terminal playback: raw mode, alternate screen, input and pacing.

use std::cell::Cell;
use std::io::{self, Stdout, stdout};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute, terminal,
};

use crate::episode::{Control, Policy, Presenter, Scene};
use crate::render::{PixelBuf, Renderer};

/// ~30 fps
pub const FRAME: Duration = Duration::from_millis(33);

/// Owns the terminal for as long as it lives and restores it on drop.
pub struct TerminalPresenter {
    out: Stdout,
    buf: PixelBuf,
    renderer: Renderer,
    frame: Duration,
    last: Option<Instant>,
    jump: Rc<Cell<bool>>,
}

impl TerminalPresenter {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
        )?;
        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            buf: PixelBuf::new(cols as usize, rows as usize * 2),
            renderer: Renderer::new(),
            frame: FRAME,
            last: None,
            jump: Rc::new(Cell::new(false)),
        })
    }

    /// A policy that jumps whenever the player pressed space, up or enter
    /// since the previous tick.
    pub fn keyboard(&self) -> KeyboardPolicy {
        KeyboardPolicy {
            jump: Rc::clone(&self.jump),
        }
    }

    fn poll_input(&mut self) -> io::Result<Control> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(Control::Quit),
                    KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => self.jump.set(true),
                    _ => {}
                },
                Event::Resize(c, r) => self.buf.resize(c as usize, r as usize * 2),
                _ => {}
            }
        }
        Ok(Control::Continue)
    }

    fn pace(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.frame {
                std::thread::sleep(self.frame - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

impl Presenter for TerminalPresenter {
    fn present<P>(&mut self, scene: &Scene<'_, P>) -> io::Result<Control> {
        if self.poll_input()? == Control::Quit {
            return Ok(Control::Quit);
        }
        self.renderer.draw(&mut self.buf, scene);
        self.buf.render(&mut self.out)?;
        self.pace();
        Ok(Control::Continue)
    }
}

impl Drop for TerminalPresenter {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Sensors are ignored; the player decides.
#[derive(Clone, Debug)]
pub struct KeyboardPolicy {
    jump: Rc<Cell<bool>>,
}

impl Policy for KeyboardPolicy {
    fn activate(&self, _sensors: [f64; 3]) -> f64 {
        if self.jump.replace(false) { 1.0 } else { 0.0 }
    }
}
