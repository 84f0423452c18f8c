//! Terminal front end: drives a [`GameLoopEngine`] from the keyboard and draws
//! its frames with crossterm.

use std::{thread::sleep, time::Duration};

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent};
use crossterm::style::Color;
use log::{debug, warn};

use crate::config::{Config, GridTier, Rgb, DEFAULT_SNAKE_COLOR};
use crate::engine::{GameLoopEngine, Input, Phase};
use crate::error::AudioError;
use crate::host::{AudioSink, CellClass, Cue, Frame, PreferenceStore, RenderSink, RoundSummary};
use crate::prefs::FilePreferences;
use crate::scheduler::{Clock, SystemClock};
use crate::snake::Direction::*;
use crate::term::{is_ctrl_c, TermManager};
use crate::{Coords, TermInt};

const POLL_INTERVAL_MS: u64 = 5;

/// Rough pixel width of one terminal column, for picking a grid tier.
const PIXELS_PER_COLUMN: u32 = 8;

const SNAKE_PALETTE: &[&str] = &[DEFAULT_SNAKE_COLOR, "#ff5f87", "#5fafff", "#ffd75f", "#d787ff", "#ffffff"];

const SNAKE_BODY_GLYPH: [char; 2] = ['█', '█'];
const FOOD_GLYPH: [char; 2] = ['O', ' '];
const SPECIAL_FOOD_GLYPH: [char; 2] = ['$', ' '];
const DEAD_SNAKE_GLYPH: [char; 2] = ['X', 'X'];
const EMPTY_GLYPH: [char; 2] = [' ', ' '];

const FOOD_COLOR: Color = Color::Red;
const SPECIAL_FOOD_COLOR: Color = Color::Rgb { r: 255, g: 215, b: 0 };

/// Everything the engine talks to, backed by the terminal and a preferences file.
pub struct TermHost {
    term: TermManager,
    prefs: FilePreferences,
    sound: bool,
    background_playing: bool,
    drawn: Vec<(Coords, CellClass)>,
}

impl RenderSink for TermHost {
    fn render(&mut self, frame: &Frame) {
        for (pos, _) in self.drawn.drain(..) {
            self.term.print_cell(pos, EMPTY_GLYPH, None);
        }

        for cell in &frame.cells {
            let (glyph, color) = match cell.class {
                CellClass::Food => (FOOD_GLYPH, Some(FOOD_COLOR)),
                CellClass::SpecialFood => (SPECIAL_FOOD_GLYPH, Some(SPECIAL_FOOD_COLOR)),
                CellClass::SnakeHead => ([frame.head_char, SNAKE_BODY_GLYPH[1]], cell.color.map(to_color)),
                CellClass::SnakeBody => (SNAKE_BODY_GLYPH, cell.color.map(to_color)),
            };
            self.term.print_cell(cell.pos, glyph, color);
            self.drawn.push((cell.pos, cell.class));
        }

        let mut status = format!("Score: {}   High score: {}", frame.score, frame.high_score);
        if let Some(left) = frame.time_left {
            status.push_str(&format!("   Time: {}s", left));
        }
        self.term.print_status(&status);

        if let Err(err) = self.term.flush() {
            warn!("could not flush frame: {}", err);
        }
    }

    fn round_over(&mut self, summary: &RoundSummary) {
        if !summary.timed_out {
            let snake = self.drawn.iter()
                .filter(|(_, class)| matches!(class, CellClass::SnakeHead | CellClass::SnakeBody))
                .map(|(pos, _)| *pos)
                .collect::<Vec<_>>();
            for pos in snake {
                self.term.print_cell(pos, DEAD_SNAKE_GLYPH, None);
            }
        }

        let title = if summary.timed_out {"Time's up!"} else {"Game over!"};
        let record = if summary.new_high_score {
            "New high score!".to_string()
        } else {
            format!("High score: {}", summary.high_score)
        };

        let res = self.term.show_message(&[
            title,
            &*format!("Score: {}", summary.score),
            &*record,
            "",
            "Press any key to play again,",
            "or CTRL+C to quit."
        ]);
        if let Err(err) = res {
            warn!("could not show game over screen: {}", err);
        }
    }
}

impl AudioSink for TermHost {
    fn play(&mut self, cue: Cue) -> Result<(), AudioError> {
        if !self.sound {
            return Err(AudioError::Rejected("sound disabled"));
        }

        match cue {
            Cue::Background => {
                // No music in a terminal, only the state of the loop.
                if !self.background_playing {
                    debug!("background loop on");
                }
                self.background_playing = true;
                Ok(())
            }
            Cue::GameOver => self.term.bell().map_err(|_| AudioError::Rejected("terminal bell failed")),
        }
    }

    fn stop(&mut self, cue: Cue) {
        if cue == Cue::Background {
            self.background_playing = false;
        }
    }

    fn rewind(&mut self, _cue: Cue) {}
}

impl PreferenceStore for TermHost {
    fn get(&self, key: &str) -> Option<String> {
        self.prefs.get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.prefs.set(key, value)
    }
}

enum RoundEnd {
    Over,
    Reset,
    Quit,
}

enum Wait {
    Key(KeyEvent),
    Resized,
}

pub struct SnakeGame {
    engine: GameLoopEngine<TermHost>,
    clock: SystemClock,
    fixed_viewport: bool,
}

impl SnakeGame {
    pub fn new(mut config: Config) -> Result<Self> {
        let term = TermManager::new()?;

        let fixed_viewport = config.viewport_width.is_some();
        if !fixed_viewport {
            let (cols, _) = term.get_terminal_size();
            config.grid_tier = GridTier::from_viewport_width(viewport_width(cols));
        }

        let host = TermHost {
            term,
            prefs: FilePreferences::open(&config.prefs_path),
            sound: config.sound,
            background_playing: false,
            drawn: vec![],
        };

        Ok(SnakeGame { engine: GameLoopEngine::new(config, host), clock: SystemClock::new(), fixed_viewport })
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.term().setup()?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        self.term().restore()?;
        Ok(())
    }

    /// Plays rounds until the player quits.
    pub fn run(&mut self) -> Result<()> {
        loop {
            if !self.show_intro()? {
                return Ok(());
            }

            match self.play()? {
                RoundEnd::Quit => return Ok(()),
                RoundEnd::Reset => continue,
                RoundEnd::Over => {}
            }

            // Quit if the user CTRL+C's after the game
            if let Wait::Key(ev) = self.wait_key()? {
                if is_ctrl_c(&ev) {
                    return Ok(());
                }
            }

            self.engine.restart();
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn term(&mut self) -> &mut TermManager {
        &mut self.engine.host_mut().term
    }

    /// Returns false when the player quit from the intro screen.
    fn show_intro(&mut self) -> Result<bool> {
        loop {
            let grid = self.engine.grid_size();
            self.term().draw_board(grid)?;
            self.engine.host_mut().drawn.clear();

            let high_score = format!("High score: {}", self.engine.high_score());
            let color = format!("Snake color: {}", self.engine.config().snake_color);
            self.term().show_message(&[
                "Arrow keys or WASD to move",
                "Space or Esc to pause",
                "C to change the snake color",
                "CTRL+C to quit",
                "",
                &*high_score,
                &*color,
                "",
                "Press any key to begin"
            ])?;

            match self.wait_key()? {
                Wait::Key(ev) if is_ctrl_c(&ev) => return Ok(false),
                Wait::Key(KeyEvent { code: KeyCode::Char('c'), .. }) => {
                    let next = next_color(self.engine.config().snake_color);
                    self.engine.set_snake_color(next);
                }
                Wait::Key(_) => {
                    self.term().hide_message()?;
                    return Ok(true);
                }
                Wait::Resized => {}
            }
        }
    }

    fn play(&mut self) -> Result<RoundEnd> {
        self.engine.start(self.clock.now());

        loop {
            sleep(Duration::from_millis(POLL_INTERVAL_MS));

            for ev in self.term().read_events_queue()? {
                match ev {
                    Event::Key(key) if is_ctrl_c(&key) => return Ok(RoundEnd::Quit),
                    Event::Key(KeyEvent { code, .. }) => {
                        if let Some(input) = map_key(code) {
                            self.engine.handle_input(input, self.clock.now());
                            self.sync_pause_message()?;
                        }
                    }
                    Event::Resize(w, h) => {
                        if self.handle_resize(w, h)? {
                            return Ok(RoundEnd::Reset);
                        }
                        self.redraw()?;
                    }
                    _ => {}
                }
            }

            self.engine.advance(self.clock.now());

            if self.engine.phase() == Phase::GameOver {
                return Ok(RoundEnd::Over);
            }
        }
    }

    fn wait_key(&mut self) -> Result<Wait> {
        match self.term().read_event_blocking()? {
            Event::Key(ev) => Ok(Wait::Key(ev)),
            Event::Resize(w, h) => {
                self.handle_resize(w, h)?;
                Ok(Wait::Resized)
            }
            _ => Ok(Wait::Resized),
        }
    }

    /// Returns true when the new size moved the game to another grid tier,
    /// which resets the round.
    fn handle_resize(&mut self, width: TermInt, height: TermInt) -> Result<bool> {
        self.term().resize(width, height)?;
        self.engine.host_mut().drawn.clear();

        if self.fixed_viewport {
            return Ok(false);
        }
        Ok(self.engine.resize(viewport_width(width)))
    }

    fn redraw(&mut self) -> Result<()> {
        let grid = self.engine.grid_size();
        self.term().draw_board(grid)?;
        let frame = self.engine.frame();
        self.engine.host_mut().render(&frame);
        self.sync_pause_message()
    }

    fn sync_pause_message(&mut self) -> Result<()> {
        let paused = self.engine.phase() == Phase::Paused;
        let term = self.term();

        if paused && !term.has_message() {
            term.show_message(&["Paused", "Press Space or Esc to resume", "or Ctrl+C to quit"])?;
        } else if !paused && term.has_message() {
            term.hide_message()?;
        }
        Ok(())
    }
}

fn map_key(code: KeyCode) -> Option<Input> {
    match code {
        KeyCode::Char('w') | KeyCode::Up => Some(Input::Turn(Up)),
        KeyCode::Char('a') | KeyCode::Left => Some(Input::Turn(Left)),
        KeyCode::Char('s') | KeyCode::Down => Some(Input::Turn(Down)),
        KeyCode::Char('d') | KeyCode::Right => Some(Input::Turn(Right)),
        KeyCode::Char(' ') | KeyCode::Esc => Some(Input::TogglePause),
        _ => None,
    }
}

fn viewport_width(cols: TermInt) -> u32 {
    cols as u32 * PIXELS_PER_COLUMN
}

fn next_color(current: Rgb) -> Rgb {
    let palette: Vec<Rgb> = SNAKE_PALETTE.iter().filter_map(|s| s.parse().ok()).collect();
    let next = palette.iter()
        .position(|&c| c == current)
        .map_or(0, |i| (i + 1) % palette.len());
    palette.get(next).copied().unwrap_or(current)
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb { r: rgb.r, g: rgb.g, b: rgb.b }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_inputs() {
        assert_eq!(map_key(KeyCode::Up), Some(Input::Turn(Up)));
        assert_eq!(map_key(KeyCode::Char('a')), Some(Input::Turn(Left)));
        assert_eq!(map_key(KeyCode::Char('s')), Some(Input::Turn(Down)));
        assert_eq!(map_key(KeyCode::Right), Some(Input::Turn(Right)));
        assert_eq!(map_key(KeyCode::Esc), Some(Input::TogglePause));
        assert_eq!(map_key(KeyCode::Char(' ')), Some(Input::TogglePause));
        assert_eq!(map_key(KeyCode::Char('q')), None);
    }

    #[test]
    fn terminal_width_picks_tier() {
        assert_eq!(GridTier::from_viewport_width(viewport_width(80)), GridTier::Compact);
        assert_eq!(GridTier::from_viewport_width(viewport_width(96)), GridTier::Compact);
        assert_eq!(GridTier::from_viewport_width(viewport_width(97)), GridTier::Wide);
    }

    #[test]
    fn color_cycle_wraps_and_recovers() {
        let first: Rgb = SNAKE_PALETTE[0].parse().unwrap();
        let second: Rgb = SNAKE_PALETTE[1].parse().unwrap();
        let last: Rgb = SNAKE_PALETTE[SNAKE_PALETTE.len() - 1].parse().unwrap();

        assert_eq!(next_color(first), second);
        assert_eq!(next_color(last), first);
        assert_eq!(next_color(Rgb { r: 1, g: 2, b: 3 }), first);
    }
}
