//! Everything the engine needs from the outside world: somewhere to draw,
//! somewhere to play sounds, somewhere to keep preferences.

use crate::config::Rgb;
use crate::error::AudioError;
use crate::Coords;

pub const PREF_SNAKE_COLOR: &str = "snakeColor";
pub const PREF_HIGH_SCORE: &str = "high-score";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellClass {
    Food,
    SpecialFood,
    SnakeHead,
    SnakeBody,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub pos: Coords,
    pub class: CellClass,
    pub color: Option<Rgb>,
}

/// One complete picture of the board. Each frame replaces the last.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub cells: Vec<Cell>,
    pub score: u64,
    pub high_score: u64,
    pub time_left: Option<u32>,
    /// Glyph for the head, following the heading.
    pub head_char: char,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    pub score: u64,
    pub high_score: u64,
    pub new_high_score: bool,
    pub timed_out: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cue {
    Background,
    GameOver,
}

pub trait RenderSink {
    fn render(&mut self, frame: &Frame);

    fn round_over(&mut self, summary: &RoundSummary);
}

pub trait AudioSink {
    fn play(&mut self, cue: Cue) -> Result<(), AudioError>;

    fn stop(&mut self, cue: Cue);

    fn rewind(&mut self, cue: Cue);
}

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str);
}

pub trait Host: RenderSink + AudioSink + PreferenceStore {}

impl<T: RenderSink + AudioSink + PreferenceStore> Host for T {}
