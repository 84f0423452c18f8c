pub mod config;
pub mod engine;
pub mod error;
pub mod food;
pub mod game;
pub mod host;
pub mod prefs;
pub mod scheduler;
pub mod snake;
pub mod term;

pub type TermInt = u16;
pub type ScreenCoords = (TermInt, TermInt);

/// Board coordinates run from 1 to the grid size on both axes.
pub type GridInt = i16;
pub type Coords = (GridInt, GridInt);
