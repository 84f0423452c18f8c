//! The game loop: one engine per session, advanced by a movement ticker and an
//! optional countdown ticker.
//!
//! The engine never sleeps and never reads the wall clock itself. Callers pass
//! the current time into `start`, `resume` and `advance`, and the engine calls
//! back into its [`Host`] to draw frames, play cues and store preferences.

use std::time::Duration;

use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::{Config, GridTier, Rgb};
use crate::food::{FoodField, FoodKind, NORMAL_FOOD_POINTS, SPECIAL_FOOD_POINTS};
use crate::host::{
    AudioSink, Cell, CellClass, Cue, Frame, Host, PreferenceStore, RenderSink, RoundSummary,
    PREF_HIGH_SCORE, PREF_SNAKE_COLOR,
};
use crate::scheduler::Ticker;
use crate::snake::{Direction, MoveResult, Snake};
use crate::Coords;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    GameOver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Turn(Direction),
    TogglePause,
}

pub struct GameLoopEngine<H: Host, R: Rng = StdRng> {
    config: Config,
    host: H,
    rng: R,
    phase: Phase,
    snake: Snake,
    food: FoodField,
    score: u64,
    high_score: u64,
    time_left: Option<u32>,
    movement: Ticker,
    countdown: Ticker,
}

impl<H: Host> GameLoopEngine<H> {
    pub fn new(config: Config, host: H) -> Self {
        Self::with_rng(config, host, StdRng::from_entropy())
    }
}

impl<H: Host, R: Rng> GameLoopEngine<H, R> {
    /// Builds an idle engine, picking up the stored high score and snake color.
    pub fn with_rng(mut config: Config, host: H, rng: R) -> Self {
        let high_score = host.get(PREF_HIGH_SCORE)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0);

        if let Some(color) = host.get(PREF_SNAKE_COLOR).and_then(|s| s.parse::<Rgb>().ok()) {
            config.snake_color = color;
        }

        let movement = Ticker::new(config.tick_interval);
        let countdown = Ticker::new(config.countdown_interval);
        let center = center(&config);

        GameLoopEngine {
            config,
            host,
            rng,
            phase: Phase::Idle,
            snake: Snake::new(center),
            food: FoodField::default(),
            score: 0,
            high_score,
            time_left: None,
            movement,
            countdown,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn time_left(&self) -> Option<u32> {
        self.time_left
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> &FoodField {
        &self.food
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn grid_size(&self) -> crate::GridInt {
        self.config.grid_size()
    }

    pub fn start(&mut self, now: Duration) {
        if self.phase != Phase::Idle {
            debug!("start ignored in {:?}", self.phase);
            return;
        }

        self.reset_round();
        let grid = self.grid_size();
        self.food.respawn(grid, &self.snake, &mut self.rng);
        self.time_left = self.config.round_duration;
        self.phase = Phase::Running;

        self.movement.reset(now);
        if self.time_left.is_some() {
            self.countdown.reset(now);
        }

        self.host.rewind(Cue::Background);
        self.play(Cue::Background);

        info!("round started on a {0}x{0} grid", self.grid_size());
        self.render();
    }

    pub fn handle_input(&mut self, input: Input, now: Duration) {
        match input {
            Input::Turn(dir) => {
                self.change_direction(dir);
            }
            Input::TogglePause => self.toggle_pause(now),
        }
    }

    /// Returns whether the heading changed to `dir`.
    pub fn change_direction(&mut self, dir: Direction) -> bool {
        if self.phase != Phase::Running {
            return false;
        }

        self.snake.set_direction(dir)
    }

    pub fn toggle_pause(&mut self, now: Duration) {
        match self.phase {
            Phase::Running if self.snake.is_stationary() => debug!("pause ignored before first move"),
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(now),
            _ => {}
        }
    }

    pub fn pause(&mut self) {
        if self.phase != Phase::Running {
            return;
        }

        self.phase = Phase::Paused;
        self.movement.stop();
        self.countdown.stop();
        self.host.stop(Cue::Background);
    }

    pub fn resume(&mut self, now: Duration) {
        if self.phase != Phase::Paused {
            return;
        }

        self.phase = Phase::Running;
        self.movement.reset(now);
        if self.time_left.is_some() {
            self.countdown.reset(now);
        }
        self.play(Cue::Background);
        self.render();
    }

    /// Fires every ticker event due by `now`, oldest first.
    pub fn advance(&mut self, now: Duration) {
        loop {
            match (self.movement.due_by(now), self.countdown.due_by(now)) {
                (Some(m), Some(c)) if c < m => {
                    self.countdown.fire();
                    self.countdown_tick();
                }
                (Some(_), _) => {
                    self.movement.fire();
                    self.tick();
                }
                (None, Some(_)) => {
                    self.countdown.fire();
                    self.countdown_tick();
                }
                (None, None) => break,
            }
        }
    }

    /// One movement step.
    pub fn tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }

        let grid = self.grid_size();
        if let MoveResult::Crashed { new_head } = self.snake.move_step(grid) {
            debug!("snake ran into itself at {:?}", new_head);
            self.render();
            self.finish_round(false);
            return;
        }

        let head = self.snake.head();
        if self.food.take_normal_at(head) {
            self.score += NORMAL_FOOD_POINTS;
            self.snake.grow();
            if self.food.normal_exhausted() {
                self.food.respawn(grid, &self.snake, &mut self.rng);
            }
        }

        // Checked after any respawn, so fresh special food under the head counts too.
        if self.food.take_special_at(head) {
            self.score += SPECIAL_FOOD_POINTS;
            self.snake.grow();
        }

        self.render();
    }

    /// One second of round time.
    pub fn countdown_tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }

        let left = match self.time_left {
            Some(left) => left.saturating_sub(1),
            None => return,
        };

        self.time_left = Some(left);
        if left == 0 {
            self.finish_round(true);
        } else {
            self.render();
        }
    }

    /// Back to idle, keeping the high score and snake color.
    pub fn restart(&mut self) {
        self.movement.stop();
        self.countdown.stop();
        self.host.stop(Cue::Background);
        self.host.rewind(Cue::Background);
        self.reset_round();
        self.phase = Phase::Idle;
    }

    /// Switches grid tier when the viewport crosses the size threshold.
    /// Returns true when that forced a reset.
    pub fn resize(&mut self, viewport_width: u32) -> bool {
        let tier = GridTier::from_viewport_width(viewport_width);
        if tier == self.config.grid_tier {
            return false;
        }

        info!("viewport now {}px wide, switching to {:?} grid", viewport_width, tier);
        self.config.grid_tier = tier;
        self.restart();
        true
    }

    pub fn set_snake_color(&mut self, color: Rgb) {
        self.config.snake_color = color;
        self.host.set(PREF_SNAKE_COLOR, &color.to_string());
        if self.phase != Phase::Idle {
            self.render();
        }
    }

    pub fn frame(&self) -> Frame {
        let color = Some(self.config.snake_color);
        let mut cells: Vec<Cell> = self.food.items()
            .map(|item| Cell {
                pos: item.pos,
                class: match item.kind {
                    FoodKind::Normal => CellClass::Food,
                    FoodKind::Special => CellClass::SpecialFood,
                },
                color: None,
            })
            .collect();

        for (i, &pos) in self.snake.body().iter().enumerate() {
            let class = if i == 0 { CellClass::SnakeHead } else { CellClass::SnakeBody };
            cells.push(Cell { pos, class, color });
        }

        Frame {
            cells,
            score: self.score,
            high_score: self.high_score,
            time_left: self.time_left,
            head_char: self.snake.head_char(),
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn finish_round(&mut self, timed_out: bool) {
        self.phase = Phase::GameOver;
        self.movement.stop();
        self.countdown.stop();

        self.host.stop(Cue::Background);
        self.host.rewind(Cue::Background);
        self.host.rewind(Cue::GameOver);
        self.play(Cue::GameOver);

        let new_high_score = self.score > self.high_score;
        if new_high_score {
            self.high_score = self.score;
            self.host.set(PREF_HIGH_SCORE, &self.high_score.to_string());
            info!("new high score {}", self.high_score);
        }

        info!("round over with {} points", self.score);
        self.host.round_over(&RoundSummary {
            score: self.score,
            high_score: self.high_score,
            new_high_score,
            timed_out,
        });
    }

    fn reset_round(&mut self) {
        self.score = 0;
        self.time_left = None;
        self.snake = Snake::new(center(&self.config));
        self.food.clear();
    }

    fn render(&mut self) {
        let frame = self.frame();
        self.host.render(&frame);
    }

    fn play(&mut self, cue: Cue) {
        if let Err(err) = self.host.play(cue) {
            debug!("{:?} cue not played: {}", cue, err);
        }
    }
}

fn center(config: &Config) -> Coords {
    let mid = config.grid_size() / 2;
    (mid, mid)
}
