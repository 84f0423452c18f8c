use crate::{Coords, GridInt, ScreenCoords, TermInt};
use std::{io::{Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal, Result};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};

/// Board cells are two columns wide so the grid looks roughly square.
const CELL_WIDTH: TermInt = 2;

#[derive(Copy, Clone, PartialEq)]
struct Glyph {
    ch: char,
    color: Option<Color>,
}

const BLANK: Glyph = Glyph { ch: ' ', color: None };

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<Glyph>,
    current_msg: Option<Message>,
    board_origin: ScreenCoords,
    grid_size: GridInt,
}

struct Message {
    top_left: ScreenCoords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        let screen = vec![BLANK; width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None, board_origin: (0, 0), grid_size: 0 })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }

    pub fn read_event_blocking(&self) -> Result<Event> {
        loop {
            match read()? {
                ev @ Event::Key(_) | ev @ Event::Resize(_, _) => return Ok(ev),
                _ => {}
            }
        }
    }

    pub fn read_events_queue(&self) -> Result<Vec<Event>> {
        let mut events = vec![];

        while poll(Duration::from_millis(1))? {
            match read()? {
                ev @ Event::Key(_) | ev @ Event::Resize(_, _) => events.push(ev),
                _ => {}
            }
        }

        Ok(events)
    }

    pub fn get_terminal_size(&self) -> ScreenCoords {
        (self.width, self.height)
    }

    /// Forgets everything on screen and adopts a new terminal size.
    pub fn resize(&mut self, width: TermInt, height: TermInt) -> Result<()> {
        self.width = width;
        self.height = height;
        self.clear()
    }

    /// Clears the screen and draws an empty board centered in the terminal,
    /// with a status line above it.
    pub fn draw_board(&mut self, grid_size: GridInt) -> Result<()> {
        self.clear()?;

        let outer_w = grid_size as TermInt * CELL_WIDTH + 2;
        let outer_h = grid_size as TermInt + 2;
        let left = self.width.saturating_sub(outer_w) / 2;
        let top = (self.height.saturating_sub(outer_h + 1) / 2).max(1);

        self.board_origin = (left, top);
        self.grid_size = grid_size;

        let (end_x, end_y) = (left + outer_w - 1, top + outer_h - 1);

        for x in left..=end_x {
            let ch = if x == left || x == end_x {'+'} else {'-'};
            self.print_at((x, top), ch, None);
            self.print_at((x, end_y), ch, None);
        }

        for y in top + 1..end_y {
            self.print_at((left, y), '|', None);
            self.print_at((end_x, y), '|', None);
        }

        self.flush()
    }

    /// Paints the board cell at grid position `pos`.
    pub fn print_cell(&mut self, pos: Coords, glyph: [char; 2], color: Option<Color>) {
        if pos.0 < 1 || pos.1 < 1 || pos.0 > self.grid_size || pos.1 > self.grid_size {
            return;
        }

        let x = self.board_origin.0 + 1 + (pos.0 as TermInt - 1) * CELL_WIDTH;
        let y = self.board_origin.1 + pos.1 as TermInt;
        self.print_at((x, y), glyph[0], color);
        self.print_at((x + 1, y), glyph[1], color);
    }

    /// Writes `text` on the line just above the board, padded to its width.
    pub fn print_status(&mut self, text: &str) {
        let width = (self.grid_size as TermInt * CELL_WIDTH + 2) as usize;
        let line = format!("{text: <width$}", text = text, width = width);
        let (left, top) = self.board_origin;

        for (i, ch) in line.chars().take(width).enumerate() {
            self.print_at((left + i as TermInt, top - 1), ch, None);
        }
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message::new(msg_width, msg_height, top_left));
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };
        let top_left = msg.top_left();

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height() {
            for x_diff in 0..msg.width() {
                let pos = (top_left.0 + x_diff, top_left.1 + y_diff);
                if let Some(i) = self.index(pos) {
                    let glyph = self.screen[i];
                    self.emit(pos, glyph)?;
                }
            }
        }

        self.flush()
    }

    pub fn print_at(&mut self, pos: ScreenCoords, ch: char, color: Option<Color>) {
        let glyph = Glyph { ch, color };
        if let Some(i) = self.index(pos) {
            self.screen[i] = glyph;
        }

        // A message on top keeps covering the board until it is hidden.
        if !self.covered_by_message(pos) {
            if let Err(err) = self.emit(pos, glyph) {
                log::warn!("could not draw at {:?}: {}", pos, err);
            }
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.current_msg = None;
        self.screen = vec![BLANK; self.width as usize * self.height as usize];
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    pub fn bell(&mut self) -> Result<()> {
        execute!(self.stdout, style::Print('\u{7}'))
    }

    ///////////////////////////////////////////////////////////////////////////

    fn print_at_no_save(&mut self, pos: ScreenCoords, ch: char) -> Result<()> {
        // To be used for printing messages, where we don't wanna overwrite our
        // local buffer to restore it when the message is hidden
        self.emit(pos, Glyph { ch, color: None })
    }

    fn emit(&mut self, pos: ScreenCoords, glyph: Glyph) -> Result<()> {
        if self.index(pos).is_none() {
            return Ok(());
        }

        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1))?;
        match glyph.color {
            Some(color) => queue!(self.stdout, style::SetForegroundColor(color), style::Print(glyph.ch), style::ResetColor),
            None => queue!(self.stdout, style::Print(glyph.ch)),
        }
    }

    fn index(&self, pos: ScreenCoords) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }

    fn covered_by_message(&self, pos: ScreenCoords) -> bool {
        self.current_msg.as_ref().map_or(false, |msg| {
            let (left, top) = msg.top_left();
            pos.0 >= left && pos.0 < left + msg.width() && pos.1 >= top && pos.1 < top + msg.height()
        })
    }
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: ScreenCoords) -> Self {
        Message { width, height, top_left }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn top_left(&self) -> ScreenCoords {
        self.top_left
    }
}

pub fn is_ctrl_c(ev: &KeyEvent) -> bool {
    use crossterm::event::{KeyCode, KeyModifiers};
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
