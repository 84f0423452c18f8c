use crate::{Coords, GridInt};
use Direction::*;
use MoveResult::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn velocity(self) -> (GridInt, GridInt) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum MoveResult {
    Stationary,
    Moved { new_head: Coords },
    Crashed { new_head: Coords },
}

/// A snake on a wrapping square grid. The body is stored head first.
pub struct Snake {
    body: Vec<Coords>,
    heading: Option<Direction>,
    last_travelled: Option<Direction>,
    pending_growth: usize,
}

impl Snake {
    /// A single stationary segment at `pos`.
    pub fn new(pos: Coords) -> Self {
        Snake { body: vec![pos], heading: None, last_travelled: None, pending_growth: 0 }
    }

    #[cfg(test)]
    pub fn from_body(body: Vec<Coords>) -> Self {
        Snake { body, heading: None, last_travelled: None, pending_growth: 0 }
    }

    pub fn body(&self) -> &[Coords] {
        &self.body
    }

    pub fn head(&self) -> Coords {
        self.body[0]
    }

    pub fn heading(&self) -> Option<Direction> {
        self.heading
    }

    pub fn velocity(&self) -> (GridInt, GridInt) {
        self.heading.map_or((0, 0), Direction::velocity)
    }

    pub fn is_stationary(&self) -> bool {
        self.heading.is_none()
    }

    /// Moves one cell along the heading, wrapping around a `grid_size` board.
    /// A crash still leaves the snake in its moved position.
    pub fn move_step(&mut self, grid_size: GridInt) -> MoveResult {
        let dir = match self.heading {
            Some(dir) => dir,
            None => return Stationary,
        };

        let (vx, vy) = dir.velocity();
        let old_head = self.head();
        let new_head = (wrap(old_head.0 + vx, grid_size), wrap(old_head.1 + vy, grid_size));

        self.body.insert(0, new_head);
        self.last_travelled = Some(dir);

        if self.pending_growth > 0 {
            self.pending_growth -= 1;
        } else {
            self.body.pop();
        }

        if self.body[1..].contains(&new_head) {
            Crashed { new_head }
        } else {
            Moved { new_head }
        }
    }

    /// Returns false when the turn would fold the snake back onto itself.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        let reverses = |dir: Option<Direction>| dir == Some(new_direction.opposite());

        if reverses(self.heading) || reverses(self.last_travelled) {
            return false;
        }

        self.heading = Some(new_direction);
        true
    }

    pub fn grow(&mut self) {
        self.pending_growth += 1;
    }

    pub fn occupies(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }

    pub fn head_char(&self) -> char {
        match self.heading {
            Some(Up) => '^',
            Some(Down) => 'v',
            Some(Left) => '<',
            Some(Right) => '>',
            None => '@',
        }
    }
}

fn wrap(coord: GridInt, grid_size: GridInt) -> GridInt {
    if coord < 1 {
        grid_size
    } else if coord > grid_size {
        1
    } else {
        coord
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving(pos: Coords, dir: Direction) -> Snake {
        let mut snake = Snake::new(pos);
        assert!(snake.set_direction(dir));
        snake
    }

    #[test]
    fn stationary_snake_does_not_move() {
        let mut snake = Snake::new((12, 12));
        assert_eq!(snake.move_step(25), Stationary);
        assert_eq!(snake.body(), &[(12, 12)]);
        assert_eq!(snake.velocity(), (0, 0));
    }

    #[test]
    fn moves_along_heading() {
        let mut snake = moving((12, 12), Right);
        assert_eq!(snake.velocity(), (1, 0));
        assert_eq!(snake.move_step(25), Moved { new_head: (13, 12) });
        assert_eq!(snake.head(), (13, 12));
    }

    #[test]
    fn wraps_on_every_edge() {
        let mut snake = moving((25, 3), Right);
        snake.move_step(25);
        assert_eq!(snake.head(), (1, 3));

        let mut snake = moving((1, 3), Left);
        snake.move_step(25);
        assert_eq!(snake.head(), (25, 3));

        let mut snake = moving((4, 1), Up);
        snake.move_step(20);
        assert_eq!(snake.head(), (4, 20));

        let mut snake = moving((4, 20), Down);
        snake.move_step(20);
        assert_eq!(snake.head(), (4, 1));
    }

    #[test]
    fn head_stays_on_board_over_many_steps() {
        let mut snake = moving((10, 10), Up);
        for step in 0..200 {
            if step % 7 == 0 {
                snake.set_direction(if step % 14 == 0 { Left } else { Up });
            }
            snake.move_step(20);
            let (x, y) = snake.head();
            assert!((1..=20).contains(&x) && (1..=20).contains(&y));
        }
    }

    #[test]
    fn reversal_is_rejected() {
        let mut snake = moving((5, 5), Right);
        assert!(!snake.set_direction(Left));
        assert_eq!(snake.heading(), Some(Right));

        assert!(snake.set_direction(Up));
        assert!(!snake.set_direction(Down));
        assert_eq!(snake.heading(), Some(Up));
    }

    #[test]
    fn quick_double_turn_cannot_reverse_travel() {
        let mut snake = moving((5, 5), Right);
        snake.move_step(25);
        assert!(snake.set_direction(Up));
        // Left no longer reverses the heading but would reverse the last move.
        assert!(!snake.set_direction(Left));
        assert_eq!(snake.heading(), Some(Up));
    }

    #[test]
    fn growth_keeps_the_tail() {
        let mut snake = moving((5, 5), Right);
        snake.grow();
        snake.grow();
        assert_eq!(snake.move_step(25), Moved { new_head: (6, 5) });
        assert_eq!(snake.body(), &[(6, 5), (5, 5)]);
        snake.move_step(25);
        assert_eq!(snake.body(), &[(7, 5), (6, 5), (5, 5)]);
        snake.move_step(25);
        assert_eq!(snake.body(), &[(8, 5), (7, 5), (6, 5)]);
    }

    #[test]
    fn running_into_the_body_crashes() {
        let mut snake = moving((5, 5), Right);
        for _ in 0..4 {
            snake.grow();
        }
        for _ in 0..4 {
            snake.move_step(25);
        }
        // body: (9,5) (8,5) (7,5) (6,5) (5,5)
        snake.set_direction(Up);
        snake.move_step(25);
        snake.set_direction(Left);
        snake.move_step(25);
        snake.set_direction(Down);
        assert_eq!(snake.move_step(25), Crashed { new_head: (8, 5) });
    }

    #[test]
    fn following_the_tail_is_not_a_crash() {
        let mut snake = moving((5, 5), Right);
        for _ in 0..3 {
            snake.grow();
        }
        for _ in 0..3 {
            snake.move_step(25);
        }
        // body: (8,5) (7,5) (6,5) (5,5), loop into the vacated tail cell
        snake.set_direction(Down);
        snake.move_step(25);
        snake.set_direction(Left);
        snake.move_step(25);
        snake.set_direction(Up);
        assert!(matches!(snake.move_step(25), Moved { new_head: (7, 5) }));
    }
}
