use std::ops::Range;

use crate::snake::Snake;
use crate::{Coords, GridInt};

use rand::seq::SliceRandom;
use rand::Rng;

pub const NORMAL_FOOD_POINTS: u64 = 10;
pub const SPECIAL_FOOD_POINTS: u64 = 50;

const FOOD_PER_BATCH: usize = 2;
const SPECIAL_FOOD_CHANCE: f64 = 0.10;
const SPECIAL_FOOD_PADDING: GridInt = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FoodKind {
    Normal,
    Special,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FoodItem {
    pub pos: Coords,
    pub kind: FoodKind,
}

#[derive(Default)]
pub struct FoodField {
    normal: Vec<Coords>,
    special: Option<Coords>,
}

impl FoodField {
    pub fn normal(&self) -> &[Coords] {
        &self.normal
    }

    pub fn special(&self) -> Option<Coords> {
        self.special
    }

    pub fn items(&self) -> impl Iterator<Item = FoodItem> + '_ {
        let normal = self.normal.iter().map(|&pos| FoodItem { pos, kind: FoodKind::Normal });
        let special = self.special.map(|pos| FoodItem { pos, kind: FoodKind::Special });
        normal.chain(special)
    }

    pub fn clear(&mut self) {
        self.normal.clear();
        self.special = None;
    }

    /// Replaces all food: two normal items in the central band and, by chance,
    /// one special item anywhere off the border.
    pub fn respawn<R: Rng>(&mut self, grid_size: GridInt, snake: &Snake, rng: &mut R) {
        let band = central_band(grid_size);
        let cells: Vec<Coords> = band.clone()
            .flat_map(|y| band.clone().map(move |x| (x, y)))
            .collect();

        let free: Vec<Coords> = cells.iter().copied().filter(|&pos| !snake.occupies(pos)).collect();
        let pool = if free.len() >= FOOD_PER_BATCH { &free } else { &cells };

        self.normal = pool.choose_multiple(rng, FOOD_PER_BATCH).copied().collect();

        self.special = if rng.gen_bool(SPECIAL_FOOD_CHANCE) {
            let range = SPECIAL_FOOD_PADDING..(grid_size - SPECIAL_FOOD_PADDING).max(SPECIAL_FOOD_PADDING + 1);
            Some((rng.gen_range(range.clone()), rng.gen_range(range)))
        } else {
            None
        };
    }

    /// Removes the normal food at `pos`, if any.
    pub fn take_normal_at(&mut self, pos: Coords) -> bool {
        match self.normal.iter().position(|&food| food == pos) {
            Some(i) => {
                self.normal.remove(i);
                true
            }
            None => false,
        }
    }

    /// Removes the special food if it sits at `pos`.
    pub fn take_special_at(&mut self, pos: Coords) -> bool {
        if self.special == Some(pos) {
            self.special = None;
            true
        } else {
            false
        }
    }

    pub fn normal_exhausted(&self) -> bool {
        self.normal.is_empty()
    }

    #[cfg(test)]
    pub fn push_normal(&mut self, pos: Coords) {
        self.normal.push(pos);
    }

    #[cfg(test)]
    pub fn set_special(&mut self, pos: Option<Coords>) {
        self.special = pos;
    }
}

/// The `[30%, 70%)` band of the grid, clamped to the board and never empty.
pub fn central_band(grid_size: GridInt) -> Range<GridInt> {
    let min = ((grid_size as f64 * 0.3).floor() as GridInt).max(1);
    let max = ((grid_size as f64 * 0.7).floor() as GridInt).min(grid_size + 1);
    min..max.max(min + FOOD_PER_BATCH as GridInt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn band_matches_grid_tiers() {
        assert_eq!(central_band(25), 7..17);
        assert_eq!(central_band(20), 6..14);
        assert_eq!(central_band(2), 1..3);
    }

    #[test]
    fn respawn_places_two_distinct_items_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        let snake = Snake::new((12, 12));
        let mut field = FoodField::default();

        for _ in 0..200 {
            field.respawn(25, &snake, &mut rng);
            let normal = field.normal();
            assert_eq!(normal.len(), 2);
            assert_ne!(normal[0], normal[1]);
            for &(x, y) in normal {
                assert!((7..17).contains(&x) && (7..17).contains(&y));
                assert_ne!((x, y), (12, 12));
            }
        }
    }

    #[test]
    fn special_food_is_rare_and_padded() {
        let mut rng = StdRng::seed_from_u64(99);
        let snake = Snake::new((1, 1));
        let mut field = FoodField::default();
        let mut specials = 0;

        for _ in 0..2000 {
            field.respawn(20, &snake, &mut rng);
            if let Some((x, y)) = field.special() {
                specials += 1;
                assert!((2..18).contains(&x) && (2..18).contains(&y));
            }
        }

        assert!(specials > 100 && specials < 320, "got {} specials", specials);
    }

    #[test]
    fn crowded_band_falls_back_to_occupied_cells() {
        let mut rng = StdRng::seed_from_u64(3);
        let band = central_band(25);
        let mut body: Vec<Coords> = band.clone()
            .flat_map(|y| band.clone().map(move |x| (x, y)))
            .collect();
        body.pop();
        let snake = Snake::from_body(body);
        let mut field = FoodField::default();

        for _ in 0..50 {
            field.respawn(25, &snake, &mut rng);
            let normal = field.normal();
            assert_eq!(normal.len(), 2);
            assert_ne!(normal[0], normal[1]);
            for &(x, y) in normal {
                assert!(band.contains(&x) && band.contains(&y));
            }
        }
    }

    #[test]
    fn take_removes_only_matching_food() {
        let mut field = FoodField { normal: vec![(8, 8), (9, 9)], special: Some((9, 9)) };

        assert!(!field.take_normal_at((1, 1)));
        assert!(!field.take_special_at((1, 1)));

        assert!(field.take_normal_at((9, 9)));
        assert_eq!(field.normal(), &[(8, 8)]);
        assert!(!field.normal_exhausted());

        assert!(field.take_special_at((9, 9)));
        assert_eq!(field.special(), None);

        assert!(field.take_normal_at((8, 8)));
        assert!(field.normal_exhausted());
        assert_eq!(field.items().count(), 0);
    }
}
