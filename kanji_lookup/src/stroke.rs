use serde_derive::{Deserialize, Serialize};
use std::fmt;

use super::error::{RecogError, RecogResult};

// Movement below this (in 0..255 units, on both axes) has no direction
const DIRECTION_THRESHOLD: i32 = 51;
// Share (out of 256) of the dominant movement the other axis needs for a diagonal
// E.g. with 77 (about 30%), moving S by 100 needs at least 30 E to count as SE
const DIAGONAL_THRESHOLD: i32 = 77;
// Cell boundaries of the 3x3 location grid
const LOCATION_LOW: u8 = 85;
const LOCATION_HIGH: u8 = 170;

/// One stroke reduced to its start and end point, quantized to 0..=255 per axis.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stroke {
    start_x: u8,
    start_y: u8,
    end_x: u8,
    end_y: u8,
}

impl Stroke {
    /// Constructs from raw 0..=255 values; anything outside that range is a geometry error.
    pub fn new(start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> RecogResult<Stroke> {
        Ok(Stroke {
            start_x: to_coordinate(start_x)?,
            start_y: to_coordinate(start_y)?,
            end_x: to_coordinate(end_x)?,
            end_y: to_coordinate(end_y)?,
        })
    }

    /// Constructs from coordinates in 0..1, quantized with round-to-nearest.
    pub fn from_unit(start_x: f32, start_y: f32, end_x: f32, end_y: f32) -> RecogResult<Stroke> {
        Stroke::new(
            quantize(start_x)?,
            quantize(start_y)?,
            quantize(end_x)?,
            quantize(end_y)?,
        )
    }

    pub fn start_x(&self) -> u8 {
        self.start_x
    }

    pub fn start_y(&self) -> u8 {
        self.start_y
    }

    pub fn end_x(&self) -> u8 {
        self.end_x
    }

    pub fn end_y(&self) -> u8 {
        self.end_y
    }

    /// Direction the pen travelled while drawing this stroke
    pub fn direction(&self) -> Direction {
        Direction::between(self.start_x, self.start_y, self.end_x, self.end_y)
    }

    /// Direction the pen moved between the end of `previous` and the start of this stroke
    pub fn move_direction(&self, previous: &Stroke) -> Direction {
        Direction::between(previous.end_x, previous.end_y, self.start_x, self.start_y)
    }

    pub fn start_location(&self) -> Location {
        Location::of_point(self.start_x, self.start_y)
    }

    pub fn end_location(&self) -> Location {
        Location::of_point(self.end_x, self.end_y)
    }
}

impl fmt::Display for Stroke {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{},{}:{},{}]", self.start_x, self.start_y, self.end_x, self.end_y)
    }
}

fn to_coordinate(value: i32) -> RecogResult<u8> {
    u8::try_from(value).map_err(|_| RecogError::Geometry(format!("coordinate {} out of range 0-255", value)))
}

/// Maps a 0..1 value onto 0..=255 using round-to-nearest.
pub fn quantize(value: f32) -> RecogResult<i32> {
    if !value.is_finite() {
        return Err(RecogError::Geometry(format!("coordinate {} is not finite", value)));
    }
    let quantized = (value * 255f32 + 0.49999f32).floor();
    if quantized < 0f32 || quantized > 255f32 {
        return Err(RecogError::Geometry(format!("normalized coordinate {} out of range 0-1", value)));
    }
    Ok(quantized as i32)
}

/// Rough compass direction of a movement; `None` when the movement is too small to tell.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    None,
}

impl Direction {
    pub const ALL: [Direction; 9] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
        Direction::None,
    ];

    // Position on the 8-point compass, clockwise from N
    fn compass_index(self) -> Option<u8> {
        match self {
            Direction::N => Some(0),
            Direction::NE => Some(1),
            Direction::E => Some(2),
            Direction::SE => Some(3),
            Direction::S => Some(4),
            Direction::SW => Some(5),
            Direction::W => Some(6),
            Direction::NW => Some(7),
            Direction::None => None,
        }
    }

    /// True if equal, adjacent on the compass, or either side has no direction.
    pub fn is_close(self, other: Direction) -> bool {
        match (self.compass_index(), other.compass_index()) {
            (Some(a), Some(b)) => compass_distance(a, b) <= 1,
            _ => true,
        }
    }

    /// Classifies the movement from (start_x, start_y) to (end_x, end_y); Y grows downward.
    pub fn between(start_x: u8, start_y: u8, end_x: u8, end_y: u8) -> Direction {
        let delta_x = end_x as i32 - start_x as i32;
        let delta_y = end_y as i32 - start_y as i32;
        let abs_x = delta_x.abs();
        let abs_y = delta_y.abs();

        // Not really a movement at all
        if abs_x < DIRECTION_THRESHOLD && abs_y < DIRECTION_THRESHOLD {
            return Direction::None;
        }

        if abs_x > abs_y {
            // Horizontal movement dominates
            let diagonal = abs_y > ((DIAGONAL_THRESHOLD * abs_x) >> 8);
            match (delta_x > 0, diagonal) {
                (true, false) => Direction::E,
                (false, false) => Direction::W,
                (true, true) if delta_y < 0 => Direction::NE,
                (true, true) => Direction::SE,
                (false, true) if delta_y < 0 => Direction::NW,
                (false, true) => Direction::SW,
            }
        } else {
            // Vertical movement dominates (or exact 45 degrees)
            let diagonal = abs_x > ((DIAGONAL_THRESHOLD * abs_y) >> 8);
            match (delta_y > 0, diagonal) {
                (true, false) => Direction::S,
                (false, false) => Direction::N,
                (true, true) if delta_x < 0 => Direction::SW,
                (true, true) => Direction::SE,
                (false, true) if delta_x < 0 => Direction::NW,
                (false, true) => Direction::NE,
            }
        }
    }
}

// Steps between two positions on a cyclic 8-point compass
fn compass_distance(a: u8, b: u8) -> u8 {
    let forward = (a + 8 - b) % 8;
    forward.min(8 - forward)
}

/// Cell of the 3x3 grid laid over the 0..=255 square.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    Mid,
}

impl Location {
    pub const ALL: [Location; 9] = [
        Location::N,
        Location::NE,
        Location::E,
        Location::SE,
        Location::S,
        Location::SW,
        Location::W,
        Location::NW,
        Location::Mid,
    ];

    /// Grid column and row, each 0..=2
    pub fn grid(self) -> (u8, u8) {
        match self {
            Location::N => (1, 0),
            Location::NE => (2, 0),
            Location::E => (2, 1),
            Location::SE => (2, 2),
            Location::S => (1, 2),
            Location::SW => (0, 2),
            Location::W => (0, 1),
            Location::NW => (0, 0),
            Location::Mid => (1, 1),
        }
    }

    fn from_grid(column: u8, row: u8) -> Location {
        match (column, row) {
            (0, 0) => Location::NW,
            (1, 0) => Location::N,
            (2, 0) => Location::NE,
            (0, 1) => Location::W,
            (1, 1) => Location::Mid,
            (2, 1) => Location::E,
            (0, _) => Location::SW,
            (1, _) => Location::S,
            _ => Location::SE,
        }
    }

    pub fn of_point(x: u8, y: u8) -> Location {
        Location::from_grid(grid_cell(x), grid_cell(y))
    }

    /// True if the two cells touch (including diagonally) or are the same cell.
    pub fn is_close(self, other: Location) -> bool {
        let (ax, ay) = self.grid();
        let (bx, by) = other.grid();
        ax.abs_diff(bx) <= 1 && ay.abs_diff(by) <= 1
    }
}

fn grid_cell(value: u8) -> u8 {
    if value < LOCATION_LOW {
        0
    } else if value < LOCATION_HIGH {
        1
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(sx: f32, sy: f32, ex: f32, ey: f32) -> Stroke {
        Stroke::from_unit(sx, sy, ex, ey).unwrap()
    }

    #[test]
    fn test_create() {
        let stroke = Stroke::new(1, 2, 3, 4).unwrap();
        assert_eq!((1, 2, 3, 4), (stroke.start_x(), stroke.start_y(), stroke.end_x(), stroke.end_y()));
        assert_eq!("[1,2:3,4]", stroke.to_string());
    }

    #[test]
    fn test_create_out_of_range() {
        assert!(matches!(Stroke::new(0, 0, 256, 0), Err(RecogError::Geometry(_))));
        assert!(matches!(Stroke::new(-1, 0, 0, 0), Err(RecogError::Geometry(_))));
        assert!(matches!(Stroke::from_unit(0.0, 1.1, 0.0, 0.0), Err(RecogError::Geometry(_))));
        assert!(matches!(Stroke::from_unit(f32::NAN, 0.0, 0.0, 0.0), Err(RecogError::Geometry(_))));
    }

    #[test]
    fn test_quantize() {
        assert_eq!(0, quantize(0.0).unwrap());
        assert_eq!(255, quantize(1.0).unwrap());
        assert_eq!(127, quantize(0.5).unwrap());
        assert_eq!(25, quantize(0.1).unwrap());
    }

    #[test]
    fn test_direction() {
        // Too small to count
        assert_eq!(Direction::None, unit(0.5, 0.5, 0.51, 0.51).direction());
        // Exact straights
        assert_eq!(Direction::E, unit(0.5, 0.5, 0.8, 0.5).direction());
        assert_eq!(Direction::S, unit(0.5, 0.5, 0.5, 0.8).direction());
        assert_eq!(Direction::W, unit(0.5, 0.5, 0.2, 0.5).direction());
        assert_eq!(Direction::N, unit(0.5, 0.5, 0.5, 0.2).direction());
        // Exact diagonals
        assert_eq!(Direction::SE, unit(0.5, 0.5, 0.8, 0.8).direction());
        assert_eq!(Direction::SW, unit(0.5, 0.5, 0.2, 0.8).direction());
        assert_eq!(Direction::NW, unit(0.5, 0.5, 0.2, 0.2).direction());
        assert_eq!(Direction::NE, unit(0.5, 0.5, 0.8, 0.2).direction());
        // Rough straights
        assert_eq!(Direction::E, unit(0.5, 0.5, 0.8, 0.52).direction());
        assert_eq!(Direction::E, unit(0.5, 0.5, 0.8, 0.48).direction());
        // Rough diagonals
        assert_eq!(Direction::SE, unit(0.5, 0.5, 0.8, 0.6).direction());
        assert_eq!(Direction::NE, unit(0.5, 0.5, 0.8, 0.4).direction());
    }

    #[test]
    fn test_direction_thresholds() {
        // 50 units on both axes is still below the movement threshold
        assert_eq!(Direction::None, Direction::between(100, 100, 150, 150));
        assert_eq!(Direction::SE, Direction::between(100, 100, 151, 151));
        // Minor axis must exceed 77/256 of the major one
        assert_eq!(Direction::E, Direction::between(0, 100, 200, 160));
        assert_eq!(Direction::SE, Direction::between(0, 100, 200, 161));
        assert_eq!(Direction::N, Direction::between(100, 200, 130, 0));
        assert_eq!(Direction::NE, Direction::between(100, 200, 161, 0));
    }

    #[test]
    fn test_location() {
        let stroke = unit(0.1, 0.1, 0.4, 0.1);
        assert_eq!(Location::NW, stroke.start_location());
        assert_eq!(Location::N, stroke.end_location());
        let stroke = unit(0.7, 0.1, 0.9, 0.4);
        assert_eq!(Location::NE, stroke.start_location());
        assert_eq!(Location::E, stroke.end_location());
        let stroke = unit(0.8, 0.94, 0.4, 0.7);
        assert_eq!(Location::SE, stroke.start_location());
        assert_eq!(Location::S, stroke.end_location());
        let stroke = unit(0.2, 0.9, 0.3, 0.5);
        assert_eq!(Location::SW, stroke.start_location());
        assert_eq!(Location::W, stroke.end_location());
        let stroke = unit(0.4, 0.4, 0.6, 0.6);
        assert_eq!(Location::Mid, stroke.start_location());
        assert_eq!(Location::Mid, stroke.end_location());
    }

    #[test]
    fn test_location_boundaries() {
        assert_eq!(Location::NW, Location::of_point(84, 84));
        assert_eq!(Location::Mid, Location::of_point(85, 85));
        assert_eq!(Location::Mid, Location::of_point(169, 169));
        assert_eq!(Location::SE, Location::of_point(170, 170));
    }

    #[test]
    fn test_direction_close() {
        // One edge of the compass
        assert!(!Direction::N.is_close(Direction::E));
        assert!(Direction::N.is_close(Direction::NE));
        assert!(Direction::N.is_close(Direction::N));
        assert!(Direction::N.is_close(Direction::NW));
        assert!(!Direction::N.is_close(Direction::W));
        // Middle
        assert!(!Direction::S.is_close(Direction::E));
        assert!(Direction::S.is_close(Direction::SE));
        assert!(Direction::S.is_close(Direction::S));
        assert!(Direction::S.is_close(Direction::SW));
        assert!(!Direction::S.is_close(Direction::W));
        // No direction is close to everything
        assert!(Direction::W.is_close(Direction::None));
        assert!(Direction::None.is_close(Direction::W));
        assert!(Direction::None.is_close(Direction::None));
    }

    #[test]
    fn test_close_is_symmetric() {
        for a in Direction::ALL.iter() {
            assert!(a.is_close(Direction::None));
            for b in Direction::ALL.iter() {
                assert_eq!(a.is_close(*b), b.is_close(*a), "{:?} / {:?}", a, b);
            }
        }
        for a in Location::ALL.iter() {
            for b in Location::ALL.iter() {
                assert_eq!(a.is_close(*b), b.is_close(*a), "{:?} / {:?}", a, b);
            }
        }
        assert!(Location::NW.is_close(Location::Mid));
        assert!(!Location::NW.is_close(Location::SE));
        assert!(!Location::N.is_close(Location::S));
    }

    #[test]
    fn test_move_direction() {
        let first = Stroke::new(0, 0, 200, 0).unwrap();
        let second = Stroke::new(0, 200, 255, 255).unwrap();
        assert_eq!(Direction::SW, second.move_direction(&first));
        let close = Stroke::new(210, 10, 255, 255).unwrap();
        assert_eq!(Direction::None, close.move_direction(&first));
    }
}
