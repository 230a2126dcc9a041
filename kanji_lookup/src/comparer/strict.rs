use super::super::character::CharacterRecord;
use super::super::error::{RecogError, RecogResult};
use super::super::stroke::{Direction, Location};
use super::{already_initialized, not_initialized, Comparer};

// Weights in hundredths so a perfect match sums to exactly the maximum
const STROKE_DIRECTION_WEIGHT: u32 = 100;
const MOVE_DIRECTION_WEIGHT: u32 = 80;
const STROKE_LOCATION_WEIGHT: u32 = 60;
// Share of a weight earned when features are close rather than equal, in tenths
const CLOSE_TENTHS: u32 = 7;

struct StrictState {
    directions: Vec<Direction>,
    moves: Vec<Direction>,
    starts: Vec<Location>,
    ends: Vec<Location>,
}

/// Compares stroke by stroke; the candidate needs the same stroke count and order.
pub struct StrictComparer {
    state: Option<StrictState>,
}

fn direction_score(a: Direction, b: Direction, weight: u32) -> u32 {
    if a == b {
        weight
    } else if a.is_close(b) {
        weight * CLOSE_TENTHS / 10
    } else {
        0
    }
}

fn location_score(a: Location, b: Location, weight: u32) -> u32 {
    if a == b {
        weight
    } else if a.is_close(b) {
        weight * CLOSE_TENTHS / 10
    } else {
        0
    }
}

impl StrictComparer {
    pub fn new() -> StrictComparer {
        StrictComparer { state: None }
    }
}

impl Default for StrictComparer {
    fn default() -> Self {
        StrictComparer::new()
    }
}

impl Comparer for StrictComparer {
    fn init(&mut self, reference: &CharacterRecord) -> RecogResult<()> {
        if self.state.is_some() {
            return Err(already_initialized("strict"));
        }
        self.state = Some(StrictState {
            directions: reference.directions().to_vec(),
            moves: reference.moves().to_vec(),
            starts: reference.starts().to_vec(),
            ends: reference.ends().to_vec(),
        });
        Ok(())
    }

    fn score(&self, candidate: &CharacterRecord) -> RecogResult<f32> {
        let state = self.state.as_ref().ok_or_else(|| not_initialized("strict"))?;
        let count = state.directions.len();
        if candidate.stroke_count() != count {
            return Err(RecogError::Argument(format!(
                "strict comparison needs {} strokes, candidate ({}) has {}",
                count,
                candidate.character(),
                candidate.stroke_count()
            )));
        }
        if count == 0 {
            return Ok(100f32);
        }

        let mut score = 0u32;
        for i in 0..count {
            let (a, b) = (state.directions[i], candidate.directions()[i]);
            score += direction_score(a, b, STROKE_DIRECTION_WEIGHT);
            if i > 0 {
                let (a, b) = (state.moves[i - 1], candidate.moves()[i - 1]);
                score += direction_score(a, b, MOVE_DIRECTION_WEIGHT);
            }
            score += location_score(state.starts[i], candidate.starts()[i], STROKE_LOCATION_WEIGHT);
            score += location_score(state.ends[i], candidate.ends()[i], STROKE_LOCATION_WEIGHT);
        }
        let count = count as u32;
        let max = count * (STROKE_DIRECTION_WEIGHT + 2 * STROKE_LOCATION_WEIGHT)
            + (count - 1) * MOVE_DIRECTION_WEIGHT;
        Ok((100f64 * score as f64 / max as f64) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Stroke;

    fn record(strokes: &[(i32, i32, i32, i32)]) -> CharacterRecord {
        let strokes = strokes
            .iter()
            .map(|s| Stroke::new(s.0, s.1, s.2, s.3).unwrap())
            .collect();
        CharacterRecord::from_strokes("?", strokes)
    }

    #[test]
    fn test_identical() {
        let drawn = record(&[(0, 0, 255, 255), (255, 0, 0, 255)]);
        let mut comparer = StrictComparer::new();
        comparer.init(&drawn).unwrap();
        assert_eq!(100f32, comparer.score(&drawn).unwrap());
    }

    #[test]
    fn test_identical_long_character_is_exactly_full() {
        let strokes: Vec<(i32, i32, i32, i32)> = (0..17)
            .map(|i| (i * 13, 255 - i * 7, 255 - i * 11, i * 15))
            .collect();
        let drawn = record(&strokes);
        let mut comparer = StrictComparer::new();
        comparer.init(&drawn).unwrap();
        assert_eq!(100f32, comparer.score(&drawn).unwrap());
    }

    #[test]
    fn test_close_features_earn_partial_weight() {
        // Single stroke: E from NW to NE against SE from NW to E
        let drawn = record(&[(0, 0, 255, 0)]);
        let other = record(&[(0, 0, 255, 120)]);
        let mut comparer = StrictComparer::new();
        comparer.init(&drawn).unwrap();
        let expected = 100f32 * (1.0 * 0.7 + 0.6 + 0.6 * 0.7) / 2.2;
        assert!((expected - comparer.score(&other).unwrap()).abs() < 0.001);
    }

    #[test]
    fn test_unrelated_scores_zero() {
        // E from NW to NE against W from SE to SW
        let drawn = record(&[(0, 0, 255, 0)]);
        let other = record(&[(255, 255, 0, 255)]);
        let mut comparer = StrictComparer::new();
        comparer.init(&drawn).unwrap();
        assert_eq!(0f32, comparer.score(&other).unwrap());
    }

    #[test]
    fn test_stroke_count_mismatch() {
        let drawn = record(&[(0, 0, 255, 0)]);
        let other = record(&[(0, 0, 255, 0), (0, 0, 0, 255)]);
        let mut comparer = StrictComparer::new();
        comparer.init(&drawn).unwrap();
        assert!(matches!(comparer.score(&other), Err(RecogError::Argument(_))));
    }

    #[test]
    fn test_empty_characters() {
        let empty = record(&[]);
        let mut comparer = StrictComparer::new();
        comparer.init(&empty).unwrap();
        assert_eq!(100f32, comparer.score(&empty).unwrap());
    }
}
