use super::super::character::CharacterRecord;
use super::super::error::RecogResult;
use super::super::stroke::Stroke;
use super::{already_initialized, not_initialized, Comparer};

// Cells per axis; the posting table holds this to the fourth power
const LOCATION_RANGE: usize = 5;
const TABLE_SIZE: usize = LOCATION_RANGE * LOCATION_RANGE * LOCATION_RANGE * LOCATION_RANGE;

const SCORE_RIGHT_DIRECTION: u32 = 2;
const SCORE_EXACT_LOCATION: u32 = 4;
const SCORE_STRAIGHT_LOCATION: u32 = 3;
const SCORE_DIAGONAL_LOCATION: u32 = 2;
const MAX_SCORE: u32 = SCORE_EXACT_LOCATION * 2 + SCORE_RIGHT_DIRECTION;
const MIN_SCORE: u32 = SCORE_DIAGONAL_LOCATION * 2;

/// Coarse start and end cell of a stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start_x: usize,
    start_y: usize,
    end_x: usize,
    end_y: usize,
}

impl Span {
    fn of(stroke: &Stroke) -> Span {
        Span {
            start_x: cell(stroke.start_x()),
            start_y: cell(stroke.start_y()),
            end_x: cell(stroke.end_x()),
            end_y: cell(stroke.end_y()),
        }
    }

    fn reversed(self) -> Span {
        Span {
            start_x: self.end_x,
            start_y: self.end_y,
            end_x: self.start_x,
            end_y: self.start_y,
        }
    }

    fn index(self) -> usize {
        ((self.start_x * LOCATION_RANGE + self.start_y) * LOCATION_RANGE + self.end_x) * LOCATION_RANGE + self.end_y
    }
}

fn cell(value: u8) -> usize {
    (value as usize * LOCATION_RANGE) >> 8
}

// Cells within one step of `centre` on one axis, clamped to the grid
fn neighbourhood(centre: usize) -> std::ops::RangeInclusive<usize> {
    centre.saturating_sub(1)..=(centre + 1).min(LOCATION_RANGE - 1)
}

fn endpoint_score(exact_x: usize, exact_y: usize, x: usize, y: usize) -> u32 {
    if exact_x == x && exact_y == y {
        SCORE_EXACT_LOCATION
    } else if exact_x == x || exact_y == y {
        SCORE_STRAIGHT_LOCATION
    } else {
        SCORE_DIAGONAL_LOCATION
    }
}

/// A drawn stroke that would fit a given span, and how well
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Posting {
    stroke: usize,
    score: u32,
}

struct SpansState {
    count: usize,
    // Per span index, best first: score descending, then higher stroke index
    postings: Vec<Vec<Posting>>,
}

impl SpansState {
    fn add_span(&mut self, stroke: usize, span: Span, right_direction: bool) {
        let bonus = if right_direction { SCORE_RIGHT_DIRECTION } else { 0 };
        for start_x in neighbourhood(span.start_x) {
            for start_y in neighbourhood(span.start_y) {
                for end_x in neighbourhood(span.end_x) {
                    for end_y in neighbourhood(span.end_y) {
                        let score = endpoint_score(span.start_x, span.start_y, start_x, start_y)
                            + endpoint_score(span.end_x, span.end_y, end_x, end_y)
                            + bonus;
                        let index = Span {
                            start_x,
                            start_y,
                            end_x,
                            end_y,
                        }
                        .index();
                        self.postings[index].push(Posting { stroke, score });
                    }
                }
            }
        }
    }

    fn freeze(&mut self) {
        for list in self.postings.iter_mut() {
            list.sort_by(|a, b| b.score.cmp(&a.score).then(b.stroke.cmp(&a.stroke)));
            list.dedup();
            list.shrink_to_fit();
        }
    }

    // First unused drawn stroke posted at `index` with at least `required` score
    fn find_match(&self, index: usize, required: u32, used: &[bool]) -> Option<usize> {
        for posting in &self.postings[index] {
            if posting.score < required {
                return None;
            }
            if !used[posting.stroke] {
                return Some(posting.stroke);
            }
        }
        None
    }
}

/// Matches strokes in any order by the coarse cells they start and end in.
///
/// Much faster than the fuzzy comparer, though noticeably less accurate.
pub struct SpansComparer {
    state: Option<SpansState>,
}

impl SpansComparer {
    pub fn new() -> SpansComparer {
        SpansComparer { state: None }
    }
}

impl Default for SpansComparer {
    fn default() -> Self {
        SpansComparer::new()
    }
}

impl Comparer for SpansComparer {
    fn init(&mut self, reference: &CharacterRecord) -> RecogResult<()> {
        if self.state.is_some() {
            return Err(already_initialized("spans"));
        }
        let mut state = SpansState {
            count: reference.stroke_count(),
            postings: vec![Vec::new(); TABLE_SIZE],
        };
        for (i, stroke) in reference.strokes().iter().enumerate() {
            let span = Span::of(stroke);
            state.add_span(i, span, true);
            state.add_span(i, span.reversed(), false);
        }
        state.freeze();
        self.state = Some(state);
        Ok(())
    }

    fn score(&self, candidate: &CharacterRecord) -> RecogResult<f32> {
        let state = self.state.as_ref().ok_or_else(|| not_initialized("spans"))?;
        let other_count = candidate.stroke_count();
        if state.count == 0 || other_count == 0 {
            return Ok(0f32);
        }

        let indexes: Vec<usize> = candidate.strokes().iter().map(|s| Span::of(s).index()).collect();
        let mut used = vec![false; state.count];
        let mut other_used = vec![false; other_count];
        let mut unmatched = state.count;
        let mut other_unmatched = other_count;
        let mut score = 0u32;

        'thresholds: for required in (MIN_SCORE..=MAX_SCORE).rev() {
            for (i, index) in indexes.iter().enumerate() {
                if other_used[i] {
                    continue;
                }
                if let Some(stroke) = state.find_match(*index, required, &used) {
                    score += required;
                    other_used[i] = true;
                    used[stroke] = true;
                    unmatched -= 1;
                    other_unmatched -= 1;
                    if unmatched == 0 || other_unmatched == 0 {
                        break 'thresholds;
                    }
                }
            }
        }

        let max_score = state.count.min(other_count) as u32 * MAX_SCORE;
        Ok(100f32 * score as f32 / max_score as f32)
    }
}
