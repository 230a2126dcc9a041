//! Order-independent comparison working on stroke endpoints.
//!
//! Every stroke is a pair of points (start, end). Each point is described by
//! where the other points of its own character lie relative to it: how many
//! are clearly left of it, clearly right of it, or level with it in X, and the
//! same in Y. Points of the drawn and candidate characters are scored against
//! each other by how similar those six counts are. Drawn pairs are then bound
//! greedily, best first, to two still unused candidate points.

use log::trace;

use super::super::character::CharacterRecord;
use super::super::error::RecogResult;
use super::{already_initialized, not_initialized, Comparer};

// Points within this many units (0..255 scale) count as level with each other
const SIMILAR_RANGE: i32 = 13;
const FEATURE_COUNT: usize = 6;

const SCOREMULTI_NOT_PAIR: f32 = 0.9;
const SCOREMULTI_WRONG_DIRECTION: f32 = 0.97;
const SCOREMULTI_WRONG_COUNT: f32 = 0.98;

pub const DEFAULT_TOP_K: usize = 5;

/// x less, x more, x similar, y less, y more, y similar
type Features = [i32; FEATURE_COUNT];

// Endpoints in pair order: point 2i is the start of stroke i, 2i + 1 its end
fn collect_points(record: &CharacterRecord) -> Vec<(i32, i32)> {
    let mut points = Vec::with_capacity(record.stroke_count() * 2);
    for stroke in record.strokes() {
        points.push((stroke.start_x() as i32, stroke.start_y() as i32));
        points.push((stroke.end_x() as i32, stroke.end_y() as i32));
    }
    points
}

fn tally(value: i32, other: i32, features: &mut Features, offset: usize) {
    if other < value - SIMILAR_RANGE {
        features[offset] += 1;
    } else if other > value + SIMILAR_RANGE {
        features[offset + 1] += 1;
    } else {
        features[offset + 2] += 1;
    }
}

fn point_features(record: &CharacterRecord) -> Vec<Features> {
    let points = collect_points(record);
    let mut res = Vec::with_capacity(points.len());
    for (i, &(x, y)) in points.iter().enumerate() {
        let mut features = [0; FEATURE_COUNT];
        for (j, &(other_x, other_y)) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            tally(x, other_x, &mut features, 0);
            tally(y, other_y, &mut features, 3);
        }
        res.push(features);
    }
    res
}

fn feature_difference(a: &Features, b: &Features) -> i32 {
    a.iter().zip(b.iter()).map(|(a, b)| (a - b).abs()).sum()
}

/// Visiting order for candidates: the `top_k` best scores first (best first,
/// earlier index on ties), then everything else in index order.
///
/// Only the head is ordered; a full sort per point is not worth it when the
/// greedy search usually settles within the first few candidates.
pub fn rank_candidates(scores: &[i32], top_k: usize) -> Vec<usize> {
    let k = top_k.min(scores.len());
    let mut top: Vec<usize> = Vec::with_capacity(k + 1);
    for (i, score) in scores.iter().enumerate() {
        let pos = top.iter().position(|&j| *score > scores[j]).unwrap_or(top.len());
        if pos < k {
            top.insert(pos, i);
            top.truncate(k);
        }
    }
    let mut order = top.clone();
    order.extend((0..scores.len()).filter(|i| !top.contains(i)));
    order
}

#[derive(Debug, Clone, Copy)]
struct PairMatch {
    score: f32,
    // Candidate points bound to the drawn start and end point
    a: usize,
    b: usize,
}

// Per-query working data for one drawn pair
struct PairScratch {
    a: usize,
    b: usize,
    max_a: i32,
    max_b: i32,
    cached: Option<PairMatch>,
}

// Point scores of one query: drawn point x candidate point, plus visiting orders
struct PointScores {
    scores: Vec<Vec<i32>>,
    ranked: Vec<Vec<usize>>,
}

fn combine(a_score: i32, b_score: i32, a: usize, b: usize) -> f32 {
    let score = (a_score + b_score) as f32;
    if a / 2 != b / 2 {
        score * SCOREMULTI_NOT_PAIR
    } else if a % 2 == 1 {
        score * SCOREMULTI_WRONG_DIRECTION
    } else {
        score
    }
}

impl PairScratch {
    fn new(pair: usize, points: &PointScores) -> PairScratch {
        let a = pair * 2;
        let b = a + 1;
        PairScratch {
            a,
            b,
            max_a: points.scores[a].iter().copied().max().unwrap_or(0),
            max_b: points.scores[b].iter().copied().max().unwrap_or(0),
            cached: None,
        }
    }

    // Best binding to two available candidate points, ignoring anything that
    // cannot beat `must_be_over`. None when nothing could.
    fn best_available(&mut self, points: &PointScores, available: &[bool], must_be_over: f32) -> Option<PairMatch> {
        if let Some(cached) = self.cached {
            if available[cached.a] && available[cached.b] {
                return Some(cached);
            }
            self.cached = None;
        }
        if ((self.max_a + self.max_b) as f32) < must_be_over {
            return None;
        }

        let a_scores = &points.scores[self.a];
        let b_scores = &points.scores[self.b];
        let mut bound = must_be_over;
        let mut best: Option<PairMatch> = None;
        for &a in &points.ranked[self.a] {
            let a_score = a_scores[a];
            if !available[a] || ((a_score + self.max_b) as f32) < bound {
                continue;
            }
            for &b in &points.ranked[self.b] {
                if b == a || !available[b] {
                    continue;
                }
                let score = combine(a_score, b_scores[b], a, b);
                if best.map_or(true, |best| score > best.score) {
                    best = Some(PairMatch { score, a, b });
                    if score > bound {
                        bound = score;
                    }
                }
            }
        }

        // Only a result at or above the starting bound is known to be the true best
        if let Some(found) = best {
            if found.score >= must_be_over {
                self.cached = Some(found);
            }
        }
        best
    }
}

struct FuzzyState {
    pairs: usize,
    features: Vec<Features>,
}

/// Slow but accurate; stroke order and direction hardly matter.
pub struct FuzzyComparer {
    top_k: usize,
    state: Option<FuzzyState>,
}

impl FuzzyComparer {
    pub fn new() -> FuzzyComparer {
        FuzzyComparer::with_top_k(DEFAULT_TOP_K)
    }

    /// `top_k` is how many best candidate points are ranked up front per drawn point.
    ///
    /// With 0 the candidates are visited in index order.
    pub fn with_top_k(top_k: usize) -> FuzzyComparer {
        FuzzyComparer {
            top_k,
            state: None,
        }
    }
}

impl Default for FuzzyComparer {
    fn default() -> Self {
        FuzzyComparer::new()
    }
}

impl Comparer for FuzzyComparer {
    fn init(&mut self, reference: &CharacterRecord) -> RecogResult<()> {
        if self.state.is_some() {
            return Err(already_initialized("fuzzy"));
        }
        self.state = Some(FuzzyState {
            pairs: reference.stroke_count(),
            features: point_features(reference),
        });
        Ok(())
    }

    fn score(&self, candidate: &CharacterRecord) -> RecogResult<f32> {
        let state = self.state.as_ref().ok_or_else(|| not_initialized("fuzzy"))?;
        let other_pairs = candidate.stroke_count();
        if state.pairs == 0 || other_pairs == 0 {
            return Ok(0f32);
        }

        let other_features = point_features(candidate);
        // Feature differences always stay below this
        let max_score = (state.features.len().max(other_features.len()) * FEATURE_COUNT) as i32;
        let scores: Vec<Vec<i32>> = state
            .features
            .iter()
            .map(|drawn| {
                other_features
                    .iter()
                    .map(|other| max_score - feature_difference(drawn, other))
                    .collect()
            })
            .collect();
        let ranked = scores.iter().map(|row| rank_candidates(row, self.top_k)).collect();
        let points = PointScores { scores, ranked };

        let mut scratch: Vec<PairScratch> = (0..state.pairs).map(|p| PairScratch::new(p, &points)).collect();
        let mut remaining = vec![true; state.pairs];
        let mut available = vec![true; other_features.len()];
        let mut pairs_left = state.pairs;
        let mut points_left = other_features.len();
        let mut total = 0f32;

        while pairs_left > 0 && points_left >= 2 {
            let mut chosen: Option<(usize, PairMatch)> = None;
            let mut best_score = -1f32;
            for (p, pair) in scratch.iter_mut().enumerate() {
                if !remaining[p] {
                    continue;
                }
                if let Some(found) = pair.best_available(&points, &available, best_score) {
                    if found.score > best_score {
                        best_score = found.score;
                        chosen = Some((p, found));
                    }
                }
            }
            let (p, found) = match chosen {
                Some(chosen) => chosen,
                None => break,
            };
            trace!("fuzzy: pair {} -> points {},{} score {}", p, found.a, found.b, found.score);
            remaining[p] = false;
            available[found.a] = false;
            available[found.b] = false;
            total += found.score;
            pairs_left -= 1;
            points_left -= 2;
        }

        let matched = state.pairs - pairs_left;
        if matched == 0 {
            return Ok(0f32);
        }
        let mut score = total / (2 * max_score * matched as i32) as f32;
        let count_difference = (state.pairs as i32 - other_pairs as i32).abs();
        score *= SCOREMULTI_WRONG_COUNT.powi(count_difference);
        Ok(score * 100f32)
    }
}
