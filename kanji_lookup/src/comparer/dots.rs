use super::super::character::CharacterRecord;
use super::super::error::RecogResult;
use super::{already_initialized, not_initialized, Comparer};

/// Number of equal ranges each axis is split into
pub const NUM_RANGES: usize = 5;

type Counts = [u32; NUM_RANGES];

fn range_of(value: u8) -> usize {
    (value as usize * NUM_RANGES) >> 8
}

/// Histograms of where stroke endpoints fall along X and Y.
pub fn fill_counts(record: &CharacterRecord) -> (Counts, Counts) {
    let mut counts_x = [0u32; NUM_RANGES];
    let mut counts_y = [0u32; NUM_RANGES];
    for stroke in record.strokes() {
        counts_x[range_of(stroke.start_x())] += 1;
        counts_y[range_of(stroke.start_y())] += 1;
        counts_x[range_of(stroke.end_x())] += 1;
        counts_y[range_of(stroke.end_y())] += 1;
    }
    (counts_x, counts_y)
}

// Moves up to `remaining` leftovers against the other side's leftovers in `slot`; returns the amount matched
fn take_from(left: &mut [u32], slot: usize, remaining: u32) -> u32 {
    let taken = left[slot].min(remaining);
    left[slot] -= taken;
    taken
}

/// Similarity of two equal-length histograms, 0 to 1.
///
/// Counts in the same slot earn two points each. Whatever is left over on the
/// first side may then pair up with leftovers in a neighbouring slot of the
/// second side (left neighbour first) for one point each. With `wrap` set the
/// first and last slots are neighbours. The total is divided by twice the
/// smaller of the two sums. Two empty histograms match perfectly.
pub fn compare_arrays(counts1: &[u32], counts2: &[u32], wrap: bool) -> f32 {
    debug_assert_eq!(counts1.len(), counts2.len());
    let n = counts1.len().min(counts2.len());
    let mut left1 = vec![0u32; n];
    let mut left2 = vec![0u32; n];
    let mut total1 = 0u32;
    let mut total2 = 0u32;
    let mut score = 0u32;

    // Remove exact matches
    for i in 0..n {
        let (count1, count2) = (counts1[i], counts2[i]);
        total1 += count1;
        total2 += count2;
        score += count1.min(count2);
        left1[i] = count1.saturating_sub(count2);
        left2[i] = count2.saturating_sub(count1);
    }
    if total1 == 0 && total2 == 0 {
        return 1f32;
    }
    score *= 2;

    for i in 0..n {
        let mut remaining = left1[i];
        if remaining == 0 {
            continue;
        }
        if i > 0 {
            let taken = take_from(&mut left2, i - 1, remaining);
            score += taken;
            remaining -= taken;
        } else if wrap {
            let taken = take_from(&mut left2, n - 1, remaining);
            score += taken;
            remaining -= taken;
        }
        if remaining > 0 {
            if i + 1 < n {
                score += take_from(&mut left2, i + 1, remaining);
            } else if wrap {
                score += take_from(&mut left2, 0, remaining);
            }
        }
    }

    let max_score = total1.min(total2) * 2;
    if max_score == 0 {
        return 0f32;
    }
    score as f32 / max_score as f32
}

/// Compares point histograms only; very fast, very rough.
pub struct DotsComparer {
    counts: Option<(Counts, Counts)>,
}

impl DotsComparer {
    pub fn new() -> DotsComparer {
        DotsComparer { counts: None }
    }
}

impl Default for DotsComparer {
    fn default() -> Self {
        DotsComparer::new()
    }
}

impl Comparer for DotsComparer {
    fn init(&mut self, reference: &CharacterRecord) -> RecogResult<()> {
        if self.counts.is_some() {
            return Err(already_initialized("dots"));
        }
        self.counts = Some(fill_counts(reference));
        Ok(())
    }

    fn score(&self, candidate: &CharacterRecord) -> RecogResult<f32> {
        let (counts_x, counts_y) = self.counts.as_ref().ok_or_else(|| not_initialized("dots"))?;
        let (other_x, other_y) = fill_counts(candidate);
        let score = compare_arrays(counts_x, &other_x, false) + compare_arrays(counts_y, &other_y, false);
        Ok(score * 100f32 / 2f32)
    }
}
