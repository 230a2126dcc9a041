use serde_derive::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::error::{RecogError, RecogResult};

/// One ranked result.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Match {
    pub character: String,
    pub score: f32,
}

impl Match {
    pub fn new(character: &str, score: f32) -> Match {
        Match {
            character: character.to_string(),
            score,
        }
    }

    /// Result order: higher score first, then character.
    ///
    /// Characters compare by Unicode code point, so on a tie a supplementary
    /// plane character such as U+2000B sorts after U+E000..=U+FFFF, unlike
    /// UTF-16 code unit order.
    pub fn rank_cmp(&self, other: &Match) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.character.cmp(&other.character))
    }
}

/// Files matches into a vector kept in result order, one entry per character.
pub struct MatchCollector<'a> {
    max: Option<usize>,
    matches: &'a mut Vec<Match>,
}

impl<'a> MatchCollector<'a> {
    pub fn new(matches: &'a mut Vec<Match>, max: Option<usize>) -> RecogResult<MatchCollector<'a>> {
        if max == Some(0) {
            return Err(RecogError::Argument(
                "expected a positive number for the maximum number of matches".to_string(),
            ));
        }
        if !matches.is_empty() {
            return Err(RecogError::Argument("the pre-existing matches vector must be empty".to_string()));
        }
        Ok(MatchCollector { max, matches })
    }

    fn remove_existing_lower(&mut self, mc: &Match) -> bool {
        let ix = match self.matches.iter().position(|x| x.character == mc.character) {
            Some(ix) => ix,
            // Not there yet: match doesn't need to be skipped
            None => return false,
        };
        // New score is not better: skip new match
        if mc.score <= self.matches[ix].score {
            return true;
        }
        self.matches.remove(ix);
        false
    }

    pub fn file_match(&mut self, mc: Match) {
        // Already at limit: don't bother if the new match ranks after the current last
        if let (Some(max), Some(last)) = (self.max, self.matches.last()) {
            if self.matches.len() == max && mc.rank_cmp(last) != Ordering::Less {
                return;
            }
        }
        // If we get "true", the character is already there with a higher score
        if self.remove_existing_lower(&mc) {
            return;
        }
        let ix = self.matches.iter().position(|x| mc.rank_cmp(x) == Ordering::Less);
        match ix {
            Some(ix) => self.matches.insert(ix, mc),
            None => self.matches.push(mc),
        }
        if let Some(max) = self.max {
            self.matches.truncate(max);
        }
    }
}

/// Keeps the first match and every following one scoring at least `ratio` of it.
///
/// Expects `matches` in result order; stops at the first match below the bound.
pub fn prune(matches: &mut Vec<Match>, ratio: f32) {
    let top = match matches.first() {
        Some(top) => top.score,
        None => return,
    };
    let bound = top * ratio;
    let keep = matches
        .iter()
        .skip(1)
        .position(|m| m.score < bound)
        .map_or(matches.len(), |ix| ix + 1);
    matches.truncate(keep);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fail() {
        let mut matches: Vec<Match> = Vec::new();
        assert!(matches!(MatchCollector::new(&mut matches, Some(0)), Err(RecogError::Argument(_))));
        matches.push(Match::new("我", 1.0));
        assert!(matches!(MatchCollector::new(&mut matches, Some(1)), Err(RecogError::Argument(_))));
    }

    #[test]
    fn test_filing() {
        let mut matches: Vec<Match> = Vec::new();
        let mut collector = MatchCollector::new(&mut matches, Some(3)).unwrap();
        collector.file_match(Match::new("我", 80.0));
        collector.file_match(Match::new("你", 90.0));
        collector.file_match(Match::new("我", 70.0));
        collector.file_match(Match::new("他", 70.0));
        collector.file_match(Match::new("鸡", 100.0));
        assert_eq!(
            matches,
            [Match::new("鸡", 100.0), Match::new("你", 90.0), Match::new("我", 80.0)]
        );
    }

    #[test]
    fn test_better_score_replaces_character() {
        let mut matches: Vec<Match> = Vec::new();
        let mut collector = MatchCollector::new(&mut matches, None).unwrap();
        collector.file_match(Match::new("木", 40.0));
        collector.file_match(Match::new("本", 60.0));
        collector.file_match(Match::new("木", 75.0));
        assert_eq!(matches, [Match::new("木", 75.0), Match::new("本", 60.0)]);
    }

    #[test]
    fn test_ties_order_by_character() {
        let mut matches: Vec<Match> = Vec::new();
        let mut collector = MatchCollector::new(&mut matches, Some(2)).unwrap();
        collector.file_match(Match::new("c", 50.0));
        collector.file_match(Match::new("a", 50.0));
        collector.file_match(Match::new("b", 50.0));
        assert_eq!(matches, [Match::new("a", 50.0), Match::new("b", 50.0)]);
    }

    #[test]
    fn test_prune() {
        let mut matches = vec![
            Match::new("a", 80.0),
            Match::new("b", 70.0),
            Match::new("c", 60.0),
            Match::new("d", 59.9),
            Match::new("e", 59.0),
        ];
        prune(&mut matches, 0.75);
        assert_eq!(3, matches.len());
        assert_eq!("c", matches[2].character);

        let mut single = vec![Match::new("a", 0.0)];
        prune(&mut single, 0.75);
        assert_eq!(1, single.len());

        let mut empty: Vec<Match> = Vec::new();
        prune(&mut empty, 0.75);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_ties_use_code_point_order() {
        let bmp = Match::new("\u{FF5E}", 50f32);
        let astral = Match::new("\u{2000B}", 50f32);
        assert_eq!(Ordering::Less, bmp.rank_cmp(&astral));
        let mut matches: Vec<Match> = Vec::new();
        let mut collector = MatchCollector::new(&mut matches, None).unwrap();
        collector.file_match(astral.clone());
        collector.file_match(bmp.clone());
        assert_eq!(vec![bmp, astral], matches);
    }
}
