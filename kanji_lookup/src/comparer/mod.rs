//! Scoring strategies comparing a drawn character against candidates.
//!
//! A comparer is initialised once with the drawn (reference) character, which
//! lets it precompute whatever it needs, and then scores any number of
//! candidates in 0..=100, higher meaning more similar. Scoring only reads the
//! precomputed state, so one comparer can be shared across threads.

mod dots;
mod fuzzy;
mod spans;
mod strict;

pub use self::dots::{compare_arrays, fill_counts, DotsComparer};
pub use self::fuzzy::FuzzyComparer;
pub use self::spans::SpansComparer;
pub use self::strict::StrictComparer;

use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::character::CharacterRecord;
use super::config::MatchConfig;
use super::error::{RecogError, RecogResult};

pub trait Comparer: Send + Sync {
    /// Precomputes state for the drawn character. May only be called once.
    fn init(&mut self, reference: &CharacterRecord) -> RecogResult<()>;

    /// Scores a candidate against the drawn character, 0 to 100.
    fn score(&self, candidate: &CharacterRecord) -> RecogResult<f32>;
}

pub(crate) fn already_initialized(name: &str) -> RecogError {
    RecogError::State(format!("{} comparer initialised twice", name))
}

pub(crate) fn not_initialized(name: &str) -> RecogError {
    RecogError::State(format!("{} comparer used before init", name))
}

/// The scoring implementation behind an algorithm.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparerKind {
    Strict,
    Dots,
    Spans,
    Fuzzy,
}

/// Match algorithm: a comparer plus the stroke-count band it searches.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    /// Fast but needs exact stroke count and order
    Strict,
    /// Point histograms; very fast and poor
    Dots,
    /// Any stroke order; slow
    Fuzzy,
    /// As fuzzy, for characters with one stroke more or fewer (not the same count)
    Fuzzy1Out,
    /// As fuzzy, two strokes more or fewer
    Fuzzy2Out,
    /// Any stroke order, based on the span each stroke covers
    Spans,
    Spans1Out,
    Spans2Out,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Strict,
        Algorithm::Dots,
        Algorithm::Fuzzy,
        Algorithm::Fuzzy1Out,
        Algorithm::Fuzzy2Out,
        Algorithm::Spans,
        Algorithm::Spans1Out,
        Algorithm::Spans2Out,
    ];

    /// How many strokes away from the drawn count the searched characters are
    pub fn out(self) -> usize {
        match self {
            Algorithm::Fuzzy1Out | Algorithm::Spans1Out => 1,
            Algorithm::Fuzzy2Out | Algorithm::Spans2Out => 2,
            _ => 0,
        }
    }

    pub fn kind(self) -> ComparerKind {
        match self {
            Algorithm::Strict => ComparerKind::Strict,
            Algorithm::Dots => ComparerKind::Dots,
            Algorithm::Fuzzy | Algorithm::Fuzzy1Out | Algorithm::Fuzzy2Out => ComparerKind::Fuzzy,
            Algorithm::Spans | Algorithm::Spans1Out | Algorithm::Spans2Out => ComparerKind::Spans,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Strict => "strict",
            Algorithm::Dots => "dots",
            Algorithm::Fuzzy => "fuzzy",
            Algorithm::Fuzzy1Out => "fuzzy-1out",
            Algorithm::Fuzzy2Out => "fuzzy-2out",
            Algorithm::Spans => "spans",
            Algorithm::Spans1Out => "spans-1out",
            Algorithm::Spans2Out => "spans-2out",
        }
    }

    /// Stroke counts searched for a drawn character with `stroke_count` strokes.
    pub fn band(self, stroke_count: usize) -> Vec<usize> {
        if stroke_count == 0 {
            return Vec::new();
        }
        let out = self.out();
        if out == 0 {
            return vec![stroke_count];
        }
        let mut counts = Vec::with_capacity(2);
        if stroke_count > out {
            counts.push(stroke_count - out);
        }
        counts.push(stroke_count + out);
        counts
    }

    /// Builds a comparer for this algorithm, already initialised with `drawn`.
    pub fn new_comparer(self, drawn: &CharacterRecord, config: &MatchConfig) -> RecogResult<KanjiComparer> {
        let mut comparer = KanjiComparer::new(self.kind(), config);
        comparer.init(drawn)?;
        Ok(comparer)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = RecogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Algorithm::ALL
            .iter()
            .find(|algo| algo.name() == wanted)
            .copied()
            .ok_or_else(|| RecogError::UnknownAlgorithm(s.to_string()))
    }
}

/// The closed set of comparers, dispatched by variant.
pub enum KanjiComparer {
    Strict(StrictComparer),
    Dots(DotsComparer),
    Spans(SpansComparer),
    Fuzzy(FuzzyComparer),
}

impl KanjiComparer {
    /// Creates an uninitialised comparer of the given kind.
    pub fn new(kind: ComparerKind, config: &MatchConfig) -> KanjiComparer {
        match kind {
            ComparerKind::Strict => KanjiComparer::Strict(StrictComparer::new()),
            ComparerKind::Dots => KanjiComparer::Dots(DotsComparer::new()),
            ComparerKind::Spans => KanjiComparer::Spans(SpansComparer::new()),
            ComparerKind::Fuzzy => KanjiComparer::Fuzzy(FuzzyComparer::with_top_k(config.fuzzy_top_k)),
        }
    }

    pub fn kind(&self) -> ComparerKind {
        match self {
            KanjiComparer::Strict(_) => ComparerKind::Strict,
            KanjiComparer::Dots(_) => ComparerKind::Dots,
            KanjiComparer::Spans(_) => ComparerKind::Spans,
            KanjiComparer::Fuzzy(_) => ComparerKind::Fuzzy,
        }
    }
}

impl Comparer for KanjiComparer {
    fn init(&mut self, reference: &CharacterRecord) -> RecogResult<()> {
        match self {
            KanjiComparer::Strict(c) => c.init(reference),
            KanjiComparer::Dots(c) => c.init(reference),
            KanjiComparer::Spans(c) => c.init(reference),
            KanjiComparer::Fuzzy(c) => c.init(reference),
        }
    }

    fn score(&self, candidate: &CharacterRecord) -> RecogResult<f32> {
        match self {
            KanjiComparer::Strict(c) => c.score(candidate),
            KanjiComparer::Dots(c) => c.score(candidate),
            KanjiComparer::Spans(c) => c.score(candidate),
            KanjiComparer::Fuzzy(c) => c.score(candidate),
        }
    }
}
