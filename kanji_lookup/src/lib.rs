//! Handwritten kanji recognition from stroke geometry.
//!
//! Drawn strokes are reduced to straight lines, normalized into a 0..255
//! square and compared against a repository of known characters with one of
//! several comparers, from the fast but order-sensitive strict comparer to the
//! slow, order-independent fuzzy one.

extern crate bincode;
extern crate serde_derive;

mod character;
mod comparer;
mod config;
mod error;
mod input_stroke;
mod match_collector;
mod repository;
mod stroke;
mod summary;

#[cfg(feature = "wasm")]
mod wasm;

pub use character::{CharacterBuilder, CharacterRecord, RecordData, RecordId};
pub use comparer::{
    compare_arrays, fill_counts, Algorithm, Comparer, ComparerKind, DotsComparer, FuzzyComparer, KanjiComparer,
    SpansComparer, StrictComparer,
};
pub use config::MatchConfig;
pub use error::{RecogError, RecogResult};
pub use input_stroke::{normalize, InputStroke};
pub use match_collector::{prune, Match, MatchCollector};
pub use repository::{no_progress, Progress, Repository, Snapshot, SNAPSHOT_VERSION};
pub use stroke::{quantize, Direction, Location, Stroke};
pub use summary::{
    format_direction_summary, format_stroke_summary, parse_direction_summary, parse_stroke_summary, DirectionSummary,
};

#[cfg(feature = "wasm")]
pub use wasm::Recognizer;

/// Normalizes raw drawn strokes and ranks the repository against them.
pub fn lookup(repository: &Repository, strokes: &[InputStroke], algorithm: Algorithm) -> RecogResult<Vec<Match>> {
    let mut builder = CharacterBuilder::new("?");
    for stroke in strokes {
        builder.add_stroke(*stroke);
    }
    let drawn = builder.finish()?;
    let res = repository.get_top_matches(&drawn, algorithm, &no_progress);
    // The drawn record is gone after this call
    repository.forget(drawn.id());
    res
}
