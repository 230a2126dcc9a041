//! Character database grouped by stroke count, and the ranking entry point.

mod snapshot;

pub use self::snapshot::{Snapshot, SNAPSHOT_VERSION};

use log::{debug, trace};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::character::{CharacterRecord, RecordId};
use super::comparer::{Algorithm, Comparer, ComparerKind, KanjiComparer};
use super::config::MatchConfig;
use super::error::{RecogError, RecogResult};
use super::match_collector::{prune, Match, MatchCollector};

/// Receives `(done, total)` after each scored candidate.
///
/// May be called from several scoring threads at once, so keep it quick.
pub trait Progress: Sync {
    fn progress(&self, done: usize, total: usize);
}

impl<F> Progress for F
where
    F: Fn(usize, usize) + Sync,
{
    fn progress(&self, done: usize, total: usize) {
        self(done, total)
    }
}

/// Progress sink that ignores everything.
pub fn no_progress(_done: usize, _total: usize) {}

// Initialised comparers for recently drawn characters
struct ComparerCache {
    capacity: usize,
    entries: HashMap<(RecordId, ComparerKind), Arc<KanjiComparer>>,
}

impl ComparerCache {
    fn get(&self, key: &(RecordId, ComparerKind)) -> Option<Arc<KanjiComparer>> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: (RecordId, ComparerKind), comparer: Arc<KanjiComparer>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            debug!("comparer cache full ({} entries), clearing", self.entries.len());
            self.entries.clear();
        }
        self.entries.insert(key, comparer);
    }
}

pub struct Repository {
    buckets: BTreeMap<usize, Vec<CharacterRecord>>,
    config: MatchConfig,
    cache: Mutex<ComparerCache>,
}

impl Default for Repository {
    fn default() -> Self {
        Repository::new()
    }
}

impl Repository {
    pub fn new() -> Repository {
        Repository::build(MatchConfig::default())
    }

    /// Empty repository using `config`, which is validated first.
    pub fn with_config(config: MatchConfig) -> RecogResult<Repository> {
        config.validate()?;
        Ok(Repository::build(config))
    }

    fn build(config: MatchConfig) -> Repository {
        let capacity = config.cache_capacity;
        Repository {
            buckets: BTreeMap::new(),
            config,
            cache: Mutex::new(ComparerCache {
                capacity,
                entries: HashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Files a record under its stroke count. Records without strokes are rejected.
    pub fn add(&mut self, record: CharacterRecord) -> RecogResult<()> {
        let count = record.stroke_count();
        if count == 0 {
            return Err(RecogError::Argument(format!(
                "character ({}) has no strokes",
                record.character()
            )));
        }
        self.buckets.entry(count).or_default().push(record);
        Ok(())
    }

    /// All records with exactly `stroke_count` strokes.
    pub fn query(&self, stroke_count: usize) -> &[CharacterRecord] {
        self.buckets.get(&stroke_count).map(|b| b.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Stroke counts that have at least one record, ascending.
    pub fn stroke_counts(&self) -> Vec<usize> {
        self.buckets.keys().copied().collect()
    }

    /// Every record, by ascending stroke count then insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterRecord> {
        self.buckets.values().flat_map(|b| b.iter())
    }

    fn lock_cache(&self) -> MutexGuard<'_, ComparerCache> {
        // The cache only holds finished comparers, so a poisoned lock is still usable
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn clear_cache(&self) {
        self.lock_cache().entries.clear();
    }

    /// Drops cached comparers built for `id`.
    pub fn forget(&self, id: RecordId) {
        self.lock_cache().entries.retain(|(key_id, _), _| *key_id != id);
    }

    fn comparer_for(&self, drawn: &CharacterRecord, algorithm: Algorithm) -> RecogResult<Arc<KanjiComparer>> {
        let key = (drawn.id(), algorithm.kind());
        if let Some(comparer) = self.lock_cache().get(&key) {
            debug!("comparer cache hit for {:?}", key);
            return Ok(comparer);
        }
        debug!("comparer cache miss for {:?}", key);
        // Built outside the lock; a racing query may build the same comparer twice
        let comparer = Arc::new(algorithm.new_comparer(drawn, &self.config)?);
        self.lock_cache().insert(key, Arc::clone(&comparer));
        Ok(comparer)
    }

    /// Ranks stored characters against a drawn one.
    ///
    /// Searches the stroke-count band of `algorithm`, keeps non-negative
    /// scores, sorts best first (ties by character) and drops everything after
    /// the first match scoring below `prune_ratio` times the best.
    pub fn get_top_matches(
        &self,
        drawn: &CharacterRecord,
        algorithm: Algorithm,
        progress: &dyn Progress,
    ) -> RecogResult<Vec<Match>> {
        let band = algorithm.band(drawn.stroke_count());
        let candidates: Vec<&CharacterRecord> = band.iter().flat_map(|count| self.query(*count)).collect();
        debug!(
            "{}: {} strokes drawn, searching counts {:?}, {} candidates",
            algorithm,
            drawn.stroke_count(),
            band,
            candidates.len()
        );
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let comparer = self.comparer_for(drawn, algorithm)?;
        let scores = self.score_candidates(&comparer, &candidates, progress)?;

        let mut matches: Vec<Match> = Vec::new();
        let mut collector = MatchCollector::new(&mut matches, self.config.max_results)?;
        for (candidate, score) in candidates.iter().zip(scores) {
            trace!("{} {}: {}", algorithm, candidate.character(), score);
            if score >= 0f32 {
                collector.file_match(Match::new(candidate.character(), score));
            }
        }
        let before = matches.len();
        prune(&mut matches, self.config.prune_ratio);
        debug!("{}: kept {} of {} matches", algorithm, matches.len(), before);
        Ok(matches)
    }

    /// As `get_top_matches`, with the algorithm given by name.
    pub fn get_top_matches_named(
        &self,
        drawn: &CharacterRecord,
        algorithm: &str,
        progress: &dyn Progress,
    ) -> RecogResult<Vec<Match>> {
        self.get_top_matches(drawn, algorithm.parse()?, progress)
    }

    fn score_candidates(
        &self,
        comparer: &KanjiComparer,
        candidates: &[&CharacterRecord],
        progress: &dyn Progress,
    ) -> RecogResult<Vec<f32>> {
        let total = candidates.len();
        let done = AtomicUsize::new(0);
        let score_one = |candidate: &CharacterRecord| -> RecogResult<f32> {
            let score = comparer.score(candidate)?;
            progress.progress(done.fetch_add(1, Ordering::Relaxed) + 1, total);
            Ok(score)
        };

        if total >= self.config.parallel_threshold {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                return candidates.par_iter().map(|c| score_one(*c)).collect();
            }
        }
        candidates.iter().map(|c| score_one(*c)).collect()
    }
}
