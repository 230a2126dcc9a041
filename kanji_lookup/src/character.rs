use serde_derive::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use super::error::{RecogError, RecogResult};
use super::input_stroke::{normalize, InputStroke};
use super::stroke::{Direction, Location, Stroke};
use super::summary;

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one finished record; used to key cached comparers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(u64);

impl RecordId {
    fn next() -> RecordId {
        RecordId(NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Persisted form of a record: the character and its stroke summary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecordData {
    #[serde(rename = "char")]
    pub character: String,
    pub strokes: String,
}

/// Collects raw strokes for one character; `finish` turns them into a record.
#[derive(Debug, Clone)]
pub struct CharacterBuilder {
    character: String,
    strokes: Vec<InputStroke>,
}

impl CharacterBuilder {
    pub fn new(character: &str) -> CharacterBuilder {
        CharacterBuilder {
            character: character.to_string(),
            strokes: Vec::new(),
        }
    }

    pub fn add_stroke(&mut self, stroke: InputStroke) -> &mut CharacterBuilder {
        self.strokes.push(stroke);
        self
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Normalizes the collected strokes and derives all per-stroke features.
    pub fn finish(self) -> RecogResult<CharacterRecord> {
        let strokes = normalize(&self.strokes)?;
        Ok(CharacterRecord::from_strokes(&self.character, strokes))
    }
}

/// A finished character: normalized strokes plus their derived directions and locations.
#[derive(Debug)]
pub struct CharacterRecord {
    id: RecordId,
    character: String,
    strokes: Vec<Stroke>,
    directions: Vec<Direction>,
    starts: Vec<Location>,
    ends: Vec<Location>,
    // moves[i] is the pen movement from stroke i to stroke i + 1
    moves: Vec<Direction>,
}

impl CharacterRecord {
    /// Builds from already normalized strokes.
    pub fn from_strokes(character: &str, strokes: Vec<Stroke>) -> CharacterRecord {
        let directions = strokes.iter().map(|s| s.direction()).collect();
        let starts = strokes.iter().map(|s| s.start_location()).collect();
        let ends = strokes.iter().map(|s| s.end_location()).collect();
        let moves = strokes.windows(2).map(|w| w[1].move_direction(&w[0])).collect();
        CharacterRecord {
            id: RecordId::next(),
            character: character.to_string(),
            strokes,
            directions,
            starts,
            ends,
            moves,
        }
    }

    /// Builds from a stroke summary, skipping normalization.
    pub fn from_stroke_summary(character: &str, strokes: &str) -> RecogResult<CharacterRecord> {
        let strokes = summary::parse_stroke_summary(strokes)
            .map_err(|e| RecogError::Summary(format!("{} for character ({})", e, character)))?;
        Ok(CharacterRecord::from_strokes(character, strokes))
    }

    /// Builds from a stroke summary together with a previously stored direction summary.
    ///
    /// The directions are taken as given rather than recomputed, so a record
    /// persisted by an older build keeps the features it was saved with.
    pub fn from_summaries(character: &str, directions: &str, strokes: &str) -> RecogResult<CharacterRecord> {
        let strokes = summary::parse_stroke_summary(strokes)
            .map_err(|e| RecogError::Summary(format!("{} for character ({})", e, character)))?;
        let parsed = summary::parse_direction_summary(directions, strokes.len())
            .map_err(|e| RecogError::Summary(format!("{} for character ({})", e, character)))?;
        Ok(CharacterRecord {
            id: RecordId::next(),
            character: character.to_string(),
            strokes,
            directions: parsed.directions,
            starts: parsed.starts,
            ends: parsed.ends,
            moves: parsed.moves,
        })
    }

    pub fn from_data(data: &RecordData) -> RecogResult<CharacterRecord> {
        CharacterRecord::from_stroke_summary(&data.character, &data.strokes)
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// The character itself; usually one char, but may be a longer string
    pub fn character(&self) -> &str {
        &self.character
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    pub fn starts(&self) -> &[Location] {
        &self.starts
    }

    pub fn ends(&self) -> &[Location] {
        &self.ends
    }

    pub fn moves(&self) -> &[Direction] {
        &self.moves
    }

    pub fn stroke_summary(&self) -> String {
        summary::format_stroke_summary(&self.strokes)
    }

    pub fn direction_summary(&self) -> String {
        summary::format_direction_summary(&self.starts, &self.directions, &self.ends, &self.moves)
    }

    pub fn to_data(&self) -> RecordData {
        RecordData {
            character: self.character.clone(),
            strokes: self.stroke_summary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross() -> CharacterRecord {
        let mut builder = CharacterBuilder::new("x");
        builder
            .add_stroke(InputStroke::new(0.0, 0.0, 100.0, 100.0))
            .add_stroke(InputStroke::new(100.0, 0.0, 0.0, 100.0));
        builder.finish().unwrap()
    }

    #[test]
    fn test_basic() {
        let one = cross();
        assert_eq!("x", one.character());
        assert_eq!(2, one.stroke_count());
        assert_eq!("[0,0:255,255]", one.strokes()[0].to_string());
        assert_eq!("[255,0:0,255]", one.strokes()[1].to_string());
        assert_eq!("00,00-ff,ff:ff,00-00,ff", one.stroke_summary());
        assert_eq!(&[Direction::SE, Direction::SW], one.directions());
        assert_eq!(&[Location::NW, Location::NE], one.starts());
        assert_eq!(&[Location::SE, Location::SW], one.ends());
        // From bottom right up to top right
        assert_eq!(&[Direction::N], one.moves());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(cross().id(), cross().id());
    }

    #[test]
    fn test_summary_round_trip() {
        let one = cross();
        let loaded = CharacterRecord::from_stroke_summary("x", &one.stroke_summary()).unwrap();
        assert_eq!(one.strokes(), loaded.strokes());
        assert_eq!(one.direction_summary(), loaded.direction_summary());

        let restored = CharacterRecord::from_summaries("x", &one.direction_summary(), &one.stroke_summary()).unwrap();
        assert_eq!(one.directions(), restored.directions());
        assert_eq!(one.moves(), restored.moves());
        assert_eq!(one.starts(), restored.starts());
        assert_eq!(one.ends(), restored.ends());
    }

    #[test]
    fn test_invalid_summaries() {
        assert!(matches!(
            CharacterRecord::from_stroke_summary("x", "00,00-ff"),
            Err(RecogError::Summary(_))
        ));
        let one = cross();
        assert!(CharacterRecord::from_summaries("x", "???", &one.stroke_summary()).is_err());
    }

    #[test]
    fn test_empty_builder() {
        let record = CharacterBuilder::new("?").finish().unwrap();
        assert_eq!(0, record.stroke_count());
        assert!(record.moves().is_empty());
        assert_eq!("", record.stroke_summary());
    }
}
