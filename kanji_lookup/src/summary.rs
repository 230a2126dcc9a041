//! Compact text encodings of a character's strokes.
//!
//! The stroke summary is the persisted form: one `xx,yy-xx,yy` group of
//! lowercase two-digit hex bytes per stroke, groups joined by `:`.
//! The direction summary is a diagnostic form built from single glyphs:
//! start location, stroke direction and end location for every stroke, with
//! `:move:` between consecutive strokes. Glyphs live here rather than on the
//! geometry enums.

use super::error::{RecogError, RecogResult};
use super::stroke::{Direction, Location, Stroke};

// Length of one "xx,yy-xx,yy" group
const STROKE_GROUP_LEN: usize = 11;

const DIRECTION_GLYPHS: [(Direction, char); 9] = [
    (Direction::N, '\u{2191}'),
    (Direction::NE, '\u{2197}'),
    (Direction::E, '\u{2192}'),
    (Direction::SE, '\u{2198}'),
    (Direction::S, '\u{2193}'),
    (Direction::SW, '\u{2199}'),
    (Direction::W, '\u{2190}'),
    (Direction::NW, '\u{2196}'),
    (Direction::None, '\u{26aa}'),
];

const LOCATION_GLYPHS: [(Location, char); 9] = [
    (Location::N, '\u{2580}'),
    (Location::NE, '\u{259c}'),
    (Location::E, '\u{2590}'),
    (Location::SE, '\u{259f}'),
    (Location::S, '\u{2584}'),
    (Location::SW, '\u{2599}'),
    (Location::W, '\u{258c}'),
    (Location::NW, '\u{259b}'),
    (Location::Mid, '\u{2588}'),
];

impl Direction {
    pub fn glyph(self) -> char {
        DIRECTION_GLYPHS
            .iter()
            .find(|(direction, _)| *direction == self)
            .map(|(_, glyph)| *glyph)
            .unwrap_or('?')
    }

    pub fn from_glyph(glyph: char) -> RecogResult<Direction> {
        DIRECTION_GLYPHS
            .iter()
            .find(|(_, g)| *g == glyph)
            .map(|(direction, _)| *direction)
            .ok_or_else(|| RecogError::Summary(format!("unknown direction ({})", glyph)))
    }
}

impl Location {
    pub fn glyph(self) -> char {
        LOCATION_GLYPHS
            .iter()
            .find(|(location, _)| *location == self)
            .map(|(_, glyph)| *glyph)
            .unwrap_or('?')
    }

    pub fn from_glyph(glyph: char) -> RecogResult<Location> {
        LOCATION_GLYPHS
            .iter()
            .find(|(_, g)| *g == glyph)
            .map(|(location, _)| *location)
            .ok_or_else(|| RecogError::Summary(format!("unknown location ({})", glyph)))
    }
}

/// Per-stroke features decoded from a direction summary
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionSummary {
    pub starts: Vec<Location>,
    pub directions: Vec<Direction>,
    pub ends: Vec<Location>,
    pub moves: Vec<Direction>,
}

/// Formats strokes as `xx,yy-xx,yy:xx,yy-xx,yy...`
pub fn format_stroke_summary(strokes: &[Stroke]) -> String {
    let mut out = String::with_capacity(strokes.len() * (STROKE_GROUP_LEN + 1));
    for (i, stroke) in strokes.iter().enumerate() {
        if i > 0 {
            out.push(':');
        }
        out.push_str(&format!(
            "{:02x},{:02x}-{:02x},{:02x}",
            stroke.start_x(),
            stroke.start_y(),
            stroke.end_x(),
            stroke.end_y()
        ));
    }
    out
}

/// Parses a stroke summary back into strokes.
pub fn parse_stroke_summary(summary: &str) -> RecogResult<Vec<Stroke>> {
    let bytes = summary.as_bytes();
    let count = (bytes.len() + 1) / (STROKE_GROUP_LEN + 1);
    if count == 0 || count * (STROKE_GROUP_LEN + 1) - 1 != bytes.len() {
        return Err(RecogError::Summary(format!("invalid stroke summary length ({})", summary)));
    }

    let mut strokes = Vec::with_capacity(count);
    let mut offset = 0;
    for i in 0..count {
        if i > 0 {
            expect_separator(bytes, offset, b':', summary)?;
            offset += 1;
        }
        expect_separator(bytes, offset + 2, b',', summary)?;
        expect_separator(bytes, offset + 5, b'-', summary)?;
        expect_separator(bytes, offset + 8, b',', summary)?;
        strokes.push(Stroke::new(
            two_digit_hex(bytes, offset, summary)? as i32,
            two_digit_hex(bytes, offset + 3, summary)? as i32,
            two_digit_hex(bytes, offset + 6, summary)? as i32,
            two_digit_hex(bytes, offset + 9, summary)? as i32,
        )?);
        offset += STROKE_GROUP_LEN;
    }
    Ok(strokes)
}

fn expect_separator(bytes: &[u8], pos: usize, separator: u8, summary: &str) -> RecogResult<()> {
    if bytes[pos] != separator {
        return Err(RecogError::Summary(format!(
            "expected '{}' at {} in stroke summary ({})",
            separator as char, pos, summary
        )));
    }
    Ok(())
}

// Reads two lowercase hex digits at pos; much cheaper than slicing and parsing.
fn two_digit_hex(bytes: &[u8], pos: usize, summary: &str) -> RecogResult<u8> {
    let high = hex_digit(bytes[pos]);
    let low = hex_digit(bytes[pos + 1]);
    match (high, low) {
        (Some(high), Some(low)) => Ok(high << 4 | low),
        _ => Err(RecogError::Summary(format!("invalid hex at {} in stroke summary ({})", pos, summary))),
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Formats per-stroke features as glyphs.
pub fn format_direction_summary(
    starts: &[Location],
    directions: &[Direction],
    ends: &[Location],
    moves: &[Direction],
) -> String {
    let mut out = String::new();
    for i in 0..directions.len() {
        if i > 0 {
            out.push(':');
            out.push(moves[i - 1].glyph());
            out.push(':');
        }
        out.push(starts[i].glyph());
        out.push(directions[i].glyph());
        out.push(ends[i].glyph());
    }
    out
}

/// Parses a direction summary; `stroke_count` must match the summary's shape.
pub fn parse_direction_summary(summary: &str, stroke_count: usize) -> RecogResult<DirectionSummary> {
    let glyphs: Vec<char> = summary.chars().collect();
    if stroke_count < 1 || stroke_count * 6 - 3 != glyphs.len() {
        return Err(RecogError::Summary(format!(
            "invalid direction summary ({}) for {} strokes",
            summary, stroke_count
        )));
    }

    let mut parsed = DirectionSummary {
        starts: Vec::with_capacity(stroke_count),
        directions: Vec::with_capacity(stroke_count),
        ends: Vec::with_capacity(stroke_count),
        moves: Vec::with_capacity(stroke_count - 1),
    };
    let mut offset = 0;
    for i in 0..stroke_count {
        if i > 0 {
            if glyphs[offset] != ':' || glyphs[offset + 2] != ':' {
                return Err(RecogError::Summary(format!("missing separator in direction summary ({})", summary)));
            }
            parsed.moves.push(Direction::from_glyph(glyphs[offset + 1])?);
            offset += 3;
        }
        parsed.starts.push(Location::from_glyph(glyphs[offset])?);
        parsed.directions.push(Direction::from_glyph(glyphs[offset + 1])?);
        parsed.ends.push(Location::from_glyph(glyphs[offset + 2])?);
        offset += 3;
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_digit_hex() {
        assert_eq!(0, two_digit_hex(b"00", 0, "").unwrap());
        assert_eq!(1, two_digit_hex(b"01", 0, "").unwrap());
        assert_eq!(16, two_digit_hex(b"10", 0, "").unwrap());
        assert_eq!(9 * 16 + 9, two_digit_hex(b"99", 0, "").unwrap());
        assert_eq!(255, two_digit_hex(b"ff", 0, "").unwrap());
        assert_eq!(9 * 16 + 9, two_digit_hex(b"blah99blah", 4, "").unwrap());
        assert!(two_digit_hex(b"FF", 0, "").is_err());
        assert!(two_digit_hex(b"g0", 0, "").is_err());
    }

    #[test]
    fn test_stroke_summary() {
        let strokes = vec![Stroke::new(0, 0, 255, 255).unwrap(), Stroke::new(255, 0, 0, 255).unwrap()];
        let summary = format_stroke_summary(&strokes);
        assert_eq!("00,00-ff,ff:ff,00-00,ff", summary);
        assert_eq!(strokes, parse_stroke_summary(&summary).unwrap());
        assert_eq!(
            vec![Stroke::new(1, 0x7f, 0xa0, 9).unwrap()],
            parse_stroke_summary("01,7f-a0,09").unwrap()
        );
    }

    #[test]
    fn test_stroke_summary_invalid() {
        assert!(parse_stroke_summary("").is_err());
        assert!(parse_stroke_summary("00,00-ff,f").is_err());
        assert!(parse_stroke_summary("00,00-ff,ff:").is_err());
        assert!(parse_stroke_summary("00,00+ff,ff").is_err());
        assert!(parse_stroke_summary("00,00-ff,ff;ff,00-00,ff").is_err());
        assert!(parse_stroke_summary("0x,00-ff,ff").is_err());
    }

    #[test]
    fn test_glyphs_round_trip() {
        for direction in Direction::ALL.iter() {
            assert_eq!(*direction, Direction::from_glyph(direction.glyph()).unwrap());
        }
        for location in Location::ALL.iter() {
            assert_eq!(*location, Location::from_glyph(location.glyph()).unwrap());
        }
        assert!(Direction::from_glyph('x').is_err());
        assert!(Location::from_glyph('\u{2191}').is_err());
    }

    #[test]
    fn test_direction_summary() {
        let starts = vec![Location::NW, Location::NE];
        let directions = vec![Direction::SE, Direction::SW];
        let ends = vec![Location::SE, Location::SW];
        let moves = vec![Direction::N];
        let summary = format_direction_summary(&starts, &directions, &ends, &moves);
        assert_eq!("\u{259b}\u{2198}\u{259f}:\u{2191}:\u{259c}\u{2199}\u{2599}", summary);

        let parsed = parse_direction_summary(&summary, 2).unwrap();
        assert_eq!(starts, parsed.starts);
        assert_eq!(directions, parsed.directions);
        assert_eq!(ends, parsed.ends);
        assert_eq!(moves, parsed.moves);

        assert!(parse_direction_summary(&summary, 3).is_err());
        assert!(parse_direction_summary("", 0).is_err());
    }
}
