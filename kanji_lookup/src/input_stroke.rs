use serde_derive::{Deserialize, Serialize};

use super::error::RecogResult;
use super::stroke::Stroke;

// Extent below which an axis counts as having no size
const DEGENERATE_EXTENT: f32 = 0.000_000_000_1;
// Fixed padding when both axes are degenerate (a single dot)
const DOT_PADDING: f32 = 0.1;
// Longest side may be at most this many times the shortest
const MAX_ASPECT: f32 = 5f32;

/// A stroke as drawn or loaded, in arbitrary units; X grows rightward and Y downward.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct InputStroke {
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
}

impl InputStroke {
    pub fn new(start_x: f32, start_y: f32, end_x: f32, end_y: f32) -> InputStroke {
        InputStroke {
            start_x,
            start_y,
            end_x,
            end_y,
        }
    }
}

struct Rect {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
}

impl Rect {
    fn width(&self) -> f32 {
        self.right - self.left
    }

    fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

fn get_bounding_rect(strokes: &[InputStroke]) -> Rect {
    let mut res = Rect {
        left: f32::MAX,
        right: f32::MIN,
        top: f32::MAX,
        bottom: f32::MIN,
    };
    for stroke in strokes {
        for (x, y) in [(stroke.start_x, stroke.start_y), (stroke.end_x, stroke.end_y)] {
            res.left = res.left.min(x);
            res.right = res.right.max(x);
            res.top = res.top.min(y);
            res.bottom = res.bottom.max(y);
        }
    }
    res
}

// Gives a zero-size axis some extent so that it maps to the middle, not a division by zero
fn fix_degenerate_axes(rect: &mut Rect) {
    if rect.width() < DEGENERATE_EXTENT {
        let mut adjust = rect.height() / 100f32;
        if adjust < DEGENERATE_EXTENT {
            adjust = DOT_PADDING;
        }
        rect.left -= adjust;
        rect.right += adjust;
    }
    if rect.height() < DEGENERATE_EXTENT {
        let mut adjust = rect.width() / 100f32;
        if adjust < DEGENERATE_EXTENT {
            adjust = DOT_PADDING;
        }
        rect.top -= adjust;
        rect.bottom += adjust;
    }
}

// Stops long thin characters from being stretched out to fill the square
fn clamp_aspect(rect: &mut Rect) {
    let width = rect.width();
    let height = rect.height();
    if width > MAX_ASPECT * height {
        let adjust = (width / MAX_ASPECT - height) / 2f32;
        rect.top -= adjust;
        rect.bottom += adjust;
    } else if height > MAX_ASPECT * width {
        let adjust = (height / MAX_ASPECT - width) / 2f32;
        rect.left -= adjust;
        rect.right += adjust;
    }
}

/// Scales strokes into the 0..=255 square.
///
/// The bounding box of all endpoints is mapped onto the unit square. An axis
/// with no extent is centred, and an axis more than five times shorter than
/// the other is padded out to exactly 1:5 so very thin characters keep their
/// shape. This is the only place scale and position are factored out.
pub fn normalize(strokes: &[InputStroke]) -> RecogResult<Vec<Stroke>> {
    if strokes.is_empty() {
        return Ok(Vec::new());
    }
    let mut rect = get_bounding_rect(strokes);
    fix_degenerate_axes(&mut rect);
    clamp_aspect(&mut rect);

    let width = rect.width();
    let height = rect.height();
    let mut res = Vec::with_capacity(strokes.len());
    for stroke in strokes {
        res.push(Stroke::from_unit(
            (stroke.start_x - rect.left) / width,
            (stroke.start_y - rect.top) / height,
            (stroke.end_x - rect.left) / width,
            (stroke.end_y - rect.top) / height,
        )?);
    }
    Ok(res)
}
