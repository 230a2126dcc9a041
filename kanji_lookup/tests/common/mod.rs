pub mod synthetic_strokes;
