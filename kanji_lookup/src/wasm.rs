use wasm_bindgen::prelude::*;

use super::comparer::Algorithm;
use super::config::MatchConfig;
use super::error::RecogError;
use super::input_stroke::InputStroke;
use super::repository::Repository;

fn to_js(err: RecogError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Repository loaded once from snapshot bytes, queried from JavaScript.
#[wasm_bindgen]
pub struct Recognizer {
    repository: Repository,
}

#[wasm_bindgen]
impl Recognizer {
    #[wasm_bindgen(constructor)]
    pub fn new(snapshot: &[u8]) -> Result<Recognizer, JsValue> {
        let repository = Repository::load_snapshot(snapshot, MatchConfig::default()).map_err(to_js)?;
        Ok(Recognizer { repository })
    }

    /// `strokes` is a JSON array of `[start_x, start_y, end_x, end_y]`; returns matches as JSON.
    pub fn lookup(&self, strokes: &str, algorithm: &str) -> Result<String, JsValue> {
        let input: Vec<[f32; 4]> = serde_json::from_str(strokes).map_err(|e| to_js(e.into()))?;
        let strokes: Vec<InputStroke> = input.iter().map(|s| InputStroke::new(s[0], s[1], s[2], s[3])).collect();
        let algorithm = algorithm.parse::<Algorithm>().map_err(to_js)?;
        let matches = super::lookup(&self.repository, &strokes, algorithm).map_err(to_js)?;
        serde_json::to_string(&matches).map_err(|e| to_js(e.into()))
    }

    pub fn size(&self) -> usize {
        self.repository.len()
    }
}
