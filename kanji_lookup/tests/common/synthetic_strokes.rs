use kanji_lookup::{CharacterBuilder, CharacterRecord, InputStroke, MatchConfig, Repository};

/// Small deterministic generator so datasets are identical on every run.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Lcg {
        Lcg(seed)
    }

    /// Next value in 0..1
    pub fn next_unit(&mut self) -> f32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 40) as f32) / ((1u64 << 24) as f32)
    }
}

pub fn random_strokes(rng: &mut Lcg, count: usize) -> Vec<InputStroke> {
    (0..count)
        .map(|_| InputStroke::new(rng.next_unit(), rng.next_unit(), rng.next_unit(), rng.next_unit()))
        .collect()
}

pub fn build(character: &str, strokes: &[InputStroke]) -> CharacterRecord {
    let mut builder = CharacterBuilder::new(character);
    for stroke in strokes {
        builder.add_stroke(*stroke);
    }
    builder.finish().expect("synthetic strokes normalize")
}

/// Named random characters, `per_count` of each stroke count from 1 to 20.
pub fn synthetic_dataset(seed: u64, per_count: usize) -> Vec<(String, Vec<InputStroke>)> {
    let mut rng = Lcg::new(seed);
    let mut res = Vec::new();
    for i in 0..per_count {
        for count in 1..=20 {
            res.push((format!("c{:02}-{:03}", count, i), random_strokes(&mut rng, count)));
        }
    }
    res
}

/// A few real two-stroke characters drawn on a 100 unit square.
pub fn two_stroke_characters() -> Vec<(String, Vec<InputStroke>)> {
    let raw: [(&str, [(f32, f32, f32, f32); 2]); 6] = [
        ("十", [(10.0, 50.0, 90.0, 50.0), (50.0, 10.0, 50.0, 90.0)]),
        ("二", [(25.0, 30.0, 75.0, 30.0), (10.0, 75.0, 90.0, 75.0)]),
        ("人", [(50.0, 10.0, 15.0, 90.0), (50.0, 40.0, 85.0, 90.0)]),
        ("八", [(35.0, 20.0, 10.0, 85.0), (60.0, 20.0, 90.0, 85.0)]),
        ("入", [(30.0, 15.0, 55.0, 35.0), (55.0, 35.0, 15.0, 90.0)]),
        ("七", [(10.0, 45.0, 90.0, 30.0), (40.0, 10.0, 85.0, 85.0)]),
    ];
    raw.iter()
        .map(|(character, strokes)| {
            let strokes = strokes
                .iter()
                .map(|s| InputStroke::new(s.0, s.1, s.2, s.3))
                .collect();
            (character.to_string(), strokes)
        })
        .collect()
}

pub fn repository_from(entries: &[(String, Vec<InputStroke>)], config: MatchConfig) -> Repository {
    let mut repository = Repository::with_config(config).expect("valid config");
    for (character, strokes) in entries {
        repository.add(build(character, strokes)).expect("non-empty character");
    }
    repository
}
