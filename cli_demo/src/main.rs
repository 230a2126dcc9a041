extern crate kanji_lookup;
extern crate serde_derive;

use clap::Parser;
use log::{info, warn};
use serde_derive::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use kanji_lookup::{no_progress, Algorithm, CharacterBuilder, InputStroke, MatchConfig, Repository};

#[derive(Parser, Debug)]
#[command(
    name = "cli_demo",
    about = "Measures how well each algorithm recognizes a set of drawn characters",
    version
)]
struct Cli {
    /// Repository snapshot written by strokes_convert
    #[arg(short = 's', long = "snapshot")]
    snapshot: PathBuf,

    /// JSON lines of drawn attempts: {"char": "...", "strokes": [[sx, sy, ex, ey], ...]}
    #[arg(short = 'i', long = "inputs")]
    inputs: PathBuf,

    /// Algorithms to run on every attempt; by default picked from the stroke count difference
    #[arg(short = 'a', long = "algorithm")]
    algorithms: Vec<String>,

    /// Optional JSON match config
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
}

#[derive(Deserialize)]
struct Attempt {
    #[serde(rename = "char")]
    character: String,
    strokes: Vec<[f32; 4]>,
}

fn read_attempts(path: &PathBuf) -> Result<Vec<Attempt>, Box<dyn Error>> {
    let mut res: Vec<Attempt> = Vec::new();
    let file = File::open(path)?;
    for (ix, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(attempt) => res.push(attempt),
            Err(e) => warn!("skipping line {}: {}", ix + 1, e),
        }
    }
    Ok(res)
}

/// Ranking counts for one algorithm.
#[derive(Default)]
struct AlgoResults {
    rankings: BTreeMap<usize, usize>,
    failures: usize,
    total: usize,
    elapsed: Duration,
}

impl AlgoResults {
    fn add_ranking(&mut self, ranking: usize) {
        *self.rankings.entry(ranking).or_insert(0) += 1;
        self.total += 1;
    }

    fn add_failure(&mut self) {
        self.failures += 1;
        self.total += 1;
    }

    fn display(&self, algorithm: Algorithm) {
        // Rankings past what a picker would show count as failures
        let max = if algorithm == Algorithm::Strict { 7 } else { 24 };
        let mut cumulative = 0f64;
        for i in 1..=max {
            let count = self.rankings.get(&i).copied().unwrap_or(0);
            self.display_line(&format!("{:4}", i), count, &mut cumulative);
        }
        let mut max_plus = self.failures;
        let mut total_ranking = 0;
        let mut ranked = 0;
        for (ranking, count) in &self.rankings {
            if *ranking > max {
                max_plus += count;
            } else {
                total_ranking += ranking * count;
                ranked += count;
            }
        }
        self.display_line("Fail", max_plus, &mut cumulative);

        let average = if ranked > 0 { total_ranking as f64 / ranked as f64 } else { 0f64 };
        let per_attempt = if self.total > 0 { self.elapsed / self.total as u32 } else { Duration::ZERO };
        println!();
        println!(
            "Summary: avg ranking {:.2} / fail {:.1}% / {:?} per attempt",
            average,
            100.0 * max_plus as f64 / self.total.max(1) as f64,
            per_attempt
        );
    }

    fn display_line(&self, index: &str, count: usize, cumulative: &mut f64) {
        let percentage = 100.0 * count as f64 / self.total.max(1) as f64;
        *cumulative += percentage;
        println!("{:>4} {:7} {:7.1}% {:7.1}%", index, count, percentage, cumulative);
    }
}

// Algorithms a recognizer would try for this many strokes off the real count
fn default_algorithms(difference: usize) -> Vec<Algorithm> {
    match difference {
        0 => vec![Algorithm::Strict, Algorithm::Fuzzy],
        1 => vec![Algorithm::Fuzzy1Out],
        2 => vec![Algorithm::Fuzzy2Out],
        _ => Vec::new(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MatchConfig::load(path)?,
        None => MatchConfig::default(),
    };
    let chosen: Vec<Algorithm> = cli
        .algorithms
        .iter()
        .map(|name| name.parse::<Algorithm>())
        .collect::<Result<_, _>>()?;

    println!("Loading repository.");
    let repository = Repository::load_snapshot(BufReader::new(File::open(&cli.snapshot)?), config)?;
    let actual_counts: HashMap<&str, usize> = repository
        .iter()
        .map(|r| (r.character(), r.stroke_count()))
        .collect();
    let attempts = read_attempts(&cli.inputs)?;
    println!("Loaded {} characters and {} attempts.", repository.len(), attempts.len());

    let mut results: BTreeMap<Algorithm, AlgoResults> = BTreeMap::new();
    for (count, attempt) in attempts.iter().enumerate() {
        let mut builder = CharacterBuilder::new(&attempt.character);
        for s in &attempt.strokes {
            builder.add_stroke(InputStroke::new(s[0], s[1], s[2], s[3]));
        }
        let drawn = builder.finish()?;

        let algorithms = if !chosen.is_empty() {
            chosen.clone()
        } else {
            match actual_counts.get(attempt.character.as_str()) {
                Some(actual) => default_algorithms(actual.abs_diff(drawn.stroke_count())),
                None => {
                    warn!("character ({}) is not in the repository", attempt.character);
                    Vec::new()
                }
            }
        };

        for algorithm in algorithms {
            let start = Instant::now();
            let matches = repository.get_top_matches(&drawn, algorithm, &no_progress)?;
            let algo_results = results.entry(algorithm).or_default();
            algo_results.elapsed += start.elapsed();
            match matches.iter().position(|m| m.character == attempt.character) {
                Some(ix) => algo_results.add_ranking(ix + 1),
                None => algo_results.add_failure(),
            }
        }
        repository.forget(drawn.id());
        eprint!("Processed: {}\r", count + 1);
    }
    eprintln!();
    info!("finished {} attempts", attempts.len());

    for (algorithm, algo_results) in &results {
        let name = algorithm.to_string();
        println!();
        println!("{}", name);
        println!("{}", "=".repeat(name.len()));
        println!();
        algo_results.display(*algorithm);
    }
    Ok(())
}
