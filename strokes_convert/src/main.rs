extern crate kanji_lookup;

use clap::Parser;
use log::{info, warn};
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use kanji_lookup::{CharacterRecord, RecordData, Snapshot};

#[derive(Parser, Debug)]
#[command(
    name = "strokes_convert",
    about = "Converts a JSON list of character stroke summaries into a binary repository snapshot",
    version
)]
struct Cli {
    /// JSON array of {"char": "...", "strokes": "xx,yy-xx,yy:..."}
    #[arg(short = 'i', long = "input", default_value = "./data/strokes.json")]
    input: PathBuf,

    /// Snapshot file to write
    #[arg(short = 'o', long = "output", default_value = "./data/strokes.bin")]
    output: PathBuf,
}

// Keeps entries whose summaries parse into at least one stroke
fn validate(entries: Vec<RecordData>) -> Vec<RecordData> {
    let mut res: Vec<RecordData> = Vec::with_capacity(entries.len());
    for entry in entries {
        match CharacterRecord::from_data(&entry) {
            Ok(record) if record.stroke_count() > 0 => res.push(entry),
            Ok(_) => warn!("skipping character ({}): no strokes", entry.character),
            Err(e) => warn!("skipping character ({}): {}", entry.character, e),
        }
    }
    res
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let file = File::open(&cli.input)?;
    let entries: Vec<RecordData> = serde_json::from_reader(BufReader::new(file))?;
    let read = entries.len();
    let records = validate(entries);
    info!("{} of {} characters valid", records.len(), read);

    let snapshot = Snapshot::new(records);
    let out = BufWriter::new(File::create(&cli.output)?);
    snapshot.write_to(out)?;
    println!(
        "Wrote {} characters to {}.",
        snapshot.records.len(),
        cli.output.display()
    );
    Ok(())
}
