use log::debug;
use serde_derive::{Deserialize, Serialize};
use std::io::{Read, Write};

use super::super::character::{CharacterRecord, RecordData};
use super::super::config::MatchConfig;
use super::super::error::{RecogError, RecogResult};
use super::Repository;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Binary form of a repository: every record as character plus stroke summary.
#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct Snapshot {
    pub version: u32,
    pub records: Vec<RecordData>,
}

impl Snapshot {
    pub fn new(records: Vec<RecordData>) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            records,
        }
    }

    pub fn write_to<W: Write>(&self, writer: W) -> RecogResult<()> {
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: R) -> RecogResult<Snapshot> {
        let snapshot: Snapshot = bincode::deserialize_from(reader)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(RecogError::Argument(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }
        Ok(snapshot)
    }
}

impl Repository {
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot::new(self.iter().map(|r| r.to_data()).collect())
    }

    pub fn save_snapshot<W: Write>(&self, writer: W) -> RecogResult<()> {
        self.to_snapshot().write_to(writer)
    }

    pub fn from_snapshot(snapshot: &Snapshot, config: MatchConfig) -> RecogResult<Repository> {
        let mut repository = Repository::with_config(config)?;
        for data in &snapshot.records {
            repository.add(CharacterRecord::from_data(data)?)?;
        }
        debug!("loaded {} records from snapshot", repository.len());
        Ok(repository)
    }

    pub fn load_snapshot<R: Read>(reader: R, config: MatchConfig) -> RecogResult<Repository> {
        let snapshot = Snapshot::read_from(reader)?;
        Repository::from_snapshot(&snapshot, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut repository = Repository::new();
        repository
            .add(CharacterRecord::from_stroke_summary("十", "00,7f-ff,7f:7f,00-7f,ff").unwrap())
            .unwrap();
        repository
            .add(CharacterRecord::from_stroke_summary("一", "00,7f-ff,7f").unwrap())
            .unwrap();

        let mut bytes: Vec<u8> = Vec::new();
        repository.save_snapshot(&mut bytes).unwrap();
        let loaded = Repository::load_snapshot(&bytes[..], MatchConfig::default()).unwrap();
        assert_eq!(2, loaded.len());
        assert_eq!(repository.to_snapshot(), loaded.to_snapshot());
        assert_eq!("一", loaded.query(1)[0].character());
    }

    #[test]
    fn test_bad_version() {
        let mut snapshot = Snapshot::new(Vec::new());
        snapshot.version = 99;
        let mut bytes: Vec<u8> = Vec::new();
        snapshot.write_to(&mut bytes).unwrap();
        let res = Snapshot::read_from(&bytes[..]);
        assert!(matches!(res, Err(RecogError::Argument(_))));
    }

    #[test]
    fn test_truncated() {
        let snapshot = Snapshot::new(vec![RecordData {
            character: "一".to_string(),
            strokes: "00,7f-ff,7f".to_string(),
        }]);
        let mut bytes: Vec<u8> = Vec::new();
        snapshot.write_to(&mut bytes).unwrap();
        let res = Snapshot::read_from(&bytes[..bytes.len() - 3]);
        assert!(matches!(res, Err(RecogError::Snapshot(_))));
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let mut bytes: Vec<u8> = Vec::new();
        Snapshot::new(Vec::new()).write_to(&mut bytes).unwrap();
        let config = MatchConfig {
            prune_ratio: -1f32,
            ..MatchConfig::default()
        };
        let res = Repository::load_snapshot(&bytes[..], config);
        assert!(matches!(res, Err(RecogError::Config(_))));
    }
}
