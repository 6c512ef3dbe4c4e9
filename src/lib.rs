pub mod config;
pub mod decoder;
pub mod error;
pub mod parser;
pub mod reader;
pub mod record;
pub mod types;

pub use config::ReaderConfig;
pub use decoder::{Anomaly, PileDecoder};
pub use error::{Error, Result};
pub use reader::{DecodedPileup, PileupRecords};
pub use record::{Indel, Pileup, Record, Stratum};

#[cfg(test)]
mod test {

    use super::reader::PileupRecords;
    use super::record::Record;

    #[test]
    fn test_example() {
        let records = PileupRecords::from_path("resources/example.pileup")
            .unwrap()
            .collect::<super::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(records.len(), 10);
        assert!(records.iter().all(|r| r.anomalies.is_empty()));
        assert!(records.iter().all(|r| r.reference() == "chrM"));
        let strata = records.iter().map(|r| r.pileup.len()).sum::<usize>();
        assert_eq!(strata, 3 + 3 + 4 + 4 + 4 + 4 + 4 + 3 + 0 + 3);
        let indels = records
            .iter()
            .flat_map(|r| r.pileup.indels().iter().map(|i| i.to_string()))
            .collect::<Vec<_>>();
        assert_eq!(indels, vec!["-2TA", "+1g"]);
        assert!(records[0]
            .pileup
            .pile()
            .iter()
            .all(|s| s.structure().is_start()));
    }
}
