use std::str::FromStr;

use anyhow::{Context, Result};
use env_logger::Env;
use itertools::Itertools;
use log::{info, warn};

use rust_pileup::config::ReaderConfig;
use rust_pileup::reader::PileupRecords;
use rust_pileup::Error;

fn quality_floor(arg: Option<&String>) -> Result<u8> {
    arg.map_or(Ok(0), |s| {
        u8::from_str(s).with_context(|| format!("invalid quality floor {:?}", s))
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = std::env::args().collect_vec();
    let path = args
        .get(1)
        .context("usage: main <in.pileup[.gz]> [min-base-quality] [min-map-quality]")?;
    let config = ReaderConfig::default()
        .with_min_base_quality(quality_floor(args.get(2))?)
        .with_min_map_quality(quality_floor(args.get(3))?);

    let records = PileupRecords::from_path_with_config(path, config)?;
    let (mut n_records, mut n_skipped) = (0, 0);
    let (mut n_strata, mut n_indels, mut n_anomalies) = (0, 0, 0);
    for record in records {
        let record = match record {
            Ok(record) => record,
            Err(e @ Error::Io(_)) => return Err(e.into()),
            Err(e) => {
                warn!("skipping line: {}", e);
                n_skipped += 1;
                continue;
            }
        };
        println!("{}", record.pileup);
        n_records += 1;
        n_strata += record.pileup.len();
        n_indels += record.pileup.indels().len();
        n_anomalies += record.anomalies.len();
    }
    info!(
        "{} records ({} skipped), {} strata, {} indels, {} anomalies",
        n_records, n_skipped, n_strata, n_indels, n_anomalies
    );
    Ok(())
}
