use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::config::ReaderConfig;
use crate::decoder::Anomaly;
use crate::error::Result;
use crate::parser::RawFields;
use crate::record::{Pileup, Record};
use crate::types::Shared;

/// A decoded pileup line together with what went wrong while decoding it.
#[derive(Debug)]
pub struct DecodedPileup {
    pub pileup: Pileup,
    pub anomalies: Vec<Anomaly>,
    /// Whether every value met the configured floor (always true without one).
    pub base_qualities_met_floor: bool,
    pub map_qualities_met_floor: bool,
}

impl Record for DecodedPileup {
    fn reference(&self) -> &str {
        self.pileup.reference()
    }

    fn position(&self) -> u64 {
        self.pileup.position()
    }

    fn ref_base(&self) -> u8 {
        self.pileup.ref_base()
    }

    fn coverage(&self) -> Option<u32> {
        self.pileup.coverage()
    }
}

/// Iterates over the lines of a (m)pileup file, one position record per line.
///
/// Records are yielded in input order; sortedness is not checked.
pub struct PileupRecords<R: BufRead> {
    config: ReaderConfig,
    references: Vec<Shared<str>>,
    line_number: usize,
    line_buf: Vec<u8>,
    inner: R,
}

impl PileupRecords<BufReader<Box<dyn Read>>> {
    /// Open a plain or compressed pileup file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_path_with_config(path, ReaderConfig::default())
    }

    pub fn from_path_with_config<P: AsRef<Path>>(path: P, config: ReaderConfig) -> Result<Self> {
        let (reader, _format) = niffler::from_path(path)?;
        Ok(Self::with_config(BufReader::new(reader), config))
    }
}

impl<R: BufRead> PileupRecords<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, ReaderConfig::default())
    }

    pub fn with_config(reader: R, config: ReaderConfig) -> Self {
        Self {
            config,
            references: Vec::new(),
            line_number: 0,
            line_buf: Vec::new(),
            inner: reader,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Reference names in order of first appearance.
    ///
    /// A name is added each time it differs from the previous line's, so unsorted
    /// input may list a reference more than once.
    pub fn references(&self) -> &[Shared<str>] {
        &self.references
    }

    /// 1-based number of the last line read.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn parse_line(&mut self) -> Result<DecodedPileup> {
        log::trace!(
            "line {}: {}",
            self.line_number,
            String::from_utf8_lossy(&self.line_buf)
        );
        let fields = RawFields::parse(&self.line_buf, self.config.separator(), self.line_number)?;
        let reference = intern(&mut self.references, fields.reference)?;
        let mut pileup = Pileup::from_fields_with_reference(&fields, reference)?;
        let mut anomalies = vec![];
        let mut base_qualities_met_floor = true;
        let mut map_qualities_met_floor = true;
        if self.config.decode_pile() {
            anomalies = pileup.decode_pile(&fields);
            if self.config.min_base_quality() > 0 {
                base_qualities_met_floor =
                    pileup.set_min_base_quality(self.config.min_base_quality());
            }
            if self.config.min_map_quality() > 0 {
                map_qualities_met_floor = pileup.set_min_map_quality(self.config.min_map_quality());
            }
        }
        Ok(DecodedPileup {
            pileup,
            anomalies,
            base_qualities_met_floor,
            map_qualities_met_floor,
        })
    }
}

fn intern(references: &mut Vec<Shared<str>>, name: &[u8]) -> Result<Shared<str>> {
    if let Some(last) = references.last() {
        if last.as_bytes() == name {
            return Ok(last.clone());
        }
    }
    let reference: Shared<str> = Shared::from(std::str::from_utf8(name)?);
    references.push(reference.clone());
    Ok(reference)
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

impl<R: BufRead> Iterator for PileupRecords<R> {
    type Item = Result<DecodedPileup>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buf.clear();
            match self.inner.read_until(b'\n', &mut self.line_buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    if is_blank(&self.line_buf) {
                        continue;
                    }
                    return Some(self.parse_line());
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
