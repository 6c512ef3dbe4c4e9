use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::str::FromStr;

use getset::{CopyGetters, Getters};
use indexmap::IndexMap;
use itertools::Itertools;

use crate::decoder::{Anomaly, PileDecoder};
use crate::error::{Error, Result};
use crate::parser::RawFields;
use crate::record::{Indel, Record, Stratum};
use crate::types::{ParseState, Shared};

/// All reads overlapping one reference coordinate.
///
/// The index of a stratum in [`Pileup::pile`] is its stratum number, i.e. its order of
/// appearance in the base-call column. Indels are owned here; strata refer to them by index.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct Pileup {
    pub(crate) reference: Shared<str>,
    pub(crate) position: u64,
    pub(crate) ref_base: u8,
    // None when the coverage column held the unset sentinel
    pub(crate) coverage: Option<u32>,
    #[getset(get = "pub")]
    pub(crate) pile: Vec<Stratum>,
    #[getset(get = "pub")]
    pub(crate) indels: Vec<Indel>,
    #[getset(get_copy = "pub")]
    pub(crate) state: ParseState,
    #[getset(get_copy = "pub")]
    pub(crate) min_base_quality: u8,
    #[getset(get_copy = "pub")]
    pub(crate) min_map_quality: u8,
}

impl Pileup {
    pub fn new(reference: Shared<str>, position: u64, ref_base: u8, coverage: Option<u32>) -> Self {
        Pileup {
            reference,
            position,
            ref_base,
            coverage,
            pile: Vec::new(),
            indels: Vec::new(),
            state: ParseState::default(),
            min_base_quality: 0,
            min_map_quality: 0,
        }
    }

    /// Load reference, position, reference base and coverage. The pile is left empty.
    pub fn from_fields(fields: &RawFields) -> Result<Self> {
        let reference = Shared::from(std::str::from_utf8(fields.reference)?);
        Self::from_fields_with_reference(fields, reference)
    }

    /// Like [`Pileup::from_fields`], reusing an already interned reference name.
    pub fn from_fields_with_reference(fields: &RawFields, reference: Shared<str>) -> Result<Self> {
        let position = std::str::from_utf8(fields.position)?;
        let position =
            u64::from_str(position).map_err(|_| Error::InvalidPosition(position.to_owned()))?;
        let ref_base = *fields
            .ref_base
            .first()
            .ok_or(Error::EmptyReferenceBase)?;
        let coverage = parse_coverage(std::str::from_utf8(fields.coverage)?)?;
        let mut pileup = Pileup::new(reference, position, ref_base, coverage);
        pileup.state.fields_loaded = true;
        Ok(pileup)
    }

    /// Decode the base-call and quality columns, replacing any previous pile and indels.
    ///
    /// Anomalies are logged and returned; the record stays usable either way.
    pub fn decode_pile(&mut self, fields: &RawFields) -> Vec<Anomaly> {
        self.pile.clear();
        self.indels.clear();
        self.state.pile_decoded = false;

        let decoded = PileDecoder::new(fields, self.ref_base, self.coverage).decode();
        for anomaly in &decoded.anomalies {
            log::warn!("{}:{}: {}", self.reference, self.position, anomaly);
        }
        log::debug!(
            "{}:{}: decoded {} strata and {} indels",
            self.reference,
            self.position,
            decoded.pile.len(),
            decoded.indels.len()
        );
        self.pile = decoded.pile;
        self.indels = decoded.indels;
        self.state.pile_decoded = true;
        decoded.anomalies
    }

    pub fn len(&self) -> usize {
        self.pile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pile.is_empty()
    }

    pub fn stratum(&self, index: usize) -> Option<&Stratum> {
        self.pile.get(index)
    }

    /// The indel declared by the stratum at `index`, if any.
    pub fn indel_of(&self, index: usize) -> Option<&Indel> {
        self.pile
            .get(index)
            .and_then(|stratum| stratum.indel)
            .and_then(|i| self.indels.get(i))
    }

    /// Subtract `floor` from every base quality, turning each into an offset above the floor.
    ///
    /// Returns whether every value met the floor before subtraction. Values below the floor
    /// end up at 0. A floor of 0 is a no-op.
    pub fn set_min_base_quality(&mut self, floor: u8) -> bool {
        if floor == 0 {
            log::warn!(
                "{}:{}: minimum base quality of 0 is a no-op",
                self.reference,
                self.position
            );
            return true;
        }
        if self.min_base_quality > 0 {
            log::warn!(
                "{}:{}: minimum base quality already set to {}",
                self.reference,
                self.position,
                self.min_base_quality
            );
        }
        self.min_base_quality = floor;
        let mut met = true;
        for stratum in &mut self.pile {
            met &= stratum.base_quality >= floor;
            stratum.base_quality = stratum.base_quality.saturating_sub(floor);
        }
        met
    }

    /// Subtract `floor` from the columnar and the read-declared mapping qualities.
    ///
    /// Strata without a read-declared value keep it at 0 and are not counted against
    /// the floor. Linked indels follow their stratum's mapping quality.
    pub fn set_min_map_quality(&mut self, floor: u8) -> bool {
        if floor == 0 {
            log::warn!(
                "{}:{}: minimum mapping quality of 0 is a no-op",
                self.reference,
                self.position
            );
            return true;
        }
        if self.min_map_quality > 0 {
            log::warn!(
                "{}:{}: minimum mapping quality already set to {}",
                self.reference,
                self.position,
                self.min_map_quality
            );
        }
        self.min_map_quality = floor;
        let mut met = true;
        for stratum in &mut self.pile {
            met &= stratum.map_quality >= floor;
            stratum.map_quality = stratum.map_quality.saturating_sub(floor);
            if stratum.read_map_quality > 0 {
                met &= stratum.read_map_quality >= floor;
                stratum.read_map_quality = stratum.read_map_quality.saturating_sub(floor);
            }
        }
        for indel in &mut self.indels {
            indel.map_quality = indel.map_quality.saturating_sub(floor);
        }
        met
    }

    /// Mapping qualities of the strata in `range`; the end is clamped to the last stratum.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_pileup::parser::RawFields;
    /// use rust_pileup::record::Pileup;
    ///
    /// let fields = RawFields::parse(b"chr1\t5\tA\t3\t.,A\tIII\tabc", b'\t', 1).unwrap();
    /// let mut pileup = Pileup::from_fields(&fields).unwrap();
    /// pileup.decode_pile(&fields);
    /// assert_eq!(pileup.map_qualities(..), b"abc");
    /// assert_eq!(pileup.map_qualities(1..=100), b"bc");
    /// ```
    pub fn map_qualities<R: RangeBounds<usize>>(&self, range: R) -> Vec<u8> {
        let len = self.pile.len();
        if len == 0 {
            return vec![];
        }
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e.min(len - 1),
            Bound::Excluded(&0) => return vec![],
            Bound::Excluded(&e) => (e - 1).min(len - 1),
            Bound::Unbounded => len - 1,
        };
        if start > end {
            return vec![];
        }
        self.pile[start..=end]
            .iter()
            .map(|stratum| stratum.map_quality)
            .collect()
    }

    /// How often each called base occurs in the pile, in order of first appearance.
    ///
    /// Gap placeholders are counted under [`GAP`](crate::types::GAP); strata whose base
    /// call could not be classified are skipped.
    pub fn base_count(&self) -> IndexMap<u8, usize> {
        let mut counts = IndexMap::new();
        for stratum in self.pile.iter().filter(|stratum| stratum.base != 0) {
            *counts.entry(stratum.base).or_insert(0) += 1;
        }
        counts
    }

    /// One line per stratum: index, stranded base, base quality, mapping quality,
    /// read structure and indel.
    pub fn pile_stack(&self) -> String {
        self.pile
            .iter()
            .enumerate()
            .map(|(i, stratum)| {
                let structure = stratum.structure;
                format!(
                    "{}\t{}\t{}\t{}\t{}{}{}\t{}",
                    i,
                    char::from(stratum.qualified_base()),
                    stratum.base_quality,
                    stratum.map_quality,
                    if structure.is_start() { "^" } else { "" },
                    if structure.is_end() { "$" } else { "" },
                    if structure.is_gap() { "*" } else { "" },
                    self.indel_of(i).map(Indel::to_string).unwrap_or_default()
                )
            })
            .join("\n")
    }
}

fn parse_coverage(coverage: &str) -> Result<Option<u32>> {
    match i64::from_str(coverage) {
        Ok(-1) => Ok(None),
        Ok(c) if c >= 0 && c <= i64::from(u32::MAX) => Ok(Some(c as u32)),
        _ => Err(Error::InvalidCoverage(coverage.to_owned())),
    }
}

impl Record for Pileup {
    fn reference(&self) -> &str {
        &self.reference
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn ref_base(&self) -> u8 {
        self.ref_base
    }

    fn coverage(&self) -> Option<u32> {
        self.coverage
    }
}

impl fmt::Display for Pileup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ref={} pos={} refbase={} cov={}",
            self.reference,
            self.position,
            char::from(self.ref_base),
            self.coverage
                .map_or_else(|| "NA".to_owned(), |c| c.to_string())
        )?;
        if self.pile.is_empty() {
            return write!(f, " NO_PILE");
        }
        let bases = self
            .pile
            .iter()
            .enumerate()
            .map(|(i, stratum)| match self.indel_of(i) {
                Some(indel) => format!("{}({})", char::from(stratum.qualified_base()), indel),
                None => char::from(stratum.qualified_base()).to_string(),
            })
            .join("");
        let base_q: String = self
            .pile
            .iter()
            .map(|s| char::from(s.base_quality))
            .collect();
        let map_q: String = self
            .pile
            .iter()
            .map(|s| char::from(s.map_quality))
            .collect();
        write!(f, " base={} base_q={} map_q={}", bases, base_q, map_q)
    }
}
