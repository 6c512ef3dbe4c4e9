use std::convert::TryFrom;

use strum::Display;

use crate::error::RunLengthError;
use crate::parser::{extract_signed_integer, is_base, peek, RawFields};
use crate::record::{Indel, Stratum};
use crate::types::{IndelKind, Marker, Orientation};

#[derive(Debug, Eq, PartialEq, Copy, Clone, Display)]
pub enum QualityColumn {
    #[strum(serialize = "base quality")]
    Base,
    #[strum(serialize = "mapping quality")]
    Mapping,
}

fn printable(b: &u8) -> char {
    char::from(*b)
}

/// Problems found while decoding a pile that still leave a usable record.
#[derive(thiserror::Error, Debug, Eq, PartialEq, Clone)]
pub enum Anomaly {
    #[error("stratum {stratum}: unknown base call character {:?}", printable(.byte))]
    UnknownBaseCall { stratum: usize, byte: u8 },

    #[error("stratum {stratum}: {error}")]
    MalformedRunLength {
        stratum: usize,
        error: RunLengthError,
    },

    #[error("stratum {stratum}: indel declares {expected} bases but only {found} follow")]
    TruncatedIndel {
        stratum: usize,
        expected: usize,
        found: usize,
    },

    #[error("stratum {stratum}: beyond the {len} characters of the {column} column")]
    QualityOutOfBounds {
        stratum: usize,
        column: QualityColumn,
        len: usize,
    },

    #[error(
        "stratum {stratum}: read start mapping quality {:?} != mapping quality {:?}",
        printable(.declared),
        printable(.columnar)
    )]
    MapQualityMismatch {
        stratum: usize,
        declared: u8,
        columnar: u8,
    },

    #[error("pile grew past the reported coverage of {coverage}")]
    PileGrown { coverage: u32 },

    #[error("reported coverage {coverage} but decoded {strata} strata")]
    CoverageShortfall { coverage: u32, strata: usize },
}

/// Output of a single [`PileDecoder::decode`] pass.
#[derive(Debug, Default)]
pub struct DecodedPile {
    pub pile: Vec<Stratum>,
    pub indels: Vec<Indel>,
    pub anomalies: Vec<Anomaly>,
}

/// Walks a base-call column left to right, producing one stratum per read token.
///
/// Qualities are looked up by stratum number rather than by byte offset into the
/// base calls, since a single token may span many bytes (`^I.`, `a+3ACG`, `,$`).
pub struct PileDecoder<'a> {
    calls: &'a [u8],
    base_qualities: &'a [u8],
    map_qualities: &'a [u8],
    ref_base: u8,
    coverage: Option<u32>,
    decoded: DecodedPile,
}

impl<'a> PileDecoder<'a> {
    pub fn new(fields: &RawFields<'a>, ref_base: u8, coverage: Option<u32>) -> Self {
        PileDecoder {
            calls: fields.base_calls,
            base_qualities: fields.base_qualities,
            map_qualities: fields.map_qualities,
            ref_base: ref_base.to_ascii_uppercase(),
            coverage,
            decoded: DecodedPile::default(),
        }
    }

    pub fn decode(mut self) -> DecodedPile {
        // samtools writes `*` for the calls of an uncovered position
        if self.coverage == Some(0) {
            return self.decoded;
        }
        let expected = self.coverage.unwrap_or(0) as usize;
        self.decoded.pile.reserve(expected);

        let mut consumed = 0;
        let mut i = 0;
        while i < self.calls.len() {
            if let Some(coverage) = self.coverage {
                if consumed == coverage as usize {
                    self.decoded.anomalies.push(Anomaly::PileGrown { coverage });
                }
            }
            let mut stratum = Stratum::default();
            i = self.read_start(&mut stratum, i);
            self.classify(&mut stratum, consumed, i);
            i = self.extend(&mut stratum, consumed, i);
            self.fill_qualities(&mut stratum, consumed);
            self.decoded.pile.push(stratum);
            consumed += 1;
            i += 1;
        }

        debug_assert_eq!(self.decoded.pile.len(), consumed);
        if let Some(coverage) = self.coverage {
            if consumed < coverage as usize {
                self.decoded.anomalies.push(Anomaly::CoverageShortfall {
                    coverage,
                    strata: consumed,
                });
            }
        }
        self.decoded
    }

    /// `^` plus the read's mapping quality character. Returns the offset of the base token.
    fn read_start(&self, stratum: &mut Stratum, i: usize) -> usize {
        if peek(self.calls, i) != Marker::ReadStart as u8 {
            return i;
        }
        stratum.structure.start = true;
        stratum.read_map_quality = peek(self.calls, i + 1);
        i + 2
    }

    fn classify(&mut self, stratum: &mut Stratum, index: usize, i: usize) {
        let c = peek(self.calls, i);
        match Marker::try_from(c) {
            Ok(Marker::ForwardMatch) => {
                stratum.orientation = Orientation::Forward;
                stratum.base = self.ref_base;
            }
            Ok(Marker::ReverseMatch) => {
                stratum.orientation = Orientation::Reverse;
                stratum.base = self.ref_base;
            }
            Ok(Marker::Gap) => stratum.mark_gap(),
            _ if is_base(c) => {
                stratum.orientation = if c.is_ascii_uppercase() {
                    Orientation::Forward
                } else {
                    Orientation::Reverse
                };
                stratum.base = c.to_ascii_uppercase();
            }
            _ => self.decoded.anomalies.push(Anomaly::UnknownBaseCall {
                stratum: index,
                byte: c,
            }),
        }
    }

    /// At most one of an indel or a read end may follow the base token.
    /// Returns the offset of the last byte consumed.
    ///
    /// A `$` directly after an indel sequence (`A+2AT$`, which samtools does emit) is not
    /// absorbed here. It is scanned as the next token, reported as an unknown base call and
    /// takes a stratum, so the qualities of every later stratum in the pile shift by one.
    fn extend(&mut self, stratum: &mut Stratum, index: usize, i: usize) -> usize {
        let next = peek(self.calls, i + 1);
        if let Some(kind) = IndelKind::from_marker(next) {
            let (length, digits_end) = match extract_signed_integer(self.calls, i + 1) {
                Ok(parsed) => parsed,
                Err(error) => {
                    let end = error.end();
                    self.decoded.anomalies.push(Anomaly::MalformedRunLength {
                        stratum: index,
                        error,
                    });
                    (0, end)
                }
            };
            let expected = length.unsigned_abs() as usize;
            let sequence_end = (digits_end + expected).min(self.calls.len());
            let found = sequence_end - digits_end;
            if found < expected {
                self.decoded.anomalies.push(Anomaly::TruncatedIndel {
                    stratum: index,
                    expected,
                    found,
                });
            }
            let indel = Indel::new(
                kind,
                length,
                &self.calls[digits_end..sequence_end],
                index,
                stratum.orientation,
            );
            stratum.indel = Some(self.decoded.indels.len());
            self.decoded.indels.push(indel);
            sequence_end - 1
        } else if next == Marker::ReadEnd as u8 {
            stratum.structure.end = true;
            i + 1
        } else {
            i
        }
    }

    fn fill_qualities(&mut self, stratum: &mut Stratum, index: usize) {
        match self.base_qualities.get(index) {
            Some(&q) => stratum.base_quality = q,
            None => self.decoded.anomalies.push(Anomaly::QualityOutOfBounds {
                stratum: index,
                column: QualityColumn::Base,
                len: self.base_qualities.len(),
            }),
        }
        if self.map_qualities.is_empty() {
            return;
        }
        match self.map_qualities.get(index) {
            Some(&q) => {
                stratum.map_quality = q;
                if let Some(indel) = stratum.indel {
                    self.decoded.indels[indel].map_quality = q;
                }
            }
            None => self.decoded.anomalies.push(Anomaly::QualityOutOfBounds {
                stratum: index,
                column: QualityColumn::Mapping,
                len: self.map_qualities.len(),
            }),
        }
        if stratum.read_map_quality != 0
            && stratum.map_quality != 0
            && stratum.read_map_quality != stratum.map_quality
        {
            self.decoded.anomalies.push(Anomaly::MapQualityMismatch {
                stratum: index,
                declared: stratum.read_map_quality,
                columnar: stratum.map_quality,
            });
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::GAP;

    fn decode(coverage: Option<u32>, calls: &[u8], base_q: &[u8], map_q: &[u8]) -> DecodedPile {
        let fields = RawFields {
            reference: b"chr1",
            position: b"100",
            ref_base: b"A",
            coverage: b"",
            base_calls: calls,
            base_qualities: base_q,
            map_qualities: map_q,
        };
        PileDecoder::new(&fields, b'A', coverage).decode()
    }

    #[test]
    fn test_plain_reads() {
        let decoded = decode(Some(5), b".,AcN", b"IIIII", b"");
        assert_eq!(decoded.pile.len(), 5);
        assert!(decoded.indels.is_empty());
        assert!(decoded.anomalies.is_empty());
        let bases = decoded.pile.iter().map(|s| s.base()).collect::<Vec<_>>();
        assert_eq!(bases, b"AAACN".to_vec());
        let orientations = decoded
            .pile
            .iter()
            .map(|s| s.orientation())
            .collect::<Vec<_>>();
        assert_eq!(
            orientations,
            vec![
                Orientation::Forward,
                Orientation::Reverse,
                Orientation::Forward,
                Orientation::Reverse,
                Orientation::Forward
            ]
        );
    }

    #[test]
    fn test_qualities_indexed_by_stratum() {
        let decoded = decode(Some(2), b".+2AT.+1G", b"I5", b"");
        assert_eq!(decoded.pile.len(), 2);
        assert_eq!(decoded.pile[0].base_quality(), b'I');
        assert_eq!(decoded.pile[1].base_quality(), b'5');
        assert_eq!(decoded.indels.len(), 2);
        assert_eq!(decoded.indels[0].sequence(), b"AT");
        assert_eq!(decoded.indels[1].sequence(), b"G");
        assert_eq!(decoded.pile[0].indel(), Some(0));
        assert_eq!(decoded.pile[1].indel(), Some(1));
        assert!(decoded.anomalies.is_empty());
    }

    #[test]
    fn test_reverse_deletion() {
        let decoded = decode(Some(1), b",-2nn", b"I", b"");
        let indel = &decoded.indels[0];
        assert_eq!(indel.kind(), IndelKind::Deletion);
        assert_eq!(indel.orientation(), Orientation::Reverse);
        assert_eq!(indel.length(), -2);
        assert_eq!(indel.sequence(), b"NN");
        assert_eq!(indel.qualified_sequence(), b"nn");
        assert_eq!(indel.stratum(), 0);
    }

    #[test]
    fn test_forward_insertion() {
        let decoded = decode(Some(1), b".+2NN", b"I", b"");
        let indel = &decoded.indels[0];
        assert_eq!(indel.kind(), IndelKind::Insertion);
        assert_eq!(indel.orientation(), Orientation::Forward);
        assert_eq!(indel.qualified_sequence(), b"NN");
    }

    #[test]
    fn test_read_start_and_end() {
        let decoded = decode(Some(1), b"^5A$", b"I", b"");
        assert_eq!(decoded.pile.len(), 1);
        let stratum = &decoded.pile[0];
        assert!(stratum.structure().is_start());
        assert!(stratum.structure().is_end());
        assert_eq!(stratum.read_map_quality(), b'5');
        assert_eq!(stratum.base(), b'A');
        assert_eq!(stratum.orientation(), Orientation::Forward);
        assert!(decoded.anomalies.is_empty());
    }

    #[test]
    fn test_gap_continuation() {
        let decoded = decode(Some(2), b"**", b"II", b"");
        assert_eq!(decoded.pile.len(), 2);
        assert!(decoded.indels.is_empty());
        for stratum in &decoded.pile {
            assert_eq!(stratum.base(), GAP);
            assert!(stratum.structure().is_gap());
        }
    }

    #[test]
    fn test_zero_coverage() {
        let decoded = decode(Some(0), b"*", b"*", b"");
        assert!(decoded.pile.is_empty());
        assert!(decoded.indels.is_empty());
        assert!(decoded.anomalies.is_empty());
    }

    #[test]
    fn test_unset_coverage() {
        let decoded = decode(None, b".,", b"II", b"");
        assert_eq!(decoded.pile.len(), 2);
        assert!(decoded.anomalies.is_empty());
    }

    #[test]
    fn test_pile_grows_past_coverage() {
        let decoded = decode(Some(2), b"...", b"III", b"");
        assert_eq!(decoded.pile.len(), 3);
        assert_eq!(decoded.anomalies, vec![Anomaly::PileGrown { coverage: 2 }]);
    }

    #[test]
    fn test_coverage_shortfall() {
        let decoded = decode(Some(4), b".,", b"II", b"");
        assert_eq!(decoded.pile.len(), 2);
        assert_eq!(
            decoded.anomalies,
            vec![Anomaly::CoverageShortfall {
                coverage: 4,
                strata: 2
            }]
        );
    }

    #[test]
    fn test_unknown_character() {
        let decoded = decode(Some(3), b".>,", b"III", b"");
        assert_eq!(decoded.pile.len(), 3);
        assert_eq!(decoded.pile[1].base(), 0);
        assert_eq!(decoded.pile[2].orientation(), Orientation::Reverse);
        assert_eq!(
            decoded.anomalies,
            vec![Anomaly::UnknownBaseCall {
                stratum: 1,
                byte: b'>'
            }]
        );
    }

    #[test]
    fn test_short_quality_columns() {
        let decoded = decode(Some(2), b".,", b"I", b"~");
        assert_eq!(decoded.pile[1].base_quality(), 0);
        assert_eq!(decoded.pile[1].map_quality(), 0);
        assert_eq!(
            decoded.anomalies,
            vec![
                Anomaly::QualityOutOfBounds {
                    stratum: 1,
                    column: QualityColumn::Base,
                    len: 1
                },
                Anomaly::QualityOutOfBounds {
                    stratum: 1,
                    column: QualityColumn::Mapping,
                    len: 1
                },
            ]
        );
    }

    #[test]
    fn test_map_quality_mismatch_keeps_columnar() {
        let decoded = decode(Some(1), b"^F.", b"I", b"<");
        let stratum = &decoded.pile[0];
        assert_eq!(stratum.map_quality(), b'<');
        assert_eq!(stratum.read_map_quality(), b'F');
        assert_eq!(
            decoded.anomalies,
            vec![Anomaly::MapQualityMismatch {
                stratum: 0,
                declared: b'F',
                columnar: b'<'
            }]
        );
    }

    #[test]
    fn test_indel_takes_mapping_quality() {
        let decoded = decode(Some(2), b",a-1t", b"II", b"0Z");
        assert_eq!(decoded.indels[0].stratum(), 1);
        assert_eq!(decoded.indels[0].map_quality(), b'Z');
    }

    #[test]
    fn test_truncated_indel() {
        let decoded = decode(Some(1), b".+4AC", b"I", b"");
        assert_eq!(decoded.pile.len(), 1);
        assert_eq!(decoded.indels[0].sequence(), b"AC");
        assert_eq!(
            decoded.anomalies,
            vec![Anomaly::TruncatedIndel {
                stratum: 0,
                expected: 4,
                found: 2
            }]
        );
    }

    #[test]
    fn test_malformed_run_length() {
        let decoded = decode(Some(2), b".+,", b"II", b"");
        assert_eq!(decoded.pile.len(), 2);
        assert_eq!(decoded.pile[1].orientation(), Orientation::Reverse);
        assert_eq!(decoded.indels[0].length(), 0);
        assert_eq!(
            decoded.anomalies,
            vec![Anomaly::MalformedRunLength {
                stratum: 0,
                error: RunLengthError::NoDigits { end: 2 }
            }]
        );
    }

    #[test]
    fn test_one_stratum_per_token() {
        let decoded = decode(None, b"^I.,$.+2AT,-3nnn**G^~c$..,", b"", b"");
        assert_eq!(decoded.pile.len(), 11);
        assert_eq!(decoded.indels.len(), 2);
    }

    #[test]
    fn test_deletion_without_digits() {
        let decoded = decode(Some(2), b",-,", b"II", b"");
        assert_eq!(decoded.pile.len(), 2);
        let indel = &decoded.indels[0];
        assert_eq!(indel.kind(), IndelKind::Deletion);
        assert_eq!(indel.orientation(), Orientation::Reverse);
        assert!(indel.sequence().is_empty());
        assert_eq!(indel.to_string(), "-0");
        assert_eq!(
            decoded.anomalies,
            vec![Anomaly::MalformedRunLength {
                stratum: 0,
                error: RunLengthError::NoDigits { end: 2 }
            }]
        );
    }

    #[test]
    fn test_zero_length_insertion() {
        let decoded = decode(Some(2), b".+0,", b"II", b"");
        assert_eq!(decoded.pile.len(), 2);
        assert!(decoded.anomalies.is_empty());
        let indel = &decoded.indels[0];
        assert_eq!(indel.kind(), IndelKind::Insertion);
        assert_eq!(indel.orientation(), Orientation::Forward);
        assert_eq!(indel.to_string(), "+0");
        assert_eq!(decoded.pile[1].orientation(), Orientation::Reverse);
    }

    #[test]
    fn test_read_end_after_indel_is_its_own_token() {
        let decoded = decode(Some(2), b"A+2AT$,", b"IJK", b"");
        assert_eq!(decoded.pile.len(), 3);
        assert!(!decoded.pile[0].structure().is_end());
        assert_eq!(decoded.pile[1].base(), 0);
        assert_eq!(decoded.pile[2].base_quality(), b'K');
        assert_eq!(
            decoded.anomalies,
            vec![
                Anomaly::UnknownBaseCall {
                    stratum: 1,
                    byte: b'$'
                },
                Anomaly::PileGrown { coverage: 2 },
            ]
        );
    }

    #[test]
    fn test_lowercase_reference_base() {
        let fields = RawFields {
            reference: b"chr1",
            position: b"1",
            ref_base: b"g",
            coverage: b"1",
            base_calls: b",",
            base_qualities: b"I",
            map_qualities: b"",
        };
        let decoded = PileDecoder::new(&fields, b'g', Some(1)).decode();
        assert_eq!(decoded.pile[0].base(), b'G');
    }

    #[test]
    fn test_anomaly_messages() {
        let anomaly = Anomaly::UnknownBaseCall {
            stratum: 3,
            byte: b'>',
        };
        assert_eq!(
            anomaly.to_string(),
            "stratum 3: unknown base call character '>'"
        );
        let anomaly = Anomaly::QualityOutOfBounds {
            stratum: 7,
            column: QualityColumn::Mapping,
            len: 7,
        };
        assert_eq!(
            anomaly.to_string(),
            "stratum 7: beyond the 7 characters of the mapping quality column"
        );
    }
}
