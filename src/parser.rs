use std::convert::TryFrom;

use nom::bytes::complete::{tag, take_till};
use nom::character::complete::{digit0, one_of};
use nom::combinator::opt;
use nom::multi::separated_list0;
use nom::sequence::pair;
use nom::IResult;

use crate::error::{Error, Result, RunLengthError};
use crate::types::Marker;

/// Longest digit run accepted for an indel length; ten digits could overflow an `i32`.
pub const MAX_RUN_LENGTH_DIGITS: usize = 9;

/// reference, position, reference base, coverage, base calls, base qualities
pub const MANDATORY_FIELDS: usize = 6;

pub fn is_base(c: u8) -> bool {
    matches!(c.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N')
}

/// True only for an uppercase base; lowercase bases mark the reverse strand.
///
/// Anything that is not a base at all is reported and treated as reverse.
pub fn is_forward_base(c: u8) -> bool {
    match c {
        b'A' | b'C' | b'G' | b'T' | b'N' => true,
        b'a' | b'c' | b'g' | b't' | b'n' => false,
        _ => {
            log::warn!(
                "expected a base to derive orientation from, found {:?}",
                c as char
            );
            false
        }
    }
}

pub fn is_ref_match(c: u8) -> bool {
    matches!(
        Marker::try_from(c),
        Ok(Marker::ForwardMatch) | Ok(Marker::ReverseMatch)
    )
}

pub fn is_read_boundary(c: u8) -> bool {
    matches!(
        Marker::try_from(c),
        Ok(Marker::ReadStart) | Ok(Marker::ReadEnd)
    )
}

pub fn is_indel_marker(c: u8) -> bool {
    matches!(
        Marker::try_from(c),
        Ok(Marker::Insertion) | Ok(Marker::Deletion)
    )
}

/// Byte at `pos`, or `0` past the end of `s`.
#[inline]
pub fn peek(s: &[u8], pos: usize) -> u8 {
    s.get(pos).copied().unwrap_or(0)
}

fn signed_digits(input: &[u8]) -> IResult<&[u8], (Option<char>, &[u8])> {
    pair(opt(one_of("+-")), digit0)(input)
}

/// Parse an optional sign followed by at most [`MAX_RUN_LENGTH_DIGITS`] decimal digits,
/// starting at `start`.
///
/// Returns the signed value and the offset of the first byte after the digits.
///
/// # Examples
///
/// ```
/// use rust_pileup::parser::extract_signed_integer;
///
/// assert_eq!(extract_signed_integer(b".-12ACGT", 1), Ok((-12, 4)));
/// assert_eq!(extract_signed_integer(b"+3", 0), Ok((3, 2)));
/// assert!(extract_signed_integer(b"+A", 0).is_err());
/// ```
pub fn extract_signed_integer(
    s: &[u8],
    start: usize,
) -> std::result::Result<(i32, usize), RunLengthError> {
    let input = s.get(start..).unwrap_or(&[]);
    let (rest, (sign, digits)) =
        signed_digits(input).map_err(|_| RunLengthError::NoDigits { end: start })?;
    let end = start + (input.len() - rest.len());
    if digits.is_empty() {
        return Err(RunLengthError::NoDigits { end });
    }
    if digits.len() > MAX_RUN_LENGTH_DIGITS {
        return Err(RunLengthError::TooManyDigits {
            digits: digits.len(),
            max: MAX_RUN_LENGTH_DIGITS,
            end,
        });
    }
    let magnitude = digits
        .iter()
        .fold(0i32, |acc, d| acc * 10 + i32::from(d - b'0'));
    Ok((if sign == Some('-') { -magnitude } else { magnitude }, end))
}

/// The columns of a single pileup line, borrowed from the line buffer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RawFields<'a> {
    pub reference: &'a [u8],
    pub position: &'a [u8],
    pub ref_base: &'a [u8],
    pub coverage: &'a [u8],
    pub base_calls: &'a [u8],
    pub base_qualities: &'a [u8],
    // empty when the column is absent
    pub map_qualities: &'a [u8],
}

fn columns(separator: u8, input: &[u8]) -> IResult<&[u8], Vec<&[u8]>> {
    let sep = [separator];
    let (rest, found) = separated_list0(tag(&sep[..]), take_till(|c| c == separator))(input)?;
    Ok((rest, found))
}

impl<'a> RawFields<'a> {
    /// Split `line` into pileup columns. A trailing line terminator is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_pileup::parser::RawFields;
    ///
    /// let fields = RawFields::parse(b"chr1\t5\tA\t2\t.,\tII\n", b'\t', 1).unwrap();
    /// assert_eq!(fields.base_calls, b".,");
    /// assert!(fields.map_qualities.is_empty());
    /// ```
    pub fn parse(line: &'a [u8], separator: u8, line_number: usize) -> Result<Self> {
        let line = trim_line_end(line);
        let found = match columns(separator, line) {
            Ok((_, found)) => found,
            Err(_) => vec![],
        };
        if found.len() < MANDATORY_FIELDS {
            return Err(Error::MissingField {
                line: line_number,
                expected: MANDATORY_FIELDS,
                found: found.len(),
            });
        }
        if found.len() > MANDATORY_FIELDS + 1 {
            log::debug!(
                "line {}: ignoring {} columns past the mapping qualities",
                line_number,
                found.len() - MANDATORY_FIELDS - 1
            );
        }
        Ok(RawFields {
            reference: found[0],
            position: found[1],
            ref_base: found[2],
            coverage: found[3],
            base_calls: found[4],
            base_qualities: found[5],
            map_qualities: found.get(6).copied().unwrap_or(&[]),
        })
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
