use std::convert::TryFrom;

use num_enum::TryFromPrimitive;
use strum::{Display, EnumString};

/// Base symbol stored for strata that continue a deletion opened upstream.
pub const GAP: u8 = b'*';

pub type Text = Vec<u8>;

#[cfg(not(feature = "sync"))]
pub type Shared<T> = std::rc::Rc<T>;
#[cfg(feature = "sync")]
pub type Shared<T> = std::sync::Arc<T>;

/// Bytes with a structural meaning in the base-call column.
#[derive(Debug, Eq, PartialEq, Copy, Clone, TryFromPrimitive)]
#[repr(u8)]
pub enum Marker {
    ForwardMatch = b'.',
    ReverseMatch = b',',
    ReadStart = b'^',
    ReadEnd = b'$',
    Insertion = b'+',
    Deletion = b'-',
    Gap = b'*',
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Display, EnumString)]
pub enum Orientation {
    #[strum(serialize = ".")]
    Forward,
    #[strum(serialize = ",")]
    Reverse,
    #[strum(serialize = "?")]
    Unset,
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::Unset
    }
}

impl Orientation {
    /// Render `base` in the case that encodes this orientation (lowercase = reverse).
    pub fn qualify(self, base: u8) -> u8 {
        match self {
            Orientation::Reverse => base.to_ascii_lowercase(),
            _ => base,
        }
    }
}

/// Where a stratum sits within its read. A single-base read is both start and end.
///
/// `gap` marks a placeholder continuing a deletion opened at an earlier position;
/// it is not linked to that deletion.
#[derive(Debug, Default, Eq, PartialEq, Copy, Clone)]
pub struct ReadStructure {
    pub(crate) start: bool,
    pub(crate) end: bool,
    pub(crate) gap: bool,
}

impl ReadStructure {
    pub fn is_start(&self) -> bool {
        self.start
    }

    pub fn is_end(&self) -> bool {
        self.end
    }

    pub fn is_gap(&self) -> bool {
        self.gap
    }

    pub fn is_none(&self) -> bool {
        !(self.start || self.end || self.gap)
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Display, EnumString)]
pub enum IndelKind {
    #[strum(serialize = "+")]
    Insertion,
    #[strum(serialize = "-")]
    Deletion,
}

impl IndelKind {
    /// The kind announced by a `+` or `-` in the base-call column.
    pub fn from_marker(c: u8) -> Option<Self> {
        match Marker::try_from(c) {
            Ok(Marker::Insertion) => Some(IndelKind::Insertion),
            Ok(Marker::Deletion) => Some(IndelKind::Deletion),
            _ => None,
        }
    }
}

/// How far a position record has been parsed.
#[derive(Debug, Default, Eq, PartialEq, Copy, Clone)]
pub struct ParseState {
    pub(crate) fields_loaded: bool,
    pub(crate) pile_decoded: bool,
}

impl ParseState {
    pub fn fields_loaded(&self) -> bool {
        self.fields_loaded
    }

    pub fn pile_decoded(&self) -> bool {
        self.pile_decoded
    }

    pub fn is_complete(&self) -> bool {
        self.fields_loaded && self.pile_decoded
    }
}
