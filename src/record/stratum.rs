use getset::CopyGetters;

use crate::types::{Orientation, ReadStructure, GAP};

/// One read's contribution at a position.
///
/// Qualities are the raw characters of the quality columns until a floor is applied
/// to the owning [`Pileup`](crate::record::Pileup), after which they are offsets above it.
/// `0` means the value was never supplied.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Stratum {
    /// Uppercase base, or [`GAP`] for a deletion continuing from upstream.
    pub(crate) base: u8,
    pub(crate) orientation: Orientation,
    pub(crate) base_quality: u8,
    pub(crate) map_quality: u8,
    pub(crate) structure: ReadStructure,
    /// Mapping quality the read declared at its `^` start token.
    pub(crate) read_map_quality: u8,
    /// Index into the owning pileup's indels.
    pub(crate) indel: Option<usize>,
}

impl Stratum {
    pub fn is_gap(&self) -> bool {
        self.structure.is_gap()
    }

    pub fn has_indel(&self) -> bool {
        self.indel.is_some()
    }

    /// The base in the case that encodes its orientation, as the base-call column writes it.
    pub fn qualified_base(&self) -> u8 {
        self.orientation.qualify(self.base)
    }

    pub(crate) fn mark_gap(&mut self) {
        self.base = GAP;
        self.structure.gap = true;
    }
}
