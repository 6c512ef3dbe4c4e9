use std::fmt;

use getset::{CopyGetters, Getters};

use crate::parser::is_forward_base;
use crate::types::{IndelKind, Orientation, Text};

/// An insertion or deletion declared by one stratum of a pile.
#[derive(Debug, Clone, Eq, PartialEq, Getters, CopyGetters)]
pub struct Indel {
    #[getset(get_copy = "pub")]
    pub(crate) kind: IndelKind,
    /// Taken from the case of the first sequence character, or from the declaring
    /// read when the sequence is empty.
    #[getset(get_copy = "pub")]
    pub(crate) orientation: Orientation,
    /// Signed run length as written: positive for insertions, negative for deletions.
    #[getset(get_copy = "pub")]
    pub(crate) length: i32,
    /// Always uppercase; see [`Indel::qualified_sequence`] for the stranded form.
    #[getset(get = "pub")]
    pub(crate) sequence: Text,
    /// Index of the declaring stratum.
    #[getset(get_copy = "pub")]
    pub(crate) stratum: usize,
    #[getset(get_copy = "pub")]
    pub(crate) map_quality: u8,
}

impl Indel {
    pub fn new(
        kind: IndelKind,
        length: i32,
        sequence: &[u8],
        stratum: usize,
        read_orientation: Orientation,
    ) -> Self {
        let orientation = match sequence.first() {
            Some(&c) if is_forward_base(c) => Orientation::Forward,
            Some(_) => Orientation::Reverse,
            None => read_orientation,
        };
        Indel {
            kind,
            orientation,
            length,
            sequence: sequence.to_ascii_uppercase(),
            stratum,
            map_quality: 0,
        }
    }

    pub fn is_insertion(&self) -> bool {
        self.kind == IndelKind::Insertion
    }

    pub fn is_deletion(&self) -> bool {
        self.kind == IndelKind::Deletion
    }

    /// The sequence in the case that encodes the orientation (lowercase = reverse).
    pub fn qualified_sequence(&self) -> Text {
        self.sequence
            .iter()
            .map(|&b| self.orientation.qualify(b))
            .collect()
    }
}

/// Writes the indel back in base-call notation, e.g. `-2nn` or `+1G`.
impl fmt::Display for Indel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.kind,
            self.length.unsigned_abs(),
            String::from_utf8_lossy(&self.qualified_sequence())
        )
    }
}
