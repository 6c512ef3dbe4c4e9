use getset::CopyGetters;

/// Options for [`PileupRecords`](crate::reader::PileupRecords).
///
/// # Examples
///
/// ```
/// use rust_pileup::config::ReaderConfig;
///
/// let config = ReaderConfig::default()
///     .with_min_base_quality(b'!')
///     .with_min_map_quality(b'!');
/// assert_eq!(config.separator(), b'\t');
/// assert!(config.decode_pile());
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct ReaderConfig {
    /// Column separator.
    separator: u8,
    /// Floor subtracted from base qualities after decoding; 0 leaves them raw.
    min_base_quality: u8,
    /// Floor subtracted from mapping qualities after decoding; 0 leaves them raw.
    min_map_quality: u8,
    /// When false, only the position columns are parsed and every pile stays empty.
    decode_pile: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            separator: b'\t',
            min_base_quality: 0,
            min_map_quality: 0,
            decode_pile: true,
        }
    }
}

impl ReaderConfig {
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_min_base_quality(mut self, floor: u8) -> Self {
        self.min_base_quality = floor;
        self
    }

    pub fn with_min_map_quality(mut self, floor: u8) -> Self {
        self.min_map_quality = floor;
        self
    }

    pub fn with_decode_pile(mut self, decode_pile: bool) -> Self {
        self.decode_pile = decode_pile;
        self
    }
}
