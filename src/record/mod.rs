mod indel;
mod pileup;
mod stratum;

pub use indel::Indel;
pub use pileup::Pileup;
pub use stratum::Stratum;

/// Position-level information shared by everything that describes one reference coordinate.
pub trait Record {
    /// Name of the reference sequence.
    fn reference(&self) -> &str;

    /// 1-based position on the reference.
    fn position(&self) -> u64;

    fn ref_base(&self) -> u8;

    /// Read count reported by the pileup, or `None` if it was unset (`-1`).
    ///
    /// This is a hint only: the decoded pile may hold a different number of strata.
    fn coverage(&self) -> Option<u32>;
}
