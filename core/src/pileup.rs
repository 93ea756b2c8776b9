//! Reading and decoding of pileup.
//!
//! Pileup is a tab-separated text format with one line per site, giving the contig, position, and
//! reference base, followed by the depth, read bases, and base qualities of each sample.

pub mod decode;
pub use decode::{decode, BaseFilter, DecodeError, Decoded};

pub mod reader;
pub use reader::Reader;

pub mod site;
pub use site::{ParseSiteError, Sample, Site};
