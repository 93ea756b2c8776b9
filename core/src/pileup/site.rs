//! Pileup site.

use std::{fmt, str};

use crate::allele::Base;

const FIELD_SEPARATOR: u8 = b'\t';

/// The raw pileup of one sample at a site.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Sample<'a> {
    /// Number of reads covering the site.
    pub depth: usize,
    /// Encoded read bases.
    pub bases: &'a [u8],
    /// Base qualities, aligned with the base calls in the read bases.
    pub qualities: &'a [u8],
}

/// A single pileup line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Site<'a> {
    contig: &'a str,
    position: u64,
    reference: Base,
    samples: Vec<Sample<'a>>,
}

impl<'a> Site<'a> {
    /// Returns the contig name.
    pub fn contig(&self) -> &'a str {
        self.contig
    }

    /// Returns the 1-based position within the contig.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns the reference base.
    pub fn reference(&self) -> Base {
        self.reference
    }

    /// Returns the samples in input order.
    pub fn samples(&self) -> &[Sample<'a>] {
        &self.samples
    }

    /// Parses a site from a pileup line without its line terminator.
    ///
    /// A line must contain a contig, a position, and a reference base, followed by the depth, read
    /// bases, and qualities of at least one sample.
    pub fn parse(line: &'a [u8]) -> Result<Self, ParseSiteError> {
        let mut fields = line.split(|&b| b == FIELD_SEPARATOR);
        let mut next_field = |name| fields.next().ok_or(ParseSiteError::MissingField(name));

        let contig = str::from_utf8(next_field("contig")?)
            .map_err(|_| ParseSiteError::InvalidField("contig"))?;
        let position = parse_number(next_field("position")?, "position")?;
        let reference = match next_field("reference")? {
            &[b] => Base::from_ascii(b).ok_or(ParseSiteError::InvalidField("reference"))?,
            _ => return Err(ParseSiteError::InvalidField("reference")),
        };

        let mut samples = Vec::new();
        while let Some(depth) = fields.next() {
            let (Some(bases), Some(qualities)) = (fields.next(), fields.next()) else {
                return Err(ParseSiteError::IncompleteSample {
                    sample: samples.len(),
                });
            };

            samples.push(Sample {
                depth: parse_number(depth, "depth")?,
                bases,
                qualities,
            });
        }

        if samples.is_empty() {
            return Err(ParseSiteError::MissingField("depth"));
        }

        Ok(Self {
            contig,
            position,
            reference,
            samples,
        })
    }
}

fn parse_number<T>(field: &[u8], name: &'static str) -> Result<T, ParseSiteError>
where
    T: str::FromStr,
{
    str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(ParseSiteError::InvalidField(name))
}

/// Returns the number of fields in a line.
pub(crate) fn count_fields(line: &[u8]) -> usize {
    line.split(|&b| b == FIELD_SEPARATOR).count()
}

/// An error associated with parsing a pileup line.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ParseSiteError {
    /// A required field is missing.
    MissingField(&'static str),
    /// A field could not be parsed.
    InvalidField(&'static str),
    /// A sample does not have all of depth, bases, and qualities.
    IncompleteSample {
        /// The 0-based index of the sample.
        sample: usize,
    },
}

impl fmt::Display for ParseSiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseSiteError::MissingField(name) => write!(f, "missing {name} field"),
            ParseSiteError::InvalidField(name) => write!(f, "invalid {name} field"),
            ParseSiteError::IncompleteSample { sample } => {
                write!(f, "incomplete fields for sample {sample}")
            }
        }
    }
}

impl std::error::Error for ParseSiteError {}
