use std::fmt;

use poolsnp_core::pileup::{DecodeError, ParseSiteError};

/// A recoverable reason for skipping a pileup line.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Reason {
    MalformedLine,
    MalformedToken,
    QualityLengthMismatch,
    UnexpectedCharacter,
}

impl Reason {
    pub const N: usize = 4;

    pub const VARIANTS: [Reason; Self::N] = [
        Self::MalformedLine,
        Self::MalformedToken,
        Self::QualityLengthMismatch,
        Self::UnexpectedCharacter,
    ];

    pub fn reason(&self) -> &'static str {
        match self {
            Reason::MalformedLine => "malformed pileup line",
            Reason::MalformedToken => "malformed read bases",
            Reason::QualityLengthMismatch => "read bases and qualities differing in length",
            Reason::UnexpectedCharacter => "unexpected character in read bases",
        }
    }
}

impl From<&ParseSiteError> for Reason {
    fn from(_: &ParseSiteError) -> Self {
        Self::MalformedLine
    }
}

impl From<&DecodeError> for Reason {
    fn from(error: &DecodeError) -> Self {
        match error {
            DecodeError::MalformedToken { .. } => Self::MalformedToken,
            DecodeError::QualityLengthMismatch { .. } => Self::QualityLengthMismatch,
            DecodeError::UnexpectedCharacter { .. } => Self::UnexpectedCharacter,
        }
    }
}

/// Where in the input a line was skipped.
#[derive(Clone, Copy, Debug)]
pub enum Location<'a> {
    Line(usize),
    Sample {
        contig: &'a str,
        position: u64,
        sample: usize,
    },
}

impl<'a> fmt::Display for Location<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line(line) => write!(f, "line {line}"),
            Location::Sample {
                contig,
                position,
                sample,
            } => write!(f, "position '{contig}:{position}' in sample {sample}"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Warnings {
    counts: [usize; Reason::N],
}

impl Warnings {
    pub fn count(&self, reason: Reason) -> usize {
        self.counts[reason as u8 as usize]
    }

    pub fn count_mut(&mut self, reason: Reason) -> &mut usize {
        &mut self.counts[reason as u8 as usize]
    }

    pub fn warn_once(&mut self, location: Location, reason: Reason) {
        if self.count(reason) == 0 {
            let reason = reason.reason();

            log::warn!(
                "Skipping record at {location} due to {reason}. \
                This error will be shown only once, with a summary at the end."
            );
        }

        *self.count_mut(reason) += 1;
    }

    pub fn summarize(&self) {
        for reason in Reason::VARIANTS {
            let count = self.count(reason);

            if count > 0 {
                let reason = reason.reason();

                log::warn!("Skipped {count} records due to {reason}.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_count() {
        let mut warnings = Warnings::default();

        warnings.warn_once(Location::Line(1), Reason::MalformedLine);
        warnings.warn_once(
            Location::Sample {
                contig: "2L",
                position: 5,
                sample: 0,
            },
            Reason::from(&DecodeError::UnexpectedCharacter { character: b'?' }),
        );
        warnings.warn_once(Location::Line(3), Reason::MalformedLine);

        assert_eq!(warnings.count(Reason::MalformedLine), 2);
        assert_eq!(warnings.count(Reason::UnexpectedCharacter), 1);
        assert_eq!(warnings.count(Reason::MalformedToken), 0);
    }

    #[test]
    fn test_reason_index_matches_variants() {
        for (i, reason) in Reason::VARIANTS.iter().enumerate() {
            assert_eq!(*reason as u8 as usize, i);
        }
    }

    #[test]
    fn test_display_location() {
        assert_eq!(Location::Line(7).to_string(), "line 7");
        assert_eq!(
            Location::Sample {
                contig: "X",
                position: 10,
                sample: 2
            }
            .to_string(),
            "position 'X:10' in sample 2"
        );
    }
}
