//! Decoding of pileup read bases.
//!
//! The read bases of a sample are a concatenation of tokens:
//!
//! * `^` followed by a single mapping quality character marks the start of a read;
//! * `$` marks the end of a read;
//! * `+` or `-`, followed by a decimal length `n`, followed by `n` bases is an indel following the
//!   current position;
//! * any other character is a base call for one read, aligned with one quality character.
//!
//! Base calls are `.` or `,` for a reference match on the forward or reverse strand, a letter for
//! a mismatch (upper case forward, lower case reverse), or `*`/`#` for a deletion. Letters other
//! than nucleotides, such as IUPAC codes, are kept as bases of their own.

use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{tag, take},
    character::complete::{digit1, none_of},
    combinator::{map, map_res, value},
    multi::length_data,
    sequence::preceded,
    IResult,
};

use crate::allele::{Base, Observation};

/// The read bases marking a sample without coverage.
pub const NO_COVERAGE: &[u8] = b"*";

/// A token in the read bases of a sample.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Token {
    /// Start of a read, with its mapping quality character.
    ReadStart,
    /// End of a read.
    ReadEnd,
    /// Insertion or deletion after the current position.
    Indel,
    /// Base call of a single read.
    Base(u8),
}

fn read_start(input: &[u8]) -> IResult<&[u8], Token> {
    value(Token::ReadStart, preceded(tag("^"), take(1usize)))(input)
}

fn read_end(input: &[u8]) -> IResult<&[u8], Token> {
    value(Token::ReadEnd, tag("$"))(input)
}

fn indel_length(input: &[u8]) -> IResult<&[u8], usize> {
    map_res(map_res(digit1, std::str::from_utf8), str::parse::<usize>)(input)
}

fn indel(input: &[u8]) -> IResult<&[u8], Token> {
    value(
        Token::Indel,
        preceded(alt((tag("+"), tag("-"))), length_data(indel_length)),
    )(input)
}

fn base(input: &[u8]) -> IResult<&[u8], Token> {
    map(none_of("^$+-"), |c| Token::Base(c as u8))(input)
}

fn token(input: &[u8]) -> IResult<&[u8], Token> {
    alt((read_start, read_end, indel, base))(input)
}

/// An iterator over the tokens of raw read bases.
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    src: &'a [u8],
    offset: usize,
}

impl<'a> Tokens<'a> {
    /// Creates a new tokenizer over the provided read bases.
    pub fn new(src: &'a [u8]) -> Self {
        Self { src, offset: 0 }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.src[self.offset..];

        if rest.is_empty() {
            return None;
        }

        match token(rest) {
            Ok((next, token)) => {
                self.offset += rest.len() - next.len();
                Some(Ok(token))
            }
            Err(_) => {
                let error = DecodeError::MalformedToken {
                    offset: self.offset,
                };
                self.offset = self.src.len();
                Some(Err(error))
            }
        }
    }
}

/// PHRED offset and minimum base quality used when decoding.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BaseFilter {
    offset: u8,
    min_quality: u8,
}

impl BaseFilter {
    /// The PHRED offset of Sanger and Illumina 1.8+ quality encoding.
    pub const SANGER_OFFSET: u8 = 33;

    /// The PHRED offset of Illumina 1.3 to 1.7 quality encoding.
    pub const ILLUMINA_OFFSET: u8 = 64;

    /// Creates a new base filter.
    pub fn new(offset: u8, min_quality: u8) -> Self {
        Self {
            offset,
            min_quality,
        }
    }

    /// Creates a new base filter from an Illumina FASTQ quality coding version.
    pub fn from_coding(coding: f64, min_quality: u8) -> Self {
        Self::new(phred_offset(coding), min_quality)
    }

    /// Returns the PHRED offset.
    pub fn offset(&self) -> u8 {
        self.offset
    }

    /// Returns the minimum base quality.
    pub fn min_quality(&self) -> u8 {
        self.min_quality
    }

    /// Returns `true` if a base with the provided quality character passes the filter.
    pub fn passes(&self, quality: u8) -> bool {
        i16::from(quality) - i16::from(self.offset) >= i16::from(self.min_quality)
    }
}

impl Default for BaseFilter {
    fn default() -> Self {
        Self::new(Self::SANGER_OFFSET, 15)
    }
}

/// Returns the PHRED offset of an Illumina FASTQ quality coding version.
pub fn phred_offset(coding: f64) -> u8 {
    if (1.0..1.8).contains(&coding) {
        BaseFilter::ILLUMINA_OFFSET
    } else {
        BaseFilter::SANGER_OFFSET
    }
}

/// The decoded read bases of one sample.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Decoded {
    /// Sample has no coverage.
    Uncovered,
    /// Observations retained after filtering, possibly none.
    Covered(Vec<Observation>),
}

impl Decoded {
    /// Returns the number of retained observations.
    pub fn depth(&self) -> usize {
        match self {
            Decoded::Uncovered => 0,
            Decoded::Covered(observations) => observations.len(),
        }
    }
}

/// Decodes the read bases of a sample into observations.
///
/// Bases are retained if their aligned quality passes the filter. Deletions are dropped.
pub fn decode(bases: &[u8], qualities: &[u8], filter: &BaseFilter) -> Result<Decoded, DecodeError> {
    if bases == NO_COVERAGE {
        return Ok(Decoded::Uncovered);
    }

    let mut observations = Vec::with_capacity(qualities.len());
    let mut calls = 0;

    for token in Tokens::new(bases) {
        let Token::Base(call) = token? else {
            continue;
        };

        let quality = *qualities
            .get(calls)
            .ok_or(DecodeError::QualityLengthMismatch {
                bases: calls + 1,
                qualities: qualities.len(),
            })?;
        calls += 1;

        if !filter.passes(quality) {
            continue;
        }

        match call {
            b'*' | b'#' => (),
            b'.' | b',' => observations.push(Observation::Reference),
            b => match Base::from_ascii(b) {
                Some(base) => observations.push(Observation::Base(base)),
                None => return Err(DecodeError::UnexpectedCharacter { character: b }),
            },
        }
    }

    if calls != qualities.len() {
        return Err(DecodeError::QualityLengthMismatch {
            bases: calls,
            qualities: qualities.len(),
        });
    }

    Ok(Decoded::Covered(observations))
}

/// An error associated with decoding read bases.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DecodeError {
    /// A read start, read end, or indel was malformed.
    MalformedToken {
        /// Byte offset of the token in the read bases.
        offset: usize,
    },
    /// The number of base calls differs from the number of qualities.
    QualityLengthMismatch {
        /// Number of base calls, or the number read before qualities ran out.
        bases: usize,
        /// Number of qualities.
        qualities: usize,
    },
    /// A base call was not a reference match, a letter, or a deletion.
    UnexpectedCharacter {
        /// The offending character.
        character: u8,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MalformedToken { offset } => {
                write!(f, "malformed read bases at offset {offset}")
            }
            DecodeError::QualityLengthMismatch { bases, qualities } => write!(
                f,
                "found {bases} base calls but {qualities} base qualities"
            ),
            DecodeError::UnexpectedCharacter { character } => write!(
                f,
                "unexpected character '{}' in read bases",
                char::from(*character).escape_default()
            ),
        }
    }
}

impl std::error::Error for DecodeError {}
