//! Nucleotides and read observations.

use std::fmt;

/// A base, stored as an upper-case ASCII letter.
///
/// Besides the nucleotides, any letter is a valid base, e.g. an IUPAC ambiguity code. Such bases
/// are counted like any other, but are never called as alternate alleles.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Base(u8);

impl Base {
    /// Adenine.
    pub const A: Self = Self(b'A');
    /// Thymine.
    pub const T: Self = Self(b'T');
    /// Cytosine.
    pub const C: Self = Self(b'C');
    /// Guanine.
    pub const G: Self = Self(b'G');
    /// Unknown base.
    pub const N: Self = Self(b'N');

    /// The number of distinct bases, one per letter.
    pub const N_BASES: usize = 26;

    /// The bases that may be called as alternate alleles, in canonical order.
    pub const CANONICAL: [Base; 4] = [Self::A, Self::T, Self::C, Self::G];

    /// Returns the base corresponding to an ASCII letter, ignoring case, if any.
    pub fn from_ascii(b: u8) -> Option<Self> {
        b.is_ascii_alphabetic().then(|| Self(b.to_ascii_uppercase()))
    }

    /// Returns an iterator over all bases, in index order.
    pub fn all() -> impl Iterator<Item = Base> {
        (b'A'..=b'Z').map(Self)
    }

    /// Returns the upper-case letter for the base.
    pub fn as_char(&self) -> char {
        char::from(self.0)
    }

    pub(crate) fn index(self) -> usize {
        usize::from(self.0 - b'A')
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A single read observation at a site.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Observation {
    /// Read matches the reference, on either strand.
    Reference,
    /// Read carries an explicit base.
    Base(Base),
}

impl Observation {
    /// Returns the observed base, resolving reference matches to the provided reference base.
    pub fn resolve(self, reference: Base) -> Base {
        match self {
            Observation::Reference => reference,
            Observation::Base(base) => base,
        }
    }
}
