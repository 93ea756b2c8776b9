//! Site-wide allele filtering and alternate alleles.

use std::fmt;

use crate::{allele::Base, count::AlleleCounts, utils::write_joined};

/// Minimum count and frequency for an allele to be retained at a site.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    min_count: usize,
    min_freq: f64,
}

impl Thresholds {
    /// Creates new thresholds.
    pub fn new(min_count: usize, min_freq: f64) -> Self {
        Self {
            min_count,
            min_freq,
        }
    }

    /// Returns the minimum count.
    pub fn min_count(&self) -> usize {
        self.min_count
    }

    /// Returns the minimum frequency.
    pub fn min_freq(&self) -> f64 {
        self.min_freq
    }

    /// Returns the counts of alleles passing both thresholds.
    ///
    /// Frequencies are relative to the total of the unfiltered counts.
    pub fn filter(&self, totals: &AlleleCounts) -> AlleleCounts {
        let total = totals.total() as f64;

        let mut filtered = *totals;
        filtered.retain(|_, count| {
            !(count < self.min_count || (count as f64 / total) < self.min_freq)
        });
        filtered
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(3, 0.01)
    }
}

/// Alternate alleles at a site, in canonical order.
///
/// The canonical order is A, T, C, G. Alternate alleles are numbered from one in this order,
/// with zero denoting the reference.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Alts(Vec<Base>);

impl Alts {
    /// The placeholder used when there are no alternate alleles.
    pub const MISSING: &'static str = ".";

    /// Returns the canonical bases other than the reference that are present in the counts.
    pub fn from_counts(reference: Base, counts: &AlleleCounts) -> Self {
        Self(
            Base::CANONICAL
                .into_iter()
                .filter(|&base| base != reference && counts.contains(base))
                .collect(),
        )
    }

    /// Returns the 1-based index of an alternate allele, if present.
    pub fn index_of(&self, base: Base) -> Option<usize> {
        self.0.iter().position(|&alt| alt == base).map(|i| i + 1)
    }

    /// Returns `true` if the base is an alternate allele.
    pub fn contains(&self, base: Base) -> bool {
        self.0.contains(&base)
    }

    /// Returns an iterator over the 1-based index and base of each alternate allele.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Base)> + '_ {
        self.0.iter().enumerate().map(|(i, &base)| (i + 1, base))
    }

    /// Returns the number of alternate alleles.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no alternate alleles.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Alts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str(Self::MISSING)
        } else {
            write_joined(f, &self.0, ",")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter() {
        let totals = AlleleCounts::from_iter([(Base::A, 17), (Base::T, 3)]);

        assert_eq!(Thresholds::new(2, 0.05).filter(&totals), totals);
        assert_eq!(
            Thresholds::new(4, 0.05).filter(&totals),
            AlleleCounts::from_iter([(Base::A, 17)])
        );
        assert_eq!(
            Thresholds::new(2, 0.2).filter(&totals),
            AlleleCounts::from_iter([(Base::A, 17)])
        );
    }

    #[test]
    fn test_filter_uses_unfiltered_total() {
        // G would pass at 1/11 if C were removed first
        let totals = AlleleCounts::from_iter([(Base::A, 10), (Base::C, 1), (Base::G, 1)]);
        let thresholds = Thresholds::new(1, 0.09);

        assert_eq!(
            thresholds.filter(&totals),
            AlleleCounts::from_iter([(Base::A, 10)])
        );
    }

    #[test]
    fn test_filter_frequency_boundary() {
        let totals = AlleleCounts::from_iter([(Base::A, 3), (Base::T, 1)]);

        assert_eq!(Thresholds::new(1, 0.25).filter(&totals), totals);
    }

    #[test]
    fn test_filter_idempotent() {
        let thresholds = Thresholds::new(3, 0.1);

        for totals in [
            AlleleCounts::from_iter([(Base::A, 17), (Base::T, 3)]),
            AlleleCounts::from_iter([(Base::A, 10), (Base::T, 2), (Base::C, 5), (Base::N, 1)]),
            AlleleCounts::from_iter([(Base::G, 1), (Base::C, 1)]),
            AlleleCounts::from_zeros(),
        ] {
            let once = thresholds.filter(&totals);
            assert_eq!(thresholds.filter(&once), once);
        }
    }

    #[test]
    fn test_alts_canonical_order() {
        let counts =
            AlleleCounts::from_iter([(Base::G, 1), (Base::C, 2), (Base::A, 3), (Base::N, 4)]);
        let alts = Alts::from_counts(Base::A, &counts);

        assert_eq!(alts, Alts(vec![Base::C, Base::G]));
        assert_eq!(alts.index_of(Base::C), Some(1));
        assert_eq!(alts.index_of(Base::G), Some(2));
        assert_eq!(alts.index_of(Base::A), None);
        assert_eq!(alts.to_string(), "C,G");
    }

    #[test]
    fn test_alts_exclude_other_letters() {
        let r = Base::from_ascii(b'R').unwrap();
        let counts = AlleleCounts::from_iter([(Base::A, 2), (Base::T, 1), (r, 1)]);

        assert_eq!(Thresholds::new(1, 0.0).filter(&counts), counts);
        assert_eq!(Alts::from_counts(Base::A, &counts).to_string(), "T");
    }

    #[test]
    fn test_alts_missing() {
        let counts = AlleleCounts::from_iter([(Base::T, 10)]);
        let alts = Alts::from_counts(Base::T, &counts);

        assert!(alts.is_empty());
        assert_eq!(alts.to_string(), ".");
    }
}
