//! Per-sample genotype calls.

use std::fmt;

use crate::{
    allele::Base,
    count::AlleleCounts,
    utils::{round, write_joined, Decimal},
};

use super::Alts;

/// The number of decimal places of allele frequencies.
const FREQUENCY_DECIMALS: usize = 2;

/// The genotype call of a single sample at a site.
///
/// Alleles are numbered as in the site [`Alts`], with zero denoting the reference.
#[derive(Clone, Debug, PartialEq)]
pub enum Genotype {
    /// No call, either due to missing coverage or coverage out of bounds.
    Missing,
    /// Only the reference allele is observed.
    FixedRef {
        /// The number of reference observations.
        depth: usize,
    },
    /// Only a single alternate allele is observed.
    FixedAlt {
        /// The 1-based index of the alternate allele.
        index: usize,
        /// The number of alternate observations.
        depth: usize,
    },
    /// More than one allele is observed.
    Mixed {
        /// The observed alleles, in increasing order.
        alleles: Vec<usize>,
        /// The number of reference observations.
        reference_depth: usize,
        /// The number of observations of each observed alternate allele.
        alternate_depths: Vec<usize>,
        /// The total number of observations.
        depth: usize,
        /// The frequency of each observed alternate allele.
        frequencies: Vec<f64>,
    },
}

impl Genotype {
    /// Calls the genotype of a sample.
    ///
    /// Only observations of the reference and the alternate alleles count towards the depth of
    /// the sample, which must lie within `min_cov..=max_cov` for a call to be made. Samples
    /// without coverage are `Missing`.
    pub fn call(
        counts: Option<&AlleleCounts>,
        reference: Base,
        alts: &Alts,
        min_cov: usize,
        max_cov: usize,
    ) -> Self {
        let Some(counts) = counts else {
            return Self::Missing;
        };

        let mut restricted = *counts;
        restricted.retain(|base, _| base == reference || alts.contains(base));

        let depth = restricted.total();
        if depth < min_cov || depth > max_cov || restricted.is_empty() {
            return Self::Missing;
        }

        let reference_depth = restricted[reference];
        let present = alts
            .iter()
            .map(|(index, base)| (index, restricted[base]))
            .filter(|&(_, count)| count > 0)
            .collect::<Vec<_>>();

        match (reference_depth > 0, present.as_slice()) {
            (true, []) => Self::FixedRef { depth },
            (false, &[(index, _)]) => Self::FixedAlt { index, depth },
            (has_reference, present) => {
                let alleles = has_reference
                    .then_some(0)
                    .into_iter()
                    .chain(present.iter().map(|&(index, _)| index))
                    .collect();
                let alternate_depths = present.iter().map(|&(_, count)| count).collect::<Vec<_>>();
                let frequencies = alternate_depths
                    .iter()
                    .map(|&count| round(count as f64 / depth as f64, FREQUENCY_DECIMALS))
                    .collect();

                Self::Mixed {
                    alleles,
                    reference_depth: depth - alternate_depths.iter().sum::<usize>(),
                    alternate_depths,
                    depth,
                    frequencies,
                }
            }
        }
    }

    /// Returns `true` if the genotype is missing.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Genotype::Missing => f.write_str("./.:.:.:.:."),
            Genotype::FixedRef { depth } => write!(f, "0/0:{depth}:0:{depth}:0.0"),
            Genotype::FixedAlt { index, depth } => {
                write!(f, "{index}/{index}:0:{depth}:{depth}:1.0")
            }
            Genotype::Mixed {
                alleles,
                reference_depth,
                alternate_depths,
                depth,
                frequencies,
            } => {
                write_joined(f, alleles, "/")?;
                write!(f, ":{reference_depth}:")?;
                write_joined(f, alternate_depths, ",")?;
                write!(f, ":{depth}:")?;
                write_joined(f, frequencies.iter().map(|&x| Decimal(x)), ",")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(counts: &[(Base, usize)], reference: Base, alts: &[Base]) -> Genotype {
        let counts = AlleleCounts::from_iter(counts.iter().copied());
        let alts = Alts::from_counts(
            reference,
            &AlleleCounts::from_iter(alts.iter().map(|&b| (b, 1))),
        );

        Genotype::call(Some(&counts), reference, &alts, 1, 100)
    }

    #[test]
    fn test_call_mixed() {
        let genotype = call(&[(Base::A, 8), (Base::T, 2)], Base::A, &[Base::T]);

        assert_eq!(
            genotype,
            Genotype::Mixed {
                alleles: vec![0, 1],
                reference_depth: 8,
                alternate_depths: vec![2],
                depth: 10,
                frequencies: vec![0.2],
            }
        );
        assert_eq!(genotype.to_string(), "0/1:8:2:10:0.2");

        let genotype = call(&[(Base::A, 9), (Base::T, 1)], Base::A, &[Base::T]);
        assert_eq!(genotype.to_string(), "0/1:9:1:10:0.1");
    }

    #[test]
    fn test_call_frequency_rounding() {
        let genotype = call(&[(Base::A, 39), (Base::T, 1)], Base::A, &[Base::T]);
        assert_eq!(genotype.to_string(), "0/1:39:1:40:0.03");

        let genotype = call(&[(Base::A, 37), (Base::T, 3)], Base::A, &[Base::T]);
        assert_eq!(genotype.to_string(), "0/1:37:3:40:0.07");
    }

    #[test]
    fn test_call_mixed_without_reference() {
        let genotype = call(&[(Base::T, 2), (Base::G, 1)], Base::A, &[Base::T, Base::C, Base::G]);

        assert_eq!(genotype.to_string(), "1/3:0:2,1:3:0.67,0.33");
    }

    #[test]
    fn test_call_fixed() {
        let genotype = call(&[(Base::C, 5)], Base::C, &[Base::A]);
        assert_eq!(genotype, Genotype::FixedRef { depth: 5 });
        assert_eq!(genotype.to_string(), "0/0:5:0:5:0.0");

        let genotype = call(&[(Base::G, 7)], Base::C, &[Base::A, Base::G]);
        assert_eq!(genotype, Genotype::FixedAlt { index: 2, depth: 7 });
        assert_eq!(genotype.to_string(), "2/2:0:7:7:1.0");
    }

    #[test]
    fn test_call_ignores_filtered_alleles() {
        let genotype = call(&[(Base::A, 4), (Base::G, 3), (Base::N, 2)], Base::A, &[Base::T]);

        assert_eq!(genotype, Genotype::FixedRef { depth: 4 });
    }

    #[test]
    fn test_call_missing() {
        let alts = Alts::from_counts(Base::A, &AlleleCounts::from_iter([(Base::T, 1)]));
        let counts = AlleleCounts::from_iter([(Base::A, 8), (Base::T, 2)]);

        assert!(Genotype::call(None, Base::A, &alts, 0, 100).is_missing());
        assert!(Genotype::call(Some(&counts), Base::A, &alts, 11, 100).is_missing());
        assert!(Genotype::call(Some(&counts), Base::A, &alts, 1, 9).is_missing());
        assert!(!Genotype::call(Some(&counts), Base::A, &alts, 10, 10).is_missing());

        let empty = AlleleCounts::from_zeros();
        assert!(Genotype::call(Some(&empty), Base::A, &alts, 0, 100).is_missing());

        assert_eq!(Genotype::Missing.to_string(), "./.:.:.:.:.");
    }
}
