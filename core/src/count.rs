//! Allele counts.

use std::{
    fmt,
    ops::{Index, IndexMut},
};

use crate::{
    allele::Base,
    pileup::{decode, BaseFilter, DecodeError, Decoded, Site},
};

/// Counts of observed bases.
///
/// A base is considered present if its count is non-zero.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct AlleleCounts([usize; Base::N_BASES]);

impl AlleleCounts {
    /// Creates new counts from zeros.
    pub fn from_zeros() -> Self {
        Self::default()
    }

    /// Returns the sum of all counts.
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Returns `true` if the base has a non-zero count.
    pub fn contains(&self, base: Base) -> bool {
        self[base] > 0
    }

    /// Returns an iterator over present bases and their counts, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Base, usize)> + '_ {
        Base::all()
            .zip(self.0.iter().copied())
            .filter(|&(_, count)| count > 0)
    }

    /// Returns the number of present bases.
    pub fn number_of_alleles(&self) -> usize {
        self.0.iter().filter(|&&count| count > 0).count()
    }

    /// Returns `true` if no base is present.
    pub fn is_empty(&self) -> bool {
        self.number_of_alleles() == 0
    }

    /// Sets the count of every base not matching the predicate to zero.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(Base, usize) -> bool,
    {
        for (base, count) in Base::all().zip(self.0.iter_mut()) {
            if !f(base, *count) {
                *count = 0;
            }
        }
    }
}

impl Index<Base> for AlleleCounts {
    type Output = usize;

    fn index(&self, base: Base) -> &Self::Output {
        &self.0[base.index()]
    }
}

impl IndexMut<Base> for AlleleCounts {
    fn index_mut(&mut self, base: Base) -> &mut Self::Output {
        &mut self.0[base.index()]
    }
}

impl FromIterator<(Base, usize)> for AlleleCounts {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Base, usize)>,
    {
        let mut counts = Self::from_zeros();
        for (base, count) in iter {
            counts[base] += count;
        }
        counts
    }
}

/// Per-sample and site-wide allele counts at a site.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SiteCounts {
    samples: Vec<Option<AlleleCounts>>,
    totals: AlleleCounts,
}

impl SiteCounts {
    /// Decodes the samples of a site and aggregates their observations.
    ///
    /// Reference matches are counted as the reference base of the site.
    pub fn aggregate(site: &Site, filter: &BaseFilter) -> Result<Self, AggregateError> {
        let reference = site.reference();
        let mut counts = Self {
            samples: Vec::with_capacity(site.samples().len()),
            totals: AlleleCounts::from_zeros(),
        };

        for (i, sample) in site.samples().iter().enumerate() {
            let decoded = decode(sample.bases, sample.qualities, filter)
                .map_err(|error| AggregateError { sample: i, error })?;

            let sample_counts = match decoded {
                Decoded::Uncovered => None,
                Decoded::Covered(observations) => {
                    let mut sample_counts = AlleleCounts::from_zeros();

                    for observation in observations {
                        let base = observation.resolve(reference);
                        sample_counts[base] += 1;
                        counts.totals[base] += 1;
                    }

                    Some(sample_counts)
                }
            };

            counts.samples.push(sample_counts);
        }

        Ok(counts)
    }

    /// Returns the counts of each sample, or `None` for samples without coverage.
    pub fn samples(&self) -> &[Option<AlleleCounts>] {
        &self.samples
    }

    /// Returns the counts summed over all samples.
    pub fn totals(&self) -> &AlleleCounts {
        &self.totals
    }
}

/// An error associated with decoding a sample at a site.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AggregateError {
    /// The 0-based index of the sample.
    pub sample: usize,
    /// The decoding error.
    pub error: DecodeError,
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for sample {}", self.error, self.sample)
    }
}

impl std::error::Error for AggregateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allele_counts() {
        let counts = AlleleCounts::from_iter([(Base::A, 8), (Base::T, 2), (Base::A, 1)]);

        assert_eq!(counts[Base::A], 9);
        assert_eq!(counts[Base::G], 0);
        assert_eq!(counts.total(), 11);
        assert_eq!(counts.number_of_alleles(), 2);
        assert!(counts.contains(Base::T));
        assert!(!counts.contains(Base::C));
        assert_eq!(
            counts.iter().collect::<Vec<_>>(),
            vec![(Base::A, 9), (Base::T, 2)]
        );
    }

    #[test]
    fn test_allele_counts_retain() {
        let mut counts = AlleleCounts::from_iter([(Base::A, 8), (Base::T, 2), (Base::N, 1)]);
        counts.retain(|base, _| base != Base::N);

        assert_eq!(counts, AlleleCounts::from_iter([(Base::A, 8), (Base::T, 2)]));

        counts.retain(|_, count| count > 8);
        assert!(counts.is_empty());
    }

    #[test]
    fn test_aggregate() -> Result<(), Box<dyn std::error::Error>> {
        let site = Site::parse(b"2L\t1\tC\t4\t.,aT\tIIII\t0\t*\t*\t3\t^F.$+1Gg,\tIII")?;
        let counts = SiteCounts::aggregate(&site, &BaseFilter::default())?;

        assert_eq!(
            counts.samples(),
            &[
                Some(AlleleCounts::from_iter([
                    (Base::C, 2),
                    (Base::A, 1),
                    (Base::T, 1)
                ])),
                None,
                Some(AlleleCounts::from_iter([(Base::C, 2), (Base::G, 1)])),
            ]
        );
        assert_eq!(
            counts.totals(),
            &AlleleCounts::from_iter([(Base::C, 4), (Base::A, 1), (Base::T, 1), (Base::G, 1)])
        );

        Ok(())
    }

    #[test]
    fn test_aggregate_sample_sum_at_most_depth() -> Result<(), Box<dyn std::error::Error>> {
        let site = Site::parse(b"2L\t1\tC\t5\t.,a*T\tII#II")?;
        let counts = SiteCounts::aggregate(&site, &BaseFilter::default())?;

        let sample = counts.samples()[0].unwrap();
        assert_eq!(sample.total(), 3);
        assert!(sample.total() <= site.samples()[0].depth);

        Ok(())
    }

    #[test]
    fn test_aggregate_counts_other_letters() -> Result<(), Box<dyn std::error::Error>> {
        let r = Base::from_ascii(b'R').unwrap();
        let site = Site::parse(b"2L\t1\tA\t4\t..TR\tIIII")?;
        let counts = SiteCounts::aggregate(&site, &BaseFilter::default())?;

        assert_eq!(
            counts.totals(),
            &AlleleCounts::from_iter([(Base::A, 2), (Base::T, 1), (r, 1)])
        );
        assert_eq!(counts.totals().number_of_alleles(), 3);
        assert_eq!(counts.totals().total(), 4);

        Ok(())
    }

    #[test]
    fn test_aggregate_error_names_sample() -> Result<(), Box<dyn std::error::Error>> {
        let site = Site::parse(b"2L\t1\tC\t1\t.\tI\t1\t?\tI")?;

        assert_eq!(
            SiteCounts::aggregate(&site, &BaseFilter::default()),
            Err(AggregateError {
                sample: 1,
                error: DecodeError::UnexpectedCharacter { character: b'?' },
            })
        );

        Ok(())
    }
}
