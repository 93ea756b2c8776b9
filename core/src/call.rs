//! SNP calling at pileup sites.
//!
//! Calling proceeds in stages: the samples of a site are decoded and aggregated into
//! [`SiteCounts`], the site-wide alleles are filtered by [`Thresholds`] to determine the
//! [`Alts`], and each sample is classified into a [`Genotype`] bounded by the coverage table.

use std::fmt;

use crate::{
    count::{AggregateError, SiteCounts},
    coverage::MaxCoverageTable,
    pileup::{BaseFilter, Site},
};

pub mod filter;
pub use filter::{Alts, Thresholds};

pub mod genotype;
pub use genotype::Genotype;

pub mod record;
pub use record::{Header, Record};

/// Configuration of a [`Caller`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    min_cov: usize,
    thresholds: Thresholds,
    max_missing_fraction: f64,
    all_sites: bool,
    base_filter: BaseFilter,
}

impl Config {
    /// Returns the minimum per-sample coverage.
    pub fn min_cov(&self) -> usize {
        self.min_cov
    }

    /// Returns the site-wide allele thresholds.
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Returns the maximum fraction of samples without a call at polymorphic sites.
    pub fn max_missing_fraction(&self) -> f64 {
        self.max_missing_fraction
    }

    /// Returns `true` if all sites are called, not only polymorphic sites.
    pub fn all_sites(&self) -> bool {
        self.all_sites
    }

    /// Returns the base quality filter.
    pub fn base_filter(&self) -> BaseFilter {
        self.base_filter
    }

    /// Sets the minimum per-sample coverage.
    pub fn set_min_cov(mut self, min_cov: usize) -> Self {
        self.min_cov = min_cov;
        self
    }

    /// Sets the minimum site-wide count of an allele.
    pub fn set_min_count(mut self, min_count: usize) -> Self {
        self.thresholds = Thresholds::new(min_count, self.thresholds.min_freq());
        self
    }

    /// Sets the minimum site-wide frequency of an allele.
    pub fn set_min_freq(mut self, min_freq: f64) -> Self {
        self.thresholds = Thresholds::new(self.thresholds.min_count(), min_freq);
        self
    }

    /// Sets the maximum fraction of samples without a call at polymorphic sites.
    pub fn set_max_missing_fraction(mut self, max_missing_fraction: f64) -> Self {
        self.max_missing_fraction = max_missing_fraction;
        self
    }

    /// Sets whether to call all sites.
    pub fn set_all_sites(mut self, all_sites: bool) -> Self {
        self.all_sites = all_sites;
        self
    }

    /// Sets the base quality filter.
    pub fn set_base_filter(mut self, base_filter: BaseFilter) -> Self {
        self.base_filter = base_filter;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_cov: 10,
            thresholds: Thresholds::default(),
            max_missing_fraction: 0.1,
            all_sites: false,
            base_filter: BaseFilter::default(),
        }
    }
}

/// A caller of pileup sites.
#[derive(Clone, Debug)]
pub struct Caller<'a> {
    config: Config,
    table: &'a MaxCoverageTable,
}

impl<'a> Caller<'a> {
    /// Creates a new caller with the provided maximum coverage table.
    pub fn new(config: Config, table: &'a MaxCoverageTable) -> Self {
        Self { config, table }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Calls a site.
    ///
    /// Sites on contigs not in the coverage table are not called. Unless all sites are called,
    /// sites with fewer than two retained alleles, or too many samples without a call, are
    /// rejected.
    pub fn call<'s>(&self, site: &Site<'s>) -> Result<Call<'s>, Error> {
        let Some(max_covs) = self.table.get(site.contig()) else {
            return Ok(Call::UnknownContig);
        };

        let samples = site.samples();
        if max_covs.len() != samples.len() {
            return Err(Error::SampleCount {
                contig: site.contig().to_string(),
                expected: max_covs.len(),
                found: samples.len(),
            });
        }

        let counts = SiteCounts::aggregate(site, &self.config.base_filter)?;

        let totals = self.config.thresholds.filter(counts.totals());
        if !self.config.all_sites && totals.number_of_alleles() < 2 {
            return Ok(Call::Rejected(Rejection::NotPolymorphic));
        }

        let reference = site.reference();
        let alts = Alts::from_counts(reference, &totals);

        let genotypes = counts
            .samples()
            .iter()
            .zip(max_covs)
            .map(|(sample, &max_cov)| {
                Genotype::call(
                    sample.as_ref(),
                    reference,
                    &alts,
                    self.config.min_cov,
                    max_cov,
                )
            })
            .collect::<Vec<_>>();

        let missing = genotypes.iter().filter(|g| g.is_missing()).count();
        if !self.config.all_sites
            && missing as f64 / samples.len() as f64 > self.config.max_missing_fraction
        {
            return Ok(Call::Rejected(Rejection::MissingFraction));
        }

        let average_depth = totals.total() as f64 / samples.len() as f64;

        Ok(Call::Record(Record::new(
            site.contig(),
            site.position(),
            reference,
            alts,
            average_depth,
            genotypes,
        )))
    }
}

/// The outcome of calling a site.
#[derive(Clone, Debug, PartialEq)]
pub enum Call<'a> {
    /// The site was called.
    Record(Record<'a>),
    /// The contig of the site is not in the coverage table.
    UnknownContig,
    /// The site was rejected.
    Rejected(Rejection),
}

/// The reason for rejecting a site.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Rejection {
    /// Fewer than two alleles passed the thresholds.
    NotPolymorphic,
    /// Too many samples had no call.
    MissingFraction,
}

impl Rejection {
    /// The number of rejection reasons.
    pub const N: usize = 2;

    /// All rejection reasons.
    pub const VARIANTS: [Rejection; Self::N] = [Self::NotPolymorphic, Self::MissingFraction];

    /// Returns a description of the rejection reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::NotPolymorphic => "not being polymorphic",
            Rejection::MissingFraction => "too many samples without a call",
        }
    }
}

/// An error associated with calling a site.
#[derive(Debug)]
pub enum Error {
    /// A sample could not be decoded.
    Decode(AggregateError),
    /// The number of samples differs from the coverage table.
    SampleCount {
        /// The contig.
        contig: String,
        /// Number of samples in the coverage table.
        expected: usize,
        /// Number of samples at the site.
        found: usize,
    },
}

impl From<AggregateError> for Error {
    fn from(e: AggregateError) -> Self {
        Self::Decode(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(e) => write!(f, "{e}"),
            Error::SampleCount {
                contig,
                expected,
                found,
            } => write!(
                f,
                "found {found} samples on contig '{contig}', \
                but coverage table has {expected} samples"
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode(e) => Some(e),
            Error::SampleCount { .. } => None,
        }
    }
}
