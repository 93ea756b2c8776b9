//! Building maximum coverage thresholds from the empirical coverage distribution.

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};

use crate::pileup::Site;

use super::{Error, MaxCoverageTable};

/// A maximum coverage cutoff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cutoff {
    /// The same fixed maximum coverage for all samples.
    Fixed(usize),
    /// A quantile of the coverage distribution of each sample, in `[0, 1)`.
    Quantile(f64),
}

impl From<f64> for Cutoff {
    /// Cutoffs of at least one are fixed coverages, otherwise quantiles.
    fn from(cutoff: f64) -> Self {
        if cutoff >= 1.0 {
            Cutoff::Fixed(cutoff as usize)
        } else {
            Cutoff::Quantile(cutoff)
        }
    }
}

/// The distribution of coverage of one sample on one contig.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Histogram {
    counts: BTreeMap<usize, usize>,
    total: usize,
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            counts: BTreeMap::from([(0, 0)]),
            total: 0,
        }
    }
}

impl Histogram {
    /// Adds a site with the provided depth.
    pub fn add(&mut self, depth: usize) {
        *self.counts.entry(depth).or_insert(0) += 1;
        self.total += 1;
    }

    /// Returns the number of sites added.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns the smallest depth such that the fraction of sites with strictly lower depth
    /// exceeds the quantile.
    ///
    /// If no depth satisfies this, the largest observed depth is returned.
    pub fn quantile(&self, quantile: f64) -> usize {
        if self.total == 0 {
            return 0;
        }

        let mut below = 0;
        let mut last = 0;

        for (&depth, &count) in self.counts.iter() {
            if below as f64 / self.total as f64 > quantile {
                return depth;
            }

            below += count;
            last = depth;
        }

        last
    }
}

/// Whether a builder needs more sites.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    /// More sites may change the table.
    Continue,
    /// No further sites are needed.
    Finished,
}

/// A builder for a maximum coverage table from pileup sites.
///
/// Sites of a contig are assumed to be contiguous.
#[derive(Clone, Debug)]
pub struct TableBuilder {
    cutoff: Cutoff,
    contigs: Option<IndexSet<String>>,
    histograms: IndexMap<String, Vec<Histogram>>,
}

impl TableBuilder {
    /// Creates a new builder.
    pub fn new(cutoff: Cutoff) -> Self {
        Self {
            cutoff,
            contigs: None,
            histograms: IndexMap::new(),
        }
    }

    /// Sets the contigs to build thresholds for.
    ///
    /// By default, thresholds are built for all contigs. With a fixed cutoff, the requested
    /// contigs are written in the provided order.
    pub fn set_contigs(mut self, contigs: Option<Vec<String>>) -> Self {
        self.contigs = contigs.map(IndexSet::from_iter);
        self
    }

    /// Adds the raw depths of a site.
    pub fn add(&mut self, site: &Site) -> Result<Status, Error> {
        let contig = site.contig();
        let samples = site.samples();

        if let (Cutoff::Fixed(_), Some(contigs)) = (self.cutoff, &self.contigs) {
            for contig in contigs {
                self.histograms
                    .insert(contig.clone(), vec![Histogram::default(); samples.len()]);
            }

            return Ok(Status::Finished);
        }

        if let Some(contigs) = &self.contigs {
            if !contigs.contains(contig) {
                return Ok(if self.histograms.len() == contigs.len() {
                    Status::Finished
                } else {
                    Status::Continue
                });
            }
        }

        let histograms = self
            .histograms
            .entry(contig.to_string())
            .or_insert_with(|| vec![Histogram::default(); samples.len()]);

        if histograms.len() != samples.len() {
            return Err(Error::SampleCount {
                contig: contig.to_string(),
                expected: histograms.len(),
                found: samples.len(),
            });
        }

        if let Cutoff::Quantile(_) = self.cutoff {
            for (histogram, sample) in histograms.iter_mut().zip(samples) {
                histogram.add(sample.depth);
            }
        }

        Ok(Status::Continue)
    }

    /// Returns the contigs seen so far, in order of appearance.
    pub fn contigs(&self) -> impl Iterator<Item = &str> {
        self.histograms.keys().map(String::as_str)
    }

    /// Returns the maximum coverage table.
    pub fn build(self) -> MaxCoverageTable {
        let cutoff = self.cutoff;

        let mut table = MaxCoverageTable::default();
        for (contig, histograms) in self.histograms {
            let thresholds = histograms
                .iter()
                .map(|histogram| match cutoff {
                    Cutoff::Fixed(coverage) => coverage,
                    Cutoff::Quantile(quantile) => histogram.quantile(quantile),
                })
                .collect();

            table.insert(contig, thresholds);
        }

        table
    }
}
