//! Masking of sites with insufficient or excessive coverage.

use std::fmt;

use crate::{
    call::Error,
    count::SiteCounts,
    coverage::MaxCoverageTable,
    pileup::{BaseFilter, Site},
};

/// A masker of pileup sites.
///
/// A sample fails at a site if it is uncovered or its number of retained observations lies outside
/// the coverage bounds. Unlike calling, all retained observations count, regardless of allele.
#[derive(Clone, Debug)]
pub struct Masker<'a> {
    min_cov: usize,
    base_filter: BaseFilter,
    table: &'a MaxCoverageTable,
}

impl<'a> Masker<'a> {
    /// Creates a new masker.
    pub fn new(min_cov: usize, base_filter: BaseFilter, table: &'a MaxCoverageTable) -> Self {
        Self {
            min_cov,
            base_filter,
            table,
        }
    }

    /// Masks a site.
    ///
    /// Returns `None` if the contig is not in the coverage table.
    pub fn mask<'s>(&self, site: &Site<'s>) -> Result<Option<Mask<'s>>, Error> {
        let Some(max_covs) = self.table.get(site.contig()) else {
            return Ok(None);
        };

        if max_covs.len() != site.samples().len() {
            return Err(Error::SampleCount {
                contig: site.contig().to_string(),
                expected: max_covs.len(),
                found: site.samples().len(),
            });
        }

        let counts = SiteCounts::aggregate(site, &self.base_filter)?;

        let failed = counts
            .samples()
            .iter()
            .zip(max_covs)
            .map(|(sample, &max_cov)| match sample {
                Some(counts) => {
                    let depth = counts.total();
                    depth < self.min_cov || depth > max_cov
                }
                None => true,
            })
            .collect();

        Ok(Some(Mask {
            contig: site.contig(),
            position: site.position(),
            failed,
        }))
    }
}

/// The per-sample coverage status at a site.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mask<'a> {
    contig: &'a str,
    position: u64,
    failed: Vec<bool>,
}

impl<'a> Mask<'a> {
    /// Returns the contig.
    pub fn contig(&self) -> &'a str {
        self.contig
    }

    /// Returns the position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns whether each sample failed.
    pub fn failed(&self) -> &[bool] {
        &self.failed
    }

    /// Returns `true` if every sample passed.
    pub fn is_clean(&self) -> bool {
        !self.failed.iter().any(|&failed| failed)
    }
}

impl<'a> fmt::Display for Mask<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t", self.contig, self.position)?;

        for &failed in self.failed.iter() {
            f.write_str(if failed { "1" } else { "0" })?;
        }

        Ok(())
    }
}
