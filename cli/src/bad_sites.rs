use std::{io, path::PathBuf};

use anyhow::Error;

use clap::Parser;

use poolsnp_core::{
    call,
    mask::{Mask, Masker},
    pileup::{BaseFilter, Site},
    Input,
};

use crate::runner::{open_pileup, read_table, Process, Runner};

/// Find sites with samples outside the coverage bounds.
///
/// For each site on a contig in the maximum coverage table, writes the contig, the position, and
/// a string with one character per sample: '1' if the sample is uncovered or its number of
/// retained observations is outside the bounds, and '0' otherwise. Sites where every sample is
/// within the bounds are not written.
#[derive(Debug, Parser)]
pub struct BadSites {
    /// Input pileup file.
    ///
    /// If no file is provided, stdin will be used. Gzip-compressed input is detected
    /// automatically.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Maximum coverage table.
    #[arg(long, value_name = "FILE")]
    max_cov: PathBuf,

    /// Minimum coverage of a sample.
    #[arg(long, default_value_t = 10, value_name = "INT")]
    min_cov: usize,

    /// Minimum base quality.
    #[arg(long, default_value_t = 15, value_name = "INT")]
    base_quality_threshold: u8,

    /// Base quality encoding version.
    #[arg(long, default_value_t = 1.8, value_name = "FLOAT")]
    coding: f64,

    /// Promote warnings to errors.
    #[arg(long)]
    strict: bool,
}

impl BadSites {
    pub fn run(self) -> Result<(), Error> {
        let input = Input::new(self.input.clone())?;
        let table = read_table(&self.max_cov)?;

        let base_filter = BaseFilter::from_coding(self.coding, self.base_quality_threshold);
        let masker = Masker::new(self.min_cov, base_filter, &table);

        let writer = io::BufWriter::new(io::stdout().lock());
        let mut runner = Runner::new(
            open_pileup(&input)?,
            writer,
            MaskedSites(masker),
            self.strict,
        );

        runner.run()
    }
}

struct MaskedSites<'a>(Masker<'a>);

impl<'a> Process for MaskedSites<'a> {
    type Output<'s> = Mask<'s>;

    fn process<'s>(&mut self, site: &Site<'s>) -> Result<Option<Self::Output<'s>>, call::Error> {
        Ok(self.0.mask(site)?.filter(|mask| !mask.is_clean()))
    }
}
