use std::{
    collections::HashSet,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Error;

use clap::Parser;

use poolsnp_core::{
    call::{Call as Outcome, Caller, Config, Header, Record, Rejection},
    pileup::{BaseFilter, Site},
    Input,
};

use crate::runner::{open_pileup, read_table, Process, Runner};

/// Call SNPs from pileup.
#[derive(Debug, Parser)]
pub struct Call {
    /// Input pileup file.
    ///
    /// If no file is provided, stdin will be used. Gzip-compressed input is detected
    /// automatically.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Maximum coverage table.
    ///
    /// Each line should contain a contig name and a comma-separated list of maximum coverages,
    /// one per sample, separated by a tab. Sites on contigs not in the table are skipped. Such a
    /// table can be created using the `max-cov` subcommand.
    #[arg(long, value_name = "FILE")]
    max_cov: PathBuf,

    /// Minimum coverage of a sample.
    ///
    /// Samples with fewer retained observations of the called alleles have no call.
    #[arg(long, default_value_t = 10, value_name = "INT")]
    min_cov: usize,

    /// Minimum count of an allele across all samples.
    #[arg(long, default_value_t = 3, value_name = "INT")]
    min_count: usize,

    /// Minimum frequency of an allele across all samples.
    #[arg(long, default_value_t = 0.01, value_name = "FLOAT")]
    min_freq: f64,

    /// Maximum fraction of samples without a call.
    ///
    /// Polymorphic sites with a higher fraction of samples without a call are skipped. Has no
    /// effect when calling all sites.
    #[arg(long, default_value_t = 0.1, value_name = "FLOAT")]
    miss_frac: f64,

    /// Minimum base quality.
    #[arg(long, default_value_t = 15, value_name = "INT")]
    base_quality_threshold: u8,

    /// Base quality encoding version.
    ///
    /// Versions in [1.0, 1.8) use a PHRED offset of 64, all other versions an offset of 33.
    #[arg(long, default_value_t = 1.8, value_name = "FLOAT")]
    coding: f64,

    /// Call all sites.
    ///
    /// By default, only polymorphic sites are called.
    #[arg(long)]
    all_sites: bool,

    /// Sample names.
    ///
    /// If provided, a VCF header with the sample names is written before the records. Multiple,
    /// comma-separated values should be provided, one per sample.
    #[arg(long, value_delimiter = ',', value_name = "NAME")]
    names: Option<Vec<String>>,

    /// Promote warnings to errors.
    ///
    /// By default, lines that cannot be parsed and samples with read bases that cannot be decoded
    /// cause the site to be skipped with a warning. Using this flag will cause an error instead.
    #[arg(long)]
    strict: bool,
}

impl Call {
    fn config(&self) -> Config {
        Config::default()
            .set_min_cov(self.min_cov)
            .set_min_count(self.min_count)
            .set_min_freq(self.min_freq)
            .set_max_missing_fraction(self.miss_frac)
            .set_all_sites(self.all_sites)
            .set_base_filter(BaseFilter::from_coding(
                self.coding,
                self.base_quality_threshold,
            ))
    }

    pub fn run(self) -> Result<(), Error> {
        let input = Input::new(self.input.clone())?;
        let table = read_table(&self.max_cov)?;

        if let Some(names) = &self.names {
            for (contig, thresholds) in table.iter() {
                if thresholds.len() != names.len() {
                    anyhow::bail!(
                        "Provided {} sample names, but coverage table has {} samples on contig '{contig}'",
                        names.len(),
                        thresholds.len(),
                    );
                }
            }
        }

        let caller = Caller::new(self.config(), &table);
        let writer = io::BufWriter::new(io::stdout().lock());
        let mut runner = Runner::new(
            open_pileup(&input)?,
            writer,
            CalledSites::new(caller),
            self.strict,
        );

        if let Some(names) = &self.names {
            writeln!(runner.writer_mut(), "{}", Header::new(names))?;
        }

        runner.run()
    }
}

struct CalledSites<'a> {
    caller: Caller<'a>,
    rejected: [usize; Rejection::N],
    unknown_contigs: HashSet<String>,
    unknown: usize,
}

impl<'a> CalledSites<'a> {
    fn new(caller: Caller<'a>) -> Self {
        Self {
            caller,
            rejected: [0; Rejection::N],
            unknown_contigs: HashSet::new(),
            unknown: 0,
        }
    }
}

impl<'a> Process for CalledSites<'a> {
    type Output<'s> = Record<'s>;

    fn process<'s>(
        &mut self,
        site: &Site<'s>,
    ) -> Result<Option<Self::Output<'s>>, poolsnp_core::call::Error> {
        match self.caller.call(site)? {
            Outcome::Record(record) => return Ok(Some(record)),
            Outcome::UnknownContig => {
                if self.unknown_contigs.insert(site.contig().to_string()) {
                    log::debug!(
                        "Skipping sites on contig '{}' without coverage thresholds.",
                        site.contig()
                    );
                }

                self.unknown += 1;
            }
            Outcome::Rejected(rejection) => self.rejected[rejection as u8 as usize] += 1,
        }

        Ok(None)
    }

    fn summarize(&self) {
        for rejection in Rejection::VARIANTS {
            let count = self.rejected[rejection as u8 as usize];

            if count > 0 {
                let reason = rejection.reason();

                log::info!("Rejected {count} sites due to {reason}.");
            }
        }

        if self.unknown > 0 {
            log::info!(
                "Skipped {} sites on {} contigs without coverage thresholds.",
                self.unknown,
                self.unknown_contigs.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::error::ErrorKind as ClapErrorKind;

    use crate::tests::{parse_subcmd, try_parse_subcmd};

    #[test]
    fn test_defaults() {
        let args = parse_subcmd::<Call>("poolsnp call --max-cov cov.txt input.pileup");

        assert_eq!(args.input, Some(PathBuf::from("input.pileup")));
        assert_eq!(args.max_cov, PathBuf::from("cov.txt"));
        assert_eq!(args.config(), Config::default());
        assert!(!args.strict);
        assert_eq!(args.names, None);
    }

    #[test]
    fn test_max_cov_required() {
        let result = try_parse_subcmd::<Call>("poolsnp call input.pileup");

        assert_eq!(
            result.unwrap_err().kind(),
            ClapErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_parse_config() {
        let args = parse_subcmd::<Call>(
            "poolsnp call --max-cov cov.txt --min-cov 4 --min-count 2 --min-freq 0.05 \
            --miss-frac 0.5 --base-quality-threshold 20 --coding 1.5 --all-sites",
        );

        assert_eq!(
            args.config(),
            Config::default()
                .set_min_cov(4)
                .set_min_count(2)
                .set_min_freq(0.05)
                .set_max_missing_fraction(0.5)
                .set_all_sites(true)
                .set_base_filter(BaseFilter::new(64, 20))
        );
    }

    #[test]
    fn test_parse_names() {
        let args = parse_subcmd::<Call>("poolsnp call --max-cov cov.txt --names pool1,pool2,pool3");

        assert_eq!(
            args.names,
            Some(vec![
                String::from("pool1"),
                String::from("pool2"),
                String::from("pool3"),
            ])
        );
    }
}
