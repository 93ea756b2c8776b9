use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Error;

use clap::Parser;

use poolsnp_core::{
    coverage::{threshold::Status, Cutoff, TableBuilder},
    input::ReadStatus,
    Input,
};

use crate::{
    runner::open_pileup,
    warnings::{Location, Reason, Warnings},
};

const PROGRESS_INTERVAL: usize = 100_000;

/// Create maximum coverage table from pileup.
///
/// Writes one line per contig with the contig name and a comma-separated list of maximum
/// coverages, one per sample. The output can be used as the maximum coverage table of the `call`
/// and `bad-sites` subcommands.
#[derive(Debug, Parser)]
pub struct MaxCov {
    /// Input pileup file.
    ///
    /// If no file is provided, stdin will be used. Gzip-compressed input is detected
    /// automatically.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Maximum coverage cutoff.
    ///
    /// Cutoffs of at least one are used as a fixed maximum coverage for all samples. Smaller
    /// cutoffs are taken as a quantile of the coverage distribution of each sample on each contig,
    /// e.g. 0.95 gives the coverage above which the 5% most highly covered sites lie.
    #[arg(long, value_name = "FLOAT")]
    cutoff: f64,

    /// Contigs to create thresholds for.
    ///
    /// By default, thresholds are created for all contigs in the input. Multiple, comma-separated
    /// values can be provided.
    #[arg(long, value_delimiter = ',', value_name = "CONTIG")]
    contig: Option<Vec<String>>,

    /// Promote warnings to errors.
    #[arg(long)]
    strict: bool,
}

impl MaxCov {
    pub fn run(self) -> Result<(), Error> {
        let input = Input::new(self.input.clone())?;
        let mut reader = open_pileup(&input)?;

        let mut builder =
            TableBuilder::new(Cutoff::from(self.cutoff)).set_contigs(self.contig.clone());
        let mut warnings = Warnings::default();
        let mut positions = 0;

        loop {
            let site = match reader.read_site() {
                ReadStatus::Read(Ok(site)) => site,
                ReadStatus::Read(Err(error)) => {
                    let location = Location::Line(reader.current_line());

                    if self.strict {
                        anyhow::bail!("{error} at {location}");
                    }

                    warnings.warn_once(location, Reason::from(&error));
                    continue;
                }
                ReadStatus::Error(e) => Err(e)?,
                ReadStatus::Done => break,
            };

            positions += 1;
            if positions % PROGRESS_INTERVAL == 0 {
                log::info!("Processed {positions} positions.");
            }

            if builder.add(&site)? == Status::Finished {
                break;
            }
        }

        warnings.summarize();

        if let Some(contigs) = &self.contig {
            let seen = builder.contigs().collect::<Vec<_>>();

            for contig in contigs.iter().filter(|c| !seen.contains(&c.as_str())) {
                log::warn!("No sites found on requested contig '{contig}'.");
            }
        }

        let table = builder.build();
        log::info!("Created coverage thresholds for {} contigs.", table.len());

        let mut writer = io::BufWriter::new(io::stdout().lock());
        table.write(&mut writer)?;
        writer.flush()?;

        Ok(())
    }
}
