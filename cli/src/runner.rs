use std::{
    io::{self, Write},
    path::Path,
};

use anyhow::{Context, Error};

use poolsnp_core::{
    call,
    count::AggregateError,
    input::{self, ReadStatus},
    pileup::{self, Site},
    Input, MaxCoverageTable,
};

use crate::warnings::{Location, Reason, Warnings};

/// A per-site computation producing at most one output line.
pub trait Process {
    type Output<'a>: std::fmt::Display;

    fn process<'a>(&mut self, site: &Site<'a>) -> Result<Option<Self::Output<'a>>, call::Error>;

    fn summarize(&self) {}
}

/// Opens pileup input for reading sites.
pub fn open_pileup(input: &Input) -> Result<pileup::Reader<input::Reader>, Error> {
    let reader = input.open().with_context(|| match input.as_path() {
        Some(path) => format!("Failed to open pileup from provided path '{}'", path.display()),
        None => String::from("Failed to open pileup from stdin"),
    })?;

    Ok(pileup::Reader::new(reader))
}

/// Reads a maximum coverage table.
pub fn read_table(path: &Path) -> Result<MaxCoverageTable, Error> {
    let table = MaxCoverageTable::from_input(&Input::new_unchecked(Some(path.to_path_buf())))
        .with_context(|| format!("Failed to read coverage table from '{}'", path.display()))?;

    log::info!("Read coverage thresholds for {} contigs.", table.len());

    Ok(table)
}

pub struct Runner<R, W, P> {
    reader: pileup::Reader<R>,
    writer: W,
    processor: P,
    warnings: Warnings,
    strict: bool,
}

impl<R, W, P> Runner<R, W, P>
where
    R: io::BufRead,
    W: io::Write,
    P: Process,
{
    pub fn new(reader: pileup::Reader<R>, writer: W, processor: P, strict: bool) -> Self {
        Self {
            reader,
            writer,
            processor,
            warnings: Warnings::default(),
            strict,
        }
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn run(&mut self) -> Result<(), Error> {
        let mut sites = 0;
        let mut written = 0;

        loop {
            let site = match self.reader.read_site() {
                ReadStatus::Read(Ok(site)) => site,
                ReadStatus::Read(Err(error)) => {
                    let location = Location::Line(self.reader.current_line());

                    if self.strict {
                        anyhow::bail!("{error} at {location}");
                    }

                    self.warnings.warn_once(location, Reason::from(&error));
                    continue;
                }
                ReadStatus::Error(e) => Err(e)?,
                ReadStatus::Done => break,
            };
            sites += 1;

            match self.processor.process(&site) {
                Ok(Some(output)) => {
                    writeln!(self.writer, "{output}")?;
                    written += 1;
                }
                Ok(None) => (),
                Err(call::Error::Decode(AggregateError { sample, error })) => {
                    let location = Location::Sample {
                        contig: site.contig(),
                        position: site.position(),
                        sample,
                    };

                    if self.strict {
                        anyhow::bail!("{error} at {location}");
                    }

                    self.warnings.warn_once(location, Reason::from(&error));
                }
                Err(e) => Err(e)?,
            }
        }

        self.writer.flush()?;

        log::info!("Processed {sites} sites and wrote {written} lines.");
        self.processor.summarize();
        self.warnings.summarize();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use poolsnp_core::{pileup::BaseFilter, SiteCounts};

    /// Writes the site totals, or fails on sites on contig "fail".
    struct Totals;

    impl Process for Totals {
        type Output<'a> = String;

        fn process<'a>(
            &mut self,
            site: &Site<'a>,
        ) -> Result<Option<Self::Output<'a>>, call::Error> {
            if site.contig() == "fail" {
                return Err(call::Error::SampleCount {
                    contig: String::from("fail"),
                    expected: 0,
                    found: site.samples().len(),
                });
            }

            let counts = SiteCounts::aggregate(site, &BaseFilter::default())?;

            Ok(Some(format!("{}\t{}", site.position(), counts.totals().total())))
        }
    }

    fn run(src: &str, strict: bool) -> Result<(String, Warnings), Error> {
        let reader = pileup::Reader::new(src.as_bytes());
        let mut runner = Runner::new(reader, Vec::new(), Totals, strict);
        runner.run()?;

        let output = String::from_utf8(runner.writer.clone())?;
        Ok((output, runner.warnings))
    }

    const SRC: &str = "2L\t1\tA\t2\t.,\tII\n\
        2L\t2\n\
        2L\tx\tA\t1\t.\tI\n\
        2L\t3\tA\t2\t.?\tII\n\
        2L\t4\tA\t3\t.,T\tIII\n";

    #[test]
    fn test_run_skips_with_warnings() -> Result<(), Error> {
        let (output, warnings) = run(SRC, false)?;

        assert_eq!(output, "1\t2\n4\t3\n");
        assert_eq!(warnings.count(Reason::MalformedLine), 2);
        assert_eq!(warnings.count(Reason::UnexpectedCharacter), 1);

        Ok(())
    }

    #[test]
    fn test_run_strict() {
        let result = run(SRC, true);

        assert_eq!(
            result.unwrap_err().to_string(),
            "missing reference field at line 2"
        );
    }

    #[test]
    fn test_run_fatal_error() {
        let result = run("2L\t1\tA\t1\t.\tI\nfail\t2\tA\t1\t.\tI\n", false);

        assert!(result.is_err());
    }
}
