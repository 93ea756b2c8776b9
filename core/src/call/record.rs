//! Output records.

use std::fmt;

use crate::{
    allele::Base,
    utils::{write_joined, Decimal},
};

use super::{Alts, Genotype};

/// The per-sample fields of a record.
pub const FORMAT: &str = "GT:RD:AD:DP:FREQ";

/// A called site.
///
/// The record is displayed as a single tab-separated line with the VCF columns.
#[derive(Clone, Debug, PartialEq)]
pub struct Record<'a> {
    contig: &'a str,
    position: u64,
    reference: Base,
    alts: Alts,
    average_depth: f64,
    genotypes: Vec<Genotype>,
}

impl<'a> Record<'a> {
    /// Creates a new record.
    pub fn new(
        contig: &'a str,
        position: u64,
        reference: Base,
        alts: Alts,
        average_depth: f64,
        genotypes: Vec<Genotype>,
    ) -> Self {
        Self {
            contig,
            position,
            reference,
            alts,
            average_depth,
            genotypes,
        }
    }

    /// Returns the contig.
    pub fn contig(&self) -> &'a str {
        self.contig
    }

    /// Returns the 1-based position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns the reference base.
    pub fn reference(&self) -> Base {
        self.reference
    }

    /// Returns the alternate alleles.
    pub fn alts(&self) -> &Alts {
        &self.alts
    }

    /// Returns the retained depth averaged over samples.
    pub fn average_depth(&self) -> f64 {
        self.average_depth
    }

    /// Returns the number of samples without a call.
    pub fn no_calls(&self) -> usize {
        self.genotypes.iter().filter(|g| g.is_missing()).count()
    }

    /// Returns the genotypes, one per sample.
    pub fn genotypes(&self) -> &[Genotype] {
        &self.genotypes
    }
}

impl<'a> fmt::Display for Record<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t.\t{}\t{}\t.\t.\tADP={};NC={}\t{FORMAT}",
            self.contig,
            self.position,
            self.reference,
            self.alts,
            Decimal(self.average_depth),
            self.no_calls(),
        )?;

        for genotype in self.genotypes.iter() {
            write!(f, "\t{genotype}")?;
        }

        Ok(())
    }
}

/// A VCF header for records.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Header<'a> {
    names: &'a [String],
}

impl<'a> Header<'a> {
    /// Creates a new header with the provided sample names.
    pub fn new(names: &'a [String]) -> Self {
        Self { names }
    }

    /// Returns the sample names.
    pub fn names(&self) -> &'a [String] {
        self.names
    }
}

impl<'a> fmt::Display for Header<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "##fileformat=VCFv4.2")?;
        writeln!(f, "##source=poolsnp")?;
        writeln!(
            f,
            "##INFO=<ID=ADP,Number=1,Type=Float,Description=\"Average per-sample depth of retained alleles\">"
        )?;
        writeln!(
            f,
            "##INFO=<ID=NC,Number=1,Type=Integer,Description=\"Number of samples not called\">"
        )?;
        writeln!(
            f,
            "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">"
        )?;
        writeln!(
            f,
            "##FORMAT=<ID=RD,Number=1,Type=Integer,Description=\"Reference allele depth\">"
        )?;
        writeln!(
            f,
            "##FORMAT=<ID=AD,Number=.,Type=Integer,Description=\"Alternate allele depths\">"
        )?;
        writeln!(
            f,
            "##FORMAT=<ID=DP,Number=1,Type=Integer,Description=\"Depth of retained alleles\">"
        )?;
        writeln!(
            f,
            "##FORMAT=<ID=FREQ,Number=.,Type=Float,Description=\"Alternate allele frequencies\">"
        )?;

        f.write_str("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT")?;
        if !self.names.is_empty() {
            f.write_str("\t")?;
            write_joined(f, self.names, "\t")?;
        }

        Ok(())
    }
}
