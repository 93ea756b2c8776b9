//! Per-contig, per-sample maximum coverage thresholds.
//!
//! The table format has one line per contig, giving the contig name and a comma-separated list of
//! maximum coverages, one per sample, separated by a tab:
//!
//! ```text
//! 2L	78,91,66
//! 2R	80,93,70
//! ```
//!
//! Lines starting with `#` or `calculating` are ignored.

use std::{fmt, io, str::FromStr};

use indexmap::IndexMap;

pub mod threshold;
pub use threshold::{Cutoff, TableBuilder};

use crate::Input;

const IGNORED_PREFIXES: [&str; 2] = ["#", "calculating"];

/// Maximum coverage thresholds by contig and sample.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MaxCoverageTable(IndexMap<String, Vec<usize>>);

impl MaxCoverageTable {
    /// Returns the thresholds of each sample on a contig, if the contig is in the table.
    pub fn get(&self, contig: &str) -> Option<&[usize]> {
        self.0.get(contig).map(Vec::as_slice)
    }

    /// Inserts the thresholds of a contig, returning the previous thresholds, if any.
    pub fn insert(&mut self, contig: String, thresholds: Vec<usize>) -> Option<Vec<usize>> {
        self.0.insert(contig, thresholds)
    }

    /// Returns the number of contigs in the table.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the table has no contigs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over contigs and their thresholds, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.0
            .iter()
            .map(|(contig, thresholds)| (contig.as_str(), thresholds.as_slice()))
    }

    /// Reads a table from an input.
    pub fn from_input(input: &Input) -> Result<Self, Error> {
        Self::read(&mut input.open()?)
    }

    /// Reads a table from a reader.
    pub fn read<R>(reader: &mut R) -> Result<Self, Error>
    where
        R: io::BufRead,
    {
        let mut table = Self::default();

        for (i, line) in io::BufRead::lines(reader).enumerate() {
            let line = line?;

            if let Some((contig, thresholds)) = parse_line(&line, i + 1)? {
                table.insert(contig, thresholds);
            }
        }

        Ok(table)
    }

    /// Writes the table to a writer.
    pub fn write<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: io::Write,
    {
        write!(writer, "{self}")
    }
}

fn parse_line(line: &str, line_number: usize) -> Result<Option<(String, Vec<usize>)>, Error> {
    let line = line.trim_end();

    if line.is_empty() || IGNORED_PREFIXES.iter().any(|p| line.starts_with(p)) {
        return Ok(None);
    }

    let invalid = || Error::InvalidLine {
        line: line_number,
        content: line.to_string(),
    };

    let (contig, thresholds) = line.split_once('\t').ok_or_else(invalid)?;
    let thresholds = thresholds
        .split(',')
        .map(|s| s.trim().parse())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;

    Ok(Some((contig.to_string(), thresholds)))
}

impl FromStr for MaxCoverageTable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::read(&mut s.as_bytes())
    }
}

impl fmt::Display for MaxCoverageTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (contig, thresholds) in self.iter() {
            f.write_str(contig)?;
            f.write_str("\t")?;
            crate::utils::write_joined(f, thresholds, ",")?;
            writeln!(f)?;
        }

        Ok(())
    }
}

/// An error associated with reading a maximum coverage table.
#[derive(Debug)]
pub enum Error {
    /// I/O error.
    Io(io::Error),
    /// A line could not be parsed.
    InvalidLine {
        /// The 1-based line number.
        line: usize,
        /// The line content.
        content: String,
    },
    /// Number of samples differs between sites on the same contig.
    SampleCount {
        /// The contig.
        contig: String,
        /// Number of samples on previous sites.
        expected: usize,
        /// Number of samples on the current site.
        found: usize,
    },
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "{e}"),
            Error::InvalidLine { line, content } => write!(
                f,
                "failed to parse line {line} '{content}' as contig and comma-separated coverages"
            ),
            Error::SampleCount {
                contig,
                expected,
                found,
            } => write!(
                f,
                "found {found} samples on contig '{contig}', expected {expected} samples"
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() -> Result<(), Error> {
        let src = "# generated by max-cov\ncalculating 2L\n2L\t78,91,66\n\n2R\t80,93,70\r\n";
        let table = MaxCoverageTable::from_str(src)?;

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("2L"), Some(&[78, 91, 66][..]));
        assert_eq!(table.get("2R"), Some(&[80, 93, 70][..]));
        assert_eq!(table.get("X"), None);

        Ok(())
    }

    #[test]
    fn test_read_table_leaves_reader_usable() -> Result<(), Error> {
        let mut reader = io::Cursor::new("2L\t1,2\n");
        let table = MaxCoverageTable::read(&mut reader)?;

        assert_eq!(table.get("2L"), Some(&[1, 2][..]));
        assert_eq!(reader.position(), 7);

        Ok(())
    }

    #[test]
    fn test_parse_table_invalid_line() {
        let result = MaxCoverageTable::from_str("2L\t10,20\n2R 10,20\n");

        assert!(matches!(result, Err(Error::InvalidLine { line: 2, .. })));

        let result = MaxCoverageTable::from_str("2L\t10,x\n");

        assert!(matches!(result, Err(Error::InvalidLine { line: 1, .. })));
    }

    #[test]
    fn test_write_table() -> io::Result<()> {
        let mut table = MaxCoverageTable::default();
        table.insert(String::from("2R"), vec![5, 6]);
        table.insert(String::from("2L"), vec![7]);

        let mut dest = Vec::new();
        table.write(&mut dest)?;

        assert_eq!(dest, b"2R\t5,6\n2L\t7\n");

        Ok(())
    }
}
