//! Pileup reader.

use std::io;

use crate::input::ReadStatus;

use super::{site::count_fields, ParseSiteError, Site};

/// A pileup reader.
///
/// Lines with fewer than two fields are skipped.
pub struct Reader<R> {
    inner: R,
    buf: Vec<u8>,
    line: usize,
}

impl<R> Reader<R>
where
    R: io::BufRead,
{
    /// Creates a new reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            line: 0,
        }
    }

    /// Returns the 1-based line number of the most recently read site.
    pub fn current_line(&self) -> usize {
        self.line
    }

    /// Reads the next site in the reader.
    pub fn read_site(&mut self) -> ReadStatus<Result<Site<'_>, ParseSiteError>> {
        loop {
            self.buf.clear();

            match self.inner.read_until(b'\n', &mut self.buf) {
                Ok(0) => return ReadStatus::Done,
                Ok(_) => self.line += 1,
                Err(e) => return ReadStatus::Error(e),
            }

            let len = trimmed_len(&self.buf);
            if count_fields(&self.buf[..len]) >= 2 {
                self.buf.truncate(len);
                break;
            }
        }

        ReadStatus::Read(Site::parse(&self.buf))
    }
}

fn trimmed_len(line: &[u8]) -> usize {
    match line {
        [.., b'\r', b'\n'] => line.len() - 2,
        [.., b'\n'] => line.len() - 1,
        _ => line.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::allele::Base;

    fn read_all<R>(reader: &mut Reader<R>) -> Vec<Result<(String, u64), ParseSiteError>>
    where
        R: io::BufRead,
    {
        let mut sites = Vec::new();

        loop {
            match reader.read_site() {
                ReadStatus::Read(result) => sites.push(
                    result.map(|site| (site.contig().to_string(), site.position())),
                ),
                ReadStatus::Error(e) => panic!("{e}"),
                ReadStatus::Done => break,
            }
        }

        sites
    }

    #[test]
    fn test_read_sites() {
        let src = b"2L\t1\tA\t1\t.\tI\n2L\t2\tC\t1\t,\tI\r\n2R\t7\tT\t1\tt\tI";
        let mut reader = Reader::new(&src[..]);

        assert_eq!(
            read_all(&mut reader),
            vec![
                Ok((String::from("2L"), 1)),
                Ok((String::from("2L"), 2)),
                Ok((String::from("2R"), 7)),
            ]
        );
        assert_eq!(reader.current_line(), 3);
    }

    #[test]
    fn test_skips_short_lines() {
        let src = b"\n2L\n2L\t1\tA\t1\t.\tI\n\n";
        let mut reader = Reader::new(&src[..]);

        assert_eq!(read_all(&mut reader), vec![Ok((String::from("2L"), 1))]);
    }

    #[test]
    fn test_reports_malformed_lines() {
        let src = b"2L\t1\n2L\t2\tA\t1\t.\tI\n";
        let mut reader = Reader::new(&src[..]);

        assert_eq!(
            read_all(&mut reader),
            vec![
                Err(ParseSiteError::MissingField("reference")),
                Ok((String::from("2L"), 2)),
            ]
        );
    }

    #[test]
    fn test_site_borrows_line() {
        let src = b"2L\t1\ta\t2\t.,\tII\n";
        let mut reader = Reader::new(&src[..]);

        match reader.read_site() {
            ReadStatus::Read(Ok(site)) => {
                assert_eq!(site.reference(), Base::A);
                assert_eq!(site.samples()[0].qualities, b"II");
            }
            status => panic!("unexpected status: {status:?}"),
        }
    }
}
