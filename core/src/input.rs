//! Input sources for pileup and coverage tables.

use std::{
    env,
    fs::File,
    io::{self, IsTerminal as _},
    path::{Path, PathBuf},
};

use flate2::bufread::MultiGzDecoder;

/// A status when trying to read an element from a reader.
#[derive(Debug)]
pub enum ReadStatus<T> {
    /// Element was succesfully read.
    Read(T),
    /// An error was encountered.
    Error(io::Error),
    /// The reader has finished.
    Done,
}

/// An input source for reading.
#[derive(Debug)]
pub enum Input {
    /// A path from which to read a file.
    Path(PathBuf),
    /// Stdin.
    Stdin,
}

impl Input {
    /// By default, reading an `Input` checks that either a path is provided, or that input is
    /// available via stdin, instead of hanging.
    ///
    /// In some contexts, e.g. testing, this can cause issues, and so it may be disabled by setting
    /// this environment variable, or by using [`Input::new_unchecked`].
    pub const ENV_KEY_DISABLE_CHECK: &'static str = "POOLSNP_ALLOW_STDIN";

    /// Creates a new input source.
    ///
    /// A path consisting of a single dash is taken to mean stdin.
    pub fn new(input: Option<PathBuf>) -> io::Result<Self> {
        let check = env::var(Self::ENV_KEY_DISABLE_CHECK).is_err();

        match Self::new_unchecked(input) {
            Input::Path(_) if !io::stdin().is_terminal() && check => Err(io::Error::new(
                io::ErrorKind::Other,
                "received input both via file and stdin",
            )),
            Input::Stdin if io::stdin().is_terminal() && check => Err(io::Error::new(
                io::ErrorKind::Other,
                "received no input via file or stdin",
            )),
            input => Ok(input),
        }
    }

    /// Creates a new input source without checking that any data is available.
    pub fn new_unchecked(input: Option<PathBuf>) -> Self {
        match input {
            Some(path) if path.as_os_str() != "-" => Self::Path(path),
            _ => Self::Stdin,
        }
    }

    /// Open the input for reading.
    ///
    /// Gzip-compressed input is detected and transparently decompressed.
    pub fn open(&self) -> io::Result<Reader> {
        match self {
            Input::Path(path) => {
                let reader = File::open(path).map(io::BufReader::new)?;
                Reader::from_buf_read(reader)
            }
            Input::Stdin => Reader::from_buf_read(io::stdin().lock()),
        }
    }

    /// Returns the provided path if provided, otherwise `None`.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Input::Path(path) => Some(path.as_ref()),
            Input::Stdin => None,
        }
    }
}

/// A line reader from a file or stdin, possibly decompressed.
pub struct Reader(Box<dyn io::BufRead>);

impl Reader {
    /// Creates a new reader, detecting and decompressing gzip input.
    pub fn from_buf_read<R>(mut reader: R) -> io::Result<Self>
    where
        R: 'static + io::BufRead,
    {
        let inner: Box<dyn io::BufRead> = match CompressionMethod::detect(&mut reader)? {
            Some(CompressionMethod::Gzip) => {
                Box::new(io::BufReader::new(MultiGzDecoder::new(reader)))
            }
            None => Box::new(reader),
        };

        Ok(Self(inner))
    }
}

impl io::Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl io::BufRead for Reader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.0.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.0.consume(amt)
    }
}

/// A supported compression method.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompressionMethod {
    /// Gzip, including multi-member and BGZF files.
    Gzip,
}

impl CompressionMethod {
    /// Detects the compression method from the start of a reader without consuming input.
    pub fn detect<R>(reader: &mut R) -> io::Result<Option<Self>>
    where
        R: io::BufRead,
    {
        const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

        let src = reader.fill_buf()?;

        if let Some(buf) = src.get(..GZIP_MAGIC_NUMBER.len()) {
            if buf == GZIP_MAGIC_NUMBER {
                return Ok(Some(CompressionMethod::Gzip));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{BufRead as _, Write as _};

    use flate2::{write::GzEncoder, Compression};

    #[test]
    fn test_dash_is_stdin() {
        assert!(matches!(
            Input::new_unchecked(Some(PathBuf::from("-"))),
            Input::Stdin
        ));
        assert!(matches!(Input::new_unchecked(None), Input::Stdin));
        assert!(matches!(
            Input::new_unchecked(Some(PathBuf::from("data.mpileup.gz"))),
            Input::Path(_)
        ));
    }

    #[test]
    fn test_detect_compression() -> io::Result<()> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"2L\t1\tA\n")?;
        let compressed = encoder.finish()?;

        assert_eq!(
            CompressionMethod::detect(&mut &compressed[..])?,
            Some(CompressionMethod::Gzip)
        );
        assert_eq!(CompressionMethod::detect(&mut &b"2L\t1\tA\n"[..])?, None);
        assert_eq!(CompressionMethod::detect(&mut &b""[..])?, None);

        Ok(())
    }

    #[test]
    fn test_read_gzip_members() -> io::Result<()> {
        let mut compressed = Vec::new();
        for line in ["2L\t1\tA\n", "2L\t2\tC\n"] {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(line.as_bytes())?;
            compressed.extend(encoder.finish()?);
        }

        let reader = Reader::from_buf_read(io::Cursor::new(compressed))?;
        let lines = reader.lines().collect::<io::Result<Vec<_>>>()?;

        assert_eq!(lines, vec!["2L\t1\tA", "2L\t2\tC"]);

        Ok(())
    }
}
