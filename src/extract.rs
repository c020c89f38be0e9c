use crate::error::{Error, ErrorKind, Result};
use crate::scanner::{is_terminator, LineScanner, DEFAULT_CHUNK_SIZE};
use log::debug;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Extractor that retrieves the first or last lines of a seekable byte
/// stream.
///
/// The extractor never reads the whole stream: it walks line boundaries with
/// a [`LineScanner`] until the wanted byte range is known, then issues a
/// single bulk read of exactly that range and splits it into lines.
/// Terminators (`\r\n`, `\n`, `\r`) are stripped from the returned lines.
///
/// # Examples
///
/// ```
/// use linetail::HeadTail;
/// use std::io::Cursor;
///
/// let cursor = Cursor::new(b"A\nB\nC\nD\nE\nF\n".to_vec());
/// let mut ht = HeadTail::new(cursor);
///
/// assert_eq!(ht.head(3).unwrap(), vec!["A", "B", "C"]);
/// assert_eq!(ht.tail(3).unwrap(), vec!["D", "E", "F"]);
/// ```
///
/// A stream with fewer lines than requested yields every line it has:
///
/// ```
/// use linetail::HeadTail;
/// use std::io::Cursor;
///
/// let cursor = Cursor::new(b"A\nB\n".to_vec());
/// let mut ht = HeadTail::new(cursor);
/// assert_eq!(ht.tail(5).unwrap(), vec!["A", "B"]);
/// ```
#[derive(Debug)]
pub struct HeadTail<RS: Read + Seek> {
    stream: RS,
    chunk_size: usize,
}

impl HeadTail<File> {
    /// Opens the file at `path` for extraction.
    ///
    /// The path is validated before any scanning begins: it must exist, be
    /// readable, and refer to a regular file.
    ///
    /// # Errors
    ///
    /// Returns an error of kind `ErrorKind::Io` if the path is missing or
    /// unreadable, or `ErrorKind::NotAFile` if it refers to a directory or
    /// other non-file object.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use linetail::HeadTail;
    ///
    /// let mut ht = HeadTail::open("/var/log/syslog").unwrap();
    /// for line in ht.tail(10).unwrap() {
    ///     println!("{}", line);
    /// }
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<HeadTail<File>> {
        let path = path.as_ref();
        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Err(Error::new(ErrorKind::NotAFile(path.to_path_buf())));
        }
        debug!("opening {} for line extraction", path.display());
        let file = File::open(path)?;
        Ok(HeadTail::new(file))
    }
}

impl<RS: Read + Seek> HeadTail<RS> {
    /// Creates a new `HeadTail` over a byte stream that implements `Read`
    /// and `Seek`, using the default chunk size.
    pub fn new(stream: RS) -> Self {
        HeadTail::with_chunk_size(stream, DEFAULT_CHUNK_SIZE)
    }

    /// Creates a new `HeadTail` with the given chunk size for boundary
    /// scans.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn with_chunk_size(stream: RS, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be non-zero");
        Self { stream, chunk_size }
    }

    /// Unwraps this `HeadTail`, returning the underlying stream.
    pub fn into_inner(self) -> RS {
        self.stream
    }

    /// Retrieves the first `n` lines of the stream.
    ///
    /// If the stream holds fewer than `n` lines, every line is returned.
    /// `n == 0` returns an empty vector without touching the stream.
    ///
    /// # Errors
    ///
    /// Returns an error of kind `ErrorKind::Io` if reading or seeking the
    /// stream fails.
    pub fn head(&mut self, n: usize) -> Result<Vec<String>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut scanner = LineScanner::with_chunk_size(&mut self.stream, self.chunk_size)?;
        let mut pos = 0;
        for _ in 0..n {
            match scanner.scan(pos)? {
                Some(boundary) => pos = boundary,
                None => {
                    // Fewer lines than requested; take the whole stream.
                    pos = scanner.len();
                    break;
                }
            }
        }
        debug!("head({}) covers bytes [0, {})", n, pos);

        let bytes = self.read_range(0, pos)?;
        // The last byte is the terminator the final boundary stepped past;
        // drop it so a doubled terminator at the range end does not count an
        // extra empty line.
        let trimmed = match bytes.last() {
            Some(&b) if is_terminator(b) => &bytes[..bytes.len() - 1],
            _ => &bytes[..],
        };
        Ok(split_lines(trimmed))
    }

    /// Retrieves the last `n` lines of the stream.
    ///
    /// If the stream holds fewer than `n` lines, every line is returned.
    /// `n == 0` returns an empty vector without touching the stream.
    ///
    /// # Errors
    ///
    /// Returns an error of kind `ErrorKind::Io` if reading or seeking the
    /// stream fails.
    pub fn tail(&mut self, n: usize) -> Result<Vec<String>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut scanner = LineScanner::with_chunk_size(&mut self.stream, self.chunk_size)?;
        let end = scanner.len();
        let mut pos = end;
        for _ in 0..n {
            match scanner.scan_back(pos)? {
                Some(boundary) => pos = boundary,
                None => {
                    // Fewer lines than requested; take everything from the
                    // start.
                    pos = 0;
                    break;
                }
            }
        }
        debug!("tail({}) covers bytes [{}, {})", n, pos, end);

        let bytes = self.read_range(pos, end)?;
        Ok(split_lines(&bytes))
    }

    /// Reads the byte range `[start, end)` of the stream in one bulk read.
    fn read_range(&mut self, start: usize, end: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0; end - start];
        self.stream.seek(SeekFrom::Start(start as u64))?;
        self.stream.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// Splits a byte range on line terminators, longest match first (`\r\n`,
/// then `\n`, then `\r`).
///
/// Interior empty lines are preserved. A final fragment without a terminator
/// counts as a line; a trailing terminator does not produce a trailing empty
/// line. Bytes are converted to `String` lossily.
fn split_lines(bytes: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(String::from_utf8_lossy(&bytes[start..i]).into_owned());
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(String::from_utf8_lossy(&bytes[start..i]).into_owned());
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(String::from_utf8_lossy(&bytes[start..]).into_owned());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_lf() {
        assert_eq!(split_lines(b""), Vec::<String>::new());
        assert_eq!(split_lines(b"a"), vec!["a"]);
        assert_eq!(split_lines(b"a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines(b"a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines(b"a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines(b"\n\n"), vec!["", ""]);
    }

    #[test]
    fn test_split_lines_crlf() {
        assert_eq!(split_lines(b"a\r\nb\r\n"), vec!["a", "b"]);
        assert_eq!(split_lines(b"a\r\nb"), vec!["a", "b"]);
        // A dangling carriage return still ends the line.
        assert_eq!(split_lines(b"a\r"), vec!["a"]);
    }

    #[test]
    fn test_split_lines_cr() {
        assert_eq!(split_lines(b"a\rb\rc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines(b"a\rb\r"), vec!["a", "b"]);
    }

    #[test]
    fn test_split_lines_mixed() {
        assert_eq!(split_lines(b"a\r\nb\nc\rd"), vec!["a", "b", "c", "d"]);
    }
}
