use crate::error::{Error, ErrorKind, Result};
use log::trace;
use std::io::{Read, Seek, SeekFrom};

pub(crate) const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Returns `true` if the given byte can start a line terminator.
///
/// Recognized terminators are `\r\n`, `\n` and `\r`; all of them start
/// with a byte from `{\r, \n}`.
pub(crate) fn is_terminator(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

/// Scanner that locates line-boundary offsets within a stream of bytes.
///
/// A *boundary* is the offset of the first byte after a line terminator
/// (`\r\n`, `\n` or `\r`), i.e. the offset at which the next line starts.
/// The scanner reads the stream in bounded chunks, so boundaries can be
/// located in streams far larger than memory.
///
/// # Examples
///
/// ```
/// use linetail::LineScanner;
/// use std::io::Cursor;
///
/// let mut cursor = Cursor::new(b"one\ntwo\n".to_vec());
/// let mut scanner = LineScanner::new(&mut cursor).unwrap();
///
/// assert_eq!(scanner.scan(0).unwrap(), Some(4));
/// assert_eq!(scanner.scan(4).unwrap(), Some(8));
/// assert_eq!(scanner.scan(8).unwrap(), None);
///
/// assert_eq!(scanner.scan_back(8).unwrap(), Some(4));
/// assert_eq!(scanner.scan_back(4).unwrap(), None);
/// ```
///
/// The `LineScanner` uses an internal buffer to read one chunk of bytes at a
/// time. You can pick the chunk size by initializing a `LineScanner` with
/// [`with_chunk_size`](LineScanner::with_chunk_size) if you are scanning a
/// pretty small or pretty large stream. The default chunk size is `1024`
/// currently.
#[derive(Debug)]
pub struct LineScanner<'a, RS: 'a + Read + Seek> {
    inner: &'a mut RS,
    buf: Vec<u8>,
    len: usize,
    chunk_size: usize,
}

impl<'a, RS: 'a + Read + Seek> LineScanner<'a, RS> {
    /// Creates a new `LineScanner` over a byte stream that implements `Read`
    /// and `Seek`.
    ///
    /// The stream length is captured once at construction, so the stream must
    /// not grow or shrink while the scanner is alive.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial seeks against the stream fail.
    pub fn new(stream: &'a mut RS) -> Result<Self> {
        LineScanner::with_chunk_size(stream, DEFAULT_CHUNK_SIZE)
    }

    /// Creates a new `LineScanner` with the given chunk size.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial seeks against the stream fail.
    pub fn with_chunk_size(stream: &'a mut RS, chunk_size: usize) -> Result<Self> {
        assert!(chunk_size > 0, "chunk size must be non-zero");

        let len = stream.seek(SeekFrom::End(0))? as usize;
        stream.seek(SeekFrom::Start(0))?;

        Ok(Self {
            inner: stream,
            buf: Vec::with_capacity(chunk_size),
            len,
            chunk_size,
        })
    }

    /// Returns the length of the underlying byte stream, as captured at
    /// construction.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the underlying byte stream is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the chunk size of this `LineScanner`.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Scans **forwards** from `start` for the next line boundary and returns
    /// its offset, or `None` if the stream ends before another terminator.
    ///
    /// A terminator byte sitting exactly at `start` is skipped rather than
    /// reported, so repeated calls always make progress: feeding a returned
    /// boundary back in yields the boundary of the following line.
    ///
    /// On success the stream is positioned at the returned boundary. When no
    /// boundary exists the stream is left at the end of the scanned region.
    ///
    /// # Errors
    ///
    /// Returns an error of kind `ErrorKind::OffsetOutOfRange` if `start` lies
    /// beyond the end of the stream, or `ErrorKind::Io` if reading or seeking
    /// fails.
    pub fn scan(&mut self, start: usize) -> Result<Option<usize>> {
        if start > self.len {
            return Err(Error::new(ErrorKind::OffsetOutOfRange));
        }
        self.inner.seek(SeekFrom::Start(start as u64))?;

        let mut chunk_start = start;
        let mut first = true;
        loop {
            let count = self.fill_chunk()?;

            // A terminator right at the scan origin would report a
            // zero-advance boundary; skip it. Later chunks never skip,
            // otherwise terminators at chunk edges would be lost.
            let skip = if first && count > 0 && is_terminator(self.buf[0]) {
                1
            } else {
                0
            };
            first = false;

            if let Some(pos) = self.buf[skip..count].iter().position(|&b| is_terminator(b)) {
                let boundary = chunk_start + skip + pos + 1;
                self.inner.seek(SeekFrom::Start(boundary as u64))?;
                trace!("forward scan from {} found boundary at {}", start, boundary);
                return Ok(Some(boundary));
            }

            if count < self.chunk_size {
                // Short read: reached the end of the stream.
                trace!("forward scan from {} reached stream end", start);
                return Ok(None);
            }
            chunk_start += count;
        }
    }

    /// Scans **backwards** from `end` for the previous line boundary and
    /// returns its offset, or `None` if the start of the stream is reached
    /// first.
    ///
    /// A terminator immediately preceding `end` is excluded from the search
    /// (for `\r\n`, both bytes are excluded), so repeated calls peel lines
    /// off the end one at a time: feeding a returned boundary back in yields
    /// the start of the preceding line.
    ///
    /// On success the stream is positioned at the returned boundary; when no
    /// boundary exists it is positioned at 0.
    ///
    /// # Errors
    ///
    /// Returns an error of kind `ErrorKind::OffsetOutOfRange` if `end` lies
    /// beyond the end of the stream, or `ErrorKind::Io` if reading or seeking
    /// fails.
    pub fn scan_back(&mut self, end: usize) -> Result<Option<usize>> {
        if end > self.len {
            return Err(Error::new(ErrorKind::OffsetOutOfRange));
        }

        let mut window_end = end;
        let mut first = true;
        loop {
            let window_start = window_end.saturating_sub(self.chunk_size);
            let size = window_end - window_start;

            self.inner.seek(SeekFrom::Start(window_start as u64))?;
            self.buf.resize(size, 0);
            self.inner.read_exact(&mut self.buf[..size])?;

            // The scan origin sits just after a previously-found boundary;
            // the terminator ending that boundary's line must not be
            // re-found. Only the first window is adjacent to the origin.
            let mut scan_end = size;
            if first && scan_end > 0 && is_terminator(self.buf[scan_end - 1]) {
                scan_end -= 1;
                if scan_end > 0 && self.buf[scan_end] == b'\n' && self.buf[scan_end - 1] == b'\r' {
                    scan_end -= 1;
                }
            }
            first = false;

            if let Some(pos) = self.buf[..scan_end].iter().rposition(|&b| is_terminator(b)) {
                let boundary = window_start + pos + 1;
                self.inner.seek(SeekFrom::Start(boundary as u64))?;
                trace!("backward scan from {} found boundary at {}", end, boundary);
                return Ok(Some(boundary));
            }

            if window_start == 0 {
                // Everything up to `end` belongs to the first line.
                self.inner.seek(SeekFrom::Start(0))?;
                trace!("backward scan from {} reached stream start", end);
                return Ok(None);
            }
            window_end = window_start;
        }
    }

    /// Reads up to one chunk from the current stream position, returning the
    /// number of bytes read. A count smaller than the chunk size means the
    /// stream end was reached.
    fn fill_chunk(&mut self) -> Result<usize> {
        self.buf.resize(self.chunk_size, 0);
        let mut filled = 0;
        while filled < self.chunk_size {
            let n = self.inner.read(&mut self.buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        self.buf.truncate(filled);
        Ok(filled)
    }
}
