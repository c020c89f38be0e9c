use std::path::PathBuf;
use std::{error, fmt, io, result};

/// A type alias for `Result<T, linetail::Error>`.
///
/// This result type embeds the error type in this crate.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when scanning or extracting lines.
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    /// A crate private constructor for `Error`.
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Returns the specific type of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Unwraps this error into its underlying type.
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }
}

/// The specific type of an error.
///
/// This list might grow over time and it is not recommended to
/// exhaustively match against it.
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Represents an I/O error.
    ///
    /// Can occur when reading or seeking the underlying byte stream.
    Io(io::Error),
    /// A scan was started from an offset beyond the end of the stream.
    ///
    /// Scan offsets are never clamped; passing one past the stream size
    /// is a bug in the caller.
    OffsetOutOfRange,
    /// The given path exists but does not refer to a regular file.
    NotAFile(PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Io(ref err) => err.fmt(f),
            ErrorKind::OffsetOutOfRange => {
                write!(f, "Scan offset lies beyond the end of the stream")
            }
            ErrorKind::NotAFile(ref path) => {
                write!(f, "{} is not a regular file", path.display())
            }
        }
    }
}

impl error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::new(ErrorKind::Io(err))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        io::Error::new(io::ErrorKind::Other, err)
    }
}
