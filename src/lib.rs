//! This library provides the [`HeadTail`] type to extract the first or last
//! N lines from a seekable stream of bytes, without loading the entire
//! stream into memory.
//!
//! Line boundaries are located by [`LineScanner`], which reads the stream in
//! bounded chunks (1024 bytes by default) and walks terminators forwards or
//! backwards, so only the bytes of the requested lines are ever read in
//! full. All three common terminators (`\r\n`, `\n`, `\r`) are recognized,
//! including terminators that straddle chunk boundaries.
//!
//! # Examples
//!
//! - Read the last 3 lines of a large log file:
//!
//! ```no_run
//! use linetail::{HeadTail, Result};
//!
//! fn main() -> Result<()> {
//!     let mut ht = HeadTail::open("./access.log")?;
//!     for line in ht.tail(3)? {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! - Any `Read + Seek` type works as a source, which makes in-memory testing
//!   straightforward:
//!
//! ```
//! use linetail::HeadTail;
//! use std::io::Cursor;
//!
//! let cursor = Cursor::new(b"first\nsecond\nthird\n".to_vec());
//! let mut ht = HeadTail::new(cursor);
//! assert_eq!(ht.head(2).unwrap(), vec!["first", "second"]);
//! ```
#![deny(missing_docs)]

mod error;
pub use error::{Error, ErrorKind, Result};

mod scanner;
pub use scanner::LineScanner;

mod extract;
pub use extract::HeadTail;
