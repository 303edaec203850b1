//! lifepack-core
//!
//! Readers for the two file types found inside Fantasy Life's
//! `_file_archive.bin` once it has been split into pieces:
//!
//! - `.bin` sub-archives (`arc`): a header plus an entry table naming byte
//!   ranges, extracted to individual files.
//! - `.scr` tables (`scr`): fixed-length rows plus encoded messages, dumped
//!   to tab-delimited text, optionally typed through a table catalog (`table`).
//!
//! Frontends live in the `lifepack` crate; everything testable lives here.

pub mod arc;
pub mod config;
pub mod error;
pub mod layout;
pub mod reader;
pub mod scr;
pub mod table;

pub use error::{Error, ErrorKind, Result};

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
