//! Infrastructure shared by the decoding and statistics modules.

pub mod error;
pub mod errors;
pub mod fs;
pub mod io;
pub mod read_filter;

pub mod prelude {
    pub use super::error::{FormatError, PileconsError, Result};
    pub use super::errors::is_broken_pipe;
    pub use super::fs::{is_bgzipped, is_stdio, make_parent_dirs};
    pub use super::io::{get_line_reader, get_writer};
    pub use super::read_filter::{DefaultReadFilter, ReadFilter};
}
