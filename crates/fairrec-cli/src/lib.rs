//! Library components of the `fairrec` command-line tool.

pub mod logging;
pub mod pipeline;
