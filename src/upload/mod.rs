//! Upload collector: sends receipt files to the parsing service.

pub mod client;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::*;
