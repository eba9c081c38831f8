use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
  #[error(
    "truncated instruction at offset {offset:#06x}: needs {needed} more byte(s), {available} left"
  )]
  TruncatedInstruction {
    offset: usize,
    needed: usize,
    available: usize,
  },
}

#[derive(Error, Debug)]
pub enum Error {
  #[error("unable to read {}: {source}", path.display())]
  FileUnreadable {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("unable to allocate {bytes} bytes for the memory image")]
  OutOfMemory {
    bytes: usize,
    #[source]
    source: TryReserveError,
  },
  #[error(transparent)]
  Decode(#[from] DecodeError),
  #[error("unable to write listing: {0}")]
  Output(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
