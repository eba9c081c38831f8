use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{info, warn};

use crate::error::{Error, Result};

/// The 8086 has 20 address lines.
pub const ADDRESS_LINES: u32 = 20;
pub const MAX_IMAGE_SIZE: usize = 1 << ADDRESS_LINES;

/// Bytes loaded from one input file.
#[derive(Debug)]
pub struct Image {
  pub bytes: Vec<u8>,
  /// Size of the file on disk, which exceeds `bytes.len()` when truncated.
  pub file_size: u64,
}

impl Image {
  pub fn is_truncated(&self) -> bool {
    self.file_size > self.bytes.len() as u64
  }
}

/// Reads at most `max_size` bytes of `path`. Oversized files are truncated
/// with a warning rather than rejected.
pub fn load(path: &Path, max_size: usize) -> Result<Image> {
  let unreadable = |source| Error::FileUnreadable {
    path: path.to_path_buf(),
    source,
  };
  let file = File::open(path).map_err(unreadable)?;
  let file_size = file.metadata().map_err(unreadable)?.len();
  info!("loading {} ({file_size} bytes)", path.display());

  if file_size > max_size as u64 {
    warn!(
      "{} is {file_size} bytes, bigger than the {max_size} byte memory image; truncating",
      path.display()
    );
  }

  let capacity = file_size.min(max_size as u64) as usize;
  let mut bytes = Vec::new();
  bytes
    .try_reserve_exact(capacity)
    .map_err(|source| Error::OutOfMemory {
      bytes: capacity,
      source,
    })?;
  file
    .take(max_size as u64)
    .read_to_end(&mut bytes)
    .map_err(unreadable)?;

  Ok(Image { bytes, file_size })
}
