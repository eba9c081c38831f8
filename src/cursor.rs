use crate::error::DecodeError;

/// Read position over a borrowed instruction stream.
///
/// Every read is bounds-checked against the end of the buffer. A read that
/// would run past the end fails with [`DecodeError::TruncatedInstruction`]
/// and leaves the position untouched, so `pos <= bytes.len()` always holds.
pub struct Cursor<'a> {
  bytes: &'a [u8],
  pos: usize,
  start: usize,
}

impl<'a> Cursor<'a> {
  pub fn new(bytes: &'a [u8]) -> Self {
    Self {
      bytes,
      pos: 0,
      start: 0,
    }
  }

  pub fn position(&self) -> usize {
    self.pos
  }

  pub fn remaining(&self) -> usize {
    self.bytes.len() - self.pos
  }

  pub fn is_at_end(&self) -> bool {
    self.pos == self.bytes.len()
  }

  /// Marks the current position as the first byte of a new instruction.
  /// Truncation errors report this offset.
  pub fn begin_instruction(&mut self) {
    self.start = self.pos;
  }

  pub fn instruction_start(&self) -> usize {
    self.start
  }

  pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
    let [byte] = self.take::<1>()?;
    Ok(byte)
  }

  pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
    self.read_u8().map(|byte| byte as i8)
  }

  pub fn read_u16_le(&mut self) -> Result<u16, DecodeError> {
    self.take::<2>().map(u16::from_le_bytes)
  }

  pub fn read_i16_le(&mut self) -> Result<i16, DecodeError> {
    self.take::<2>().map(i16::from_le_bytes)
  }

  fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
    let available = self.remaining();
    if available < N {
      return Err(DecodeError::TruncatedInstruction {
        offset: self.start,
        needed: N - available,
        available,
      });
    }
    let mut out = [0; N];
    out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
    self.pos += N;
    Ok(out)
  }
}
