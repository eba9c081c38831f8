use std::fmt;
use std::io::Write;

use log::{debug, trace};

use crate::cursor::Cursor;
use crate::error::{DecodeError, Result};
use crate::table::{effective_address, register, segment_register, Format};

/// Decodes the whole buffer into a listing, one instruction per line.
pub fn disassemble(instructions: &[u8]) -> Result<String, DecodeError> {
  let mut lines = Lines::new(instructions).collect::<Result<Vec<_>, _>>()?;
  lines.push("".to_string());
  Ok(lines.join("\n"))
}

/// Decodes the buffer, writing each line to `out` as soon as it is decoded.
/// Returns the number of instructions written. On a truncated instruction the
/// lines before it have already been written.
pub fn disassemble_to<W: Write>(instructions: &[u8], out: &mut W) -> Result<usize> {
  let mut count = 0;
  for line in Lines::new(instructions) {
    writeln!(out, "{}", line?)?;
    count += 1;
  }
  Ok(count)
}

/// Iterator over rendered instructions. Stops after the first error.
pub struct Lines<'a> {
  cursor: Cursor<'a>,
  failed: bool,
}

impl<'a> Lines<'a> {
  pub fn new(instructions: &'a [u8]) -> Self {
    Self {
      cursor: Cursor::new(instructions),
      failed: false,
    }
  }
}

impl Iterator for Lines<'_> {
  type Item = Result<String, DecodeError>;

  fn next(&mut self) -> Option<Self::Item> {
    while !self.failed && !self.cursor.is_at_end() {
      match decode(&mut self.cursor) {
        Ok(Some(line)) => return Some(Ok(line)),
        Ok(None) => continue,
        Err(err) => {
          self.failed = true;
          return Some(Err(err));
        }
      }
    }
    None
  }
}

/// Decodes the instruction at the cursor. `Ok(None)` means the leading byte
/// matched no known format and was skipped.
fn decode(cursor: &mut Cursor) -> Result<Option<String>, DecodeError> {
  cursor.begin_instruction();
  let b1 = cursor.read_u8()?;
  let Some(format) = Format::classify(b1) else {
    debug!(
      "skipping unrecognized opcode {b1:08b} at offset {:#06x}",
      cursor.instruction_start()
    );
    return Ok(None);
  };
  let d_bit_set = (b1 >> 1) & 0b_0000_0001 == 1;
  let w_bit_set = b1 & 0b_0000_0001 == 1;

  let line = match format {
    Format::RegMemWithReg(mnemonic) => {
      let fields = ModRegRm::read(cursor)?;
      let reg = Operand::Register(register(fields.reg, w_bit_set));
      let rm = fields.operand(cursor, w_bit_set)?;
      let (dst, src) = if d_bit_set { (reg, rm) } else { (rm, reg) };
      format!("{} {dst}, {src}", mnemonic.as_str())
    }
    Format::ImmToRegMem => {
      let fields = ModRegRm::read(cursor)?;
      let dst = fields.operand(cursor, w_bit_set)?;
      let data = immediate(cursor, w_bit_set)?;
      match dst {
        Operand::Register(_) => format!("mov {dst}, {data}"),
        Operand::Memory(_) => format!("mov {} {dst}, {data}", size(w_bit_set)),
      }
    }
    Format::ImmToReg => {
      let w_bit_set = (b1 >> 3) & 0b_0000_0001 == 1;
      let dst = register(b1 & 0b_0000_0111, w_bit_set);
      let data = immediate(cursor, w_bit_set)?;
      format!("mov {dst}, {data}")
    }
    Format::MemToAcc => {
      let addr = cursor.read_u16_le()?;
      format!("mov {}, {}", register(0b_000, w_bit_set), Address::Direct(addr))
    }
    Format::AccToMem => {
      let addr = cursor.read_u16_le()?;
      format!("mov {}, {}", Address::Direct(addr), register(0b_000, w_bit_set))
    }
    Format::RegMemToSeg => {
      let fields = ModRegRm::read(cursor)?;
      let sr = segment_register(fields.reg & 0b_011);
      let rm = fields.operand(cursor, true)?;
      format!("mov {sr}, {rm}")
    }
    Format::SegToRegMem => {
      let fields = ModRegRm::read(cursor)?;
      let sr = segment_register(fields.reg & 0b_011);
      let rm = fields.operand(cursor, true)?;
      format!("mov {rm}, {sr}")
    }
  };

  trace!("{:#06x}: {line}", cursor.instruction_start());
  Ok(Some(line))
}

fn size(w_bit_set: bool) -> &'static str {
  if w_bit_set {
    "word"
  } else {
    "byte"
  }
}

fn immediate(cursor: &mut Cursor, w_bit_set: bool) -> Result<i16, DecodeError> {
  if w_bit_set {
    cursor.read_i16_le()
  } else {
    cursor.read_i8().map(i16::from)
  }
}

struct ModRegRm {
  r#mod: u8,
  reg: u8,
  rm: u8,
}

impl ModRegRm {
  fn read(cursor: &mut Cursor) -> Result<Self, DecodeError> {
    let b2 = cursor.read_u8()?;
    Ok(Self {
      r#mod: b2 >> 6,
      reg: (b2 >> 3) & 0b_0000_0111,
      rm: b2 & 0b_0000_0111,
    })
  }

  /// Resolves the r/m half, consuming any displacement bytes.
  fn operand(&self, cursor: &mut Cursor, w_bit_set: bool) -> Result<Operand, DecodeError> {
    let base = effective_address(self.rm);
    let address = match (self.r#mod, self.rm) {
      (0b_11, rm) => return Ok(Operand::Register(register(rm, w_bit_set))),
      (0b_00, 0b_110) => Address::Direct(cursor.read_u16_le()?),
      (0b_00, _) => Address::Based {
        base,
        displacement: 0,
      },
      (0b_01, _) => Address::Based {
        base,
        displacement: cursor.read_i8()?.into(),
      },
      (0b_10, _) => Address::Based {
        base,
        displacement: cursor.read_i16_le()?,
      },
      _ => unreachable!(),
    };
    Ok(Operand::Memory(address))
  }
}

enum Operand {
  Register(&'static str),
  Memory(Address),
}

enum Address {
  Direct(u16),
  Based {
    base: &'static str,
    displacement: i16,
  },
}

impl fmt::Display for Operand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operand::Register(name) => f.write_str(name),
      Operand::Memory(address) => write!(f, "{address}"),
    }
  }
}

impl fmt::Display for Address {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      Address::Direct(addr) => write!(f, "[{addr}]"),
      Address::Based { base, displacement } => match displacement {
        0 => write!(f, "[{base}]"),
        1.. => write!(f, "[{base} + {displacement}]"),
        _ => write!(f, "[{base} {displacement}]"),
      },
    }
  }
}
