/// Instruction encodings the decoder understands, keyed by the fixed bits of
/// the leading byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
  /// `100010dw` / `000000dw` + mod reg r/m
  RegMemWithReg(Mnemonic),
  /// `1100011w` + mod 000 r/m + disp + data
  ImmToRegMem,
  /// `1011wreg` + data
  ImmToReg,
  /// `1010000w` + addr
  MemToAcc,
  /// `1010001w` + addr
  AccToMem,
  /// `10001110` + mod 0sr r/m
  RegMemToSeg,
  /// `10001100` + mod 0sr r/m
  SegToRegMem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
  Mov,
  Add,
}

impl Mnemonic {
  pub fn as_str(self) -> &'static str {
    match self {
      Mnemonic::Mov => "mov",
      Mnemonic::Add => "add",
    }
  }
}

struct Pattern {
  mask: u8,
  bits: u8,
  format: Format,
}

const fn pattern(mask: u8, bits: u8, format: Format) -> Pattern {
  Pattern { mask, bits, format }
}

// most pinned bits first
const PATTERNS: [Pattern; 8] = [
  pattern(0b1111_1111, 0b1000_1110, Format::RegMemToSeg),
  pattern(0b1111_1111, 0b1000_1100, Format::SegToRegMem),
  pattern(0b1111_1110, 0b1100_0110, Format::ImmToRegMem),
  pattern(0b1111_1110, 0b1010_0000, Format::MemToAcc),
  pattern(0b1111_1110, 0b1010_0010, Format::AccToMem),
  pattern(0b1111_1100, 0b1000_1000, Format::RegMemWithReg(Mnemonic::Mov)),
  pattern(0b1111_1100, 0b0000_0000, Format::RegMemWithReg(Mnemonic::Add)),
  pattern(0b1111_0000, 0b1011_0000, Format::ImmToReg),
];

impl Format {
  pub fn classify(byte: u8) -> Option<Format> {
    PATTERNS
      .iter()
      .find(|p| byte & p.mask == p.bits)
      .map(|p| p.format)
  }
}

pub fn register(reg: u8, w_bit_set: bool) -> &'static str {
  match (reg, w_bit_set) {
    (0b_000, false) => "al",
    (0b_001, false) => "cl",
    (0b_010, false) => "dl",
    (0b_011, false) => "bl",
    (0b_100, false) => "ah",
    (0b_101, false) => "ch",
    (0b_110, false) => "dh",
    (0b_111, false) => "bh",
    (0b_000, true) => "ax",
    (0b_001, true) => "cx",
    (0b_010, true) => "dx",
    (0b_011, true) => "bx",
    (0b_100, true) => "sp",
    (0b_101, true) => "bp",
    (0b_110, true) => "si",
    (0b_111, true) => "di",
    _ => unreachable!("register index out of range: {reg}"),
  }
}

/// Base/index expression for a memory r/m. `0b110` means `bp` only when
/// mod != 0; with mod == 0 it is a direct address and never reaches here.
pub fn effective_address(rm: u8) -> &'static str {
  match rm {
    0b_000 => "bx + si",
    0b_001 => "bx + di",
    0b_010 => "bp + si",
    0b_011 => "bp + di",
    0b_100 => "si",
    0b_101 => "di",
    0b_110 => "bp",
    0b_111 => "bx",
    _ => unreachable!("r/m index out of range: {rm}"),
  }
}

pub fn segment_register(sr: u8) -> &'static str {
  match sr {
    0b_00 => "es",
    0b_01 => "cs",
    0b_10 => "ss",
    0b_11 => "ds",
    _ => unreachable!("segment register index out of range: {sr}"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_classify_leading_bytes() {
    assert_eq!(
      Format::classify(0x89),
      Some(Format::RegMemWithReg(Mnemonic::Mov))
    );
    assert_eq!(
      Format::classify(0x02),
      Some(Format::RegMemWithReg(Mnemonic::Add))
    );
    assert_eq!(Format::classify(0xB8), Some(Format::ImmToReg));
    assert_eq!(Format::classify(0xB7), Some(Format::ImmToReg));
    assert_eq!(Format::classify(0xC7), Some(Format::ImmToRegMem));
    assert_eq!(Format::classify(0xA1), Some(Format::MemToAcc));
    assert_eq!(Format::classify(0xA2), Some(Format::AccToMem));
    assert_eq!(Format::classify(0x8E), Some(Format::RegMemToSeg));
    assert_eq!(Format::classify(0x8C), Some(Format::SegToRegMem));
    assert_eq!(Format::classify(0x8D), None);
    assert_eq!(Format::classify(0x90), None);
    assert_eq!(Format::classify(0xFF), None);
  }

  #[test]
  fn test_no_byte_matches_two_patterns() {
    for byte in 0..=u8::MAX {
      let hits = PATTERNS
        .iter()
        .filter(|p| byte & p.mask == p.bits)
        .count();
      assert!(hits <= 1, "{byte:08b} matched {hits} formats");
    }
  }

  #[test]
  fn test_patterns_ordered_by_specificity() {
    let pinned: Vec<u32> = PATTERNS.iter().map(|p| p.mask.count_ones()).collect();
    let mut sorted = pinned.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(pinned, sorted);
  }

  #[test]
  fn test_register_names() {
    assert_eq!(register(0b_011, true), "bx");
    assert_eq!(register(0b_100, false), "ah");
    assert_eq!(effective_address(0b_010), "bp + si");
    assert_eq!(effective_address(0b_110), "bp");
    assert_eq!(segment_register(0b_11), "ds");
    assert_eq!(segment_register(0b_01), "cs");
  }
}
