//! Disassembler for the MOV/ADD subset of 8086 machine code.

pub mod cursor;
pub mod decode;
pub mod error;
pub mod loader;
pub mod table;

pub use decode::{disassemble, disassemble_to};
pub use error::{DecodeError, Error, Result};
pub use loader::{load, Image, MAX_IMAGE_SIZE};
