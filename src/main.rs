use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use dasm_8086::{disassemble_to, load, Image, MAX_IMAGE_SIZE};

/// Disassemble 8086 machine code (MOV/ADD subset) into NASM-style listings.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
  /// Binary files to disassemble, each independently
  #[arg(required = true)]
  files: Vec<PathBuf>,

  /// Omit the `; src:` comment and `bits 16` directive
  #[arg(long)]
  no_header: bool,

  /// Largest input accepted before truncation, in bytes
  #[arg(long, default_value_t = MAX_IMAGE_SIZE)]
  max_size: usize,
}

fn main() -> ExitCode {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
  let args = Args::parse();

  let stdout = io::stdout();
  if run(&args, &mut stdout.lock()) {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  }
}

/// Disassembles every file in order. A failing file is reported to stderr
/// and does not stop the others. Returns whether all files succeeded.
fn run<W: Write>(args: &Args, out: &mut W) -> bool {
  let mut ok = true;
  for path in &args.files {
    if let Err(err) = disassemble_file(path, args, out) {
      eprintln!("error: {err:#}");
      ok = false;
    }
  }
  ok
}

fn disassemble_file<W: Write>(path: &Path, args: &Args, out: &mut W) -> anyhow::Result<()> {
  let image = load(path, args.max_size)?;
  if !args.no_header {
    write_header(path, &image, out)?;
  }
  disassemble_to(&image.bytes, out)
    .with_context(|| format!("failed to disassemble {}", path.display()))?;
  Ok(())
}

fn write_header<W: Write>(path: &Path, image: &Image, out: &mut W) -> io::Result<()> {
  write!(out, "; src: `{}`", path.display())?;
  if image.is_truncated() {
    write!(
      out,
      " (truncated to {} of {} bytes)",
      image.bytes.len(),
      image.file_size
    )?;
  }
  writeln!(out, "\nbits 16\n")
}

#[cfg(test)]
mod tests {
  use super::*;
  use indoc::indoc as asm;
  use pretty_assertions::assert_eq;
  use std::ffi::OsStr;
  use tempfile::NamedTempFile;

  fn binary(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file
  }

  #[test]
  fn test_failed_file_does_not_stop_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.bin");
    let truncated = binary(&[0x89, 0xD8, 0x89]);
    let good = binary(&[0xB8, 0x05, 0x00]);
    let args = Args::parse_from([
      OsStr::new("dasm8086"),
      missing.as_os_str(),
      truncated.path().as_os_str(),
      good.path().as_os_str(),
    ]);
    let mut out = Vec::new();
    assert!(!run(&args, &mut out));
    assert_eq!(
      String::from_utf8(out).unwrap(),
      format!(
        "; src: `{}`\nbits 16\n\nmov ax, bx\n; src: `{}`\nbits 16\n\nmov ax, 5\n",
        truncated.path().display(),
        good.path().display()
      )
    );
  }

  #[test]
  fn test_no_header() {
    let file = binary(&[0x88, 0x4E, 0x04, 0x01, 0x00]);
    let args = Args::parse_from([
      OsStr::new("dasm8086"),
      OsStr::new("--no-header"),
      file.path().as_os_str(),
    ]);
    let mut out = Vec::new();
    assert!(run(&args, &mut out));
    assert_eq!(
      String::from_utf8(out).unwrap(),
      asm! {"
        mov [bp + 4], cl
        add [bx + si], ax
      "}
    );
  }

  #[test]
  fn test_header_marks_truncated_input() {
    let file = binary(&[0xB8, 0x05, 0x00, 0x89, 0xD8]);
    let args = Args::parse_from([
      OsStr::new("dasm8086"),
      OsStr::new("--max-size"),
      OsStr::new("3"),
      file.path().as_os_str(),
    ]);
    let mut out = Vec::new();
    assert!(run(&args, &mut out));
    assert_eq!(
      String::from_utf8(out).unwrap(),
      format!(
        "; src: `{}` (truncated to 3 of 5 bytes)\nbits 16\n\nmov ax, 5\n",
        file.path().display()
      )
    );
  }

  #[test]
  fn test_files_are_required() {
    assert!(Args::try_parse_from(["dasm8086"]).is_err());
  }
}
