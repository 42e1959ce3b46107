use crate::error::{ErrorKind, RalError, RalResult};
use std::str::FromStr;
use svd_parser::{Access, Endian, ModifiedWriteValues};

/// Software access policy of a field or memory.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SwAccess {
  Read,
  Write,
  ReadWrite,
  /// Readable, writable once after reset.
  ReadWrite1,
  /// Write-only, writable once after reset.
  Write1,
  NoAccess,
}
impl SwAccess {
  pub fn from_svd(access: &Access) -> SwAccess {
    match access {
      Access::ReadOnly => SwAccess::Read,
      Access::ReadWrite => SwAccess::ReadWrite,
      Access::ReadWriteOnce => SwAccess::ReadWrite1,
      Access::WriteOnce => SwAccess::Write1,
      Access::WriteOnly => SwAccess::Write,
    }
  }

  pub fn can_write(&self) -> bool {
    match self {
      SwAccess::Write | SwAccess::ReadWrite | SwAccess::ReadWrite1 | SwAccess::Write1 => true,
      _ => false,
    }
  }
}
impl FromStr for SwAccess {
  type Err = RalError;

  fn from_str(s: &str) -> RalResult<Self> {
    match s.trim() {
      "r" => Ok(SwAccess::Read),
      "w" => Ok(SwAccess::Write),
      "rw" | "wr" => Ok(SwAccess::ReadWrite),
      "rw1" | "wr1" => Ok(SwAccess::ReadWrite1),
      "w1" => Ok(SwAccess::Write1),
      "na" => Ok(SwAccess::NoAccess),
      other => Err(RalError::new(
        ErrorKind::UnrecognizedAccessPolicy,
        &format!("Unrecognized access policy '{}'", other),
      )),
    }
  }
}

/// Side effect of a software read.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OnReadType {
  /// Cleared on read.
  Rclr,
  /// Set on read.
  Rset,
}
impl FromStr for OnReadType {
  type Err = RalError;

  fn from_str(s: &str) -> RalResult<Self> {
    match s.trim() {
      "rclr" => Ok(OnReadType::Rclr),
      "rset" => Ok(OnReadType::Rset),
      other => Err(RalError::new(
        ErrorKind::UnrecognizedAccessPolicy,
        &format!("Unrecognized onread side effect '{}'", other),
      )),
    }
  }
}

/// Side effect of a software write.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OnWriteType {
  Woclr,
  Woset,
  Wot,
  Wzc,
  Wzs,
  Wzt,
  Wclr,
  Wset,
}
impl OnWriteType {
  /// Maps a CMSIS-SVD `modifiedWriteValues` to the equivalent write side effect. `modify` is a
  /// plain write and has none.
  pub fn from_svd(mwv: &ModifiedWriteValues) -> Option<OnWriteType> {
    match mwv {
      ModifiedWriteValues::OneToClear => Some(OnWriteType::Woclr),
      ModifiedWriteValues::OneToSet => Some(OnWriteType::Woset),
      ModifiedWriteValues::OneToToggle => Some(OnWriteType::Wot),

      ModifiedWriteValues::ZeroToClear => Some(OnWriteType::Wzc),
      ModifiedWriteValues::ZeroToSet => Some(OnWriteType::Wzs),
      ModifiedWriteValues::ZeroToToggle => Some(OnWriteType::Wzt),

      ModifiedWriteValues::Clear => Some(OnWriteType::Wclr),
      ModifiedWriteValues::Set => Some(OnWriteType::Wset),
      ModifiedWriteValues::Modify => None,
    }
  }
}
impl FromStr for OnWriteType {
  type Err = RalError;

  fn from_str(s: &str) -> RalResult<Self> {
    match s.trim() {
      "woclr" => Ok(OnWriteType::Woclr),
      "woset" => Ok(OnWriteType::Woset),
      "wot" => Ok(OnWriteType::Wot),
      "wzc" => Ok(OnWriteType::Wzc),
      "wzs" => Ok(OnWriteType::Wzs),
      "wzt" => Ok(OnWriteType::Wzt),
      "wclr" => Ok(OnWriteType::Wclr),
      "wset" => Ok(OnWriteType::Wset),
      other => Err(RalError::new(
        ErrorKind::UnrecognizedAccessPolicy,
        &format!("Unrecognized onwrite side effect '{}'", other),
      )),
    }
  }
}

/// Byte ordering of an address map.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Endianness {
  Little,
  Big,
  Unspecified,
}
impl Endianness {
  pub fn from_svd(e: &Endian) -> Self {
    match e {
      Endian::Little => Endianness::Little,
      Endian::Big => Endianness::Big,
      Endian::Selectable | Endian::Other => Endianness::Unspecified,
    }
  }

  /// The `uvm_endianness_e` literal for this byte ordering.
  pub fn uvm_name(&self) -> &'static str {
    match self {
      Endianness::Little => "UVM_LITTLE_ENDIAN",
      Endianness::Big => "UVM_BIG_ENDIAN",
      Endianness::Unspecified => "UVM_NO_ENDIAN",
    }
  }
}
impl Default for Endianness {
  fn default() -> Self {
    Endianness::Unspecified
  }
}

/// Parses an unsigned number written in decimal, `0x` hex or SystemVerilog `'h` hex.
pub fn parse_number(s: &str) -> RalResult<u64> {
  let s = s.trim().replace('_', "");
  let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
    u64::from_str_radix(hex, 16)
  } else if let Some(hex) = s.strip_prefix("'h").or_else(|| s.strip_prefix("'H")) {
    u64::from_str_radix(hex, 16)
  } else {
    s.parse::<u64>()
  };
  parsed.map_err(|_| RalError::model(&format!("'{}' is not a number", s)))
}
