use crate::model::{Model, NodeId};
use crate::value::{OnReadType, OnWriteType, SwAccess};
use std::fmt;

/// UVM access policy codes, as accepted by `uvm_reg_field::configure` and `uvm_mem::new`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UvmAccess {
  Rw,
  Ro,
  Wo,
  W1c,
  W1s,
  W1t,
  W0c,
  W0s,
  W0t,
  Wc,
  Ws,
  Rc,
  Rs,
  Wrc,
  Wrs,
  W1src,
  W0src,
  Wsrc,
  W1crs,
  W0crs,
  Wcrs,
  Woc,
  Wos,
  W1,
  Wo1,
  NoAccess,
}
impl UvmAccess {
  pub fn as_str(&self) -> &'static str {
    match self {
      UvmAccess::Rw => "RW",
      UvmAccess::Ro => "RO",
      UvmAccess::Wo => "WO",
      UvmAccess::W1c => "W1C",
      UvmAccess::W1s => "W1S",
      UvmAccess::W1t => "W1T",
      UvmAccess::W0c => "W0C",
      UvmAccess::W0s => "W0S",
      UvmAccess::W0t => "W0T",
      UvmAccess::Wc => "WC",
      UvmAccess::Ws => "WS",
      UvmAccess::Rc => "RC",
      UvmAccess::Rs => "RS",
      UvmAccess::Wrc => "WRC",
      UvmAccess::Wrs => "WRS",
      UvmAccess::W1src => "W1SRC",
      UvmAccess::W0src => "W0SRC",
      UvmAccess::Wsrc => "WSRC",
      UvmAccess::W1crs => "W1CRS",
      UvmAccess::W0crs => "W0CRS",
      UvmAccess::Wcrs => "WCRS",
      UvmAccess::Woc => "WOC",
      UvmAccess::Wos => "WOS",
      UvmAccess::W1 => "W1",
      UvmAccess::Wo1 => "WO1",
      UvmAccess::NoAccess => "NOACCESS",
    }
  }
}
impl fmt::Display for UvmAccess {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Access code of a field. Combined read and write side effects take precedence over write side
/// effects, which take precedence over read side effects.
pub fn field_access(
  sw: SwAccess,
  onread: Option<OnReadType>,
  onwrite: Option<OnWriteType>,
) -> UvmAccess {
  use OnReadType::*;
  use OnWriteType::*;

  match sw {
    SwAccess::ReadWrite => match (onread, onwrite) {
      (None, None) => UvmAccess::Rw,

      (Some(Rclr), Some(Woset)) => UvmAccess::W1src,
      (Some(Rclr), Some(Wzs)) => UvmAccess::W0src,
      (Some(Rclr), Some(Wset)) => UvmAccess::Wsrc,
      (Some(Rset), Some(Woclr)) => UvmAccess::W1crs,
      (Some(Rset), Some(Wzc)) => UvmAccess::W0crs,
      (Some(Rset), Some(Wclr)) => UvmAccess::Wcrs,

      (_, Some(Woclr)) => UvmAccess::W1c,
      (_, Some(Woset)) => UvmAccess::W1s,
      (_, Some(Wot)) => UvmAccess::W1t,
      (_, Some(Wzc)) => UvmAccess::W0c,
      (_, Some(Wzs)) => UvmAccess::W0s,
      (_, Some(Wzt)) => UvmAccess::W0t,
      (_, Some(Wclr)) => UvmAccess::Wc,
      (_, Some(Wset)) => UvmAccess::Ws,

      (Some(Rclr), None) => UvmAccess::Wrc,
      (Some(Rset), None) => UvmAccess::Wrs,
    },
    SwAccess::Read => match onread {
      None => UvmAccess::Ro,
      Some(Rclr) => UvmAccess::Rc,
      Some(Rset) => UvmAccess::Rs,
    },
    SwAccess::Write => match onwrite {
      Some(Wclr) => UvmAccess::Woc,
      Some(Wset) => UvmAccess::Wos,
      _ => UvmAccess::Wo,
    },
    SwAccess::ReadWrite1 => UvmAccess::W1,
    SwAccess::Write1 => UvmAccess::Wo1,
    SwAccess::NoAccess => UvmAccess::NoAccess,
  }
}

/// Access code of a memory: read-only or read-write.
pub fn mem_access(sw: SwAccess) -> UvmAccess {
  match sw {
    SwAccess::Read => UvmAccess::Ro,
    _ => UvmAccess::Rw,
  }
}

/// Access annotation used when a register is added to an address map: read-write if software
/// can write any of its fields, read-only otherwise.
pub fn reg_map_access(model: &Model, reg: NodeId) -> UvmAccess {
  if model.fields(reg).any(|(_, field)| field.sw.can_write()) {
    UvmAccess::Rw
  } else {
    UvmAccess::Ro
  }
}
