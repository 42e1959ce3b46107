use crate::model::{Model, NodeId, NodeKind};
use std::collections::HashMap;

/// Receives callbacks while [`walk`] traverses a model.
pub trait Listener {
  fn enter(&mut self, _model: &Model, _id: NodeId) {}
  fn exit(&mut self, _model: &Model, _id: NodeId) {}
}

/// Depth-first traversal of the tree rooted at `id`, calling `enter` before a node's children and
/// `exit` after them.
pub fn walk<L: Listener>(model: &Model, id: NodeId, listener: &mut L) {
  listener.enter(model, id);
  for child in model.children(id) {
    walk(model, *child, listener);
  }
  listener.exit(model, id);
}

/// Maximum access width, in bits, of the registers and memories inside each address map and
/// register file. Keyed by node path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidthTable {
  widths: HashMap<String, u32>,
}
impl WidthTable {
  /// Collects the widths of every group-like node under (and including) `top`.
  pub fn build(model: &Model, top: NodeId) -> Self {
    let mut collector = WidthCollector {
      stack: Vec::new(),
      table: WidthTable::default(),
    };
    walk(model, top, &mut collector);
    collector.table
  }

  /// Maximum access width in bits, or `None` if `path` is not a group-like node.
  pub fn width(&self, path: &str) -> Option<u32> {
    self.widths.get(path).copied()
  }

  /// Bus width in bytes: the maximum access width rounded up to whole bytes. A group without any
  /// registers or memories gets a single-byte bus.
  pub fn bus_width_bytes(&self, path: &str) -> u32 {
    bus_bytes(path, self.width(path).unwrap_or(0))
  }

  pub fn len(&self) -> usize {
    self.widths.len()
  }
}

/// Bits rounded up to whole bytes.
pub fn bytes_for_bits(bits: u32) -> u32 {
  (bits + 7) / 8
}

/// Bus width in bytes for the map at `path`. Never less than one byte.
pub fn bus_bytes(path: &str, bits: u32) -> u32 {
  if bits == 0 {
    log::warn!("'{}' contains no registers; using a 1 byte bus width", path);
    return 1;
  }
  bytes_for_bits(bits)
}

struct WidthCollector {
  stack: Vec<u32>,
  table: WidthTable,
}
impl WidthCollector {
  fn widen(&mut self, width: u32) {
    if let Some(top) = self.stack.last_mut() {
      *top = (*top).max(width);
    }
  }
}
impl Listener for WidthCollector {
  fn enter(&mut self, model: &Model, id: NodeId) {
    match model.node(id).kind {
      NodeKind::AddrMap(_) | NodeKind::RegFile => self.stack.push(0),
      NodeKind::Reg(ref reg) => self.widen(reg.accesswidth),
      NodeKind::Mem(ref mem) => self.widen(mem.memwidth),
      NodeKind::Field(_) | NodeKind::Signal => {}
    }
  }

  fn exit(&mut self, model: &Model, id: NodeId) {
    match model.node(id).kind {
      NodeKind::AddrMap(_) | NodeKind::RegFile => {
        let width = self.stack.pop().unwrap_or(0);
        self.table.widths.insert(model.path(id), width);
        self.widen(width);
      }
      _ => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{bus_bytes, bytes_for_bits, walk, Listener, WidthTable};
  use crate::model::{AddrMapProps, MemProps, Model, Node, NodeId, NodeKind, RegProps};
  use crate::value::SwAccess;

  fn reg(width: u32) -> NodeKind {
    NodeKind::Reg(RegProps::new(width))
  }

  #[test]
  fn block_width_is_widest_register() {
    let mut model = Model::new();
    let top = model.add_root(Node::new("top", NodeKind::AddrMap(AddrMapProps::default())));
    model.add_child(top, Node::new("a", reg(8)));
    model.add_child(top, Node::new("b", reg(16)).at(0x4));
    model.add_child(top, Node::new("c", reg(32)).at(0x8));

    let widths = WidthTable::build(&model, top);

    assert_eq!(Some(32), widths.width("top"));
    assert_eq!(4, widths.bus_width_bytes("top"));
  }

  #[test]
  fn odd_width_rounds_up_to_bytes() {
    let mut model = Model::new();
    let top = model.add_root(Node::new("top", NodeKind::AddrMap(AddrMapProps::default())));
    model.add_child(top, Node::new("a", reg(12)));

    let widths = WidthTable::build(&model, top);

    assert_eq!(2, widths.bus_width_bytes("top"));
    assert_eq!(2, bytes_for_bits(9));
    assert_eq!(1, bytes_for_bits(8));
  }

  #[test]
  fn bus_is_at_least_one_byte() {
    assert_eq!(1, bus_bytes("top.ram", 0));
    assert_eq!(1, bus_bytes("top.ram", 1));
    assert_eq!(8, bus_bytes("top.ram", 64));
  }

  #[test]
  fn widths_propagate_to_parents_but_not_children() {
    let mut model = Model::new();
    let top = model.add_root(Node::new("top", NodeKind::AddrMap(AddrMapProps::default())));
    model.add_child(top, Node::new("a", reg(16)));
    let rf = model.add_child(top, Node::new("rf", NodeKind::RegFile).at(0x100));
    let mut accessed = RegProps::new(64);
    accessed.accesswidth = 32;
    model.add_child(rf, Node::new("wide", NodeKind::Reg(accessed)));
    let sub = model.add_child(rf, Node::new("sub", NodeKind::RegFile).at(0x40));
    model.add_child(sub, Node::new("narrow", reg(8)));
    model.add_child(
      top,
      Node::new(
        "ram",
        NodeKind::Mem(MemProps {
          mementries: 1024,
          memwidth: 64,
          sw: SwAccess::ReadWrite,
        }),
      )
      .at(0x1000),
    );

    let widths = WidthTable::build(&model, top);

    assert_eq!(Some(8), widths.width("top.rf.sub"));
    assert_eq!(Some(32), widths.width("top.rf"));
    assert_eq!(Some(64), widths.width("top"));
    assert_eq!(None, widths.width("top.a"));
    assert_eq!(3, widths.len());
  }

  #[test]
  fn empty_block_falls_back_to_one_byte() {
    let mut model = Model::new();
    let top = model.add_root(Node::new("top", NodeKind::AddrMap(AddrMapProps::default())));
    model.add_child(top, Node::new("empty", NodeKind::RegFile));

    let widths = WidthTable::build(&model, top);

    assert_eq!(Some(0), widths.width("top.empty"));
    assert_eq!(1, widths.bus_width_bytes("top.empty"));
  }

  #[test]
  fn walks_depth_first() {
    struct Recorder(Vec<String>);
    impl Listener for Recorder {
      fn enter(&mut self, model: &Model, id: NodeId) {
        self.0.push(format!("+{}", model.node(id).name));
      }
      fn exit(&mut self, model: &Model, id: NodeId) {
        self.0.push(format!("-{}", model.node(id).name));
      }
    }

    let mut model = Model::new();
    let top = model.add_root(Node::new("top", NodeKind::AddrMap(AddrMapProps::default())));
    let rf = model.add_child(top, Node::new("rf", NodeKind::RegFile));
    model.add_child(rf, Node::new("r", reg(32)));

    let mut recorder = Recorder(Vec::new());
    walk(&model, top, &mut recorder);

    assert_eq!(vec!["+top", "+rf", "+r", "-r", "-rf", "-top"], recorder.0);
  }
}
