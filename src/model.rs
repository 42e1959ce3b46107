//! Read-only representation of an elaborated register model.
//!
//! Nodes live in an arena owned by [`Model`] and refer to each other by [`NodeId`]. The lexical
//! information needed for class-name resolution (declared type name, original declaration and
//! the scope that declaration was made in) is carried on every node alongside its properties.

use crate::value::{Endianness, OnReadType, OnWriteType, SwAccess};

/// Index of a node in its model's arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Identity of an original type declaration. Two instances of the same named type share one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct DefId(usize);

/// The lexical scope a node's type was declared in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Scope {
  /// Declared at the global namespace.
  Root,
  /// Declared inside the body of another type definition.
  Def(DefId),
}

/// Shape of an array instance. Elements are laid out row-major, `stride` bytes apart.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayShape {
  pub dimensions: Vec<u64>,
  pub stride: u64,
}
impl ArrayShape {
  /// Total number of elements.
  pub fn len(&self) -> u64 {
    self.dimensions.iter().product()
  }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct AddrMapProps {
  pub endianness: Endianness,

  /// Whether the map is a bridge between several independent address spaces.
  pub bridge: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegProps {
  /// Bit width of the register.
  pub regwidth: u32,

  /// Bit width of a single software access to the register.
  pub accesswidth: u32,
}
impl RegProps {
  pub fn new(regwidth: u32) -> Self {
    Self {
      regwidth,
      accesswidth: regwidth,
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MemProps {
  pub mementries: u64,
  pub memwidth: u32,
  pub sw: SwAccess,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldProps {
  /// Position of the least significant bit within the register.
  pub lsb: u32,
  pub width: u32,
  pub sw: SwAccess,
  pub onread: Option<OnReadType>,
  pub onwrite: Option<OnWriteType>,
  pub reset: Option<u64>,

  /// Whether hardware may change the value behind software's back.
  pub volatile: bool,
}
impl FieldProps {
  pub fn new(lsb: u32, width: u32, sw: SwAccess) -> Self {
    Self {
      lsb,
      width,
      sw,
      onread: None,
      onwrite: None,
      reset: None,
      volatile: false,
    }
  }
}

/// What a node is, with the properties that only make sense for that kind.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
  AddrMap(AddrMapProps),
  RegFile,
  Reg(RegProps),
  Mem(MemProps),
  Field(FieldProps),
  Signal,
}
impl NodeKind {
  /// Short name of the component type, as used in generated comments.
  pub fn label(&self) -> &'static str {
    match self {
      NodeKind::AddrMap(_) => "Addrmap",
      NodeKind::RegFile => "Regfile",
      NodeKind::Reg(_) => "Reg",
      NodeKind::Mem(_) => "Mem",
      NodeKind::Field(_) => "Field",
      NodeKind::Signal => "Signal",
    }
  }
}

/// A single instance in the register tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
  /// Instance name. Unique among its siblings.
  pub name: String,

  pub kind: NodeKind,

  pub description: Option<String>,

  /// Address offset of the instance (of its first element, for arrays) relative to its parent.
  pub address_offset: u64,

  pub array: Option<ArrayShape>,

  /// Name the type was declared with. `None` for anonymous in-place definitions.
  pub type_name: Option<String>,

  /// The declaration this instance was created from, if known.
  pub original_def: Option<DefId>,

  /// The scope `original_def` was declared in, if known.
  pub parent_scope: Option<Scope>,

  parent: Option<NodeId>,
  children: Vec<NodeId>,
}
impl Node {
  pub fn new(name: &str, kind: NodeKind) -> Self {
    Self {
      name: name.to_owned(),
      kind,
      description: None,
      address_offset: 0,
      array: None,
      type_name: None,
      original_def: None,
      parent_scope: None,
      parent: None,
      children: Vec::new(),
    }
  }

  pub fn at(mut self, address_offset: u64) -> Self {
    self.address_offset = address_offset;
    self
  }

  pub fn array(mut self, dimensions: Vec<u64>, stride: u64) -> Self {
    self.array = Some(ArrayShape { dimensions, stride });
    self
  }

  /// Attaches lexical type information.
  pub fn typed(mut self, type_name: Option<&str>, def: Option<DefId>, scope: Option<Scope>) -> Self {
    self.type_name = type_name.map(|t| t.to_owned());
    self.original_def = def;
    self.parent_scope = scope;
    self
  }

  pub fn described(mut self, description: Option<String>) -> Self {
    self.description = description;
    self
  }

  pub fn is_array(&self) -> bool {
    self.array.is_some()
  }

  pub fn parent(&self) -> Option<NodeId> {
    self.parent
  }

  pub fn children(&self) -> &[NodeId] {
    &self.children
  }
}

/// An elaborated register model: every node of every top-level tree plus the type declarations
/// they were instantiated from.
#[derive(Clone, Debug, Default)]
pub struct Model {
  nodes: Vec<Node>,
  defs: Vec<String>,
  roots: Vec<NodeId>,
}
impl Model {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a new type declaration. `label` only shows up in diagnostics.
  pub fn declare(&mut self, label: &str) -> DefId {
    self.defs.push(label.to_owned());
    DefId(self.defs.len() - 1)
  }

  pub fn def_label(&self, def: DefId) -> &str {
    &self.defs[def.0]
  }

  pub fn add_root(&mut self, mut node: Node) -> NodeId {
    node.parent = None;
    node.children.clear();
    let id = NodeId(self.nodes.len());
    self.nodes.push(node);
    self.roots.push(id);
    id
  }

  pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
    node.parent = Some(parent);
    node.children.clear();
    let id = NodeId(self.nodes.len());
    self.nodes.push(node);
    self.nodes[parent.0].children.push(id);
    id
  }

  pub fn node(&self, id: NodeId) -> &Node {
    &self.nodes[id.0]
  }

  pub fn parent(&self, id: NodeId) -> Option<NodeId> {
    self.node(id).parent
  }

  pub fn children(&self, id: NodeId) -> &[NodeId] {
    &self.node(id).children
  }

  pub fn roots(&self) -> &[NodeId] {
    &self.roots
  }

  /// The first top-level address map.
  pub fn top(&self) -> Option<NodeId> {
    self
      .roots
      .iter()
      .copied()
      .find(|id| matches!(self.node(*id).kind, NodeKind::AddrMap(_)))
  }

  /// The top-level address map with the given instance name.
  pub fn find_top(&self, name: &str) -> Option<NodeId> {
    self.roots.iter().copied().find(|id| {
      let node = self.node(*id);
      node.name == name && matches!(node.kind, NodeKind::AddrMap(_))
    })
  }

  /// The fields of a register, in declaration order.
  pub fn fields(&self, reg: NodeId) -> impl Iterator<Item = (NodeId, &FieldProps)> {
    self
      .children(reg)
      .iter()
      .filter_map(move |id| match self.node(*id).kind {
        NodeKind::Field(ref props) => Some((*id, props)),
        _ => None,
      })
  }

  /// Ancestors of a node, nearest first, excluding the node itself.
  pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(self.parent(id), move |p| self.parent(*p))
  }

  /// Dot-separated path from the top of the tree. Identifies the node uniquely within the model.
  pub fn path(&self, id: NodeId) -> String {
    self.rel_path(id, None, ".")
  }

  /// Instance path of `id` starting just below `from` (or from the top of the tree when `from`
  /// is `None`). Array subscripts are omitted, so every element of an array shares one path.
  pub fn rel_path(&self, id: NodeId, from: Option<NodeId>, separator: &str) -> String {
    let mut segments = vec![self.node(id).name.as_str()];
    for ancestor in self.ancestors(id) {
      if Some(ancestor) == from {
        break;
      }
      segments.push(self.node(ancestor).name.as_str());
    }
    segments.reverse();
    segments.join(separator)
  }

  /// Absolute address of a node (of its first element, for arrays).
  pub fn absolute_address(&self, id: NodeId) -> u64 {
    self.node(id).address_offset
      + self
        .ancestors(id)
        .map(|a| self.node(a).address_offset)
        .sum::<u64>()
  }

  /// The nearest address map enclosing the node, the node itself included.
  pub fn owning_addrmap(&self, id: NodeId) -> Option<NodeId> {
    std::iter::once(id)
      .chain(self.ancestors(id))
      .find(|a| matches!(self.node(*a).kind, NodeKind::AddrMap(_)))
  }

  /// All descendants of `id` in post-order, followed by `id` itself.
  pub fn post_order(&self, id: NodeId) -> Vec<NodeId> {
    let mut order = Vec::new();
    self.collect_post_order(id, &mut order);
    order
  }

  fn collect_post_order(&self, id: NodeId, order: &mut Vec<NodeId>) {
    for child in self.children(id) {
      self.collect_post_order(*child, order);
    }
    order.push(id);
  }
}
