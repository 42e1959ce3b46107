//! Class-name resolution.
//!
//! In lexical mode a class is named after the chain of type declarations it was declared in, so
//! every instance of one declaration resolves to the same class. Nodes whose declaration chain
//! cannot be resolved fall back to their hierarchical path behind [`EXTERN_PREFIX`], which keeps
//! the two naming schemes from ever producing the same identifier.

use crate::model::{Model, NodeId, Scope};
use crate::options::TypeStyle;

/// Prefix marking a class name that fell back to the hierarchical scheme in lexical mode.
pub const EXTERN_PREFIX: &str = "xtern__";

const CLASS_SEPARATOR: &str = "__";

/// Computes class and instance names for the nodes of one export.
pub struct NameResolver<'a> {
  model: &'a Model,
  top: NodeId,
  style: TypeStyle,
  uppercase_inst_names: bool,
}
impl<'a> NameResolver<'a> {
  pub fn new(model: &'a Model, top: NodeId, style: TypeStyle) -> Self {
    Self {
      model,
      top,
      style,
      uppercase_inst_names: false,
    }
  }

  pub fn with_uppercase_inst_names(mut self, uppercase: bool) -> Self {
    self.uppercase_inst_names = uppercase;
    self
  }

  /// The class type name of a node. Unique per distinct type declaration.
  pub fn class_name(&self, id: NodeId) -> String {
    match self.style {
      TypeStyle::Lexical => match self.resolved_scope_path(id, CLASS_SEPARATOR) {
        Some(scope_path) => scope_path,
        None => format!("{}{}", EXTERN_PREFIX, self.hier_path(id, CLASS_SEPARATOR)),
      },
      TypeStyle::Hierarchical => self.hier_path(id, CLASS_SEPARATOR),
    }
  }

  /// A readable description of the class for comments, e.g. `Reg - top_t::ctrl_t`.
  pub fn friendly_name(&self, id: NodeId) -> String {
    let path = match self.style {
      TypeStyle::Lexical => self
        .resolved_scope_path(id, "::")
        .unwrap_or_else(|| self.hier_path(id, ".")),
      TypeStyle::Hierarchical => self.hier_path(id, "."),
    };
    format!("{} - {}", self.model.node(id).kind.label(), path)
  }

  /// The member name a node is instantiated under inside its parent's class.
  pub fn inst_name(&self, id: NodeId) -> String {
    let name = &self.model.node(id).name;
    if self.uppercase_inst_names {
      name.to_uppercase()
    } else {
      name.clone()
    }
  }

  /// The declaration scope path of a node's type joined with `separator`, ending in its type
  /// name. `None` if any link of the chain is unknown or anonymous.
  pub fn resolved_scope_path(&self, id: NodeId, separator: &str) -> Option<String> {
    let node = self.model.node(id);
    let scope_def = match node.parent_scope? {
      Scope::Root => return node.type_name.clone(),
      Scope::Def(def) => def,
    };

    // A type declared inside another type's body can only be instantiated within an instance
    // of that type, so the declaring scope is always one of the node's ancestors.
    for ancestor in self.model.ancestors(id) {
      let ancestor_def = self.model.node(ancestor).original_def?;
      if ancestor_def == scope_def {
        let parent_path = self.resolved_scope_path(ancestor, separator)?;
        let type_name = node.type_name.as_ref()?;
        return Some(format!("{}{}{}", parent_path, separator, type_name));
      }
    }

    None
  }

  /// Instance path from the export's top node down to `id`, with array subscripts removed.
  fn hier_path(&self, id: NodeId, separator: &str) -> String {
    self
      .model
      .rel_path(id, self.model.parent(self.top), separator)
  }
}

#[cfg(test)]
mod tests {
  use super::{NameResolver, EXTERN_PREFIX};
  use crate::model::{AddrMapProps, Model, Node, NodeId, NodeKind, RegProps, Scope};
  use crate::options::TypeStyle;

  struct Design {
    model: Model,
    top: NodeId,
    ctrl_a: NodeId,
    ctrl_b: NodeId,
    blk_a: NodeId,
    anon: NodeId,
    inside_anon: NodeId,
    arr: NodeId,
  }

  // addrmap top_t {
  //   regfile blk_t { reg ctrl_t {...}; ctrl_t ctrl; };
  //   blk_t blk_a; blk_t blk_b;
  //   regfile { ctrl_like_t inner; } anon;
  //   reg arr_t {...}; arr_t arr[4];
  // } top;
  fn design() -> Design {
    let mut model = Model::new();
    let top_t = model.declare("top_t");
    let blk_t = model.declare("blk_t");
    let ctrl_t = model.declare("ctrl_t");
    let anon_t = model.declare("<anonymous regfile>");
    let inner_t = model.declare("ctrl_like_t");
    let arr_t = model.declare("arr_t");

    let top = model.add_root(
      Node::new("top", NodeKind::AddrMap(AddrMapProps::default())).typed(
        Some("top_t"),
        Some(top_t),
        Some(Scope::Root),
      ),
    );

    let mut ctrls = Vec::new();
    let mut blks = Vec::new();
    for (n, name) in ["blk_a", "blk_b"].iter().enumerate() {
      let blk = model.add_child(
        top,
        Node::new(name, NodeKind::RegFile)
          .at(0x100 * n as u64)
          .typed(Some("blk_t"), Some(blk_t), Some(Scope::Def(top_t))),
      );
      let ctrl = model.add_child(
        blk,
        Node::new("ctrl", NodeKind::Reg(RegProps::new(32))).typed(
          Some("ctrl_t"),
          Some(ctrl_t),
          Some(Scope::Def(blk_t)),
        ),
      );
      blks.push(blk);
      ctrls.push(ctrl);
    }

    let anon = model.add_child(
      top,
      Node::new("anon", NodeKind::RegFile)
        .at(0x200)
        .typed(None, Some(anon_t), Some(Scope::Def(top_t))),
    );
    let inside_anon = model.add_child(
      anon,
      Node::new("inner", NodeKind::Reg(RegProps::new(32))).typed(
        Some("ctrl_like_t"),
        Some(inner_t),
        Some(Scope::Def(anon_t)),
      ),
    );
    let arr = model.add_child(
      top,
      Node::new("arr", NodeKind::Reg(RegProps::new(32)))
        .at(0x300)
        .array(vec![4], 4)
        .typed(Some("arr_t"), Some(arr_t), Some(Scope::Def(top_t))),
    );

    Design {
      model,
      top,
      ctrl_a: ctrls[0],
      ctrl_b: ctrls[1],
      blk_a: blks[0],
      anon,
      inside_anon,
      arr,
    }
  }

  #[test]
  fn lexical_names_follow_declaration_scope() {
    let d = design();
    let names = NameResolver::new(&d.model, d.top, TypeStyle::Lexical);

    assert_eq!("top_t", names.class_name(d.top));
    assert_eq!("top_t__blk_t", names.class_name(d.blk_a));
    assert_eq!("top_t__blk_t__ctrl_t", names.class_name(d.ctrl_a));
    assert_eq!("top_t__arr_t", names.class_name(d.arr));
  }

  #[test]
  fn lexical_names_are_shared_between_instances() {
    let d = design();
    let names = NameResolver::new(&d.model, d.top, TypeStyle::Lexical);

    assert_eq!(names.class_name(d.ctrl_a), names.class_name(d.ctrl_b));
  }

  #[test]
  fn anonymous_types_fall_back_to_marked_hierarchical_names() {
    let d = design();
    let names = NameResolver::new(&d.model, d.top, TypeStyle::Lexical);

    assert_eq!(None, names.resolved_scope_path(d.anon, "__"));
    assert_eq!(format!("{}top__anon", EXTERN_PREFIX), names.class_name(d.anon));

    // Named, but declared inside an anonymous scope.
    assert_eq!(None, names.resolved_scope_path(d.inside_anon, "__"));
    assert_eq!("xtern__top__anon__inner", names.class_name(d.inside_anon));
  }

  #[test]
  fn unknown_scope_falls_back() {
    let mut model = Model::new();
    let top = model.add_root(Node::new("top", NodeKind::AddrMap(AddrMapProps::default())));
    let reg = model.add_child(
      top,
      Node::new("r", NodeKind::Reg(RegProps::new(32))).typed(Some("r_t"), None, None),
    );
    let names = NameResolver::new(&model, top, TypeStyle::Lexical);

    assert_eq!("xtern__top", names.class_name(top));
    assert_eq!("xtern__top__r", names.class_name(reg));
  }

  #[test]
  fn hierarchical_names_are_instance_paths() {
    let d = design();
    let names = NameResolver::new(&d.model, d.top, TypeStyle::Hierarchical);

    assert_eq!("top", names.class_name(d.top));
    assert_eq!("top__blk_a__ctrl", names.class_name(d.ctrl_a));
    assert_eq!("top__blk_b__ctrl", names.class_name(d.ctrl_b));
    assert_eq!("top__arr", names.class_name(d.arr));
  }

  #[test]
  fn hierarchical_names_are_relative_to_export_top() {
    let d = design();
    let names = NameResolver::new(&d.model, d.blk_a, TypeStyle::Hierarchical);

    assert_eq!("blk_a__ctrl", names.class_name(d.ctrl_a));
  }

  #[test]
  fn friendly_names_describe_the_class() {
    let d = design();
    let lexical = NameResolver::new(&d.model, d.top, TypeStyle::Lexical);
    let hier = NameResolver::new(&d.model, d.top, TypeStyle::Hierarchical);

    assert_eq!("Reg - top_t::blk_t::ctrl_t", lexical.friendly_name(d.ctrl_a));
    assert_eq!("Regfile - top.anon", lexical.friendly_name(d.anon));
    assert_eq!("Reg - top.blk_b.ctrl", hier.friendly_name(d.ctrl_b));
  }

  #[test]
  fn instance_names_can_be_uppercased() {
    let d = design();
    let names = NameResolver::new(&d.model, d.top, TypeStyle::Lexical);
    assert_eq!("blk_a", names.inst_name(d.blk_a));

    let names = names.with_uppercase_inst_names(true);
    assert_eq!("BLK_A", names.inst_name(d.blk_a));
  }
}
