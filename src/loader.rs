//! Loads an elaborated register model from its XML interchange form.
//!
//! ```xml
//! <model>
//!   <addrmap name="top" type="top_t" scope="root" littleendian="true">
//!     <reg name="ctrl" type="ctrl_t" scope="top_t" offset="0x0" regwidth="32">
//!       <field name="en" lsb="0" width="1" sw="rw" onwrite="woclr" reset="0"/>
//!     </reg>
//!     <regfile name="chan" type="chan_t" scope="top_t" offset="0x100" dims="4" stride="0x20">
//!       ...
//!     </regfile>
//!   </addrmap>
//! </model>
//! ```
//!
//! `scope` names the declaration a type was declared in (`root` for the global namespace), by its
//! `def` key. A node's `def` key defaults to `<scope>::<type>`, or just `<type>` at root scope.

use crate::error::{RalError, RalResult};
use crate::model::{
  AddrMapProps, DefId, FieldProps, MemProps, Model, Node, NodeId, NodeKind, RegProps, Scope,
};
use crate::value::{parse_number, Endianness, OnReadType, OnWriteType, SwAccess};
use std::collections::HashMap;
use std::convert::TryFrom;
use std::path::Path;
use xmltree::Element;

const ROOT_SCOPE: &str = "root";
const UNKNOWN_SCOPE: &str = "?";

pub fn load_model(xml: &str) -> RalResult<Model> {
  let root = Element::parse(xml.as_bytes())?;
  if root.name != "model" {
    return Err(RalError::model(&format!(
      "Expected a <model> document, found <{}>",
      root.name
    )));
  }

  let mut loader = ModelLoader {
    model: Model::new(),
    defs: HashMap::new(),
  };
  for el in child_elements(&root) {
    loader.load_node(el, None)?;
  }

  if loader.model.roots().is_empty() {
    return Err(RalError::model("Model contains no top-level components"));
  }
  Ok(loader.model)
}

pub fn load_model_file(path: &Path) -> RalResult<Model> {
  let xml = std::fs::read_to_string(path)?;
  load_model(&xml).map_err(|e| RalError::new(e.kind, &format!("{}: {}", path.display(), e.details)))
}

struct ModelLoader {
  model: Model,
  defs: HashMap<String, DefId>,
}
impl ModelLoader {
  fn def(&mut self, key: &str) -> DefId {
    if let Some(def) = self.defs.get(key) {
      return *def;
    }
    let def = self.model.declare(key);
    self.defs.insert(key.to_owned(), def);
    def
  }

  fn load_node(&mut self, el: &Element, parent: Option<NodeId>) -> RalResult<NodeId> {
    let name = required(el, "name")?;
    let kind = parse_kind(el)?;

    if let Some(parent) = parent {
      let parent_is_reg = matches!(self.model.node(parent).kind, NodeKind::Reg(_));
      let is_field = matches!(kind, NodeKind::Field(_));
      if parent_is_reg != is_field {
        return Err(RalError::model(&format!(
          "<{}> '{}' cannot be placed inside '{}'",
          el.name,
          name,
          self.model.path(parent)
        )));
      }
    } else if !matches!(kind, NodeKind::AddrMap(_)) {
      return Err(RalError::model(&format!(
        "Top-level component '{}' must be an <addrmap>, found <{}>",
        name, el.name
      )));
    }

    let scope_key = attr(el, "scope");
    let scope = match scope_key {
      None => None,
      Some(ROOT_SCOPE) => Some(Scope::Root),
      Some(key) => Some(Scope::Def(self.def(key))),
    };
    let type_name = attr(el, "type");
    let def = match (attr(el, "def"), type_name) {
      (Some(key), _) => Some(self.def(key)),
      (None, Some(t)) => {
        let key = match scope_key {
          Some(ROOT_SCOPE) => t.to_owned(),
          Some(s) => format!("{}::{}", s, t),
          None => format!("{}::{}", UNKNOWN_SCOPE, t),
        };
        Some(self.def(&key))
      }
      (None, None) => None,
    };

    let mut node = Node::new(name, kind)
      .at(opt_number(el, "offset")?.unwrap_or(0))
      .typed(type_name, def, scope)
      .described(attr(el, "desc").map(|d| d.to_owned()));

    if let Some(dims) = attr(el, "dims") {
      let dimensions = dims
        .split(',')
        .map(parse_number)
        .collect::<RalResult<Vec<u64>>>()?;
      let stride = opt_number(el, "stride")?.ok_or_else(|| {
        RalError::model(&format!("Array '{}' has dimensions but no stride", name))
      })?;
      node = node.array(dimensions, stride);
    }

    let id = match parent {
      Some(parent) => self.model.add_child(parent, node),
      None => self.model.add_root(node),
    };

    for child in child_elements(el) {
      self.load_node(child, Some(id))?;
    }

    Ok(id)
  }
}

fn parse_kind(el: &Element) -> RalResult<NodeKind> {
  let kind = match el.name.as_str() {
    "addrmap" => {
      let endianness = if flag(el, "bigendian")? {
        Endianness::Big
      } else if flag(el, "littleendian")? {
        Endianness::Little
      } else {
        Endianness::Unspecified
      };
      NodeKind::AddrMap(AddrMapProps {
        endianness,
        bridge: flag(el, "bridge")?,
      })
    }
    "regfile" => NodeKind::RegFile,
    "reg" => {
      let regwidth = opt_width(el, "regwidth")?.unwrap_or(32);
      let accesswidth = opt_width(el, "accesswidth")?.unwrap_or(regwidth);
      NodeKind::Reg(RegProps {
        regwidth,
        accesswidth,
      })
    }
    "mem" => NodeKind::Mem(MemProps {
      mementries: required_number(el, "mementries")?,
      memwidth: opt_width(el, "memwidth")?.ok_or_else(|| {
        RalError::model("<mem> is missing its 'memwidth' attribute")
      })?,
      sw: opt_sw(el)?,
    }),
    "field" => {
      let lsb = bit_index(el, "lsb", required_number(el, "lsb")?)?;
      let width = match (opt_width(el, "width")?, opt_number(el, "msb")?) {
        (Some(width), _) => width,
        (None, Some(msb)) if msb >= lsb as u64 => bit_index(el, "msb", msb)? - lsb + 1,
        (None, Some(msb)) => {
          return Err(RalError::model(&format!(
            "Field msb {} is below its lsb {}",
            msb, lsb
          )))
        }
        (None, None) => 1,
      };
      let mut field = FieldProps::new(lsb, width, opt_sw(el)?);
      field.onread = attr(el, "onread")
        .map(|s| s.parse::<OnReadType>())
        .transpose()?;
      field.onwrite = attr(el, "onwrite")
        .map(|s| s.parse::<OnWriteType>())
        .transpose()?;
      field.reset = opt_number(el, "reset")?;
      field.volatile = flag(el, "volatile")?;
      NodeKind::Field(field)
    }
    "signal" => NodeKind::Signal,
    other => {
      return Err(RalError::model(&format!(
        "Unknown component <{}>",
        other
      )))
    }
  };
  Ok(kind)
}

fn child_elements(el: &Element) -> impl Iterator<Item = &Element> {
  el.children.iter()
}

fn attr<'e>(el: &'e Element, key: &str) -> Option<&'e str> {
  el.attributes.get(key).map(|v| v.as_str())
}

fn required<'e>(el: &'e Element, key: &str) -> RalResult<&'e str> {
  attr(el, key).ok_or_else(|| {
    RalError::model(&format!("<{}> is missing its '{}' attribute", el.name, key))
  })
}

fn opt_number(el: &Element, key: &str) -> RalResult<Option<u64>> {
  attr(el, key).map(parse_number).transpose()
}

fn required_number(el: &Element, key: &str) -> RalResult<u64> {
  parse_number(required(el, key)?)
}

fn bit_index(el: &Element, key: &str, value: u64) -> RalResult<u32> {
  u32::try_from(value).map_err(|_| {
    RalError::model(&format!(
      "<{}> attribute '{}' is out of range: {}",
      el.name, key, value
    ))
  })
}

/// A bit width: positive and no wider than a `u32` can count.
fn opt_width(el: &Element, key: &str) -> RalResult<Option<u32>> {
  match opt_number(el, key)? {
    None => Ok(None),
    Some(0) => Err(RalError::model(&format!(
      "<{}> attribute '{}' must be greater than zero",
      el.name, key
    ))),
    Some(width) => bit_index(el, key, width).map(Some),
  }
}

fn opt_sw(el: &Element) -> RalResult<SwAccess> {
  match attr(el, "sw") {
    Some(sw) => sw.parse(),
    None => Ok(SwAccess::ReadWrite),
  }
}

fn flag(el: &Element, key: &str) -> RalResult<bool> {
  match attr(el, key) {
    None => Ok(false),
    Some("true") | Some("1") => Ok(true),
    Some("false") | Some("0") => Ok(false),
    Some(other) => Err(RalError::model(&format!(
      "Attribute '{}' expects a boolean, got '{}'",
      key, other
    ))),
  }
}
