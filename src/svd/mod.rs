//! Imports CMSIS-SVD device descriptions as register models.
//!
//! The device becomes the top-level address map with one address map per peripheral. Clusters
//! become register files. Every peripheral type is declared at root scope and every cluster and
//! register type inside the type that contains it, so instances of a `derivedFrom` peripheral
//! share their base peripheral's classes. A derived peripheral that overrides the default register
//! properties is declared as a type of its own.

mod cluster;
mod device;
mod field;
mod peripheral;
mod register;

pub use device::import_device;

use crate::error::{RalError, RalResult};
use crate::model::{DefId, Model, NodeId};
use crate::value::{Endianness, SwAccess};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use svd_parser::Access;

/// Register width used when neither the register nor any enclosing element specifies a size.
pub const DEFAULT_REGISTER_SIZE: u32 = 32;

/// Parses an SVD document and imports its device. Returns the model and its top-level map.
pub fn load_svd(xml: &str) -> RalResult<(Model, NodeId)> {
  import_device(&svd_parser::parse(xml)?)
}

pub fn load_svd_file(path: &Path) -> RalResult<(Model, NodeId)> {
  let xml = std::fs::read_to_string(path)?;
  load_svd(&xml).map_err(|e| RalError::new(e.kind, &format!("{}: {}", path.display(), e.details)))
}

struct SvdImporter {
  model: Model,
  defs: HashMap<String, DefId>,
  endianness: Endianness,
  whitespace: Regex,
}
impl SvdImporter {
  fn new(endianness: Endianness) -> RalResult<Self> {
    Ok(Self {
      model: Model::new(),
      defs: HashMap::new(),
      endianness,
      whitespace: Regex::new(r"\s+")?,
    })
  }

  /// The declaration with the given key, created on first use.
  fn declare(&mut self, key: &str) -> DefId {
    if let Some(def) = self.defs.get(key) {
      return *def;
    }
    let def = self.model.declare(key);
    self.defs.insert(key.to_owned(), def);
    def
  }

  /// Declares the type `name` inside `scope`.
  fn declare_in(&mut self, scope: &TypeScope, name: &str) -> TypeScope {
    let key = format!("{}::{}", scope.key, name);
    TypeScope {
      def: self.declare(&key),
      key,
    }
  }

  fn clean_whitespace(&self, text: Option<&String>) -> Option<String> {
    text.map(|t| self.whitespace.replace_all(t.trim(), " ").into_owned())
  }
}

/// A declared type other types can be declared inside of.
struct TypeScope {
  def: DefId,
  key: String,
}

/// Register properties inherited from enclosing elements.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct RegisterDefaults {
  size: Option<u32>,
  reset_value: Option<u32>,
  access: Option<SwAccess>,
}
impl RegisterDefaults {
  /// These defaults, overridden by whatever an inner element specifies.
  fn inherit(&self, size: Option<u32>, reset_value: Option<u32>, access: Option<&Access>) -> Self {
    Self {
      size: size.or(self.size),
      reset_value: reset_value.or(self.reset_value),
      access: access.map(SwAccess::from_svd).or(self.access),
    }
  }
}

/// Element name with its `%s` array placeholder removed.
fn array_name(name: &str) -> String {
  name.replace("[%s]", "").replace("%s", "")
}
