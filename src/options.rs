use crate::error::{RalError, RalResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// How generated class types are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TypeStyle {
  /// Named after the lexical scope of the original type declarations. Equivalent instances share
  /// one class definition.
  Lexical,
  /// Named after each instance's hierarchical path. Nothing is shared.
  #[value(name = "hier")]
  Hierarchical,
}

/// Container the generated register model is wrapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FileType {
  /// A SystemVerilog package named after the output file.
  Package,
  /// An includable file behind an include guard derived from the output file name.
  Header,
}

/// Options controlling a single export.
///
/// Options can be given in TOML:
///
/// ```toml
/// export_as_package = false
/// use_uvm_factory = true
///
/// [user_template_context]
/// project = "soc"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportOptions {
  /// Wrap the model in a package (default) rather than an include guard.
  pub export_as_package: bool,

  /// Reuse class definitions between instances of one type (default). Selects lexical naming.
  pub reuse_class_definitions: bool,

  /// Create classes through the UVM factory instead of calling `new()` directly.
  pub use_uvm_factory: bool,

  /// Upper-case every generated instance name.
  pub use_uppercase_inst_name: bool,

  /// Emit coverage sampling scaffolding.
  pub has_coverage: bool,

  /// Derive registers from `uvm_reg_enhanced` instead of `uvm_reg`.
  pub use_uvm_reg_enhanced: bool,

  /// Directory searched first for template overrides.
  pub user_template_dir: Option<PathBuf>,

  /// Extra variables made available to templates.
  pub user_template_context: BTreeMap<String, String>,
}
impl Default for ExportOptions {
  fn default() -> Self {
    Self {
      export_as_package: true,
      reuse_class_definitions: true,
      use_uvm_factory: false,
      use_uppercase_inst_name: false,
      has_coverage: false,
      use_uvm_reg_enhanced: false,
      user_template_dir: None,
      user_template_context: BTreeMap::new(),
    }
  }
}
impl ExportOptions {
  pub fn from_toml(toml: &str) -> RalResult<Self> {
    Ok(toml::from_str(toml)?)
  }

  pub fn from_file(path: &Path) -> RalResult<Self> {
    let contents = std::fs::read_to_string(path)?;
    Self::from_toml(&contents).map_err(|e| {
      RalError::config(&format!("Invalid options file {}: {}", path.display(), e.details))
    })
  }

  /// Sets an option by name. Unknown names and malformed values are rejected.
  pub fn set(&mut self, name: &str, value: &str) -> RalResult<()> {
    match name {
      "export_as_package" => self.export_as_package = parse_flag(name, value)?,
      "reuse_class_definitions" => self.reuse_class_definitions = parse_flag(name, value)?,
      "use_uvm_factory" => self.use_uvm_factory = parse_flag(name, value)?,
      "use_uppercase_inst_name" => self.use_uppercase_inst_name = parse_flag(name, value)?,
      "has_coverage" => self.has_coverage = parse_flag(name, value)?,
      "use_uvm_reg_enhanced" => self.use_uvm_reg_enhanced = parse_flag(name, value)?,
      "user_template_dir" => self.user_template_dir = Some(PathBuf::from(value)),
      other => {
        return Err(RalError::config(&format!(
          "Unrecognized export option '{}'",
          other
        )))
      }
    }
    Ok(())
  }

  pub fn type_style(&self) -> TypeStyle {
    if self.reuse_class_definitions {
      TypeStyle::Lexical
    } else {
      TypeStyle::Hierarchical
    }
  }

  pub fn set_type_style(&mut self, style: TypeStyle) {
    self.reuse_class_definitions = style == TypeStyle::Lexical;
  }

  pub fn file_type(&self) -> FileType {
    if self.export_as_package {
      FileType::Package
    } else {
      FileType::Header
    }
  }

  pub fn set_file_type(&mut self, file_type: FileType) {
    self.export_as_package = file_type == FileType::Package;
  }
}

fn parse_flag(name: &str, value: &str) -> RalResult<bool> {
  match value.trim().to_lowercase().as_str() {
    "true" | "1" | "yes" | "on" => Ok(true),
    "false" | "0" | "no" | "off" => Ok(false),
    _ => Err(RalError::config(&format!(
      "Option '{}' expects a boolean, got '{}'",
      name, value
    ))),
  }
}
