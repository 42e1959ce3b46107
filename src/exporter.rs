//! Renders a register model as UVM register abstraction layer classes.
//!
//! Every register, register file, address map and memory below the export top gets a class.
//! Classes are written children first, so each one is declared before the block that
//! instantiates it. With lexical naming, instances of one declaration share a single class; the
//! [`NamespaceTable`] tracks which bodies were already written.

use crate::access::{field_access, mem_access, reg_map_access};
use crate::error::{RalError, RalResult};
use crate::model::{FieldProps, MemProps, Model, Node, NodeId, NodeKind, RegProps};
use crate::namespace::NamespaceTable;
use crate::naming::NameResolver;
use crate::options::{ExportOptions, FileType};
use crate::template::Templates;
use crate::value::Endianness;
use crate::walker::{bus_bytes, WidthTable};
use log::{debug, info, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

const INDENT: &str = "    ";

/// Text of one export, along with how many classes it defines.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
  pub text: String,

  /// Number of class bodies written.
  pub classes_defined: usize,

  /// Number of instances that reused an already written class.
  pub definitions_reused: usize,
}

/// Writes UVM register models.
#[derive(Debug, Clone)]
pub struct UvmExporter {
  options: ExportOptions,
  templates: Templates,
}
impl UvmExporter {
  /// Loads templates for `options`. Fails before anything is rendered if the template directory
  /// is unusable.
  pub fn new(options: ExportOptions) -> RalResult<Self> {
    let templates = Templates::load(options.user_template_dir.as_deref())?;
    Ok(Self { options, templates })
  }

  /// Renders the model below `top` and writes it to `output_path`, creating missing parent
  /// directories.
  pub fn export(&self, model: &Model, top: NodeId, output_path: &Path) -> RalResult<RenderOutput> {
    let output = self.render(model, top, output_path)?;

    if let Some(dir) = output_path.parent() {
      if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir)?;
      }
    }
    std::fs::write(output_path, &output.text)?;

    info!(
      "Wrote {} ({} classes, {} reused)",
      output_path.display(),
      output.classes_defined,
      output.definitions_reused
    );
    Ok(output)
  }

  /// Renders the model below `top`. `output_path` names the package or include guard; nothing
  /// is written to it.
  pub fn render(&self, model: &Model, top: NodeId, output_path: &Path) -> RalResult<RenderOutput> {
    let top_node = model.node(top);
    match top_node.kind {
      NodeKind::AddrMap(ref props) => {
        if props.bridge {
          warn!(
            "'{}' is a bridge; its address spaces are exported as a single map",
            top_node.name
          );
        }
      }
      ref other => {
        return Err(RalError::model(&format!(
          "Export top '{}' must be an address map, not a {}",
          top_node.name,
          other.label()
        )))
      }
    }

    let names = NameResolver::new(model, top, self.options.type_style())
      .with_uppercase_inst_names(self.options.use_uppercase_inst_name);
    let mut ctx = ExportContext {
      model,
      options: &self.options,
      names,
      widths: WidthTable::build(model, top),
      namespace: NamespaceTable::new(),
      reused: 0,
    };

    let mut text = self
      .templates
      .render_banner(&self.template_vars(model, top, output_path)?)?;
    match self.options.file_type() {
      FileType::Package => {
        let name = package_name(output_path)?;
        writeln!(text, "package {};", name)?;
        writeln!(text, "{}`include \"uvm_macros.svh\"", INDENT)?;
        writeln!(text, "{}import uvm_pkg::*;", INDENT)?;
        writeln!(text)?;
        ctx.write_classes(&mut text, top)?;
        writeln!(text, "endpackage: {}", name)?;
      }
      FileType::Header => {
        let guard = include_guard(output_path)?;
        writeln!(text, "`ifndef {}", guard)?;
        writeln!(text, "`define {}", guard)?;
        writeln!(text)?;
        ctx.write_classes(&mut text, top)?;
        writeln!(text, "`endif")?;
      }
    }

    debug!(
      "Rendered '{}' with {} classes",
      model.path(top),
      ctx.namespace.class_count()
    );
    Ok(RenderOutput {
      text,
      classes_defined: ctx.namespace.class_count(),
      definitions_reused: ctx.reused,
    })
  }

  fn template_vars(
    &self,
    model: &Model,
    top: NodeId,
    output_path: &Path,
  ) -> RalResult<BTreeMap<String, String>> {
    let output_name = output_path
      .file_name()
      .and_then(|n| n.to_str())
      .ok_or_else(|| {
        RalError::config(&format!("Invalid output path {}", output_path.display()))
      })?;

    let mut vars = self.options.user_template_context.clone();
    vars.insert("generator".to_owned(), env!("CARGO_PKG_NAME").to_owned());
    vars.insert("version".to_owned(), env!("CARGO_PKG_VERSION").to_owned());
    vars.insert("top_name".to_owned(), model.node(top).name.clone());
    vars.insert("output_name".to_owned(), output_name.to_owned());
    Ok(vars)
  }
}

/// Package name for an output file: its stem with every non-word character replaced by `_`.
pub fn package_name(path: &Path) -> RalResult<String> {
  let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
    RalError::config(&format!(
      "Cannot derive a package name from {}",
      path.display()
    ))
  })?;
  Ok(Regex::new(r"[^\w]")?.replace_all(stem, "_").into_owned())
}

/// Include guard for an output file: its full file name, upper-cased, with every non-word
/// character replaced by `_`.
pub fn include_guard(path: &Path) -> RalResult<String> {
  let file_name = path.file_name().and_then(|s| s.to_str()).ok_or_else(|| {
    RalError::config(&format!(
      "Cannot derive an include guard from {}",
      path.display()
    ))
  })?;
  Ok(
    Regex::new(r"[^\w]")?
      .replace_all(file_name, "_")
      .to_uppercase(),
  )
}

/// Address offset of a node within its parent, as a SystemVerilog expression. For arrays the
/// expression is in terms of the loop variables `i0`, `i1`, ... of the enclosing `foreach`.
///
/// `'h10 + i0*'hc + i1*'h4` for a `[2][3]` array at `0x10` with a stride of 4.
pub fn array_offset_expr(node: &Node) -> String {
  let mut expr = format!("'h{:x}", node.address_offset);
  if let Some(ref shape) = node.array {
    for i in 0..shape.dimensions.len() {
      let step: u64 = shape.dimensions[i + 1..].iter().product::<u64>() * shape.stride;
      write!(expr, " + i{}*'h{:x}", i, step).ok();
    }
  }
  expr
}

/// State of a single render call.
struct ExportContext<'a> {
  model: &'a Model,
  options: &'a ExportOptions,
  names: NameResolver<'a>,
  widths: WidthTable,
  namespace: NamespaceTable,
  reused: usize,
}
impl<'a> ExportContext<'a> {
  fn write_classes(&mut self, out: &mut String, top: NodeId) -> RalResult<()> {
    let model = self.model;
    for id in model.post_order(top) {
      match model.node(id).kind {
        NodeKind::Reg(ref reg) => {
          if self.claim_class(id)? {
            self.write_reg_class(out, id, reg)?;
          }
        }
        NodeKind::RegFile | NodeKind::AddrMap(_) => {
          if self.claim_class(id)? {
            self.write_block_class(out, id)?;
          }
        }
        NodeKind::Mem(ref mem) => {
          if self.claim_class(id)? {
            self.write_mem_class(out, id, mem)?;
          }
        }
        NodeKind::Field(_) | NodeKind::Signal => {}
      }
    }
    Ok(())
  }

  fn claim_class(&mut self, id: NodeId) -> RalResult<bool> {
    let class_name = self.names.class_name(id);
    let needed = self
      .namespace
      .needs_definition(&class_name, self.model.node(id).original_def)?;
    if needed {
      debug!("Defining {} for {}", class_name, self.model.path(id));
    } else {
      debug!("Reusing {} for {}", class_name, self.model.path(id));
      self.reused += 1;
    }
    Ok(needed)
  }

  fn write_class_header(&self, out: &mut String, id: NodeId, base: &str) -> RalResult<String> {
    let class_name = self.names.class_name(id);
    writeln!(out, "// {}", self.names.friendly_name(id))?;
    if let Some(ref desc) = self.model.node(id).description {
      for line in desc.lines() {
        writeln!(out, "// {}", line.trim())?;
      }
    }
    writeln!(out, "class {} extends {};", class_name, base)?;
    if self.options.use_uvm_factory {
      writeln!(out, "{}`uvm_object_utils({})", INDENT, class_name)?;
    }
    Ok(class_name)
  }

  fn write_reg_class(&self, out: &mut String, id: NodeId, reg: &RegProps) -> RalResult<()> {
    let base = if self.options.use_uvm_reg_enhanced {
      "uvm_reg_enhanced"
    } else {
      "uvm_reg"
    };
    let class_name = self.write_class_header(out, id, base)?;
    let fields: Vec<(NodeId, &FieldProps)> = self.model.fields(id).collect();
    let coverage = self.options.has_coverage && !fields.is_empty();

    for (field, _) in &fields {
      writeln!(out, "{}rand uvm_reg_field {};", INDENT, self.names.inst_name(*field))?;
    }

    if coverage {
      writeln!(out)?;
      writeln!(out, "{}covergroup cg_vals;", INDENT)?;
      writeln!(out, "{0}{0}option.per_instance = 1;", INDENT)?;
      for (field, props) in &fields {
        let inst = self.names.inst_name(*field);
        writeln!(
          out,
          "{0}{0}{1}: coverpoint {1}.value[{2}:0];",
          INDENT,
          inst,
          props.width.saturating_sub(1)
        )?;
      }
      writeln!(out, "{}endgroup", INDENT)?;
    }

    writeln!(out)?;
    writeln!(out, "{}function new(string name = \"{}\");", INDENT, class_name)?;
    if coverage {
      writeln!(
        out,
        "{0}{0}super.new(name, {1}, build_coverage(UVM_CVR_FIELD_VALS));",
        INDENT, reg.regwidth
      )?;
      writeln!(out, "{0}{0}if (has_coverage(UVM_CVR_FIELD_VALS))", INDENT)?;
      writeln!(out, "{0}{0}{0}cg_vals = new();", INDENT)?;
    } else {
      writeln!(
        out,
        "{0}{0}super.new(name, {1}, UVM_NO_COVERAGE);",
        INDENT, reg.regwidth
      )?;
    }
    writeln!(out, "{}endfunction : new", INDENT)?;

    if coverage {
      writeln!(out)?;
      writeln!(out, "{}virtual function void sample_values();", INDENT)?;
      writeln!(out, "{0}{0}super.sample_values();", INDENT)?;
      writeln!(out, "{0}{0}if (get_coverage(UVM_CVR_FIELD_VALS))", INDENT)?;
      writeln!(out, "{0}{0}{0}cg_vals.sample();", INDENT)?;
      writeln!(out, "{}endfunction : sample_values", INDENT)?;
    }

    writeln!(out)?;
    writeln!(out, "{}virtual function void build();", INDENT)?;
    let only_field = fields.len() == 1;
    for (field, props) in &fields {
      let inst = self.names.inst_name(*field);
      let creation = if self.options.use_uvm_factory {
        format!("uvm_reg_field::type_id::create(\"{}\")", inst)
      } else {
        format!("new(\"{}\")", inst)
      };
      writeln!(out, "{0}{0}this.{1} = {2};", INDENT, inst, creation)?;
      writeln!(
        out,
        "{0}{0}this.{1}.configure(this, {2}, {3}, \"{4}\", {5}, {6}, {7}, {8}, {9});",
        INDENT,
        inst,
        props.width,
        props.lsb,
        field_access(props.sw, props.onread, props.onwrite),
        flag(props.volatile),
        props
          .reset
          .map(|r| format!("'h{:x}", r))
          .unwrap_or_else(|| "0".to_owned()),
        flag(props.reset.is_some()),
        flag(props.sw.can_write()),
        flag(only_field)
      )?;
    }
    writeln!(out, "{}endfunction : build", INDENT)?;
    writeln!(out, "endclass : {}", class_name)?;
    writeln!(out)?;
    Ok(())
  }

  fn write_block_class(&self, out: &mut String, id: NodeId) -> RalResult<()> {
    let model = self.model;
    let class_name = self.write_class_header(out, id, "uvm_reg_block")?;
    let children: Vec<NodeId> = model
      .children(id)
      .iter()
      .copied()
      .filter(|c| match model.node(*c).kind {
        NodeKind::Field(_) | NodeKind::Signal => false,
        _ => true,
      })
      .collect();

    for child in &children {
      let dims = match model.node(*child).array {
        Some(ref shape) => shape
          .dimensions
          .iter()
          .map(|d| format!("[{}]", d))
          .collect::<String>(),
        None => String::new(),
      };
      writeln!(
        out,
        "{}rand {} {}{};",
        INDENT,
        self.names.class_name(*child),
        self.names.inst_name(*child),
        dims
      )?;
    }

    writeln!(out)?;
    self.write_block_new(out, &class_name)?;
    writeln!(out)?;
    writeln!(out, "{}virtual function void build();", INDENT)?;
    writeln!(
      out,
      "{0}{0}this.default_map = create_map(\"reg_map\", 0, {1}, {2});",
      INDENT,
      self.widths.bus_width_bytes(&model.path(id)),
      self.endianness(id).uvm_name()
    )?;
    for child in &children {
      self.write_child_build(out, *child)?;
    }
    writeln!(out, "{}endfunction : build", INDENT)?;
    writeln!(out, "endclass : {}", class_name)?;
    writeln!(out)?;
    Ok(())
  }

  fn write_mem_class(&self, out: &mut String, id: NodeId, mem: &MemProps) -> RalResult<()> {
    let class_name = self.write_class_header(out, id, "uvm_reg_block")?;
    writeln!(out, "{}rand uvm_mem m_mem;", INDENT)?;
    writeln!(out)?;
    self.write_block_new(out, &class_name)?;
    writeln!(out)?;
    writeln!(out, "{}virtual function void build();", INDENT)?;
    writeln!(
      out,
      "{0}{0}this.default_map = create_map(\"reg_map\", 0, {1}, {2});",
      INDENT,
      bus_bytes(&self.model.path(id), mem.memwidth),
      self.endianness(id).uvm_name()
    )?;
    writeln!(
      out,
      "{0}{0}this.m_mem = new(\"m_mem\", {1}, {2}, \"{3}\");",
      INDENT,
      mem.mementries,
      mem.memwidth,
      mem_access(mem.sw)
    )?;
    writeln!(out, "{0}{0}this.m_mem.configure(this);", INDENT)?;
    writeln!(out, "{0}{0}this.default_map.add_mem(this.m_mem, 0);", INDENT)?;
    writeln!(out, "{}endfunction : build", INDENT)?;
    writeln!(out, "endclass : {}", class_name)?;
    writeln!(out)?;
    Ok(())
  }

  fn write_block_new(&self, out: &mut String, class_name: &str) -> RalResult<()> {
    writeln!(out, "{}function new(string name = \"{}\");", INDENT, class_name)?;
    if self.options.has_coverage {
      writeln!(
        out,
        "{0}{0}super.new(name, build_coverage(UVM_CVR_ADDR_MAP));",
        INDENT
      )?;
    } else {
      writeln!(out, "{0}{0}super.new(name, UVM_NO_COVERAGE);", INDENT)?;
    }
    writeln!(out, "{}endfunction : new", INDENT)?;
    Ok(())
  }

  /// Creates, configures and maps one child instance (every element of it, for arrays).
  fn write_child_build(&self, out: &mut String, child: NodeId) -> RalResult<()> {
    let node = self.model.node(child);
    let inst = self.names.inst_name(child);
    let class_name = self.names.class_name(child);

    let (indent, target, name_expr) = match node.array {
      Some(ref shape) => {
        let vars: Vec<String> = (0..shape.dimensions.len())
          .map(|i| format!("i{}", i))
          .collect();
        writeln!(
          out,
          "{0}{0}foreach(this.{1}[{2}]) begin",
          INDENT,
          inst,
          vars.join(", ")
        )?;
        let subscripts: String = vars.iter().map(|v| format!("[{}]", v)).collect();
        let format: String = vars.iter().map(|_| "[%0d]").collect();
        (
          INDENT.repeat(3),
          format!("this.{}{}", inst, subscripts),
          format!("$sformatf(\"{}{}\", {})", inst, format, vars.join(", ")),
        )
      }
      None => (
        INDENT.repeat(2),
        format!("this.{}", inst),
        format!("\"{}\"", inst),
      ),
    };

    let creation = if self.options.use_uvm_factory {
      format!("{}::type_id::create({})", class_name, name_expr)
    } else {
      format!("new({})", name_expr)
    };
    writeln!(out, "{}{} = {};", indent, target, creation)?;
    writeln!(out, "{}{}.configure(this);", indent, target)?;
    writeln!(out, "{}{}.build();", indent, target)?;

    let offset = array_offset_expr(node);
    match node.kind {
      NodeKind::Reg(_) => writeln!(
        out,
        "{}this.default_map.add_reg({}, {}, \"{}\");",
        indent,
        target,
        offset,
        reg_map_access(self.model, child)
      )?,
      _ => writeln!(
        out,
        "{}this.default_map.add_submap({}.default_map, {});",
        indent, target, offset
      )?,
    }

    if node.is_array() {
      writeln!(out, "{0}{0}end", INDENT)?;
    }
    Ok(())
  }

  fn endianness(&self, id: NodeId) -> Endianness {
    self
      .model
      .owning_addrmap(id)
      .and_then(|map| match self.model.node(map).kind {
        NodeKind::AddrMap(ref props) => Some(props.endianness),
        _ => None,
      })
      .unwrap_or_default()
  }
}

fn flag(value: bool) -> u8 {
  if value {
    1
  } else {
    0
  }
}
