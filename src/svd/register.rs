use super::field::FieldDefaults;
use super::{array_name, RegisterDefaults, SvdImporter, TypeScope, DEFAULT_REGISTER_SIZE};
use crate::error::RalResult;
use crate::model::{FieldProps, Node, NodeId, NodeKind, RegProps, Scope};
use crate::value::{OnWriteType, SwAccess};
use svd_parser::Register;

/// Name of the field given to registers that describe no fields.
pub const IMPLICIT_FIELD_NAME: &str = "value";

impl SvdImporter {
  /// Adds a register. Unspecified size, reset value and access are taken from `defaults`.
  /// A register without fields gets a single field spanning the whole register.
  pub(super) fn import_register(
    &mut self,
    r: &Register,
    parent: NodeId,
    scope: &TypeScope,
    defaults: &RegisterDefaults,
  ) -> RalResult<NodeId> {
    let (ri, dim) = match r {
      Register::Single(ref ri) => (ri, None),
      Register::Array(ref ri, ref d) => (ri, Some(d)),
    };

    let name = array_name(&ri.name);
    let defaults = defaults.inherit(ri.size, ri.reset_value, ri.access.as_ref());
    let regwidth = defaults.size.unwrap_or(DEFAULT_REGISTER_SIZE);
    let reg_scope = self.declare_in(scope, &name);
    let description = self.clean_whitespace(ri.description.as_ref());

    let mut node = Node::new(&name, NodeKind::Reg(RegProps::new(regwidth)))
      .at(ri.address_offset as u64)
      .typed(Some(name.as_str()), Some(reg_scope.def), Some(Scope::Def(scope.def)))
      .described(description);
    if let Some(d) = dim {
      node = node.array(vec![d.dim as u64], d.dim_increment as u64);
    }
    let id = self.model.add_child(parent, node);

    let field_defaults = FieldDefaults {
      regwidth,
      access: defaults.access.unwrap_or(SwAccess::ReadWrite),
      onwrite: ri
        .modified_write_values
        .as_ref()
        .and_then(OnWriteType::from_svd),
      reset_value: defaults.reset_value,
    };

    match ri.fields {
      Some(ref fields) if !fields.is_empty() => {
        let path = self.model.path(id);
        for f in fields.iter() {
          self.import_field(f, id, &path, &field_defaults)?;
        }
      }
      _ => {
        let mut field = FieldProps::new(0, regwidth, field_defaults.access);
        field.onwrite = field_defaults.onwrite;
        field.reset = field_defaults.reset_for(0, regwidth);
        self
          .model
          .add_child(id, Node::new(IMPLICIT_FIELD_NAME, NodeKind::Field(field)));
      }
    }

    Ok(id)
  }
}
