use super::SvdImporter;
use crate::error::{RalError, RalResult};
use crate::model::{FieldProps, Node, NodeId, NodeKind};
use crate::value::{OnWriteType, SwAccess};
use svd_parser::{Field, FieldInfo};

/// What a field takes from its register when it does not say otherwise.
pub(super) struct FieldDefaults {
  pub regwidth: u32,
  pub access: SwAccess,
  pub onwrite: Option<OnWriteType>,
  pub reset_value: Option<u32>,
}
impl FieldDefaults {
  /// The bits of the register reset value that belong to a field.
  pub fn reset_for(&self, lsb: u32, width: u32) -> Option<u64> {
    let mask = if width >= 64 {
      u64::MAX
    } else {
      (1u64 << width) - 1
    };
    self
      .reset_value
      .map(|reset| (reset as u64).checked_shr(lsb).unwrap_or(0) & mask)
  }
}

impl SvdImporter {
  /// Adds a field to the register at `reg`. Field arrays are expanded into one field per element,
  /// named after the element's `dimIndex`.
  pub(super) fn import_field(
    &mut self,
    f: &Field,
    reg: NodeId,
    reg_path: &str,
    defaults: &FieldDefaults,
  ) -> RalResult<Vec<NodeId>> {
    let ids = match f {
      Field::Single(ref fi) => {
        vec![self.add_field(fi, &fi.name, fi.bit_range.offset, reg, reg_path, defaults)?]
      }
      Field::Array(ref fi, ref d) => {
        let dim_indices = if let Some(ref di) = d.dim_index {
          if d.dim != di.len() as u32 {
            return Err(RalError::model(&format!(
              "Field {}.{}: 'dim' element must have the same value as the length of 'dimIndex'",
              reg_path, &fi.name
            )));
          }
          di.to_owned()
        } else {
          (0..d.dim).map(|v| v.to_string()).collect()
        };

        let mut ids = Vec::with_capacity(d.dim as usize);
        for (n, dim_index) in dim_indices.iter().enumerate() {
          let name = fi.name.replace("[%s]", dim_index).replace("%s", dim_index);
          let lsb = fi.bit_range.offset + n as u32 * d.dim_increment;
          ids.push(self.add_field(fi, &name, lsb, reg, reg_path, defaults)?);
        }
        ids
      }
    };

    Ok(ids)
  }

  fn add_field(
    &mut self,
    fi: &FieldInfo,
    name: &str,
    lsb: u32,
    reg: NodeId,
    reg_path: &str,
    defaults: &FieldDefaults,
  ) -> RalResult<NodeId> {
    let width = fi.bit_range.width;
    if width == 0 || lsb + width > defaults.regwidth {
      return Err(RalError::model(&format!(
        "Field {}.{} (bits {}..{}) does not fit in a {} bit register",
        reg_path,
        name,
        lsb,
        lsb + width,
        defaults.regwidth
      )));
    }

    let access = match fi.access {
      Some(ref a) => SwAccess::from_svd(a),
      None => defaults.access,
    };
    let mut field = FieldProps::new(lsb, width, access);
    field.onwrite = match fi.modified_write_values {
      Some(ref mwv) => OnWriteType::from_svd(mwv),
      None => defaults.onwrite,
    };
    field.reset = defaults.reset_for(lsb, width);

    let description = self.clean_whitespace(fi.description.as_ref());
    Ok(
      self
        .model
        .add_child(reg, Node::new(name, NodeKind::Field(field)).described(description)),
    )
  }
}
