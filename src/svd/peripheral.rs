use super::{RegisterDefaults, SvdImporter, TypeScope};
use crate::error::{RalError, RalResult};
use crate::model::{AddrMapProps, Node, NodeId, NodeKind, Scope};
use svd_parser::{Device, Peripheral, RegisterCluster};

impl SvdImporter {
  /// Adds a peripheral's address map under the device map at `parent`.
  ///
  /// A peripheral that is `derivedFrom` another and declares no registers of its own is another
  /// instance of its base peripheral's type, unless it changes the default register properties.
  pub(super) fn import_peripheral(
    &mut self,
    d: &Device,
    p: &Peripheral,
    parent: NodeId,
    defaults: &RegisterDefaults,
  ) -> RalResult<NodeId> {
    let source = match (&p.derived_from, &p.registers) {
      (Some(base), None) => d
        .peripherals
        .iter()
        .find(|other| &other.name == base)
        .ok_or_else(|| {
          RalError::model(&format!(
            "Peripheral {} is derived from unknown peripheral '{}'",
            p.name, base
          ))
        })?,
      _ => p,
    };
    if source.registers.is_none() && source.derived_from.is_some() {
      return Err(RalError::model(&format!(
        "Peripheral {}: base peripheral '{}' is itself derived",
        p.name, source.name
      )));
    }

    let source_defaults = defaults.inherit(
      source.default_register_properties.size,
      source.default_register_properties.reset_value,
      source.default_register_properties.access.as_ref(),
    );
    let defaults = source_defaults.inherit(
      p.default_register_properties.size,
      p.default_register_properties.reset_value,
      p.default_register_properties.access.as_ref(),
    );

    // Register properties of its own make a derived peripheral a type of its own.
    let type_name = if defaults == source_defaults {
      &source.name
    } else {
      &p.name
    };
    let scope = TypeScope {
      def: self.declare(type_name),
      key: type_name.clone(),
    };
    let description = self.clean_whitespace(p.description.as_ref().or(source.description.as_ref()));
    let id = self.model.add_child(
      parent,
      Node::new(
        &p.name,
        NodeKind::AddrMap(AddrMapProps {
          endianness: self.endianness,
          bridge: false,
        }),
      )
      .at(p.base_address as u64)
      .typed(Some(type_name.as_str()), Some(scope.def), Some(Scope::Root))
      .described(description),
    );

    if let Some(ref register_clusters) = source.registers {
      self.import_register_clusters(register_clusters, id, &scope, &defaults)?;
    }

    Ok(id)
  }

  pub(super) fn import_register_clusters(
    &mut self,
    register_clusters: &[RegisterCluster],
    parent: NodeId,
    scope: &TypeScope,
    defaults: &RegisterDefaults,
  ) -> RalResult<()> {
    for rc in register_clusters.iter() {
      match rc {
        RegisterCluster::Register(ref r) => {
          self.import_register(r, parent, scope, defaults)?;
        }
        RegisterCluster::Cluster(ref c) => {
          self.import_cluster(c, parent, scope, defaults)?;
        }
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use crate::error::ErrorKind;
  use crate::exporter::UvmExporter;
  use crate::model::NodeKind;
  use crate::naming::NameResolver;
  use crate::options::{ExportOptions, TypeStyle};
  use crate::svd::load_svd;
  use std::path::Path;

  const DEVICE: &str = r##"
    <device>
      <name>SOC</name>
      <peripherals>
        <peripheral>
          <name>UART0</name>
          <description>Serial
            port</description>
          <baseAddress>0x40000000</baseAddress>
          <size>16</size>
          <registers>
            <register>
              <name>DATA</name>
              <addressOffset>0x0</addressOffset>
            </register>
            <register>
              <name>CTRL</name>
              <addressOffset>0x4</addressOffset>
              <size>32</size>
            </register>
          </registers>
        </peripheral>
        <peripheral derivedFrom="UART0">
          <name>UART1</name>
          <baseAddress>0x40001000</baseAddress>
        </peripheral>
        <peripheral derivedFrom="UART0">
          <name>UART2</name>
          <baseAddress>0x40002000</baseAddress>
          <registers>
            <register>
              <name>DATA</name>
              <addressOffset>0x0</addressOffset>
            </register>
          </registers>
        </peripheral>
      </peripherals>
    </device>
  "##;

  #[test]
  fn imports_peripherals() {
    let (model, top) = load_svd(DEVICE).unwrap();
    let peripherals = model.children(top);
    assert_eq!(3, peripherals.len());

    let uart0 = model.node(peripherals[0]);
    assert_eq!("UART0", uart0.name);
    assert_eq!(0x40000000, uart0.address_offset);
    assert_eq!(Some("Serial port".to_owned()), uart0.description);
    assert_eq!(2, uart0.children().len());
  }

  #[test]
  fn derived_peripherals_share_their_base_type() {
    let (model, top) = load_svd(DEVICE).unwrap();
    let peripherals = model.children(top);
    let uart0 = model.node(peripherals[0]);
    let uart1 = model.node(peripherals[1]);
    let uart2 = model.node(peripherals[2]);

    assert_eq!(uart0.original_def, uart1.original_def);
    assert_eq!(Some("UART0".to_owned()), uart1.type_name);
    assert_eq!(2, uart1.children().len());
    assert_eq!(0x40001000, uart1.address_offset);

    // Redefines its registers, so it is a type of its own.
    assert_ne!(uart0.original_def, uart2.original_def);
    assert_eq!(1, uart2.children().len());

    let names = NameResolver::new(&model, top, TypeStyle::Lexical);
    assert_eq!("UART0", names.class_name(peripherals[1]));
    assert_eq!(
      names.class_name(uart0.children()[1]),
      names.class_name(uart1.children()[1])
    );
    assert_eq!("UART0__CTRL", names.class_name(uart1.children()[1]));
    assert_eq!("UART2__DATA", names.class_name(uart2.children()[0]));
  }

  #[test]
  fn derived_peripheral_with_own_register_size_gets_own_type() {
    let (model, top) = load_svd(
      r##"
      <device>
        <name>SOC</name>
        <peripherals>
          <peripheral>
            <name>UART0</name>
            <baseAddress>0x0</baseAddress>
            <registers>
              <register>
                <name>CTRL</name>
                <addressOffset>0x0</addressOffset>
              </register>
            </registers>
          </peripheral>
          <peripheral derivedFrom="UART0">
            <name>UART1</name>
            <baseAddress>0x1000</baseAddress>
            <size>16</size>
          </peripheral>
        </peripherals>
      </device>
      "##,
    )
    .unwrap();

    let peripherals = model.children(top);
    let uart0 = model.node(peripherals[0]);
    let uart1 = model.node(peripherals[1]);
    assert_ne!(uart0.original_def, uart1.original_def);
    assert_eq!(Some("UART1".to_owned()), uart1.type_name);
    match model.node(uart1.children()[0]).kind {
      NodeKind::Reg(ref reg) => assert_eq!(16, reg.regwidth),
      ref other => panic!("unexpected kind {:?}", other),
    }

    let names = NameResolver::new(&model, top, TypeStyle::Lexical);
    assert_eq!("UART1__CTRL", names.class_name(uart1.children()[0]));

    let exporter = UvmExporter::new(ExportOptions::default()).unwrap();
    let text = exporter
      .render(&model, top, Path::new("soc_pkg.sv"))
      .unwrap()
      .text;
    assert!(text.contains("class UART0__CTRL extends uvm_reg;"));
    assert!(text.contains("class UART1__CTRL extends uvm_reg;"));
    assert!(text.contains("super.new(name, 32, UVM_NO_COVERAGE);"));
    assert!(text.contains("super.new(name, 16, UVM_NO_COVERAGE);"));
  }

  #[test]
  fn unknown_base_peripheral_is_rejected() {
    let err = load_svd(
      r##"
      <device>
        <name>SOC</name>
        <peripherals>
          <peripheral derivedFrom="NOPE">
            <name>UART1</name>
            <baseAddress>0</baseAddress>
          </peripheral>
        </peripherals>
      </device>
      "##,
    )
    .unwrap_err();

    assert_eq!(ErrorKind::Model, err.kind);
    assert!(err.details.contains("NOPE"));
  }
}
