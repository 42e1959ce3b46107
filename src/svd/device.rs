use super::{RegisterDefaults, SvdImporter, TypeScope};
use crate::error::RalResult;
use crate::model::{AddrMapProps, Model, Node, NodeId, NodeKind, Scope};
use crate::value::Endianness;
use log::info;
use svd_parser::Device;

/// Imports a parsed SVD device. Returns the model and the device's address map.
pub fn import_device(d: &Device) -> RalResult<(Model, NodeId)> {
  let endianness = match d.cpu {
    Some(ref cpu) => Endianness::from_svd(&cpu.endian),
    None => Endianness::Unspecified,
  };
  let mut importer = SvdImporter::new(endianness)?;

  let scope = TypeScope {
    def: importer.declare(&d.name),
    key: d.name.clone(),
  };
  let description = importer.clean_whitespace(d.description.as_ref());
  let top = importer.model.add_root(
    Node::new(
      &d.name,
      NodeKind::AddrMap(AddrMapProps {
        endianness,
        bridge: false,
      }),
    )
    .typed(Some(d.name.as_str()), Some(scope.def), Some(Scope::Root))
    .described(description),
  );

  let defaults = RegisterDefaults::default().inherit(
    d.default_register_properties.size,
    d.default_register_properties.reset_value,
    d.default_register_properties.access.as_ref(),
  );

  for peripheral in d.peripherals.iter() {
    importer.import_peripheral(d, peripheral, top, &defaults)?;
  }

  info!(
    "Imported device '{}' with {} peripherals",
    d.name,
    d.peripherals.len()
  );
  Ok((importer.model, top))
}

#[cfg(test)]
mod tests {
  use super::import_device;
  use crate::model::{NodeKind, Scope};
  use crate::value::{Endianness, SwAccess};
  use svd_parser::{parse::Parse, Device};
  use xmltree::Element;

  #[test]
  fn can_create_from_xml() {
    let el: Element = Element::parse(
      r##"
      <device>
        <name>FOO</name>
        <version>1.2</version>
        <description>Quux
          device</description>
        <addressUnitBits>8</addressUnitBits>
        <width>32</width>

        <size>16</size>
        <resetValue>0xff</resetValue>
        <access>read-only</access>

        <cpu>
          <name>BAR</name>
          <revision>1.3</revision>
          <endian>big</endian>
          <mpuPresent>true</mpuPresent>
          <fpuPresent>true</fpuPresent>
          <nvicPrioBits>4</nvicPrioBits>
          <vendorSystickConfig>false</vendorSystickConfig>
        </cpu>

        <peripherals>
          <peripheral>
            <name>P1</name>
            <baseAddress>0x3000</baseAddress>
            <registers>
              <register>
                <name>R1</name>
                <addressOffset>0x4</addressOffset>
              </register>
            </registers>
          </peripheral>
          <peripheral>
            <name>P2</name>
            <baseAddress>0x4000</baseAddress>
          </peripheral>
        </peripherals>
      </device>
      "##
        .as_bytes(),
    )
    .unwrap();

    let di = Device::parse(&el).unwrap();
    let (model, top) = import_device(&di).unwrap();

    let device = model.node(top);
    assert_eq!("FOO", device.name);
    assert_eq!(Some("Quux device".to_owned()), device.description);
    assert_eq!(Some(Scope::Root), device.parent_scope);
    match device.kind {
      NodeKind::AddrMap(ref props) => assert_eq!(Endianness::Big, props.endianness),
      ref other => panic!("unexpected kind {:?}", other),
    }

    let peripherals = model.children(top);
    assert_eq!(2, peripherals.len());
    assert_eq!(0x3000, model.node(peripherals[0]).address_offset);
    assert_eq!(0x4000, model.node(peripherals[1]).address_offset);

    // Device defaults reach registers and their implicit fields.
    let r1 = model.children(peripherals[0])[0];
    match model.node(r1).kind {
      NodeKind::Reg(ref reg) => assert_eq!(16, reg.regwidth),
      ref other => panic!("unexpected kind {:?}", other),
    }
    let fields: Vec<_> = model.fields(r1).map(|(_, f)| f.clone()).collect();
    assert_eq!(1, fields.len());
    assert_eq!(16, fields[0].width);
    assert_eq!(SwAccess::Read, fields[0].sw);
    assert_eq!(Some(0xff), fields[0].reset);
  }

  #[test]
  fn endianness_defaults_to_unspecified() {
    let (model, top) = crate::svd::load_svd(
      r##"
      <device>
        <name>FOO</name>
        <peripherals>
          <peripheral>
            <name>P1</name>
            <baseAddress>0</baseAddress>
          </peripheral>
        </peripherals>
      </device>
      "##,
    )
    .unwrap();

    match model.node(top).kind {
      NodeKind::AddrMap(ref props) => assert_eq!(Endianness::Unspecified, props.endianness),
      ref other => panic!("unexpected kind {:?}", other),
    }
  }
}
