use super::{array_name, RegisterDefaults, SvdImporter, TypeScope};
use crate::error::RalResult;
use crate::model::{Node, NodeId, NodeKind, Scope};
use log::debug;
use svd_parser::Cluster;

impl SvdImporter {
  /// Adds a cluster as a register file. A cluster array becomes a register file array.
  pub(super) fn import_cluster(
    &mut self,
    c: &Cluster,
    parent: NodeId,
    scope: &TypeScope,
    defaults: &RegisterDefaults,
  ) -> RalResult<NodeId> {
    let (ci, dim) = match c {
      Cluster::Single(ref ci) => (ci, None),
      Cluster::Array(ref ci, ref d) => (ci, Some(d)),
    };

    let name = array_name(&ci.name);
    let cluster_scope = self.declare_in(scope, &name);
    let description = self.clean_whitespace(ci.description.as_ref());

    let mut node = Node::new(&name, NodeKind::RegFile)
      .at(ci.address_offset as u64)
      .typed(Some(name.as_str()), Some(cluster_scope.def), Some(Scope::Def(scope.def)))
      .described(description);
    if let Some(d) = dim {
      debug!("Cluster {} is an array of {}", cluster_scope.key, d.dim);
      node = node.array(vec![d.dim as u64], d.dim_increment as u64);
    }
    let id = self.model.add_child(parent, node);

    let defaults = defaults.inherit(
      ci.default_register_properties.size,
      ci.default_register_properties.reset_value,
      ci.default_register_properties.access.as_ref(),
    );
    self.import_register_clusters(&ci.children, id, &cluster_scope, &defaults)?;

    Ok(id)
  }
}
