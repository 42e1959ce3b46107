use crate::error::{ErrorKind, RalError, RalResult};
use crate::model::DefId;
use std::collections::HashMap;

/// Class names already emitted during one export, mapped to the declaration each stands for.
///
/// Must be consulted in the same order the class bodies are written out: the first query for a
/// name claims it and the caller emits the body there.
#[derive(Debug, Default)]
pub struct NamespaceTable {
  classes: HashMap<String, Option<DefId>>,
}
impl NamespaceTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns `true` if no class named `class_name` has been emitted yet, registering it for
  /// `def`. Returns `false` if the name was already emitted for the same declaration. A name
  /// already taken by a different (or unknown) declaration is a `NamespaceCollision` error.
  pub fn needs_definition(&mut self, class_name: &str, def: Option<DefId>) -> RalResult<bool> {
    match self.classes.get(class_name) {
      Some(existing) => {
        if existing.is_none() || *existing != def {
          return Err(RalError::new(
            ErrorKind::NamespaceCollision,
            &format!(
              "Namespace collision on class '{}': type-name generation is not robust enough \
               to create unique names",
              class_name
            ),
          ));
        }
        Ok(false)
      }
      None => {
        self.classes.insert(class_name.to_owned(), def);
        Ok(true)
      }
    }
  }

  /// Number of distinct classes registered so far.
  pub fn class_count(&self) -> usize {
    self.classes.len()
  }
}
