use crate::error::{RalError, RalResult};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the banner override in a user template directory.
pub const BANNER_TEMPLATE: &str = "banner.sv";

const DEFAULT_BANNER: &str = "\
// This file was autogenerated by {{ generator }} {{ version }}
// Register model of '{{ top_name }}', written to {{ output_name }}
";

/// Text templates used around the generated classes.
#[derive(Debug, Clone)]
pub struct Templates {
  banner: String,
  placeholder: Regex,
}
impl Templates {
  /// The built-in templates, overridden by any matching file found in `user_dir`.
  pub fn load(user_dir: Option<&Path>) -> RalResult<Self> {
    let mut banner = DEFAULT_BANNER.to_owned();

    if let Some(dir) = user_dir {
      if !dir.is_dir() {
        return Err(RalError::config(&format!(
          "Template directory {} does not exist",
          dir.display()
        )));
      }
      let candidate = dir.join(BANNER_TEMPLATE);
      if candidate.is_file() {
        log::debug!("Using banner template {}", candidate.display());
        banner = std::fs::read_to_string(&candidate)?;
      }
    }

    Ok(Self {
      banner,
      placeholder: Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")?,
    })
  }

  pub fn render_banner(&self, vars: &BTreeMap<String, String>) -> RalResult<String> {
    self.substitute(&self.banner, vars)
  }

  /// Replaces every `{{ name }}` in `template`. Undefined names are an error.
  pub fn substitute(&self, template: &str, vars: &BTreeMap<String, String>) -> RalResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in self.placeholder.captures_iter(template) {
      let whole = match caps.get(0) {
        Some(m) => m,
        None => continue,
      };
      let name = &caps[1];
      let value = vars.get(name).ok_or_else(|| {
        RalError::config(&format!("Template variable '{}' is undefined", name))
      })?;
      out.push_str(&template[last..whole.start()]);
      out.push_str(value);
      last = whole.end();
    }
    out.push_str(&template[last..]);

    Ok(out)
  }
}
