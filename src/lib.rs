//! Generates UVM register abstraction layer models in SystemVerilog.
//!
//! A [`Model`] is loaded from its XML form with [`load_model`] or imported from a CMSIS-SVD file
//! with [`load_svd`], then written out by a [`UvmExporter`]:
//!
//! ```no_run
//! use std::path::Path;
//! use uvm_ral_exporter::{load_model_file, ExportOptions, UvmExporter};
//!
//! let model = load_model_file(Path::new("soc.xml"))?;
//! if let Some(top) = model.top() {
//!   UvmExporter::new(ExportOptions::default())?.export(&model, top, Path::new("soc_pkg.sv"))?;
//! }
//! # Ok::<(), uvm_ral_exporter::RalError>(())
//! ```

pub mod access;
mod error;
pub mod exporter;
mod loader;
pub mod model;
pub mod namespace;
pub mod naming;
mod options;
pub mod svd;
pub mod template;
mod value;
pub mod walker;

pub use access::UvmAccess;
pub use error::{ErrorKind, RalError, RalResult};
pub use exporter::{RenderOutput, UvmExporter};
pub use loader::{load_model, load_model_file};
pub use model::{Model, Node, NodeId, NodeKind};
pub use options::{ExportOptions, FileType, TypeStyle};
pub use svd::{load_svd, load_svd_file};
pub use value::{parse_number, Endianness, OnReadType, OnWriteType, SwAccess};
