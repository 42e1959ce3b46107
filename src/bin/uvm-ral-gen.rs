//! Export a register model as a UVM register abstraction layer package.
//!
//! Usage: `uvm-ral-gen <input> -o <output> [options]`

use clap::{ArgAction, Parser, ValueEnum};
use log::{error, LevelFilter};
use std::path::{Path, PathBuf};
use std::process;
use uvm_ral_exporter::{
  load_model_file, load_svd_file, ErrorKind, ExportOptions, FileType, Model, NodeId, RalError,
  RalResult, TypeStyle, UvmExporter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
  /// Elaborated register model in XML form
  Xml,
  /// CMSIS-SVD device description
  Svd,
}

#[derive(Parser, Debug)]
#[command(name = "uvm-ral-gen", version)]
#[command(about = "Generate a UVM register model from a register description")]
struct Args {
  /// Register description to export (.xml model or .svd device)
  input: PathBuf,

  /// File to write the register model to
  #[arg(short, long)]
  output: PathBuf,

  /// Input format. Guessed from the input file extension by default.
  #[arg(long = "input-format", value_enum)]
  input_format: Option<InputFormat>,

  /// Instance name of the top-level address map to export. Defaults to the first one.
  #[arg(long)]
  top: Option<String>,

  /// TOML file with export options. Flags given on the command line take precedence.
  #[arg(long)]
  config: Option<PathBuf>,

  /// Wrap the output in a package or behind an include guard
  #[arg(long = "file-type", value_enum)]
  file_type: Option<FileType>,

  /// Name classes after their declaration scope (sharing definitions) or their instance path
  #[arg(long = "type-style", value_enum)]
  type_style: Option<TypeStyle>,

  /// Create instances through the UVM factory (`--use-factory=false` to disable)
  #[arg(
    long = "use-factory",
    num_args = 0..=1,
    require_equals = true,
    default_missing_value = "true"
  )]
  use_factory: Option<bool>,

  /// Emit coverage sampling scaffolding (`--coverage=false` to disable)
  #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
  coverage: Option<bool>,

  /// Upper-case all instance names
  #[arg(
    long = "uppercase-inst-names",
    num_args = 0..=1,
    require_equals = true,
    default_missing_value = "true"
  )]
  uppercase_inst_names: Option<bool>,

  /// Derive registers from uvm_reg_enhanced
  #[arg(
    long = "uvm-reg-enhanced",
    num_args = 0..=1,
    require_equals = true,
    default_missing_value = "true"
  )]
  uvm_reg_enhanced: Option<bool>,

  /// Directory searched first for template overrides
  #[arg(long = "template-dir")]
  template_dir: Option<PathBuf>,

  /// Template variable, as NAME=VALUE
  #[arg(short = 'D', value_name = "NAME=VALUE")]
  define: Vec<String>,

  /// Increase log verbosity (-v, -vv, -vvv)
  #[arg(short, long, action = ArgAction::Count)]
  verbose: u8,
}

fn main() {
  let args = Args::parse();
  init_logging(args.verbose);

  if let Err(e) = run(&args) {
    error!("{}", e);
    process::exit(1);
  }
}

fn init_logging(verbosity: u8) {
  let level = match verbosity {
    0 => LevelFilter::Warn,
    1 => LevelFilter::Info,
    2 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  };
  let mut builder = pretty_env_logger::formatted_builder();
  builder.filter_level(level);
  if let Ok(filters) = std::env::var("RUST_LOG") {
    builder.parse_filters(&filters);
  }
  builder.init();
}

fn run(args: &Args) -> RalResult<()> {
  let options = export_options(args)?;
  let exporter = UvmExporter::new(options)?;

  let (model, top) = load(args)?;
  exporter.export(&model, top, &args.output)?;
  Ok(())
}

fn export_options(args: &Args) -> RalResult<ExportOptions> {
  let mut options = match args.config {
    Some(ref path) => ExportOptions::from_file(path)?,
    None => ExportOptions::default(),
  };

  if let Some(file_type) = args.file_type {
    options.set_file_type(file_type);
  }
  if let Some(type_style) = args.type_style {
    options.set_type_style(type_style);
  }
  if let Some(use_factory) = args.use_factory {
    options.use_uvm_factory = use_factory;
  }
  if let Some(coverage) = args.coverage {
    options.has_coverage = coverage;
  }
  if let Some(uppercase) = args.uppercase_inst_names {
    options.use_uppercase_inst_name = uppercase;
  }
  if let Some(enhanced) = args.uvm_reg_enhanced {
    options.use_uvm_reg_enhanced = enhanced;
  }
  if let Some(ref dir) = args.template_dir {
    options.user_template_dir = Some(dir.clone());
  }

  for define in args.define.iter() {
    let (name, value) = parse_define(define)?;
    options
      .user_template_context
      .insert(name.to_owned(), value.to_owned());
  }

  Ok(options)
}

fn parse_define(define: &str) -> RalResult<(&str, &str)> {
  let mut parts = define.splitn(2, '=');
  match (parts.next(), parts.next()) {
    (Some(name), Some(value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
    _ => Err(RalError {
      kind: ErrorKind::InvalidConfiguration,
      details: format!("Template variable must be NAME=VALUE, got '{}'", define),
    }),
  }
}

fn load(args: &Args) -> RalResult<(Model, NodeId)> {
  let format = args.input_format.unwrap_or_else(|| guess_format(&args.input));
  let (model, default_top) = match format {
    InputFormat::Svd => {
      let (model, top) = load_svd_file(&args.input)?;
      (model, Some(top))
    }
    InputFormat::Xml => {
      let model = load_model_file(&args.input)?;
      let top = model.top();
      (model, top)
    }
  };

  let top = match args.top {
    Some(ref name) => model.find_top(name).ok_or_else(|| RalError {
      kind: ErrorKind::Model,
      details: format!("No top-level address map named '{}'", name),
    })?,
    None => default_top.ok_or_else(|| RalError {
      kind: ErrorKind::Model,
      details: format!("{} contains no address map", args.input.display()),
    })?,
  };
  Ok((model, top))
}

fn guess_format(input: &Path) -> InputFormat {
  match input.extension().and_then(|e| e.to_str()) {
    Some(ext) if ext.eq_ignore_ascii_case("svd") => InputFormat::Svd,
    _ => InputFormat::Xml,
  }
}

#[cfg(test)]
mod tests {
  use super::{export_options, guess_format, parse_define, Args, InputFormat};
  use clap::Parser;
  use std::path::Path;
  use uvm_ral_exporter::{ErrorKind, FileType, TypeStyle};

  fn args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv).unwrap()
  }

  #[test]
  fn flags_default_to_options() {
    let options = export_options(&args(&["uvm-ral-gen", "soc.xml", "-o", "soc_pkg.sv"])).unwrap();

    assert_eq!(FileType::Package, options.file_type());
    assert_eq!(TypeStyle::Lexical, options.type_style());
    assert!(!options.use_uvm_factory);
    assert!(!options.has_coverage);
  }

  #[test]
  fn flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("ral.toml");
    std::fs::write(
      &config,
      "use_uvm_factory = true\nhas_coverage = false\nexport_as_package = true\n",
    )
    .unwrap();
    let config = config.to_str().unwrap();

    let options = export_options(&args(&[
      "uvm-ral-gen",
      "soc.xml",
      "-o",
      "soc.svh",
      "--config",
      config,
    ]))
    .unwrap();
    assert!(options.use_uvm_factory);
    assert!(!options.has_coverage);

    let options = export_options(&args(&[
      "uvm-ral-gen",
      "soc.xml",
      "-o",
      "soc.svh",
      "--config",
      config,
      "--use-factory=false",
      "--coverage",
      "--file-type",
      "header",
      "--type-style",
      "hier",
    ]))
    .unwrap();
    assert!(!options.use_uvm_factory);
    assert!(options.has_coverage);
    assert_eq!(FileType::Header, options.file_type());
    assert_eq!(TypeStyle::Hierarchical, options.type_style());
  }

  #[test]
  fn collects_template_variables() {
    let options = export_options(&args(&[
      "uvm-ral-gen",
      "soc.xml",
      "-o",
      "soc_pkg.sv",
      "-D",
      "project=soc",
      "-D",
      "owner=a=b",
    ]))
    .unwrap();

    assert_eq!("soc", options.user_template_context["project"]);
    assert_eq!("a=b", options.user_template_context["owner"]);
  }

  #[test]
  fn parses_defines() {
    assert_eq!(("name", "value"), parse_define("name=value").unwrap());
    assert_eq!(("name", ""), parse_define(" name =").unwrap());
    assert_eq!(
      ErrorKind::InvalidConfiguration,
      parse_define("name").unwrap_err().kind
    );
    assert_eq!(
      ErrorKind::InvalidConfiguration,
      parse_define("=value").unwrap_err().kind
    );
  }

  #[test]
  fn guesses_input_format() {
    assert_eq!(InputFormat::Svd, guess_format(Path::new("chip.svd")));
    assert_eq!(InputFormat::Svd, guess_format(Path::new("CHIP.SVD")));
    assert_eq!(InputFormat::Xml, guess_format(Path::new("soc.xml")));
    assert_eq!(InputFormat::Xml, guess_format(Path::new("soc")));
  }
}
