use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use form_schema_core::{DataRecord, FormSchema, FormValidationError};
use form_schema_validation::{DatatypeRegistry, FormValidator, ValidatorConfig};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Output format for findings and listings.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "form-validate")]
#[command(about = "Form schema ID generation and validation")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Assign element IDs to a schema JSON file.
    Ids(IdsArgs),
    /// Validate a schema JSON file.
    CheckSchema(CheckSchemaArgs),
    /// Validate a data JSON file against a schema JSON file.
    CheckData(CheckDataArgs),
    /// List the built-in datatypes.
    Datatypes(DatatypesArgs),
}

#[derive(Debug, Args)]
struct IdsArgs {
    /// Schema JSON file.
    schema: PathBuf,
    /// Write the numbered schema here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ValidationArgs {
    /// YAML validator configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the allowed subsection depth.
    #[arg(long)]
    max_recursion: Option<usize>,
    /// Override the item cap for elements without declared bounds.
    #[arg(long)]
    default_max_items: Option<usize>,
    /// Assign fresh IDs to the schema before validating.
    #[arg(long)]
    generate_ids: bool,
    /// Output format for findings.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct CheckSchemaArgs {
    /// Schema JSON file.
    schema: PathBuf,
    #[command(flatten)]
    validation: ValidationArgs,
}

#[derive(Debug, Args)]
struct CheckDataArgs {
    /// Schema JSON file.
    schema: PathBuf,
    /// JSON array of data records.
    data: PathBuf,
    #[command(flatten)]
    validation: ValidationArgs,
}

#[derive(Debug, Args)]
struct DatatypesArgs {
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Ids(args) => run_ids(args),
        Command::CheckSchema(args) => run_check_schema(args),
        Command::CheckData(args) => run_check_data(args),
        Command::Datatypes(args) => run_datatypes(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_ids(args: IdsArgs) -> Result<(), String> {
    let mut schema = read_schema(&args.schema)?;
    schema.generate_ids();
    let rendered = serde_json::to_string_pretty(&schema)
        .map_err(|e| format!("failed to serialize schema: {e}"))?;

    match args.output {
        Some(path) => {
            fs::write(&path, rendered + "\n")
                .map_err(|e| format!("failed to write '{}': {e}", path.display()))?;
            info!(
                elements = schema.element_count(),
                "wrote numbered schema to {}",
                path.display()
            );
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn run_check_schema(args: CheckSchemaArgs) -> Result<(), String> {
    let schema = prepare_schema(&args.schema, &args.validation)?;
    let config = load_config(&args.validation)?;
    let registry = default_registry()?;

    let errors = FormValidator::from_config(&registry, &config).validate_schema(&schema);
    report(&errors, args.validation.format)
}

fn run_check_data(args: CheckDataArgs) -> Result<(), String> {
    let schema = prepare_schema(&args.schema, &args.validation)?;
    let records: Vec<DataRecord> = read_json(&args.data)?;
    let config = load_config(&args.validation)?;
    let registry = default_registry()?;

    let validator = FormValidator::from_config(&registry, &config);
    #[cfg(feature = "parallel")]
    let errors = validator.par_validate_data(&records, &schema);
    #[cfg(not(feature = "parallel"))]
    let errors = validator.validate_data(&records, &schema);
    report(&errors, args.validation.format)
}

fn run_datatypes(args: DatatypesArgs) -> Result<(), String> {
    let registry = default_registry()?;
    let mut definitions = registry.datatype_definitions();
    definitions.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    println!("{}", render(&definitions, args.format)?);
    Ok(())
}

fn default_registry() -> Result<DatatypeRegistry, String> {
    DatatypeRegistry::with_default_datatypes().map_err(|e| e.to_string())
}

fn load_config(args: &ValidationArgs) -> Result<ValidatorConfig, String> {
    let mut config = match &args.config {
        Some(path) => ValidatorConfig::load(path)
            .map_err(|e| format!("failed to load config '{}': {e}", path.display()))?,
        None => ValidatorConfig::default(),
    };
    if let Some(max_recursion) = args.max_recursion {
        config.max_recursion = max_recursion;
    }
    if let Some(default_max_items) = args.default_max_items {
        config.default_max_items = default_max_items;
    }
    debug!(?config, "validator configuration");
    Ok(config)
}

fn prepare_schema(path: &Path, args: &ValidationArgs) -> Result<FormSchema, String> {
    let mut schema = read_schema(path)?;
    if args.generate_ids {
        schema.generate_ids();
    }
    Ok(schema)
}

fn read_schema(path: &Path) -> Result<FormSchema, String> {
    let schema: FormSchema = read_json(path)?;
    debug!(
        elements = schema.element_count(),
        "loaded form schema '{}'",
        schema.title
    );
    Ok(schema)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| format!("failed to parse '{}': {e}", path.display()))
}

fn render<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
        CliOutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
    }
}

/// Prints the findings and fails when there are any.
fn report(errors: &[FormValidationError], format: CliOutputFormat) -> Result<(), String> {
    if errors.is_empty() {
        info!("no validation errors");
        return Ok(());
    }

    println!("{}", render(&errors, format)?);
    Err(format!("{} validation error(s)", errors.len()))
}
