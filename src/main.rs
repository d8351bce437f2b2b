//! Command-line interface for xsdvm

#[cfg(feature = "cli")]
use clap::{ArgAction, Args, Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use xsdvm::locations::Location;
#[cfg(feature = "cli")]
use xsdvm::pipeline::{Generator, Inputs};
#[cfg(feature = "cli")]
use xsdvm::Config;

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsdvm")]
#[command(author, version, about = "XSD to Velocity template compiler and field mapper", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Args, Debug)]
struct SourceArgs {
    /// Sample payload (repeatable)
    #[arg(short, long = "sample", value_name = "FILE")]
    samples: Vec<PathBuf>,

    /// Service form descriptor
    #[arg(short, long, value_name = "FILE")]
    descriptor: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a schema and fill its placeholders from sample data
    Generate {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        #[command(flatten)]
        sources: SourceArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the mapping as JSON
        #[arg(long, value_name = "FILE")]
        mapping_out: Option<PathBuf>,
    },

    /// Compile a schema into a raw template
    Compile {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Wrap repeated elements in #foreach blocks
        #[arg(long)]
        mark_repeats: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the element path inventory as JSON
    Index {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the placeholder mapping as JSON
    Map {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        #[command(flatten)]
        sources: SourceArgs,

        /// Print the per-strategy report instead of the mapping
        #[arg(long)]
        report: bool,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Generate {
            schema,
            sources,
            output,
            mapping_out,
        } => cmd_generate(config, schema, sources, output, mapping_out),
        Commands::Compile {
            schema,
            mark_repeats,
            output,
        } => cmd_compile(config, schema, mark_repeats, output),
        Commands::Index { schema, pretty } => cmd_index(config, schema, pretty),
        Commands::Map {
            schema,
            sources,
            report,
            pretty,
        } => cmd_map(config, schema, sources, report, pretty),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
type CliResult = Result<(), Box<dyn std::error::Error>>;

#[cfg(feature = "cli")]
fn init_logging(verbose: u8, quiet: bool) {
    use tracing::Level;

    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(feature = "cli")]
fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Config::from_file(path)?),
        None => Ok(Config::default()),
    }
}

#[cfg(feature = "cli")]
fn inputs(schema: PathBuf, sources: SourceArgs) -> Inputs {
    let mut inputs = Inputs::new(Location::Path(schema));
    for sample in sources.samples {
        inputs = inputs.with_sample(Location::Path(sample));
    }
    if let Some(descriptor) = sources.descriptor {
        inputs = inputs.with_descriptor(Location::Path(descriptor));
    }
    inputs
}

#[cfg(feature = "cli")]
fn write_output(output: Option<PathBuf>, text: &str) -> CliResult {
    match output {
        Some(path) => fs::write(path, text)?,
        None => println!("{}", text),
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

#[cfg(feature = "cli")]
fn cmd_generate(
    config: Config,
    schema: PathBuf,
    sources: SourceArgs,
    output: Option<PathBuf>,
    mapping_out: Option<PathBuf>,
) -> CliResult {
    let generated = Generator::new(config).generate(&inputs(schema, sources))?;

    if let Some(path) = mapping_out {
        fs::write(path, to_json(&generated.mapping, true)?)?;
    }
    write_output(output, &generated.text)?;

    let unmapped = generated
        .notices
        .iter()
        .filter(|n| n.kind() == "unmapped-placeholder")
        .count();
    eprintln!(
        "Mapped {} placeholders ({} substitutions), {} left unmapped",
        generated.mapping.len(),
        generated.replacements,
        unmapped
    );
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_compile(
    mut config: Config,
    schema: PathBuf,
    mark_repeats: bool,
    output: Option<PathBuf>,
) -> CliResult {
    if mark_repeats {
        config.template.mark_repeats = true;
    }
    let generator = Generator::new(config);
    let schema = generator.load_schema(&Location::Path(schema))?;
    let compiled = generator.compile(&schema);
    write_output(output, &compiled.text)
}

#[cfg(feature = "cli")]
fn cmd_index(config: Config, schema: PathBuf, pretty: bool) -> CliResult {
    let generator = Generator::new(config);
    let schema = generator.load_schema(&Location::Path(schema))?;
    let index = generator.index(&schema);
    println!("{}", to_json(&index, pretty)?);
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_map(
    config: Config,
    schema: PathBuf,
    sources: SourceArgs,
    report: bool,
    pretty: bool,
) -> CliResult {
    let generator = Generator::new(config);
    let inputs = inputs(schema, sources);
    let schema = generator.load_schema(&inputs.schema)?;
    let (_, mapping, _) = generator.map(&schema, &inputs)?;

    let json = if report {
        to_json(&mapping.report(), pretty)?
    } else {
        to_json(&mapping, pretty)?
    };
    println!("{}", json);
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
