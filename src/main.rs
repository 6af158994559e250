//! Command-line interface for jadn

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use jadn::config::StyleConfig;
#[cfg(feature = "cli")]
use jadn::formats;
#[cfg(feature = "cli")]
use jadn::{check, graph, loaders, Loader, OptionTable, Schema};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "jadn")]
#[command(author, version, about = "JADN abstract schema translator", long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate schema files to another format
    Convert {
        /// Schema file, or a directory of schema files
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output directory
        #[arg(value_name = "OUT_DIR", default_value = "out")]
        out_dir: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "jidl")]
        format: String,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Style overrides as key:value,key:value
        #[arg(long)]
        style: Option<String>,

        /// JSON file with a "style" section per format
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Fail on schemas the checker rejects
        #[arg(long)]
        strict: bool,
    },

    /// Show root types, type order and dependency cycles
    Deps {
        /// Schema file
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Check a schema for naming, option and reference problems
    Check {
        /// Schema file
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// List registered formats
    Formats,
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            input,
            out_dir,
            format,
            recursive,
            style,
            config,
            strict,
        } => cmd_convert(input, out_dir, format, recursive, style, config, strict),
        Commands::Deps { input } => cmd_deps(input),
        Commands::Check { input } => cmd_check(input),
        Commands::Formats => cmd_formats(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn cmd_convert(
    input: PathBuf,
    out_dir: PathBuf,
    format_name: String,
    recursive: bool,
    style: Option<String>,
    config: Option<PathBuf>,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = formats::get(&format_name)?;
    let mut style_config = match config {
        Some(path) => StyleConfig::from_file(path)?,
        None => StyleConfig::new(),
    };
    if let Some(args) = style {
        style_config = style_config.with_args(&args)?;
    }
    let style = style_config.resolve(format)?;

    let files = if input.is_dir() {
        schema_files(&input, recursive)?
    } else {
        vec![input]
    };

    let loader = Loader::new().with_strict(strict);
    let mut failed = 0;
    for path in &files {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("schema");
        let result = loader
            .load(path)
            .and_then(|schema| loaders::dump_to(&schema, format, &out_dir, stem, &style));
        match result {
            Ok(written) => println!("{} -> {}", path.display(), written.display()),
            Err(e) if e.is_unsupported() => println!("{}: skipped, {}", path.display(), e),
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} schemas failed", failed, files.len()).into());
    }
    Ok(())
}

/// Schema files in a directory that some format can read, sorted by path
#[cfg(feature = "cli")]
fn schema_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                files.extend(schema_files(&path, recursive)?);
            }
        } else if Loader::format_for(&path).is_ok() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(feature = "cli")]
fn cmd_deps(input: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let schema = Loader::new().load(&input)?;
    let deps = graph::build_deps(&schema);
    let roots = graph::roots(&deps);

    println!("Roots: {}", roots.join(", "));
    println!("Order:");
    for name in graph::topo_sort(&deps, &roots) {
        let refs = deps.get(&name).map(|r| r.join(", ")).unwrap_or_default();
        if refs.is_empty() {
            println!("  {}", name);
        } else {
            println!("  {} -> {}", name, refs);
        }
    }
    let cycles = graph::cycles(&deps);
    if !cycles.is_empty() {
        println!("Cycles:");
        for cycle in cycles {
            println!("  {}", cycle.join(" -> "));
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_check(input: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let schema: Schema = Loader::new().load(&input)?;
    let problems = check::diagnostics(OptionTable::global()?, &schema);
    if problems.is_empty() {
        println!("{}: ok ({} types)", input.display(), schema.types().len());
        return Ok(());
    }
    for problem in &problems {
        println!("{}: {}", input.display(), problem);
    }
    Err(format!("{} problems found", problems.len()).into())
}

#[cfg(feature = "cli")]
fn cmd_formats() -> Result<(), Box<dyn std::error::Error>> {
    println!("{:<8} {:<6} {:<5} {:<5} Description", "Name", "Ext", "Load", "Dump");
    for format in formats::registry() {
        println!(
            "{:<8} {:<6} {:<5} {:<5} {}",
            format.name,
            format.extension,
            yes_no(format.can_load()),
            yes_no(format.can_dump()),
            format.description
        );
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "-"
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
