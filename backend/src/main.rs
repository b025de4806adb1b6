//! Helmert CLI - transform coordinate files between reference systems
//!
//! # Main Commands
//!
//! ```bash
//! helmert transform points.csv -s СК-42 -t WGS-84 -o out.csv --report report.md
//! helmert report points.csv -o report.md
//! helmert serve                    # Start HTTP server (port 8000)
//! ```
//!
//! # Inspection Commands
//!
//! ```bash
//! helmert parse points.csv         # Just parse CSV to JSON
//! helmert systems                  # List known systems and routes
//! ```

use clap::{Args, Parser, Subcommand};
use helmert::{
    parse_csv_file_auto, run_file, write_points_csv, AppConfig, PipelineOptions, TransformEngine,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "helmert")]
#[command(about = "Seven-parameter Helmert transformation of 3D coordinates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that touches the engine
#[derive(Args, Debug, Clone, Default)]
struct SystemArgs {
    /// Source coordinate system (default: HELMERT_SOURCE or СК-42)
    #[arg(short, long)]
    source: Option<String>,

    /// Target coordinate system (default: HELMERT_TARGET or ГСК-2011)
    #[arg(short, long)]
    target: Option<String>,

    /// Parameter table JSON (default: embedded table)
    #[arg(short, long)]
    parameters: Option<PathBuf>,

    /// Cascade route JSON (default: built-in routes)
    #[arg(long)]
    routes: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: CSV → transformed CSV (+ optional report)
    Transform {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        systems: SystemArgs,

        /// Output file for transformed points (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the Markdown report
        #[arg(long)]
        report: Option<PathBuf>,

        /// Output the full result as JSON instead of CSV
        #[arg(long)]
        json: bool,
    },

    /// Render only the Markdown report
    Report {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        systems: SystemArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a CSV file and output JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List known coordinate systems and cascade routes
    Systems {
        /// Parameter table JSON (default: embedded table)
        #[arg(short, long)]
        parameters: Option<PathBuf>,

        /// Cascade route JSON (default: built-in routes)
        #[arg(long)]
        routes: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: PORT or 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Transform {
            input,
            systems,
            output,
            report,
            json,
        } => cmd_transform(&input, systems, output.as_deref(), report.as_deref(), json),
        Commands::Report {
            input,
            systems,
            output,
        } => cmd_report(&input, systems, output.as_deref()),
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),
        Commands::Systems { parameters, routes } => cmd_systems(SystemArgs {
            parameters,
            routes,
            ..SystemArgs::default()
        }),
        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Environment configuration with CLI flags applied on top
fn load_config(args: SystemArgs) -> Result<AppConfig, Box<dyn std::error::Error>> {
    // from_env also loads .env (if present)
    let mut config = AppConfig::from_env()?;
    if let Some(source) = args.source {
        config.default_source = source;
    }
    if let Some(target) = args.target {
        config.default_target = target;
    }
    if args.parameters.is_some() {
        config.parameters_path = args.parameters;
    }
    if args.routes.is_some() {
        config.routes_path = args.routes;
    }
    Ok(config)
}

fn build(args: SystemArgs) -> Result<(TransformEngine, PipelineOptions), Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    let engine = config.build_engine()?;
    let options = PipelineOptions::new(config.default_source, config.default_target);
    Ok((engine, options))
}

fn cmd_transform(
    input: &Path,
    systems: SystemArgs,
    output: Option<&Path>,
    report: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let (engine, options) = build(systems)?;
    let result = run_file(input, &engine, &options)?;

    eprintln!("   Route: {} → {}", result.route.join(" → "), options.target);
    eprintln!("   Points: {}", result.after.len());

    if let Some(report_path) = report {
        fs::write(report_path, &result.report)?;
        eprintln!("   💾 Report saved to: {}", report_path.display());
    }

    if json {
        let content = serde_json::to_string_pretty(&result)?;
        write_output(&content, output)?;
    } else {
        let mut buf = Vec::new();
        write_points_csv(&mut buf, &result.after)?;
        write_output(&String::from_utf8(buf)?, output)?;
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_report(
    input: &Path,
    systems: SystemArgs,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let (engine, options) = build(systems)?;
    let result = run_file(input, &engine, &options)?;

    write_output(&result.report, output)?;
    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = parse_csv_file_auto(input)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} points", result.points.len());

    let json = serde_json::to_string_pretty(&result.points)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_systems(args: SystemArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    let engine = config.build_engine()?;

    println!("📐 Coordinate systems ({}):\n", engine.table().len());
    for (system, params) in engine.table().iter() {
        let marker = if system == config.default_source { " (default source)" } else { "" };
        println!("  {}{}", system, marker);
        let fields: Vec<String> = params
            .fields()
            .iter()
            .map(|(name, value)| format!("{} = {}", name, value))
            .collect();
        println!("    {}", fields.join(", "));
    }

    let routes = engine.routes().routes();
    if !routes.is_empty() {
        println!("\n🔀 Cascade routes:\n");
        for route in routes {
            println!(
                "  {} → {} via {}",
                route.source,
                route.target,
                route.via.join(" → ")
            );
        }
    }

    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }
    helmert::server::start_server(config).await
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!("💾 Saved to: {}", path.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
