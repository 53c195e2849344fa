//! mForm CLI - Parse XLSForm spreadsheets into form documents
//!
//! ```bash
//! mform parse census.xlsx             # Print the parsed form as JSON
//! mform parse ./census/ -o form.json  # Directory of survey/choices/settings CSVs
//! mform validate census.xlsx          # Check required sheets and columns
//! mform check form.json               # Validate a parsed form document
//! mform serve                         # Start HTTP server (port 8000)
//! ```

use clap::{Parser, Subcommand};
use mform::{
    load_path, parse_file, validate, validate_document, NestingPolicy, ParseOptions, ServerConfig,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mform")]
#[command(about = "Parse XLSForm spreadsheets into structured form documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an XLSForm workbook (or CSV directory) and output JSON
    Parse {
        /// Workbook file, or directory holding survey.csv / choices.csv / settings.csv
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// How nested begin_group rows are handled
        #[arg(long, value_enum, default_value = "single")]
        nesting: NestingPolicy,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Check that the required sheets and columns exist
    Validate {
        /// Workbook file or CSV directory
        input: PathBuf,
    },

    /// Validate a parsed form JSON document against the document schema
    Check {
        /// Input JSON file
        input: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: MFORM_PORT or 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            input,
            output,
            nesting,
            compact,
        } => cmd_parse(&input, output.as_deref(), nesting, compact),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Check { input } => cmd_check(&input),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_parse(
    input: &Path,
    output: Option<&Path>,
    nesting: NestingPolicy,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing XLSForm: {}", input.display());

    let form = parse_file(input, &ParseOptions::with_nesting(nesting))?;

    let json = if compact {
        serde_json::to_string(&form)?
    } else {
        serde_json::to_string_pretty(&form)?
    };
    write_output(&json, output)?;

    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let source = load_path(input)?;
    eprintln!("   Sheets: {}", source.sheet_names().join(", "));

    if !validate(&source) {
        std::process::exit(1);
    }

    eprintln!("✅ Valid XLSForm structure");
    Ok(())
}

fn cmd_check(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Checking document: {}", input.display());

    let content = fs::read_to_string(input)?;
    let document: Value = serde_json::from_str(&content)?;

    match validate_document(&document) {
        Ok(()) => {
            eprintln!("✅ Document is valid");
            Ok(())
        }
        Err(errors) => {
            eprintln!("\n❌ {} error(s):", errors.len());
            for err in errors.iter().take(10) {
                eprintln!("   - {}", err);
            }
            std::process::exit(1);
        }
    }
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::from_env();
    if let Some(port) = port {
        config.port = port;
    }
    mform::server::start_server(config).await?;
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
