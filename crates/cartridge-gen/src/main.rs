//! cartridge-gen - Offline API descriptor generator
//!
//! Reads the hand-maintained API schema and writes two derived artifacts:
//! the versioned JSON manifest the guest toolchain compiles against, and the
//! host wrapper table compiled into the runtime. Both are checked in; rerun
//! this tool after editing the schema.

mod emit;
mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

/// Generate the API manifest and host wrapper table from a schema file
#[derive(Parser)]
#[command(name = "cartridge-gen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API schema file
    #[arg(short, long, default_value = "api/schema.json")]
    schema: PathBuf,

    /// Output path for the JSON manifest
    #[arg(short, long, default_value = "api/manifest.json")]
    manifest: PathBuf,

    /// Output path for the generated host wrapper source
    #[arg(short, long, default_value = "crates/cartridge-runtime/src/api/gen.rs")]
    out: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    } else {
        tracing_subscriber::fmt().with_env_filter("info").init();
    }

    let json = fs::read_to_string(&cli.schema)
        .with_context(|| format!("reading schema {}", cli.schema.display()))?;
    let schema = schema::ApiSchema::from_json(&json)
        .with_context(|| format!("parsing schema {}", cli.schema.display()))?;

    let generator = emit::Generator::new(&schema)?;

    let manifest = generator.manifest();
    fs::write(&cli.manifest, manifest.to_json()?)
        .with_context(|| format!("writing manifest {}", cli.manifest.display()))?;
    info!(path = %cli.manifest.display(), version = %manifest.version, "wrote API manifest");

    let source = generator.emit_rust()?;
    fs::write(&cli.out, source)
        .with_context(|| format!("writing wrapper table {}", cli.out.display()))?;
    info!(path = %cli.out.display(), "wrote host wrapper table");

    Ok(())
}
