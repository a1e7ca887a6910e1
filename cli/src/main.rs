//! vstate CLI - inspect saved view-state payloads

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use viewstate_cli::{inspect, load_config, read_payload, run_demo, SchemaKind};

#[derive(Parser)]
#[command(name = "vstate")]
#[command(about = "Inspect and exercise view-state payloads")]
#[command(version)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, overrides the configured level
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a saved payload and print it as a tree
    Inspect {
        /// Payload or snapshot file
        file: PathBuf,

        /// Label tuple slots as this control type
        #[arg(short, long, value_enum)]
        schema: Option<SchemaKind>,
    },

    /// Run one request cycle on a data field and show the payload
    Demo {
        /// Also write the snapshot to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let filter = cli.log_level.as_deref().unwrap_or(&config.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Inspect { file, schema } => {
            let payload = read_payload(&file)?;
            let text = inspect(payload.as_ref(), schema, &config.inspect)?;
            print!("{}", text);
        }

        Commands::Demo { out } => {
            let report = run_demo()?;
            let json = report.snapshot.to_json()?;

            println!("Saved payload:");
            println!("{}", json);
            println!();
            println!("Restored field:");
            println!("  header text:       {}", report.header_text);
            println!("  sort expression:   {}", report.sort_expression);
            println!("  visible:           {}", report.visible);
            println!("  header back color: {}", report.header_back_color);
            println!("  item width:        {}", report.item_width);

            if let Some(path) = out {
                std::fs::write(&path, json)?;
                info!(path = %path.display(), "snapshot written");
            }
        }
    }

    Ok(())
}
