use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ev_ballot::Ballot;
use ev_cli::{run_batch, BatchEntry};
use ev_modules_api::{generate_address, ModuleCallJsonSchema};
use ev_runtime::{from_toml_path, ElectionLedger, LedgerConfig, RuntimeCall};
use ev_voter_registry::VoterRegistry;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

type Ctx = ev_modules_api::default_context::DefaultContext;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Run elections on a local, serialized e-voting ledger
struct App {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deploy a ledger and apply a batch of calls to it
    Run {
        /// Path to the TOML ledger configuration
        #[clap(long)]
        config: PathBuf,
        /// Path to a JSON array of `{ sender, at, call }` entries
        #[clap(long)]
        calls: PathBuf,
    },
    /// Print the address derived from a name
    Address { name: String },
    /// Print the JSON schemas of the call messages
    Schema,
}

fn main() -> Result<(), anyhow::Error> {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Unable to set global default subscriber")?;

    match App::parse().command {
        Command::Run { config, calls } => {
            let config: LedgerConfig<Ctx> =
                from_toml_path(&config).context("Failed to read ledger configuration")?;
            let ledger = ElectionLedger::from_config(&config)?;

            let calls = std::fs::read_to_string(&calls)
                .with_context(|| format!("Failed to read {}", calls.display()))?;
            let entries: Vec<BatchEntry<Ctx>> =
                serde_json::from_str(&calls).context("Malformed batch file")?;

            let report = run_batch(&ledger, entries)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Address { name } => {
            println!("{}", generate_address::<Ctx>(&name));
        }
        Command::Schema => {
            println!("{}", VoterRegistry::<Ctx>::json_schema());
            println!("{}", Ballot::<Ctx>::json_schema());
            let runtime_schema = schemars::schema_for!(RuntimeCall<Ctx>);
            println!("{}", serde_json::to_string_pretty(&runtime_schema)?);
        }
    }

    Ok(())
}
