//! GraphSense Transforms - command-line entry point
//!
//! Runs one transform against a property set and prints the resulting
//! entities and notices as JSON on stdout. Logs go to stderr.
//!
//! ```text
//! graphsense_trx to-details -p properties.cryptocurrencyaddress=1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa
//! graphsense_trx to-tags -p cluster_ID=12345 -p currency=btc
//! graphsense_trx list
//! ```

use clap::{Args, Parser, Subcommand};
use eyre::{eyre, Result, WrapErr};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use graphsense_trx::utils::constants::{APP_NAME, APP_VERSION, CONFIG_PATH_ENV};
use graphsense_trx::{
    EntityProjector, Gateway, GraphSenseConfig, GraphSenseConnector, Properties, Transform,
    TransformResponse,
};

#[derive(Parser, Debug)]
#[command(name = "graphsense_trx", version, about = "GraphSense cryptocurrency transforms")]
struct Cli {
    /// Path to config.json (api_url, api_key)
    #[arg(long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available transforms
    List,
    /// Details of an address or cluster
    ToDetails(TransformArgs),
    /// Cluster an address belongs to
    ToCluster(TransformArgs),
    /// Attribution tags of an address or cluster
    ToTags(TransformArgs),
}

#[derive(Args, Debug)]
struct TransformArgs {
    /// Input property as key=value (repeatable)
    #[arg(short = 'p', long = "property", value_parser = parse_property)]
    properties: Vec<(String, String)>,

    /// JSON object file with input properties; -p values win on conflict
    #[arg(long = "properties")]
    properties_file: Option<PathBuf>,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

impl TransformArgs {
    fn load_properties(&self) -> Result<Properties> {
        let mut properties = match &self.properties_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str::<Properties>(&raw).wrap_err_with(|| {
                    format!("{} is not a JSON object of strings", path.display())
                })?
            }
            None => Properties::new(),
        };
        properties.extend(self.properties.iter().cloned());

        if properties.is_empty() {
            return Err(eyre!("No input properties given (use -p key=value or --properties)"));
        }
        Ok(properties)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn run_transform(
    transform: Transform,
    args: &TransformArgs,
    config: Option<PathBuf>,
) -> Result<()> {
    let properties = args.load_properties()?;

    let path = GraphSenseConfig::resolve_path(config.as_deref());
    let config = GraphSenseConfig::load(&path)
        .wrap_err_with(|| format!("Cannot start without a valid config ({})", path.display()))?;

    let projector = EntityProjector::from_config(&config);
    let gateway = Gateway::new(GraphSenseConnector::new(config));

    let mut response = TransformResponse::new();
    transform.run(&properties, &gateway, &projector, &mut response);

    let output = if args.compact {
        serde_json::to_string(&response)?
    } else {
        serde_json::to_string_pretty(&response)?
    };
    println!("{}", output);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    info!("🚀 {} v{}", APP_NAME, APP_VERSION);

    match cli.command {
        Command::List => {
            let registry: Vec<_> = Transform::all().iter().map(Transform::info).collect();
            println!("{}", serde_json::to_string_pretty(&registry)?);
            Ok(())
        }
        Command::ToDetails(args) => run_transform(Transform::ToDetails, &args, cli.config),
        Command::ToCluster(args) => run_transform(Transform::ToCluster, &args, cli.config),
        Command::ToTags(args) => run_transform(Transform::ToTags, &args, cli.config),
    }
}
