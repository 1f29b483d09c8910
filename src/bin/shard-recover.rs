use clap::{crate_version, Parser};

use std::error::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use shard_recover::config::{OutputFormat, RecoverConfig};
use shard_recover::constants::DEFAULT_CONFIG_PATH;
use shard_recover::distribute::{active_from_mask, share_masks_for};
use shard_recover::report::{fingerprint, render_json, render_text};
use shard_recover::secret::Secret;
use shard_recover::table::CanonicalTable;
use shard_recover::validator::validate;

#[derive(Debug, Parser)]
#[command(name = "shard-recover")]
#[command(version = crate_version!())]
#[command(
    about = "Balanced recovery patterns for threshold secret sharing",
    long_about = "Computes, for every N total participants and threshold T, which active participant covers which minimal coalition of N - T + 1 participants, such that every active participant covers at most ceil(C(N, T-1) / T) coalitions. The canonical table is solved once with a max-flow solver and relabelled onto any requested active set. Coalitions are printed as bitmasks, bit i set meaning participant i is a member."
)]
enum CliArgument {
    /// Print the canonical table, one line per (T, N).
    Table {
        /// Output format, text or json. Defaults to the configured format.
        #[clap(long, short)]
        format: Option<OutputFormat>,
    },
    /// Distribute the canonical solution onto an active set.
    Query {
        /// Total number of participants.
        #[clap(long, short = 'n')]
        parties: u8,

        /// Active participants, comma separated.
        #[clap(long, short, value_delimiter = ',', conflicts_with = "mask")]
        active: Vec<u8>,

        /// Active participants as a bitmask.
        #[clap(long, short)]
        mask: Option<u8>,

        /// Only print the coalitions of this participant.
        #[clap(long, short)]
        party: Option<u8>,
    },
    /// Check every table entry against every possible active set.
    Validate,
    /// Print the SHA-256 fingerprint of the JSON table.
    Fingerprint,
    /// Write the default configuration file.
    Init,
}

#[derive(Parser, Debug)]
#[clap(name = "shard-recover")]
struct Opt {
    /// Path of the configuration file.
    #[clap(long, short, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Subcommand to run.
    #[clap(subcommand)]
    argument: CliArgument,
}

fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let opt = Opt::parse();

    match opt.argument {
        CliArgument::Init => {
            RecoverConfig::write_default(&opt.config)?;
            println!("📝 Default config written to {}", opt.config);
        }

        CliArgument::Table { format } => {
            let (config, table) = load_table(&opt.config)?;
            match format.unwrap_or(config.format) {
                OutputFormat::Text => print!("{}", render_text(&table)),
                OutputFormat::Json => println!("{}", render_json(&table)?),
            }
        }

        CliArgument::Query {
            parties,
            active,
            mask,
            party,
        } => {
            let (_, table) = load_table(&opt.config)?;
            let active = match mask {
                Some(mask) => active_from_mask(mask, parties)?,
                None => active,
            };
            debug!("Distributing N = {} onto active set {:?}", parties, active);

            match party {
                Some(party) => {
                    let active_mask = Secret::new(active.iter().copied())?.to_mask();
                    let masks = share_masks_for(&table, party, active_mask, parties)?;
                    println!("🔑 participant {}: {:?}", party, masks);
                }
                None => {
                    let distribution = table.distribute(&active, parties)?;
                    for (participant, secrets) in &distribution {
                        let masks: Vec<u8> = secrets.iter().map(Secret::to_mask).collect();
                        let sets: Vec<String> = secrets.iter().map(ToString::to_string).collect();
                        println!("🔑 participant {}: {:?} {}", participant, masks, sets.join(" "));
                    }
                }
            }
        }

        CliArgument::Validate => {
            let (_, table) = load_table(&opt.config)?;
            let report = validate(&table)?;
            println!(
                "✅ {} instances valid over {} active sets",
                report.instances, report.queries
            );
        }

        CliArgument::Fingerprint => {
            let (_, table) = load_table(&opt.config)?;
            println!("{}", fingerprint(&table)?);
        }
    }

    Ok(())
}

/// Loads the configuration and builds the canonical table it describes. The
/// table is complete before any query is served.
fn load_table(path: &str) -> Result<(RecoverConfig, CanonicalTable), Box<dyn Error>> {
    let config = RecoverConfig::new(path)?;
    debug!("Using config: {:?}", config);
    let solver = config.solver()?;
    let table = CanonicalTable::build(config.max_parties, solver.as_ref())?;
    Ok((config, table))
}
