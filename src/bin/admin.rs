//! snvmap Admin Tool
//!
//! Inspect, edit and reset stores under a data root.

use std::collections::BTreeSet;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use snvmap::stores::{store_config, MUTATIONS_STORE};
use snvmap::{MutationMap, SetStore, Snv, StoreConfig, VariantRecord};
use tracing_subscriber::{fmt, EnvFilter};

/// snvmap admin
#[derive(Parser, Debug)]
#[command(name = "snvmap-admin")]
#[command(about = "Administer snvmap stores")]
#[command(version)]
struct Args {
    /// Application data root holding one directory per store
    #[arg(short, long, default_value = "./snvmap_data")]
    data_root: String,

    /// Memory-map size in MB
    #[arg(short, long, default_value = "1024")]
    map_mb: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the number of keys in a store
    Stats {
        /// Store name
        store: String,
    },

    /// Print the members of one key
    Get {
        /// Store name
        store: String,

        /// The key to get
        key: String,
    },

    /// Add a member to one key
    Add {
        /// Store name
        store: String,

        /// The key to extend
        key: String,

        /// The member to add
        member: String,
    },

    /// Print the decoded records of one SNV as JSON lines
    Lookup {
        chromosome: String,
        position: u64,
        ref_base: char,
        alt_base: char,

        /// Mapping store name
        #[arg(long, default_value = MUTATIONS_STORE)]
        store: String,
    },

    /// Print every key and its members
    Dump {
        /// Store name
        store: String,

        /// Stop after this many keys
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete a store and re-create it empty
    Reset {
        /// Store name
        store: String,
    },

    /// Delete a store
    Drop {
        /// Store name
        store: String,
    },
}

#[derive(Serialize)]
struct RecordView<'a> {
    #[serde(flatten)]
    record: &'a VariantRecord,
    aa_position: u64,
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,snvmap=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = StoreConfig::builder()
        .data_root(&args.data_root)
        .map_size(args.map_mb * 1024 * 1024)
        .read_only(!args.command.writes())
        .build();
    let config = store_config(&config, args.command.store());

    match args.command {
        Commands::Stats { store } => {
            let store = SetStore::open_named(&config, &store)?;
            println!("{}\t{} keys", store.path().display(), store.len()?);
        }
        Commands::Get { store, key } => {
            let store = SetStore::open_named(&config, &store)?;
            for member in sorted(store.members(&key)?) {
                println!("{}", member);
            }
        }
        Commands::Add { store, key, member } => {
            let store = SetStore::open_named(&config, &store)?;
            store.get(&key)?.add(member)?;
        }
        Commands::Lookup {
            chromosome,
            position,
            ref_base,
            alt_base,
            store,
        } => {
            let map = MutationMap::open(&config, &store)?;
            let snv = Snv::new(chromosome, position, ref_base, alt_base);
            for record in map.lookup(&snv)? {
                let view = RecordView {
                    aa_position: record.aa_position(),
                    record: &record,
                };
                println!("{}", serde_json::to_string(&view)?);
            }
        }
        Commands::Dump { store, limit } => {
            let store = SetStore::open_named(&config, &store)?;
            let items = store.iter_items()?.take(limit.unwrap_or(usize::MAX));
            for item in items {
                let (key, members) = item?;
                let members: Vec<String> = sorted(members.collect()).into_iter().collect();
                println!("{}\t{}", key, members.join(", "));
            }
        }
        Commands::Reset { store } => {
            let store = SetStore::open_named(&config, &store)?;
            store.reset()?;
            println!("reset {}", store.path().display());
        }
        Commands::Drop { store } => {
            let store = SetStore::new(config.store_path(&store), config.clone());
            store.destroy()?;
            println!("dropped {}", store.path().display());
        }
    }

    Ok(())
}

impl Commands {
    /// Name of the store the command operates on
    fn store(&self) -> &str {
        match self {
            Commands::Stats { store }
            | Commands::Get { store, .. }
            | Commands::Add { store, .. }
            | Commands::Lookup { store, .. }
            | Commands::Dump { store, .. }
            | Commands::Reset { store }
            | Commands::Drop { store } => store,
        }
    }

    fn writes(&self) -> bool {
        matches!(
            self,
            Commands::Add { .. } | Commands::Reset { .. } | Commands::Drop { .. }
        )
    }
}

fn sorted(members: std::collections::HashSet<String>) -> BTreeSet<String> {
    members.into_iter().collect()
}
