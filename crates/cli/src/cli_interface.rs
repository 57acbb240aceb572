use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by `create` and `fork`. Anything set here wins over `localnet.yaml`.
#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Port of the rpc proxy, network `i` is served under `http://localhost:{port}/{i}`
    #[clap(long)]
    pub port: Option<u16>,

    /// How often pending cross-chain calls are relayed, in milliseconds
    #[clap(long)]
    pub relay_interval_ms: Option<u64>,

    /// Account to fund on every network, can be repeated
    #[clap(long = "fund")]
    pub fund: Vec<String>,

    /// Amount every funded account receives, in ether
    #[clap(long)]
    pub fund_amount: Option<String>,

    /// Where the exported chain details are written
    #[clap(long, short)]
    pub output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default localnet.yaml
    Init {
        /// optional - The path to create the project in, default will be where the command is run.
        #[clap(long, short)]
        path: Option<String>,
    },
    /// Create fresh local networks, relay between them and export their details
    Create {
        #[clap(long, short)]
        path: Option<String>,

        /// Comma separated chain names, empty creates none
        #[clap(long, value_delimiter = ',')]
        chains: Option<Vec<String>>,

        #[command(flatten)]
        export: ExportArgs,
    },
    /// Fork live chains, relay between the forks and export their details
    Fork {
        #[clap(long, short)]
        path: Option<String>,

        /// mainnet or testnet
        #[clap(long)]
        env: Option<String>,

        /// Comma separated chain names, empty forks every chain of the environment
        #[clap(long, value_delimiter = ',')]
        chains: Option<Vec<String>>,

        /// JSON file with the deployed chains of every environment
        #[clap(long)]
        chain_info: Option<String>,

        /// Block every fork starts from, latest when unset
        #[clap(long)]
        fork_block_number: Option<u64>,

        #[command(flatten)]
        export: ExportArgs,
    },
    /// Print the deterministic test accounts of a seed
    Accounts {
        #[clap(long, default_value_t = 20)]
        count: usize,

        /// Network name or any other seed string
        #[clap(long, default_value = "")]
        seed: String,
    },
    /// Print a random 32 byte id
    RandomId,
    /// Fetch a JSON document and print it
    Get {
        url: String,
    },
}
