use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tally",
    about = "Tally — carnival token ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the Tally API server
    Serve(ServeArgs),
    /// Mint an access token offline from a signing seed
    Token(TokenArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<String>,
    /// Seed one demo account per role and print their credentials
    #[arg(long)]
    pub demo: bool,
}

#[derive(Args)]
pub struct TokenArgs {
    /// Hex-encoded 32-byte ed25519 seed (must match the server's)
    #[arg(long)]
    pub seed: String,
    /// Subject user id
    #[arg(long)]
    pub user: String,
    /// Subject role, e.g. `Vendor` or `SuperAdmin`
    #[arg(long)]
    pub role: String,
    /// Token lifetime in seconds
    #[arg(long, default_value = "10800")]
    pub ttl_secs: i64,
}
