use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Raise log verbosity (`-v` crate debug, `-vv` everything). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch pets from Adoptapet and write them to a JSON file.
    Update(UpdateArgs),
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Adoptapet API key.
    #[arg(long, env = "ADOPTAPET_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Shelter whose adoptable pets are listed.
    #[arg(long, env = "SHELTER_ID", default_value = "83349")]
    pub shelter_id: String,

    /// Output JSON file path.
    #[arg(short, long, default_value = "data/pets.json")]
    pub output: String,

    /// Base URL of the Adoptapet search API.
    #[arg(
        long,
        env = "ADOPTAPET_BASE_URL",
        default_value = crate::adoptapet::DEFAULT_BASE_URL
    )]
    pub base_url: String,

    /// Retries for transient upstream failures (per request, at most 10).
    #[arg(
        long,
        default_value_t = 2,
        value_parser = clap::value_parser!(u8).range(0..=i64::from(crate::retry::MAX_RETRIES))
    )]
    pub retries: u8,

    /// Per-request timeout for Adoptapet calls.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}
