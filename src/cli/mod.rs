// src/cli/mod.rs — CLI definition (clap derive)

use clap::Parser;

#[derive(Parser)]
#[command(name = "claimbot", about = "Automated reward-claim bot", version)]
pub struct Cli {
    /// Config file path (TOML). CLAIMBOT_* environment variables still apply
    /// on top of it.
    #[arg(long)]
    pub config: Option<String>,

    /// Accounts file (one account id per line, `#` comments allowed)
    #[arg(long)]
    pub accounts: Option<String>,

    /// API base URL override
    #[arg(long)]
    pub base_url: Option<String>,

    /// Plan and log claims without issuing any POST
    #[arg(long)]
    pub dry_run: bool,

    /// Run a single pass over all accounts, then exit
    #[arg(long)]
    pub once: bool,
}
