use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "team-distributor")]
#[command(author, version, about = "Telegram bot that registers participants and balances them across teams", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (default)
    Run,

    /// Print per-team member counts
    Stats,

    /// Print every team roster
    List,

    /// Register a participant by hand, as the bot would
    Assign {
        /// Telegram user ID
        #[arg(long)]
        user_id: i64,

        /// Full name, at least two words
        #[arg(long)]
        name: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
