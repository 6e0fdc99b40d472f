use clap::{Args, Parser, Subcommand, ValueEnum};
use vocadeck_core::ScorePolicy;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScorePolicyArg {
    /// Always store the latest score
    Overwrite,
    /// Store a new score only if it beats the current one
    KeepHighest,
}

impl From<ScorePolicyArg> for ScorePolicy {
    fn from(p: ScorePolicyArg) -> Self {
        match p {
            ScorePolicyArg::Overwrite => ScorePolicy::Overwrite,
            ScorePolicyArg::KeepHighest => ScorePolicy::KeepHighest,
        }
    }
}

#[derive(Debug, Parser, Clone)]
#[command(name = "vocadeck", version, about = "Vocadeck deck/word/score API")]
pub struct Cli {
    /// Store location: postgres://…, sqlite://path, or `memory`
    /// (defaults to a SQLite file in the app data dir)
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Bind host for the API
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Bind port for the API
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Reject requests without a userId instead of using the shared scope
    #[arg(long, env = "REQUIRE_USER_ID")]
    pub require_user_id: bool,

    /// How a new score combines with the stored best
    #[arg(long, env = "SCORE_POLICY", value_enum, default_value_t = ScorePolicyArg::Overwrite)]
    pub score_policy: ScorePolicyArg,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Launch the HTTP API (default)
    Serve,
    /// Deck operations against the configured store
    #[command(subcommand)]
    Deck(DeckCmd),
}

#[derive(Debug, Args, Clone)]
pub struct UserArg {
    /// Owning user; omit for the shared scope
    #[arg(long, default_value = "")]
    pub user: String,
}

#[derive(Debug, Subcommand, Clone)]
pub enum DeckCmd {
    Add {
        name: String,
        #[command(flatten)]
        user: UserArg,
    },
    /// Print the user's decks, words and best scores as JSON
    List {
        #[command(flatten)]
        user: UserArg,
    },
    Rm {
        name: String,
        #[command(flatten)]
        user: UserArg,
    },
}
