use clap::{Args, Parser, Subcommand};
use mirrorboard_core::{BoardReference, CardConfig};
use std::path::PathBuf;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")");

#[derive(Parser)]
#[command(name = "mirrorboard")]
#[command(about = "Mirror a kanban board published through a home-automation state feed", long_about = None)]
#[command(version = VERSION)]
pub struct Cli {
    /// Path to the config file (or set MIRRORBOARD_CONFIG env var)
    #[arg(long, global = true, value_name = "FILE", env = "MIRRORBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the configured board
    Show {
        #[command(flatten)]
        states: StatesArgs,
        #[command(flatten)]
        reference: ReferenceArgs,
        /// Print the board as JSON
        #[arg(long)]
        json: bool,
    },
    /// List entities that publish a board
    Entities {
        #[command(flatten)]
        states: StatesArgs,
        #[arg(long)]
        json: bool,
    },
    /// Print the board again whenever it meaningfully changes
    Watch {
        #[command(flatten)]
        states: StatesArgs,
        #[command(flatten)]
        reference: ReferenceArgs,
    },
    /// Show or change the saved board selection
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Select a board and save the configuration
    Set(ReferenceArgs),
}

#[derive(Args)]
pub struct StatesArgs {
    /// JSON state map published by the home-automation host (or set MIRRORBOARD_STATES)
    #[arg(long, value_name = "FILE", env = "MIRRORBOARD_STATES")]
    pub states: PathBuf,
}

#[derive(Args, Default)]
pub struct ReferenceArgs {
    /// Board entity, e.g. sensor.trello_board_roadmap
    #[arg(long, conflicts_with = "board_id")]
    pub entity_id: Option<String>,
    /// Raw board id (older configurations)
    #[arg(long)]
    pub board_id: Option<String>,
}

impl ReferenceArgs {
    /// Applies the flags on top of `card` the way the config editor does.
    pub fn apply_to(&self, card: &mut CardConfig) {
        if let Some(entity_id) = &self.entity_id {
            card.set_entity_id(Some(entity_id.clone()));
        }
        if let Some(board_id) = &self.board_id {
            card.set_board_id(Some(board_id.clone()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entity_id.is_none() && self.board_id.is_none()
    }

    /// The reference to display: flags first, then the saved selection.
    pub fn resolve(&self, saved: &CardConfig) -> Option<BoardReference> {
        let mut card = saved.clone();
        self.apply_to(&mut card);
        card.reference()
    }
}
