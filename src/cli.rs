use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::sort_policy::SortMode;

pub const DEFAULT_WIDTH: usize = 48;

#[derive(Debug, Parser)]
#[command(name = "chatlist", about = "Chat list ordering with pinned chats and sort modes")]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Load a snapshot, replay its events and print the ordered chat list
    Show {
        /// Snapshot file with conversations and events
        snapshot: PathBuf,

        /// Sort mode for this run only (default: the persisted one)
        #[arg(long, value_enum)]
        mode: Option<SortModeArg>,

        /// Width of the rendered list in terminal columns
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: usize,
    },
    /// Print the persisted sort mode, or change it
    SortMode {
        /// New sort mode to persist
        #[arg(value_enum)]
        mode: Option<SortModeArg>,

        /// Snapshot to print re-sorted under the new mode
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortModeArg {
    Recency,
    UnreadFirst,
}

impl From<SortModeArg> for SortMode {
    fn from(arg: SortModeArg) -> Self {
        match arg {
            SortModeArg::Recency => SortMode::Recency,
            SortModeArg::UnreadFirst => SortMode::UnreadFirst,
        }
    }
}
