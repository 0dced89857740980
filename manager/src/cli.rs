use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "optiscaler-manager")]
#[command(version, about = "Find installed games and manage OptiScaler settings")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// App config file (defaults to the data directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the configured log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan storefronts and custom paths for games
    Scan {
        /// Only scan this storefront
        #[arg(short, long)]
        platform: Option<String>,
        /// Don't update the saved game list
        #[arg(long)]
        no_save: bool,
    },

    /// Check a folder as a manually added game
    Verify { dir: PathBuf },

    /// Show the saved game list
    List,

    /// Re-check mod status for every saved game
    Refresh,

    /// Read or edit an OptiScaler.ini
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    Show {
        ini: PathBuf,
    },

    /// Write a file with every default value
    Init {
        ini: PathBuf,
        #[arg(long)]
        force: bool,
    },

    Set {
        ini: PathBuf,
        /// Upscaler token for all APIs (auto, dlss, xess, fsr21, fsr22, fsr31)
        #[arg(long)]
        upscaler: Option<String>,
        #[arg(long, value_enum)]
        frame_gen: Option<Toggle>,
        #[arg(long, value_enum)]
        overlay: Option<Toggle>,
        /// Enables the sharpness override at this strength
        #[arg(long)]
        sharpness: Option<f32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        matches!(self, Toggle::On)
    }
}
