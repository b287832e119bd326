use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "arc-wiki-to-json")]
#[command(version, about = "Scrape ARC Raiders wiki data into JSON fixtures")]
pub struct Cli {
    /// Directory the JSON outputs are written to
    #[arg(long, global = true, default_value = "data")]
    pub data_dir: PathBuf,

    /// Frontend static directory to publish outputs into
    #[arg(long, global = true)]
    pub public_dir: Option<PathBuf>,

    /// Delay after each request, in milliseconds
    #[arg(long, global = true, default_value_t = 500)]
    pub delay: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract traders, workshop, and projects in one run
    All,

    /// Extract trader material listings
    Traders,

    /// Extract workshop stations and their levels
    Workshop,

    /// Extract expedition projects
    Projects,

    /// Scrape crafting recipes for workshop items
    Crafting,

    /// Scrape tier-upgrade recipes
    Upgrades,

    /// Download item icons and localize image references
    Icons,

    /// Report which craftable items still lack recipes
    Check {
        /// Also write the report as a markdown checklist
        #[arg(long)]
        checklist: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
