use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mfm",
    about = "Manifest merger: combine a main manifest with its libraries and overlays",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OnConflict {
    /// Stop at the first conflicting element
    Abort,
    /// Skip the conflicting element and keep merging
    Skip,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge manifests in priority order
    Merge(MergeArgs),
    /// List the known element kinds and how they merge
    Kinds,
}

#[derive(Args, Clone, Debug, Default)]
pub struct MergeArgs {
    /// Main manifest (JSON document form)
    #[arg(long)]
    pub main: PathBuf,
    /// Library manifest; earlier libraries take precedence
    #[arg(long = "library")]
    pub libraries: Vec<PathBuf>,
    /// Flavor or build-type overlay; earlier overlays take precedence
    #[arg(long = "overlay")]
    pub overlays: Vec<PathBuf>,
    /// TOML merger configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// System property override, e.g. `version_code=42`
    #[arg(long = "set", value_name = "PROPERTY=VALUE")]
    pub overrides: Vec<String>,
    #[arg(long)]
    pub on_conflict: Option<OnConflict>,
    /// Write the merged manifest here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Print the merging decision tree
    #[arg(long)]
    pub log: bool,
    /// Print file names instead of full paths
    #[arg(long)]
    pub simple_filenames: bool,
}
