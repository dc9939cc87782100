//! CLI argument definitions for uregistry

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "uregistry")]
#[command(about = "Unreal Engine asset registry inspector with JSON output")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// UE4 object version of the registry's packages (overrides config)
    #[arg(long, global = true, env = "UREGISTRY_UE4_VERSION")]
    pub ue4_version: Option<i32>,

    /// UE5 object version of the registry's packages, 0 for UE4 (overrides config)
    #[arg(long, global = true, env = "UREGISTRY_UE5_VERSION")]
    pub ue5_version: Option<i32>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Show registry version, record counts and the most common asset classes
    Info {
        /// Path to AssetRegistry.bin
        file: PathBuf,
        /// Number of asset classes to show
        #[arg(short, long, default_value = "10")]
        top: usize,
    },
    /// List asset object paths
    Assets {
        /// Path to AssetRegistry.bin
        file: PathBuf,
        /// Only assets of this class (e.g. "Texture2D")
        #[arg(short, long)]
        class: Option<String>,
        /// Print full records as JSON instead of paths
        #[arg(long)]
        json: bool,
    },
    /// Show dependencies and referencers of a package
    Deps {
        /// Path to AssetRegistry.bin
        file: PathBuf,
        /// Package name (e.g. "/Game/Weapons/T_Gun")
        package: String,
    },
    /// List package records
    Packages {
        /// Path to AssetRegistry.bin
        file: PathBuf,
        /// Filter package names containing this string (case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Dump the whole registry as JSON
    Dump {
        /// Path to AssetRegistry.bin
        file: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the current configuration
    Show,
    /// Update configuration values
    Set {
        /// Default UE4 object version
        #[arg(long)]
        ue4_version: Option<i32>,
        /// Default UE5 object version
        #[arg(long)]
        ue5_version: Option<i32>,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: Option<bool>,
    },
}
