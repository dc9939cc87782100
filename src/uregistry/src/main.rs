//! uregistry - Unreal Engine asset registry inspector

use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod config;

use cli::{Args, Commands, ConfigCommand};
use config::Config;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "uregistry=debug"
    } else {
        "uregistry=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let mut config = Config::load()?;
    let version = config.package_version(args.ue4_version, args.ue5_version);
    let pretty = config.pretty;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Commands::Info { file, top } => {
            let state = commands::load_registry(&file, version)?;
            commands::show_info(&state, top, &mut out)?;
        }
        Commands::Assets { file, class, json } => {
            let state = commands::load_registry(&file, version)?;
            commands::list_assets(&state, class.as_deref(), json, pretty, &mut out)?;
        }
        Commands::Deps { file, package } => {
            let state = commands::load_registry(&file, version)?;
            commands::show_dependencies(&state, &package, &mut out)?;
        }
        Commands::Packages { file, filter } => {
            let state = commands::load_registry(&file, version)?;
            commands::list_packages(&state, filter.as_deref(), &mut out)?;
        }
        Commands::Dump { file, output } => {
            let state = commands::load_registry(&file, version)?;
            commands::dump_registry(&state, output.as_deref(), pretty, &mut out)?;
        }
        Commands::Config { command } => {
            let path = Config::config_path()?;
            match command {
                ConfigCommand::Show => commands::show_config(&config, &path, &mut out)?,
                ConfigCommand::Set {
                    ue4_version,
                    ue5_version,
                    pretty,
                } => commands::set_config(&mut config, &path, ue4_version, ue5_version, pretty)?,
            }
        }
    }

    out.flush()?;
    Ok(())
}
