//! `config show` and `config set`

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::config::Config;

pub fn show_config(config: &Config, path: &Path, out: &mut impl Write) -> Result<()> {
    writeln!(out, "# {}", path.display())?;
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    write!(out, "{}", contents)?;
    Ok(())
}

/// Apply the given values and save; unset arguments leave fields unchanged
pub fn set_config(
    config: &mut Config,
    path: &Path,
    ue4_version: Option<i32>,
    ue5_version: Option<i32>,
    pretty: Option<bool>,
) -> Result<()> {
    if ue4_version.is_none() && ue5_version.is_none() && pretty.is_none() {
        anyhow::bail!("Nothing to set; pass --ue4-version, --ue5-version or --pretty");
    }

    if let Some(v) = ue4_version {
        config.ue4_version = Some(v);
    }
    if let Some(v) = ue5_version {
        config.ue5_version = Some(v);
    }
    if let Some(v) = pretty {
        config.pretty = v;
    }

    config.save_to(path)?;
    tracing::info!("Saved {}", path.display());
    Ok(())
}
