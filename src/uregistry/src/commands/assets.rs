//! Asset listing

use anyhow::Result;
use std::io::Write;

use uregistry::AssetRegistryState;

use super::write_json;

/// List assets, optionally restricted to one class
///
/// Plain output is one object path per line; `json` writes the full records.
pub fn list_assets(
    state: &AssetRegistryState,
    class: Option<&str>,
    json: bool,
    pretty: bool,
    out: &mut impl Write,
) -> Result<()> {
    let assets = match class {
        Some(class) => state.by_asset_class(class),
        None => state.assets().to_vec(),
    };

    if json {
        return write_json(out, &assets, pretty);
    }

    for asset in &assets {
        writeln!(out, "{}", asset.object_path())?;
    }
    tracing::info!("{} assets", assets.len());
    Ok(())
}
