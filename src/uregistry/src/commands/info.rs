//! Registry summary

use anyhow::Result;
use std::io::Write;

use uregistry::AssetRegistryState;

/// Print version, record counts and the `top` most common asset classes
pub fn show_info(state: &AssetRegistryState, top: usize, out: &mut impl Write) -> Result<()> {
    let header = state.header();
    writeln!(out, "Version: {}", header.version)?;

    if state.is_unsupported() {
        writeln!(out, "Registry predates persisted asset registry state; no records")?;
        return Ok(());
    }

    writeln!(out, "Editor-only data filtered: {}", header.filter_editor_only_data)?;
    writeln!(out, "Assets: {}", state.assets().len())?;
    writeln!(out, "Depends nodes: {}", state.depends_graph().len())?;
    writeln!(out, "Packages: {}", state.packages().len())?;

    let mut classes: Vec<_> = state.asset_class_counts().into_iter().collect();
    if classes.is_empty() {
        return Ok(());
    }
    // Most common first, ties by name
    classes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    writeln!(out)?;
    writeln!(out, "Top asset classes:")?;
    for (class, count) in classes.into_iter().take(top) {
        writeln!(out, "  {:>6}  {}", count, class)?;
    }
    Ok(())
}
