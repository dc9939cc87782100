//! Dependency graph lookup for one package

use anyhow::{Context, Result};
use std::io::Write;

use uregistry::AssetRegistryState;

pub fn show_dependencies(
    state: &AssetRegistryState,
    package: &str,
    out: &mut impl Write,
) -> Result<()> {
    let graph = state.depends_graph();
    let node = graph
        .find(package)
        .with_context(|| format!("Package not found in dependency graph: {}", package))?;

    writeln!(out, "{}", node.identifier)?;

    writeln!(out, "Dependencies:")?;
    for (dep, flags) in graph.dependencies(node.index) {
        writeln!(out, "  {} [{}]", dep.identifier, flags)?;
    }

    if !node.name_dependencies.is_empty() {
        writeln!(out, "Name dependencies:")?;
        for dep in graph.name_dependencies(node.index) {
            writeln!(out, "  {}", dep.identifier)?;
        }
    }

    if !node.manage_dependencies.is_empty() {
        writeln!(out, "Manage dependencies:")?;
        for (dep, flags) in graph.manage_dependencies(node.index) {
            writeln!(out, "  {} [{}]", dep.identifier, flags)?;
        }
    }

    writeln!(out, "Referencers:")?;
    for referencer in graph.referencers(node.index) {
        writeln!(out, "  {}", referencer.identifier)?;
    }
    Ok(())
}
