//! Package record listing

use anyhow::Result;
use std::io::Write;

use uregistry::AssetRegistryState;

pub fn list_packages(
    state: &AssetRegistryState,
    filter: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let filter = filter.map(str::to_lowercase);

    let mut shown = 0;
    for package in state.packages() {
        if let Some(ref needle) = filter {
            if !package.package_name.as_str().to_lowercase().contains(needle) {
                continue;
            }
        }

        let version = package
            .file_version
            .map(|v| format!("{}/{}", v.ue4, v.ue5))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:>12}  {:<9}  {:>3} imports  {}",
            package.disk_size,
            version,
            package.imported_classes.len(),
            package.package_name
        )?;
        shown += 1;
    }

    tracing::info!("{} of {} packages", shown, state.packages().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixture;

    #[test]
    fn test_list_packages() {
        let state = fixture::state();
        let text = fixture::output(|out| list_packages(&state, None, out));
        assert_eq!(
            text,
            "        4096  522/1012     1 imports  /Game/Weapons/T_Gun\n"
        );
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let state = fixture::state();
        let text = fixture::output(|out| list_packages(&state, Some("t_GUN"), out));
        assert!(text.contains("/Game/Weapons/T_Gun"));

        let text = fixture::output(|out| list_packages(&state, Some("mesh"), out));
        assert!(text.is_empty());
    }
}
