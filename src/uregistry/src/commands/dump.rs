//! Full registry JSON dump

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use uregistry::AssetRegistryState;

use super::write_json;

/// Write the whole state as JSON to `output`, or to `out` when none is given
pub fn dump_registry(
    state: &AssetRegistryState,
    output: Option<&Path>,
    pretty: bool,
    out: &mut impl Write,
) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {:?}", path))?;
            let mut writer = BufWriter::new(file);
            write_json(&mut writer, state, pretty)?;
            writer.flush()?;
            tracing::info!("Wrote {}", path.display());
        }
        None => write_json(out, state, pretty)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixture;

    #[test]
    fn test_dump_to_writer() {
        let state = fixture::state();
        let text = fixture::output(|out| dump_registry(&state, None, false, out));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["assets"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["packages"][0]["imported_classes"][0], "Texture2D");
    }

    #[test]
    fn test_dump_to_file() {
        let state = fixture::state();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");

        let text = fixture::output(|out| dump_registry(&state, Some(&path), true, out));
        assert!(text.is_empty());

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \"header\""));
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["depends"].as_array().map(Vec::len), Some(2));
    }
}
