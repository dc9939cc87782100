//! CLI subcommand implementations

mod assets;
mod config;
mod deps;
mod dump;
mod info;
mod packages;

pub use assets::list_assets;
pub use config::{set_config, show_config};
pub use deps::show_dependencies;
pub use dump::dump_registry;
pub use info::show_info;
pub use packages::list_packages;

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use uregistry::{AssetRegistryState, PackageFileVersion};

/// Load a registry file, attaching the path to any error
pub fn load_registry(path: &Path, version: PackageFileVersion) -> Result<AssetRegistryState> {
    let state = AssetRegistryState::open_with_version(path, version)
        .with_context(|| format!("Failed to read asset registry {:?}", path))?;

    tracing::debug!(
        version = %state.header().version,
        assets = state.assets().len(),
        nodes = state.depends_graph().len(),
        packages = state.packages().len(),
        "loaded {}",
        path.display()
    );
    Ok(state)
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixture {
    //! Small latest-version registry shared by the command tests

    use byteorder::{LittleEndian as LE, WriteBytesExt};
    use std::io::Write;

    const NAMES: [&str; 9] = [
        "None",
        "/Game/Weapons",
        "/Script/Engine",
        "Texture2D",
        "StaticMesh",
        "/Game/Weapons/T_Gun",
        "T_Gun",
        "/Game/Weapons/SM_Gun",
        "SM_Gun",
    ];

    fn name(buf: &mut Vec<u8>, index: u32) {
        buf.write_u32::<LE>(index).unwrap();
        buf.write_u32::<LE>(0).unwrap();
    }

    fn asset(buf: &mut Vec<u8>, class: u32, package: u32, asset: u32) {
        name(buf, 1);
        name(buf, 2);
        name(buf, class);
        name(buf, package);
        name(buf, asset);
        buf.write_u64::<LE>(0).unwrap();
        buf.write_i32::<LE>(0).unwrap();
        buf.write_u32::<LE>(0).unwrap();
    }

    fn node(buf: &mut Vec<u8>, package: u32, dep: i32, flags: u32) {
        buf.write_u8(1).unwrap();
        name(buf, package);
        buf.write_i32::<LE>(1).unwrap();
        buf.write_i32::<LE>(dep).unwrap();
        buf.write_u32::<LE>(flags).unwrap();
        buf.write_i32::<LE>(0).unwrap();
        buf.write_i32::<LE>(0).unwrap();
        buf.write_i32::<LE>(1).unwrap();
        buf.write_i32::<LE>(dep).unwrap();
    }

    /// Two assets, a two-node dependency cycle and one package record
    pub fn registry_bytes() -> Vec<u8> {
        let mut buf = Vec::new();
        for word in [0x717F9EE7u32, 0xE9B0493A, 0x88B49132, 0x1B2EB1F4] {
            buf.write_u32::<LE>(word).unwrap();
        }
        buf.write_i32::<LE>(19).unwrap();
        buf.write_u32::<LE>(0).unwrap();

        buf.write_i32::<LE>(NAMES.len() as i32).unwrap();
        let string_bytes: usize = NAMES.iter().map(|n| n.len()).sum();
        buf.write_u32::<LE>(string_bytes as u32).unwrap();
        buf.write_u64::<LE>(0).unwrap();
        for _ in NAMES {
            buf.write_u64::<LE>(0).unwrap();
        }
        for n in NAMES {
            buf.write_u8(0).unwrap();
            buf.write_u8(n.len() as u8).unwrap();
        }
        for n in NAMES {
            buf.write_all(n.as_bytes()).unwrap();
        }

        buf.write_u32::<LE>(0x12345679).unwrap();
        for _ in 0..11 {
            buf.write_i32::<LE>(0).unwrap();
        }
        buf.write_u32::<LE>(0).unwrap();
        buf.write_u32::<LE>(0x87654321).unwrap();

        buf.write_i32::<LE>(2).unwrap();
        asset(&mut buf, 3, 5, 6);
        asset(&mut buf, 4, 7, 8);

        let mut section = Vec::new();
        section.write_i32::<LE>(2).unwrap();
        node(&mut section, 5, 1, 0b111);
        node(&mut section, 7, 0, 0b010);
        buf.write_i64::<LE>(section.len() as i64).unwrap();
        buf.extend_from_slice(&section);

        buf.write_i32::<LE>(1).unwrap();
        name(&mut buf, 5);
        buf.write_i64::<LE>(4096).unwrap();
        buf.write_all(&[0; 16]).unwrap();
        buf.write_u32::<LE>(0).unwrap();
        buf.write_i32::<LE>(0).unwrap();
        buf.write_i32::<LE>(522).unwrap();
        buf.write_i32::<LE>(1012).unwrap();
        buf.write_i32::<LE>(0).unwrap();
        buf.write_u32::<LE>(0).unwrap();
        buf.write_i32::<LE>(0).unwrap();
        buf.write_i32::<LE>(1).unwrap();
        name(&mut buf, 3);
        buf.write_u8(0).unwrap();
        buf.write_u8(0).unwrap();
        buf
    }

    pub fn state() -> uregistry::AssetRegistryState {
        uregistry::AssetRegistryState::from_bytes(&registry_bytes()).unwrap()
    }

    pub fn output(run: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> String {
        let mut out = Vec::new();
        run(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }
}
