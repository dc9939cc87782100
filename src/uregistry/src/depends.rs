//! Dependency graph
//!
//! Nodes live in a flat arena and every edge is an index into it. The node
//! count is written before any edge data, so the arena is filled with empty
//! placeholders first and edge lists are attached afterwards. Forward
//! references, self references and cycles need no special handling.
//!
//! Two edge layouts exist:
//!
//! - Before `AddedDependencyFlags`: one list per dependency kind, flags are
//!   implied by which list an index appears in
//! - From `AddedDependencyFlags`: one list per category followed by packed
//!   per-edge flag bits

use bitflags::bitflags;
use serde::Serialize;
use std::fmt;
use std::io::{Read, Seek};

use crate::name::Name;
use crate::reader::RegistryReader;
use crate::version::RegistryVersion;
use crate::{Error, Result};

bitflags! {
    /// Properties of a package dependency edge
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct DependencyFlags: u8 {
        /// Required at load time rather than on demand
        const HARD = 1 << 0;
        /// Needed in game builds, not only in the editor
        const GAME = 1 << 1;
        /// Needed when cooking
        const BUILD = 1 << 2;
    }
}

bitflags! {
    /// Properties of a manage dependency edge
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct ManageFlags: u8 {
        /// Managed directly rather than through another managed asset
        const DIRECT = 1 << 0;
    }
}

impl fmt::Display for DependencyFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "NONE");
        }
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ManageFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "NONE");
        }
        write!(f, "{}", self.0)
    }
}

const PACKAGE_FLAG_WIDTH: usize = 3;
const MANAGE_FLAG_WIDTH: usize = 1;

/// Edge to another node in the same graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Edge<F> {
    pub node: usize,
    pub flags: F,
}

/// What a depends node stands for: a package, a primary asset id, or a
/// searchable name inside a package
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AssetIdentifier {
    pub package_name: Option<Name>,
    pub primary_asset_type: Option<Name>,
    pub object_name: Option<Name>,
    pub value_name: Option<Name>,
}

impl AssetIdentifier {
    pub fn read<R: Read + Seek>(ar: &mut RegistryReader<'_, R>) -> Result<Self> {
        let field_bits = ar.read_u8()?;

        Ok(Self {
            package_name: read_field(ar, field_bits, 0)?,
            primary_asset_type: read_field(ar, field_bits, 1)?,
            object_name: read_field(ar, field_bits, 2)?,
            value_name: read_field(ar, field_bits, 3)?,
        })
    }

    pub fn is_package(&self) -> bool {
        self.package_name.is_some()
            && self.primary_asset_type.is_none()
            && self.object_name.is_none()
            && self.value_name.is_none()
    }
}

fn read_field<R: Read + Seek>(
    ar: &mut RegistryReader<'_, R>,
    field_bits: u8,
    bit: u8,
) -> Result<Option<Name>> {
    if field_bits & (1 << bit) != 0 {
        ar.read_name().map(Some)
    } else {
        Ok(None)
    }
}

impl fmt::Display for AssetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kind) = &self.primary_asset_type {
            write!(f, "{}:", kind)?;
        }
        if let Some(package) = &self.package_name {
            write!(f, "{}", package)?;
        }
        if let Some(object) = &self.object_name {
            write!(f, ".{}", object)?;
        }
        if let Some(value) = &self.value_name {
            write!(f, "::{}", value)?;
        }
        Ok(())
    }
}

/// One node of the dependency graph; `index` is its identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependsNode {
    pub index: usize,
    pub identifier: AssetIdentifier,
    pub package_dependencies: Vec<Edge<DependencyFlags>>,
    pub name_dependencies: Vec<usize>,
    pub manage_dependencies: Vec<Edge<ManageFlags>>,
    pub referencers: Vec<usize>,
}

impl DependsNode {
    fn placeholder(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }
}

/// Arena of depends nodes addressed by index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependsGraph {
    nodes: Vec<DependsNode>,
}

impl DependsGraph {
    /// `count` empty nodes, indexed `0..count`
    pub fn with_placeholders(count: usize) -> Self {
        Self {
            nodes: (0..count).map(DependsNode::placeholder).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependsNode> + '_ {
        self.nodes.iter()
    }

    pub fn node(&self, index: usize) -> Option<&DependsNode> {
        self.nodes.get(index)
    }

    /// First node identifying the package `package_name`
    pub fn find(&self, package_name: &str) -> Option<&DependsNode> {
        self.nodes.iter().find(|node| {
            node.identifier.is_package()
                && node
                    .identifier
                    .package_name
                    .as_ref()
                    .is_some_and(|name| name == package_name)
        })
    }

    pub fn dependencies(
        &self,
        index: usize,
    ) -> impl Iterator<Item = (&DependsNode, DependencyFlags)> + '_ {
        self.node(index)
            .into_iter()
            .flat_map(|node| node.package_dependencies.iter())
            .filter_map(|edge| Some((self.node(edge.node)?, edge.flags)))
    }

    pub fn name_dependencies(&self, index: usize) -> impl Iterator<Item = &DependsNode> + '_ {
        self.node(index)
            .into_iter()
            .flat_map(|node| node.name_dependencies.iter())
            .filter_map(|&i| self.node(i))
    }

    pub fn manage_dependencies(
        &self,
        index: usize,
    ) -> impl Iterator<Item = (&DependsNode, ManageFlags)> + '_ {
        self.node(index)
            .into_iter()
            .flat_map(|node| node.manage_dependencies.iter())
            .filter_map(|edge| Some((self.node(edge.node)?, edge.flags)))
    }

    pub fn referencers(&self, index: usize) -> impl Iterator<Item = &DependsNode> + '_ {
        self.node(index)
            .into_iter()
            .flat_map(|node| node.referencers.iter())
            .filter_map(|&i| self.node(i))
    }

    /// Attach edges using the per-kind list layout
    pub(crate) fn load_before_flags<R: Read + Seek>(
        &mut self,
        ar: &mut RegistryReader<'_, R>,
    ) -> Result<()> {
        let count = self.nodes.len();
        let with_hard_manage = ar.version() >= RegistryVersion::AddedHardManage;

        for node in self.nodes.iter_mut() {
            node.identifier = AssetIdentifier::read(ar)?;

            let hard = ar.read_count()?;
            let soft = ar.read_count()?;
            let names = ar.read_count()?;
            let soft_manage = ar.read_count()?;
            let hard_manage = if with_hard_manage {
                ar.read_count()?
            } else {
                0
            };
            let referencers = ar.read_count()?;

            let hard = read_indices(ar, hard, count)?;
            let soft = read_indices(ar, soft, count)?;
            node.name_dependencies = read_indices(ar, names, count)?;
            let soft_manage = read_indices(ar, soft_manage, count)?;
            let hard_manage = read_indices(ar, hard_manage, count)?;
            node.referencers = read_indices(ar, referencers, count)?;

            let hard_flags = DependencyFlags::HARD | DependencyFlags::GAME | DependencyFlags::BUILD;
            let soft_flags = DependencyFlags::GAME | DependencyFlags::BUILD;
            node.package_dependencies = edges(hard, hard_flags)
                .chain(edges(soft, soft_flags))
                .collect();
            node.manage_dependencies = edges(soft_manage, ManageFlags::empty())
                .chain(edges(hard_manage, ManageFlags::DIRECT))
                .collect();
        }
        Ok(())
    }

    /// Attach edges using the flagged layout
    pub(crate) fn load<R: Read + Seek>(&mut self, ar: &mut RegistryReader<'_, R>) -> Result<()> {
        let count = self.nodes.len();

        for node in self.nodes.iter_mut() {
            node.identifier = AssetIdentifier::read(ar)?;

            let (indices, bits) = read_flagged(ar, count, PACKAGE_FLAG_WIDTH)?;
            node.package_dependencies = indices
                .into_iter()
                .zip(bits)
                .map(|(target, bits)| Edge {
                    node: target,
                    flags: DependencyFlags::from_bits_truncate(bits),
                })
                .collect();

            let len = ar.read_count()?;
            node.name_dependencies = read_indices(ar, len, count)?;

            let (indices, bits) = read_flagged(ar, count, MANAGE_FLAG_WIDTH)?;
            node.manage_dependencies = indices
                .into_iter()
                .zip(bits)
                .map(|(target, bits)| Edge {
                    node: target,
                    flags: ManageFlags::from_bits_truncate(bits),
                })
                .collect();

            let len = ar.read_count()?;
            node.referencers = read_indices(ar, len, count)?;
        }
        Ok(())
    }
}

fn edges<F: Copy>(indices: Vec<usize>, flags: F) -> impl Iterator<Item = Edge<F>> {
    indices.into_iter().map(move |node| Edge { node, flags })
}

fn read_indices<R: Read + Seek>(
    ar: &mut RegistryReader<'_, R>,
    len: usize,
    count: usize,
) -> Result<Vec<usize>> {
    ar.read_vec(len, |ar| {
        let index = ar.read_i32()?;
        usize::try_from(index)
            .ok()
            .filter(|&i| i < count)
            .ok_or(Error::DependsNodeIndex { index, count })
    })
}

/// Index list followed by `width` packed flag bits per entry
fn read_flagged<R: Read + Seek>(
    ar: &mut RegistryReader<'_, R>,
    count: usize,
    width: usize,
) -> Result<(Vec<usize>, Vec<u8>)> {
    let len = ar.read_count()?;
    let indices = read_indices(ar, len, count)?;

    let word_count = (len * width).div_ceil(32);
    let words = ar.read_vec(word_count, |ar| ar.read_u32())?;

    let bits = (0..len)
        .map(|edge| {
            (0..width).fold(0u8, |acc, bit| {
                let pos = edge * width + bit;
                let set = words[pos / 32] >> (pos % 32) & 1;
                acc | ((set as u8) << bit)
            })
        })
        .collect();

    Ok((indices, bits))
}
