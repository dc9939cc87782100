//! Soft object paths and their resolution
//!
//! A soft object path names an export by string instead of holding it. It is
//! resolved on demand through the provider of the package it was read from:
//!
//! 1. `/Game/Foo.Bar` splits into package `/Game/Foo` and leading segment `Bar`
//! 2. The sub path (`Baz.Qux`) adds one segment per non-empty `.` component
//! 3. The first segment is a top-level export, each following one is owned by
//!    the previous
//!
//! Every entry point runs the same plan and walk. They only differ in how the
//! package is loaded (blocking or async) and in whether a missing object is an
//! error (`load*`) or `None` (`try_load*`).

use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{Read, Seek};
use std::sync::{Arc, Weak};

use crate::archive::{
    Archive, VER_UE4_ADDED_SOFT_OBJECT_PATH, VER_UE5_FSOFTOBJECTPATH_REMOVE_ASSET_PATH_FNAMES,
};
use crate::name::{read_name, Name, TopLevelAssetPath};
use crate::provider::{Export, Package, PackageProvider};
use crate::{Error, Result};

/// Deferred reference to an export in some package
#[derive(Clone, Serialize)]
pub struct SoftObjectPath {
    asset_path_name: Name,
    sub_path_string: String,
    /// Package this path was read from; never keeps it alive
    #[serde(skip)]
    owner: Option<Weak<dyn Package>>,
}

/// Package path plus the export segments to walk
#[derive(Debug, PartialEq, Eq)]
struct Plan<'a> {
    package_path: &'a str,
    segments: Vec<&'a str>,
}

impl SoftObjectPath {
    /// Path with no owner; resolve it with [`SoftObjectPath::load_with`]
    pub fn new(asset_path_name: impl Into<Name>, sub_path_string: impl Into<String>) -> Self {
        Self {
            asset_path_name: asset_path_name.into(),
            sub_path_string: sub_path_string.into(),
            owner: None,
        }
    }

    pub fn with_owner(
        asset_path_name: impl Into<Name>,
        sub_path_string: impl Into<String>,
        owner: &Arc<dyn Package>,
    ) -> Self {
        Self {
            owner: Some(Arc::downgrade(owner)),
            ..Self::new(asset_path_name, sub_path_string)
        }
    }

    /// Read a path serialized inside a package
    ///
    /// Packages older than UE4 object version 514 store a short string form
    /// that is rejected.
    pub fn read<R: Read + Seek>(
        ar: &mut Archive<R>,
        names: &[String],
        owner: Option<&Arc<dyn Package>>,
    ) -> Result<Self> {
        let version = ar.version();
        if version.ue4 < VER_UE4_ADDED_SOFT_OBJECT_PATH {
            let path = ar.read_fstring()?;
            return Err(Error::UnsupportedPathForm(path));
        }

        let asset_path_name = if version.ue5 >= VER_UE5_FSOFTOBJECTPATH_REMOVE_ASSET_PATH_FNAMES {
            TopLevelAssetPath::read(ar, names)?.to_name()
        } else {
            read_name(ar, names)?
        };
        let sub_path_string = ar.read_fstring()?;

        Ok(Self {
            asset_path_name,
            sub_path_string,
            owner: owner.map(Arc::downgrade),
        })
    }

    pub fn asset_path_name(&self) -> &Name {
        &self.asset_path_name
    }

    pub fn sub_path_string(&self) -> &str {
        &self.sub_path_string
    }

    /// Whether the path refers to nothing
    pub fn is_null(&self) -> bool {
        self.asset_path_name.is_none()
    }

    /// Provider of the owning package
    pub fn owner_provider(&self) -> Result<Arc<dyn PackageProvider>> {
        self.owner
            .as_ref()
            .and_then(Weak::upgrade)
            .and_then(|package| package.provider())
            .ok_or(Error::NoProvider)
    }

    fn plan(&self) -> Result<Plan<'_>> {
        if self.is_null() {
            return Err(Error::EmptyPath);
        }

        let text = self.asset_path_name.as_str();
        let mut segments: Vec<&str> = self
            .sub_path_string
            .split('.')
            .filter(|segment| !segment.is_empty())
            .collect();

        let package_path = match text.rsplit_once('.') {
            Some((package, object)) => {
                segments.insert(0, object);
                package
            }
            None => text,
        };

        if segments.is_empty() {
            // Bare package path: the asset named after the package
            let short_name = package_path
                .rsplit_once('/')
                .map_or(package_path, |(_, short)| short);
            segments.push(short_name);
        }

        Ok(Plan {
            package_path,
            segments,
        })
    }

    /// Resolve through `provider`, blocking on the package load
    pub fn load_with(&self, provider: &dyn PackageProvider) -> Result<Export> {
        let plan = self.plan()?;
        let package = provider.load_package(plan.package_path)?;
        walk(package.as_ref(), &plan.segments)
    }

    /// Resolve through `provider` without blocking on the package load
    pub async fn load_with_async(&self, provider: &dyn PackageProvider) -> Result<Export> {
        let plan = self.plan()?;
        let package = provider.load_package_async(plan.package_path).await?;
        walk(package.as_ref(), &plan.segments)
    }

    pub fn try_load_with(&self, provider: &dyn PackageProvider) -> Result<Option<Export>> {
        lenient(self.load_with(provider))
    }

    pub async fn try_load_with_async(
        &self,
        provider: &dyn PackageProvider,
    ) -> Result<Option<Export>> {
        lenient(self.load_with_async(provider).await)
    }

    /// Resolve through the owner's provider
    pub fn load(&self) -> Result<Export> {
        self.load_with(self.owner_provider()?.as_ref())
    }

    /// [`SoftObjectPath::load`], with missing objects as `None`
    ///
    /// Package load failures still surface as errors.
    pub fn try_load(&self) -> Result<Option<Export>> {
        lenient(self.load())
    }

    pub async fn load_async(&self) -> Result<Export> {
        let provider = self.owner_provider()?;
        self.load_with_async(provider.as_ref()).await
    }

    pub async fn try_load_async(&self) -> Result<Option<Export>> {
        lenient(self.load_async().await)
    }

    pub fn load_as<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.load()?.downcast_or_err()
    }

    pub fn try_load_as<T: Any + Send + Sync>(&self) -> Result<Option<Arc<T>>> {
        lenient(self.load_as())
    }

    pub async fn load_as_async<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.load_async().await?.downcast_or_err()
    }

    pub async fn try_load_as_async<T: Any + Send + Sync>(&self) -> Result<Option<Arc<T>>> {
        lenient(self.load_as_async().await)
    }
}

fn walk(package: &dyn Package, segments: &[&str]) -> Result<Export> {
    let (first, rest) = segments.split_first().ok_or(Error::EmptyPath)?;

    let mut outer = package
        .export(first)
        .ok_or_else(|| Error::ExportNotFound {
            name: first.to_string(),
            package: package.name().to_string(),
        })?;

    for segment in rest {
        outer = package
            .export_owned_by(segment, &outer)
            .ok_or_else(|| Error::SubobjectNotFound {
                name: segment.to_string(),
                outer: outer.name().to_string(),
            })?;
    }

    Ok(outer)
}

fn lenient<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_resolution_failure() => {
            tracing::debug!(error = %err, "soft object path did not resolve");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

impl PartialEq for SoftObjectPath {
    fn eq(&self, other: &Self) -> bool {
        self.asset_path_name == other.asset_path_name
            && self.sub_path_string == other.sub_path_string
    }
}

impl Eq for SoftObjectPath {}

impl Hash for SoftObjectPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.asset_path_name.hash(state);
        self.sub_path_string.hash(state);
    }
}

impl fmt::Display for SoftObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sub_path_string.is_empty() {
            if self.is_null() {
                Ok(())
            } else {
                write!(f, "{}", self.asset_path_name)
            }
        } else {
            write!(f, "{}:{}", self.asset_path_name, self.sub_path_string)
        }
    }
}

impl fmt::Debug for SoftObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftObjectPath")
            .field("asset_path_name", &self.asset_path_name)
            .field("sub_path_string", &self.sub_path_string)
            .field(
                "owner",
                &self.owner.as_ref().and_then(Weak::upgrade).map(|p| p.name().to_string()),
            )
            .finish()
    }
}
