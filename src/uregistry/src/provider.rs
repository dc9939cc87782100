//! Package provider seam
//!
//! Loading packages is not this crate's job. Object paths resolve through
//! these traits, implemented by whatever owns the game files.

use async_trait::async_trait;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::{Error, Result};

/// Handle to an object inside a loaded package
///
/// Cloning is cheap and keeps the same object identity.
#[derive(Clone)]
pub struct Export {
    name: String,
    object: Arc<dyn Any + Send + Sync>,
}

impl Export {
    pub fn new<T: Any + Send + Sync>(name: impl Into<String>, object: T) -> Self {
        Self::from_arc(name, Arc::new(object))
    }

    pub fn from_arc(name: impl Into<String>, object: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            name: name.into(),
            object,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The object as `T`, if that is its concrete type
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.object).downcast::<T>().ok()
    }

    /// Strict form of [`Export::downcast`]
    pub fn downcast_or_err<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.downcast().ok_or_else(|| Error::WrongExportType {
            name: self.name.clone(),
            expected: type_name::<T>(),
        })
    }

    pub fn is<T: Any>(&self) -> bool {
        self.object.is::<T>()
    }

    /// Whether both handles point at the same object
    pub fn ptr_eq(&self, other: &Export) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.object), Arc::as_ptr(&other.object))
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Export").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A loaded package
pub trait Package: Send + Sync {
    /// Package path, e.g. `/Game/Weapons/T_Gun`
    fn name(&self) -> &str;

    /// Provider that loaded this package, if it is still reachable
    fn provider(&self) -> Option<Arc<dyn PackageProvider>>;

    /// Top-level export by name
    fn export(&self, name: &str) -> Option<Export>;

    /// Export named `name` whose outer is `outer`
    fn export_owned_by(&self, name: &str, outer: &Export) -> Option<Export>;
}

/// Turns package paths into loaded packages
///
/// Concurrent use is allowed by the `Sync` bound; whether loads actually run
/// in parallel is up to the implementation.
#[async_trait]
pub trait PackageProvider: Send + Sync {
    /// Load a package, blocking the calling thread for any I/O
    fn load_package(&self, path: &str) -> Result<Arc<dyn Package>>;

    /// Load a package without blocking the caller
    ///
    /// Defaults to [`PackageProvider::load_package`]. Providers with real
    /// async I/O should override this.
    async fn load_package_async(&self, path: &str) -> Result<Arc<dyn Package>> {
        self.load_package(path)
    }
}
