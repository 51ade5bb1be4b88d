//! Where class bytes come from.
//!
//! A [`ClassSource`] maps a binary name to the bytes of its class file. The
//! implementations here cover compiler output directories, jars and jmods,
//! in-memory maps, and an ordered [`Classpath`] chaining any of those.

mod archive;
mod chain;
mod directory;
mod memory;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::archive::{ArchiveKind, ArchiveSource};
pub use crate::chain::Classpath;
pub use crate::directory::DirectorySource;
pub use crate::memory::MemorySource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("class `{name}` not found")]
    NotFound { name: String },
    #[error("failed to read `{name}`: {source}")]
    Io {
        /// The class (or, when enumerating, the entry path) being read.
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    pub fn not_found(name: impl Into<String>) -> Self {
        SourceError::NotFound { name: name.into() }
    }

    pub fn io(name: impl Into<String>, source: std::io::Error) -> Self {
        SourceError::Io {
            name: name.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }
}

/// Read-only access to compiled classes.
///
/// Implementations must tolerate concurrent `fetch` calls; the hierarchy
/// resolver may share one source across threads without locking.
pub trait ClassSource: Send + Sync {
    /// Returns the class-file bytes for `binary_name`, given in dotted or
    /// slash form.
    fn fetch(&self, binary_name: &str) -> Result<Vec<u8>, SourceError>;

    /// Dotted binary names of every class this source can serve, sorted.
    ///
    /// `module-info` and `package-info` pseudo-classes are not listed.
    fn binary_names(&self) -> Result<Vec<String>, SourceError>;
}

impl<S: ClassSource + ?Sized> ClassSource for &S {
    fn fetch(&self, binary_name: &str) -> Result<Vec<u8>, SourceError> {
        (**self).fetch(binary_name)
    }

    fn binary_names(&self) -> Result<Vec<String>, SourceError> {
        (**self).binary_names()
    }
}

impl<S: ClassSource + ?Sized> ClassSource for Box<S> {
    fn fetch(&self, binary_name: &str) -> Result<Vec<u8>, SourceError> {
        (**self).fetch(binary_name)
    }

    fn binary_names(&self) -> Result<Vec<String>, SourceError> {
        (**self).binary_names()
    }
}

impl<S: ClassSource + ?Sized> ClassSource for Arc<S> {
    fn fetch(&self, binary_name: &str) -> Result<Vec<u8>, SourceError> {
        (**self).fetch(binary_name)
    }

    fn binary_names(&self) -> Result<Vec<String>, SourceError> {
        (**self).binary_names()
    }
}

/// One element of a classpath, classified by what lives at its path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClasspathEntry {
    ClassDir(PathBuf),
    Jar(PathBuf),
    Jmod(PathBuf),
}

impl ClasspathEntry {
    /// Directories are class dirs, `*.jmod` files are jmods, and anything
    /// else is assumed to be a jar.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            ClasspathEntry::ClassDir(path)
        } else if path.extension().is_some_and(|ext| ext == "jmod") {
            ClasspathEntry::Jmod(path)
        } else {
            ClasspathEntry::Jar(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::ClassDir(p) | ClasspathEntry::Jar(p) | ClasspathEntry::Jmod(p) => p,
        }
    }

    pub fn into_source(self) -> Box<dyn ClassSource> {
        match self {
            ClasspathEntry::ClassDir(dir) => Box::new(DirectorySource::new(dir)),
            ClasspathEntry::Jar(path) => Box::new(ArchiveSource::jar(path)),
            ClasspathEntry::Jmod(path) => Box::new(ArchiveSource::jmod(path)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClasspathConfig {
    /// Class directories, jars and jmods, searched in order.
    #[serde(default)]
    pub entries: Vec<PathBuf>,
}

impl ClasspathConfig {
    /// Anchors relative entries at `base` (usually the config file's directory).
    pub fn resolve_relative_to(&mut self, base: &Path) {
        for entry in &mut self.entries {
            if entry.is_relative() {
                *entry = base.join(&*entry);
            }
        }
    }

    pub fn to_entries(&self) -> Vec<ClasspathEntry> {
        self.entries
            .iter()
            .cloned()
            .map(ClasspathEntry::from_path)
            .collect()
    }

    pub fn build(&self) -> Classpath {
        Classpath::from_entries(self.to_entries())
    }
}

/// Pseudo-classes that carry module or package metadata rather than a type.
pub(crate) fn is_ignored_class(internal_name: &str) -> bool {
    internal_name == "module-info"
        || internal_name == "package-info"
        || internal_name.ends_with("/package-info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_metadata_pseudo_classes() {
        assert!(is_ignored_class("module-info"));
        assert!(is_ignored_class("package-info"));
        assert!(is_ignored_class("com/example/package-info"));
        assert!(!is_ignored_class("com/example/PackageInfo"));
    }

    #[test]
    fn entries_are_classified_by_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert_eq!(
            ClasspathEntry::from_path(tmp.path()),
            ClasspathEntry::ClassDir(tmp.path().to_path_buf())
        );
        assert_eq!(
            ClasspathEntry::from_path("jmods/java.base.jmod"),
            ClasspathEntry::Jmod(PathBuf::from("jmods/java.base.jmod"))
        );
        assert_eq!(
            ClasspathEntry::from_path("libs/missing.jar"),
            ClasspathEntry::Jar(PathBuf::from("libs/missing.jar"))
        );
    }

    #[test]
    fn relative_entries_are_anchored() {
        let mut config = ClasspathConfig {
            entries: vec![PathBuf::from("build/classes"), PathBuf::from("/opt/lib.jar")],
        };
        config.resolve_relative_to(Path::new("/work"));
        assert_eq!(
            config.entries,
            vec![
                PathBuf::from("/work/build/classes"),
                PathBuf::from("/opt/lib.jar")
            ]
        );
    }
}
