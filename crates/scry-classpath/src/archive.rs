use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::ZipArchive;

use scry_classfile::names::{to_class_file_name, to_dotted_name};

use crate::{is_ignored_class, ClassSource, SourceError};

const VERSIONS_PREFIX: &str = "META-INF/versions/";

/// Upper bound on the buffer reserved up front for one entry. The size in
/// the zip header is untrusted; larger entries still read, just with growth.
const MAX_PREALLOC: u64 = 1 << 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// Classes live at the archive root. Multi-release jars may also carry
    /// versioned copies under `META-INF/versions/<n>/`.
    Jar,
    /// Classes live under `classes/`.
    Jmod,
}

/// A jar or jmod on disk.
///
/// The archive is reopened on every fetch, so the source holds no file handle
/// and can be shared between threads freely.
#[derive(Clone, Debug)]
pub struct ArchiveSource {
    path: PathBuf,
    kind: ArchiveKind,
}

impl ArchiveSource {
    pub fn jar(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ArchiveKind::Jar,
        }
    }

    pub fn jmod(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ArchiveKind::Jmod,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ArchiveKind {
        self.kind
    }

    fn open(&self) -> io::Result<ZipArchive<File>> {
        let file = File::open(&self.path)?;
        ZipArchive::new(file).map_err(zip_to_io)
    }

    fn entry_name(&self, binary_name: &str) -> String {
        match self.kind {
            ArchiveKind::Jar => to_class_file_name(binary_name),
            ArchiveKind::Jmod => format!("classes/{}", to_class_file_name(binary_name)),
        }
    }

    fn fetch_inner(&self, binary_name: &str) -> io::Result<Option<Vec<u8>>> {
        let mut archive = self.open()?;
        let entry = self.entry_name(binary_name);
        if let Some(bytes) = read_entry(&mut archive, &entry)? {
            return Ok(Some(bytes));
        }

        // A class that only exists in versioned form: take the highest version.
        if self.kind == ArchiveKind::Jar && jar_is_multi_release(&mut archive) {
            let best = archive
                .file_names()
                .filter_map(|name| {
                    let rest = name.strip_prefix(VERSIONS_PREFIX)?;
                    let (version, path) = rest.split_once('/')?;
                    (path == entry).then(|| version.parse::<u32>().ok()).flatten()
                })
                .max();
            if let Some(version) = best {
                return read_entry(&mut archive, &format!("{VERSIONS_PREFIX}{version}/{entry}"));
            }
        }

        Ok(None)
    }
}

impl ClassSource for ArchiveSource {
    fn fetch(&self, binary_name: &str) -> Result<Vec<u8>, SourceError> {
        match self.fetch_inner(binary_name) {
            Ok(Some(bytes)) => Ok(bytes),
            Ok(None) => Err(SourceError::not_found(binary_name)),
            Err(err) => {
                tracing::debug!(
                    target: "scry.classpath",
                    archive = %self.path.display(),
                    name = binary_name,
                    error = %err,
                    "failed to read class from archive"
                );
                Err(SourceError::io(binary_name, err))
            }
        }
    }

    fn binary_names(&self) -> Result<Vec<String>, SourceError> {
        let io_err = |err| SourceError::io(self.path.display().to_string(), err);
        let mut archive = self.open().map_err(io_err)?;
        let multi_release = self.kind == ArchiveKind::Jar && jar_is_multi_release(&mut archive);

        let mut out = BTreeSet::new();
        for name in archive.file_names() {
            let Some(internal) = name.strip_suffix(".class") else {
                continue;
            };
            let internal = match self.kind {
                ArchiveKind::Jmod => match internal.strip_prefix("classes/") {
                    Some(internal) => internal,
                    None => continue,
                },
                ArchiveKind::Jar => match internal.strip_prefix(VERSIONS_PREFIX) {
                    Some(rest) if multi_release => match rest.split_once('/') {
                        Some((version, path)) if version.parse::<u32>().is_ok() => path,
                        _ => continue,
                    },
                    Some(_) => continue,
                    None if internal.starts_with("META-INF/") => continue,
                    None => internal,
                },
            };
            if is_ignored_class(internal) {
                continue;
            }
            out.insert(to_dotted_name(internal));
        }
        Ok(out.into_iter().collect())
    }
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> io::Result<Option<Vec<u8>>> {
    match archive.by_name(name) {
        Ok(mut entry) => {
            let mut bytes = Vec::with_capacity(initial_capacity(entry.size()));
            entry.read_to_end(&mut bytes)?;
            Ok(Some(bytes))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(zip_to_io(err)),
    }
}

fn initial_capacity(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOC) as usize
}

fn jar_is_multi_release<R: Read + Seek>(archive: &mut ZipArchive<R>) -> bool {
    let mut manifest = String::new();
    match archive.by_name("META-INF/MANIFEST.MF") {
        Ok(mut file) => {
            if file.read_to_string(&mut manifest).is_err() {
                return false;
            }
        }
        Err(_) => return false,
    }

    manifest.lines().any(|line| {
        line.split_once(':').is_some_and(|(key, value)| {
            key.trim().eq_ignore_ascii_case("Multi-Release")
                && value.trim().eq_ignore_ascii_case("true")
        })
    })
}

fn zip_to_io(err: ZipError) -> io::Error {
    match err {
        ZipError::Io(err) => err,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_entry_size_is_capped() {
        assert_eq!(initial_capacity(0), 0);
        assert_eq!(initial_capacity(4096), 4096);
        assert_eq!(initial_capacity(u64::MAX), MAX_PREALLOC as usize);
        assert_eq!(initial_capacity(0xFFFF_FFF0), MAX_PREALLOC as usize);
    }
}
