use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use scry_classfile::names::{to_class_file_name, to_dotted_name};

use crate::{is_ignored_class, ClassSource, SourceError};

/// An exploded class directory such as `target/classes`.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ClassSource for DirectorySource {
    fn fetch(&self, binary_name: &str) -> Result<Vec<u8>, SourceError> {
        let relative = to_class_file_name(binary_name);
        // Empty or `..` segments would let a crafted name escape `root`.
        if relative
            .split('/')
            .any(|segment| segment.is_empty() || segment == "..")
        {
            return Err(SourceError::not_found(binary_name));
        }

        let path = self.root.join(&relative);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::trace!(
                    target: "scry.classpath",
                    path = %path.display(),
                    "class file not present in directory"
                );
                Err(SourceError::not_found(binary_name))
            }
            Err(err) => Err(SourceError::io(binary_name, err)),
        }
    }

    fn binary_names(&self) -> Result<Vec<String>, SourceError> {
        let mut out = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.map_err(|err| {
                SourceError::io(self.root.display().to_string(), err.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension() != Some(OsStr::new("class")) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let internal = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let internal = internal.strip_suffix(".class").unwrap_or(&internal);
            if is_ignored_class(internal) {
                continue;
            }
            out.push(to_dotted_name(internal));
        }
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_names_that_escape_the_root() {
        let tmp = tempfile::TempDir::new().unwrap();
        let inner = tmp.path().join("classes");
        std::fs::create_dir_all(&inner).unwrap();
        std::fs::write(tmp.path().join("Secret.class"), b"x").unwrap();

        let source = DirectorySource::new(&inner);
        for name in ["../Secret", "..Secret", "/Secret", "", "a//b"] {
            assert!(
                source.fetch(name).unwrap_err().is_not_found(),
                "{name:?} should be not found"
            );
        }
    }
}
