use std::collections::BTreeSet;
use std::fmt;

use crate::{ClassSource, ClasspathEntry, SourceError};

/// An ordered list of sources. The first entry that has a class wins.
///
/// A miss falls through to the next entry. An I/O error is returned as-is
/// and later entries are not consulted.
#[derive(Default)]
pub struct Classpath {
    entries: Vec<Box<dyn ClassSource>>,
}

impl Classpath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = ClasspathEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(ClasspathEntry::into_source).collect(),
        }
    }

    pub fn push(&mut self, source: impl ClassSource + 'static) {
        self.entries.push(Box::new(source));
    }

    pub fn with(mut self, source: impl ClassSource + 'static) -> Self {
        self.push(source);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Classpath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classpath")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ClassSource for Classpath {
    fn fetch(&self, binary_name: &str) -> Result<Vec<u8>, SourceError> {
        for (idx, entry) in self.entries.iter().enumerate() {
            match entry.fetch(binary_name) {
                Ok(bytes) => return Ok(bytes),
                Err(SourceError::NotFound { .. }) => continue,
                Err(err) => {
                    tracing::debug!(
                        target: "scry.classpath",
                        entry = idx,
                        name = binary_name,
                        error = %err,
                        "classpath entry failed"
                    );
                    return Err(err);
                }
            }
        }
        Err(SourceError::not_found(binary_name))
    }

    fn binary_names(&self) -> Result<Vec<String>, SourceError> {
        let mut names = BTreeSet::new();
        for entry in &self.entries {
            names.extend(entry.binary_names()?);
        }
        Ok(names.into_iter().collect())
    }
}
